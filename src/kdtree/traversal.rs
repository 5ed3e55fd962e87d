//! The vertices of a k-d tree, for manual traversal.

use std::fmt;

use crate::dimension::Dimensional;

/// A vertex of a k-d tree: an internal [`KDNode`] or a [`KDLeaf`] bucket.
///
/// Every vertex stores the range `[min, max]` of its parent's splitting coordinate that elements
/// below it can take. For the root this is `[-inf, inf]`.
#[derive(Debug, Clone)]
pub enum KDVertex<T> {
    /// Internal node, holding no elements itself.
    Node(KDNode<T>),
    /// Bucket of elements.
    Leaf(KDLeaf<T>),
}

/// An internal node of a k-d tree.
///
/// Elements whose coordinate `axis` is below `split` are in the left subtree; all others are in
/// the right subtree.
#[derive(Debug, Clone)]
pub struct KDNode<T> {
    pub(crate) axis: usize,
    pub(crate) split: f64,
    pub(crate) min: f64,
    pub(crate) max: f64,
    pub(crate) left: Box<KDVertex<T>>,
    pub(crate) right: Box<KDVertex<T>>,
}

/// A leaf of a k-d tree. Holds at most [`MAX_COUNT`][crate::kdtree::constants::MAX_COUNT]
/// elements unless they are all coincident.
#[derive(Debug, Clone)]
pub struct KDLeaf<T> {
    pub(crate) elements: Vec<T>,
    pub(crate) min: f64,
    pub(crate) max: f64,
}

impl<T> KDVertex<T> {
    /// Minimum value of the parent's splitting coordinate below this vertex.
    #[inline]
    pub fn min(&self) -> f64 {
        match self {
            KDVertex::Node(node) => node.min,
            KDVertex::Leaf(leaf) => leaf.min,
        }
    }

    /// Maximum value of the parent's splitting coordinate below this vertex.
    #[inline]
    pub fn max(&self) -> f64 {
        match self {
            KDVertex::Node(node) => node.max,
            KDVertex::Leaf(leaf) => leaf.max,
        }
    }

    /// Returns `true` if this is a leaf bucket.
    #[inline]
    pub fn is_leaf(&self) -> bool {
        matches!(self, KDVertex::Leaf(_))
    }

    /// Number of elements in this subtree.
    pub fn len(&self) -> usize {
        match self {
            KDVertex::Node(node) => node.left.len() + node.right.len(),
            KDVertex::Leaf(leaf) => leaf.elements.len(),
        }
    }

    /// Returns `true` if no element is stored below this vertex.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Number of levels below and including this vertex.
    pub fn depth(&self) -> usize {
        match self {
            KDVertex::Node(node) => 1 + node.left.depth().max(node.right.depth()),
            KDVertex::Leaf(_) => 1,
        }
    }

    /// All elements in this subtree, left to right.
    pub fn elements(&self) -> Vec<&T> {
        let mut out = Vec::with_capacity(self.len());
        self.collect_elements(&mut out);
        out
    }

    fn collect_elements<'a>(&'a self, out: &mut Vec<&'a T>) {
        match self {
            KDVertex::Node(node) => {
                node.left.collect_elements(out);
                node.right.collect_elements(out);
            }
            KDVertex::Leaf(leaf) => out.extend(leaf.elements.iter()),
        }
    }
}

impl<T: Dimensional> KDVertex<T> {
    /// Whether an element equal to `element` is stored below this vertex. Follows the splits,
    /// so it only visits one leaf.
    pub fn contains_element(&self, element: &T) -> bool {
        match self {
            KDVertex::Node(node) => match element.coordinate(node.axis) {
                Ok(c) if c < node.split => node.left.contains_element(element),
                Ok(_) => node.right.contains_element(element),
                // element lacks the splitting coordinate
                Err(_) => false,
            },
            KDVertex::Leaf(leaf) => leaf.elements.contains(element),
        }
    }
}

impl<T> KDNode<T> {
    /// Index of the splitting coordinate.
    pub fn axis(&self) -> usize {
        self.axis
    }

    /// Value of the splitting coordinate.
    pub fn split(&self) -> f64 {
        self.split
    }

    /// The subtree with coordinates below the split.
    pub fn left(&self) -> &KDVertex<T> {
        &self.left
    }

    /// The subtree with coordinates at or above the split.
    pub fn right(&self) -> &KDVertex<T> {
        &self.right
    }
}

impl<T> KDLeaf<T> {
    /// The elements in this bucket.
    pub fn elements(&self) -> &[T] {
        &self.elements
    }
}

impl<T> fmt::Display for KDNode<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "KDNode splitting coordinate {} at {}",
            self.axis, self.split
        )
    }
}

impl<T: fmt::Debug> fmt::Display for KDLeaf<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "KDLeaf with elements: {:?}", self.elements)
    }
}
