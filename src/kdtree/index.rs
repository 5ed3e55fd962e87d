use crate::dimension::{check_dimensions, Dimensional, Neighbor};
use crate::error::Result;
use crate::kdtree::r#trait::Ignore;
use crate::kdtree::{KDTreeBuilder, KDTreeIndex, KDVertex};

/// An immutable k-d tree over elements of one dimensionality.
///
/// Usually this will be created via [`KDTreeBuilder`], or with [`KDTree::build`] and
/// [`KDTree::build_parallel`] for the default options.
#[derive(Debug, Clone)]
pub struct KDTree<T> {
    pub(crate) root: KDVertex<T>,
    pub(crate) num_dimensions: usize,
}

impl<T: Dimensional> KDTree<T> {
    /// Build a tree, splitting the root on coordinate `axis`.
    ///
    /// Fails if `elements` is empty, if the elements differ in dimension count, or if `axis` is
    /// not a coordinate index of the elements.
    pub fn build(elements: Vec<T>, axis: usize) -> Result<Self> {
        KDTreeBuilder::new(elements).axis(axis).finish()
    }

    /// Build a tree, building subtrees concurrently once `parallel_depth` levels below the root
    /// are reached. See [`KDTreeBuilder::finish_parallel`].
    pub fn build_parallel(elements: Vec<T>, axis: usize, parallel_depth: usize) -> Result<Self>
    where
        T: Send,
    {
        KDTreeBuilder::new(elements)
            .axis(axis)
            .finish_parallel(parallel_depth)
    }

    /// The number of coordinates of every element in this tree.
    pub fn num_dimensions(&self) -> usize {
        self.num_dimensions
    }

    /// Access the root vertex for manual traversal.
    pub fn root(&self) -> &KDVertex<T> {
        &self.root
    }

    /// Consume the tree, returning its root vertex.
    pub fn into_root(self) -> KDVertex<T> {
        self.root
    }
}

impl<T: Dimensional> KDTreeIndex<T> for KDTree<T> {
    fn size(&self) -> usize {
        self.root.len()
    }

    fn contains(&self, element: &T) -> bool {
        element.num_dimensions() == self.num_dimensions && self.root.contains_element(element)
    }

    fn nearest_neighbors_into<'a>(
        &'a self,
        point: &T,
        n: usize,
        ignore: Ignore<'_, T>,
        current: &mut Vec<Neighbor<'a, T>>,
    ) -> Result<()> {
        check_dimensions(self.num_dimensions, point.num_dimensions())?;
        self.root.nearest_neighbors_into(point, n, ignore, current)
    }

    fn within_radius_into<'a>(
        &'a self,
        point: &T,
        r: f64,
        ignore: Ignore<'_, T>,
        current: &mut Vec<Neighbor<'a, T>>,
    ) -> Result<()> {
        check_dimensions(self.num_dimensions, point.num_dimensions())?;
        self.root.within_radius_into(point, r, ignore, current)
    }
}
