use crate::dimension::{sort_by_distance, Dimensional, Neighbor};
use crate::error::{KDTreeError, Result};
use crate::kdtree::{KDNode, KDVertex};

/// Elements for which this predicate returns `true` are left out of query results. `None`
/// ignores nothing.
pub type Ignore<'a, T> = Option<&'a dyn Fn(&T) -> bool>;

/// A trait for nearest neighbor and radius search over [`Dimensional`] elements.
///
/// The `*_into` methods take the results found so far and update them in place; the provided
/// methods start from an empty list.
pub trait KDTreeIndex<T: Dimensional> {
    /// The number of elements in this index.
    fn size(&self) -> usize;

    /// Whether this index holds an element equal to `element`.
    fn contains(&self, element: &T) -> bool;

    /// Update `current`, sorted nearest first, to the `n` elements nearest to `point` among
    /// `current` and this index. Elements matching `ignore` are skipped. `n == 0` is a no-op.
    fn nearest_neighbors_into<'a>(
        &'a self,
        point: &T,
        n: usize,
        ignore: Ignore<'_, T>,
        current: &mut Vec<Neighbor<'a, T>>,
    ) -> Result<()>;

    /// Append to `current` every element of this index within distance `r` of `point`,
    /// inclusive. Elements matching `ignore` are skipped. No order is guaranteed.
    ///
    /// Fails if `r` is negative or NaN.
    fn within_radius_into<'a>(
        &'a self,
        point: &T,
        r: f64,
        ignore: Ignore<'_, T>,
        current: &mut Vec<Neighbor<'a, T>>,
    ) -> Result<()>;

    /// Search up to `n` nearest neighbors of `point`, nearest first.
    ///
    /// ```
    /// use kdtree_index::dimension::Point;
    /// use kdtree_index::kdtree::{KDTree, KDTreeIndex};
    ///
    /// let points = (0..5).map(|x| Point::from([x as f64, 0.0])).collect();
    /// let tree = KDTree::build(points, 0).unwrap();
    ///
    /// let nearest = tree.nearest_neighbors(&Point::from([2.0, 0.0]), 1, None).unwrap();
    /// assert_eq!(nearest[0].element, &Point::from([2.0, 0.0]));
    /// assert_eq!(nearest[0].distance, 0.0);
    /// ```
    fn nearest_neighbors(
        &self,
        point: &T,
        n: usize,
        ignore: Ignore<'_, T>,
    ) -> Result<Vec<Neighbor<'_, T>>> {
        let mut nn = Vec::with_capacity(n.min(self.size()));
        self.nearest_neighbors_into(point, n, ignore, &mut nn)?;
        Ok(nn)
    }

    /// Search all elements within distance `r` of `point`, nearest first.
    fn within_radius(
        &self,
        point: &T,
        r: f64,
        ignore: Ignore<'_, T>,
    ) -> Result<Vec<Neighbor<'_, T>>> {
        let mut wr = vec![];
        self.within_radius_into(point, r, ignore, &mut wr)?;
        sort_by_distance(&mut wr);
        Ok(wr)
    }
}

impl<T: Dimensional> KDTreeIndex<T> for KDVertex<T> {
    fn size(&self) -> usize {
        self.len()
    }

    fn contains(&self, element: &T) -> bool {
        self.contains_element(element)
    }

    fn nearest_neighbors_into<'a>(
        &'a self,
        point: &T,
        n: usize,
        ignore: Ignore<'_, T>,
        current: &mut Vec<Neighbor<'a, T>>,
    ) -> Result<()> {
        if n == 0 {
            return Ok(());
        }

        match self {
            KDVertex::Leaf(leaf) => {
                for element in leaf.elements.iter() {
                    if is_ignored(ignore, element) {
                        continue;
                    }
                    let distance = element.distance_to(point)?;
                    if current.len() >= n
                        && current.last().is_some_and(|farthest| distance >= farthest.distance)
                    {
                        continue;
                    }
                    Neighbor::new(element, distance).insert_into(current);
                }
                current.truncate(n);
            }
            KDVertex::Node(node) => {
                let (near, far, extreme) = node.near_far(point)?;
                near.nearest_neighbors_into(point, n, ignore, current)?;

                // with fewer than n found, nothing proves the far side irrelevant
                let visit_far = match current.last() {
                    Some(farthest) if current.len() >= n => {
                        let farthest = farthest.distance;
                        node.far_side_within(point, extreme, |d| d < farthest)?
                    }
                    _ => true,
                };
                if visit_far {
                    far.nearest_neighbors_into(point, n, ignore, current)?;
                }
            }
        }
        Ok(())
    }

    fn within_radius_into<'a>(
        &'a self,
        point: &T,
        r: f64,
        ignore: Ignore<'_, T>,
        current: &mut Vec<Neighbor<'a, T>>,
    ) -> Result<()> {
        check_radius(r)?;

        match self {
            KDVertex::Leaf(leaf) => {
                for element in leaf.elements.iter() {
                    if is_ignored(ignore, element) {
                        continue;
                    }
                    let distance = element.distance_to(point)?;
                    if distance <= r {
                        current.push(Neighbor::new(element, distance));
                    }
                }
            }
            KDVertex::Node(node) => {
                let (near, far, extreme) = node.near_far(point)?;
                near.within_radius_into(point, r, ignore, current)?;
                if node.far_side_within(point, extreme, |d| d <= r)? {
                    far.within_radius_into(point, r, ignore, current)?;
                }
            }
        }
        Ok(())
    }
}

impl<T: Dimensional> KDNode<T> {
    /// The subtree `point` falls in, the other subtree, and the far subtree's extreme value of
    /// the splitting coordinate.
    #[inline]
    fn near_far(&self, point: &T) -> Result<(&KDVertex<T>, &KDVertex<T>, f64)> {
        if point.coordinate(self.axis)? < self.split {
            Ok((&*self.left, &*self.right, self.right.max()))
        } else {
            Ok((&*self.right, &*self.left, self.left.min()))
        }
    }

    /// Whether the far subtree can hold an element at a distance accepted by `accept`.
    ///
    /// Tries [`Dimensional::distance_to_split`] at the splitting value first, then, for bounded
    /// coordinate spaces, at the far subtree's outer edge. A coordinate that wraps around
    /// (longitude on a ring) can reach the far side through that edge.
    fn far_side_within(
        &self,
        point: &T,
        extreme: f64,
        accept: impl Fn(f64) -> bool,
    ) -> Result<bool> {
        if accept(point.distance_to_split(self.axis, self.split)?) {
            return Ok(true);
        }
        if extreme.is_finite() {
            return Ok(accept(point.distance_to_split(self.axis, extreme)?));
        }
        Ok(false)
    }
}

#[inline]
pub(crate) fn is_ignored<T>(ignore: Ignore<'_, T>, element: &T) -> bool {
    ignore.is_some_and(|ignore| ignore(element))
}

#[inline]
pub(crate) fn check_radius(r: f64) -> Result<()> {
    // also rejects NaN
    if !(r >= 0.0) {
        return Err(KDTreeError::InvalidRadius(r));
    }
    Ok(())
}
