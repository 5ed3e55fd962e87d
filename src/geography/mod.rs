//! Queries over latitude/longitude that reach across the ±180° meridian.
//!
//! A k-d tree splits longitude like any other coordinate, so two places a short hop apart
//! across the seam sit at opposite ends of the longitude axis and prune each other away.
//! [`LatLngKDTree`] runs every query twice, once from the query point and once from the same
//! location written with its longitude shifted by 360°, and merges the two answers.

mod merge;

pub use merge::{merge_all, merge_nearest};

use crate::dimension::{sort_by_distance, GeoPoint, LatLngBox, Neighbor};
use crate::error::Result;
use crate::kdtree::{check_radius, Ignore, KDTreeIndex};

/// A [`KDTreeIndex`] over [`GeoPoint`] elements that handles longitude wrap-around.
///
/// ```
/// use kdtree_index::dimension::LatLng;
/// use kdtree_index::geography::LatLngKDTree;
/// use kdtree_index::kdtree::{KDTree, KDTreeIndex};
///
/// let places = vec![
///     LatLng::new(-17.8, 177.4),
///     LatLng::new(-13.8, -171.8),
///     LatLng::new(-16.5, 179.9),
///     LatLng::new(-16.5, -179.9),
/// ];
/// let tree = LatLngKDTree::new(KDTree::build(places, 0).unwrap());
///
/// let query = LatLng::new(-16.5, 179.95);
/// let nearest = tree.nearest_neighbors(&query, 2, None).unwrap();
/// assert_eq!(nearest[0].element, &LatLng::new(-16.5, 179.9));
/// assert_eq!(nearest[1].element, &LatLng::new(-16.5, -179.9));
/// ```
#[derive(Debug, Clone)]
pub struct LatLngKDTree<I> {
    inner: I,
}

impl<I> LatLngKDTree<I> {
    /// Wrap an index over latitude/longitude elements.
    pub fn new(inner: I) -> Self {
        Self { inner }
    }

    /// The wrapped index, which answers queries without looking across the seam.
    pub fn inner(&self) -> &I {
        &self.inner
    }

    /// Consume the wrapper, returning the wrapped index.
    pub fn into_inner(self) -> I {
        self.inner
    }

    /// The point written on the other side of the seam. See [`GeoPoint::mirrored`].
    pub fn mirrored<T: GeoPoint>(point: &T) -> T {
        point.mirrored()
    }

    /// Search all elements within distance `r` of `point` that also lie in `bbox`, nearest
    /// first. The box may be written with longitudes past ±180°.
    pub fn within_box<T>(
        &self,
        point: &T,
        r: f64,
        bbox: &LatLngBox,
        ignore: Ignore<'_, T>,
    ) -> Result<Vec<Neighbor<'_, T>>>
    where
        T: GeoPoint,
        I: KDTreeIndex<T>,
    {
        let mut results = self.within_radius(point, r, ignore)?;
        results.retain(|n| bbox.contains(n.element));
        Ok(results)
    }
}

impl<T: GeoPoint, I: KDTreeIndex<T>> KDTreeIndex<T> for LatLngKDTree<I> {
    fn size(&self) -> usize {
        self.inner.size()
    }

    fn contains(&self, element: &T) -> bool {
        self.inner.contains(element)
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
        let mirrored = point.mirrored();

        let mut l1 = current.clone();
        self.inner.nearest_neighbors_into(point, n, ignore, &mut l1)?;
        let mut l2 = current.clone();
        self.inner
            .nearest_neighbors_into(&mirrored, n, ignore, &mut l2)?;

        *current = merge_nearest(l1, l2, n);
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
        let mirrored = point.mirrored();

        let mut l1 = current.clone();
        self.inner.within_radius_into(point, r, ignore, &mut l1)?;
        sort_by_distance(&mut l1);
        let mut l2 = current.clone();
        self.inner
            .within_radius_into(&mirrored, r, ignore, &mut l2)?;
        sort_by_distance(&mut l2);

        *current = merge_all(l1, l2);
        Ok(())
    }
}

#[cfg(test)]
mod test {
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    use super::*;
    use crate::dimension::{Dimensional, LatLng, TunnelLatLng};
    use crate::kdtree::{KDTree, KDTreeBuilder};

    const WEST: f64 = -179.9;
    const EAST: f64 = 179.9;

    /// Two points on the equator either side of the seam, among points that put the root split
    /// on latitude 0 and the next split on longitude 10.
    fn seam_points() -> Vec<LatLng> {
        let mut points: Vec<LatLng> = [0., 10., 20., 30.]
            .iter()
            .map(|lng| LatLng::new(-50., *lng))
            .collect();
        let lngs = [
            WEST, -150., -100., -90., -80., -70., -60., -50., 10., 20., 30., 40., 50., 60., 150.,
            EAST,
        ];
        points.extend(lngs.iter().map(|lng| LatLng::new(0., *lng)));
        points
    }

    #[test]
    fn plain_tree_misses_the_seam() {
        let tree = KDTree::build(seam_points(), 0).unwrap();
        let west = LatLng::new(0., WEST);
        let east = LatLng::new(0., EAST);

        let not_west = |p: &LatLng| p == &west;
        let nearest = tree.nearest_neighbors(&west, 1, Some(&not_west)).unwrap();
        assert_eq!(nearest[0].element, &LatLng::new(0., -150.));

        let not_east = |p: &LatLng| p == &east;
        let nearest = tree.nearest_neighbors(&east, 1, Some(&not_east)).unwrap();
        assert_eq!(nearest[0].element, &LatLng::new(0., 150.));
    }

    #[test]
    fn wrapper_finds_the_seam() {
        let tree = LatLngKDTree::new(KDTree::build(seam_points(), 0).unwrap());
        let west = LatLng::new(0., WEST);
        let east = LatLng::new(0., EAST);

        let not_west = |p: &LatLng| p == &west;
        let nearest = tree.nearest_neighbors(&west, 1, Some(&not_west)).unwrap();
        assert_eq!(nearest[0].element, &east);
        assert!((nearest[0].distance - east.distance_to(&west).unwrap()).abs() < 1e-9);

        let not_east = |p: &LatLng| p == &east;
        let nearest = tree.nearest_neighbors(&east, 3, Some(&not_east)).unwrap();
        assert_eq!(nearest.len(), 3);
        assert_eq!(nearest[0].element, &west);
        assert_eq!(nearest[1].element, &LatLng::new(0., 150.));
        assert_eq!(nearest[2].element, &LatLng::new(0., -150.));

        let within = tree.within_radius(&west, 50., None).unwrap();
        let found: Vec<&LatLng> = within.iter().map(|n| n.element).collect();
        assert_eq!(found, vec![&west, &east]);
    }

    #[test]
    fn seam_neighbors_beat_scattered_points() {
        let mut rng = StdRng::seed_from_u64(21);
        let west = LatLng::new(0., WEST);
        let east = LatLng::new(0., EAST);

        for scattered in [20, 100, 1000] {
            let mut points: Vec<LatLng> = (0..scattered)
                .map(|_| LatLng::new(rng.gen_range(-89.0..89.0), rng.gen_range(-170.0..170.0)))
                .collect();
            points.push(west.clone());
            points.push(east.clone());

            let tree = LatLngKDTree::new(
                KDTreeBuilder::new(points)
                    .seed(scattered as u64)
                    .finish()
                    .unwrap(),
            );
            let not_west = |p: &LatLng| p == &west;
            let nearest = tree.nearest_neighbors(&west, 1, Some(&not_west)).unwrap();
            assert_eq!(nearest[0].element, &east);

            let not_east = |p: &LatLng| p == &east;
            let nearest = tree.nearest_neighbors(&east, 1, Some(&not_east)).unwrap();
            assert_eq!(nearest[0].element, &west);
        }
    }

    #[test]
    fn results_are_unique() {
        let tree = LatLngKDTree::new(KDTree::build(seam_points(), 0).unwrap());
        let query = LatLng::new(0., 0.);
        let all = tree.nearest_neighbors(&query, 100, None).unwrap();
        assert_eq!(all.len(), 20);
        for (i, a) in all.iter().enumerate() {
            assert!(all[i + 1..].iter().all(|b| b.element != a.element));
        }
        for pair in all.windows(2) {
            assert!(pair[0].distance <= pair[1].distance);
        }
    }

    #[test]
    fn box_filter() {
        let tree = LatLngKDTree::new(KDTree::build(seam_points(), 0).unwrap());
        let west = LatLng::new(0., WEST);
        let viewport = LatLngBox::new(-1., 179.5, 1., 180.5);

        let in_box = tree.within_box(&west, 20_000., &viewport, None).unwrap();
        let found: Vec<&LatLng> = in_box.iter().map(|n| n.element).collect();
        assert_eq!(found, vec![&west, &LatLng::new(0., EAST)]);
    }

    #[test]
    fn tunnel_metric() {
        let points: Vec<TunnelLatLng> = seam_points().into_iter().map(TunnelLatLng).collect();
        let tree = LatLngKDTree::new(KDTree::build(points, 0).unwrap());
        let west = TunnelLatLng::new(0., WEST);
        let not_west = |p: &TunnelLatLng| p == &west;
        let nearest = tree.nearest_neighbors(&west, 1, Some(&not_west)).unwrap();
        assert_eq!(nearest[0].element, &TunnelLatLng::new(0., EAST));
    }

    #[test]
    fn invalid_queries() {
        let tree = LatLngKDTree::new(KDTree::build(seam_points(), 0).unwrap());
        let query = LatLng::new(0., 0.);
        assert!(tree.within_radius(&query, -1., None).is_err());
        assert!(tree.nearest_neighbors(&query, 0, None).unwrap().is_empty());
        assert_eq!(tree.size(), 20);
        assert!(tree.contains(&LatLng::new(0., EAST)));
        assert_eq!(LatLngKDTree::<KDTree<LatLng>>::mirrored(&query), query);
    }
}
