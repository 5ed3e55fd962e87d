//! Values with indexed coordinates, and distance-annotated query results.

use std::cmp::Ordering;
use std::fmt::{self, Debug, Display};

use crate::error::Result;

pub mod latlng;
pub mod point;
pub mod star;

pub use latlng::{GeoPoint, LatLng, LatLngBox, TunnelLatLng};
pub use point::Point;
pub use star::Star;

/// An object with a fixed number of indexed real coordinates and a distance to other objects of
/// the same type.
///
/// Implementations must be immutable values: [`with_coordinate`][Dimensional::with_coordinate]
/// returns a new value and equality is decided by value, not identity.
pub trait Dimensional: Clone + PartialEq + Debug {
    /// The number of coordinates of this value.
    fn num_dimensions(&self) -> usize;

    /// The coordinate at `index`.
    ///
    /// Fails with [`CoordinateOutOfRange`][crate::KDTreeError::CoordinateOutOfRange] if `index`
    /// is not below [`num_dimensions`][Dimensional::num_dimensions].
    fn coordinate(&self, index: usize) -> Result<f64>;

    /// Distance to another value of the same type.
    ///
    /// Fails if the two values have a different number of dimensions.
    fn distance_to(&self, other: &Self) -> Result<f64>;

    /// A copy of this value with coordinate `index` replaced by `value`.
    fn with_coordinate(&self, index: usize, value: f64) -> Result<Self>;

    /// A lower bound on the distance from this value to any value whose coordinate `axis`
    /// equals `value`.
    ///
    /// Queries prune a subtree when this bound exceeds what they are looking for, so it must
    /// never overestimate. The default moves this value onto the splitting hyperplane, which is
    /// exact for metrics where coordinates are independent, such as Euclidean distance.
    fn distance_to_split(&self, axis: usize, value: f64) -> Result<f64> {
        self.distance_to(&self.with_coordinate(axis, value)?)
    }
}

/// An element found by a query, paired with its distance to the query point.
///
/// Results are ordered by distance only; see [`Neighbor::cmp_distance`].
#[derive(Debug, PartialEq)]
pub struct Neighbor<'a, T> {
    /// The element, borrowed from the index that produced it.
    pub element: &'a T,
    /// Distance from the element to the query point.
    pub distance: f64,
}

impl<'a, T> Neighbor<'a, T> {
    /// Pair `element` with its distance to the query point.
    pub fn new(element: &'a T, distance: f64) -> Self {
        Self { element, distance }
    }

    /// Compare two results by distance.
    #[inline]
    pub fn cmp_distance(&self, other: &Self) -> Ordering {
        self.distance.total_cmp(&other.distance)
    }

    /// Insert into a list sorted ascending by distance, after any results of equal distance.
    pub fn insert_into(self, sorted: &mut Vec<Self>) {
        let index = sorted.partition_point(|other| other.distance <= self.distance);
        sorted.insert(index, self);
    }
}

impl<T> Clone for Neighbor<'_, T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for Neighbor<'_, T> {}

impl<T: Display> Display for Neighbor<'_, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} with distance {}", self.element, self.distance)
    }
}

/// Stable ascending sort of query results by distance.
pub fn sort_by_distance<T>(results: &mut [Neighbor<'_, T>]) {
    results.sort_by(Neighbor::cmp_distance);
}

/// Error unless `found` equals `expected`.
#[inline]
pub(crate) fn check_dimensions(expected: usize, found: usize) -> Result<()> {
    if expected != found {
        return Err(crate::KDTreeError::DimensionMismatch { expected, found });
    }
    Ok(())
}
