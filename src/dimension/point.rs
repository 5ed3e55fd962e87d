use std::fmt;

use num_traits::ToPrimitive;
use tinyvec::TinyVec;

use crate::dimension::{check_dimensions, Dimensional};
use crate::error::{KDTreeError, Result};

/// A point in n-dimensional Euclidean space.
///
/// Coordinates are stored inline for up to four dimensions, so the copies made while pruning
/// (see [`Dimensional::with_coordinate`]) do not allocate for the common 2-d and 3-d cases.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Point {
    coords: TinyVec<[f64; 4]>,
}

impl Point {
    /// Create a point from its coordinates.
    pub fn new<I: IntoIterator<Item = f64>>(coords: I) -> Self {
        Self {
            coords: coords.into_iter().collect(),
        }
    }

    /// Create a point from any numeric coordinates, failing if a value has no `f64`
    /// representation.
    pub fn try_from_slice<N: ToPrimitive + fmt::Debug>(coords: &[N]) -> Result<Self> {
        let coords = coords
            .iter()
            .map(|c| {
                c.to_f64().ok_or_else(|| {
                    KDTreeError::General(format!("Coordinate {:?} is not representable", c))
                })
            })
            .collect::<Result<TinyVec<[f64; 4]>>>()?;
        Ok(Self { coords })
    }

    /// The coordinates of this point.
    pub fn coords(&self) -> &[f64] {
        &self.coords
    }
}

impl<const D: usize> From<[f64; D]> for Point {
    fn from(coords: [f64; D]) -> Self {
        Self::new(coords)
    }
}

impl Dimensional for Point {
    #[inline]
    fn num_dimensions(&self) -> usize {
        self.coords.len()
    }

    #[inline]
    fn coordinate(&self, index: usize) -> Result<f64> {
        self.coords
            .get(index)
            .copied()
            .ok_or(KDTreeError::CoordinateOutOfRange {
                index,
                dimensions: self.coords.len(),
            })
    }

    fn distance_to(&self, other: &Self) -> Result<f64> {
        check_dimensions(self.num_dimensions(), other.num_dimensions())?;
        let squared_sum: f64 = self
            .coords
            .iter()
            .zip(other.coords.iter())
            .map(|(a, b)| (a - b) * (a - b))
            .sum();
        Ok(squared_sum.sqrt())
    }

    fn with_coordinate(&self, index: usize, value: f64) -> Result<Self> {
        let mut copy = self.clone();
        let dimensions = copy.coords.len();
        let slot = copy
            .coords
            .get_mut(index)
            .ok_or(KDTreeError::CoordinateOutOfRange { index, dimensions })?;
        *slot = value;
        Ok(copy)
    }
}

impl fmt::Display for Point {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Point(")?;
        for (i, c) in self.coords.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}", c)?;
        }
        write!(f, ")")
    }
}
