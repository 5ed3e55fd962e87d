use std::fmt;

use crate::dimension::Dimensional;
use crate::error::{KDTreeError, Result};

const NUM_DIMENSIONS: usize = 3;

/// A star in three-dimensional space, identified by catalog id and proper name.
#[derive(Debug, Clone, PartialEq)]
pub struct Star {
    id: u32,
    /// Proper name; empty if the star has none.
    name: String,
    coords: [f64; NUM_DIMENSIONS],
}

impl Star {
    /// Create a star at `(x, y, z)`.
    pub fn new(id: u32, name: impl Into<String>, x: f64, y: f64, z: f64) -> Self {
        Self {
            id,
            name: name.into(),
            coords: [x, y, z],
        }
    }

    /// Catalog id.
    pub fn id(&self) -> u32 {
        self.id
    }

    /// Proper name, or `""` for an unnamed star.
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn x(&self) -> f64 {
        self.coords[0]
    }

    pub fn y(&self) -> f64 {
        self.coords[1]
    }

    pub fn z(&self) -> f64 {
        self.coords[2]
    }
}

impl Dimensional for Star {
    fn num_dimensions(&self) -> usize {
        NUM_DIMENSIONS
    }

    fn coordinate(&self, index: usize) -> Result<f64> {
        self.coords
            .get(index)
            .copied()
            .ok_or(KDTreeError::CoordinateOutOfRange {
                index,
                dimensions: NUM_DIMENSIONS,
            })
    }

    fn distance_to(&self, other: &Self) -> Result<f64> {
        let squared_sum: f64 = self
            .coords
            .iter()
            .zip(other.coords.iter())
            .map(|(a, b)| (a - b) * (a - b))
            .sum();
        Ok(squared_sum.sqrt())
    }

    fn with_coordinate(&self, index: usize, value: f64) -> Result<Self> {
        if index >= NUM_DIMENSIONS {
            return Err(KDTreeError::CoordinateOutOfRange {
                index,
                dimensions: NUM_DIMENSIONS,
            });
        }
        let mut copy = self.clone();
        copy.coords[index] = value;
        Ok(copy)
    }
}

impl fmt::Display for Star {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Star {} \"{}\" at ({}, {}, {})",
            self.id,
            self.name,
            self.x(),
            self.y(),
            self.z()
        )
    }
}
