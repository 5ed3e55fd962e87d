use std::fmt::Debug;
use thiserror::Error;

/// Enum with all errors in this crate.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum KDTreeError {
    /// A tree cannot be built from zero elements.
    #[error("Cannot build a k-d tree from an empty list of elements")]
    EmptyInput,

    /// Two values that must share a dimensionality do not.
    #[error("Dimension mismatch: expected {expected} dimensions, found {found}")]
    DimensionMismatch { expected: usize, found: usize },

    /// A coordinate index outside `[0, dimensions)`.
    #[error("Coordinate index {index} out of range for {dimensions} dimensions")]
    CoordinateOutOfRange { index: usize, dimensions: usize },

    /// Radius queries need a non-negative, non-NaN radius.
    #[error("Radius must be a non-negative number, got {0}")]
    InvalidRadius(f64),

    /// A coordinate value that is not accepted by a checked constructor.
    #[error("Invalid {name}: {value}")]
    InvalidCoordinate { name: &'static str, value: f64 },

    /// Builder bounds that do not describe a box in the element space.
    #[error("Invalid bounds: {0}")]
    InvalidBounds(String),

    #[error("General error: {0}")]
    General(String),
}

pub type Result<T> = std::result::Result<T, KDTreeError>;
