#![doc = include_str!("../README.md")]

pub mod dimension;
mod error;
pub mod geography;
pub mod kdtree;
pub mod oracle;

pub use error::{KDTreeError, Result};

#[cfg(test)]
pub(crate) mod test;
