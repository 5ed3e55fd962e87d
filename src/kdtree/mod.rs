//! A bucketed k-d tree supporting k-nearest-neighbor and radius queries.

#![warn(missing_docs)]

mod builder;
pub mod constants;
mod index;
mod r#trait;
mod traversal;

pub use builder::KDTreeBuilder;
pub use index::KDTree;
pub use r#trait::{Ignore, KDTreeIndex};
pub use traversal::{KDLeaf, KDNode, KDVertex};

pub(crate) use r#trait::{check_radius, is_ignored};
