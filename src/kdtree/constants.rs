/// Maximum number of elements in a [`KDLeaf`][crate::kdtree::KDLeaf].
///
/// Only a bucket of coincident elements, which no split can separate, may exceed it.
pub const MAX_COUNT: usize = 10;

/// Partitions with more elements than this estimate their median from this many elements drawn
/// with replacement; smaller ones use the exact median.
pub const RANDOM_MEDIAN: usize = 20;
