//! Exhaustive nearest neighbor search.

use std::iter::FromIterator;

use crate::dimension::{Dimensional, Neighbor};
use crate::error::Result;
use crate::kdtree::{check_radius, is_ignored, Ignore, KDTreeIndex};

/// A [`KDTreeIndex`] that answers every query with a linear scan.
///
/// Slow, but simple enough to trust as the reference for checking other indexes.
#[derive(Debug, Clone)]
pub struct ExhaustiveSearch<T>(Vec<T>);

impl<T> ExhaustiveSearch<T> {
    /// Create an empty index.
    pub fn new() -> Self {
        Self(Vec::new())
    }

    /// Add a new item to the index.
    pub fn push(&mut self, item: T) {
        self.0.push(item);
    }

    /// Get the size of this index.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Check if this index is empty.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// The indexed elements, in insertion order.
    pub fn elements(&self) -> &[T] {
        &self.0
    }
}

impl<T> Default for ExhaustiveSearch<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> FromIterator<T> for ExhaustiveSearch<T> {
    fn from_iter<I: IntoIterator<Item = T>>(items: I) -> Self {
        Self(items.into_iter().collect())
    }
}

impl<T> Extend<T> for ExhaustiveSearch<T> {
    fn extend<I: IntoIterator<Item = T>>(&mut self, iter: I) {
        for value in iter {
            self.push(value);
        }
    }
}

impl<T: Dimensional> KDTreeIndex<T> for ExhaustiveSearch<T> {
    fn size(&self) -> usize {
        self.len()
    }

    fn contains(&self, element: &T) -> bool {
        self.0.contains(element)
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

        let mut found = Vec::with_capacity(self.0.len());
        for element in self.0.iter() {
            if !is_ignored(ignore, element) {
                found.push(Neighbor::new(element, element.distance_to(point)?));
            }
        }
        found.sort_by(Neighbor::cmp_distance);

        for neighbor in found.into_iter().take(n) {
            neighbor.insert_into(current);
        }
        current.truncate(n);
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
        for element in self.0.iter() {
            if is_ignored(ignore, element) {
                continue;
            }
            let distance = element.distance_to(point)?;
            if distance <= r {
                current.push(Neighbor::new(element, distance));
            }
        }
        Ok(())
    }
}
