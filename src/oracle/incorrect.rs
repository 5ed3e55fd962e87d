use std::cell::RefCell;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::dimension::{Dimensional, Neighbor};
use crate::error::Result;
use crate::kdtree::{Ignore, KDTreeIndex};
use crate::oracle::ExhaustiveSearch;

/// A way of spoiling a correct query result.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mutation {
    /// Return no results.
    Empty,
    /// Drop one random result.
    OmitsElement,
    /// Report the first result twice.
    DuplicatesFirst,
    /// Swap two random results.
    Swaps,
    /// Reverse the order of the results.
    Reverses,
    /// Add a random amount below 1 to the distance of one result.
    ModifiesDistance,
}

impl Mutation {
    /// Every mutation.
    pub const ALL: [Mutation; 6] = [
        Mutation::Empty,
        Mutation::OmitsElement,
        Mutation::DuplicatesFirst,
        Mutation::Swaps,
        Mutation::Reverses,
        Mutation::ModifiesDistance,
    ];

    /// Apply this mutation to `results` in place.
    pub fn apply<T, R: Rng>(&self, results: &mut Vec<Neighbor<'_, T>>, rng: &mut R) {
        if results.is_empty() {
            return;
        }
        match self {
            Mutation::Empty => results.clear(),
            Mutation::OmitsElement => {
                results.remove(rng.gen_range(0..results.len()));
            }
            Mutation::DuplicatesFirst => {
                let first = results[0];
                results.insert(0, first);
            }
            Mutation::Swaps => {
                let a = rng.gen_range(0..results.len());
                let b = rng.gen_range(0..results.len());
                results.swap(a, b);
            }
            Mutation::Reverses => results.reverse(),
            Mutation::ModifiesDistance => {
                let i = rng.gen_range(0..results.len());
                results[i].distance += rng.gen::<f64>();
            }
        }
    }
}

/// A linear-scan index whose [`nearest_neighbors`][KDTreeIndex::nearest_neighbors] and
/// [`within_radius`][KDTreeIndex::within_radius] return deliberately wrong results, for checking
/// that a [`KDTreeOracle`][crate::oracle::KDTreeOracle] notices.
#[derive(Debug)]
pub struct IncorrectSearch<T> {
    correct: ExhaustiveSearch<T>,
    mutation: Mutation,
    rng: RefCell<StdRng>,
}

impl<T> IncorrectSearch<T> {
    /// Index `elements`, spoiling every query result with `mutation`.
    pub fn new(elements: Vec<T>, mutation: Mutation) -> Self {
        Self {
            correct: elements.into_iter().collect(),
            mutation,
            rng: RefCell::new(StdRng::from_entropy()),
        }
    }

    /// Pick mutated positions from a fixed seed.
    pub fn with_seed(self, seed: u64) -> Self {
        Self {
            rng: RefCell::new(StdRng::seed_from_u64(seed)),
            ..self
        }
    }

    /// The mutation applied to every result.
    pub fn mutation(&self) -> Mutation {
        self.mutation
    }

    fn spoil(&self, results: &mut Vec<Neighbor<'_, T>>) {
        self.mutation.apply(results, &mut *self.rng.borrow_mut());
    }
}

impl<T: Dimensional> KDTreeIndex<T> for IncorrectSearch<T> {
    fn size(&self) -> usize {
        self.correct.size()
    }

    fn contains(&self, element: &T) -> bool {
        self.correct.contains(element)
    }

    fn nearest_neighbors_into<'a>(
        &'a self,
        point: &T,
        n: usize,
        ignore: Ignore<'_, T>,
        current: &mut Vec<Neighbor<'a, T>>,
    ) -> Result<()> {
        self.correct
            .nearest_neighbors_into(point, n, ignore, current)
    }

    fn within_radius_into<'a>(
        &'a self,
        point: &T,
        r: f64,
        ignore: Ignore<'_, T>,
        current: &mut Vec<Neighbor<'a, T>>,
    ) -> Result<()> {
        self.correct.within_radius_into(point, r, ignore, current)
    }

    fn nearest_neighbors(
        &self,
        point: &T,
        n: usize,
        ignore: Ignore<'_, T>,
    ) -> Result<Vec<Neighbor<'_, T>>> {
        let mut results = self.correct.nearest_neighbors(point, n, ignore)?;
        self.spoil(&mut results);
        Ok(results)
    }

    fn within_radius(
        &self,
        point: &T,
        r: f64,
        ignore: Ignore<'_, T>,
    ) -> Result<Vec<Neighbor<'_, T>>> {
        let mut results = self.correct.within_radius(point, r, ignore)?;
        self.spoil(&mut results);
        Ok(results)
    }
}
