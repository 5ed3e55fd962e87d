//! Differential testing for [`KDTreeIndex`] implementations.
//!
//! [`KDTreeOracle`] sends randomized queries to a subject index and to an
//! [`ExhaustiveSearch`] over the same elements, and compares the answers. Results may differ in
//! the order of elements at equal distance, but must agree on length and on the distance at every
//! rank. [`IncorrectSearch`] produces wrong answers on purpose, to show that the comparison
//! catches them.

mod exhaustive;
mod incorrect;

pub use exhaustive::ExhaustiveSearch;
pub use incorrect::{IncorrectSearch, Mutation};

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use thiserror::Error;

use crate::dimension::{Dimensional, Neighbor};
use crate::error::{KDTreeError, Result};
use crate::kdtree::{Ignore, KDTreeIndex};

/// Two distances closer than this are equal.
pub const EPSILON: f64 = 1e-6;

/// Queries generated per kind of query point (exact and inexact) in each test.
pub const NUM_INPUTS: usize = 25;

/// Probability that a generated query ignores elements equal to its query point.
pub const IGNORE_FREQ: f64 = 0.25;

/// The first way a subject's answer to a query differed from the reference answer.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum Mismatch {
    #[error("{query}: failed with {error}")]
    Failed { query: String, error: KDTreeError },

    #[error("{query}: expected {expected} results, got {found}")]
    Length {
        query: String,
        expected: usize,
        found: usize,
    },

    #[error("{query}: result {rank} is not an indexed element")]
    UnknownElement { query: String, rank: usize },

    #[error("{query}: result {rank} is at distance {found}, expected {expected}")]
    WrongRank {
        query: String,
        rank: usize,
        expected: f64,
        found: f64,
    },

    #[error("{query}: result {rank} reports distance {reported}, actual distance {actual}")]
    WrongDistance {
        query: String,
        rank: usize,
        reported: f64,
        actual: f64,
    },

    #[error("{query}: result {rank} should have been ignored")]
    Ignored { query: String, rank: usize },
}

/// Checks a subject index against a linear scan with randomly generated queries.
///
/// ```
/// use kdtree_index::dimension::Point;
/// use kdtree_index::kdtree::KDTree;
/// use kdtree_index::oracle::KDTreeOracle;
///
/// let points: Vec<Point> = (0..200).map(|i| Point::from([i as f64, (i * i % 37) as f64])).collect();
/// let tree = KDTree::build(points.clone(), 0).unwrap();
///
/// let mut oracle = KDTreeOracle::new(&tree, points).unwrap().with_seed(4);
/// assert!(oracle.test_nearest_neighbors().is_ok());
/// assert!(oracle.test_within_radius().is_ok());
/// ```
#[derive(Debug)]
pub struct KDTreeOracle<'s, T, S> {
    subject: &'s S,
    correct: ExhaustiveSearch<T>,
    rng: StdRng,
}

impl<'s, T: Dimensional, S: KDTreeIndex<T>> KDTreeOracle<'s, T, S> {
    /// Create an oracle testing `subject`, which must index exactly `elements`.
    pub fn new(subject: &'s S, elements: Vec<T>) -> Result<Self> {
        if elements.is_empty() {
            return Err(KDTreeError::EmptyInput);
        }
        Ok(Self {
            subject,
            correct: elements.into_iter().collect(),
            rng: StdRng::from_entropy(),
        })
    }

    /// Generate queries from a fixed seed.
    pub fn with_seed(self, seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
            ..self
        }
    }

    /// Test the subject with nearest neighbor queries from exact and inexact query points.
    pub fn test_nearest_neighbors(&mut self) -> std::result::Result<(), Mismatch> {
        for exact in [true, false] {
            for _ in 0..NUM_INPUTS {
                let query = self.generate_query(exact);
                let n = self.generate_n();
                let ignoring = self.generate_ignoring();
                let ignore_query = |e: &T| e == &query;
                let ignore: Ignore<'_, T> = if ignoring { Some(&ignore_query) } else { None };

                let description = format!(
                    "nearest_neighbors({:?}, n = {}, ignore query = {})",
                    query, n, ignoring
                );
                let found = self
                    .subject
                    .nearest_neighbors(&query, n, ignore)
                    .map_err(|error| Mismatch::Failed {
                        query: description.clone(),
                        error,
                    })?;
                let expected = self
                    .correct
                    .nearest_neighbors(&query, n, ignore)
                    .map_err(|error| Mismatch::Failed {
                        query: description.clone(),
                        error,
                    })?;
                self.check(&description, &query, ignore, &found, &expected)?;
            }
        }
        Ok(())
    }

    /// Test the subject with radius queries from exact and inexact query points.
    pub fn test_within_radius(&mut self) -> std::result::Result<(), Mismatch> {
        for exact in [true, false] {
            for _ in 0..NUM_INPUTS {
                let query = self.generate_query(exact);
                let description = format!("within_radius({:?})", query);
                let r = self.generate_r().map_err(|error| Mismatch::Failed {
                    query: description.clone(),
                    error,
                })?;
                let ignoring = self.generate_ignoring();
                let ignore_query = |e: &T| e == &query;
                let ignore: Ignore<'_, T> = if ignoring { Some(&ignore_query) } else { None };

                let description = format!(
                    "within_radius({:?}, r = {}, ignore query = {})",
                    query, r, ignoring
                );
                let found = self
                    .subject
                    .within_radius(&query, r, ignore)
                    .map_err(|error| Mismatch::Failed {
                        query: description.clone(),
                        error,
                    })?;
                let expected = self
                    .correct
                    .within_radius(&query, r, ignore)
                    .map_err(|error| Mismatch::Failed {
                        query: description.clone(),
                        error,
                    })?;
                self.check(&description, &query, ignore, &found, &expected)?;
            }
        }
        Ok(())
    }

    fn check(
        &self,
        description: &str,
        query: &T,
        ignore: Ignore<'_, T>,
        found: &[Neighbor<'_, T>],
        expected: &[Neighbor<'_, T>],
    ) -> std::result::Result<(), Mismatch> {
        if found.len() != expected.len() {
            return Err(Mismatch::Length {
                query: description.to_string(),
                expected: expected.len(),
                found: found.len(),
            });
        }

        for (rank, (f, e)) in found.iter().zip(expected).enumerate() {
            if !self.correct.contains(f.element) {
                return Err(Mismatch::UnknownElement {
                    query: description.to_string(),
                    rank,
                });
            }
            if ignore.is_some_and(|ignore| ignore(f.element)) {
                return Err(Mismatch::Ignored {
                    query: description.to_string(),
                    rank,
                });
            }
            if (f.distance - e.distance).abs() > EPSILON {
                return Err(Mismatch::WrongRank {
                    query: description.to_string(),
                    rank,
                    expected: e.distance,
                    found: f.distance,
                });
            }
            let actual = f
                .element
                .distance_to(query)
                .map_err(|error| Mismatch::Failed {
                    query: description.to_string(),
                    error,
                })?;
            // NaN distances fail too
            if !((actual - f.distance).abs() <= EPSILON) {
                return Err(Mismatch::WrongDistance {
                    query: description.to_string(),
                    rank,
                    reported: f.distance,
                    actual,
                });
            }
        }
        Ok(())
    }

    fn random_element(&mut self) -> &T {
        let elements = self.correct.elements();
        &elements[self.rng.gen_range(0..elements.len())]
    }

    /// An indexed element, or a random blend of two indexed elements.
    fn generate_query(&mut self, exact: bool) -> T {
        let e1 = self.random_element().clone();
        if exact {
            return e1;
        }
        let e2 = self.random_element().clone();

        let mut query = e1.clone();
        for i in 0..e1.num_dimensions() {
            let t: f64 = self.rng.gen();
            let (c1, c2) = match (e1.coordinate(i), e2.coordinate(i)) {
                (Ok(c1), Ok(c2)) => (c1, c2),
                _ => return e1,
            };
            query = match query.with_coordinate(i, t * c1 + (1. - t) * c2) {
                Ok(q) => q,
                Err(_) => return e1,
            };
        }
        query
    }

    fn generate_n(&mut self) -> usize {
        let len = self.correct.len();
        if len < 100 {
            self.rng.gen_range(1..=10)
        } else {
            self.rng.gen_range(1..=len / 10)
        }
    }

    fn generate_r(&mut self) -> Result<f64> {
        let e1 = self.random_element().clone();
        let e2 = self.random_element();
        let d = e1.distance_to(e2)?;
        Ok(d * self.rng.gen::<f64>() * 2.)
    }

    fn generate_ignoring(&mut self) -> bool {
        self.rng.gen_bool(IGNORE_FREQ)
    }
}
