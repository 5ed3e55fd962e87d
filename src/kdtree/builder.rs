use log::{debug, warn};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::dimension::{check_dimensions, Dimensional};
use crate::error::{KDTreeError, Result};
use crate::kdtree::constants::{MAX_COUNT, RANDOM_MEDIAN};
use crate::kdtree::{KDLeaf, KDNode, KDTree, KDVertex};

/// A builder to create a [`KDTree`].
///
/// ```
/// use kdtree_index::dimension::Point;
/// use kdtree_index::kdtree::{KDTreeBuilder, KDTreeIndex};
///
/// let mut builder = KDTreeBuilder::with_capacity(3);
/// builder.add(Point::from([0., 0.]));
/// builder.add(Point::from([1., 1.]));
/// builder.add(Point::from([2., 2.]));
/// let tree = builder.seed(7).finish().unwrap();
/// assert_eq!(tree.size(), 3);
/// ```
#[derive(Debug, Clone)]
pub struct KDTreeBuilder<T> {
    elements: Vec<T>,
    axis: usize,
    bounds: Option<(Vec<f64>, Vec<f64>)>,
    seed: Option<u64>,
}

impl<T: Dimensional> KDTreeBuilder<T> {
    /// Create a new builder over the provided elements.
    pub fn new(elements: Vec<T>) -> Self {
        Self {
            elements,
            axis: 0,
            bounds: None,
            seed: None,
        }
    }

    /// Create an empty builder with room for `num_items` elements.
    pub fn with_capacity(num_items: usize) -> Self {
        Self::new(Vec::with_capacity(num_items))
    }

    /// Add an element to the index, returning its insertion index.
    pub fn add(&mut self, element: T) -> usize {
        self.elements.push(element);
        self.elements.len() - 1
    }

    /// Split the root on coordinate `axis`. Defaults to 0.
    pub fn axis(mut self, axis: usize) -> Self {
        self.axis = axis;
        self
    }

    /// Declare the extent of the coordinate space, one `[min, max]` per coordinate.
    ///
    /// Queries use the extent to reach subtrees across the edge of a bounded space, which
    /// matters for coordinates that wrap around. Every element must lie inside the bounds.
    pub fn bounds(mut self, min: Vec<f64>, max: Vec<f64>) -> Self {
        self.bounds = Some((min, max));
        self
    }

    /// Seed the generator used to sample medians, making the tree shape reproducible.
    pub fn seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Consume this builder, building the tree on the current thread.
    pub fn finish(self) -> Result<KDTree<T>> {
        let num_dimensions = self.validate()?;
        let space = self.space(num_dimensions);
        let mut rng = self.rng();
        let num_items = self.elements.len();

        let root = build_vertex(self.elements, self.axis, space, UNBOUNDED, 0, &mut rng)?;
        debug!(
            "Built k-d tree over {} elements with {} dimensions",
            num_items, num_dimensions
        );

        Ok(KDTree {
            root,
            num_dimensions,
        })
    }

    /// Consume this builder, building the tree with concurrent subtree builds.
    ///
    /// The first `parallel_depth` levels below the root are built on the current thread; at
    /// that depth the two subtrees of every node are built concurrently, so at most about
    /// `2^(parallel_depth + 1)` builds run at once. Each concurrent build owns its partition
    /// and a generator seeded from this builder's, so a seeded build is reproducible.
    ///
    /// Without the `rayon` feature this builds on the current thread.
    pub fn finish_parallel(self, parallel_depth: usize) -> Result<KDTree<T>>
    where
        T: Send,
    {
        let num_dimensions = self.validate()?;
        let space = self.space(num_dimensions);
        let mut rng = self.rng();
        let num_items = self.elements.len();

        #[cfg(feature = "rayon")]
        let root = build_vertex_parallel(
            self.elements,
            self.axis,
            space,
            UNBOUNDED,
            0,
            parallel_depth,
            &mut rng,
        )?;

        #[cfg(not(feature = "rayon"))]
        let root = build_vertex(self.elements, self.axis, space, UNBOUNDED, 0, &mut rng)?;

        debug!(
            "Built k-d tree over {} elements with {} dimensions (parallel depth {})",
            num_items, num_dimensions, parallel_depth
        );

        Ok(KDTree {
            root,
            num_dimensions,
        })
    }

    /// Check the elements, axis and bounds, returning the shared dimension count.
    fn validate(&self) -> Result<usize> {
        let first = self.elements.first().ok_or(KDTreeError::EmptyInput)?;
        let num_dimensions = first.num_dimensions();
        if num_dimensions == 0 {
            return Err(KDTreeError::General(
                "Elements must have at least one coordinate".to_string(),
            ));
        }
        for element in self.elements.iter() {
            check_dimensions(num_dimensions, element.num_dimensions())?;
        }
        if self.axis >= num_dimensions {
            return Err(KDTreeError::CoordinateOutOfRange {
                index: self.axis,
                dimensions: num_dimensions,
            });
        }

        if let Some((min, max)) = &self.bounds {
            if min.len() != num_dimensions || max.len() != num_dimensions {
                return Err(KDTreeError::InvalidBounds(format!(
                    "expected {} values per bound, got {} and {}",
                    num_dimensions,
                    min.len(),
                    max.len()
                )));
            }
            for axis in 0..num_dimensions {
                if !(min[axis] <= max[axis]) {
                    return Err(KDTreeError::InvalidBounds(format!(
                        "min {} exceeds max {} on coordinate {}",
                        min[axis], max[axis], axis
                    )));
                }
                for element in self.elements.iter() {
                    let c = element.coordinate(axis)?;
                    if c < min[axis] || c > max[axis] {
                        return Err(KDTreeError::InvalidBounds(format!(
                            "element {:?} lies outside [{}, {}] on coordinate {}",
                            element, min[axis], max[axis], axis
                        )));
                    }
                }
            }
        }

        Ok(num_dimensions)
    }

    fn space(&self, num_dimensions: usize) -> Space {
        match &self.bounds {
            Some((min, max)) => Space {
                lo: min.clone(),
                hi: max.clone(),
            },
            None => Space {
                lo: vec![f64::NEG_INFINITY; num_dimensions],
                hi: vec![f64::INFINITY; num_dimensions],
            },
        }
    }

    fn rng(&self) -> StdRng {
        match self.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        }
    }
}

/// Range of the root, which has no parent coordinate.
const UNBOUNDED: (f64, f64) = (f64::NEG_INFINITY, f64::INFINITY);

/// The box of coordinate values reachable below a vertex, one `[lo, hi]` per coordinate.
#[derive(Debug, Clone)]
struct Space {
    lo: Vec<f64>,
    hi: Vec<f64>,
}

impl Space {
    fn split(self, axis: usize, split: f64) -> (Space, Space) {
        let mut left = self.clone();
        left.hi[axis] = split;
        let mut right = self;
        right.lo[axis] = split;
        (left, right)
    }
}

/// How a partition is divided by one node.
struct SplitPlan<T> {
    split: f64,
    left: Vec<T>,
    right: Vec<T>,
    /// Consecutive levels, including this one, whose elements all shared the split coordinate.
    stalled: usize,
}

enum Step<T> {
    Split(SplitPlan<T>),
    /// The elements are coincident and no split can separate them.
    Coincident(Vec<T>),
}

fn leaf<T>(elements: Vec<T>, (min, max): (f64, f64)) -> KDVertex<T> {
    KDVertex::Leaf(KDLeaf {
        elements,
        min,
        max,
    })
}

fn coincident_leaf<T>(elements: Vec<T>, range: (f64, f64)) -> KDVertex<T> {
    warn!(
        "Storing {} coincident elements in one leaf (more than {})",
        elements.len(),
        MAX_COUNT
    );
    leaf(elements, range)
}

fn build_vertex<T: Dimensional, R: Rng>(
    elements: Vec<T>,
    axis: usize,
    space: Space,
    range: (f64, f64),
    stalled: usize,
    rng: &mut R,
) -> Result<KDVertex<T>> {
    if elements.len() <= MAX_COUNT {
        return Ok(leaf(elements, range));
    }

    let num_dimensions = space.lo.len();
    let plan = match plan_split(elements, axis, num_dimensions, stalled, rng)? {
        Step::Split(plan) => plan,
        Step::Coincident(elements) => return Ok(coincident_leaf(elements, range)),
    };

    let next_axis = (axis + 1) % num_dimensions;
    let left_range = (space.lo[axis], plan.split);
    let right_range = (plan.split, space.hi[axis]);
    let (left_space, right_space) = space.split(axis, plan.split);

    let left = build_vertex(plan.left, next_axis, left_space, left_range, plan.stalled, rng)?;
    let right = build_vertex(
        plan.right,
        next_axis,
        right_space,
        right_range,
        plan.stalled,
        rng,
    )?;

    Ok(KDVertex::Node(KDNode {
        axis,
        split: plan.split,
        min: range.0,
        max: range.1,
        left: Box::new(left),
        right: Box::new(right),
    }))
}

#[cfg(feature = "rayon")]
fn build_vertex_parallel<T: Dimensional + Send>(
    elements: Vec<T>,
    axis: usize,
    space: Space,
    range: (f64, f64),
    stalled: usize,
    parallel_depth: usize,
    rng: &mut StdRng,
) -> Result<KDVertex<T>> {
    if elements.len() <= MAX_COUNT {
        return Ok(leaf(elements, range));
    }

    let num_dimensions = space.lo.len();
    let plan = match plan_split(elements, axis, num_dimensions, stalled, rng)? {
        Step::Split(plan) => plan,
        Step::Coincident(elements) => return Ok(coincident_leaf(elements, range)),
    };

    let next_axis = (axis + 1) % num_dimensions;
    let left_range = (space.lo[axis], plan.split);
    let right_range = (plan.split, space.hi[axis]);
    let (left_space, right_space) = space.split(axis, plan.split);
    let stalled = plan.stalled;

    let (left, right) = if parallel_depth == 0 {
        let mut left_rng = StdRng::seed_from_u64(rng.gen());
        let mut right_rng = StdRng::seed_from_u64(rng.gen());
        log::trace!(
            "Building k-d subtrees of {} and {} elements concurrently",
            plan.left.len(),
            plan.right.len()
        );
        let (left_elements, right_elements) = (plan.left, plan.right);
        let (left, right) = rayon::join(
            move || {
                build_vertex(
                    left_elements,
                    next_axis,
                    left_space,
                    left_range,
                    stalled,
                    &mut left_rng,
                )
            },
            move || {
                build_vertex(
                    right_elements,
                    next_axis,
                    right_space,
                    right_range,
                    stalled,
                    &mut right_rng,
                )
            },
        );
        (left?, right?)
    } else {
        let left = build_vertex_parallel(
            plan.left,
            next_axis,
            left_space,
            left_range,
            stalled,
            parallel_depth - 1,
            rng,
        )?;
        let right = build_vertex_parallel(
            plan.right,
            next_axis,
            right_space,
            right_range,
            stalled,
            parallel_depth - 1,
            rng,
        )?;
        (left, right)
    };

    Ok(KDVertex::Node(KDNode {
        axis,
        split: plan.split,
        min: range.0,
        max: range.1,
        left: Box::new(left),
        right: Box::new(right),
    }))
}

/// Choose the split value on `axis` and partition the elements around it.
fn plan_split<T: Dimensional, R: Rng>(
    elements: Vec<T>,
    axis: usize,
    num_dimensions: usize,
    stalled: usize,
    rng: &mut R,
) -> Result<Step<T>> {
    let coords = elements
        .iter()
        .map(|element| element.coordinate(axis))
        .collect::<Result<Vec<f64>>>()?;
    let mut split = estimate_median(&coords, rng)?;

    let mut stalled = stalled;
    if coords.iter().all(|&c| !(c < split)) {
        // Everything would go right. Move the split up to the next distinct value so both
        // sides are non-empty; if there is none, every element shares this coordinate.
        match coords
            .iter()
            .copied()
            .filter(|&c| c > split)
            .min_by(f64::total_cmp)
        {
            Some(next) => {
                split = next;
                stalled = 0;
            }
            None => {
                stalled += 1;
                if stalled >= num_dimensions {
                    return Ok(Step::Coincident(elements));
                }
            }
        }
    } else {
        stalled = 0;
    }

    let mut left = Vec::with_capacity(elements.len() / 2 + 1);
    let mut right = Vec::with_capacity(elements.len() / 2 + 1);
    for (element, c) in elements.into_iter().zip(coords) {
        if c < split {
            left.push(element);
        } else {
            right.push(element);
        }
    }

    Ok(Step::Split(SplitPlan {
        split,
        left,
        right,
        stalled,
    }))
}

/// The median of `coords`, exact for at most [`RANDOM_MEDIAN`] values and otherwise estimated
/// from [`RANDOM_MEDIAN`] values drawn with replacement.
pub(crate) fn estimate_median<R: Rng>(coords: &[f64], rng: &mut R) -> Result<f64> {
    if coords.is_empty() {
        return Err(KDTreeError::EmptyInput);
    }

    let mut sample: Vec<f64> = if coords.len() <= RANDOM_MEDIAN {
        coords.to_vec()
    } else {
        (0..RANDOM_MEDIAN)
            .map(|_| coords[rng.gen_range(0..coords.len())])
            .collect()
    };
    let mid = sample.len() / 2;
    let (_, median, _) = sample.select_nth_unstable_by(mid, f64::total_cmp);
    Ok(*median)
}
