use std::ops::Range;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rstar::RTree;

use crate::dimension::{Dimensional, LatLng, Point, Star, TunnelLatLng};
use crate::geography::LatLngKDTree;
use crate::kdtree::{KDTree, KDTreeBuilder, KDTreeIndex};
use crate::oracle::KDTreeOracle;

fn init() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn random_points(n: usize, dims: usize, rng: &mut StdRng) -> Vec<Point> {
    (0..n)
        .map(|_| Point::new((0..dims).map(|_| rng.gen_range(-1000.0..1000.0))))
        .collect()
}

/// Points around Providence, RI.
fn regional_latlngs(n: usize, rng: &mut StdRng) -> Vec<LatLng> {
    (0..n)
        .map(|_| {
            LatLng::new(
                41.8 + rng.gen_range(-0.05..0.05),
                -71.4 + rng.gen_range(-0.05..0.05),
            )
        })
        .collect()
}

/// Points with longitudes in `lngs`, half of them in the polar bands above 60° north or south.
fn global_latlngs(n: usize, lngs: Range<f64>, rng: &mut StdRng) -> Vec<LatLng> {
    (0..n)
        .map(|i| {
            let lat = if i % 2 == 0 {
                rng.gen_range(-60.0..60.0)
            } else if rng.gen_bool(0.5) {
                rng.gen_range(60.0..89.9)
            } else {
                -rng.gen_range(60.0..89.9)
            };
            LatLng::new(lat, rng.gen_range(lngs.clone()))
        })
        .collect()
}

fn check_with_oracle<T: Dimensional, S: KDTreeIndex<T>>(
    subject: &S,
    elements: Vec<T>,
    seed: u64,
) {
    let mut oracle = KDTreeOracle::new(subject, elements).unwrap().with_seed(seed);
    if let Err(mismatch) = oracle.test_nearest_neighbors() {
        panic!("{}", mismatch);
    }
    if let Err(mismatch) = oracle.test_within_radius() {
        panic!("{}", mismatch);
    }
}

#[test]
fn points_match_linear_scan() {
    init();
    let mut rng = StdRng::seed_from_u64(1);
    for n in [1, 5, 10, 11, 20, 21, 100, 1000, 5000] {
        for dims in 1..=4 {
            let elements = random_points(n, dims, &mut rng);
            let axis = rng.gen_range(0..dims);
            let tree = KDTreeBuilder::new(elements.clone())
                .axis(axis)
                .seed(rng.gen())
                .finish()
                .unwrap();
            check_with_oracle(&tree, elements, rng.gen());
        }
    }
}

#[test]
fn duplicate_heavy_points_match_linear_scan() {
    init();
    let mut rng = StdRng::seed_from_u64(2);
    let elements: Vec<Point> = (0..2000)
        .map(|_| Point::from([rng.gen_range(0..6) as f64, rng.gen_range(0..4) as f64]))
        .collect();
    let tree = KDTreeBuilder::new(elements.clone())
        .seed(2)
        .finish()
        .unwrap();
    assert_eq!(tree.size(), 2000);
    check_with_oracle(&tree, elements, 2);
}

#[test]
fn stars_match_linear_scan() {
    init();
    let mut rng = StdRng::seed_from_u64(3);
    let stars: Vec<Star> = (0..3000)
        .map(|i| {
            Star::new(
                i,
                "",
                rng.gen_range(-10_000.0..10_000.0),
                rng.gen_range(-10_000.0..10_000.0),
                rng.gen_range(-10_000.0..10_000.0),
            )
        })
        .collect();
    let tree = KDTree::build(stars.clone(), 0).unwrap();
    check_with_oracle(&tree, stars, 3);
}

#[test]
fn parallel_builds_match_linear_scan() {
    init();
    let mut rng = StdRng::seed_from_u64(4);
    for depth in [0, 1, 2, 5] {
        let elements = random_points(4000, 3, &mut rng);
        let tree = KDTree::build_parallel(elements.clone(), 0, depth).unwrap();
        check_with_oracle(&tree, elements, depth as u64);
    }
}

#[test]
fn parallel_and_sequential_agree() {
    init();
    let mut rng = StdRng::seed_from_u64(5);
    for n in [20, 3000] {
        let elements = random_points(n, 2, &mut rng);
        let sequential = KDTree::build(elements.clone(), 1).unwrap();
        let parallel = KDTree::build_parallel(elements, 1, 1).unwrap();

        for _ in 0..100 {
            let query = Point::from([
                rng.gen_range(-1000.0..1000.0),
                rng.gen_range(-1000.0..1000.0),
            ]);
            let k = rng.gen_range(1..25);
            let a = sequential.nearest_neighbors(&query, k, None).unwrap();
            let b = parallel.nearest_neighbors(&query, k, None).unwrap();
            let a: Vec<f64> = a.iter().map(|n| n.distance).collect();
            let b: Vec<f64> = b.iter().map(|n| n.distance).collect();
            assert_eq!(a, b);

            let r = rng.gen_range(0.0..300.0);
            let mut a: Vec<&Point> = sequential
                .within_radius(&query, r, None)
                .unwrap()
                .into_iter()
                .map(|n| n.element)
                .collect();
            let mut b: Vec<&Point> = parallel
                .within_radius(&query, r, None)
                .unwrap()
                .into_iter()
                .map(|n| n.element)
                .collect();
            a.sort_by(|x, y| x.coords()[0].total_cmp(&y.coords()[0]));
            b.sort_by(|x, y| x.coords()[0].total_cmp(&y.coords()[0]));
            assert_eq!(a, b);
        }
    }
}

#[test]
fn regional_latlngs_match_linear_scan() {
    init();
    let mut rng = StdRng::seed_from_u64(6);
    let elements = regional_latlngs(2000, &mut rng);

    let tree = KDTree::build(elements.clone(), 0).unwrap();
    check_with_oracle(&tree, elements.clone(), 6);

    let wrapped = LatLngKDTree::new(KDTree::build(elements.clone(), 1).unwrap());
    check_with_oracle(&wrapped, elements.clone(), 7);

    let tunnel: Vec<TunnelLatLng> = elements.into_iter().map(TunnelLatLng).collect();
    let wrapped = LatLngKDTree::new(KDTree::build(tunnel.clone(), 0).unwrap());
    check_with_oracle(&wrapped, tunnel, 8);
}

#[test]
fn hemisphere_latlngs_match_linear_scan() {
    init();
    // no shortest path between two of these crosses the ±180° seam
    let mut rng = StdRng::seed_from_u64(10);
    for axis in [0, 1] {
        let elements = global_latlngs(2000, -89.9..89.9, &mut rng);
        let tree = KDTreeBuilder::new(elements.clone())
            .axis(axis)
            .seed(rng.gen())
            .finish()
            .unwrap();
        check_with_oracle(&tree, elements.clone(), rng.gen());

        let tunnel: Vec<TunnelLatLng> = elements.into_iter().map(TunnelLatLng).collect();
        let tree = KDTreeBuilder::new(tunnel.clone())
            .axis(axis)
            .seed(rng.gen())
            .finish()
            .unwrap();
        check_with_oracle(&tree, tunnel, rng.gen());
    }
}

#[test]
fn global_latlngs_match_linear_scan() {
    init();
    let mut rng = StdRng::seed_from_u64(11);
    for axis in [0, 1] {
        let elements = global_latlngs(2000, -180.0..180.0, &mut rng);
        let wrapped = LatLngKDTree::new(
            KDTreeBuilder::new(elements.clone())
                .axis(axis)
                .seed(rng.gen())
                .finish()
                .unwrap(),
        );
        check_with_oracle(&wrapped, elements.clone(), rng.gen());

        let tunnel: Vec<TunnelLatLng> = elements.into_iter().map(TunnelLatLng).collect();
        let wrapped = LatLngKDTree::new(
            KDTreeBuilder::new(tunnel.clone())
                .axis(axis)
                .seed(rng.gen())
                .finish()
                .unwrap(),
        );
        check_with_oracle(&wrapped, tunnel, rng.gen());
    }
}

#[test]
fn polar_latlngs_match_linear_scan() {
    init();
    let mut rng = StdRng::seed_from_u64(12);
    let elements: Vec<LatLng> = (0..1000)
        .map(|_| LatLng::new(rng.gen_range(75.0..89.9), rng.gen_range(-180.0..180.0)))
        .collect();
    let wrapped = LatLngKDTree::new(KDTree::build(elements.clone(), 1).unwrap());
    check_with_oracle(&wrapped, elements, 12);
}

#[test]
fn nearest_neighbors_agree_with_rstar() {
    init();
    let mut rng = StdRng::seed_from_u64(9);
    let coords: Vec<[f64; 2]> = (0..10_000)
        .map(|_| [rng.gen_range(-180.0..180.0), rng.gen_range(-90.0..90.0)])
        .collect();
    let rstar_tree = RTree::bulk_load(coords.clone());
    let tree = KDTreeBuilder::new(coords.iter().map(|c| Point::from(*c)).collect())
        .seed(9)
        .finish()
        .unwrap();

    for _ in 0..200 {
        let q = [rng.gen_range(-180.0..180.0), rng.gen_range(-90.0..90.0)];
        let query = Point::from(q);

        let expected: Vec<f64> = rstar_tree
            .nearest_neighbor_iter(&q)
            .take(10)
            .map(|c| Point::from(*c).distance_to(&query).unwrap())
            .collect();
        let found: Vec<f64> = tree
            .nearest_neighbors(&query, 10, None)
            .unwrap()
            .iter()
            .map(|n| n.distance)
            .collect();
        assert_eq!(found, expected);

        let r: f64 = rng.gen_range(0.0..5.0);
        let expected = rstar_tree.locate_within_distance(q, r * r).count();
        let found = tree.within_radius(&query, r, None).unwrap().len();
        // squared and rooted distances can disagree on the boundary
        assert!((found as i64 - expected as i64).abs() <= 1);
    }
}
