use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use kdtree_index::dimension::{LatLng, Point};
use kdtree_index::geography::LatLngKDTree;
use kdtree_index::kdtree::{KDTree, KDTreeBuilder, KDTreeIndex};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rstar::RTree;

fn generate_points(n: usize) -> Vec<[f64; 2]> {
    let mut rng = StdRng::seed_from_u64(42);
    (0..n)
        .map(|_| [rng.gen_range(-180.0..180.0), rng.gen_range(-90.0..90.0)])
        .collect()
}

fn construct_kdtree(coords: &[[f64; 2]]) -> KDTree<Point> {
    let mut builder = KDTreeBuilder::with_capacity(coords.len());
    for c in coords {
        builder.add(Point::from(*c));
    }
    builder.seed(42).finish().unwrap()
}

fn construct_kdtree_parallel(coords: &[[f64; 2]], depth: usize) -> KDTree<Point> {
    let points = coords.iter().map(|c| Point::from(*c)).collect();
    KDTreeBuilder::new(points)
        .seed(42)
        .finish_parallel(depth)
        .unwrap()
}

pub fn construction(c: &mut Criterion) {
    let mut group = c.benchmark_group("construction");
    for n in [10_000, 100_000] {
        let coords = generate_points(n);
        group.bench_with_input(BenchmarkId::new("sequential", n), &coords, |b, coords| {
            b.iter(|| construct_kdtree(coords))
        });
        for depth in [0, 2, 4] {
            group.bench_with_input(
                BenchmarkId::new(format!("parallel (depth {depth})"), n),
                &coords,
                |b, coords| b.iter(|| construct_kdtree_parallel(coords, depth)),
            );
        }
        group.bench_with_input(BenchmarkId::new("rstar bulk", n), &coords, |b, coords| {
            b.iter(|| RTree::bulk_load(coords.to_vec()))
        });
    }
    group.finish();
}

pub fn queries(c: &mut Criterion) {
    let coords = generate_points(100_000);
    let tree = construct_kdtree(&coords);
    let rstar_tree = RTree::bulk_load(coords.clone());
    let queries = generate_points(1000);

    c.bench_function("nearest 10 (kdtree)", |b| {
        b.iter(|| {
            for q in queries.iter() {
                tree.nearest_neighbors(&Point::from(*q), 10, None).unwrap();
            }
        })
    });

    c.bench_function("nearest 10 (rstar)", |b| {
        b.iter(|| {
            for q in queries.iter() {
                rstar_tree.nearest_neighbor_iter(q).take(10).count();
            }
        })
    });

    c.bench_function("within 1.0 (kdtree)", |b| {
        b.iter(|| {
            for q in queries.iter() {
                tree.within_radius(&Point::from(*q), 1.0, None).unwrap();
            }
        })
    });

    c.bench_function("within 1.0 (rstar)", |b| {
        b.iter(|| {
            for q in queries.iter() {
                rstar_tree.locate_within_distance(*q, 1.0).count();
            }
        })
    });

    let places: Vec<LatLng> = coords.iter().map(|c| LatLng::new(c[1], c[0])).collect();
    let geo_tree = LatLngKDTree::new(KDTree::build(places, 0).unwrap());
    c.bench_function("nearest 10 (latlng, wrapped)", |b| {
        b.iter(|| {
            for q in queries.iter() {
                geo_tree
                    .nearest_neighbors(&LatLng::new(q[1], q[0]), 10, None)
                    .unwrap();
            }
        })
    });
}

criterion_group!(benches, construction, queries);
criterion_main!(benches);
