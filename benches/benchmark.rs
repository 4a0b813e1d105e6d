use criterion::{black_box, criterion_group, criterion_main, Criterion};
use rand::{rngs::StdRng, Rng, SeedableRng};

use avl_build::AvlTree;

const N: usize = 100_000;

pub fn benchmarks(c: &mut Criterion) {
    let mut rng = StdRng::seed_from_u64(0);
    let values: Vec<i32> = (1..=N).map(|_| rng.gen()).collect();

    c.bench_function("tree_insert", |b| {
        b.iter(|| {
            let mut tree = AvlTree::new();
            for value in &values {
                tree.insert(*value).unwrap();
            }
            tree
        })
    });

    let mut tree = AvlTree::new();
    for value in &values {
        tree.insert(*value).unwrap();
    }

    c.bench_function("tree_iter", |b| {
        b.iter(|| {
            for record in &tree {
                black_box(record);
            }
        })
    });

    c.bench_function("tree_traverse_to_depth", |b| {
        b.iter(|| {
            tree.traverse_to_depth(8, |record, depth| {
                black_box((record, depth));
            })
        })
    });
}

criterion_group!(benches, benchmarks);
criterion_main!(benches);
