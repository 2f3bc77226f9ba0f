use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};

use bstmap::{AvlTree, OrderedMap, RbTree, SplayTree};

enum TreeEnum {
    Avl(AvlTree<i32, i32>),
    Rb(RbTree<i32, i32>),
    Splay(SplayTree<i32, i32>),
}

impl TreeEnum {
    fn find(&mut self, k: &i32) -> Option<&i32> {
        match self {
            Self::Avl(t) => t.find(k),
            Self::Rb(t) => t.find(k),
            Self::Splay(t) => t.find(k),
        }
    }
}

/// Builds a tree by inserting values in an unbalanced manner. This adds
/// elements in an ascending manner to ensure the tree would be unbalanced
/// if the strategy didn't rebalance, so every rebalancing case fires.
fn build<T: OrderedMap<i32, i32> + Default>(num_nodes: usize) -> T {
    let mut tree = T::default();
    for x in 0..num_nodes as i32 {
        tree.insert(x, x);
    }
    tree
}

/// Helper to bench a function on a BST.
/// It creates a group for the given name and closure and runs tests for
/// various sizes and balancing strategies before finishing the group.
fn bench_helper(c: &mut Criterion, name: &str, f: impl Fn(&mut TreeEnum, i32)) {
    let mut group = c.benchmark_group(name);

    for num_levels in [3, 7, 11, 15] {
        let num_nodes = 2usize.pow(num_levels as u32) - 1;
        let largest_element_in_tree = num_nodes as i32 - 1;

        let tree_tests = [
            ("avl", TreeEnum::Avl(build(num_nodes))),
            ("redblack", TreeEnum::Rb(build(num_nodes))),
            ("splay", TreeEnum::Splay(build(num_nodes))),
        ];
        for (name, mut tree) in tree_tests {
            let id = BenchmarkId::new(name, largest_element_in_tree);

            group.bench_function(id, |b| {
                b.iter(|| f(&mut tree, black_box(largest_element_in_tree)))
            });
        }
    }

    group.finish();
}

pub fn criterion_benchmark(c: &mut Criterion) {
    bench_helper(c, "find", |tree, i| {
        let _value = black_box(tree.find(&i));
    });
    bench_helper(c, "find-miss", |tree, i| {
        let _value = black_box(tree.find(&(i + 1)));
    });

    let mut group = c.benchmark_group("build");
    for num_levels in [3, 7, 11] {
        let num_nodes = 2usize.pow(num_levels as u32) - 1;

        group.bench_function(BenchmarkId::new("avl", num_nodes), |b| {
            b.iter(|| build::<AvlTree<i32, i32>>(black_box(num_nodes)))
        });
        group.bench_function(BenchmarkId::new("redblack", num_nodes), |b| {
            b.iter(|| build::<RbTree<i32, i32>>(black_box(num_nodes)))
        });
        group.bench_function(BenchmarkId::new("splay", num_nodes), |b| {
            b.iter(|| build::<SplayTree<i32, i32>>(black_box(num_nodes)))
        });
    }
    group.finish();
}

criterion_group!(benches, criterion_benchmark);
criterion_main!(benches);
