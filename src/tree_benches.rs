extern crate test;
use self::test::Bencher;

use crate::Tree;

/// Children per inner node.
pub const FANOUT: usize = 8;

/// Levels below the root.
pub const DEPTH: usize = 4;

fn build() -> Tree<u64> {
    let mut tree = Tree::new();
    let root = tree.set_root(0);
    let mut level = vec![root];
    let mut value = 1;
    for _ in 0..DEPTH {
        let mut next = Vec::with_capacity(level.len() * FANOUT);
        for &parent in &level {
            for _ in 0..FANOUT {
                next.push(tree.append_child(parent, value));
                value += 1;
            }
        }
        level = next;
    }
    tree
}

// Benchmarks
#[bench]
fn bench_build(b: &mut Bencher) {
    b.iter(build);
}

#[bench]
fn bench_pre_order(b: &mut Bencher) {
    let tree = build();
    b.iter(|| tree.iter().sum::<u64>());
}

#[bench]
fn bench_post_order(b: &mut Bencher) {
    let tree = build();
    b.iter(|| tree.iter_post().sum::<u64>());
}

#[bench]
fn bench_cursor(b: &mut Bencher) {
    let tree = build();
    b.iter(||{
        let mut cursor = tree.root_cursor();
        let mut sum = 0;
        while let Some(value) = cursor.get() {
            sum += *value;
            cursor.next();
        }
        sum
    });
}

#[bench]
fn bench_values(b: &mut Bencher) {
    let tree = build();
    b.iter(|| tree.values().sum::<u64>());
}

#[bench]
fn bench_write(b: &mut Bencher) {
    let tree = build();
    b.iter(|| tree.to_string());
}

#[bench]
fn bench_parse(b: &mut Bencher) {
    let text = build().to_string();
    let mut tree = Tree::<u64>::new();
    b.iter(||{
        tree.parse(&text).map(|rest| rest.len())
    });
}

#[bench]
fn bench_remove_roots(b: &mut Bencher) {
    let tree = build();
    b.iter(||{
        let mut tree = tree.clone();
        while let Some(root) = tree.root() {
            tree.remove(root);
        }
    });
}
