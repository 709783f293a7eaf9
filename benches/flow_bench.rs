//! Flow tracker benchmarks over synthetic trees

use criterion::{criterion_group, criterion_main, BatchSize, Criterion};
use leakflow::uast::{DeclKind, Declaration, Location, NodeId, NodeKind, UastTree};
use leakflow::FlowTracker;

fn name(tree: &mut UastTree, identifier: &str) -> NodeId {
    tree.push(
        NodeKind::Name {
            identifier: identifier.to_string(),
        },
        Location::default(),
    )
}

fn method_call(tree: &mut UastTree, receiver: NodeId, method: &str) -> NodeId {
    let call = tree.push(
        NodeKind::Call {
            name: method.to_string(),
            receiver: Some(receiver),
            args: vec![],
        },
        Location::default(),
    );
    tree.push(
        NodeKind::Qualified {
            receiver,
            selector: call,
        },
        Location::default(),
    )
}

/// A method body with one tracked allocation and `touches` follow-up calls
/// through an alias variable
fn alias_heavy_tree(touches: usize) -> (UastTree, NodeId, NodeId) {
    let mut tree = UastTree::new();
    let db = name(&mut tree, "db");
    let query = method_call(&mut tree, db, "query");
    let decl = tree.add_decl(Declaration {
        name: "c".to_string(),
        kind: DeclKind::Local,
        alt: None,
        synthetic: false,
    });
    let var = tree.push(
        NodeKind::LocalVariable {
            decl,
            initializer: Some(query),
        },
        Location::default(),
    );

    let mut statements = vec![var];
    for _ in 0..touches {
        let reference = name(&mut tree, "c");
        tree.bind(reference, decl);
        statements.push(method_call(&mut tree, reference, "moveToNext"));
    }
    let body = tree.push(NodeKind::Block { statements }, Location::default());
    tree.finish();
    (tree, body, query)
}

/// A single fluent chain of `length` self-returning calls
fn fluent_chain_tree(length: usize) -> (UastTree, NodeId, NodeId) {
    let mut tree = UastTree::new();
    let base = name(&mut tree, "txn");
    let begin = tree.push(
        NodeKind::Call {
            name: "beginTransaction".to_string(),
            receiver: Some(base),
            args: vec![],
        },
        Location::default(),
    );
    let mut current = tree.push(
        NodeKind::Qualified {
            receiver: base,
            selector: begin,
        },
        Location::default(),
    );
    for _ in 0..length {
        current = method_call(&mut tree, current, "add");
    }
    let body = tree.push(
        NodeKind::Block {
            statements: vec![current],
        },
        Location::default(),
    );
    tree.finish();
    (tree, body, begin)
}

fn bench_alias_tracking(c: &mut Criterion) {
    let (tree, body, seed) = alias_heavy_tree(200);
    c.bench_function("alias_200_touches", |b| {
        b.iter_batched(
            || FlowTracker::new(&tree, &[seed]),
            |tracker| tracker.analyze(body),
            BatchSize::SmallInput,
        )
    });
}

fn bench_fluent_chain(c: &mut Criterion) {
    let (tree, body, seed) = fluent_chain_tree(200);
    c.bench_function("fluent_chain_200", |b| {
        b.iter_batched(
            || FlowTracker::new(&tree, &[seed]).with_self_returning(["add"]),
            |tracker| tracker.analyze(body),
            BatchSize::SmallInput,
        )
    });
}

criterion_group!(benches, bench_alias_tracking, bench_fluent_chain);
criterion_main!(benches);
