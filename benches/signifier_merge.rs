//! Benchmarks for context subsumption and signifier merging.

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use oxigraph::model::NamedNode;

use cashmere::constraint::context::Context;
use cashmere::constraint::{Constraint, Operator, Threshold};
use cashmere::signifier::SignifierStore;

const LAMP: &str = "http://localhost:8080/workspaces/lab308/artifacts/lamp1";

fn context(dimensions: usize, threshold: f64) -> Context {
    (0..dimensions)
        .map(|d| {
            Constraint::new(
                LAMP,
                format!("property{d}"),
                Operator::LessThan,
                Threshold::Number(threshold + d as f64),
            )
        })
        .collect()
}

fn bench_subsumption(c: &mut Criterion) {
    let a = context(16, 100.0);
    let b = context(16, 200.0);

    c.bench_function("context_subsumes_16", |bench| {
        bench.iter(|| black_box(a.subsumes(black_box(&b))))
    });
}

fn bench_merge_incomparable(c: &mut Criterion) {
    let action = NamedNode::new(format!("{LAMP}#toggle")).unwrap();

    c.bench_function("merge_64_incomparable_contexts", |bench| {
        bench.iter(|| {
            let store = SignifierStore::new("http://localhost:8080/signifiers/");
            let iri = store.iri_for("toggle-lamp1-signifier").unwrap();
            for i in 0..64 {
                let ctx: Context = [Constraint::new(
                    LAMP,
                    format!("property{i}"),
                    Operator::GreaterThan,
                    Threshold::Number(1.0),
                )]
                .into_iter()
                .collect();
                store.merge(&iri, &action, "toggle", ctx).unwrap();
            }
            black_box(store.len())
        })
    });
}

fn bench_merge_replacing(c: &mut Criterion) {
    let action = NamedNode::new(format!("{LAMP}#setLightIntensity")).unwrap();
    let store = SignifierStore::new("http://localhost:8080/signifiers/");
    let iri = store.iri_for("setLightIntensity-lamp1-signifier").unwrap();
    let mut threshold = 0.0;

    c.bench_function("merge_replacing_context", |bench| {
        bench.iter(|| {
            threshold += 1.0;
            store
                .merge(&iri, &action, "brighten", context(4, threshold))
                .unwrap()
        })
    });
}

criterion_group!(
    benches,
    bench_subsumption,
    bench_merge_incomparable,
    bench_merge_replacing
);
criterion_main!(benches);
