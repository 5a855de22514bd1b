//! Intent Matching Performance Benchmarks
//!
//! Measures the per-request work done before a statement reaches the
//! database:
//! - Rule evaluation over prompts that hit early, late or no rules
//! - Statement building for each shape
//! - Role inference over a wide table

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use tablecast::{build, infer_roles, match_intent, ColumnDescriptor, TableDescriptor};

fn wide_table(width: usize) -> TableDescriptor {
    let mut columns = vec![
        ColumnDescriptor::new("id", "integer", Some("nextval('profiles_id_seq'::regclass)")),
        ColumnDescriptor::new("display_name", "character varying", None),
    ];
    columns.extend((0..width).map(|i| ColumnDescriptor::new(format!("attr_{i}"), "text", None)));
    columns.push(ColumnDescriptor::new("follower_count", "integer", None));
    columns.push(ColumnDescriptor::new("location", "text", None));
    infer_roles(TableDescriptor::new("profiles", columns))
}

fn bench_match_intent(c: &mut Criterion) {
    let table = wide_table(40);
    let mut group = c.benchmark_group("match_intent");

    for (label, prompt) in [
        ("name", "creators with name Alex"),
        ("top", "top creators"),
        ("filter_late", "creators by location Lisbon"),
        ("no_match", "show me everything you have about creators"),
    ] {
        group.bench_function(label, |b| {
            b.iter(|| match_intent(black_box(&table), black_box(prompt)));
        });
    }

    group.finish();
}

fn bench_build(c: &mut Criterion) {
    let table = wide_table(40);
    let mut group = c.benchmark_group("build");

    for (label, prompt) in [("default", ""), ("top", "top"), ("filter", "location Lisbon")] {
        let intent = match_intent(&table, prompt);
        group.bench_function(label, |b| {
            b.iter(|| build(black_box(&table), black_box(&intent)));
        });
    }

    group.finish();
}

fn bench_infer_roles(c: &mut Criterion) {
    let table = wide_table(200);
    c.bench_function("infer_roles_wide", |b| {
        b.iter(|| infer_roles(black_box(table.clone())));
    });
}

criterion_group!(benches, bench_match_intent, bench_build, bench_infer_roles);
criterion_main!(benches);
