//! Field resolution benchmark
//!
//! Early tiers should stay in the sub-microsecond range; the similarity tier
//! scans every submission key and scales with submission size.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use sase_forms::{FieldConfig, FieldType, SubmissionData};
use sase_rules::{interpolate, FieldResolver};

fn contact_form(extra: usize) -> (Vec<FieldConfig>, SubmissionData) {
    let mut fields = vec![
        FieldConfig::new("f_email", "Work Email", FieldType::Email).with_stable_id("email"),
        FieldConfig::new("f_name", "Full Name", FieldType::Text).with_stable_id("name"),
        FieldConfig::new("f_budget", "Budget", FieldType::Number).with_mapping("projectBudget"),
    ];
    let mut data = SubmissionData::new()
        .with("f_email", "ada@example.com")
        .with("f_name", "Ada Lovelace")
        .with("f_budget", 5000);

    for i in 0..extra {
        let id = format!("field_{i}");
        fields.push(FieldConfig::new(id.clone(), format!("Question {i}"), FieldType::Text));
        data = data.with(id, format!("answer {i}"));
    }
    (fields, data)
}

fn tier_benchmark(c: &mut Criterion) {
    let (fields, data) = contact_form(20);
    let mut group = c.benchmark_group("resolve_tier");

    for (name, key) in [
        ("direct", "f_email"),
        ("stable_id", "email"),
        ("mapping", "projectBudget"),
        ("label", "Question 7"),
        ("similarity", "qzxv"),
    ] {
        group.bench_function(name, |b| {
            b.iter(|| {
                let resolver = FieldResolver::new(&fields, &data);
                black_box(resolver.resolve(black_box(key)))
            })
        });
    }

    group.finish();
}

fn memo_benchmark(c: &mut Criterion) {
    let (fields, data) = contact_form(20);
    let resolver = FieldResolver::new(&fields, &data);
    resolver.resolve("Question 7");

    c.bench_function("resolve_memoized", |b| {
        b.iter(|| black_box(resolver.resolve(black_box("Question 7"))))
    });
}

fn scaling_benchmark(c: &mut Criterion) {
    let mut group = c.benchmark_group("resolve_scaling");

    for size in [10, 100, 1000].iter() {
        let (fields, data) = contact_form(*size);
        group.bench_with_input(BenchmarkId::from_parameter(size), size, |b, _| {
            b.iter(|| {
                let resolver = FieldResolver::new(&fields, &data);
                black_box(resolver.resolve("unknownKey"))
            })
        });
    }

    group.finish();
}

fn interpolate_benchmark(c: &mut Criterion) {
    let (fields, data) = contact_form(20);
    c.bench_function("interpolate", |b| {
        b.iter(|| {
            black_box(interpolate(
                black_box("Hi {{name}}, we will reply to {{email}} about {{projectBudget}}."),
                &fields,
                &data,
            ))
        })
    });
}

criterion_group!(
    benches,
    tier_benchmark,
    memo_benchmark,
    scaling_benchmark,
    interpolate_benchmark
);
criterion_main!(benches);
