//! Benchmarks for normalizing and compiling filter options.
//!
//! Run with: cargo bench -p querysieve

use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use querysieve::{FilterCompiler, FilterConfiguration, is_valid_field_reference, postgres, sqlite};
use serde_json::{Value as JsonValue, json};
use std::hint::black_box;

fn wide_filters(n: usize) -> JsonValue {
    let filters: serde_json::Map<String, JsonValue> =
        (0..n).map(|i| (format!("field_{i}"), json!(i))).collect();
    json!({"items": 50, "page": 4, "filters": filters})
}

// =============================================================================
// Field Validation Benchmarks
// =============================================================================

fn bench_field_validation(c: &mut Criterion) {
    let mut group = c.benchmark_group("field_validation");

    let fields = [
        ("bare", "id"),
        ("qualified", "author.created_at"),
        ("invalid", "id; DROP TABLE users--"),
    ];

    for (name, field) in fields {
        group.bench_with_input(BenchmarkId::new("field_reference", name), field, |b, s| {
            b.iter(|| is_valid_field_reference(black_box(s)))
        });
    }

    group.finish();
}

// =============================================================================
// Normalization Benchmarks
// =============================================================================

fn bench_normalize(c: &mut Criterion) {
    let mut group = c.benchmark_group("normalize");

    let typical = json!({
        "items": 25,
        "page": 2,
        "order": [{"by": "created_at", "dir": "desc"}, {"by": "id"}],
        "filters": {"status": ["draft", "review"], "author": {"id": 7}, "title": "rust"},
        "operators": {"status": "in", "title": "like"},
    });
    group.bench_function("typical", |b| {
        b.iter(|| FilterConfiguration::normalize(black_box(&typical)))
    });

    for n in [10, 100] {
        let raw = wide_filters(n);
        group.bench_with_input(BenchmarkId::new("wide_filters", n), &raw, |b, raw| {
            b.iter(|| FilterConfiguration::normalize(black_box(raw)))
        });
    }

    group.finish();
}

// =============================================================================
// Compilation Benchmarks
// =============================================================================

fn bench_compile(c: &mut Criterion) {
    let mut group = c.benchmark_group("compile");

    let config = FilterConfiguration::normalize(&json!({
        "items": 25,
        "page": 2,
        "order": [{"by": "created_at", "dir": "desc"}],
        "filters": {"status": ["draft", "review"], "price": [10, 20], "title": "rust"},
        "operators": {"status": "in", "price": "between", "title": "like"},
    }))
    .unwrap();

    group.bench_function("build_postgres", |b| {
        b.iter(|| {
            FilterCompiler::new(postgres("posts", "post").unwrap(), black_box(&config))
                .build()
                .unwrap()
        })
    });

    group.bench_function("build_and_render_sqlite", |b| {
        b.iter(|| {
            FilterCompiler::new(sqlite("posts", "post").unwrap(), black_box(&config))
                .build()
                .unwrap()
                .to_sql()
                .unwrap()
        })
    });

    let wide = FilterConfiguration::normalize(&wide_filters(100)).unwrap();
    group.bench_function("build_and_render_wide", |b| {
        b.iter(|| {
            FilterCompiler::new(postgres("items", "i").unwrap(), black_box(&wide))
                .build()
                .unwrap()
                .to_sql()
                .unwrap()
        })
    });

    group.finish();
}

criterion_group!(benches, bench_field_validation, bench_normalize, bench_compile);
criterion_main!(benches);
