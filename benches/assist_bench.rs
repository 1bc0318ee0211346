//! Benchmarks for the per-keystroke work: rebuild, reparse, highlight, scope lookup

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use std::hint::black_box;
use tiny_kilo::{AssistEngine, Buffer, EngineConfig, Theme, Trie};

/// Generate a C file of roughly `lines` rows
fn generate_document(lines: usize) -> String {
    let mut doc = String::from("#include <stdio.h>\n\nint counter_total;\n");
    let mut i = 0;
    while doc.lines().count() < lines {
        doc.push_str(&format!(
            "int function_{i}(int value_{i}, char *name_{i}) {{\n    int local_{i} = value_{i} * {i};\n    // running total\n    counter_total += local_{i};\n    printf(\"%s %d\\n\", name_{i}, local_{i});\n    return local_{i};\n}}\n\n"
        ));
        i += 1;
    }
    doc
}

fn engine() -> AssistEngine {
    AssistEngine::with_parts(
        &EngineConfig::default(),
        Some(Trie::from_words(["continue", "const", "counter", "char", "case"])),
        Some(tree_sitter_c::HIGHLIGHT_QUERY),
        Theme::c(),
    )
}

/// Rebuild the mirror and reparse, as after every edit
fn bench_sync(c: &mut Criterion) {
    let mut group = c.benchmark_group("sync");

    for size in [100, 1000, 10000] {
        let buffer = Buffer::from_str(&generate_document(size));
        let mut engine = engine();

        group.bench_with_input(BenchmarkId::from_parameter(size), &size, |b, _| {
            b.iter(|| {
                engine.sync(black_box(&buffer)).unwrap();
            });
        });
    }
    group.finish();
}

/// Highlight one screen at the middle of the document
fn bench_visible_spans(c: &mut Criterion) {
    let mut group = c.benchmark_group("visible_spans");

    for size in [100, 1000, 10000] {
        let buffer = Buffer::from_str(&generate_document(size));
        let mut engine = engine();
        engine.sync(&buffer).unwrap();
        let first = size / 2;

        group.bench_with_input(BenchmarkId::from_parameter(size), &size, |b, _| {
            b.iter(|| black_box(engine.visible_spans(first, first + 50)));
        });
    }
    group.finish();
}

/// Scope-aware suggestions inside a function body
fn bench_suggestions(c: &mut Criterion) {
    let mut group = c.benchmark_group("suggestions");

    for size in [100, 1000, 10000] {
        let buffer = Buffer::from_str(&generate_document(size));
        let mut engine = engine();
        engine.sync(&buffer).unwrap();

        // "    counter_total += local_0;" on row 6, cursor after "co"
        group.bench_with_input(BenchmarkId::from_parameter(size), &size, |b, _| {
            b.iter(|| {
                engine.update(black_box("co"), 6, 6);
                black_box(engine.current_suggestions().len())
            });
        });
    }
    group.finish();
}

criterion_group!(benches, bench_sync, bench_visible_spans, bench_suggestions);
criterion_main!(benches);
