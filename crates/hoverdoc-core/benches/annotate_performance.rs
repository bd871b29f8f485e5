//! Benchmarks for the per-block pipeline

use criterion::{BenchmarkId, Criterion, Throughput, criterion_group, criterion_main};
use hoverdoc_core::highlight::{Highlighter, RegexHighlighter};
use hoverdoc_core::{CodeBlockPipeline, KnowledgeBase, Tokenizer, annotate, payload};
use std::hint::black_box;

// TypeScript-ish block that references a handful of built-in types
fn create_block(lines: usize) -> String {
    let templates = [
        "const cache: Map<string, Promise<number>> = new Map();",
        "function load(ids: Array<string>): Promise<Record<string, unknown>> {",
        "  return Promise.all(ids.map((id) => fetchOne(id)));",
        "}",
        "type Options = Partial<Readonly<Settings>>;",
        "// plain comment mentioning Map and Promise",
    ];
    (0..lines)
        .map(|i| templates[i % templates.len()])
        .collect::<Vec<_>>()
        .join("\n")
}

fn bench_annotate(c: &mut Criterion) {
    let mut group = c.benchmark_group("annotate");
    let kb = KnowledgeBase::builtin();
    let tokenizer = Tokenizer::new();
    let highlighter = RegexHighlighter::new();

    for lines in [10usize, 100, 1000] {
        let source = create_block(lines);
        let output = tokenizer.tokenize(&source, "ts");
        let payloads = payload::build(&output.tokens, &output.diagnostics, &kb);
        let Ok(html) = highlighter.highlight(&source, "ts") else {
            continue;
        };

        group.throughput(Throughput::Bytes(html.len() as u64));
        group.bench_with_input(BenchmarkId::from_parameter(lines), &html, |b, html| {
            b.iter(|| annotate::annotate(black_box(html), black_box(&payloads)));
        });
    }

    group.finish();
}

fn bench_full_block(c: &mut Criterion) {
    let mut group = c.benchmark_group("render_block");
    let pipeline = CodeBlockPipeline::new(KnowledgeBase::builtin());

    for lines in [10usize, 100] {
        let source = create_block(lines);
        group.throughput(Throughput::Bytes(source.len() as u64));
        group.bench_with_input(BenchmarkId::from_parameter(lines), &source, |b, source| {
            b.iter(|| pipeline.render_annotated(black_box(source), "ts"));
        });
    }

    group.finish();
}

criterion_group!(benches, bench_annotate, bench_full_block);
criterion_main!(benches);
