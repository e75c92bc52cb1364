//! Criterion benchmarks for stemdex.
//!
//! Covers the hot paths of a run:
//! - Tokenizing and stemming text
//! - Building and merging indexes
//! - Exact and prefix search

use std::collections::BTreeSet;
use std::hint::black_box;

use criterion::{Criterion, Throughput, criterion_group, criterion_main};
use stemdex::analysis::TextAnalyzer;
use stemdex::index::{InvertedIndex, SearchIndex};

/// Generate test documents for benchmarking.
fn generate_test_documents(count: usize) -> Vec<String> {
    let words = [
        "search",
        "engines",
        "indexing",
        "queries",
        "documents",
        "computers",
        "computation",
        "computing",
        "relevance",
        "scoring",
        "stemming",
        "tokenization",
        "normalization",
        "crawling",
        "crawlers",
        "threads",
        "threading",
        "locking",
        "readers",
        "writers",
        "merging",
        "positions",
        "locations",
        "ranking",
    ];

    (0..count)
        .map(|i| {
            let doc_length = 50 + (i % 100); // Variable length documents
            (0..doc_length)
                .map(|j| words[(i * 7 + j * 13) % words.len()]) // Pseudo-random distribution
                .collect::<Vec<_>>()
                .join(" ")
        })
        .collect()
}

fn build_index(analyzer: &TextAnalyzer, documents: &[String]) -> InvertedIndex {
    let mut index = InvertedIndex::new();
    for (i, document) in documents.iter().enumerate() {
        index.add_all(analyzer.stems(document), &format!("doc{i}.txt"));
    }
    index
}

/// Benchmark tokenizing and stemming.
fn bench_text_analysis(c: &mut Criterion) {
    let mut group = c.benchmark_group("text_analysis");

    let analyzer = TextAnalyzer::default();
    let texts = generate_test_documents(1000);

    group.bench_function("stem_single_document", |b| {
        b.iter(|| black_box(analyzer.stems(black_box(&texts[0]))))
    });

    group.throughput(Throughput::Elements(100));
    group.bench_function("stem_batch_documents", |b| {
        b.iter(|| {
            for text in texts.iter().take(100) {
                black_box(analyzer.stems(black_box(text)));
            }
        })
    });

    group.finish();
}

/// Benchmark index construction and shard merging.
fn bench_indexing(c: &mut Criterion) {
    let mut group = c.benchmark_group("indexing");
    group.sample_size(20);

    let analyzer = TextAnalyzer::default();
    let documents = generate_test_documents(500);
    let stems: Vec<Vec<String>> = documents.iter().map(|d| analyzer.stems(d)).collect();

    group.throughput(Throughput::Elements(documents.len() as u64));
    group.bench_function("add_all_documents", |b| {
        b.iter(|| {
            let mut index = InvertedIndex::new();
            for (i, document) in stems.iter().enumerate() {
                index.add_all(document, &format!("doc{i}.txt"));
            }
            black_box(index)
        })
    });

    let shards: Vec<InvertedIndex> = stems
        .chunks(50)
        .enumerate()
        .map(|(chunk, documents)| {
            let mut shard = InvertedIndex::new();
            for (i, document) in documents.iter().enumerate() {
                shard.add_all(document, &format!("doc{chunk}-{i}.txt"));
            }
            shard
        })
        .collect();

    group.bench_function("merge_shards", |b| {
        b.iter(|| {
            let mut index = InvertedIndex::new();
            for shard in &shards {
                index.merge(black_box(shard));
            }
            black_box(index)
        })
    });

    group.bench_function("merge_owned_shards", |b| {
        b.iter_with_setup(
            || shards.clone(),
            |shards| {
                let mut index = InvertedIndex::new();
                for shard in shards {
                    index.merge_owned(shard);
                }
                black_box(index)
            },
        )
    });

    group.finish();
}

/// Benchmark exact and prefix search.
fn bench_search(c: &mut Criterion) {
    let mut group = c.benchmark_group("search");

    let analyzer = TextAnalyzer::default();
    let index = build_index(&analyzer, &generate_test_documents(1000));

    let exact = analyzer.unique_stems("computers crawling threads");
    let prefixes: BTreeSet<String> = ["comp", "cr", "t"].iter().map(|s| s.to_string()).collect();

    group.bench_function("exact_search", |b| {
        b.iter(|| black_box(index.exact_search(black_box(&exact))))
    });

    group.bench_function("partial_search", |b| {
        b.iter(|| black_box(index.partial_search(black_box(&prefixes))))
    });

    group.finish();
}

criterion_group!(benches, bench_text_analysis, bench_indexing, bench_search);
criterion_main!(benches);
