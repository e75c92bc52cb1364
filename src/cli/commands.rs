//! Command implementations for the stemdex CLI.
//!
//! A run goes through up to five stages in a fixed order: build from
//! `--text`, crawl from `--html`, answer `--query`, then write `--results`,
//! `--index` and `--counts`. A failing stage is logged and the remaining
//! stages still run; only invalid arguments or configuration end the run
//! with an error.

use std::path::Path;
use std::sync::Arc;

use log::{error, info};

use crate::analysis::TextAnalyzer;
use crate::builder::IndexBuilder;
use crate::cli::args::StemdexArgs;
use crate::config::EngineConfig;
use crate::crawler::{Crawler, HttpFetcher};
use crate::error::Result;
use crate::export;
use crate::index::{ConcurrentInvertedIndex, InvertedIndex};
use crate::query::{QueryEngine, QueryProcessor, ThreadedQueryEngine};
use crate::work_queue::WorkQueue;

/// Execute a CLI run.
pub fn execute_command(args: &StemdexArgs) -> Result<()> {
    let config = args.engine_config()?;
    let analyzer = TextAnalyzer::default();

    if args.concurrent() {
        run_concurrent(args, &config, analyzer)
    } else {
        run_sequential(args, &config, analyzer);
        Ok(())
    }
}

fn run_sequential(args: &StemdexArgs, config: &EngineConfig, analyzer: TextAnalyzer) {
    let mut index = InvertedIndex::new();
    if let Some(path) = &args.text {
        let builder = IndexBuilder::new(analyzer.clone());
        stage("build", path, builder.build(path, &mut index));
    }

    let index = Arc::new(index);
    let mut engine = QueryEngine::new(Arc::clone(&index), analyzer);
    answer_and_export(args, config, &mut engine, || (*index).clone());
}

fn run_concurrent(args: &StemdexArgs, config: &EngineConfig, analyzer: TextAnalyzer) -> Result<()> {
    let queue = Arc::new(WorkQueue::new(config.threads)?);
    let index = Arc::new(ConcurrentInvertedIndex::new());

    if let Some(path) = &args.text {
        let builder = IndexBuilder::new(analyzer.clone());
        stage("build", path, builder.build_concurrent(path, &index, &queue));
    }

    if let Some(seed) = &args.html {
        let fetcher = HttpFetcher::new(config.max_redirects, config.fetch_timeout());
        let crawler = Crawler::new(
            Arc::clone(&index),
            Arc::clone(&queue),
            Arc::new(fetcher),
            analyzer.clone(),
            config.max_pages,
        );
        if let Err(e) = crawler.crawl(seed) {
            error!("unable to crawl {seed}: {e}");
        }
    }

    let mut engine = ThreadedQueryEngine::new(Arc::clone(&index), analyzer, Arc::clone(&queue));
    answer_and_export(args, config, &mut engine, || index.snapshot());

    queue.shutdown();
    info!("work queue stats: {:?}", queue.stats());
    Ok(())
}

/// Run the query stage and write every requested output.
///
/// `snapshot` is only called when the index or counts are to be written.
fn answer_and_export(
    args: &StemdexArgs,
    config: &EngineConfig,
    engine: &mut dyn QueryProcessor,
    snapshot: impl FnOnce() -> InvertedIndex,
) {
    if let Some(path) = &args.query {
        stage("query", path, engine.process_file(path, config.exact));
    }
    if let Some(path) = &args.results {
        stage("results", path, export::write_results(path, &engine.results()));
    }

    if args.index.is_none() && args.counts.is_none() {
        return;
    }
    let index = snapshot();
    if let Some(path) = &args.index {
        stage("index", path, export::write_index(path, &index));
    }
    if let Some(path) = &args.counts {
        stage("counts", path, export::write_counts(path, index.word_counts()));
    }
}

fn stage(name: &str, path: &Path, outcome: Result<()>) {
    if let Err(e) = outcome {
        error!("{name} stage failed for {}: {e}", path.display());
    }
}
