//! Command line argument parsing for the stemdex CLI using clap.

use std::path::PathBuf;

use clap::Parser;

use crate::config::EngineConfig;
use crate::error::Result;

/// stemdex - build an inverted index from text files or a crawl, then query it
#[derive(Parser, Debug, Clone, Default)]
#[command(name = "stemdex")]
#[command(about = "Concurrent full-text search over local files and crawled web pages")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(long_about = None)]
pub struct StemdexArgs {
    /// Text file or directory of .txt/.text files to index
    #[arg(long, value_name = "PATH")]
    pub text: Option<PathBuf>,

    /// Seed URL to crawl; always uses the concurrent pipeline
    #[arg(long, value_name = "URL")]
    pub html: Option<String>,

    /// Maximum number of pages to crawl [default: 1]
    #[arg(long, value_name = "N")]
    pub max: Option<usize>,

    /// Use the concurrent pipeline with N worker threads [default when given: 5]
    #[arg(long, value_name = "N", num_args = 0..=1, default_missing_value = "5")]
    pub threads: Option<usize>,

    /// File of queries, one per line
    #[arg(long, value_name = "PATH")]
    pub query: Option<PathBuf>,

    /// Match query stems exactly instead of as prefixes
    #[arg(long)]
    pub exact: bool,

    /// Write the inverted index as JSON
    #[arg(long, value_name = "PATH", num_args = 0..=1, default_missing_value = "index.json")]
    pub index: Option<PathBuf>,

    /// Write the word count of every location as JSON
    #[arg(long, value_name = "PATH", num_args = 0..=1, default_missing_value = "counts.json")]
    pub counts: Option<PathBuf>,

    /// Write query results as JSON
    #[arg(long, value_name = "PATH", num_args = 0..=1, default_missing_value = "results.json")]
    pub results: Option<PathBuf>,

    /// JSON engine config; explicit flags take precedence
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Increase log verbosity (-v info, -vv debug)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Only log errors (overrides verbose)
    #[arg(short, long)]
    pub quiet: bool,
}

impl StemdexArgs {
    /// Get the effective verbosity level: 0 errors only, 1 warnings
    /// (default), 2 info, 3 and up debug.
    pub fn verbosity(&self) -> u8 {
        if self.quiet {
            0
        } else {
            self.verbose.saturating_add(1)
        }
    }

    /// Whether to index and query through a work queue.
    pub fn concurrent(&self) -> bool {
        self.threads.is_some() || self.html.is_some()
    }

    /// The config file (or the defaults) with explicit flags applied on top,
    /// validated.
    pub fn engine_config(&self) -> Result<EngineConfig> {
        let mut config = match &self.config {
            Some(path) => EngineConfig::from_json_file(path)?,
            None => EngineConfig::default(),
        };

        if let Some(threads) = self.threads {
            config.threads = threads;
        }
        if let Some(max) = self.max {
            config.max_pages = max;
        }
        if self.exact {
            config.exact = true;
        }

        config.validate()?;
        Ok(config)
    }
}
