//! # stemdex
//!
//! A concurrent full-text search engine over local text files and crawled
//! web pages.
//!
//! ## Features
//!
//! - Inverted index of stemmed words with exact and prefix search
//! - Relevance ranking by match count over document length
//! - Concurrent index building and crawling on a shared worker pool
//! - Writer-preferring reader/writer lock around the shared index
//! - Cached, optionally threaded query processing
//! - JSON export of the index, word counts and query results
//!
//! ## Example
//!
//! ```
//! use std::sync::Arc;
//!
//! use stemdex::index::InvertedIndex;
//! use stemdex::query::{QueryEngine, QueryProcessor};
//!
//! let mut index = InvertedIndex::new();
//! index.add_all(["comput", "scienc"], "intro.txt");
//! index.add_all(["comput", "comput", "architectur", "design"], "hardware.txt");
//!
//! let engine = QueryEngine::new(Arc::new(index), Default::default());
//! let results = engine.query("computing", true);
//!
//! assert_eq!(results[0].location, "hardware.txt");
//! assert_eq!(results[0].count, 2);
//! ```

pub mod analysis;
pub mod builder;
pub mod cli;
pub mod config;
pub mod crawler;
pub mod error;
pub mod export;
pub mod index;
pub mod query;
pub mod sync;
pub mod work_queue;

pub mod prelude {
    pub use crate::analysis::TextAnalyzer;
    pub use crate::builder::IndexBuilder;
    pub use crate::config::EngineConfig;
    pub use crate::crawler::{Crawler, Fetcher, HttpFetcher};
    pub use crate::error::{Result, SearchError};
    pub use crate::index::{ConcurrentInvertedIndex, InvertedIndex, SearchIndex, SearchResult};
    pub use crate::query::{QueryEngine, QueryProcessor, ThreadedQueryEngine};
    pub use crate::work_queue::WorkQueue;
}

// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
