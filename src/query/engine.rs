//! Single-threaded query processing.

use std::sync::Arc;

use log::debug;

use crate::analysis::TextAnalyzer;
use crate::error::Result;
use crate::index::{SearchIndex, SearchResult};
use crate::query::{QueryProcessor, QueryResults, canonical_query};

/// Answers queries one at a time on the calling thread.
///
/// # Examples
///
/// ```
/// use std::sync::Arc;
///
/// use stemdex::index::InvertedIndex;
/// use stemdex::query::{QueryEngine, QueryProcessor};
///
/// let mut index = InvertedIndex::new();
/// index.add_all(["comput", "scienc"], "a.txt");
///
/// let mut engine = QueryEngine::new(Arc::new(index), Default::default());
/// engine.process_line("Computing", true).unwrap();
/// engine.process_line("computers!", true).unwrap();
///
/// assert_eq!(engine.len(), 1);
/// assert_eq!(engine.search_count(), 1);
/// assert_eq!(engine.results()["comput"][0].location, "a.txt");
/// ```
#[derive(Debug)]
pub struct QueryEngine<I> {
    index: Arc<I>,
    analyzer: TextAnalyzer,
    results: QueryResults,
    searches: usize,
}

impl<I: SearchIndex> QueryEngine<I> {
    /// Create an engine over `index` that stems queries with `analyzer`.
    pub fn new(index: Arc<I>, analyzer: TextAnalyzer) -> Self {
        QueryEngine {
            index,
            analyzer,
            results: QueryResults::new(),
            searches: 0,
        }
    }

    /// Number of searches actually run against the index.
    pub fn search_count(&self) -> usize {
        self.searches
    }

    /// The index being queried.
    pub fn index(&self) -> &Arc<I> {
        &self.index
    }
}

impl<I: SearchIndex> QueryProcessor for QueryEngine<I> {
    fn process_line(&mut self, line: &str, exact: bool) -> Result<()> {
        let stems = self.analyzer.unique_stems(line);
        if stems.is_empty() {
            return Ok(());
        }

        let key = canonical_query(&stems);
        if self.results.contains_key(&key) {
            return Ok(());
        }

        let results = self.index.search(&stems, exact);
        self.searches += 1;
        debug!("query {key:?}: {} results", results.len());
        self.results.insert(key, results);
        Ok(())
    }

    fn query(&self, text: &str, exact: bool) -> Vec<SearchResult> {
        self.index.search(&self.analyzer.unique_stems(text), exact)
    }

    fn results(&self) -> QueryResults {
        self.results.clone()
    }

    fn len(&self) -> usize {
        self.results.len()
    }
}
