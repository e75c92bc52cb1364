//! Query processing on a work queue.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use log::debug;

use crate::analysis::TextAnalyzer;
use crate::error::Result;
use crate::index::{SearchIndex, SearchResult};
use crate::query::{QueryProcessor, QueryResults, canonical_query};
use crate::sync::SharedLock;
use crate::work_queue::WorkQueue;

/// Answers each query line as a separate [`WorkQueue`] task.
///
/// The result cache sits behind its own [`SharedLock`], independent of any
/// lock inside the index. A task checks the cache under the read guard,
/// searches with no cache lock held, and inserts under the write guard
/// without replacing an entry another task stored in the meantime.
///
/// [`process_line`](QueryProcessor::process_line) only queues the work; call
/// [`finish`](Self::finish) (or use
/// [`process_file`](QueryProcessor::process_file), which does) before reading
/// [`results`](QueryProcessor::results).
pub struct ThreadedQueryEngine<I> {
    index: Arc<I>,
    analyzer: TextAnalyzer,
    queue: Arc<WorkQueue>,
    cache: Arc<SharedLock<QueryResults>>,
    searches: Arc<AtomicUsize>,
}

impl<I: SearchIndex + 'static> ThreadedQueryEngine<I> {
    /// Create an engine that searches `index` on `queue`.
    pub fn new(index: Arc<I>, analyzer: TextAnalyzer, queue: Arc<WorkQueue>) -> Self {
        ThreadedQueryEngine {
            index,
            analyzer,
            queue,
            cache: Arc::new(SharedLock::default()),
            searches: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Block until every queued query has been answered.
    pub fn finish(&self) {
        self.queue.finish();
    }

    /// Number of searches actually run against the index.
    ///
    /// Two tasks racing on the same new query may both search; only the
    /// first result is kept.
    pub fn search_count(&self) -> usize {
        self.searches.load(Ordering::SeqCst)
    }
}

impl<I: SearchIndex + 'static> QueryProcessor for ThreadedQueryEngine<I> {
    fn process_line(&mut self, line: &str, exact: bool) -> Result<()> {
        let line = line.to_string();
        let index = Arc::clone(&self.index);
        let analyzer = self.analyzer.clone();
        let cache = Arc::clone(&self.cache);
        let searches = Arc::clone(&self.searches);

        self.queue.execute(move || {
            let stems = analyzer.unique_stems(&line);
            if stems.is_empty() {
                return Ok(());
            }

            let key = canonical_query(&stems);
            if cache.read().contains_key(&key) {
                return Ok(());
            }

            let results = index.search(&stems, exact);
            searches.fetch_add(1, Ordering::SeqCst);
            debug!("query {key:?}: {} results", results.len());

            cache.write().entry(key).or_insert(results);
            Ok(())
        })
    }

    fn process_file(&mut self, path: &Path, exact: bool) -> Result<()> {
        let reader = BufReader::new(File::open(path)?);
        let submitted = reader
            .lines()
            .try_for_each(|line| self.process_line(&line?, exact));

        // Wait even on a read error so no task outlives this call.
        self.finish();
        submitted
    }

    fn query(&self, text: &str, exact: bool) -> Vec<SearchResult> {
        self.index.search(&self.analyzer.unique_stems(text), exact)
    }

    fn results(&self) -> QueryResults {
        self.cache.read().clone()
    }

    fn len(&self) -> usize {
        self.cache.read().len()
    }
}
