//! Query processing: turning query lines into cached, ranked results.
//!
//! A query line is reduced to its set of unique stems; the stems joined by a
//! single space form the canonical query, which is the cache key and the key
//! under which results are exported. Lines that differ only in word order,
//! case, punctuation or inflection therefore share one entry.
//!
//! Two processors implement [`QueryProcessor`]: [`QueryEngine`] runs every
//! query on the calling thread, [`ThreadedQueryEngine`] runs each line as a
//! [`WorkQueue`](crate::work_queue::WorkQueue) task.

pub mod engine;
pub mod threaded;

use std::collections::{BTreeMap, BTreeSet};
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use crate::error::Result;
use crate::index::SearchResult;

pub use engine::QueryEngine;
pub use threaded::ThreadedQueryEngine;

/// Canonical query to ranked results, ordered by canonical query.
pub type QueryResults = BTreeMap<String, Vec<SearchResult>>;

/// Something that answers query lines and remembers the answers.
pub trait QueryProcessor {
    /// Answer one query line and cache the result under its canonical form.
    ///
    /// Lines without any stems are ignored, as are lines whose canonical
    /// form has already been answered.
    fn process_line(&mut self, line: &str, exact: bool) -> Result<()>;

    /// Answer every line of a UTF-8 file.
    fn process_file(&mut self, path: &Path, exact: bool) -> Result<()> {
        let reader = BufReader::new(File::open(path)?);
        for line in reader.lines() {
            self.process_line(&line?, exact)?;
        }
        Ok(())
    }

    /// Uncached search for `text`, for callers that only want an answer.
    fn query(&self, text: &str, exact: bool) -> Vec<SearchResult>;

    /// Copy of every cached answer.
    fn results(&self) -> QueryResults;

    /// Number of cached canonical queries.
    fn len(&self) -> usize;

    /// Whether no query has been cached yet.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Join sorted unique stems into the canonical query string.
///
/// ```
/// use std::collections::BTreeSet;
///
/// use stemdex::query::canonical_query;
///
/// let stems = BTreeSet::from(["dog".to_string(), "cat".to_string()]);
/// assert_eq!(canonical_query(&stems), "cat dog");
/// ```
pub fn canonical_query(stems: &BTreeSet<String>) -> String {
    stems
        .iter()
        .map(String::as_str)
        .collect::<Vec<_>>()
        .join(" ")
}
