//! Thread-safe inverted index.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use crate::index::SearchIndex;
use crate::index::inverted::InvertedIndex;
use crate::index::result::SearchResult;
use crate::sync::SharedLock;

/// An [`InvertedIndex`] that many threads can read and write at once.
///
/// Mutations take the write guard; searches and accessors take the read
/// guard. Accessors return owned copies because a borrow cannot outlive the
/// guard it was taken under.
///
/// # Examples
///
/// ```
/// use std::sync::Arc;
/// use std::thread;
///
/// use stemdex::index::ConcurrentInvertedIndex;
///
/// let index = Arc::new(ConcurrentInvertedIndex::new());
///
/// let handles: Vec<_> = (0..4)
///     .map(|i| {
///         let index = Arc::clone(&index);
///         thread::spawn(move || index.add_all(["shared"], &format!("doc{i}")))
///     })
///     .collect();
/// for handle in handles {
///     handle.join().unwrap();
/// }
///
/// assert_eq!(index.num_locations("shared"), 4);
/// ```
#[derive(Default)]
pub struct ConcurrentInvertedIndex {
    index: SharedLock<InvertedIndex>,
}

impl ConcurrentInvertedIndex {
    /// Create an empty index.
    pub fn new() -> Self {
        Self::default()
    }

    /// See [`InvertedIndex::add`].
    pub fn add(&self, term: &str, location: &str, position: usize) {
        self.index.write().add(term, location, position);
    }

    /// See [`InvertedIndex::add_all`].
    pub fn add_all<I, S>(&self, terms: I, location: &str)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.index.write().add_all(terms, location);
    }

    /// See [`InvertedIndex::merge`].
    pub fn merge(&self, other: &InvertedIndex) {
        self.index.write().merge(other);
    }

    /// See [`InvertedIndex::merge_owned`]. This is how worker tasks publish a
    /// private shard: the shard is built without any lock and only the merge
    /// itself runs under the write guard.
    pub fn merge_owned(&self, other: InvertedIndex) {
        self.index.write().merge_owned(other);
    }

    /// Whether `term` is indexed.
    pub fn contains_term(&self, term: &str) -> bool {
        self.index.read().contains_term(term)
    }

    /// Whether `term` occurs in `location`.
    pub fn contains_location(&self, term: &str, location: &str) -> bool {
        self.index.read().contains_location(term, location)
    }

    /// Whether `term` occurs in `location` at `position`.
    pub fn contains_position(&self, term: &str, location: &str, position: usize) -> bool {
        self.index.read().contains_position(term, location, position)
    }

    /// Number of distinct terms.
    pub fn num_terms(&self) -> usize {
        self.index.read().num_terms()
    }

    /// Number of locations containing `term`.
    pub fn num_locations(&self, term: &str) -> usize {
        self.index.read().num_locations(term)
    }

    /// Number of positions of `term` in `location`.
    pub fn num_positions(&self, term: &str, location: &str) -> usize {
        self.index.read().num_positions(term, location)
    }

    /// Whether nothing has been indexed yet.
    pub fn is_empty(&self) -> bool {
        self.index.read().is_empty()
    }

    /// Word count of `location`, if it has been indexed.
    pub fn word_count(&self, location: &str) -> Option<usize> {
        self.index.read().word_count(location)
    }

    /// All terms, copied out in ascending order.
    pub fn terms(&self) -> Vec<String> {
        self.index.read().terms().map(str::to_string).collect()
    }

    /// Locations containing `term`, copied out in ascending order.
    pub fn locations(&self, term: &str) -> Vec<String> {
        self.index
            .read()
            .locations(term)
            .map(str::to_string)
            .collect()
    }

    /// Positions of `term` in `location`, copied out in ascending order.
    pub fn positions(&self, term: &str, location: &str) -> Vec<usize> {
        self.index.read().positions(term, location).collect()
    }

    /// Copy of every location's word count.
    pub fn word_counts(&self) -> BTreeMap<String, usize> {
        self.index.read().word_counts().clone()
    }

    /// Full copy of the index, for exporting without holding the lock.
    pub fn snapshot(&self) -> InvertedIndex {
        self.index.read().clone()
    }

    /// Unwrap the index once no other thread can reach it.
    pub fn into_inner(self) -> InvertedIndex {
        self.index.into_inner()
    }
}

impl From<InvertedIndex> for ConcurrentInvertedIndex {
    fn from(index: InvertedIndex) -> Self {
        ConcurrentInvertedIndex {
            index: SharedLock::new(index),
        }
    }
}

impl SearchIndex for ConcurrentInvertedIndex {
    fn exact_search(&self, terms: &BTreeSet<String>) -> Vec<SearchResult> {
        self.index.read().exact_search(terms)
    }

    fn partial_search(&self, terms: &BTreeSet<String>) -> Vec<SearchResult> {
        self.index.read().partial_search(terms)
    }
}

impl fmt::Display for ConcurrentInvertedIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let index = self.index.read();
        write!(
            f,
            "ConcurrentInvertedIndex({} terms, {} locations)",
            index.num_terms(),
            index.word_counts().len()
        )
    }
}

impl fmt::Debug for ConcurrentInvertedIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConcurrentInvertedIndex")
            .field("index", &self.index)
            .finish()
    }
}
