//! The inverted index and its thread-safe wrapper.
//!
//! [`InvertedIndex`] maps each stemmed term to the locations it occurs in and
//! the 1-based positions within each location, and tracks a word count per
//! location. [`ConcurrentInvertedIndex`] puts the same index behind a
//! [`SharedLock`](crate::sync::SharedLock) so builder and query threads can
//! use it at the same time.
//!
//! Query code is written against the [`SearchIndex`] trait, which both
//! variants implement.

pub mod concurrent;
pub mod inverted;
pub mod result;

use std::collections::BTreeSet;

pub use concurrent::ConcurrentInvertedIndex;
pub use inverted::InvertedIndex;
pub use result::SearchResult;

/// Ranked search over a set of query stems.
pub trait SearchIndex: Send + Sync {
    /// Locations containing any of the terms exactly.
    fn exact_search(&self, terms: &BTreeSet<String>) -> Vec<SearchResult>;

    /// Locations containing any term that starts with one of the query terms.
    fn partial_search(&self, terms: &BTreeSet<String>) -> Vec<SearchResult>;

    /// Dispatch to [`exact_search`](Self::exact_search) or
    /// [`partial_search`](Self::partial_search).
    fn search(&self, terms: &BTreeSet<String>, exact: bool) -> Vec<SearchResult> {
        if exact {
            self.exact_search(terms)
        } else {
            self.partial_search(terms)
        }
    }
}
