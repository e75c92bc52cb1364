//! Ranked search results.

use std::cmp::Ordering;

use serde::{Deserialize, Serialize};

/// One matching location for a query.
///
/// Results are never stored in the index; they are recomputed from the
/// postings every time a search runs.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SearchResult {
    /// Total number of matching positions across all matched terms.
    pub count: usize,

    /// `count` divided by the location's word count.
    pub score: f64,

    /// The matching document.
    #[serde(rename = "where")]
    pub location: String,
}

impl SearchResult {
    /// Build a result from a match count and the location's word count.
    pub fn new(location: impl Into<String>, count: usize, word_count: usize) -> Self {
        SearchResult {
            count,
            score: count as f64 / word_count as f64,
            location: location.into(),
        }
    }

    /// Ranking order: higher score first, then higher count, then location
    /// ascending ignoring case.
    ///
    /// Locations that differ only in case fall back to byte order so the
    /// ordering stays total.
    pub fn rank_cmp(&self, other: &Self) -> Ordering {
        other
            .score
            .total_cmp(&self.score)
            .then_with(|| other.count.cmp(&self.count))
            .then_with(|| {
                self.location
                    .to_lowercase()
                    .cmp(&other.location.to_lowercase())
            })
            .then_with(|| self.location.cmp(&other.location))
    }
}
