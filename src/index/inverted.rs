//! The single-threaded inverted index.
//!
//! # Layout
//!
//! ```text
//! postings:    term ──► location ──► {positions}
//!              "comput"  "a.txt"      {3, 17}
//!                        "b.txt"      {1}
//! word_counts: location ──► max position
//!              "a.txt"       40
//! ```
//!
//! Both maps are `BTreeMap`s. Ordered terms are what make prefix search a
//! bounded range scan, and ordered locations make exports deterministic.
//!
//! # Examples
//!
//! ```
//! use std::collections::BTreeSet;
//!
//! use stemdex::index::{InvertedIndex, SearchIndex};
//!
//! let mut index = InvertedIndex::new();
//! index.add_all(["comput", "scienc", "comput"], "a.txt");
//! index.add_all(["dog"], "b.txt");
//!
//! let query = BTreeSet::from(["comp".to_string()]);
//! let results = index.partial_search(&query);
//!
//! assert_eq!(results.len(), 1);
//! assert_eq!(results[0].location, "a.txt");
//! assert_eq!(results[0].count, 2);
//! ```

use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::fmt;
use std::ops::Bound;

use crate::index::SearchIndex;
use crate::index::result::SearchResult;

type Postings = BTreeMap<String, BTreeMap<String, BTreeSet<usize>>>;

/// Inverted index from stemmed terms to locations and positions.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct InvertedIndex {
    postings: Postings,
    word_counts: BTreeMap<String, usize>,
}

impl InvertedIndex {
    /// Create an empty index.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record that `term` occurs at `position` in `location`.
    ///
    /// Adding a position that is already present changes nothing. The
    /// location's word count grows to `position` if it was smaller.
    ///
    /// # Panics
    ///
    /// Panics if `position` is 0; positions are 1-based.
    pub fn add(&mut self, term: &str, location: &str, position: usize) {
        assert!(position > 0, "positions are 1-based, got 0 for {term:?}");

        self.postings
            .entry(term.to_string())
            .or_default()
            .entry(location.to_string())
            .or_default()
            .insert(position);
        self.bump_word_count(location, position);
    }

    /// Add `terms` at consecutive positions starting at 1.
    pub fn add_all<I, S>(&mut self, terms: I, location: &str)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        for (offset, term) in terms.into_iter().enumerate() {
            self.add(term.as_ref(), location, offset + 1);
        }
    }

    /// Union every posting of `other` into this index and keep the larger
    /// word count for each location. `other` is left untouched.
    pub fn merge(&mut self, other: &InvertedIndex) {
        for (term, locations) in &other.postings {
            let target = self.postings.entry(term.clone()).or_default();
            for (location, positions) in locations {
                target
                    .entry(location.clone())
                    .or_default()
                    .extend(positions.iter().copied());
            }
        }
        for (location, &count) in &other.word_counts {
            self.bump_word_count(location, count);
        }
    }

    /// Same result as [`merge`](Self::merge), but consumes `other` so posting
    /// sets for terms and locations new to this index are moved instead of
    /// copied.
    pub fn merge_owned(&mut self, other: InvertedIndex) {
        for (term, locations) in other.postings {
            match self.postings.get_mut(&term) {
                None => {
                    self.postings.insert(term, locations);
                }
                Some(target) => {
                    for (location, positions) in locations {
                        match target.get_mut(&location) {
                            None => {
                                target.insert(location, positions);
                            }
                            Some(existing) => existing.extend(positions),
                        }
                    }
                }
            }
        }
        for (location, count) in other.word_counts {
            self.bump_word_count(&location, count);
        }
    }

    fn bump_word_count(&mut self, location: &str, count: usize) {
        match self.word_counts.get_mut(location) {
            Some(current) => *current = (*current).max(count),
            None => {
                self.word_counts.insert(location.to_string(), count);
            }
        }
    }

    /// Sum posting sizes per location for every matched term and rank the
    /// locations.
    fn rank<'a>(
        &self,
        matched: impl IntoIterator<Item = &'a BTreeMap<String, BTreeSet<usize>>>,
    ) -> Vec<SearchResult> {
        let mut counts: HashMap<&str, usize> = HashMap::new();
        for locations in matched {
            for (location, positions) in locations {
                *counts.entry(location.as_str()).or_default() += positions.len();
            }
        }

        let mut results: Vec<SearchResult> = counts
            .into_iter()
            .map(|(location, count)| {
                let words = self.word_counts.get(location).copied().unwrap_or(count);
                SearchResult::new(location, count, words)
            })
            .collect();
        results.sort_by(SearchResult::rank_cmp);
        results
    }

    /// Whether `term` is indexed.
    pub fn contains_term(&self, term: &str) -> bool {
        self.postings.contains_key(term)
    }

    /// Whether `term` occurs in `location`.
    pub fn contains_location(&self, term: &str, location: &str) -> bool {
        self.postings
            .get(term)
            .is_some_and(|locations| locations.contains_key(location))
    }

    /// Whether `term` occurs at `position` in `location`.
    pub fn contains_position(&self, term: &str, location: &str, position: usize) -> bool {
        self.postings
            .get(term)
            .and_then(|locations| locations.get(location))
            .is_some_and(|positions| positions.contains(&position))
    }

    /// Number of distinct terms.
    pub fn num_terms(&self) -> usize {
        self.postings.len()
    }

    /// Number of locations containing `term`.
    pub fn num_locations(&self, term: &str) -> usize {
        self.postings.get(term).map_or(0, BTreeMap::len)
    }

    /// Number of positions of `term` within `location`.
    pub fn num_positions(&self, term: &str, location: &str) -> usize {
        self.postings
            .get(term)
            .and_then(|locations| locations.get(location))
            .map_or(0, BTreeSet::len)
    }

    /// Whether nothing has been indexed yet.
    pub fn is_empty(&self) -> bool {
        self.postings.is_empty()
    }

    /// Terms in ascending order.
    pub fn terms(&self) -> impl Iterator<Item = &str> {
        self.postings.keys().map(String::as_str)
    }

    /// Locations containing `term`, in ascending order.
    pub fn locations(&self, term: &str) -> impl Iterator<Item = &str> {
        self.postings
            .get(term)
            .into_iter()
            .flat_map(|locations| locations.keys().map(String::as_str))
    }

    /// Positions of `term` in `location`, in ascending order.
    pub fn positions(&self, term: &str, location: &str) -> impl Iterator<Item = usize> + '_ {
        self.postings
            .get(term)
            .and_then(|locations| locations.get(location))
            .into_iter()
            .flat_map(|positions| positions.iter().copied())
    }

    /// Word count of `location`, if it has been indexed.
    pub fn word_count(&self, location: &str) -> Option<usize> {
        self.word_counts.get(location).copied()
    }

    /// Word count of every indexed location.
    pub fn word_counts(&self) -> &BTreeMap<String, usize> {
        &self.word_counts
    }

    /// The full term → location → positions map.
    pub fn postings(&self) -> &BTreeMap<String, BTreeMap<String, BTreeSet<usize>>> {
        &self.postings
    }
}

impl SearchIndex for InvertedIndex {
    fn exact_search(&self, terms: &BTreeSet<String>) -> Vec<SearchResult> {
        self.rank(terms.iter().filter_map(|term| self.postings.get(term)))
    }

    fn partial_search(&self, terms: &BTreeSet<String>) -> Vec<SearchResult> {
        // Each query prefix contributes every term it reaches, so a term
        // reached from both "comp" and "comput" is counted twice.
        let matched = terms.iter().flat_map(|prefix| {
            self.postings
                .range::<str, _>((Bound::Included(prefix.as_str()), Bound::Unbounded))
                .take_while(move |(term, _)| term.starts_with(prefix.as_str()))
                .map(|(_, locations)| locations)
        });

        self.rank(matched)
    }
}

impl fmt::Display for InvertedIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "InvertedIndex({} terms, {} locations)",
            self.postings.len(),
            self.word_counts.len()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn query(terms: &[&str]) -> BTreeSet<String> {
        terms.iter().map(|term| term.to_string()).collect()
    }

    fn sample_index() -> InvertedIndex {
        let mut index = InvertedIndex::new();
        index.add_all(["comput", "dog", "comput", "cat"], "a.txt");
        index.add_all(["dog", "dog", "dog"], "b.txt");
        index.add_all(["computer", "compute", "computation", "dog"], "c.txt");
        index
    }

    #[test]
    fn test_add_and_accessors() {
        let mut index = InvertedIndex::new();
        index.add("hello", "a.txt", 1);
        index.add("hello", "a.txt", 5);
        index.add("hello", "a.txt", 5);
        index.add("world", "b.txt", 2);

        assert_eq!(index.num_terms(), 2);
        assert_eq!(index.num_locations("hello"), 1);
        assert_eq!(index.num_positions("hello", "a.txt"), 2);
        assert_eq!(index.num_positions("hello", "b.txt"), 0);
        assert_eq!(index.num_locations("missing"), 0);
        assert!(index.contains_term("world"));
        assert!(index.contains_location("world", "b.txt"));
        assert!(!index.contains_location("world", "a.txt"));
        assert!(index.contains_position("hello", "a.txt", 5));
        assert!(!index.contains_position("hello", "a.txt", 2));
        assert_eq!(index.terms().collect::<Vec<_>>(), vec!["hello", "world"]);
        assert_eq!(index.locations("hello").collect::<Vec<_>>(), vec!["a.txt"]);
        assert_eq!(index.positions("hello", "a.txt").collect::<Vec<_>>(), vec![1, 5]);
        assert_eq!(index.positions("nope", "a.txt").count(), 0);
        assert_eq!(index.word_count("a.txt"), Some(5));
        assert_eq!(index.word_count("b.txt"), Some(2));
        assert_eq!(index.word_count("c.txt"), None);
    }

    #[test]
    fn test_word_count_never_decreases() {
        let mut index = InvertedIndex::new();
        index.add("late", "a.txt", 9);
        index.add("early", "a.txt", 2);

        assert_eq!(index.word_count("a.txt"), Some(9));
    }

    #[test]
    #[should_panic(expected = "1-based")]
    fn test_zero_position_panics() {
        InvertedIndex::new().add("term", "a.txt", 0);
    }

    #[test]
    fn test_add_all_positions() {
        let mut index = InvertedIndex::new();
        index.add_all(vec!["a".to_string(), "b".to_string(), "a".to_string()], "doc");

        assert_eq!(index.positions("a", "doc").collect::<Vec<_>>(), vec![1, 3]);
        assert_eq!(index.word_count("doc"), Some(3));
    }

    #[test]
    fn test_merge_takes_max_word_count() {
        let mut left = InvertedIndex::new();
        left.add("shared", "a.txt", 3);
        left.add("left", "a.txt", 10);

        let mut right = InvertedIndex::new();
        right.add("shared", "a.txt", 7);
        right.add("right", "b.txt", 4);

        let before = right.clone();
        left.merge(&right);

        assert_eq!(right, before, "merge must not mutate its argument");
        assert_eq!(left.word_count("a.txt"), Some(10));
        assert_eq!(left.word_count("b.txt"), Some(4));
        assert_eq!(left.positions("shared", "a.txt").collect::<Vec<_>>(), vec![3, 7]);
        assert!(left.contains_location("right", "b.txt"));
    }

    #[test]
    fn test_merge_owned_matches_merge() {
        let mut base = sample_index();
        let mut shard = InvertedIndex::new();
        shard.add_all(["dog", "fish", "comput"], "a.txt");
        shard.add_all(["bird"], "d.txt");

        let mut by_ref = base.clone();
        by_ref.merge(&shard);
        base.merge_owned(shard);

        assert_eq!(base, by_ref);
    }

    #[test]
    fn test_exact_search() {
        let index = sample_index();
        let results = index.exact_search(&query(&["comput", "dog"]));

        // a.txt: 2 comput + 1 dog over 4 words; b.txt: 3 dog over 3 words.
        let summary: Vec<_> = results
            .iter()
            .map(|r| (r.location.as_str(), r.count))
            .collect();
        assert_eq!(summary, vec![("b.txt", 3), ("a.txt", 3), ("c.txt", 1)]);
        assert!((results[0].score - 1.0).abs() < f64::EPSILON);
        assert!((results[1].score - 0.75).abs() < f64::EPSILON);
    }

    #[test]
    fn test_partial_search_prefix() {
        let mut index = InvertedIndex::new();
        index.add_all(["computer", "compute", "computation", "dog"], "a.txt");
        index.add_all(["dog"], "b.txt");

        let results = index.partial_search(&query(&["comput"]));

        assert_eq!(results.len(), 1);
        assert_eq!(results[0].location, "a.txt");
        assert_eq!(results[0].count, 3);
    }

    #[test]
    fn test_partial_search_counts_each_prefix_match() {
        let mut index = InvertedIndex::new();
        index.add_all(["computer", "x", "y", "z"], "a.txt");

        let results = index.partial_search(&query(&["comp", "comput"]));

        assert_eq!(results.len(), 1);
        assert_eq!(results[0].count, 2);
        assert!((results[0].score - 0.5).abs() < 1e-12);

        let results = index.partial_search(&query(&["c", "comp", "computer", "x"]));
        assert_eq!(results[0].count, 4);
    }

    #[test]
    fn test_search_dispatch_and_edge_cases() {
        let index = sample_index();

        assert!(index.search(&BTreeSet::new(), true).is_empty());
        assert!(index.search(&BTreeSet::new(), false).is_empty());
        assert!(index.search(&query(&["zebra"]), true).is_empty());
        assert!(index.search(&query(&["comp"]), true).is_empty());
        assert_eq!(index.search(&query(&["comp"]), false).len(), 2);
    }

    #[test]
    fn test_score_from_word_count() {
        let mut index = InvertedIndex::new();
        let words = ["alpha", "beta", "gamma", "alpha", "x", "y", "z", "w", "v", "u"];
        index.add_all(words, "a.txt");

        let results = index.exact_search(&query(&["alpha", "beta", "gamma"]));

        assert_eq!(index.word_count("a.txt"), Some(10));
        assert_eq!(results[0].count, 4);
        assert!((results[0].score - 0.4).abs() < f64::EPSILON);
    }

    #[test]
    fn test_display() {
        assert_eq!(
            sample_index().to_string(),
            "InvertedIndex(6 terms, 3 locations)"
        );
    }
}
