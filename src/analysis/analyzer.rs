//! The tokenize-then-stem pipeline shared by builders, crawlers and queries.

use std::collections::BTreeSet;
use std::fmt;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;
use std::sync::Arc;

use crate::analysis::stemmer::{SnowballStemmer, Stemmer};
use crate::analysis::tokenizer::{TextTokenizer, Tokenizer};
use crate::error::Result;

/// Turns raw text into stems.
///
/// Cloning is cheap: the tokenizer and stemmer are shared behind `Arc`s, so
/// each worker task can own its own copy.
///
/// # Examples
///
/// ```
/// use stemdex::analysis::TextAnalyzer;
///
/// let analyzer = TextAnalyzer::default();
///
/// assert_eq!(analyzer.stems("Computers compute"), vec!["comput", "comput"]);
///
/// let unique = analyzer.unique_stems("compute the Computers");
/// assert_eq!(unique.into_iter().collect::<Vec<_>>(), vec!["comput", "the"]);
/// ```
#[derive(Clone)]
pub struct TextAnalyzer {
    tokenizer: Arc<dyn Tokenizer>,
    stemmer: Arc<dyn Stemmer>,
}

impl TextAnalyzer {
    /// Create an analyzer from a tokenizer and a stemmer.
    pub fn new(tokenizer: Arc<dyn Tokenizer>, stemmer: Arc<dyn Stemmer>) -> Self {
        TextAnalyzer { tokenizer, stemmer }
    }

    /// Stem one line, keeping order and duplicates.
    pub fn stems(&self, line: &str) -> Vec<String> {
        let mut stems = Vec::new();
        self.stem_into(line, &mut stems);
        stems
    }

    /// Stem one line into a sorted set of unique stems.
    pub fn unique_stems(&self, line: &str) -> BTreeSet<String> {
        let mut stems = BTreeSet::new();
        self.stem_into(line, &mut stems);
        stems
    }

    /// Read a UTF-8 file line by line and stem every line in order.
    pub fn stem_file(&self, path: &Path) -> Result<Vec<String>> {
        let reader = BufReader::new(File::open(path)?);
        let mut stems = Vec::new();
        for line in reader.lines() {
            self.stem_into(&line?, &mut stems);
        }
        Ok(stems)
    }

    fn stem_into<C: Extend<String>>(&self, line: &str, stems: &mut C) {
        stems.extend(
            self.tokenizer
                .tokenize(line)
                .iter()
                .map(|token| self.stemmer.stem(token)),
        );
    }
}

impl Default for TextAnalyzer {
    fn default() -> Self {
        TextAnalyzer::new(Arc::new(TextTokenizer::new()), Arc::new(SnowballStemmer::new()))
    }
}

impl fmt::Debug for TextAnalyzer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TextAnalyzer")
            .field("tokenizer", &self.tokenizer.name())
            .field("stemmer", &self.stemmer.name())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use tempfile::NamedTempFile;

    use super::*;

    #[test]
    fn test_stems_keep_order_and_duplicates() {
        let analyzer = TextAnalyzer::default();

        assert_eq!(
            analyzer.stems("Running dogs, running cats"),
            vec!["run", "dog", "run", "cat"]
        );
    }

    #[test]
    fn test_unique_stems_are_sorted() {
        let analyzer = TextAnalyzer::default();
        let stems = analyzer.unique_stems("zebra apple Apples zebras");

        assert_eq!(stems.into_iter().collect::<Vec<_>>(), vec!["appl", "zebra"]);
    }

    #[test]
    fn test_stem_file_spans_lines() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "hello world").unwrap();
        writeln!(file).unwrap();
        writeln!(file, "hello again").unwrap();

        let analyzer = TextAnalyzer::default();
        let stems = analyzer.stem_file(file.path()).unwrap();

        assert_eq!(stems, vec!["hello", "world", "hello", "again"]);
    }

    #[test]
    fn test_stem_missing_file() {
        let analyzer = TextAnalyzer::default();
        assert!(analyzer.stem_file(Path::new("/no/such/file.txt")).is_err());
    }

    #[test]
    fn test_debug_names_components() {
        let analyzer = TextAnalyzer::default();
        let debug = format!("{analyzer:?}");

        assert!(debug.contains("text"));
        assert!(debug.contains("snowball"));
    }
}
