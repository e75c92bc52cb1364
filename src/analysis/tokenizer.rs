//! Tokenizers that split raw text into words.
//!
//! # Examples
//!
//! ```
//! use stemdex::analysis::tokenizer::{TextTokenizer, Tokenizer};
//!
//! let tokenizer = TextTokenizer::new();
//! let tokens = tokenizer.tokenize("Café-owners don't CLOSE early, 24/7.");
//! assert_eq!(tokens, vec!["cafeowners", "dont", "close", "early"]);
//! ```

use unicode_normalization::UnicodeNormalization;

/// Trait for tokenizers that convert a line of text into words.
///
/// The trait requires `Send + Sync` so one tokenizer can be shared by every
/// worker thread.
pub trait Tokenizer: Send + Sync {
    /// Split the text into an ordered sequence of normalized words.
    fn tokenize(&self, text: &str) -> Vec<String>;

    /// Get the name of this tokenizer.
    fn name(&self) -> &'static str;
}

/// A tokenizer that keeps only letters and splits on whitespace.
///
/// Text is decomposed (NFD) first, so accents become separate combining marks
/// and are dropped together with digits and punctuation. Punctuation inside a
/// word therefore joins its halves ("don't" becomes "dont") rather than
/// splitting it.
#[derive(Clone, Debug, Default)]
pub struct TextTokenizer;

impl TextTokenizer {
    /// Create a new text tokenizer.
    pub fn new() -> Self {
        TextTokenizer
    }

    /// Normalize the text without splitting it.
    pub fn clean(text: &str) -> String {
        text.nfd()
            .filter(|c| c.is_alphabetic() || c.is_whitespace())
            .flat_map(char::to_lowercase)
            .collect()
    }
}

impl Tokenizer for TextTokenizer {
    fn tokenize(&self, text: &str) -> Vec<String> {
        Self::clean(text)
            .split_whitespace()
            .map(str::to_string)
            .collect()
    }

    fn name(&self) -> &'static str {
        "text"
    }
}
