//! Text analysis for indexing and querying.
//!
//! Raw text flows through a [`Tokenizer`] and then a [`Stemmer`]; the pair is
//! bundled as a [`TextAnalyzer`], which is what the index builder, the crawler
//! and the query engines share.
//!
//! ```text
//! "The Computers were computing!"
//!        │ TextTokenizer (NFD, letters only, lower-case, split on whitespace)
//!        ▼
//! ["the", "computers", "were", "computing"]
//!        │ SnowballStemmer
//!        ▼
//! ["the", "comput", "were", "comput"]
//! ```

pub mod analyzer;
pub mod stemmer;
pub mod tokenizer;

pub use analyzer::TextAnalyzer;
pub use stemmer::{PorterStemmer, SnowballStemmer, Stemmer};
pub use tokenizer::{TextTokenizer, Tokenizer};
