//! Stemming algorithms for reducing words to their root forms.
//!
//! Stemming is what lets a query for "computing" find documents that say
//! "computer" or "computation": all three reduce to the term `comput`.
//!
//! # Algorithms
//!
//! [`SnowballStemmer`] is the default. It wraps the Snowball English
//! algorithm (Porter2) from `rust-stemmers`.
//!
//! [`PorterStemmer`] is the classic algorithm and applies the five rewrite steps of Martin Porter's
//! algorithm:
//! 1. Plurals and -ed/-ing suffixes, then terminal y → i
//! 2. -ational → -ate, -tional → -tion, etc.
//! 3. -icate → -ic, -ative → "", etc.
//! 4. Remove -al, -ance, -ence, etc.
//! 5. Remove final -e and reduce -ll
//!
//! # Examples
//!
//! ```
//! use stemdex::analysis::stemmer::{PorterStemmer, SnowballStemmer, Stemmer};
//!
//! let stemmer = SnowballStemmer::new();
//! assert_eq!(stemmer.stem("generously"), "generous");
//! assert_eq!(stemmer.stem("news"), "news");
//!
//! let stemmer = PorterStemmer::new();
//!
//! assert_eq!(stemmer.stem("running"), "run");
//! assert_eq!(stemmer.stem("computation"), "comput");
//! assert_eq!(stemmer.stem("traditional"), "tradit");
//! ```

use std::fmt;

use rust_stemmers::Algorithm;

/// Trait for stemming algorithms.
pub trait Stemmer: Send + Sync {
    /// Stem a word to its root form.
    fn stem(&self, word: &str) -> String;

    /// Get the name of this stemmer.
    fn name(&self) -> &'static str;
}

/// Snowball English stemmer.
pub struct SnowballStemmer {
    inner: rust_stemmers::Stemmer,
}

impl SnowballStemmer {
    /// Create a new Snowball English stemmer.
    pub fn new() -> Self {
        SnowballStemmer {
            inner: rust_stemmers::Stemmer::create(Algorithm::English),
        }
    }
}

impl Default for SnowballStemmer {
    fn default() -> Self {
        SnowballStemmer::new()
    }
}

impl fmt::Debug for SnowballStemmer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SnowballStemmer")
            .field("algorithm", &"english")
            .finish()
    }
}

impl Stemmer for SnowballStemmer {
    fn stem(&self, word: &str) -> String {
        self.inner.stem(word).into_owned()
    }

    fn name(&self) -> &'static str {
        "snowball"
    }
}

/// Porter stemming algorithm implementation for English.
///
/// Input is expected to be lower-case. Words of two letters or fewer and
/// words containing non-ASCII letters are returned unchanged.
#[derive(Debug, Clone, Default)]
pub struct PorterStemmer;

impl PorterStemmer {
    /// Create a new Porter stemmer.
    pub fn new() -> Self {
        PorterStemmer
    }
}

impl Stemmer for PorterStemmer {
    fn stem(&self, word: &str) -> String {
        if word.len() <= 2 || !word.is_ascii() {
            return word.to_string();
        }

        let mut word = Word::new(word);
        word.step1ab();
        if !word.b.is_empty() {
            word.step1c();
            word.step2();
            word.step3();
            word.step4();
            word.step5();
        }

        // Only ASCII bytes are ever written back.
        String::from_utf8_lossy(&word.b).into_owned()
    }

    fn name(&self) -> &'static str {
        "porter"
    }
}

const STEP2_RULES: &[(&str, &str)] = &[
    ("ational", "ate"),
    ("tional", "tion"),
    ("enci", "ence"),
    ("anci", "ance"),
    ("izer", "ize"),
    ("bli", "ble"),
    ("alli", "al"),
    ("entli", "ent"),
    ("eli", "e"),
    ("ousli", "ous"),
    ("ization", "ize"),
    ("ation", "ate"),
    ("ator", "ate"),
    ("alism", "al"),
    ("iveness", "ive"),
    ("fulness", "ful"),
    ("ousness", "ous"),
    ("aliti", "al"),
    ("iviti", "ive"),
    ("biliti", "ble"),
    ("logi", "log"),
];

const STEP3_RULES: &[(&str, &str)] = &[
    ("icate", "ic"),
    ("ative", ""),
    ("alize", "al"),
    ("iciti", "ic"),
    ("ical", "ic"),
    ("ful", ""),
    ("ness", ""),
];

// "ement" must be tried before "ment" and "ent".
const STEP4_SUFFIXES: &[&str] = &[
    "al", "ance", "ence", "er", "ic", "able", "ible", "ant", "ement", "ment", "ent", "ion", "ou",
    "ism", "ate", "iti", "ous", "ive", "ize",
];

/// Working buffer for one word.
///
/// `j` is the length of the stem left in front of the suffix most recently
/// matched by [`Word::ends`].
struct Word {
    b: Vec<u8>,
    j: usize,
}

impl Word {
    fn new(word: &str) -> Self {
        Word {
            b: word.as_bytes().to_vec(),
            j: 0,
        }
    }

    /// Check if the byte at `i` is a consonant.
    fn cons(&self, i: usize) -> bool {
        match self.b[i] {
            b'a' | b'e' | b'i' | b'o' | b'u' => false,
            b'y' => i == 0 || !self.cons(i - 1),
            _ => true,
        }
    }

    /// Number of vowel-consonant sequences in `b[..j]`.
    fn measure(&self) -> usize {
        let mut n = 0;
        let mut i = 0;

        // Skip initial consonants
        while i < self.j && self.cons(i) {
            i += 1;
        }

        loop {
            while i < self.j && !self.cons(i) {
                i += 1;
            }
            if i >= self.j {
                return n;
            }
            while i < self.j && self.cons(i) {
                i += 1;
            }
            n += 1;
        }
    }

    fn vowel_in_stem(&self) -> bool {
        (0..self.j).any(|i| !self.cons(i))
    }

    /// Check if `b[i-1..=i]` is a double consonant.
    fn double_consonant(&self, i: usize) -> bool {
        i >= 1 && self.b[i] == self.b[i - 1] && self.cons(i)
    }

    /// Check if `b[i-2..=i]` is consonant-vowel-consonant where the last
    /// consonant is not w, x or y.
    fn cvc(&self, i: usize) -> bool {
        if i < 2 || !self.cons(i) || self.cons(i - 1) || !self.cons(i - 2) {
            return false;
        }
        !matches!(self.b[i], b'w' | b'x' | b'y')
    }

    fn ends(&mut self, suffix: &str) -> bool {
        if !self.b.ends_with(suffix.as_bytes()) {
            return false;
        }
        self.j = self.b.len() - suffix.len();
        true
    }

    fn set_to(&mut self, replacement: &str) {
        self.b.truncate(self.j);
        self.b.extend_from_slice(replacement.as_bytes());
    }

    fn replace_if_measured(&mut self, replacement: &str) {
        if self.measure() > 0 {
            self.set_to(replacement);
        }
    }

    fn last(&self) -> u8 {
        self.b[self.b.len() - 1]
    }

    fn step1ab(&mut self) {
        if self.last() == b's' {
            if self.ends("sses") {
                self.set_to("ss");
            } else if self.ends("ies") {
                self.set_to("i");
            } else if self.b.len() >= 2 && self.b[self.b.len() - 2] != b's' {
                self.b.pop();
            }
        }

        if self.b.is_empty() {
            return;
        }

        if self.ends("eed") {
            if self.measure() > 0 {
                self.b.pop();
            }
        } else if (self.ends("ed") || self.ends("ing")) && self.vowel_in_stem() {
            self.b.truncate(self.j);
            if self.ends("at") {
                self.set_to("ate");
            } else if self.ends("bl") {
                self.set_to("ble");
            } else if self.ends("iz") {
                self.set_to("ize");
            } else if self.double_consonant(self.b.len() - 1) {
                if !matches!(self.last(), b'l' | b's' | b'z') {
                    self.b.pop();
                }
            } else {
                self.j = self.b.len();
                if self.measure() == 1 && self.cvc(self.b.len() - 1) {
                    self.b.push(b'e');
                }
            }
        }
    }

    fn step1c(&mut self) {
        if self.ends("y") && self.vowel_in_stem() {
            let last = self.b.len() - 1;
            self.b[last] = b'i';
        }
    }

    fn step2(&mut self) {
        for (suffix, replacement) in STEP2_RULES {
            if self.ends(suffix) {
                self.replace_if_measured(replacement);
                return;
            }
        }
    }

    fn step3(&mut self) {
        for (suffix, replacement) in STEP3_RULES {
            if self.ends(suffix) {
                self.replace_if_measured(replacement);
                return;
            }
        }
    }

    fn step4(&mut self) {
        for suffix in STEP4_SUFFIXES {
            if self.ends(suffix) {
                if *suffix == "ion" && !(self.j >= 1 && matches!(self.b[self.j - 1], b's' | b't'))
                {
                    return;
                }
                if self.measure() > 1 {
                    self.b.truncate(self.j);
                }
                return;
            }
        }
    }

    fn step5(&mut self) {
        self.j = self.b.len();
        if self.last() == b'e' {
            let m = self.measure();
            if m > 1 || (m == 1 && !self.cvc(self.b.len() - 2)) {
                self.b.pop();
            }
        }
        if self.last() == b'l' && self.double_consonant(self.b.len() - 1) && self.measure() > 1 {
            self.b.pop();
        }
    }
}
