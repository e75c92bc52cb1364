//! Error types for stemdex.
//!
//! All fallible operations return [`Result`], whose error side is the
//! [`SearchError`] enum. Failures inside a single file build or page fetch are
//! reported through this type and then logged by the caller; they never abort
//! a whole build or crawl.
//!
//! # Examples
//!
//! ```
//! use stemdex::error::{Result, SearchError};
//!
//! fn check_threads(threads: usize) -> Result<()> {
//!     if threads == 0 {
//!         return Err(SearchError::invalid_argument("threads must be positive"));
//!     }
//!     Ok(())
//! }
//!
//! assert!(check_threads(0).is_err());
//! assert!(check_threads(4).is_ok());
//! ```

use std::io;

use thiserror::Error;

/// The main error type for stemdex operations.
#[derive(Error, Debug)]
pub enum SearchError {
    /// I/O errors (unreadable files, failed writes).
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// JSON serialization/deserialization errors.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// A page could not be fetched or was not HTML.
    #[error("Fetch error: {0}")]
    Fetch(String),

    /// Malformed input such as a bad URL, a zero budget or a bad config value.
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// The operation is not valid in the current state (e.g. a shut down queue).
    #[error("Invalid operation: {0}")]
    InvalidOperation(String),

    /// A task panicked or an internal invariant could not be upheld.
    #[error("Internal error: {0}")]
    Internal(String),
}

/// Result type alias for operations that may fail with [`SearchError`].
pub type Result<T> = std::result::Result<T, SearchError>;

impl SearchError {
    /// Create a new fetch error.
    pub fn fetch<S: Into<String>>(msg: S) -> Self {
        SearchError::Fetch(msg.into())
    }

    /// Create a new invalid argument error.
    pub fn invalid_argument<S: Into<String>>(msg: S) -> Self {
        SearchError::InvalidArgument(msg.into())
    }

    /// Create a new invalid operation error.
    pub fn invalid_operation<S: Into<String>>(msg: S) -> Self {
        SearchError::InvalidOperation(msg.into())
    }

    /// Create a new internal error.
    pub fn internal<S: Into<String>>(msg: S) -> Self {
        SearchError::Internal(msg.into())
    }
}
