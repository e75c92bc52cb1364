//! Run configuration.

use std::fs::File;
use std::io::BufReader;
use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{Result, SearchError};

/// Settings for one indexing and querying run.
///
/// Every field has a default, so a config file only needs the fields it
/// changes:
///
/// ```
/// use stemdex::config::EngineConfig;
///
/// let config: EngineConfig = serde_json::from_str(r#"{ "threads": 8 }"#).unwrap();
///
/// assert_eq!(config.threads, 8);
/// assert_eq!(config.max_pages, 1);
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Worker threads for the concurrent pipeline.
    pub threads: usize,

    /// Maximum number of distinct pages a crawl may admit.
    pub max_pages: usize,

    /// Redirects followed per fetch.
    pub max_redirects: u32,

    /// Overall timeout per fetch, in seconds.
    pub fetch_timeout_secs: u64,

    /// Match query stems exactly instead of as prefixes.
    pub exact: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        EngineConfig {
            threads: 5,
            max_pages: 1,
            max_redirects: 3,
            fetch_timeout_secs: 30,
            exact: false,
        }
    }
}

impl EngineConfig {
    /// Load a config from a JSON file.
    pub fn from_json_file(path: &Path) -> Result<Self> {
        let reader = BufReader::new(File::open(path)?);
        let config: EngineConfig = serde_json::from_reader(reader)?;
        Ok(config)
    }

    /// Reject values the engine cannot run with.
    pub fn validate(&self) -> Result<()> {
        if self.threads == 0 {
            return Err(SearchError::invalid_argument("threads must be at least 1"));
        }
        if self.max_pages == 0 {
            return Err(SearchError::invalid_argument("max pages must be at least 1"));
        }
        Ok(())
    }

    /// The fetch timeout as a [`Duration`].
    pub fn fetch_timeout(&self) -> Duration {
        Duration::from_secs(self.fetch_timeout_secs)
    }
}
