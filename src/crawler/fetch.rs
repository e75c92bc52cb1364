//! Fetching pages for the crawler.

use std::time::Duration;

use log::debug;
use ureq::Agent;
use ureq::http::header::CONTENT_TYPE;

use crate::error::{Result, SearchError};

/// Source of HTML pages.
///
/// The crawler calls `fetch` from many worker threads at once.
pub trait Fetcher: Send + Sync {
    /// Return the HTML body at `url`, or an error if the page cannot be
    /// retrieved or is not HTML.
    fn fetch(&self, url: &str) -> Result<String>;
}

/// Fetches pages over HTTP(S).
///
/// Redirects are followed up to `max_redirects` times; every request is
/// bounded by `timeout` overall.
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    agent: Agent,
    max_redirects: u32,
}

impl HttpFetcher {
    /// Default number of redirects followed per fetch.
    pub const DEFAULT_MAX_REDIRECTS: u32 = 3;

    /// Default overall timeout per fetch.
    pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

    /// Create a fetcher with the given redirect budget and timeout.
    pub fn new(max_redirects: u32, timeout: Duration) -> Self {
        let config = Agent::config_builder()
            .timeout_global(Some(timeout))
            .max_redirects(max_redirects)
            .http_status_as_error(true)
            .build();

        HttpFetcher {
            agent: Agent::new_with_config(config),
            max_redirects,
        }
    }

    /// Redirect budget of this fetcher.
    pub fn max_redirects(&self) -> u32 {
        self.max_redirects
    }
}

impl Default for HttpFetcher {
    fn default() -> Self {
        HttpFetcher::new(Self::DEFAULT_MAX_REDIRECTS, Self::DEFAULT_TIMEOUT)
    }
}

impl Fetcher for HttpFetcher {
    fn fetch(&self, url: &str) -> Result<String> {
        let mut response = self
            .agent
            .get(url)
            .call()
            .map_err(|e| SearchError::fetch(format!("{url}: {e}")))?;

        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .unwrap_or_default();
        if !is_html(content_type) {
            return Err(SearchError::fetch(format!(
                "{url}: not an HTML page (content type {content_type:?})"
            )));
        }

        let body = response
            .body_mut()
            .read_to_string()
            .map_err(|e| SearchError::fetch(format!("{url}: failed to read body: {e}")))?;
        debug!("fetched {url} ({} bytes)", body.len());

        Ok(body)
    }
}

/// Whether a `Content-Type` header value names `text/html`, ignoring case and
/// parameters such as the charset.
fn is_html(content_type: &str) -> bool {
    content_type
        .split(';')
        .next()
        .is_some_and(|mime| mime.trim().eq_ignore_ascii_case("text/html"))
}
