//! Breadth-first web crawler feeding a shared index.
//!
//! Starting from one seed URL, each page task fetches its page, offers the
//! page's links to a bounded [`Frontier`], queues a task for every link the
//! frontier admits, and finally indexes the page's text. The frontier caps
//! the number of distinct pages a crawl can ever touch, so the crawl ends
//! once every admitted page has been processed.
//!
//! # Examples
//!
//! ```
//! use std::collections::HashMap;
//! use std::sync::Arc;
//!
//! use stemdex::crawler::{Crawler, Fetcher};
//! use stemdex::error::{Result, SearchError};
//! use stemdex::index::ConcurrentInvertedIndex;
//! use stemdex::work_queue::WorkQueue;
//!
//! struct Pages(HashMap<&'static str, &'static str>);
//!
//! impl Fetcher for Pages {
//!     fn fetch(&self, url: &str) -> Result<String> {
//!         self.0
//!             .get(url)
//!             .map(|page| page.to_string())
//!             .ok_or_else(|| SearchError::fetch(url))
//!     }
//! }
//!
//! let pages = Pages(HashMap::from([
//!     ("http://site.test/", r#"<a href="/about">About</a> Welcome"#),
//!     ("http://site.test/about", "<p>Computers</p>"),
//! ]));
//!
//! let index = Arc::new(ConcurrentInvertedIndex::new());
//! let queue = Arc::new(WorkQueue::new(2).unwrap());
//! let crawler = Crawler::new(Arc::clone(&index), queue, Arc::new(pages), Default::default(), 5);
//!
//! let report = crawler.crawl("http://site.test").unwrap();
//! assert_eq!(report.indexed, 2);
//! assert!(index.contains_location("comput", "http://site.test/about"));
//! ```

pub mod fetch;
pub mod html;

use std::collections::HashSet;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use log::{debug, info, warn};
use parking_lot::Mutex;

use crate::analysis::TextAnalyzer;
use crate::error::{Result, SearchError};
use crate::index::{ConcurrentInvertedIndex, InvertedIndex};
use crate::work_queue::{Spawner, WorkQueue};

pub use fetch::{Fetcher, HttpFetcher};

/// The set of URLs a crawl has admitted, bounded by a page budget.
#[derive(Debug)]
pub struct Frontier {
    seen: Mutex<HashSet<String>>,
    max_pages: usize,
}

impl Frontier {
    /// Create an empty frontier that admits at most `max_pages` URLs.
    pub fn new(max_pages: usize) -> Self {
        Frontier {
            seen: Mutex::new(HashSet::new()),
            max_pages,
        }
    }

    /// Admit `url` if it is new and the budget is not spent.
    ///
    /// The check and the insert happen under one lock, so concurrent callers
    /// can never push the frontier past its budget.
    pub fn admit(&self, url: &str) -> bool {
        let mut seen = self.seen.lock();
        if seen.len() >= self.max_pages || seen.contains(url) {
            return false;
        }
        seen.insert(url.to_string())
    }

    /// Whether the budget is spent.
    pub fn is_full(&self) -> bool {
        self.seen.lock().len() >= self.max_pages
    }

    /// Number of URLs admitted so far.
    pub fn len(&self) -> usize {
        self.seen.lock().len()
    }

    /// Whether no URL has been admitted yet.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// The page budget.
    pub fn max_pages(&self) -> usize {
        self.max_pages
    }
}

/// Outcome of one [`Crawler::crawl`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CrawlReport {
    /// Distinct URLs admitted to the frontier, the seed included.
    pub admitted: usize,

    /// Pages fetched and merged into the index.
    pub indexed: usize,

    /// Pages whose task failed, for example because the fetch failed.
    pub failed: usize,
}

/// Crawls from a seed URL into a [`ConcurrentInvertedIndex`].
pub struct Crawler {
    index: Arc<ConcurrentInvertedIndex>,
    queue: Arc<WorkQueue>,
    fetcher: Arc<dyn Fetcher>,
    analyzer: TextAnalyzer,
    max_pages: usize,
}

impl Crawler {
    /// Create a crawler that indexes at most `max_pages` pages per crawl.
    pub fn new(
        index: Arc<ConcurrentInvertedIndex>,
        queue: Arc<WorkQueue>,
        fetcher: Arc<dyn Fetcher>,
        analyzer: TextAnalyzer,
        max_pages: usize,
    ) -> Self {
        Crawler {
            index,
            queue,
            fetcher,
            analyzer,
            max_pages,
        }
    }

    /// Crawl from `seed` and block until every admitted page is processed.
    ///
    /// Pages that fail to fetch are logged by the queue and left out of the
    /// index; only a bad seed or a zero budget fails the crawl itself.
    pub fn crawl(&self, seed: &str) -> Result<CrawlReport> {
        if self.max_pages == 0 {
            return Err(SearchError::invalid_argument(
                "crawl page budget must be at least 1",
            ));
        }
        let seed = html::normalize_url(seed).ok_or_else(|| {
            SearchError::invalid_argument(format!("seed is not an http(s) URL: {seed}"))
        })?;

        info!("crawling from {seed} (max {} pages)", self.max_pages);
        let frontier = Arc::new(Frontier::new(self.max_pages));
        let indexed = Arc::new(AtomicUsize::new(0));
        frontier.admit(&seed);

        let task = PageTask {
            url: seed,
            context: Arc::new(CrawlContext {
                index: Arc::clone(&self.index),
                fetcher: Arc::clone(&self.fetcher),
                analyzer: self.analyzer.clone(),
                frontier: Arc::clone(&frontier),
                spawner: self.queue.spawner(),
                indexed: Arc::clone(&indexed),
            }),
        };
        task.submit()?;
        self.queue.finish();

        let admitted = frontier.len();
        let indexed = indexed.load(Ordering::SeqCst);
        let report = CrawlReport {
            admitted,
            indexed,
            failed: admitted - indexed,
        };
        info!(
            "crawl finished: {} admitted, {} indexed, {} failed",
            report.admitted, report.indexed, report.failed
        );
        Ok(report)
    }
}

/// Everything a page task needs, shared by all tasks of one crawl.
struct CrawlContext {
    index: Arc<ConcurrentInvertedIndex>,
    fetcher: Arc<dyn Fetcher>,
    analyzer: TextAnalyzer,
    frontier: Arc<Frontier>,
    spawner: Spawner,
    indexed: Arc<AtomicUsize>,
}

struct PageTask {
    url: String,
    context: Arc<CrawlContext>,
}

impl PageTask {
    fn submit(self) -> Result<()> {
        let spawner = self.context.spawner.clone();
        spawner.execute(move || self.run())
    }

    fn run(self) -> Result<()> {
        let context = &self.context;
        let page = context.fetcher.fetch(&self.url)?;

        for link in html::extract_links(&self.url, &html::strip_block_elements(&page)) {
            if context.frontier.is_full() {
                break;
            }
            if context.frontier.admit(&link) {
                debug!("admitted {link}");
                let task = PageTask {
                    url: link,
                    context: Arc::clone(&self.context),
                };
                // The page itself is still indexed below.
                if let Err(e) = task.submit() {
                    warn!("could not queue links of {}: {e}", self.url);
                    break;
                }
            }
        }

        let stems = context.analyzer.stems(&html::strip_markup(&page));
        let mut shard = InvertedIndex::new();
        shard.add_all(stems, &self.url);
        context.index.merge_owned(shard);
        context.indexed.fetch_add(1, Ordering::SeqCst);

        debug!("indexed {}", self.url);
        Ok(())
    }
}
