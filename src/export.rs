//! Pretty-printed JSON output for the index, word counts and query results.
//!
//! Every writer takes a plain value rather than a lock, so callers export a
//! snapshot and never hold an index lock during file I/O.
//!
//! ```text
//! index.json    { "term": { "location": [1, 5] } }
//! counts.json   { "location": 40 }
//! results.json  { "query": [ { "count": 2, "score": 0.05, "where": "location" } ] }
//! ```

use std::collections::BTreeMap;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use log::info;
use serde::Serialize;

use crate::error::Result;
use crate::index::{InvertedIndex, SearchResult};

/// Write every term → location → positions posting of `index`.
pub fn write_index(path: &Path, index: &InvertedIndex) -> Result<()> {
    write_json(path, index.postings())?;
    info!("wrote index of {} terms to {}", index.num_terms(), path.display());
    Ok(())
}

/// Write the word count of every location.
pub fn write_counts(path: &Path, counts: &BTreeMap<String, usize>) -> Result<()> {
    write_json(path, counts)?;
    info!("wrote {} word counts to {}", counts.len(), path.display());
    Ok(())
}

/// Write the ranked results of every canonical query.
pub fn write_results(path: &Path, results: &BTreeMap<String, Vec<SearchResult>>) -> Result<()> {
    write_json(path, results)?;
    info!("wrote results of {} queries to {}", results.len(), path.display());
    Ok(())
}

fn write_json<T: Serialize + ?Sized>(path: &Path, value: &T) -> Result<()> {
    let mut writer = BufWriter::new(File::create(path)?);
    serde_json::to_writer_pretty(&mut writer, value)?;
    writer.write_all(b"\n")?;
    writer.flush()?;
    Ok(())
}
