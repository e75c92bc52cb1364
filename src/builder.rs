//! Index builders for local text files.
//!
//! [`IndexBuilder`] walks a file or directory tree and indexes every text
//! file it finds, either straight into an [`InvertedIndex`] or, with
//! [`IndexBuilder::build_concurrent`], through a [`WorkQueue`] that builds a
//! private shard per file and merges it into a shared
//! [`ConcurrentInvertedIndex`].
//!
//! A file's location is its path as discovered, so `docs/a.txt` when the
//! build started from `docs`.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use log::{debug, info, warn};

use crate::analysis::TextAnalyzer;
use crate::error::Result;
use crate::index::{ConcurrentInvertedIndex, InvertedIndex};
use crate::work_queue::WorkQueue;

/// Builds inverted indexes from files on disk.
///
/// # Examples
///
/// ```
/// use std::fs;
///
/// use stemdex::builder::IndexBuilder;
/// use stemdex::index::InvertedIndex;
///
/// let dir = tempfile::tempdir().unwrap();
/// fs::write(dir.path().join("a.txt"), "Computers compute").unwrap();
/// fs::write(dir.path().join("skip.md"), "ignored").unwrap();
///
/// let mut index = InvertedIndex::new();
/// IndexBuilder::default().build(dir.path(), &mut index).unwrap();
///
/// assert_eq!(index.num_terms(), 1);
/// assert_eq!(index.word_counts().len(), 1);
/// ```
#[derive(Clone, Debug, Default)]
pub struct IndexBuilder {
    analyzer: TextAnalyzer,
}

impl IndexBuilder {
    /// Create a builder that stems with `analyzer`.
    pub fn new(analyzer: TextAnalyzer) -> Self {
        IndexBuilder { analyzer }
    }

    /// Whether `path` has a `.txt` or `.text` extension, in any case.
    pub fn is_text_file(path: &Path) -> bool {
        path.extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| ext.eq_ignore_ascii_case("txt") || ext.eq_ignore_ascii_case("text"))
    }

    /// Index one file. Positions continue across lines.
    ///
    /// The whole file is read before anything is added, so a read error
    /// leaves `index` untouched.
    pub fn build_file(&self, path: &Path, index: &mut InvertedIndex) -> Result<()> {
        let stems = self.analyzer.stem_file(path)?;
        debug!("indexed {} ({} words)", path.display(), stems.len());
        index.add_all(stems, &location_of(path));
        Ok(())
    }

    /// Index `path`: every text file beneath it if it is a directory, or the
    /// file itself otherwise, whatever its extension.
    pub fn build(&self, path: &Path, index: &mut InvertedIndex) -> Result<()> {
        if !path.is_dir() {
            return self.build_file(path, index);
        }

        let files = text_files(path)?;
        info!("building index from {} files under {}", files.len(), path.display());
        for file in &files {
            if let Err(e) = self.build_file(file, index) {
                warn!("skipping {}: {e}", file.display());
            }
        }
        info!(
            "index built: {} terms, {} locations",
            index.num_terms(),
            index.word_counts().len()
        );
        Ok(())
    }

    /// Index `path` like [`build`](Self::build), one queue task per file.
    ///
    /// Each task stems its file into a private [`InvertedIndex`] and merges
    /// it into `index` once. Returns after every task has finished; a file
    /// that fails is logged by the queue and left out.
    pub fn build_concurrent(
        &self,
        path: &Path,
        index: &Arc<ConcurrentInvertedIndex>,
        queue: &WorkQueue,
    ) -> Result<()> {
        let files = if path.is_dir() {
            text_files(path)?
        } else {
            // Surface a missing root here rather than as a failed task.
            fs::metadata(path)?;
            vec![path.to_path_buf()]
        };

        info!(
            "building index from {} files under {} on {} threads",
            files.len(),
            path.display(),
            queue.size()
        );
        for file in files {
            let builder = self.clone();
            let index = Arc::clone(index);
            queue.execute(move || {
                let mut shard = InvertedIndex::new();
                builder.build_file(&file, &mut shard)?;
                index.merge_owned(shard);
                Ok(())
            })?;
        }
        queue.finish();

        info!(
            "index built: {} terms, {} locations",
            index.num_terms(),
            index.word_counts().len()
        );
        Ok(())
    }
}

fn location_of(path: &Path) -> String {
    path.to_string_lossy().into_owned()
}

/// Every text file under `root`, depth first with entries in name order.
///
/// An unreadable `root` is an error; unreadable subdirectories are logged
/// and skipped.
fn text_files(root: &Path) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for entry in sorted_entries(root)? {
        collect_text_files(entry, &mut files);
    }
    Ok(files)
}

fn collect_text_files(path: PathBuf, files: &mut Vec<PathBuf>) {
    if path.is_dir() {
        // Symlinked directories may form cycles.
        if is_symlink(&path) {
            debug!("skipping symlinked directory {}", path.display());
            return;
        }
        match sorted_entries(&path) {
            Ok(entries) => {
                for entry in entries {
                    collect_text_files(entry, files);
                }
            }
            Err(e) => warn!("skipping directory {}: {e}", path.display()),
        }
    } else if IndexBuilder::is_text_file(&path) {
        files.push(path);
    }
}

fn is_symlink(path: &Path) -> bool {
    fs::symlink_metadata(path).is_ok_and(|metadata| metadata.file_type().is_symlink())
}

fn sorted_entries(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut entries = Vec::new();
    for entry in fs::read_dir(dir)? {
        entries.push(entry?.path());
    }
    entries.sort();
    Ok(entries)
}

#[cfg(test)]
mod tests {
    use tempfile::TempDir;

    use super::*;

    fn fixture() -> TempDir {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir_all(dir.path().join("nested/deeper")).unwrap();
        fs::write(dir.path().join("a.txt"), "hello world\nhello again").unwrap();
        fs::write(dir.path().join("B.TEXT"), "Worlds apart").unwrap();
        fs::write(dir.path().join("notes.md"), "hello markdown").unwrap();
        fs::write(dir.path().join("nested/c.Txt"), "nested hello").unwrap();
        fs::write(dir.path().join("nested/deeper/d.txt"), "").unwrap();
        dir
    }

    #[test]
    fn test_is_text_file() {
        assert!(IndexBuilder::is_text_file(Path::new("a.txt")));
        assert!(IndexBuilder::is_text_file(Path::new("dir/A.TXT")));
        assert!(IndexBuilder::is_text_file(Path::new("b.Text")));
        assert!(!IndexBuilder::is_text_file(Path::new("c.md")));
        assert!(!IndexBuilder::is_text_file(Path::new("txt")));
        assert!(!IndexBuilder::is_text_file(Path::new("d.txt.bak")));
    }

    #[test]
    fn test_build_file_positions_span_lines() {
        let dir = fixture();
        let path = dir.path().join("a.txt");
        let location = location_of(&path);

        let mut index = InvertedIndex::new();
        IndexBuilder::default().build_file(&path, &mut index).unwrap();

        assert_eq!(index.positions("hello", &location).collect::<Vec<_>>(), vec![1, 3]);
        assert!(index.contains_position("again", &location, 4));
        assert_eq!(index.word_count(&location), Some(4));
    }

    #[test]
    fn test_build_directory_filters_and_recurses() {
        let dir = fixture();
        let mut index = InvertedIndex::new();
        IndexBuilder::default().build(dir.path(), &mut index).unwrap();

        let locations: Vec<_> = index.word_counts().keys().cloned().collect();
        assert_eq!(locations.len(), 3, "{locations:?}");
        assert!(locations.iter().all(|l| !l.ends_with("notes.md")));
        assert_eq!(index.num_locations("hello"), 2);
        assert_eq!(index.num_locations("world"), 2);
    }

    #[test]
    fn test_build_single_file_ignores_extension() {
        let dir = fixture();
        let mut index = InvertedIndex::new();
        IndexBuilder::default()
            .build(&dir.path().join("notes.md"), &mut index)
            .unwrap();

        assert!(index.contains_term("markdown"));
    }

    #[test]
    fn test_missing_root_is_error() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("missing");
        let builder = IndexBuilder::default();

        assert!(builder.build(&missing, &mut InvertedIndex::new()).is_err());

        let queue = WorkQueue::new(2).unwrap();
        let shared = Arc::new(ConcurrentInvertedIndex::new());
        assert!(builder.build_concurrent(&missing, &shared, &queue).is_err());
    }

    #[test]
    fn test_concurrent_matches_sequential() {
        let dir = fixture();
        let builder = IndexBuilder::default();

        let mut expected = InvertedIndex::new();
        builder.build(dir.path(), &mut expected).unwrap();

        let queue = WorkQueue::new(3).unwrap();
        let shared = Arc::new(ConcurrentInvertedIndex::new());
        builder.build_concurrent(dir.path(), &shared, &queue).unwrap();

        assert_eq!(shared.snapshot(), expected);
        // The empty file is a task too, it just adds nothing.
        assert_eq!(queue.stats().completed, 4);
    }

    #[cfg(unix)]
    #[test]
    fn test_symlinked_directory_loop_is_skipped() {
        let dir = fixture();
        std::os::unix::fs::symlink(dir.path(), dir.path().join("nested/loop")).unwrap();

        let mut index = InvertedIndex::new();
        IndexBuilder::default().build(dir.path(), &mut index).unwrap();

        assert_eq!(index.word_counts().len(), 3);
        assert_eq!(index.num_locations("hello"), 2);
    }
}
