//! Recursive literal search over text files
//!
//! A search produces a [`SearchResults`] value: the matches, numbered from 1
//! across the whole search, and the files that could not be read. Indexes are
//! only meaningful within the result set that produced them.

use anyhow::Result;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

use crate::error_helpers;
use crate::text;

/// Extension searched when the configuration does not name one
pub const DEFAULT_EXTENSION: &str = "txt";

/// One line containing the search string
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Match {
    /// 1-based, assigned in discovery order
    pub index: usize,
    pub file: PathBuf,
    /// 1-based line number at discovery time
    pub line_number: usize,
    /// Line content without its terminator
    pub line: String,
}

/// A file or directory entry that could not be searched
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchFailure {
    pub file: PathBuf,
    pub message: String,
}

/// Everything one search call found
#[derive(Debug, Clone, Default)]
pub struct SearchResults {
    matches: Vec<Match>,
    failures: Vec<SearchFailure>,
}

impl SearchResults {
    /// Look up a match by its 1-based index
    pub fn get(&self, index: usize) -> Option<&Match> {
        // Indexes are dense, so position = index - 1
        index
            .checked_sub(1)
            .and_then(|i| self.matches.get(i))
            .filter(|m| m.index == index)
    }

    pub fn matches(&self) -> &[Match] {
        &self.matches
    }

    pub fn failures(&self) -> &[SearchFailure] {
        &self.failures
    }

    pub fn len(&self) -> usize {
        self.matches.len()
    }

    pub fn is_empty(&self) -> bool {
        self.matches.is_empty()
    }
}

/// Searches files with a given extension (case-insensitive) for a literal substring
#[derive(Debug, Clone)]
pub struct Matcher {
    extension: String,
}

impl Default for Matcher {
    fn default() -> Self {
        Self::new(DEFAULT_EXTENSION)
    }
}

impl Matcher {
    pub fn new(extension: impl Into<String>) -> Self {
        Self {
            extension: extension.into(),
        }
    }

    /// Whether a file name ends in `.<extension>`, ignoring case.
    ///
    /// A bare `.txt` counts even though [`Path::extension`] sees no extension there.
    pub fn accepts(&self, path: &Path) -> bool {
        let Some(name) = path.file_name() else {
            return false;
        };
        let name = name.to_string_lossy().to_ascii_lowercase();
        name.ends_with(&format!(".{}", self.extension.to_ascii_lowercase()))
    }

    /// Search every matching file under `root` for `needle`.
    ///
    /// Unreadable files are recorded in [`SearchResults::failures`] and skipped.
    pub fn search(&self, root: &Path, needle: &str) -> SearchResults {
        let mut results = SearchResults::default();

        // Sorted walk keeps match numbering stable between runs
        for entry in WalkDir::new(root).follow_links(true).sort_by_file_name() {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    let file = e
                        .path()
                        .map(Path::to_path_buf)
                        .unwrap_or_else(|| root.to_path_buf());
                    tracing::warn!(file = %file.display(), error = %e, "could not walk entry");
                    results.failures.push(SearchFailure {
                        file,
                        message: e.to_string(),
                    });
                    continue;
                }
            };

            if !entry.file_type().is_file() || !self.accepts(entry.path()) {
                continue;
            }

            if let Err(e) = self.search_file(entry.path(), needle, &mut results.matches) {
                let message = error_helpers::describe_read_failure(entry.path(), &e);
                tracing::warn!(
                    file = %entry.path().display(),
                    error = %message,
                    "could not read file"
                );
                results.failures.push(SearchFailure {
                    file: entry.path().to_path_buf(),
                    message,
                });
            }
        }

        tracing::debug!(
            root = %root.display(),
            matches = results.matches.len(),
            failures = results.failures.len(),
            "search finished"
        );
        results
    }

    fn search_file(&self, path: &Path, needle: &str, matches: &mut Vec<Match>) -> Result<()> {
        let content = text::read_lossy(path)?;

        for (i, line) in text::split_lines(&content).iter().enumerate() {
            let line = text::strip_terminator(line);
            if line.contains(needle) {
                matches.push(Match {
                    index: matches.len() + 1,
                    file: path.to_path_buf(),
                    line_number: i + 1,
                    line: line.to_string(),
                });
            }
        }

        Ok(())
    }
}

/// Search `root` for `needle` in `.txt` files
pub fn search(root: &Path, needle: &str) -> SearchResults {
    Matcher::default().search(root, needle)
}
