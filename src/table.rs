//! Translation table
//!
//! Flat `key value` text file loaded once at startup. The producer maps
//! distribution keys to symbolic names with it; the command runner maps
//! symbolic names to shell commands. Both load their own copy.

use std::collections::HashMap;
use std::path::Path;

use crate::error::{Error, Result};

/// Longest key or value kept; longer tokens are truncated
pub const MAX_TOKEN_LEN: usize = 255;

/// Read-only `key -> value` map
#[derive(Debug, Clone, Default)]
pub struct TranslationTable {
    entries: HashMap<String, String>,
}

impl TranslationTable {
    /// Create an empty table
    pub fn new() -> Self {
        Self::default()
    }

    /// Load a table from a file
    ///
    /// Bytes that are not valid UTF-8 are replaced, so only a missing or
    /// unreadable file is an error.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let bytes = std::fs::read(path).map_err(|source| Error::Table {
            path: path.to_path_buf(),
            source,
        })?;

        let table = Self::parse(&String::from_utf8_lossy(&bytes));
        tracing::debug!(path = %path.display(), entries = table.len(), "Translation table loaded");
        Ok(table)
    }

    /// Parse table text
    ///
    /// Malformed and comment lines are skipped with a warning; a duplicate
    /// key keeps the value from the later line.
    pub fn parse(text: &str) -> Self {
        let mut entries = HashMap::new();

        for (lineno, line) in text.lines().enumerate() {
            let trimmed = line.trim();
            if trimmed.is_empty() {
                continue;
            }
            if trimmed.starts_with('#') {
                tracing::warn!(line = lineno + 1, "line ignored: {}", trimmed);
                continue;
            }

            let mut tokens = trimmed.split_whitespace();
            let (Some(key), Some(value)) = (tokens.next(), tokens.next()) else {
                tracing::warn!(line = lineno + 1, "line ignored: {}", trimmed);
                continue;
            };

            let key = truncate(key);
            let value = truncate(value);
            tracing::trace!(key, value, "Translation entry");

            entries.insert(key.to_owned(), value.to_owned());
        }

        Self { entries }
    }

    /// Look up the value for `key`
    ///
    /// A miss is not an error; callers pick their own fallback.
    pub fn lookup(&self, key: &str) -> Option<&str> {
        self.entries.get(key).map(String::as_str)
    }

    /// Number of entries
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if the table has no entries
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for TranslationTable {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            entries: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

fn truncate(token: &str) -> &str {
    match token.char_indices().nth(MAX_TOKEN_LEN) {
        Some((idx, _)) => &token[..idx],
        None => token,
    }
}
