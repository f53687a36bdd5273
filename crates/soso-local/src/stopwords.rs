//! Line-delimited stopword lists.

use soso_core::{Error, Result};
use std::collections::HashSet;
use std::path::Path;

/// Membership-only set of terms excluded from keyword ranking.
///
/// Matching is exact (case-sensitive), the same way keywords are keyed.
#[derive(Debug, Clone, Default)]
pub struct StopwordSet {
    words: HashSet<String>,
}

impl StopwordSet {
    pub fn empty() -> Self {
        Self::default()
    }

    /// Parse one term per line; lines are trimmed and blank lines dropped.
    pub fn parse(text: &str) -> Self {
        text.lines().collect()
    }

    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .map_err(|e| Error::Stopwords(format!("{}: {e}", path.display())))?;
        let set = Self::parse(&text);
        tracing::debug!(path = %path.display(), words = set.len(), "loaded stopwords");
        Ok(set)
    }

    /// Load `path`, falling back to an empty set when it is missing or unreadable.
    ///
    /// The second element is `Some(warning)` when the fallback was taken.
    pub fn load_or_empty(path: Option<&Path>) -> (Self, Option<&'static str>) {
        let Some(path) = path else {
            tracing::warn!("no stopwords path configured; every token is a keyword candidate");
            return (Self::empty(), Some("stopwords_not_configured"));
        };
        match Self::load(path) {
            Ok(set) => (set, None),
            Err(e) => {
                tracing::warn!(error = %e, "using empty stopword set");
                (Self::empty(), Some("stopwords_unavailable"))
            }
        }
    }

    pub fn contains(&self, word: &str) -> bool {
        self.words.contains(word)
    }

    pub fn insert(&mut self, word: &str) {
        let w = word.trim();
        if !w.is_empty() {
            self.words.insert(w.to_string());
        }
    }

    pub fn len(&self) -> usize {
        self.words.len()
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }
}

impl<'a> FromIterator<&'a str> for StopwordSet {
    fn from_iter<I: IntoIterator<Item = &'a str>>(iter: I) -> Self {
        let mut set = Self::empty();
        for w in iter {
            set.insert(w);
        }
        set
    }
}
