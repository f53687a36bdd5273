use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::path::PathBuf;

#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("dictionary load failed: {0}")]
    Dictionary(String),
    #[error("stopwords load failed: {0}")]
    Stopwords(String),
    #[error("io error: {0}")]
    Io(String),
    #[error("not configured: {0}")]
    NotConfigured(String),
}

pub type Result<T> = std::result::Result<T, Error>;

/// Text of the row-boundary marker token emitted by segmenters.
pub const ROW_MARKER: &str = "\n";

/// One unit of segmented text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Token {
    /// Exact source text (never normalized).
    pub text: String,
    /// Corpus frequency from the dictionary; 0 for out-of-dictionary units.
    pub frequency: u64,
}

impl Token {
    pub fn new(text: impl Into<String>, frequency: u64) -> Self {
        Self {
            text: text.into(),
            frequency,
        }
    }

    pub fn is_row_marker(&self) -> bool {
        self.text == ROW_MARKER
    }

    pub fn is_blank(&self) -> bool {
        self.text.trim().is_empty()
    }
}

/// Where a counted keyword occurrence sits: `row` is the content line, `index` the ordinal
/// of the occurrence among counted occurrences of that row (1-based).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Position {
    pub row: usize,
    pub index: usize,
}

impl Position {
    pub fn new(row: usize, index: usize) -> Self {
        Self { row, index }
    }
}

impl Ord for Position {
    fn cmp(&self, other: &Self) -> Ordering {
        self.row
            .cmp(&other.row)
            .then_with(|| self.index.cmp(&other.index))
    }
}

impl PartialOrd for Position {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Keyword {
    pub text: String,
    pub count: usize,
    /// Invariant: `positions.len() == count`, in token order.
    pub positions: Vec<Position>,
    /// Token of the first occurrence.
    pub token: Token,
}

impl Keyword {
    pub fn first_position(&self) -> Option<Position> {
        self.positions.first().copied()
    }

    /// Ranking order: higher `count` first, then earlier first occurrence.
    ///
    /// Two distinct keywords never share a first position, so this is a total order over
    /// the keywords of one document.
    pub fn rank_cmp(&self, other: &Self) -> Ordering {
        other
            .count
            .cmp(&self.count)
            .then_with(|| self.first_position().cmp(&other.first_position()))
            .then_with(|| self.text.cmp(&other.text))
    }
}

/// Tokenizer capability consumed by the analysis pipeline.
///
/// Implementations must be deterministic and order-preserving, and must emit a
/// [`ROW_MARKER`] token for every line break in the input. Shared read-only across
/// documents, hence `Send + Sync`.
pub trait Segmenter: Send + Sync {
    fn name(&self) -> &'static str;
    fn segment(&self, text: &str) -> Vec<Token>;
    /// Aggregate corpus frequency of the loaded dictionary.
    fn total_frequency(&self) -> u64;
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalyzerConfig {
    pub dictionary_path: Option<PathBuf>,
    pub stopwords_path: Option<PathBuf>,
}

pub const ENV_DICTIONARY_PATH: &str = "SOSO_DICTIONARY_PATH";
pub const ENV_STOPWORDS_PATH: &str = "SOSO_STOPWORDS_PATH";

fn env_path(key: &str) -> Option<PathBuf> {
    std::env::var(key)
        .ok()
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .map(PathBuf::from)
}

impl AnalyzerConfig {
    pub fn from_env() -> Self {
        Self {
            dictionary_path: env_path(ENV_DICTIONARY_PATH),
            stopwords_path: env_path(ENV_STOPWORDS_PATH),
        }
    }

    pub fn dictionary_path(&self) -> Result<&PathBuf> {
        self.dictionary_path
            .as_ref()
            .ok_or_else(|| Error::NotConfigured(format!("dictionary path ({ENV_DICTIONARY_PATH})")))
    }
}
