//! Dictionary-driven segmentation.
//!
//! `DictSegmenter` is the bundled [`Segmenter`]: a shortest-path segmentation over a
//! frequency dictionary. It is intentionally small; anything implementing the trait can be
//! injected into a `Document` instead.

use soso_core::{AnalyzerConfig, Error, Result, Segmenter, Token};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// Terms spanning more units than this are ignored at load time.
const MAX_TERM_UNITS: usize = 16;

/// Extra cost (bits) for a unit the dictionary does not cover.
const UNKNOWN_PENALTY: f64 = 16.0;

/// Term → corpus frequency table.
#[derive(Debug, Clone, Default)]
pub struct Dictionary {
    // Keys are ASCII-lowercased.
    freqs: HashMap<String, u64>,
    total: u64,
    max_units: usize,
}

impl Dictionary {
    /// Load a dictionary file: one `term [frequency [pos]]` per line.
    pub fn load(path: &Path) -> Result<Self> {
        Self::load_many(&[path.to_path_buf()])
    }

    /// Load and merge several dictionary files (later files override earlier frequencies).
    pub fn load_many(paths: &[PathBuf]) -> Result<Self> {
        if paths.is_empty() {
            return Err(Error::Dictionary("no dictionary files given".to_string()));
        }
        let mut dict = Self::default();
        for p in paths {
            let text = std::fs::read_to_string(p)
                .map_err(|e| Error::Dictionary(format!("{}: {e}", p.display())))?;
            dict.extend_from_str(&text);
        }
        if dict.is_empty() {
            return Err(Error::Dictionary(format!(
                "no terms found in {}",
                paths
                    .iter()
                    .map(|p| p.display().to_string())
                    .collect::<Vec<_>>()
                    .join(",")
            )));
        }
        tracing::debug!(
            files = paths.len(),
            terms = dict.len(),
            total_frequency = dict.total,
            "loaded dictionary"
        );
        Ok(dict)
    }

    /// Comma-separated list of dictionary files, e.g. `"base.txt,extra.txt"`.
    pub fn load_list(spec: &str) -> Result<Self> {
        let paths: Vec<PathBuf> = spec
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(PathBuf::from)
            .collect();
        Self::load_many(&paths)
    }

    /// Load the dictionary list named by `cfg.dictionary_path` (comma-separated files allowed).
    pub fn from_config(cfg: &AnalyzerConfig) -> Result<Self> {
        Self::load_list(&cfg.dictionary_path()?.to_string_lossy())
    }

    pub fn parse(text: &str) -> Self {
        let mut dict = Self::default();
        dict.extend_from_str(text);
        dict
    }

    fn extend_from_str(&mut self, text: &str) {
        for raw in text.lines() {
            let line = raw.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            let mut fields = line.split_whitespace();
            let Some(term) = fields.next() else { continue };
            let freq = fields
                .next()
                .and_then(|f| f.parse::<u64>().ok())
                .unwrap_or(1);
            self.insert(term, freq);
        }
    }

    pub fn insert(&mut self, term: &str, frequency: u64) {
        let units = split_units(term).len();
        if units == 0 || units > MAX_TERM_UNITS || frequency == 0 {
            return;
        }
        let prev = self
            .freqs
            .insert(term.to_ascii_lowercase(), frequency)
            .unwrap_or(0);
        // Frequencies come from user files; clamp instead of overflowing.
        self.total = self.total.saturating_sub(prev).saturating_add(frequency);
        self.max_units = self.max_units.max(units);
    }

    pub fn frequency(&self, term: &str) -> Option<u64> {
        self.freqs.get(&term.to_ascii_lowercase()).copied()
    }

    pub fn total_frequency(&self) -> u64 {
        self.total
    }

    pub fn len(&self) -> usize {
        self.freqs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.freqs.is_empty()
    }
}

/// Split text into segmentation units as byte ranges: a run of ASCII alphanumerics is one
/// unit, every other character is a unit of its own. Units cover the input exactly.
fn split_units(text: &str) -> Vec<(usize, usize)> {
    let mut out = Vec::new();
    let mut run_start: Option<usize> = None;
    for (i, ch) in text.char_indices() {
        if ch.is_ascii_alphanumeric() {
            if run_start.is_none() {
                run_start = Some(i);
            }
            continue;
        }
        if let Some(s) = run_start.take() {
            out.push((s, i));
        }
        out.push((i, i + ch.len_utf8()));
    }
    if let Some(s) = run_start {
        out.push((s, text.len()));
    }
    out
}

#[derive(Debug, Clone)]
pub struct DictSegmenter {
    dict: Dictionary,
}

impl DictSegmenter {
    pub fn new(dict: Dictionary) -> Self {
        Self { dict }
    }

    pub fn load(path: &Path) -> Result<Self> {
        Dictionary::load(path).map(Self::new)
    }

    pub fn dictionary(&self) -> &Dictionary {
        &self.dict
    }

    fn cost(&self, freq: u64) -> f64 {
        let total = self.dict.total.max(1) as f64;
        total.log2() - (freq.max(1) as f64).log2()
    }
}

impl Segmenter for DictSegmenter {
    fn name(&self) -> &'static str {
        "dict"
    }

    fn segment(&self, text: &str) -> Vec<Token> {
        let units = split_units(text);
        let n = units.len();
        if n == 0 {
            return Vec::new();
        }
        let unknown_cost = self.cost(1) + UNKNOWN_PENALTY;
        let max_len = self.dict.max_units.max(1);

        // best[i]: cheapest cost covering units[..i]; back[i]: (start unit, frequency).
        let mut best = vec![f64::INFINITY; n + 1];
        let mut back: Vec<(usize, u64)> = vec![(0, 0); n + 1];
        best[0] = 0.0;
        for i in 0..n {
            if !best[i].is_finite() {
                continue;
            }
            for len in 1..=max_len.min(n - i) {
                let j = i + len;
                let span = &text[units[i].0..units[j - 1].1];
                let (cost, freq) = match self.dict.frequency(span) {
                    Some(f) => (self.cost(f), f),
                    None if len == 1 => (unknown_cost, 0),
                    None => continue,
                };
                let cand = best[i] + cost;
                if cand < best[j] {
                    best[j] = cand;
                    back[j] = (i, freq);
                }
            }
        }

        let mut out = Vec::new();
        let mut j = n;
        while j > 0 {
            let (i, freq) = back[j];
            out.push(Token::new(&text[units[i].0..units[j - 1].1], freq));
            j = i;
        }
        out.reverse();
        out
    }

    fn total_frequency(&self) -> u64 {
        self.dict.total_frequency()
    }
}
