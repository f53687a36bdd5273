//! Keyword frequency/position statistics over a token stream.

use crate::stopwords::StopwordSet;
use soso_core::{Keyword, Position, Token};
use std::collections::HashMap;

/// Count every non-blank, non-stopword token and record where it occurred.
///
/// Rows advance at row-marker tokens, but only when the closing row had at least one
/// counted occurrence; stopwords never consume an index slot. The result is ordered by
/// [`Keyword::rank_cmp`]: descending count, then ascending first occurrence.
pub fn rank_keywords(tokens: &[Token], stopwords: &StopwordSet) -> Vec<Keyword> {
    let mut by_text: HashMap<&str, Keyword> = HashMap::new();
    let mut row = 1usize;
    let mut index = 1usize;

    for token in tokens {
        if token.is_row_marker() {
            if index != 1 {
                row += 1;
            }
            index = 1;
            continue;
        }
        if token.is_blank() || stopwords.contains(&token.text) {
            continue;
        }
        let kw = by_text
            .entry(token.text.as_str())
            .or_insert_with(|| Keyword {
                text: token.text.clone(),
                count: 0,
                positions: Vec::new(),
                token: token.clone(),
            });
        kw.positions.push(Position::new(row, index));
        kw.count += 1;
        index += 1;
    }

    let mut out: Vec<Keyword> = by_text.into_values().collect();
    out.sort_by(Keyword::rank_cmp);
    out
}

/// Number of tokens [`rank_keywords`] counts.
pub fn counted_tokens(tokens: &[Token], stopwords: &StopwordSet) -> usize {
    tokens
        .iter()
        .filter(|t| !t.is_row_marker() && !t.is_blank() && !stopwords.contains(&t.text))
        .count()
}
