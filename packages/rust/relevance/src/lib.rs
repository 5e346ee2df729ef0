//! Relevance scoring of a short link pattern against a document body.
//!
//! A single-word pattern scores the number of times it occurs. A multi-word
//! pattern scores every place its words appear in order, close together and
//! within one sentence: each gap between consecutive words earns up to
//! [`GAP_BUDGET`] points, decaying with the gap's length.

use std::ops::Range;

/// Points a zero-length gap between two pattern words is worth.
pub const GAP_BUDGET: f64 = 20.0;

/// Decay exponent applied to gap lengths.
const GAP_EXPONENT: f64 = 4.0 / 5.0;

/// Matches whose gaps contain this are treated as spanning two sentences.
const SENTENCE_BREAK: &str = ". ";

/// Split a pattern into lower-cased search terms.
pub fn terms(pattern: &str) -> Vec<String> {
    pattern.split_whitespace().map(str::to_lowercase).collect()
}

/// Score how well `pattern` matches `haystack`. Always `>= 0`.
pub fn score(pattern: &str, haystack: &str) -> f64 {
    let terms = terms(pattern);
    let haystack = haystack.to_lowercase();

    match terms.as_slice() {
        [] => 0.0,
        [term] => haystack.matches(term.as_str()).count() as f64,
        _ => proximity_score(&terms, &haystack),
    }
}

/// Points earned by a single gap of `len` characters.
pub fn gap_score(len: usize) -> f64 {
    let partial = GAP_BUDGET - (len as f64).powf(GAP_EXPONENT);
    partial.max(0.0)
}

// ---------------------------------------------------------------------------
// Proximity scanner
// ---------------------------------------------------------------------------

/// One ordered occurrence of every term, with the gaps between them.
struct TermMatch {
    end: usize,
    gaps: Vec<Range<usize>>,
}

impl TermMatch {
    fn score(&self, text: &[char]) -> f64 {
        let joined = self
            .gaps
            .iter()
            .map(|gap| text[gap.clone()].iter().collect::<String>())
            .collect::<Vec<_>>()
            .join(" ");
        if joined.contains(SENTENCE_BREAK) {
            return 0.0;
        }

        self.gaps.iter().map(|gap| gap_score(gap.len())).sum()
    }
}

/// Sum the scores of all leftmost, non-overlapping ordered matches.
fn proximity_score(terms: &[String], haystack: &str) -> f64 {
    let text: Vec<char> = haystack.chars().collect();
    let terms: Vec<Vec<char>> = terms.iter().map(|t| t.chars().collect()).collect();

    let mut total = 0.0;
    let mut pos = 0;
    while pos < text.len() {
        match match_at(&text, &terms, pos) {
            Some(found) => {
                total += found.score(&text);
                pos = found.end.max(pos + 1);
            }
            None => pos += 1,
        }
    }
    total
}

/// Try to match all terms in order with the first one starting at `start`.
///
/// Each later term is taken at its earliest admissible position. Terms never
/// contain whitespace, so a later start can only narrow the options for the
/// remaining terms and no backtracking is needed.
fn match_at(text: &[char], terms: &[Vec<char>], start: usize) -> Option<TermMatch> {
    let (first, rest) = terms.split_first()?;
    if !term_at(text, first, start) {
        return None;
    }

    let mut cursor = start + first.len();
    let mut gaps = Vec::with_capacity(rest.len());
    for term in rest {
        let found = next_term(text, term, cursor)?;
        gaps.push(cursor..found);
        cursor = found + term.len();
    }

    Some(TermMatch { end: cursor, gaps })
}

/// Earliest position `>= from` where `term` starts on the same line.
fn next_term(text: &[char], term: &[char], from: usize) -> Option<usize> {
    let mut pos = from;
    while pos + term.len() <= text.len() {
        if text[pos] == '\n' {
            return None;
        }
        if term_at(text, term, pos) {
            return Some(pos);
        }
        pos += 1;
    }
    None
}

/// `term` occurs at `pos` and `pos` is a word boundary.
fn term_at(text: &[char], term: &[char], pos: usize) -> bool {
    text.get(pos..pos + term.len()) == Some(term) && is_boundary(text, pos)
}

fn is_boundary(text: &[char], pos: usize) -> bool {
    let before = pos.checked_sub(1).and_then(|i| text.get(i)).is_some_and(is_word);
    let after = text.get(pos).is_some_and(is_word);
    before != after
}

fn is_word(c: &char) -> bool {
    c.is_alphanumeric() || *c == '_'
}
