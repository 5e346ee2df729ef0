//! Candidate ranking: pick the corpus entry a link most likely means.

use smartlinks_relevance::score;

use crate::corpus::{Corpus, CorpusEntry};

/// The winning candidate for a link.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Selection<'a> {
    pub entry: &'a CorpusEntry,
    pub score: f64,
}

/// Score `href` against every entry except `exclude_slug` and return the best.
///
/// Ties go to the entry that comes first in the corpus. Returns `None` when
/// the corpus has no other entry or nothing scores above zero.
pub fn select_best<'a>(href: &str, corpus: &'a Corpus, exclude_slug: &str) -> Option<Selection<'a>> {
    let mut candidates: Vec<Selection<'a>> = corpus
        .entries()
        .iter()
        .filter(|entry| entry.slug != exclude_slug)
        .map(|entry| Selection {
            entry,
            score: score(href, &entry.haystack),
        })
        .collect();

    // Stable: equal scores keep corpus order.
    candidates.sort_by(|a, b| b.score.total_cmp(&a.score));

    candidates.into_iter().next().filter(|best| best.score > 0.0)
}
