//! Ordering and truncation of scored passages.

use crate::corpus::Passage;
use crate::scoring::ScoreBreakdown;
use serde::Serialize;
use std::cmp::Ordering;

/// A passage with its score, produced per request.
#[derive(Debug, Clone, Serialize)]
pub struct ScoredPassage<'a> {
    pub passage: &'a Passage,
    /// Position in the corpus, the final tie-break
    #[serde(rename = "corpusIndex")]
    pub corpus_index: usize,
    pub score: ScoreBreakdown,
}

impl ScoredPassage<'_> {
    pub fn total(&self) -> f64 {
        self.score.total
    }
}

/// Total order used for ranking: score descending, then phrase bonus
/// descending, then corpus index ascending.
pub fn compare(a: &ScoredPassage<'_>, b: &ScoredPassage<'_>) -> Ordering {
    b.score
        .total
        .total_cmp(&a.score.total)
        .then_with(|| b.score.phrase_bonus.total_cmp(&a.score.phrase_bonus))
        .then_with(|| a.corpus_index.cmp(&b.corpus_index))
}

/// Sort and keep the first `cap` passages. Passage data is returned whole.
pub fn rank(mut scored: Vec<ScoredPassage<'_>>, cap: usize) -> Vec<ScoredPassage<'_>> {
    scored.sort_by(compare);
    scored.truncate(cap);
    scored
}
