//! Per-passage relevance scoring.
//!
//! The composite score is coverage + exact-phrase bonus + length adjustment.
//! Coverage steps are at least 1.0 and the length adjustment is at most 0.5,
//! so length never reorders passages with different coverage.

use crate::corpus::Passage;
use crate::decompose::{SearchTerm, TermClass};
use serde::{Deserialize, Serialize};

/// Bonus for quoting the normalized phrase verbatim.
pub const EXACT_PHRASE_BONUS: f64 = 100.0;

/// Peak of the length adjustment, reached inside the preferred band.
pub const MAX_LENGTH_ADJUSTMENT: f64 = 0.5;

/// Preferred passage length in characters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LengthBand {
    pub min: usize,
    pub max: usize,
}

impl Default for LengthBand {
    fn default() -> Self {
        Self {
            min: 500,
            max: 2000,
        }
    }
}

impl LengthBand {
    /// Bonus in `[0, MAX_LENGTH_ADJUSTMENT]`: flat inside the band, linear
    /// ramp below it, inverse decay above it.
    pub fn adjustment(&self, length: usize) -> f64 {
        if length == 0 {
            0.0
        } else if length < self.min {
            MAX_LENGTH_ADJUSTMENT * length as f64 / self.min as f64
        } else if length > self.max {
            MAX_LENGTH_ADJUSTMENT * self.max as f64 / length as f64
        } else {
            MAX_LENGTH_ADJUSTMENT
        }
    }
}

/// Structured score of one passage.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScoreBreakdown {
    pub total: f64,
    pub coverage: f64,
    #[serde(rename = "phraseBonus")]
    pub phrase_bonus: f64,
    #[serde(rename = "lengthAdjustment")]
    pub length_adjustment: f64,
    /// Terms found in the passage, in term order
    pub matched: Vec<SearchTerm>,
}

impl ScoreBreakdown {
    fn new(
        coverage: f64,
        phrase_bonus: f64,
        length_adjustment: f64,
        matched: Vec<SearchTerm>,
    ) -> Self {
        Self {
            total: coverage + phrase_bonus + length_adjustment,
            coverage,
            phrase_bonus,
            length_adjustment,
            matched,
        }
    }
}

/// Score a passage against the ordered term list.
///
/// Returns `None` when no term matches; such passages are never emitted.
/// Empty passage text is unmatchable.
pub fn score(passage: &Passage, terms: &[SearchTerm], band: &LengthBand) -> Option<ScoreBreakdown> {
    if passage.text.is_empty() {
        return None;
    }

    let haystack = passage.folded_text();
    let matched: Vec<SearchTerm> = terms
        .iter()
        .filter(|term| !term.folded.is_empty() && haystack.contains(term.folded.as_str()))
        .cloned()
        .collect();

    if matched.is_empty() {
        return None;
    }

    let coverage: f64 = matched.iter().map(SearchTerm::weight).sum();

    let phrase_bonus = terms
        .iter()
        .find(|term| term.class == TermClass::Phrase)
        .filter(|phrase| passage.text.contains(phrase.text.as_str()))
        .map_or(0.0, |_| EXACT_PHRASE_BONUS);

    let breakdown = ScoreBreakdown::new(
        coverage,
        phrase_bonus,
        band.adjustment(passage.length),
        matched,
    );
    Some(breakdown)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::corpus::{Citation, Collection};
    use crate::decompose::decompose;
    use crate::lexicon::Script;
    use crate::normalize::NormalizedQuery;

    fn passage(text: &str) -> Passage {
        Passage::new("p", Collection::Treatise, text, Citation::default())
    }

    fn terms(tokens: &[&str]) -> Vec<SearchTerm> {
        let query = NormalizedQuery {
            original: tokens.join(" "),
            text: tokens.join(" "),
            tokens: tokens.iter().map(|t| t.to_string()).collect(),
            script: Script::Hebrew,
        };
        decompose(&query, 2)
    }

    #[test]
    fn test_length_adjustment_curve() {
        let band = LengthBand::default();
        assert_eq!(band.adjustment(0), 0.0);
        assert_eq!(band.adjustment(250), 0.25);
        assert_eq!(band.adjustment(500), 0.5);
        assert_eq!(band.adjustment(2000), 0.5);
        assert_eq!(band.adjustment(4000), 0.25);
        assert!(band.adjustment(1_000_000) > 0.0);
    }

    #[test]
    fn test_no_match_is_none() {
        let band = LengthBand::default();
        assert!(score(&passage("צמצום"), &terms(&["ביטול"]), &band).is_none());
        assert!(score(&passage(""), &terms(&["ביטול"]), &band).is_none());
    }

    #[test]
    fn test_full_phrase_breakdown() {
        let band = LengthBand::default();
        let result = score(
            &passage("ענין ביטול היש הוא"),
            &terms(&["ביטול", "היש"]),
            &band,
        )
        .unwrap();

        // phrase + both tokens
        assert_eq!(result.coverage, 1002.0);
        assert_eq!(result.phrase_bonus, EXACT_PHRASE_BONUS);
        assert!(result.length_adjustment > 0.0 && result.length_adjustment < 0.5);
        assert_eq!(
            result.total,
            result.coverage + result.phrase_bonus + result.length_adjustment
        );
        assert_eq!(result.matched.len(), 3);
    }

    #[test]
    fn test_phrase_bonus_is_case_sensitive() {
        let band = LengthBand::default();
        let result = score(&passage("Ein Sof"), &terms(&["ein", "sof"]), &band).unwrap();
        assert_eq!(result.coverage, 1002.0);
        assert_eq!(result.phrase_bonus, 0.0);
    }

    #[test]
    fn test_matching_ignores_niqqud() {
        let band = LengthBand::default();
        let result = score(&passage("בְּרֵאשִׁית בָּרָא"), &terms(&["בראשית"]), &band);
        assert!(result.is_some());
    }

    #[test]
    fn test_tokens_only_score_below_phrase() {
        let band = LengthBand::default();
        let query = terms(&["אור", "אין", "סוף"]);
        let fragments = score(&passage("סוף ... אור ... אין"), &query, &band).unwrap();
        let phrase = score(&passage("אור אין סוף"), &query, &band).unwrap();
        assert_eq!(fragments.coverage, 3.0);
        assert!(phrase.total > fragments.total);
    }
}
