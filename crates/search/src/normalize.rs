//! Query normalization: tokenize, strip leading question words, apply synonyms.

use crate::lexicon::{Lexicon, Script};
use crate::types::Query;
use serde::Serialize;

/// Punctuation trimmed from both ends of every token.
///
/// Apostrophes, geresh and gershayim stay: they are part of words like
/// `ה'` and `חב"ד`.
const EDGE_PUNCTUATION: &[char] = &[
    '?', '!', '.', ',', ';', ':', '"', '(', ')', '[', ']', '{', '}', '«', '»', '“', '”', '„',
    '׃', '־', '…', '¿', '¡',
];

/// A query after normalization.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NormalizedQuery {
    /// The raw query as submitted
    pub original: String,
    /// Normalized tokens joined by single spaces
    pub text: String,
    pub tokens: Vec<String>,
    /// Script detected on the raw query
    pub script: Script,
}

impl NormalizedQuery {
    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }
}

/// Normalize a raw query against the lexicon.
///
/// Never fails: unknown scripts and untranslatable tokens pass through.
/// Only the question prefix is removed; no length cap applies.
pub fn normalize(query: &Query, lexicon: &Lexicon) -> NormalizedQuery {
    let script = Script::detect(&query.text);

    let mut tokens: Vec<&str> = query
        .text
        .split_whitespace()
        .map(trim_token)
        .filter(|t| !t.is_empty())
        .collect();

    // A query made only of question words is searched as typed.
    let leading = lexicon
        .question_words
        .leading_run(&tokens, script, query.hint);
    if leading < tokens.len() {
        tokens.drain(..leading);
    }

    let mut normalized: Vec<String> = Vec::with_capacity(tokens.len());
    let mut i = 0;
    while i < tokens.len() {
        match lexicon.synonyms.lookup(&tokens[i..]) {
            Some((consumed, canonical)) => {
                normalized.extend(canonical.split_whitespace().map(str::to_string));
                i += consumed;
            }
            None => {
                normalized.push(tokens[i].to_string());
                i += 1;
            }
        }
    }

    let result = NormalizedQuery {
        original: query.text.clone(),
        text: normalized.join(" "),
        tokens: normalized,
        script,
    };

    tracing::debug!(
        original = %result.original,
        normalized = %result.text,
        script = script.as_str(),
        "Normalized query"
    );

    result
}

fn trim_token(token: &str) -> &str {
    token.trim_matches(|c: char| EDGE_PUNCTUATION.contains(&c))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::LanguageHint;

    fn norm(text: &str) -> NormalizedQuery {
        normalize(&Query::new(text), &Lexicon::builtin())
    }

    #[test]
    fn test_strips_leading_question_words_and_punctuation() {
        let result = norm("What is tzimtzum?");
        assert_eq!(result.text, "צמצום");
        assert_eq!(result.script, Script::Latin);
        assert_eq!(result.original, "What is tzimtzum?");
    }

    #[test]
    fn test_hebrew_question_prefix() {
        let result = norm("מהו ביטול היש בעבודת ה'?");
        assert_eq!(result.text, "ביטול היש בעבודת ה'");
        assert_eq!(result.script, Script::Hebrew);
    }

    #[test]
    fn test_question_words_mid_sentence_are_kept() {
        let result = norm("explain how the soul ascends");
        assert_eq!(result.tokens, vec!["נשמה", "ascends"]);

        let result = norm("אהבה מה היא");
        assert_eq!(result.text, "אהבה מה היא");
    }

    #[test]
    fn test_content_phrases_pass_through() {
        for raw in ["ענין הצמצום", "ספר המאמרים", "the Rebbe", "משמעות החיים", "דער רבי"] {
            assert_eq!(norm(raw).text, raw);
        }
    }

    #[test]
    fn test_fillers_after_question_word_are_stripped() {
        assert_eq!(norm("what is the meaning of tzimtzum?").text, "צמצום");
        assert_eq!(norm("מה הוא ענין הצמצום").text, "הצמצום");
        assert_eq!(norm("וואס מיינט ביטול היש").text, "ביטול היש");
    }

    #[test]
    fn test_only_question_words_are_kept() {
        let result = norm("what is?");
        assert_eq!(result.text, "what is");
    }

    #[test]
    fn test_longest_synonym_wins() {
        let result = norm("love of Israel and love");
        assert_eq!(result.text, "אהבת ישראל and אהבה");
    }

    #[test]
    fn test_unmatched_tokens_pass_through_unchanged() {
        let result = norm("Baal Shem Tov");
        assert_eq!(result.text, "Baal Shem Tov");
    }

    #[test]
    fn test_keeps_gershayim() {
        let result = norm("\"חב\"ד\"");
        assert_eq!(result.text, "חב\"ד");
    }

    #[test]
    fn test_idempotent() {
        let lexicon = Lexicon::builtin();
        for raw in [
            "What is tzimtzum?",
            "מהו ביטול היש",
            "explain how the soul ascends",
            "what is",
            "  אור   אין סוף ",
        ] {
            let once = normalize(&Query::new(raw), &lexicon);
            let twice = normalize(&Query::new(once.text.clone()), &lexicon);
            assert_eq!(once.text, twice.text, "not idempotent for {:?}", raw);
        }
    }

    #[test]
    fn test_empty_and_whitespace() {
        assert!(norm("").is_empty());
        assert!(norm("   \t ").is_empty());
        assert!(norm("?!").is_empty());
    }

    #[test]
    fn test_hint_widens_question_words() {
        let lexicon = Lexicon::builtin();
        let query = Query::new("what ביטול").with_hint(None);
        // Mixed already consults both sets
        assert_eq!(normalize(&query, &lexicon).text, "ביטול");

        let query = Query::new("explain ביטול").with_hint(Some(LanguageHint::Hebrew));
        assert_eq!(normalize(&query, &lexicon).text, "ביטול");
    }

    #[test]
    fn test_long_query_keeps_every_token() {
        let raw: Vec<String> = (1..=20).map(|i| format!("אא{}", i)).collect();
        let result = norm(&raw.join(" "));
        assert_eq!(result.tokens, raw);
    }
}
