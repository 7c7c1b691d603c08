//! Expands a normalized query into an ordered list of search terms.

use crate::lexicon::fold;
use crate::normalize::NormalizedQuery;
use serde::Serialize;
use std::collections::HashSet;

/// Longest sliding sub-phrase, in tokens.
pub const MAX_SUBPHRASE_TOKENS: usize = 4;

/// Origin class of a search term, which fixes its weight.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TermClass {
    Phrase,
    SubPhrase,
    Token,
}

impl TermClass {
    /// Coverage weight of one matched term of this class.
    ///
    /// A passage holding the phrase also holds every fragment of it, so a
    /// phrase match outranks any fragment-only match at any query length.
    pub fn weight(&self) -> f64 {
        match self {
            Self::Phrase => 1000.0,
            Self::SubPhrase => 10.0,
            Self::Token => 1.0,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Phrase => "phrase",
            Self::SubPhrase => "subphrase",
            Self::Token => "token",
        }
    }
}

/// A candidate substring derived from a query.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SearchTerm {
    pub text: String,
    #[serde(skip)]
    pub folded: String,
    pub class: TermClass,
}

impl SearchTerm {
    fn new(text: String, class: TermClass) -> Self {
        Self {
            folded: fold(&text),
            text,
            class,
        }
    }

    pub fn weight(&self) -> f64 {
        self.class.weight()
    }
}

/// Decompose a normalized query into phrase, sub-phrase and token terms.
///
/// Order: the full phrase, then windows of 4 down to 2 tokens left to right,
/// then single tokens of at least `min_token_chars` characters. A term whose
/// folded form was already emitted is skipped. An empty query yields no terms.
pub fn decompose(query: &NormalizedQuery, min_token_chars: usize) -> Vec<SearchTerm> {
    let tokens = &query.tokens;
    if tokens.is_empty() {
        return Vec::new();
    }

    let mut seen = HashSet::new();
    let mut terms = Vec::new();
    let mut push = |text: String, class: TermClass| {
        let term = SearchTerm::new(text, class);
        if seen.insert(term.folded.clone()) {
            terms.push(term);
        }
    };

    push(tokens.join(" "), TermClass::Phrase);

    let longest = MAX_SUBPHRASE_TOKENS.min(tokens.len());
    for len in (2..=longest).rev() {
        for window in tokens.windows(len) {
            push(window.join(" "), TermClass::SubPhrase);
        }
    }

    for token in tokens {
        if token.chars().count() >= min_token_chars {
            push(token.clone(), TermClass::Token);
        }
    }

    tracing::debug!(terms = terms.len(), "Decomposed query");
    terms
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexicon::Script;

    fn query(tokens: &[&str]) -> NormalizedQuery {
        NormalizedQuery {
            original: tokens.join(" "),
            text: tokens.join(" "),
            tokens: tokens.iter().map(|t| t.to_string()).collect(),
            script: Script::Latin,
        }
    }

    fn texts(terms: &[SearchTerm]) -> Vec<(&str, TermClass)> {
        terms.iter().map(|t| (t.text.as_str(), t.class)).collect()
    }

    #[test]
    fn test_three_token_order() {
        let terms = decompose(&query(&["A", "B", "C"]), 1);
        assert_eq!(
            texts(&terms),
            vec![
                ("A B C", TermClass::Phrase),
                ("A B", TermClass::SubPhrase),
                ("B C", TermClass::SubPhrase),
                ("A", TermClass::Token),
                ("B", TermClass::Token),
                ("C", TermClass::Token),
            ]
        );
    }

    #[test]
    fn test_windows_longest_first() {
        let terms = decompose(&query(&["t1", "t2", "t3", "t4", "t5"]), 2);
        let sub: Vec<&str> = terms
            .iter()
            .filter(|t| t.class == TermClass::SubPhrase)
            .map(|t| t.text.as_str())
            .collect();
        assert_eq!(
            sub,
            vec![
                "t1 t2 t3 t4",
                "t2 t3 t4 t5",
                "t1 t2 t3",
                "t2 t3 t4",
                "t3 t4 t5",
                "t1 t2",
                "t2 t3",
                "t3 t4",
                "t4 t5"
            ]
        );
        assert_eq!(terms[0].class, TermClass::Phrase);
        assert_eq!(terms.len(), 1 + 9 + 5);
    }

    #[test]
    fn test_single_token_is_phrase_only() {
        let terms = decompose(&query(&["ביטול"]), 2);
        assert_eq!(texts(&terms), vec![("ביטול", TermClass::Phrase)]);
    }

    #[test]
    fn test_dedup_keeps_highest_priority() {
        let terms = decompose(&query(&["Or", "or", "Or"]), 2);
        assert_eq!(
            texts(&terms),
            vec![
                ("Or or Or", TermClass::Phrase),
                ("Or or", TermClass::SubPhrase),
                ("Or", TermClass::Token)
            ]
        );
    }

    #[test]
    fn test_short_tokens_skipped() {
        let terms = decompose(&query(&["ה'", "x", "אחד"]), 2);
        let tokens: Vec<&str> = terms
            .iter()
            .filter(|t| t.class == TermClass::Token)
            .map(|t| t.text.as_str())
            .collect();
        assert_eq!(tokens, vec!["ה'", "אחד"]);
    }

    #[test]
    fn test_empty_query_yields_nothing() {
        assert!(decompose(&query(&[]), 2).is_empty());
    }

    #[test]
    fn test_class_weights_ordered() {
        assert!(TermClass::Phrase.weight() > TermClass::SubPhrase.weight());
        assert!(TermClass::SubPhrase.weight() > TermClass::Token.weight());
    }
}
