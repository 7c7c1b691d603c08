//! Search entry point: normalize → decompose → score → rank.

use crate::config::SearchConfig;
use crate::conversation::{ConversationTurn, ConversationWindow};
use crate::corpus::Corpus;
use crate::decompose::{decompose, SearchTerm};
use crate::lexicon::Lexicon;
use crate::normalize::{normalize, NormalizedQuery};
use crate::rank::{rank, ScoredPassage};
use crate::scoring::score;
use crate::types::Query;
use serde::Serialize;
use std::sync::Arc;

/// Ranked passages plus the conversation context for generation.
#[derive(Debug, Clone, Serialize)]
pub struct SearchOutcome<'a> {
    pub passages: Vec<ScoredPassage<'a>>,
    pub context: Vec<ConversationTurn>,
}

/// Query analysis shown by `search --explain`.
#[derive(Debug, Clone, Serialize)]
pub struct QueryPlan {
    pub normalized: NormalizedQuery,
    pub terms: Vec<SearchTerm>,
}

/// Stateless search over a shared corpus.
///
/// The corpus and lexicon are read-only and shared, so one engine can serve
/// concurrent requests without locking.
#[derive(Debug, Clone)]
pub struct SearchEngine {
    corpus: Arc<Corpus>,
    lexicon: Arc<Lexicon>,
    config: SearchConfig,
}

impl SearchEngine {
    pub fn new(corpus: Arc<Corpus>, lexicon: Arc<Lexicon>, config: SearchConfig) -> Self {
        Self {
            corpus,
            lexicon,
            config,
        }
    }

    pub fn corpus(&self) -> &Corpus {
        &self.corpus
    }

    pub fn config(&self) -> &SearchConfig {
        &self.config
    }

    /// Normalize and decompose without scoring.
    pub fn plan(&self, query: &Query) -> QueryPlan {
        let normalized = normalize(query, &self.lexicon);
        let terms = decompose(&normalized, self.config.min_token_chars);
        QueryPlan { normalized, terms }
    }

    /// Rank passages for a query. Deterministic for a fixed corpus, lexicon
    /// and config; an empty query yields no results.
    ///
    /// Passages outside `query.filter` are skipped before scoring.
    /// Tie-breaks still use their position in the full corpus.
    pub fn search(&self, query: &Query) -> Vec<ScoredPassage<'_>> {
        let plan = self.plan(query);
        if plan.terms.is_empty() {
            tracing::debug!("Empty query, nothing to search");
            return Vec::new();
        }

        let band = &self.config.preferred_length;
        let candidates: Vec<ScoredPassage<'_>> = self
            .corpus
            .passages()
            .iter()
            .enumerate()
            .filter(|(_, passage)| query.filter.matches(passage))
            .filter_map(|(corpus_index, passage)| {
                score(passage, &plan.terms, band).map(|breakdown| ScoredPassage {
                    passage,
                    corpus_index,
                    score: breakdown,
                })
            })
            .collect();

        tracing::debug!(
            normalized = %plan.normalized.text,
            script = plan.normalized.script.as_str(),
            terms = plan.terms.len(),
            filtered = !query.filter.is_empty(),
            candidates = candidates.len(),
            "Scored corpus"
        );

        rank(candidates, self.config.max_results)
    }

    /// Record the user turn, then search and snapshot the window.
    pub fn search_in_session(
        &self,
        query: &Query,
        window: &mut ConversationWindow,
    ) -> SearchOutcome<'_> {
        window.append(ConversationTurn::user(query.text.clone()));
        let passages = self.search(query);
        SearchOutcome {
            passages,
            context: window.snapshot(),
        }
    }
}
