//! Multilingual lexical search over a fixed corpus of passages.
//!
//! A raw question flows through the pipeline
//! normalize → decompose → score → rank, against a corpus loaded once and
//! shared read-only. A bounded conversation window travels alongside the
//! ranked passages to the generation step in [`rag`].
//!
//! # Example
//! ```no_run
//! use sefer_search::{load_corpus, Lexicon, Query, SearchConfig, SearchEngine};
//! use std::path::Path;
//! use std::sync::Arc;
//!
//! # fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let corpus = load_corpus(Path::new("corpus"))?;
//! let engine = SearchEngine::new(Arc::new(corpus), Arc::new(Lexicon::builtin()), SearchConfig::default());
//! for hit in engine.search(&Query::new("what is bittul?")) {
//!     println!("{:.2} {}", hit.total(), hit.passage.citation.title);
//! }
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod conversation;
pub mod corpus;
pub mod decompose;
pub mod engine;
pub mod lexicon;
pub mod loader;
pub mod normalize;
pub mod rag;
pub mod rank;
pub mod scoring;
pub mod types;

#[cfg(test)]
mod tests;

// Re-export commonly used types
pub use config::{load_config, SearchConfig};
pub use conversation::{ConversationTurn, ConversationWindow, Role, SessionRegistry};
pub use corpus::{Citation, Collection, Corpus, CorpusStats, Passage, SearchFilter, WorkSummary};
pub use decompose::{SearchTerm, TermClass};
pub use engine::{QueryPlan, SearchEngine, SearchOutcome};
pub use lexicon::{Lexicon, Script};
pub use loader::load_corpus;
pub use normalize::NormalizedQuery;
pub use rank::ScoredPassage;
pub use scoring::{LengthBand, ScoreBreakdown};
pub use types::{LanguageHint, Query};
