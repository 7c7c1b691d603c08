//! Retrieval-augmented answering and translation.
//!
//! Builds generation inputs from ranked passages and the conversation window;
//! the generation service itself stays behind [`sefer_llm::LlmClient`].

pub mod ask;
pub mod translate;
pub mod types;

pub use ask::ask;
pub use translate::{translate, DEFAULT_TARGET_LANGUAGE};
pub use types::{AnswerResponse, AskOptions, SourceRef, TranslationResponse};
