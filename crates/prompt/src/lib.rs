//! Prompt system for the sefer search CLI.
//!
//! This crate provides structured prompt management with:
//! - YAML-based prompt definitions, with built-in defaults
//! - Handlebars template rendering
//! - Source passage and conversation history injection

pub mod builder;
pub mod loader;
pub mod types;

// Re-export main types
pub use builder::build_prompt;
pub use loader::{list_prompts, load_prompt, ANSWER_PROMPT_ID, TRANSLATE_PROMPT_ID};
pub use types::{
    BuiltPrompt, BuiltPromptMetadata, PromptBehavior, PromptContextConfig, PromptDefinition,
    PromptInput, PromptOutputSpec, PromptSource, PromptTurn,
};
