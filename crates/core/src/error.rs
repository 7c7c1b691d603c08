//! Error types for Sefer Search.
//!
//! This module defines a unified error enum that covers all error categories
//! in the application: configuration, I/O, generation, corpus loading,
//! search, prompt and serialization errors.

use thiserror::Error;

/// Unified error type for Sefer Search.
///
/// All fallible functions in the workspace return `Result<T, AppError>`.
/// The search core itself is infallible; errors come from loading and generation.
#[derive(Error, Debug)]
pub enum AppError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// I/O and filesystem errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Generation service errors
    #[error("LLM error: {0}")]
    Llm(String),

    /// Corpus loading errors (missing root, duplicate passage ids)
    #[error("Corpus error: {0}")]
    Corpus(String),

    /// Search orchestration errors
    #[error("Search error: {0}")]
    Search(String),

    /// Prompt system errors
    #[error("Prompt error: {0}")]
    Prompt(String),

    /// Serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Generic errors
    #[error("{0}")]
    Other(String),
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::Serialization(err.to_string())
    }
}

impl From<serde_yaml::Error> for AppError {
    fn from(err: serde_yaml::Error) -> Self {
        AppError::Serialization(err.to_string())
    }
}

/// Convenience type alias for Results with AppError.
pub type AppResult<T> = Result<T, AppError>;
