//! Prompt types.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// A prompt definition loaded from YAML.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PromptDefinition {
    /// Unique prompt identifier
    pub id: String,

    /// Human-readable title
    pub title: String,

    /// API version for schema evolution
    #[serde(rename = "apiVersion")]
    pub api_version: String,

    /// Creator identifier
    #[serde(rename = "createdBy", default)]
    pub created_by: String,

    /// Behavioral settings
    pub behavior: PromptBehavior,

    /// Context injection settings
    #[serde(default)]
    pub context: PromptContextConfig,

    /// System message template (Handlebars)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub system: Option<String>,

    /// User message template (Handlebars)
    pub template: String,

    /// Output specification
    pub output: PromptOutputSpec,
}

/// Behavioral settings for prompt execution.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PromptBehavior {
    /// Tone (e.g., "scholarly", "conversational")
    pub tone: String,

    /// Style (e.g., "concise", "detailed")
    pub style: String,

    /// Suggested sampling temperature
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,

    /// Suggested output token limit
    #[serde(rename = "maxTokens", default, skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,
}

/// Which context blocks the template receives.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PromptContextConfig {
    /// Pass ranked passages as `sources`
    #[serde(rename = "includeSources", default = "default_true")]
    pub include_sources: bool,

    /// Pass the conversation window as `history`
    #[serde(rename = "includeHistory", default = "default_true")]
    pub include_history: bool,

    /// Per-source text limit in characters
    #[serde(rename = "maxSourceChars", default, skip_serializing_if = "Option::is_none")]
    pub max_source_chars: Option<usize>,
}

fn default_true() -> bool {
    true
}

impl Default for PromptContextConfig {
    fn default() -> Self {
        Self {
            include_sources: true,
            include_history: true,
            max_source_chars: None,
        }
    }
}

/// Output specification for the prompt.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PromptOutputSpec {
    /// Output format (e.g., "text", "markdown", "html")
    pub format: String,
}

/// One cited passage as the template sees it.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PromptSource {
    /// 1-based position in the ranking
    pub index: usize,
    pub id: String,
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub section: Option<String>,
    /// Discourse title (ד״ה) when the passage has one
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subsection: Option<String>,
    pub collection: String,
    pub text: String,
}

/// One conversation turn as the template sees it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PromptTurn {
    /// "User" or "Assistant"
    pub role: String,
    pub text: String,
}

/// Everything a template can reference.
#[derive(Debug, Clone, Default)]
pub struct PromptInput {
    /// The user's question as typed
    pub query: String,
    pub sources: Vec<PromptSource>,
    pub history: Vec<PromptTurn>,
    /// Extra template variables (e.g., "targetLanguage")
    pub variables: HashMap<String, String>,
}

impl PromptInput {
    pub fn new(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            ..Default::default()
        }
    }

    pub fn with_sources(mut self, sources: Vec<PromptSource>) -> Self {
        self.sources = sources;
        self
    }

    pub fn with_history(mut self, history: Vec<PromptTurn>) -> Self {
        self.history = history;
        self
    }

    pub fn with_variable(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.variables.insert(key.into(), value.into());
        self
    }
}

/// A fully built prompt ready for generation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BuiltPrompt {
    /// System message (optional)
    pub system: Option<String>,

    /// User message (required)
    pub user: String,

    /// Metadata about the built prompt
    pub metadata: BuiltPromptMetadata,
}

/// Metadata about a built prompt.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BuiltPromptMetadata {
    #[serde(rename = "sourcePromptId")]
    pub source_prompt_id: String,

    #[serde(rename = "sourcesIncluded")]
    pub sources_included: usize,

    #[serde(rename = "historyTurns")]
    pub history_turns: usize,

    #[serde(rename = "temperature", skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,

    #[serde(rename = "maxTokens", skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,
}
