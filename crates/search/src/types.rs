//! Request-level types shared across the search pipeline.

use crate::corpus::SearchFilter;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Language the user says they are writing in.
///
/// A hint only widens the question-word sets the normalizer consults.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LanguageHint {
    Hebrew,
    Yiddish,
    English,
}

impl LanguageHint {
    /// Parse from an ISO code or language name (`he`, `yi`, `en`, `hebrew`, ...).
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "he" | "heb" | "hebrew" | "עברית" => Some(Self::Hebrew),
            "yi" | "yid" | "yiddish" | "יידיש" => Some(Self::Yiddish),
            "en" | "eng" | "english" => Some(Self::English),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Hebrew => "he",
            Self::Yiddish => "yi",
            Self::English => "en",
        }
    }
}

impl fmt::Display for LanguageHint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single user-submitted question.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Query {
    pub text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hint: Option<LanguageHint>,
    #[serde(default, skip_serializing_if = "SearchFilter::is_empty")]
    pub filter: SearchFilter,
}

impl Query {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            hint: None,
            filter: SearchFilter::default(),
        }
    }

    pub fn with_hint(mut self, hint: Option<LanguageHint>) -> Self {
        self.hint = hint;
        self
    }

    pub fn with_filter(mut self, filter: SearchFilter) -> Self {
        self.filter = filter;
        self
    }
}
