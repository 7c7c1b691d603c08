//! Search configuration management.

use crate::conversation::DEFAULT_WINDOW_TURNS;
use crate::lexicon::Lexicon;
use crate::scoring::LengthBand;
use sefer_core::{AppError, AppResult};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

/// Ranking and normalization settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    /// Result cap
    #[serde(rename = "maxResults")]
    pub max_results: usize,

    /// Conversation window size in turns
    #[serde(rename = "contextWindow")]
    pub context_window: usize,

    /// Preferred passage length in characters
    #[serde(rename = "preferredLength")]
    pub preferred_length: LengthBand,

    /// Shortest token emitted as a token-class term
    #[serde(rename = "minTokenChars")]
    pub min_token_chars: usize,

    /// Extra synonyms: phrase → canonical corpus form
    pub synonyms: HashMap<String, String>,

    /// Extra question words
    #[serde(rename = "questionWords")]
    pub question_words: QuestionWordsConfig,

    /// Extra filler words, stripped only after a question word
    #[serde(rename = "fillerWords")]
    pub filler_words: QuestionWordsConfig,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct QuestionWordsConfig {
    pub hebrew: Vec<String>,
    pub latin: Vec<String>,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            max_results: 10,
            context_window: DEFAULT_WINDOW_TURNS,
            preferred_length: LengthBand::default(),
            min_token_chars: 2,
            synonyms: HashMap::new(),
            question_words: QuestionWordsConfig::default(),
            filler_words: QuestionWordsConfig::default(),
        }
    }
}

impl SearchConfig {
    /// Check value ranges.
    pub fn validate(&self) -> AppResult<()> {
        if self.max_results == 0 {
            return Err(AppError::Config(
                "maxResults must be greater than zero".to_string(),
            ));
        }
        if self.context_window == 0 {
            return Err(AppError::Config(
                "contextWindow must be greater than zero".to_string(),
            ));
        }
        if self.preferred_length.min == 0 || self.preferred_length.min > self.preferred_length.max
        {
            return Err(AppError::Config(format!(
                "preferredLength must satisfy 0 < min <= max (got {}..{})",
                self.preferred_length.min, self.preferred_length.max
            )));
        }
        Ok(())
    }

    /// Built-in lexicon extended with this config's synonyms, question and filler words.
    pub fn lexicon(&self) -> Lexicon {
        let mut lexicon = Lexicon::builtin();
        lexicon.extend(
            &self.synonyms,
            &self.question_words.hebrew,
            &self.question_words.latin,
        );
        lexicon
            .question_words
            .add_hebrew_fillers(self.filler_words.hebrew.iter().map(String::as_str));
        lexicon
            .question_words
            .add_latin_fillers(self.filler_words.latin.iter().map(String::as_str));
        lexicon
    }
}

/// Load search configuration.
///
/// Loads from `.sefer/search.yaml` if it exists, otherwise returns defaults.
pub fn load_config(workspace: &Path) -> AppResult<SearchConfig> {
    let config_path = get_config_path(workspace);

    let config = if config_path.exists() {
        let content = fs::read_to_string(&config_path).map_err(|e| {
            AppError::Config(format!("Failed to read config at {:?}: {}", config_path, e))
        })?;

        let config: SearchConfig = serde_yaml::from_str(&content).map_err(|e| {
            AppError::Config(format!("Failed to parse config at {:?}: {}", config_path, e))
        })?;

        tracing::debug!("Loaded search config from {:?}", config_path);
        config
    } else {
        tracing::debug!("Using default search config (no config file found)");
        SearchConfig::default()
    };

    config.validate()?;
    Ok(config)
}

/// Get the path to the search config file.
pub fn get_config_path(workspace: &Path) -> PathBuf {
    workspace.join(".sefer").join("search.yaml")
}
