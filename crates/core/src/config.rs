//! Configuration management for Sefer Search.
//!
//! This module handles loading and merging configuration from multiple sources:
//! - Config files (.sefer/config.yaml)
//! - Environment variables
//! - Command-line flags
//!
//! The configuration is workspace-centric, with most state stored in `.sefer/`.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

use crate::error::{AppError, AppResult};

/// Environment variable the Claude provider reads its key from when none is configured.
pub const DEFAULT_CLAUDE_KEY_ENV: &str = "CLAUDE_API_KEY";

/// Main application configuration.
///
/// This struct holds all global configuration options that affect
/// CLI behavior across commands.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Path to the workspace root (contains .sefer/)
    pub workspace: PathBuf,

    /// Optional config file path
    pub config_file: Option<PathBuf>,

    /// Directory holding the corpus JSON files
    pub corpus_path: Option<PathBuf>,

    /// Default generation provider ("ollama", "claude")
    pub provider: String,

    /// Default model identifier
    pub model: String,

    /// API key for the generation provider
    pub api_key: Option<String>,

    /// Log level override
    pub log_level: Option<String>,

    /// Verbose mode (enables debug logging)
    pub verbose: bool,

    /// Disable colored output
    pub no_color: bool,

    /// Provider configurations
    pub llm: Option<LlmConfig>,
}

/// LLM configuration from config.yaml.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmConfig {
    #[serde(rename = "activeProvider")]
    pub active_provider: String,

    pub providers: HashMap<String, ProviderConfig>,
}

/// Provider-specific configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ProviderConfig {
    Claude {
        #[serde(rename = "apiKeyEnv")]
        api_key_env: String,
        model: String,
        endpoint: Option<String>,
        #[serde(rename = "apiVersion")]
        api_version: Option<String>,
        #[serde(rename = "maxTokens")]
        max_tokens: Option<u32>,
    },
    Ollama {
        endpoint: String,
        model: String,
        timeout: Option<u64>,
    },
}

impl ProviderConfig {
    /// Model configured for this provider.
    pub fn model(&self) -> &str {
        match self {
            Self::Claude { model, .. } => model,
            Self::Ollama { model, .. } => model,
        }
    }

    /// Custom endpoint, if any.
    pub fn endpoint(&self) -> Option<&str> {
        match self {
            Self::Claude { endpoint, .. } => endpoint.as_deref(),
            Self::Ollama { endpoint, .. } => Some(endpoint.as_str()),
        }
    }
}

/// Full configuration file structure.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct ConfigFile {
    llm: Option<LlmConfig>,
    workspace: Option<WorkspaceConfig>,
    corpus: Option<CorpusConfig>,
    logging: Option<LoggingConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct WorkspaceConfig {
    path: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct CorpusConfig {
    path: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct LoggingConfig {
    level: Option<String>,
    color: Option<bool>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            workspace: std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")),
            config_file: None,
            corpus_path: None,
            provider: "ollama".to_string(),
            model: "llama3.2".to_string(),
            api_key: None,
            log_level: None,
            verbose: false,
            no_color: false,
            llm: None,
        }
    }
}

impl AppConfig {
    /// Load configuration from environment variables and defaults.
    ///
    /// Environment variables:
    /// - `SEFER_WORKSPACE`: Override workspace path
    /// - `SEFER_CONFIG`: Path to config file
    /// - `SEFER_CORPUS`: Corpus directory
    /// - `SEFER_PROVIDER`: Generation provider
    /// - `SEFER_MODEL`: Model identifier
    /// - `SEFER_API_KEY`: API key
    /// - `RUST_LOG`: Log level
    /// - `NO_COLOR`: Disable colored output
    pub fn load() -> AppResult<Self> {
        let mut config = Self::default();

        if let Ok(workspace) = std::env::var("SEFER_WORKSPACE") {
            config.workspace = PathBuf::from(workspace);
        }

        if let Ok(config_file) = std::env::var("SEFER_CONFIG") {
            config.config_file = Some(PathBuf::from(config_file));
        }

        if !config.workspace.exists() {
            return Err(AppError::Config(format!(
                "Workspace directory does not exist: {:?}",
                config.workspace
            )));
        }

        let config_path = match config.config_file {
            Some(ref cf) => cf.clone(),
            None => config.workspace.join(".sefer/config.yaml"),
        };

        if config_path.exists() {
            config = config.merge_yaml(&config_path)?;
        }

        // Environment variables override YAML config
        if let Ok(corpus) = std::env::var("SEFER_CORPUS") {
            config.corpus_path = Some(PathBuf::from(corpus));
        }

        if let Ok(provider) = std::env::var("SEFER_PROVIDER") {
            config.provider = provider;
        }

        if let Ok(model) = std::env::var("SEFER_MODEL") {
            config.model = model;
        }

        config.api_key = std::env::var("SEFER_API_KEY").ok();

        if let Ok(level) = std::env::var("RUST_LOG") {
            config.log_level = Some(level);
        }

        if std::env::var("NO_COLOR").is_ok() {
            config.no_color = true;
        }

        Ok(config)
    }

    /// Merge YAML configuration file into this config.
    fn merge_yaml(&self, path: &Path) -> AppResult<Self> {
        let contents = std::fs::read_to_string(path).map_err(|e| {
            AppError::Config(format!("Failed to read config file {:?}: {}", path, e))
        })?;

        self.merge_yaml_str(&contents)
            .map_err(|e| AppError::Config(format!("Failed to parse config file {:?}: {}", path, e)))
    }

    fn merge_yaml_str(&self, contents: &str) -> Result<Self, serde_yaml::Error> {
        let config_file: ConfigFile = serde_yaml::from_str(contents)?;

        let mut result = self.clone();

        if let Some(path) = config_file.workspace.and_then(|ws| ws.path) {
            result.workspace = PathBuf::from(path);
        }

        if let Some(path) = config_file.corpus.and_then(|c| c.path) {
            result.corpus_path = Some(PathBuf::from(path));
        }

        if let Some(logging) = config_file.logging {
            if let Some(level) = logging.level {
                result.log_level = Some(level);
            }
            if let Some(color) = logging.color {
                result.no_color = !color;
            }
        }

        if let Some(llm) = config_file.llm {
            result.provider = llm.active_provider.clone();

            if let Some(provider_config) = llm.providers.get(&llm.active_provider) {
                result.model = provider_config.model().to_string();
            }

            result.llm = Some(llm);
        }

        Ok(result)
    }

    /// Apply CLI overrides to the configuration.
    ///
    /// Command-line flags take precedence over environment variables and files.
    #[allow(clippy::too_many_arguments)]
    pub fn with_overrides(
        mut self,
        workspace: Option<PathBuf>,
        config_file: Option<PathBuf>,
        corpus_path: Option<PathBuf>,
        provider: Option<String>,
        model: Option<String>,
        log_level: Option<String>,
        verbose: bool,
        no_color: bool,
    ) -> Self {
        if let Some(workspace) = workspace {
            self.workspace = workspace;
        }

        if let Some(config_file) = config_file {
            self.config_file = Some(config_file);
        }

        if let Some(corpus_path) = corpus_path {
            self.corpus_path = Some(corpus_path);
        }

        if let Some(provider) = provider {
            // A provider switch invalidates the model picked for the previous one.
            if provider != self.provider {
                if let Ok(Some(pc)) = self.get_provider_config(&provider) {
                    self.model = pc.model().to_string();
                }
            }
            self.provider = provider;
        }

        if let Some(model) = model {
            self.model = model;
        }

        if let Some(log_level) = log_level {
            self.log_level = Some(log_level);
        }

        if verbose {
            self.verbose = true;
            if self.log_level.is_none() {
                self.log_level = Some("debug".to_string());
            }
        }

        if no_color {
            self.no_color = true;
        }

        self
    }

    /// Get the path to the .sefer directory.
    pub fn sefer_dir(&self) -> PathBuf {
        self.workspace.join(".sefer")
    }

    /// Directory the corpus is loaded from (defaults to `<workspace>/corpus`).
    pub fn corpus_dir(&self) -> PathBuf {
        self.corpus_path
            .clone()
            .unwrap_or_else(|| self.workspace.join("corpus"))
    }

    /// Get the configuration for a provider.
    pub fn get_provider_config(&self, provider: &str) -> AppResult<Option<ProviderConfig>> {
        Ok(self
            .llm
            .as_ref()
            .and_then(|llm| llm.providers.get(provider).cloned()))
    }

    /// Resolve the API key for a provider.
    ///
    /// Order: `SEFER_API_KEY`, the provider's `apiKeyEnv`, then `CLAUDE_API_KEY` for Claude.
    pub fn resolve_api_key(&self, provider: &str) -> AppResult<Option<String>> {
        if let Some(ref key) = self.api_key {
            return Ok(Some(key.clone()));
        }

        if let Some(ProviderConfig::Claude { api_key_env, .. }) = self.get_provider_config(provider)? {
            if let Ok(key) = std::env::var(&api_key_env) {
                return Ok(Some(key));
            }
        }

        if matches!(provider, "claude" | "anthropic") {
            return Ok(std::env::var(DEFAULT_CLAUDE_KEY_ENV).ok());
        }

        Ok(None)
    }

    /// Validate configuration for the active provider.
    pub fn validate(&self) -> AppResult<()> {
        let known_providers = ["ollama", "claude", "anthropic"];

        if !known_providers.contains(&self.provider.as_str()) {
            return Err(AppError::Config(format!(
                "Unknown provider: {}. Supported: {}",
                self.provider,
                known_providers.join(", ")
            )));
        }

        if matches!(self.provider.as_str(), "claude" | "anthropic")
            && self.resolve_api_key(&self.provider)?.is_none()
        {
            return Err(AppError::Config(format!(
                "Claude provider requires an API key (set SEFER_API_KEY or {})",
                DEFAULT_CLAUDE_KEY_ENV
            )));
        }

        Ok(())
    }
}
