//! Command handlers for the Sefer CLI.
//!
//! Each subcommand lives in its own module; the helpers below assemble the
//! search engine and the generation client from the resolved configuration.

pub mod ask;
pub mod chat;
pub mod corpus;
pub mod prompts;
pub mod search;
pub mod translate;

// Re-export command types for convenience
pub use ask::AskCommand;
pub use chat::ChatCommand;
pub use corpus::CorpusCommand;
pub use prompts::PromptsCommand;
pub use search::SearchCommand;
pub use translate::TranslateCommand;

use sefer_core::{config::AppConfig, AppError, AppResult};
use sefer_llm::{create_client, ClientOptions, LlmClient};
use sefer_search::{load_config, load_corpus, SearchEngine};
use std::sync::Arc;

/// Load the corpus and search settings, returning a ready engine.
///
/// `max_results` overrides the configured result cap.
pub fn open_engine(config: &AppConfig, max_results: Option<usize>) -> AppResult<SearchEngine> {
    let mut search_config = load_config(&config.workspace)?;
    if let Some(limit) = max_results {
        search_config.max_results = limit;
        search_config.validate()?;
    }

    let corpus_dir = config.corpus_dir();
    tracing::debug!("Loading corpus from {}", corpus_dir.display());
    let corpus = load_corpus(&corpus_dir)?;
    if corpus.is_empty() {
        tracing::warn!("Corpus at {} holds no passages", corpus_dir.display());
    }

    let lexicon = search_config.lexicon();
    Ok(SearchEngine::new(
        Arc::new(corpus),
        Arc::new(lexicon),
        search_config,
    ))
}

/// Create the generation client for the active provider.
pub fn open_client(config: &AppConfig) -> AppResult<Arc<dyn LlmClient>> {
    config.validate()?;

    let provider_config = config.get_provider_config(&config.provider)?;
    let mut options = ClientOptions {
        api_key: config.resolve_api_key(&config.provider)?,
        ..Default::default()
    };

    match provider_config {
        Some(sefer_core::config::ProviderConfig::Claude {
            endpoint,
            api_version,
            max_tokens,
            ..
        }) => {
            options.endpoint = endpoint;
            options.api_version = api_version;
            options.max_tokens = max_tokens;
        }
        Some(sefer_core::config::ProviderConfig::Ollama {
            endpoint, timeout, ..
        }) => {
            options.endpoint = Some(endpoint);
            options.timeout_secs = timeout;
        }
        None => {}
    }

    tracing::debug!(
        "Creating {} client (custom endpoint: {})",
        config.provider,
        options.endpoint.is_some()
    );
    create_client(&config.provider, &options)
}

/// Serialize a value as pretty JSON.
pub fn to_json<T: serde::Serialize>(value: &T) -> AppResult<String> {
    serde_json::to_string_pretty(value).map_err(|e| AppError::Serialization(e.to_string()))
}
