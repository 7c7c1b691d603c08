//! Generation client factory.
//!
//! Builds a client from a provider name plus the connection settings resolved
//! from configuration.

use crate::client::LlmClient;
use crate::providers::{ClaudeClient, OllamaClient};
use crate::types::ProviderType;
use sefer_core::{AppError, AppResult};
use std::sync::Arc;
use std::time::Duration;

/// Connection settings for [`create_client`].
#[derive(Debug, Clone, Default)]
pub struct ClientOptions {
    /// Custom endpoint URL
    pub endpoint: Option<String>,
    /// API key (required by Claude)
    pub api_key: Option<String>,
    /// `anthropic-version` override
    pub api_version: Option<String>,
    /// Default output token limit
    pub max_tokens: Option<u32>,
    /// Request timeout in seconds (Ollama)
    pub timeout_secs: Option<u64>,
}

/// Create a generation client for the named provider.
///
/// # Errors
/// Returns a `Config` error if the provider is unknown or a required
/// secret is missing.
pub fn create_client(provider: &str, options: &ClientOptions) -> AppResult<Arc<dyn LlmClient>> {
    let provider_type = ProviderType::parse(provider)
        .ok_or_else(|| AppError::Config(format!("Unknown provider: {}", provider)))?;

    match provider_type {
        ProviderType::Ollama => {
            let base_url = options
                .endpoint
                .as_deref()
                .unwrap_or(crate::providers::ollama::OLLAMA_DEFAULT_URL);
            let client = match options.timeout_secs {
                Some(secs) => OllamaClient::with_timeout(base_url, Duration::from_secs(secs))?,
                None => OllamaClient::with_base_url(base_url),
            };
            Ok(Arc::new(client))
        }
        ProviderType::Claude => {
            let api_key = options
                .api_key
                .as_deref()
                .ok_or_else(|| AppError::Config("Claude provider requires API key".to_string()))?;

            let mut client = match options.endpoint.as_deref() {
                Some(endpoint) => ClaudeClient::with_base_url(endpoint, api_key),
                None => ClaudeClient::new(api_key),
            };
            if let Some(ref version) = options.api_version {
                client = client.with_api_version(version);
            }
            if let Some(max_tokens) = options.max_tokens {
                client = client.with_default_max_tokens(max_tokens);
            }
            Ok(Arc::new(client))
        }
    }
}
