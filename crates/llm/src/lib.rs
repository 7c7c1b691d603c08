//! Generation service clients for Sefer Search.
//!
//! The search core hands ranked passages and the conversation window to a
//! text-generation service. This crate hides that service behind the
//! [`LlmClient`] trait.
//!
//! # Providers
//! - **Ollama**: Local runtime (default)
//! - **Claude**: Anthropic Messages API
//!
//! # Example
//! ```no_run
//! use sefer_llm::{LlmClient, LlmRequest, providers::OllamaClient};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let client = OllamaClient::new();
//! let request = LlmRequest::new("What is bittul?", "llama3.2");
//! let response = client.complete(&request).await?;
//! println!("{}", response.content);
//! # Ok(())
//! # }
//! ```

pub mod client;
pub mod factory;
mod lines;
pub mod providers;
pub mod types;

pub use client::{drain_stream, LlmClient, LlmStream};
pub use factory::{create_client, ClientOptions};
pub use providers::{ClaudeClient, OllamaClient};
pub use types::{LlmRequest, LlmResponse, LlmStreamChunk, LlmUsage, ProviderType};
