//! Generation client abstraction.

use crate::types::{LlmRequest, LlmResponse, LlmStreamChunk, LlmUsage};
use futures::{Stream, StreamExt};
use sefer_core::AppResult;
use std::pin::Pin;

/// Stream of response chunks.
pub type LlmStream = Pin<Box<dyn Stream<Item = AppResult<LlmStreamChunk>> + Send>>;

/// Trait for generation providers.
///
/// The search core treats generation as an opaque, possibly slow and possibly
/// failing call. Implementations own transport, auth and wire format.
#[async_trait::async_trait]
pub trait LlmClient: Send + Sync {
    /// Provider name (e.g., "ollama", "claude").
    fn provider_name(&self) -> &str;

    /// Perform a non-streaming completion.
    async fn complete(&self, request: &LlmRequest) -> AppResult<LlmResponse>;

    /// Perform a streaming completion.
    async fn stream(&self, request: &LlmRequest) -> AppResult<LlmStream>;
}

/// Drain a stream, calling `on_text` for every non-empty delta.
///
/// Returns the concatenated text and the usage reported by the final chunk.
pub async fn drain_stream<F>(mut stream: LlmStream, mut on_text: F) -> AppResult<(String, LlmUsage)>
where
    F: FnMut(&str),
{
    let mut content = String::new();
    let mut usage = LlmUsage::default();

    while let Some(result) = stream.next().await {
        let chunk = result?;

        if !chunk.content.is_empty() {
            on_text(&chunk.content);
            content.push_str(&chunk.content);
        }

        if let Some(u) = chunk.usage {
            usage = u;
        }

        if chunk.done {
            break;
        }
    }

    Ok((content, usage))
}
