//! Ollama provider.
//!
//! Ollama API: https://github.com/ollama/ollama/blob/main/docs/api.md

use crate::client::{LlmClient, LlmStream};
use crate::lines::LineBuffer;
use crate::types::{LlmRequest, LlmResponse, LlmStreamChunk, LlmUsage};
use futures::StreamExt;
use sefer_core::{AppError, AppResult};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Default local endpoint.
pub const OLLAMA_DEFAULT_URL: &str = "http://localhost:11434";

#[derive(Debug, Serialize)]
struct OllamaRequest {
    model: String,
    prompt: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    system: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    options: Option<OllamaOptions>,
    stream: bool,
}

#[derive(Debug, Serialize, PartialEq)]
struct OllamaOptions {
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    num_predict: Option<u32>,
}

#[derive(Debug, Deserialize)]
struct OllamaResponse {
    model: String,
    response: String,
    done: bool,
    #[serde(default)]
    prompt_eval_count: Option<u32>,
    #[serde(default)]
    eval_count: Option<u32>,
}

impl OllamaResponse {
    fn usage(&self) -> LlmUsage {
        LlmUsage::new(
            self.prompt_eval_count.unwrap_or(0),
            self.eval_count.unwrap_or(0),
        )
    }
}

/// Ollama client.
pub struct OllamaClient {
    base_url: String,
    client: reqwest::Client,
}

impl OllamaClient {
    /// Create a client for the default local endpoint.
    pub fn new() -> Self {
        Self::with_base_url(OLLAMA_DEFAULT_URL)
    }

    /// Create a client with a custom base URL.
    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            client: reqwest::Client::new(),
        }
    }

    /// Create a client with a custom base URL and request timeout.
    pub fn with_timeout(base_url: impl Into<String>, timeout: Duration) -> AppResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| AppError::Llm(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            client,
        })
    }

    fn to_ollama_request(&self, request: &LlmRequest, stream: bool) -> OllamaRequest {
        let options = if request.temperature.is_some() || request.max_tokens.is_some() {
            Some(OllamaOptions {
                temperature: request.temperature,
                num_predict: request.max_tokens,
            })
        } else {
            None
        };

        OllamaRequest {
            model: request.model.clone(),
            prompt: request.prompt.clone(),
            system: request.system.clone(),
            options,
            stream,
        }
    }

    async fn post(&self, body: &OllamaRequest) -> AppResult<reqwest::Response> {
        let url = format!("{}/api/generate", self.base_url);

        let response = self
            .client
            .post(&url)
            .json(body)
            .send()
            .await
            .map_err(|e| AppError::Llm(format!("Failed to send request to Ollama: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(AppError::Llm(format!(
                "Ollama API error ({}): {}",
                status, error_text
            )));
        }

        Ok(response)
    }
}

impl Default for OllamaClient {
    fn default() -> Self {
        Self::new()
    }
}

/// Parse every complete NDJSON line held in `buffer`; with `at_end`, the
/// unterminated remainder too.
fn drain_lines(buffer: &mut LineBuffer, at_end: bool) -> Vec<AppResult<LlmStreamChunk>> {
    let mut lines = Vec::new();
    while let Some(line) = buffer.next_line() {
        lines.push(line);
    }
    if at_end {
        lines.extend(buffer.take_rest());
    }
    lines
        .iter()
        .filter(|line| !line.trim().is_empty())
        .map(|line| parse_stream_line(line))
        .collect()
}

/// Parse one newline-delimited JSON line of a streaming response.
fn parse_stream_line(line: &str) -> AppResult<LlmStreamChunk> {
    let parsed: OllamaResponse = serde_json::from_str(line)
        .map_err(|e| AppError::Llm(format!("Failed to parse chunk: {}", e)))?;

    let usage = parsed.done.then(|| parsed.usage());
    Ok(LlmStreamChunk {
        content: parsed.response,
        model: parsed.model,
        done: parsed.done,
        usage,
    })
}

#[async_trait::async_trait]
impl LlmClient for OllamaClient {
    fn provider_name(&self) -> &str {
        "ollama"
    }

    async fn complete(&self, request: &LlmRequest) -> AppResult<LlmResponse> {
        tracing::info!(model = %request.model, "Sending completion request to Ollama");

        let body = self.to_ollama_request(request, false);
        let response = self.post(&body).await?;

        let parsed: OllamaResponse = response
            .json()
            .await
            .map_err(|e| AppError::Llm(format!("Failed to parse Ollama response: {}", e)))?;

        tracing::debug!(
            "Ollama completion: {} chars, done={}",
            parsed.response.len(),
            parsed.done
        );

        let usage = parsed.usage();
        Ok(LlmResponse {
            content: parsed.response,
            model: parsed.model,
            usage,
            done: parsed.done,
        })
    }

    async fn stream(&self, request: &LlmRequest) -> AppResult<LlmStream> {
        tracing::info!(model = %request.model, "Starting streaming request to Ollama");

        let body = self.to_ollama_request(request, true);
        let response = self.post(&body).await?;

        // A network chunk may carry several NDJSON lines or end inside one.
        // `None` marks the end of the body.
        let stream = response
            .bytes_stream()
            .map(Some)
            .chain(futures::stream::once(futures::future::ready(None)))
            .scan(LineBuffer::default(), |buffer, item| {
                let chunks = match item {
                    Some(Ok(bytes)) => {
                        buffer.push(&bytes);
                        drain_lines(buffer, false)
                    }
                    Some(Err(e)) => vec![Err(AppError::Llm(format!("Stream error: {}", e)))],
                    None => drain_lines(buffer, true),
                };
                futures::future::ready(Some(futures::stream::iter(chunks)))
            })
            .flatten();

        Ok(Box::pin(stream))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ollama_client_creation() {
        let client = OllamaClient::with_base_url("http://localhost:11434/");
        assert_eq!(client.provider_name(), "ollama");
        assert_eq!(client.base_url, "http://localhost:11434");
    }

    #[test]
    fn test_request_conversion_carries_options() {
        let client = OllamaClient::new();
        let request = LlmRequest::new("Explain bittul", "llama3.2")
            .with_temperature(0.3)
            .with_max_tokens(100);

        let body = client.to_ollama_request(&request, false);
        assert_eq!(body.model, "llama3.2");
        assert_eq!(body.prompt, "Explain bittul");
        assert_eq!(
            body.options,
            Some(OllamaOptions {
                temperature: Some(0.3),
                num_predict: Some(100)
            })
        );
        assert!(!body.stream);
    }

    #[test]
    fn test_request_conversion_without_options() {
        let client = OllamaClient::new();
        let body = client.to_ollama_request(&LlmRequest::new("q", "m"), true);
        assert!(body.options.is_none());
        assert!(body.stream);
    }

    #[test]
    fn test_parse_final_stream_line() {
        let line = r#"{"model":"llama3.2","response":"","done":true,"prompt_eval_count":12,"eval_count":40}"#;
        let chunk = parse_stream_line(line).unwrap();
        assert!(chunk.done);
        assert_eq!(chunk.usage, Some(LlmUsage::new(12, 40)));
    }

    #[test]
    fn test_line_split_across_chunks() {
        let line = "{\"model\":\"m\",\"response\":\"שלום\",\"done\":false}\n";
        let bytes = line.as_bytes();
        let mut buffer = LineBuffer::default();

        // Byte 20 falls inside the JSON, before the Hebrew text ends
        buffer.push(&bytes[..20]);
        assert!(drain_lines(&mut buffer, false).is_empty());
        buffer.push(&bytes[20..]);
        let chunks = drain_lines(&mut buffer, false);

        assert_eq!(chunks.len(), 1);
        let chunk = chunks[0].as_ref().unwrap();
        assert_eq!(chunk.content, "שלום");
        assert!(!chunk.done);
    }

    #[test]
    fn test_hebrew_split_mid_character() {
        let line = "{\"model\":\"m\",\"response\":\"ביטול\",\"done\":false}\n";
        let cut = line.find('ב').unwrap() + 1;
        let mut buffer = LineBuffer::default();

        buffer.push(&line.as_bytes()[..cut]);
        assert!(drain_lines(&mut buffer, false).is_empty());
        buffer.push(&line.as_bytes()[cut..]);

        let chunks = drain_lines(&mut buffer, false);
        assert_eq!(chunks[0].as_ref().unwrap().content, "ביטול");
    }

    #[test]
    fn test_last_line_without_newline() {
        let mut buffer = LineBuffer::default();
        buffer.push(b"{\"model\":\"m\",\"response\":\"a\",\"done\":false}\n{\"model\":\"m\",\"response\":\"\",\"done\":true}");

        assert_eq!(drain_lines(&mut buffer, false).len(), 1);
        let last = drain_lines(&mut buffer, true);
        assert_eq!(last.len(), 1);
        assert!(last[0].as_ref().unwrap().done);
    }
}
