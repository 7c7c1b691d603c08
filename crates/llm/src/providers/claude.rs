//! Claude (Anthropic Messages API) provider.
//!
//! API: https://docs.anthropic.com/en/api/messages

use crate::client::{LlmClient, LlmStream};
use crate::lines::LineBuffer;
use crate::types::{LlmRequest, LlmResponse, LlmStreamChunk, LlmUsage};
use futures::StreamExt;
use sefer_core::{AppError, AppResult};
use serde::{Deserialize, Serialize};

/// Default API endpoint.
pub const CLAUDE_DEFAULT_URL: &str = "https://api.anthropic.com";

/// API version header value.
pub const CLAUDE_API_VERSION: &str = "2023-06-01";

/// The Messages API requires `max_tokens`; used when the request leaves it unset.
pub const CLAUDE_DEFAULT_MAX_TOKENS: u32 = 4000;

#[derive(Debug, Serialize)]
struct MessagesRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    system: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    messages: Vec<Message<'a>>,
    stream: bool,
}

#[derive(Debug, Serialize)]
struct Message<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct MessagesResponse {
    model: String,
    content: Vec<ContentBlock>,
    #[serde(default)]
    usage: ClaudeUsage,
    #[serde(default)]
    stop_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ContentBlock {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    text: String,
}

#[derive(Debug, Default, Deserialize)]
struct ClaudeUsage {
    #[serde(default)]
    input_tokens: u32,
    #[serde(default)]
    output_tokens: u32,
}

/// Server-sent event payloads we care about; everything else is ignored.
#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum StreamEvent {
    MessageStart { message: StreamMessage },
    ContentBlockDelta { delta: Delta },
    MessageDelta { usage: ClaudeUsage },
    MessageStop,
    Error { error: StreamError },
    #[serde(other)]
    Other,
}

#[derive(Debug, Deserialize)]
struct StreamMessage {
    model: String,
    #[serde(default)]
    usage: ClaudeUsage,
}

#[derive(Debug, Deserialize)]
struct Delta {
    #[serde(default)]
    text: String,
}

#[derive(Debug, Deserialize)]
struct StreamError {
    message: String,
}

/// Per-stream state: partial line bytes plus what `message_start` told us.
#[derive(Default)]
struct StreamState {
    buffer: LineBuffer,
    model: String,
    input_tokens: u32,
    output_tokens: u32,
}

impl StreamState {
    /// Feed one network chunk and turn every completed `data:` line into chunks.
    fn feed(&mut self, bytes: &[u8]) -> Vec<AppResult<LlmStreamChunk>> {
        self.buffer.push(bytes);
        let mut out = Vec::new();
        while let Some(line) = self.buffer.next_line() {
            self.handle_line(&line, &mut out);
        }
        out
    }

    /// Handle a trailing line left without a newline when the body ends.
    fn finish(&mut self) -> Vec<AppResult<LlmStreamChunk>> {
        let mut out = Vec::new();
        if let Some(line) = self.buffer.take_rest() {
            self.handle_line(&line, &mut out);
        }
        out
    }

    fn handle_line(&mut self, line: &str, out: &mut Vec<AppResult<LlmStreamChunk>>) {
        let Some(data) = line.trim().strip_prefix("data:") else {
            return;
        };

        let event: StreamEvent = match serde_json::from_str(data.trim()) {
            Ok(event) => event,
            Err(e) => {
                out.push(Err(AppError::Llm(format!("Failed to parse event: {}", e))));
                return;
            }
        };

        match event {
            StreamEvent::MessageStart { message } => {
                self.model = message.model;
                self.input_tokens = message.usage.input_tokens;
            }
            StreamEvent::ContentBlockDelta { delta } => {
                out.push(Ok(LlmStreamChunk {
                    content: delta.text,
                    model: self.model.clone(),
                    done: false,
                    usage: None,
                }));
            }
            StreamEvent::MessageDelta { usage } => {
                self.output_tokens = usage.output_tokens;
            }
            StreamEvent::MessageStop => {
                out.push(Ok(LlmStreamChunk {
                    content: String::new(),
                    model: self.model.clone(),
                    done: true,
                    usage: Some(LlmUsage::new(self.input_tokens, self.output_tokens)),
                }));
            }
            StreamEvent::Error { error } => {
                out.push(Err(AppError::Llm(format!("Claude stream error: {}", error.message))));
            }
            StreamEvent::Other => {}
        }
    }
}

/// Claude client.
pub struct ClaudeClient {
    base_url: String,
    api_key: String,
    api_version: String,
    default_max_tokens: u32,
    client: reqwest::Client,
}

impl ClaudeClient {
    /// Create a client for the public API endpoint.
    pub fn new(api_key: impl Into<String>) -> Self {
        Self::with_base_url(CLAUDE_DEFAULT_URL, api_key)
    }

    /// Create a client with a custom base URL (proxies, gateways).
    pub fn with_base_url(base_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key: api_key.into(),
            api_version: CLAUDE_API_VERSION.to_string(),
            default_max_tokens: CLAUDE_DEFAULT_MAX_TOKENS,
            client: reqwest::Client::new(),
        }
    }

    /// Override the `anthropic-version` header.
    pub fn with_api_version(mut self, api_version: impl Into<String>) -> Self {
        self.api_version = api_version.into();
        self
    }

    /// Override the token limit used when a request does not set one.
    pub fn with_default_max_tokens(mut self, max_tokens: u32) -> Self {
        self.default_max_tokens = max_tokens;
        self
    }

    fn to_messages_request<'a>(&self, request: &'a LlmRequest, stream: bool) -> MessagesRequest<'a> {
        MessagesRequest {
            model: &request.model,
            max_tokens: request.max_tokens.unwrap_or(self.default_max_tokens),
            system: request.system.as_deref(),
            temperature: request.temperature,
            messages: vec![Message {
                role: "user",
                content: &request.prompt,
            }],
            stream,
        }
    }

    async fn post(&self, body: &MessagesRequest<'_>) -> AppResult<reqwest::Response> {
        let url = format!("{}/v1/messages", self.base_url);

        let response = self
            .client
            .post(&url)
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", &self.api_version)
            .json(body)
            .send()
            .await
            .map_err(|e| AppError::Llm(format!("Failed to send request to Claude: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(AppError::Llm(format!(
                "Claude API error ({}): {}",
                status, error_text
            )));
        }

        Ok(response)
    }
}

fn convert_response(response: MessagesResponse) -> LlmResponse {
    let content = response
        .content
        .into_iter()
        .filter(|block| block.kind == "text")
        .map(|block| block.text)
        .collect::<Vec<_>>()
        .join("");

    LlmResponse {
        content,
        model: response.model,
        usage: LlmUsage::new(response.usage.input_tokens, response.usage.output_tokens),
        done: response.stop_reason.as_deref() != Some("max_tokens"),
    }
}

#[async_trait::async_trait]
impl LlmClient for ClaudeClient {
    fn provider_name(&self) -> &str {
        "claude"
    }

    async fn complete(&self, request: &LlmRequest) -> AppResult<LlmResponse> {
        tracing::info!(model = %request.model, "Sending completion request to Claude");

        let body = self.to_messages_request(request, false);
        let response = self.post(&body).await?;

        let parsed: MessagesResponse = response
            .json()
            .await
            .map_err(|e| AppError::Llm(format!("Failed to parse Claude response: {}", e)))?;

        let converted = convert_response(parsed);
        tracing::debug!(
            "Claude completion: {} chars, {} tokens",
            converted.content.len(),
            converted.usage.total_tokens
        );
        Ok(converted)
    }

    async fn stream(&self, request: &LlmRequest) -> AppResult<LlmStream> {
        tracing::info!(model = %request.model, "Starting streaming request to Claude");

        let body = self.to_messages_request(request, true);
        let response = self.post(&body).await?;

        // `None` marks the end of the body so a trailing partial line is flushed
        let stream = response
            .bytes_stream()
            .map(Some)
            .chain(futures::stream::once(futures::future::ready(None)))
            .scan(StreamState::default(), |state, item| {
                let chunks = match item {
                    Some(Ok(bytes)) => state.feed(&bytes),
                    Some(Err(e)) => vec![Err(AppError::Llm(format!("Stream error: {}", e)))],
                    None => state.finish(),
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
    fn test_request_defaults_max_tokens() {
        let client = ClaudeClient::new("key");
        let request = LlmRequest::new("Explain tzimtzum", "claude-sonnet-4-20250514")
            .with_system("You are an expert");

        let body = client.to_messages_request(&request, false);
        assert_eq!(body.max_tokens, CLAUDE_DEFAULT_MAX_TOKENS);
        assert_eq!(body.system, Some("You are an expert"));
        assert_eq!(body.messages.len(), 1);
        assert_eq!(body.messages[0].role, "user");

        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json["messages"][0]["content"], "Explain tzimtzum");
        assert!(json.get("temperature").is_none());
    }

    #[test]
    fn test_convert_response_joins_text_blocks() {
        let raw = r#"{
            "model": "claude-sonnet-4-20250514",
            "content": [{"type": "text", "text": "שלום "}, {"type": "text", "text": "עולם"}],
            "usage": {"input_tokens": 50, "output_tokens": 7},
            "stop_reason": "end_turn"
        }"#;
        let parsed: MessagesResponse = serde_json::from_str(raw).unwrap();
        let response = convert_response(parsed);

        assert_eq!(response.content, "שלום עולם");
        assert_eq!(response.usage.total_tokens, 57);
        assert!(response.done);
    }

    #[test]
    fn test_stream_state_handles_split_lines() {
        let mut state = StreamState::default();
        let first = state.feed(
            b"event: message_start\ndata: {\"type\":\"message_start\",\"message\":{\"model\":\"claude\",\"usage\":{\"input_tokens\":9}}}\n\
             data: {\"type\":\"content_block_delta\",\"index\":0,\"delta\":{\"type\":\"text_delta\",\"text\":\"Hel",
        );
        assert!(first.is_empty());

        let rest: Vec<LlmStreamChunk> = state
            .feed(
                b"lo\"}}\ndata: {\"type\":\"message_delta\",\"usage\":{\"output_tokens\":2}}\n\
                 data: {\"type\":\"message_stop\"}\n",
            )
            .into_iter()
            .map(|c| c.unwrap())
            .collect();

        assert_eq!(rest.len(), 2);
        assert_eq!(rest[0].content, "Hello");
        assert_eq!(rest[0].model, "claude");
        assert!(rest[1].done);
        assert_eq!(rest[1].usage, Some(LlmUsage::new(9, 2)));
    }

    #[test]
    fn test_stream_state_keeps_hebrew_split_mid_character() {
        let event = "data: {\"type\":\"content_block_delta\",\"index\":0,\"delta\":{\"type\":\"text_delta\",\"text\":\"ביטול\"}}\n";
        let bytes = event.as_bytes();
        // One byte into the first letter
        let cut = event.find('ב').unwrap() + 1;

        let mut state = StreamState::default();
        assert!(state.feed(&bytes[..cut]).is_empty());
        let chunks = state.feed(&bytes[cut..]);

        assert_eq!(chunks.len(), 1);
        assert_eq!(chunks[0].as_ref().unwrap().content, "ביטול");
    }

    #[test]
    fn test_stream_state_flushes_unterminated_last_line() {
        let mut state = StreamState::default();
        assert!(state.feed(b"data: {\"type\":\"message_stop\"}").is_empty());

        let last = state.finish();
        assert_eq!(last.len(), 1);
        assert!(last[0].as_ref().unwrap().done);
        assert!(state.finish().is_empty());
    }
}
