//! Passage translation through the generation service.

use crate::corpus::Passage;
use crate::rag::types::TranslationResponse;
use sefer_core::AppResult;
use sefer_llm::{LlmClient, LlmRequest};
use sefer_prompt::{build_prompt, PromptDefinition, PromptInput};

/// Default translation target.
pub const DEFAULT_TARGET_LANGUAGE: &str = "English";

/// Translate one passage into `target_language`.
///
/// The translation prompt receives the passage text as `query` and the
/// target as `targetLanguage`.
pub async fn translate(
    client: &dyn LlmClient,
    model: &str,
    prompt: &PromptDefinition,
    passage: &Passage,
    target_language: &str,
) -> AppResult<TranslationResponse> {
    tracing::info!(
        "Translating passage {} to {}",
        passage.id,
        target_language
    );

    let input = PromptInput::new(passage.text.clone())
        .with_variable("targetLanguage", target_language)
        .with_variable("title", passage.citation.title.clone());
    let built = build_prompt(prompt, &input)?;

    let mut request = LlmRequest::new(built.user, model);
    if let Some(system) = built.system {
        request = request.with_system(system);
    }
    if let Some(max_tokens) = built.metadata.max_tokens {
        request = request.with_max_tokens(max_tokens);
    }
    if let Some(temperature) = built.metadata.temperature {
        request = request.with_temperature(temperature);
    }

    let response = client.complete(&request).await?;

    Ok(TranslationResponse {
        passage_id: passage.id.clone(),
        target_language: target_language.to_string(),
        translation: response.content,
    })
}
