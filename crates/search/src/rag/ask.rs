//! Answer orchestration.
//!
//! Searches in the session window, renders the answer prompt from the ranked
//! passages and prior turns, and records the generated answer.

use crate::conversation::{ConversationTurn, ConversationWindow};
use crate::engine::SearchEngine;
use crate::rag::types::{to_prompt_turn, AnswerResponse, AskOptions, SourceRef};
use crate::types::Query;
use sefer_core::AppResult;
use sefer_llm::{drain_stream, LlmClient, LlmRequest};
use sefer_prompt::{build_prompt, PromptInput};

/// Answer a question from the corpus.
///
/// This function:
/// 1. Appends the user turn and ranks passages
/// 2. Returns a fixed answer without calling the client if nothing matched
/// 3. Renders the answer prompt with sources and the earlier turns
/// 4. Calls the client, streaming text through `on_text` when requested
/// 5. Appends the answer as the assistant turn
///
/// A failed generation call leaves the user turn in the window.
pub async fn ask<F>(
    engine: &SearchEngine,
    client: &dyn LlmClient,
    query: &Query,
    window: &mut ConversationWindow,
    options: &AskOptions,
    on_text: F,
) -> AppResult<AnswerResponse>
where
    F: FnMut(&str),
{
    tracing::info!("Answering query: {}", query.text);

    let outcome = engine.search_in_session(query, window);

    if outcome.passages.is_empty() {
        tracing::info!("No passages matched, skipping generation");
        let response = AnswerResponse::no_results(&query.text, 0);
        window.append(ConversationTurn::assistant(response.answer.clone()));
        return Ok(AnswerResponse {
            context_turns: window.len(),
            ..response
        });
    }

    let sources: Vec<SourceRef> = outcome
        .passages
        .iter()
        .enumerate()
        .map(|(i, scored)| SourceRef::from_scored(i + 1, scored))
        .collect();

    // The last turn is this question, rendered separately as `query`
    let earlier = &outcome.context[..outcome.context.len().saturating_sub(1)];
    let mut input = PromptInput::new(query.text.clone())
        .with_sources(sources.iter().map(SourceRef::to_prompt_source).collect())
        .with_history(earlier.iter().map(to_prompt_turn).collect());
    if let Some(context) = options.context.as_deref().map(str::trim) {
        if !context.is_empty() {
            input = input.with_variable("additionalContext", context);
        }
    }
    let built = build_prompt(&options.prompt, &input)?;

    tracing::debug!(
        sources = built.metadata.sources_included,
        history = built.metadata.history_turns,
        "Built answer prompt"
    );

    let mut request = LlmRequest::new(built.user, options.model.clone());
    if let Some(system) = built.system {
        request = request.with_system(system);
    }
    if let Some(max_tokens) = options.max_tokens.or(built.metadata.max_tokens) {
        request = request.with_max_tokens(max_tokens);
    }
    if let Some(temperature) = options.temperature.or(built.metadata.temperature) {
        request = request.with_temperature(temperature);
    }

    let (answer, usage) = if options.stream {
        let stream = client.stream(&request.with_streaming()).await?;
        drain_stream(stream, on_text).await?
    } else {
        let response = client.complete(&request).await?;
        (response.content, response.usage)
    };

    tracing::info!(
        "Generated answer via {}: {} chars, {} tokens",
        client.provider_name(),
        answer.len(),
        usage.total_tokens
    );

    window.append(ConversationTurn::assistant(answer.clone()));

    Ok(AnswerResponse {
        answer,
        sources,
        context_turns: window.len(),
        generated: true,
        usage: Some(usage),
    })
}
