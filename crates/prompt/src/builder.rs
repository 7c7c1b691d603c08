//! Prompt builder for rendering templates and injecting context.

use crate::types::{BuiltPrompt, BuiltPromptMetadata, PromptDefinition, PromptInput, PromptSource};
use handlebars::Handlebars;
use sefer_core::{AppError, AppResult};
use serde_json::{Map, Value};

/// Build a prompt from a definition and its input.
///
/// This function:
/// 1. Truncates source texts to `maxSourceChars` when set
/// 2. Drops sources or history the definition does not ask for
/// 3. Renders the system and user templates with Handlebars
///
/// Templates see `query`, `sources`, `history`, `hasSources`, `hasHistory`
/// and every entry of `input.variables` at the top level.
///
/// # Example
/// ```no_run
/// use sefer_prompt::{build_prompt, PromptDefinition, PromptInput};
///
/// # fn example(def: PromptDefinition) -> Result<(), Box<dyn std::error::Error>> {
/// let built = build_prompt(&def, &PromptInput::new("מהו ביטול היש"))?;
/// println!("User prompt: {}", built.user);
/// # Ok(())
/// # }
/// ```
pub fn build_prompt(definition: &PromptDefinition, input: &PromptInput) -> AppResult<BuiltPrompt> {
    tracing::debug!("Building prompt: {}", definition.id);

    let sources: Vec<PromptSource> = if definition.context.include_sources {
        input
            .sources
            .iter()
            .map(|source| match definition.context.max_source_chars {
                Some(limit) => PromptSource {
                    text: truncate_chars(&source.text, limit),
                    ..source.clone()
                },
                None => source.clone(),
            })
            .collect()
    } else {
        Vec::new()
    };

    let history = if definition.context.include_history {
        input.history.clone()
    } else {
        Vec::new()
    };

    let mut data = Map::new();
    for (key, value) in &input.variables {
        data.insert(key.clone(), Value::String(value.clone()));
    }
    data.insert("query".to_string(), Value::String(input.query.clone()));
    data.insert("hasSources".to_string(), Value::Bool(!sources.is_empty()));
    data.insert("hasHistory".to_string(), Value::Bool(!history.is_empty()));
    data.insert("sources".to_string(), serde_json::to_value(&sources)?);
    data.insert("history".to_string(), serde_json::to_value(&history)?);
    let data = Value::Object(data);

    let handlebars = registry();
    let user = render_template(&handlebars, &definition.template, &data)?;
    let system = definition
        .system
        .as_deref()
        .map(|template| render_template(&handlebars, template, &data))
        .transpose()?;

    Ok(BuiltPrompt {
        system,
        user,
        metadata: BuiltPromptMetadata {
            source_prompt_id: definition.id.clone(),
            sources_included: sources.len(),
            history_turns: history.len(),
            temperature: definition.behavior.temperature,
            max_tokens: definition.behavior.max_tokens,
        },
    })
}

fn registry() -> Handlebars<'static> {
    let mut handlebars = Handlebars::new();
    // Plain text output, no HTML escaping
    handlebars.register_escape_fn(handlebars::no_escape);
    handlebars
}

/// Render a Handlebars template against the prompt data.
fn render_template(handlebars: &Handlebars<'_>, template: &str, data: &Value) -> AppResult<String> {
    handlebars
        .render_template(template, data)
        .map_err(|e| AppError::Prompt(format!("Failed to render template: {}", e)))
}

/// Cut `text` to at most `limit` characters, marking the cut with "...".
fn truncate_chars(text: &str, limit: usize) -> String {
    match text.char_indices().nth(limit) {
        Some((byte_idx, _)) => format!("{}...", &text[..byte_idx]),
        None => text.to_string(),
    }
}
