//! Answer and translation response types.

use crate::conversation::ConversationTurn;
use crate::corpus::{Collection, Passage};
use crate::rank::ScoredPassage;
use sefer_llm::LlmUsage;
use sefer_prompt::{PromptDefinition, PromptSource, PromptTurn};
use serde::Serialize;

/// A cited passage returned alongside an answer.
///
/// Carries the full passage text; only the prompt copy is shortened.
#[derive(Debug, Clone, Serialize)]
pub struct SourceRef {
    /// 1-based rank
    pub index: usize,
    pub id: String,
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub section: Option<String>,
    /// Discourse title (ד״ה)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subsection: Option<String>,
    pub collection: Collection,
    pub score: f64,
    pub text: String,
}

impl SourceRef {
    pub fn from_scored(index: usize, scored: &ScoredPassage<'_>) -> Self {
        let passage: &Passage = scored.passage;
        Self {
            index,
            id: passage.id.clone(),
            title: passage.citation.title.clone(),
            author: passage.citation.author.clone(),
            section: passage.citation.section.clone(),
            subsection: passage.citation.subsection.clone(),
            collection: passage.collection,
            score: scored.total(),
            text: passage.text.clone(),
        }
    }

    pub(crate) fn to_prompt_source(&self) -> PromptSource {
        PromptSource {
            index: self.index,
            id: self.id.clone(),
            title: self.title.clone(),
            author: self.author.clone(),
            section: self.section.clone(),
            subsection: self.subsection.clone(),
            collection: self.collection.as_str().to_string(),
            text: self.text.clone(),
        }
    }
}

pub(crate) fn to_prompt_turn(turn: &ConversationTurn) -> PromptTurn {
    PromptTurn {
        role: turn.role.as_str().to_string(),
        text: turn.text.clone(),
    }
}

/// Settings for one generation call.
#[derive(Debug, Clone)]
pub struct AskOptions {
    /// Model identifier passed to the client
    pub model: String,
    /// Answer prompt definition
    pub prompt: PromptDefinition,
    /// Overrides the prompt's suggested limit
    pub max_tokens: Option<u32>,
    /// Overrides the prompt's suggested temperature
    pub temperature: Option<f32>,
    /// Stream the answer through the text callback
    pub stream: bool,
    /// Extra background for the analysis, rendered as `additionalContext`
    pub context: Option<String>,
}

impl AskOptions {
    pub fn new(model: impl Into<String>, prompt: PromptDefinition) -> Self {
        Self {
            model: model.into(),
            prompt,
            max_tokens: None,
            temperature: None,
            stream: false,
            context: None,
        }
    }
}

/// Answer to a question, with the passages it was grounded on.
#[derive(Debug, Clone, Serialize)]
pub struct AnswerResponse {
    pub answer: String,
    pub sources: Vec<SourceRef>,
    /// Window size after the answer was recorded
    #[serde(rename = "contextTurns")]
    pub context_turns: usize,
    /// Whether the generation service was called
    pub generated: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub usage: Option<LlmUsage>,
}

impl AnswerResponse {
    /// Fixed answer when no passage matched; the generation service is not called.
    pub fn no_results(query: &str, context_turns: usize) -> Self {
        Self {
            answer: no_results_message(query),
            sources: Vec::new(),
            context_turns,
            generated: false,
            usage: None,
        }
    }
}

pub fn no_results_message(query: &str) -> String {
    format!(
        "No passages in the corpus matched \"{}\". Try a different spelling or a shorter phrase.",
        query.trim()
    )
}

/// A translated passage.
#[derive(Debug, Clone, Serialize)]
pub struct TranslationResponse {
    #[serde(rename = "passageId")]
    pub passage_id: String,
    #[serde(rename = "targetLanguage")]
    pub target_language: String,
    pub translation: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::corpus::Citation;
    use crate::scoring::ScoreBreakdown;

    #[test]
    fn test_source_ref_keeps_full_text() {
        let text = "א".repeat(3000);
        let passage = Passage::new(
            "book.json#1",
            Collection::Discourse,
            text.clone(),
            Citation {
                title: "ספר המאמרים".to_string(),
                subsection: Some("באתי לגני".to_string()),
                ..Default::default()
            },
        );
        let scored = ScoredPassage {
            passage: &passage,
            corpus_index: 0,
            score: ScoreBreakdown {
                total: 1100.5,
                coverage: 1000.0,
                phrase_bonus: 100.0,
                length_adjustment: 0.5,
                matched: Vec::new(),
            },
        };

        let source = SourceRef::from_scored(1, &scored);
        assert_eq!(source.text, text);
        assert_eq!(source.score, 1100.5);

        let prompt_source = source.to_prompt_source();
        assert_eq!(prompt_source.collection, "discourse");
        assert_eq!(prompt_source.subsection.as_deref(), Some("באתי לגני"));
    }

    #[test]
    fn test_no_results_response() {
        let response = AnswerResponse::no_results("  צמצום ", 2);
        assert!(response.answer.contains("\"צמצום\""));
        assert!(response.sources.is_empty());
        assert!(!response.generated);
        assert_eq!(response.context_turns, 2);
    }
}
