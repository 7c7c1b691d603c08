//! Translate command handler.

use super::{open_client, to_json};
use clap::Args;
use sefer_core::{config::AppConfig, AppError, AppResult};
use sefer_prompt::{load_prompt, TRANSLATE_PROMPT_ID};
use sefer_search::load_corpus;
use sefer_search::rag::{translate, DEFAULT_TARGET_LANGUAGE};

/// Translate one corpus passage
#[derive(Args, Debug)]
pub struct TranslateCommand {
    /// Passage id as shown by `search` (e.g. `tanya.json#12`)
    pub passage_id: String,

    /// Target language
    #[arg(long = "to", default_value = DEFAULT_TARGET_LANGUAGE)]
    pub target_language: String,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

impl TranslateCommand {
    /// Execute the translate command.
    pub async fn execute(&self, config: &AppConfig) -> AppResult<()> {
        tracing::info!("Executing translate command");

        let corpus = load_corpus(&config.corpus_dir())?;
        let passage = corpus.get(&self.passage_id).ok_or_else(|| {
            AppError::Corpus(format!("No passage with id: {}", self.passage_id))
        })?;

        let client = open_client(config)?;
        let prompt = load_prompt(&config.workspace, TRANSLATE_PROMPT_ID)?;

        let response = translate(
            client.as_ref(),
            &config.model,
            &prompt,
            passage,
            &self.target_language,
        )
        .await?;

        if self.json {
            println!("{}", to_json(&response)?);
        } else {
            println!("{}", response.translation);
        }

        Ok(())
    }
}
