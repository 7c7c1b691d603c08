//! Ask command handler.
//!
//! Answers one question from the corpus through the generation service.

use super::search::{parse_hint, FilterArgs};
use super::{open_client, open_engine, to_json};
use clap::Args;
use sefer_core::{config::AppConfig, AppResult};
use sefer_prompt::{load_prompt, ANSWER_PROMPT_ID};
use sefer_search::rag::{ask, AnswerResponse, AskOptions};
use sefer_search::{ConversationWindow, Query};
use std::io::Write;

/// Ask a question answered from the corpus
#[derive(Args, Debug)]
pub struct AskCommand {
    /// The question to ask
    pub query: String,

    /// Query language hint (he, yi, en)
    #[arg(short, long)]
    pub lang: Option<String>,

    #[command(flatten)]
    pub filter: FilterArgs,

    /// Extra background passed to the analysis prompt
    #[arg(long)]
    pub context: Option<String>,

    /// Disable streaming
    #[arg(long)]
    pub no_stream: bool,

    /// Maximum tokens in response
    #[arg(long)]
    pub max_tokens: Option<u32>,

    /// Temperature for response generation (0.0-1.0)
    #[arg(long)]
    pub temperature: Option<f32>,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

impl AskCommand {
    /// Execute the ask command.
    pub async fn execute(&self, config: &AppConfig) -> AppResult<()> {
        tracing::info!("Executing ask command");
        tracing::debug!("Ask command options: {:?}", self);

        let hint = parse_hint(self.lang.as_deref())?;
        let engine = open_engine(config, None)?;
        let client = open_client(config)?;

        let prompt = load_prompt(&config.workspace, ANSWER_PROMPT_ID)?;
        tracing::debug!("Loaded prompt definition: {}", prompt.id);

        let mut options = AskOptions::new(config.model.clone(), prompt);
        options.max_tokens = self.max_tokens;
        options.temperature = self.temperature;
        options.context = self.context.clone();
        // JSON output needs the whole answer first
        options.stream = !self.no_stream && !self.json;

        let mut window = ConversationWindow::new(engine.config().context_window);
        let query = Query::new(self.query.clone())
            .with_hint(hint)
            .with_filter(self.filter.to_filter()?);

        let response = ask(
            &engine,
            client.as_ref(),
            &query,
            &mut window,
            &options,
            print_chunk,
        )
        .await?;

        if self.json {
            let output = serde_json::json!({
                "query": self.query,
                "provider": config.provider,
                "model": config.model,
                "response": response,
            });
            println!("{}", to_json(&output)?);
        } else {
            finish_answer(&response, options.stream);
        }

        Ok(())
    }
}

/// Write streamed text to stdout as it arrives.
pub fn print_chunk(text: &str) {
    print!("{}", text);
    std::io::stdout().flush().ok();
}

/// Print the rest of an answer: the text when it was not streamed, then sources.
pub fn finish_answer(response: &AnswerResponse, streamed: bool) {
    if streamed && response.generated {
        println!();
    } else {
        println!("{}", response.answer);
    }

    if !response.sources.is_empty() {
        println!();
        println!("Sources:");
        for source in &response.sources {
            let mut line = format!("  [{}] {}", source.index, source.title);
            if let Some(ref subsection) = source.subsection {
                line.push_str(&format!(" / ד״ה {}", subsection));
            }
            if let Some(ref section) = source.section {
                line.push_str(&format!(" / {}", section));
            }
            println!("{}  ({})", line, source.id);
        }
    }

    if let Some(usage) = response.usage {
        tracing::debug!(
            "Token usage - Prompt: {}, Completion: {}, Total: {}",
            usage.prompt_tokens,
            usage.completion_tokens,
            usage.total_tokens
        );
    }
}
