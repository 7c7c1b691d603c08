//! Chat command handler.
//!
//! A line-oriented session: every question shares one conversation window,
//! so follow-ups see the earlier turns.

use super::ask::{finish_answer, print_chunk};
use super::search::parse_hint;
use super::{open_client, open_engine};
use clap::Args;
use sefer_core::{config::AppConfig, AppResult};
use sefer_prompt::{load_prompt, ANSWER_PROMPT_ID};
use sefer_search::rag::{ask, AskOptions};
use sefer_search::{ConversationWindow, Query};
use tokio::io::{AsyncBufReadExt, BufReader};

const EXIT_COMMANDS: &[&str] = &["exit", "quit", "יציאה"];

/// Interactive question-and-answer session
#[derive(Args, Debug)]
pub struct ChatCommand {
    /// Query language hint (he, yi, en)
    #[arg(short, long)]
    pub lang: Option<String>,

    /// Disable streaming
    #[arg(long)]
    pub no_stream: bool,
}

impl ChatCommand {
    /// Execute the chat command.
    pub async fn execute(&self, config: &AppConfig) -> AppResult<()> {
        tracing::info!("Starting chat session");

        let hint = parse_hint(self.lang.as_deref())?;
        let engine = open_engine(config, None)?;
        let client = open_client(config)?;

        let prompt = load_prompt(&config.workspace, ANSWER_PROMPT_ID)?;
        let mut options = AskOptions::new(config.model.clone(), prompt);
        options.stream = !self.no_stream;

        let mut window = ConversationWindow::new(engine.config().context_window);

        eprintln!(
            "{} passages loaded. Type a question, or 'exit' to leave.",
            engine.corpus().len()
        );

        let mut lines = BufReader::new(tokio::io::stdin()).lines();
        loop {
            eprint!("> ");
            let Some(line) = lines.next_line().await? else {
                break;
            };
            let line = line.trim();
            if line.is_empty() {
                continue;
            }
            if is_exit(line) {
                break;
            }

            let query = Query::new(line).with_hint(hint);
            match ask(
                &engine,
                client.as_ref(),
                &query,
                &mut window,
                &options,
                print_chunk,
            )
            .await
            {
                Ok(response) => finish_answer(&response, options.stream),
                // A failed turn does not end the session
                Err(e) => {
                    tracing::warn!("Answer failed: {}", e);
                    eprintln!("Error: {}", e);
                }
            }
            println!();
        }

        tracing::info!("Chat session ended after {} turns", window.len());
        Ok(())
    }
}

fn is_exit(line: &str) -> bool {
    EXIT_COMMANDS.iter().any(|cmd| line.eq_ignore_ascii_case(cmd))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exit_commands() {
        assert!(is_exit("exit"));
        assert!(is_exit("QUIT"));
        assert!(is_exit("יציאה"));
        assert!(!is_exit("what is exit"));
    }
}
