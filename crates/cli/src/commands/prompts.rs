//! Prompts command handler.
//!
//! Lists the prompt definitions `ask`, `chat` and `translate` can use.

use super::to_json;
use clap::Args;
use sefer_core::{config::AppConfig, AppResult};
use sefer_prompt::{list_prompts, load_prompt};
use serde::Serialize;

/// List available prompt definitions
#[derive(Args, Debug)]
pub struct PromptsCommand {
    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

/// One prompt and where it was found.
#[derive(Debug, Clone, Serialize)]
pub struct PromptEntry {
    pub id: String,
    pub title: String,
    /// Workspace file path, or `built-in`
    pub origin: String,
}

impl PromptsCommand {
    /// Execute the prompts command.
    pub async fn execute(&self, config: &AppConfig) -> AppResult<()> {
        let entries = collect(config)?;

        if self.json {
            println!("{}", to_json(&entries)?);
            return Ok(());
        }

        for entry in &entries {
            println!("{:<24} {}  [{}]", entry.id, entry.title, entry.origin);
        }
        Ok(())
    }
}

fn collect(config: &AppConfig) -> AppResult<Vec<PromptEntry>> {
    let prompts_dir = config.sefer_dir().join("prompts");

    list_prompts(&config.workspace)?
        .into_iter()
        .map(|id| {
            let file = prompts_dir.join(format!("{}.yml", id));
            let origin = if file.exists() {
                file.display().to_string()
            } else {
                "built-in".to_string()
            };
            let title = match load_prompt(&config.workspace, &id) {
                Ok(definition) => definition.title,
                Err(e) => {
                    tracing::warn!("Skipping title of {}: {}", id, e);
                    "(invalid)".to_string()
                }
            };
            Ok(PromptEntry { id, title, origin })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use sefer_prompt::{ANSWER_PROMPT_ID, TRANSLATE_PROMPT_ID};
    use tempfile::TempDir;

    #[test]
    fn test_collect_marks_workspace_prompts() {
        let temp_dir = TempDir::new().unwrap();
        let config = AppConfig {
            workspace: temp_dir.path().to_path_buf(),
            ..Default::default()
        };
        let prompts_dir = config.sefer_dir().join("prompts");
        std::fs::create_dir_all(&prompts_dir).unwrap();
        std::fs::write(
            prompts_dir.join("summary.yml"),
            concat!(
                "id: summary\n",
                "title: Short Summary\n",
                "apiVersion: \"1.0\"\n",
                "behavior:\n  tone: plain\n  style: concise\n",
                "template: \"{{query}}\"\n",
                "output:\n  format: text\n",
            ),
        )
        .unwrap();
        std::fs::write(prompts_dir.join("broken.yml"), "id: [").unwrap();

        let entries = collect(&config).unwrap();
        let ids: Vec<&str> = entries.iter().map(|e| e.id.as_str()).collect();
        assert_eq!(
            ids,
            vec![ANSWER_PROMPT_ID, "broken", "summary", TRANSLATE_PROMPT_ID]
        );

        assert_eq!(entries[0].origin, "built-in");
        assert_eq!(entries[1].title, "(invalid)");
        assert_eq!(entries[2].title, "Short Summary");
        assert!(entries[2].origin.ends_with("summary.yml"));
    }
}
