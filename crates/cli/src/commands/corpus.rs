//! Corpus command handler.
//!
//! Shows what the loaded corpus holds.

use super::to_json;
use clap::Args;
use sefer_core::{config::AppConfig, AppResult};
use sefer_search::{load_corpus, CorpusStats, WorkSummary};

/// Show corpus statistics
#[derive(Args, Debug)]
pub struct CorpusCommand {
    /// List every work with its passage count
    #[arg(long)]
    pub works: bool,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

impl CorpusCommand {
    /// Execute the corpus command.
    pub async fn execute(&self, config: &AppConfig) -> AppResult<()> {
        let corpus_dir = config.corpus_dir();
        let corpus = load_corpus(&corpus_dir)?;
        let stats = corpus.stats();
        let works = if self.works { corpus.works() } else { Vec::new() };

        if self.json {
            let mut output = serde_json::json!({
                "path": corpus_dir,
                "stats": stats,
            });
            if self.works {
                output["works"] = serde_json::to_value(&works)?;
            }
            println!("{}", to_json(&output)?);
        } else {
            println!("Corpus: {}", corpus_dir.display());
            print!("{}", render(&stats));
            if self.works {
                println!();
                print!("{}", render_works(&works));
            }
        }

        Ok(())
    }
}

fn render(stats: &CorpusStats) -> String {
    let mut out = format!(
        "  Passages: {}\n  Works: {}\n  Characters: {}\n",
        stats.passages, stats.works, stats.total_chars
    );
    for (collection, count) in &stats.by_collection {
        out.push_str(&format!("  {}: {}\n", collection, count));
    }
    out
}

fn render_works(works: &[WorkSummary]) -> String {
    let mut out = String::new();
    for work in works {
        out.push_str(&format!(
            "  {} [{}] {} passages",
            work.title,
            work.collection.as_str(),
            work.passages
        ));
        if let Some(ref author) = work.author {
            out.push_str(&format!(" ({})", author));
        }
        if let Some(ref source) = work.source {
            out.push_str(&format!("  {}", source));
        }
        out.push('\n');
    }
    out
}
