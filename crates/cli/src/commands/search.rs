//! Search command handler.
//!
//! Ranks corpus passages for a query and prints or exports them.

use super::{open_engine, to_json};
use clap::{Args, ValueEnum};
use sefer_core::{config::AppConfig, AppError, AppResult};
use sefer_search::{Collection, LanguageHint, Query, ScoredPassage, SearchFilter};
use std::fmt::Write as _;
use std::path::PathBuf;

/// Export format for `--output`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ExportFormat {
    Json,
    Txt,
}

/// Characters shown around the first match.
const PREVIEW_CHARS: usize = 200;

/// Corpus restriction shared by `search` and `ask`.
#[derive(Args, Debug, Default)]
pub struct FilterArgs {
    /// Only search one collection (discourse, treatise)
    #[arg(long)]
    pub collection: Option<String>,

    /// Only search works whose title or source path contains this text
    #[arg(long)]
    pub work: Option<String>,
}

impl FilterArgs {
    pub fn to_filter(&self) -> AppResult<SearchFilter> {
        let collection = match self.collection.as_deref() {
            None => None,
            Some(value) => Some(Collection::parse(value).ok_or_else(|| {
                AppError::Config(format!(
                    "Unknown collection: {} (expected discourse or treatise)",
                    value
                ))
            })?),
        };
        Ok(SearchFilter {
            collection,
            work: self.work.clone(),
        })
    }
}

/// Search the corpus
#[derive(Args, Debug)]
pub struct SearchCommand {
    /// The query (Hebrew, Yiddish or English)
    pub query: String,

    /// Query language hint (he, yi, en)
    #[arg(short, long)]
    pub lang: Option<String>,

    /// Maximum number of results
    #[arg(long)]
    pub limit: Option<usize>,

    #[command(flatten)]
    pub filter: FilterArgs,

    /// Show the normalized query, the search terms and score breakdowns
    #[arg(long)]
    pub explain: bool,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,

    /// Write results to a file
    #[arg(long)]
    pub output: Option<PathBuf>,

    /// Export format for --output
    #[arg(long, value_enum, default_value = "json", requires = "output")]
    pub format: ExportFormat,
}

impl SearchCommand {
    /// Execute the search command.
    pub async fn execute(&self, config: &AppConfig) -> AppResult<()> {
        tracing::info!("Executing search command");
        tracing::debug!("Search command options: {:?}", self);

        let hint = parse_hint(self.lang.as_deref())?;
        let engine = open_engine(config, self.limit)?;
        let query = Query::new(self.query.clone())
            .with_hint(hint)
            .with_filter(self.filter.to_filter()?);

        let results = engine.search(&query);
        tracing::info!("Found {} passages", results.len());

        if let Some(ref path) = self.output {
            let content = match self.format {
                ExportFormat::Json => to_json(&results)?,
                ExportFormat::Txt => format_txt(&self.query, &results),
            };
            std::fs::write(path, content)?;
            eprintln!("Saved {} results to {}", results.len(), path.display());
        }

        if self.json {
            let output = if self.explain {
                serde_json::json!({
                    "plan": engine.plan(&query),
                    "results": results,
                })
            } else {
                serde_json::json!({ "results": results })
            };
            println!("{}", to_json(&output)?);
            return Ok(());
        }

        if self.explain {
            let plan = engine.plan(&query);
            println!(
                "Normalized: {} ({})",
                plan.normalized.text,
                plan.normalized.script.as_str()
            );
            for term in &plan.terms {
                println!("  [{}] {}", term.class.as_str(), term.text);
            }
            println!();
        }

        if results.is_empty() {
            println!("No passages matched \"{}\".", self.query.trim());
            return Ok(());
        }

        for (i, hit) in results.iter().enumerate() {
            println!("{}", heading(i + 1, hit));
            if self.explain {
                println!(
                    "   coverage {:.0}, phrase bonus {:.0}, length {:.3}",
                    hit.score.coverage, hit.score.phrase_bonus, hit.score.length_adjustment
                );
                let matched: Vec<&str> =
                    hit.score.matched.iter().map(|t| t.text.as_str()).collect();
                println!("   matched: {}", matched.join(" | "));
            }
            println!("   {}", preview(&hit.passage.text, anchor(hit), PREVIEW_CHARS));
            println!();
        }

        Ok(())
    }
}

/// Parse the `--lang` value.
pub fn parse_hint(lang: Option<&str>) -> AppResult<Option<LanguageHint>> {
    match lang {
        None => Ok(None),
        Some(value) => LanguageHint::parse(value).map(Some).ok_or_else(|| {
            AppError::Config(format!(
                "Unknown language: {} (expected he, yi or en)",
                value
            ))
        }),
    }
}

fn heading(rank: usize, hit: &ScoredPassage<'_>) -> String {
    let citation = &hit.passage.citation;
    let mut line = format!("{}. {}", rank, citation.title);
    if let Some(ref subsection) = citation.subsection {
        let _ = write!(line, " / ד״ה {}", subsection);
    }
    if let Some(ref section) = citation.section {
        let _ = write!(line, " / {}", section);
    }
    if let Some(ref author) = citation.author {
        let _ = write!(line, " ({})", author);
    }
    let _ = write!(line, "  [{:.2}] {}", hit.total(), hit.passage.id);
    line
}

/// Character offset of the first matched term found in the passage text.
fn anchor(hit: &ScoredPassage<'_>) -> usize {
    hit.score
        .matched
        .iter()
        .find_map(|term| hit.passage.locate(&term.text))
        .unwrap_or(0)
}

/// Up to `limit` characters of `text` with the character at `anchor` centred.
fn preview(text: &str, anchor: usize, limit: usize) -> String {
    let chars: Vec<char> = text.chars().collect();
    if chars.len() <= limit {
        return text.to_string();
    }

    let start = anchor
        .saturating_sub(limit / 2)
        .min(chars.len() - limit);
    let end = start + limit;

    let mut out = String::new();
    if start > 0 {
        out.push_str("...");
    }
    out.extend(&chars[start..end]);
    if end < chars.len() {
        out.push_str("...");
    }
    out
}

/// Plain-text export: one block per result with its full text.
fn format_txt(query: &str, results: &[ScoredPassage<'_>]) -> String {
    let mut out = format!("Search results for: {}\n", query.trim());
    let _ = writeln!(out, "Found {} passages", results.len());

    for (i, hit) in results.iter().enumerate() {
        out.push_str(&"=".repeat(60));
        out.push('\n');
        let _ = writeln!(out, "{}", heading(i + 1, hit));
        let _ = writeln!(out, "Collection: {}", hit.passage.collection.as_str());
        if let Some(ref source) = hit.passage.citation.source {
            let _ = writeln!(out, "Source: {}", source);
        }
        out.push('\n');
        out.push_str(&hit.passage.text);
        out.push_str("\n\n");
    }

    out
}
