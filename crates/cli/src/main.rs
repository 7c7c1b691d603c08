//! Sefer CLI
//!
//! Main entry point for the sefer command-line tool.
//! Searches a Chassidic corpus and answers questions grounded in it.

mod commands;

use clap::{Parser, Subcommand};
use commands::{
    AskCommand, ChatCommand, CorpusCommand, PromptsCommand, SearchCommand, TranslateCommand,
};
use sefer_core::{config::AppConfig, logging, AppResult};
use std::path::PathBuf;

/// Sefer - multilingual search over Chabad Chassidic texts
#[derive(Parser, Debug)]
#[command(name = "sefer")]
#[command(about = "Multilingual search over Chabad Chassidic texts", long_about = None)]
#[command(version)]
struct Cli {
    /// Path to workspace directory (default: current directory)
    #[arg(short, long, global = true, env = "SEFER_WORKSPACE")]
    workspace: Option<PathBuf>,

    /// Path to config file
    #[arg(short, long, global = true, env = "SEFER_CONFIG")]
    config: Option<PathBuf>,

    /// Corpus directory (default: <workspace>/corpus)
    #[arg(long, global = true, env = "SEFER_CORPUS")]
    corpus: Option<PathBuf>,

    /// Log level (error, warn, info, debug, trace)
    #[arg(long, global = true, env = "RUST_LOG")]
    log_level: Option<String>,

    /// Enable verbose output (sets log level to debug)
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Disable colored output
    #[arg(long, global = true, env = "NO_COLOR")]
    no_color: bool,

    /// Generation provider (ollama, claude)
    #[arg(short, long, global = true, env = "SEFER_PROVIDER")]
    provider: Option<String>,

    /// Model identifier
    #[arg(short, long, global = true, env = "SEFER_MODEL")]
    model: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Search the corpus
    Search(SearchCommand),

    /// Ask a question answered from the corpus
    Ask(AskCommand),

    /// Interactive question-and-answer session
    Chat(ChatCommand),

    /// Translate one passage
    Translate(TranslateCommand),

    /// Show corpus statistics and works
    Corpus(CorpusCommand),

    /// List available prompt definitions
    Prompts(PromptsCommand),
}

#[tokio::main]
async fn main() -> AppResult<()> {
    // Parse command-line arguments first (needed for logging config)
    let cli = Cli::parse();

    // Load base configuration from environment
    let config = AppConfig::load()?;

    // Apply CLI overrides
    let config = config.with_overrides(
        cli.workspace,
        cli.config,
        cli.corpus,
        cli.provider,
        cli.model,
        cli.log_level,
        cli.verbose,
        cli.no_color,
    );

    // Initialize logging with final configuration
    logging::init_logging(config.log_level.as_deref(), config.no_color)?;

    tracing::info!("Sefer CLI starting");
    tracing::debug!("Workspace: {:?}", config.workspace);
    tracing::debug!("Corpus: {:?}", config.corpus_dir());
    tracing::debug!("Provider: {}", config.provider);
    tracing::debug!("Model: {}", config.model);

    let command_name = match &cli.command {
        Commands::Search(_) => "search",
        Commands::Ask(_) => "ask",
        Commands::Chat(_) => "chat",
        Commands::Translate(_) => "translate",
        Commands::Corpus(_) => "corpus",
        Commands::Prompts(_) => "prompts",
    };
    let _span = tracing::info_span!("command", name = command_name).entered();

    // Route to command handlers
    let result = match cli.command {
        Commands::Search(cmd) => cmd.execute(&config).await,
        Commands::Ask(cmd) => cmd.execute(&config).await,
        Commands::Chat(cmd) => cmd.execute(&config).await,
        Commands::Translate(cmd) => cmd.execute(&config).await,
        Commands::Corpus(cmd) => cmd.execute(&config).await,
        Commands::Prompts(cmd) => cmd.execute(&config).await,
    };

    match &result {
        Ok(_) => tracing::info!("Command completed successfully"),
        Err(e) => tracing::error!("Command failed: {}", e),
    }

    result
}
