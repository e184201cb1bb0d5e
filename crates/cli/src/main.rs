// crates/cli/src/main.rs
//! ctxsaver-extract: print what the last coding session in a repo was about.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use ctxsaver_core::{ExtractConfig, ExtractionRunner, StorageRoots, TranscriptCompactor};
use tracing::debug;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "ctxsaver-extract")]
#[command(about = "Extract coding-session context from editor storage")]
#[command(version)]
struct Cli {
    /// Home directory to look for editor storage under (default: $CTXSAVER_HOME or ~)
    #[arg(long, global = true)]
    home: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the extracted context as JSON
    Extract {
        /// Repository path (default: current directory)
        #[arg(short, long)]
        repo: Option<PathBuf>,

        /// Pretty-print the JSON
        #[arg(long)]
        pretty: bool,
    },

    /// Print the compacted transcript of the latest Claude Code session
    Transcript {
        /// Repository path (default: current directory)
        #[arg(short, long)]
        repo: Option<PathBuf>,
    },
}

fn resolve_repo(repo: Option<PathBuf>) -> Result<PathBuf> {
    match repo {
        Some(path) => Ok(path),
        None => std::env::current_dir().context("Failed to read current directory"),
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "warn,ctxsaver_core=info".into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let config = match &cli.home {
        Some(home) => ExtractConfig::new(StorageRoots::from_home(home)).with_env_limits(),
        None => ExtractConfig::from_env().context("Failed to locate editor storage")?,
    };
    debug!(roots = ?config.roots, "Using storage roots");

    match cli.command {
        Commands::Extract { repo, pretty } => {
            let repo = resolve_repo(repo)?;
            let Some(ctx) = ExtractionRunner::from_config(&config).run(&repo).await else {
                eprintln!("No session context found for {}", repo.display());
                std::process::exit(1);
            };
            let json = if pretty {
                serde_json::to_string_pretty(&ctx)?
            } else {
                serde_json::to_string(&ctx)?
            };
            println!("{json}");
        }
        Commands::Transcript { repo } => {
            let repo = resolve_repo(repo)?;
            let transcript = TranscriptCompactor::new(config.transcript_char_budget)
                .compact_repo(&config.roots.claude_projects, &repo)
                .await
                .with_context(|| format!("Failed to read session for {}", repo.display()))?;
            let Some(transcript) = transcript else {
                eprintln!("No Claude Code session found for {}", repo.display());
                std::process::exit(1);
            };
            print!("{transcript}");
        }
    }

    Ok(())
}
