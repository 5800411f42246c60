//! # tourbot CLI
//!
//! One-shot front end for the concert-tour assistant.
//!
//! ## Usage
//!
//! ```bash
//! tourbot --config ./config/tourbot.toml <command>
//! ```
//!
//! ## Commands
//!
//! | Command | Description |
//! |---------|-------------|
//! | `tourbot init` | Create the SQLite database and schema |
//! | `tourbot ask "<text>"` | Classify the text, then ingest it or answer it |
//! | `tourbot ask "<artist>" --mode web-search` | Answer from a live web search |
//! | `tourbot replay <file>` | Ingest sample documents and answer sample questions |
//! | `tourbot stats` | Show record counts for the collection |
//!
//! Replies go to stdout. Logs go to stderr and are filtered with `RUST_LOG`
//! (default `tourbot=info`).
//!
//! Exits with status 78 when a required API key is missing and 1 on any
//! other failure.

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;

use tourbot::config;
use tourbot::error::ProviderError;
use tourbot::migrate;
use tourbot::models::Mode;
use tourbot::pipeline::Pipeline;
use tourbot::replay;
use tourbot::respond::{self, Target};
use tourbot::stats;
use tourbot::store::SqliteStore;
use tourbot::web_search::SerpApiProvider;

/// tourbot answers questions about concert tours from shared documents
/// and live web search.
///
/// All commands accept a `--config` flag pointing to a TOML configuration
/// file. When the file does not exist, built-in defaults are used.
#[derive(Parser)]
#[command(name = "tourbot", version)]
struct Cli {
    /// Path to configuration file (TOML).
    #[arg(long, global = true, default_value = "./config/tourbot.toml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Initialize the database schema. Safe to run repeatedly.
    Init,

    /// Submit one piece of text.
    ///
    /// In `core` mode the text is classified: documents are summarized and
    /// stored, questions are answered from stored documents. In
    /// `web-search` mode the text is an artist name and the answer comes
    /// from current search results.
    Ask {
        /// Document, question, or artist name.
        text: String,

        /// `core` or `web-search`.
        #[arg(long, default_value = "core")]
        mode: Mode,
    },

    /// Ingest the documents and answer the questions in a sample-data file.
    Replay {
        /// File with `### Example Documents:` and `### Example Questions:` sections.
        file: PathBuf,
    },

    /// Show database statistics.
    Stats,
}

fn init_logging() {
    use tracing_subscriber::{fmt, EnvFilter};

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("tourbot=info"));

    fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

/// Exit status for configuration faults such as a missing API key
/// (`EX_CONFIG` from sysexits.h).
const EXIT_CONFIG: u8 = 78;

fn is_configuration_fault(err: &anyhow::Error) -> bool {
    err.chain().any(|cause| {
        cause
            .downcast_ref::<ProviderError>()
            .is_some_and(ProviderError::is_configuration)
    })
}

#[tokio::main]
async fn main() -> ExitCode {
    init_logging();
    let cli = Cli::parse();

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            if is_configuration_fault(&e) {
                ExitCode::from(EXIT_CONFIG)
            } else {
                ExitCode::FAILURE
            }
        }
    }
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let cfg = config::load_or_default(&cli.config)?;

    match cli.command {
        Commands::Init => {
            migrate::run_migrations(&cfg).await?;
            println!("Database initialized successfully.");
        }
        Commands::Ask { text, mode } => {
            let pipeline = Pipeline::from_config(&cfg)?;
            let reply = match mode {
                Mode::Core => {
                    let store = SqliteStore::open(&cfg).await?;
                    let reply = respond::respond(&pipeline, Target::Store(&store), &text).await;
                    store.close().await;
                    reply?
                }
                Mode::WebSearch => {
                    let search = SerpApiProvider::new(&cfg.web_search)?;
                    respond::respond(&pipeline, Target::Web(&search), &text).await?
                }
            };
            println!("{}", reply);
        }
        Commands::Replay { file } => {
            let pipeline = Pipeline::from_config(&cfg)?;
            let store = SqliteStore::open(&cfg).await?;
            let result = replay::run_replay(&pipeline, &store, &file).await;
            store.close().await;
            result?;
        }
        Commands::Stats => {
            stats::run_stats(&cfg).await?;
        }
    }

    Ok(())
}
