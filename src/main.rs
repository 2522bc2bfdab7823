//! # News Archive CLI (`news`)
//!
//! The `news` binary imports an article folder and queries the result. It
//! provides commands for database initialization, import, pagination,
//! search, question answering, and starting the HTTP API.
//!
//! ## Usage
//!
//! ```bash
//! news --config ./config/news.toml <command>
//! ```
//!
//! ## Commands
//!
//! | Command | Description |
//! |---------|-------------|
//! | `news init` | Create the SQLite database and run schema migrations |
//! | `news import` | Upsert every article file in the archive folder |
//! | `news articles` | Page through stored articles, newest first |
//! | `news get <id>` | Print one article in full |
//! | `news search "<query>"` | Keyword search with previews |
//! | `news ask "<question>"` | Answer a question from the archive |
//! | `news stats` | Summarize what has been imported |
//! | `news serve` | Start the HTTP API |

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

use news_archive::{articles, config, context::AppContext, ingest, qa, search, server, stats};

/// News Archive CLI: import a folder of news articles and search it.
///
/// All commands accept a `--config` flag pointing to a TOML configuration
/// file. See `config/news.example.toml` for a full example.
#[derive(Parser)]
#[command(
    name = "news",
    about = "News Archive: import a folder of news articles and search or question it",
    version
)]
struct Cli {
    /// Path to configuration file (TOML).
    #[arg(long, global = true, default_value = "./config/news.toml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

/// Top-level CLI commands.
#[derive(Subcommand)]
enum Commands {
    /// Initialize the database schema.
    ///
    /// Creates the SQLite database file, the `articles` table, and its
    /// full-text index. Safe to run repeatedly.
    Init,

    /// Import the archive folder.
    ///
    /// New files are inserted, changed files are updated in place, and
    /// unchanged files are skipped.
    Import {
        /// Classify every file without writing to the store.
        #[arg(long)]
        dry_run: bool,
    },

    /// List stored articles, newest first.
    Articles {
        /// Page number, starting at 1.
        #[arg(long, default_value_t = articles::DEFAULT_PAGE)]
        page: i64,

        /// Articles per page (1 to 50).
        #[arg(long, default_value_t = articles::DEFAULT_LIMIT)]
        limit: i64,
    },

    /// Retrieve an article by its id.
    Get {
        /// Article id.
        id: String,
    },

    /// Keyword search over titles and bodies.
    Search {
        /// The search query string.
        query: String,

        /// Maximum number of results to return.
        #[arg(long)]
        limit: Option<i64>,
    },

    /// Answer a natural-language question from the archive.
    Ask {
        /// The question.
        question: String,
    },

    /// Show archive statistics.
    Stats,

    /// Start the HTTP API on `[server].bind`.
    Serve,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("news_archive=info,tower_http=info")),
        )
        .init();

    let cli = Cli::parse();
    let cfg = config::load_config(&cli.config)?;
    let ctx = AppContext::open(&cfg).await?;

    let result = match cli.command {
        Commands::Init => {
            println!("Database initialized successfully.");
            Ok(())
        }
        Commands::Import { dry_run } => ingest::run_import(&ctx, dry_run).await,
        Commands::Articles { page, limit } => articles::run_list(&ctx, page, limit).await,
        Commands::Get { id } => articles::run_get(&ctx, &id).await,
        Commands::Search { query, limit } => search::run_search(&ctx, &query, limit).await,
        Commands::Ask { question } => qa::run_ask(&ctx, &question).await,
        Commands::Stats => stats::run_stats(&ctx).await,
        Commands::Serve => server::run_server(&ctx).await,
    };

    ctx.close().await;
    result
}
