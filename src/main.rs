//! # SEO Console CLI (`seoc`)
//!
//! Drives the console's feature controllers from the command line.
//!
//! ## Usage
//!
//! ```bash
//! seoc --config ./config/seoc.toml <command>
//! ```
//!
//! ## Commands
//!
//! | Command | Description |
//! |---------|-------------|
//! | `seoc list <feature>` | Fetch one page of a feature's records |
//! | `seoc create <feature> --json '{..}'` | Create a record |
//! | `seoc update <feature> <id> --json '{..}'` | Update a record |
//! | `seoc delete <feature> <id>...` | Delete one record, or several in one bulk call |
//! | `seoc rerun-audit <id>` | Queue an audit to run again |
//! | `seoc retry-ai-request <id>` | Queue a failed AI request again |
//! | `seoc audit-scores` | List audits with their displayed metrics |
//! | `seoc metric <id>...` | Print placeholder metrics (no backend needed) |
//!
//! Features: `keywords`, `content`, `audits`, `ai-requests`, `rankings`, `traffic`.

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

use seo_console::commands::{self, ListArgs};
use seo_console::config;
use seo_console::console::{Console, Feature};
use seo_console::notify::Notifier;
use seo_console_core::resource::SortOrder;

/// SEO Console CLI: keywords, content, audits, AI requests, rankings, and
/// traffic reports over the console's REST API.
///
/// All commands accept a `--config` flag pointing to a TOML configuration
/// file. See `config/seoc.example.toml` for a full example.
#[derive(Parser)]
#[command(name = "seoc", version, about = "SEO Console CLI")]
struct Cli {
    /// Path to configuration file (TOML).
    #[arg(long, global = true, default_value = "./config/seoc.toml")]
    config: PathBuf,

    /// Use empty in-memory collections instead of the REST API.
    #[arg(long, global = true)]
    offline: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Fetch one page of a feature's records.
    List {
        #[arg(value_enum)]
        feature: Feature,

        #[command(flatten)]
        filters: FilterArgs,
    },

    /// Create a record from a JSON object.
    Create {
        #[arg(value_enum)]
        feature: Feature,

        #[arg(long)]
        json: String,
    },

    /// Update a record with a partial JSON object.
    Update {
        #[arg(value_enum)]
        feature: Feature,

        id: String,

        #[arg(long)]
        json: String,
    },

    /// Delete records. More than one id is sent as a single bulk delete.
    Delete {
        #[arg(value_enum)]
        feature: Feature,

        #[arg(required = true)]
        ids: Vec<String>,
    },

    /// Queue an audit to run again.
    RerunAudit { id: String },

    /// Queue an AI request again.
    RetryAiRequest { id: String },

    /// List audits with the score and issue counts each one displays.
    AuditScores {
        #[command(flatten)]
        filters: FilterArgs,
    },

    /// Print the placeholder metric derived from each identifier.
    Metric {
        #[arg(required = true)]
        ids: Vec<String>,
    },
}

#[derive(clap::Args)]
struct FilterArgs {
    /// Case-insensitive text search.
    #[arg(long)]
    search: Option<String>,

    #[arg(long)]
    status: Option<String>,

    #[arg(long)]
    category: Option<String>,

    /// Field to sort by (feature-specific, e.g. `position`, `created_at`).
    #[arg(long)]
    sort_by: Option<String>,

    /// `asc` or `desc`.
    #[arg(long)]
    order: Option<SortOrder>,

    #[arg(long)]
    page: Option<u32>,

    #[arg(long)]
    limit: Option<u32>,
}

impl From<FilterArgs> for ListArgs {
    fn from(f: FilterArgs) -> Self {
        ListArgs {
            search: f.search,
            status: f.status,
            category: f.category,
            sort_by: f.sort_by,
            order: f.order,
            page: f.page,
            limit: f.limit,
        }
    }
}

fn init_logging(level: &str) {
    // RUST_LOG wins over the config file
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Commands that don't require config
    if let Commands::Metric { ids } = &cli.command {
        return commands::run_metric(ids);
    }

    let cfg = config::load_config_or_minimal(&cli.config, cli.offline)?;
    init_logging(&cfg.logging.level);

    let console = if cli.offline {
        Console::offline(&cfg)
    } else {
        Console::connect(&cfg)?
    };
    let notifier = Notifier::for_console(&cfg.notifications, &console);

    let result = match cli.command {
        Commands::List { feature, filters } => {
            commands::run_list(&console, feature, filters.into()).await
        }
        Commands::Create { feature, json } => commands::run_create(&console, feature, &json).await,
        Commands::Update { feature, id, json } => {
            commands::run_update(&console, feature, &id, &json).await
        }
        Commands::Delete { feature, ids } => commands::run_delete(&console, feature, ids).await,
        Commands::RerunAudit { id } => commands::run_rerun_audit(&console, &id).await,
        Commands::RetryAiRequest { id } => commands::run_retry_ai_request(&console, &id).await,
        Commands::AuditScores { filters } => {
            commands::run_audit_scores(&console, filters.into()).await
        }
        Commands::Metric { .. } => {
            // Handled above (before config loading)
            unreachable!()
        }
    };

    for n in notifier.pending() {
        eprintln!("[{} {}] {}", n.feature, n.operation, n.message);
    }

    if result.is_err() && !notifier.pending().is_empty() {
        // already reported through the notification above
        std::process::exit(1);
    }
    result
}
