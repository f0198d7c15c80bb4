use clap::{Parser, Subcommand};
use std::path::PathBuf;
use thiserror::Error;
use tracing_subscriber::EnvFilter;

use sheet_kv::config::{Config, ConfigError, Overrides};
use sheet_kv::store::{self, StoreError};
use sheet_kv::{ConcurrencyMode, IncrementCoordinator, ScoreDelta, SheetTable};

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Config error: {0}")]
    Config(#[from] ConfigError),

    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    #[error("{0}")]
    Sheet(#[from] sheet_kv::Error),

    #[error("JSON output error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

#[derive(Parser)]
#[command(name = "sheet-kv")]
#[command(about = "Read records from a spreadsheet and apply score increments")]
struct Cli {
    /// Path to the configuration file (defaults to ./sheet-kv.toml when present).
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Spreadsheet document ID
    #[arg(long, global = true, env = "SHEET_ID")]
    sheet_id: Option<String>,

    /// Service-account key file
    #[arg(long, global = true, env = "GOOGLE_APPLICATION_CREDENTIALS")]
    credentials: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print every data row as a JSON record
    List,

    /// Print the first record whose ID field matches
    Get {
        /// Record ID
        id: String,
    },

    /// Add a delta to a row's Points and count one vote
    Increment {
        /// Row ID (matched against the first column)
        id: String,

        /// Amount to add to Points
        #[arg(allow_hyphen_values = true)]
        delta: ScoreDelta,

        /// Concurrency handling for the update
        #[arg(long, env = "SHEET_CONCURRENCY")]
        concurrency: Option<ConcurrencyMode>,
    },
}

#[tokio::main]
async fn main() -> Result<(), AppError> {
    let _ = dotenvy::dotenv();

    // Diagnostics go to stderr so stdout stays parseable JSON
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let mut config = Config::load(cli.config.as_deref())?;
    config.apply_overrides(Overrides {
        spreadsheet_id: cli.sheet_id,
        credentials: cli.credentials,
        ..Overrides::default()
    });
    let store = store::open(&config.sheet)?;

    match cli.command {
        Commands::List => {
            let records = SheetTable::new(store).list_records().await?;
            println!("{}", serde_json::to_string_pretty(&records)?);
            Ok(())
        }
        Commands::Get { id } => {
            match SheetTable::new(store).find_record_by_id(&id).await {
                Ok(record) => {
                    println!("{}", serde_json::to_string_pretty(&record)?);
                }
                Err(sheet_kv::Error::NotFound { .. }) => {
                    eprintln!("Item '{}' not found", id);
                    std::process::exit(1);
                }
                Err(e) => return Err(e.into()),
            }
            Ok(())
        }
        Commands::Increment {
            id,
            delta,
            concurrency,
        } => {
            let mode = concurrency.unwrap_or(config.sheet.concurrency);
            let coordinator = IncrementCoordinator::new(store, mode);
            let outcome = coordinator.increment_score(&id, delta).await?;
            println!(
                "Points incremented for ID {} (row {}): points {}, votes {}",
                outcome.id, outcome.row.sheet_row, outcome.new_points, outcome.new_votes
            );
            Ok(())
        }
    }
}
