//! sheet-kv HTTP API server.

use std::net::SocketAddr;
use std::path::PathBuf;

use axum::Router;
use clap::Parser;
use tokio::signal;
use tower_http::trace::TraceLayer;

use sheet_kv::config::{Config, Overrides};
use sheet_kv::server::{AppState, build_cors_layer, init_logging, router};
use sheet_kv::ConcurrencyMode;

/// sheet-kv HTTP API server.
#[derive(Parser, Debug)]
#[command(name = "sheet-kv-server")]
#[command(about = "Serve a spreadsheet as a JSON record API with score increments")]
struct Args {
    /// Path to the configuration file (defaults to ./sheet-kv.toml when present).
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Port to listen on.
    #[arg(long, env = "PORT")]
    port: Option<u16>,

    /// Address to bind.
    #[arg(long, env = "BIND")]
    bind: Option<String>,

    /// Spreadsheet document ID.
    #[arg(long, env = "SHEET_ID")]
    sheet_id: Option<String>,

    /// Service-account key file.
    #[arg(long, env = "GOOGLE_APPLICATION_CREDENTIALS")]
    credentials: Option<PathBuf>,

    /// Handling of concurrent increments: unguarded, serialized or optimistic.
    #[arg(long, env = "SHEET_CONCURRENCY")]
    concurrency: Option<ConcurrencyMode>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // A missing .env file is fine
    let _ = dotenvy::dotenv();

    let args = Args::parse();

    // Load configuration first (needed for logging setup)
    let mut config = Config::load(args.config.as_deref())?;
    config.apply_overrides(Overrides {
        port: args.port,
        bind: args.bind,
        spreadsheet_id: args.sheet_id,
        credentials: args.credentials,
        concurrency: args.concurrency,
    });

    init_logging(&config.logging)?;

    tracing::info!(
        backend = ?config.sheet.backend,
        sheet = %config.sheet.sheet_name,
        concurrency = %config.sheet.concurrency,
        "Opening sheet store"
    );
    let state = AppState::from_config(&config)?;

    let cors = build_cors_layer(&config.cors);
    if config.cors.enabled {
        tracing::info!(
            "CORS enabled with {} allowed origin(s)",
            config.cors.allow_origins.len()
        );
    } else {
        tracing::info!("CORS disabled (denying cross-origin requests)");
    }

    let app: Router = router(state).layer(cors).layer(TraceLayer::new_for_http());

    let addr: SocketAddr = config.bind_addr().parse()?;
    tracing::info!("Server running on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;

    // Run server with graceful shutdown
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server shutdown complete");

    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!("Failed to install Ctrl+C handler: {}", e);
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install signal handler: {}", e);
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received");
}
