//! Quill - a small multi-user blog

use anyhow::Result;
use clap::{Parser, Subcommand};
use metrics_exporter_prometheus::PrometheusBuilder;
use std::net::SocketAddr;
use std::path::Path;
use tower_http::trace::TraceLayer;
use tracing::{error, info};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

mod config;

use config::{Config, LogFormat, LoggingConfig};
use quill_api::{create_router, AppState};
use quill_auth::SessionConfig;
use quill_db::Database;

/// Quill - a small multi-user blog
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Configuration file path
    #[arg(short, long, default_value = "config/default.toml")]
    config: String,

    /// Bind address
    #[arg(long, env = "QUILL_BIND")]
    bind: Option<String>,

    /// Port
    #[arg(short, long, env = "QUILL_PORT")]
    port: Option<u16>,

    /// SQLite database file
    #[arg(long, env = "QUILL_DATABASE")]
    database: Option<String>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug, Clone, Copy, PartialEq, Eq)]
enum Command {
    /// Run the HTTP server (default)
    Serve,
    /// Drop all data and create a fresh schema
    InitDb,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let mut config = Config::load(&args.config)?;
    if let Some(database) = &args.database {
        config.database.path = database.clone();
    }

    init_logging(&config.logging);

    if let Some(parent) = Path::new(&config.database.path).parent() {
        tokio::fs::create_dir_all(parent).await?;
    }
    let db = Database::new(&config.database.url()).await?;

    match args.command.unwrap_or(Command::Serve) {
        Command::InitDb => {
            db.reset_schema().await?;
            println!("Initialized the database.");
            Ok(())
        }
        Command::Serve => serve(args, config, db).await,
    }
}

async fn serve(args: Args, config: Config, db: Database) -> Result<()> {
    info!("Starting Quill v{}", env!("CARGO_PKG_VERSION"));

    let metrics_handle = if config.metrics.enabled {
        Some(PrometheusBuilder::new().install_recorder()?)
    } else {
        None
    };

    let state = AppState::new(db, SessionConfig::from(&config.session));

    let app = create_router(state, metrics_handle).layer(TraceLayer::new_for_http());

    let bind_addr = args.bind.unwrap_or(config.server.bind_address);
    let port = args.port.unwrap_or(config.server.port);
    let addr: SocketAddr = format!("{}:{}", bind_addr, port).parse()?;

    info!("Listening on {}", addr);
    info!("Database: {}", config.database.path);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server stopped");
    Ok(())
}

/// Initialize logging
fn init_logging(logging: &LoggingConfig) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&logging.level));

    match logging.format {
        LogFormat::Pretty => tracing_subscriber::registry()
            .with(fmt::layer())
            .with(filter)
            .init(),
        LogFormat::Json => tracing_subscriber::registry()
            .with(fmt::layer().json())
            .with(filter)
            .init(),
    }
}

/// Wait for shutdown signal
async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}
