//! OSINTScan - subdomain and email discovery API
//!
//! An HTTP service that runs theHarvester and amass against a domain in
//! parallel, extracts subdomains and email addresses from their output,
//! stores every scan as JSON and exports scans as spreadsheets.
//!
//! Exit codes:
//!   0 - Clean shutdown
//!   1 - Startup or runtime error (bad arguments, config, bind failure, etc.)

mod analysis;
mod api;
mod cli;
mod config;
mod error;
mod models;
mod report;
mod scanner;
mod storage;

use anyhow::{Context, Result};
use cli::Args;
use config::{Config, LogFormat, LoggingConfig, DEFAULT_CONFIG_FILE};
use scanner::ScanOrchestrator;
use std::sync::Arc;
use storage::ScanStore;
use tokio::net::TcpListener;
use tracing::{debug, error, info};
use tracing_subscriber::{filter::LevelFilter, EnvFilter, FmtSubscriber};

#[tokio::main]
async fn main() -> Result<()> {
    // Parse command-line arguments
    let args = Args::parse_args();

    // Validate arguments
    if let Err(e) = args.validate() {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }

    // Handle --init-config early (no logging needed)
    if args.init_config {
        return handle_init_config();
    }

    // Config decides the log format, so it is loaded before logging starts
    let mut config = load_config(&args)?;
    config.merge_with_args(&args);

    if let Err(e) = config.validate() {
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }

    init_logging(&args, &config.logging);

    info!("OSINTScan v{}", env!("CARGO_PKG_VERSION"));
    debug!("Arguments: {:?}", args);
    debug!("Configuration: {:?}", config);

    match run_server(config).await {
        Ok(()) => Ok(()),
        Err(e) => {
            error!("Server failed: {:#}", e);
            eprintln!("\n❌ Error: {:#}", e);
            std::process::exit(1);
        }
    }
}

/// Handle --init-config: generate a default .osintscan.toml.
fn handle_init_config() -> Result<()> {
    let path = std::path::Path::new(DEFAULT_CONFIG_FILE);

    if path.exists() {
        eprintln!("⚠️  {} already exists. Remove it first or edit it manually.", DEFAULT_CONFIG_FILE);
        std::process::exit(1);
    }

    let content = Config::default_toml();
    std::fs::write(path, &content)
        .with_context(|| format!("Failed to write {}", DEFAULT_CONFIG_FILE))?;

    println!("✅ Created {} with default settings.", DEFAULT_CONFIG_FILE);
    println!("   Edit it to change the bind address, tool paths, timeout and storage.");
    Ok(())
}

/// Log filter: `RUST_LOG` when set and valid, else the CLI/config level.
fn log_filter(level: tracing::Level, rust_log: Option<&str>) -> EnvFilter {
    rust_log
        .and_then(|directives| EnvFilter::try_new(directives).ok())
        .unwrap_or_else(|| EnvFilter::default().add_directive(LevelFilter::from_level(level).into()))
}

/// Initialize logging based on verbosity and format settings.
fn init_logging(args: &Args, logging: &LoggingConfig) {
    let level = args.log_level(logging.verbose);
    let rust_log = std::env::var("RUST_LOG").ok();
    let filter = log_filter(level, rust_log.as_deref());

    match logging.format {
        LogFormat::Json => {
            let subscriber = FmtSubscriber::builder()
                .with_env_filter(filter)
                .with_target(false)
                .json()
                .flatten_event(true)
                .with_current_span(true)
                .with_span_list(false)
                .finish();

            tracing::subscriber::set_global_default(subscriber)
                .expect("Failed to set tracing subscriber");
        }
        LogFormat::Compact => {
            let subscriber = FmtSubscriber::builder()
                .with_env_filter(filter)
                .with_target(false)
                .with_thread_ids(false)
                .with_file(false)
                .with_line_number(false)
                .compact()
                .finish();

            tracing::subscriber::set_global_default(subscriber)
                .expect("Failed to set tracing subscriber");
        }
    }
}

/// Load configuration from file or use defaults.
///
/// Runs before logging is set up, so problems go to stderr.
fn load_config(args: &Args) -> Result<Config> {
    // Try explicit config path
    if let Some(ref config_path) = args.config {
        return Config::load(config_path);
    }

    // Try default location
    match Config::load_default() {
        Ok(Some(config)) => Ok(config),
        Ok(None) => Ok(Config::default()),
        Err(e) => {
            eprintln!("⚠️  Failed to load {}: {:#}. Using defaults.", DEFAULT_CONFIG_FILE, e);
            Ok(Config::default())
        }
    }
}

/// Open storage, build the orchestrator and serve the API until shutdown.
async fn run_server(config: Config) -> Result<()> {
    let store = ScanStore::open(&config.storage.data_dir)
        .await
        .with_context(|| {
            format!(
                "Failed to open scan storage at {}",
                config.storage.data_dir.display()
            )
        })?;

    let orchestrator = ScanOrchestrator::from_config(&config);
    for tool in orchestrator.tools() {
        info!("Tool {}: {} {}", tool.name, tool.executable, tool.args.join(" "));
    }
    info!(
        "Tool timeout {}s, at most {} concurrent scans",
        config.scanner.timeout_seconds, config.scanner.max_concurrent_scans
    );

    let state = Arc::new(api::AppState::new(orchestrator.clone(), store));
    let app = api::create_router(state);

    let listener = TcpListener::bind(&config.server.bind)
        .await
        .with_context(|| format!("Failed to bind {}", config.server.bind))?;
    info!("Listening on http://{}", listener.local_addr()?);

    axum::serve(listener, app.into_make_service())
        .with_graceful_shutdown(shutdown_signal(orchestrator))
        .await
        .context("HTTP server error")?;

    info!("Server stopped");
    Ok(())
}

/// Resolve on Ctrl-C or SIGTERM and stop admitting new scans.
async fn shutdown_signal(orchestrator: ScanOrchestrator) {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!("Failed to listen for Ctrl-C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                error!("Failed to listen for SIGTERM: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("Shutdown requested, no longer accepting scans");
    orchestrator.close();
}
