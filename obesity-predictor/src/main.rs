//! obesity-predictor - Obesity risk assessment service
//!
//! Serves the assessment form, encodes submissions for the trained pipeline
//! and reports the predicted obesity category with advisory text.

use std::fs::OpenOptions;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use anyhow::{Context, Result};
use clap::Parser;
use tokio::signal;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use obesity_common::config::{
    load_config, CliOverrides, ConfigSource, LoggingConfig, ServiceConfig, ENV_CONFIG_FILE,
};
use obesity_common::Framing;
use obesity_predictor::api::buildinfo::BuildInfo;
use obesity_predictor::model::{ModelHandle, ModelStatus};
use obesity_predictor::{build_router, AppState};

/// Command-line arguments for obesity-predictor
///
/// Unset options fall back to OBESITY_* environment variables, then the
/// TOML config file, then compiled defaults.
#[derive(Parser, Debug)]
#[command(name = "obesity-predictor")]
#[command(about = "Obesity risk assessment form and prediction service")]
#[command(version)]
struct Args {
    /// TOML config file
    #[arg(short, long, env = ENV_CONFIG_FILE)]
    config: Option<PathBuf>,

    /// Path to the trained pipeline artifact
    #[arg(short, long)]
    model_path: Option<PathBuf>,

    /// Address to bind
    #[arg(long)]
    host: Option<String>,

    /// Port to listen on
    #[arg(short, long)]
    port: Option<u16>,

    /// Copy register: consumer or clinical
    #[arg(short, long, value_parser = parse_framing)]
    framing: Option<Framing>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long)]
    log_level: Option<String>,
}

fn parse_framing(s: &str) -> std::result::Result<Framing, String> {
    s.parse::<Framing>().map_err(|e| e.to_string())
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Config is resolved before tracing so the configured level applies
    let (toml, config_source) = load_config(args.config.as_deref());
    let cli = CliOverrides {
        model_path: args.model_path,
        host: args.host,
        port: args.port,
        framing: args.framing,
        log_level: args.log_level,
    };
    let config = ServiceConfig::resolve(&cli, &toml).context("Invalid configuration")?;

    init_tracing(&config.logging)?;

    // Build identification immediately after tracing init
    let build = BuildInfo::current();
    info!(
        "Starting {} v{} [{}] built {} ({})",
        build.package, build.version, build.git_hash, build.build_timestamp, build.build_profile
    );

    match &config_source {
        ConfigSource::Defaults => info!("No config file found, using defaults"),
        ConfigSource::File(path) => info!("Loaded config file: {}", path.display()),
        ConfigSource::Ignored { path, reason } => {
            warn!("Ignoring config file {}: {}", path.display(), reason)
        }
    }
    info!("Framing: {}", config.framing);
    info!("Model artifact: {}", config.model_path.display());

    // Load once at startup; the handle memoizes the outcome
    let model = Arc::new(ModelHandle::from_path(&config.model_path));
    match model.load() {
        ModelStatus::Available { model } => {
            info!("✓ Model ready ({}, {} trees)", model.kind, model.trees)
        }
        ModelStatus::Unavailable { reason } => {
            error!("Model unavailable, the form will report predictions as unavailable: {}", reason)
        }
    }

    let state = AppState::new(model, config.framing);
    let app = build_router(state);

    let addr = config.bind_address();
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind to {}", addr))?;
    info!("obesity-predictor listening on http://{}", addr);
    info!("Health check: http://{}/health", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("Server shutdown complete");
    Ok(())
}

/// Install the tracing subscriber
///
/// `RUST_LOG` takes precedence over the configured level.
fn init_tracing(logging: &LoggingConfig) -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&logging.level))
        .with_context(|| format!("Invalid log level '{}'", logging.level))?;

    match &logging.file {
        Some(path) => {
            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .with_context(|| format!("Failed to open log file {}", path.display()))?;
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_ansi(false)
                .with_writer(Mutex::new(file))
                .init();
        }
        None => {
            tracing_subscriber::fmt().with_env_filter(filter).init();
        }
    }

    Ok(())
}

/// Graceful shutdown signal handler
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, shutting down");
        },
        _ = terminate => {
            info!("Received terminate signal, shutting down");
        },
    }
}
