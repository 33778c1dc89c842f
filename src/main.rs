//! Server entry point for bili-downloader.

use std::sync::Arc;

use anyhow::{Context, Result};
use bili_downloader::config::{self, AppConfig, VerbositySetting};
use bili_downloader::{AppState, YtDlpEngine, router};
use clap::Parser;
use tokio::net::TcpListener;
use tracing::{debug, info, warn};

mod cli;

use cli::Args;

#[tokio::main]
async fn main() -> Result<()> {
    // Parse CLI arguments first (before tracing, so --help works without logs)
    let args = Args::parse();

    // An explicit --config must exist; the default location is optional
    let (config_path, file_config) = match args.config.clone() {
        Some(path) => {
            let loaded = config::load_required_file_config(&path)
                .with_context(|| format!("Failed to load config file '{}'", path.display()))?;
            (Some(path), Some(loaded))
        }
        None => {
            let path = config::resolve_default_config_path();
            let loaded = match path.as_deref() {
                Some(path) => config::load_file_config(path).with_context(|| {
                    format!("Failed to load config file '{}'", path.display())
                })?,
                None => None,
            };
            (path, loaded)
        }
    };

    // Priority: RUST_LOG env var > quiet flag > verbose flag > config file > default (info)
    let default_level = if args.quiet {
        "error"
    } else {
        match args.verbose {
            0 => file_config
                .as_ref()
                .and_then(|c| c.verbosity)
                .unwrap_or(VerbositySetting::Default)
                .as_filter(),
            1 => "debug",
            _ => "trace",
        }
    };

    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level));

    tracing_subscriber::fmt().with_env_filter(filter).init();

    debug!(?args, "CLI arguments parsed");
    if file_config.is_some() {
        info!(path = ?config_path, "Loaded config file");
    }

    let app_config = AppConfig::resolve(file_config.as_ref(), &args.overrides())
        .context("Invalid configuration")?;
    debug!(?app_config, "Configuration resolved");

    tokio::fs::create_dir_all(&app_config.download_dir)
        .await
        .with_context(|| {
            format!(
                "Failed to create download directory '{}'",
                app_config.download_dir.display()
            )
        })?;

    if app_config.cookies_file.is_file() {
        info!(path = %app_config.cookies_file.display(), "Using cookie file");
    } else {
        warn!(
            path = %app_config.cookies_file.display(),
            "Cookie file not found, downloads will be anonymous"
        );
    }

    let engine = Arc::new(YtDlpEngine::new(&app_config.engine_binary));
    let engine_binary = engine.binary().to_path_buf();
    let state = AppState::new(&app_config, engine);
    let app = router(state);

    let listener = TcpListener::bind(app_config.bind)
        .await
        .with_context(|| format!("Failed to bind {}", app_config.bind))?;

    info!(
        addr = %app_config.bind,
        download_dir = %app_config.download_dir.display(),
        engine = %engine_binary.display(),
        "Server listening"
    );

    axum::serve(listener, app)
        .await
        .context("HTTP server error")?;

    Ok(())
}
