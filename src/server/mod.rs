//! HTTP surface.
//!
//! | Method | Path | Handler |
//! |---|---|---|
//! | GET | `/` | landing page |
//! | GET | `/static/script.js` | landing page script |
//! | GET | `/help/` | liveness and usage |
//! | GET | `/files/` | list stored files |
//! | GET | `/download/<name>/` | stream a stored file |
//! | POST | `/downloads/` | classify input and run a download |
//!
//! Handlers share an [`AppState`] built from [`AppConfig`]; nothing is read
//! from process-wide state.

mod error;
mod handlers;

pub use error::{ApiError, INVALID_JSON_MESSAGE};
pub use handlers::parse_download_request;

use std::sync::Arc;

use axum::Router;
use axum::routing::{get, post};
use tower_http::trace::TraceLayer;

use crate::catalog::FileCatalog;
use crate::config::AppConfig;
use crate::download::{MediaEngine, Orchestrator};

/// State shared by all handlers.
#[derive(Debug, Clone)]
pub struct AppState {
    /// Runs downloads into the shared directory
    pub orchestrator: Arc<Orchestrator>,
    /// Reads the same directory
    pub catalog: Arc<FileCatalog>,
}

impl AppState {
    /// Wires the orchestrator and catalog to the configured directory.
    #[must_use]
    pub fn new(config: &AppConfig, engine: Arc<dyn MediaEngine>) -> Self {
        let orchestrator = Orchestrator::new(engine, &config.download_dir)
            .with_cookie_file(Some(config.cookies_file.clone()));
        Self {
            orchestrator: Arc::new(orchestrator),
            catalog: Arc::new(FileCatalog::new(&config.download_dir)),
        }
    }
}

/// Builds the application router.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(handlers::index))
        .route("/static/script.js", get(handlers::script))
        .route("/help/", get(handlers::help))
        .route("/files/", get(handlers::list_files))
        .route("/download/{*filename}", get(handlers::download_file))
        .route("/downloads/", post(handlers::start_download))
        .with_state(state)
        .layer(TraceLayer::new_for_http())
}
