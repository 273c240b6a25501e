//! PaperLens - read a paper next to its summary.
//!
//! This is the main entry point for the web server. The application is
//! organized into the following modules:
//!
//! - `config`: Environment configuration
//! - `backend`: HTTP client for the summarization service
//! - `highlight`: Matching summary highlights against the paper text
//! - `pdf_text`: Page text extraction and caching
//! - `store` / `history`: Paper records and chat transcripts in sled
//! - `templates`: HTML/CSS/JS templates and rendering
//! - `handlers`: HTTP route handlers

use std::process::ExitCode;
use std::sync::Arc;

use paperlens::config::{Config, DEFAULT_LOG_FILTER};
use paperlens::{build_router, AppState};
use tracing_subscriber::EnvFilter;

// ============================================================================
// Main
// ============================================================================

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER)),
        )
        .with_target(false)
        .init();

    let config = match Config::from_env() {
        Ok(config) => config,
        Err(e) => {
            tracing::error!(error = %e, "invalid configuration");
            return ExitCode::FAILURE;
        }
    };

    let bind = config.bind;
    let backend = config.backend_url.clone();
    let data_dir = config.data_dir.clone();

    let state = match AppState::open(config) {
        Ok(state) => Arc::new(state),
        Err(e) => {
            tracing::error!(error = %e, data_dir = %data_dir.display(), "failed to open data directory");
            return ExitCode::FAILURE;
        }
    };

    let app = build_router(state);

    let listener = match tokio::net::TcpListener::bind(bind).await {
        Ok(listener) => listener,
        Err(e) => {
            tracing::error!(error = %e, %bind, "failed to bind");
            return ExitCode::FAILURE;
        }
    };

    tracing::info!(
        %bind,
        backend = %backend,
        data_dir = %data_dir.display(),
        "PaperLens running at http://{}",
        bind
    );

    if let Err(e) = axum::serve(listener, app).await {
        tracing::error!(error = %e, "server error");
        return ExitCode::FAILURE;
    }
    ExitCode::SUCCESS
}
