//! PaperLens library - re-exports for testing and external use.
//!
//! A web front end for a remote paper summarization service: upload a PDF,
//! read its summary next to a highlighted text layer, and chat about it.

use axum::extract::DefaultBodyLimit;
use axum::routing::{delete, get, post};
use axum::Router;
use std::fs;
use std::sync::Arc;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

pub mod backend;
pub mod config;
pub mod error;
pub mod handlers;
pub mod highlight;
pub mod history;
pub mod models;
pub mod pdf_text;
pub mod render;
pub mod store;
pub mod templates;

use backend::SummarizerClient;
use config::Config;
use error::AppError;
use history::ChatHistory;
use store::PaperStore;

// ============================================================================
// Application State
// ============================================================================

#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    pub client: SummarizerClient,
    pub store: PaperStore,
    pub history: ChatHistory,
}

impl AppState {
    /// Opens the database under the configured data directory.
    pub fn open(config: Config) -> Result<Self, AppError> {
        fs::create_dir_all(&config.data_dir).map_err(store::StoreError::from)?;
        let db = sled::open(config.db_path()).map_err(store::StoreError::from)?;
        Self::with_db(config, db)
    }

    /// Builds the state around an existing database (tests use a temporary one).
    pub fn with_db(config: Config, db: sled::Db) -> Result<Self, AppError> {
        let client = SummarizerClient::new(config.backend_url.clone(), config.request_timeout)?;
        let store = PaperStore::new(db, config.pdfs_dir())?;
        let history = ChatHistory::new(store.db())?;
        Ok(Self {
            config,
            client,
            store,
            history,
        })
    }
}

// ============================================================================
// Router
// ============================================================================

pub fn build_router(state: Arc<AppState>) -> Router {
    let pdfs = ServeDir::new(state.config.pdfs_dir());
    let body_limit = state.config.max_upload_bytes;

    Router::new()
        // Pages
        .route("/", get(handlers::index))
        .route("/summarize", post(handlers::summarize))
        .route(
            "/multi-agent",
            get(handlers::multi_agent_page).post(handlers::multi_agent_summarize),
        )
        .route("/paper/{id}", get(handlers::view_paper))
        .route("/paper/{id}/resummarize", post(handlers::resummarize))
        // JSON API
        .route("/api/paper/{id}", delete(handlers::delete_paper))
        .route("/api/paper/{id}/pages", get(handlers::paper_pages))
        .route("/api/paper/{id}/ask", post(handlers::ask))
        .route("/api/history", get(handlers::history))
        .route("/api/history/{id}", delete(handlers::delete_history))
        // Stored PDFs for the in-browser viewer
        .nest_service("/pdfs", pdfs)
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

// Re-export commonly used types
pub use highlight::{
    find_match, ingest_highlights, mark_segment, render_marked, HighlightError, HighlightFragment,
    MarkedPiece, TextSegment,
};

pub use models::{
    ChatMessage, ChatRole, ChatSession, PaperRecord, QaStatus, SectionSummary, SummaryMode,
    SummaryType,
};

pub use render::{html_escape, render_markdown};
