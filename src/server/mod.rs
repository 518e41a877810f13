//! HTTP surface over the journal service

pub mod error;
pub mod handlers;

use crate::application::JournalService;
use crate::error::Result;
use crate::infrastructure::config::ServerConfig;
use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::info;

pub use error::{ApiError, ApiResult};

/// Shared handler state
pub type AppState = Arc<JournalService>;

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(handlers::health))
        // Users
        .route("/users", post(handlers::create_user))
        .route(
            "/users/{id}",
            get(handlers::get_user)
                .put(handlers::update_user)
                .delete(handlers::delete_user),
        )
        // Entries per user
        .route(
            "/users/{id}/entries",
            get(handlers::list_entries).post(handlers::create_entry),
        )
        .route("/users/{id}/entries/today", get(handlers::today_entry))
        .route("/users/{id}/entries/on/{time_ref}", get(handlers::entry_on))
        // Entries by id
        .route(
            "/entries/{id}",
            get(handlers::get_entry)
                .put(handlers::update_entry)
                .delete(handlers::delete_entry),
        )
        .route("/entries/{id}/analyze", post(handlers::analyze_entry))
        .route("/analyze", post(handlers::analyze_content))
        .with_state(state)
}

/// Bind and serve until the process is stopped
pub async fn serve(state: AppState, config: &ServerConfig) -> Result<()> {
    let addr = format!("{}:{}", config.host, config.port);
    let listener = TcpListener::bind(&addr).await?;
    info!(%addr, "listening");

    axum::serve(listener, router(state)).await?;
    Ok(())
}
