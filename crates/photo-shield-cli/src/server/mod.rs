//! HTTP API over a single-image session.

mod error;
mod routes;
mod state;

use anyhow::{Context, Result};
use axum::extract::DefaultBodyLimit;
use axum::Router;
use photo_shield_core::Scanner;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

pub use state::AppState;

/// Largest accepted upload.
const MAX_UPLOAD_BYTES: usize = 32 * 1024 * 1024;

/// Build the complete axum Router with all API routes.
pub fn build(state: AppState) -> Router {
    Router::new()
        .nest("/api", routes::routes())
        .layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Serve the API on `bind` until the process is stopped.
pub async fn start(scanner: Scanner, jpeg_quality: u8, bind: &str) -> Result<()> {
    let app = build(AppState::new(scanner, jpeg_quality));

    let listener = tokio::net::TcpListener::bind(bind)
        .await
        .with_context(|| format!("Failed to bind to {bind}"))?;

    tracing::info!("Server listening on {bind}");
    eprintln!("photo-shield listening on http://{bind}");

    axum::serve(listener, app).await.context("Server error")?;
    Ok(())
}
