use axum::body::Bytes;
use axum::extract::{Multipart, State};
use axum::http::header;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use photo_shield_adapters::{encode_jpeg, load_upload};
use photo_shield_core::{ProtectRequest, ScanReport};
use tracing::debug;

use super::error::ApiError;
use super::state::AppState;

/// Build the `/api` routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/scan", post(scan_handler))
        .route("/protect", post(protect_handler))
        .route("/preview", get(preview_handler))
        .route("/health", get(health_handler))
}

fn jpeg_response(bytes: Vec<u8>) -> Response {
    ([(header::CONTENT_TYPE, "image/jpeg")], bytes).into_response()
}

/// POST /api/scan - Upload an image, make it current, and score it.
async fn scan_handler(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<ScanReport>, ApiError> {
    let mut upload: Option<Bytes> = None;
    while let Some(field) = multipart.next_field().await? {
        if field.name() == Some("file") {
            upload = Some(field.bytes().await?);
        }
    }
    let bytes = upload.ok_or_else(|| ApiError::bad_request("missing 'file' field"))?;
    debug!("Received {} byte upload", bytes.len());

    let report = tokio::task::spawn_blocking(move || -> Result<ScanReport, ApiError> {
        let (image, backing) =
            load_upload(&bytes).map_err(|e| ApiError::bad_request(format!("{e:#}")))?;
        Ok(state.session().upload(&state.scanner, image, Some(backing))?)
    })
    .await??;

    Ok(Json(report))
}

/// POST /api/protect - Redact or cloak the current image, returned as JPEG.
async fn protect_handler(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Response, ApiError> {
    let (mut action, mut indices, mut token) = (None, String::new(), None);
    while let Some(field) = multipart.next_field().await? {
        let name = field.name().map(str::to_string);
        let text = field.text().await?;
        match name.as_deref() {
            Some("action") => action = Some(text),
            Some("indices") => indices = text,
            Some("token") => token = Some(text),
            _ => {}
        }
    }
    let action = action.ok_or_else(|| ApiError::bad_request("missing 'action' field"))?;
    let request = ProtectRequest::parse(&action, &indices, token.as_deref())?;

    let bytes = tokio::task::spawn_blocking(move || -> Result<Vec<u8>, ApiError> {
        let pixels = state.session().protect(&state.scanner, &request)?;
        Ok(encode_jpeg(&pixels, state.jpeg_quality)?)
    })
    .await??;

    Ok(jpeg_response(bytes))
}

/// GET /api/preview - The current image with numbered detection boxes.
async fn preview_handler(State(state): State<AppState>) -> Result<Response, ApiError> {
    let bytes = tokio::task::spawn_blocking(move || -> Result<Vec<u8>, ApiError> {
        let pixels = state.session().preview(&state.scanner)?;
        Ok(encode_jpeg(&pixels, state.jpeg_quality)?)
    })
    .await??;

    Ok(jpeg_response(bytes))
}

/// GET /api/health
async fn health_handler() -> impl IntoResponse {
    Json(serde_json::json!({ "status": "ok" }))
}
