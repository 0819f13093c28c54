//! Demo-mode media route handler.

use axum::extract::{Path, State};
use axum::http::header;
use axum::response::IntoResponse;

use crate::error::{AppError, Result};
use crate::state::AppState;

/// Serve an uploaded image from the in-memory demo media store.
///
/// Live mode stores absolute CDN URLs, so stored image URLs never point
/// here; requests for unknown keys get a plain 404.
pub async fn serve(
    State(state): State<AppState>,
    Path(key): Path<String>,
) -> Result<impl IntoResponse> {
    let blob = state
        .repository()
        .media_blob(&key)
        .await
        .ok_or_else(|| AppError::NotFound(format!("media object {key}")))?;

    Ok(([(header::CONTENT_TYPE, blob.content_type)], blob.bytes))
}
