//! Icon handlers.

use axum::{
    body::Body,
    extract::{Path, State},
    http::header,
    response::Response,
};
use std::sync::Arc;

use crate::icons::{resolve_icon, IconQuery};
use crate::web::error::ApiError;
use crate::web::handlers::AppState;
use crate::FileBayError;

/// GET /icons/:size/:type/:name - Icon from the default skin.
pub async fn get_icon(
    State(state): State<Arc<AppState>>,
    Path((size, kind, name)): Path<(String, String, String)>,
) -> Result<Response<Body>, ApiError> {
    serve_icon(&state, IconQuery::new(&size, &kind, &name, "")).await
}

/// GET /icons/:skin/:size/:type/:name - Icon from a named skin.
pub async fn get_skin_icon(
    State(state): State<Arc<AppState>>,
    Path((skin, size, kind, name)): Path<(String, String, String, String)>,
) -> Result<Response<Body>, ApiError> {
    serve_icon(&state, IconQuery::new(&size, &kind, &name, &skin)).await
}

async fn serve_icon(state: &AppState, query: IconQuery) -> Result<Response<Body>, ApiError> {
    let icon = resolve_icon(&state.assets_path, &query).await;
    let content = tokio::fs::read(state.assets_path.join(&icon))
        .await
        .map_err(|e| FileBayError::from_io(e, &icon))?;

    let content_type = mime_guess::from_path(&icon)
        .first_or_octet_stream()
        .to_string();

    Response::builder()
        .header(header::CONTENT_TYPE, content_type)
        .header(header::CONTENT_LENGTH, content.len())
        .body(Body::from(content))
        .map_err(|e| {
            tracing::error!("Failed to build response: {}", e);
            ApiError::internal("Failed to build response")
        })
}
