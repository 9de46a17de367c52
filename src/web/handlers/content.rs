//! Content handlers: raw text read/write and direct downloads.

use axum::{
    body::Body,
    extract::State,
    http::header,
    response::Response,
    Json,
};
use bytes::Bytes;
use std::sync::Arc;

use crate::drive::{path, ByteStream, FileEntry};
use crate::web::dto::{DirectQuery, EntryQuery, Payload, QueryParams, TextRequest};
use crate::web::error::ApiError;
use crate::web::handlers::AppState;

/// Build a Content-Disposition value for `filename`.
///
/// The name is percent-encoded, which also strips quotes, CR and LF, so the
/// value cannot break out of the header.
fn content_disposition_header(filename: &str, attachment: bool) -> String {
    let disposition = if attachment { "attachment" } else { "inline" };
    format!("{}; filename={}", disposition, urlencoding::encode(filename))
}

fn content_type_for(filename: &str) -> String {
    mime_guess::from_path(filename)
        .first_or_octet_stream()
        .to_string()
}

/// POST /text - Replace a file's content with the given text.
pub async fn write_text(
    State(state): State<Arc<AppState>>,
    Payload(req): Payload<TextRequest>,
) -> Result<Json<FileEntry>, ApiError> {
    let id = path::normalize_id(&req.id)?;

    let content = Bytes::from(req.content);
    let size = content.len();
    let data: ByteStream = Box::pin(futures::stream::once(async move { Ok(content) }));
    let id = state.drive.write(&id, data).await?;
    tracing::info!(id = %id, size, "Saved text content");

    Ok(Json(state.drive.info(&id).await?))
}

/// GET /text - Stream a file's raw content.
pub async fn read_text(
    State(state): State<Arc<AppState>>,
    QueryParams(query): QueryParams<EntryQuery>,
) -> Result<Response<Body>, ApiError> {
    let id = path::normalize_id(&query.id)?;
    let data = state.drive.read(&id).await?;

    Response::builder()
        .header(header::CONTENT_TYPE, content_type_for(path::file_name(&id)))
        .body(Body::from_stream(data))
        .map_err(|e| {
            tracing::error!("Failed to build response: {}", e);
            ApiError::internal("Failed to build response")
        })
}

/// GET /direct - Stream a file for display or download.
pub async fn direct_download(
    State(state): State<Arc<AppState>>,
    QueryParams(query): QueryParams<DirectQuery>,
) -> Result<Response<Body>, ApiError> {
    let id = path::normalize_id(&query.id)?;
    let entry = state.drive.info(&id).await?;
    if entry.is_folder {
        return Err(ApiError::bad_request(format!("{} is a folder", entry.id)));
    }
    let data = state.drive.read(&id).await?;

    Response::builder()
        .header(header::CONTENT_TYPE, content_type_for(&entry.value))
        .header(
            header::CONTENT_DISPOSITION,
            content_disposition_header(&entry.value, query.as_attachment()),
        )
        .header(header::CONTENT_LENGTH, entry.size)
        .body(Body::from_stream(data))
        .map_err(|e| {
            tracing::error!("Failed to build response: {}", e);
            ApiError::internal("Failed to build response")
        })
}
