//! Upload handler.
//!
//! Request body: multipart/form-data with one or more file parts. A text
//! field named `upload_fullpath` (or `path`) next to a file part carries its
//! relative path for folder uploads.

use axum::{
    extract::{Multipart, State},
    response::{IntoResponse, Response},
    Json,
};
use std::sync::Arc;

use crate::upload::UploadJob;
use crate::web::dto::{FolderQuery, QueryParams, UploadResult};
use crate::web::error::ApiError;
use crate::web::handlers::AppState;

/// POST /upload - Upload files into folder `id`.
///
/// A single file answers with its entry, or with the error status for that
/// file. Several files answer 200 with one result per file in arrival order.
pub async fn upload_files(
    State(state): State<Arc<AppState>>,
    QueryParams(query): QueryParams<FolderQuery>,
    mut multipart: Multipart,
) -> Result<Response, ApiError> {
    let mut job = UploadJob::new(query.id(), state.max_upload_size)?;

    while let Some(field) = multipart.next_field().await.map_err(|e| {
        tracing::error!("Failed to read multipart field: {}", e);
        ApiError::bad_request("Invalid multipart data")
    })? {
        let file_name = field
            .file_name()
            .filter(|name| !name.is_empty())
            .map(str::to_string);

        if let Some(file_name) = file_name {
            job.stage_file(&file_name, field).await?;
            continue;
        }

        let is_path_field = matches!(field.name(), Some("upload_fullpath" | "path"));
        if is_path_field {
            let relative_path = field.text().await.map_err(|e| {
                tracing::error!("Failed to read path field: {}", e);
                ApiError::bad_request("Invalid path field")
            })?;
            job.attach_path(&relative_path);
        } else {
            job.skip_part();
        }
    }

    if job.files().is_empty() {
        return Err(ApiError::bad_request("No file provided"));
    }

    let mut outcomes = job.commit(state.drive.as_ref()).await;

    if outcomes.len() == 1 {
        let outcome = outcomes.remove(0);
        return match outcome.result {
            Ok(entry) => Ok(Json(entry).into_response()),
            Err(e) => Err(e.into()),
        };
    }

    let results: Vec<UploadResult> = outcomes.into_iter().map(UploadResult::from).collect();
    Ok(Json(results).into_response())
}
