//! Entry mutation handlers.
//!
//! Every operation that creates a name asks the drive to avoid collisions,
//! so nothing is ever silently overwritten.

use axum::{extract::State, Json};
use serde_json::{json, Value};
use std::sync::Arc;

use crate::drive::{path, CreateOptions, FileEntry};
use crate::web::dto::{IdRequest, MakeRequest, Payload, RenameRequest, TransferRequest};
use crate::web::error::ApiError;
use crate::web::handlers::AppState;

/// POST /copy - Duplicate an entry into another folder.
pub async fn copy_entry(
    State(state): State<Arc<AppState>>,
    Payload(req): Payload<TransferRequest>,
) -> Result<Json<FileEntry>, ApiError> {
    let source = path::normalize_id(&req.id)?;
    let target = path::normalize_id(&req.to)?;

    let id = state
        .drive
        .copy(&source, &target, "", CreateOptions::avoid_collisions())
        .await?;
    tracing::info!(from = %source, to = %id, "Copied entry");

    Ok(Json(state.drive.info(&id).await?))
}

/// POST /move - Relocate an entry into another folder.
pub async fn move_entry(
    State(state): State<Arc<AppState>>,
    Payload(req): Payload<TransferRequest>,
) -> Result<Json<FileEntry>, ApiError> {
    let source = path::normalize_id(&req.id)?;
    let target = path::normalize_id(&req.to)?;

    let id = state
        .drive
        .move_to(&source, &target, "", CreateOptions::avoid_collisions())
        .await?;
    tracing::info!(from = %source, to = %id, "Moved entry");

    Ok(Json(state.drive.info(&id).await?))
}

/// POST /rename - Move an entry to a new name in its own folder.
pub async fn rename_entry(
    State(state): State<Arc<AppState>>,
    Payload(req): Payload<RenameRequest>,
) -> Result<Json<FileEntry>, ApiError> {
    let source = path::normalize_id(&req.id)?;
    path::validate_name(&req.name)?;
    let parent = path::parent_of(&source).to_string();

    let id = state
        .drive
        .move_to(&source, &parent, &req.name, CreateOptions::avoid_collisions())
        .await?;
    tracing::info!(from = %source, to = %id, "Renamed entry");

    Ok(Json(state.drive.info(&id).await?))
}

/// POST /makedir - Create a folder.
pub async fn make_dir(
    State(state): State<Arc<AppState>>,
    Payload(req): Payload<MakeRequest>,
) -> Result<Json<FileEntry>, ApiError> {
    make_entry(&state, req, true).await
}

/// POST /makefile - Create an empty file.
pub async fn make_file(
    State(state): State<Arc<AppState>>,
    Payload(req): Payload<MakeRequest>,
) -> Result<Json<FileEntry>, ApiError> {
    make_entry(&state, req, false).await
}

async fn make_entry(
    state: &AppState,
    req: MakeRequest,
    is_folder: bool,
) -> Result<Json<FileEntry>, ApiError> {
    let parent = path::normalize_id(&req.id)?;
    path::validate_name(&req.name)?;

    let id = state
        .drive
        .make(&parent, &req.name, is_folder, CreateOptions::avoid_collisions())
        .await?;
    tracing::info!(id = %id, is_folder, "Created entry");

    Ok(Json(state.drive.info(&id).await?))
}

/// POST /delete - Remove an entry; folders are removed recursively.
pub async fn delete_entry(
    State(state): State<Arc<AppState>>,
    Payload(req): Payload<IdRequest>,
) -> Result<Json<Value>, ApiError> {
    let id = path::normalize_id(&req.id)?;
    state.drive.remove(&id).await?;
    tracing::info!(id = %id, "Deleted entry");
    Ok(Json(json!({})))
}
