//! Listing handlers: capacity, file listing with search/filter, folder tree.

use axum::{extract::State, Json};
use std::sync::Arc;

use crate::drive::{path, tree, tree::FolderNode};
use crate::filter::{self, Criteria, FilterSpec};
use crate::web::dto::{FilesQuery, FilesResponse, FolderQuery, InfoResponse, QueryParams};
use crate::web::error::ApiError;
use crate::web::handlers::AppState;

/// GET /info - Capacity figures and client feature flags.
pub async fn get_info(
    State(state): State<Arc<AppState>>,
    QueryParams(query): QueryParams<FolderQuery>,
) -> Result<Json<InfoResponse>, ApiError> {
    let id = path::normalize_id(query.id())?;
    let stats = state.drive.stats(&id).await?;
    Ok(Json(InfoResponse::from(stats)))
}

/// GET /files - List a folder, or search below it.
///
/// With `search` or `filter` the listing is recursive. The filter is parsed
/// before the drive is touched so a malformed one fails fast with a 400.
pub async fn list_files(
    State(state): State<Arc<AppState>>,
    QueryParams(query): QueryParams<FilesQuery>,
) -> Result<Json<FilesResponse>, ApiError> {
    let id = path::normalize_id(query.id())?;

    let filter = match query.filter.as_deref().filter(|f| !f.is_empty()) {
        Some(json) => Some(FilterSpec::from_json(json)?),
        None => None,
    };
    let criteria = Criteria::new(query.search, filter);

    let files = state
        .drive
        .list(&id, &filter::list_config(criteria))
        .await?;

    Ok(Json(FilesResponse::new(files, query.limit)))
}

/// GET /folders - Every visible folder, nested.
pub async fn list_folders(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<FolderNode>>, ApiError> {
    let folders = state
        .drive
        .list(path::ROOT, &filter::folder_tree_config())
        .await?;
    Ok(Json(tree::nest(folders, path::ROOT)))
}
