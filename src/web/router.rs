//! Router configuration for the filebay API.

use axum::{
    extract::DefaultBodyLimit,
    middleware,
    routing::{get, post},
    Router,
};
use std::path::Path;
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

use super::handlers::{
    copy_entry, delete_entry, direct_download, get_icon, get_info, get_skin_icon, list_files,
    list_folders, make_dir, make_file, move_entry, read_text, rename_entry, upload_files,
    write_text, AppState,
};
use super::middleware::{create_cors_layer, nosniff_layer, sandbox_user_content};

/// Create the main API router.
pub fn create_router(app_state: Arc<AppState>, cors_origins: &[String]) -> Router {
    // Read-only routes
    let read_routes = Router::new()
        .route("/info", get(get_info))
        .route("/files", get(list_files))
        .route("/folders", get(list_folders))
        .route("/icons/:size/:type/:name", get(get_icon))
        .route("/icons/:skin/:size/:type/:name", get(get_skin_icon))
        .route(
            "/direct",
            get(direct_download).layer(middleware::from_fn(sandbox_user_content)),
        );

    // Mutating routes
    let write_routes = Router::new()
        .route("/copy", post(copy_entry))
        .route("/move", post(move_entry))
        .route("/rename", post(rename_entry))
        .route("/makedir", post(make_dir))
        .route("/makefile", post(make_file))
        .route("/delete", post(delete_entry))
        .route(
            "/text",
            get(read_text)
                .layer(middleware::from_fn(sandbox_user_content))
                .post(write_text),
        )
        // per-file limits are enforced while staging
        .route(
            "/upload",
            post(upload_files).layer(DefaultBodyLimit::disable()),
        );

    Router::new()
        .merge(read_routes)
        .merge(write_routes)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(create_cors_layer(cors_origins))
                .layer(nosniff_layer()),
        )
        .with_state(app_state)
}

/// Create a health check router.
pub fn create_health_router() -> Router {
    Router::new().route("/health", get(health_check))
}

/// Health check handler.
async fn health_check() -> &'static str {
    "OK"
}

/// Create a router serving static assets from `path`.
///
/// Returns `None` if the directory does not exist.
pub fn create_static_router(path: &str) -> Option<Router> {
    if !Path::new(path).is_dir() {
        tracing::warn!("Static asset directory not found: {}", path);
        return None;
    }
    Some(Router::new().fallback_service(ServeDir::new(path)))
}
