//! Test helpers for HTTP API tests.
//!
//! Provides a TestServer over a LocalDrive rooted in a temporary directory,
//! plus helpers for seeding files and icons.

#![allow(dead_code)]

use std::path::Path;
use std::sync::Arc;

use axum_test::TestServer;
use bytes::Bytes;
use tempfile::TempDir;

use filebay::drive::{ByteStream, CreateOptions, Drive, LocalDrive};
use filebay::web::handlers::AppState;
use filebay::web::router::create_router;

/// A running test API with its backing directories.
pub struct TestApp {
    /// HTTP test server.
    pub server: TestServer,
    /// Drive the server writes through.
    pub drive: Arc<LocalDrive>,
    /// Storage root.
    pub root: TempDir,
    /// Assets directory holding `icons/`.
    pub assets: TempDir,
}

/// Create a test app with the default upload limit.
pub fn create_test_app() -> TestApp {
    create_test_app_with_limit(10 * 1024 * 1024)
}

/// Create a test app with a per-file upload limit in bytes.
pub fn create_test_app_with_limit(max_upload_size: u64) -> TestApp {
    let root = TempDir::new().expect("Failed to create storage root");
    let assets = TempDir::new().expect("Failed to create assets dir");
    let drive = Arc::new(LocalDrive::new(root.path()).expect("Failed to open drive"));

    let app_state = AppState::new(drive.clone())
        .with_assets_path(assets.path())
        .with_max_upload_size(max_upload_size);

    let router = create_router(Arc::new(app_state), &[]);
    let server = TestServer::new(router).expect("Failed to create test server");

    TestApp {
        server,
        drive,
        root,
        assets,
    }
}

/// Create a file with `content` inside folder `parent`, returning its id.
pub async fn write_file(drive: &LocalDrive, parent: &str, name: &str, content: &[u8]) -> String {
    let id = drive
        .make(parent, name, false, CreateOptions::default())
        .await
        .expect("Failed to create file");
    let content = Bytes::copy_from_slice(content);
    let data: ByteStream = Box::pin(futures::stream::once(async move { Ok(content) }));
    drive.write(&id, data).await.expect("Failed to write file")
}

/// Create a folder inside `parent`, returning its id.
pub async fn make_folder(drive: &LocalDrive, parent: &str, name: &str) -> String {
    drive
        .make(parent, name, true, CreateOptions::default())
        .await
        .expect("Failed to create folder")
}

/// Write an icon file below the assets directory.
pub fn write_icon(assets: &Path, relative: &str, content: &str) {
    let path = assets.join(relative);
    std::fs::create_dir_all(path.parent().expect("icon path has a parent"))
        .expect("Failed to create icon dir");
    std::fs::write(path, content).expect("Failed to write icon");
}
