//! API handlers for the filebay HTTP surface.

pub mod content;
pub mod entries;
pub mod files;
pub mod icons;
pub mod upload;

pub use content::*;
pub use entries::*;
pub use files::*;
pub use icons::*;
pub use upload::*;

use std::path::PathBuf;
use std::sync::Arc;

use crate::config::Config;
use crate::drive::Drive;

/// Default per-file upload limit (10 MiB).
pub const DEFAULT_MAX_UPLOAD_SIZE: u64 = 10 * 1024 * 1024;

/// Application state shared across handlers.
pub struct AppState {
    /// Storage backend.
    pub drive: Arc<dyn Drive>,
    /// Directory containing `icons/`.
    pub assets_path: PathBuf,
    /// Per-file upload limit in bytes.
    pub max_upload_size: u64,
}

impl AppState {
    /// Create a new AppState with default assets path and upload limit.
    pub fn new(drive: Arc<dyn Drive>) -> Self {
        Self {
            drive,
            assets_path: PathBuf::from("."),
            max_upload_size: DEFAULT_MAX_UPLOAD_SIZE,
        }
    }

    /// Create an AppState configured from `config`.
    pub fn from_config(drive: Arc<dyn Drive>, config: &Config) -> Self {
        Self::new(drive)
            .with_assets_path(&config.assets.path)
            .with_max_upload_size(config.storage.max_upload_bytes())
    }

    /// Set the directory icons are resolved against.
    pub fn with_assets_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.assets_path = path.into();
        self
    }

    /// Set the per-file upload limit in bytes.
    pub fn with_max_upload_size(mut self, bytes: u64) -> Self {
        self.max_upload_size = bytes;
        self
    }
}
