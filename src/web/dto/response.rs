//! Response DTOs for the filebay API.

use serde::Serialize;

use crate::drive::{DriveStats, FileEntry};
use crate::upload::UploadOutcome;
use crate::web::error::ApiError;

/// Capacity figures.
#[derive(Debug, Serialize)]
pub struct StatsResponse {
    /// Available bytes.
    pub free: u64,
    /// Bytes in use.
    pub used: u64,
    /// `free + used`.
    pub total: u64,
}

/// Marker for a supported client feature; serializes as `{}`.
#[derive(Debug, Default, Serialize)]
pub struct Feature {}

/// Features the client may enable.
#[derive(Debug, Default, Serialize)]
pub struct Features {
    /// File previews.
    pub preview: Feature,
    /// Metadata panel.
    pub meta: Feature,
}

/// `GET /info` response.
#[derive(Debug, Serialize)]
pub struct InfoResponse {
    /// Capacity figures.
    pub stats: StatsResponse,
    /// Supported features.
    pub features: Features,
}

impl From<DriveStats> for InfoResponse {
    fn from(stats: DriveStats) -> Self {
        Self {
            stats: StatsResponse {
                free: stats.free,
                used: stats.used,
                total: stats.total(),
            },
            features: Features::default(),
        }
    }
}

/// `GET /files` response: the full list, or a page plus the total count.
#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum FilesResponse {
    /// Every matching entry.
    All(Vec<FileEntry>),
    /// At most `limit` entries.
    Limited {
        /// Leading entries.
        files: Vec<FileEntry>,
        /// Number of matching entries before truncation.
        total: usize,
    },
}

impl FilesResponse {
    /// Truncate `files` to `limit` entries; no limit (or 0) keeps everything.
    pub fn new(mut files: Vec<FileEntry>, limit: Option<usize>) -> Self {
        match limit.filter(|l| *l > 0) {
            Some(limit) => {
                let total = files.len();
                files.truncate(limit);
                FilesResponse::Limited { files, total }
            }
            None => FilesResponse::All(files),
        }
    }
}

/// One element of a multi-file upload response.
#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum UploadResult {
    /// Committed file.
    Stored(FileEntry),
    /// Failed file.
    Failed {
        /// Always `"error"`.
        status: &'static str,
        /// Declared file name.
        name: String,
        /// Failure message.
        error: String,
    },
}

impl From<UploadOutcome> for UploadResult {
    fn from(outcome: UploadOutcome) -> Self {
        match outcome.result {
            Ok(entry) => UploadResult::Stored(entry),
            Err(e) => UploadResult::Failed {
                status: "error",
                name: outcome.name,
                error: ApiError::from(e).message().to_string(),
            },
        }
    }
}
