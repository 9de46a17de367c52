//! filebay - remote file manager over HTTP.
//!
//! Browse, search, upload and download files below a root directory through
//! a JSON API designed for file-manager style web clients.

pub mod config;
pub mod drive;
pub mod error;
pub mod filter;
pub mod icons;
pub mod logging;
pub mod upload;
pub mod web;

pub use config::Config;
pub use drive::{Drive, FileEntry, LocalDrive};
pub use error::{FileBayError, Result};
pub use upload::{UploadJob, UploadOutcome, UploadState};
pub use web::WebServer;
