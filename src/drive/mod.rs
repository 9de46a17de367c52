//! File-system driver abstraction for filebay.
//!
//! Every persistent operation the web layer performs goes through the
//! [`Drive`] trait. Entries are addressed by virtual absolute paths such as
//! `/` or `/docs/report.txt`; see [`path`] for the normalization rules.
//!
//! The crate ships one backend, [`LocalDrive`], which maps ids onto a root
//! directory on the local file system.

mod entry;
mod local;
pub mod path;
pub mod tree;

pub use entry::{category_of, DriveStats, FileEntry};
pub use local::LocalDrive;

use std::pin::Pin;

use async_trait::async_trait;
use bytes::Bytes;
use futures::Stream;

use crate::filter::Criteria;
use crate::Result;

/// A stream of file content chunks.
pub type ByteStream = Pin<Box<dyn Stream<Item = std::io::Result<Bytes>> + Send>>;

/// Options for operations that create a new name in a folder.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CreateOptions {
    /// Rename the new entry (`name (1).ext`) instead of reusing or
    /// overwriting an existing one.
    pub prevent_name_collision: bool,
}

impl CreateOptions {
    /// Options with collision avoidance enabled.
    pub fn avoid_collisions() -> Self {
        Self {
            prevent_name_collision: true,
        }
    }
}

/// Which entries are dropped from a listing before anything else happens.
///
/// Excluded folders are not descended into.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Exclude {
    /// Keep everything.
    #[default]
    Nothing,
    /// Drop entries whose name starts with `.`.
    Hidden,
}

impl Exclude {
    /// Returns true if `entry` is excluded.
    pub fn excludes(&self, entry: &FileEntry) -> bool {
        match self {
            Exclude::Nothing => false,
            Exclude::Hidden => entry.value.starts_with('.'),
        }
    }
}

/// Listing options.
#[derive(Debug, Clone, Default)]
pub struct ListConfig {
    /// Entries removed before filtering and descent.
    pub exclude: Exclude,
    /// Output predicate; folders that fail it are still descended into.
    pub include: Option<Criteria>,
    /// Descend into sub folders.
    pub sub_folders: bool,
    /// Only report folders.
    pub skip_files: bool,
}

/// Storage operations the request layer depends on.
///
/// Every method may suspend on I/O. Ids must already be normalized with
/// [`path::normalize_id`]; implementations still reject anything that would
/// escape their root.
#[async_trait]
pub trait Drive: Send + Sync {
    /// List the entries below folder `id`.
    async fn list(&self, id: &str, config: &ListConfig) -> Result<Vec<FileEntry>>;

    /// Metadata of a single entry.
    async fn info(&self, id: &str) -> Result<FileEntry>;

    /// Open a file for reading.
    async fn read(&self, id: &str) -> Result<ByteStream>;

    /// Replace the content of file `id` with `data`, returning its id.
    ///
    /// The new content only becomes visible once `data` has been fully
    /// consumed.
    async fn write(&self, id: &str, data: ByteStream) -> Result<String>;

    /// Create a folder or an empty file named `name` inside `parent`.
    async fn make(
        &self,
        parent: &str,
        name: &str,
        is_folder: bool,
        options: CreateOptions,
    ) -> Result<String>;

    /// Copy `id` into folder `target`; an empty `new_name` keeps the source name.
    async fn copy(
        &self,
        id: &str,
        target: &str,
        new_name: &str,
        options: CreateOptions,
    ) -> Result<String>;

    /// Move `id` into folder `target`; an empty `new_name` keeps the source name.
    async fn move_to(
        &self,
        id: &str,
        target: &str,
        new_name: &str,
        options: CreateOptions,
    ) -> Result<String>;

    /// Delete an entry (folders recursively).
    async fn remove(&self, id: &str) -> Result<()>;

    /// Returns true if `id` resolves to an entry.
    async fn exists(&self, id: &str) -> Result<bool>;

    /// Free and used space.
    async fn stats(&self, id: &str) -> Result<DriveStats>;
}
