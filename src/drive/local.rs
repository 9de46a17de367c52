//! Local file system backend.
//!
//! Ids map onto paths below a root directory:
//! ```text
//! {root}/
//! ├── docs/          -> /docs
//! │   └── a.txt      -> /docs/a.txt
//! └── photo.png      -> /photo.png
//! ```
//! Ids are normalized before joining, so `..` can never reach the file system.

use std::fs::Metadata;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::time::UNIX_EPOCH;

use async_trait::async_trait;
use futures::StreamExt;
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tokio_util::io::ReaderStream;

use super::entry::{DriveStats, FileEntry};
use super::path::{self, ROOT};
use super::{ByteStream, CreateOptions, Drive, ListConfig};
use crate::{FileBayError, Result};

/// Drive backed by a directory on the local file system.
#[derive(Debug, Clone)]
pub struct LocalDrive {
    root: PathBuf,
}

impl LocalDrive {
    /// Open a drive rooted at `root`, creating the directory if needed.
    pub fn new(root: impl Into<PathBuf>) -> Result<Self> {
        let root = root.into();
        std::fs::create_dir_all(&root)?;
        let root = root.canonicalize()?;
        Ok(Self { root })
    }

    /// Get the root directory.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Map an id onto a path below the root.
    fn resolve(&self, id: &str) -> Result<PathBuf> {
        let id = path::normalize_id(id)?;
        let relative = id.trim_start_matches('/');
        if relative.is_empty() {
            Ok(self.root.clone())
        } else {
            Ok(self.root.join(relative))
        }
    }

    async fn metadata(&self, id: &str) -> Result<Metadata> {
        fs::metadata(self.resolve(id)?)
            .await
            .map_err(|e| FileBayError::from_io(e, id))
    }

    async fn folder_metadata(&self, id: &str) -> Result<Metadata> {
        let meta = self.metadata(id).await?;
        if !meta.is_dir() {
            return Err(FileBayError::Validation(format!("{id} is not a folder")));
        }
        Ok(meta)
    }

    fn to_entry(id: String, meta: &Metadata) -> FileEntry {
        let date = meta
            .modified()
            .ok()
            .and_then(|t| t.duration_since(UNIX_EPOCH).ok())
            .map_or(0, |d| d.as_secs() as i64);
        let name = path::file_name(&id).to_string();
        FileEntry::new(id, name, meta.is_dir(), date, meta.len())
    }

    /// Direct children of `folder`, folders first, then by name.
    async fn read_folder(&self, folder: &str) -> Result<Vec<FileEntry>> {
        let mut dir = fs::read_dir(self.resolve(folder)?)
            .await
            .map_err(|e| FileBayError::from_io(e, folder))?;

        let mut entries = Vec::new();
        while let Some(item) = dir.next_entry().await? {
            let name = item.file_name().to_string_lossy().into_owned();
            let meta = match item.metadata().await {
                Ok(meta) => meta,
                // removed while we were listing
                Err(e) if e.kind() == ErrorKind::NotFound => continue,
                Err(e) => return Err(e.into()),
            };
            entries.push(Self::to_entry(path::join(folder, &name), &meta));
        }

        entries.sort_by(|a, b| {
            b.is_folder
                .cmp(&a.is_folder)
                .then_with(|| a.value.cmp(&b.value))
        });
        Ok(entries)
    }

    /// First name of the form `name`, `stem (1).ext`, `stem (2).ext`, ...
    /// that is not taken in `parent`.
    async fn free_name(&self, parent: &str, name: &str) -> Result<String> {
        let mut candidate = name.to_string();
        let mut n = 1;
        while self.exists(&path::join(parent, &candidate)).await? {
            candidate = numbered_name(name, n);
            n += 1;
        }
        Ok(candidate)
    }

    /// Resolve the destination of a copy or move and run the shared checks.
    ///
    /// With `allow_self` a destination equal to `source` is returned as is,
    /// which makes moving an entry onto itself a no-op. A copy never resolves
    /// to its own source.
    async fn destination(
        &self,
        source: &str,
        target: &str,
        new_name: &str,
        options: CreateOptions,
        source_is_folder: bool,
        allow_self: bool,
    ) -> Result<String> {
        if source == ROOT {
            return Err(FileBayError::Validation(
                "the root folder cannot be copied or moved".to_string(),
            ));
        }
        self.folder_metadata(target).await?;

        let name = if new_name.is_empty() {
            path::file_name(source)
        } else {
            path::validate_name(new_name)?;
            new_name
        };

        if source_is_folder && path::is_within(target, source) {
            return Err(FileBayError::Validation(format!(
                "cannot place {source} inside itself"
            )));
        }

        let desired = path::join(target, name);
        if desired == source && allow_self {
            return Ok(desired);
        }
        if !options.prevent_name_collision {
            if desired == source {
                return Err(FileBayError::Validation(format!(
                    "cannot copy {source} onto itself"
                )));
            }
            return Ok(desired);
        }
        Ok(path::join(target, &self.free_name(target, name).await?))
    }
}

/// `report.txt` -> `report (n).txt`, `notes` -> `notes (n)`.
fn numbered_name(name: &str, n: u32) -> String {
    match name.rsplit_once('.') {
        Some((stem, ext)) if !stem.is_empty() => format!("{stem} ({n}).{ext}"),
        _ => format!("{name} ({n})"),
    }
}

async fn copy_tree(from: &Path, to: &Path) -> std::io::Result<()> {
    let mut pending = vec![(from.to_path_buf(), to.to_path_buf())];
    while let Some((src, dst)) = pending.pop() {
        fs::create_dir_all(&dst).await?;
        let mut dir = fs::read_dir(&src).await?;
        while let Some(item) = dir.next_entry().await? {
            let target = dst.join(item.file_name());
            if item.file_type().await?.is_dir() {
                pending.push((item.path(), target));
            } else {
                fs::copy(item.path(), &target).await?;
            }
        }
    }
    Ok(())
}

async fn used_bytes(root: &Path) -> std::io::Result<u64> {
    let mut total = 0u64;
    let mut pending = vec![root.to_path_buf()];
    while let Some(dir) = pending.pop() {
        let mut entries = fs::read_dir(&dir).await?;
        while let Some(item) = entries.next_entry().await? {
            let meta = match item.metadata().await {
                Ok(meta) => meta,
                Err(e) if e.kind() == ErrorKind::NotFound => continue,
                Err(e) => return Err(e),
            };
            if meta.is_dir() {
                pending.push(item.path());
            } else {
                total = total.saturating_add(meta.len());
            }
        }
    }
    Ok(total)
}

#[cfg(unix)]
fn available_bytes(root: &Path) -> Result<u64> {
    let stat = rustix::fs::statvfs(root).map_err(|e| FileBayError::Io(e.into()))?;
    Ok(stat.f_bavail.saturating_mul(stat.f_frsize))
}

#[cfg(not(unix))]
fn available_bytes(_root: &Path) -> Result<u64> {
    Ok(0)
}

#[async_trait]
impl Drive for LocalDrive {
    async fn list(&self, id: &str, config: &ListConfig) -> Result<Vec<FileEntry>> {
        let base = path::normalize_id(id)?;
        self.folder_metadata(&base).await?;

        let mut result = Vec::new();
        let mut pending = vec![base];
        while let Some(folder) = pending.pop() {
            let mut sub_folders = Vec::new();
            for entry in self.read_folder(&folder).await? {
                if config.exclude.excludes(&entry) {
                    continue;
                }
                if entry.is_folder && config.sub_folders {
                    sub_folders.push(entry.id.clone());
                }
                if config.skip_files && !entry.is_folder {
                    continue;
                }
                if config.include.as_ref().map_or(true, |c| c.includes(&entry)) {
                    result.push(entry);
                }
            }
            pending.extend(sub_folders.into_iter().rev());
        }

        Ok(result)
    }

    async fn info(&self, id: &str) -> Result<FileEntry> {
        let id = path::normalize_id(id)?;
        let meta = self.metadata(&id).await?;
        Ok(Self::to_entry(id, &meta))
    }

    async fn read(&self, id: &str) -> Result<ByteStream> {
        let id = path::normalize_id(id)?;
        if self.metadata(&id).await?.is_dir() {
            return Err(FileBayError::Validation(format!("{id} is a folder")));
        }
        let file = fs::File::open(self.resolve(&id)?)
            .await
            .map_err(|e| FileBayError::from_io(e, &id))?;
        Ok(Box::pin(ReaderStream::new(file)))
    }

    async fn write(&self, id: &str, mut data: ByteStream) -> Result<String> {
        let id = path::normalize_id(id)?;
        if id == ROOT {
            return Err(FileBayError::Validation(
                "cannot write to the root folder".to_string(),
            ));
        }
        let target = self.resolve(&id)?;
        match fs::metadata(&target).await {
            Ok(meta) if meta.is_dir() => {
                return Err(FileBayError::Validation(format!("{id} is a folder")));
            }
            _ => {}
        }

        let parent = path::parent_of(&id).to_string();
        let staged = tempfile::Builder::new()
            .prefix(".filebay-")
            .suffix(".part")
            .tempfile_in(self.resolve(&parent)?)
            .map_err(|e| FileBayError::from_io(e, &parent))?;
        // the temp path is removed on drop, so an aborted upload leaves nothing behind
        let (file, staged_path) = staged.into_parts();
        let mut file = fs::File::from_std(file);

        while let Some(chunk) = data.next().await {
            file.write_all(&chunk?).await?;
        }
        file.flush().await?;
        file.sync_all().await?;
        drop(file);

        staged_path.persist(&target).map_err(|e| e.error)?;
        tracing::debug!(id = %id, "Wrote file content");
        Ok(id)
    }

    async fn make(
        &self,
        parent: &str,
        name: &str,
        is_folder: bool,
        options: CreateOptions,
    ) -> Result<String> {
        let parent = path::normalize_id(parent)?;
        path::validate_name(name)?;
        self.folder_metadata(&parent).await?;

        loop {
            let name = if options.prevent_name_collision {
                self.free_name(&parent, name).await?
            } else {
                name.to_string()
            };
            let id = path::join(&parent, &name);
            let full = self.resolve(&id)?;

            let created = if is_folder {
                fs::create_dir(&full).await
            } else {
                fs::OpenOptions::new()
                    .write(true)
                    .create_new(true)
                    .open(&full)
                    .await
                    .map(|_| ())
            };

            match created {
                Ok(()) => {
                    tracing::debug!(id = %id, is_folder, "Created entry");
                    return Ok(id);
                }
                // someone else took the free name first
                Err(e) if e.kind() == ErrorKind::AlreadyExists && options.prevent_name_collision => {
                    continue
                }
                Err(e) if e.kind() == ErrorKind::AlreadyExists => {
                    let existing = self.metadata(&id).await?;
                    if existing.is_dir() == is_folder {
                        return Ok(id);
                    }
                    return Err(FileBayError::Validation(format!(
                        "{id} already exists with a different type"
                    )));
                }
                Err(e) => return Err(FileBayError::from_io(e, &parent)),
            }
        }
    }

    async fn copy(
        &self,
        id: &str,
        target: &str,
        new_name: &str,
        options: CreateOptions,
    ) -> Result<String> {
        let source = path::normalize_id(id)?;
        let target = path::normalize_id(target)?;
        let is_folder = self.metadata(&source).await?.is_dir();

        let dest = self
            .destination(&source, &target, new_name, options, is_folder, false)
            .await?;

        let from = self.resolve(&source)?;
        let to = self.resolve(&dest)?;
        if is_folder {
            copy_tree(&from, &to).await?;
        } else {
            fs::copy(&from, &to)
                .await
                .map_err(|e| FileBayError::from_io(e, &source))?;
        }

        tracing::debug!(from = %source, to = %dest, "Copied entry");
        Ok(dest)
    }

    async fn move_to(
        &self,
        id: &str,
        target: &str,
        new_name: &str,
        options: CreateOptions,
    ) -> Result<String> {
        let source = path::normalize_id(id)?;
        let target = path::normalize_id(target)?;
        let is_folder = self.metadata(&source).await?.is_dir();

        let dest = self
            .destination(&source, &target, new_name, options, is_folder, true)
            .await?;
        if dest == source {
            return Ok(dest);
        }

        fs::rename(self.resolve(&source)?, self.resolve(&dest)?)
            .await
            .map_err(|e| FileBayError::from_io(e, &source))?;

        tracing::debug!(from = %source, to = %dest, "Moved entry");
        Ok(dest)
    }

    async fn remove(&self, id: &str) -> Result<()> {
        let id = path::normalize_id(id)?;
        if id == ROOT {
            return Err(FileBayError::Validation(
                "the root folder cannot be removed".to_string(),
            ));
        }

        let full = self.resolve(&id)?;
        let removed = if self.metadata(&id).await?.is_dir() {
            fs::remove_dir_all(&full).await
        } else {
            fs::remove_file(&full).await
        };
        removed.map_err(|e| FileBayError::from_io(e, &id))?;

        tracing::debug!(id = %id, "Removed entry");
        Ok(())
    }

    async fn exists(&self, id: &str) -> Result<bool> {
        Ok(fs::try_exists(self.resolve(id)?).await?)
    }

    async fn stats(&self, id: &str) -> Result<DriveStats> {
        let id = path::normalize_id(id)?;
        self.metadata(&id).await?;

        let used = used_bytes(&self.root).await?;
        let free = available_bytes(&self.root)?;
        Ok(DriveStats { free, used })
    }
}
