//! Multipart upload pipeline.
//!
//! An [`UploadJob`] lives for one upload request and moves through
//! [`UploadState`]s:
//!
//! 1. `ReceivingParts`: file parts are spooled to anonymous temp files (up
//!    to the per-file limit) and path fields are paired with their file.
//! 2. `MaterializingDirectories`: for files uploaded as part of a folder, the
//!    directory chain from the relative path is created below the base folder.
//! 3. `CommittingFiles`: each file is created under a collision-free name and
//!    its content written through the drive.
//!
//! A file that fails (over the limit, bad path, driver error) yields an error
//! outcome for that file only; its siblings are still committed.

use std::fmt::Display;
use std::io::SeekFrom;

use bytes::Bytes;
use futures::{Stream, StreamExt};
use tokio::fs::File;
use tokio::io::{AsyncSeekExt, AsyncWriteExt};
use tokio_util::io::ReaderStream;

use crate::drive::{path, ByteStream, CreateOptions, Drive, FileEntry};
use crate::{FileBayError, Result};

/// Lifecycle of an upload request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UploadState {
    /// Multipart parts are still being consumed.
    ReceivingParts,
    /// Folder chains are being created.
    MaterializingDirectories,
    /// Staged files are being written.
    CommittingFiles,
    /// Every file has an outcome.
    Done,
    /// The multipart body could not be read.
    Failed,
}

/// A file part spooled to disk until commit.
///
/// The spool is an unnamed temp file, removed by the OS once it is dropped.
#[derive(Debug)]
pub struct StagedFile {
    /// Declared file name.
    pub name: String,
    /// Relative path inside an uploaded folder, e.g. `a/b/report.txt`.
    pub relative_path: Option<String>,
    spool: Option<File>,
    len: u64,
    exceeded: bool,
}

impl StagedFile {
    /// Staged size in bytes.
    pub fn len(&self) -> u64 {
        self.len
    }

    /// Returns true if nothing was staged.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Returns true if the content is held in a spool file.
    pub fn is_spooled(&self) -> bool {
        self.spool.is_some()
    }

    /// Returns true if the file went over the size limit.
    pub fn exceeded(&self) -> bool {
        self.exceeded
    }

    /// Folder names between the base folder and the file.
    fn directory_segments(&self) -> Vec<&str> {
        let Some(relative) = self.relative_path.as_deref() else {
            return Vec::new();
        };
        let mut segments: Vec<&str> = relative
            .split('/')
            .filter(|s| !s.is_empty() && *s != ".")
            .collect();
        segments.pop();
        segments
    }
}

/// Result for one uploaded file.
#[derive(Debug)]
pub struct UploadOutcome {
    /// Declared file name.
    pub name: String,
    /// Committed entry or the reason this file failed.
    pub result: Result<FileEntry>,
}

/// Per-request upload state.
#[derive(Debug)]
pub struct UploadJob {
    base: String,
    limit: u64,
    files: Vec<StagedFile>,
    pending_path: Option<String>,
    last_part_was_file: bool,
    state: UploadState,
}

impl UploadJob {
    /// Start a job that uploads into folder `base`, allowing `limit` bytes per file.
    pub fn new(base: &str, limit: u64) -> Result<Self> {
        Ok(Self {
            base: path::normalize_id(base)?,
            limit,
            files: Vec::new(),
            pending_path: None,
            last_part_was_file: false,
            state: UploadState::ReceivingParts,
        })
    }

    /// Current state.
    pub fn state(&self) -> UploadState {
        self.state
    }

    /// Target folder.
    pub fn base(&self) -> &str {
        &self.base
    }

    /// Files staged so far.
    pub fn files(&self) -> &[StagedFile] {
        &self.files
    }

    /// Drain a file part into a spool file.
    ///
    /// Only one chunk is held in memory at a time. Going over the limit marks
    /// the file as exceeded, drops what was staged and stops reading; the job
    /// carries on with the next part. A read or spool error fails the whole
    /// job.
    pub async fn stage_file<S, E>(&mut self, declared_name: &str, stream: S) -> Result<()>
    where
        S: Stream<Item = std::result::Result<Bytes, E>>,
        E: Display,
    {
        // some clients send the folder path as the file name
        let name = declared_name
            .rsplit(&['/', '\\'][..])
            .next()
            .unwrap_or(declared_name)
            .to_string();
        let mut relative_path = self.pending_path.take();
        if relative_path.is_none() && declared_name.contains('/') {
            relative_path = Some(declared_name.to_string());
        }

        let (spool, len) = match self.spool(&name, stream).await {
            Ok(staged) => staged,
            Err(e) => {
                self.state = UploadState::Failed;
                return Err(e);
            }
        };
        let exceeded = spool.is_none();
        if exceeded {
            tracing::warn!(name = %name, limit = self.limit, "Upload exceeds size limit");
        }

        self.files.push(StagedFile {
            name,
            relative_path,
            spool,
            len,
            exceeded,
        });
        self.last_part_was_file = true;
        Ok(())
    }

    /// Copy `stream` into a fresh spool file rewound to the start.
    ///
    /// Returns `None` when the part goes over the limit.
    async fn spool<S, E>(&self, name: &str, stream: S) -> Result<(Option<File>, u64)>
    where
        S: Stream<Item = std::result::Result<Bytes, E>>,
        E: Display,
    {
        let mut spool = File::from_std(tempfile::tempfile()?);
        let mut len = 0u64;
        let mut stream = std::pin::pin!(stream);
        while let Some(chunk) = stream.next().await {
            let chunk = chunk.map_err(|e| {
                FileBayError::Validation(format!("failed to read upload {name}: {e}"))
            })?;
            len += chunk.len() as u64;
            if len > self.limit {
                return Ok((None, 0));
            }
            spool.write_all(&chunk).await?;
        }
        spool.flush().await?;
        spool.seek(SeekFrom::Start(0)).await?;
        Ok((Some(spool), len))
    }

    /// Record the relative path carried by a path field.
    ///
    /// It belongs to the file part just received, or to the next one if the
    /// previous part was not a file or already has a path.
    pub fn attach_path(&mut self, relative_path: &str) {
        let previous = self
            .files
            .last_mut()
            .filter(|f| f.relative_path.is_none());

        match previous {
            Some(file) if self.last_part_was_file => {
                file.relative_path = Some(relative_path.to_string());
            }
            _ => self.pending_path = Some(relative_path.to_string()),
        }
        self.last_part_was_file = false;
    }

    /// Note a part that is neither a file nor a path field.
    pub fn skip_part(&mut self) {
        self.last_part_was_file = false;
    }

    /// Create folder chains and write every staged file.
    ///
    /// Outcomes are returned in the order the files arrived.
    pub async fn commit(&mut self, drive: &dyn Drive) -> Vec<UploadOutcome> {
        let files = std::mem::take(&mut self.files);

        self.state = UploadState::MaterializingDirectories;
        let mut targets = Vec::with_capacity(files.len());
        for file in &files {
            let target = if file.exceeded {
                Err(FileBayError::LimitExceeded {
                    name: file.name.clone(),
                    limit: self.limit,
                })
            } else {
                materialize(drive, &self.base, &file.directory_segments()).await
            };
            targets.push(target);
        }

        self.state = UploadState::CommittingFiles;
        let mut outcomes = Vec::with_capacity(files.len());
        for (file, target) in files.into_iter().zip(targets) {
            let name = file.name.clone();
            let result = match target {
                Ok(folder) => commit_file(drive, &folder, file).await,
                Err(e) => Err(e),
            };
            match &result {
                Ok(entry) => tracing::info!(id = %entry.id, size = entry.size, "Upload stored"),
                Err(e) => tracing::warn!(name = %name, error = %e, "Upload failed"),
            }
            outcomes.push(UploadOutcome { name, result });
        }

        self.state = UploadState::Done;
        outcomes
    }
}

/// Walk `segments` below `base`, creating folders that do not exist yet.
///
/// Creation goes parent before child. Folder creation without collision
/// avoidance is idempotent, so a concurrent upload creating the same folder
/// between the existence check and the create is harmless.
async fn materialize(drive: &dyn Drive, base: &str, segments: &[&str]) -> Result<String> {
    let mut current = base.to_string();
    for segment in segments {
        path::validate_name(segment)?;
        let candidate = path::join(&current, segment);
        current = if drive.exists(&candidate).await? {
            candidate
        } else {
            drive
                .make(&current, segment, true, CreateOptions::default())
                .await?
        };
    }
    Ok(current)
}

async fn commit_file(drive: &dyn Drive, folder: &str, file: StagedFile) -> Result<FileEntry> {
    path::validate_name(&file.name)?;
    let id = drive
        .make(folder, &file.name, false, CreateOptions::avoid_collisions())
        .await?;

    let data: ByteStream = match file.spool {
        Some(spool) => Box::pin(ReaderStream::new(spool)),
        None => Box::pin(futures::stream::empty()),
    };
    let id = match drive.write(&id, data).await {
        Ok(id) => id,
        Err(e) => {
            // do not leave the empty placeholder behind
            if let Err(cleanup) = drive.remove(&id).await {
                tracing::warn!(id = %id, error = %cleanup, "Failed to remove placeholder");
            }
            return Err(e);
        }
    };

    drive.info(&id).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::drive::{DriveStats, ListConfig, LocalDrive};
    use async_trait::async_trait;
    use tempfile::TempDir;

    const LIMIT: u64 = 1024;

    fn setup_drive() -> (TempDir, LocalDrive) {
        let temp_dir = TempDir::new().unwrap();
        let drive = LocalDrive::new(temp_dir.path()).unwrap();
        (temp_dir, drive)
    }

    fn part(content: &[u8]) -> impl Stream<Item = std::result::Result<Bytes, std::io::Error>> {
        let chunks: Vec<_> = content
            .chunks(100)
            .map(|c| Ok(Bytes::copy_from_slice(c)))
            .collect();
        futures::stream::iter(chunks)
    }

    async fn read_all(drive: &dyn Drive, id: &str) -> Vec<u8> {
        let mut stream = drive.read(id).await.unwrap();
        let mut content = Vec::new();
        while let Some(chunk) = stream.next().await {
            content.extend_from_slice(&chunk.unwrap());
        }
        content
    }

    #[tokio::test]
    async fn test_flat_upload() {
        let (_temp_dir, drive) = setup_drive();
        let mut job = UploadJob::new("/", LIMIT).unwrap();
        assert_eq!(job.state(), UploadState::ReceivingParts);

        job.stage_file("hello.txt", part(b"hello")).await.unwrap();
        let outcomes = job.commit(&drive).await;

        assert_eq!(job.state(), UploadState::Done);
        assert_eq!(outcomes.len(), 1);
        let entry = outcomes[0].result.as_ref().unwrap();
        assert_eq!(entry.id, "/hello.txt");
        assert_eq!(entry.size, 5);
    }

    #[tokio::test]
    async fn test_folder_upload_materializes_directories() {
        let (_temp_dir, drive) = setup_drive();
        let mut job = UploadJob::new("/", LIMIT).unwrap();

        job.stage_file("report.txt", part(b"quarterly")).await.unwrap();
        job.attach_path("a/b/report.txt");
        let outcomes = job.commit(&drive).await;

        let entry = outcomes[0].result.as_ref().unwrap();
        assert_eq!(entry.id, "/a/b/report.txt");
        assert!(drive.info("/a").await.unwrap().is_folder);
        assert!(drive.info("/a/b").await.unwrap().is_folder);
        assert_eq!(read_all(&drive, "/a/b/report.txt").await, b"quarterly");
    }

    #[tokio::test]
    async fn test_reupload_gets_distinct_name() {
        let (_temp_dir, drive) = setup_drive();

        for content in [&b"first"[..], &b"second"[..]] {
            let mut job = UploadJob::new("/", LIMIT).unwrap();
            job.stage_file("report.txt", part(content)).await.unwrap();
            job.attach_path("a/b/report.txt");
            job.commit(&drive).await;
        }

        assert_eq!(read_all(&drive, "/a/b/report.txt").await, b"first");
        assert_eq!(read_all(&drive, "/a/b/report (1).txt").await, b"second");
        // folders are reused, not duplicated
        assert!(!drive.exists("/a (1)").await.unwrap());
    }

    #[tokio::test]
    async fn test_over_limit_file_does_not_block_siblings() {
        let (_temp_dir, drive) = setup_drive();
        let mut job = UploadJob::new("/", LIMIT).unwrap();

        job.stage_file("big.bin", part(&vec![7u8; 2048])).await.unwrap();
        job.stage_file("small.txt", part(b"ok")).await.unwrap();
        assert!(job.files()[0].exceeded());
        assert!(job.files()[0].is_empty());
        assert!(!job.files()[0].is_spooled());
        assert!(!job.files()[1].exceeded());

        let outcomes = job.commit(&drive).await;

        assert!(matches!(
            outcomes[0].result,
            Err(FileBayError::LimitExceeded { .. })
        ));
        assert_eq!(outcomes[1].result.as_ref().unwrap().id, "/small.txt");
        assert!(!drive.exists("/big.bin").await.unwrap());
    }

    #[tokio::test]
    async fn test_file_at_exact_limit_is_accepted() {
        let (_temp_dir, drive) = setup_drive();
        let mut job = UploadJob::new("/", LIMIT).unwrap();

        job.stage_file("exact.bin", part(&vec![1u8; LIMIT as usize])).await.unwrap();
        let outcomes = job.commit(&drive).await;

        assert_eq!(outcomes[0].result.as_ref().unwrap().size, LIMIT);
    }

    #[tokio::test]
    async fn test_many_files_at_limit_are_spooled() {
        let (_temp_dir, drive) = setup_drive();
        let mut job = UploadJob::new("/", LIMIT).unwrap();

        for i in 0..8u8 {
            let name = format!("part{i}.bin");
            job.stage_file(&name, part(&vec![i; LIMIT as usize])).await.unwrap();
        }
        assert!(job
            .files()
            .iter()
            .all(|f| f.is_spooled() && f.len() == LIMIT));

        let outcomes = job.commit(&drive).await;

        assert_eq!(outcomes.len(), 8);
        for (i, outcome) in outcomes.iter().enumerate() {
            let entry = outcome.result.as_ref().unwrap();
            assert_eq!(entry.size, LIMIT);
            assert_eq!(read_all(&drive, &entry.id).await, vec![i as u8; LIMIT as usize]);
        }
    }

    #[tokio::test]
    async fn test_shared_prefix_creates_folder_once() {
        let (_temp_dir, drive) = setup_drive();
        let mut job = UploadJob::new("/", LIMIT).unwrap();

        job.stage_file("x.txt", part(b"x")).await.unwrap();
        job.attach_path("photos/x.txt");
        job.stage_file("y.txt", part(b"y")).await.unwrap();
        job.attach_path("photos/y.txt");
        let outcomes = job.commit(&drive).await;

        assert_eq!(outcomes[0].result.as_ref().unwrap().id, "/photos/x.txt");
        assert_eq!(outcomes[1].result.as_ref().unwrap().id, "/photos/y.txt");
        let root = drive.list("/", &ListConfig::default()).await.unwrap();
        assert_eq!(root.len(), 1);
    }

    #[tokio::test]
    async fn test_path_field_before_file() {
        let (_temp_dir, drive) = setup_drive();
        let mut job = UploadJob::new("/", LIMIT).unwrap();

        job.attach_path("docs/a.txt");
        job.stage_file("a.txt", part(b"a")).await.unwrap();
        let outcomes = job.commit(&drive).await;

        assert_eq!(outcomes[0].result.as_ref().unwrap().id, "/docs/a.txt");
    }

    #[tokio::test]
    async fn test_path_in_declared_name() {
        let (_temp_dir, drive) = setup_drive();
        let mut job = UploadJob::new("/", LIMIT).unwrap();

        job.stage_file("nested/dir/file.txt", part(b"f")).await.unwrap();
        assert_eq!(job.files()[0].name, "file.txt");
        let outcomes = job.commit(&drive).await;

        assert_eq!(outcomes[0].result.as_ref().unwrap().id, "/nested/dir/file.txt");
    }

    #[tokio::test]
    async fn test_traversal_in_path_fails_that_file_only() {
        let (temp_dir, drive) = setup_drive();
        let mut job = UploadJob::new("/", LIMIT).unwrap();

        job.stage_file("evil.txt", part(b"x")).await.unwrap();
        job.attach_path("../../evil.txt");
        job.stage_file("good.txt", part(b"y")).await.unwrap();
        let outcomes = job.commit(&drive).await;

        assert!(matches!(outcomes[0].result, Err(FileBayError::Validation(_))));
        assert!(outcomes[1].result.is_ok());
        assert!(!temp_dir.path().parent().unwrap().join("evil.txt").exists());
    }

    #[tokio::test]
    async fn test_upload_into_subfolder() {
        let (_temp_dir, drive) = setup_drive();
        drive
            .make("/", "inbox", true, CreateOptions::default())
            .await
            .unwrap();

        let mut job = UploadJob::new("inbox", LIMIT).unwrap();
        assert_eq!(job.base(), "/inbox");
        job.stage_file("a.txt", part(b"a")).await.unwrap();
        job.attach_path("x/a.txt");
        let outcomes = job.commit(&drive).await;

        assert_eq!(outcomes[0].result.as_ref().unwrap().id, "/inbox/x/a.txt");
    }

    #[tokio::test]
    async fn test_read_error_fails_job() {
        let mut job = UploadJob::new("/", LIMIT).unwrap();
        let broken = futures::stream::iter(vec![
            Ok(Bytes::from_static(b"abc")),
            Err(std::io::Error::new(std::io::ErrorKind::ConnectionReset, "reset")),
        ]);

        let result = job.stage_file("a.txt", broken).await;

        assert!(matches!(result, Err(FileBayError::Validation(_))));
        assert_eq!(job.state(), UploadState::Failed);
    }

    #[test]
    fn test_invalid_base_rejected() {
        assert!(UploadJob::new("/../etc", LIMIT).is_err());
    }

    /// Reports every folder as missing so each segment goes through `make`,
    /// as if another upload created it concurrently.
    struct RacingDrive(LocalDrive);

    #[async_trait]
    impl Drive for RacingDrive {
        async fn list(&self, id: &str, config: &ListConfig) -> Result<Vec<FileEntry>> {
            self.0.list(id, config).await
        }
        async fn info(&self, id: &str) -> Result<FileEntry> {
            self.0.info(id).await
        }
        async fn read(&self, id: &str) -> Result<ByteStream> {
            self.0.read(id).await
        }
        async fn write(&self, id: &str, data: ByteStream) -> Result<String> {
            self.0.write(id, data).await
        }
        async fn make(
            &self,
            parent: &str,
            name: &str,
            is_folder: bool,
            options: CreateOptions,
        ) -> Result<String> {
            self.0.make(parent, name, is_folder, options).await
        }
        async fn copy(
            &self,
            id: &str,
            target: &str,
            new_name: &str,
            options: CreateOptions,
        ) -> Result<String> {
            self.0.copy(id, target, new_name, options).await
        }
        async fn move_to(
            &self,
            id: &str,
            target: &str,
            new_name: &str,
            options: CreateOptions,
        ) -> Result<String> {
            self.0.move_to(id, target, new_name, options).await
        }
        async fn remove(&self, id: &str) -> Result<()> {
            self.0.remove(id).await
        }
        async fn exists(&self, _id: &str) -> Result<bool> {
            Ok(false)
        }
        async fn stats(&self, id: &str) -> Result<DriveStats> {
            self.0.stats(id).await
        }
    }

    #[tokio::test]
    async fn test_concurrent_folder_creation_is_tolerated() {
        let (_temp_dir, local) = setup_drive();
        local
            .make("/", "shared", true, CreateOptions::default())
            .await
            .unwrap();
        let drive = RacingDrive(local);

        let mut job = UploadJob::new("/", LIMIT).unwrap();
        job.stage_file("a.txt", part(b"a")).await.unwrap();
        job.attach_path("shared/a.txt");
        let outcomes = job.commit(&drive).await;

        assert_eq!(outcomes[0].result.as_ref().unwrap().id, "/shared/a.txt");
        assert!(!drive.0.exists("/shared (1)").await.unwrap());
    }
}
