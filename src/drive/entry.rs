//! Entry metadata records.

use serde::Serialize;

/// Metadata snapshot of a file or folder, taken at listing time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FileEntry {
    /// Virtual path of the entry.
    pub id: String,
    /// Display name.
    pub value: String,
    /// Category tag (`folder`, `image`, `code`, ...).
    #[serde(rename = "type")]
    pub kind: String,
    /// Modification time in epoch seconds.
    pub date: i64,
    /// Size in bytes (0 for folders).
    pub size: u64,
    /// Whether the entry is a folder.
    pub is_folder: bool,
}

impl FileEntry {
    /// Build an entry, deriving the category from the name.
    pub fn new(
        id: impl Into<String>,
        value: impl Into<String>,
        is_folder: bool,
        date: i64,
        size: u64,
    ) -> Self {
        let value = value.into();
        Self {
            id: id.into(),
            kind: category_of(&value, is_folder).to_string(),
            value,
            date,
            size: if is_folder { 0 } else { size },
            is_folder,
        }
    }
}

/// Free and used space of a drive.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct DriveStats {
    /// Available bytes.
    pub free: u64,
    /// Bytes used by entries under the root.
    pub used: u64,
}

impl DriveStats {
    /// Total capacity as seen by the client.
    pub fn total(&self) -> u64 {
        self.free.saturating_add(self.used)
    }
}

const CODE_EXTENSIONS: &[&str] = &[
    "c", "cpp", "cs", "css", "go", "h", "hpp", "html", "java", "js", "json", "jsx", "kt", "lua",
    "php", "py", "rb", "rs", "sh", "sql", "swift", "toml", "ts", "tsx", "xml", "yaml", "yml",
];

const DOCUMENT_EXTENSIONS: &[&str] = &[
    "doc", "docx", "odp", "ods", "odt", "pdf", "ppt", "pptx", "rtf", "xls", "xlsx",
];

const ARCHIVE_EXTENSIONS: &[&str] = &["7z", "bz2", "gz", "rar", "tar", "tgz", "xz", "zip"];

/// Category tag for an entry name.
///
/// Extensions known as code, document or archive formats win; otherwise the
/// top-level MIME type decides between image, video, audio and text.
pub fn category_of(name: &str, is_folder: bool) -> &'static str {
    if is_folder {
        return "folder";
    }

    let ext = match name.rsplit_once('.') {
        Some((stem, ext)) if !stem.is_empty() => ext.to_ascii_lowercase(),
        _ => return "file",
    };

    if CODE_EXTENSIONS.contains(&ext.as_str()) {
        return "code";
    }
    if DOCUMENT_EXTENSIONS.contains(&ext.as_str()) {
        return "document";
    }
    if ARCHIVE_EXTENSIONS.contains(&ext.as_str()) {
        return "archive";
    }

    match mime_guess::from_ext(&ext).first() {
        Some(mime) => match mime.type_().as_str() {
            "image" => "image",
            "video" => "video",
            "audio" => "audio",
            "text" => "text",
            _ => "file",
        },
        None => "file",
    }
}
