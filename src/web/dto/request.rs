//! Request DTOs for the filebay API.
//!
//! Body types are accepted as JSON or as a urlencoded form; missing fields
//! default to empty strings so the validator can report them by name.

use serde::Deserialize;
use validator::Validate;

use super::validation::no_control_chars;
use crate::drive::path::ROOT;

/// Query carrying an optional folder id (`/info`, `/upload`).
#[derive(Debug, Default, Deserialize)]
pub struct FolderQuery {
    /// Folder id; the root when absent.
    #[serde(default)]
    pub id: Option<String>,
}

impl FolderQuery {
    /// Folder id, defaulting to the root.
    pub fn id(&self) -> &str {
        self.id.as_deref().filter(|id| !id.is_empty()).unwrap_or(ROOT)
    }
}

/// `GET /files` query.
#[derive(Debug, Default, Deserialize)]
pub struct FilesQuery {
    /// Folder to list; the root when absent.
    #[serde(default)]
    pub id: Option<String>,
    /// Substring the name must contain.
    #[serde(default)]
    pub search: Option<String>,
    /// JSON-encoded filter.
    #[serde(default)]
    pub filter: Option<String>,
    /// Maximum number of entries to return.
    #[serde(default)]
    pub limit: Option<usize>,
}

impl FilesQuery {
    /// Folder id, defaulting to the root.
    pub fn id(&self) -> &str {
        self.id.as_deref().filter(|id| !id.is_empty()).unwrap_or(ROOT)
    }
}

/// Query naming a single entry (`GET /text`).
#[derive(Debug, Deserialize)]
pub struct EntryQuery {
    /// Entry id.
    pub id: String,
}

/// `GET /direct` query.
#[derive(Debug, Deserialize)]
pub struct DirectQuery {
    /// Entry id.
    pub id: String,
    /// Any value other than empty, `0` or `false` requests an attachment.
    #[serde(default)]
    pub download: Option<String>,
}

impl DirectQuery {
    /// Returns true if the client asked for a download.
    pub fn as_attachment(&self) -> bool {
        matches!(self.download.as_deref(), Some(v) if !v.is_empty() && v != "0" && v != "false")
    }
}

/// Body naming a single entry (`/delete`).
#[derive(Debug, Deserialize, Validate)]
pub struct IdRequest {
    /// Entry id.
    #[serde(default)]
    #[validate(length(min = 1, message = "id is required"))]
    pub id: String,
}

/// `/copy` and `/move` body.
#[derive(Debug, Deserialize, Validate)]
pub struct TransferRequest {
    /// Source entry id.
    #[serde(default)]
    #[validate(length(min = 1, message = "id is required"))]
    pub id: String,
    /// Target folder id.
    #[serde(default)]
    #[validate(length(min = 1, message = "to is required"))]
    pub to: String,
}

/// `/rename` body.
#[derive(Debug, Deserialize, Validate)]
pub struct RenameRequest {
    /// Entry id.
    #[serde(default)]
    #[validate(length(min = 1, message = "id is required"))]
    pub id: String,
    /// New name.
    #[serde(default)]
    #[validate(
        length(min = 1, max = 255, message = "name must be 1-255 characters"),
        custom(function = "no_control_chars")
    )]
    pub name: String,
}

/// `/makedir` and `/makefile` body.
#[derive(Debug, Deserialize, Validate)]
pub struct MakeRequest {
    /// Parent folder id.
    #[serde(default)]
    #[validate(length(min = 1, message = "id is required"))]
    pub id: String,
    /// Name of the new entry.
    #[serde(default)]
    #[validate(
        length(min = 1, max = 255, message = "name must be 1-255 characters"),
        custom(function = "no_control_chars")
    )]
    pub name: String,
}

/// `POST /text` body.
#[derive(Debug, Deserialize, Validate)]
pub struct TextRequest {
    /// File id.
    #[serde(default)]
    #[validate(length(min = 1, message = "id is required"))]
    pub id: String,
    /// New content; may be empty.
    #[serde(default)]
    pub content: String,
}
