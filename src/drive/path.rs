//! Virtual path helpers.
//!
//! Ids are absolute, `/`-separated and never contain `..`. Everything coming
//! from a client goes through [`normalize_id`] or [`validate_name`] before it
//! reaches a driver.

use crate::{FileBayError, Result};

/// The root folder id.
pub const ROOT: &str = "/";

/// Normalize a client supplied id.
///
/// Empty and `.` segments are dropped, so `""`, `"/"` and `"./"` all name the
/// root. `..` segments, backslashes and NUL bytes are rejected.
pub fn normalize_id(raw: &str) -> Result<String> {
    if raw.contains('\\') || raw.contains('\0') {
        return Err(FileBayError::Validation(format!("invalid id: {raw:?}")));
    }

    let mut segments = Vec::new();
    for segment in raw.split('/') {
        match segment {
            "" | "." => continue,
            ".." => {
                return Err(FileBayError::Validation(format!(
                    "id must not contain '..': {raw:?}"
                )))
            }
            s => segments.push(s),
        }
    }

    Ok(format!("/{}", segments.join("/")))
}

/// Validate a single entry name.
pub fn validate_name(name: &str) -> Result<()> {
    if name.is_empty() || name == "." || name == ".." {
        return Err(FileBayError::Validation(format!("invalid name: {name:?}")));
    }
    if name.contains(&['/', '\\', '\0'][..]) {
        return Err(FileBayError::Validation(format!(
            "name must not contain path separators: {name:?}"
        )));
    }
    Ok(())
}

/// Append `name` to folder id `parent`.
pub fn join(parent: &str, name: &str) -> String {
    if parent.ends_with('/') {
        format!("{parent}{name}")
    } else {
        format!("{parent}/{name}")
    }
}

/// Parent folder of `id` (the root is its own parent).
pub fn parent_of(id: &str) -> &str {
    match id.trim_end_matches('/').rfind('/') {
        Some(0) | None => ROOT,
        Some(idx) => &id[..idx],
    }
}

/// Last segment of `id` (empty for the root).
pub fn file_name(id: &str) -> &str {
    let trimmed = id.trim_end_matches('/');
    match trimmed.rfind('/') {
        Some(idx) => &trimmed[idx + 1..],
        None => trimmed,
    }
}

/// Returns true if `id` equals `ancestor` or lies below it.
pub fn is_within(id: &str, ancestor: &str) -> bool {
    if ancestor == ROOT {
        return true;
    }
    id == ancestor
        || id
            .strip_prefix(ancestor)
            .is_some_and(|rest| rest.starts_with('/'))
}
