//! Icon lookup.
//!
//! Icons live in an `icons/` tree below the assets directory:
//! ```text
//! icons/
//! ├── default/32/report.pdf        icon for one specific file name
//! ├── default/32/types/pdf.svg     icon for a file type
//! └── dark/32/types/pdf.svg        type icon in a named skin
//! ```
//! Candidates are probed in that order of precedence and the first one that
//! exists wins. The default type icon is returned unprobed when nothing else
//! matches.

use std::path::Path;

/// Strip everything outside `[A-Za-z0-9.]`.
///
/// All request parameters pass through this before they become part of a
/// path, so `/`, `\` and other separators can never appear.
pub fn sanitize(value: &str) -> String {
    value
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || *c == '.')
        .collect()
}

/// Sanitize a value that becomes a single path segment.
///
/// A value made only of dots (`.`, `..`) would name a directory rather than
/// an entry inside it, so it is emptied.
fn segment(value: &str) -> String {
    let clean = sanitize(value);
    if clean.chars().all(|c| c == '.') {
        String::new()
    } else {
        clean
    }
}

/// Sanitized lookup parameters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IconQuery {
    /// Icon size directory, e.g. `32`.
    pub size: String,
    /// File type, e.g. `pdf`.
    pub kind: String,
    /// File name, e.g. `report.pdf`.
    pub name: String,
    /// Skin name; empty means the default skin only.
    pub skin: String,
}

impl IconQuery {
    /// Build a query, sanitizing every field.
    pub fn new(size: &str, kind: &str, name: &str, skin: &str) -> Self {
        Self {
            size: segment(size),
            kind: segment(kind),
            name: segment(name),
            skin: segment(skin),
        }
    }

    /// Candidate paths, relative to the assets directory, in precedence order.
    ///
    /// The last element is the unconditional fallback.
    pub fn candidates(&self) -> Vec<String> {
        let mut names = vec![format!("icons/default/{}/{}", self.size, self.name)];
        if !self.skin.is_empty() {
            names.push(format!(
                "icons/{}/{}/types/{}.svg",
                self.skin, self.size, self.kind
            ));
        }
        names.push(format!("icons/default/{}/types/{}.svg", self.size, self.kind));
        names
    }
}

/// Resolve an icon to a path relative to `assets`.
///
/// A candidate only counts as existing if it is a regular file. When `name`
/// sanitizes to nothing the name candidate is the size directory itself,
/// which must not be served as an icon.
///
/// Never fails: a probe that errors moves on to the next candidate, and the
/// final candidate is returned even if it does not exist.
pub async fn resolve_icon(assets: &Path, query: &IconQuery) -> String {
    let mut candidates = query.candidates();
    let fallback = candidates.pop().unwrap_or_default();

    for candidate in candidates {
        match tokio::fs::metadata(assets.join(&candidate)).await {
            Ok(meta) if meta.is_file() => return candidate,
            _ => continue,
        }
    }

    fallback
}
