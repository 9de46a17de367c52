//! Folder tree assembly.
//!
//! Listings are flat; containment is derived from id prefixes only.

use std::collections::{HashMap, HashSet};

use serde::Serialize;

use super::entry::FileEntry;
use super::path;

/// A folder with its nested children.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FolderNode {
    /// The folder itself.
    #[serde(flatten)]
    pub entry: FileEntry,
    /// Child nodes.
    pub data: Vec<FolderNode>,
}

/// Nest a flat listing under `root`.
///
/// Entries whose parent is not part of the listing are attached to the top
/// level. Sibling order follows the input order.
pub fn nest(entries: Vec<FileEntry>, root: &str) -> Vec<FolderNode> {
    let mut children: HashMap<String, Vec<FileEntry>> = HashMap::new();
    let known: HashSet<String> = entries.iter().map(|e| e.id.clone()).collect();

    let mut top = Vec::new();
    for entry in entries {
        let parent = path::parent_of(&entry.id);
        if parent != root && known.contains(parent) {
            children.entry(parent.to_string()).or_default().push(entry);
        } else {
            top.push(entry);
        }
    }

    top.into_iter()
        .map(|entry| build(entry, &mut children))
        .collect()
}

fn build(entry: FileEntry, children: &mut HashMap<String, Vec<FileEntry>>) -> FolderNode {
    let data = children
        .remove(&entry.id)
        .unwrap_or_default()
        .into_iter()
        .map(|child| build(child, children))
        .collect();
    FolderNode { entry, data }
}
