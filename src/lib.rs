pub mod cli;
pub mod core;
pub mod error;
pub mod models;
pub mod store;

use models::{EntryKind, SEPARATOR};

/// Normalize a user-supplied traversal root to an absolute directory path.
///
/// Returns `None` when `raw` does not name a directory, i.e. lacks the
/// trailing separator.
pub fn walk_root(raw: &str) -> Option<String> {
    let root = if raw.starts_with(SEPARATOR) {
        raw.to_owned()
    } else {
        format!("{SEPARATOR}{raw}")
    };

    match EntryKind::of(&root) {
        EntryKind::Directory => Some(root),
        EntryKind::Leaf => None,
    }
}

/// The form a discovered path is printed in: without the leading separator.
pub fn display_path(path: &str) -> &str {
    path.strip_prefix(SEPARATOR).unwrap_or(path)
}
