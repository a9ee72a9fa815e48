/// Separator between path segments. A trailing separator marks a directory.
pub const SEPARATOR: char = '/';

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum EntryKind {
    Directory,
    Leaf,
}

impl EntryKind {
    /// Classify a path by the store's naming convention: only a trailing
    /// separator makes a directory.
    pub fn of(path: &str) -> Self {
        if path.ends_with(SEPARATOR) {
            EntryKind::Directory
        } else {
            EntryKind::Leaf
        }
    }
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct SecretEntry {
    pub path: String,
    pub kind: EntryKind,
}

impl SecretEntry {
    /// Build the fully-qualified entry for `name` as listed under `parent`.
    pub fn child(parent: &str, name: &str) -> Self {
        let path = format!("{parent}{name}");
        let kind = EntryKind::of(&path);
        Self { path, kind }
    }
}
