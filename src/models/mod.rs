mod entry;
mod metadata;
mod traversal;

pub use entry::{EntryKind, SEPARATOR, SecretEntry};
pub use metadata::{CustomMetadata, PATH_KEY};
pub use traversal::Traversal;
