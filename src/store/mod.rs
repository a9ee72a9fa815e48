mod vault;

#[cfg(test)]
mod mock;

pub use vault::{VaultConfig, VaultStore};

#[cfg(test)]
pub use mock::MockSecretStore;

use async_trait::async_trait;

use crate::error::StoreError;
use crate::models::CustomMetadata;

/// The operations the traversal and metadata commands need from a KV store.
///
/// Implementations are shared between concurrent tasks.
#[async_trait]
pub trait SecretStore: Send + Sync {
    /// List the direct children of a directory path.
    ///
    /// Returns `Ok(None)` when the store has no data for `path`, which is how
    /// a leaf answers a listing.
    async fn list_children(&self, path: &str) -> Result<Option<Vec<String>>, StoreError>;

    /// Read the custom metadata of a secret, `Ok(None)` if it does not exist.
    async fn read_custom_metadata(&self, path: &str)
    -> Result<Option<CustomMetadata>, StoreError>;

    /// Replace the custom metadata of a secret.
    async fn write_custom_metadata(
        &self,
        path: &str,
        metadata: CustomMetadata,
    ) -> Result<(), StoreError>;
}
