use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use tokio::task::JoinSet;
use tracing::{debug, info, warn};

use crate::core::AdmissionGate;
use crate::error::WalkError;
use crate::models::{EntryKind, SecretEntry, Traversal};
use crate::store::SecretStore;

type WalkFuture = Pin<Box<dyn Future<Output = Result<Traversal, WalkError>> + Send>>;

/// Recursive walker collecting every leaf below a directory.
///
/// Each child directory is walked in its own task, while every listing
/// request goes through the shared [`AdmissionGate`]. No permit is held
/// while waiting for children, so the number of tasks is independent of the
/// gate's capacity.
pub struct Walker<S> {
    store: Arc<S>,
    gate: Arc<AdmissionGate>,
}

impl<S> Clone for Walker<S> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
            gate: Arc::clone(&self.gate),
        }
    }
}

impl<S: SecretStore + 'static> Walker<S> {
    pub fn new(store: Arc<S>, gate: Arc<AdmissionGate>) -> Self {
        Self { store, gate }
    }

    /// Walk the directory `root`, which must end with the path separator.
    ///
    /// Forbidden directories are skipped and reported in
    /// [`Traversal::forbidden`]. Any other failure aborts the walk; when
    /// several branches fail concurrently, which error is returned is
    /// unspecified.
    pub async fn walk(&self, root: &str) -> Result<Traversal, WalkError> {
        let traversal = self.clone().walk_dir(root.to_owned()).await?;
        info!(
            root,
            leaves = traversal.leaves.len(),
            forbidden = traversal.forbidden.len(),
            peak_requests = self.gate.peak(),
            "traversal complete"
        );
        Ok(traversal)
    }

    async fn list_dir(&self, path: &str) -> Result<Option<Vec<String>>, WalkError> {
        let _permit = self.gate.acquire().await?;
        debug!(path, "listing children");

        tokio::select! {
            biased;
            () = self.gate.cancelled() => Err(WalkError::Cancelled),
            result = self.store.list_children(path) => {
                result.map_err(|source| WalkError::List {
                    path: path.to_owned(),
                    source,
                })
            }
        }
    }

    fn walk_dir(self, path: String) -> WalkFuture {
        Box::pin(async move {
            let mut traversal = Traversal::default();

            let names = match self.list_dir(&path).await {
                Ok(Some(names)) => names,
                // No data: the path is not a directory.
                Ok(None) => return Ok(traversal),
                Err(WalkError::List { source, .. }) if source.is_forbidden() => {
                    warn!("access to {path} is forbidden");
                    traversal.forbidden.push(path);
                    return Ok(traversal);
                }
                Err(err) => return Err(err),
            };

            let mut children = JoinSet::new();
            for name in names {
                let entry = SecretEntry::child(&path, &name);
                match entry.kind {
                    EntryKind::Leaf => traversal.leaves.push(entry.path),
                    EntryKind::Directory => {
                        children.spawn(self.clone().walk_dir(entry.path));
                    }
                }
            }

            // Siblings are awaited even after a failure so no task outlives
            // the walk.
            let mut first_error = None;
            while let Some(joined) = children.join_next().await {
                match joined.map_err(WalkError::from).and_then(|result| result) {
                    Ok(subtree) => {
                        if first_error.is_none() {
                            traversal.merge(subtree);
                        }
                    }
                    Err(err) => {
                        if first_error.is_none() {
                            debug!(path, error = %err, "subtree failed");
                            first_error = Some(err);
                        }
                    }
                }
            }

            match first_error {
                Some(err) => Err(err),
                None => Ok(traversal),
            }
        })
    }
}
