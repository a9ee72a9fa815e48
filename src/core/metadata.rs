//! Reading and writing custom metadata of individual secrets.

use std::sync::Arc;

use serde_json::Value;
use tokio::task::JoinSet;
use tracing::{debug, info};

use crate::core::AdmissionGate;
use crate::error::MetadataError;
use crate::models::{CustomMetadata, PATH_KEY};
use crate::store::SecretStore;

/// Fetch the custom metadata of every path, at most the gate's capacity at a
/// time.
///
/// Each returned record carries its secret path under [`PATH_KEY`]. Records
/// are in the order of `paths`. A single failure fails the call once all
/// requests have finished.
pub async fn get_custom_metadata<S: SecretStore + 'static>(
    store: Arc<S>,
    gate: Arc<AdmissionGate>,
    paths: Vec<String>,
) -> Result<Vec<CustomMetadata>, MetadataError> {
    let mut records: Vec<Option<CustomMetadata>> = vec![None; paths.len()];
    let mut tasks = JoinSet::new();

    for (index, path) in paths.into_iter().enumerate() {
        let store = Arc::clone(&store);
        let gate = Arc::clone(&gate);
        tasks.spawn(async move { (index, fetch_record(store.as_ref(), &gate, path).await) });
    }

    let mut first_error = None;
    while let Some(joined) = tasks.join_next().await {
        match joined {
            Ok((index, Ok(record))) => records[index] = Some(record),
            Ok((_, Err(err))) => {
                first_error.get_or_insert(err);
            }
            Err(err) => {
                first_error.get_or_insert(MetadataError::from(err));
            }
        }
    }

    match first_error {
        Some(err) => Err(err),
        None => Ok(records.into_iter().flatten().collect()),
    }
}

async fn fetch_record<S: SecretStore>(
    store: &S,
    gate: &AdmissionGate,
    path: String,
) -> Result<CustomMetadata, MetadataError> {
    let permit = gate.acquire().await?;
    debug!(path = path.as_str(), "reading custom metadata");
    let metadata = tokio::select! {
        biased;
        () = gate.cancelled() => return Err(MetadataError::Cancelled),
        result = store.read_custom_metadata(&path) => result,
    };
    drop(permit);

    let mut record = match metadata {
        Ok(Some(record)) => record,
        Ok(None) => return Err(MetadataError::NotFound { path }),
        Err(source) => return Err(MetadataError::Store { path, source }),
    };
    record.insert(PATH_KEY.to_owned(), Value::String(path));
    Ok(record)
}

/// Apply custom metadata records in order, stopping at the first failure.
///
/// Every record names its secret under [`PATH_KEY`]; the remaining keys
/// replace that secret's custom metadata. Returns the number of secrets
/// updated.
pub async fn set_custom_metadata<S: SecretStore>(
    store: &S,
    records: Vec<CustomMetadata>,
) -> Result<usize, MetadataError> {
    let mut updated = 0;

    for mut record in records {
        let path = match record.remove(PATH_KEY) {
            Some(Value::String(path)) => path,
            Some(_) => return Err(MetadataError::NonStringPath),
            None => return Err(MetadataError::MissingPath),
        };

        let existing = store
            .read_custom_metadata(&path)
            .await
            .map_err(|source| MetadataError::Store {
                path: path.clone(),
                source,
            })?;
        if existing.is_none() {
            return Err(MetadataError::NotFound { path });
        }

        store
            .write_custom_metadata(&path, record)
            .await
            .map_err(|source| MetadataError::Store {
                path: path.clone(),
                source,
            })?;
        info!(path = path.as_str(), "updated custom metadata");
        updated += 1;
    }

    Ok(updated)
}
