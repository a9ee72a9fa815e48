//! Error types shared by the store clients and the traversal core.

use thiserror::Error;
use tokio::task::JoinError;

/// Errors reported by a [`SecretStore`](crate::store::SecretStore).
#[derive(Error, Debug)]
pub enum StoreError {
    /// The store answered with HTTP 403 for this path.
    #[error("permission denied")]
    Forbidden,

    /// The response did not have the shape the store API promises.
    #[error("malformed response: {reason}")]
    Malformed { reason: String },

    /// Any other non-success status.
    #[error("unexpected status {status}: {message}")]
    Status { status: u16, message: String },

    /// The configured server address cannot be used as a base URL.
    #[error("invalid vault address {address}: {reason}")]
    InvalidAddress { address: String, reason: String },

    #[error("request failed")]
    Http(#[from] reqwest::Error),

    #[error("invalid JSON in response")]
    Json(#[from] serde_json::Error),
}

impl StoreError {
    pub fn is_forbidden(&self) -> bool {
        matches!(self, StoreError::Forbidden)
    }
}

/// The admission gate was cancelled before or while the caller waited.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
#[error("operation cancelled")]
pub struct Cancelled;

/// Terminal errors of a traversal.
#[derive(Error, Debug)]
pub enum WalkError {
    #[error("failed to list keys in {path}")]
    List {
        path: String,
        #[source]
        source: StoreError,
    },

    #[error("traversal cancelled")]
    Cancelled,

    /// A child task panicked.
    #[error("traversal task failed")]
    Task(#[from] JoinError),
}

impl From<Cancelled> for WalkError {
    fn from(_: Cancelled) -> Self {
        WalkError::Cancelled
    }
}

/// Errors of the custom metadata commands.
#[derive(Error, Debug)]
pub enum MetadataError {
    #[error("found object without path key")]
    MissingPath,

    #[error("found object with non-string value for path")]
    NonStringPath,

    #[error("secret on path {path} does not exist")]
    NotFound { path: String },

    #[error("failed to access metadata of {path}")]
    Store {
        path: String,
        #[source]
        source: StoreError,
    },

    #[error("metadata request cancelled")]
    Cancelled,

    #[error("metadata task failed")]
    Task(#[from] JoinError),
}

impl From<Cancelled> for MetadataError {
    fn from(_: Cancelled) -> Self {
        MetadataError::Cancelled
    }
}
