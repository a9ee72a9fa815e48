use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use crate::error::StoreError;
use crate::models::CustomMetadata;

use super::SecretStore;

#[derive(Clone, Debug)]
enum Response {
    Keys(Vec<String>),
    Forbidden,
    Err(String),
    Malformed(String),
    Hang,
}

/// In-memory store. Paths without a configured listing answer like a leaf.
#[derive(Clone, Default)]
pub struct MockSecretStore {
    inner: Arc<Mutex<Inner>>,
    in_flight: Arc<AtomicUsize>,
    peak_in_flight: Arc<AtomicUsize>,
}

#[derive(Default)]
struct Inner {
    listings: HashMap<String, Response>,
    metadata: HashMap<String, CustomMetadata>,
    calls: Vec<String>,
    writes: Vec<(String, CustomMetadata)>,
}

struct InFlight<'a> {
    counter: &'a AtomicUsize,
}

impl<'a> InFlight<'a> {
    fn enter(counter: &'a AtomicUsize, peak: &AtomicUsize) -> Self {
        let current = counter.fetch_add(1, Ordering::SeqCst) + 1;
        peak.fetch_max(current, Ordering::SeqCst);
        Self { counter }
    }
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.counter.fetch_sub(1, Ordering::SeqCst);
    }
}

impl MockSecretStore {
    pub fn set_keys<I, K>(&self, dir: impl Into<String>, keys: I)
    where
        I: IntoIterator<Item = K>,
        K: Into<String>,
    {
        let keys = keys.into_iter().map(Into::into).collect();
        self.set_response(dir, Response::Keys(keys));
    }

    pub fn set_forbidden(&self, dir: impl Into<String>) {
        self.set_response(dir, Response::Forbidden);
    }

    pub fn set_error(&self, dir: impl Into<String>, message: impl Into<String>) {
        self.set_response(dir, Response::Err(message.into()));
    }

    pub fn set_malformed(&self, dir: impl Into<String>, reason: impl Into<String>) {
        self.set_response(dir, Response::Malformed(reason.into()));
    }

    /// Make listing `dir` never complete.
    pub fn set_hang(&self, dir: impl Into<String>) {
        self.set_response(dir, Response::Hang);
    }

    pub fn set_metadata(&self, path: impl Into<String>, metadata: CustomMetadata) {
        let mut inner = self.inner.lock().expect("mock store lock");
        inner.metadata.insert(path.into(), metadata);
    }

    pub fn calls(&self) -> Vec<String> {
        let inner = self.inner.lock().expect("mock store lock");
        inner.calls.clone()
    }

    pub fn writes(&self) -> Vec<(String, CustomMetadata)> {
        let inner = self.inner.lock().expect("mock store lock");
        inner.writes.clone()
    }

    /// Highest number of store calls observed running at the same time.
    pub fn peak_in_flight(&self) -> usize {
        self.peak_in_flight.load(Ordering::SeqCst)
    }

    fn set_response(&self, dir: impl Into<String>, response: Response) {
        let mut inner = self.inner.lock().expect("mock store lock");
        inner.listings.insert(dir.into(), response);
    }

    fn record_call(&self, path: &str) -> Option<Response> {
        let mut inner = self.inner.lock().expect("mock store lock");
        inner.calls.push(path.to_owned());
        inner.listings.get(path).cloned()
    }

    // Long enough for sibling calls to overlap.
    async fn latency() {
        tokio::time::sleep(Duration::from_millis(2)).await;
    }
}

#[async_trait]
impl SecretStore for MockSecretStore {
    async fn list_children(&self, path: &str) -> Result<Option<Vec<String>>, StoreError> {
        let _in_flight = InFlight::enter(&self.in_flight, &self.peak_in_flight);
        let response = self.record_call(path);
        Self::latency().await;

        match response {
            None => Ok(None),
            Some(Response::Keys(keys)) => Ok(Some(keys)),
            Some(Response::Forbidden) => Err(StoreError::Forbidden),
            Some(Response::Err(message)) => Err(StoreError::Status {
                status: 500,
                message,
            }),
            Some(Response::Malformed(reason)) => Err(StoreError::Malformed { reason }),
            Some(Response::Hang) => std::future::pending().await,
        }
    }

    async fn read_custom_metadata(
        &self,
        path: &str,
    ) -> Result<Option<CustomMetadata>, StoreError> {
        let _in_flight = InFlight::enter(&self.in_flight, &self.peak_in_flight);
        let response = self.record_call(path);
        Self::latency().await;

        match response {
            Some(Response::Forbidden) => return Err(StoreError::Forbidden),
            Some(Response::Err(message)) => {
                return Err(StoreError::Status {
                    status: 500,
                    message,
                });
            }
            Some(Response::Hang) => std::future::pending().await,
            _ => {}
        }

        let inner = self.inner.lock().expect("mock store lock");
        Ok(inner.metadata.get(path).cloned())
    }

    async fn write_custom_metadata(
        &self,
        path: &str,
        metadata: CustomMetadata,
    ) -> Result<(), StoreError> {
        let mut inner = self.inner.lock().expect("mock store lock");
        if let Some(Response::Forbidden) = inner.listings.get(path) {
            return Err(StoreError::Forbidden);
        }
        inner.writes.push((path.to_owned(), metadata.clone()));
        inner.metadata.insert(path.to_owned(), metadata);
        Ok(())
    }
}
