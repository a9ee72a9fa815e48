//! Admission control for remote store requests.
//!
//! The [`AdmissionGate`] caps how many requests are in flight at once. It
//! limits requests only: any number of tasks may be waiting on it.

use std::sync::atomic::{AtomicUsize, Ordering};
use tokio::sync::{Semaphore, SemaphorePermit, watch};

use crate::error::Cancelled;

/// Default number of simultaneous requests.
pub const DEFAULT_CONCURRENCY: usize = 10;

/// Counting gate with a fixed capacity and a cancellation signal.
pub struct AdmissionGate {
    semaphore: Semaphore,
    capacity: usize,
    holders: AtomicUsize,
    peak: AtomicUsize,
    cancel_tx: watch::Sender<bool>,
}

/// A reserved slot. Dropping it returns the slot to the gate.
pub struct Permit<'a> {
    _permit: SemaphorePermit<'a>,
    holders: &'a AtomicUsize,
}

impl Drop for Permit<'_> {
    fn drop(&mut self) {
        // Runs before the semaphore permit is released.
        self.holders.fetch_sub(1, Ordering::SeqCst);
    }
}

impl AdmissionGate {
    /// Create a gate admitting `capacity` holders at once. A capacity of zero
    /// is raised to one.
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.clamp(1, Semaphore::MAX_PERMITS);
        let (cancel_tx, _) = watch::channel(false);
        Self {
            semaphore: Semaphore::new(capacity),
            capacity,
            holders: AtomicUsize::new(0),
            peak: AtomicUsize::new(0),
            cancel_tx,
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Wait for a free slot.
    ///
    /// Fails with [`Cancelled`] if the gate is cancelled before a slot is
    /// granted.
    pub async fn acquire(&self) -> Result<Permit<'_>, Cancelled> {
        if self.is_cancelled() {
            return Err(Cancelled);
        }
        let permit = self.semaphore.acquire().await.map_err(|_| Cancelled)?;

        let current = self.holders.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak.fetch_max(current, Ordering::SeqCst);

        Ok(Permit {
            _permit: permit,
            holders: &self.holders,
        })
    }

    /// Cancel the gate. Pending and future acquires fail, and every
    /// [`cancelled`](Self::cancelled) future resolves.
    pub fn cancel(&self) {
        self.cancel_tx.send_replace(true);
        self.semaphore.close();
    }

    pub fn is_cancelled(&self) -> bool {
        *self.cancel_tx.borrow()
    }

    /// Resolves once the gate has been cancelled.
    pub async fn cancelled(&self) {
        let mut rx = self.cancel_tx.subscribe();
        // The sender lives as long as `self`, so this only returns on cancel.
        let _ = rx.wait_for(|cancelled| *cancelled).await;
    }

    /// Number of permits currently held.
    pub fn holders(&self) -> usize {
        self.holders.load(Ordering::SeqCst)
    }

    /// Highest number of permits ever held at once.
    pub fn peak(&self) -> usize {
        self.peak.load(Ordering::SeqCst)
    }
}
