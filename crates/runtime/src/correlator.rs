//! Request-id allocation and pending-completion bookkeeping.
//!
//! Each [`crate::ChainSession`] owns one correlator. The correlator maps an
//! outbound request id to the oneshot sender a suspended caller is waiting
//! on, and completes it exactly once when the matching inbound message
//! arrives. Per-request state machine: `Pending -> Resolved`,
//! `Pending -> Rejected`, or `Pending -> Cancelled` on session close. A
//! completion attempt on an id with no pending entry is a protocol anomaly:
//! logged and ignored, never fatal.

use crate::error::{Error, Result};
use parking_lot::Mutex;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::sync::oneshot;

type PendingMap = HashMap<u64, oneshot::Sender<Result<Value>>>;

/// Tracks outstanding requests for one chain session.
pub struct RequestCorrelator {
    /// Sequential request id counter.
    next_id: AtomicU64,
    /// Pending completions keyed by request id.
    pending: Mutex<PendingMap>,
}

impl RequestCorrelator {
    pub fn new() -> Self {
        Self {
            next_id: AtomicU64::new(1),
            pending: Mutex::new(HashMap::new()),
        }
    }

    /// Returns an id unique among currently-outstanding ids.
    ///
    /// Monotonic; after wraparound, ids still pending (and 0) are skipped so
    /// no two in-flight requests ever share an id.
    pub fn allocate(&self) -> u64 {
        loop {
            let id = self.next_id.fetch_add(1, Ordering::Relaxed);
            if id != 0 && !self.pending.lock().contains_key(&id) {
                return id;
            }
        }
    }

    /// Records a pending completion for `id`.
    ///
    /// Fails with [`Error::DuplicateRequestId`] if `id` is already pending.
    pub fn register(&self, id: u64, sender: oneshot::Sender<Result<Value>>) -> Result<()> {
        use std::collections::hash_map::Entry;

        match self.pending.lock().entry(id) {
            Entry::Occupied(_) => Err(Error::DuplicateRequestId(id)),
            Entry::Vacant(slot) => {
                slot.insert(sender);
                Ok(())
            }
        }
    }

    /// Completes and removes the pending entry for `id`.
    ///
    /// Returns `false` when `id` has no pending entry - the message arrived
    /// after a timeout, a close, or a duplicate resolution. That is logged
    /// as an anomaly and otherwise ignored.
    pub fn complete(&self, id: u64, outcome: Result<Value>) -> bool {
        let Some(sender) = self.pending.lock().remove(&id) else {
            tracing::warn!(id, "response correlates to no pending request; dropped");
            return false;
        };

        if sender.send(outcome).is_err() {
            tracing::debug!(id, "caller abandoned request before completion");
        }
        true
    }

    /// Removes the pending entry for `id` without completing it.
    ///
    /// Used when the caller stops waiting (timeout, dropped call future).
    pub fn forget(&self, id: u64) -> bool {
        self.pending.lock().remove(&id).is_some()
    }

    /// Rejects every pending request with [`Error::SessionClosed`].
    pub fn drain(&self) {
        let drained: Vec<_> = {
            let mut pending = self.pending.lock();
            pending.drain().collect()
        };

        for (id, sender) in drained {
            tracing::debug!(id, "rejecting pending request on session close");
            let _ = sender.send(Err(Error::SessionClosed));
        }
    }

    /// Number of currently-outstanding requests.
    pub fn pending_len(&self) -> usize {
        self.pending.lock().len()
    }
}

impl Default for RequestCorrelator {
    fn default() -> Self {
        Self::new()
    }
}
