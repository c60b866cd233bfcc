//! Process-wide table of active chain sessions.
//!
//! The registry is the single point of truth mapping external session
//! identifiers to [`ChainSession`] instances, and the only place
//! process-wide state changes: everything else is routing logic over data
//! owned by one session.

use crate::client::{AddChainConfig, LightClient};
use crate::error::{Error, Result};
use crate::session::{ChainSession, NotificationStream};
use dashmap::DashMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;
use tokio::sync::mpsc;

/// Opaque identifier for one chain session, unique for process lifetime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SessionId(u64);

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Registry-level configuration.
#[derive(Debug, Clone, Default)]
pub struct RegistryConfig {
    /// Per-call response deadline. `None` means calls wait indefinitely;
    /// the underlying client offers no cancellation primitive of its own.
    pub call_timeout: Option<Duration>,
}

impl RegistryConfig {
    pub fn with_call_timeout(mut self, timeout: Duration) -> Self {
        self.call_timeout = Some(timeout);
        self
    }
}

/// Maps session ids to their [`ChainSession`] and drives chain registration
/// against the one process-wide light client.
pub struct SessionRegistry {
    client: Arc<dyn LightClient>,
    sessions: DashMap<SessionId, Arc<ChainSession>>,
    next_session_id: AtomicU64,
    config: RegistryConfig,
}

impl SessionRegistry {
    pub fn new(client: Arc<dyn LightClient>) -> Self {
        Self::with_config(client, RegistryConfig::default())
    }

    pub fn with_config(client: Arc<dyn LightClient>, config: RegistryConfig) -> Self {
        Self {
            client,
            sessions: DashMap::new(),
            next_session_id: AtomicU64::new(1),
            config,
        }
    }

    /// Registers a chain with the light client and opens a session for it.
    ///
    /// Fails with [`Error::ChainRegistration`] if the client rejects the
    /// specification.
    pub async fn open(&self, chain_spec: &str) -> Result<SessionId> {
        let (inbound_tx, inbound_rx) = mpsc::unbounded_channel();
        let handle = self
            .client
            .add_chain(AddChainConfig {
                chain_spec: chain_spec.to_owned(),
                json_rpc_responses: inbound_tx,
            })
            .await?;

        let session = Arc::new(ChainSession::new(handle, self.config.call_timeout));
        session.spawn_reader(inbound_rx);

        let id = SessionId(self.next_session_id.fetch_add(1, Ordering::Relaxed));
        self.sessions.insert(id, session);
        tracing::info!(session = %id, "chain session opened");
        Ok(id)
    }

    /// Non-failing lookup. Absence means the caller used a stale or unknown
    /// id - a normal outcome, not an error by itself.
    pub fn lookup(&self, id: SessionId) -> Option<Arc<ChainSession>> {
        self.sessions.get(&id).map(|entry| Arc::clone(entry.value()))
    }

    /// Routes one call to the session's chain.
    pub async fn call(&self, id: SessionId, method: &str, params: Vec<Value>) -> Result<Value> {
        let session = self.lookup(id).ok_or(Error::UnknownSession(id))?;
        session.call(method, params).await
    }

    /// Returns a fresh notification stream for the session.
    pub fn subscribe_notifications(&self, id: SessionId) -> Result<NotificationStream> {
        let session = self.lookup(id).ok_or(Error::UnknownSession(id))?;
        Ok(session.subscribe())
    }

    /// Removes the session, rejecting all its pending requests and releasing
    /// the underlying chain handle.
    ///
    /// Fails with [`Error::UnknownSession`] if `id` is not present - closing
    /// twice reports that, never an unhandled fault.
    pub fn close(&self, id: SessionId) -> Result<()> {
        let (_, session) = self
            .sessions
            .remove(&id)
            .ok_or(Error::UnknownSession(id))?;
        session.close();
        tracing::info!(session = %id, "chain session closed");
        Ok(())
    }

    /// Number of currently-open sessions.
    pub fn session_count(&self) -> usize {
        self.sessions.len()
    }
}

impl Drop for SessionRegistry {
    /// Closes any sessions still open so their reader tasks, chain handles,
    /// and pending requests are released with the registry.
    fn drop(&mut self) {
        for entry in self.sessions.iter() {
            entry.value().close();
        }
    }
}
