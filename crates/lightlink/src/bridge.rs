//! Bridge facade and process-wide initialization.

use crate::rpc::ChainRpc;
use lightlink_runtime::{
    LightClient, NotificationStream, RegistryConfig, Result, SessionId, SessionRegistry,
};
use serde_json::Value;
use std::sync::{Arc, OnceLock};

/// Request/response interface over one light client.
///
/// Thin wrapper around the session registry; all correlation and lifecycle
/// logic lives in `lightlink-runtime`.
pub struct Bridge {
    registry: SessionRegistry,
}

impl Bridge {
    pub fn new(client: Arc<dyn LightClient>) -> Self {
        Self {
            registry: SessionRegistry::new(client),
        }
    }

    pub fn with_config(client: Arc<dyn LightClient>, config: RegistryConfig) -> Self {
        Self {
            registry: SessionRegistry::with_config(client, config),
        }
    }

    /// Registers a chain from its specification document and returns the
    /// session id to address it by.
    pub async fn open_session(&self, chain_spec: &str) -> Result<SessionId> {
        self.registry.open(chain_spec).await
    }

    /// Submits a JSON-RPC call against the session's chain and suspends
    /// until the response arrives.
    pub async fn call_rpc(
        &self,
        session: SessionId,
        method: &str,
        params: Vec<Value>,
    ) -> Result<Value> {
        self.registry.call(session, method, params).await
    }

    /// Returns a fresh stream of the chain's unsolicited notifications,
    /// starting from now and ending when the session closes.
    pub fn subscribe_notifications(&self, session: SessionId) -> Result<NotificationStream> {
        self.registry.subscribe_notifications(session)
    }

    /// Closes the session, rejecting its pending calls.
    pub fn close_session(&self, session: SessionId) -> Result<()> {
        self.registry.close(session)
    }

    /// Typed RPC helpers bound to one session.
    pub fn rpc(&self, session: SessionId) -> ChainRpc<'_> {
        ChainRpc::new(self, session)
    }

    pub fn session_count(&self) -> usize {
        self.registry.session_count()
    }
}

static GLOBAL: OnceLock<Bridge> = OnceLock::new();

/// Initializes the process-wide bridge on first call and returns it.
///
/// Later calls return the already-initialized bridge and ignore their
/// arguments; state changes only here, never as a module side effect.
pub fn init_global(client: Arc<dyn LightClient>, config: RegistryConfig) -> &'static Bridge {
    GLOBAL.get_or_init(|| Bridge::with_config(client, config))
}

/// Returns the process-wide bridge if [`init_global`] has run.
pub fn try_global() -> Option<&'static Bridge> {
    GLOBAL.get()
}
