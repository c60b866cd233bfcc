//! Boundary traits for the embedded light client.
//!
//! The light client is an external collaborator exposing two capabilities:
//! register a chain given a specification, and submit serialized JSON-RPC
//! requests against a registered chain. Everything the client emits for a
//! chain (responses and unsolicited notifications) arrives on the channel
//! supplied at registration time.

use crate::error::Result;
use std::future::Future;
use std::pin::Pin;
use tokio::sync::mpsc;

/// Configuration for registering one chain with the light client.
pub struct AddChainConfig {
    /// Chain specification document (genesis + network parameters), opaque
    /// to this crate.
    pub chain_spec: String,
    /// Sender the client pushes every JSON-RPC response or notification
    /// string into. One stream per chain.
    pub json_rpc_responses: mpsc::UnboundedSender<String>,
}

/// Future resolving to a registered chain handle.
pub type AddChainFuture<'a> = Pin<Box<dyn Future<Output = Result<Box<dyn ChainHandle>>> + Send + 'a>>;

/// A light client capable of registering chains.
///
/// One process-wide instance; registration is the only mutating operation.
pub trait LightClient: Send + Sync {
    /// Registers a chain and returns a handle that can submit requests.
    ///
    /// Fails with [`crate::Error::ChainRegistration`] if the client rejects
    /// the specification (malformed spec, duplicate genesis, resource
    /// exhaustion).
    fn add_chain(&self, config: AddChainConfig) -> AddChainFuture<'_>;
}

/// Handle to one registered chain.
pub trait ChainHandle: Send + Sync {
    /// Submits a serialized JSON-RPC request. Fire-and-forget: delivery
    /// failures surface on the response stream or as a synchronous
    /// [`crate::Error::Submission`] rejection.
    fn send_json_rpc(&self, request: String) -> Result<()>;
}
