//! Error types for the lightlink runtime.

use crate::registry::SessionId;
use serde_json::Value;
use std::time::Duration;
use thiserror::Error;

/// Result type alias for runtime operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in the lightlink runtime.
#[derive(Debug, Error)]
pub enum Error {
    /// The light client rejected the chain specification.
    #[error("Chain registration rejected: {0}")]
    ChainRegistration(String),

    /// The chain handle refused the request synchronously.
    #[error("Request submission failed: {0}")]
    Submission(String),

    /// No response arrived within the configured window.
    #[error("Timed out after {0:?} waiting for a response")]
    Timeout(Duration),

    /// Operation issued against (or during teardown of) a closed session.
    #[error("Session is closed")]
    SessionClosed,

    /// Registry miss on a mutating operation.
    #[error("Unknown session: {0}")]
    UnknownSession(SessionId),

    /// A request id was registered while already pending. Defensive
    /// invariant; correct allocation never produces this.
    #[error("Duplicate request id: {0}")]
    DuplicateRequestId(u64),

    /// RPC-level error delivered by the chain.
    #[error("RPC error {code}: {message}")]
    Rpc {
        code: i64,
        message: String,
        data: Option<Value>,
    },

    /// Protocol-level error (unexpected message shape or content).
    #[error("Protocol error: {0}")]
    Protocol(String),

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// A completion channel closed without delivering a value.
    #[error("Channel closed unexpectedly")]
    ChannelClosed,
}

impl Error {
    /// Returns true if this is a timeout error.
    pub fn is_timeout(&self) -> bool {
        matches!(self, Error::Timeout(_))
    }

    /// Returns true if the session (or its registry entry) is gone.
    pub fn is_closed(&self) -> bool {
        matches!(self, Error::SessionClosed | Error::UnknownSession(_))
    }

    /// Returns the RPC error code if this is an RPC-level error.
    pub fn rpc_code(&self) -> Option<i64> {
        match self {
            Error::Rpc { code, .. } => Some(*code),
            _ => None,
        }
    }
}
