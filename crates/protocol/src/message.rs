//! JSON-RPC 2.0 envelope types.
//!
//! A light client emits two kinds of inbound messages on a chain's response
//! stream: responses (carry an `id` correlating to a request) and
//! notifications (no `id`, carry `method`/`params` instead). Outbound traffic
//! is always a [`Request`].

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Protocol version carried in every envelope.
pub const JSONRPC_VERSION: &str = "2.0";

fn version() -> String {
    JSONRPC_VERSION.to_string()
}

/// Outbound JSON-RPC request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Request {
    /// Always `"2.0"`.
    #[serde(default = "version")]
    pub jsonrpc: String,
    /// Request ID, unique among in-flight requests on one chain.
    pub id: u64,
    /// Method name to invoke (e.g. `system_name`).
    pub method: String,
    /// Positional parameters.
    #[serde(default)]
    pub params: Vec<Value>,
}

impl Request {
    /// Creates a request envelope with the protocol version filled in.
    pub fn new(id: u64, method: impl Into<String>, params: Vec<Value>) -> Self {
        Self {
            jsonrpc: version(),
            id,
            method: method.into(),
            params,
        }
    }
}

/// Inbound response correlating to a previously submitted request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Response {
    #[serde(default = "version")]
    pub jsonrpc: String,
    /// Request ID this response correlates to.
    pub id: u64,
    /// Success result (mutually exclusive with `error`).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<Value>,
    /// Error result (mutually exclusive with `result`).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<ErrorPayload>,
}

/// RPC-level error details.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorPayload {
    pub code: i64,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
}

/// Inbound message with no correlating request (e.g. a subscription update).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Notification {
    #[serde(default = "version")]
    pub jsonrpc: String,
    /// Notification method name (e.g. `state_storage`).
    pub method: String,
    /// Notification payload.
    #[serde(default)]
    pub params: Value,
}

/// Discriminated union of inbound messages.
///
/// Presence of `id` makes a message response-shaped; `method` without `id`
/// makes it a notification. Anything else falls into the forward-compatible
/// `Unknown` arm.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Message {
    /// Response message (has `id` field).
    Response(Response),
    /// Notification message (no `id` field).
    Notification(Notification),
    /// Unknown message shape (forward-compatible catch-all).
    Unknown(Value),
}
