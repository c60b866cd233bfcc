//! Scriptable in-process light client for tests.
//!
//! [`MockClient`] implements the [`LightClient`] boundary without any
//! networking: registered chains record every submitted request, and tests
//! inject responses and notifications through a [`MockChain`] control handle.

use crate::client::{AddChainConfig, AddChainFuture, ChainHandle, LightClient};
use crate::error::{Error, Result};
use lightlink_protocol::Request;
use parking_lot::Mutex;
use serde_json::{Value, json};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::sync::mpsc;

struct ChainState {
    sent: Mutex<Vec<String>>,
    fail_submissions: AtomicBool,
    inbound: mpsc::UnboundedSender<String>,
}

/// Light client double. Accepts any chain spec that parses as JSON.
#[derive(Default)]
pub struct MockClient {
    chains: Mutex<Vec<Arc<ChainState>>>,
}

impl MockClient {
    pub fn new() -> Self {
        Self::default()
    }

    /// Control handle for the `index`-th registered chain.
    pub fn chain(&self, index: usize) -> Option<MockChain> {
        self.chains
            .lock()
            .get(index)
            .map(|state| MockChain(Arc::clone(state)))
    }

    pub fn chain_count(&self) -> usize {
        self.chains.lock().len()
    }
}

impl LightClient for MockClient {
    fn add_chain(&self, config: AddChainConfig) -> AddChainFuture<'_> {
        Box::pin(async move {
            serde_json::from_str::<Value>(&config.chain_spec)
                .map_err(|error| Error::ChainRegistration(format!("invalid chain spec: {error}")))?;

            let state = Arc::new(ChainState {
                sent: Mutex::new(Vec::new()),
                fail_submissions: AtomicBool::new(false),
                inbound: config.json_rpc_responses,
            });
            self.chains.lock().push(Arc::clone(&state));
            Ok(Box::new(MockChainHandle { state }) as Box<dyn ChainHandle>)
        })
    }
}

struct MockChainHandle {
    state: Arc<ChainState>,
}

impl ChainHandle for MockChainHandle {
    fn send_json_rpc(&self, request: String) -> Result<()> {
        if self.state.fail_submissions.load(Ordering::SeqCst) {
            return Err(Error::Submission("chain handle rejected the request".to_string()));
        }
        self.state.sent.lock().push(request);
        Ok(())
    }
}

/// Test-side control over one registered chain.
#[derive(Clone)]
pub struct MockChain(Arc<ChainState>);

impl MockChain {
    /// Raw frames submitted so far.
    pub fn sent(&self) -> Vec<String> {
        self.0.sent.lock().clone()
    }

    /// Parsed requests submitted so far.
    pub fn sent_requests(&self) -> Vec<Request> {
        self.0
            .sent
            .lock()
            .iter()
            .filter_map(|raw| serde_json::from_str(raw).ok())
            .collect()
    }

    pub fn last_request(&self) -> Option<Request> {
        self.sent_requests().pop()
    }

    /// Delivers a raw frame on the chain's response stream. Frames delivered
    /// after the session closed are silently discarded, as the real client
    /// does once its channel is gone.
    pub fn deliver(&self, raw: impl Into<String>) {
        let _ = self.0.inbound.send(raw.into());
    }

    pub fn respond(&self, id: u64, result: Value) {
        self.deliver(json!({"jsonrpc": "2.0", "id": id, "result": result}).to_string());
    }

    pub fn respond_error(&self, id: u64, code: i64, message: &str) {
        self.deliver(
            json!({"jsonrpc": "2.0", "id": id, "error": {"code": code, "message": message}})
                .to_string(),
        );
    }

    pub fn notify(&self, method: &str, params: Value) {
        self.deliver(json!({"jsonrpc": "2.0", "method": method, "params": params}).to_string());
    }

    /// Makes subsequent submissions fail synchronously, as a chain that has
    /// already shut down would.
    pub fn fail_submissions(&self, fail: bool) {
        self.0.fail_submissions.store(fail, Ordering::SeqCst);
    }
}
