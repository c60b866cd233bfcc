//! Typed convenience wrappers over common chain RPC methods.
//!
//! These cover the well-known Substrate-style queries: node identity, block
//! lookups, and hex-encoded storage reads. Anything else goes through
//! [`Bridge::call_rpc`] directly.

use crate::bridge::Bridge;
use lightlink_runtime::{Error, Result, SessionId};
use serde_json::{Value, json};

/// RPC helpers bound to one session.
pub struct ChainRpc<'a> {
    bridge: &'a Bridge,
    session: SessionId,
}

impl<'a> ChainRpc<'a> {
    pub(crate) fn new(bridge: &'a Bridge, session: SessionId) -> Self {
        Self { bridge, session }
    }

    /// `system_name` - human-readable node implementation name.
    pub async fn system_name(&self) -> Result<String> {
        self.string_call("system_name", vec![]).await
    }

    /// `system_version` - node implementation version.
    pub async fn system_version(&self) -> Result<String> {
        self.string_call("system_version", vec![]).await
    }

    /// `chain_getBlockHash` - hash of the given block number, or of the
    /// latest block when `number` is `None`.
    pub async fn block_hash(&self, number: Option<u64>) -> Result<String> {
        let params = match number {
            Some(number) => vec![json!(number)],
            None => vec![],
        };
        self.string_call("chain_getBlockHash", params).await
    }

    /// `chain_getBlock` - full block by hash, or the latest block when
    /// `hash` is `None`.
    pub async fn block(&self, hash: Option<&str>) -> Result<Value> {
        let params = match hash {
            Some(hash) => vec![json!(hash)],
            None => vec![],
        };
        self.bridge
            .call_rpc(self.session, "chain_getBlock", params)
            .await
    }

    /// `state_getStorage` - raw storage value under `key`, optionally as of
    /// the block `at`. `None` result means the key holds no value.
    pub async fn storage(&self, key: &[u8], at: Option<&str>) -> Result<Option<Vec<u8>>> {
        let mut params = vec![json!(format!("0x{}", hex::encode(key)))];
        if let Some(at) = at {
            params.push(json!(at));
        }

        let value = self
            .bridge
            .call_rpc(self.session, "state_getStorage", params)
            .await?;

        match value {
            Value::Null => Ok(None),
            Value::String(raw) => {
                let bytes = hex::decode(raw.trim_start_matches("0x")).map_err(|error| {
                    Error::Protocol(format!("storage result is not hex: {error}"))
                })?;
                Ok(Some(bytes))
            }
            other => Err(Error::Protocol(format!(
                "expected hex string storage result, got {other}"
            ))),
        }
    }

    async fn string_call(&self, method: &str, params: Vec<Value>) -> Result<String> {
        match self.bridge.call_rpc(self.session, method, params).await? {
            Value::String(value) => Ok(value),
            other => Err(Error::Protocol(format!(
                "expected string result from {method}, got {other}"
            ))),
        }
    }
}
