//! Application-facing bridge over an embedded blockchain light client.
//!
//! A [`Bridge`] owns the session registry for one light client: it registers
//! chains from a specification document, routes outbound JSON-RPC calls to
//! the right chain, and correlates asynchronous responses and notifications
//! back to callers.
//!
//! ```no_run
//! # async fn example(client: std::sync::Arc<dyn lightlink_runtime::LightClient>,
//! #                  chain_spec: &str) -> lightlink::Result<()> {
//! let bridge = lightlink::Bridge::new(client);
//! let session = bridge.open_session(chain_spec).await?;
//! let name = bridge.rpc(session).system_name().await?;
//! println!("connected to {name}");
//! bridge.close_session(session)?;
//! # Ok(())
//! # }
//! ```

pub mod bridge;
pub mod rpc;

pub use bridge::{Bridge, init_global, try_global};
pub use lightlink_protocol::{Message, Notification, Request, Response};
pub use lightlink_runtime::{
    Error, LightClient, NotificationStream, RegistryConfig, Result, SessionId, testing,
};
pub use rpc::ChainRpc;
