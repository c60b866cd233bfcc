//! Lightlink runtime - client lifecycle, correlation, and session registry.
//!
//! This crate turns a callback-based light client into a request/response
//! shaped interface:
//!
//! - **Client boundary**: traits the embedded light client implements
//! - **Correlator**: request-id allocation and pending-completion bookkeeping
//! - **Session**: one registered chain, its pending table, its notifications
//! - **Registry**: process-wide table of active sessions
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────┐
//! │  lightlink  │  Bridge facade, typed RPC helpers
//! └──────┬──────┘
//! ┌──────▼──────┐
//! │   runtime   │  This crate
//! │  ┌────────┐ │
//! │  │Registry│ │  SessionId -> ChainSession
//! │  └────────┘ │
//! │  ┌────────┐ │
//! │  │Session │ │  JSON-RPC correlation + notification fan-out
//! │  └────────┘ │
//! │  ┌────────┐ │
//! │  │ Client │ │  LightClient / ChainHandle boundary traits
//! │  └────────┘ │
//! └─────────────┘
//! ```
//!
//! The light client itself (peer discovery, sync, proof verification) lives
//! behind the [`LightClient`] trait and is never implemented here.

pub mod client;
pub mod correlator;
pub mod error;
pub mod registry;
pub mod session;
pub mod testing;

pub use client::{AddChainConfig, AddChainFuture, ChainHandle, LightClient};
pub use correlator::RequestCorrelator;
pub use error::{Error, Result};
pub use registry::{RegistryConfig, SessionId, SessionRegistry};
pub use session::{ChainSession, NotificationStream};
