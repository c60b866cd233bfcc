//! Wire types for the light-client JSON-RPC protocol.
//!
//! This crate contains the serde-serializable types used for communication
//! with an embedded light client over JSON-RPC 2.0. These types represent the
//! "protocol layer" - the shapes of data as they appear on the wire.
//!
//! # Design Philosophy
//!
//! Types in this crate are:
//! - **Pure data**: No behavior beyond serialization/deserialization
//! - **1:1 with the wire**: Match the JSON-RPC 2.0 envelope exactly
//!
//! Request routing, correlation, and session management are built on top of
//! these types in `lightlink-runtime`.

pub mod message;

pub use message::*;
