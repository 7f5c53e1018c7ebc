//! # huddle-server
//!
//! Real-time fan-out hub: every WebSocket client joins one shared room and
//! every message is broadcast to all members.
//!
//! - [`hub`]: the single arbiter task that owns the member set
//! - [`websocket`]: the upgrade handler and the per-connection reader/writer tasks
//! - [`server`]: axum router, `/health`, `/metrics`, and the serve loop
//! - [`metrics`]: Prometheus recorder and metric names
//!
//! ## Crate Position
//!
//! Depends on `huddle-core`. Sizing comes in as plain values from the binary. Used by the `huddle` binary.

#![deny(unsafe_code)]

pub mod hub;
pub mod metrics;
pub mod server;
pub mod websocket;

pub use hub::{Connection, Hub, HubError, HubHandle};
pub use server::{AppState, router, serve};
