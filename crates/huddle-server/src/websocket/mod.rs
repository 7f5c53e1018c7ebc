//! WebSocket entry point and per-connection tasks.
//!
//! ## Submodules
//!
//! | Module | Purpose |
//! |--------|---------|
//! | `connection` | Upgrade handler: build the [`Connection`](crate::hub::Connection), register it, spawn both tasks |
//! | `reader` | Inbound frames → envelopes → hub broadcast inbox; unregisters on exit |
//! | `writer` | Outbound queue → frames; sends a close frame once the hub closes the queue |
//!
//! ## Data Flow
//!
//! `connection` → hub registration → `reader` + `writer` spawned.
//! `reader` → hub → every member's queue → that member's `writer`.

pub mod connection;
pub mod reader;
pub mod writer;

pub use connection::{ConnectionTasks, attach, serve_socket, ws_upgrade};
pub use reader::read_loop;
pub use writer::write_loop;
