//! The arbiter: sole owner of the member set.
//!
//! ## Submodules
//!
//! | Module | Purpose |
//! |--------|---------|
//! | `arbiter` | [`Hub`] loop: registration, unregistration, broadcast, fan-out |
//! | `handle` | [`HubHandle`]: cloneable producer side of the hub's channels |
//! | `connection` | [`Connection`]: client id plus the sending half of its outbound queue |
//! | `errors` | [`HubError`] |
//!
//! ## Ownership
//!
//! ```text
//! upgrade ──register──►┐
//! reader ──broadcast──►├──► Hub (members) ──try_send──► outbound queue ──► writer
//! reader guard ─unreg─►┘
//! ```
//!
//! The hub holds the only `Sender` of every outbound queue, so closing a
//! queue is dropping its [`Connection`], which happens exactly once when the
//! connection leaves the map.

mod arbiter;
mod connection;
mod errors;
mod handle;

pub use arbiter::Hub;
pub use connection::{Connection, Delivery, OutboundFrame};
pub use errors::HubError;
pub use handle::{HubHandle, UnregisterGuard};
