//! # huddle-core
//!
//! Shared vocabulary for the huddle fan-out hub:
//!
//! - **Client ids**: [`ids::ClientId`] newtype, generated once per connection
//! - **Wire format**: [`envelope::Envelope`] with `sender`/`recipient`/`content`
//! - **Notices**: [`envelope::Envelope::connected`] and [`envelope::Envelope::disconnected`]
//! - **Logging**: [`logging::init_subscriber`] for the `tracing` stack
//!
//! ## Crate Position
//!
//! Foundation crate. Depended on by `huddle-server` and the `huddle` binary.

#![deny(unsafe_code)]

pub mod envelope;
pub mod ids;
pub mod logging;

pub use envelope::{Envelope, EnvelopeError};
pub use ids::ClientId;
