//! Hub error types.

use huddle_core::ClientId;

/// Errors returned to producers submitting work to the hub.
#[derive(Debug, thiserror::Error)]
pub enum HubError {
    /// The arbiter task has stopped; nothing will be delivered.
    #[error("hub is not running")]
    Closed,

    /// A connection with this id is already a member.
    #[error("client {0} is already registered")]
    DuplicateClient(ClientId),
}
