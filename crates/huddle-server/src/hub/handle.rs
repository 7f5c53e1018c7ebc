//! Producer side of the hub's channels.

use huddle_core::{ClientId, Envelope};
use tokio::sync::{mpsc, oneshot};
use tracing::debug;

use super::connection::Connection;
use super::errors::HubError;

/// A connection waiting to join, with the channel the hub acknowledges on.
pub(super) struct Registration {
    pub(super) connection: Connection,
    pub(super) applied: oneshot::Sender<Result<(), HubError>>,
}

/// Read-only questions answered from inside the hub loop.
pub(super) enum Query {
    Members(oneshot::Sender<Vec<ClientId>>),
    Count(oneshot::Sender<usize>),
}

/// Cloneable handle for submitting events to a running [`Hub`](super::Hub).
///
/// Held by the upgrade handler and by every reader task. The hub stops once
/// every handle (and every [`UnregisterGuard`]) has been dropped.
#[derive(Clone, Debug)]
pub struct HubHandle {
    registrations: mpsc::Sender<Registration>,
    unregistrations: mpsc::UnboundedSender<ClientId>,
    inbound: mpsc::Sender<Envelope>,
    queries: mpsc::Sender<Query>,
}

impl HubHandle {
    pub(super) fn new(
        registrations: mpsc::Sender<Registration>,
        unregistrations: mpsc::UnboundedSender<ClientId>,
        inbound: mpsc::Sender<Envelope>,
        queries: mpsc::Sender<Query>,
    ) -> Self {
        Self {
            registrations,
            unregistrations,
            inbound,
            queries,
        }
    }

    /// Hand a connection to the hub and wait until it is a member.
    ///
    /// Returning only after the hub has applied the registration means a
    /// reader spawned afterwards can never have its first message fanned out
    /// before its own connection joined.
    pub async fn register(&self, connection: Connection) -> Result<(), HubError> {
        let (applied, ack) = oneshot::channel();
        self.registrations
            .send(Registration {
                connection,
                applied,
            })
            .await
            .map_err(|_| HubError::Closed)?;
        ack.await.map_err(|_| HubError::Closed)?
    }

    /// Ask the hub to remove `id`. Removing a non-member is a no-op.
    ///
    /// Never waits, so it can run from `Drop`.
    pub fn unregister(&self, id: ClientId) -> Result<(), HubError> {
        self.unregistrations.send(id).map_err(|_| HubError::Closed)
    }

    /// Submit an envelope for fan-out to every member, sender included.
    ///
    /// Waits while the broadcast inbox is full.
    pub async fn broadcast(&self, envelope: Envelope) -> Result<(), HubError> {
        self.inbound
            .send(envelope)
            .await
            .map_err(|_| HubError::Closed)
    }

    /// Snapshot of current member ids, sorted.
    pub async fn members(&self) -> Result<Vec<ClientId>, HubError> {
        let (tx, rx) = oneshot::channel();
        self.queries
            .send(Query::Members(tx))
            .await
            .map_err(|_| HubError::Closed)?;
        rx.await.map_err(|_| HubError::Closed)
    }

    /// Number of current members.
    pub async fn member_count(&self) -> Result<usize, HubError> {
        let (tx, rx) = oneshot::channel();
        self.queries
            .send(Query::Count(tx))
            .await
            .map_err(|_| HubError::Closed)?;
        rx.await.map_err(|_| HubError::Closed)
    }

    /// Guard that unregisters `id` when dropped.
    pub fn unregister_on_drop(&self, id: ClientId) -> UnregisterGuard {
        UnregisterGuard {
            id,
            unregistrations: self.unregistrations.clone(),
        }
    }
}

/// Submits an unregistration when dropped, whatever path the owner exits by.
#[derive(Debug)]
pub struct UnregisterGuard {
    id: ClientId,
    unregistrations: mpsc::UnboundedSender<ClientId>,
}

impl UnregisterGuard {
    /// Id this guard will unregister.
    pub fn id(&self) -> &ClientId {
        &self.id
    }
}

impl Drop for UnregisterGuard {
    fn drop(&mut self) {
        if self.unregistrations.send(self.id.clone()).is_err() {
            debug!(client_id = %self.id, "hub already stopped, skipping unregister");
        }
    }
}
