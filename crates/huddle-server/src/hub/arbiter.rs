//! Single-task arbiter owning the member set.
//!
//! Every change to membership happens inside [`Hub::run`], one event at a
//! time. Fan-out iterates the map and evicts members whose queue is full in
//! the same pass; this is sound only because nothing else can touch the map.

use std::collections::HashMap;
use std::collections::hash_map::Entry;
use std::sync::Arc;

use ::metrics::{counter, gauge};
use huddle_core::{ClientId, Envelope};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, info, trace, warn};

use super::connection::{Connection, Delivery, OutboundFrame};
use super::errors::HubError;
use super::handle::{HubHandle, Query, Registration};
use crate::metrics::{
    WS_CONNECTIONS_ACTIVE, WS_CONNECTIONS_TOTAL, WS_DISCONNECTIONS_TOTAL, WS_EVICTIONS_TOTAL,
    WS_MESSAGES_TOTAL, WS_SERIALIZATION_ERRORS_TOTAL,
};

/// Capacity of the read-only query channel.
const QUERY_CAPACITY: usize = 16;

/// Outcome of one fan-out pass.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
struct FanOut {
    delivered: usize,
    evicted: usize,
}

/// The arbiter.
///
/// Build with [`Hub::new`] (or [`Hub::spawn`]) and drive with [`Hub::run`].
/// All interaction goes through the returned [`HubHandle`].
pub struct Hub {
    members: HashMap<ClientId, Connection>,
    registrations: mpsc::Receiver<Registration>,
    unregistrations: mpsc::UnboundedReceiver<ClientId>,
    inbound: mpsc::Receiver<Envelope>,
    queries: mpsc::Receiver<Query>,
}

impl Hub {
    /// Create a hub and its handle.
    ///
    /// `inbox_capacity` bounds the registration and broadcast inboxes; the
    /// unregistration channel is unbounded so it can be fed from `Drop`.
    pub fn new(inbox_capacity: usize) -> (Self, HubHandle) {
        let capacity = inbox_capacity.max(1);
        let (reg_tx, reg_rx) = mpsc::channel(capacity);
        let (unreg_tx, unreg_rx) = mpsc::unbounded_channel();
        let (inbound_tx, inbound_rx) = mpsc::channel(capacity);
        let (query_tx, query_rx) = mpsc::channel(QUERY_CAPACITY);

        let hub = Self {
            members: HashMap::new(),
            registrations: reg_rx,
            unregistrations: unreg_rx,
            inbound: inbound_rx,
            queries: query_rx,
        };
        let handle = HubHandle::new(reg_tx, unreg_tx, inbound_tx, query_tx);
        (hub, handle)
    }

    /// Create a hub and run it on a new tokio task.
    pub fn spawn(inbox_capacity: usize) -> (HubHandle, JoinHandle<()>) {
        let (hub, handle) = Self::new(inbox_capacity);
        (handle, tokio::spawn(hub.run()))
    }

    /// Process events until every handle is dropped.
    ///
    /// No priority between event kinds: when several channels are ready,
    /// `select!` picks one at random. Each channel is FIFO.
    pub async fn run(mut self) {
        info!("hub started");
        loop {
            tokio::select! {
                Some(registration) = self.registrations.recv() => {
                    self.handle_registration(registration);
                }
                Some(id) = self.unregistrations.recv() => {
                    self.handle_unregistration(&id);
                }
                Some(envelope) = self.inbound.recv() => {
                    self.handle_inbound(&envelope);
                }
                Some(query) = self.queries.recv() => {
                    self.handle_query(query);
                }
                else => break,
            }
        }
        info!(members = self.members.len(), "hub stopped");
    }

    fn handle_registration(&mut self, registration: Registration) {
        let Registration {
            connection,
            applied,
        } = registration;
        let outcome = self.join(connection);
        // The registering task may have gone away; the join still stands.
        let _ = applied.send(outcome);
    }

    /// Insert `connection` and tell everyone else it arrived.
    fn join(&mut self, connection: Connection) -> Result<(), HubError> {
        let id = connection.id().clone();
        match self.members.entry(id.clone()) {
            Entry::Occupied(_) => {
                warn!(client_id = %id, "duplicate registration rejected");
                return Err(HubError::DuplicateClient(id));
            }
            Entry::Vacant(slot) => {
                let _ = slot.insert(connection);
            }
        }

        counter!(WS_CONNECTIONS_TOTAL).increment(1);
        info!(client_id = %id, members = self.members.len(), "client registered");
        let _ = self.notify(&Envelope::connected(), Some(&id));
        self.record_active();
        Ok(())
    }

    fn handle_unregistration(&mut self, id: &ClientId) {
        // Dropping the removed connection closes its outbound queue.
        if self.members.remove(id).is_none() {
            debug!(client_id = %id, "unregister for non-member ignored");
            return;
        }

        counter!(WS_DISCONNECTIONS_TOTAL).increment(1);
        info!(client_id = %id, members = self.members.len(), "client unregistered");
        let _ = self.notify(&Envelope::disconnected(), None);
        self.record_active();
    }

    fn handle_inbound(&mut self, envelope: &Envelope) {
        counter!(WS_MESSAGES_TOTAL).increment(1);
        let Some(frame) = encode(envelope) else {
            return;
        };
        let outcome = self.fan_out(&frame, None);
        trace!(
            sender = %envelope.sender,
            delivered = outcome.delivered,
            evicted = outcome.evicted,
            "broadcast"
        );
        if outcome.evicted > 0 {
            self.record_active();
        }
    }

    fn handle_query(&self, query: Query) {
        // Receivers that stopped waiting are not an error.
        match query {
            Query::Members(reply) => {
                let mut ids: Vec<ClientId> = self.members.keys().cloned().collect();
                ids.sort();
                let _ = reply.send(ids);
            }
            Query::Count(reply) => {
                let _ = reply.send(self.members.len());
            }
        }
    }

    /// Send a system notice to every member except `except`.
    fn notify(&mut self, envelope: &Envelope, except: Option<&ClientId>) -> FanOut {
        match encode(envelope) {
            Some(frame) => self.fan_out(&frame, except),
            None => FanOut::default(),
        }
    }

    /// Enqueue `frame` on every member except `except`, evicting members
    /// whose queue is full or whose writer is gone.
    fn fan_out(&mut self, frame: &OutboundFrame, except: Option<&ClientId>) -> FanOut {
        let mut outcome = FanOut::default();
        self.members.retain(|id, connection| {
            if except == Some(id) {
                return true;
            }
            match connection.try_deliver(frame) {
                Delivery::Queued => {
                    outcome.delivered += 1;
                    true
                }
                Delivery::Full => {
                    warn!(client_id = %id, "outbound queue full, evicting slow client");
                    outcome.evicted += 1;
                    false
                }
                Delivery::Closed => {
                    debug!(client_id = %id, "writer gone, evicting client");
                    outcome.evicted += 1;
                    false
                }
            }
        });
        if outcome.evicted > 0 {
            counter!(WS_EVICTIONS_TOTAL).increment(outcome.evicted as u64);
        }
        outcome
    }

    fn record_active(&self) {
        gauge!(WS_CONNECTIONS_ACTIVE).set(self.members.len() as f64);
    }
}

/// Serialize once per event; the frame is then shared by every queue.
fn encode(envelope: &Envelope) -> Option<OutboundFrame> {
    match envelope.to_json() {
        Ok(json) => Some(Arc::from(json)),
        Err(e) => {
            counter!(WS_SERIALIZATION_ERRORS_TOTAL).increment(1);
            warn!(error = %e, "failed to serialize envelope, dropping it");
            None
        }
    }
}
