//! Hub-side view of one client.

use std::sync::Arc;

use huddle_core::ClientId;
use tokio::sync::mpsc;
use tokio::sync::mpsc::error::TrySendError;

/// One serialized envelope, shared by every queue it was fanned out to.
pub type OutboundFrame = Arc<str>;

/// Result of a non-blocking enqueue onto a connection's outbound queue.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Delivery {
    /// The frame is queued for the writer.
    Queued,
    /// The queue is at capacity; the consumer is not keeping up.
    Full,
    /// The writer has dropped its receiver.
    Closed,
}

/// Client id plus the sending half of its bounded outbound queue.
///
/// Built at upgrade time and moved into the hub on registration. Dropping it
/// closes the queue, which is the writer's only signal to finish.
#[derive(Debug)]
pub struct Connection {
    id: ClientId,
    outbound: mpsc::Sender<OutboundFrame>,
}

impl Connection {
    /// Create a connection and its outbound queue.
    ///
    /// Returns the receiving half for the writer task. A `capacity` of zero
    /// is raised to one.
    pub fn new(id: ClientId, capacity: usize) -> (Self, mpsc::Receiver<OutboundFrame>) {
        let (outbound, rx) = mpsc::channel(capacity.max(1));
        (Self { id, outbound }, rx)
    }

    /// The connection's id.
    pub fn id(&self) -> &ClientId {
        &self.id
    }

    /// Enqueue without waiting.
    pub fn try_deliver(&self, frame: &OutboundFrame) -> Delivery {
        match self.outbound.try_send(Arc::clone(frame)) {
            Ok(()) => Delivery::Queued,
            Err(TrySendError::Full(_)) => Delivery::Full,
            Err(TrySendError::Closed(_)) => Delivery::Closed,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn frame(text: &str) -> OutboundFrame {
        Arc::from(text)
    }

    #[test]
    fn delivers_until_full() {
        let (conn, mut rx) = Connection::new(ClientId::from("c1"), 2);
        assert_eq!(conn.try_deliver(&frame("a")), Delivery::Queued);
        assert_eq!(conn.try_deliver(&frame("b")), Delivery::Queued);
        assert_eq!(conn.try_deliver(&frame("c")), Delivery::Full);

        assert_eq!(&*rx.try_recv().unwrap(), "a");
        assert_eq!(conn.try_deliver(&frame("d")), Delivery::Queued);
    }

    #[test]
    fn zero_capacity_holds_one_frame() {
        let (conn, mut rx) = Connection::new(ClientId::from("c1"), 0);
        assert_eq!(conn.try_deliver(&frame("a")), Delivery::Queued);
        assert_eq!(conn.try_deliver(&frame("b")), Delivery::Full);
        assert_eq!(&*rx.try_recv().unwrap(), "a");
    }

    #[test]
    fn dropped_receiver_reports_closed() {
        let (conn, rx) = Connection::new(ClientId::from("c1"), 2);
        drop(rx);
        assert_eq!(conn.try_deliver(&frame("a")), Delivery::Closed);
    }

    #[test]
    fn dropping_connection_closes_queue() {
        let (conn, mut rx) = Connection::new(ClientId::from("c1"), 2);
        assert_eq!(conn.try_deliver(&frame("last")), Delivery::Queued);
        drop(conn);

        assert_eq!(&*rx.try_recv().unwrap(), "last");
        assert_eq!(
            rx.try_recv(),
            Err(mpsc::error::TryRecvError::Disconnected)
        );
    }

    #[test]
    fn frames_are_shared_not_copied() {
        let (conn, mut rx) = Connection::new(ClientId::from("c1"), 1);
        let shared = frame("payload");
        assert_eq!(conn.try_deliver(&shared), Delivery::Queued);
        let received = rx.try_recv().unwrap();
        assert!(Arc::ptr_eq(&shared, &received));
    }
}
