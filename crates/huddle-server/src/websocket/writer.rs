//! Outbound half of a connection.

use std::fmt::Display;

use axum::extract::ws::Message;
use futures::{Sink, SinkExt};
use huddle_core::ClientId;
use tokio::sync::mpsc;
use tracing::{debug, trace};

use crate::hub::OutboundFrame;

/// Forward queued frames to the peer until the hub closes the queue.
///
/// The queue closing is the only way this loop ends, so the hub stays the
/// sole authority on membership. After a failed write nothing more is sent,
/// but the queue keeps being drained so the hub's enqueues never back up on
/// a dead socket. Once the queue closes, a close frame is sent if the socket
/// is still healthy, then the write half is released.
pub async fn write_loop<K>(id: ClientId, mut sink: K, mut outbound: mpsc::Receiver<OutboundFrame>)
where
    K: Sink<Message> + Unpin,
    K::Error: Display,
{
    let mut healthy = true;
    let mut sent = 0usize;

    while let Some(frame) = outbound.recv().await {
        if !healthy {
            continue;
        }
        match sink.send(Message::Text((&*frame).into())).await {
            Ok(()) => {
                sent += 1;
                trace!(client_id = %id, bytes = frame.len(), "frame sent");
            }
            Err(e) => {
                debug!(client_id = %id, error = %e, "write failed, discarding further frames");
                healthy = false;
            }
        }
    }

    if healthy && let Err(e) = sink.send(Message::Close(None)).await {
        debug!(client_id = %id, error = %e, "close frame not delivered");
    }
    debug!(client_id = %id, sent, "writer finished");
}
