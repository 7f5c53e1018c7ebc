//! Inbound half of a connection.

use std::fmt::Display;

use axum::extract::ws::Message;
use futures::{Stream, StreamExt};
use huddle_core::{ClientId, Envelope};
use tracing::{debug, trace, warn};

use crate::hub::HubHandle;

/// Read frames until the stream ends or fails, submitting each text frame
/// to the hub as a chat envelope.
///
/// Every exit path (peer close, read error, hub gone, panic, task abort)
/// unregisters `id` through a drop guard and then releases the read half.
/// A read failure is always terminal; there are no retries.
pub async fn read_loop<S, E>(id: ClientId, mut stream: S, hub: HubHandle)
where
    S: Stream<Item = Result<Message, E>> + Unpin,
    E: Display,
{
    let _unregister = hub.unregister_on_drop(id.clone());

    while let Some(frame) = stream.next().await {
        let content = match frame {
            Ok(Message::Text(text)) => text.as_str().to_owned(),
            Ok(Message::Binary(bytes)) => String::from_utf8_lossy(&bytes).into_owned(),
            // Control frames; the transport answers pings itself.
            Ok(Message::Ping(_) | Message::Pong(_)) => continue,
            Ok(Message::Close(close)) => {
                debug!(client_id = %id, ?close, "peer closed connection");
                break;
            }
            Err(e) => {
                debug!(client_id = %id, error = %e, "read failed");
                break;
            }
        };

        trace!(client_id = %id, bytes = content.len(), "frame received");
        if hub.broadcast(Envelope::chat(&id, content)).await.is_err() {
            warn!(client_id = %id, "hub stopped, dropping connection");
            break;
        }
    }

    debug!(client_id = %id, "reader finished");
}
