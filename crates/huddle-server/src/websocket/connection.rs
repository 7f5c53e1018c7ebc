//! WebSocket upgrade and per-connection task wiring.

use std::time::Instant;

use ::metrics::histogram;
use axum::extract::State;
use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::http::HeaderMap;
use axum::http::header::ORIGIN;
use axum::response::Response;
use futures::{SinkExt, StreamExt};
use huddle_core::ClientId;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use super::reader::read_loop;
use super::writer::write_loop;
use crate::hub::{Connection, HubError, HubHandle};
use crate::metrics::WS_CONNECTION_DURATION_SECONDS;
use crate::server::AppState;

/// Axum handler for the WebSocket endpoint.
///
/// Any origin is accepted; the header is only logged.
pub async fn ws_upgrade(
    ws: WebSocketUpgrade,
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Response {
    let origin = headers.get(ORIGIN).and_then(|v| v.to_str().ok());
    debug!(origin, "websocket upgrade requested");
    ws.on_upgrade(move |socket| serve_socket(socket, state))
}

/// Drive one upgraded socket from registration until both halves finish.
pub async fn serve_socket(socket: WebSocket, state: AppState) {
    let started = Instant::now();
    let id = ClientId::new();

    let tasks = match attach(id.clone(), socket, &state.hub, state.outbound_capacity).await {
        Ok(tasks) => tasks,
        Err(e) => {
            warn!(client_id = %id, error = %e, "connection rejected");
            return;
        }
    };
    info!(client_id = %id, "client connected");

    tasks.join().await;

    let elapsed = started.elapsed();
    histogram!(WS_CONNECTION_DURATION_SECONDS).record(elapsed.as_secs_f64());
    info!(client_id = %id, duration_ms = elapsed.as_millis() as u64, "client disconnected");
}

/// Reader and writer tasks of one registered connection.
#[derive(Debug)]
pub struct ConnectionTasks {
    id: ClientId,
    reader: JoinHandle<()>,
    writer: JoinHandle<()>,
}

impl ConnectionTasks {
    /// Id the tasks were registered under.
    pub fn id(&self) -> &ClientId {
        &self.id
    }

    /// Wait for both tasks. A panic in either is logged, not propagated.
    pub async fn join(self) {
        let (reader, writer) = tokio::join!(self.reader, self.writer);
        if let Err(e) = reader {
            warn!(client_id = %self.id, error = %e, "reader task failed");
        }
        if let Err(e) = writer {
            warn!(client_id = %self.id, error = %e, "writer task failed");
        }
    }
}

/// Register `socket` with the hub as `id` and spawn its reader and writer.
///
/// The hub has applied the registration before either task starts. If the
/// hub refuses, the socket gets a close frame and is dropped.
pub async fn attach(
    id: ClientId,
    mut socket: WebSocket,
    hub: &HubHandle,
    outbound_capacity: usize,
) -> Result<ConnectionTasks, HubError> {
    let (connection, outbound) = Connection::new(id.clone(), outbound_capacity);
    if let Err(e) = hub.register(connection).await {
        let _ = socket.send(Message::Close(None)).await;
        return Err(e);
    }

    let (sink, stream) = socket.split();
    let writer = tokio::spawn(write_loop(id.clone(), sink, outbound));
    let reader = tokio::spawn(read_loop(id.clone(), stream, hub.clone()));
    debug!(client_id = %id, "connection tasks spawned");

    Ok(ConnectionTasks { id, reader, writer })
}
