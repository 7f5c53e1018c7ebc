//! HTTP surface: router, shared state, and the serve loop.

use std::future::Future;
use std::io;

use axum::Json;
use axum::Router;
use axum::extract::State;
use axum::http::StatusCode;
use axum::http::header::CONTENT_TYPE;
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use metrics_exporter_prometheus::PrometheusHandle;
use serde::Serialize;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::hub::HubHandle;
use crate::websocket::ws_upgrade;

/// State shared by every request handler.
#[derive(Clone, Debug)]
pub struct AppState {
    /// Handle to the running hub.
    pub hub: HubHandle,
    /// Capacity of each new connection's outbound queue.
    pub outbound_capacity: usize,
    /// Renders `/metrics`; `None` disables the endpoint.
    pub metrics: Option<PrometheusHandle>,
}

/// `/health` response body.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Health {
    /// `"ok"` while the hub answers queries.
    pub status: &'static str,
    /// Current member count.
    pub members: usize,
}

/// Build the router: `ws_path` upgrades to a WebSocket, plus `/health` and
/// `/metrics`.
///
/// `ws_path` must not be `/health` or `/metrics`; loaded settings are
/// already corrected for this.
pub fn router(state: AppState, ws_path: &str) -> Router {
    Router::new()
        .route(ws_path, get(ws_upgrade))
        .route("/health", get(health))
        .route("/metrics", get(render_metrics))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Serve `router` on `listener` until `shutdown` resolves.
///
/// Shutdown stops accepting and waits for in-flight HTTP requests; upgraded
/// sockets run on their own tasks and are not waited for.
pub async fn serve<F>(listener: TcpListener, router: Router, shutdown: F) -> io::Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    if let Ok(addr) = listener.local_addr() {
        info!(%addr, "listening");
    }
    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown)
        .await
}

async fn health(State(state): State<AppState>) -> Response {
    match state.hub.member_count().await {
        Ok(members) => Json(Health {
            status: "ok",
            members,
        })
        .into_response(),
        Err(e) => (StatusCode::SERVICE_UNAVAILABLE, e.to_string()).into_response(),
    }
}

async fn render_metrics(State(state): State<AppState>) -> Response {
    match &state.metrics {
        Some(handle) => (
            [(CONTENT_TYPE, "text/plain; version=0.0.4")],
            crate::metrics::render(handle),
        )
            .into_response(),
        None => StatusCode::NOT_FOUND.into_response(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hub::{Connection, Hub};
    use axum::body::{Body, to_bytes};
    use axum::http::Request;
    use huddle_core::ClientId;
    use metrics_exporter_prometheus::PrometheusBuilder;
    use tower::ServiceExt;

    fn state(hub: HubHandle, metrics: Option<PrometheusHandle>) -> AppState {
        AppState {
            hub,
            outbound_capacity: 8,
            metrics,
        }
    }

    async fn get_body(app: Router, uri: &str) -> (StatusCode, String) {
        let response = app
            .oneshot(Request::get(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, String::from_utf8(bytes.to_vec()).unwrap())
    }

    #[tokio::test]
    async fn health_reports_member_count() {
        let (hub, _task) = Hub::spawn(8);
        let (conn, _rx) = Connection::new(ClientId::from("c1"), 4);
        hub.register(conn).await.unwrap();

        let (status, body) = get_body(router(state(hub, None), "/ws"), "/health").await;
        assert_eq!(status, StatusCode::OK);
        let json: serde_json::Value = serde_json::from_str(&body).unwrap();
        insta::assert_json_snapshot!(json, @r#"
        {
          "members": 1,
          "status": "ok"
        }
        "#);
    }

    #[tokio::test]
    async fn health_unavailable_when_hub_stopped() {
        let (hub, task) = Hub::spawn(8);
        task.abort();
        let _ = task.await;

        let (status, _) = get_body(router(state(hub, None), "/ws"), "/health").await;
        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    }

    #[tokio::test]
    async fn metrics_disabled_is_not_found() {
        let (hub, _task) = Hub::spawn(8);
        let (status, _) = get_body(router(state(hub, None), "/ws"), "/metrics").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn metrics_renders_prometheus_text() {
        let recorder = PrometheusBuilder::new().build_recorder();
        let handle = recorder.handle();
        ::metrics::with_local_recorder(&recorder, || {
            ::metrics::gauge!(crate::metrics::WS_CONNECTIONS_ACTIVE).set(2.0);
        });

        let (hub, _task) = Hub::spawn(8);
        let (status, body) =
            get_body(router(state(hub, Some(handle)), "/ws"), "/metrics").await;
        assert_eq!(status, StatusCode::OK);
        assert!(body.contains("ws_connections_active 2"));
    }

    #[tokio::test]
    async fn plain_get_on_ws_path_is_rejected() {
        let (hub, _task) = Hub::spawn(8);
        let (status, _) = get_body(router(state(hub, None), "/chat"), "/chat").await;
        assert!(status.is_client_error());
    }

    #[tokio::test]
    async fn unknown_path_is_not_found() {
        let (hub, _task) = Hub::spawn(8);
        let (status, _) = get_body(router(state(hub, None), "/ws"), "/nope").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }
}
