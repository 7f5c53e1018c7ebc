//! Prometheus metrics recorder and metric names.

use metrics_exporter_prometheus::{BuildError, PrometheusBuilder, PrometheusHandle};
use tracing::info;

/// Install the Prometheus metrics recorder (global).
///
/// Returns the handle used to render `/metrics`. Call once at startup,
/// before anything records a metric.
pub fn install_recorder() -> Result<PrometheusHandle, BuildError> {
    let handle = PrometheusBuilder::new().install_recorder()?;
    info!("prometheus metrics recorder installed");
    Ok(handle)
}

/// Render Prometheus text format from the installed recorder.
pub fn render(handle: &PrometheusHandle) -> String {
    handle.render()
}

// Metric name constants to avoid typos across modules.

/// Connections registered with the hub (counter).
pub const WS_CONNECTIONS_TOTAL: &str = "ws_connections_total";
/// Connections removed through unregistration (counter).
pub const WS_DISCONNECTIONS_TOTAL: &str = "ws_disconnections_total";
/// Current hub members (gauge).
pub const WS_CONNECTIONS_ACTIVE: &str = "ws_connections_active";
/// Members evicted at fan-out because their queue was full or closed (counter).
pub const WS_EVICTIONS_TOTAL: &str = "ws_evictions_total";
/// Chat envelopes accepted for broadcast (counter).
pub const WS_MESSAGES_TOTAL: &str = "ws_messages_total";
/// Envelopes dropped because they failed to serialize (counter).
pub const WS_SERIALIZATION_ERRORS_TOTAL: &str = "ws_serialization_errors_total";
/// Time from upgrade until both connection tasks finished (histogram).
pub const WS_CONNECTION_DURATION_SECONDS: &str = "ws_connection_duration_seconds";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn render_without_global_install() {
        // Build a recorder + handle (no global install to avoid test conflicts).
        let handle = PrometheusBuilder::new().build_recorder().handle();
        let output = render(&handle);
        assert!(output.is_empty() || output.contains('#') || output.contains('\n'));
    }

    #[test]
    fn recorded_counter_is_rendered() {
        let recorder = PrometheusBuilder::new().build_recorder();
        let handle = recorder.handle();
        ::metrics::with_local_recorder(&recorder, || {
            ::metrics::counter!(WS_MESSAGES_TOTAL).increment(3);
        });
        assert!(render(&handle).contains("ws_messages_total 3"));
    }

    #[test]
    fn metric_constants_are_snake_case() {
        let names = [
            WS_CONNECTIONS_TOTAL,
            WS_DISCONNECTIONS_TOTAL,
            WS_CONNECTIONS_ACTIVE,
            WS_EVICTIONS_TOTAL,
            WS_MESSAGES_TOTAL,
            WS_SERIALIZATION_ERRORS_TOTAL,
            WS_CONNECTION_DURATION_SECONDS,
        ];
        for name in names {
            assert!(
                name.chars().all(|c| c.is_ascii_lowercase() || c == '_'),
                "metric name '{name}' must be snake_case"
            );
        }
    }
}
