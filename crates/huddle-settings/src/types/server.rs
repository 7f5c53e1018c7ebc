//! Listener settings.

use serde::{Deserialize, Serialize};

/// Paths the router serves itself; `ws_path` may not take one of them.
pub const RESERVED_PATHS: [&str; 2] = ["/health", "/metrics"];

/// Network and HTTP surface settings.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ServerSettings {
    /// Interface to bind.
    pub host: String,
    /// TCP port to bind.
    pub port: u16,
    /// Path that accepts WebSocket upgrades.
    pub ws_path: String,
    /// Serve Prometheus text at `/metrics`.
    pub metrics_enabled: bool,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 12345,
            ws_path: "/ws".to_string(),
            metrics_enabled: true,
        }
    }
}

impl ServerSettings {
    /// `host:port` string suitable for `TcpListener::bind`.
    pub fn bind_addr(&self) -> String {
        if self.host.contains(':') && !self.host.starts_with('[') {
            format!("[{}]:{}", self.host, self.port)
        } else {
            format!("{}:{}", self.host, self.port)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bind_addr_ipv4() {
        let s = ServerSettings::default();
        assert_eq!(s.bind_addr(), "0.0.0.0:12345");
    }

    #[test]
    fn bind_addr_wraps_ipv6() {
        let s = ServerSettings {
            host: "::1".into(),
            port: 80,
            ..ServerSettings::default()
        };
        assert_eq!(s.bind_addr(), "[::1]:80");
    }
}
