//! Settings type definitions.
//!
//! All types use `#[serde(rename_all = "camelCase")]` for the JSON file
//! format. Every section is `#[serde(default)]`, so a partial file only needs
//! the fields it changes.

mod hub;
mod logging;
mod server;

pub use hub::*;
pub use logging::*;
pub use server::*;

use serde::{Deserialize, Serialize};

/// Root settings type.
///
/// # JSON Format
///
/// ```json
/// {
///   "server": { "port": 9000, "wsPath": "/chat" },
///   "hub": { "outboundCapacity": 128 }
/// }
/// ```
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct HuddleSettings {
    /// Listener and HTTP surface.
    pub server: ServerSettings,
    /// Arbiter queue sizing.
    pub hub: HubSettings,
    /// Log output.
    pub logging: LoggingSettings,
}

impl HuddleSettings {
    /// Correct values the hub cannot run with.
    ///
    /// Called automatically during loading. Invalid values are replaced with
    /// a warning rather than rejected.
    pub fn validate(&mut self) {
        let defaults = HubSettings::default();
        if self.hub.outbound_capacity == 0 {
            tracing::warn!(
                "outbound_capacity must be at least 1, using {}",
                defaults.outbound_capacity
            );
            self.hub.outbound_capacity = defaults.outbound_capacity;
        }
        if self.hub.inbox_capacity == 0 {
            tracing::warn!(
                "inbox_capacity must be at least 1, using {}",
                defaults.inbox_capacity
            );
            self.hub.inbox_capacity = defaults.inbox_capacity;
        }

        let path = self.server.ws_path.trim().to_owned();
        if path.is_empty() {
            tracing::warn!("ws_path is empty, using /ws");
            self.server.ws_path = ServerSettings::default().ws_path;
        } else {
            let path = if path.starts_with('/') {
                path
            } else {
                let fixed = format!("/{path}");
                tracing::warn!("ws_path {path:?} has no leading slash, using {fixed:?}");
                fixed
            };
            if RESERVED_PATHS.contains(&path.as_str()) {
                tracing::warn!("ws_path {path:?} is reserved, using /ws");
                self.server.ws_path = ServerSettings::default().ws_path;
            } else {
                self.server.ws_path = path;
            }
        }
    }
}
