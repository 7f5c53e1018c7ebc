//! Arbiter queue sizing.

use serde::{Deserialize, Serialize};

/// Queue capacities for the hub and its connections.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct HubSettings {
    /// Per-connection outbound queue capacity. A connection whose queue is
    /// full at fan-out time is evicted.
    pub outbound_capacity: usize,
    /// Capacity of the registration and broadcast inboxes. Producers wait
    /// when an inbox is full.
    pub inbox_capacity: usize,
}

impl Default for HubSettings {
    fn default() -> Self {
        Self {
            outbound_capacity: 64,
            inbox_capacity: 1024,
        }
    }
}
