// ── Telemetry sample ──

use serde::{Deserialize, Serialize};

use super::server::ServerStatus;

/// One point-in-time resource reading for a server.
///
/// Superseded wholesale by each successful poll; has no identity beyond
/// "latest value for server X".
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TelemetrySample {
    pub memory_usage_bytes: u64,
    pub disk_usage_bytes: u64,
    pub cpu_usage_percent: f64,
    /// Fine-grained power state reported by the node daemon.
    pub status: ServerStatus,
    pub is_suspended: bool,
    pub network_rx_bytes: u64,
    pub network_tx_bytes: u64,
    /// Milliseconds since the server process started; 0 when offline.
    pub uptime_ms: u64,
}
