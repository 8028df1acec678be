// ── Server domain types ──

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Coarse lifecycle state of a server.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    strum::Display,
    strum::EnumString,
    strum::AsRefStr,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum ServerStatus {
    Running,
    Offline,
    Starting,
    Stopping,
    Suspended,
}

impl ServerStatus {
    /// Power state is mid-change; drives the pulsing indicator.
    pub fn is_transitioning(self) -> bool {
        matches!(self, Self::Starting | Self::Stopping)
    }
}

/// Static resource limits. Memory and disk in MiB, CPU in percent of one
/// core. Zero means unlimited.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Limits {
    pub memory_mb: u64,
    pub disk_mb: u64,
    pub cpu_percent: u64,
}

/// Snapshot of one server as returned by a list refresh.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Server {
    /// Short identifier used in panel URLs.
    pub id: String,
    pub uuid: Uuid,
    pub name: String,
    pub node: String,
    pub description: Option<String>,
    pub limits: Limits,
    pub status: ServerStatus,
    pub is_transferring: bool,
    /// Whether the current user owns this server (vs. subuser/admin view).
    pub is_owner: bool,
}

impl Server {
    /// Suspended and transferring servers are never polled.
    pub fn is_pollable(&self) -> bool {
        self.status != ServerStatus::Suspended && !self.is_transferring
    }

    /// Values the poller lifecycle depends on. A change restarts polling.
    pub fn poll_fingerprint(&self) -> (ServerStatus, bool) {
        (self.status, self.is_transferring)
    }
}
