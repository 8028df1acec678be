// ── Display status resolution ──
//
// Pure derivation of the status shown on a row from the server's static
// lifecycle state and its latest telemetry sample.

use std::fmt;

use crate::model::{ServerStatus, TelemetrySample};

/// Status as shown to the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DisplayStatus(ServerStatus);

impl DisplayStatus {
    pub fn status(self) -> ServerStatus {
        self.0
    }

    pub fn is_suspended(self) -> bool {
        self.0 == ServerStatus::Suspended
    }

    /// Starting or stopping.
    pub fn is_transitioning(self) -> bool {
        self.0.is_transitioning()
    }
}

impl fmt::Display for DisplayStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl From<DisplayStatus> for ServerStatus {
    fn from(s: DisplayStatus) -> Self {
        s.0
    }
}

/// Resolve the display status.
///
/// Priority: suspension (static or sampled), then the sample's reported
/// state, then the static state when no sample exists yet.
pub fn resolve(entity_status: ServerStatus, sample: Option<&TelemetrySample>) -> DisplayStatus {
    let suspended =
        entity_status == ServerStatus::Suspended || sample.is_some_and(|s| s.is_suspended);
    if suspended {
        return DisplayStatus(ServerStatus::Suspended);
    }
    DisplayStatus(sample.map_or(entity_status, |s| s.status))
}
