// ── Telemetry polling ──
//
// One `TelemetryPoller` per visible server, owned by a `PollerRegistry`
// that diffs the visible page against running pollers.

mod registry;
mod task;

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use hostdeck_api::ServerScope;
use uuid::Uuid;

use crate::config::{DEFAULT_POLL_INTERVAL, FailurePolicy, PanelConfig};
use crate::error::CoreError;
use crate::model::{EntityPage, TelemetrySample};

pub use registry::{PollerRegistry, ReconcileReport};
pub use task::TelemetryPoller;

/// Latest sample as held by a poller. `None` until the first successful
/// fetch, and again after a failure under [`FailurePolicy::Clear`].
pub type SampleSlot = Option<Arc<TelemetrySample>>;

/// Where pollers get their samples from.
pub trait TelemetrySource: Send + Sync + 'static {
    fn fetch_telemetry(
        &self,
        server: Uuid,
    ) -> impl Future<Output = Result<TelemetrySample, CoreError>> + Send;
}

/// Where the list controller gets pages of servers from.
pub trait EntitySource: Send + Sync + 'static {
    fn list_servers(
        &self,
        page: u32,
        scope: ServerScope,
    ) -> impl Future<Output = Result<EntityPage, CoreError>> + Send;
}

/// Schedule and failure handling for a single poller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollerConfig {
    pub interval: Duration,
    pub on_failure: FailurePolicy,
}

impl Default for PollerConfig {
    fn default() -> Self {
        Self {
            interval: DEFAULT_POLL_INTERVAL,
            on_failure: FailurePolicy::default(),
        }
    }
}

impl From<&PanelConfig> for PollerConfig {
    fn from(cfg: &PanelConfig) -> Self {
        Self {
            interval: cfg.poll_interval,
            on_failure: cfg.on_failure,
        }
    }
}
