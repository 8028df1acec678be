// ── Paginated entity view ──
//
// Composes a page of servers with their live telemetry into row view
// models. Rows are derived fresh from current inputs on every render;
// the only retained state is the poller registry, keyed by server uuid
// so a server that stays on the page keeps its poller across refreshes.

use std::sync::Arc;

use uuid::Uuid;

use crate::metrics::{ResourceGauge, format_bytes, format_uptime};
use crate::model::{EntityPage, Server, TelemetrySample};
use crate::poller::{PollerConfig, PollerRegistry, ReconcileReport, TelemetrySource};
use crate::status::{DisplayStatus, resolve};

pub const EMPTY_ADMIN_MESSAGE: &str = "There are no other servers to display.";
pub const EMPTY_OWN_MESSAGE: &str = "You don't have any servers yet.";
pub const CREATE_SERVER_CTA: &str = "Create New Server";

/// Live figures shown under a row once a sample exists.
#[derive(Debug, Clone, PartialEq)]
pub struct RowGauges {
    pub cpu: ResourceGauge,
    pub memory: ResourceGauge,
    pub disk: ResourceGauge,
    pub network_rx: String,
    pub network_tx: String,
    pub uptime: String,
}

/// What the body of a row shows.
#[derive(Debug, Clone, PartialEq)]
pub enum RowBody {
    /// Suspended badge; never polled.
    Suspended,
    /// Transfer in progress; never polled.
    Transferring,
    /// Waiting for the first sample (or after a failed poll).
    Loading,
    Gauges(Box<RowGauges>),
}

/// One rendered server row.
#[derive(Debug, Clone, PartialEq)]
pub struct ServerRowView {
    pub uuid: Uuid,
    pub id: String,
    pub name: String,
    pub node: String,
    pub status: DisplayStatus,
    pub body: RowBody,
}

/// Whole-view state.
#[derive(Debug, Clone, PartialEq)]
pub enum ViewState {
    /// No page loaded yet.
    Loading,
    Empty {
        message: &'static str,
        call_to_action: &'static str,
    },
    Rows(Vec<ServerRowView>),
}

/// Build a row from a server and its latest sample.
pub fn row_view(server: &Server, sample: Option<&TelemetrySample>) -> ServerRowView {
    let status = resolve(server.status, sample);
    let body = if status.is_suspended() {
        RowBody::Suspended
    } else if server.is_transferring {
        RowBody::Transferring
    } else {
        match sample {
            None => RowBody::Loading,
            Some(sample) => {
                let [cpu, memory, disk] = ResourceGauge::for_sample(sample, &server.limits);
                RowBody::Gauges(Box::new(RowGauges {
                    cpu,
                    memory,
                    disk,
                    network_rx: format_bytes(sample.network_rx_bytes),
                    network_tx: format_bytes(sample.network_tx_bytes),
                    uptime: format_uptime(sample.uptime_ms),
                }))
            }
        }
    };

    ServerRowView {
        uuid: server.uuid,
        id: server.id.clone(),
        name: server.name.clone(),
        node: server.node.clone(),
        status,
        body,
    }
}

/// View state for a page, with samples looked up per server.
pub fn view_state(
    page: Option<&EntityPage>,
    admin_scope: bool,
    sample_for: impl Fn(&Uuid) -> Option<Arc<TelemetrySample>>,
) -> ViewState {
    let Some(page) = page else {
        return ViewState::Loading;
    };
    if page.is_empty() {
        return ViewState::Empty {
            message: if admin_scope {
                EMPTY_ADMIN_MESSAGE
            } else {
                EMPTY_OWN_MESSAGE
            },
            call_to_action: CREATE_SERVER_CTA,
        };
    }
    ViewState::Rows(
        page.items
            .iter()
            .map(|server| row_view(server, sample_for(&server.uuid).as_deref()))
            .collect(),
    )
}

/// Page of servers plus the pollers feeding it.
pub struct PaginatedEntityView<S> {
    registry: PollerRegistry<S>,
    page: Option<Arc<EntityPage>>,
    admin_scope: bool,
}

impl<S: TelemetrySource> PaginatedEntityView<S> {
    pub fn new(source: Arc<S>, config: PollerConfig) -> Self {
        Self {
            registry: PollerRegistry::new(source, config),
            page: None,
            admin_scope: false,
        }
    }

    /// Show a new page and reconcile pollers against it.
    ///
    /// Must be called inside a tokio runtime.
    pub fn set_page(&mut self, page: Arc<EntityPage>, admin_scope: bool) -> ReconcileReport {
        let report = self.registry.reconcile(&page.items);
        self.page = Some(page);
        self.admin_scope = admin_scope;
        report
    }

    /// Update the scope label without a new page (e.g. while refetching).
    pub fn set_admin_scope(&mut self, admin_scope: bool) {
        self.admin_scope = admin_scope;
    }

    pub fn page(&self) -> Option<&Arc<EntityPage>> {
        self.page.as_ref()
    }

    pub fn registry(&self) -> &PollerRegistry<S> {
        &self.registry
    }

    /// Current state with the latest samples.
    pub fn render(&self) -> ViewState {
        view_state(self.page.as_deref(), self.admin_scope, |uuid| {
            self.registry.sample(uuid)
        })
    }

    /// Stop all pollers and forget the page.
    pub fn reset(&mut self) {
        self.registry.clear();
        self.page = None;
    }
}
