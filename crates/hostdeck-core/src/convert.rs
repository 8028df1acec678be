// ── API-to-domain type conversions ──
//
// Bridges raw `hostdeck_api` wire types into canonical domain types.
// Lifecycle strings are normalized here so nothing downstream has to
// deal with install markers or unknown daemon states.

use hostdeck_api::{
    AccountAttributes, ListResponse, Pagination, ServerAttributes, StatsAttributes,
};
use tracing::trace;

use crate::model::{
    EntityPage, Limits, PageInfo, Server, ServerStatus, TelemetrySample, UserContext,
};

/// Map a raw status string onto the five lifecycle values.
///
/// `null`, install markers (`installing`, `install_failed`,
/// `restoring_backup`) and anything unrecognized read as offline.
/// A suspension flag always wins.
pub(crate) fn parse_status(raw: Option<&str>, is_suspended: bool) -> ServerStatus {
    if is_suspended {
        return ServerStatus::Suspended;
    }
    match raw.map(str::parse::<ServerStatus>) {
        Some(Ok(status)) => status,
        Some(Err(_)) => {
            trace!(status = ?raw, "unrecognized server status, treating as offline");
            ServerStatus::Offline
        }
        None => ServerStatus::Offline,
    }
}

impl From<ServerAttributes> for Server {
    fn from(s: ServerAttributes) -> Self {
        let status = parse_status(s.status.as_deref(), s.is_suspended);
        Server {
            id: s.identifier,
            uuid: s.uuid,
            name: s.name,
            node: s.node,
            description: s.description.filter(|d| !d.is_empty()),
            limits: Limits {
                memory_mb: s.limits.memory,
                disk_mb: s.limits.disk,
                cpu_percent: s.limits.cpu,
            },
            status,
            is_transferring: s.is_transferring,
            is_owner: s.server_owner,
        }
    }
}

impl From<StatsAttributes> for TelemetrySample {
    fn from(s: StatsAttributes) -> Self {
        TelemetrySample {
            memory_usage_bytes: s.resources.memory_bytes,
            disk_usage_bytes: s.resources.disk_bytes,
            cpu_usage_percent: s.resources.cpu_absolute,
            status: parse_status(Some(&s.current_state), false),
            is_suspended: s.is_suspended,
            network_rx_bytes: s.resources.network_rx_bytes,
            network_tx_bytes: s.resources.network_tx_bytes,
            uptime_ms: s.resources.uptime,
        }
    }
}

impl From<AccountAttributes> for UserContext {
    fn from(a: AccountAttributes) -> Self {
        UserContext {
            id: a.id,
            username: a.username,
            root_admin: a.admin,
        }
    }
}

impl From<Pagination> for PageInfo {
    fn from(p: Pagination) -> Self {
        PageInfo {
            current_page: p.current_page.max(1),
            total_pages: p.total_pages.max(1),
            total_items: p.total,
        }
    }
}

impl From<ListResponse<ServerAttributes>> for EntityPage {
    fn from(list: ListResponse<ServerAttributes>) -> Self {
        let (items, pagination) = list.into_items();
        EntityPage {
            items: items.into_iter().map(Server::from).collect(),
            pagination: pagination.into(),
        }
    }
}
