// Panel client API wire types
//
// The panel wraps every resource in a "fractal" envelope:
// `{ "object": "server", "attributes": { ... } }`, and list responses in
// `{ "object": "list", "data": [...], "meta": { "pagination": { ... } } }`.
// These structs mirror the JSON as returned; normalization into domain
// types happens in `hostdeck-core`.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

// ── Envelopes ────────────────────────────────────────────────────────

/// A single `{ object, attributes }` resource wrapper.
#[derive(Debug, Clone, Deserialize)]
pub struct Item<T> {
    #[serde(default)]
    pub object: String,
    pub attributes: T,
}

/// A paginated `{ object: "list", data, meta }` response.
#[derive(Debug, Clone, Deserialize)]
pub struct ListResponse<T> {
    #[serde(default)]
    pub object: String,
    pub data: Vec<Item<T>>,
    #[serde(default)]
    pub meta: ListMeta,
}

impl<T> ListResponse<T> {
    /// Strip the per-item envelopes, keeping response order.
    pub fn into_items(self) -> (Vec<T>, Pagination) {
        let items = self.data.into_iter().map(|i| i.attributes).collect();
        (items, self.meta.pagination)
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ListMeta {
    #[serde(default)]
    pub pagination: Pagination,
}

/// Pagination metadata attached to list responses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
pub struct Pagination {
    #[serde(default)]
    pub total: u64,
    #[serde(default)]
    pub count: u64,
    #[serde(default)]
    pub per_page: u64,
    #[serde(default = "first_page")]
    pub current_page: u32,
    #[serde(default = "first_page")]
    pub total_pages: u32,
}

impl Default for Pagination {
    fn default() -> Self {
        Self {
            total: 0,
            count: 0,
            per_page: 0,
            current_page: 1,
            total_pages: 1,
        }
    }
}

fn first_page() -> u32 {
    1
}

/// Error body shape: `{"errors":[{"code":"...","status":"404","detail":"..."}]}`.
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct ErrorResponse {
    #[serde(default)]
    pub errors: Vec<ErrorEntry>,
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct ErrorEntry {
    #[serde(default)]
    pub code: Option<String>,
    #[serde(default)]
    pub detail: Option<String>,
}

// ── Servers ──────────────────────────────────────────────────────────

/// Which servers the list endpoint returns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ServerScope {
    /// Servers the user owns or is a subuser of.
    #[default]
    Own,
    /// Every server on the panel (`type=admin`, root admins only).
    Admin,
}

impl ServerScope {
    /// Value for the `type` query parameter, if any.
    pub fn query_value(self) -> Option<&'static str> {
        match self {
            Self::Own => None,
            Self::Admin => Some("admin"),
        }
    }
}

/// `attributes` of a `server` object from `GET /api/client`.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerAttributes {
    /// Short identifier used in panel URLs (first 8 chars of the uuid).
    pub identifier: String,
    pub uuid: Uuid,
    pub name: String,
    #[serde(default)]
    pub node: String,
    #[serde(default)]
    pub description: Option<String>,
    /// Install / suspension marker; `null` for a normally installed server.
    #[serde(default)]
    pub status: Option<String>,
    /// Present on older panel versions instead of `status: "suspended"`.
    #[serde(default)]
    pub is_suspended: bool,
    #[serde(default)]
    pub is_transferring: bool,
    #[serde(default)]
    pub server_owner: bool,
    #[serde(default)]
    pub limits: ServerLimits,
}

/// Static resource limits. Memory/disk in MiB, CPU in percent; 0 = unlimited.
#[derive(Debug, Clone, Copy, Default, Deserialize)]
pub struct ServerLimits {
    #[serde(default)]
    pub memory: u64,
    #[serde(default)]
    pub disk: u64,
    #[serde(default)]
    pub cpu: u64,
}

// ── Resource usage ───────────────────────────────────────────────────

/// `attributes` of a `stats` object from `GET /api/client/servers/{uuid}/resources`.
#[derive(Debug, Clone, Deserialize)]
pub struct StatsAttributes {
    /// Daemon power state: `running`, `offline`, `starting`, `stopping`.
    pub current_state: String,
    #[serde(default)]
    pub is_suspended: bool,
    pub resources: StatsResources,
}

#[derive(Debug, Clone, Copy, Default, Deserialize)]
pub struct StatsResources {
    #[serde(default)]
    pub memory_bytes: u64,
    #[serde(default)]
    pub cpu_absolute: f64,
    #[serde(default)]
    pub disk_bytes: u64,
    #[serde(default)]
    pub network_rx_bytes: u64,
    #[serde(default)]
    pub network_tx_bytes: u64,
    /// Milliseconds since the server process started.
    #[serde(default)]
    pub uptime: u64,
}

// ── Account ──────────────────────────────────────────────────────────

/// `attributes` of the `user` object from `GET /api/client/account`.
#[derive(Debug, Clone, Deserialize)]
pub struct AccountAttributes {
    pub id: u64,
    #[serde(default)]
    pub admin: bool,
    pub username: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub first_name: Option<String>,
    #[serde(default)]
    pub last_name: Option<String>,
}
