// ── Current user ──

use serde::{Deserialize, Serialize};

/// Identity of the authenticated user, as far as the dashboard cares.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserContext {
    pub id: u64,
    pub username: String,
    /// Root admins may switch the list to every server on the panel.
    pub root_admin: bool,
}
