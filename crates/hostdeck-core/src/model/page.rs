// ── Entity page ──

use serde::{Deserialize, Serialize};

use super::server::Server;

/// Pagination metadata for a page of servers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageInfo {
    pub current_page: u32,
    pub total_pages: u32,
    pub total_items: u64,
}

impl Default for PageInfo {
    fn default() -> Self {
        Self {
            current_page: 1,
            total_pages: 1,
            total_items: 0,
        }
    }
}

/// Ordered page of servers plus pagination. Replaced atomically on each
/// successful fetch.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntityPage {
    pub items: Vec<Server>,
    pub pagination: PageInfo,
}

impl EntityPage {
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn has_next(&self) -> bool {
        self.pagination.current_page < self.pagination.total_pages
    }

    pub fn has_previous(&self) -> bool {
        self.pagination.current_page > 1
    }
}
