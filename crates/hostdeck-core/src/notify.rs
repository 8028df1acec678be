// ── Scoped notifications ──
//
// Dismissible flash messages grouped by scope key (e.g. "dashboard").
// Views show the flashes for their own scope; the current set is
// published on a watch channel so the UI can redraw on change.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use tokio::sync::watch;

use crate::error::CoreError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, strum::Display)]
#[strum(serialize_all = "lowercase")]
pub enum FlashLevel {
    Info,
    Success,
    Warning,
    Error,
}

/// One notification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Flash {
    pub id: u64,
    pub scope: String,
    pub level: FlashLevel,
    pub message: String,
}

struct Inner {
    next_id: AtomicU64,
    tx: watch::Sender<Vec<Flash>>,
}

/// Cloneable handle to the shared flash list.
#[derive(Clone)]
pub struct Notifications {
    inner: Arc<Inner>,
}

impl Default for Notifications {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for Notifications {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Notifications")
            .field("count", &self.inner.tx.borrow().len())
            .finish()
    }
}

impl Notifications {
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(Vec::new());
        Self {
            inner: Arc::new(Inner {
                next_id: AtomicU64::new(1),
                tx,
            }),
        }
    }

    /// Add a flash and return its id.
    pub fn add(&self, scope: &str, level: FlashLevel, message: impl Into<String>) -> u64 {
        let id = self.inner.next_id.fetch_add(1, Ordering::Relaxed);
        let flash = Flash {
            id,
            scope: scope.to_owned(),
            level,
            message: message.into(),
        };
        self.inner.tx.send_modify(|list| list.push(flash));
        id
    }

    /// Replace everything in `scope` with a single error flash.
    pub fn clear_and_add_error(&self, scope: &str, error: &CoreError) -> u64 {
        let id = self.inner.next_id.fetch_add(1, Ordering::Relaxed);
        let flash = Flash {
            id,
            scope: scope.to_owned(),
            level: FlashLevel::Error,
            message: error.flash_message(),
        };
        self.inner.tx.send_modify(|list| {
            list.retain(|f| f.scope != scope);
            list.push(flash);
        });
        id
    }

    /// Remove every flash in `scope`.
    pub fn clear(&self, scope: &str) {
        self.inner.tx.send_if_modified(|list| {
            let before = list.len();
            list.retain(|f| f.scope != scope);
            list.len() != before
        });
    }

    pub fn clear_all(&self) {
        self.inner.tx.send_if_modified(|list| {
            let had_any = !list.is_empty();
            list.clear();
            had_any
        });
    }

    /// Dismiss one flash. Returns `false` if it was already gone.
    pub fn dismiss(&self, id: u64) -> bool {
        self.inner.tx.send_if_modified(|list| {
            let before = list.len();
            list.retain(|f| f.id != id);
            list.len() != before
        })
    }

    /// Flashes in `scope`, oldest first.
    pub fn for_scope(&self, scope: &str) -> Vec<Flash> {
        self.inner
            .tx
            .borrow()
            .iter()
            .filter(|f| f.scope == scope)
            .cloned()
            .collect()
    }

    pub fn snapshot(&self) -> Vec<Flash> {
        self.inner.tx.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<Vec<Flash>> {
        self.inner.tx.subscribe()
    }
}
