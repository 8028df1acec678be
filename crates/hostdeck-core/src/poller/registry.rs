// ── Poller registry ──
//
// Arena of pollers keyed by server uuid, diffed against the visible page
// on every refresh. A server gets exactly one poller while it is visible
// and pollable. Leaving view or becoming suspended or transferring tears
// the poller down with its sample. A lifecycle fingerprint change restarts
// the poller but carries the last sample over to the new one.

use std::collections::HashMap;
use std::sync::Arc;

use tracing::debug;
use uuid::Uuid;

use super::{PollerConfig, SampleSlot, TelemetryPoller, TelemetrySource};
use crate::model::{Server, ServerStatus};

struct Entry {
    fingerprint: (ServerStatus, bool),
    poller: TelemetryPoller,
}

/// What a [`PollerRegistry::reconcile`] pass changed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReconcileReport {
    pub started: Vec<Uuid>,
    /// Stopped because the server left view or became unpollable.
    pub stopped: Vec<Uuid>,
    /// Stopped and started again after a fingerprint change.
    pub restarted: Vec<Uuid>,
    pub kept: Vec<Uuid>,
}

impl ReconcileReport {
    pub fn is_noop(&self) -> bool {
        self.started.is_empty() && self.stopped.is_empty() && self.restarted.is_empty()
    }
}

/// Owns every live [`TelemetryPoller`].
pub struct PollerRegistry<S> {
    source: Arc<S>,
    config: PollerConfig,
    entries: HashMap<Uuid, Entry>,
}

impl<S: TelemetrySource> PollerRegistry<S> {
    pub fn new(source: Arc<S>, config: PollerConfig) -> Self {
        Self {
            source,
            config,
            entries: HashMap::new(),
        }
    }

    /// Bring the set of running pollers in line with `servers`.
    ///
    /// Must be called inside a tokio runtime.
    pub fn reconcile(&mut self, servers: &[Server]) -> ReconcileReport {
        let mut report = ReconcileReport::default();
        let mut carried: HashMap<Uuid, SampleSlot> = HashMap::new();
        let wanted: HashMap<Uuid, (ServerStatus, bool)> = servers
            .iter()
            .filter(|s| s.is_pollable())
            .map(|s| (s.uuid, s.poll_fingerprint()))
            .collect();

        self.entries.retain(|uuid, entry| match wanted.get(uuid) {
            Some(fp) if *fp == entry.fingerprint => true,
            Some(_) => {
                // Dropped here and started again below with the new fingerprint.
                carried.insert(*uuid, entry.poller.sample());
                report.restarted.push(*uuid);
                false
            }
            None => {
                report.stopped.push(*uuid);
                false
            }
        });

        // Preserve page order for started/kept.
        for server in servers.iter().filter(|s| s.is_pollable()) {
            if self.entries.contains_key(&server.uuid) {
                report.kept.push(server.uuid);
                continue;
            }
            let initial = carried.remove(&server.uuid).flatten();
            let poller = TelemetryPoller::start_with(
                Arc::clone(&self.source),
                server.uuid,
                self.config,
                initial,
            );
            self.entries.insert(
                server.uuid,
                Entry {
                    fingerprint: server.poll_fingerprint(),
                    poller,
                },
            );
            if !report.restarted.contains(&server.uuid) {
                report.started.push(server.uuid);
            }
        }

        if !report.is_noop() {
            debug!(
                started = report.started.len(),
                stopped = report.stopped.len(),
                restarted = report.restarted.len(),
                kept = report.kept.len(),
                "pollers reconciled"
            );
        }
        report
    }

    /// Latest sample for a server; `None` if it has no poller or no data yet.
    pub fn sample(&self, server: &Uuid) -> SampleSlot {
        self.entries.get(server).and_then(|e| e.poller.sample())
    }

    pub fn is_polling(&self, server: &Uuid) -> bool {
        self.entries.contains_key(server)
    }

    pub fn active_count(&self) -> usize {
        self.entries.len()
    }

    /// Stop and drop every poller.
    pub fn clear(&mut self) {
        self.entries.clear();
    }
}
