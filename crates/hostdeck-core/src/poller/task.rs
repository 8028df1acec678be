// ── Per-server telemetry poller ──
//
// Each poller runs one tokio task: fetch immediately, then on every tick
// of a fixed interval. Fetches are not queued behind each other; every
// tick issues a new request and whichever completes last wins.
//
// Writes to the sample go through `Shared::publish`, which checks the
// stopped flag under the same lock `stop()` takes. Once `stop()` returns,
// no completion can reach the sample, even one already past its await.

use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use futures_util::StreamExt;
use futures_util::stream::FuturesUnordered;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};
use uuid::Uuid;

use super::{PollerConfig, SampleSlot, TelemetrySource};
use crate::config::FailurePolicy;

const MIN_INTERVAL: Duration = Duration::from_secs(1);

struct Shared {
    stopped: Mutex<bool>,
    tx: watch::Sender<SampleSlot>,
}

impl Shared {
    /// Replace the sample unless the poller has been stopped.
    fn publish(&self, value: SampleSlot) -> bool {
        let stopped = self.stopped.lock().unwrap_or_else(PoisonError::into_inner);
        if *stopped {
            return false;
        }
        self.tx.send_replace(value);
        true
    }

    /// Mark stopped. Returns `false` if it already was.
    fn close(&self) -> bool {
        let mut stopped = self.stopped.lock().unwrap_or_else(PoisonError::into_inner);
        !std::mem::replace(&mut *stopped, true)
    }
}

/// Recurring telemetry fetch for one server.
///
/// Dropping the poller stops it.
pub struct TelemetryPoller {
    server: Uuid,
    shared: Arc<Shared>,
    rx: watch::Receiver<SampleSlot>,
    cancel: CancellationToken,
    handle: JoinHandle<()>,
}

impl TelemetryPoller {
    /// Spawn the polling task. Must be called inside a tokio runtime.
    pub fn start<S: TelemetrySource>(source: Arc<S>, server: Uuid, config: PollerConfig) -> Self {
        Self::start_with(source, server, config, None)
    }

    /// Like [`start`](Self::start), but the sample begins as `initial`
    /// instead of empty.
    pub fn start_with<S: TelemetrySource>(
        source: Arc<S>,
        server: Uuid,
        config: PollerConfig,
        initial: SampleSlot,
    ) -> Self {
        let (tx, rx) = watch::channel(initial);
        let shared = Arc::new(Shared {
            stopped: Mutex::new(false),
            tx,
        });
        let cancel = CancellationToken::new();

        let handle = tokio::spawn(poll_task(
            source,
            server,
            config,
            Arc::clone(&shared),
            cancel.clone(),
        ));
        info!(%server, interval_secs = config.interval.as_secs(), "telemetry poller started");

        Self {
            server,
            shared,
            rx,
            cancel,
            handle,
        }
    }

    pub fn server(&self) -> Uuid {
        self.server
    }

    /// Latest sample, if any.
    pub fn sample(&self) -> SampleSlot {
        self.rx.borrow().clone()
    }

    /// Receiver that is notified whenever the sample is replaced.
    pub fn subscribe(&self) -> watch::Receiver<SampleSlot> {
        self.rx.clone()
    }

    pub fn is_active(&self) -> bool {
        !*self
            .shared
            .stopped
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    /// Cancel the schedule. After this returns the held sample never
    /// changes again. Idempotent.
    pub fn stop(&self) {
        if self.shared.close() {
            self.cancel.cancel();
            self.handle.abort();
            info!(server = %self.server, "telemetry poller stopped");
        }
    }
}

impl Drop for TelemetryPoller {
    fn drop(&mut self) {
        self.stop();
    }
}

impl std::fmt::Debug for TelemetryPoller {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TelemetryPoller")
            .field("server", &self.server)
            .field("active", &self.is_active())
            .finish_non_exhaustive()
    }
}

async fn poll_task<S: TelemetrySource>(
    source: Arc<S>,
    server: Uuid,
    config: PollerConfig,
    shared: Arc<Shared>,
    cancel: CancellationToken,
) {
    let mut interval = tokio::time::interval(config.interval.max(MIN_INTERVAL));
    interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
    let mut in_flight = FuturesUnordered::new();

    loop {
        tokio::select! {
            biased;
            () = cancel.cancelled() => break,
            Some(result) = in_flight.next(), if !in_flight.is_empty() => {
                let update = match result {
                    Ok(sample) => Some(Some(Arc::new(sample))),
                    Err(e) => {
                        warn!(%server, error = %e, "telemetry fetch failed");
                        match config.on_failure {
                            FailurePolicy::Clear => Some(None),
                            FailurePolicy::Keep => None,
                        }
                    }
                };
                if let Some(value) = update {
                    if !shared.publish(value) {
                        break;
                    }
                }
            }
            _ = interval.tick() => {
                debug!(%server, pending = in_flight.len(), "telemetry tick");
                let source = Arc::clone(&source);
                in_flight.push(async move { source.fetch_telemetry(server).await });
            }
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::collections::VecDeque;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::*;
    use crate::error::CoreError;
    use crate::model::{ServerStatus, TelemetrySample};

    fn sample(memory: u64) -> TelemetrySample {
        TelemetrySample {
            memory_usage_bytes: memory,
            disk_usage_bytes: 0,
            cpu_usage_percent: 1.0,
            status: ServerStatus::Running,
            is_suspended: false,
            network_rx_bytes: 0,
            network_tx_bytes: 0,
            uptime_ms: 0,
        }
    }

    /// Each call pops the next (delay, outcome) step; `None` outcome fails.
    /// Once the script runs out, calls succeed immediately with memory 0.
    struct ScriptedSource {
        calls: AtomicUsize,
        script: Mutex<VecDeque<(Duration, Option<u64>)>>,
    }

    impl ScriptedSource {
        fn new(steps: impl IntoIterator<Item = (Duration, Option<u64>)>) -> Arc<Self> {
            Arc::new(Self {
                calls: AtomicUsize::new(0),
                script: Mutex::new(steps.into_iter().collect()),
            })
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    impl TelemetrySource for ScriptedSource {
        async fn fetch_telemetry(&self, _server: Uuid) -> Result<TelemetrySample, CoreError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let step = self.script.lock().unwrap().pop_front();
            let (delay, outcome) = step.unwrap_or((Duration::ZERO, Some(0)));
            tokio::time::sleep(delay).await;
            outcome.map(sample).ok_or_else(|| CoreError::Api {
                message: "node unreachable".into(),
                code: None,
                status: Some(502),
            })
        }
    }

    fn config(on_failure: FailurePolicy) -> PollerConfig {
        PollerConfig {
            interval: Duration::from_secs(30),
            on_failure,
        }
    }

    async fn at_ms(ms: u64) {
        tokio::time::sleep_until(tokio::time::Instant::now() + Duration::from_millis(ms)).await;
    }

    fn memory(poller: &TelemetryPoller) -> Option<u64> {
        poller.sample().map(|s| s.memory_usage_bytes)
    }

    #[tokio::test(start_paused = true)]
    async fn fetches_immediately_then_every_interval() {
        let source = ScriptedSource::new([(Duration::ZERO, Some(1)), (Duration::ZERO, Some(2))]);
        let poller = TelemetryPoller::start(
            Arc::clone(&source),
            Uuid::nil(),
            config(FailurePolicy::Clear),
        );

        at_ms(1).await;
        assert_eq!(source.calls(), 1);
        assert_eq!(memory(&poller), Some(1));

        at_ms(29_000).await;
        assert_eq!(source.calls(), 1);

        at_ms(1_000).await;
        assert_eq!(source.calls(), 2);
        assert_eq!(memory(&poller), Some(2));

        at_ms(30_000).await;
        assert_eq!(source.calls(), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn failure_clears_sample_and_schedule_continues() {
        let source = ScriptedSource::new([
            (Duration::ZERO, Some(7)),
            (Duration::ZERO, None),
            (Duration::ZERO, Some(9)),
        ]);
        let poller = TelemetryPoller::start(
            Arc::clone(&source),
            Uuid::nil(),
            config(FailurePolicy::Clear),
        );

        at_ms(1).await;
        assert_eq!(memory(&poller), Some(7));

        at_ms(30_000).await;
        assert_eq!(memory(&poller), None);
        assert!(poller.is_active());

        at_ms(30_000).await;
        assert_eq!(memory(&poller), Some(9));
    }

    // Whether a failed fetch should blank the row or leave the last reading
    // up has gone both ways historically; both policies are supported.
    #[tokio::test(start_paused = true)]
    async fn keep_policy_leaves_stale_sample() {
        let source = ScriptedSource::new([(Duration::ZERO, Some(7)), (Duration::ZERO, None)]);
        let poller = TelemetryPoller::start(
            Arc::clone(&source),
            Uuid::nil(),
            config(FailurePolicy::Keep),
        );

        at_ms(1).await;
        at_ms(30_000).await;
        assert_eq!(source.calls(), 2);
        assert_eq!(memory(&poller), Some(7));
    }

    #[tokio::test(start_paused = true)]
    async fn seeded_sample_shows_until_first_fetch() {
        let source = ScriptedSource::new([(Duration::from_secs(2), Some(3))]);
        let poller = TelemetryPoller::start_with(
            Arc::clone(&source),
            Uuid::nil(),
            config(FailurePolicy::Keep),
            Some(Arc::new(sample(1))),
        );

        assert_eq!(memory(&poller), Some(1));
        at_ms(1).await;
        assert_eq!(source.calls(), 1);
        assert_eq!(memory(&poller), Some(1));

        at_ms(2_000).await;
        assert_eq!(memory(&poller), Some(3));
    }

    #[tokio::test(start_paused = true)]
    async fn last_completion_wins_over_last_issued() {
        // Fetch #1 at t=0 takes 45s; fetch #2 at t=30s takes 5s.
        let source = ScriptedSource::new([
            (Duration::from_secs(45), Some(1)),
            (Duration::from_secs(5), Some(2)),
        ]);
        let poller = TelemetryPoller::start(
            Arc::clone(&source),
            Uuid::nil(),
            config(FailurePolicy::Clear),
        );

        at_ms(40_000).await;
        assert_eq!(source.calls(), 2);
        assert_eq!(memory(&poller), Some(2));

        at_ms(6_000).await;
        assert_eq!(memory(&poller), Some(1));
    }

    #[tokio::test(start_paused = true)]
    async fn stop_blocks_pending_completion() {
        let source = ScriptedSource::new([
            (Duration::ZERO, Some(1)),
            (Duration::from_secs(10), Some(2)),
        ]);
        let poller = TelemetryPoller::start(
            Arc::clone(&source),
            Uuid::nil(),
            config(FailurePolicy::Clear),
        );

        at_ms(31_000).await;
        assert_eq!(source.calls(), 2);
        let before = poller.sample();

        poller.stop();
        assert!(!poller.is_active());

        at_ms(60_000).await;
        assert_eq!(poller.sample(), before);
        assert_eq!(memory(&poller), Some(1));
        assert_eq!(source.calls(), 2);
    }

    #[test]
    fn publish_after_close_is_rejected() {
        let (tx, rx) = watch::channel(None);
        let shared = Shared {
            stopped: Mutex::new(false),
            tx,
        };
        assert!(shared.publish(Some(Arc::new(sample(1)))));
        assert!(shared.close());
        assert!(!shared.close());
        assert!(!shared.publish(Some(Arc::new(sample(2)))));
        assert_eq!(rx.borrow().as_ref().map(|s| s.memory_usage_bytes), Some(1));
    }

    #[tokio::test(start_paused = true)]
    async fn dropping_poller_stops_fetching() {
        let source = ScriptedSource::new([]);
        let poller = TelemetryPoller::start(
            Arc::clone(&source),
            Uuid::nil(),
            config(FailurePolicy::Clear),
        );
        at_ms(1).await;
        drop(poller);

        at_ms(120_000).await;
        assert_eq!(source.calls(), 1);
    }
}
