//! Terminal event reader on a background task.
//!
//! Emits key and resize events plus a slow tick (animations) and a fast
//! render tick over an unbounded channel.

use std::time::Duration;

use crossterm::event::{Event as CrosstermEvent, EventStream, KeyEvent, KeyEventKind};
use futures::StreamExt;
use tokio::sync::mpsc;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;

#[derive(Debug)]
pub enum Event {
    Key(KeyEvent),
    Resize(u16, u16),
    Tick,
    Render,
}

pub struct EventReader {
    rx: mpsc::UnboundedReceiver<Event>,
    cancel: CancellationToken,
}

impl EventReader {
    pub fn new(tick_rate: Duration, render_rate: Duration) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        let cancel = CancellationToken::new();
        tokio::spawn(read_events(tx, cancel.clone(), tick_rate, render_rate));
        Self { rx, cancel }
    }

    /// Next event, or `None` once the reader has stopped.
    pub async fn next(&mut self) -> Option<Event> {
        self.rx.recv().await
    }

    pub fn stop(&self) {
        self.cancel.cancel();
    }
}

impl Drop for EventReader {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}

async fn read_events(
    tx: mpsc::UnboundedSender<Event>,
    cancel: CancellationToken,
    tick_rate: Duration,
    render_rate: Duration,
) {
    let mut stream = EventStream::new();
    let mut tick = tokio::time::interval(tick_rate);
    let mut render = tokio::time::interval(render_rate);
    tick.set_missed_tick_behavior(MissedTickBehavior::Skip);
    render.set_missed_tick_behavior(MissedTickBehavior::Skip);

    loop {
        let event = tokio::select! {
            () = cancel.cancelled() => break,
            _ = tick.tick() => Event::Tick,
            _ = render.tick() => Event::Render,
            Some(Ok(raw)) = stream.next() => match raw {
                CrosstermEvent::Key(key) if key.kind == KeyEventKind::Press => Event::Key(key),
                CrosstermEvent::Resize(w, h) => Event::Resize(w, h),
                _ => continue,
            },
        };
        if tx.send(event).is_err() {
            break;
        }
    }
}
