//! Real-time signal polling.
//!
//! `RealtimeMonitor` owns the only refresh task. `start` replaces whatever task
//! was running, and dropping the monitor stops it.

use crate::client::SignalFeed;
use crate::view::RealtimePanel;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::{interval, MissedTickBehavior};
use tracing::{debug, info, warn};

/// Receives the empty panel when monitoring starts, then the panel after every
/// refresh, successful or not.
pub trait SignalSink: Send + Sync {
    fn render(&self, panel: &RealtimePanel);
}

pub struct RealtimeMonitor {
    feed: Arc<dyn SignalFeed>,
    sink: Arc<dyn SignalSink>,
    period: Duration,
    task: Option<JoinHandle<()>>,
}

impl RealtimeMonitor {
    pub fn new(feed: Arc<dyn SignalFeed>, sink: Arc<dyn SignalSink>, period: Duration) -> Self {
        Self {
            feed,
            sink,
            period,
            task: None,
        }
    }

    /// Show an empty panel for `ticker`, refresh once now, then every `period`.
    /// Must be called inside a tokio runtime.
    pub fn start(&mut self, ticker: &str, exp_name: &str) {
        if let Some(previous) = self.task.take() {
            debug!("Cancelling previous refresh task");
            previous.abort();
        }

        info!("Monitoring {} every {:?}", ticker, self.period);
        self.sink.render(&RealtimePanel::new(ticker));
        self.task = Some(tokio::spawn(refresh_loop(
            Arc::clone(&self.feed),
            Arc::clone(&self.sink),
            self.period,
            ticker.to_string(),
            exp_name.to_string(),
        )));
    }

    pub fn is_running(&self) -> bool {
        self.task.as_ref().is_some_and(|t| !t.is_finished())
    }
}

impl Drop for RealtimeMonitor {
    fn drop(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }
}

async fn refresh_loop(
    feed: Arc<dyn SignalFeed>,
    sink: Arc<dyn SignalSink>,
    period: Duration,
    ticker: String,
    exp_name: String,
) {
    let mut panel = RealtimePanel::new(&ticker);
    let mut ticks = interval(period);
    ticks.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        // first tick completes immediately
        ticks.tick().await;

        match feed.fetch_realtime_signal(&ticker, &exp_name).await {
            Ok(signal) => panel.apply(&signal),
            Err(e) => {
                warn!("Real-time refresh for {} failed: {}", ticker, e);
                panel.apply_error(&e.to_string());
            }
        }

        sink.render(&panel);
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
