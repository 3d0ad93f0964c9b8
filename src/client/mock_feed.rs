use crate::client::SignalFeed;
use crate::errors::Result;
use crate::models::{RealtimeSignal, SIGNAL_LABELS};
use async_trait::async_trait;
use chrono::Utc;
use std::time::Duration;
use tokio::time::sleep;
use tracing::debug;

const MOCK_REASON: &str = "This is a mock real-time signal based on simulated data.";

/// Stand-in for a push or poll based real-time feed: waits a fixed delay, then
/// returns a random price and label without touching the network.
pub struct MockSignalFeed {
    delay: Duration,
}

impl MockSignalFeed {
    pub fn new(delay: Duration) -> Self {
        Self { delay }
    }
}

#[async_trait]
impl SignalFeed for MockSignalFeed {
    async fn fetch_realtime_signal(&self, ticker: &str, exp_name: &str) -> Result<RealtimeSignal> {
        debug!("Simulating real-time signal for {} ({})", ticker, exp_name);
        sleep(self.delay).await;

        // [50, 150), two decimals
        let price = (rand::random::<f64>() * 100.0 + 50.0) * 100.0;
        let label = SIGNAL_LABELS[rand::random::<u32>() as usize % SIGNAL_LABELS.len()];

        Ok(RealtimeSignal {
            current_price: Some(price.floor() / 100.0),
            signal: Some(label.to_string()),
            reason: Some(MOCK_REASON.to_string()),
            timestamp: Some(Utc::now()),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::time::Instant;

    #[tokio::test(start_paused = true)]
    async fn test_mock_signal_shape_and_delay() {
        let feed = MockSignalFeed::new(Duration::from_millis(1000));
        let started = Instant::now();

        for _ in 0..20 {
            let sig = feed.fetch_realtime_signal("AAPL", "ollama-test").await.unwrap();
            let price = sig.current_price.unwrap();
            assert!((50.0..150.0).contains(&price), "price out of range: {}", price);
            assert_eq!(format!("{:.2}", price).parse::<f64>().unwrap(), price);
            assert!(SIGNAL_LABELS.contains(&sig.signal.as_deref().unwrap()));
            assert_eq!(sig.reason.as_deref(), Some(MOCK_REASON));
        }

        assert!(started.elapsed() >= Duration::from_secs(20));
    }
}
