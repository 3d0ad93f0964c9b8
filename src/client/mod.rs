pub mod http_client;
pub mod mock_feed;

use crate::errors::Result;
use crate::models::{AnalysisRequest, RealtimeSignal};
use async_trait::async_trait;
use serde_json::Value;

pub use self::http_client::ApiClient;
pub use self::mock_feed::MockSignalFeed;

// ── Source traits ─────────────────────────────────────────────────────────────

/// Historical analysis backend.
#[async_trait]
pub trait AnalysisApi: Send + Sync {
    /// Returns the parsed JSON document; interpreting it is the caller's job.
    async fn fetch_historical_analysis(&self, request: &AnalysisRequest) -> Result<Value>;
}

/// Swappable real-time signal source.
#[async_trait]
pub trait SignalFeed: Send + Sync {
    async fn fetch_realtime_signal(&self, ticker: &str, exp_name: &str) -> Result<RealtimeSignal>;
}
