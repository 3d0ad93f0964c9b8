use crate::client::{AnalysisApi, SignalFeed};
use crate::config::ApiConfig;
use crate::errors::{ApiError, Result};
use crate::models::{AnalysisRequest, RealtimeSignal};
use async_trait::async_trait;
use reqwest::{Response, StatusCode};
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, error, warn};
use url::Url;

/// JSON-over-HTTP client for the analysis backend.
pub struct ApiClient {
    inner: reqwest::Client,
    base_url: Url,
}

impl ApiClient {
    pub fn new(config: &ApiConfig) -> Result<Self> {
        let mut builder = reqwest::Client::builder().user_agent(&config.user_agent);
        if let Some(secs) = config.timeout_secs {
            builder = builder.timeout(Duration::from_secs(secs));
        }

        // Url::join drops the last path segment unless the base ends in '/'
        let base = format!("{}/", config.base_url.trim_end_matches('/'));

        Ok(Self {
            inner: builder.build()?,
            base_url: Url::parse(&base)?,
        })
    }

    /// e.g. http://localhost:8000/api + historical_analysis
    fn endpoint(&self, path: &str) -> Result<Url> {
        Ok(self.base_url.join(path)?)
    }

    /// Map a response to its JSON document, or to a descriptive error on non-2xx.
    async fn read_json(resp: Response) -> Result<Value> {
        let status = resp.status();
        let body = resp.text().await?;

        if !status.is_success() {
            let message = error_body_message(status, &body);
            return Err(ApiError::Http {
                status: status.as_u16(),
                message,
            });
        }

        Ok(serde_json::from_str(&body)?)
    }
}

/// Pick the human-readable message from an error body: `detail`, then `message`,
/// then `error`; the status text when the body is not JSON.
fn error_body_message(status: StatusCode, body: &str) -> String {
    let fallback = || "Unknown error".to_string();

    let Ok(doc) = serde_json::from_str::<Value>(body) else {
        return status
            .canonical_reason()
            .map(str::to_string)
            .unwrap_or_else(fallback);
    };

    ["detail", "message", "error"]
        .iter()
        .find_map(|key| match doc.get(*key) {
            None | Some(Value::Null) => None,
            Some(Value::String(s)) if s.is_empty() => None,
            Some(Value::String(s)) => Some(s.clone()),
            Some(other) => Some(other.to_string()),
        })
        .unwrap_or_else(fallback)
}

#[async_trait]
impl AnalysisApi for ApiClient {
    async fn fetch_historical_analysis(&self, request: &AnalysisRequest) -> Result<Value> {
        let url = self.endpoint("historical_analysis")?;
        debug!("POST {} {:?}", url, request);

        let result = async {
            let resp = self.inner.post(url).json(request).send().await?;
            Self::read_json(resp).await
        }
        .await;

        if let Err(e) = &result {
            error!("Failed to fetch historical analysis for {}: {}", request.ticker, e);
        }
        result
    }
}

#[async_trait]
impl SignalFeed for ApiClient {
    async fn fetch_realtime_signal(&self, ticker: &str, exp_name: &str) -> Result<RealtimeSignal> {
        let mut url = self.endpoint("realtime_feed")?;
        url.query_pairs_mut()
            .append_pair("ticker", ticker)
            .append_pair("exp_name", exp_name);
        debug!("GET {}", url);

        let resp = self.inner.get(url).send().await?;
        let doc = Self::read_json(resp).await.inspect_err(|e| {
            warn!("Failed to fetch real-time signal for {}: {}", ticker, e);
        })?;
        Ok(serde_json::from_value(doc)?)
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
