use anyhow::{Context, Result};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Top-level application configuration
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct AppConfig {
    #[serde(default)]
    pub api: ApiConfig,
    #[serde(default)]
    pub analysis: AnalysisDefaults,
    #[serde(default)]
    pub realtime: RealtimeConfig,
}

/// Backend API configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ApiConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// No timeout unless set; a hung request keeps the loading indicator up.
    #[serde(default)]
    pub timeout_secs: Option<u64>,

    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

/// Parameters sent with every historical analysis request
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AnalysisDefaults {
    #[serde(default = "default_exp_name")]
    pub exp_name: String,

    #[serde(default = "default_start_date")]
    pub start_date: NaiveDate,

    #[serde(default = "default_end_date")]
    pub end_date: NaiveDate,
}

/// Where real-time signals come from
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FeedSource {
    #[default]
    Mock,
    Http,
}

/// Real-time monitoring configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RealtimeConfig {
    #[serde(default)]
    pub source: FeedSource,

    #[serde(default = "default_refresh_interval_secs")]
    pub refresh_interval_secs: u64,

    #[serde(default = "default_mock_delay_ms")]
    pub mock_delay_ms: u64,
}

// ── Defaults ─────────────────────────────────────────────────────────────────

fn default_base_url() -> String {
    "http://localhost:8000/api".to_string()
}
fn default_user_agent() -> String {
    concat!("ticker-lens/", env!("CARGO_PKG_VERSION")).to_string()
}
fn default_exp_name() -> String {
    "ollama-test".to_string()
}
fn default_start_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2023, 1, 1).unwrap_or_default()
}
fn default_end_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2023, 3, 31).unwrap_or_default()
}
fn default_refresh_interval_secs() -> u64 {
    5
}
fn default_mock_delay_ms() -> u64 {
    1000
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            timeout_secs: None,
            user_agent: default_user_agent(),
        }
    }
}

impl Default for AnalysisDefaults {
    fn default() -> Self {
        Self {
            exp_name: default_exp_name(),
            start_date: default_start_date(),
            end_date: default_end_date(),
        }
    }
}

impl Default for RealtimeConfig {
    fn default() -> Self {
        Self {
            source: FeedSource::Mock,
            refresh_interval_secs: default_refresh_interval_secs(),
            mock_delay_ms: default_mock_delay_ms(),
        }
    }
}

// ── Loader ───────────────────────────────────────────────────────────────────

impl AppConfig {
    /// Load configuration from file + environment overrides
    pub fn load() -> Result<Self> {
        dotenv::dotenv().ok();

        let cfg = config::Config::builder()
            .add_source(
                config::File::with_name("config/default")
                    .required(false)
                    .format(config::FileFormat::Toml),
            )
            .add_source(
                config::File::with_name("config/local")
                    .required(false)
                    .format(config::FileFormat::Toml),
            )
            .add_source(config::Environment::with_prefix("TICKER_LENS").separator("__"))
            .build()
            .context("Failed to read configuration sources")?;

        cfg.try_deserialize()
            .context("Invalid configuration")
    }
}
