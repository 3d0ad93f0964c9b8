use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::errors::{ApiError, Result};

// ── Request ───────────────────────────────────────────────────────────────────

/// Body of `POST /historical_analysis`. Dates serialise as `YYYY-MM-DD`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AnalysisRequest {
    pub ticker: String,
    pub exp_name: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
}

// ── Historical analysis response ──────────────────────────────────────────────

/// Every field is optional; missing values are filled in by the view layer.
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
#[serde(default)]
pub struct AnalysisResponse {
    pub ticker: Option<String>,
    pub experiment_name: Option<String>,
    pub analysis_period: Option<AnalysisPeriod>,
    pub overall_trend_summary: Option<String>,
    #[serde(deserialize_with = "null_as_default")]
    pub daily_breakdown: Vec<DayRecord>,
    pub statistics: Option<Statistics>,
}

#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
#[serde(default)]
pub struct AnalysisPeriod {
    pub start: Option<String>,
    pub end: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
#[serde(default)]
pub struct DayRecord {
    pub date: Option<String>,
    #[serde(deserialize_with = "null_as_default")]
    pub analyst_signals: Vec<AnalystSignal>,
    pub manager_decision: Option<ManagerDecision>,
    pub overall_sentiment_of_day: Option<String>,
    pub price_info: Option<PriceInfo>,
}

#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
#[serde(default)]
pub struct AnalystSignal {
    pub analyst: Option<String>,
    pub signal: Option<String>,
    pub reason: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
#[serde(default)]
pub struct ManagerDecision {
    pub action: Option<String>,
    pub reason: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
#[serde(default)]
pub struct PriceInfo {
    /// Wire text kept as-is: "1730.50" stays "1730.50".
    #[serde(deserialize_with = "scalar_text")]
    pub close_price: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
#[serde(default)]
pub struct Statistics {
    pub total_days_analyzed: Option<u64>,
    pub bullish_sentiment_days: Option<u64>,
    pub bearish_sentiment_days_approx: Option<u64>,
    pub neutral_sentiment_days_approx: Option<u64>,
}

impl AnalysisResponse {
    /// Convert the raw document returned by the client, treating a null body or a
    /// truthy `error` field as an application-level failure.
    pub fn from_document(doc: Value) -> Result<Self> {
        if !doc.is_object() {
            return Err(ApiError::Application("未能获取有效的分析数据。".into()));
        }
        if let Some(message) = doc.get("error").and_then(error_message) {
            return Err(ApiError::Application(message));
        }
        Ok(serde_json::from_value(doc)?)
    }
}

/// `None` for falsy JSON values (null, false, 0, ""), else the display text.
fn error_message(v: &Value) -> Option<String> {
    match v {
        Value::Null | Value::Bool(false) => None,
        Value::String(s) if s.is_empty() => None,
        Value::String(s) => Some(s.clone()),
        Value::Number(n) if n.as_f64() == Some(0.0) => None,
        other => Some(other.to_string()),
    }
}

// ── Real-time signal ──────────────────────────────────────────────────────────

/// Fixed label set for trade recommendations.
pub const SIGNAL_LABELS: [&str; 3] = ["Buy", "Sell", "Hold"];

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct RealtimeSignal {
    #[serde(deserialize_with = "lenient_f64")]
    pub current_price: Option<f64>,
    pub signal: Option<String>,
    pub reason: Option<String>,
    pub timestamp: Option<DateTime<Utc>>,
}

// ── Helpers ───────────────────────────────────────────────────────────────────

/// Accept a number, a numeric string, or null.
/// 123.4 → Some(123.4) | "123.40" → Some(123.4) | "n/a" → None
fn lenient_f64<'de, D>(deserializer: D) -> std::result::Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let v = Option::<Value>::deserialize(deserializer)?;
    Ok(match v {
        Some(Value::Number(n)) => n.as_f64(),
        Some(Value::String(s)) => s.trim().parse().ok(),
        _ => None,
    })
}

/// Treat an explicit `null` like a missing key.
fn null_as_default<'de, D, T>(deserializer: D) -> std::result::Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Option::<T>::deserialize(deserializer).map(Option::unwrap_or_default)
}

/// Display text of a string, number or bool; `None` for null and containers.
/// "1730.50" → Some("1730.50") | 125.07 → Some("125.07") | null → None
fn scalar_text<'de, D>(deserializer: D) -> std::result::Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let v = Option::<Value>::deserialize(deserializer)?;
    Ok(match v {
        Some(Value::String(s)) => Some(s),
        Some(Value::Number(n)) => Some(n.to_string()),
        Some(Value::Bool(b)) => Some(b.to_string()),
        _ => None,
    })
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_request_serialises_wire_field_names() {
        let req = AnalysisRequest {
            ticker: "AAPL".into(),
            exp_name: "ollama-test".into(),
            start_date: NaiveDate::from_ymd_opt(2023, 1, 1).unwrap(),
            end_date: NaiveDate::from_ymd_opt(2023, 3, 31).unwrap(),
        };
        assert_eq!(
            serde_json::to_value(&req).unwrap(),
            json!({
                "ticker": "AAPL",
                "exp_name": "ollama-test",
                "start_date": "2023-01-01",
                "end_date": "2023-03-31"
            })
        );
    }

    #[test]
    fn test_full_document_parses() {
        let doc = json!({
            "ticker": "600519",
            "experiment_name": "ollama-test",
            "analysis_period": {"start": "2023-01-01", "end": "2023-01-02"},
            "overall_trend_summary": "Mostly bullish",
            "daily_breakdown": [{
                "date": "2023-01-03",
                "analyst_signals": [
                    {"analyst": "technical", "signal": "Bullish", "reason": "MACD crossover"}
                ],
                "manager_decision": {"action": "Buy", "reason": "momentum"},
                "overall_sentiment_of_day": "Bullish",
                "price_info": {"close_price": "1730.50", "open": 1700.0}
            }],
            "statistics": {"total_days_analyzed": 1, "bullish_sentiment_days": 1},
            "prices_raw": []
        });

        let resp = AnalysisResponse::from_document(doc).unwrap();
        assert_eq!(resp.ticker.as_deref(), Some("600519"));
        assert_eq!(resp.daily_breakdown.len(), 1);
        let day = &resp.daily_breakdown[0];
        assert_eq!(day.analyst_signals[0].analyst.as_deref(), Some("technical"));
        assert_eq!(day.price_info.as_ref().unwrap().close_price.as_deref(), Some("1730.50"));
        let stats = resp.statistics.unwrap();
        assert_eq!(stats.total_days_analyzed, Some(1));
        assert_eq!(stats.neutral_sentiment_days_approx, None);
    }

    #[test]
    fn test_null_fields_are_tolerated() {
        let doc = json!({
            "ticker": "AAPL",
            "daily_breakdown": [{"date": "2023-01-03", "manager_decision": null, "price_info": null}],
            "error": null
        });
        let resp = AnalysisResponse::from_document(doc).unwrap();
        assert!(resp.daily_breakdown[0].manager_decision.is_none());
        assert!(resp.statistics.is_none());
    }

    #[test]
    fn test_null_arrays_read_as_empty() {
        let resp = AnalysisResponse::from_document(json!({
            "ticker": "AAPL",
            "daily_breakdown": null
        }))
        .unwrap();
        assert!(resp.daily_breakdown.is_empty());

        let resp = AnalysisResponse::from_document(json!({
            "daily_breakdown": [{"date": "2023-01-03", "analyst_signals": null}]
        }))
        .unwrap();
        assert!(resp.daily_breakdown[0].analyst_signals.is_empty());
    }

    #[test]
    fn test_close_price_keeps_wire_text() {
        let price = |v: Value| {
            serde_json::from_value::<PriceInfo>(json!({"close_price": v}))
                .unwrap()
                .close_price
        };
        assert_eq!(price(json!("1730.50")).as_deref(), Some("1730.50"));
        assert_eq!(price(json!("n/a")).as_deref(), Some("n/a"));
        assert_eq!(price(json!(125.07)).as_deref(), Some("125.07"));
        assert_eq!(price(Value::Null), None);
    }

    #[test]
    fn test_error_field_is_application_error() {
        let err = AnalysisResponse::from_document(json!({"error": "No data for ticker"})).unwrap_err();
        assert!(matches!(err, ApiError::Application(ref m) if m == "No data for ticker"));

        // falsy error values do not count
        assert!(AnalysisResponse::from_document(json!({"error": ""})).is_ok());
        assert!(AnalysisResponse::from_document(json!({"error": false})).is_ok());
    }

    #[test]
    fn test_null_document_is_application_error() {
        let err = AnalysisResponse::from_document(Value::Null).unwrap_err();
        assert_eq!(err.to_string(), "未能获取有效的分析数据。");
    }

    #[test]
    fn test_wrong_shape_is_decode_error() {
        let err = AnalysisResponse::from_document(json!({"daily_breakdown": "oops"})).unwrap_err();
        assert!(matches!(err, ApiError::Decode(_)));
    }

    #[test]
    fn test_realtime_signal_accepts_string_price() {
        let sig: RealtimeSignal = serde_json::from_value(json!({
            "current_price": "101.25",
            "signal": "Hold",
            "reason": "flat",
            "timestamp": "2024-05-01T09:30:00Z"
        }))
        .unwrap();
        assert_eq!(sig.current_price, Some(101.25));
        assert_eq!(sig.signal.as_deref(), Some("Hold"));
        assert!(sig.timestamp.is_some());
    }
}
