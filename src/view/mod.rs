//! Display models: what the terminal shows, already formatted.
//!
//! Missing response fields are default-filled here and only here.

pub mod export;
pub mod terminal;

use crate::models::{AnalysisResponse, AnalystSignal, DayRecord, ManagerDecision, RealtimeSignal};
use crate::utils::{fmt_number, truncate_chars};
use std::fmt;

const PLACEHOLDER: &str = "-";
const NO_DATA: &str = "无";
const NO_SUMMARY: &str = "无摘要信息。";
const REASON_CHARS: usize = 30;

// ── Historical view ───────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq)]
pub struct HistoricalView {
    pub stock_name: String,
    pub ticker: String,
    pub exp_name: String,
    pub period: String,
    pub trend_summary: String,
    pub rows: Vec<DayRow>,
    pub total_days: String,
    pub bullish_days: String,
    pub bearish_days: String,
    pub neutral_days: String,
    pub chart_note: String,
}

/// One line of the daily detail table.
#[derive(Debug, Clone, PartialEq)]
pub struct DayRow {
    pub date: String,
    pub analyst_signals: String,
    pub manager_decision: String,
    pub sentiment: String,
    pub close_price: String,
}

impl HistoricalView {
    /// Build a fresh view; the table is rebuilt from `daily_breakdown` every call.
    pub fn from_response(data: &AnalysisResponse) -> Self {
        let ticker = data.ticker.clone().unwrap_or_else(|| PLACEHOLDER.into());

        let period = match &data.analysis_period {
            Some(p) => format!(
                "{} 到 {}",
                p.start.as_deref().unwrap_or(PLACEHOLDER),
                p.end.as_deref().unwrap_or(PLACEHOLDER)
            ),
            None => PLACEHOLDER.into(),
        };

        let stats = data.statistics.clone().unwrap_or_default();
        let count = |n: Option<u64>| fmt_number(n.unwrap_or(0));

        Self {
            stock_name: ticker.clone(),
            ticker: ticker.clone(),
            exp_name: data.experiment_name.clone().unwrap_or_else(|| PLACEHOLDER.into()),
            period,
            trend_summary: data
                .overall_trend_summary
                .clone()
                .filter(|s| !s.is_empty())
                .unwrap_or_else(|| NO_SUMMARY.into()),
            rows: data.daily_breakdown.iter().map(DayRow::from_record).collect(),
            total_days: count(stats.total_days_analyzed),
            bullish_days: count(stats.bullish_sentiment_days),
            bearish_days: count(stats.bearish_sentiment_days_approx),
            neutral_days: count(stats.neutral_sentiment_days_approx),
            chart_note: format!("图表数据已接收，等待渲染 ({})", ticker),
        }
    }
}

impl DayRow {
    fn from_record(day: &DayRecord) -> Self {
        let analyst_signals = if day.analyst_signals.is_empty() {
            NO_DATA.to_string()
        } else {
            day.analyst_signals
                .iter()
                .map(format_signal)
                .collect::<Vec<_>>()
                .join("; ")
        };

        Self {
            date: day.date.clone().unwrap_or_else(|| PLACEHOLDER.into()),
            analyst_signals,
            manager_decision: day
                .manager_decision
                .as_ref()
                .map(format_decision)
                .unwrap_or_else(|| NO_DATA.into()),
            sentiment: day
                .overall_sentiment_of_day
                .clone()
                .filter(|s| !s.is_empty())
                .unwrap_or_else(|| PLACEHOLDER.into()),
            close_price: day
                .price_info
                .as_ref()
                .and_then(|p| p.close_price.clone())
                .filter(|p| !p.is_empty())
                .unwrap_or_else(|| PLACEHOLDER.into()),
        }
    }
}

/// "technical: Bullish (MACD crossover...)"
fn format_signal(s: &AnalystSignal) -> String {
    format!(
        "{}: {} ({}...)",
        s.analyst.as_deref().unwrap_or(PLACEHOLDER),
        s.signal.as_deref().unwrap_or(PLACEHOLDER),
        truncate_chars(s.reason.as_deref().unwrap_or_default(), REASON_CHARS)
    )
}

fn format_decision(d: &ManagerDecision) -> String {
    format!(
        "{} ({}...)",
        d.action.as_deref().unwrap_or(PLACEHOLDER),
        truncate_chars(d.reason.as_deref().unwrap_or_default(), REASON_CHARS)
    )
}

impl fmt::Display for HistoricalView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "─────────────────────────────────")?;
        writeln!(f, "  {} ({})", self.stock_name, self.ticker)?;
        writeln!(f, "─────────────────────────────────")?;
        writeln!(f, "  实验     : {}", self.exp_name)?;
        writeln!(f, "  分析区间 : {}", self.period)?;
        writeln!(f, "  趋势摘要 : {}", self.trend_summary)?;
        writeln!(f, "─────────────────────────────────")?;
        writeln!(f, "  日期 | 分析师信号 | 经理决策 | 当日情绪 | 收盘价")?;
        for row in &self.rows {
            writeln!(
                f,
                "  {} | {} | {} | {} | {}",
                row.date, row.analyst_signals, row.manager_decision, row.sentiment, row.close_price
            )?;
        }
        writeln!(f, "─────────────────────────────────")?;
        writeln!(f, "  总天数   : {}", self.total_days)?;
        writeln!(f, "  看涨天数 : {}", self.bullish_days)?;
        writeln!(f, "  看跌天数 : {}", self.bearish_days)?;
        writeln!(f, "  中性天数 : {}", self.neutral_days)?;
        writeln!(f, "  {}", self.chart_note)?;
        write!(f, "─────────────────────────────────")
    }
}

// ── Real-time panel ───────────────────────────────────────────────────────────

/// Visual category of the current signal; `Neutral` is the reset state.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SignalCategory {
    Buy,
    Sell,
    Hold,
    #[default]
    Neutral,
}

impl SignalCategory {
    pub fn from_label(label: &str) -> Self {
        match label.to_lowercase().as_str() {
            "buy" => Self::Buy,
            "sell" => Self::Sell,
            "hold" => Self::Hold,
            _ => Self::Neutral,
        }
    }

    pub fn marker(self) -> &'static str {
        match self {
            Self::Buy => "▲",
            Self::Sell => "▼",
            Self::Hold => "■",
            Self::Neutral => "·",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct RealtimePanel {
    pub ticker: String,
    pub price: String,
    pub signal_text: String,
    pub reason: String,
    pub category: SignalCategory,
}

impl RealtimePanel {
    pub fn new(ticker: &str) -> Self {
        Self {
            ticker: ticker.to_string(),
            price: PLACEHOLDER.into(),
            signal_text: PLACEHOLDER.into(),
            reason: PLACEHOLDER.into(),
            category: SignalCategory::Neutral,
        }
    }

    /// Replace price, signal, reason and category with a fresh reading.
    pub fn apply(&mut self, sig: &RealtimeSignal) {
        self.price = sig
            .current_price
            .map(|p| format!("{:.2}", p))
            .unwrap_or_else(|| PLACEHOLDER.into());
        self.signal_text = format!("建议：{}", sig.signal.as_deref().unwrap_or(PLACEHOLDER));
        self.reason = sig.reason.clone().unwrap_or_else(|| PLACEHOLDER.into());
        self.category = sig
            .signal
            .as_deref()
            .map(SignalCategory::from_label)
            .unwrap_or_default();
    }

    /// Error state for a failed refresh; the last price stays on screen.
    pub fn apply_error(&mut self, message: &str) {
        self.signal_text = "错误".into();
        self.reason = format!("获取实时信号失败: {}", message);
        self.category = SignalCategory::Neutral;
    }
}

impl fmt::Display for RealtimePanel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} {} | {} | {}",
            self.category.marker(),
            self.ticker,
            self.price,
            self.signal_text,
            self.reason
        )
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn view_of(doc: serde_json::Value) -> HistoricalView {
        HistoricalView::from_response(&AnalysisResponse::from_document(doc).unwrap())
    }

    #[test]
    fn test_aapl_empty_breakdown_scenario() {
        let view = view_of(json!({
            "ticker": "AAPL",
            "analysis_period": {"start": "2023-01-01", "end": "2023-03-31"},
            "daily_breakdown": [],
            "statistics": {"total_days_analyzed": 0}
        }));

        assert_eq!(view.ticker, "AAPL");
        assert_eq!(view.stock_name, "AAPL");
        assert_eq!(view.period, "2023-01-01 到 2023-03-31");
        assert!(view.rows.is_empty());
        assert_eq!(view.total_days, "0");
        assert_eq!(view.exp_name, "-");
        assert_eq!(view.trend_summary, "无摘要信息。");
        assert_eq!(view.chart_note, "图表数据已接收，等待渲染 (AAPL)");
    }

    #[test]
    fn test_rows_follow_breakdown_order() {
        let days: Vec<_> = (1..=5)
            .map(|d| json!({"date": format!("2023-01-0{}", d)}))
            .collect();
        let view = view_of(json!({"daily_breakdown": days}));

        let dates: Vec<_> = view.rows.iter().map(|r| r.date.as_str()).collect();
        assert_eq!(dates, ["2023-01-01", "2023-01-02", "2023-01-03", "2023-01-04", "2023-01-05"]);
    }

    #[test]
    fn test_row_formatting_and_truncation() {
        let long_reason = "Price broke above the 50-day moving average on volume";
        let view = view_of(json!({
            "daily_breakdown": [{
                "date": "2023-01-03",
                "analyst_signals": [
                    {"analyst": "technical", "signal": "Bullish", "reason": long_reason},
                    {"analyst": "policy", "signal": "Neutral", "reason": "No change"}
                ],
                "manager_decision": {"action": "Buy", "reason": "技术面与政策面共振"},
                "overall_sentiment_of_day": "Bullish",
                "price_info": {"close_price": 125.07}
            }]
        }));

        let row = &view.rows[0];
        assert_eq!(
            row.analyst_signals,
            "technical: Bullish (Price broke above the 50-day m...); policy: Neutral (No change...)"
        );
        assert_eq!(row.manager_decision, "Buy (技术面与政策面共振...)");
        assert_eq!(row.sentiment, "Bullish");
        assert_eq!(row.close_price, "125.07");
    }

    #[test]
    fn test_row_defaults() {
        let view = view_of(json!({"daily_breakdown": [{"date": "2023-01-03"}]}));
        let row = &view.rows[0];
        assert_eq!(row.analyst_signals, "无");
        assert_eq!(row.manager_decision, "无");
        assert_eq!(row.sentiment, "-");
        assert_eq!(row.close_price, "-");
    }

    #[test]
    fn test_null_arrays_render_placeholders() {
        let view = view_of(json!({"ticker": "AAPL", "daily_breakdown": null}));
        assert!(view.rows.is_empty());

        let view = view_of(json!({
            "daily_breakdown": [{
                "date": "2023-01-03",
                "analyst_signals": null,
                "price_info": {"close_price": "1730.50"}
            }]
        }));
        assert_eq!(view.rows[0].analyst_signals, "无");
        assert_eq!(view.rows[0].close_price, "1730.50");
    }

    #[test]
    fn test_missing_period_and_statistics() {
        let view = view_of(json!({"analysis_period": {"start": "2023-01-01"}}));
        assert_eq!(view.period, "2023-01-01 到 -");
        assert_eq!(view.ticker, "-");
        assert_eq!(
            (view.total_days.as_str(), view.bullish_days.as_str(), view.bearish_days.as_str(), view.neutral_days.as_str()),
            ("0", "0", "0", "0")
        );

        assert_eq!(view_of(json!({})).period, "-");
    }

    #[test]
    fn test_signal_category_from_label() {
        assert_eq!(SignalCategory::from_label("Buy"), SignalCategory::Buy);
        assert_eq!(SignalCategory::from_label("SELL"), SignalCategory::Sell);
        assert_eq!(SignalCategory::from_label("hold"), SignalCategory::Hold);
        assert_eq!(SignalCategory::from_label("Strong Buy"), SignalCategory::Neutral);
    }

    #[test]
    fn test_panel_error_keeps_price() {
        let mut panel = RealtimePanel::new("AAPL");
        panel.apply(&RealtimeSignal {
            current_price: Some(101.5),
            signal: Some("Buy".into()),
            reason: Some("breakout".into()),
            timestamp: None,
        });
        assert_eq!(panel.price, "101.50");
        assert_eq!(panel.signal_text, "建议：Buy");
        assert_eq!(panel.category, SignalCategory::Buy);

        panel.apply_error("network error: connection refused");
        assert_eq!(panel.price, "101.50");
        assert_eq!(panel.signal_text, "错误");
        assert_eq!(panel.reason, "获取实时信号失败: network error: connection refused");
        assert_eq!(panel.category, SignalCategory::Neutral);
    }
}
