//! Analyze flow: validate the ticker, drive the screen through loading → result
//! or error, and always clear the loading indicator.

use crate::client::AnalysisApi;
use crate::config::AnalysisDefaults;
use crate::errors::{ApiError, Result};
use crate::models::{AnalysisRequest, AnalysisResponse};
use crate::utils::Timer;
use crate::view::HistoricalView;
use std::sync::Arc;
use tracing::{debug, warn};

pub const EMPTY_TICKER_MESSAGE: &str = "请输入股票代码。";

/// Display surface the controller writes to.
pub trait Screen {
    fn show_loading(&mut self, loading: bool);
    fn show_error(&mut self, message: &str);
    fn hide_error(&mut self);
    /// Hide both the historical and the real-time panel.
    fn hide_panels(&mut self);
    fn show_historical(&mut self, view: &HistoricalView);
}

pub struct Controller {
    api: Arc<dyn AnalysisApi>,
    params: AnalysisDefaults,
}

impl Controller {
    pub fn new(api: Arc<dyn AnalysisApi>, params: AnalysisDefaults) -> Self {
        Self { api, params }
    }

    pub fn exp_name(&self) -> &str {
        &self.params.exp_name
    }

    /// One "analyze" action for the raw ticker input.
    pub async fn handle_analyze(
        &self,
        screen: &mut dyn Screen,
        ticker_input: &str,
    ) -> Result<HistoricalView> {
        let ticker = ticker_input.trim();
        if ticker.is_empty() {
            screen.show_error(EMPTY_TICKER_MESSAGE);
            return Err(ApiError::Validation(EMPTY_TICKER_MESSAGE.into()));
        }

        screen.show_loading(true);
        screen.hide_error();
        screen.hide_panels();

        let result = self.analyze(ticker).await;

        match &result {
            Ok(view) => screen.show_historical(view),
            Err(e) => {
                warn!("Analysis for {} failed: {}", ticker, e);
                screen.show_error(&e.to_string());
            }
        }

        screen.show_loading(false);
        result
    }

    async fn analyze(&self, ticker: &str) -> Result<HistoricalView> {
        let _t = Timer::start(format!("historical analysis for {}", ticker));

        let request = AnalysisRequest {
            ticker: ticker.to_string(),
            exp_name: self.params.exp_name.clone(),
            start_date: self.params.start_date,
            end_date: self.params.end_date,
        };

        let doc = self.api.fetch_historical_analysis(&request).await?;
        debug!("Received historical document: {}", doc);

        let data = AnalysisResponse::from_document(doc)?;
        Ok(HistoricalView::from_response(&data))
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
