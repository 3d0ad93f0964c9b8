//! CSV export of the daily detail table.

use crate::view::HistoricalView;
use anyhow::{Context, Result};
use std::path::Path;
use tracing::info;

const HEADER: [&str; 5] = [
    "date",
    "analyst_signals",
    "manager_decision",
    "sentiment",
    "close_price",
];

/// Write the rendered rows, in display order, as CSV.
pub fn export_csv(view: &HistoricalView, path: &Path) -> Result<()> {
    let mut writer = csv::Writer::from_path(path)
        .with_context(|| format!("Failed to create {:?}", path))?;

    writer.write_record(HEADER)?;
    for row in &view.rows {
        writer.write_record([
            &row.date,
            &row.analyst_signals,
            &row.manager_decision,
            &row.sentiment,
            &row.close_price,
        ])?;
    }
    writer.flush()?;

    info!("{}: {} rows exported to {:?}", view.ticker, view.rows.len(), path);
    Ok(())
}
