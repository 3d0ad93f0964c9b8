mod client;
mod config;
mod controller;
mod errors;
mod models;
mod realtime;
mod utils;
mod view;

use anyhow::{Context, Result};
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use crate::client::{ApiClient, MockSignalFeed, SignalFeed};
use crate::config::{AppConfig, FeedSource};
use crate::controller::{Controller, Screen};
use crate::realtime::RealtimeMonitor;
use crate::view::HistoricalView;
use crate::view::export::export_csv;
use crate::view::terminal::{TerminalScreen, TerminalSink};

#[derive(Parser)]
#[command(name = "ticker-lens", about = "Historical analysis and real-time signal viewer", version)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Experiment (analysis configuration) name; overrides config
    #[arg(long, global = true, env = "TICKER_LENS_EXP_NAME")]
    exp_name: Option<String>,

    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,
}

#[derive(Subcommand)]
enum Command {
    /// Request a historical analysis and render it
    Analyze {
        ticker: String,

        /// Start date (YYYY-MM-DD)
        #[arg(long)]
        start: Option<NaiveDate>,

        /// End date (YYYY-MM-DD)
        #[arg(long)]
        end: Option<NaiveDate>,

        /// Also write the daily table to this CSV file
        #[arg(long)]
        export: Option<PathBuf>,

        /// Start real-time monitoring after a successful analysis
        #[arg(long)]
        watch: bool,
    },

    /// Poll the real-time signal for a ticker until Ctrl-C
    Watch { ticker: String },

    /// Read tickers from stdin, one analysis per line (`:watch <ticker>`, `:quit`)
    Interactive,

    /// Print the resolved configuration
    ShowConfig,
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let cli = Cli::parse();

    let filter = match cli.verbose {
        0 => "ticker_lens=info,warn",
        1 => "ticker_lens=debug,info",
        _ => "trace",
    };

    tracing_subscriber::registry()
        .with(fmt::layer().compact().with_target(false))
        .with(EnvFilter::new(filter))
        .init();

    let mut config = AppConfig::load()?;
    if let Some(exp_name) = cli.exp_name {
        config.analysis.exp_name = exp_name;
    }

    let client = Arc::new(ApiClient::new(&config.api).context("Failed to build API client")?);

    match cli.command {
        Command::Analyze {
            ticker,
            start,
            end,
            export,
            watch,
        } => {
            if let Some(start) = start {
                config.analysis.start_date = start;
            }
            if let Some(end) = end {
                config.analysis.end_date = end;
            }

            let controller = Controller::new(client.clone(), config.analysis.clone());
            let mut screen = TerminalScreen::default();

            if analyze_once(&controller, &mut screen, &ticker, export.as_deref())
                .await?
                .is_none()
            {
                return Ok(ExitCode::FAILURE);
            }

            if watch {
                let mut monitor = build_monitor(&config, client);
                monitor.start(ticker.trim(), controller.exp_name());
                wait_for_ctrl_c().await?;
            }
        }

        Command::Watch { ticker } => {
            let ticker = ticker.trim();
            anyhow::ensure!(!ticker.is_empty(), controller::EMPTY_TICKER_MESSAGE);

            let mut monitor = build_monitor(&config, client);
            monitor.start(ticker, &config.analysis.exp_name);
            wait_for_ctrl_c().await?;
        }

        Command::Interactive => {
            let controller = Controller::new(client.clone(), config.analysis.clone());
            let mut monitor = build_monitor(&config, client);
            let mut screen = TerminalScreen::default();
            let mut lines = BufReader::new(tokio::io::stdin()).lines();

            println!("输入股票代码后回车 (`:watch <代码>` 开始实时监控, `:quit` 退出)");
            while let Some(line) = lines.next_line().await? {
                let line = line.trim();
                if line == ":quit" {
                    break;
                }
                if let Some(ticker) = line.strip_prefix(":watch") {
                    let ticker = ticker.trim();
                    if ticker.is_empty() {
                        eprintln!("✗ {}", controller::EMPTY_TICKER_MESSAGE);
                    } else {
                        if monitor.is_running() {
                            info!("Switching real-time monitoring to {}", ticker);
                        }
                        monitor.start(ticker, controller.exp_name());
                    }
                    continue;
                }
                // Errors are already on screen; keep reading
                let _ = controller.handle_analyze(&mut screen, line).await;
            }
        }

        Command::ShowConfig => {
            println!("{}", serde_json::to_string_pretty(&config)?);
        }
    }

    Ok(ExitCode::SUCCESS)
}

/// One analysis plus the optional CSV export. `None` means the error banner is
/// already on screen.
async fn analyze_once(
    controller: &Controller,
    screen: &mut dyn Screen,
    ticker: &str,
    export: Option<&Path>,
) -> Result<Option<HistoricalView>> {
    let Ok(view) = controller.handle_analyze(screen, ticker).await else {
        return Ok(None);
    };

    if let Some(path) = export {
        export_csv(&view, path)?;
    }
    Ok(Some(view))
}

fn build_monitor(config: &AppConfig, client: Arc<ApiClient>) -> RealtimeMonitor {
    let feed: Arc<dyn SignalFeed> = match config.realtime.source {
        FeedSource::Mock => Arc::new(MockSignalFeed::new(Duration::from_millis(
            config.realtime.mock_delay_ms,
        ))),
        FeedSource::Http => client,
    };

    RealtimeMonitor::new(
        feed,
        Arc::new(TerminalSink),
        Duration::from_secs(config.realtime.refresh_interval_secs.max(1)),
    )
}

async fn wait_for_ctrl_c() -> Result<()> {
    info!("Press Ctrl-C to stop");
    tokio::signal::ctrl_c()
        .await
        .context("Failed to listen for Ctrl-C")
}
