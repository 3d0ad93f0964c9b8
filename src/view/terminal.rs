use crate::controller::Screen;
use crate::realtime::SignalSink;
use crate::view::{HistoricalView, RealtimePanel};
use std::io::Write;

/// Prints controller output to stdout/stderr.
#[derive(Default)]
pub struct TerminalScreen {
    loading: bool,
}

impl Screen for TerminalScreen {
    fn show_loading(&mut self, loading: bool) {
        if loading && !self.loading {
            eprintln!("正在加载分析数据…");
        }
        self.loading = loading;
    }

    fn show_error(&mut self, message: &str) {
        eprintln!("✗ {}", message);
    }

    // Nothing to hide on a scrolling terminal
    fn hide_error(&mut self) {}

    fn hide_panels(&mut self) {}

    fn show_historical(&mut self, view: &HistoricalView) {
        println!("{}", view);
    }
}

/// Writes one line per real-time refresh.
pub struct TerminalSink;

impl SignalSink for TerminalSink {
    fn render(&self, panel: &RealtimePanel) {
        let mut out = std::io::stdout().lock();
        let _ = writeln!(out, "[实时] {}", panel);
        let _ = out.flush();
    }
}
