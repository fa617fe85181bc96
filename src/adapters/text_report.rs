//! Plain-text backtest report implementing ReportPort.
//!
//! Sections: summary metrics, per-trade details, LONG/SHORT breakdown.
//! An output path of `-` writes to stdout.

use std::fmt::Write as _;
use std::fs;
use std::io::Write as _;

use chrono::Duration;

use crate::domain::backtest::BacktestResult;
use crate::domain::error::BarsmithError;
use crate::domain::metrics::DirectionSummary;
use crate::domain::position::Trade;
use crate::ports::report_port::ReportPort;

const TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

pub struct TextReportAdapter;

impl TextReportAdapter {
    pub fn new() -> Self {
        Self
    }
}

impl Default for TextReportAdapter {
    fn default() -> Self {
        Self::new()
    }
}

impl ReportPort for TextReportAdapter {
    fn write(
        &self,
        result: &BacktestResult,
        strategy_name: &str,
        output_path: &str,
    ) -> Result<(), BarsmithError> {
        let report = render_report(result, strategy_name);
        if output_path == "-" {
            let mut stdout = std::io::stdout().lock();
            stdout.write_all(report.as_bytes())?;
            stdout.flush()?;
            return Ok(());
        }
        fs::write(output_path, report).map_err(|e| BarsmithError::Export {
            reason: format!("failed to write report {}: {}", output_path, e),
        })
    }
}

/// Human-readable duration, e.g. `3d 4h 0m`.
pub fn format_duration(duration: Duration) -> String {
    let total_minutes = duration.num_minutes();
    let days = total_minutes / (24 * 60);
    let hours = (total_minutes / 60) % 24;
    let minutes = total_minutes % 60;
    if days > 0 {
        format!("{}d {}h {}m", days, hours, minutes)
    } else {
        format!("{}h {}m", hours, minutes)
    }
}

pub fn render_report(result: &BacktestResult, strategy_name: &str) -> String {
    let mut out = String::new();
    render_summary(&mut out, result, strategy_name);
    if !result.trades.is_empty() {
        render_trades(&mut out, &result.trades);
        render_direction_summary(&mut out, result);
    }
    out
}

fn render_summary(out: &mut String, result: &BacktestResult, strategy_name: &str) {
    let m = &result.metrics;
    let _ = writeln!(out, "=== Backtest Results: {} ===", strategy_name);
    let _ = writeln!(out, "Initial Capital:  ${:.2}", result.initial_capital);
    let _ = writeln!(out, "Final Equity:     ${:.2}", result.final_equity);
    let _ = writeln!(out, "Total Trades:     {}", m.total_trades);
    let _ = writeln!(
        out,
        "Winning:          {} ({:.1}%)",
        m.winning_trades, m.win_rate
    );
    let _ = writeln!(out, "Losing:           {}", m.losing_trades);
    let _ = writeln!(out, "Total Profit:     ${:.2}", m.total_profit);
    let _ = writeln!(out, "Total Return:     {:.2}%", m.total_return);
    let _ = writeln!(out, "Max Drawdown:     {:.2}%", m.max_drawdown);
    let _ = writeln!(out, "Peak Drawdown:    {:.2}%", m.peak_drawdown);
    let _ = writeln!(out, "Avg Win:          ${:.2}", m.avg_win);
    let _ = writeln!(out, "Avg Loss:         ${:.2}", m.avg_loss);
    let _ = writeln!(out, "Largest Win:      ${:.2}", m.largest_win);
    let _ = writeln!(out, "Largest Loss:     ${:.2}", m.largest_loss);
    let _ = writeln!(out, "Profit Factor:    {:.2}", m.profit_factor);
    let _ = writeln!(out, "Sharpe Ratio:     {:.2}", m.sharpe_ratio);
}

fn render_trades(out: &mut String, trades: &[Trade]) {
    let _ = writeln!(out, "\n=== Trade Details ===");
    for (i, trade) in trades.iter().enumerate() {
        let status = if trade.profit < 0.0 { "LOSS" } else { "PROFIT" };
        let _ = writeln!(out, "\nTrade #{} [{}]", i + 1, status);
        let _ = writeln!(out, "  Type:     {}", trade.direction);
        let _ = writeln!(
            out,
            "  Entry:    {} at ${:.2}",
            trade.entry_time.format(TIME_FORMAT),
            trade.entry_price
        );
        let _ = writeln!(
            out,
            "  Exit:     {} at ${:.2} ({})",
            trade.exit_time.format(TIME_FORMAT),
            trade.exit_price,
            trade.exit_reason
        );
        let _ = writeln!(out, "  Duration: {}", format_duration(trade.duration()));
        let _ = writeln!(
            out,
            "  Price:    ${:.2} ({:.2}%)",
            trade.price_change(),
            trade.price_change_pct()
        );
        let _ = writeln!(
            out,
            "  P/L:      ${:.2} ({:.2}%)",
            trade.profit, trade.profit_pct
        );
    }
}

fn render_direction(out: &mut String, label: &str, summary: &DirectionSummary) {
    if summary.trades == 0 {
        return;
    }
    let _ = writeln!(out, "{}:", label);
    let _ = writeln!(
        out,
        "  Trades: {} (winners: {}, {:.1}%)",
        summary.trades, summary.winners, summary.win_rate
    );
    let _ = writeln!(out, "  Total P/L: ${:.2}", summary.total_profit);
    let _ = writeln!(out, "  Avg P/L:   ${:.2}", summary.avg_profit);
}

fn render_direction_summary(out: &mut String, result: &BacktestResult) {
    let _ = writeln!(out, "\n=== Summary by Direction ===");
    render_direction(out, "LONG", &result.metrics.long);
    render_direction(out, "SHORT", &result.metrics.short);
}
