//! CSV export of trades and equity curves.

use std::fs::File;
use std::io::Write;
use std::path::Path;

use chrono::NaiveDateTime;

use crate::domain::backtest::EquityPoint;
use crate::domain::error::BarsmithError;
use crate::domain::position::Trade;

const TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

fn format_time(ts: &NaiveDateTime) -> String {
    ts.format(TIMESTAMP_FORMAT).to_string()
}

pub fn write_trades<W: Write>(writer: W, trades: &[Trade]) -> Result<(), BarsmithError> {
    let mut wtr = csv::Writer::from_writer(writer);
    wtr.write_record([
        "EntryTime",
        "ExitTime",
        "Type",
        "EntryPrice",
        "ExitPrice",
        "Profit",
        "ProfitPercent",
    ])?;

    for trade in trades {
        wtr.write_record([
            format_time(&trade.entry_time),
            format_time(&trade.exit_time),
            trade.direction.to_string(),
            format!("{:.2}", trade.entry_price),
            format!("{:.2}", trade.exit_price),
            format!("{:.2}", trade.profit),
            format!("{:.2}", trade.profit_pct),
        ])?;
    }

    wtr.flush()?;
    Ok(())
}

pub fn write_equity_curve<W: Write>(
    writer: W,
    equity_curve: &[EquityPoint],
) -> Result<(), BarsmithError> {
    let mut wtr = csv::Writer::from_writer(writer);
    wtr.write_record(["Time", "Equity"])?;

    for point in equity_curve {
        wtr.write_record([format_time(&point.timestamp), format!("{:.2}", point.equity)])?;
    }

    wtr.flush()?;
    Ok(())
}

pub fn export_trades(path: &Path, trades: &[Trade]) -> Result<(), BarsmithError> {
    let file = File::create(path).map_err(|e| BarsmithError::Export {
        reason: format!("failed to create {}: {}", path.display(), e),
    })?;
    write_trades(file, trades)
}

pub fn export_equity_curve(path: &Path, equity_curve: &[EquityPoint]) -> Result<(), BarsmithError> {
    let file = File::create(path).map_err(|e| BarsmithError::Export {
        reason: format!("failed to create {}: {}", path.display(), e),
    })?;
    write_equity_curve(file, equity_curve)
}
