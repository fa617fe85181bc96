#![allow(dead_code)]

use barsmith::domain::backtest::BacktestConfig;
use barsmith::domain::error::BarsmithError;
use barsmith::domain::ohlcv::Bar;
use barsmith::domain::price_series::PriceSeries;
use barsmith::domain::signal::Signal;
use barsmith::ports::data_port::DataPort;
use barsmith::ports::strategy_port::Strategy;
use chrono::{Duration, NaiveDate, NaiveDateTime};
use std::collections::HashMap;
use std::path::Path;

pub struct MockDataPort {
    pub data: HashMap<String, PriceSeries>,
    pub errors: HashMap<String, String>,
}

impl MockDataPort {
    pub fn new() -> Self {
        Self {
            data: HashMap::new(),
            errors: HashMap::new(),
        }
    }

    pub fn with_series(mut self, symbol: &str, series: PriceSeries) -> Self {
        self.data.insert(symbol.to_string(), series);
        self
    }

    pub fn with_error(mut self, symbol: &str, reason: &str) -> Self {
        self.errors.insert(symbol.to_string(), reason.to_string());
        self
    }
}

impl DataPort for MockDataPort {
    fn fetch_series(&self, symbol: &str) -> Result<PriceSeries, BarsmithError> {
        if let Some(reason) = self.errors.get(symbol) {
            return Err(BarsmithError::Data {
                reason: reason.clone(),
            });
        }
        Ok(self.data.get(symbol).cloned().unwrap_or_default())
    }

    fn list_symbols(&self) -> Result<Vec<String>, BarsmithError> {
        let mut symbols: Vec<String> = self.data.keys().cloned().collect();
        symbols.sort();
        Ok(symbols)
    }
}

/// Replays a fixed list of signals regardless of the data.
pub struct ScriptedStrategy {
    pub signals: Vec<Signal>,
}

impl ScriptedStrategy {
    pub fn new(signals: Vec<Signal>) -> Self {
        Self { signals }
    }
}

impl Strategy for ScriptedStrategy {
    fn name(&self) -> &str {
        "Scripted"
    }

    fn analyze(&self, _series: &PriceSeries) -> Vec<Signal> {
        self.signals.clone()
    }
}

pub fn day(n: i64) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2024, 1, 1)
        .unwrap()
        .and_hms_opt(0, 0, 0)
        .unwrap()
        + Duration::days(n)
}

/// Daily bars from 2024-01-01 with open/high/low derived from the close.
pub fn make_series(closes: &[f64]) -> PriceSeries {
    let bars = closes
        .iter()
        .enumerate()
        .map(|(i, &close)| Bar::new(day(i as i64), close, close + 1.0, close - 1.0, close, 1000.0))
        .collect();
    PriceSeries::new(bars).unwrap()
}

/// A zig-zag trend long enough for crossovers on short periods.
pub fn wave_closes(count: usize) -> Vec<f64> {
    (0..count)
        .map(|i| 100.0 + 10.0 * ((i as f64) / 6.0).sin() + i as f64 * 0.1)
        .collect()
}

/// Commission and slippage off, full position size.
pub fn frictionless_config(initial_capital: f64) -> BacktestConfig {
    BacktestConfig {
        initial_capital,
        commission_rate: 0.0,
        slippage_rate: 0.0,
        position_size: 1.0,
        risk_free_rate: 0.0,
    }
}

/// Writes `<dir>/<symbol>.csv` in the format `CsvAdapter` reads.
pub fn write_csv(dir: &Path, symbol: &str, closes: &[f64]) {
    let mut content = String::from("timestamp,open,high,low,close,volume\n");
    for (i, &close) in closes.iter().enumerate() {
        content.push_str(&format!(
            "{},{},{},{},{},1000\n",
            day(i as i64).format("%Y-%m-%d"),
            close,
            close + 1.0,
            close - 1.0,
            close
        ));
    }
    std::fs::write(dir.join(format!("{}.csv", symbol)), content).unwrap();
}
