//! CSV file data adapter.
//!
//! One file per symbol, `<dir>/<SYMBOL>.csv`, with the header
//! `timestamp,open,high,low,close,volume`.

use crate::domain::error::BarsmithError;
use crate::domain::ohlcv::Bar;
use crate::domain::price_series::PriceSeries;
use crate::ports::data_port::DataPort;
use chrono::{NaiveDate, NaiveDateTime};
use std::fs;
use std::path::PathBuf;
use tracing::debug;

const DATETIME_FORMATS: [&str; 2] = ["%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M:%S"];
const DATE_FORMAT: &str = "%Y-%m-%d";

pub struct CsvAdapter {
    base_path: PathBuf,
}

impl CsvAdapter {
    pub fn new(base_path: PathBuf) -> Self {
        Self { base_path }
    }

    fn csv_path(&self, symbol: &str) -> PathBuf {
        self.base_path.join(format!("{}.csv", symbol))
    }
}

fn data_error(reason: impl Into<String>) -> BarsmithError {
    BarsmithError::Data {
        reason: reason.into(),
    }
}

pub(crate) fn parse_timestamp(raw: &str) -> Option<NaiveDateTime> {
    let raw = raw.trim();
    DATETIME_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
        .or_else(|| {
            NaiveDate::parse_from_str(raw, DATE_FORMAT)
                .ok()
                .and_then(|d| d.and_hms_opt(0, 0, 0))
        })
}

fn parse_field(record: &csv::StringRecord, index: usize, name: &str, row: usize) -> Result<f64, BarsmithError> {
    record
        .get(index)
        .ok_or_else(|| data_error(format!("row {}: missing {} column", row, name)))?
        .trim()
        .parse()
        .map_err(|e| data_error(format!("row {}: invalid {} value: {}", row, name, e)))
}

impl DataPort for CsvAdapter {
    fn fetch_series(&self, symbol: &str) -> Result<PriceSeries, BarsmithError> {
        let path = self.csv_path(symbol);
        let content = fs::read_to_string(&path)
            .map_err(|e| data_error(format!("failed to read {}: {}", path.display(), e)))?;

        let mut rdr = csv::Reader::from_reader(content.as_bytes());
        let mut bars = Vec::new();

        for (i, result) in rdr.records().enumerate() {
            let row = i + 1;
            let record = result.map_err(|e| data_error(format!("CSV parse error: {}", e)))?;

            let raw_ts = record
                .get(0)
                .ok_or_else(|| data_error(format!("row {}: missing timestamp column", row)))?;
            let timestamp = parse_timestamp(raw_ts).ok_or_else(|| {
                data_error(format!("row {}: invalid timestamp '{}'", row, raw_ts))
            })?;

            bars.push(Bar::new(
                timestamp,
                parse_field(&record, 1, "open", row)?,
                parse_field(&record, 2, "high", row)?,
                parse_field(&record, 3, "low", row)?,
                parse_field(&record, 4, "close", row)?,
                parse_field(&record, 5, "volume", row)?,
            ));
        }

        bars.sort_by_key(|b| b.timestamp);
        debug!(symbol, bars = bars.len(), path = %path.display(), "loaded bars");
        PriceSeries::new(bars)
    }

    fn list_symbols(&self) -> Result<Vec<String>, BarsmithError> {
        let entries = fs::read_dir(&self.base_path).map_err(|e| {
            data_error(format!(
                "failed to read directory {}: {}",
                self.base_path.display(),
                e
            ))
        })?;

        let mut symbols = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|e| data_error(format!("directory entry error: {}", e)))?;
            let path = entry.path();
            if path.extension().is_some_and(|ext| ext == "csv") {
                if let Some(stem) = path.file_stem() {
                    symbols.push(stem.to_string_lossy().into_owned());
                }
            }
        }

        symbols.sort();
        Ok(symbols)
    }
}
