//! Simple Moving Average indicator.
//!
//! SMA(n)[i] = (C[i-n+1] + ... + C[i]) / n
//! Output length: N - n + 1 (first value at bar n-1).

use crate::domain::indicator::{IndicatorSeries, IndicatorType};
use crate::domain::price_series::PriceSeries;

pub fn calculate_sma(series: &PriceSeries, period: usize) -> IndicatorSeries {
    IndicatorSeries::new(IndicatorType::Sma(period), sma_values(&series.closes(), period))
}

/// SMA over an arbitrary numeric sequence. Empty when `values.len() < period`.
pub fn sma_values(values: &[f64], period: usize) -> Vec<f64> {
    if period == 0 || values.len() < period {
        return Vec::new();
    }

    values
        .windows(period)
        .map(|w| w.iter().sum::<f64>() / period as f64)
        .collect()
}
