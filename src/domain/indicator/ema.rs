//! Exponential Moving Average indicator.
//!
//! k = 2/(n+1), seed with the SMA of the first n values, then
//! EMA[t] = (C[t] - EMA[t-1]) * k + EMA[t-1].
//! Output length: N - n + 1.

use crate::domain::indicator::{IndicatorSeries, IndicatorType};
use crate::domain::price_series::PriceSeries;

pub fn calculate_ema(series: &PriceSeries, period: usize) -> IndicatorSeries {
    IndicatorSeries::new(IndicatorType::Ema(period), ema_values(&series.closes(), period))
}

/// EMA over an arbitrary numeric sequence, used directly by MACD's signal line.
pub fn ema_values(values: &[f64], period: usize) -> Vec<f64> {
    if period == 0 || values.len() < period {
        return Vec::new();
    }

    let k = 2.0 / (period as f64 + 1.0);
    let seed = values[..period].iter().sum::<f64>() / period as f64;

    let mut out = Vec::with_capacity(values.len() - period + 1);
    out.push(seed);

    let mut ema = seed;
    for &value in &values[period..] {
        ema = (value - ema) * k + ema;
        out.push(ema);
    }

    out
}
