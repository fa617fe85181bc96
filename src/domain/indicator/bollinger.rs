//! Bollinger Bands indicator.
//!
//! Bollinger Bands consist of:
//! - Middle: Simple Moving Average (SMA) over n periods
//! - Upper: Middle + (multiplier × StdDev)
//! - Lower: Middle - (multiplier × StdDev)
//!
//! Where StdDev is population standard deviation (divides by N, not N-1).
//!
//! Default parameters: period=20, multiplier=2.0
//! Output length: N - n + 1.

use crate::domain::indicator::BollingerSeries;
use crate::domain::indicator::sma::sma_values;
use crate::domain::indicator::stddev::population_stddev;
use crate::domain::price_series::PriceSeries;

pub const DEFAULT_PERIOD: usize = 20;
pub const DEFAULT_MULTIPLIER: f64 = 2.0;

/// `None` when the series is shorter than `period`.
pub fn calculate_bollinger(
    series: &PriceSeries,
    period: usize,
    multiplier: f64,
) -> Option<BollingerSeries> {
    bollinger_values(&series.closes(), period, multiplier)
}

pub fn bollinger_values(values: &[f64], period: usize, multiplier: f64) -> Option<BollingerSeries> {
    let middle = sma_values(values, period);
    if middle.is_empty() {
        return None;
    }

    let mut upper = Vec::with_capacity(middle.len());
    let mut lower = Vec::with_capacity(middle.len());

    for (window, &mean) in values.windows(period).zip(&middle) {
        let stddev = population_stddev(window, mean);
        upper.push(mean + multiplier * stddev);
        lower.push(mean - multiplier * stddev);
    }

    Some(BollingerSeries {
        upper,
        middle,
        lower,
    })
}
