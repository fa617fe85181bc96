//! Standard Deviation indicator.
//!
//! Population standard deviation over n closing prices.
//! STDDEV(n)[i] = sqrt(sum((C[i-j] - SMA(n)[i])^2 for j in 0..n-1) / n)
//! Output length: N - n + 1.

use crate::domain::indicator::{IndicatorSeries, IndicatorType};
use crate::domain::price_series::PriceSeries;

pub fn calculate_stddev(series: &PriceSeries, period: usize) -> IndicatorSeries {
    IndicatorSeries::new(
        IndicatorType::Stddev(period),
        stddev_values(&series.closes(), period),
    )
}

pub fn stddev_values(values: &[f64], period: usize) -> Vec<f64> {
    if period == 0 || values.len() < period {
        return Vec::new();
    }

    values
        .windows(period)
        .map(|window| {
            let mean = window.iter().sum::<f64>() / period as f64;
            population_stddev(window, mean)
        })
        .collect()
}

/// sqrt(sum((x - mean)^2) / len); divides by the window size, not size - 1.
pub(crate) fn population_stddev(window: &[f64], mean: f64) -> f64 {
    let variance = window
        .iter()
        .map(|v| {
            let diff = v - mean;
            diff * diff
        })
        .sum::<f64>()
        / window.len() as f64;
    variance.sqrt()
}
