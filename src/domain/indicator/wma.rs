//! Weighted Moving Average indicator.
//!
//! O(n) sliding window implementation using Diophantine technique.
//! WMA(n) = (1*P[i-n+1] + 2*P[i-n+2] + ... + n*P[i]) / (n*(n+1)/2)
//! Output length: N - n + 1.

use crate::domain::indicator::{IndicatorSeries, IndicatorType};
use crate::domain::price_series::PriceSeries;

pub fn calculate_wma(series: &PriceSeries, period: usize) -> IndicatorSeries {
    IndicatorSeries::new(IndicatorType::Wma(period), wma_values(&series.closes(), period))
}

pub fn wma_values(values: &[f64], period: usize) -> Vec<f64> {
    if period == 0 || values.len() < period {
        return Vec::new();
    }

    let mut out = Vec::with_capacity(values.len() - period + 1);
    let divisor = (period * (period + 1)) as f64 / 2.0;
    let mut weighted_sum: f64 = 0.0;
    let mut window_sum: f64 = 0.0;

    for (i, &value) in values.iter().enumerate() {
        if i < period {
            weighted_sum += (i + 1) as f64 * value;
            window_sum += value;
        } else {
            weighted_sum += period as f64 * value - window_sum;
            window_sum += value - values[i - period];
        }

        if i >= period - 1 {
            out.push(weighted_sum / divisor);
        }
    }

    out
}
