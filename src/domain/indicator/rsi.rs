//! RSI (Relative Strength Index) indicator implementation.
//!
//! Uses Wilder's smoothing for average gain/loss calculation:
//! - First average: simple mean of gains/losses over changes at bars 1..=n
//! - Subsequent: avg = (prev_avg * (n-1) + current) / n
//!
//! Formula: RSI = 100 - (100 / (1 + avg_gain / avg_loss))
//! If avg_loss == 0: RSI = 100
//!
//! Bar 0 has no change, so the first value lands on bar n. Output length: N - n.

use crate::domain::indicator::{IndicatorSeries, IndicatorType};
use crate::domain::price_series::PriceSeries;

pub fn calculate_rsi(series: &PriceSeries, period: usize) -> IndicatorSeries {
    IndicatorSeries::new(IndicatorType::Rsi(period), rsi_values(&series.closes(), period))
}

pub fn rsi_values(values: &[f64], period: usize) -> Vec<f64> {
    if period == 0 || values.len() < period + 1 {
        return Vec::new();
    }

    let mut gains: Vec<f64> = Vec::with_capacity(values.len() - 1);
    let mut losses: Vec<f64> = Vec::with_capacity(values.len() - 1);

    for w in values.windows(2) {
        let change = w[1] - w[0];
        if change > 0.0 {
            gains.push(change);
            losses.push(0.0);
        } else {
            gains.push(0.0);
            losses.push(change.abs());
        }
    }

    let mut avg_gain = gains[..period].iter().sum::<f64>() / period as f64;
    let mut avg_loss = losses[..period].iter().sum::<f64>() / period as f64;

    let mut out = Vec::with_capacity(values.len() - period);
    out.push(rsi_from_averages(avg_gain, avg_loss));

    for (gain, loss) in gains[period..].iter().zip(&losses[period..]) {
        avg_gain = (avg_gain * (period - 1) as f64 + gain) / period as f64;
        avg_loss = (avg_loss * (period - 1) as f64 + loss) / period as f64;
        out.push(rsi_from_averages(avg_gain, avg_loss));
    }

    out
}

fn rsi_from_averages(avg_gain: f64, avg_loss: f64) -> f64 {
    if avg_loss == 0.0 {
        100.0
    } else {
        100.0 - (100.0 / (1.0 + avg_gain / avg_loss))
    }
}
