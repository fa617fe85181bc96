//! Stochastic RSI indicator.
//!
//! %K = 100 * (RSI - min(RSI, m)) / (max(RSI, m) - min(RSI, m)), 100 for a flat window.
//! %K is smoothed with SMA(smooth_k) when smooth_k > 1.
//! %D = SMA(smooth_d) of the (smoothed) %K when smooth_d > 1, otherwise %K itself.
//! K and D are aligned to a common tail.

use crate::domain::align::align_pair;
use crate::domain::indicator::StochRsiSeries;
use crate::domain::indicator::rsi::rsi_values;
use crate::domain::indicator::sma::sma_values;
use crate::domain::price_series::PriceSeries;

pub fn calculate_stoch_rsi(
    series: &PriceSeries,
    rsi_period: usize,
    stoch_period: usize,
    smooth_k: usize,
    smooth_d: usize,
) -> Option<StochRsiSeries> {
    stoch_rsi_values(
        &series.closes(),
        rsi_period,
        stoch_period,
        smooth_k,
        smooth_d,
    )
}

pub fn stoch_rsi_values(
    values: &[f64],
    rsi_period: usize,
    stoch_period: usize,
    smooth_k: usize,
    smooth_d: usize,
) -> Option<StochRsiSeries> {
    if stoch_period == 0 || smooth_k == 0 || smooth_d == 0 {
        return None;
    }

    let rsi = rsi_values(values, rsi_period);
    if rsi.len() < stoch_period {
        return None;
    }

    let raw_k: Vec<f64> = rsi
        .windows(stoch_period)
        .map(|window| {
            let current = window[window.len() - 1];
            let (min, max) = window
                .iter()
                .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &v| {
                    (lo.min(v), hi.max(v))
                });
            if max - min == 0.0 {
                100.0
            } else {
                100.0 * (current - min) / (max - min)
            }
        })
        .collect();

    let k = smooth(raw_k, smooth_k)?;
    let d = smooth(k.clone(), smooth_d)?;

    let (k, d) = align_pair(&k, &d);
    Some(StochRsiSeries {
        k: k.to_vec(),
        d: d.to_vec(),
    })
}

/// SMA smoothing for width > 1; `None` when the window exceeds the data.
fn smooth(values: Vec<f64>, width: usize) -> Option<Vec<f64>> {
    if width <= 1 {
        return Some(values);
    }
    let smoothed = sma_values(&values, width);
    if smoothed.is_empty() {
        None
    } else {
        Some(smoothed)
    }
}
