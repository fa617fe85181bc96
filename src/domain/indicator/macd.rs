//! MACD (Moving Average Convergence Divergence) indicator.
//!
//! MACD Line = EMA(fast) - EMA(slow), after aligning both EMAs to a common tail
//! Signal Line = EMA(signal) of MACD Line
//! Histogram = MACD Line - Signal Line, after re-aligning MACD and signal
//!
//! Default parameters: fast=12, slow=26, signal=9
//! Output length: N - max(fast, slow) - signal + 2.

use crate::domain::align::align_pair;
use crate::domain::indicator::MacdSeries;
use crate::domain::indicator::ema::ema_values;
use crate::domain::price_series::PriceSeries;

pub const DEFAULT_FAST: usize = 12;
pub const DEFAULT_SLOW: usize = 26;
pub const DEFAULT_SIGNAL: usize = 9;

/// `None` when either EMA or the signal EMA lacks data.
pub fn calculate_macd(
    series: &PriceSeries,
    fast: usize,
    slow: usize,
    signal_period: usize,
) -> Option<MacdSeries> {
    macd_values(&series.closes(), fast, slow, signal_period)
}

pub fn calculate_macd_default(series: &PriceSeries) -> Option<MacdSeries> {
    calculate_macd(series, DEFAULT_FAST, DEFAULT_SLOW, DEFAULT_SIGNAL)
}

pub fn macd_values(
    values: &[f64],
    fast: usize,
    slow: usize,
    signal_period: usize,
) -> Option<MacdSeries> {
    let ema_fast = ema_values(values, fast);
    let ema_slow = ema_values(values, slow);
    if ema_fast.is_empty() || ema_slow.is_empty() {
        return None;
    }

    let (ema_fast, ema_slow) = align_pair(&ema_fast, &ema_slow);
    let macd_line: Vec<f64> = ema_fast
        .iter()
        .zip(ema_slow)
        .map(|(f, s)| f - s)
        .collect();

    let signal_line = ema_values(&macd_line, signal_period);
    if signal_line.is_empty() {
        return None;
    }

    let (macd_line, signal_line) = align_pair(&macd_line, &signal_line);
    let histogram = macd_line
        .iter()
        .zip(signal_line)
        .map(|(m, s)| m - s)
        .collect();

    Some(MacdSeries {
        macd_line: macd_line.to_vec(),
        signal_line: signal_line.to_vec(),
        histogram,
    })
}
