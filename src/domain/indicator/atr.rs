//! Average True Range indicator.
//!
//! TR[i] = max(H[i]-L[i], |H[i]-C[i-1]|, |L[i]-C[i-1]|) for i >= 1 (bar 0 has no TR).
//! Seed: mean of TR over bars 1..=n. Then Wilder: ATR = (prev * (n-1) + TR) / n.
//! First value lands on bar n. Output length: N - n.

use crate::domain::indicator::{IndicatorSeries, IndicatorType};
use crate::domain::ohlcv::Bar;
use crate::domain::price_series::PriceSeries;

pub fn calculate_atr(series: &PriceSeries, period: usize) -> IndicatorSeries {
    IndicatorSeries::new(IndicatorType::Atr(period), atr_values(series.bars(), period))
}

pub(crate) fn true_ranges(bars: &[Bar]) -> Vec<f64> {
    bars.windows(2)
        .map(|w| w[1].true_range(w[0].close))
        .collect()
}

fn atr_values(bars: &[Bar], period: usize) -> Vec<f64> {
    if period == 0 || bars.len() < period + 1 {
        return Vec::new();
    }

    let tr = true_ranges(bars);
    let seed = tr[..period].iter().sum::<f64>() / period as f64;

    let mut out = Vec::with_capacity(tr.len() - period + 1);
    out.push(seed);

    let mut atr = seed;
    for &value in &tr[period..] {
        atr = (atr * (period - 1) as f64 + value) / period as f64;
        out.push(atr);
    }

    out
}
