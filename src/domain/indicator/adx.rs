//! ADX (Average Directional Index) indicator.
//!
//! Per bar from bar 1: True Range, +DM and -DM.
//! +DM = high - prevHigh when it exceeds prevLow - low and is positive, else 0; -DM symmetric.
//!
//! Smoothed sums are seeded with the plain sum over bars 1..=n, then
//! `s[i] = s[i-1] - s[i-1]/n + raw[i]`.
//!
//! +DI / -DI = 100 * smoothed DM / smoothed TR (0 when smoothed TR is 0).
//! DX = 100 * |+DI - -DI| / (+DI + -DI) (0 when the sum is 0).
//!
//! First ADX = mean of DX over bars n+1..=2n, then Wilder smoothing.
//! All three lines start at bar 2n. Requires N >= 2n + 1; output length N - 2n.

use crate::domain::indicator::AdxSeries;
use crate::domain::indicator::atr::true_ranges;
use crate::domain::ohlcv::Bar;
use crate::domain::price_series::PriceSeries;

pub const DEFAULT_PERIOD: usize = 14;

pub fn calculate_adx(series: &PriceSeries, period: usize) -> Option<AdxSeries> {
    adx_from_bars(series.bars(), period)
}

fn directional_movement(prev: &Bar, curr: &Bar) -> (f64, f64) {
    let up_move = curr.high - prev.high;
    let down_move = prev.low - curr.low;

    let plus = if up_move > down_move && up_move > 0.0 {
        up_move
    } else {
        0.0
    };
    let minus = if down_move > up_move && down_move > 0.0 {
        down_move
    } else {
        0.0
    };
    (plus, minus)
}

/// Wilder running sums; element `j` belongs to bar `period + j`.
fn wilder_sums(raw: &[f64], period: usize) -> Vec<f64> {
    let mut sum: f64 = raw[..period].iter().sum();
    let mut out = Vec::with_capacity(raw.len() - period + 1);
    out.push(sum);
    for &value in &raw[period..] {
        sum = sum - sum / period as f64 + value;
        out.push(sum);
    }
    out
}

fn adx_from_bars(bars: &[Bar], period: usize) -> Option<AdxSeries> {
    if period == 0 || bars.len() < 2 * period + 1 {
        return None;
    }

    // raw[k] belongs to bar k + 1
    let tr = true_ranges(bars);
    let (plus_dm, minus_dm): (Vec<f64>, Vec<f64>) = bars
        .windows(2)
        .map(|w| directional_movement(&w[0], &w[1]))
        .unzip();

    let smoothed_tr = wilder_sums(&tr, period);
    let smoothed_plus = wilder_sums(&plus_dm, period);
    let smoothed_minus = wilder_sums(&minus_dm, period);

    // DI and DX from bar `period` onward
    let mut plus_di = Vec::with_capacity(smoothed_tr.len());
    let mut minus_di = Vec::with_capacity(smoothed_tr.len());
    let mut dx = Vec::with_capacity(smoothed_tr.len());

    for ((&s_tr, &s_plus), &s_minus) in smoothed_tr.iter().zip(&smoothed_plus).zip(&smoothed_minus)
    {
        let (pdi, mdi) = if s_tr > 0.0 {
            (100.0 * s_plus / s_tr, 100.0 * s_minus / s_tr)
        } else {
            (0.0, 0.0)
        };
        let di_sum = pdi + mdi;
        let value = if di_sum > 0.0 {
            100.0 * (pdi - mdi).abs() / di_sum
        } else {
            0.0
        };
        plus_di.push(pdi);
        minus_di.push(mdi);
        dx.push(value);
    }

    // dx[j] belongs to bar period + j, so bars n+1..=2n are dx[1..=period]
    let first_adx = dx[1..=period].iter().sum::<f64>() / period as f64;

    let mut adx = Vec::with_capacity(dx.len() - period);
    adx.push(first_adx);
    let mut current = first_adx;
    for &value in &dx[period + 1..] {
        current = (current * (period - 1) as f64 + value) / period as f64;
        adx.push(current);
    }

    Some(AdxSeries {
        adx,
        plus_di: plus_di.split_off(period),
        minus_di: minus_di.split_off(period),
    })
}
