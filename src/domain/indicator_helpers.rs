//! Dispatch from an [`IndicatorType`] to its calculator.

use crate::domain::error::BarsmithError;
use crate::domain::indicator::{
    AdxSeries, BollingerSeries, IndicatorSeries, IndicatorType, MacdSeries, StochRsiSeries,
    calculate_adx, calculate_atr, calculate_bollinger, calculate_ema, calculate_macd,
    calculate_rsi, calculate_sma, calculate_stddev, calculate_stoch_rsi, calculate_wma,
};
use crate::domain::price_series::PriceSeries;

/// Result of any calculator, single- or multi-line.
#[derive(Debug, Clone, PartialEq)]
pub enum IndicatorOutput {
    Single(IndicatorSeries),
    Macd(MacdSeries),
    Bollinger(BollingerSeries),
    Adx(AdxSeries),
    StochRsi(StochRsiSeries),
}

impl IndicatorOutput {
    pub fn len(&self) -> usize {
        match self {
            IndicatorOutput::Single(s) => s.len(),
            IndicatorOutput::Macd(m) => m.len(),
            IndicatorOutput::Bollinger(b) => b.len(),
            IndicatorOutput::Adx(a) => a.len(),
            IndicatorOutput::StochRsi(s) => s.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Named output lines in a fixed order, for rendering and export.
    pub fn lines(&self) -> Vec<(&'static str, &[f64])> {
        match self {
            IndicatorOutput::Single(s) => vec![("value", s.values.as_slice())],
            IndicatorOutput::Macd(m) => vec![
                ("macd", m.macd_line.as_slice()),
                ("signal", m.signal_line.as_slice()),
                ("histogram", m.histogram.as_slice()),
            ],
            IndicatorOutput::Bollinger(b) => vec![
                ("upper", b.upper.as_slice()),
                ("middle", b.middle.as_slice()),
                ("lower", b.lower.as_slice()),
            ],
            IndicatorOutput::Adx(a) => vec![
                ("adx", a.adx.as_slice()),
                ("plus_di", a.plus_di.as_slice()),
                ("minus_di", a.minus_di.as_slice()),
            ],
            IndicatorOutput::StochRsi(s) => {
                vec![("k", s.k.as_slice()), ("d", s.d.as_slice())]
            }
        }
    }
}

/// Validate `indicator` and run it over `series`.
///
/// `Ok(None)` is the insufficient-data outcome; only invalid parameters are errors.
pub fn compute_indicator(
    series: &PriceSeries,
    indicator: &IndicatorType,
) -> Result<Option<IndicatorOutput>, BarsmithError> {
    indicator.validate()?;

    let single = |s: IndicatorSeries| {
        if s.is_empty() {
            None
        } else {
            Some(IndicatorOutput::Single(s))
        }
    };

    let output = match *indicator {
        IndicatorType::Sma(p) => single(calculate_sma(series, p)),
        IndicatorType::Ema(p) => single(calculate_ema(series, p)),
        IndicatorType::Wma(p) => single(calculate_wma(series, p)),
        IndicatorType::Rsi(p) => single(calculate_rsi(series, p)),
        IndicatorType::Atr(p) => single(calculate_atr(series, p)),
        IndicatorType::Stddev(p) => single(calculate_stddev(series, p)),
        IndicatorType::Adx(p) => calculate_adx(series, p).map(IndicatorOutput::Adx),
        IndicatorType::Macd { fast, slow, signal } => {
            calculate_macd(series, fast, slow, signal).map(IndicatorOutput::Macd)
        }
        IndicatorType::Bollinger {
            period,
            stddev_mult_x100,
        } => calculate_bollinger(series, period, stddev_mult_x100 as f64 / 100.0)
            .map(IndicatorOutput::Bollinger),
        IndicatorType::StochRsi {
            rsi_period,
            stoch_period,
            smooth_k,
            smooth_d,
        } => calculate_stoch_rsi(series, rsi_period, stoch_period, smooth_k, smooth_d)
            .map(IndicatorOutput::StochRsi),
    };

    Ok(output)
}
