//! RSI threshold strategy: long on a drop into oversold, flat on a rise into overbought.

use crate::domain::error::BarsmithError;
use crate::domain::indicator::rsi_values;
use crate::domain::price_series::PriceSeries;
use crate::domain::signal::{Direction, Signal};
use crate::ports::strategy_port::Strategy;

pub const DEFAULT_RSI_PERIOD: usize = 14;
pub const DEFAULT_OVERSOLD: f64 = 30.0;
pub const DEFAULT_OVERBOUGHT: f64 = 70.0;

#[derive(Debug, Clone)]
pub struct RsiThresholdStrategy {
    period: usize,
    oversold: f64,
    overbought: f64,
    name: String,
}

impl RsiThresholdStrategy {
    pub fn new(period: usize, oversold: f64, overbought: f64) -> Result<Self, BarsmithError> {
        if period == 0 {
            return Err(BarsmithError::invalid_parameter(
                "rsi_period",
                "must be at least 1",
            ));
        }
        if !(oversold > 0.0 && overbought < 100.0 && oversold < overbought) {
            return Err(BarsmithError::invalid_parameter(
                "oversold/overbought",
                format!(
                    "need 0 < oversold < overbought < 100, got {} / {}",
                    oversold, overbought
                ),
            ));
        }
        Ok(RsiThresholdStrategy {
            period,
            oversold,
            overbought,
            name: format!("RSI({}) {}/{}", period, oversold, overbought),
        })
    }
}

impl Strategy for RsiThresholdStrategy {
    fn name(&self) -> &str {
        &self.name
    }

    fn analyze(&self, series: &PriceSeries) -> Vec<Signal> {
        let rsi = rsi_values(&series.closes(), self.period);
        let offset = series.len() - rsi.len();

        let mut signals = Vec::new();
        for (i, w) in rsi.windows(2).enumerate() {
            let (prev, curr) = (w[0], w[1]);
            let Some(bar) = series.get(offset + i + 1) else {
                continue;
            };

            if prev >= self.oversold && curr < self.oversold {
                let strength = (self.oversold - curr) / self.oversold;
                signals.push(Signal::entry(bar.timestamp, bar.close, Direction::Long, strength));
            } else if prev <= self.overbought && curr > self.overbought {
                let strength = (curr - self.overbought) / (100.0 - self.overbought);
                signals.push(Signal::exit(bar.timestamp, bar.close, Direction::Long, strength));
            }
        }
        signals
    }
}
