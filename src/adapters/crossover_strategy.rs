//! Moving-average crossover strategy.
//!
//! Golden cross (fast above slow): exit any short, then enter long.
//! Death cross (fast below slow): exit any long, then enter short when shorting is allowed.

use std::fmt;

use crate::domain::crossover::{CrossoverKind, find_crossovers};
use crate::domain::error::BarsmithError;
use crate::domain::indicator::{ema_values, sma_values};
use crate::domain::price_series::PriceSeries;
use crate::domain::signal::{Direction, Signal};
use crate::ports::strategy_port::Strategy;

pub const DEFAULT_FAST_PERIOD: usize = 10;
pub const DEFAULT_SLOW_PERIOD: usize = 30;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AverageKind {
    Sma,
    Ema,
}

impl AverageKind {
    fn compute(self, values: &[f64], period: usize) -> Vec<f64> {
        match self {
            AverageKind::Sma => sma_values(values, period),
            AverageKind::Ema => ema_values(values, period),
        }
    }
}

impl fmt::Display for AverageKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AverageKind::Sma => write!(f, "SMA"),
            AverageKind::Ema => write!(f, "EMA"),
        }
    }
}

#[derive(Debug, Clone)]
pub struct MaCrossoverStrategy {
    fast: usize,
    slow: usize,
    average: AverageKind,
    allow_short: bool,
    name: String,
}

impl MaCrossoverStrategy {
    pub fn new(
        fast: usize,
        slow: usize,
        average: AverageKind,
        allow_short: bool,
    ) -> Result<Self, BarsmithError> {
        if fast == 0 || slow == 0 {
            return Err(BarsmithError::invalid_parameter(
                "fast_period/slow_period",
                "periods must be at least 1",
            ));
        }
        if fast >= slow {
            return Err(BarsmithError::invalid_parameter(
                "fast_period",
                format!("must be less than slow_period ({} >= {})", fast, slow),
            ));
        }
        Ok(MaCrossoverStrategy {
            fast,
            slow,
            average,
            allow_short,
            name: format!("{} Crossover ({}/{})", average, fast, slow),
        })
    }
}

/// `min(1, |fast - slow| / slow * 100)`
fn crossover_strength(fast: f64, slow: f64) -> f64 {
    if slow == 0.0 {
        return 0.0;
    }
    ((fast - slow).abs() / slow.abs() * 100.0).min(1.0)
}

impl Strategy for MaCrossoverStrategy {
    fn name(&self) -> &str {
        &self.name
    }

    fn analyze(&self, series: &PriceSeries) -> Vec<Signal> {
        let closes = series.closes();
        let fast = self.average.compute(&closes, self.fast);
        let slow = self.average.compute(&closes, self.slow);
        let aligned_len = fast.len().min(slow.len());
        let offset = series.len() - aligned_len;

        let mut signals = Vec::new();
        for event in find_crossovers(&fast, &slow) {
            let Some(bar) = series.get(offset + event.index) else {
                continue;
            };
            let strength = crossover_strength(event.line1_value, event.line2_value);

            match event.kind {
                CrossoverKind::Bullish => {
                    if self.allow_short {
                        signals.push(Signal::exit(bar.timestamp, bar.close, Direction::Short, strength));
                    }
                    signals.push(Signal::entry(bar.timestamp, bar.close, Direction::Long, strength));
                }
                CrossoverKind::Bearish => {
                    signals.push(Signal::exit(bar.timestamp, bar.close, Direction::Long, strength));
                    if self.allow_short {
                        signals.push(Signal::entry(bar.timestamp, bar.close, Direction::Short, strength));
                    }
                }
            }
        }
        signals
    }
}
