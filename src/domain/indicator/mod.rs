//! Technical indicator implementations.
//!
//! This module provides types for representing indicator output:
//! - `IndicatorType`: indicator identity + parameters (serves as HashMap key)
//! - `IndicatorSeries`: a single tail-aligned output line
//! - `MacdSeries`, `BollingerSeries`, `AdxSeries`, `StochRsiSeries`: multi-line outputs
//!
//! Every output is aligned to the tail of its input: the last value belongs to
//! the last bar, and the series is shorter at the front by the warm-up length.
//! Insufficient input yields an empty series (single-line calculators) or
//! `None` (multi-line calculators).

pub mod adx;
pub mod atr;
pub mod bollinger;
pub mod ema;
pub mod macd;
pub mod rsi;
pub mod sma;
pub mod stddev;
pub mod stoch_rsi;
pub mod wma;

pub use adx::calculate_adx;
pub use atr::calculate_atr;
pub use bollinger::calculate_bollinger;
pub use ema::{calculate_ema, ema_values};
pub use macd::{calculate_macd, macd_values};
pub use rsi::{calculate_rsi, rsi_values};
pub use sma::{calculate_sma, sma_values};
pub use stddev::{calculate_stddev, stddev_values};
pub use stoch_rsi::calculate_stoch_rsi;
pub use wma::{calculate_wma, wma_values};

use std::fmt;
use std::str::FromStr;

use super::align::pad_front;
use super::error::BarsmithError;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum IndicatorType {
    Sma(usize),
    Ema(usize),
    Wma(usize),
    Rsi(usize),
    Atr(usize),
    Stddev(usize),
    Adx(usize),
    Macd {
        fast: usize,
        slow: usize,
        signal: usize,
    },
    Bollinger {
        period: usize,
        stddev_mult_x100: u32,
    },
    StochRsi {
        rsi_period: usize,
        stoch_period: usize,
        smooth_k: usize,
        smooth_d: usize,
    },
}

impl IndicatorType {
    /// Reject parameters outside their valid domain.
    pub fn validate(&self) -> Result<(), BarsmithError> {
        let invalid = |reason: &str| BarsmithError::InvalidIndicator {
            indicator: self.to_string(),
            reason: reason.to_string(),
        };

        match self {
            IndicatorType::Sma(p)
            | IndicatorType::Ema(p)
            | IndicatorType::Wma(p)
            | IndicatorType::Rsi(p)
            | IndicatorType::Atr(p)
            | IndicatorType::Stddev(p)
            | IndicatorType::Adx(p) => {
                if *p == 0 {
                    return Err(invalid("period must be at least 1"));
                }
            }
            IndicatorType::Macd { fast, slow, signal } => {
                if *fast == 0 || *slow == 0 || *signal == 0 {
                    return Err(invalid("periods must be at least 1"));
                }
                if fast >= slow {
                    return Err(invalid("fast period must be shorter than slow period"));
                }
            }
            IndicatorType::Bollinger {
                period,
                stddev_mult_x100,
            } => {
                if *period == 0 {
                    return Err(invalid("period must be at least 1"));
                }
                if *stddev_mult_x100 == 0 {
                    return Err(invalid("standard deviation multiplier must be positive"));
                }
            }
            IndicatorType::StochRsi {
                rsi_period,
                stoch_period,
                smooth_k,
                smooth_d,
            } => {
                if *rsi_period == 0 || *stoch_period == 0 || *smooth_k == 0 || *smooth_d == 0 {
                    return Err(invalid("periods must be at least 1"));
                }
            }
        }
        Ok(())
    }
}

impl fmt::Display for IndicatorType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IndicatorType::Sma(period) => write!(f, "SMA({})", period),
            IndicatorType::Ema(period) => write!(f, "EMA({})", period),
            IndicatorType::Wma(period) => write!(f, "WMA({})", period),
            IndicatorType::Rsi(period) => write!(f, "RSI({})", period),
            IndicatorType::Atr(period) => write!(f, "ATR({})", period),
            IndicatorType::Stddev(period) => write!(f, "STDDEV({})", period),
            IndicatorType::Adx(period) => write!(f, "ADX({})", period),
            IndicatorType::Macd { fast, slow, signal } => {
                write!(f, "MACD({},{},{})", fast, slow, signal)
            }
            IndicatorType::Bollinger {
                period,
                stddev_mult_x100,
            } => {
                let mult = *stddev_mult_x100 as f64 / 100.0;
                write!(f, "BOLLINGER({},{})", period, mult)
            }
            IndicatorType::StochRsi {
                rsi_period,
                stoch_period,
                smooth_k,
                smooth_d,
            } => write!(
                f,
                "STOCHRSI({},{},{},{})",
                rsi_period, stoch_period, smooth_k, smooth_d
            ),
        }
    }
}

impl FromStr for IndicatorType {
    type Err = BarsmithError;

    /// Parse the `Display` form, e.g. `MACD(12,26,9)` or `bollinger(20,2.5)`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = |reason: &str| BarsmithError::InvalidIndicator {
            indicator: s.to_string(),
            reason: reason.to_string(),
        };

        let trimmed = s.trim();
        let (name, rest) = trimmed
            .split_once('(')
            .ok_or_else(|| invalid("expected NAME(args)"))?;
        let args = rest
            .strip_suffix(')')
            .ok_or_else(|| invalid("missing closing parenthesis"))?;
        let args: Vec<&str> = args.split(',').map(str::trim).collect();

        let period = |i: usize| -> Result<usize, BarsmithError> {
            args.get(i)
                .ok_or_else(|| invalid("missing argument"))?
                .parse::<usize>()
                .map_err(|_| invalid("arguments must be non-negative integers"))
        };
        let expect_args = |n: usize| -> Result<(), BarsmithError> {
            if args.len() == n {
                Ok(())
            } else {
                Err(invalid(&format!("expected {} argument(s)", n)))
            }
        };

        match name.trim().to_ascii_uppercase().as_str() {
            "SMA" => expect_args(1).and(period(0)).map(IndicatorType::Sma),
            "EMA" => expect_args(1).and(period(0)).map(IndicatorType::Ema),
            "WMA" => expect_args(1).and(period(0)).map(IndicatorType::Wma),
            "RSI" => expect_args(1).and(period(0)).map(IndicatorType::Rsi),
            "ATR" => expect_args(1).and(period(0)).map(IndicatorType::Atr),
            "STDDEV" => expect_args(1).and(period(0)).map(IndicatorType::Stddev),
            "ADX" => expect_args(1).and(period(0)).map(IndicatorType::Adx),
            "MACD" => {
                expect_args(3)?;
                Ok(IndicatorType::Macd {
                    fast: period(0)?,
                    slow: period(1)?,
                    signal: period(2)?,
                })
            }
            "BOLLINGER" | "BB" => {
                expect_args(2)?;
                let mult: f64 = args[1]
                    .parse()
                    .map_err(|_| invalid("multiplier must be a number"))?;
                if !mult.is_finite() || mult < 0.0 {
                    return Err(invalid("multiplier must be a non-negative number"));
                }
                Ok(IndicatorType::Bollinger {
                    period: period(0)?,
                    stddev_mult_x100: (mult * 100.0).round() as u32,
                })
            }
            "STOCHRSI" => {
                expect_args(4)?;
                Ok(IndicatorType::StochRsi {
                    rsi_period: period(0)?,
                    stoch_period: period(1)?,
                    smooth_k: period(2)?,
                    smooth_d: period(3)?,
                })
            }
            _ => Err(invalid("unknown indicator name")),
        }
    }
}

/// A single tail-aligned indicator line.
#[derive(Debug, Clone, PartialEq)]
pub struct IndicatorSeries {
    pub indicator_type: IndicatorType,
    pub values: Vec<f64>,
}

impl IndicatorSeries {
    pub fn new(indicator_type: IndicatorType, values: Vec<f64>) -> Self {
        IndicatorSeries {
            indicator_type,
            values,
        }
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// An empty series is the insufficient-data outcome.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn last(&self) -> Option<f64> {
        self.values.last().copied()
    }

    /// Number of leading bars of an `input_len`-bar series without a value.
    pub fn offset(&self, input_len: usize) -> usize {
        input_len.saturating_sub(self.values.len())
    }

    /// One entry per input bar, `None` during warm-up.
    pub fn aligned_to(&self, input_len: usize) -> Vec<Option<f64>> {
        pad_front(&self.values, input_len)
    }

    /// Value belonging to `bar_index` of an `input_len`-bar series.
    pub fn value_at_bar(&self, bar_index: usize, input_len: usize) -> Option<f64> {
        let offset = self.offset(input_len);
        if bar_index < offset || bar_index >= input_len {
            return None;
        }
        self.values.get(bar_index - offset).copied()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct MacdSeries {
    pub macd_line: Vec<f64>,
    pub signal_line: Vec<f64>,
    pub histogram: Vec<f64>,
}

impl MacdSeries {
    pub fn len(&self) -> usize {
        self.histogram.len()
    }

    pub fn is_empty(&self) -> bool {
        self.histogram.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct BollingerSeries {
    pub upper: Vec<f64>,
    pub middle: Vec<f64>,
    pub lower: Vec<f64>,
}

impl BollingerSeries {
    pub fn len(&self) -> usize {
        self.middle.len()
    }

    pub fn is_empty(&self) -> bool {
        self.middle.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct AdxSeries {
    pub adx: Vec<f64>,
    pub plus_di: Vec<f64>,
    pub minus_di: Vec<f64>,
}

impl AdxSeries {
    pub fn len(&self) -> usize {
        self.adx.len()
    }

    pub fn is_empty(&self) -> bool {
        self.adx.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct StochRsiSeries {
    pub k: Vec<f64>,
    pub d: Vec<f64>,
}

impl StochRsiSeries {
    pub fn len(&self) -> usize {
        self.d.len()
    }

    pub fn is_empty(&self) -> bool {
        self.d.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn indicator_type_display_sma() {
        assert_eq!(IndicatorType::Sma(20).to_string(), "SMA(20)");
    }

    #[test]
    fn indicator_type_display_macd() {
        let macd = IndicatorType::Macd {
            fast: 12,
            slow: 26,
            signal: 9,
        };
        assert_eq!(macd.to_string(), "MACD(12,26,9)");
    }

    #[test]
    fn indicator_type_display_bollinger() {
        let boll = IndicatorType::Bollinger {
            period: 20,
            stddev_mult_x100: 200,
        };
        assert_eq!(boll.to_string(), "BOLLINGER(20,2)");
    }

    #[test]
    fn indicator_type_display_stoch_rsi() {
        let stoch = IndicatorType::StochRsi {
            rsi_period: 14,
            stoch_period: 14,
            smooth_k: 3,
            smooth_d: 3,
        };
        assert_eq!(stoch.to_string(), "STOCHRSI(14,14,3,3)");
    }

    #[test]
    fn parse_round_trips_display() {
        let types = [
            IndicatorType::Sma(20),
            IndicatorType::Adx(14),
            IndicatorType::Macd {
                fast: 12,
                slow: 26,
                signal: 9,
            },
            IndicatorType::Bollinger {
                period: 20,
                stddev_mult_x100: 250,
            },
            IndicatorType::StochRsi {
                rsi_period: 14,
                stoch_period: 14,
                smooth_k: 3,
                smooth_d: 3,
            },
        ];
        for t in types {
            let parsed: IndicatorType = t.to_string().parse().unwrap();
            assert_eq!(parsed, t);
        }
    }

    #[test]
    fn parse_is_case_insensitive() {
        let parsed: IndicatorType = " rsi( 14 ) ".parse().unwrap();
        assert_eq!(parsed, IndicatorType::Rsi(14));
    }

    #[test]
    fn parse_rejects_garbage() {
        assert!("SMA".parse::<IndicatorType>().is_err());
        assert!("SMA(x)".parse::<IndicatorType>().is_err());
        assert!("SMA(1,2)".parse::<IndicatorType>().is_err());
        assert!("FOO(3)".parse::<IndicatorType>().is_err());
        assert!("MACD(12,26)".parse::<IndicatorType>().is_err());
    }

    #[test]
    fn validate_rejects_zero_period() {
        assert!(IndicatorType::Sma(0).validate().is_err());
        assert!(IndicatorType::Sma(1).validate().is_ok());
    }

    #[test]
    fn validate_requires_fast_below_slow() {
        let bad = IndicatorType::Macd {
            fast: 26,
            slow: 12,
            signal: 9,
        };
        assert!(matches!(
            bad.validate(),
            Err(BarsmithError::InvalidIndicator { .. })
        ));
    }

    #[test]
    fn indicator_type_hash_eq() {
        use std::collections::HashMap;

        let mut map = HashMap::new();
        let sma20 = IndicatorType::Sma(20);
        let macd = IndicatorType::Macd {
            fast: 12,
            slow: 26,
            signal: 9,
        };

        map.insert(sma20.clone(), "sma20_series".to_string());
        map.insert(macd.clone(), "macd_series".to_string());

        assert_eq!(map.get(&IndicatorType::Sma(20)), Some(&"sma20_series".to_string()));
        assert_eq!(map.get(&macd), Some(&"macd_series".to_string()));
        assert_eq!(map.get(&IndicatorType::Sma(50)), None);
    }

    #[test]
    fn series_offset_and_alignment() {
        let series = IndicatorSeries::new(IndicatorType::Sma(3), vec![2.0, 3.0, 4.0]);
        assert_eq!(series.offset(5), 2);
        assert_eq!(
            series.aligned_to(5),
            vec![None, None, Some(2.0), Some(3.0), Some(4.0)]
        );
        assert_eq!(series.value_at_bar(1, 5), None);
        assert_eq!(series.value_at_bar(2, 5), Some(2.0));
        assert_eq!(series.value_at_bar(4, 5), Some(4.0));
        assert_eq!(series.value_at_bar(5, 5), None);
        assert_eq!(series.last(), Some(4.0));
    }
}
