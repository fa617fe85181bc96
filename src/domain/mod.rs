//! Core domain types and logic.

pub mod ohlcv;
pub mod price_series;
pub mod align;
pub mod indicator;
pub mod indicator_helpers;
pub mod crossover;
pub mod signal;
pub mod position;
pub mod backtest;
pub mod metrics;
pub mod config_validation;
pub mod error;
