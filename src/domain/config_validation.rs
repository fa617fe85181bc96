//! Configuration validation.
//!
//! Checks every `[backtest]` and `[strategy]` key before anything runs, so a bad
//! file fails with a section/key-qualified error instead of mid-backtest.

use crate::domain::error::BarsmithError;
use crate::ports::config_port::ConfigPort;

pub const STRATEGY_MA_CROSSOVER: &str = "ma_crossover";
pub const STRATEGY_RSI_THRESHOLD: &str = "rsi_threshold";

pub fn validate_backtest_config(config: &dyn ConfigPort) -> Result<(), BarsmithError> {
    validate_initial_capital(config)?;
    validate_commission(config)?;
    validate_slippage(config)?;
    validate_position_size(config)?;
    validate_risk_free_rate(config)?;
    Ok(())
}

pub fn validate_strategy_config(config: &dyn ConfigPort) -> Result<(), BarsmithError> {
    let name = config
        .get_string("strategy", "name")
        .ok_or_else(|| missing("strategy", "name"))?;

    match name.trim().to_ascii_lowercase().as_str() {
        STRATEGY_MA_CROSSOVER => validate_ma_crossover(config),
        STRATEGY_RSI_THRESHOLD => validate_rsi_threshold(config),
        _ => Err(BarsmithError::UnknownStrategy { name }),
    }
}

/// `Ok(None)` when the key is absent; an error when present but not a number.
pub(crate) fn read_f64(
    config: &dyn ConfigPort,
    section: &str,
    key: &str,
) -> Result<Option<f64>, BarsmithError> {
    match config.get_string(section, key) {
        None => Ok(None),
        Some(raw) => raw
            .trim()
            .parse::<f64>()
            .map(Some)
            .map_err(|_| invalid(section, key, format!("'{}' is not a number", raw))),
    }
}

/// `Ok(None)` when absent; an error when present but not a non-negative integer.
pub(crate) fn read_usize(
    config: &dyn ConfigPort,
    section: &str,
    key: &str,
) -> Result<Option<usize>, BarsmithError> {
    match config.get_string(section, key) {
        None => Ok(None),
        Some(raw) => raw
            .trim()
            .parse::<usize>()
            .map(Some)
            .map_err(|_| invalid(section, key, format!("'{}' is not a whole number", raw))),
    }
}

fn missing(section: &str, key: &str) -> BarsmithError {
    BarsmithError::ConfigMissing {
        section: section.to_string(),
        key: key.to_string(),
    }
}

fn invalid(section: &str, key: &str, reason: impl Into<String>) -> BarsmithError {
    BarsmithError::ConfigInvalid {
        section: section.to_string(),
        key: key.to_string(),
        reason: reason.into(),
    }
}

fn validate_initial_capital(config: &dyn ConfigPort) -> Result<(), BarsmithError> {
    let value = read_f64(config, "backtest", "initial_capital")?
        .ok_or_else(|| missing("backtest", "initial_capital"))?;
    if !value.is_finite() || value <= 0.0 {
        return Err(invalid(
            "backtest",
            "initial_capital",
            "initial_capital must be positive",
        ));
    }
    Ok(())
}

fn validate_commission(config: &dyn ConfigPort) -> Result<(), BarsmithError> {
    if let Some(value) = read_f64(config, "backtest", "commission")? {
        if !value.is_finite() || value < 0.0 {
            return Err(invalid(
                "backtest",
                "commission",
                "commission must be non-negative",
            ));
        }
    }
    Ok(())
}

fn validate_slippage(config: &dyn ConfigPort) -> Result<(), BarsmithError> {
    if let Some(value) = read_f64(config, "backtest", "slippage")? {
        if !(0.0..1.0).contains(&value) {
            return Err(invalid(
                "backtest",
                "slippage",
                "slippage must be in [0, 1)",
            ));
        }
    }
    Ok(())
}

fn validate_position_size(config: &dyn ConfigPort) -> Result<(), BarsmithError> {
    if let Some(value) = read_f64(config, "backtest", "position_size")? {
        if !(value > 0.0 && value <= 1.0) {
            return Err(invalid(
                "backtest",
                "position_size",
                "position_size must be in (0, 1]",
            ));
        }
    }
    Ok(())
}

fn validate_risk_free_rate(config: &dyn ConfigPort) -> Result<(), BarsmithError> {
    if let Some(value) = read_f64(config, "backtest", "risk_free_rate")? {
        if !(0.0..1.0).contains(&value) {
            return Err(invalid(
                "backtest",
                "risk_free_rate",
                "risk_free_rate must be between 0 and 1",
            ));
        }
    }
    Ok(())
}

fn validate_period(config: &dyn ConfigPort, key: &str) -> Result<Option<usize>, BarsmithError> {
    let value = read_usize(config, "strategy", key)?;
    if value == Some(0) {
        return Err(invalid("strategy", key, format!("{} must be at least 1", key)));
    }
    Ok(value)
}

fn validate_ma_crossover(config: &dyn ConfigPort) -> Result<(), BarsmithError> {
    if let Some(average) = config.get_string("strategy", "average") {
        match average.trim().to_ascii_lowercase().as_str() {
            "sma" | "ema" => {}
            _ => {
                return Err(invalid(
                    "strategy",
                    "average",
                    format!("expected sma or ema, got '{}'", average),
                ));
            }
        }
    }

    let fast = validate_period(config, "fast_period")?;
    let slow = validate_period(config, "slow_period")?;
    if let (Some(fast), Some(slow)) = (fast, slow) {
        if fast >= slow {
            return Err(invalid(
                "strategy",
                "fast_period",
                "fast_period must be less than slow_period",
            ));
        }
    }

    if let Some(raw) = config.get_string("strategy", "allow_short") {
        match raw.trim().to_ascii_lowercase().as_str() {
            "true" | "yes" | "1" | "false" | "no" | "0" => {}
            _ => {
                return Err(invalid(
                    "strategy",
                    "allow_short",
                    format!("'{}' is not a boolean", raw),
                ));
            }
        }
    }
    Ok(())
}

fn validate_rsi_threshold(config: &dyn ConfigPort) -> Result<(), BarsmithError> {
    validate_period(config, "rsi_period")?;

    let oversold = read_f64(config, "strategy", "oversold")?;
    let overbought = read_f64(config, "strategy", "overbought")?;
    for (key, value) in [("oversold", oversold), ("overbought", overbought)] {
        if let Some(v) = value {
            if !(v > 0.0 && v < 100.0) {
                return Err(invalid("strategy", key, format!("{} must be in (0, 100)", key)));
            }
        }
    }
    if let (Some(low), Some(high)) = (oversold, overbought) {
        if low >= high {
            return Err(invalid(
                "strategy",
                "oversold",
                "oversold must be below overbought",
            ));
        }
    }
    Ok(())
}
