//! Open positions and closed trades.

use std::fmt;

use chrono::{Duration, NaiveDateTime};

use super::signal::Direction;

/// The single open position the backtester may hold.
#[derive(Debug, Clone, PartialEq)]
pub struct Position {
    pub direction: Direction,
    pub entry_time: NaiveDateTime,
    pub entry_price: f64,
}

impl Position {
    /// Fractional return of closing at `exit_price`, before costs.
    pub fn gross_return(&self, exit_price: f64) -> f64 {
        match self.direction {
            Direction::Long => (exit_price - self.entry_price) / self.entry_price,
            Direction::Short => (self.entry_price - exit_price) / self.entry_price,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ExitReason {
    Signal,
    EndOfData,
}

impl fmt::Display for ExitReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExitReason::Signal => write!(f, "signal"),
            ExitReason::EndOfData => write!(f, "end of data"),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Trade {
    pub entry_time: NaiveDateTime,
    pub exit_time: NaiveDateTime,
    pub direction: Direction,
    pub entry_price: f64,
    pub exit_price: f64,
    /// Absolute profit in account currency, after commission.
    pub profit: f64,
    /// Net return in percent (fractional return x 100).
    pub profit_pct: f64,
    pub exit_reason: ExitReason,
}

impl Trade {
    pub fn is_win(&self) -> bool {
        self.profit > 0.0
    }

    pub fn duration(&self) -> Duration {
        self.exit_time - self.entry_time
    }

    pub fn price_change(&self) -> f64 {
        self.exit_price - self.entry_price
    }

    pub fn price_change_pct(&self) -> f64 {
        if self.entry_price == 0.0 {
            return 0.0;
        }
        self.price_change() / self.entry_price * 100.0
    }
}
