//! Trading signals emitted by strategies.

use std::fmt;

use chrono::NaiveDateTime;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Direction {
    Long,
    Short,
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Direction::Long => write!(f, "LONG"),
            Direction::Short => write!(f, "SHORT"),
        }
    }
}

/// An entry or exit instruction for the bar whose timestamp equals `timestamp`.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Signal {
    pub timestamp: NaiveDateTime,
    pub price: f64,
    pub is_entry: bool,
    pub direction: Direction,
    /// Confidence in `[0, 1]`.
    pub strength: f64,
}

impl Signal {
    pub fn entry(timestamp: NaiveDateTime, price: f64, direction: Direction, strength: f64) -> Self {
        Signal {
            timestamp,
            price,
            is_entry: true,
            direction,
            strength: clamp_strength(strength),
        }
    }

    pub fn exit(timestamp: NaiveDateTime, price: f64, direction: Direction, strength: f64) -> Self {
        Signal {
            timestamp,
            price,
            is_entry: false,
            direction,
            strength: clamp_strength(strength),
        }
    }

    pub fn is_exit(&self) -> bool {
        !self.is_entry
    }
}

fn clamp_strength(strength: f64) -> f64 {
    if strength.is_nan() {
        0.0
    } else {
        strength.clamp(0.0, 1.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn ts() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 3, 1)
            .unwrap()
            .and_hms_opt(9, 30, 0)
            .unwrap()
    }

    #[test]
    fn entry_and_exit_flags() {
        let entry = Signal::entry(ts(), 100.0, Direction::Long, 0.5);
        assert!(entry.is_entry);
        assert!(!entry.is_exit());

        let exit = Signal::exit(ts(), 101.0, Direction::Short, 0.5);
        assert!(exit.is_exit());
        assert_eq!(exit.direction, Direction::Short);
    }

    #[test]
    fn strength_is_clamped() {
        assert_eq!(Signal::entry(ts(), 1.0, Direction::Long, 3.0).strength, 1.0);
        assert_eq!(Signal::entry(ts(), 1.0, Direction::Long, -0.5).strength, 0.0);
        assert_eq!(Signal::exit(ts(), 1.0, Direction::Long, f64::NAN).strength, 0.0);
        assert_eq!(Signal::exit(ts(), 1.0, Direction::Long, 0.25).strength, 0.25);
    }

    #[test]
    fn direction_display() {
        assert_eq!(Direction::Long.to_string(), "LONG");
        assert_eq!(Direction::Short.to_string(), "SHORT");
    }
}
