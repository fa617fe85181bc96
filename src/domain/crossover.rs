//! Line crossover detection.
//!
//! `diff = line1 - line2`. A bullish cross at `i` is `diff[i-1] < 0 && diff[i] > 0`,
//! or `diff[i-1]` within 1e-10 of zero and `diff[i] > 0`; bearish is symmetric.
//! Inputs are aligned to their common tail first, so indices are in aligned coordinates.

use crate::domain::align::align_pair;

const TOUCH_TOLERANCE: f64 = 1e-10;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CrossoverKind {
    Bullish,
    Bearish,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CrossoverEvent {
    pub kind: CrossoverKind,
    /// Index into the aligned lines.
    pub index: usize,
    /// Midpoint of the two lines at `index`.
    pub value: f64,
    pub line1_value: f64,
    pub line2_value: f64,
}

pub fn find_crossovers(line1: &[f64], line2: &[f64]) -> Vec<CrossoverEvent> {
    let (line1, line2) = align_pair(line1, line2);
    if line1.len() < 2 {
        return Vec::new();
    }

    let mut events = Vec::new();
    for i in 1..line1.len() {
        let prev_diff = line1[i - 1] - line2[i - 1];
        let curr_diff = line1[i] - line2[i];
        let prev_touching = prev_diff.abs() < TOUCH_TOLERANCE;

        let kind = if curr_diff > 0.0 && (prev_diff < 0.0 || prev_touching) {
            CrossoverKind::Bullish
        } else if curr_diff < 0.0 && (prev_diff > 0.0 || prev_touching) {
            CrossoverKind::Bearish
        } else {
            continue;
        };

        events.push(CrossoverEvent {
            kind,
            index: i,
            value: (line1[i] + line2[i]) / 2.0,
            line1_value: line1[i],
            line2_value: line2[i],
        });
    }
    events
}

/// Fast line crossing above the slow line.
pub fn golden_crosses(fast: &[f64], slow: &[f64]) -> Vec<CrossoverEvent> {
    crosses_of_kind(fast, slow, CrossoverKind::Bullish)
}

/// Fast line crossing below the slow line.
pub fn death_crosses(fast: &[f64], slow: &[f64]) -> Vec<CrossoverEvent> {
    crosses_of_kind(fast, slow, CrossoverKind::Bearish)
}

fn crosses_of_kind(fast: &[f64], slow: &[f64], kind: CrossoverKind) -> Vec<CrossoverEvent> {
    find_crossovers(fast, slow)
        .into_iter()
        .filter(|e| e.kind == kind)
        .collect()
}
