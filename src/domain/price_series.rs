//! Immutable, chronologically ordered container of bars.
//!
//! A `PriceSeries` owns its bars behind an `Arc<[Bar]>`. Slicing produces a
//! view over the same backing store; nothing hands out mutable access.

use std::ops::Index;
use std::sync::Arc;

use super::error::BarsmithError;
use super::ohlcv::Bar;

#[derive(Debug, Clone)]
pub struct PriceSeries {
    bars: Arc<[Bar]>,
    start: usize,
    end: usize,
}

impl PriceSeries {
    /// Build a series from bars already in chronological order.
    ///
    /// Rejects non-finite prices or volumes and timestamps that are not
    /// strictly increasing.
    pub fn new(bars: Vec<Bar>) -> Result<Self, BarsmithError> {
        for (i, bar) in bars.iter().enumerate() {
            if !bar.is_finite() {
                return Err(BarsmithError::InvalidSeries {
                    index: i,
                    reason: "open, high, low, close and volume must be finite".into(),
                });
            }
            if i > 0 && bar.timestamp <= bars[i - 1].timestamp {
                return Err(BarsmithError::InvalidSeries {
                    index: i,
                    reason: format!(
                        "timestamp {} is not after {}",
                        bar.timestamp,
                        bars[i - 1].timestamp
                    ),
                });
            }
        }

        let end = bars.len();
        Ok(PriceSeries {
            bars: bars.into(),
            start: 0,
            end,
        })
    }

    pub fn empty() -> Self {
        PriceSeries {
            bars: Arc::from(Vec::new()),
            start: 0,
            end: 0,
        }
    }

    pub fn len(&self) -> usize {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn get(&self, index: usize) -> Option<&Bar> {
        self.bars().get(index)
    }

    pub fn first(&self) -> Option<&Bar> {
        self.bars().first()
    }

    pub fn last(&self) -> Option<&Bar> {
        self.bars().last()
    }

    /// Read-only view of the bars in this series.
    pub fn bars(&self) -> &[Bar] {
        &self.bars[self.start..self.end]
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Bar> {
        self.bars().iter()
    }

    pub fn closes(&self) -> Vec<f64> {
        self.iter().map(|b| b.close).collect()
    }

    /// Sub-range `[start, end)` sharing the same backing store.
    ///
    /// Out-of-range or inverted bounds yield an empty series.
    pub fn slice(&self, start: usize, end: usize) -> PriceSeries {
        if start > end || end > self.len() {
            return PriceSeries::empty();
        }
        PriceSeries {
            bars: Arc::clone(&self.bars),
            start: self.start + start,
            end: self.start + end,
        }
    }
}

impl Default for PriceSeries {
    fn default() -> Self {
        PriceSeries::empty()
    }
}

impl Index<usize> for PriceSeries {
    type Output = Bar;

    fn index(&self, index: usize) -> &Bar {
        &self.bars()[index]
    }
}

impl<'a> IntoIterator for &'a PriceSeries {
    type Item = &'a Bar;
    type IntoIter = std::slice::Iter<'a, Bar>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl TryFrom<Vec<Bar>> for PriceSeries {
    type Error = BarsmithError;

    fn try_from(bars: Vec<Bar>) -> Result<Self, Self::Error> {
        PriceSeries::new(bars)
    }
}
