//! Strategy port trait.

use crate::domain::price_series::PriceSeries;
use crate::domain::signal::Signal;

/// Produces entry/exit signals for a series. Called once per backtest.
pub trait Strategy {
    fn name(&self) -> &str;

    /// Signals in production order; the backtester applies same-bar signals in this order.
    fn analyze(&self, series: &PriceSeries) -> Vec<Signal>;
}
