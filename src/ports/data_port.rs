//! Data access port trait.

use crate::domain::error::BarsmithError;
use crate::domain::price_series::PriceSeries;

pub trait DataPort {
    /// All bars for `symbol`, chronologically ordered.
    fn fetch_series(&self, symbol: &str) -> Result<PriceSeries, BarsmithError>;

    fn list_symbols(&self) -> Result<Vec<String>, BarsmithError>;
}
