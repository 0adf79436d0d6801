//! Momentum: percent change versus n bars ago.
//!
//! MOM(n)[i] = C[i] / C[i-n] - 1
//! Warmup: first n bars are invalid.

use crate::domain::indicator::{IndicatorSeries, IndicatorType};
use crate::domain::indicator_helpers::to_series;
use crate::domain::market_bar::MarketBar;

pub fn calculate_momentum(bars: &[MarketBar], period: usize) -> IndicatorSeries {
    let column = (0..bars.len())
        .map(|i| {
            (period > 0 && i >= period).then(|| bars[i].close / bars[i - period].close - 1.0)
        })
        .collect();
    to_series(bars, IndicatorType::Momentum(period), column)
}
