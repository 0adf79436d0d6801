//! Simple and logarithmic one-bar returns.
//!
//! RETURN[i] = C[i] / C[i-1] - 1
//! LOG_RETURN[i] = ln(C[i] / C[i-1])
//! Warmup: the first bar is invalid.

use crate::domain::indicator::{IndicatorSeries, IndicatorType};
use crate::domain::indicator_helpers::{log_returns, to_series};
use crate::domain::market_bar::MarketBar;

pub fn calculate_return(bars: &[MarketBar]) -> IndicatorSeries {
    let column = (0..bars.len())
        .map(|i| (i > 0).then(|| bars[i].simple_return(bars[i - 1].close)))
        .collect();
    to_series(bars, IndicatorType::Return, column)
}

pub fn calculate_log_return(bars: &[MarketBar]) -> IndicatorSeries {
    to_series(bars, IndicatorType::LogReturn, log_returns(bars))
}
