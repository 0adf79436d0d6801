//! Rolling volatility of log returns.
//!
//! VOL(n)[i] = sample std of LOG_RETURN[i-n+1..=i]
//! VOL_RATIO[i] = VOL(short)[i] / (VOL(long)[i] + eps)
//! Warmup: first n bars are invalid (log returns start at bar 1).

use crate::domain::indicator::{IndicatorSeries, IndicatorType};
use crate::domain::indicator_helpers::{EPSILON, log_returns, rolling_sample_std, to_series};
use crate::domain::market_bar::MarketBar;

pub fn calculate_volatility(bars: &[MarketBar], period: usize) -> IndicatorSeries {
    let vol = rolling_sample_std(&log_returns(bars), period);
    to_series(bars, IndicatorType::Volatility(period), vol)
}

pub fn calculate_volatility_ratio(bars: &[MarketBar], short: usize, long: usize) -> IndicatorSeries {
    let lr = log_returns(bars);
    let short_vol = rolling_sample_std(&lr, short);
    let long_vol = rolling_sample_std(&lr, long);
    let column = short_vol
        .into_iter()
        .zip(long_vol)
        .map(|(s, l)| Some(s? / (l? + EPSILON)))
        .collect();
    to_series(bars, IndicatorType::VolatilityRatio { short, long }, column)
}
