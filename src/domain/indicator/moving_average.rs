//! Simple moving average and price-to-average ratio.
//!
//! MA(n)[i] = sum(C[i-j] for j in 0..n) / n
//! PRICE_TO_MA(n)[i] = C[i] / MA(n)[i] - 1
//! Warmup: first (n-1) bars are invalid.

use crate::domain::indicator::{IndicatorSeries, IndicatorType};
use crate::domain::indicator_helpers::{closes, rolling_mean, to_series};
use crate::domain::market_bar::MarketBar;

pub fn calculate_ma(bars: &[MarketBar], period: usize) -> IndicatorSeries {
    let ma = rolling_mean(&closes(bars), period);
    to_series(bars, IndicatorType::Ma(period), ma)
}

pub fn calculate_price_to_ma(bars: &[MarketBar], period: usize) -> IndicatorSeries {
    let ma = rolling_mean(&closes(bars), period);
    let column = bars
        .iter()
        .zip(ma)
        .map(|(bar, m)| m.map(|m| bar.close / m - 1.0))
        .collect();
    to_series(bars, IndicatorType::PriceToMa(period), column)
}
