//! RSI (Relative Strength Index) indicator.
//!
//! Uses simple rolling means of gains and losses:
//! - delta[i] = C[i] - C[i-1]
//! - avg_gain = mean(max(delta, 0)) over n bars, avg_loss likewise for -min(delta, 0)
//!
//! Formula: RSI = 100 - (100 / (1 + avg_gain / (avg_loss + eps)))
//! A window with no movement at all yields 0.
//!
//! Warmup: first n bars are invalid (need n price changes).

use crate::domain::indicator::{IndicatorSeries, IndicatorType};
use crate::domain::indicator_helpers::{EPSILON, rolling_mean, to_series};
use crate::domain::market_bar::MarketBar;

pub fn calculate_rsi(bars: &[MarketBar], period: usize) -> IndicatorSeries {
    let mut gains = Vec::with_capacity(bars.len());
    let mut losses = Vec::with_capacity(bars.len());

    for i in 0..bars.len() {
        if i == 0 {
            gains.push(None);
            losses.push(None);
            continue;
        }
        let change = bars[i].close - bars[i - 1].close;
        gains.push(Some(change.max(0.0)));
        losses.push(Some((-change).max(0.0)));
    }

    let avg_gain = rolling_mean(&gains, period);
    let avg_loss = rolling_mean(&losses, period);

    let column = avg_gain
        .into_iter()
        .zip(avg_loss)
        .map(|(g, l)| {
            let rs = g? / (l? + EPSILON);
            Some(100.0 - 100.0 / (1.0 + rs))
        })
        .collect();

    to_series(bars, IndicatorType::Rsi(period), column)
}
