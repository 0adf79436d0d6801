//! Volume average and relative volume.
//!
//! VOLUME_MA(n)[i] = mean(V[i-n+1..=i])
//! VOLUME_RATIO[i] = V[i] / (VOLUME_MA(n)[i] + 1)
//! Warmup: first (n-1) bars are invalid.

use crate::domain::indicator::{IndicatorSeries, IndicatorType};
use crate::domain::indicator_helpers::{rolling_mean, to_series};
use crate::domain::market_bar::MarketBar;

fn volume_ma(bars: &[MarketBar], period: usize) -> Vec<Option<f64>> {
    let volumes: Vec<Option<f64>> = bars.iter().map(|b| Some(b.volume)).collect();
    rolling_mean(&volumes, period)
}

pub fn calculate_volume_ma(bars: &[MarketBar], period: usize) -> IndicatorSeries {
    to_series(bars, IndicatorType::VolumeMa(period), volume_ma(bars, period))
}

pub fn calculate_volume_ratio(bars: &[MarketBar], period: usize) -> IndicatorSeries {
    let column = bars
        .iter()
        .zip(volume_ma(bars, period))
        .map(|(bar, ma)| ma.map(|ma| bar.volume / (ma + 1.0)))
        .collect();
    to_series(bars, IndicatorType::VolumeRatio(period), column)
}
