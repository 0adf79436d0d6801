//! Linear trend slope.
//!
//! TREND(n)[i] = OLS slope of C[i-n+1..=i] regressed on bar index 0..n
//! Warmup: first (n-1) bars are invalid.

use crate::domain::indicator::{IndicatorSeries, IndicatorType};
use crate::domain::indicator_helpers::{closes, rolling_slope, to_series};
use crate::domain::market_bar::MarketBar;

pub fn calculate_trend(bars: &[MarketBar], period: usize) -> IndicatorSeries {
    to_series(bars, IndicatorType::Trend(period), rolling_slope(&closes(bars), period))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::indicator::{IndicatorValue, test_bars};

    #[test]
    fn rising_line_slope() {
        let bars = test_bars(&[10.0, 12.0, 14.0, 16.0, 18.0, 20.0]);
        let series = calculate_trend(&bars, 5);
        assert!(!series.values[3].valid);
        if let IndicatorValue::Simple(v) = series.values[5].value {
            assert!((v - 2.0).abs() < 1e-12);
        } else {
            panic!("Expected Simple value");
        }
    }

    #[test]
    fn flat_series_has_zero_slope() {
        let bars = test_bars(&[7.0; 10]);
        let series = calculate_trend(&bars, 10);
        if let IndicatorValue::Simple(v) = series.values[9].value {
            assert!(v.abs() < 1e-12);
        } else {
            panic!("Expected Simple value");
        }
    }
}
