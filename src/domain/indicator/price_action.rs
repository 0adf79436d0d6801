//! Single-bar price patterns.
//!
//! DAILY_RANGE[i] = (H[i] - L[i]) / C[i]
//! GAP[i] = (O[i] - C[i-1]) / C[i-1], first bar invalid.

use crate::domain::indicator::{IndicatorSeries, IndicatorType};
use crate::domain::indicator_helpers::to_series;
use crate::domain::market_bar::MarketBar;

pub fn calculate_daily_range(bars: &[MarketBar]) -> IndicatorSeries {
    let column = bars.iter().map(|b| Some(b.intraday_range())).collect();
    to_series(bars, IndicatorType::DailyRange, column)
}

pub fn calculate_gap(bars: &[MarketBar]) -> IndicatorSeries {
    let column = (0..bars.len())
        .map(|i| (i > 0).then(|| bars[i].gap(bars[i - 1].close)))
        .collect();
    to_series(bars, IndicatorType::Gap, column)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::indicator::{IndicatorValue, test_bars};

    #[test]
    fn daily_range_valid_from_first_bar() {
        let mut bars = test_bars(&[100.0]);
        bars[0].high = 105.0;
        bars[0].low = 95.0;
        let series = calculate_daily_range(&bars);
        assert!(series.values[0].valid);
        if let IndicatorValue::Simple(v) = series.values[0].value {
            assert!((v - 0.1).abs() < 1e-12);
        } else {
            panic!("Expected Simple value");
        }
    }

    #[test]
    fn gap_down() {
        let mut bars = test_bars(&[100.0, 100.0]);
        bars[1].open = 98.0;
        let series = calculate_gap(&bars);
        assert!(!series.values[0].valid);
        if let IndicatorValue::Simple(v) = series.values[1].value {
            assert!((v - (-0.02)).abs() < 1e-12);
        } else {
            panic!("Expected Simple value");
        }
    }
}
