//! Bollinger Bands indicator.
//!
//! Bollinger Bands consist of:
//! - Middle: Simple Moving Average (SMA) over n periods
//! - Upper: Middle + (multiplier × StdDev)
//! - Lower: Middle - (multiplier × StdDev)
//! - Position: (C - Middle) / (multiplier × StdDev + eps)
//!
//! Where StdDev is the sample standard deviation (divides by N-1).
//!
//! Default parameters: period=20, multiplier=2.0
//! Warmup: first (period-1) bars are invalid.

use crate::domain::indicator::{IndicatorPoint, IndicatorSeries, IndicatorType, IndicatorValue};
use crate::domain::indicator_helpers::{EPSILON, sample_std};
use crate::domain::market_bar::MarketBar;

pub fn calculate_bollinger(
    bars: &[MarketBar],
    period: usize,
    stddev_mult_x100: u32,
) -> IndicatorSeries {
    let mut values = Vec::with_capacity(bars.len());
    let mult = stddev_mult_x100 as f64 / 100.0;

    for i in 0..bars.len() {
        let date = bars[i].date;
        let valid = period > 0 && i + 1 >= period;

        let value = if valid {
            let window: Vec<f64> = bars[i + 1 - period..=i].iter().map(|b| b.close).collect();
            let middle = window.iter().sum::<f64>() / period as f64;
            let band = mult * sample_std(&window);

            IndicatorValue::Bollinger {
                upper: middle + band,
                middle,
                lower: middle - band,
                position: (bars[i].close - middle) / (band + EPSILON),
            }
        } else {
            IndicatorValue::Bollinger {
                upper: 0.0,
                middle: 0.0,
                lower: 0.0,
                position: 0.0,
            }
        };

        values.push(IndicatorPoint { date, valid, value });
    }

    IndicatorSeries {
        indicator_type: IndicatorType::Bollinger(period),
        values,
    }
}
