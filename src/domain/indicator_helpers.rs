//! Shared rolling-window helpers for indicator calculations.
//!
//! All helpers look strictly backward: the value at index `i` depends only
//! on inputs `..=i`. `None` marks an incomplete window.

use crate::domain::indicator::{IndicatorPoint, IndicatorSeries, IndicatorType, IndicatorValue};
use crate::domain::market_bar::MarketBar;

/// Additive guard for ratios whose denominator may vanish.
pub const EPSILON: f64 = 1e-9;

pub fn rolling_mean(values: &[Option<f64>], period: usize) -> Vec<Option<f64>> {
    rolling(values, period, |w| w.iter().sum::<f64>() / w.len() as f64)
}

/// Sample standard deviation (divides by n - 1).
pub fn rolling_sample_std(values: &[Option<f64>], period: usize) -> Vec<Option<f64>> {
    rolling(values, period, sample_std)
}

/// Ordinary least squares slope of the window against 0, 1, ..., n-1.
pub fn rolling_slope(values: &[Option<f64>], period: usize) -> Vec<Option<f64>> {
    rolling(values, period, ols_slope)
}

fn rolling<F>(values: &[Option<f64>], period: usize, f: F) -> Vec<Option<f64>>
where
    F: Fn(&[f64]) -> f64,
{
    let mut out = Vec::with_capacity(values.len());
    let mut window: Vec<f64> = Vec::with_capacity(period);

    for i in 0..values.len() {
        if period == 0 || i + 1 < period {
            out.push(None);
            continue;
        }
        window.clear();
        window.extend(values[i + 1 - period..=i].iter().flatten());
        if window.len() == period {
            out.push(Some(f(&window)));
        } else {
            out.push(None);
        }
    }
    out
}

pub fn sample_std(window: &[f64]) -> f64 {
    let n = window.len();
    if n < 2 {
        return 0.0;
    }
    let mean = window.iter().sum::<f64>() / n as f64;
    let ss: f64 = window.iter().map(|v| (v - mean) * (v - mean)).sum();
    (ss / (n - 1) as f64).sqrt()
}

pub fn ols_slope(window: &[f64]) -> f64 {
    let n = window.len() as f64;
    if window.len() < 2 {
        return 0.0;
    }
    let x_mean = (n - 1.0) / 2.0;
    let y_mean = window.iter().sum::<f64>() / n;
    let mut sxy = 0.0;
    let mut sxx = 0.0;
    for (i, y) in window.iter().enumerate() {
        let dx = i as f64 - x_mean;
        sxy += dx * (y - y_mean);
        sxx += dx * dx;
    }
    sxy / sxx
}

pub fn closes(bars: &[MarketBar]) -> Vec<Option<f64>> {
    bars.iter().map(|b| Some(b.close)).collect()
}

/// Log returns aligned with `bars`; the first entry has no predecessor.
pub fn log_returns(bars: &[MarketBar]) -> Vec<Option<f64>> {
    let mut out = Vec::with_capacity(bars.len());
    for i in 0..bars.len() {
        if i == 0 {
            out.push(None);
        } else {
            out.push(Some(bars[i].log_return(bars[i - 1].close)));
        }
    }
    out
}

/// Wrap an optional-valued column into a `Simple` indicator series.
pub fn to_series(
    bars: &[MarketBar],
    indicator_type: IndicatorType,
    column: Vec<Option<f64>>,
) -> IndicatorSeries {
    let values = bars
        .iter()
        .zip(column)
        .map(|(bar, v)| IndicatorPoint {
            date: bar.date,
            valid: v.is_some(),
            value: IndicatorValue::Simple(v.unwrap_or(0.0)),
        })
        .collect();

    IndicatorSeries {
        indicator_type,
        values,
    }
}
