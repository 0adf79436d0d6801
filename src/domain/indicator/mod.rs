//! Technical indicator implementations.
//!
//! This module provides types for representing indicator values and series:
//! - `IndicatorPoint`: A single point in an indicator time series
//! - `IndicatorValue`: Enum for different indicator output shapes
//! - `IndicatorType`: Enum for indicator identity + parameters
//! - `IndicatorSeries`: A time series of indicator values
//!
//! `IndicatorType`'s `Display` output doubles as the feature column name,
//! or as the column prefix for multi-column indicators.

pub mod bollinger;
pub mod momentum;
pub mod moving_average;
pub mod price_action;
pub mod returns;
pub mod rsi;
pub mod trend;
pub mod volatility;
pub mod volume;

use chrono::NaiveDate;
use std::fmt;

#[derive(Debug, Clone)]
pub struct IndicatorPoint {
    pub date: NaiveDate,
    pub valid: bool,
    pub value: IndicatorValue,
}

#[derive(Debug, Clone)]
pub enum IndicatorValue {
    Simple(f64),
    Bollinger {
        upper: f64,
        middle: f64,
        lower: f64,
        position: f64,
    },
}

impl IndicatorValue {
    /// Values that become feature columns, in the order of
    /// [`IndicatorType::column_names`].
    pub fn columns(&self) -> Vec<f64> {
        match self {
            IndicatorValue::Simple(v) => vec![*v],
            IndicatorValue::Bollinger {
                upper,
                lower,
                position,
                ..
            } => vec![*upper, *lower, *position],
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IndicatorType {
    Return,
    LogReturn,
    Ma(usize),
    PriceToMa(usize),
    Volatility(usize),
    VolatilityRatio { short: usize, long: usize },
    Rsi(usize),
    Momentum(usize),
    Bollinger(usize),
    VolumeMa(usize),
    VolumeRatio(usize),
    DailyRange,
    Gap,
    Trend(usize),
}

impl IndicatorType {
    pub fn column_names(&self) -> Vec<String> {
        match self {
            IndicatorType::Bollinger(_) => ["upper", "lower", "position"]
                .iter()
                .map(|part| format!("{}_{}", self, part))
                .collect(),
            other => vec![other.to_string()],
        }
    }

    /// Bars of history needed before the first valid value.
    pub fn lookback(&self) -> usize {
        match self {
            IndicatorType::Return | IndicatorType::LogReturn | IndicatorType::Gap => 1,
            IndicatorType::DailyRange => 0,
            IndicatorType::Ma(n)
            | IndicatorType::PriceToMa(n)
            | IndicatorType::VolumeMa(n)
            | IndicatorType::VolumeRatio(n)
            | IndicatorType::Trend(n)
            | IndicatorType::Bollinger(n) => n.saturating_sub(1),
            IndicatorType::Volatility(n) | IndicatorType::Rsi(n) | IndicatorType::Momentum(n) => *n,
            IndicatorType::VolatilityRatio { short, long } => *short.max(long),
        }
    }
}

#[derive(Debug, Clone)]
pub struct IndicatorSeries {
    pub indicator_type: IndicatorType,
    pub values: Vec<IndicatorPoint>,
}

impl fmt::Display for IndicatorType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IndicatorType::Return => write!(f, "return"),
            IndicatorType::LogReturn => write!(f, "log_return"),
            IndicatorType::Ma(period) => write!(f, "ma_{}", period),
            IndicatorType::PriceToMa(period) => write!(f, "price_to_ma_{}", period),
            IndicatorType::Volatility(period) => write!(f, "vol_{}", period),
            IndicatorType::VolatilityRatio { .. } => write!(f, "vol_ratio"),
            IndicatorType::Rsi(period) => write!(f, "rsi_{}", period),
            IndicatorType::Momentum(period) => write!(f, "mom_{}", period),
            IndicatorType::Bollinger(_) => write!(f, "bb"),
            IndicatorType::VolumeMa(period) => write!(f, "volume_ma_{}", period),
            IndicatorType::VolumeRatio(_) => write!(f, "volume_ratio"),
            IndicatorType::DailyRange => write!(f, "daily_range"),
            IndicatorType::Gap => write!(f, "gap"),
            IndicatorType::Trend(period) => write!(f, "trend_{}", period),
        }
    }
}

#[cfg(test)]
pub(crate) fn test_bars(prices: &[f64]) -> Vec<crate::domain::market_bar::MarketBar> {
    let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
    prices
        .iter()
        .enumerate()
        .map(|(i, &close)| crate::domain::market_bar::MarketBar {
            ticker: "TEST".into(),
            date: start + chrono::Duration::days(i as i64),
            open: close,
            high: close,
            low: close,
            close,
            volume: 1000.0,
        })
        .collect()
}
