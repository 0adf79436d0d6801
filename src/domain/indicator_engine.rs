//! Derives the fixed technical feature set from one instrument's bars.
//!
//! The first [`WARMUP`] rows lack full history for the longest window and
//! are dropped; every remaining row is fully populated.

use crate::domain::error::FusetraderError;
use crate::domain::indicator::{
    IndicatorSeries, IndicatorType, bollinger, momentum, moving_average, price_action, returns,
    rsi, trend, volatility, volume,
};
use crate::domain::market_bar::MarketBar;
use chrono::NaiveDate;

pub const MA_WINDOWS: [usize; 4] = [5, 10, 20, 50];
pub const VOL_WINDOWS: [usize; 3] = [5, 10, 20];
pub const RSI_PERIODS: [usize; 2] = [14, 21];
pub const MOMENTUM_WINDOWS: [usize; 4] = [3, 5, 10, 20];
pub const TREND_WINDOWS: [usize; 2] = [5, 10];
pub const BOLLINGER_PERIOD: usize = 20;
pub const VOLUME_WINDOW: usize = 10;

/// Rows dropped from the head of every indicator table.
pub const WARMUP: usize = 50;

#[derive(Debug, Clone, PartialEq)]
pub struct IndicatorRow {
    pub date: NaiveDate,
    pub close: f64,
    pub values: Vec<f64>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct IndicatorTable {
    pub names: Vec<String>,
    pub rows: Vec<IndicatorRow>,
}

impl IndicatorTable {
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.names.iter().position(|n| n == name)
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }
}

fn calculate_all(bars: &[MarketBar]) -> Vec<IndicatorSeries> {
    let mut series = vec![
        returns::calculate_return(bars),
        returns::calculate_log_return(bars),
    ];
    for &w in &MA_WINDOWS {
        series.push(moving_average::calculate_ma(bars, w));
        series.push(moving_average::calculate_price_to_ma(bars, w));
    }
    for &w in &VOL_WINDOWS {
        series.push(volatility::calculate_volatility(bars, w));
    }
    series.push(volatility::calculate_volatility_ratio(bars, 5, 20));
    for &p in &RSI_PERIODS {
        series.push(rsi::calculate_rsi(bars, p));
    }
    for &w in &MOMENTUM_WINDOWS {
        series.push(momentum::calculate_momentum(bars, w));
    }
    series.push(bollinger::calculate_bollinger(bars, BOLLINGER_PERIOD, 200));
    series.push(volume::calculate_volume_ma(bars, VOLUME_WINDOW));
    series.push(volume::calculate_volume_ratio(bars, VOLUME_WINDOW));
    series.push(price_action::calculate_daily_range(bars));
    series.push(price_action::calculate_gap(bars));
    for &w in &TREND_WINDOWS {
        series.push(trend::calculate_trend(bars, w));
    }
    series
}

/// Reject bars the indicators cannot be computed from.
pub fn validate_bars(bars: &[MarketBar]) -> Result<(), FusetraderError> {
    for (i, bar) in bars.iter().enumerate() {
        let fields = [bar.open, bar.high, bar.low, bar.close, bar.volume];
        if fields.iter().any(|v| !v.is_finite()) {
            return Err(FusetraderError::FeatureEngineering {
                reason: format!("non-finite value in bar dated {}", bar.date),
            });
        }
        if bar.close <= 0.0 {
            return Err(FusetraderError::FeatureEngineering {
                reason: format!("non-positive close {} on {}", bar.close, bar.date),
            });
        }
        if i > 0 && bar.date <= bars[i - 1].date {
            return Err(FusetraderError::FeatureEngineering {
                reason: format!("bars not strictly increasing by date at {}", bar.date),
            });
        }
    }
    Ok(())
}

pub fn compute_indicators(bars: &[MarketBar]) -> Result<IndicatorTable, FusetraderError> {
    validate_bars(bars)?;

    let series = calculate_all(bars);
    let names: Vec<String> = series
        .iter()
        .flat_map(|s| s.indicator_type.column_names())
        .collect();

    let mut rows = Vec::with_capacity(bars.len().saturating_sub(WARMUP));
    for (i, bar) in bars.iter().enumerate().skip(WARMUP) {
        let mut values = Vec::with_capacity(names.len());
        for s in &series {
            let point = &s.values[i];
            if !point.valid {
                return Err(incomplete(&s.indicator_type, bar.date));
            }
            values.extend(point.value.columns());
        }
        if values.iter().any(|v| !v.is_finite()) {
            return Err(FusetraderError::FeatureEngineering {
                reason: format!("non-finite indicator value on {}", bar.date),
            });
        }
        rows.push(IndicatorRow {
            date: bar.date,
            close: bar.close,
            values,
        });
    }

    Ok(IndicatorTable { names, rows })
}

fn incomplete(indicator: &IndicatorType, date: NaiveDate) -> FusetraderError {
    FusetraderError::FeatureEngineering {
        reason: format!("{} incomplete on {} after warmup", indicator, date),
    }
}
