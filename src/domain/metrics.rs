//! Performance metrics and statistics.

use crate::domain::backtest::BacktestRow;
use crate::domain::position::ClosedTrade;
use crate::domain::signal::Action;
use chrono::Datelike;

const TRADING_DAYS_PER_YEAR: f64 = 252.0;

#[derive(Debug, Clone, PartialEq, Default)]
pub struct PerformanceMetrics {
    pub total_strategy_return: f64,
    pub total_market_return: f64,
    pub strategy_volatility: f64,
    pub market_volatility: f64,
    pub strategy_sharpe: f64,
    pub market_sharpe: f64,
    pub max_drawdown: f64,
    pub win_rate: f64,
    pub avg_win: f64,
    pub avg_loss: f64,
}

impl PerformanceMetrics {
    /// All fields are zero for an empty backtest.
    pub fn compute(rows: &[BacktestRow]) -> Self {
        let Some(last) = rows.last() else {
            return Self::default();
        };

        let strategy: Vec<f64> = rows.iter().map(|r| r.strategy_return).collect();
        let market: Vec<f64> = rows.iter().map(|r| r.market_return).collect();
        let cum: Vec<f64> = rows.iter().map(|r| r.strategy_cum_return).collect();

        let wins: Vec<f64> = strategy.iter().copied().filter(|r| *r > 0.0).collect();
        let losses: Vec<f64> = strategy.iter().copied().filter(|r| *r < 0.0).collect();

        PerformanceMetrics {
            total_strategy_return: last.strategy_cum_return,
            total_market_return: last.market_cum_return,
            strategy_volatility: annualized_volatility(&strategy),
            market_volatility: annualized_volatility(&market),
            strategy_sharpe: annualized_sharpe(&strategy),
            market_sharpe: annualized_sharpe(&market),
            max_drawdown: max_drawdown(&cum),
            win_rate: wins.len() as f64 / strategy.len() as f64,
            avg_win: mean(&wins),
            avg_loss: mean(&losses),
        }
    }
}

fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        0.0
    } else {
        values.iter().sum::<f64>() / values.len() as f64
    }
}

/// Sample standard deviation; zero below two observations.
fn sample_std(values: &[f64]) -> f64 {
    if values.len() < 2 {
        return 0.0;
    }
    let m = mean(values);
    let ss: f64 = values.iter().map(|v| (v - m).powi(2)).sum();
    (ss / (values.len() - 1) as f64).sqrt()
}

pub fn annualized_volatility(returns: &[f64]) -> f64 {
    sample_std(returns) * TRADING_DAYS_PER_YEAR.sqrt()
}

/// mean / std * sqrt(252), or zero when std is zero.
pub fn annualized_sharpe(returns: &[f64]) -> f64 {
    let sd = sample_std(returns);
    if sd > 0.0 {
        mean(returns) / sd * TRADING_DAYS_PER_YEAR.sqrt()
    } else {
        0.0
    }
}

/// Worst `(cum - peak) / (1 + peak)` over the cumulative-return curve,
/// where `peak` is the running maximum. Always <= 0.
pub fn max_drawdown(cum_returns: &[f64]) -> f64 {
    let mut peak = f64::NEG_INFINITY;
    let mut worst = 0.0_f64;
    for &c in cum_returns {
        peak = peak.max(c);
        let dd = (c - peak) / (1.0 + peak);
        worst = worst.min(dd);
    }
    worst
}

/// Decision counts and period outcomes.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct TradeSummary {
    pub buys: usize,
    pub sells: usize,
    pub closes: usize,
    pub holds: usize,
    pub winning_periods: usize,
    pub losing_periods: usize,
    pub closed_trades: usize,
    pub winning_trades: usize,
}

impl TradeSummary {
    pub fn compute(rows: &[BacktestRow], trades: &[ClosedTrade]) -> Self {
        let mut s = TradeSummary {
            closed_trades: trades.len(),
            winning_trades: trades.iter().filter(|t| t.trade_return > 0.0).count(),
            ..Self::default()
        };
        for row in rows {
            match row.action {
                Action::Buy => s.buys += 1,
                Action::Sell => s.sells += 1,
                Action::Close => s.closes += 1,
                Action::Hold => s.holds += 1,
            }
            if row.strategy_return > 0.0 {
                s.winning_periods += 1;
            } else if row.strategy_return < 0.0 {
                s.losing_periods += 1;
            }
        }
        s
    }

    pub fn signals(&self) -> usize {
        self.buys + self.sells
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct MonthlyReturn {
    pub year: i32,
    pub month: u32,
    /// Sum of the month's strategy returns.
    pub total: f64,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct MonthlyBreakdown {
    pub months: Vec<MonthlyReturn>,
}

impl MonthlyBreakdown {
    /// Rows must be in date order.
    pub fn compute(rows: &[BacktestRow]) -> Self {
        let mut months: Vec<MonthlyReturn> = Vec::new();
        for row in rows {
            let (year, month) = (row.date.year(), row.date.month());
            match months.last_mut() {
                Some(m) if m.year == year && m.month == month => m.total += row.strategy_return,
                _ => months.push(MonthlyReturn {
                    year,
                    month,
                    total: row.strategy_return,
                }),
            }
        }
        Self { months }
    }

    pub fn best(&self) -> Option<&MonthlyReturn> {
        self.months.iter().max_by(|a, b| a.total.total_cmp(&b.total))
    }

    pub fn worst(&self) -> Option<&MonthlyReturn> {
        self.months.iter().min_by(|a, b| a.total.total_cmp(&b.total))
    }

    pub fn positive_months(&self) -> usize {
        self.months.iter().filter(|m| m.total > 0.0).count()
    }
}
