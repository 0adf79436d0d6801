//! Sequential, risk-managed replay of signals.
//!
//! Each bar: value the open position at the close, force a CLOSE if the
//! stop-loss or take-profit is breached, otherwise apply the signal, then
//! earn `position * next_return` for the period. The risk check runs before
//! the signal on the same bar, and a forced CLOSE suppresses that bar's
//! signal entirely.

use crate::domain::error::FusetraderError;
use crate::domain::position::{ClosedTrade, Direction, ExitReason, PositionState};
use crate::domain::signal::Action;
use chrono::NaiveDate;
use tracing::debug;

#[derive(Debug, Clone, PartialEq)]
pub struct RiskConfig {
    pub stop_loss_pct: f64,
    pub take_profit_pct: f64,
}

impl Default for RiskConfig {
    fn default() -> Self {
        Self {
            stop_loss_pct: 0.05,
            take_profit_pct: 0.10,
        }
    }
}

/// One held-out day as seen by the replay.
#[derive(Debug, Clone, PartialEq)]
pub struct BacktestBar {
    pub date: NaiveDate,
    pub close: f64,
    /// Simple return from this close to the next one.
    pub market_return: f64,
    pub action: Action,
    pub position_size: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct StepOutcome {
    pub applied: Action,
    pub portfolio_value: f64,
    pub strategy_return: f64,
    pub closed: Option<ClosedTrade>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct BacktestRow {
    pub date: NaiveDate,
    pub action: Action,
    pub position: f64,
    pub strategy_return: f64,
    pub market_return: f64,
    pub portfolio_value: f64,
    pub strategy_cum_return: f64,
    pub market_cum_return: f64,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct BacktestResult {
    pub rows: Vec<BacktestRow>,
    pub trades: Vec<ClosedTrade>,
    pub final_state: PositionState,
}

/// Advance the replay by one bar.
pub fn step(
    state: PositionState,
    bar: &BacktestBar,
    risk: &RiskConfig,
) -> (PositionState, StepOutcome) {
    let portfolio_value = state.mark_to_market(bar.close);

    let exit = state.risk_exit(bar.close, risk.stop_loss_pct, risk.take_profit_pct);
    let (next, applied, closed) = match exit {
        Some(reason) => match state.close(bar.close, bar.date, reason) {
            Some((flat, trade)) => (flat, Action::Close, Some(trade)),
            None => (state, bar.action, None),
        },
        None => apply_signal(state, bar),
    };

    let strategy_return = if next.direction() == Direction::Flat {
        0.0
    } else {
        next.size * bar.market_return
    };

    (
        next,
        StepOutcome {
            applied,
            portfolio_value,
            strategy_return,
            closed,
        },
    )
}

fn apply_signal(
    state: PositionState,
    bar: &BacktestBar,
) -> (PositionState, Action, Option<ClosedTrade>) {
    let direction = state.direction();
    let target = match bar.action {
        Action::Buy if direction != Direction::Long => bar.position_size.abs(),
        Action::Sell if direction != Direction::Short => -bar.position_size.abs(),
        _ => return (state, bar.action, None),
    };

    let closed = state
        .close(bar.close, bar.date, ExitReason::Reversal)
        .map(|(_, trade)| trade);
    (state.open(target, bar.close, bar.date), bar.action, closed)
}

fn validate(bars: &[BacktestBar]) -> Result<(), FusetraderError> {
    for (i, bar) in bars.iter().enumerate() {
        if !bar.close.is_finite() || bar.close <= 0.0 {
            return Err(FusetraderError::Backtest {
                reason: format!("invalid close {} on {}", bar.close, bar.date),
            });
        }
        if !bar.market_return.is_finite() {
            return Err(FusetraderError::Backtest {
                reason: format!("non-finite market return on {}", bar.date),
            });
        }
        if !bar.position_size.is_finite() || bar.position_size.abs() > 1.0 {
            return Err(FusetraderError::Backtest {
                reason: format!("position size {} out of range on {}", bar.position_size, bar.date),
            });
        }
        if bar.action == Action::Close {
            return Err(FusetraderError::Backtest {
                reason: format!("CLOSE is not an input signal ({})", bar.date),
            });
        }
        if i > 0 && bar.date <= bars[i - 1].date {
            return Err(FusetraderError::Backtest {
                reason: format!("bars out of order at {}", bar.date),
            });
        }
    }
    Ok(())
}

/// Replay `bars` in order from a flat unit portfolio.
pub fn run_backtest(
    bars: &[BacktestBar],
    risk: &RiskConfig,
) -> Result<BacktestResult, FusetraderError> {
    validate(bars)?;

    let mut state = PositionState::default();
    let mut rows = Vec::with_capacity(bars.len());
    let mut trades = Vec::new();
    let mut strategy_growth = 1.0;
    let mut market_growth = 1.0;

    for bar in bars {
        let (next, outcome) = step(state, bar, risk);
        state = next;

        if let Some(trade) = outcome.closed {
            if trade.reason != ExitReason::Reversal {
                debug!(
                    date = %bar.date,
                    reason = %trade.reason,
                    trade_return = trade.trade_return,
                    "forced exit"
                );
            }
            trades.push(trade);
        }

        strategy_growth *= 1.0 + outcome.strategy_return;
        market_growth *= 1.0 + bar.market_return;

        rows.push(BacktestRow {
            date: bar.date,
            action: outcome.applied,
            position: state.size,
            strategy_return: outcome.strategy_return,
            market_return: bar.market_return,
            portfolio_value: outcome.portfolio_value,
            strategy_cum_return: strategy_growth - 1.0,
            market_cum_return: market_growth - 1.0,
        });
    }

    Ok(BacktestResult {
        rows,
        trades,
        final_state: state,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use proptest::prelude::*;

    fn bar(day: u32, close: f64, market_return: f64, action: Action, size: f64) -> BacktestBar {
        BacktestBar {
            date: NaiveDate::from_ymd_opt(2024, 6, day).unwrap(),
            close,
            market_return,
            action,
            position_size: size,
        }
    }

    /// Bars whose market return is consistent with the next close.
    fn path(closes: &[f64], actions: &[(Action, f64)]) -> Vec<BacktestBar> {
        closes
            .iter()
            .enumerate()
            .map(|(i, &c)| {
                let next = closes.get(i + 1).copied().unwrap_or(c);
                let (action, size) = actions[i];
                bar(i as u32 + 1, c, next / c - 1.0, action, size)
            })
            .collect()
    }

    #[test]
    fn all_hold_earns_nothing() {
        let bars: Vec<_> = (1..=5).map(|d| bar(d, 100.0, 0.01, Action::Hold, 0.0)).collect();
        let result = run_backtest(&bars, &RiskConfig::default()).unwrap();
        assert!(result.rows.iter().all(|r| r.strategy_return == 0.0));
        assert!(result.rows.iter().all(|r| r.portfolio_value == 1.0));
        assert_relative_eq!(result.rows[4].market_cum_return, 1.01_f64.powi(5) - 1.0);
        assert!(result.trades.is_empty());
    }

    #[test]
    fn buy_earns_sized_next_return() {
        let bars = vec![bar(1, 100.0, 0.02, Action::Buy, 0.05)];
        let result = run_backtest(&bars, &RiskConfig::default()).unwrap();
        assert_relative_eq!(result.rows[0].strategy_return, 0.001);
        assert_eq!(result.rows[0].position, 0.05);
        assert_eq!(result.rows[0].action, Action::Buy);
    }

    #[test]
    fn stop_loss_forces_close_on_first_breach() {
        let hold = (Action::Hold, 0.0);
        let buy = (Action::Buy, 0.05);
        let closes = [100.0, 99.0, 97.0, 94.0, 93.0];
        let actions = [buy, hold, hold, buy, hold];
        let result = run_backtest(&path(&closes, &actions), &RiskConfig::default()).unwrap();

        let applied: Vec<Action> = result.rows.iter().map(|r| r.action).collect();
        assert_eq!(
            applied,
            vec![Action::Buy, Action::Hold, Action::Hold, Action::Close, Action::Hold]
        );

        let close_row = &result.rows[3];
        assert_relative_eq!(close_row.portfolio_value, 1.0 - 0.05 * 0.06, epsilon = 1e-12);
        assert_eq!(close_row.position, 0.0);
        assert_eq!(close_row.strategy_return, 0.0);

        assert_eq!(result.trades.len(), 1);
        assert_eq!(result.trades[0].reason, ExitReason::StopLoss);
        assert_eq!(result.final_state.direction(), Direction::Flat);
        assert_relative_eq!(result.final_state.cash, 0.997, epsilon = 1e-12);
    }

    #[test]
    fn take_profit_on_short() {
        let closes = [100.0, 95.0, 88.0];
        let actions = [(Action::Sell, 0.1), (Action::Sell, 0.1), (Action::Sell, 0.1)];
        let result = run_backtest(&path(&closes, &actions), &RiskConfig::default()).unwrap();
        assert_eq!(result.rows[1].action, Action::Sell);
        assert_eq!(result.rows[2].action, Action::Close);
        assert_eq!(result.trades[0].reason, ExitReason::TakeProfit);
        assert_relative_eq!(result.final_state.cash, 1.012, epsilon = 1e-12);
    }

    #[test]
    fn repeated_buy_keeps_original_entry() {
        let closes = [100.0, 101.0, 102.0];
        let actions = [(Action::Buy, 0.05), (Action::Buy, 0.09), (Action::Hold, 0.0)];
        let result = run_backtest(&path(&closes, &actions), &RiskConfig::default()).unwrap();
        assert_eq!(result.final_state.size, 0.05);
        assert_eq!(result.final_state.entry.unwrap().price, 100.0);
    }

    #[test]
    fn flip_records_reversal_trade() {
        let closes = [100.0, 103.0, 101.0];
        let actions = [(Action::Buy, 0.1), (Action::Sell, 0.08), (Action::Hold, 0.0)];
        let result = run_backtest(&path(&closes, &actions), &RiskConfig::default()).unwrap();
        assert_eq!(result.trades.len(), 1);
        assert_eq!(result.trades[0].reason, ExitReason::Reversal);
        assert_eq!(result.rows[1].position, -0.08);
        assert_relative_eq!(result.final_state.cash, 1.003, epsilon = 1e-12);
    }

    #[test]
    fn two_period_compounding_is_exact() {
        let bars = vec![
            bar(1, 100.0, 0.03, Action::Buy, 0.5),
            bar(2, 103.0, -0.01, Action::Hold, 0.0),
        ];
        let result = run_backtest(&bars, &RiskConfig::default()).unwrap();
        let r1 = result.rows[0].strategy_return;
        let r2 = result.rows[1].strategy_return;
        assert_eq!(result.rows[1].strategy_cum_return, (1.0 + r1) * (1.0 + r2) - 1.0);
    }

    #[test]
    fn empty_input_is_empty_output() {
        let result = run_backtest(&[], &RiskConfig::default()).unwrap();
        assert!(result.rows.is_empty());
        assert_eq!(result.final_state, PositionState::default());
    }

    #[test]
    fn invalid_bars_fail_in_backtest_stage() {
        let bad = [
            vec![bar(1, 0.0, 0.0, Action::Hold, 0.0)],
            vec![bar(1, 10.0, f64::NAN, Action::Hold, 0.0)],
            vec![bar(1, 10.0, 0.0, Action::Buy, 1.5)],
            vec![bar(1, 10.0, 0.0, Action::Close, 0.0)],
            vec![bar(2, 10.0, 0.0, Action::Hold, 0.0), bar(1, 10.0, 0.0, Action::Hold, 0.0)],
        ];
        for bars in bad {
            assert!(matches!(
                run_backtest(&bars, &RiskConfig::default()),
                Err(FusetraderError::Backtest { .. })
            ));
        }
    }

    #[test]
    fn step_is_pure() {
        let state = PositionState::default();
        let b = bar(1, 100.0, 0.01, Action::Buy, 0.1);
        let (a1, o1) = step(state, &b, &RiskConfig::default());
        let (a2, o2) = step(state, &b, &RiskConfig::default());
        assert_eq!(a1, a2);
        assert_eq!(o1, o2);
        assert_eq!(state, PositionState::default());
    }

    proptest! {
        #[test]
        fn rows_prefix_independent_of_future(
            moves in prop::collection::vec((-0.05f64..0.05, 0u8..3), 2..40),
            cut in 1usize..40,
        ) {
            let mut close = 100.0;
            let mut bars = Vec::new();
            for (i, (r, a)) in moves.iter().enumerate() {
                let action = match a { 0 => Action::Buy, 1 => Action::Sell, _ => Action::Hold };
                let date = NaiveDate::from_ymd_opt(2023, 1, 1).unwrap() + chrono::Duration::days(i as i64);
                bars.push(BacktestBar { date, close, market_return: *r, action, position_size: 0.1 });
                close *= 1.0 + r;
            }
            let cut = cut.min(bars.len());
            let full = run_backtest(&bars, &RiskConfig::default()).unwrap();
            let head = run_backtest(&bars[..cut], &RiskConfig::default()).unwrap();
            prop_assert_eq!(&full.rows[..cut], &head.rows[..]);
        }
    }
}
