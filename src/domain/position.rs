//! Position state threaded through the backtest.
//!
//! `PositionState` is a plain value: every step takes the previous state
//! and returns the next one.

use chrono::NaiveDate;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Entry {
    pub price: f64,
    pub date: NaiveDate,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PositionState {
    /// Signed fraction of the notional portfolio; 0 when flat.
    pub size: f64,
    pub entry: Option<Entry>,
    /// Realized portfolio value; starts at 1.0.
    pub cash: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Flat,
    Long,
    Short,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitReason {
    StopLoss,
    TakeProfit,
    /// Closed by an opposite signal.
    Reversal,
}

impl fmt::Display for ExitReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExitReason::StopLoss => write!(f, "stop-loss"),
            ExitReason::TakeProfit => write!(f, "take-profit"),
            ExitReason::Reversal => write!(f, "reversal"),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ClosedTrade {
    pub direction: Direction,
    pub size: f64,
    pub entry_price: f64,
    pub exit_price: f64,
    pub entry_date: NaiveDate,
    pub exit_date: NaiveDate,
    /// Price return in the position's favour, before sizing.
    pub trade_return: f64,
    pub reason: ExitReason,
}

impl Default for PositionState {
    fn default() -> Self {
        Self::flat(1.0)
    }
}

impl PositionState {
    pub fn flat(cash: f64) -> Self {
        Self {
            size: 0.0,
            entry: None,
            cash,
        }
    }

    pub fn direction(&self) -> Direction {
        match self.entry {
            Some(_) if self.size > 0.0 => Direction::Long,
            Some(_) if self.size < 0.0 => Direction::Short,
            _ => Direction::Flat,
        }
    }

    /// Price change since entry, `price / entry - 1`.
    pub fn price_change(&self, price: f64) -> Option<f64> {
        self.entry.map(|e| price / e.price - 1.0)
    }

    /// Cash plus the open position's unrealized return.
    pub fn mark_to_market(&self, price: f64) -> f64 {
        match (self.direction(), self.price_change(price)) {
            (Direction::Flat, _) | (_, None) => self.cash,
            (_, Some(change)) => self.cash + self.size * change,
        }
    }

    /// Adverse move beyond `stop_loss_pct` or favourable move beyond
    /// `take_profit_pct`, measured from entry.
    pub fn risk_exit(
        &self,
        price: f64,
        stop_loss_pct: f64,
        take_profit_pct: f64,
    ) -> Option<ExitReason> {
        let change = self.price_change(price)?;
        let favourable = match self.direction() {
            Direction::Long => change,
            Direction::Short => -change,
            Direction::Flat => return None,
        };
        if favourable < -stop_loss_pct {
            Some(ExitReason::StopLoss)
        } else if favourable > take_profit_pct {
            Some(ExitReason::TakeProfit)
        } else {
            None
        }
    }

    /// Realize the open position at `price`. Returns the flat state and the
    /// trade record, or `None` when already flat.
    pub fn close(
        &self,
        price: f64,
        date: NaiveDate,
        reason: ExitReason,
    ) -> Option<(PositionState, ClosedTrade)> {
        let entry = self.entry?;
        let direction = self.direction();
        if direction == Direction::Flat {
            return None;
        }
        let change = price / entry.price - 1.0;
        let trade = ClosedTrade {
            direction,
            size: self.size.abs(),
            entry_price: entry.price,
            exit_price: price,
            entry_date: entry.date,
            exit_date: date,
            trade_return: if direction == Direction::Long {
                change
            } else {
                -change
            },
            reason,
        };
        Some((PositionState::flat(self.mark_to_market(price)), trade))
    }

    /// Open a new position at `price`, realizing any open one first.
    pub fn open(&self, size: f64, price: f64, date: NaiveDate) -> PositionState {
        PositionState {
            size,
            entry: Some(Entry { price, date }),
            cash: self.mark_to_market(price),
        }
    }
}
