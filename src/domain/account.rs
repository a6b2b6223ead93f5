//! Cash, open position and trade ledger owned by one simulation run.

use super::position::Position;
use super::trade::Trade;

#[derive(Debug, Clone, PartialEq)]
pub struct Account {
    pub cash: f64,
    pub initial_capital: f64,
    pub position: Option<Position>,
    pub trades: Vec<Trade>,
}

impl Account {
    pub fn new(initial_capital: f64) -> Self {
        Account {
            cash: initial_capital,
            initial_capital,
            position: None,
            trades: Vec::new(),
        }
    }

    /// The open position, if any. A zero-share position counts as flat.
    pub fn open_position(&self) -> Option<&Position> {
        self.position.as_ref().filter(|p| p.is_open())
    }

    pub fn has_position(&self) -> bool {
        self.open_position().is_some()
    }

    pub fn record_trade(&mut self, trade: Trade) {
        self.trades.push(trade);
    }

    /// Cash plus the open position marked at `price`.
    pub fn total_equity(&self, price: f64) -> f64 {
        self.cash + self.open_position().map_or(0.0, |p| p.value(price))
    }

    /// Percent change of [`total_equity`](Self::total_equity) over the
    /// starting capital. Zero when there was no capital.
    pub fn return_pct(&self, price: f64) -> f64 {
        if self.initial_capital <= 0.0 {
            return 0.0;
        }
        (self.total_equity(price) - self.initial_capital) / self.initial_capital * 100.0
    }

    pub fn into_trades(self) -> Vec<Trade> {
        self.trades
    }
}
