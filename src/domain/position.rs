//! Open holding tracked by a single simulation run.

use chrono::{DateTime, Utc};

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Position {
    pub symbol: String,
    pub shares: f64,
    pub entry_price: f64,
    pub entry_time: DateTime<Utc>,
}

impl Position {
    pub fn is_open(&self) -> bool {
        self.shares > 0.0
    }

    pub fn cost_basis(&self) -> f64 {
        self.shares * self.entry_price
    }

    pub fn value(&self, price: f64) -> f64 {
        self.shares * price
    }

    pub fn profit_loss(&self, price: f64) -> f64 {
        self.value(price) - self.cost_basis()
    }

    /// Unrealized P&L as a percentage of cost basis; 0 for a zero basis.
    pub fn profit_loss_pct(&self, price: f64) -> f64 {
        let basis = self.cost_basis();
        if basis == 0.0 {
            return 0.0;
        }
        self.profit_loss(price) / basis * 100.0
    }
}
