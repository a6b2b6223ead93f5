//! Executed fills recorded in a run's trade ledger.

use chrono::{DateTime, Utc};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum TradeDirection {
    Buy,
    Sell,
}

impl fmt::Display for TradeDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TradeDirection::Buy => write!(f, "BUY"),
            TradeDirection::Sell => write!(f, "SELL"),
        }
    }
}

/// One fill. `pnl` is realized P&L and is zero for buys; `cumulative_pnl` is
/// carried for consumers and left at zero by the engine.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Trade {
    pub symbol: String,
    pub direction: TradeDirection,
    pub quantity: f64,
    pub price: f64,
    pub commission: f64,
    pub timestamp: DateTime<Utc>,
    pub pnl: f64,
    pub cumulative_pnl: f64,
}

impl Trade {
    pub fn value(&self) -> f64 {
        self.quantity * self.price
    }

    pub fn total_cost(&self) -> f64 {
        self.value() + self.commission
    }

    pub fn is_sell(&self) -> bool {
        self.direction == TradeDirection::Sell
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn sample_trade() -> Trade {
        Trade {
            symbol: "AAPL".into(),
            direction: TradeDirection::Buy,
            quantity: 54.79,
            price: 182.5,
            commission: 0.0,
            timestamp: Utc.with_ymd_and_hms(2024, 1, 15, 9, 30, 0).unwrap(),
            pnl: 0.0,
            cumulative_pnl: 0.0,
        }
    }

    #[test]
    fn direction_display() {
        assert_eq!(TradeDirection::Buy.to_string(), "BUY");
        assert_eq!(TradeDirection::Sell.to_string(), "SELL");
    }

    #[test]
    fn value_is_quantity_times_price() {
        let trade = sample_trade();
        assert!((trade.value() - 54.79 * 182.5).abs() < 1e-9);
    }

    #[test]
    fn total_cost_adds_commission() {
        let trade = Trade {
            quantity: 10.0,
            price: 100.0,
            commission: 1.5,
            ..sample_trade()
        };
        assert!((trade.total_cost() - 1001.5).abs() < f64::EPSILON);
    }

    #[test]
    fn is_sell() {
        assert!(!sample_trade().is_sell());
        let sell = Trade {
            direction: TradeDirection::Sell,
            ..sample_trade()
        };
        assert!(sell.is_sell());
    }
}
