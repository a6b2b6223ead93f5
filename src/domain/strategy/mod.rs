//! Signal generation.
//!
//! A strategy sees one read-only [`Context`] per bar and answers with a
//! [`Signal`]. It never mutates run state; the executor applies the signal.

pub mod buy_hold;
pub mod sma_crossover;

pub use buy_hold::BuyHold;
pub use sma_crossover::SmaCrossover;

use std::fmt;

use super::bar::Bar;
use super::error::StrategyError;
use super::position::Position;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Signal {
    Hold,
    Buy,
    Sell,
}

impl fmt::Display for Signal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Signal::Hold => write!(f, "HOLD"),
            Signal::Buy => write!(f, "BUY"),
            Signal::Sell => write!(f, "SELL"),
        }
    }
}

/// Per-bar view of a run, rebuilt by the executor on every iteration.
#[derive(Debug, Clone, Copy)]
pub struct Context<'a> {
    pub symbol: &'a str,
    pub current_bar: &'a Bar,
    /// Bars strictly before `current_bar`, ascending.
    pub historical_bars: &'a [Bar],
    pub position: Option<&'a Position>,
    pub cash: f64,
    window: &'a [Bar],
}

impl<'a> Context<'a> {
    /// View of `bars[index]` with `bars[..index]` as history.
    ///
    /// Panics if `index` is out of bounds.
    pub fn new(
        symbol: &'a str,
        bars: &'a [Bar],
        index: usize,
        position: Option<&'a Position>,
        cash: f64,
    ) -> Self {
        let window = &bars[..=index];
        Context {
            symbol,
            current_bar: &bars[index],
            historical_bars: &bars[..index],
            position,
            cash,
            window,
        }
    }

    pub fn bar_count(&self) -> usize {
        self.historical_bars.len() + 1
    }

    pub fn has_position(&self) -> bool {
        self.position.is_some_and(Position::is_open)
    }

    /// History followed by the current bar.
    pub fn all_bars(&self) -> &'a [Bar] {
        self.window
    }
}

pub trait Strategy: Send + Sync {
    fn name(&self) -> &str;

    fn generate(&self, ctx: &Context<'_>) -> Result<Signal, StrategyError>;
}

/// Identifiers accepted in `[strategy] id`.
pub const STRATEGY_IDS: &[&str] = &["buy_hold", "sma_crossover", "sma_crossover_20_50"];
