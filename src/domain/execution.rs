//! Bar-by-bar strategy execution and fill simulation.
//!
//! Single-instrument, single-position model: a buy goes all-in with the
//! available cash at the bar's close (fractional shares), a sell liquidates
//! the whole position at the bar's close. No commission, slippage or
//! shorting. The loop is strictly sequential because every bar's strategy
//! call reads the cash/position left by the previous bar.

use chrono::{DateTime, Utc};
use std::sync::atomic::{AtomicBool, Ordering};
use tracing::{debug, info};

use super::account::Account;
use super::bar::Bar;
use super::error::TradesimError;
use super::position::Position;
use super::strategy::{Context, Signal, Strategy};
use super::trade::{Trade, TradeDirection};
use crate::ports::data_port::DataPort;

/// Outcome of a buy attempt.
#[derive(Debug, Clone, PartialEq)]
pub enum BuyResult {
    Filled { shares: f64, cost: f64 },
    AlreadyInvested,
    InsufficientCash,
}

/// Outcome of a full liquidation.
#[derive(Debug, Clone, PartialEq)]
pub struct SellResult {
    pub shares: f64,
    pub proceeds: f64,
    pub pnl: f64,
}

/// Open a position with all available cash at `bar.close`.
///
/// Skipped when a position is already open, when cash cannot cover one unit,
/// or when the close is not a positive price.
pub fn execute_buy(account: &mut Account, symbol: &str, bar: &Bar) -> BuyResult {
    if account.has_position() {
        return BuyResult::AlreadyInvested;
    }

    let price = bar.close;
    if price <= 0.0 || account.cash < price {
        return BuyResult::InsufficientCash;
    }

    let shares = account.cash / price;
    if !(shares > 0.0 && shares.is_finite()) {
        return BuyResult::InsufficientCash;
    }

    let cost = shares * price;
    account.cash -= cost;
    account.position = Some(Position {
        symbol: symbol.to_string(),
        shares,
        entry_price: price,
        entry_time: bar.timestamp,
    });
    account.record_trade(Trade {
        symbol: symbol.to_string(),
        direction: TradeDirection::Buy,
        quantity: shares,
        price,
        commission: 0.0,
        timestamp: bar.timestamp,
        pnl: 0.0,
        cumulative_pnl: 0.0,
    });

    BuyResult::Filled { shares, cost }
}

/// Close the open position at `bar.close`. Returns `None` when flat.
pub fn execute_sell(account: &mut Account, symbol: &str, bar: &Bar) -> Option<SellResult> {
    if !account.has_position() {
        return None;
    }
    let position = account.position.take()?;

    let price = bar.close;
    let proceeds = position.shares * price;
    let pnl = proceeds - position.cost_basis();

    account.cash += proceeds;
    account.record_trade(Trade {
        symbol: symbol.to_string(),
        direction: TradeDirection::Sell,
        quantity: position.shares,
        price,
        commission: 0.0,
        timestamp: bar.timestamp,
        pnl,
        cumulative_pnl: 0.0,
    });

    Some(SellResult {
        shares: position.shares,
        proceeds,
        pnl,
    })
}

/// Drives one strategy over one symbol's bars.
pub struct Executor<'a> {
    strategy: &'a dyn Strategy,
    data_port: &'a dyn DataPort,
    initial_cash: f64,
}

impl<'a> Executor<'a> {
    pub fn new(strategy: &'a dyn Strategy, data_port: &'a dyn DataPort, initial_cash: f64) -> Self {
        Executor {
            strategy,
            data_port,
            initial_cash,
        }
    }

    /// Replay `[start, end)` for `symbol` and return the trade ledger.
    ///
    /// Fails with `NoData` when the window holds no bars. A strategy error
    /// aborts the run and discards every trade produced so far. A position
    /// still open after the last bar is left open.
    pub fn run(
        &self,
        symbol: &str,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<Trade>, TradesimError> {
        let bars = self.fetch(symbol, start, end)?;
        self.simulate(symbol, &bars, None)
    }

    /// Like [`run`](Self::run), but stops between bars once `cancel` is set.
    pub fn run_with_cancel(
        &self,
        symbol: &str,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        cancel: &AtomicBool,
    ) -> Result<Vec<Trade>, TradesimError> {
        let bars = self.fetch(symbol, start, end)?;
        self.simulate(symbol, &bars, Some(cancel))
    }

    fn fetch(
        &self,
        symbol: &str,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<Bar>, TradesimError> {
        let bars = self.data_port.get_bars(symbol, start, end)?;
        if bars.is_empty() {
            return Err(TradesimError::NoData {
                symbol: symbol.to_string(),
                start,
                end,
            });
        }
        Ok(bars)
    }

    fn simulate(
        &self,
        symbol: &str,
        bars: &[Bar],
        cancel: Option<&AtomicBool>,
    ) -> Result<Vec<Trade>, TradesimError> {
        info!(
            strategy = self.strategy.name(),
            symbol,
            bars = bars.len(),
            initial_cash = self.initial_cash,
            "starting simulation"
        );

        let mut account = Account::new(self.initial_cash);

        for (i, bar) in bars.iter().enumerate() {
            if cancel.is_some_and(|flag| flag.load(Ordering::Relaxed)) {
                return Err(TradesimError::Cancelled { processed: i });
            }

            let ctx = Context::new(symbol, bars, i, account.open_position(), account.cash);
            let signal = self
                .strategy
                .generate(&ctx)
                .map_err(|source| TradesimError::Strategy {
                    timestamp: bar.timestamp,
                    source,
                })?;

            match signal {
                Signal::Buy => {
                    if let BuyResult::Filled { shares, cost } =
                        execute_buy(&mut account, symbol, bar)
                    {
                        debug!(timestamp = %bar.timestamp, shares, price = bar.close, cost, "buy filled");
                    }
                }
                Signal::Sell => {
                    if let Some(fill) = execute_sell(&mut account, symbol, bar) {
                        debug!(timestamp = %bar.timestamp, shares = fill.shares, price = bar.close, pnl = fill.pnl, "sell filled");
                    }
                }
                Signal::Hold => {}
            }
        }

        let last_close = bars.last().map_or(0.0, |b| b.close);
        info!(
            symbol,
            trades = account.trades.len(),
            cash = account.cash,
            open_position = account.has_position(),
            equity = account.total_equity(last_close),
            return_pct = account.return_pct(last_close),
            "simulation complete"
        );

        Ok(account.into_trades())
    }
}
