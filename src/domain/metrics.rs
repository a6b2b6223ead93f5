//! Performance metrics derived from a completed trade ledger.
//!
//! Accounting follows the executor: only sells carry realized P&L, capital
//! grows by realized P&L only, and an open position at the end of a run
//! contributes nothing.

use chrono::{DateTime, Utc};

use super::trade::Trade;

const TRADING_DAYS_PER_YEAR: f64 = 252.0;

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Metrics {
    pub initial_capital: f64,
    pub final_capital: f64,
    /// Dollar return.
    pub total_return: f64,
    pub return_pct: f64,

    pub total_trades: usize,
    pub winning_trades: usize,
    pub losing_trades: usize,
    /// Percentage of decided (non-breakeven) round trips that won.
    pub win_rate: f64,

    pub gross_profit: f64,
    pub gross_loss: f64,
    pub net_profit: f64,
    pub average_trade: f64,
    pub average_win: f64,
    pub average_loss: f64,

    /// Largest peak-to-trough decline of realized equity, in percent.
    pub max_drawdown: f64,
    pub max_drawdown_amt: f64,
    pub sharpe_ratio: f64,

    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
    /// Whole days between start and end.
    pub duration: i64,
}

impl Metrics {
    /// Gross profit over gross loss. Zero when there is no loss, even if
    /// there is profit.
    pub fn profit_factor(&self) -> f64 {
        if self.gross_loss == 0.0 {
            return 0.0;
        }
        self.gross_profit / self.gross_loss
    }

    /// Expected P&L per trade, weighting by the share of all ledger entries.
    pub fn expectancy(&self) -> f64 {
        if self.total_trades == 0 {
            return 0.0;
        }
        let n = self.total_trades as f64;
        let win_prob = self.winning_trades as f64 / n;
        let loss_prob = self.losing_trades as f64 / n;
        win_prob * self.average_win - loss_prob * self.average_loss
    }

    /// ((1 + return_pct/100)^(365/duration) - 1) * 100, zero for a zero-day window.
    pub fn annualized_return(&self) -> f64 {
        if self.duration == 0 {
            return 0.0;
        }
        let rate = self.return_pct / 100.0;
        ((1.0 + rate).powf(365.0 / self.duration as f64) - 1.0) * 100.0
    }
}

/// Computes [`Metrics`] for runs that started with `initial_capital`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Calculator {
    initial_capital: f64,
}

impl Calculator {
    pub fn new(initial_capital: f64) -> Self {
        Calculator { initial_capital }
    }

    /// Never fails: undefined ratios come back as zero.
    pub fn calculate(&self, trades: &[Trade], start: DateTime<Utc>, end: DateTime<Utc>) -> Metrics {
        let mut m = self.flat(start, end);
        if trades.is_empty() {
            return m;
        }

        self.trade_stats(trades, &mut m);
        self.returns(trades, &mut m);
        let (pct, amt) = self.drawdown(trades);
        m.max_drawdown = pct;
        m.max_drawdown_amt = amt;
        m.sharpe_ratio = self.sharpe(trades);
        m
    }

    fn flat(&self, start: DateTime<Utc>, end: DateTime<Utc>) -> Metrics {
        Metrics {
            initial_capital: self.initial_capital,
            final_capital: self.initial_capital,
            total_return: 0.0,
            return_pct: 0.0,
            total_trades: 0,
            winning_trades: 0,
            losing_trades: 0,
            win_rate: 0.0,
            gross_profit: 0.0,
            gross_loss: 0.0,
            net_profit: 0.0,
            average_trade: 0.0,
            average_win: 0.0,
            average_loss: 0.0,
            max_drawdown: 0.0,
            max_drawdown_amt: 0.0,
            sharpe_ratio: 0.0,
            start_date: start,
            end_date: end,
            duration: (end - start).num_days(),
        }
    }

    fn trade_stats(&self, trades: &[Trade], m: &mut Metrics) {
        m.total_trades = trades.len();

        for trade in trades.iter().filter(|t| t.is_sell()) {
            if trade.pnl > 0.0 {
                m.winning_trades += 1;
                m.gross_profit += trade.pnl;
            } else if trade.pnl < 0.0 {
                m.losing_trades += 1;
                m.gross_loss += trade.pnl.abs();
            }
            m.net_profit += trade.pnl;
        }

        // a buy and its sell count as one round trip
        let round_trips = trades.len() / 2;
        if round_trips > 0 {
            m.average_trade = m.net_profit / round_trips as f64;
        }
        if m.winning_trades > 0 {
            m.average_win = m.gross_profit / m.winning_trades as f64;
        }
        if m.losing_trades > 0 {
            m.average_loss = m.gross_loss / m.losing_trades as f64;
        }
        let decided = m.winning_trades + m.losing_trades;
        if decided > 0 {
            m.win_rate = m.winning_trades as f64 / decided as f64 * 100.0;
        }
    }

    fn returns(&self, trades: &[Trade], m: &mut Metrics) {
        let realized: f64 = trades.iter().filter(|t| t.is_sell()).map(|t| t.pnl).sum();
        m.final_capital = self.initial_capital + realized;
        m.total_return = m.final_capital - self.initial_capital;
        if self.initial_capital > 0.0 {
            m.return_pct = m.total_return / self.initial_capital * 100.0;
        }
    }

    /// `(max drawdown %, dollar drawdown at that point)` over realized equity.
    fn drawdown(&self, trades: &[Trade]) -> (f64, f64) {
        let mut ordered: Vec<&Trade> = trades.iter().collect();
        ordered.sort_by_key(|t| t.timestamp);

        let mut equity = self.initial_capital;
        let mut peak = equity;
        let mut max_pct = 0.0_f64;
        let mut max_amt = 0.0_f64;

        for trade in ordered {
            if trade.is_sell() {
                equity += trade.pnl;
            }
            if equity > peak {
                peak = equity;
            }
            if peak <= 0.0 {
                continue;
            }
            let amt = peak - equity;
            let pct = amt / peak * 100.0;
            if pct > max_pct {
                max_pct = pct;
                max_amt = amt;
            }
        }

        (max_pct, max_amt)
    }

    fn sharpe(&self, trades: &[Trade]) -> f64 {
        if self.initial_capital <= 0.0 {
            return 0.0;
        }
        let returns: Vec<f64> = trades
            .iter()
            .filter(|t| t.is_sell())
            .map(|t| t.pnl / self.initial_capital * 100.0)
            .collect();
        sharpe_ratio(&returns)
    }
}

/// Annualized Sharpe ratio of per-trade percentage returns, risk-free rate 0.
///
/// Population statistics (divide by N). Zero with fewer than two returns or
/// zero dispersion.
pub fn sharpe_ratio(returns: &[f64]) -> f64 {
    if returns.len() < 2 {
        return 0.0;
    }

    let n = returns.len() as f64;
    let mean = returns.iter().sum::<f64>() / n;
    let variance = returns.iter().map(|r| (r - mean).powi(2)).sum::<f64>() / n;
    let stddev = variance.sqrt();

    if stddev > 0.0 {
        mean / stddev * TRADING_DAYS_PER_YEAR.sqrt()
    } else {
        0.0
    }
}
