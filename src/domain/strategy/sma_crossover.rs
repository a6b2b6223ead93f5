//! Short/long simple moving average crossover.
//!
//! Stateless: both averages are recomputed on every bar, once over the full
//! history including the current bar and once over the history without it,
//! and a cross is detected between the two snapshots.
//!
//! Equality belongs to the previous snapshot (`<=` / `>=`) and the current
//! snapshot must be strict (`>` / `<`).
//!
//! Both signals are gated on the *absence* of an open position. A death cross
//! therefore only emits `Sell` when flat, which the executor ignores, so this
//! strategy never closes the position it opened.

use super::{Context, Signal, Strategy};
use crate::domain::bar::Bar;
use crate::domain::error::{IndicatorError, StrategyError};
use crate::domain::indicator::sma;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SmaCrossover {
    pub short_period: usize,
    pub long_period: usize,
}

impl SmaCrossover {
    pub fn new(short_period: usize, long_period: usize) -> Self {
        SmaCrossover {
            short_period,
            long_period,
        }
    }

    /// `(short, long)` averages over `bars`, or `None` while history is short.
    fn averages(&self, bars: &[Bar]) -> Result<Option<(f64, f64)>, StrategyError> {
        let short = match sma(bars, self.short_period) {
            Ok(v) => v,
            Err(IndicatorError::InsufficientData { .. }) => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        let long = match sma(bars, self.long_period) {
            Ok(v) => v,
            Err(IndicatorError::InsufficientData { .. }) => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        Ok(Some((short, long)))
    }
}

impl Strategy for SmaCrossover {
    fn name(&self) -> &str {
        "SMA Crossover"
    }

    fn generate(&self, ctx: &Context<'_>) -> Result<Signal, StrategyError> {
        let all = ctx.all_bars();
        if all.len() < self.long_period {
            return Ok(Signal::Hold);
        }

        let Some((short, long)) = self.averages(all)? else {
            return Ok(Signal::Hold);
        };

        if all.len() < self.long_period + 1 {
            return Ok(Signal::Hold);
        }

        let previous = &all[..all.len() - 1];
        let Some((prev_short, prev_long)) = self.averages(previous)? else {
            return Ok(Signal::Hold);
        };

        let golden_cross = prev_short <= prev_long && short > long;
        if golden_cross && !ctx.has_position() {
            return Ok(Signal::Buy);
        }

        let death_cross = prev_short >= prev_long && short < long;
        if death_cross && !ctx.has_position() {
            return Ok(Signal::Sell);
        }

        Ok(Signal::Hold)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::strategy::test_support::*;

    fn signal_at(strategy: &SmaCrossover, prices: &[f64], with_position: bool) -> Signal {
        let bars = make_bars(prices);
        let last = bars.len() - 1;
        let pos = open_position(&bars[0]);
        let position = with_position.then_some(&pos);
        let ctx = Context::new("TEST", &bars, last, position, 1000.0);
        strategy.generate(&ctx).unwrap()
    }

    #[test]
    fn holds_without_enough_history() {
        let s = SmaCrossover::new(2, 3);
        assert_eq!(signal_at(&s, &[1.0, 2.0], false), Signal::Hold);
        // long_period bars: current averages exist but no previous snapshot
        assert_eq!(signal_at(&s, &[1.0, 2.0, 9.0], false), Signal::Hold);
    }

    #[test]
    fn golden_cross_buys_when_flat() {
        // prev: short(5,5)=5 == long(5,5,5)=5; now: short(5,8)=6.5 > long(5,5,8)=6
        let s = SmaCrossover::new(2, 3);
        assert_eq!(signal_at(&s, &[5.0, 5.0, 5.0, 8.0], false), Signal::Buy);
    }

    #[test]
    fn golden_cross_holds_when_invested() {
        let s = SmaCrossover::new(2, 3);
        assert_eq!(signal_at(&s, &[5.0, 5.0, 5.0, 8.0], true), Signal::Hold);
    }

    #[test]
    fn death_cross_sells_only_when_flat() {
        let s = SmaCrossover::new(2, 3);
        assert_eq!(signal_at(&s, &[5.0, 5.0, 5.0, 2.0], false), Signal::Sell);
        assert_eq!(signal_at(&s, &[5.0, 5.0, 5.0, 2.0], true), Signal::Hold);
    }

    #[test]
    fn no_cross_when_trend_continues() {
        // short stays above long on both snapshots
        let s = SmaCrossover::new(2, 3);
        assert_eq!(signal_at(&s, &[1.0, 2.0, 3.0, 4.0, 5.0], false), Signal::Hold);
    }

    #[test]
    fn equality_on_current_side_is_not_a_cross() {
        // prev: short(4,4)=4 < long(7,4,4)=5; now: short(4,4)=4 == long(4,4,4)=4
        let s = SmaCrossover::new(2, 3);
        assert_eq!(signal_at(&s, &[7.0, 4.0, 4.0, 4.0], false), Signal::Hold);
    }

    #[test]
    fn zero_period_is_an_error() {
        let s = SmaCrossover::new(0, 3);
        let bars = make_bars(&[1.0, 2.0, 3.0, 4.0]);
        let ctx = Context::new("TEST", &bars, 3, None, 1000.0);
        assert!(matches!(
            s.generate(&ctx),
            Err(StrategyError::Indicator(IndicatorError::InvalidParameter { .. }))
        ));
    }

    #[test]
    fn short_longer_than_long_holds_until_history_allows() {
        let s = SmaCrossover::new(5, 3);
        assert_eq!(signal_at(&s, &[1.0, 2.0, 3.0, 4.0], false), Signal::Hold);
    }

    #[test]
    fn name() {
        assert_eq!(SmaCrossover::new(10, 30).name(), "SMA Crossover");
    }
}
