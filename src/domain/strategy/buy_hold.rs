//! Buy on the first bar, then hold forever.

use super::{Context, Signal, Strategy};
use crate::domain::error::StrategyError;

#[derive(Debug, Clone, Copy, Default)]
pub struct BuyHold;

impl BuyHold {
    pub fn new() -> Self {
        BuyHold
    }
}

impl Strategy for BuyHold {
    fn name(&self) -> &str {
        "Buy and Hold"
    }

    fn generate(&self, ctx: &Context<'_>) -> Result<Signal, StrategyError> {
        if ctx.has_position() {
            Ok(Signal::Hold)
        } else {
            Ok(Signal::Buy)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::strategy::test_support::*;

    #[test]
    fn buys_without_position() {
        let bars = make_bars(&[10.0, 11.0]);
        let ctx = Context::new("TEST", &bars, 1, None, 1000.0);
        assert_eq!(BuyHold::new().generate(&ctx), Ok(Signal::Buy));
    }

    #[test]
    fn holds_with_position() {
        let bars = make_bars(&[10.0, 11.0]);
        let pos = open_position(&bars[0]);
        let ctx = Context::new("TEST", &bars, 1, Some(&pos), 0.0);
        assert_eq!(BuyHold::new().generate(&ctx), Ok(Signal::Hold));
    }

    #[test]
    fn name() {
        assert_eq!(BuyHold::new().name(), "Buy and Hold");
    }
}
