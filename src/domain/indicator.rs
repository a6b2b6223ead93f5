//! Technical indicators over an ordered bar slice.
//!
//! Indicators are pure: the same slice always yields the same value and the
//! window is always the trailing one, ending at the last bar of the slice.

use super::bar::Bar;
use super::error::IndicatorError;

/// Simple moving average of the last `period` closing prices.
pub fn sma(bars: &[Bar], period: usize) -> Result<f64, IndicatorError> {
    if period == 0 {
        return Err(IndicatorError::InvalidParameter {
            reason: format!("period must be positive, got {period}"),
        });
    }
    if bars.len() < period {
        return Err(IndicatorError::InsufficientData {
            needed: period,
            available: bars.len(),
        });
    }

    let window = &bars[bars.len() - period..];
    let sum: f64 = window.iter().map(|b| b.close).sum();
    Ok(sum / period as f64)
}
