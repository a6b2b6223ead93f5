//! OHLCV price bar for one symbol at one timestamp.

use chrono::{DateTime, Utc};

use super::error::TradesimError;

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Bar {
    pub symbol: String,
    pub timestamp: DateTime<Utc>,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: i64,
}

impl Bar {
    /// Check the OHLC ordering and sign constraints of a freshly ingested bar.
    pub fn validate(&self) -> Result<(), TradesimError> {
        let reason = if self.high < self.low {
            "high must be higher than low"
        } else if self.high < self.open || self.high < self.close {
            "high must be higher than open/close"
        } else if self.low > self.open || self.low > self.close {
            "low must be lower than open/close"
        } else if self.open < 0.0 || self.high < 0.0 || self.low < 0.0 || self.close < 0.0 {
            "prices cannot be negative"
        } else if self.volume < 0 {
            "volume cannot be negative"
        } else {
            return Ok(());
        };
        Err(TradesimError::InvalidMarketData {
            reason: reason.to_string(),
        })
    }

    /// (high + low + close) / 3
    pub fn typical_price(&self) -> f64 {
        (self.high + self.low + self.close) / 3.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn sample_bar() -> Bar {
        Bar {
            symbol: "AAPL".into(),
            timestamp: Utc.with_ymd_and_hms(2024, 1, 15, 0, 0, 0).unwrap(),
            open: 100.0,
            high: 110.0,
            low: 90.0,
            close: 105.0,
            volume: 50_000,
        }
    }

    fn reason(bar: &Bar) -> String {
        match bar.validate() {
            Err(TradesimError::InvalidMarketData { reason }) => reason,
            other => panic!("expected InvalidMarketData, got {other:?}"),
        }
    }

    #[test]
    fn valid_bar_passes() {
        assert!(sample_bar().validate().is_ok());
    }

    #[test]
    fn flat_bar_passes() {
        let bar = Bar {
            open: 50.0,
            high: 50.0,
            low: 50.0,
            close: 50.0,
            volume: 0,
            ..sample_bar()
        };
        assert!(bar.validate().is_ok());
    }

    #[test]
    fn high_below_low_rejected() {
        let bar = Bar {
            high: 80.0,
            ..sample_bar()
        };
        assert_eq!(reason(&bar), "high must be higher than low");
    }

    #[test]
    fn close_above_high_rejected() {
        let bar = Bar {
            close: 111.0,
            ..sample_bar()
        };
        assert_eq!(reason(&bar), "high must be higher than open/close");
    }

    #[test]
    fn low_above_open_and_close_rejected() {
        let bar = Bar {
            open: 100.0,
            high: 110.0,
            low: 105.0,
            close: 102.0,
            ..sample_bar()
        };
        assert_eq!(reason(&bar), "low must be lower than open/close");
    }

    #[test]
    fn low_above_close_only_rejected() {
        let bar = Bar {
            low: 95.0,
            close: 94.0,
            ..sample_bar()
        };
        assert_eq!(reason(&bar), "low must be lower than open/close");
    }

    #[test]
    fn negative_low_rejected() {
        let bar = Bar {
            open: 1.0,
            high: 2.0,
            low: -1.0,
            close: 1.0,
            ..sample_bar()
        };
        assert_eq!(reason(&bar), "prices cannot be negative");
    }

    #[test]
    fn negative_volume_rejected() {
        let bar = Bar {
            volume: -1,
            ..sample_bar()
        };
        assert_eq!(reason(&bar), "volume cannot be negative");
    }

    #[test]
    fn typical_price() {
        let bar = sample_bar();
        let expected = (110.0 + 90.0 + 105.0) / 3.0;
        assert!((bar.typical_price() - expected).abs() < f64::EPSILON);
    }
}
