//! Domain error types.
//!
//! Indicator and strategy failures have their own types so that a strategy
//! can recover from missing history without touching the run-level error.

use chrono::{DateTime, Utc};

/// Failure of a pure indicator computation.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum IndicatorError {
    #[error("invalid parameter: {reason}")]
    InvalidParameter { reason: String },

    #[error("insufficient data: need {needed} bars, have {available}")]
    InsufficientData { needed: usize, available: usize },
}

/// Failure raised by a strategy while generating a signal.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum StrategyError {
    #[error(transparent)]
    Indicator(#[from] IndicatorError),

    #[error("{0}")]
    Other(String),
}

/// Top-level error type for tradesim.
#[derive(Debug, thiserror::Error)]
pub enum TradesimError {
    #[error("invalid parameter: {reason}")]
    InvalidParameter { reason: String },

    #[error("invalid market data: {reason}")]
    InvalidMarketData { reason: String },

    #[error("no bars found for {symbol} between {start} and {end}")]
    NoData {
        symbol: String,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    },

    #[error("not found: {what}")]
    NotFound { what: String },

    #[error("strategy error on {timestamp}: {source}")]
    Strategy {
        timestamp: DateTime<Utc>,
        #[source]
        source: StrategyError,
    },

    #[error("run cancelled after {processed} bars")]
    Cancelled { processed: usize },

    #[error("data source error: {reason}")]
    DataSource { reason: String },

    #[error("config parse error in {file}: {reason}")]
    ConfigParse { file: String, reason: String },

    #[error("missing config key [{section}] {key}")]
    ConfigMissing { section: String, key: String },

    #[error("invalid config value [{section}] {key}: {reason}")]
    ConfigInvalid {
        section: String,
        key: String,
        reason: String,
    },

    #[error("unknown strategy: {0}")]
    UnknownStrategy(String),

    #[error("{failed} of {total} backtest runs failed")]
    RunsFailed { failed: usize, total: usize },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl TradesimError {
    /// Process exit status for this error family.
    pub fn exit_status(&self) -> u8 {
        match self {
            TradesimError::Io(_)
            | TradesimError::DataSource { .. }
            | TradesimError::RunsFailed { .. } => 1,
            TradesimError::ConfigParse { .. }
            | TradesimError::ConfigMissing { .. }
            | TradesimError::ConfigInvalid { .. }
            | TradesimError::InvalidParameter { .. } => 2,
            TradesimError::InvalidMarketData { .. } => 3,
            TradesimError::Strategy { .. } | TradesimError::UnknownStrategy(_) => 4,
            TradesimError::NoData { .. } | TradesimError::NotFound { .. } => 5,
            TradesimError::Cancelled { .. } => 6,
        }
    }
}

impl From<&TradesimError> for std::process::ExitCode {
    fn from(err: &TradesimError) -> Self {
        std::process::ExitCode::from(err.exit_status())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn indicator_error_converts_into_strategy_error() {
        let err: StrategyError = IndicatorError::InsufficientData {
            needed: 30,
            available: 5,
        }
        .into();
        assert_eq!(err.to_string(), "insufficient data: need 30 bars, have 5");
    }

    #[test]
    fn strategy_error_keeps_bar_timestamp_in_message() {
        let ts = Utc.with_ymd_and_hms(2024, 3, 1, 0, 0, 0).unwrap();
        let err = TradesimError::Strategy {
            timestamp: ts,
            source: StrategyError::Indicator(IndicatorError::InvalidParameter {
                reason: "period must be positive, got 0".into(),
            }),
        };
        let msg = err.to_string();
        assert!(msg.starts_with("strategy error on 2024-03-01"));
        assert!(msg.ends_with("period must be positive, got 0"));
    }

    #[test]
    fn exit_codes_group_error_families() {
        let config = TradesimError::ConfigMissing {
            section: "backtest".into(),
            key: "start_date".into(),
        };
        let missing = TradesimError::NotFound {
            what: "symbol XYZ".into(),
        };
        let cancelled = TradesimError::Cancelled { processed: 3 };
        assert_eq!(config.exit_status(), 2);
        assert_eq!(missing.exit_status(), 5);
        assert_eq!(cancelled.exit_status(), 6);
    }
}
