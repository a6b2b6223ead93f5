//! Configuration validation.
//!
//! Every section is checked before any run starts so that a bad file fails
//! fast with the offending `[section] key`.

use chrono::{DateTime, NaiveDate, NaiveTime, TimeZone, Utc};

use crate::domain::error::TradesimError;
use crate::domain::strategy::STRATEGY_IDS;
use crate::domain::symbols::parse_symbols;
use crate::ports::config_port::ConfigPort;

pub const DEFAULT_INITIAL_CAPITAL: f64 = 10_000.0;
pub const DEFAULT_SHORT_PERIOD: usize = 10;
pub const DEFAULT_LONG_PERIOD: usize = 30;
pub const DEFAULT_POOL_SIZE: usize = 4;
pub const LOG_LEVELS: &[&str] = &["debug", "info", "warn", "error"];

pub fn validate_config(config: &dyn ConfigPort) -> Result<(), TradesimError> {
    validate_data_config(config)?;
    validate_backtest_config(config)?;
    validate_strategy_config(config)?;
    validate_worker_config(config)?;
    validate_logging_config(config)?;
    Ok(())
}

pub fn validate_data_config(config: &dyn ConfigPort) -> Result<(), TradesimError> {
    match config.get_string("data", "dir") {
        Some(_) => Ok(()),
        None => Err(missing("data", "dir")),
    }
}

pub fn validate_backtest_config(config: &dyn ConfigPort) -> Result<(), TradesimError> {
    validate_initial_capital(config)?;
    validate_dates(config)?;
    config_symbols(config)?;
    Ok(())
}

pub fn validate_strategy_config(config: &dyn ConfigPort) -> Result<(), TradesimError> {
    let id = config
        .get_string("strategy", "id")
        .ok_or_else(|| missing("strategy", "id"))?;
    if !STRATEGY_IDS.contains(&id.as_str()) {
        return Err(TradesimError::UnknownStrategy(id));
    }

    validate_periods(config)
}

/// `short_period` / `long_period`, when present, must be positive integers.
pub fn validate_periods(config: &dyn ConfigPort) -> Result<(), TradesimError> {
    for key in ["short_period", "long_period"] {
        if config.get_string("strategy", key).is_some() && config.get_int("strategy", key, 0) <= 0 {
            return Err(invalid(
                "strategy",
                key,
                format!("{key} must be a positive integer"),
            ));
        }
    }
    Ok(())
}

pub fn validate_worker_config(config: &dyn ConfigPort) -> Result<(), TradesimError> {
    let value = config.get_int("worker", "pool_size", DEFAULT_POOL_SIZE as i64);
    if value < 1 {
        return Err(invalid(
            "worker",
            "pool_size",
            "pool_size must be at least 1".to_string(),
        ));
    }
    Ok(())
}

pub fn validate_logging_config(config: &dyn ConfigPort) -> Result<(), TradesimError> {
    match config.get_string("logging", "level") {
        None => Ok(()),
        Some(level) if LOG_LEVELS.contains(&level.to_lowercase().as_str()) => Ok(()),
        Some(level) => Err(invalid(
            "logging",
            "level",
            format!("unknown log level '{level}', expected one of {}", LOG_LEVELS.join("|")),
        )),
    }
}

/// Symbols from `[backtest] symbols`, falling back to `[backtest] symbol`.
pub fn config_symbols(config: &dyn ConfigPort) -> Result<Vec<String>, TradesimError> {
    let (key, raw) = match config.get_string("backtest", "symbols") {
        Some(s) => ("symbols", s),
        None => match config.get_string("backtest", "symbol") {
            Some(s) => ("symbol", s),
            None => return Err(missing("backtest", "symbol")),
        },
    };
    parse_symbols(&raw).map_err(|e| invalid("backtest", key, e.to_string()))
}

/// `[start_date, end_date)` as midnight UTC instants.
pub fn config_dates(config: &dyn ConfigPort) -> Result<(DateTime<Utc>, DateTime<Utc>), TradesimError> {
    let start = parse_date(config.get_string("backtest", "start_date").as_deref(), "start_date")?;
    let end = parse_date(config.get_string("backtest", "end_date").as_deref(), "end_date")?;
    Ok((start, end))
}

/// Parse `YYYY-MM-DD` into midnight UTC.
pub fn parse_date(value: Option<&str>, field: &str) -> Result<DateTime<Utc>, TradesimError> {
    let s = value.ok_or_else(|| missing("backtest", field))?;
    let date = NaiveDate::parse_from_str(s, "%Y-%m-%d").map_err(|_| {
        invalid(
            "backtest",
            field,
            format!("invalid {field} format, expected YYYY-MM-DD"),
        )
    })?;
    Ok(Utc.from_utc_datetime(&date.and_time(NaiveTime::MIN)))
}

pub fn validate_initial_capital(config: &dyn ConfigPort) -> Result<(), TradesimError> {
    let value = config.get_double("backtest", "initial_capital", DEFAULT_INITIAL_CAPITAL);
    if value <= 0.0 || !value.is_finite() {
        return Err(invalid(
            "backtest",
            "initial_capital",
            "initial_capital must be positive".to_string(),
        ));
    }
    Ok(())
}

pub fn validate_dates(config: &dyn ConfigPort) -> Result<(), TradesimError> {
    let (start, end) = config_dates(config)?;
    if start >= end {
        return Err(invalid(
            "backtest",
            "start_date",
            "start_date must be before end_date".to_string(),
        ));
    }
    Ok(())
}

fn missing(section: &str, key: &str) -> TradesimError {
    TradesimError::ConfigMissing {
        section: section.to_string(),
        key: key.to_string(),
    }
}

fn invalid(section: &str, key: &str, reason: String) -> TradesimError {
    TradesimError::ConfigInvalid {
        section: section.to_string(),
        key: key.to_string(),
        reason,
    }
}
