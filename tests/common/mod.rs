#![allow(dead_code)]

use chrono::{DateTime, Duration, NaiveDate, NaiveTime, TimeZone, Utc};
use std::collections::HashMap;
pub use tradesim::domain::bar::Bar;
use tradesim::domain::error::TradesimError;
use tradesim::ports::data_port::DataPort;

pub struct MockDataPort {
    pub data: HashMap<String, Vec<Bar>>,
    pub errors: HashMap<String, String>,
}

impl MockDataPort {
    pub fn new() -> Self {
        Self {
            data: HashMap::new(),
            errors: HashMap::new(),
        }
    }

    pub fn with_bars(mut self, symbol: &str, bars: Vec<Bar>) -> Self {
        self.data.insert(symbol.to_string(), bars);
        self
    }

    pub fn with_error(mut self, symbol: &str, reason: &str) -> Self {
        self.errors.insert(symbol.to_string(), reason.to_string());
        self
    }

    fn check(&self, symbol: &str) -> Result<(), TradesimError> {
        match self.errors.get(symbol) {
            Some(reason) => Err(TradesimError::DataSource {
                reason: reason.clone(),
            }),
            None => Ok(()),
        }
    }
}

impl DataPort for MockDataPort {
    fn get_bars(
        &self,
        symbol: &str,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<Bar>, TradesimError> {
        self.check(symbol)?;
        Ok(self
            .data
            .get(symbol)
            .map(|bars| {
                bars.iter()
                    .filter(|b| b.timestamp >= start && b.timestamp < end)
                    .cloned()
                    .collect()
            })
            .unwrap_or_default())
    }

    fn get_latest_bar(&self, symbol: &str) -> Result<Bar, TradesimError> {
        self.check(symbol)?;
        self.data
            .get(symbol)
            .and_then(|bars| bars.last().cloned())
            .ok_or_else(|| TradesimError::NotFound {
                what: symbol.to_string(),
            })
    }

    fn list_symbols(&self) -> Result<Vec<String>, TradesimError> {
        let mut symbols: Vec<String> = self.data.keys().cloned().collect();
        symbols.sort();
        Ok(symbols)
    }
}

/// Midnight UTC on `YYYY-MM-DD`.
pub fn ts(date: &str) -> DateTime<Utc> {
    let d = NaiveDate::parse_from_str(date, "%Y-%m-%d").unwrap();
    Utc.from_utc_datetime(&d.and_time(NaiveTime::MIN))
}

pub fn make_bar(symbol: &str, date: &str, close: f64) -> Bar {
    Bar {
        symbol: symbol.to_string(),
        timestamp: ts(date),
        open: close,
        high: close + 1.0,
        low: close - 1.0,
        close,
        volume: 1000,
    }
}

/// One bar per day from `start_date` with the given closes.
pub fn bars_from_closes(symbol: &str, start_date: &str, closes: &[f64]) -> Vec<Bar> {
    let start = ts(start_date);
    closes
        .iter()
        .enumerate()
        .map(|(i, &close)| Bar {
            symbol: symbol.to_string(),
            timestamp: start + Duration::days(i as i64),
            open: close,
            high: close + 1.0,
            low: (close - 1.0).max(0.0),
            close,
            volume: 1000,
        })
        .collect()
}

/// Rising by 1.0 per day from `start_price`.
pub fn generate_bars(symbol: &str, start_date: &str, count: usize, start_price: f64) -> Vec<Bar> {
    let closes: Vec<f64> = (0..count).map(|i| start_price + i as f64).collect();
    bars_from_closes(symbol, start_date, &closes)
}

pub fn daily_csv(bars: &[Bar]) -> String {
    let mut out = String::from("Date,Open,High,Low,Close,Volume\n");
    for b in bars {
        out.push_str(&format!(
            "{},{},{},{},{},{}\n",
            b.timestamp.format("%Y-%m-%d"),
            b.open,
            b.high,
            b.low,
            b.close,
            b.volume
        ));
    }
    out
}
