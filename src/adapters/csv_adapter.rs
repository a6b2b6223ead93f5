//! CSV file market data adapter.
//!
//! One file per symbol, `<dir>/<SYMBOL>_daily.csv`, with a header row and
//! the columns `Date,Open,High,Low,Close,Volume`. A file is parsed once and
//! kept in memory for the life of the adapter.

use std::collections::HashMap;
use std::fs;
use std::io::ErrorKind;
use std::path::PathBuf;
use std::str::FromStr;
use std::sync::{Arc, PoisonError, RwLock};

use chrono::{DateTime, NaiveDate, NaiveTime, TimeZone, Utc};
use tracing::debug;

use crate::domain::bar::Bar;
use crate::domain::error::TradesimError;
use crate::ports::data_port::DataPort;

const FILE_SUFFIX: &str = "_daily.csv";
const COLUMNS: usize = 6;

pub struct CsvDataAdapter {
    base_path: PathBuf,
    cache: RwLock<HashMap<String, Arc<Vec<Bar>>>>,
}

impl CsvDataAdapter {
    pub fn new(base_path: impl Into<PathBuf>) -> Self {
        Self {
            base_path: base_path.into(),
            cache: RwLock::new(HashMap::new()),
        }
    }

    fn csv_path(&self, symbol: &str) -> PathBuf {
        self.base_path.join(format!("{symbol}{FILE_SUFFIX}"))
    }

    fn bars(&self, symbol: &str) -> Result<Arc<Vec<Bar>>, TradesimError> {
        if let Some(bars) = self
            .cache
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(symbol)
        {
            return Ok(Arc::clone(bars));
        }

        let bars = Arc::new(self.load(symbol)?);
        self.cache
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(symbol.to_string(), Arc::clone(&bars));
        Ok(bars)
    }

    fn load(&self, symbol: &str) -> Result<Vec<Bar>, TradesimError> {
        let path = self.csv_path(symbol);
        let content = fs::read_to_string(&path).map_err(|e| match e.kind() {
            ErrorKind::NotFound => TradesimError::NotFound {
                what: format!("market data for {symbol} ({})", path.display()),
            },
            _ => TradesimError::DataSource {
                reason: format!("failed to read {}: {}", path.display(), e),
            },
        })?;

        let mut rdr = csv::ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .trim(csv::Trim::All)
            .from_reader(content.as_bytes());
        let mut bars = Vec::new();

        for (i, result) in rdr.records().enumerate() {
            // header is line 1
            let line = i + 2;
            let record = result.map_err(|e| TradesimError::DataSource {
                reason: format!("{symbol} line {line}: CSV parse error: {e}"),
            })?;
            let bar = parse_record(symbol, &record, line)?;
            bar.validate().map_err(|e| TradesimError::InvalidMarketData {
                reason: format!("{symbol} line {line}: {e}"),
            })?;
            bars.push(bar);
        }

        bars.sort_by_key(|b| b.timestamp);
        if let Some(pair) = bars.windows(2).find(|w| w[0].timestamp == w[1].timestamp) {
            return Err(TradesimError::InvalidMarketData {
                reason: format!(
                    "{symbol}: duplicate bar for {}",
                    pair[1].timestamp.format("%Y-%m-%d %H:%M:%S")
                ),
            });
        }
        debug!(symbol, bars = bars.len(), path = %path.display(), "loaded market data");
        Ok(bars)
    }
}

impl DataPort for CsvDataAdapter {
    fn get_bars(
        &self,
        symbol: &str,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<Bar>, TradesimError> {
        let bars = self.bars(symbol)?;
        Ok(bars
            .iter()
            .filter(|b| b.timestamp >= start && b.timestamp < end)
            .cloned()
            .collect())
    }

    fn get_latest_bar(&self, symbol: &str) -> Result<Bar, TradesimError> {
        self.bars(symbol)?
            .last()
            .cloned()
            .ok_or_else(|| TradesimError::NotFound {
                what: format!("bars for {symbol}"),
            })
    }

    fn list_symbols(&self) -> Result<Vec<String>, TradesimError> {
        let entries = fs::read_dir(&self.base_path).map_err(|e| TradesimError::DataSource {
            reason: format!(
                "failed to read directory {}: {}",
                self.base_path.display(),
                e
            ),
        })?;

        let mut symbols = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|e| TradesimError::DataSource {
                reason: format!("directory entry error: {e}"),
            })?;
            if !entry.path().is_file() {
                continue;
            }
            let name = entry.file_name();
            if let Some(symbol) = name.to_string_lossy().strip_suffix(FILE_SUFFIX) {
                symbols.push(symbol.to_string());
            }
        }

        symbols.sort();
        Ok(symbols)
    }
}

fn parse_record(symbol: &str, record: &csv::StringRecord, line: usize) -> Result<Bar, TradesimError> {
    if record.len() != COLUMNS {
        return Err(TradesimError::DataSource {
            reason: format!(
                "{symbol} line {line}: expected {COLUMNS} columns, got {}",
                record.len()
            ),
        });
    }

    Ok(Bar {
        symbol: symbol.to_string(),
        timestamp: parse_timestamp(&record[0]).ok_or_else(|| TradesimError::DataSource {
            reason: format!("{symbol} line {line}: invalid date '{}'", &record[0]),
        })?,
        open: field(record, 1, "open", symbol, line)?,
        high: field(record, 2, "high", symbol, line)?,
        low: field(record, 3, "low", symbol, line)?,
        close: field(record, 4, "close", symbol, line)?,
        volume: field(record, 5, "volume", symbol, line)?,
    })
}

fn field<T>(
    record: &csv::StringRecord,
    index: usize,
    name: &str,
    symbol: &str,
    line: usize,
) -> Result<T, TradesimError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    record[index].parse().map_err(|e| TradesimError::DataSource {
        reason: format!("{symbol} line {line}: invalid {name} value: {e}"),
    })
}

/// `2024-01-15 00:00:00-05:00` (as downloaded) or a bare `2024-01-15`
/// taken as midnight UTC.
fn parse_timestamp(s: &str) -> Option<DateTime<Utc>> {
    if let Ok(ts) = DateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S%:z") {
        return Some(ts.with_timezone(&Utc));
    }
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .ok()
        .map(|d| Utc.from_utc_datetime(&d.and_time(NaiveTime::MIN)))
}
