//! Market data access port.

use chrono::{DateTime, Utc};

use crate::domain::bar::Bar;
use crate::domain::error::TradesimError;

/// Source of historical bars. Shared across worker threads during batch runs.
pub trait DataPort: Send + Sync {
    /// Bars for `symbol` with `start <= timestamp < end`, ascending by time.
    fn get_bars(
        &self,
        symbol: &str,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<Bar>, TradesimError>;

    /// Most recent bar on record for `symbol`.
    fn get_latest_bar(&self, symbol: &str) -> Result<Bar, TradesimError>;

    fn list_symbols(&self) -> Result<Vec<String>, TradesimError>;
}
