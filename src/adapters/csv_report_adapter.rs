//! Trade ledger CSV report implementing ReportPort.

use std::path::Path;

use crate::domain::backtest::BacktestRun;
use crate::domain::error::TradesimError;
use crate::ports::report_port::ReportPort;

const HEADER: [&str; 8] = [
    "symbol",
    "direction",
    "quantity",
    "price",
    "commission",
    "timestamp",
    "pnl",
    "cumulative_pnl",
];

#[derive(Debug, Default, Clone, Copy)]
pub struct CsvReportAdapter;

impl CsvReportAdapter {
    pub fn new() -> Self {
        CsvReportAdapter
    }
}

impl ReportPort for CsvReportAdapter {
    fn write(&self, run: &BacktestRun, output_path: &Path) -> Result<(), TradesimError> {
        let mut wtr = csv::Writer::from_path(output_path).map_err(std::io::Error::other)?;
        wtr.write_record(HEADER).map_err(std::io::Error::other)?;

        for trade in &run.trades {
            wtr.write_record([
                trade.symbol.clone(),
                trade.direction.to_string(),
                trade.quantity.to_string(),
                trade.price.to_string(),
                trade.commission.to_string(),
                trade.timestamp.to_rfc3339(),
                trade.pnl.to_string(),
                trade.cumulative_pnl.to_string(),
            ])
            .map_err(std::io::Error::other)?;
        }

        wtr.flush()?;
        Ok(())
    }
}
