//! Backtest run records and orchestration.
//!
//! A run wires the executor to the metrics calculator for one symbol. Batch
//! runs are independent and execute on a dedicated rayon pool; each owns its
//! own cash, position and ledger.

use std::fmt;

use chrono::{DateTime, Utc};
use rayon::prelude::*;
use tracing::{info, warn};

use super::error::TradesimError;
use super::execution::Executor;
use super::metrics::{Calculator, Metrics};
use super::strategy::Strategy;
use super::trade::Trade;
use crate::ports::data_port::DataPort;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum BacktestStatus {
    Pending,
    Queued,
    Running,
    Completed,
    Failed,
}

impl fmt::Display for BacktestStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            BacktestStatus::Pending => "PENDING",
            BacktestStatus::Queued => "QUEUED",
            BacktestStatus::Running => "RUNNING",
            BacktestStatus::Completed => "COMPLETED",
            BacktestStatus::Failed => "FAILED",
        };
        f.write_str(s)
    }
}

/// Parameters of a single-symbol run.
#[derive(Debug, Clone, PartialEq)]
pub struct BacktestRequest {
    pub symbol: String,
    pub strategy_id: String,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    pub initial_capital: f64,
}

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BacktestRun {
    pub symbol: String,
    pub strategy_id: String,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    pub initial_capital: f64,
    pub status: BacktestStatus,
    pub error_message: Option<String>,
    pub trades: Vec<Trade>,
    pub metrics: Option<Metrics>,
}

impl BacktestRun {
    pub fn pending(request: &BacktestRequest) -> Self {
        BacktestRun {
            symbol: request.symbol.clone(),
            strategy_id: request.strategy_id.clone(),
            start: request.start,
            end: request.end,
            initial_capital: request.initial_capital,
            status: BacktestStatus::Pending,
            error_message: None,
            trades: Vec::new(),
            metrics: None,
        }
    }

    pub fn is_completed(&self) -> bool {
        self.status == BacktestStatus::Completed
    }

    fn complete(mut self, trades: Vec<Trade>, metrics: Metrics) -> Self {
        self.status = BacktestStatus::Completed;
        self.trades = trades;
        self.metrics = Some(metrics);
        self
    }

    fn fail(mut self, err: &TradesimError) -> Self {
        self.status = BacktestStatus::Failed;
        self.error_message = Some(err.to_string());
        self.trades.clear();
        self.metrics = None;
        self
    }
}

/// Run one request to completion. Failures are recorded on the returned run.
pub fn run_backtest(
    data_port: &dyn DataPort,
    strategy: &dyn Strategy,
    request: &BacktestRequest,
) -> BacktestRun {
    let mut run = BacktestRun::pending(request);
    run.status = BacktestStatus::Running;

    let executor = Executor::new(strategy, data_port, request.initial_capital);
    match executor.run(&request.symbol, request.start, request.end) {
        Ok(trades) => {
            let metrics = Calculator::new(request.initial_capital).calculate(
                &trades,
                request.start,
                request.end,
            );
            info!(
                symbol = %request.symbol,
                trades = trades.len(),
                return_pct = metrics.return_pct,
                "backtest completed"
            );
            run.complete(trades, metrics)
        }
        Err(e) => {
            warn!(symbol = %request.symbol, error = %e, "backtest failed");
            run.fail(&e)
        }
    }
}

/// Run independent requests on a pool of `pool_size` threads.
///
/// Results come back in request order. Only pool construction can fail;
/// per-run failures are recorded on each run.
pub fn run_batch(
    data_port: &dyn DataPort,
    strategy: &dyn Strategy,
    requests: &[BacktestRequest],
    pool_size: usize,
) -> Result<Vec<BacktestRun>, TradesimError> {
    if pool_size == 0 {
        return Err(TradesimError::InvalidParameter {
            reason: "pool size must be at least 1".to_string(),
        });
    }

    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(pool_size)
        .build()
        .map_err(|e| TradesimError::InvalidParameter {
            reason: format!("failed to build worker pool: {e}"),
        })?;

    info!(runs = requests.len(), pool_size, "starting batch");
    let runs = pool.install(|| {
        requests
            .par_iter()
            .map(|request| run_backtest(data_port, strategy, request))
            .collect()
    });
    Ok(runs)
}
