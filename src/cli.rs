//! CLI definition and dispatch.

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::adapters::csv_adapter::CsvDataAdapter;
use crate::adapters::csv_report_adapter::CsvReportAdapter;
use crate::adapters::file_config_adapter::FileConfigAdapter;
use crate::domain::backtest::{BacktestRequest, BacktestRun, run_batch};
use crate::domain::config_validation::{
    DEFAULT_INITIAL_CAPITAL, DEFAULT_LONG_PERIOD, DEFAULT_POOL_SIZE, DEFAULT_SHORT_PERIOD,
    config_dates, config_symbols, validate_config, validate_dates,
    validate_initial_capital, validate_logging_config, validate_periods, validate_worker_config,
};
use crate::domain::error::TradesimError;
use crate::domain::strategy::{BuyHold, SmaCrossover, Strategy};
use crate::domain::symbols::parse_symbols;
use crate::ports::config_port::ConfigPort;
use crate::ports::data_port::DataPort;
use crate::ports::report_port::ReportPort;

#[derive(Parser, Debug)]
#[command(name = "tradesim", about = "Single-symbol strategy backtester")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run a backtest for every configured symbol
    Backtest {
        #[arg(short, long)]
        config: PathBuf,
        /// Run only this symbol instead of the configured list
        #[arg(long)]
        symbol: Option<String>,
        /// Strategy id, overriding [strategy] id
        #[arg(long)]
        strategy: Option<String>,
        /// Write the trade ledger as CSV
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// List symbols with data files in the data directory
    ListSymbols {
        #[arg(short, long)]
        config: PathBuf,
    },
    /// Print the most recent bar for a symbol
    Latest {
        #[arg(short, long)]
        config: PathBuf,
        #[arg(long)]
        symbol: String,
    },
    /// Validate a configuration file
    Validate {
        #[arg(short, long)]
        config: PathBuf,
    },
}

pub fn run(cli: Cli) -> ExitCode {
    let result = match cli.command {
        Command::Backtest {
            config,
            symbol,
            strategy,
            output,
        } => run_backtest(&config, symbol.as_deref(), strategy.as_deref(), output.as_deref()),
        Command::ListSymbols { config } => run_list_symbols(&config),
        Command::Latest { config, symbol } => run_latest(&config, &symbol),
        Command::Validate { config } => run_validate(&config),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e}");
            (&e).into()
        }
    }
}

/// Load the INI file and install the stderr log subscriber.
pub fn load_config(path: &Path) -> Result<FileConfigAdapter, TradesimError> {
    let config = FileConfigAdapter::from_file(path)?;
    validate_logging_config(&config)?;
    let level = config
        .get_string("logging", "level")
        .map(|l| l.to_lowercase())
        .unwrap_or_else(|| "info".to_string());
    init_logging(&level);
    Ok(config)
}

/// `RUST_LOG` wins over the configured level. A second call is a no-op.
pub fn init_logging(level: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

/// Resolve a strategy id to an instance. Only `sma_crossover` reads the
/// period overrides from `[strategy]`.
pub fn build_strategy(id: &str, config: &dyn ConfigPort) -> Result<Box<dyn Strategy>, TradesimError> {
    match id {
        "buy_hold" => Ok(Box::new(BuyHold::new())),
        "sma_crossover" => {
            validate_periods(config)?;
            Ok(Box::new(SmaCrossover::new(
                config.get_usize("strategy", "short_period", DEFAULT_SHORT_PERIOD),
                config.get_usize("strategy", "long_period", DEFAULT_LONG_PERIOD),
            )))
        }
        "sma_crossover_20_50" => Ok(Box::new(SmaCrossover::new(20, 50))),
        other => Err(TradesimError::UnknownStrategy(other.to_string())),
    }
}

/// One request per symbol, sharing the configured window and capital.
pub fn build_requests(
    config: &dyn ConfigPort,
    symbol_override: Option<&str>,
    strategy_id: &str,
) -> Result<Vec<BacktestRequest>, TradesimError> {
    validate_initial_capital(config)?;
    validate_dates(config)?;
    let (start, end) = config_dates(config)?;
    let initial_capital = config.get_double("backtest", "initial_capital", DEFAULT_INITIAL_CAPITAL);

    let symbols = match symbol_override {
        Some(s) => parse_symbols(s).map_err(|e| TradesimError::InvalidParameter {
            reason: format!("--symbol: {e}"),
        })?,
        None => config_symbols(config)?,
    };

    Ok(symbols
        .into_iter()
        .map(|symbol| BacktestRequest {
            symbol,
            strategy_id: strategy_id.to_string(),
            start,
            end,
            initial_capital,
        })
        .collect())
}

fn data_adapter(config: &dyn ConfigPort) -> Result<CsvDataAdapter, TradesimError> {
    let dir = config
        .get_string("data", "dir")
        .ok_or_else(|| TradesimError::ConfigMissing {
            section: "data".into(),
            key: "dir".into(),
        })?;
    Ok(CsvDataAdapter::new(dir))
}

pub fn run_backtest(
    config_path: &Path,
    symbol_override: Option<&str>,
    strategy_override: Option<&str>,
    output_path: Option<&Path>,
) -> Result<(), TradesimError> {
    eprintln!("Loading config from {}", config_path.display());
    let config = load_config(config_path)?;

    let strategy_id = match strategy_override {
        Some(id) => id.to_string(),
        None => config
            .get_string("strategy", "id")
            .ok_or_else(|| TradesimError::ConfigMissing {
                section: "strategy".into(),
                key: "id".into(),
            })?,
    };
    let strategy = build_strategy(&strategy_id, &config)?;
    let requests = build_requests(&config, symbol_override, &strategy_id)?;
    validate_worker_config(&config)?;
    let pool_size = config.get_usize("worker", "pool_size", DEFAULT_POOL_SIZE);
    let data_port = data_adapter(&config)?;

    let runs = run_backtest_pipeline(
        &data_port,
        strategy.as_ref(),
        &requests,
        pool_size,
        output_path,
    )?;

    let failed = runs.iter().filter(|r| !r.is_completed()).count();
    info!(total = runs.len(), failed, "backtest batch finished");
    if failed > 0 {
        return Err(TradesimError::RunsFailed {
            failed,
            total: runs.len(),
        });
    }
    Ok(())
}

/// Run every request, print a summary per run and write ledgers for the
/// completed ones. Failed runs are returned, not raised.
pub fn run_backtest_pipeline(
    data_port: &dyn DataPort,
    strategy: &dyn Strategy,
    requests: &[BacktestRequest],
    pool_size: usize,
    output_path: Option<&Path>,
) -> Result<Vec<BacktestRun>, TradesimError> {
    eprintln!(
        "Running {} on {} symbol(s) with {} worker(s)",
        strategy.name(),
        requests.len(),
        pool_size
    );
    let runs = run_batch(data_port, strategy, requests, pool_size)?;

    for run in &runs {
        print_summary(run);
    }

    if let Some(output) = output_path {
        let report = CsvReportAdapter::new();
        let multi = runs.len() > 1;
        for run in runs.iter().filter(|r| r.is_completed()) {
            let path = report_path(output, &run.symbol, multi);
            report.write(run, &path)?;
            eprintln!("Trades written to: {}", path.display());
        }
    }

    Ok(runs)
}

/// `trades.csv` for a single run, `trades_AAPL.csv` per symbol otherwise.
pub fn report_path(output: &Path, symbol: &str, multi: bool) -> PathBuf {
    if !multi {
        return output.to_path_buf();
    }
    let stem = output
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "trades".to_string());
    let name = match output.extension() {
        Some(ext) => format!("{stem}_{symbol}.{}", ext.to_string_lossy()),
        None => format!("{stem}_{symbol}"),
    };
    output.with_file_name(name)
}

fn print_summary(run: &BacktestRun) {
    eprintln!("\n=== {} ({}) ===", run.symbol, run.strategy_id);
    eprintln!("Status:           {}", run.status);
    if let Some(msg) = &run.error_message {
        eprintln!("Error:            {msg}");
    }
    let Some(m) = &run.metrics else {
        return;
    };
    eprintln!("Period:           {} to {} ({} days)", m.start_date.date_naive(), m.end_date.date_naive(), m.duration);
    eprintln!("Initial Capital:  ${:.2}", m.initial_capital);
    eprintln!("Final Capital:    ${:.2}", m.final_capital);
    eprintln!("Total Return:     {:.2}%", m.return_pct);
    eprintln!("Annualized:       {:.2}%", m.annualized_return());
    eprintln!("Sharpe Ratio:     {:.2}", m.sharpe_ratio);
    eprintln!("Max Drawdown:     -{:.1}% (${:.2})", m.max_drawdown, m.max_drawdown_amt);
    eprintln!("Total Trades:     {}", m.total_trades);
    eprintln!("Win Rate:         {:.1}%", m.win_rate);
    eprintln!("Profit Factor:    {:.2}", m.profit_factor());
    eprintln!("Expectancy:       ${:.2}", m.expectancy());
}

pub fn run_list_symbols(config_path: &Path) -> Result<(), TradesimError> {
    let config = load_config(config_path)?;
    let data_port = data_adapter(&config)?;
    let symbols = data_port.list_symbols()?;

    if symbols.is_empty() {
        eprintln!("No symbols found");
        return Ok(());
    }
    for symbol in &symbols {
        println!("{symbol}");
    }
    Ok(())
}

pub fn run_latest(config_path: &Path, symbol: &str) -> Result<(), TradesimError> {
    let config = load_config(config_path)?;
    let data_port = data_adapter(&config)?;
    let bar = data_port.get_latest_bar(&symbol.to_uppercase())?;

    println!(
        "{} {} open={} high={} low={} close={} volume={}",
        bar.symbol,
        bar.timestamp.to_rfc3339(),
        bar.open,
        bar.high,
        bar.low,
        bar.close,
        bar.volume
    );
    Ok(())
}

pub fn run_validate(config_path: &Path) -> Result<(), TradesimError> {
    let config = load_config(config_path)?;
    validate_config(&config)?;
    eprintln!("Config validated successfully");
    Ok(())
}
