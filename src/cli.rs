//! CLI definition and dispatch.

use clap::{Parser, Subcommand};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing::{error, info, warn};

use crate::adapters::crossover_strategy::{
    AverageKind, DEFAULT_FAST_PERIOD, DEFAULT_SLOW_PERIOD, MaCrossoverStrategy,
};
use crate::adapters::csv_adapter::CsvAdapter;
use crate::adapters::csv_export::{export_equity_curve, export_trades};
use crate::adapters::file_config_adapter::FileConfigAdapter;
use crate::adapters::rsi_strategy::{
    DEFAULT_OVERBOUGHT, DEFAULT_OVERSOLD, DEFAULT_RSI_PERIOD, RsiThresholdStrategy,
};
use crate::adapters::text_report::TextReportAdapter;
use crate::domain::backtest::{
    BacktestConfig, Backtester, DEFAULT_COMMISSION_RATE, DEFAULT_POSITION_SIZE,
    DEFAULT_SLIPPAGE_RATE,
};
use crate::domain::config_validation::{
    STRATEGY_MA_CROSSOVER, STRATEGY_RSI_THRESHOLD, read_f64, read_usize,
    validate_backtest_config, validate_strategy_config,
};
use crate::domain::error::BarsmithError;
use crate::domain::indicator::IndicatorType;
use crate::domain::indicator_helpers::compute_indicator;
use crate::ports::config_port::ConfigPort;
use crate::ports::data_port::DataPort;
use crate::ports::report_port::ReportPort;
use crate::ports::strategy_port::Strategy;

#[derive(Parser, Debug)]
#[command(name = "barsmith", about = "Technical indicators and strategy backtesting")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run a backtest described by an INI config
    Backtest {
        #[arg(short, long)]
        config: PathBuf,
        /// Overrides [data] dir
        #[arg(long)]
        data_dir: Option<PathBuf>,
        /// Overrides [data] symbol
        #[arg(long)]
        symbol: Option<String>,
        /// Write trades as CSV
        #[arg(long)]
        trades: Option<PathBuf>,
        /// Write the equity curve as CSV
        #[arg(long)]
        equity: Option<PathBuf>,
        /// Write the text report here instead of stdout
        #[arg(long)]
        report: Option<PathBuf>,
    },
    /// Compute one indicator and print it as CSV
    Indicator {
        #[arg(long)]
        data_dir: PathBuf,
        #[arg(long)]
        symbol: String,
        /// e.g. "RSI(14)", "MACD(12,26,9)", "BOLLINGER(20,2)"
        #[arg(short, long)]
        indicator: String,
    },
    /// Validate a config file without running anything
    Validate {
        #[arg(short, long)]
        config: PathBuf,
    },
    /// List symbols available in a data directory
    ListSymbols {
        #[arg(long)]
        data_dir: PathBuf,
    },
}

/// Output destinations for a backtest run. `None` report means stdout.
#[derive(Debug, Clone, Default)]
pub struct PipelineOutputs {
    pub trades: Option<PathBuf>,
    pub equity: Option<PathBuf>,
    pub report: Option<PathBuf>,
}

pub fn run(cli: Cli) -> ExitCode {
    match cli.command {
        Command::Backtest {
            config,
            data_dir,
            symbol,
            trades,
            equity,
            report,
        } => run_backtest(
            &config,
            data_dir,
            symbol,
            &PipelineOutputs {
                trades,
                equity,
                report,
            },
        ),
        Command::Indicator {
            data_dir,
            symbol,
            indicator,
        } => {
            let adapter = CsvAdapter::new(data_dir);
            let stdout = std::io::stdout();
            match run_indicator(&adapter, &symbol, &indicator, stdout.lock()) {
                Ok(()) => ExitCode::SUCCESS,
                Err(e) => report_error(&e),
            }
        }
        Command::Validate { config } => run_validate(&config),
        Command::ListSymbols { data_dir } => run_list_symbols(&data_dir),
    }
}

fn report_error(err: &BarsmithError) -> ExitCode {
    error!("{err}");
    err.into()
}

pub fn load_config(path: &Path) -> Result<FileConfigAdapter, ExitCode> {
    info!(path = %path.display(), "loading config");
    FileConfigAdapter::from_file(path).map_err(|e| report_error(&e))
}

fn run_backtest(
    config_path: &Path,
    data_dir: Option<PathBuf>,
    symbol: Option<String>,
    outputs: &PipelineOutputs,
) -> ExitCode {
    let config = match load_config(config_path) {
        Ok(c) => c,
        Err(code) => return code,
    };

    let bt_config = match build_backtest_config(&config) {
        Ok(c) => c,
        Err(e) => return report_error(&e),
    };
    let strategy = match build_strategy(&config) {
        Ok(s) => s,
        Err(e) => return report_error(&e),
    };

    let data_dir = match data_dir.or_else(|| config.get_string("data", "dir").map(PathBuf::from)) {
        Some(d) => d,
        None => {
            return report_error(&BarsmithError::ConfigMissing {
                section: "data".into(),
                key: "dir".into(),
            });
        }
    };
    let symbol = match symbol.or_else(|| config.get_string("data", "symbol")) {
        Some(s) => s,
        None => {
            return report_error(&BarsmithError::ConfigMissing {
                section: "data".into(),
                key: "symbol".into(),
            });
        }
    };

    let adapter = CsvAdapter::new(data_dir);
    run_backtest_pipeline(&adapter, strategy.as_ref(), &bt_config, &symbol, outputs)
}

pub fn build_backtest_config(adapter: &dyn ConfigPort) -> Result<BacktestConfig, BarsmithError> {
    validate_backtest_config(adapter)?;

    let initial_capital = read_f64(adapter, "backtest", "initial_capital")?.ok_or_else(|| {
        BarsmithError::ConfigMissing {
            section: "backtest".into(),
            key: "initial_capital".into(),
        }
    })?;

    Ok(BacktestConfig {
        initial_capital,
        commission_rate: read_f64(adapter, "backtest", "commission")?
            .unwrap_or(DEFAULT_COMMISSION_RATE),
        slippage_rate: read_f64(adapter, "backtest", "slippage")?.unwrap_or(DEFAULT_SLIPPAGE_RATE),
        position_size: read_f64(adapter, "backtest", "position_size")?
            .unwrap_or(DEFAULT_POSITION_SIZE),
        risk_free_rate: read_f64(adapter, "backtest", "risk_free_rate")?.unwrap_or(0.0),
    })
}

pub fn build_strategy(adapter: &dyn ConfigPort) -> Result<Box<dyn Strategy>, BarsmithError> {
    validate_strategy_config(adapter)?;

    let name = adapter.get_string_or("strategy", "name", "");
    match name.trim().to_ascii_lowercase().as_str() {
        STRATEGY_MA_CROSSOVER => {
            let average = match adapter
                .get_string_or("strategy", "average", "sma")
                .trim()
                .to_ascii_lowercase()
                .as_str()
            {
                "ema" => AverageKind::Ema,
                _ => AverageKind::Sma,
            };
            let fast = read_usize(adapter, "strategy", "fast_period")?.unwrap_or(DEFAULT_FAST_PERIOD);
            let slow = read_usize(adapter, "strategy", "slow_period")?.unwrap_or(DEFAULT_SLOW_PERIOD);
            let allow_short = adapter.get_bool("strategy", "allow_short", false);
            Ok(Box::new(MaCrossoverStrategy::new(
                fast,
                slow,
                average,
                allow_short,
            )?))
        }
        STRATEGY_RSI_THRESHOLD => {
            let period = read_usize(adapter, "strategy", "rsi_period")?.unwrap_or(DEFAULT_RSI_PERIOD);
            let oversold = read_f64(adapter, "strategy", "oversold")?.unwrap_or(DEFAULT_OVERSOLD);
            let overbought =
                read_f64(adapter, "strategy", "overbought")?.unwrap_or(DEFAULT_OVERBOUGHT);
            Ok(Box::new(RsiThresholdStrategy::new(
                period, oversold, overbought,
            )?))
        }
        _ => Err(BarsmithError::UnknownStrategy { name }),
    }
}

/// Load `symbol`, run `strategy` over it, then write the report and any CSV exports.
pub fn run_backtest_pipeline(
    data_port: &dyn DataPort,
    strategy: &dyn Strategy,
    bt_config: &BacktestConfig,
    symbol: &str,
    outputs: &PipelineOutputs,
) -> ExitCode {
    let backtester = match Backtester::new(bt_config.clone()) {
        Ok(b) => b,
        Err(e) => return report_error(&e),
    };

    let series = match data_port.fetch_series(symbol) {
        Ok(s) => s,
        Err(e) => return report_error(&e),
    };
    info!(symbol, bars = series.len(), strategy = strategy.name(), "running backtest");

    let Some(result) = backtester.run(strategy, &series) else {
        warn!(symbol, "no bars loaded, nothing to backtest");
        return ExitCode::SUCCESS;
    };

    let report_path = outputs
        .report
        .as_ref()
        .map(|p| p.display().to_string())
        .unwrap_or_else(|| "-".to_string());
    if let Err(e) = TextReportAdapter::new().write(&result, strategy.name(), &report_path) {
        return report_error(&e);
    }
    if report_path != "-" {
        info!(path = %report_path, "report written");
    }

    if let Some(path) = &outputs.trades {
        if let Err(e) = export_trades(path, &result.trades) {
            return report_error(&e);
        }
        info!(path = %path.display(), trades = result.trades.len(), "trades exported");
    }
    if let Some(path) = &outputs.equity {
        if let Err(e) = export_equity_curve(path, &result.equity_curve) {
            return report_error(&e);
        }
        info!(path = %path.display(), "equity curve exported");
    }

    ExitCode::SUCCESS
}

/// Write `timestamp,<line...>` rows for every bar that has a value.
pub fn run_indicator<W: Write>(
    data_port: &dyn DataPort,
    symbol: &str,
    indicator: &str,
    writer: W,
) -> Result<(), BarsmithError> {
    let indicator_type: IndicatorType = indicator.parse()?;
    let series = data_port.fetch_series(symbol)?;

    let mut wtr = csv::Writer::from_writer(writer);
    let Some(output) = compute_indicator(&series, &indicator_type)? else {
        warn!(
            symbol,
            indicator = %indicator_type,
            bars = series.len(),
            "not enough bars for indicator"
        );
        return Ok(());
    };

    let lines = output.lines();
    let mut header = vec!["timestamp".to_string()];
    header.extend(lines.iter().map(|(name, _)| name.to_string()));
    wtr.write_record(&header)?;

    let offset = series.len() - output.len();
    for (i, bar) in series.bars()[offset..].iter().enumerate() {
        let mut record = vec![bar.timestamp.format("%Y-%m-%dT%H:%M:%S").to_string()];
        record.extend(lines.iter().map(|(_, values)| format!("{:.4}", values[i])));
        wtr.write_record(&record)?;
    }
    wtr.flush()?;
    Ok(())
}

fn run_validate(config_path: &Path) -> ExitCode {
    let config = match load_config(config_path) {
        Ok(c) => c,
        Err(code) => return code,
    };

    let checks = validate_backtest_config(&config).and_then(|()| build_strategy(&config));
    match checks {
        Ok(strategy) => {
            info!(strategy = strategy.name(), "config is valid");
            println!("Config validated successfully: {}", strategy.name());
            ExitCode::SUCCESS
        }
        Err(e) => report_error(&e),
    }
}

fn run_list_symbols(data_dir: &Path) -> ExitCode {
    let adapter = CsvAdapter::new(data_dir.to_path_buf());
    let symbols = match adapter.list_symbols() {
        Ok(s) => s,
        Err(e) => return report_error(&e),
    };

    if symbols.is_empty() {
        warn!(dir = %data_dir.display(), "no symbols found");
    } else {
        for symbol in &symbols {
            println!("{}", symbol);
        }
        info!(count = symbols.len(), "symbols found");
    }
    ExitCode::SUCCESS
}
