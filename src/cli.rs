//! CLI definition and dispatch.

use clap::{ArgAction, Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use crate::adapters::csv_adapter::CsvAdapter;
use crate::adapters::csv_report_adapter::{metrics_path, CsvReportAdapter};
use crate::adapters::file_config_adapter::FileConfigAdapter;
use crate::domain::backtest::{run_backtest, RunConfig, StrategyReport};
use crate::domain::combination::distinct_periods;
use crate::domain::config_validation::build_run_config;
use crate::domain::error::EmaGridError;
use crate::domain::ohlcv::format_timestamp;
use crate::domain::price_series::PriceSeries;
use crate::ports::data_port::DataPort;
use crate::ports::report_port::ReportPort;

#[derive(Parser, Debug)]
#[command(name = "emagrid", about = "Triple-EMA crossover grid search and backtester")]
pub struct Cli {
    /// Log verbosity: -v info, -vv debug, -vvv trace
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Search the grid on the training slice and backtest the winner
    Run {
        #[arg(short, long)]
        config: PathBuf,
        /// CSV price file, overrides [data] path
        #[arg(long)]
        data: Option<PathBuf>,
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Validate a configuration without loading data
    Validate {
        #[arg(short, long)]
        config: PathBuf,
    },
}

pub fn run(cli: Cli) -> ExitCode {
    match cli.command {
        Command::Run {
            config,
            data,
            output,
        } => run_search(&config, data.as_deref(), output.as_deref()),
        Command::Validate { config } => run_validate(&config),
    }
}

fn fail(err: &EmaGridError) -> ExitCode {
    eprintln!("error: {err}");
    err.into()
}

pub fn load_config(path: &Path) -> Result<FileConfigAdapter, ExitCode> {
    FileConfigAdapter::from_file(path).map_err(|e| fail(&e))
}

fn run_search(config_path: &Path, data_override: Option<&Path>, output_path: Option<&Path>) -> ExitCode {
    // Stage 1: Load config
    eprintln!("Loading config from {}", config_path.display());
    let adapter = match load_config(config_path) {
        Ok(a) => a,
        Err(code) => return code,
    };

    // Stage 2: Build and validate RunConfig
    let mut config = match build_run_config(&adapter) {
        Ok(c) => c,
        Err(e) => return fail(&e),
    };
    if let Some(path) = data_override {
        config.data_path = path.to_path_buf();
    }

    // Stages 3-6: Data port dependent pipeline
    let data_port = CsvAdapter::from_file(config.data_path.clone());
    let output = output_path
        .map(Path::to_path_buf)
        .unwrap_or_else(|| PathBuf::from("report.csv"));

    match run_pipeline(&data_port, &CsvReportAdapter::new(), &config, &output) {
        Ok(_) => ExitCode::SUCCESS,
        Err(e) => fail(&e),
    }
}

pub fn run_pipeline(
    data_port: &dyn DataPort,
    report_port: &dyn ReportPort,
    config: &RunConfig,
    output_path: &Path,
) -> Result<StrategyReport, EmaGridError> {
    // Stage 3: Fetch prices
    eprintln!("Loading {} from {}", config.ticker, config.data_path.display());
    let bars = data_port.fetch_ohlcv(&config.ticker, config.start_date, config.end_date)?;
    if bars.is_empty() {
        return Err(EmaGridError::NoData {
            ticker: config.ticker.clone(),
        });
    }
    let prices = PriceSeries::from_bars(&bars)?;

    // Stage 4: Grid search and full-sample backtest
    eprintln!(
        "Running grid search: {} combinations, {} bars ({} training)",
        config.triples().len(),
        prices.len(),
        prices.training_slice(config.training_ratio).len(),
    );
    let report = run_backtest(&prices, config)?;

    // Stage 5: Print console summary to stderr
    print_summary(&report, &prices);

    // Stage 6: Write report
    report_port.write(&report, output_path)?;
    eprintln!("\nReport written to: {}", output_path.display());
    eprintln!("Metrics written to: {}", metrics_path(output_path).display());
    Ok(report)
}

fn print_summary(report: &StrategyReport, prices: &PriceSeries) {
    let metrics = &report.metrics;
    let best = &report.best_row;

    eprintln!("\n=== Grid Search ===");
    eprintln!("Combinations:     {}", report.combinations);
    eprintln!("Excluded:         {}", report.excluded);
    eprintln!("Best:             {}", report.triple);
    eprintln!("Ranked by:        {}", report.rank_metric);
    eprintln!("Training Sharpe:  {:.2}", best.sharpe_ratio);
    eprintln!("Training Return:  {:.2}%", best.total_return * 100.0);
    eprintln!("Trades / Year:    {:.1}", best.trades_per_year);

    eprintln!("\n=== Full Sample Results ===");
    if let (Some(first), Some(last)) = (prices.first_timestamp(), prices.last_timestamp()) {
        eprintln!(
            "Period:           {} to {}",
            format_timestamp(first),
            format_timestamp(last)
        );
    }
    eprintln!("Total Return:     {:.2}%", metrics.total_return * 100.0);
    eprintln!(
        "Annualized:       {:.2}%",
        metrics.annualized_return * 100.0
    );
    eprintln!("Sharpe Ratio:     {:.2}", metrics.sharpe_ratio);
    eprintln!("Max Drawdown:     -{:.1}%", metrics.maximum_drawdown * 100.0);
    eprintln!("Volatility:       {:.1}%", metrics.volatility * 100.0);
    eprintln!("Total Trades:     {}", metrics.total_trades);
    eprintln!("Win Rate:         {:.1}%", metrics.win_rate * 100.0);
}

fn run_validate(config_path: &Path) -> ExitCode {
    eprintln!("Validating config: {}", config_path.display());
    let adapter = match load_config(config_path) {
        Ok(a) => a,
        Err(code) => return code,
    };

    let config = match build_run_config(&adapter) {
        Ok(c) => c,
        Err(e) => return fail(&e),
    };

    let triples = config.triples();
    if triples.is_empty() {
        return fail(&EmaGridError::EmptySearchSpace {
            reason: "no period triple satisfies fast < medium and fast < slow".into(),
        });
    }

    eprintln!("\nData:");
    eprintln!("  ticker: {}", config.ticker);
    eprintln!("  path:   {}", config.data_path.display());
    eprintln!("\nGrid:");
    eprintln!("  fast periods:     {}", config.fast_periods.len());
    eprintln!("  medium periods:   {}", config.medium_periods.len());
    eprintln!("  slow periods:     {}", config.slow_periods.len());
    eprintln!("  combinations:     {}", triples.len());
    eprintln!("  distinct periods: {}", distinct_periods(&triples).len());
    eprintln!(
        "  batches:          {}",
        triples.len().div_ceil(config.batch_size)
    );

    eprintln!("\nConfiguration is valid");
    ExitCode::SUCCESS
}
