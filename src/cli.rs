//! CLI definition and dispatch.

use clap::{Parser, Subcommand};
use std::fmt;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing::info;

use crate::adapters::csv_adapter::CsvAdapter;
use crate::adapters::file_config_adapter::FileConfigAdapter;
use crate::adapters::lexicon_scorer::LexiconScorer;
use crate::domain::error::FusetraderError;
use crate::domain::features::FeatureTable;
use crate::domain::pipeline::{self, MarketData, PipelineReport};
use crate::domain::strategy::Strategy;
use crate::ports::data_port::DataPort;
use crate::ports::sentiment_port::SentimentScorer;

const TOP_IMPORTANCES: usize = 15;
const RECENT_DECISIONS: usize = 10;
const LISTED_FEATURES: usize = 20;

#[derive(Parser, Debug)]
#[command(
    name = "fusetrader",
    about = "Backtest a sentiment-aware ensemble trading strategy"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Train the ensemble and backtest its signals
    Backtest {
        #[arg(short, long)]
        config: PathBuf,
        /// Overrides [data] ticker
        #[arg(long)]
        ticker: Option<String>,
        /// Overrides [data] data_dir
        #[arg(long)]
        data_dir: Option<PathBuf>,
    },
    /// Validate a configuration file without loading data
    Validate {
        #[arg(short, long)]
        config: PathBuf,
    },
    /// Build the feature table and describe it
    Features {
        #[arg(short, long)]
        config: PathBuf,
        #[arg(long)]
        ticker: Option<String>,
        #[arg(long)]
        data_dir: Option<PathBuf>,
    },
}

pub fn run(cli: Cli) -> ExitCode {
    let result = match cli.command {
        Command::Backtest {
            config,
            ticker,
            data_dir,
        } => run_backtest(&config, ticker.as_deref(), data_dir.as_deref())
            .map(|report| println!("{}", ReportView(&report))),
        Command::Validate { config } => run_validate(&config).map(|strategy| {
            println!(
                "Configuration is valid: ticker {}, data in {}",
                strategy.ticker,
                strategy.data.data_dir.display()
            )
        }),
        Command::Features {
            config,
            ticker,
            data_dir,
        } => run_features(&config, ticker.as_deref(), data_dir.as_deref())
            .map(|table| println!("{}", FeatureSummary(&table))),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e}");
            (&e).into()
        }
    }
}

pub fn load_config(path: &Path) -> Result<FileConfigAdapter, FusetraderError> {
    FileConfigAdapter::from_file(path).map_err(|e| FusetraderError::ConfigParse {
        file: path.display().to_string(),
        reason: e.to_string(),
    })
}

/// Load, validate and apply command-line overrides.
pub fn load_strategy(
    config_path: &Path,
    ticker: Option<&str>,
    data_dir: Option<&Path>,
) -> Result<Strategy, FusetraderError> {
    info!(path = %config_path.display(), "loading config");
    let adapter = load_config(config_path)?;
    let mut strategy = Strategy::from_config(&adapter, ticker)?;
    if let Some(dir) = data_dir {
        strategy.data.data_dir = dir.to_path_buf();
    }
    Ok(strategy)
}

pub fn run_validate(config_path: &Path) -> Result<Strategy, FusetraderError> {
    load_strategy(config_path, None, None)
}

pub fn run_backtest(
    config_path: &Path,
    ticker: Option<&str>,
    data_dir: Option<&Path>,
) -> Result<PipelineReport, FusetraderError> {
    let strategy = load_strategy(config_path, ticker, data_dir)?;
    let data = CsvAdapter::from_strategy(&strategy);
    run_backtest_pipeline(&data, &LexiconScorer::new(), &strategy)
}

/// The backtest stages behind any data source and scorer.
pub fn run_backtest_pipeline(
    data: &dyn DataPort,
    scorer: &dyn SentimentScorer,
    strategy: &Strategy,
) -> Result<PipelineReport, FusetraderError> {
    let inputs = MarketData::load(data, &strategy.ticker)?;
    pipeline::run_pipeline(&inputs, scorer, strategy)
}

pub fn run_features(
    config_path: &Path,
    ticker: Option<&str>,
    data_dir: Option<&Path>,
) -> Result<FeatureTable, FusetraderError> {
    let strategy = load_strategy(config_path, ticker, data_dir)?;
    let data = CsvAdapter::from_strategy(&strategy);
    let inputs = MarketData::load(&data, &strategy.ticker)?;
    pipeline::build_features(&inputs, &LexiconScorer::new(), &strategy.ticker)
}

fn pct(v: f64) -> String {
    format!("{:.2}%", v * 100.0)
}

/// Console rendering of a backtest report.
pub struct ReportView<'a>(pub &'a PipelineReport);

impl fmt::Display for ReportView<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let r = self.0;
        writeln!(f, "=== {} ===", r.ticker)?;
        writeln!(
            f,
            "Feature rows:     {} ({} features), train {}, test {}",
            r.feature_rows,
            r.feature_names.len(),
            r.train_rows,
            r.test_rows
        )?;
        if r.is_empty() {
            return write!(f, "Not enough history to train and backtest.");
        }

        let m = &r.metrics;
        writeln!(f, "\n=== Performance ===")?;
        writeln!(f, "{:<20}{:>12}{:>12}", "", "Strategy", "Market")?;
        writeln!(
            f,
            "{:<20}{:>12}{:>12}",
            "Total Return",
            pct(m.total_strategy_return),
            pct(m.total_market_return)
        )?;
        writeln!(
            f,
            "{:<20}{:>12}{:>12}",
            "Volatility",
            pct(m.strategy_volatility),
            pct(m.market_volatility)
        )?;
        writeln!(
            f,
            "{:<20}{:>12.2}{:>12.2}",
            "Sharpe Ratio", m.strategy_sharpe, m.market_sharpe
        )?;
        writeln!(f, "Max Drawdown:       {}", pct(m.max_drawdown))?;
        writeln!(f, "Win Rate:           {}", pct(m.win_rate))?;
        writeln!(f, "Avg Win:            {}", pct(m.avg_win))?;
        writeln!(f, "Avg Loss:           {}", pct(m.avg_loss))?;

        writeln!(f, "\n=== Cross-Validation ===")?;
        match &r.cv {
            Some(cv) => {
                let folds: Vec<String> = cv.fold_mse.iter().map(|v| format!("{:.6}", v)).collect();
                writeln!(f, "Fold MSE:           {}", folds.join(", "))?;
                writeln!(f, "Mean MSE:           {:.6} (+/- {:.6})", cv.mean_mse, cv.std_mse)?;
            }
            None => writeln!(f, "skipped (too few training rows)")?,
        }

        writeln!(f, "\n=== Top Features ===")?;
        for (i, (name, value)) in r.importances.iter().take(TOP_IMPORTANCES).enumerate() {
            writeln!(f, "{:>3}. {:<24}{:.4}", i + 1, name, value)?;
        }

        let t = &r.trade_summary;
        writeln!(f, "\n=== Trades ===")?;
        writeln!(
            f,
            "Decisions:          {} BUY, {} SELL, {} CLOSE, {} HOLD",
            t.buys, t.sells, t.closes, t.holds
        )?;
        writeln!(
            f,
            "Periods:            {} winning, {} losing",
            t.winning_periods, t.losing_periods
        )?;
        writeln!(
            f,
            "Closed trades:      {} ({} winning)",
            t.closed_trades, t.winning_trades
        )?;
        for trade in &r.backtest.trades {
            writeln!(
                f,
                "  {} -> {}  {:?} {:.3} @ {:.2} -> {:.2}  {}  ({})",
                trade.entry_date,
                trade.exit_date,
                trade.direction,
                trade.size,
                trade.entry_price,
                trade.exit_price,
                pct(trade.trade_return),
                trade.reason
            )?;
        }

        writeln!(f, "\n=== Monthly Returns ===")?;
        for month in &r.monthly.months {
            writeln!(f, "  {}-{:02}  {:>9}", month.year, month.month, pct(month.total))?;
        }
        if let (Some(best), Some(worst)) = (r.monthly.best(), r.monthly.worst()) {
            writeln!(
                f,
                "Best {}-{:02} {}, worst {}-{:02} {}, {} of {} positive",
                best.year,
                best.month,
                pct(best.total),
                worst.year,
                worst.month,
                pct(worst.total),
                r.monthly.positive_months(),
                r.monthly.months.len()
            )?;
        }

        writeln!(f, "\n=== Recent Decisions ===")?;
        let skip = r.backtest.rows.len().saturating_sub(RECENT_DECISIONS);
        for (row, signal) in r.backtest.rows.iter().zip(&r.signals).skip(skip) {
            writeln!(
                f,
                "  {}  {:<5}  pos {:>7.3}  pred {:>8.5}  conf {:.3}  value {:.4}",
                row.date,
                row.action,
                row.position,
                signal.predicted_return,
                signal.confidence,
                row.portfolio_value
            )?;
        }
        Ok(())
    }
}

/// Console rendering of a feature table's shape.
pub struct FeatureSummary<'a>(pub &'a FeatureTable);

impl fmt::Display for FeatureSummary<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let t = self.0;
        writeln!(
            f,
            "{}: {} rows x {} features",
            t.ticker,
            t.len(),
            t.feature_names.len()
        )?;
        match t.date_range() {
            Some((first, last)) => writeln!(f, "Date range: {} to {}", first, last)?,
            None => writeln!(f, "Date range: (empty)")?,
        }
        let shown: Vec<&str> = t
            .feature_names
            .iter()
            .take(LISTED_FEATURES)
            .map(String::as_str)
            .collect();
        write!(f, "Features: {}", shown.join(", "))?;
        if t.feature_names.len() > LISTED_FEATURES {
            write!(f, ", ... ({} more)", t.feature_names.len() - LISTED_FEATURES)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_backtest_arguments() {
        let cli = Cli::try_parse_from([
            "fusetrader",
            "backtest",
            "--config",
            "run.ini",
            "--ticker",
            "AAPL",
            "--data-dir",
            "/data",
        ])
        .unwrap();
        match cli.command {
            Command::Backtest {
                config,
                ticker,
                data_dir,
            } => {
                assert_eq!(config, PathBuf::from("run.ini"));
                assert_eq!(ticker.as_deref(), Some("AAPL"));
                assert_eq!(data_dir, Some(PathBuf::from("/data")));
            }
            other => panic!("unexpected command {:?}", other),
        }
    }

    #[test]
    fn validate_requires_config() {
        assert!(Cli::try_parse_from(["fusetrader", "validate"]).is_err());
    }

    #[test]
    fn empty_report_renders_notice() {
        let report = PipelineReport {
            ticker: "AAPL".into(),
            ..PipelineReport::default()
        };
        let text = ReportView(&report).to_string();
        assert!(text.contains("=== AAPL ==="));
        assert!(text.contains("Not enough history"));
    }

    #[test]
    fn feature_summary_lists_shape() {
        let table = FeatureTable {
            ticker: "AAPL".into(),
            feature_names: vec!["return".into(), "rsi_14".into()],
            rows: vec![],
        };
        let text = FeatureSummary(&table).to_string();
        assert!(text.contains("0 rows x 2 features"));
        assert!(text.contains("(empty)"));
        assert!(text.contains("return, rsi_14"));
    }
}
