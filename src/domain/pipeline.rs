//! End-to-end run: features, ensemble fit on the chronological head,
//! signals and backtest on the held-out tail, then metrics.

use crate::domain::backtest::{self, BacktestBar, BacktestResult};
use crate::domain::earnings::EarningsRecord;
use crate::domain::error::FusetraderError;
use crate::domain::features::{self, FeatureTable};
use crate::domain::indicator_engine;
use crate::domain::market_bar::MarketBar;
use crate::domain::metrics::{MonthlyBreakdown, PerformanceMetrics, TradeSummary};
use crate::domain::model::ensemble::{EnsemblePredictor, PredictionRecord};
use crate::domain::model::validation::{self, CvReport};
use crate::domain::news::SentimentEvent;
use crate::domain::sentiment;
use crate::domain::signal::{self, Signal};
use crate::domain::strategy::Strategy;
use crate::ports::data_port::DataPort;
use crate::ports::sentiment_port::SentimentScorer;
use tracing::{info, warn};

/// Raw inputs for one ticker.
#[derive(Debug, Clone, Default)]
pub struct MarketData {
    pub bars: Vec<MarketBar>,
    pub events: Vec<SentimentEvent>,
    pub earnings: Vec<EarningsRecord>,
}

impl MarketData {
    /// A ticker with no market rows loads as empty and runs to an empty
    /// report.
    pub fn load(data: &dyn DataPort, ticker: &str) -> Result<Self, FusetraderError> {
        let bars = data.fetch_market(ticker)?;
        if bars.is_empty() {
            warn!(ticker, "no market rows for ticker");
        }
        let events = data.fetch_sentiment(ticker)?;
        let earnings = data.fetch_earnings(ticker)?;
        info!(
            ticker,
            bars = bars.len(),
            events = events.len(),
            earnings = earnings.len(),
            "loaded inputs"
        );
        Ok(Self {
            bars,
            events,
            earnings,
        })
    }
}

#[derive(Debug, Clone, Default)]
pub struct PipelineReport {
    pub ticker: String,
    pub feature_names: Vec<String>,
    pub feature_rows: usize,
    pub train_rows: usize,
    pub test_rows: usize,
    pub cv: Option<CvReport>,
    pub predictions: Vec<PredictionRecord>,
    pub signals: Vec<Signal>,
    pub backtest: BacktestResult,
    pub metrics: PerformanceMetrics,
    pub trade_summary: TradeSummary,
    pub monthly: MonthlyBreakdown,
    /// Forest importances by feature name, largest first.
    pub importances: Vec<(String, f64)>,
}

impl PipelineReport {
    fn empty(ticker: &str, table: &FeatureTable) -> Self {
        Self {
            ticker: ticker.to_string(),
            feature_names: table.feature_names.clone(),
            feature_rows: table.len(),
            ..Self::default()
        }
    }

    /// True when nothing was traded because the input was too short.
    pub fn is_empty(&self) -> bool {
        self.backtest.rows.is_empty()
    }
}

/// Indicators, daily sentiment and earnings joined into one table.
pub fn build_features(
    data: &MarketData,
    scorer: &dyn SentimentScorer,
    ticker: &str,
) -> Result<FeatureTable, FusetraderError> {
    let indicators = indicator_engine::compute_indicators(&data.bars)?;
    info!(rows = indicators.len(), columns = indicators.names.len(), "indicators computed");

    let daily = sentiment::aggregate_daily(&data.events, scorer);
    info!(days = daily.len(), "sentiment aggregated");

    let table = features::assemble_features(&indicators, ticker, &daily, &data.earnings)?;
    info!(
        rows = table.len(),
        features = table.feature_names.len(),
        "feature table assembled"
    );
    Ok(table)
}

pub fn run_pipeline(
    data: &MarketData,
    scorer: &dyn SentimentScorer,
    strategy: &Strategy,
) -> Result<PipelineReport, FusetraderError> {
    let table = build_features(data, scorer, &strategy.ticker)?;
    run_on_features(&table, strategy)
}

/// Everything after feature assembly. An empty or too-short table yields
/// an empty report.
pub fn run_on_features(
    table: &FeatureTable,
    strategy: &Strategy,
) -> Result<PipelineReport, FusetraderError> {
    let n = table.len();
    let split = validation::chronological_split(n, strategy.model.train_fraction);
    if split == 0 || split >= n {
        warn!(rows = n, "not enough feature rows to train and test, nothing to do");
        return Ok(PipelineReport::empty(&strategy.ticker, table));
    }

    let x = table.matrix();
    let y = table.targets();
    let (x_train, y_train) = (&x[..split], &y[..split]);
    let test_rows = &table.rows[split..];
    info!(train = split, test = test_rows.len(), "chronological split");

    let cv = validation::cross_validate(x_train, y_train, &strategy.model)?;
    match &cv {
        Some(r) => info!(
            folds = r.fold_mse.len(),
            mean_mse = r.mean_mse,
            std_mse = r.std_mse,
            "cross-validation"
        ),
        None => warn!(
            rows = split,
            splits = strategy.model.cv_splits,
            "too few training rows, cross-validation skipped"
        ),
    }

    let mut model = EnsemblePredictor::new(&strategy.model);
    model.fit(x_train, y_train)?;
    let predictions = model.predict_rows(test_rows)?;

    let signals = signal::generate_signals(test_rows, &predictions, &strategy.signal)?;

    let bars: Vec<BacktestBar> = test_rows
        .iter()
        .zip(&signals)
        .map(|(row, s)| BacktestBar {
            date: row.date,
            close: row.close,
            market_return: row.target_next_return,
            action: s.action,
            position_size: s.position_size,
        })
        .collect();
    let result = backtest::run_backtest(&bars, &strategy.risk)?;

    let metrics = PerformanceMetrics::compute(&result.rows);
    let trade_summary = TradeSummary::compute(&result.rows, &result.trades);
    let monthly = MonthlyBreakdown::compute(&result.rows);
    info!(
        signals = trade_summary.signals(),
        closes = trade_summary.closes,
        trades = result.trades.len(),
        total_return = metrics.total_strategy_return,
        "backtest complete"
    );

    let mut importances: Vec<(String, f64)> = table
        .feature_names
        .iter()
        .cloned()
        .zip(model.feature_importances().iter().copied())
        .collect();
    importances.sort_by(|a, b| b.1.total_cmp(&a.1));

    Ok(PipelineReport {
        ticker: strategy.ticker.clone(),
        feature_names: table.feature_names.clone(),
        feature_rows: n,
        train_rows: split,
        test_rows: test_rows.len(),
        cv,
        predictions,
        signals,
        backtest: result,
        metrics,
        trade_summary,
        monthly,
        importances,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::indicator::test_bars;
    use crate::domain::model::ensemble::EnsembleConfig;
    use crate::domain::news::SentimentScore;
    use crate::domain::signal::Action;

    struct Neutral;

    impl SentimentScorer for Neutral {
        fn score(&self, _text: &str) -> SentimentScore {
            SentimentScore::default()
        }
    }

    fn strategy() -> Strategy {
        Strategy {
            ticker: "TEST".into(),
            data: Default::default(),
            signal: Default::default(),
            risk: Default::default(),
            model: EnsembleConfig {
                forest_trees: 8,
                forest_max_depth: 4,
                boosting_estimators: 10,
                boosting_max_depth: 3,
                ..EnsembleConfig::default()
            },
        }
    }

    fn data(prices: &[f64]) -> MarketData {
        let bars = test_bars(prices)
            .into_iter()
            .map(|mut b| {
                b.ticker = "TEST".into();
                b
            })
            .collect();
        MarketData {
            bars,
            ..MarketData::default()
        }
    }

    #[test]
    fn short_history_is_a_no_op() {
        let report = run_pipeline(&data(&[100.0; 30]), &Neutral, &strategy()).unwrap();
        assert!(report.is_empty());
        assert_eq!(report.feature_rows, 0);
        assert_eq!(report.metrics, PerformanceMetrics::default());
    }

    #[test]
    fn flat_prices_hold_throughout() {
        let report = run_pipeline(&data(&[100.0; 60]), &Neutral, &strategy()).unwrap();
        assert_eq!(report.feature_rows, 9);
        assert_eq!(report.train_rows + report.test_rows, 9);
        assert!(!report.is_empty());
        assert!(report.signals.iter().all(|s| s.action == Action::Hold));
        assert_eq!(report.metrics.total_strategy_return, 0.0);
    }

    #[test]
    fn importances_are_sorted_and_named() {
        let prices: Vec<f64> = (0..120)
            .map(|i| 100.0 + 5.0 * (i as f64 * 0.3).sin() + i as f64 * 0.1)
            .collect();
        let report = run_pipeline(&data(&prices), &Neutral, &strategy()).unwrap();
        assert_eq!(report.importances.len(), report.feature_names.len());
        assert!(report.importances.windows(2).all(|w| w[0].1 >= w[1].1));
        assert!(report.importances.iter().all(|(_, v)| *v >= 0.0));
        assert_eq!(report.signals.len(), report.test_rows);
        assert_eq!(report.backtest.rows.len(), report.test_rows);
    }
}
