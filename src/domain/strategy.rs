//! Strategy configuration and composition.
//!
//! A `Strategy` groups every per-stage configuration value for one run. It
//! is built from a [`ConfigPort`] after validation and passed by reference
//! to each stage.

use crate::domain::backtest::RiskConfig;
use crate::domain::config_validation::{self, read_count, read_double};
use crate::domain::error::FusetraderError;
use crate::domain::model::ensemble::EnsembleConfig;
use crate::domain::signal::SignalConfig;
use crate::ports::config_port::ConfigPort;
use std::path::PathBuf;

#[derive(Debug, Clone, PartialEq)]
pub struct DataConfig {
    pub data_dir: PathBuf,
    pub market_file: String,
    pub sentiment_file: String,
    pub earnings_file: String,
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("."),
            market_file: "market.csv".into(),
            sentiment_file: "sentiment.csv".into(),
            earnings_file: "earnings.csv".into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Strategy {
    pub ticker: String,
    pub data: DataConfig,
    pub signal: SignalConfig,
    pub risk: RiskConfig,
    pub model: EnsembleConfig,
}

impl Strategy {
    /// Validate `config` and build a strategy from it. `ticker` overrides
    /// `[data] ticker` when given.
    pub fn from_config(
        config: &dyn ConfigPort,
        ticker: Option<&str>,
    ) -> Result<Self, FusetraderError> {
        config_validation::validate_config(config, ticker)?;

        let ticker = match ticker {
            Some(t) => t.trim().to_string(),
            None => config
                .get_string("data", "ticker")
                .map(|t| t.trim().to_string())
                .unwrap_or_default(),
        };

        let d = DataConfig::default();
        let data = DataConfig {
            data_dir: config
                .get_string("data", "data_dir")
                .map(PathBuf::from)
                .unwrap_or(d.data_dir),
            market_file: config.get_string("data", "market_file").unwrap_or(d.market_file),
            sentiment_file: config
                .get_string("data", "sentiment_file")
                .unwrap_or(d.sentiment_file),
            earnings_file: config
                .get_string("data", "earnings_file")
                .unwrap_or(d.earnings_file),
        };

        let s = SignalConfig::default();
        let signal = SignalConfig {
            buy_threshold: read_double(config, "signal", "buy_threshold", s.buy_threshold)?,
            sell_threshold: read_double(config, "signal", "sell_threshold", s.sell_threshold)?,
            sentiment_weight: read_double(config, "signal", "sentiment_weight", s.sentiment_weight)?,
            confidence_threshold: read_double(
                config,
                "signal",
                "confidence_threshold",
                s.confidence_threshold,
            )?,
            max_position_size: read_double(
                config,
                "signal",
                "max_position_size",
                s.max_position_size,
            )?,
        };

        let r = RiskConfig::default();
        let risk = RiskConfig {
            stop_loss_pct: read_double(config, "risk", "stop_loss_pct", r.stop_loss_pct)?,
            take_profit_pct: read_double(config, "risk", "take_profit_pct", r.take_profit_pct)?,
        };

        let m = EnsembleConfig::default();
        let model = EnsembleConfig {
            forest_trees: read_count(config, "model", "forest_trees", m.forest_trees)?,
            forest_max_depth: read_count(config, "model", "forest_max_depth", m.forest_max_depth)?,
            boosting_estimators: read_count(
                config,
                "model",
                "boosting_estimators",
                m.boosting_estimators,
            )?,
            boosting_max_depth: read_count(
                config,
                "model",
                "boosting_max_depth",
                m.boosting_max_depth,
            )?,
            learning_rate: read_double(config, "model", "learning_rate", m.learning_rate)?,
            ridge_alpha: read_double(config, "model", "ridge_alpha", m.ridge_alpha)?,
            cv_splits: read_count(config, "model", "cv_splits", m.cv_splits)?,
            train_fraction: read_double(config, "model", "train_fraction", m.train_fraction)?,
            seed: read_count(config, "model", "seed", m.seed as usize)? as u64,
        };

        Ok(Strategy {
            ticker,
            data,
            signal,
            risk,
            model,
        })
    }

    pub fn market_path(&self) -> PathBuf {
        self.data.data_dir.join(&self.data.market_file)
    }

    pub fn sentiment_path(&self) -> PathBuf {
        self.data.data_dir.join(&self.data.sentiment_file)
    }

    pub fn earnings_path(&self) -> PathBuf {
        self.data.data_dir.join(&self.data.earnings_file)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::file_config_adapter::FileConfigAdapter;

    fn make_config(content: &str) -> FileConfigAdapter {
        FileConfigAdapter::from_string(content).unwrap()
    }

    #[test]
    fn defaults_fill_missing_sections() {
        let s = Strategy::from_config(&make_config("[data]\nticker = AAPL\n"), None).unwrap();
        assert_eq!(s.ticker, "AAPL");
        assert_eq!(s.data, DataConfig::default());
        assert_eq!(s.signal, SignalConfig::default());
        assert_eq!(s.risk, RiskConfig::default());
        assert_eq!(s.model, EnsembleConfig::default());
    }

    #[test]
    fn explicit_values_are_used() {
        let config = make_config(
            r#"
[data]
ticker = MSFT
data_dir = /tmp/feeds
market_file = prices.csv

[signal]
buy_threshold = 0.01
sell_threshold = -0.02
sentiment_weight = 0.5

[risk]
stop_loss_pct = 0.03

[model]
forest_trees = 25
seed = 7
"#,
        );
        let s = Strategy::from_config(&config, None).unwrap();
        assert_eq!(s.ticker, "MSFT");
        assert_eq!(s.market_path(), PathBuf::from("/tmp/feeds/prices.csv"));
        assert_eq!(s.sentiment_path(), PathBuf::from("/tmp/feeds/sentiment.csv"));
        assert_eq!(s.signal.buy_threshold, 0.01);
        assert_eq!(s.signal.sell_threshold, -0.02);
        assert_eq!(s.signal.sentiment_weight, 0.5);
        assert_eq!(s.risk.stop_loss_pct, 0.03);
        assert_eq!(s.risk.take_profit_pct, 0.10);
        assert_eq!(s.model.forest_trees, 25);
        assert_eq!(s.model.seed, 7);
    }

    #[test]
    fn ticker_override_wins() {
        let s = Strategy::from_config(&make_config("[data]\nticker = AAPL\n"), Some("TSLA")).unwrap();
        assert_eq!(s.ticker, "TSLA");
    }

    #[test]
    fn override_satisfies_missing_ticker() {
        let s = Strategy::from_config(&make_config("[signal]\n"), Some("NVDA")).unwrap();
        assert_eq!(s.ticker, "NVDA");
    }

    #[test]
    fn invalid_config_is_rejected() {
        let err = Strategy::from_config(
            &make_config("[data]\nticker = AAPL\n[risk]\nstop_loss_pct = 0\n"),
            None,
        )
        .unwrap_err();
        assert!(matches!(err, FusetraderError::ConfigInvalid { key, .. } if key == "stop_loss_pct"));
    }
}
