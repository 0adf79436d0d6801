//! Configuration validation.
//!
//! Validates every config field before any data is loaded. Numeric keys
//! are parsed strictly: a present but unparseable value is an error rather
//! than a silent fallback to the default.

use crate::domain::error::FusetraderError;
use crate::domain::model::ensemble::EnsembleConfig;
use crate::domain::signal::SignalConfig;
use crate::domain::backtest::RiskConfig;
use crate::ports::config_port::ConfigPort;

pub fn validate_config(
    config: &dyn ConfigPort,
    ticker_override: Option<&str>,
) -> Result<(), FusetraderError> {
    validate_ticker(config, ticker_override)?;
    validate_signal_config(config)?;
    validate_risk_config(config)?;
    validate_model_config(config)?;
    Ok(())
}

/// Read a float, falling back to `default` when the key is absent.
pub(crate) fn read_double(
    config: &dyn ConfigPort,
    section: &str,
    key: &str,
    default: f64,
) -> Result<f64, FusetraderError> {
    match config.get_string(section, key) {
        None => Ok(default),
        Some(raw) => match raw.trim().parse::<f64>() {
            Ok(v) if v.is_finite() => Ok(v),
            _ => Err(FusetraderError::invalid(
                section,
                key,
                format!("{} is not a number: {:?}", key, raw),
            )),
        },
    }
}

/// Read a non-negative integer, falling back to `default` when absent.
pub(crate) fn read_count(
    config: &dyn ConfigPort,
    section: &str,
    key: &str,
    default: usize,
) -> Result<usize, FusetraderError> {
    match config.get_string(section, key) {
        None => Ok(default),
        Some(raw) => raw.trim().parse::<usize>().map_err(|_| {
            FusetraderError::invalid(
                section,
                key,
                format!("{} must be a non-negative integer, got {:?}", key, raw),
            )
        }),
    }
}

fn validate_ticker(
    config: &dyn ConfigPort,
    ticker_override: Option<&str>,
) -> Result<(), FusetraderError> {
    let ticker = ticker_override
        .map(str::to_string)
        .or_else(|| config.get_string("data", "ticker"));
    match ticker {
        Some(t) if !t.trim().is_empty() => Ok(()),
        _ => Err(FusetraderError::ConfigMissing {
            section: "data".to_string(),
            key: "ticker".to_string(),
        }),
    }
}

fn validate_signal_config(config: &dyn ConfigPort) -> Result<(), FusetraderError> {
    let d = SignalConfig::default();

    let weight = read_double(config, "signal", "sentiment_weight", d.sentiment_weight)?;
    if !(0.0..=1.0).contains(&weight) {
        return Err(FusetraderError::invalid(
            "signal",
            "sentiment_weight",
            "sentiment_weight must be between 0 and 1",
        ));
    }

    let size = read_double(config, "signal", "max_position_size", d.max_position_size)?;
    if size <= 0.0 || size > 1.0 {
        return Err(FusetraderError::invalid(
            "signal",
            "max_position_size",
            "max_position_size must be in (0, 1]",
        ));
    }

    let conf = read_double(
        config,
        "signal",
        "confidence_threshold",
        d.confidence_threshold,
    )?;
    if !(0.0..=1.0).contains(&conf) {
        return Err(FusetraderError::invalid(
            "signal",
            "confidence_threshold",
            "confidence_threshold must be between 0 and 1",
        ));
    }

    let buy = read_double(config, "signal", "buy_threshold", d.buy_threshold)?;
    let sell = read_double(config, "signal", "sell_threshold", d.sell_threshold)?;
    if buy <= sell {
        return Err(FusetraderError::invalid(
            "signal",
            "buy_threshold",
            "buy_threshold must be greater than sell_threshold",
        ));
    }
    Ok(())
}

fn validate_risk_config(config: &dyn ConfigPort) -> Result<(), FusetraderError> {
    let d = RiskConfig::default();
    for (key, default) in [
        ("stop_loss_pct", d.stop_loss_pct),
        ("take_profit_pct", d.take_profit_pct),
    ] {
        if read_double(config, "risk", key, default)? <= 0.0 {
            return Err(FusetraderError::invalid(
                "risk",
                key,
                format!("{} must be positive", key),
            ));
        }
    }
    Ok(())
}

fn validate_model_config(config: &dyn ConfigPort) -> Result<(), FusetraderError> {
    let d = EnsembleConfig::default();

    for (key, default) in [
        ("forest_trees", d.forest_trees),
        ("forest_max_depth", d.forest_max_depth),
        ("boosting_estimators", d.boosting_estimators),
        ("boosting_max_depth", d.boosting_max_depth),
    ] {
        if read_count(config, "model", key, default)? < 1 {
            return Err(FusetraderError::invalid(
                "model",
                key,
                format!("{} must be at least 1", key),
            ));
        }
    }

    if read_count(config, "model", "cv_splits", d.cv_splits)? < 2 {
        return Err(FusetraderError::invalid(
            "model",
            "cv_splits",
            "cv_splits must be at least 2",
        ));
    }

    let lr = read_double(config, "model", "learning_rate", d.learning_rate)?;
    if lr <= 0.0 || lr > 1.0 {
        return Err(FusetraderError::invalid(
            "model",
            "learning_rate",
            "learning_rate must be in (0, 1]",
        ));
    }

    if read_double(config, "model", "ridge_alpha", d.ridge_alpha)? < 0.0 {
        return Err(FusetraderError::invalid(
            "model",
            "ridge_alpha",
            "ridge_alpha must be non-negative",
        ));
    }

    let frac = read_double(config, "model", "train_fraction", d.train_fraction)?;
    if frac <= 0.0 || frac >= 1.0 {
        return Err(FusetraderError::invalid(
            "model",
            "train_fraction",
            "train_fraction must be strictly between 0 and 1",
        ));
    }

    read_count(config, "model", "seed", d.seed as usize)?;
    Ok(())
}
