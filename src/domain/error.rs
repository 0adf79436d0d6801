//! Domain error types.
//!
//! Every failure that escapes a pipeline stage names the stage it came from.

/// Errors raised while fitting or querying a regression model.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ModelError {
    #[error("training set is empty")]
    EmptyTrainingSet,

    #[error("dimension mismatch: expected {expected}, got {got}")]
    DimensionMismatch { expected: usize, got: usize },

    #[error("non-finite value in {what} at row {row}")]
    NonFiniteInput { what: &'static str, row: usize },

    #[error("model has not been fitted")]
    NotFitted,

    #[error("normal equations are singular")]
    Singular,
}

/// Top-level error type for fusetrader.
#[derive(Debug, thiserror::Error)]
pub enum FusetraderError {
    #[error("feature engineering failed: {reason}")]
    FeatureEngineering { reason: String },

    #[error("model fitting failed: {0}")]
    ModelFit(#[from] ModelError),

    #[error("signal generation failed: {reason}")]
    SignalGeneration { reason: String },

    #[error("backtest failed: {reason}")]
    Backtest { reason: String },

    #[error("data error: {reason}")]
    Data { reason: String },

    #[error("config parse error in {file}: {reason}")]
    ConfigParse { file: String, reason: String },

    #[error("missing config key [{section}] {key}")]
    ConfigMissing { section: String, key: String },

    #[error("invalid config value [{section}] {key}: {reason}")]
    ConfigInvalid {
        section: String,
        key: String,
        reason: String,
    },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl FusetraderError {
    pub(crate) fn invalid(section: &str, key: &str, reason: impl Into<String>) -> Self {
        FusetraderError::ConfigInvalid {
            section: section.to_string(),
            key: key.to_string(),
            reason: reason.into(),
        }
    }
}

impl From<&FusetraderError> for std::process::ExitCode {
    fn from(err: &FusetraderError) -> Self {
        let code: u8 = match err {
            FusetraderError::Io(_) => 1,
            FusetraderError::ConfigParse { .. }
            | FusetraderError::ConfigMissing { .. }
            | FusetraderError::ConfigInvalid { .. } => 2,
            FusetraderError::Data { .. } => 3,
            FusetraderError::ModelFit(_) => 4,
            FusetraderError::FeatureEngineering { .. }
            | FusetraderError::SignalGeneration { .. }
            | FusetraderError::Backtest { .. } => 5,
        };
        std::process::ExitCode::from(code)
    }
}
