//! Regression models behind one fit/predict capability.
//!
//! Feature matrices are row-major `&[Vec<f64>]`, one inner vector per
//! sample. Every fit validates its input once through
//! [`check_training_set`].

pub mod boosting;
pub mod ensemble;
pub mod forest;
pub mod ridge;
pub mod scaler;
pub mod tree;
pub mod validation;

use crate::domain::error::ModelError;

pub trait Regressor {
    fn fit(&mut self, x: &[Vec<f64>], y: &[f64]) -> Result<(), ModelError>;
    fn predict(&self, x: &[Vec<f64>]) -> Result<Vec<f64>, ModelError>;
}

/// Returns the number of features.
pub(crate) fn check_training_set(x: &[Vec<f64>], y: &[f64]) -> Result<usize, ModelError> {
    if x.is_empty() {
        return Err(ModelError::EmptyTrainingSet);
    }
    if x.len() != y.len() {
        return Err(ModelError::DimensionMismatch {
            expected: x.len(),
            got: y.len(),
        });
    }
    let n_features = x[0].len();
    check_inputs(x, n_features)?;
    if let Some(row) = y.iter().position(|v| !v.is_finite()) {
        return Err(ModelError::NonFiniteInput {
            what: "target",
            row,
        });
    }
    Ok(n_features)
}

pub(crate) fn check_inputs(x: &[Vec<f64>], n_features: usize) -> Result<(), ModelError> {
    for (row, values) in x.iter().enumerate() {
        if values.len() != n_features {
            return Err(ModelError::DimensionMismatch {
                expected: n_features,
                got: values.len(),
            });
        }
        if values.iter().any(|v| !v.is_finite()) {
            return Err(ModelError::NonFiniteInput {
                what: "features",
                row,
            });
        }
    }
    Ok(())
}
