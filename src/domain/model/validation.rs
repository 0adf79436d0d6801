//! Forward-chaining cross-validation and the chronological train/test split.

use crate::domain::error::ModelError;
use crate::domain::model::ensemble::{EnsembleConfig, EnsemblePredictor};
use rayon::prelude::*;
use std::ops::Range;

/// Expanding-window fold: `train` always ends where `test` begins.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fold {
    pub train: Range<usize>,
    pub test: Range<usize>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CvReport {
    pub fold_mse: Vec<f64>,
    pub mean_mse: f64,
    pub std_mse: f64,
}

/// Splits `n_samples` into `n_splits` consecutive test blocks of size
/// `n_samples / (n_splits + 1)`, each trained on everything before it.
/// Returns no folds when a block would be empty.
pub fn time_series_splits(n_samples: usize, n_splits: usize) -> Vec<Fold> {
    if n_splits == 0 {
        return Vec::new();
    }
    let test_size = n_samples / (n_splits + 1);
    if test_size == 0 {
        return Vec::new();
    }
    let first_test = n_samples - n_splits * test_size;
    (0..n_splits)
        .map(|k| {
            let start = first_test + k * test_size;
            Fold {
                train: 0..start,
                test: start..start + test_size,
            }
        })
        .collect()
}

/// Index of the first held-out row: `floor(n * train_fraction)`.
pub fn chronological_split(n_samples: usize, train_fraction: f64) -> usize {
    ((n_samples as f64 * train_fraction).floor() as usize).min(n_samples)
}

pub fn mean_squared_error(actual: &[f64], predicted: &[f64]) -> f64 {
    if actual.is_empty() {
        return 0.0;
    }
    actual
        .iter()
        .zip(predicted)
        .map(|(a, p)| (a - p) * (a - p))
        .sum::<f64>()
        / actual.len() as f64
}

/// Fits a fresh ensemble per fold and scores it by MSE. Folds run in
/// parallel; each reads only its own slices. `None` when there are too
/// few rows for the requested number of splits.
pub fn cross_validate(
    x: &[Vec<f64>],
    y: &[f64],
    config: &EnsembleConfig,
) -> Result<Option<CvReport>, ModelError> {
    let folds = time_series_splits(x.len(), config.cv_splits);
    if folds.is_empty() {
        return Ok(None);
    }

    let fold_mse: Vec<f64> = folds
        .par_iter()
        .map(|fold| -> Result<f64, ModelError> {
            let mut model = EnsemblePredictor::new(config);
            model.fit(&x[fold.train.clone()], &y[fold.train.clone()])?;
            let pred = model.predict(&x[fold.test.clone()])?;
            Ok(mean_squared_error(&y[fold.test.clone()], &pred))
        })
        .collect::<Result<_, ModelError>>()?;

    let k = fold_mse.len() as f64;
    let mean_mse = fold_mse.iter().sum::<f64>() / k;
    let std_mse = (fold_mse.iter().map(|m| (m - mean_mse).powi(2)).sum::<f64>() / k).sqrt();

    Ok(Some(CvReport {
        fold_mse,
        mean_mse,
        std_mse,
    }))
}
