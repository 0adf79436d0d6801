//! Weighted ensemble of a bagged forest, boosted trees and ridge
//! regression sharing one robust scaler.
//!
//! The scaler is fit inside [`EnsemblePredictor::fit`] only; prediction
//! paths call `transform` and never refit it.

use crate::domain::error::ModelError;
use crate::domain::features::FeatureRow;
use crate::domain::model::boosting::{BoostingConfig, GradientBoosting};
use crate::domain::model::forest::{ForestConfig, RandomForest};
use crate::domain::model::ridge::RidgeRegression;
use crate::domain::model::scaler::RobustScaler;
use crate::domain::model::Regressor;
use chrono::NaiveDate;

/// Forest, boosting, ridge.
pub const MEMBER_WEIGHTS: [f64; 3] = [0.4, 0.4, 0.2];

#[derive(Debug, Clone, PartialEq)]
pub struct EnsembleConfig {
    pub forest_trees: usize,
    pub forest_max_depth: usize,
    pub boosting_estimators: usize,
    pub boosting_max_depth: usize,
    pub learning_rate: f64,
    pub ridge_alpha: f64,
    pub cv_splits: usize,
    pub train_fraction: f64,
    pub seed: u64,
}

impl Default for EnsembleConfig {
    fn default() -> Self {
        Self {
            forest_trees: 300,
            forest_max_depth: 10,
            boosting_estimators: 200,
            boosting_max_depth: 6,
            learning_rate: 0.1,
            ridge_alpha: 1.0,
            cv_splits: 5,
            train_fraction: 0.8,
            seed: 42,
        }
    }
}

#[derive(Debug, Clone)]
pub enum Member {
    Forest(RandomForest),
    Boosting(GradientBoosting),
    Ridge(RidgeRegression),
}

impl Member {
    pub fn name(&self) -> &'static str {
        match self {
            Member::Forest(_) => "forest",
            Member::Boosting(_) => "boosting",
            Member::Ridge(_) => "ridge",
        }
    }
}

impl Regressor for Member {
    fn fit(&mut self, x: &[Vec<f64>], y: &[f64]) -> Result<(), ModelError> {
        match self {
            Member::Forest(m) => m.fit(x, y),
            Member::Boosting(m) => m.fit(x, y),
            Member::Ridge(m) => m.fit(x, y),
        }
    }

    fn predict(&self, x: &[Vec<f64>]) -> Result<Vec<f64>, ModelError> {
        match self {
            Member::Forest(m) => m.predict(x),
            Member::Boosting(m) => m.predict(x),
            Member::Ridge(m) => m.predict(x),
        }
    }
}

/// One held-out day's ensemble output.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PredictionRecord {
    pub date: NaiveDate,
    pub predicted_return: f64,
    pub confidence: f64,
}

/// Weighted sum of per-member predictions for one sample.
pub fn combine(predictions: &[f64; 3], weights: &[f64; 3]) -> f64 {
    predictions.iter().zip(weights).map(|(p, w)| p * w).sum()
}

/// `1 / (1 + population std)` of the member predictions; 1 when they agree.
pub fn agreement_confidence(predictions: &[f64; 3]) -> f64 {
    // Pairwise form of the population variance: exactly zero on agreement.
    let [a, b, c] = *predictions;
    let var = ((a - b).powi(2) + (a - c).powi(2) + (b - c).powi(2)) / 9.0;
    1.0 / (1.0 + var.sqrt())
}

#[derive(Debug, Clone)]
pub struct EnsemblePredictor {
    scaler: RobustScaler,
    members: [Member; 3],
    weights: [f64; 3],
}

impl EnsemblePredictor {
    pub fn new(config: &EnsembleConfig) -> Self {
        Self {
            scaler: RobustScaler::new(),
            members: [
                Member::Forest(RandomForest::new(ForestConfig {
                    n_trees: config.forest_trees,
                    max_depth: config.forest_max_depth,
                    seed: config.seed,
                })),
                Member::Boosting(GradientBoosting::new(BoostingConfig {
                    n_estimators: config.boosting_estimators,
                    max_depth: config.boosting_max_depth,
                    learning_rate: config.learning_rate,
                })),
                Member::Ridge(RidgeRegression::new(config.ridge_alpha)),
            ],
            weights: MEMBER_WEIGHTS,
        }
    }

    pub fn members(&self) -> &[Member; 3] {
        &self.members
    }

    /// Fits the scaler, then every member on the same scaled matrix.
    pub fn fit(&mut self, x: &[Vec<f64>], y: &[f64]) -> Result<(), ModelError> {
        let scaled = self.scaler.fit_transform(x, y)?;
        for member in &mut self.members {
            member.fit(&scaled, y)?;
        }
        Ok(())
    }

    fn member_predictions(&self, x: &[Vec<f64>]) -> Result<Vec<[f64; 3]>, ModelError> {
        let scaled = self.scaler.transform(x)?;
        let [a, b, c] = &self.members;
        let (pa, pb, pc) = (a.predict(&scaled)?, b.predict(&scaled)?, c.predict(&scaled)?);
        Ok((0..x.len()).map(|i| [pa[i], pb[i], pc[i]]).collect())
    }

    pub fn predict(&self, x: &[Vec<f64>]) -> Result<Vec<f64>, ModelError> {
        Ok(self
            .member_predictions(x)?
            .iter()
            .map(|p| combine(p, &self.weights))
            .collect())
    }

    /// Returns (prediction, confidence) pairs; confidence lies in (0, 1].
    pub fn predict_with_confidence(&self, x: &[Vec<f64>]) -> Result<Vec<(f64, f64)>, ModelError> {
        Ok(self
            .member_predictions(x)?
            .iter()
            .map(|p| (combine(p, &self.weights), agreement_confidence(p)))
            .collect())
    }

    pub fn predict_rows(&self, rows: &[FeatureRow]) -> Result<Vec<PredictionRecord>, ModelError> {
        let x: Vec<Vec<f64>> = rows.iter().map(|r| r.values.clone()).collect();
        let out = self.predict_with_confidence(&x)?;
        Ok(rows
            .iter()
            .zip(out)
            .map(|(row, (predicted_return, confidence))| PredictionRecord {
                date: row.date,
                predicted_return,
                confidence,
            })
            .collect())
    }

    /// Importances from the forest member only.
    pub fn feature_importances(&self) -> &[f64] {
        match &self.members[0] {
            Member::Forest(f) => f.feature_importances(),
            _ => &[],
        }
    }
}
