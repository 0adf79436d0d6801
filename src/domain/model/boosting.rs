//! Gradient-boosted regression trees on squared loss.
//!
//! F_0 = mean(y); each stage fits a tree to the residuals y - F_{m-1} and
//! adds it scaled by the learning rate.

use crate::domain::error::ModelError;
use crate::domain::model::tree::{RegressionTree, TreeConfig};
use crate::domain::model::{Regressor, check_inputs, check_training_set};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoostingConfig {
    pub n_estimators: usize,
    pub max_depth: usize,
    pub learning_rate: f64,
}

impl Default for BoostingConfig {
    fn default() -> Self {
        Self {
            n_estimators: 200,
            max_depth: 6,
            learning_rate: 0.1,
        }
    }
}

#[derive(Debug, Clone)]
pub struct GradientBoosting {
    config: BoostingConfig,
    init: f64,
    trees: Vec<RegressionTree>,
    n_features: usize,
    fitted: bool,
}

impl GradientBoosting {
    pub fn new(config: BoostingConfig) -> Self {
        Self {
            config,
            init: 0.0,
            trees: Vec::new(),
            n_features: 0,
            fitted: false,
        }
    }

    fn raw_predict(&self, row: &[f64]) -> f64 {
        self.trees.iter().fold(self.init, |acc, t| {
            acc + self.config.learning_rate * t.predict_one(row)
        })
    }
}

impl Regressor for GradientBoosting {
    fn fit(&mut self, x: &[Vec<f64>], y: &[f64]) -> Result<(), ModelError> {
        let n_features = check_training_set(x, y)?;
        let tree_config = TreeConfig {
            max_depth: self.config.max_depth,
            ..TreeConfig::default()
        };

        let init = y.iter().sum::<f64>() / y.len() as f64;
        let mut current = vec![init; y.len()];
        let mut trees = Vec::with_capacity(self.config.n_estimators);
        let mut residuals = vec![0.0; y.len()];

        for _ in 0..self.config.n_estimators {
            for ((r, target), f) in residuals.iter_mut().zip(y).zip(&current) {
                *r = target - f;
            }
            let mut tree = RegressionTree::new(tree_config);
            tree.fit(x, &residuals)?;
            for (f, row) in current.iter_mut().zip(x) {
                *f += self.config.learning_rate * tree.predict_one(row);
            }
            trees.push(tree);
        }

        self.init = init;
        self.trees = trees;
        self.n_features = n_features;
        self.fitted = true;
        Ok(())
    }

    fn predict(&self, x: &[Vec<f64>]) -> Result<Vec<f64>, ModelError> {
        if !self.fitted {
            return Err(ModelError::NotFitted);
        }
        check_inputs(x, self.n_features)?;
        Ok(x.iter().map(|row| self.raw_predict(row)).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn mse(a: &[f64], b: &[f64]) -> f64 {
        a.iter().zip(b).map(|(p, t)| (p - t).powi(2)).sum::<f64>() / a.len() as f64
    }

    #[test]
    fn zero_estimators_predicts_mean() {
        let x = vec![vec![0.0], vec![1.0], vec![2.0]];
        let y = vec![1.0, 2.0, 6.0];
        let mut gb = GradientBoosting::new(BoostingConfig {
            n_estimators: 0,
            ..BoostingConfig::default()
        });
        gb.fit(&x, &y).unwrap();
        assert_eq!(gb.predict(&x).unwrap(), vec![3.0; 3]);
    }

    #[test]
    fn more_stages_reduce_training_error() {
        let x: Vec<Vec<f64>> = (0..40).map(|i| vec![i as f64]).collect();
        let y: Vec<f64> = (0..40).map(|i| ((i as f64) / 6.0).sin()).collect();

        let mut short = GradientBoosting::new(BoostingConfig {
            n_estimators: 5,
            max_depth: 2,
            learning_rate: 0.1,
        });
        let mut long = GradientBoosting::new(BoostingConfig {
            n_estimators: 60,
            max_depth: 2,
            learning_rate: 0.1,
        });
        short.fit(&x, &y).unwrap();
        long.fit(&x, &y).unwrap();

        let e_short = mse(&short.predict(&x).unwrap(), &y);
        let e_long = mse(&long.predict(&x).unwrap(), &y);
        assert!(e_long < e_short);
    }

    #[test]
    fn constant_target_stays_constant() {
        let x: Vec<Vec<f64>> = (0..8).map(|i| vec![i as f64, 1.0]).collect();
        let y = vec![-0.5; 8];
        let mut gb = GradientBoosting::new(BoostingConfig {
            n_estimators: 10,
            ..BoostingConfig::default()
        });
        gb.fit(&x, &y).unwrap();
        for p in gb.predict(&x).unwrap() {
            assert_relative_eq!(p, -0.5);
        }
    }

    #[test]
    fn unfitted_model_fails() {
        let gb = GradientBoosting::new(BoostingConfig::default());
        assert_eq!(gb.predict(&[vec![0.0]]), Err(ModelError::NotFitted));
    }
}
