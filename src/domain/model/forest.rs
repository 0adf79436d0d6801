//! Bagged regression forest.

use crate::domain::error::ModelError;
use crate::domain::model::tree::{RegressionTree, TreeConfig};
use crate::domain::model::{Regressor, check_inputs, check_training_set};
use rand::Rng;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use rayon::prelude::*;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ForestConfig {
    pub n_trees: usize,
    pub max_depth: usize,
    /// Tree `i` draws its bootstrap sample from `seed + i`.
    pub seed: u64,
}

impl Default for ForestConfig {
    fn default() -> Self {
        Self {
            n_trees: 300,
            max_depth: 10,
            seed: 42,
        }
    }
}

#[derive(Debug, Clone)]
pub struct RandomForest {
    config: ForestConfig,
    trees: Vec<RegressionTree>,
    n_features: usize,
    feature_importances: Vec<f64>,
}

/// Draw `n` row indices with replacement.
pub fn bootstrap_indices(n: usize, seed: u64) -> Vec<usize> {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    (0..n).map(|_| rng.gen_range(0..n)).collect()
}

impl RandomForest {
    pub fn new(config: ForestConfig) -> Self {
        Self {
            config,
            trees: Vec::new(),
            n_features: 0,
            feature_importances: Vec::new(),
        }
    }

    pub fn n_trees(&self) -> usize {
        self.trees.len()
    }

    /// Mean of per-tree importances, normalized to sum to 1 when any tree
    /// split at all.
    pub fn feature_importances(&self) -> &[f64] {
        &self.feature_importances
    }
}

impl Regressor for RandomForest {
    fn fit(&mut self, x: &[Vec<f64>], y: &[f64]) -> Result<(), ModelError> {
        let n_features = check_training_set(x, y)?;
        let n = x.len();
        let tree_config = TreeConfig {
            max_depth: self.config.max_depth,
            ..TreeConfig::default()
        };

        // Build trees in parallel
        let trees: Vec<RegressionTree> = (0..self.config.n_trees)
            .into_par_iter()
            .map(|i| -> Result<RegressionTree, ModelError> {
                let indices = bootstrap_indices(n, self.config.seed.wrapping_add(i as u64));
                let mut tree = RegressionTree::new(tree_config);
                tree.fit_indices(x, y, &indices)?;
                Ok(tree)
            })
            .collect::<Result<_, ModelError>>()?;

        let mut importances = vec![0.0; n_features];
        for tree in &trees {
            for (acc, imp) in importances.iter_mut().zip(tree.feature_importances()) {
                *acc += imp;
            }
        }
        let sum: f64 = importances.iter().sum();
        if sum > 0.0 {
            for imp in &mut importances {
                *imp /= sum;
            }
        }

        self.trees = trees;
        self.n_features = n_features;
        self.feature_importances = importances;
        Ok(())
    }

    fn predict(&self, x: &[Vec<f64>]) -> Result<Vec<f64>, ModelError> {
        if self.trees.is_empty() {
            return Err(ModelError::NotFitted);
        }
        check_inputs(x, self.n_features)?;
        let k = self.trees.len() as f64;
        Ok(x.iter()
            .map(|row| self.trees.iter().map(|t| t.predict_one(row)).sum::<f64>() / k)
            .collect())
    }
}
