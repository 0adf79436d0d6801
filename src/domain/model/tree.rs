//! CART regression tree with squared-error splits.
//!
//! Every feature is considered at every node. Candidate thresholds sit
//! midway between consecutive distinct sorted values, and the split with
//! the largest reduction in summed squared error wins (first one on ties).

use crate::domain::error::ModelError;
use crate::domain::model::{Regressor, check_inputs, check_training_set};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TreeConfig {
    pub max_depth: usize,
    pub min_samples_split: usize,
    pub min_samples_leaf: usize,
}

impl Default for TreeConfig {
    fn default() -> Self {
        Self {
            max_depth: 10,
            min_samples_split: 2,
            min_samples_leaf: 1,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
enum Node {
    Leaf {
        value: f64,
    },
    Split {
        feature: usize,
        threshold: f64,
        left: usize,
        right: usize,
    },
}

#[derive(Debug, Clone)]
pub struct RegressionTree {
    config: TreeConfig,
    nodes: Vec<Node>,
    n_features: usize,
    importances: Vec<f64>,
}

struct BestSplit {
    feature: usize,
    threshold: f64,
    left_count: usize,
    gain: f64,
}

impl RegressionTree {
    pub fn new(config: TreeConfig) -> Self {
        Self {
            config,
            nodes: Vec::new(),
            n_features: 0,
            importances: Vec::new(),
        }
    }

    pub fn depth(&self) -> usize {
        fn walk(nodes: &[Node], id: usize) -> usize {
            match nodes[id] {
                Node::Leaf { .. } => 0,
                Node::Split { left, right, .. } => 1 + walk(nodes, left).max(walk(nodes, right)),
            }
        }
        if self.nodes.is_empty() { 0 } else { walk(&self.nodes, 0) }
    }

    /// Total squared-error reduction per feature, normalized to sum to 1
    /// (all zeros for a single-leaf tree).
    pub fn feature_importances(&self) -> &[f64] {
        &self.importances
    }

    /// Fit on the rows of `x` selected by `indices`; repeats are allowed.
    pub fn fit_indices(
        &mut self,
        x: &[Vec<f64>],
        y: &[f64],
        indices: &[usize],
    ) -> Result<(), ModelError> {
        let n_features = check_training_set(x, y)?;
        if indices.is_empty() {
            return Err(ModelError::EmptyTrainingSet);
        }

        self.n_features = n_features;
        self.nodes.clear();
        self.importances = vec![0.0; n_features];

        let mut idx = indices.to_vec();
        self.grow(x, y, &mut idx, 0);

        let total: f64 = self.importances.iter().sum();
        if total > 0.0 {
            for imp in &mut self.importances {
                *imp /= total;
            }
        }
        Ok(())
    }

    fn grow(&mut self, x: &[Vec<f64>], y: &[f64], idx: &mut [usize], depth: usize) -> usize {
        let n = idx.len() as f64;
        let sum: f64 = idx.iter().map(|&i| y[i]).sum();
        let mean = sum / n;
        let parent_sse: f64 = idx.iter().map(|&i| (y[i] - mean) * (y[i] - mean)).sum();

        let node_id = self.nodes.len();
        self.nodes.push(Node::Leaf { value: mean });

        if depth >= self.config.max_depth
            || idx.len() < self.config.min_samples_split
            || parent_sse <= 0.0
        {
            return node_id;
        }

        let Some(best) = self.best_split(x, y, idx, parent_sse) else {
            return node_id;
        };

        idx.sort_by(|&a, &b| x[a][best.feature].total_cmp(&x[b][best.feature]));
        let (left_idx, right_idx) = idx.split_at_mut(best.left_count);
        let left = self.grow(x, y, left_idx, depth + 1);
        let right = self.grow(x, y, right_idx, depth + 1);

        self.importances[best.feature] += best.gain;
        self.nodes[node_id] = Node::Split {
            feature: best.feature,
            threshold: best.threshold,
            left,
            right,
        };
        node_id
    }

    fn best_split(
        &self,
        x: &[Vec<f64>],
        y: &[f64],
        idx: &[usize],
        parent_sse: f64,
    ) -> Option<BestSplit> {
        let n = idx.len();
        let min_leaf = self.config.min_samples_leaf.max(1);
        let total_sum: f64 = idx.iter().map(|&i| y[i]).sum();
        let total_sq: f64 = idx.iter().map(|&i| y[i] * y[i]).sum();

        let mut best: Option<BestSplit> = None;
        let mut sorted = idx.to_vec();

        for feature in 0..self.n_features {
            sorted.sort_by(|&a, &b| x[a][feature].total_cmp(&x[b][feature]));

            let mut left_sum = 0.0;
            let mut left_sq = 0.0;
            for k in 1..n {
                let yi = y[sorted[k - 1]];
                left_sum += yi;
                left_sq += yi * yi;

                let lo = x[sorted[k - 1]][feature];
                let hi = x[sorted[k]][feature];
                if lo == hi || k < min_leaf || n - k < min_leaf {
                    continue;
                }

                let nl = k as f64;
                let nr = (n - k) as f64;
                let right_sum = total_sum - left_sum;
                let right_sq = total_sq - left_sq;
                let child_sse = (left_sq - left_sum * left_sum / nl)
                    + (right_sq - right_sum * right_sum / nr);
                let gain = parent_sse - child_sse;

                if gain > best.as_ref().map_or(0.0, |b| b.gain) {
                    let mid = lo + (hi - lo) / 2.0;
                    best = Some(BestSplit {
                        feature,
                        threshold: if mid < hi { mid } else { lo },
                        left_count: k,
                        gain,
                    });
                }
            }
        }

        best.filter(|b| b.gain > parent_sse * 1e-12)
    }

    pub fn predict_one(&self, row: &[f64]) -> f64 {
        let mut id = 0;
        loop {
            match self.nodes[id] {
                Node::Leaf { value } => return value,
                Node::Split {
                    feature,
                    threshold,
                    left,
                    right,
                } => {
                    id = if row[feature] <= threshold { left } else { right };
                }
            }
        }
    }
}

impl Regressor for RegressionTree {
    fn fit(&mut self, x: &[Vec<f64>], y: &[f64]) -> Result<(), ModelError> {
        let all: Vec<usize> = (0..x.len()).collect();
        self.fit_indices(x, y, &all)
    }

    fn predict(&self, x: &[Vec<f64>]) -> Result<Vec<f64>, ModelError> {
        if self.nodes.is_empty() {
            return Err(ModelError::NotFitted);
        }
        check_inputs(x, self.n_features)?;
        Ok(x.iter().map(|row| self.predict_one(row)).collect())
    }
}
