//! Median / interquartile-range feature scaler.

use crate::domain::error::ModelError;
use crate::domain::model::{check_inputs, check_training_set};

#[derive(Debug, Clone, Default)]
pub struct RobustScaler {
    center: Vec<f64>,
    scale: Vec<f64>,
    fitted: bool,
}

/// Linear-interpolated quantile of sorted data.
fn quantile(sorted: &[f64], q: f64) -> f64 {
    let pos = q * (sorted.len() - 1) as f64;
    let lo = pos.floor() as usize;
    let hi = pos.ceil() as usize;
    sorted[lo] + (sorted[hi] - sorted[lo]) * (pos - lo as f64)
}

impl RobustScaler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Columns with zero IQR keep scale 1.
    pub fn fit(&mut self, x: &[Vec<f64>]) -> Result<(), ModelError> {
        if x.is_empty() {
            return Err(ModelError::EmptyTrainingSet);
        }
        let n_features = x[0].len();
        check_inputs(x, n_features)?;

        let mut center = Vec::with_capacity(n_features);
        let mut scale = Vec::with_capacity(n_features);
        let mut column = Vec::with_capacity(x.len());
        for f in 0..n_features {
            column.clear();
            column.extend(x.iter().map(|row| row[f]));
            column.sort_by(f64::total_cmp);

            let iqr = quantile(&column, 0.75) - quantile(&column, 0.25);
            center.push(quantile(&column, 0.5));
            scale.push(if iqr > 0.0 { iqr } else { 1.0 });
        }

        self.center = center;
        self.scale = scale;
        self.fitted = true;
        Ok(())
    }

    pub fn transform(&self, x: &[Vec<f64>]) -> Result<Vec<Vec<f64>>, ModelError> {
        if !self.fitted {
            return Err(ModelError::NotFitted);
        }
        check_inputs(x, self.center.len())?;
        Ok(x.iter()
            .map(|row| {
                row.iter()
                    .zip(self.center.iter().zip(&self.scale))
                    .map(|(v, (c, s))| (v - c) / s)
                    .collect()
            })
            .collect())
    }

    pub fn fit_transform(
        &mut self,
        x: &[Vec<f64>],
        y: &[f64],
    ) -> Result<Vec<Vec<f64>>, ModelError> {
        check_training_set(x, y)?;
        self.fit(x)?;
        self.transform(x)
    }
}
