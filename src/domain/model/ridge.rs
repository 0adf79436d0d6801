//! L2-regularized linear regression with an unpenalized intercept.
//!
//! Solves (XcᵀXc + αI) w = Xcᵀyc on centered data by Cholesky
//! decomposition, then recovers the intercept from the column means.

use crate::domain::error::ModelError;
use crate::domain::model::{Regressor, check_inputs, check_training_set};
use nalgebra::{DMatrix, DVector};

#[derive(Debug, Clone)]
pub struct RidgeRegression {
    alpha: f64,
    coefficients: Option<DVector<f64>>,
    intercept: f64,
}

impl RidgeRegression {
    pub fn new(alpha: f64) -> Self {
        Self {
            alpha,
            coefficients: None,
            intercept: 0.0,
        }
    }

    pub fn coefficients(&self) -> Option<&DVector<f64>> {
        self.coefficients.as_ref()
    }

    pub fn intercept(&self) -> f64 {
        self.intercept
    }
}

impl Regressor for RidgeRegression {
    fn fit(&mut self, x: &[Vec<f64>], y: &[f64]) -> Result<(), ModelError> {
        let n_features = check_training_set(x, y)?;
        let n = x.len();

        let xm = DMatrix::from_fn(n, n_features, |i, j| x[i][j]);
        let yv = DVector::from_column_slice(y);

        let x_mean: Vec<f64> = (0..n_features).map(|j| xm.column(j).mean()).collect();
        let y_mean = yv.mean();

        let xc = DMatrix::from_fn(n, n_features, |i, j| xm[(i, j)] - x_mean[j]);
        let yc = yv.add_scalar(-y_mean);

        let xtx = xc.transpose() * &xc;
        let penalty = DMatrix::<f64>::identity(n_features, n_features) * self.alpha;
        let xty = xc.transpose() * yc;

        let chol = (xtx + penalty).cholesky().ok_or(ModelError::Singular)?;
        let w = chol.solve(&xty);

        self.intercept = y_mean - x_mean.iter().zip(w.iter()).map(|(m, c)| m * c).sum::<f64>();
        self.coefficients = Some(w);
        Ok(())
    }

    fn predict(&self, x: &[Vec<f64>]) -> Result<Vec<f64>, ModelError> {
        let w = self.coefficients.as_ref().ok_or(ModelError::NotFitted)?;
        check_inputs(x, w.len())?;
        Ok(x.iter()
            .map(|row| self.intercept + row.iter().zip(w.iter()).map(|(v, c)| v * c).sum::<f64>())
            .collect())
    }
}
