//! Binary direction classifiers.

mod decision_tree;
mod random_forest;

pub use decision_tree::{DecisionTree, TreeConfig, TreeNode};
pub use random_forest::{ForestConfig, RandomForest};

use crate::errors::ForecastError;

/// A binary classifier over row-major feature matrices.
///
/// Labels are 0 (down or flat) and 1 (up).
pub trait Classifier {
    fn fit(&mut self, x: &[Vec<f64>], y: &[u8]) -> Result<(), ForecastError>;

    /// Probability that `row` belongs to class 1.
    fn predict_proba_row(&self, row: &[f64]) -> f64;

    fn predict_proba(&self, x: &[Vec<f64>]) -> Vec<f64> {
        x.iter().map(|row| self.predict_proba_row(row)).collect()
    }

    /// Hard labels: 1 when the class-1 probability exceeds one half.
    fn predict(&self, x: &[Vec<f64>]) -> Vec<u8> {
        x.iter()
            .map(|row| u8::from(self.predict_proba_row(row) > 0.5))
            .collect()
    }
}

/// Shape checks shared by every `fit` implementation.
pub(crate) fn check_training_set(x: &[Vec<f64>], y: &[u8]) -> Result<usize, ForecastError> {
    if x.is_empty() {
        return Err(ForecastError::insufficient("classifier training", 1, 0));
    }
    if x.len() != y.len() {
        return Err(ForecastError::InvalidParameter(format!(
            "{} feature rows but {} labels",
            x.len(),
            y.len()
        )));
    }
    let n_features = x[0].len();
    if n_features == 0 {
        return Err(ForecastError::InvalidParameter("feature rows are empty".into()));
    }
    if let Some(i) = x.iter().position(|row| row.len() != n_features) {
        return Err(ForecastError::InvalidParameter(format!(
            "row {i} has {} features, expected {n_features}",
            x[i].len()
        )));
    }
    if let Some(i) = y.iter().position(|&label| label > 1) {
        return Err(ForecastError::InvalidParameter(format!(
            "label {} at row {i} is not 0 or 1",
            y[i]
        )));
    }
    Ok(n_features)
}
