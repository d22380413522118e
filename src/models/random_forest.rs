use log::debug;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};

use super::decision_tree::{DecisionTree, TreeConfig};
use super::{Classifier, check_training_set};
use crate::errors::ForecastError;

/// Random forest hyperparameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForestConfig {
    pub n_trees: usize,
    pub max_depth: usize,
    pub min_samples_split: usize,
    pub min_samples_leaf: usize,
    /// Features tried per split; `None` means `floor(sqrt(n_features))`.
    pub max_features: Option<usize>,
    /// Fit each tree on a bootstrap replicate instead of the full set.
    pub bootstrap: bool,
    pub seed: u64,
}

impl Default for ForestConfig {
    fn default() -> Self {
        Self {
            n_trees: 100,
            max_depth: 6,
            min_samples_split: 2,
            min_samples_leaf: 1,
            max_features: None,
            bootstrap: true,
            seed: 42,
        }
    }
}

/// Bagged ensemble of Gini trees.
///
/// Tree `t` draws its bootstrap sample and its per-split feature subsets from
/// a ChaCha8 stream seeded with `seed + t`, so a fit is reproducible bit for
/// bit from the config alone.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RandomForest {
    config: ForestConfig,
    trees: Vec<DecisionTree>,
    n_features: usize,
    feature_importances: Vec<f64>,
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

    pub fn config(&self) -> &ForestConfig {
        &self.config
    }

    pub fn n_trees(&self) -> usize {
        self.trees.len()
    }

    /// Width of the feature rows the forest was trained on (0 before fitting).
    pub fn n_features(&self) -> usize {
        self.n_features
    }

    pub fn is_fitted(&self) -> bool {
        !self.trees.is_empty()
    }

    /// Mean impurity-decrease importance across trees.
    pub fn feature_importances(&self) -> &[f64] {
        &self.feature_importances
    }

    /// Feature names paired with their importance, most important first.
    pub fn importance_ranking<'a>(&self, names: &'a [String]) -> Vec<(&'a str, f64)> {
        let mut ranking: Vec<(&str, f64)> = names
            .iter()
            .zip(&self.feature_importances)
            .map(|(name, &imp)| (name.as_str(), imp))
            .collect();
        ranking.sort_by(|a, b| b.1.total_cmp(&a.1));
        ranking
    }

    fn max_features(&self, n_features: usize) -> usize {
        self.config
            .max_features
            .unwrap_or_else(|| (n_features as f64).sqrt().floor() as usize)
            .clamp(1, n_features)
    }
}

impl Classifier for RandomForest {
    fn fit(&mut self, x: &[Vec<f64>], y: &[u8]) -> Result<(), ForecastError> {
        let n_features = check_training_set(x, y)?;
        if self.config.n_trees == 0 {
            return Err(ForecastError::InvalidParameter("n_trees must be at least 1".into()));
        }

        let n = x.len();
        let tree_config = TreeConfig {
            max_depth: self.config.max_depth,
            min_samples_split: self.config.min_samples_split,
            min_samples_leaf: self.config.min_samples_leaf,
            max_features: Some(self.max_features(n_features)),
        };

        let trees: Vec<DecisionTree> = (0..self.config.n_trees)
            .map(|t| {
                let mut rng = ChaCha8Rng::seed_from_u64(self.config.seed.wrapping_add(t as u64));
                let indices: Vec<usize> = if self.config.bootstrap {
                    (0..n).map(|_| rng.gen_range(0..n)).collect()
                } else {
                    (0..n).collect()
                };
                let mut tree = DecisionTree::new(tree_config.clone());
                tree.fit_indices(x, y, &indices, &mut rng);
                tree
            })
            .collect();

        let mut importances = vec![0.0; n_features];
        for tree in &trees {
            for (acc, &imp) in importances.iter_mut().zip(tree.feature_importances()) {
                *acc += imp;
            }
        }
        for imp in &mut importances {
            *imp /= trees.len() as f64;
        }

        debug!(
            "Fitted {} trees on {} rows x {} features (max_features {})",
            trees.len(),
            n,
            n_features,
            self.max_features(n_features)
        );

        self.trees = trees;
        self.n_features = n_features;
        self.feature_importances = importances;
        Ok(())
    }

    /// Mean of the per-tree leaf probabilities; 0.5 for an unfitted forest.
    fn predict_proba_row(&self, row: &[f64]) -> f64 {
        if self.trees.is_empty() {
            return 0.5;
        }
        let total: f64 = self.trees.iter().map(|t| t.predict_proba_row(row)).sum();
        total / self.trees.len() as f64
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn noisy_step(n: usize) -> (Vec<Vec<f64>>, Vec<u8>) {
        let x: Vec<Vec<f64>> = (0..n)
            .map(|i| {
                let t = i as f64 / n as f64;
                vec![t, (i as f64 * 0.7).sin(), (i % 5) as f64, (i as f64 * 1.3).cos()]
            })
            .collect();
        let y: Vec<u8> = (0..n).map(|i| u8::from(i >= n / 2)).collect();
        (x, y)
    }

    #[test]
    fn test_forest_classifies_step() {
        let (x, y) = noisy_step(200);
        let mut forest = RandomForest::new(ForestConfig {
            n_trees: 25,
            ..ForestConfig::default()
        });
        forest.fit(&x, &y).unwrap();

        assert_eq!(forest.n_trees(), 25);
        assert_eq!(forest.n_features(), 4);

        let preds = forest.predict(&x);
        let correct = preds.iter().zip(&y).filter(|(p, t)| p == t).count();
        assert!(correct as f64 / y.len() as f64 > 0.9);

        let importances = forest.feature_importances();
        assert_eq!(importances.len(), 4);
        assert!((importances.iter().sum::<f64>() - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_forest_is_deterministic() {
        let (x, y) = noisy_step(120);
        let config = ForestConfig {
            n_trees: 10,
            ..ForestConfig::default()
        };

        let mut a = RandomForest::new(config.clone());
        let mut b = RandomForest::new(config.clone());
        a.fit(&x, &y).unwrap();
        b.fit(&x, &y).unwrap();
        assert_eq!(a.predict_proba(&x), b.predict_proba(&x));

        let mut c = RandomForest::new(ForestConfig { seed: 7, ..config });
        c.fit(&x, &y).unwrap();
        assert_ne!(a.predict_proba(&x), c.predict_proba(&x));
    }

    #[test]
    fn test_probabilities_in_range() {
        let (x, y) = noisy_step(80);
        let mut forest = RandomForest::new(ForestConfig {
            n_trees: 5,
            ..ForestConfig::default()
        });
        forest.fit(&x, &y).unwrap();
        for p in forest.predict_proba(&x) {
            assert!((0.0..=1.0).contains(&p));
        }
    }

    #[test]
    fn test_serde_round_trip_preserves_predictions() {
        let (x, y) = noisy_step(60);
        let mut forest = RandomForest::new(ForestConfig {
            n_trees: 5,
            ..ForestConfig::default()
        });
        forest.fit(&x, &y).unwrap();

        let json = serde_json::to_string(&forest).unwrap();
        let back: RandomForest = serde_json::from_str(&json).unwrap();
        assert_eq!(back.predict(&x), forest.predict(&x));
        assert_eq!(back.config(), forest.config());
    }

    #[test]
    fn test_fit_rejects_bad_input() {
        let mut forest = RandomForest::new(ForestConfig::default());
        assert!(matches!(
            forest.fit(&[], &[]),
            Err(ForecastError::InsufficientData { .. })
        ));
        assert!(matches!(
            forest.fit(&[vec![1.0]], &[1, 0]),
            Err(ForecastError::InvalidParameter(_))
        ));
        assert!(matches!(
            forest.fit(&[vec![1.0], vec![1.0, 2.0]], &[1, 0]),
            Err(ForecastError::InvalidParameter(_))
        ));
        assert!(matches!(
            forest.fit(&[vec![1.0]], &[2]),
            Err(ForecastError::InvalidParameter(_))
        ));

        let mut empty = RandomForest::new(ForestConfig {
            n_trees: 0,
            ..ForestConfig::default()
        });
        assert!(empty.fit(&[vec![1.0]], &[1]).is_err());
        assert!(!empty.is_fitted());
        assert_eq!(empty.predict_proba_row(&[1.0]), 0.5);
    }
}
