use rand::seq::SliceRandom;
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};

/// Growth limits for a single classification tree.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TreeConfig {
    pub max_depth: usize,
    pub min_samples_split: usize,
    pub min_samples_leaf: usize,
    /// Features drawn at random per split; `None` considers all of them.
    pub max_features: Option<usize>,
}

impl Default for TreeConfig {
    fn default() -> Self {
        Self {
            max_depth: 6,
            min_samples_split: 2,
            min_samples_leaf: 1,
            max_features: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum TreeNode {
    Leaf {
        /// Fraction of class-1 samples that reached this leaf.
        prob_up: f64,
        n_samples: usize,
    },
    Split {
        feature: usize,
        threshold: f64,
        left: Box<TreeNode>,
        right: Box<TreeNode>,
    },
}

impl TreeNode {
    pub fn depth(&self) -> usize {
        match self {
            TreeNode::Leaf { .. } => 0,
            TreeNode::Split { left, right, .. } => 1 + left.depth().max(right.depth()),
        }
    }

    pub fn n_leaves(&self) -> usize {
        match self {
            TreeNode::Leaf { .. } => 1,
            TreeNode::Split { left, right, .. } => left.n_leaves() + right.n_leaves(),
        }
    }
}

/// Gini impurity of a two-class node with `pos` positives out of `n`.
fn gini(pos: usize, n: usize) -> f64 {
    if n == 0 {
        return 0.0;
    }
    let p = pos as f64 / n as f64;
    2.0 * p * (1.0 - p)
}

struct BestSplit {
    feature: usize,
    threshold: f64,
    gain: f64,
}

/// CART classification tree grown on Gini impurity.
///
/// Samples are passed as indices into a shared matrix, so bootstrap replicates
/// (which repeat indices) never copy feature rows.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DecisionTree {
    config: TreeConfig,
    root: Option<TreeNode>,
    feature_importances: Vec<f64>,
}

impl DecisionTree {
    pub fn new(config: TreeConfig) -> Self {
        Self {
            config,
            root: None,
            feature_importances: Vec::new(),
        }
    }

    /// Grow the tree on `x[indices]`. `x` and `y` are assumed validated.
    pub fn fit_indices(&mut self, x: &[Vec<f64>], y: &[u8], indices: &[usize], rng: &mut ChaCha8Rng) {
        let n_features = x.first().map_or(0, Vec::len);
        let mut importances = vec![0.0; n_features];
        self.root = Some(self.build(x, y, indices, 0, rng, &mut importances));

        let total: f64 = importances.iter().sum();
        if total > 0.0 {
            for imp in &mut importances {
                *imp /= total;
            }
        }
        self.feature_importances = importances;
    }

    fn build(
        &self,
        x: &[Vec<f64>],
        y: &[u8],
        indices: &[usize],
        depth: usize,
        rng: &mut ChaCha8Rng,
        importances: &mut [f64],
    ) -> TreeNode {
        let n = indices.len();
        let pos = indices.iter().filter(|&&i| y[i] == 1).count();
        let leaf = || TreeNode::Leaf {
            prob_up: if n == 0 { 0.5 } else { pos as f64 / n as f64 },
            n_samples: n,
        };

        if depth >= self.config.max_depth
            || n < self.config.min_samples_split.max(2)
            || pos == 0
            || pos == n
        {
            return leaf();
        }

        let Some(best) = self.best_split(x, y, indices, pos, rng) else {
            return leaf();
        };

        let (left_idx, right_idx): (Vec<usize>, Vec<usize>) = indices
            .iter()
            .partition(|&&i| x[i][best.feature] <= best.threshold);

        importances[best.feature] += best.gain * n as f64;

        let left = self.build(x, y, &left_idx, depth + 1, rng, importances);
        let right = self.build(x, y, &right_idx, depth + 1, rng, importances);

        TreeNode::Split {
            feature: best.feature,
            threshold: best.threshold,
            left: Box::new(left),
            right: Box::new(right),
        }
    }

    fn best_split(
        &self,
        x: &[Vec<f64>],
        y: &[u8],
        indices: &[usize],
        pos: usize,
        rng: &mut ChaCha8Rng,
    ) -> Option<BestSplit> {
        let n = indices.len();
        let n_features = x[indices[0]].len();
        let max_features = self
            .config
            .max_features
            .unwrap_or(n_features)
            .clamp(1, n_features);
        let min_leaf = self.config.min_samples_leaf.max(1);

        let mut features: Vec<usize> = (0..n_features).collect();
        features.shuffle(rng);
        features.truncate(max_features);

        let parent = gini(pos, n);
        let mut best: Option<BestSplit> = None;

        for feature in features {
            let mut column: Vec<(f64, u8)> = indices.iter().map(|&i| (x[i][feature], y[i])).collect();
            column.sort_by(|a, b| a.0.total_cmp(&b.0));

            // Sweep thresholds left to right with running class counts.
            let mut left_pos = 0usize;
            for k in 1..n {
                left_pos += usize::from(column[k - 1].1);
                let (lo, hi) = (column[k - 1].0, column[k].0);
                if lo == hi || k < min_leaf || n - k < min_leaf {
                    continue;
                }

                let n_left = k;
                let n_right = n - k;
                let weighted = (n_left as f64 * gini(left_pos, n_left)
                    + n_right as f64 * gini(pos - left_pos, n_right))
                    / n as f64;
                let gain = parent - weighted;

                if gain > best.as_ref().map_or(0.0, |b| b.gain) {
                    best = Some(BestSplit {
                        feature,
                        threshold: (lo + hi) / 2.0,
                        gain,
                    });
                }
            }
        }

        best
    }

    /// Class-1 probability of the leaf `row` lands in; 0.5 before fitting.
    pub fn predict_proba_row(&self, row: &[f64]) -> f64 {
        let mut node = match &self.root {
            Some(root) => root,
            None => return 0.5,
        };
        loop {
            match node {
                TreeNode::Leaf { prob_up, .. } => return *prob_up,
                TreeNode::Split {
                    feature,
                    threshold,
                    left,
                    right,
                } => {
                    let value = row.get(*feature).copied().unwrap_or(f64::NAN);
                    node = if value <= *threshold { &**left } else { &**right };
                }
            }
        }
    }

    pub fn root(&self) -> Option<&TreeNode> {
        self.root.as_ref()
    }

    /// Impurity decrease per feature, normalised to sum to one.
    pub fn feature_importances(&self) -> &[f64] {
        &self.feature_importances
    }
}
