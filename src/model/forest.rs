//! Random forest binary classifier
//!
//! Bootstrap-sampled CART trees with sqrt-feature subsetting per split
//! and class-balanced sample weights. Every random draw flows from the
//! configured seed, so two fits on identical data produce identical
//! models and identical predictions.

use ndarray::Array2;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

use super::tree::{DecisionTree, TreeParams};
use crate::error::{Error, Result};

/// Forest hyperparameters
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ForestParams {
    pub n_trees: usize,
    pub max_depth: usize,
    pub min_samples_split: usize,
    /// Seed for bootstrap sampling and per-split feature subsets
    pub seed: u64,
    /// Reweight samples inversely to class frequency
    pub balanced: bool,
}

impl Default for ForestParams {
    fn default() -> Self {
        Self {
            n_trees: 200,
            max_depth: 10,
            min_samples_split: 2,
            seed: 42,
            balanced: true,
        }
    }
}

impl ForestParams {
    /// Hyperparameters as (name, value) pairs for the tracking sink
    pub fn entries(&self) -> Vec<(&'static str, String)> {
        vec![
            ("n_trees", self.n_trees.to_string()),
            ("max_depth", self.max_depth.to_string()),
            ("min_samples_split", self.min_samples_split.to_string()),
            ("seed", self.seed.to_string()),
            ("class_weight", if self.balanced { "balanced" } else { "none" }.to_string()),
        ]
    }
}

/// A fitted random forest
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RandomForestClassifier {
    params: ForestParams,
    trees: Vec<DecisionTree>,
    n_features: usize,
}

impl RandomForestClassifier {
    /// Fit on a feature matrix and binary labels
    pub fn fit(x: &Array2<f64>, y: &[u8], params: ForestParams) -> Result<Self> {
        let n = x.nrows();
        if n == 0 {
            return Err(Error::Train("cannot fit on an empty training set".into()));
        }
        if y.len() != n {
            return Err(Error::Train(format!("{} labels for {n} rows", y.len())));
        }
        if params.n_trees == 0 {
            return Err(Error::Train("n_trees must be positive".into()));
        }

        let weights = sample_weights(y, params.balanced);
        let n_features = x.ncols();
        let tree_params = TreeParams {
            max_depth: params.max_depth,
            min_samples_split: params.min_samples_split,
            max_features: (n_features as f64).sqrt().round().max(1.0) as usize,
        };

        let mut trees = Vec::with_capacity(params.n_trees);
        for t in 0..params.n_trees {
            // independent stream per tree, derived from the base seed
            let mut rng = StdRng::seed_from_u64(params.seed.wrapping_add(t as u64));
            let bootstrap: Vec<usize> = (0..n).map(|_| rng.random_range(0..n)).collect();
            trees.push(DecisionTree::fit(
                x,
                y,
                &weights,
                &bootstrap,
                &tree_params,
                &mut rng,
            ));
        }

        Ok(Self {
            params,
            trees,
            n_features,
        })
    }

    pub fn params(&self) -> &ForestParams {
        &self.params
    }

    pub fn n_features(&self) -> usize {
        self.n_features
    }

    /// Mean positive-class probability across all trees, one per row
    pub fn predict_proba(&self, x: &Array2<f64>) -> Result<Vec<f64>> {
        if x.ncols() != self.n_features {
            return Err(Error::Prediction(format!(
                "model expects {} features, got {}",
                self.n_features,
                x.ncols()
            )));
        }
        let n_trees = self.trees.len() as f64;
        Ok(x.rows()
            .into_iter()
            .map(|row| {
                let row = row.to_vec();
                self.trees
                    .iter()
                    .map(|t| t.predict_proba(&row))
                    .sum::<f64>()
                    / n_trees
            })
            .collect())
    }

    /// Hard labels: probability >= 0.5 maps to 1
    pub fn predict(&self, x: &Array2<f64>) -> Result<Vec<u8>> {
        Ok(self
            .predict_proba(x)?
            .into_iter()
            .map(|p| u8::from(p >= 0.5))
            .collect())
    }
}

/// Class-balanced weights: w_c = n / (n_classes * n_c), the sklearn
/// "balanced" rule; uniform weights otherwise
fn sample_weights(y: &[u8], balanced: bool) -> Vec<f64> {
    if !balanced {
        return vec![1.0; y.len()];
    }
    let n = y.len() as f64;
    let n_pos = y.iter().filter(|&&v| v == 1).count() as f64;
    let n_neg = n - n_pos;
    let w_pos = if n_pos > 0.0 { n / (2.0 * n_pos) } else { 0.0 };
    let w_neg = if n_neg > 0.0 { n / (2.0 * n_neg) } else { 0.0 };
    y.iter()
        .map(|&v| if v == 1 { w_pos } else { w_neg })
        .collect()
}
