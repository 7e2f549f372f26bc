//! CART decision tree for binary classification
//!
//! Axis-aligned threshold splits chosen by weighted Gini impurity.
//! Leaves store the weighted positive-class fraction so the forest can
//! average probabilities. Feature subsetting per split is driven by the
//! caller's seeded RNG, which is what makes forest fits reproducible.

use ndarray::Array2;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};

/// Tree node; `x[feature] <= threshold` goes left
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Node {
    Leaf {
        /// Weighted positive-class fraction at this leaf
        proba: f64,
    },
    Split {
        feature: usize,
        threshold: f64,
        left: Box<Node>,
        right: Box<Node>,
    },
}

/// A fitted decision tree
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DecisionTree {
    root: Node,
}

/// Growth limits shared by every tree in a forest
#[derive(Debug, Clone, Copy)]
pub struct TreeParams {
    pub max_depth: usize,
    pub min_samples_split: usize,
    /// Number of features considered per split
    pub max_features: usize,
}

impl DecisionTree {
    /// Grow a tree on the rows named by `indices`, with per-sample
    /// weights. `rng` drives the per-split feature subsets.
    pub fn fit(
        x: &Array2<f64>,
        y: &[u8],
        weights: &[f64],
        indices: &[usize],
        params: &TreeParams,
        rng: &mut StdRng,
    ) -> Self {
        let root = grow(x, y, weights, indices, params, rng, 0);
        Self { root }
    }

    /// Positive-class probability for one feature row
    pub fn predict_proba(&self, row: &[f64]) -> f64 {
        let mut node = &self.root;
        loop {
            match node {
                Node::Leaf { proba } => return *proba,
                Node::Split {
                    feature,
                    threshold,
                    left,
                    right,
                } => {
                    node = if row[*feature] <= *threshold {
                        left
                    } else {
                        right
                    };
                }
            }
        }
    }
}

/// Weighted positive fraction over `indices`
fn positive_fraction(y: &[u8], weights: &[f64], indices: &[usize]) -> f64 {
    let mut total = 0.0;
    let mut positive = 0.0;
    for &i in indices {
        total += weights[i];
        if y[i] == 1 {
            positive += weights[i];
        }
    }
    if total == 0.0 {
        0.0
    } else {
        positive / total
    }
}

fn gini(w_pos: f64, w_total: f64) -> f64 {
    if w_total == 0.0 {
        return 0.0;
    }
    let p = w_pos / w_total;
    1.0 - p * p - (1.0 - p) * (1.0 - p)
}

struct BestSplit {
    feature: usize,
    threshold: f64,
    score: f64,
}

fn grow(
    x: &Array2<f64>,
    y: &[u8],
    weights: &[f64],
    indices: &[usize],
    params: &TreeParams,
    rng: &mut StdRng,
    depth: usize,
) -> Node {
    let proba = positive_fraction(y, weights, indices);
    let pure = proba == 0.0 || proba == 1.0;
    if depth >= params.max_depth || indices.len() < params.min_samples_split || pure {
        return Node::Leaf { proba };
    }

    let best = match find_best_split(x, y, weights, indices, params, rng) {
        Some(b) => b,
        None => return Node::Leaf { proba },
    };

    let (left_idx, right_idx): (Vec<usize>, Vec<usize>) = indices
        .iter()
        .partition(|&&i| x[[i, best.feature]] <= best.threshold);
    if left_idx.is_empty() || right_idx.is_empty() {
        return Node::Leaf { proba };
    }

    Node::Split {
        feature: best.feature,
        threshold: best.threshold,
        left: Box::new(grow(x, y, weights, &left_idx, params, rng, depth + 1)),
        right: Box::new(grow(x, y, weights, &right_idx, params, rng, depth + 1)),
    }
}

/// Scan a random feature subset for the threshold minimizing weighted
/// Gini impurity. One sorted sweep with prefix sums per feature.
fn find_best_split(
    x: &Array2<f64>,
    y: &[u8],
    weights: &[f64],
    indices: &[usize],
    params: &TreeParams,
    rng: &mut StdRng,
) -> Option<BestSplit> {
    let n_features = x.ncols();
    let mut features: Vec<usize> = (0..n_features).collect();
    features.shuffle(rng);
    features.truncate(params.max_features.max(1).min(n_features));

    let mut best: Option<BestSplit> = None;

    for &feature in &features {
        let mut samples: Vec<(f64, f64, f64)> = indices
            .iter()
            .map(|&i| {
                let w = weights[i];
                (x[[i, feature]], w, if y[i] == 1 { w } else { 0.0 })
            })
            .collect();
        samples.sort_by(|a, b| a.0.total_cmp(&b.0));

        let w_total: f64 = samples.iter().map(|s| s.1).sum();
        let w_pos_total: f64 = samples.iter().map(|s| s.2).sum();

        let mut w_left = 0.0;
        let mut w_pos_left = 0.0;
        for i in 0..samples.len() - 1 {
            w_left += samples[i].1;
            w_pos_left += samples[i].2;
            // only between distinct values
            if samples[i].0 == samples[i + 1].0 {
                continue;
            }
            let w_right = w_total - w_left;
            let score = w_left * gini(w_pos_left, w_left)
                + w_right * gini(w_pos_total - w_pos_left, w_right);
            if best.as_ref().is_none_or(|b| score < b.score) {
                best = Some(BestSplit {
                    feature,
                    threshold: (samples[i].0 + samples[i + 1].0) / 2.0,
                    score,
                });
            }
        }
    }

    best
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::arr2;
    use rand::SeedableRng;

    fn params() -> TreeParams {
        TreeParams {
            max_depth: 5,
            min_samples_split: 2,
            max_features: 2,
        }
    }

    #[test]
    fn test_fits_separable_data_perfectly() {
        let x = arr2(&[[0.0, 1.0], [1.0, 0.5], [5.0, 0.2], [6.0, 0.9]]);
        let y = [0, 0, 1, 1];
        let w = [1.0; 4];
        let mut rng = StdRng::seed_from_u64(7);
        let tree = DecisionTree::fit(&x, &y, &w, &[0, 1, 2, 3], &params(), &mut rng);

        for (i, &label) in y.iter().enumerate() {
            let p = tree.predict_proba(&x.row(i).to_vec());
            assert_eq!(u8::from(p >= 0.5), label);
        }
    }

    #[test]
    fn test_pure_node_becomes_leaf() {
        let x = arr2(&[[1.0], [2.0], [3.0]]);
        let y = [1, 1, 1];
        let w = [1.0; 3];
        let mut rng = StdRng::seed_from_u64(0);
        let tree = DecisionTree::fit(&x, &y, &w, &[0, 1, 2], &params(), &mut rng);
        assert_eq!(tree.root, Node::Leaf { proba: 1.0 });
    }

    #[test]
    fn test_max_depth_zero_gives_prior() {
        let x = arr2(&[[0.0], [10.0], [20.0], [30.0]]);
        let y = [0, 0, 0, 1];
        let w = [1.0; 4];
        let p = TreeParams {
            max_depth: 0,
            ..params()
        };
        let mut rng = StdRng::seed_from_u64(0);
        let tree = DecisionTree::fit(&x, &y, &w, &[0, 1, 2, 3], &p, &mut rng);
        assert_eq!(tree.root, Node::Leaf { proba: 0.25 });
    }

    #[test]
    fn test_sample_weights_shift_leaf_probability() {
        let x = arr2(&[[0.0], [0.0]]);
        let y = [0, 1];
        // positive sample three times heavier
        let w = [1.0, 3.0];
        let mut rng = StdRng::seed_from_u64(0);
        let tree = DecisionTree::fit(&x, &y, &w, &[0, 1], &params(), &mut rng);
        // identical feature values: no split possible, weighted prior leaf
        assert_eq!(tree.root, Node::Leaf { proba: 0.75 });
    }

    #[test]
    fn test_deterministic_for_same_seed() {
        let x = arr2(&[
            [0.1, 3.0],
            [0.9, 2.0],
            [5.0, 1.0],
            [4.2, 8.0],
            [2.2, 0.3],
            [7.7, 5.5],
        ]);
        let y = [0, 0, 1, 1, 0, 1];
        let w = [1.0; 6];
        let idx = [0, 1, 2, 3, 4, 5];

        let mut rng1 = StdRng::seed_from_u64(42);
        let mut rng2 = StdRng::seed_from_u64(42);
        let t1 = DecisionTree::fit(&x, &y, &w, &idx, &params(), &mut rng1);
        let t2 = DecisionTree::fit(&x, &y, &w, &idx, &params(), &mut rng2);
        assert_eq!(t1, t2);
    }
}
