//! Binary classification metrics for model evaluation
//!
//! Confusion counts plus accuracy, precision, recall, F1, and a
//! rank-based ROC-AUC over positive-class probabilities. Zero
//! denominators yield 0 rather than NaN.

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Binary confusion counts, positive class = 1
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ConfusionCounts {
    pub tp: usize,
    pub fp: usize,
    pub tn: usize,
    pub fn_: usize,
}

impl ConfusionCounts {
    pub fn from_predictions(y_true: &[u8], y_pred: &[u8]) -> Result<Self> {
        if y_true.len() != y_pred.len() {
            return Err(Error::Eval(format!(
                "{} labels vs {} predictions",
                y_true.len(),
                y_pred.len()
            )));
        }
        let mut counts = Self::default();
        for (&t, &p) in y_true.iter().zip(y_pred.iter()) {
            match (t, p) {
                (1, 1) => counts.tp += 1,
                (0, 1) => counts.fp += 1,
                (0, 0) => counts.tn += 1,
                (1, 0) => counts.fn_ += 1,
                _ => {
                    return Err(Error::Eval(format!(
                        "labels must be 0 or 1, got true={t} pred={p}"
                    )))
                }
            }
        }
        Ok(counts)
    }

    pub fn total(&self) -> usize {
        self.tp + self.fp + self.tn + self.fn_
    }

    pub fn accuracy(&self) -> f64 {
        let total = self.total();
        if total == 0 {
            return 0.0;
        }
        (self.tp + self.tn) as f64 / total as f64
    }

    pub fn precision(&self) -> f64 {
        let denom = self.tp + self.fp;
        if denom == 0 {
            return 0.0;
        }
        self.tp as f64 / denom as f64
    }

    pub fn recall(&self) -> f64 {
        let denom = self.tp + self.fn_;
        if denom == 0 {
            return 0.0;
        }
        self.tp as f64 / denom as f64
    }

    pub fn f1(&self) -> f64 {
        let p = self.precision();
        let r = self.recall();
        if p + r == 0.0 {
            return 0.0;
        }
        2.0 * p * r / (p + r)
    }
}

/// The five evaluation metrics persisted to `metrics.json` and logged
/// to the tracking sink. Produced once per evaluation run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricsReport {
    pub accuracy: f64,
    pub precision: f64,
    pub recall: f64,
    pub f1: f64,
    pub auc: f64,
}

impl MetricsReport {
    /// Compute all five metrics from hard predictions and positive-class
    /// probabilities
    pub fn compute(y_true: &[u8], y_pred: &[u8], proba: &[f64]) -> Result<Self> {
        let counts = ConfusionCounts::from_predictions(y_true, y_pred)?;
        Ok(Self {
            accuracy: counts.accuracy(),
            precision: counts.precision(),
            recall: counts.recall(),
            f1: counts.f1(),
            auc: roc_auc(y_true, proba)?,
        })
    }

    /// Metric names and values in a stable order
    pub fn entries(&self) -> [(&'static str, f64); 5] {
        [
            ("accuracy", self.accuracy),
            ("precision", self.precision),
            ("recall", self.recall),
            ("f1", self.f1),
            ("auc", self.auc),
        ]
    }
}

/// Area under the ROC curve via the rank-sum (Mann-Whitney) statistic,
/// with midranks for tied scores. Requires both classes present.
pub fn roc_auc(y_true: &[u8], proba: &[f64]) -> Result<f64> {
    if y_true.len() != proba.len() {
        return Err(Error::Eval(format!(
            "{} labels vs {} probabilities",
            y_true.len(),
            proba.len()
        )));
    }
    let n_pos = y_true.iter().filter(|&&t| t == 1).count();
    let n_neg = y_true.len() - n_pos;
    if n_pos == 0 || n_neg == 0 {
        return Err(Error::Eval(
            "ROC-AUC undefined: test set contains a single class".into(),
        ));
    }

    let mut order: Vec<usize> = (0..proba.len()).collect();
    order.sort_by(|&a, &b| proba[a].total_cmp(&proba[b]));

    // midranks over tied scores
    let mut rank_sum_pos = 0.0;
    let mut i = 0;
    while i < order.len() {
        let mut j = i;
        while j + 1 < order.len() && proba[order[j + 1]] == proba[order[i]] {
            j += 1;
        }
        let midrank = (i + j) as f64 / 2.0 + 1.0;
        for &idx in &order[i..=j] {
            if y_true[idx] == 1 {
                rank_sum_pos += midrank;
            }
        }
        i = j + 1;
    }

    let n_pos_f = n_pos as f64;
    let n_neg_f = n_neg as f64;
    Ok((rank_sum_pos - n_pos_f * (n_pos_f + 1.0) / 2.0) / (n_pos_f * n_neg_f))
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_confusion_counts() {
        let y_true = [1, 0, 1, 1, 0, 0];
        let y_pred = [1, 0, 0, 1, 1, 0];
        let c = ConfusionCounts::from_predictions(&y_true, &y_pred).unwrap();
        assert_eq!(c.tp, 2);
        assert_eq!(c.fp, 1);
        assert_eq!(c.tn, 2);
        assert_eq!(c.fn_, 1);
    }

    #[test]
    fn test_metric_reference_values() {
        // sklearn: accuracy 0.6667, precision 0.6667, recall 0.6667
        let y_true = [1, 0, 1, 1, 0, 0];
        let y_pred = [1, 0, 0, 1, 1, 0];
        let c = ConfusionCounts::from_predictions(&y_true, &y_pred).unwrap();
        assert_relative_eq!(c.accuracy(), 4.0 / 6.0);
        assert_relative_eq!(c.precision(), 2.0 / 3.0);
        assert_relative_eq!(c.recall(), 2.0 / 3.0);
        assert_relative_eq!(c.f1(), 2.0 / 3.0);
    }

    #[test]
    fn test_zero_denominators_give_zero() {
        // never predicts positive
        let c = ConfusionCounts::from_predictions(&[1, 0], &[0, 0]).unwrap();
        assert_eq!(c.precision(), 0.0);
        assert_eq!(c.f1(), 0.0);
    }

    #[test]
    fn test_length_mismatch_rejected() {
        assert!(ConfusionCounts::from_predictions(&[1], &[1, 0]).is_err());
    }

    #[test]
    fn test_non_binary_label_rejected() {
        assert!(ConfusionCounts::from_predictions(&[2], &[1]).is_err());
    }

    #[test]
    fn test_auc_perfect_separation() {
        let y_true = [0, 0, 1, 1];
        let proba = [0.1, 0.2, 0.8, 0.9];
        assert_relative_eq!(roc_auc(&y_true, &proba).unwrap(), 1.0);
    }

    #[test]
    fn test_auc_reversed_separation() {
        let y_true = [1, 1, 0, 0];
        let proba = [0.1, 0.2, 0.8, 0.9];
        assert_relative_eq!(roc_auc(&y_true, &proba).unwrap(), 0.0);
    }

    #[test]
    fn test_auc_with_ties() {
        // sklearn: roc_auc_score([0, 1, 0, 1], [0.5, 0.5, 0.2, 0.8]) = 0.875
        let y_true = [0, 1, 0, 1];
        let proba = [0.5, 0.5, 0.2, 0.8];
        assert_relative_eq!(roc_auc(&y_true, &proba).unwrap(), 0.875);
    }

    #[test]
    fn test_auc_single_class_rejected() {
        assert!(roc_auc(&[1, 1], &[0.5, 0.6]).is_err());
    }

    #[test]
    fn test_report_entries_order() {
        let y_true = [0, 1, 0, 1];
        let y_pred = [0, 1, 1, 1];
        let proba = [0.2, 0.9, 0.6, 0.7];
        let report = MetricsReport::compute(&y_true, &y_pred, &proba).unwrap();
        let names: Vec<&str> = report.entries().iter().map(|(n, _)| *n).collect();
        assert_eq!(names, vec!["accuracy", "precision", "recall", "f1", "auc"]);
        for (_, v) in report.entries() {
            assert!((0.0..=1.0).contains(&v));
        }
    }
}
