//! Median imputation for missing numeric values

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Fitted median imputer over named numeric columns
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MedianImputer {
    columns: Vec<String>,
    medians: Vec<f64>,
}

/// Median of the finite values in a slice; 0 when none are finite
pub fn median(values: &[f64]) -> f64 {
    let mut present: Vec<f64> = values.iter().copied().filter(|v| v.is_finite()).collect();
    if present.is_empty() {
        return 0.0;
    }
    present.sort_by(|a, b| a.total_cmp(b));
    let mid = present.len() / 2;
    if present.len() % 2 == 0 {
        (present[mid - 1] + present[mid]) / 2.0
    } else {
        present[mid]
    }
}

impl MedianImputer {
    /// Learn per-column medians, ignoring NaN cells
    pub fn fit(columns: &[(&str, &[f64])]) -> Self {
        let mut names = Vec::with_capacity(columns.len());
        let mut medians = Vec::with_capacity(columns.len());
        for &(name, values) in columns {
            names.push(name.to_string());
            medians.push(median(values));
        }
        Self {
            columns: names,
            medians,
        }
    }

    pub fn columns(&self) -> Vec<&str> {
        self.columns.iter().map(String::as_str).collect()
    }

    pub fn medians(&self) -> &[f64] {
        &self.medians
    }

    /// Replace NaN cells of one column with its fitted median
    pub fn transform_column(&self, name: &str, values: &mut [f64]) -> Result<()> {
        let idx = self
            .columns
            .iter()
            .position(|c| c == name)
            .ok_or_else(|| Error::Transform(format!("column {name} not seen at fit time")))?;
        for v in values.iter_mut() {
            if !v.is_finite() {
                *v = self.medians[idx];
            }
        }
        Ok(())
    }
}
