//! One-hot encoding with remembered category vocabularies
//!
//! Fit learns the sorted category list per column; transform emits one
//! indicator column per known category, named `<column>_<category>`.
//! Categories unseen at fit time produce an all-zero segment rather
//! than an error, matching a handle-unknown-ignore policy.

use ndarray::Array2;
use serde::{Deserialize, Serialize};

use crate::dataset::RawFrame;
use crate::error::{Error, Result};

/// Fitted one-hot encoder
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OneHotEncoder {
    /// Per encoded column: (source column name, sorted category values)
    categories: Vec<(String, Vec<String>)>,
}

impl OneHotEncoder {
    /// Learn category vocabularies for the given columns of `frame`
    pub fn fit(frame: &RawFrame, columns: &[&str]) -> Result<Self> {
        let mut categories = Vec::with_capacity(columns.len());
        for &name in columns {
            let cells = frame
                .column(name)
                .ok_or_else(|| Error::Transform(format!("categorical column {name} missing")))?;
            let mut values: Vec<String> = cells.iter().map(|c| c.to_string()).collect();
            values.sort();
            values.dedup();
            categories.push((name.to_string(), values));
        }
        Ok(Self { categories })
    }

    /// Indicator column names, `<column>_<category>`, in encoder order
    pub fn feature_names(&self) -> Vec<String> {
        self.categories
            .iter()
            .flat_map(|(col, vals)| vals.iter().map(move |v| format!("{col}_{v}")))
            .collect()
    }

    /// Source column names this encoder was fit on
    pub fn columns(&self) -> Vec<&str> {
        self.categories.iter().map(|(c, _)| c.as_str()).collect()
    }

    /// Total number of indicator columns
    pub fn width(&self) -> usize {
        self.categories.iter().map(|(_, v)| v.len()).sum()
    }

    /// Encode the fitted columns of `frame` into an indicator matrix
    pub fn transform(&self, frame: &RawFrame) -> Result<Array2<f64>> {
        let height = frame.height();
        let mut out = Array2::<f64>::zeros((height, self.width()));
        let mut offset = 0;
        for (col, values) in &self.categories {
            let cells = frame
                .column(col)
                .ok_or_else(|| Error::Transform(format!("categorical column {col} missing")))?;
            for (row, cell) in cells.iter().enumerate() {
                // unknown category: whole segment stays zero
                if let Ok(pos) = values.binary_search_by(|v| v.as_str().cmp(cell)) {
                    out[[row, offset + pos]] = 1.0;
                }
            }
            offset += values.len();
        }
        Ok(out)
    }
}
