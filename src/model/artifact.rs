//! The persisted model artifact
//!
//! One JSON document owning everything inference needs: the fitted
//! forest, the ordered training-time feature names, the fitted feature
//! pipeline (imputer medians, encoder vocabularies, scaler statistics),
//! and the schema. Written once by the training stage; read-only to
//! evaluation and prediction.

use std::fs;
use std::path::Path;

use ndarray::Array2;
use serde::{Deserialize, Serialize};

use super::forest::RandomForestClassifier;
use crate::dataset::NumericFrame;
use crate::error::Result;
use crate::preprocess::FittedFeaturePipeline;
use crate::schema::ChurnSchema;

/// Serialized model artifact
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChurnModel {
    pub forest: RandomForestClassifier,
    /// Engineered column names the forest was trained on, in order
    pub feature_names: Vec<String>,
    pub pipeline: FittedFeaturePipeline,
    pub schema: ChurnSchema,
}

impl ChurnModel {
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        if let Some(parent) = path.as_ref().parent() {
            fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string(self)?;
        fs::write(path.as_ref(), json)?;
        Ok(())
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let json = fs::read_to_string(path.as_ref())?;
        Ok(serde_json::from_str(&json)?)
    }

    /// Reconcile an engineered frame against the training-time feature
    /// list: expected columns absent from the frame are filled with
    /// zeros, extra columns are dropped, and the output order exactly
    /// matches `feature_names`. With the shared fitted pipeline this is
    /// a no-op reorder; it remains as a guard against artifact drift.
    pub fn reconcile(&self, frame: &NumericFrame) -> Array2<f64> {
        let height = frame.height();
        let mut out = Array2::<f64>::zeros((height, self.feature_names.len()));
        for (c, name) in self.feature_names.iter().enumerate() {
            if let Some(src) = frame.columns.iter().position(|col| col == name) {
                for r in 0..height {
                    out[[r, c]] = frame.data[[r, src]];
                }
            }
        }
        out
    }
}
