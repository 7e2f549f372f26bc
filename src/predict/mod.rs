//! Prediction serving
//!
//! Loads the model artifact once and scores single records. The fitted
//! feature pipeline persisted at training time is re-applied verbatim:
//! same coercion, same imputation medians, same encoder vocabularies,
//! same scaler statistics. Nothing is refit per request.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::dataset::RawFrame;
use crate::error::{Error, Result};
use crate::model::ChurnModel;
use crate::preprocess;
use crate::schema;

/// Label returned for a positive prediction
pub const CHURN_LABEL: &str = "Will Churn";
/// Label returned for a negative prediction
pub const NO_CHURN_LABEL: &str = "Will Not Churn";

/// One raw input record: the 19 schema columns as strings, in schema
/// order. Numeric fields arrive as strings too, matching the raw CSV.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawRecord {
    pub values: Vec<String>,
}

/// Outcome of scoring one record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Prediction {
    pub label: String,
    pub churn_probability: f64,
}

/// Stateless-per-call prediction service over a loaded artifact
pub struct PredictionPipeline {
    model: ChurnModel,
}

impl PredictionPipeline {
    /// Load the artifact once; every `predict` call reuses it
    pub fn load(artifact_path: impl AsRef<Path>) -> Result<Self> {
        let model = ChurnModel::load(artifact_path)?;
        Ok(Self { model })
    }

    #[must_use]
    pub fn from_model(model: ChurnModel) -> Self {
        Self { model }
    }

    /// Score one raw record and map the class to its display label
    pub fn predict(&self, record: &RawRecord) -> Result<Prediction> {
        let frame = self.record_frame(record)?;
        let engineered = self.model.pipeline.transform(&frame)?;
        let features = self.model.reconcile(&engineered);
        let proba = self
            .model
            .forest
            .predict_proba(&features)
            .map_err(|e| Error::Prediction(e.to_string()))?;
        let p = proba
            .first()
            .copied()
            .ok_or_else(|| Error::Prediction("empty prediction output".into()))?;
        let label = if p >= 0.5 { CHURN_LABEL } else { NO_CHURN_LABEL };
        Ok(Prediction {
            label: label.to_string(),
            churn_probability: p,
        })
    }

    /// Build a one-row frame in schema column order, applying the
    /// training-time coercion to the same columns
    fn record_frame(&self, record: &RawRecord) -> Result<RawFrame> {
        let schema = &self.model.schema;
        if record.values.len() != schema.len() {
            return Err(Error::Prediction(format!(
                "expected {} values, got {}",
                schema.len(),
                record.values.len()
            )));
        }
        let columns: Vec<String> = schema.column_names().iter().map(|c| c.to_string()).collect();
        let mut frame = RawFrame::new(columns, vec![record.values.clone()])?;
        preprocess::coerce_to_numeric(&mut frame, schema::TOTAL_CHARGES);
        Ok(frame)
    }

    #[must_use]
    pub fn model(&self) -> &ChurnModel {
        &self.model
    }
}
