//! Crate-wide error taxonomy
//!
//! One fatal error per failed stage; no retries, no partial-success
//! states anywhere in the pipeline.

use std::path::PathBuf;

/// Errors raised by pipeline stages and the serving path
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Configured source dataset absent at ingestion
    #[error("source dataset not found at {0}")]
    MissingInput(PathBuf),

    /// Schema validation failed and gated the pipeline
    #[error("schema validation failed, missing columns: {missing:?}")]
    SchemaMismatch { missing: Vec<String> },

    #[error("transformation error: {0}")]
    Transform(String),

    #[error("training error: {0}")]
    Train(String),

    #[error("evaluation error: {0}")]
    Eval(String),

    #[error("prediction error: {0}")]
    Prediction(String),

    #[error("config error: {0}")]
    Config(String),

    #[error("tracking error: {0}")]
    Tracking(#[from] crate::tracking::TrackingError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result alias for pipeline operations
pub type Result<T> = std::result::Result<T, Error>;
