//! Desgaste: a file-checkpointed churn-prediction pipeline
//!
//! Five sequential stages turn a raw telecom-churn CSV into a trained,
//! evaluated random-forest model, each stage reading files the previous
//! one wrote:
//!
//! 1. **Ingestion** copies the source dataset into the artifacts tree
//! 2. **Validation** checks the header against the fixed schema and
//!    gates the rest of the pipeline
//! 3. **Transformation** engineers features (coercion, imputation,
//!    one-hot encoding, standardization) and writes a stratified
//!    train/test split
//! 4. **Training** fits the forest and saves a single JSON artifact
//!    holding the model, the fitted feature pipeline, and the schema
//! 5. **Evaluation** scores the held-out split, writes `metrics.json`,
//!    and records the run in the tracking sink
//!
//! Prediction serving loads the artifact once and re-applies the
//! training-time feature pipeline verbatim to each record. The
//! optional `server` feature adds an HTTP boundary with inline
//! prediction and job-based training.
//!
//! # Example
//!
//! ```no_run
//! use desgaste::cli::logging::LogLevel;
//! use desgaste::config::PipelineConfig;
//! use desgaste::pipeline::run_pipeline;
//!
//! let config = PipelineConfig::default();
//! let metrics = run_pipeline(&config, LogLevel::Normal)?;
//! println!("test accuracy: {:.4}", metrics.accuracy);
//! # Ok::<(), desgaste::error::Error>(())
//! ```

pub mod cli;
pub mod config;
pub mod dataset;
pub mod error;
pub mod eval;
pub mod model;
pub mod pipeline;
pub mod predict;
pub mod preprocess;
pub mod schema;
pub mod server;
pub mod tracking;

pub use error::{Error, Result};
