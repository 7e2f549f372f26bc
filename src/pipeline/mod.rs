//! The five pipeline stages and their orchestrator
//!
//! Each stage is file-to-file and re-runnable; `run_pipeline` wires
//! them strictly in order. Validation gates transformation: an invalid
//! schema report aborts the run instead of letting downstream stages
//! fail obscurely.

pub mod evaluate;
pub mod ingest;
pub mod train;
pub mod transform;
pub mod validate;

pub use validate::ValidationReport;

use crate::cli::logging::{log, LogLevel};
use crate::config::PipelineConfig;
use crate::error::{Error, Result};
use crate::eval::MetricsReport;

/// Run all five stages in order; returns the final metrics
pub fn run_pipeline(config: &PipelineConfig, level: LogLevel) -> Result<MetricsReport> {
    config.validate()?;

    log(level, LogLevel::Normal, ">>> stage: data ingestion");
    let dataset = ingest::run(&config.ingestion, level)?;

    log(level, LogLevel::Normal, ">>> stage: data validation");
    let report = validate::run(&config.validation, &dataset, level)?;
    if !report.valid {
        return Err(Error::SchemaMismatch {
            missing: report.missing,
        });
    }

    log(level, LogLevel::Normal, ">>> stage: data transformation");
    transform::run(&config.transformation, &dataset, level)?;

    log(level, LogLevel::Normal, ">>> stage: model training");
    train::run(&config.trainer, &config.transformation, level)?;

    log(level, LogLevel::Normal, ">>> stage: model evaluation");
    evaluate::run(
        &config.evaluation,
        &config.trainer,
        &config.transformation,
        level,
    )
}
