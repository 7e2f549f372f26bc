//! Data validation stage
//!
//! Compares the ingested CSV header against the expected schema and
//! records the verdict in a status file. Missing expected columns make
//! the dataset invalid; unexpected extras are only warned about, the
//! transformation stage drops what it does not know.

use std::fs;
use std::path::Path;

use crate::cli::logging::{log, LogLevel};
use crate::config::ValidationConfig;
use crate::dataset::RawFrame;
use crate::error::Result;
use crate::schema::ChurnSchema;

/// Outcome of schema validation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationReport {
    pub valid: bool,
    pub missing: Vec<String>,
    pub extra: Vec<String>,
}

/// Run the validation stage against the ingested dataset
pub fn run(
    config: &ValidationConfig,
    dataset_path: &Path,
    level: LogLevel,
) -> Result<ValidationReport> {
    let frame = RawFrame::read_csv(dataset_path)?;
    let schema = ChurnSchema::default();
    let report = check_columns(&schema, frame.columns());

    fs::create_dir_all(&config.root_dir)?;
    let status = if report.valid { "True" } else { "False" };
    fs::write(config.status_path(), format!("Validation status: {status}"))?;

    if !report.missing.is_empty() {
        log(
            level,
            LogLevel::Normal,
            &format!("validation failed, missing columns: {:?}", report.missing),
        );
    }
    if !report.extra.is_empty() {
        log(
            level,
            LogLevel::Normal,
            &format!("warning: unexpected columns ignored: {:?}", report.extra),
        );
    }
    log(
        level,
        LogLevel::Normal,
        &format!("validation status: {status}"),
    );
    Ok(report)
}

/// Compare a header against the schema's expected column set. The
/// identifier column is known but optional; it is dropped during
/// transformation rather than required here.
#[must_use]
pub fn check_columns(schema: &ChurnSchema, columns: &[String]) -> ValidationReport {
    let expected = schema.expected_columns();
    let missing: Vec<String> = expected
        .iter()
        .filter(|e| !columns.contains(e))
        .cloned()
        .collect();
    let extra: Vec<String> = columns
        .iter()
        .filter(|c| !expected.contains(c) && c.as_str() != crate::schema::ID_COLUMN)
        .cloned()
        .collect();
    ValidationReport {
        valid: missing.is_empty(),
        missing,
        extra,
    }
}
