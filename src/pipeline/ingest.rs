//! Data ingestion stage
//!
//! Copies the configured source CSV into the stage's artifact
//! directory under the canonical name `Churn.csv`. Re-running the
//! stage overwrites the previous copy.

use std::fs;

use crate::cli::logging::{log, LogLevel};
use crate::config::IngestionConfig;
use crate::error::{Error, Result};

/// Run the ingestion stage; returns the path of the ingested dataset
pub fn run(config: &IngestionConfig, level: LogLevel) -> Result<std::path::PathBuf> {
    if !config.source_path.exists() {
        return Err(Error::MissingInput(config.source_path.clone()));
    }
    fs::create_dir_all(&config.root_dir)?;

    let dest = config.dataset_path();
    fs::copy(&config.source_path, &dest)?;
    log(
        level,
        LogLevel::Normal,
        &format!(
            "ingested {} -> {}",
            config.source_path.display(),
            dest.display()
        ),
    );
    Ok(dest)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ingest_copies_source() {
        let dir = tempfile::tempdir().unwrap();
        let source = dir.path().join("raw.csv");
        std::fs::write(&source, "a,b\n1,2\n").unwrap();

        let config = IngestionConfig {
            source_path: source,
            root_dir: dir.path().join("ingested"),
        };
        let dest = run(&config, LogLevel::Quiet).unwrap();
        assert_eq!(std::fs::read_to_string(dest).unwrap(), "a,b\n1,2\n");
    }

    #[test]
    fn test_ingest_overwrites_previous_copy() {
        let dir = tempfile::tempdir().unwrap();
        let source = dir.path().join("raw.csv");
        let config = IngestionConfig {
            source_path: source.clone(),
            root_dir: dir.path().join("ingested"),
        };

        std::fs::write(&source, "a\n1\n").unwrap();
        run(&config, LogLevel::Quiet).unwrap();
        std::fs::write(&source, "a\n2\n").unwrap();
        let dest = run(&config, LogLevel::Quiet).unwrap();
        assert_eq!(std::fs::read_to_string(dest).unwrap(), "a\n2\n");
    }

    #[test]
    fn test_missing_source_is_typed_error() {
        let dir = tempfile::tempdir().unwrap();
        let config = IngestionConfig {
            source_path: dir.path().join("absent.csv"),
            root_dir: dir.path().join("ingested"),
        };
        assert!(matches!(
            run(&config, LogLevel::Quiet),
            Err(Error::MissingInput(_))
        ));
    }
}
