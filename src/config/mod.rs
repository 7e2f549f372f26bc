//! Pipeline configuration
//!
//! One YAML file describes every stage. Each stage receives its own
//! typed, immutable section; `Default` impls encode the canonical
//! artifacts layout so a bare `PipelineConfig::default()` runs the
//! whole pipeline under `artifacts/`.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Ingestion stage: where the source CSV lives and where the canonical
/// copy lands
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct IngestionConfig {
    pub source_path: PathBuf,
    pub root_dir: PathBuf,
}

impl Default for IngestionConfig {
    fn default() -> Self {
        Self {
            source_path: PathBuf::from("data/Churn.csv"),
            root_dir: PathBuf::from("artifacts/data_ingestion"),
        }
    }
}

impl IngestionConfig {
    /// Canonical path of the ingested dataset
    #[must_use]
    pub fn dataset_path(&self) -> PathBuf {
        self.root_dir.join("Churn.csv")
    }
}

/// Validation stage: where the status file is written
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ValidationConfig {
    pub root_dir: PathBuf,
    pub status_file: String,
}

impl Default for ValidationConfig {
    fn default() -> Self {
        Self {
            root_dir: PathBuf::from("artifacts/data_validation"),
            status_file: String::from("status.txt"),
        }
    }
}

impl ValidationConfig {
    #[must_use]
    pub fn status_path(&self) -> PathBuf {
        self.root_dir.join(&self.status_file)
    }
}

/// Transformation stage: split ratio, seed, output locations
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TransformationConfig {
    pub root_dir: PathBuf,
    pub test_ratio: f64,
    pub seed: u64,
}

impl Default for TransformationConfig {
    fn default() -> Self {
        Self {
            root_dir: PathBuf::from("artifacts/data_transformation"),
            test_ratio: 0.2,
            seed: 42,
        }
    }
}

impl TransformationConfig {
    #[must_use]
    pub fn train_path(&self) -> PathBuf {
        self.root_dir.join("train.csv")
    }

    #[must_use]
    pub fn test_path(&self) -> PathBuf {
        self.root_dir.join("test.csv")
    }

    /// Fitted preprocessing state, handed to the training stage
    #[must_use]
    pub fn pipeline_path(&self) -> PathBuf {
        self.root_dir.join("feature_pipeline.json")
    }
}

/// Training stage: forest hyperparameters and artifact location
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TrainerConfig {
    pub root_dir: PathBuf,
    pub model_file: String,
    pub n_trees: usize,
    pub max_depth: usize,
    pub min_samples_split: usize,
    pub seed: u64,
    pub balanced: bool,
}

impl Default for TrainerConfig {
    fn default() -> Self {
        Self {
            root_dir: PathBuf::from("artifacts/model_trainer"),
            model_file: String::from("model.json"),
            n_trees: 200,
            max_depth: 10,
            min_samples_split: 2,
            seed: 42,
            balanced: true,
        }
    }
}

impl TrainerConfig {
    #[must_use]
    pub fn model_path(&self) -> PathBuf {
        self.root_dir.join(&self.model_file)
    }

    #[must_use]
    pub fn forest_params(&self) -> crate::model::ForestParams {
        crate::model::ForestParams {
            n_trees: self.n_trees,
            max_depth: self.max_depth,
            min_samples_split: self.min_samples_split,
            seed: self.seed,
            balanced: self.balanced,
        }
    }
}

/// Evaluation stage: metrics output and tracking sink
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EvaluationConfig {
    pub root_dir: PathBuf,
    pub metrics_file: String,
    pub tracking_uri: String,
    pub experiment_name: String,
    pub registered_model_name: String,
}

impl Default for EvaluationConfig {
    fn default() -> Self {
        Self {
            root_dir: PathBuf::from("artifacts/model_evaluation"),
            metrics_file: String::from("metrics.json"),
            tracking_uri: String::from("file://artifacts/model_evaluation/runs"),
            experiment_name: String::from("churn"),
            registered_model_name: String::from("ChurnModel"),
        }
    }
}

impl EvaluationConfig {
    #[must_use]
    pub fn metrics_path(&self) -> PathBuf {
        self.root_dir.join(&self.metrics_file)
    }

    /// Local directory for run records when the sink URI is not a
    /// plain file path
    #[must_use]
    pub fn runs_dir(&self) -> PathBuf {
        self.root_dir.join("runs")
    }
}

/// Server section, read even when the binary is built without the
/// `server` feature so one YAML file covers both builds
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: String::from("0.0.0.0"),
            port: 8080,
        }
    }
}

/// Full pipeline configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    pub ingestion: IngestionConfig,
    pub validation: ValidationConfig,
    pub transformation: TransformationConfig,
    pub trainer: TrainerConfig,
    pub evaluation: EvaluationConfig,
    pub server: ServerConfig,
}

impl PipelineConfig {
    /// Check value ranges once at load time
    pub fn validate(&self) -> Result<()> {
        let t = &self.transformation;
        if !(t.test_ratio > 0.0 && t.test_ratio < 1.0) {
            return Err(Error::Config(format!(
                "test_ratio must be in (0, 1), got {}",
                t.test_ratio
            )));
        }
        if self.trainer.n_trees == 0 {
            return Err(Error::Config("n_trees must be positive".into()));
        }
        if self.trainer.min_samples_split < 2 {
            return Err(Error::Config(format!(
                "min_samples_split must be at least 2, got {}",
                self.trainer.min_samples_split
            )));
        }
        if self.evaluation.tracking_uri.is_empty() {
            return Err(Error::Config("tracking_uri must not be empty".into()));
        }
        Ok(())
    }
}

/// Load and validate a pipeline configuration from a YAML file.
/// Missing sections and fields fall back to their defaults.
pub fn load_config(path: impl AsRef<Path>) -> Result<PipelineConfig> {
    let path = path.as_ref();
    let yaml = std::fs::read_to_string(path)
        .map_err(|e| Error::Config(format!("cannot read {}: {e}", path.display())))?;
    let config: PipelineConfig =
        serde_yaml::from_str(&yaml).map_err(|e| Error::Config(format!("invalid YAML: {e}")))?;
    config.validate()?;
    Ok(config)
}
