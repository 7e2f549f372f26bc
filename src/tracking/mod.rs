//! Experiment tracking for pipeline runs
//!
//! Each evaluation produces a run: hyperparameters, final metrics and
//! artifact paths, persisted through a pluggable storage backend. The
//! sink URI decides whether a model registry is available.

mod storage;

use std::collections::HashMap;

use chrono::Utc;
use serde::{Deserialize, Serialize};

pub use storage::{
    backend_for_uri, InMemoryBackend, JsonFileBackend, ModelRegistration, RegistryBackend,
    TrackingBackend, TrackingStorageError,
};

/// Errors from experiment tracking
#[derive(Debug, thiserror::Error)]
pub enum TrackingError {
    #[error("no active run; call start_run first")]
    NoActiveRun,

    #[error("run already active: {0}")]
    RunAlreadyActive(String),

    #[error("storage error: {0}")]
    Storage(#[from] TrackingStorageError),
}

/// Result alias for tracking operations
pub type Result<T> = std::result::Result<T, TrackingError>;

/// Lifecycle state of a run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunStatus {
    Running,
    Completed,
    Failed,
}

/// A single tracked run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Run {
    pub run_id: String,
    pub experiment_name: String,
    pub status: RunStatus,
    pub params: HashMap<String, String>,
    pub metrics: HashMap<String, f64>,
    pub artifacts: Vec<String>,
    pub start_time: String,
    pub end_time: Option<String>,
}

/// Tracks experiment runs against a storage backend
pub struct ExperimentTracker {
    experiment_name: String,
    backend: Box<dyn TrackingBackend>,
    active: Option<Run>,
    next_id: u64,
}

impl ExperimentTracker {
    pub fn new(experiment_name: impl Into<String>, backend: Box<dyn TrackingBackend>) -> Self {
        Self {
            experiment_name: experiment_name.into(),
            backend,
            active: None,
            next_id: 1,
        }
    }

    /// Whether the configured backend exposes a model registry
    #[must_use]
    pub fn supports_registry(&self) -> bool {
        self.backend.supports_registry()
    }

    /// Begin a new run; fails if one is already active
    pub fn start_run(&mut self) -> Result<String> {
        if let Some(run) = &self.active {
            return Err(TrackingError::RunAlreadyActive(run.run_id.clone()));
        }
        let run_id = format!("run-{:04}", self.next_id);
        self.next_id += 1;
        self.active = Some(Run {
            run_id: run_id.clone(),
            experiment_name: self.experiment_name.clone(),
            status: RunStatus::Running,
            params: HashMap::new(),
            metrics: HashMap::new(),
            artifacts: Vec::new(),
            start_time: Utc::now().to_rfc3339(),
            end_time: None,
        });
        Ok(run_id)
    }

    /// Record a hyperparameter on the active run
    pub fn log_param(&mut self, key: &str, value: impl ToString) -> Result<()> {
        let run = self.active.as_mut().ok_or(TrackingError::NoActiveRun)?;
        run.params.insert(key.to_string(), value.to_string());
        Ok(())
    }

    /// Record a final metric value on the active run
    pub fn log_metric(&mut self, key: &str, value: f64) -> Result<()> {
        let run = self.active.as_mut().ok_or(TrackingError::NoActiveRun)?;
        run.metrics.insert(key.to_string(), value);
        Ok(())
    }

    /// Record an artifact path on the active run
    pub fn log_artifact(&mut self, path: &str) -> Result<()> {
        let run = self.active.as_mut().ok_or(TrackingError::NoActiveRun)?;
        run.artifacts.push(path.to_string());
        Ok(())
    }

    /// Register a model produced by the active run. Only valid on
    /// backends whose URI scheme grants registry capability.
    pub fn register_model(&mut self, name: &str, artifact_path: &str) -> Result<()> {
        let run = self.active.as_ref().ok_or(TrackingError::NoActiveRun)?;
        let registration = ModelRegistration {
            name: name.to_string(),
            run_id: run.run_id.clone(),
            artifact_path: artifact_path.to_string(),
            registered_at: Utc::now().to_rfc3339(),
        };
        self.backend.register_model(&registration)?;
        Ok(())
    }

    /// Finish the active run with the given status and persist it
    pub fn end_run(&mut self, status: RunStatus) -> Result<Run> {
        let mut run = self.active.take().ok_or(TrackingError::NoActiveRun)?;
        run.status = status;
        run.end_time = Some(Utc::now().to_rfc3339());
        self.backend.save_run(&run)?;
        Ok(run)
    }

    /// All persisted runs for this experiment
    pub fn list_runs(&self) -> Result<Vec<Run>> {
        Ok(self.backend.list_runs()?)
    }
}
