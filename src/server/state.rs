//! Shared server state: the loaded model and the training job table

use std::collections::HashMap;
use std::sync::{Arc, Mutex, RwLock};

use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::config::PipelineConfig;
use crate::predict::PredictionPipeline;

/// Lifecycle of a submitted training job
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JobStatus {
    Queued,
    Running,
    Succeeded,
    Failed,
}

impl JobStatus {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Queued => "queued",
            Self::Running => "running",
            Self::Succeeded => "succeeded",
            Self::Failed => "failed",
        }
    }
}

/// One training job's record
#[derive(Debug, Clone)]
pub struct JobRecord {
    pub job_id: String,
    pub status: JobStatus,
    pub submitted_at: String,
    pub finished_at: Option<String>,
    pub error: Option<String>,
}

impl JobRecord {
    fn new(job_id: String) -> Self {
        Self {
            job_id,
            status: JobStatus::Queued,
            submitted_at: Utc::now().to_rfc3339(),
            finished_at: None,
            error: None,
        }
    }
}

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub config: PipelineConfig,
    /// None until a model artifact exists; refreshed after each
    /// successful training job
    model: Arc<RwLock<Option<PredictionPipeline>>>,
    jobs: Arc<Mutex<HashMap<String, JobRecord>>>,
    next_job: Arc<Mutex<u64>>,
}

impl AppState {
    /// Build state, loading the model artifact if one already exists
    #[must_use]
    pub fn new(config: PipelineConfig) -> Self {
        let model = PredictionPipeline::load(config.trainer.model_path()).ok();
        Self {
            config,
            model: Arc::new(RwLock::new(model)),
            jobs: Arc::new(Mutex::new(HashMap::new())),
            next_job: Arc::new(Mutex::new(1)),
        }
    }

    pub fn model_loaded(&self) -> bool {
        self.model.read().map(|m| m.is_some()).unwrap_or(false)
    }

    /// Run `f` against the loaded model, if any
    pub fn with_model<R>(&self, f: impl FnOnce(&PredictionPipeline) -> R) -> Option<R> {
        match self.model.read() {
            Ok(guard) => guard.as_ref().map(f),
            Err(_) => None,
        }
    }

    /// Replace the served model after a successful training run
    pub fn reload_model(&self) {
        let fresh = PredictionPipeline::load(self.config.trainer.model_path()).ok();
        if let Ok(mut guard) = self.model.write() {
            *guard = fresh;
        }
    }

    /// Create a queued job record and return its ID
    pub fn submit_job(&self) -> String {
        let job_id = {
            let mut counter = match self.next_job.lock() {
                Ok(c) => c,
                Err(poisoned) => poisoned.into_inner(),
            };
            let id = format!("job-{:04}", *counter);
            *counter += 1;
            id
        };
        if let Ok(mut jobs) = self.jobs.lock() {
            jobs.insert(job_id.clone(), JobRecord::new(job_id.clone()));
        }
        job_id
    }

    pub fn set_job_status(&self, job_id: &str, status: JobStatus, error: Option<String>) {
        if let Ok(mut jobs) = self.jobs.lock() {
            if let Some(record) = jobs.get_mut(job_id) {
                record.status = status;
                record.error = error;
                if matches!(status, JobStatus::Succeeded | JobStatus::Failed) {
                    record.finished_at = Some(Utc::now().to_rfc3339());
                }
            }
        }
    }

    pub fn job(&self, job_id: &str) -> Option<JobRecord> {
        self.jobs.lock().ok()?.get(job_id).cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_job_lifecycle() {
        let state = AppState::new(PipelineConfig::default());
        let id = state.submit_job();
        assert_eq!(state.job(&id).unwrap().status, JobStatus::Queued);

        state.set_job_status(&id, JobStatus::Running, None);
        let record = state.job(&id).unwrap();
        assert_eq!(record.status, JobStatus::Running);
        assert!(record.finished_at.is_none());

        state.set_job_status(&id, JobStatus::Failed, Some("boom".into()));
        let record = state.job(&id).unwrap();
        assert_eq!(record.status, JobStatus::Failed);
        assert_eq!(record.error.as_deref(), Some("boom"));
        assert!(record.finished_at.is_some());
    }

    #[test]
    fn test_job_ids_unique() {
        let state = AppState::new(PipelineConfig::default());
        let a = state.submit_job();
        let b = state.submit_job();
        assert_ne!(a, b);
    }

    #[test]
    fn test_unknown_job_is_none() {
        let state = AppState::new(PipelineConfig::default());
        assert!(state.job("job-9999").is_none());
    }

    #[test]
    fn test_no_model_until_trained() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = PipelineConfig::default();
        config.trainer.root_dir = dir.path().join("trained");
        let state = AppState::new(config);
        assert!(!state.model_loaded());
        assert!(state.with_model(|_| ()).is_none());
    }
}
