//! Tracking storage backends
//!
//! The `TrackingBackend` trait abstracts where experiment runs are
//! persisted. `JsonFileBackend` stores one JSON file per run and is
//! what a `file://` sink URI resolves to; `RegistryBackend` wraps it
//! with model-registry capability for networked URI schemes;
//! `InMemoryBackend` backs the tests.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use super::Run;

/// Errors from tracking storage operations
#[derive(Debug, thiserror::Error)]
pub enum TrackingStorageError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("run not found: {0}")]
    RunNotFound(String),

    #[error("unsupported tracking URI: {0}")]
    UnsupportedUri(String),
}

/// Result alias for tracking storage operations
pub type Result<T> = std::result::Result<T, TrackingStorageError>;

/// A registered model entry kept alongside the runs
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelRegistration {
    pub name: String,
    pub run_id: String,
    pub artifact_path: String,
    pub registered_at: String,
}

/// Trait for tracking storage backends
pub trait TrackingBackend: Send {
    /// Persist a finished run
    fn save_run(&mut self, run: &Run) -> Result<()>;

    /// Load a run by its ID
    fn load_run(&self, run_id: &str) -> Result<Run>;

    /// List all stored runs
    fn list_runs(&self) -> Result<Vec<Run>>;

    /// Whether this backend exposes a model registry. Mirrors the
    /// branch on the tracking URI scheme: plain file stores do not
    /// register models, networked stores do.
    fn supports_registry(&self) -> bool {
        false
    }

    /// Record a model registration; a no-op error for backends without
    /// a registry
    fn register_model(&mut self, registration: &ModelRegistration) -> Result<()> {
        let _ = registration;
        Err(TrackingStorageError::UnsupportedUri(
            "backend has no model registry".into(),
        ))
    }
}

/// JSON file-based tracking backend: `{run_id}.json` per run
#[derive(Debug)]
pub struct JsonFileBackend {
    dir: PathBuf,
}

impl JsonFileBackend {
    pub fn new(dir: impl AsRef<Path>) -> Self {
        Self {
            dir: dir.as_ref().to_path_buf(),
        }
    }

    fn run_path(&self, run_id: &str) -> PathBuf {
        self.dir.join(format!("{run_id}.json"))
    }

    fn ensure_dir(&self) -> Result<()> {
        if !self.dir.exists() {
            fs::create_dir_all(&self.dir)?;
        }
        Ok(())
    }
}

impl TrackingBackend for JsonFileBackend {
    fn save_run(&mut self, run: &Run) -> Result<()> {
        self.ensure_dir()?;
        let json = serde_json::to_string_pretty(run)?;
        fs::write(self.run_path(&run.run_id), json)?;
        Ok(())
    }

    fn load_run(&self, run_id: &str) -> Result<Run> {
        let path = self.run_path(run_id);
        if !path.exists() {
            return Err(TrackingStorageError::RunNotFound(run_id.to_string()));
        }
        let json = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&json)?)
    }

    fn list_runs(&self) -> Result<Vec<Run>> {
        if !self.dir.exists() {
            return Ok(Vec::new());
        }
        let mut runs = Vec::new();
        for entry in fs::read_dir(&self.dir)? {
            let path = entry?.path();
            if path.extension().and_then(|e| e.to_str()) == Some("json")
                && path
                    .file_stem()
                    .and_then(|s| s.to_str())
                    .is_some_and(|s| s.starts_with("run-"))
            {
                let json = fs::read_to_string(&path)?;
                runs.push(serde_json::from_str(&json)?);
            }
        }
        runs.sort_by(|a: &Run, b: &Run| a.run_id.cmp(&b.run_id));
        Ok(runs)
    }
}

/// File-backed store with a model registry, used for networked URI
/// schemes. Registrations land in `registry.json` next to the runs.
#[derive(Debug)]
pub struct RegistryBackend {
    inner: JsonFileBackend,
    registry_path: PathBuf,
}

impl RegistryBackend {
    pub fn new(dir: impl AsRef<Path>) -> Self {
        Self {
            inner: JsonFileBackend::new(dir.as_ref()),
            registry_path: dir.as_ref().join("registry.json"),
        }
    }

    /// All recorded registrations, oldest first
    pub fn registrations(&self) -> Result<Vec<ModelRegistration>> {
        if !self.registry_path.exists() {
            return Ok(Vec::new());
        }
        let json = fs::read_to_string(&self.registry_path)?;
        Ok(serde_json::from_str(&json)?)
    }
}

impl TrackingBackend for RegistryBackend {
    fn save_run(&mut self, run: &Run) -> Result<()> {
        self.inner.save_run(run)
    }

    fn load_run(&self, run_id: &str) -> Result<Run> {
        self.inner.load_run(run_id)
    }

    fn list_runs(&self) -> Result<Vec<Run>> {
        self.inner.list_runs()
    }

    fn supports_registry(&self) -> bool {
        true
    }

    fn register_model(&mut self, registration: &ModelRegistration) -> Result<()> {
        self.inner.ensure_dir()?;
        let mut all = self.registrations()?;
        all.push(registration.clone());
        fs::write(&self.registry_path, serde_json::to_string_pretty(&all)?)?;
        Ok(())
    }
}

/// In-memory tracking backend for testing
#[derive(Debug, Default)]
pub struct InMemoryBackend {
    runs: HashMap<String, Run>,
}

impl InMemoryBackend {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl TrackingBackend for InMemoryBackend {
    fn save_run(&mut self, run: &Run) -> Result<()> {
        self.runs.insert(run.run_id.clone(), run.clone());
        Ok(())
    }

    fn load_run(&self, run_id: &str) -> Result<Run> {
        self.runs
            .get(run_id)
            .cloned()
            .ok_or_else(|| TrackingStorageError::RunNotFound(run_id.to_string()))
    }

    fn list_runs(&self) -> Result<Vec<Run>> {
        let mut runs: Vec<Run> = self.runs.values().cloned().collect();
        runs.sort_by(|a, b| a.run_id.cmp(&b.run_id));
        Ok(runs)
    }
}

/// Resolve a tracking sink URI to a backend. The scheme decides the
/// behavior: `file://<dir>` (or a bare path) stores runs without a
/// registry; any other scheme gets registry capability, with runs
/// mirrored under `local_dir`.
pub fn backend_for_uri(uri: &str, local_dir: impl AsRef<Path>) -> Box<dyn TrackingBackend> {
    match uri.split_once("://") {
        Some(("file", path)) if !path.is_empty() => Box::new(JsonFileBackend::new(path)),
        Some(("file", _)) | None => Box::new(JsonFileBackend::new(local_dir.as_ref())),
        Some(_) => Box::new(RegistryBackend::new(local_dir.as_ref())),
    }
}
