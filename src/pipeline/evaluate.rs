//! Model evaluation stage
//!
//! Scores the trained artifact on the held-out test checkpoint, writes
//! `metrics.json`, and records the run (hyperparameters, metrics,
//! artifact paths) in the tracking sink. Model registration happens
//! only when the sink's URI scheme grants registry capability.

use std::fs;

use crate::cli::logging::{log, LogLevel};
use crate::config::{EvaluationConfig, TrainerConfig, TransformationConfig};
use crate::dataset::NumericFrame;
use crate::error::{Error, Result};
use crate::eval::MetricsReport;
use crate::model::ChurnModel;
use crate::tracking::{backend_for_uri, ExperimentTracker, RunStatus};
use crate::schema::TARGET_COLUMN;

/// Run the evaluation stage; returns the computed metrics
pub fn run(
    config: &EvaluationConfig,
    trainer: &TrainerConfig,
    transformation: &TransformationConfig,
    level: LogLevel,
) -> Result<MetricsReport> {
    let model = ChurnModel::load(trainer.model_path())?;
    let (test_x, test_y) =
        NumericFrame::read_csv_with_target(transformation.test_path(), TARGET_COLUMN)?;

    let features = model.reconcile(&test_x);
    let proba = model.forest.predict_proba(&features).map_err(map_eval)?;
    let predicted = model.forest.predict(&features).map_err(map_eval)?;
    let truth: Vec<u8> = test_y.iter().copied().collect();

    let report = MetricsReport::compute(&truth, &predicted, &proba)?;
    fs::create_dir_all(&config.root_dir)?;
    fs::write(
        config.metrics_path(),
        serde_json::to_string_pretty(&report)?,
    )?;
    log(
        level,
        LogLevel::Normal,
        &format!(
            "evaluation: accuracy {:.4}, f1 {:.4}, auc {:.4}",
            report.accuracy, report.f1, report.auc
        ),
    );

    let backend = backend_for_uri(&config.tracking_uri, config.runs_dir());
    let mut tracker = ExperimentTracker::new(config.experiment_name.clone(), backend);
    tracker.start_run()?;
    for (key, value) in model.forest.params().entries() {
        tracker.log_param(key, value)?;
    }
    for (key, value) in report.entries() {
        tracker.log_metric(key, value)?;
    }
    tracker.log_artifact(&trainer.model_path().display().to_string())?;
    tracker.log_artifact(&config.metrics_path().display().to_string())?;

    if tracker.supports_registry() {
        tracker.register_model(
            &config.registered_model_name,
            &trainer.model_path().display().to_string(),
        )?;
        log(
            level,
            LogLevel::Normal,
            &format!("registered model {}", config.registered_model_name),
        );
    }
    tracker.end_run(RunStatus::Completed)?;
    Ok(report)
}

fn map_eval(e: Error) -> Error {
    Error::Eval(e.to_string())
}
