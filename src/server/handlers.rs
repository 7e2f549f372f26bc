//! Axum handlers and router for the serving API

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};

use crate::cli::logging::{log, LogLevel};
use crate::config::PipelineConfig;
use crate::error::{Error, Result};
use crate::pipeline;
use crate::predict::RawRecord;

use super::state::{AppState, JobStatus};
use super::{
    ApiResponse, HealthResponse, PredictRequest, PredictResponse, TrainStatusResponse,
    TrainSubmitResponse,
};

/// Generate a request ID
fn request_id() -> String {
    format!("req-{:016x}", rand::random::<u64>())
}

/// Build the application router
pub fn app(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .route("/predict", post(predict))
        .route("/train", post(submit_train))
        .route("/train/{job_id}", get(train_status))
        .with_state(state)
}

/// Start the server on the configured address; blocks until shutdown
pub fn serve(config: PipelineConfig, level: LogLevel) -> Result<()> {
    let addr = format!("{}:{}", config.server.host, config.server.port);
    let runtime = tokio::runtime::Runtime::new()
        .map_err(|e| Error::Config(format!("cannot start async runtime: {e}")))?;
    runtime.block_on(async {
        let state = AppState::new(config);
        log(
            level,
            LogLevel::Normal,
            &format!(
                "serving on {addr} (model loaded: {})",
                state.model_loaded()
            ),
        );
        let listener = tokio::net::TcpListener::bind(&addr)
            .await
            .map_err(|e| Error::Config(format!("cannot bind {addr}: {e}")))?;
        axum::serve(listener, app(state))
            .await
            .map_err(Error::Io)?;
        Ok(())
    })
}

/// Health check handler
pub async fn health_check(State(state): State<AppState>) -> (StatusCode, Json<HealthResponse>) {
    let health = HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        model_loaded: state.model_loaded(),
    };
    (StatusCode::OK, Json(health))
}

/// Score one record
pub async fn predict(
    State(state): State<AppState>,
    Json(payload): Json<PredictRequest>,
) -> (StatusCode, Json<ApiResponse<PredictResponse>>) {
    let req_id = request_id();
    let record = RawRecord {
        values: payload.values,
    };

    let outcome = state.with_model(|model| model.predict(&record));
    match outcome {
        None => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(ApiResponse::error("no model loaded; train first", &req_id)),
        ),
        Some(Ok(prediction)) => (
            StatusCode::OK,
            Json(ApiResponse::success(
                PredictResponse {
                    label: prediction.label,
                    churn_probability: prediction.churn_probability,
                },
                &req_id,
            )),
        ),
        // malformed input (wrong arity, bad numeric field) is the
        // caller's fault; everything else is ours
        Some(Err(e @ (Error::Prediction(_) | Error::Transform(_)))) => (
            StatusCode::UNPROCESSABLE_ENTITY,
            Json(ApiResponse::error(&e.to_string(), &req_id)),
        ),
        Some(Err(e)) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(ApiResponse::error(&e.to_string(), &req_id)),
        ),
    }
}

/// Submit a training job; the pipeline runs on a blocking thread
pub async fn submit_train(
    State(state): State<AppState>,
) -> (StatusCode, Json<ApiResponse<TrainSubmitResponse>>) {
    let req_id = request_id();
    let job_id = state.submit_job();

    let worker_state = state.clone();
    let worker_job = job_id.clone();
    tokio::task::spawn_blocking(move || {
        worker_state.set_job_status(&worker_job, JobStatus::Running, None);
        match pipeline::run_pipeline(&worker_state.config, LogLevel::Quiet) {
            Ok(_) => {
                worker_state.reload_model();
                worker_state.set_job_status(&worker_job, JobStatus::Succeeded, None);
            }
            Err(e) => {
                worker_state.set_job_status(&worker_job, JobStatus::Failed, Some(e.to_string()));
            }
        }
    });

    (
        StatusCode::ACCEPTED,
        Json(ApiResponse::success(TrainSubmitResponse { job_id }, &req_id)),
    )
}

/// Poll a training job's status
pub async fn train_status(
    State(state): State<AppState>,
    Path(job_id): Path<String>,
) -> (StatusCode, Json<ApiResponse<TrainStatusResponse>>) {
    let req_id = request_id();
    match state.job(&job_id) {
        Some(record) => (
            StatusCode::OK,
            Json(ApiResponse::success(
                TrainStatusResponse {
                    job_id: record.job_id,
                    status: record.status.as_str().to_string(),
                    submitted_at: record.submitted_at,
                    finished_at: record.finished_at,
                    error: record.error,
                },
                &req_id,
            )),
        ),
        None => (
            StatusCode::NOT_FOUND,
            Json(ApiResponse::error(
                &format!("unknown job: {job_id}"),
                &req_id,
            )),
        ),
    }
}
