//! HTTP boundary: prediction serving and training jobs
//!
//! Thin axum layer over the prediction pipeline and the batch
//! pipeline. Predictions are scored inline; training runs as a
//! submitted job on a blocking thread with a pollable status record.
//! Everything here sits behind the `server` cargo feature.

#[cfg(feature = "server")]
mod handlers;
#[cfg(feature = "server")]
mod state;

#[cfg(feature = "server")]
pub use handlers::*;
#[cfg(feature = "server")]
pub use state::*;

use serde::{Deserialize, Serialize};

/// API response wrapper
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    /// Whether the request was successful
    pub success: bool,
    /// Response data (if successful)
    pub data: Option<T>,
    /// Error message (if failed)
    pub error: Option<String>,
    /// Request ID for tracing
    pub request_id: String,
}

impl<T> ApiResponse<T> {
    /// Create success response
    pub fn success(data: T, request_id: &str) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
            request_id: request_id.to_string(),
        }
    }

    /// Create error response
    pub fn error(message: &str, request_id: &str) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(message.to_string()),
            request_id: request_id.to_string(),
        }
    }
}

/// Health check response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    /// Server status
    pub status: String,
    /// Server version
    pub version: String,
    /// Whether a model artifact is loaded and serving
    pub model_loaded: bool,
}

/// Prediction request: the raw input fields in schema order
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PredictRequest {
    pub values: Vec<String>,
}

/// Prediction response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PredictResponse {
    pub label: String,
    pub churn_probability: f64,
}

/// Training job submission response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrainSubmitResponse {
    pub job_id: String,
}

/// Training job status response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrainStatusResponse {
    pub job_id: String,
    pub status: String,
    pub submitted_at: String,
    pub finished_at: Option<String>,
    pub error: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_api_response_success() {
        let response = ApiResponse::success("hello", "req-123");
        assert!(response.success);
        assert_eq!(response.data, Some("hello"));
        assert!(response.error.is_none());
    }

    #[test]
    fn test_api_response_error() {
        let response: ApiResponse<String> = ApiResponse::error("bad input", "req-456");
        assert!(!response.success);
        assert!(response.data.is_none());
        assert_eq!(response.error, Some("bad input".to_string()));
    }

    #[test]
    fn test_predict_request_deserializes() {
        let json = r#"{"values": ["Male", "12", "Month-to-month"]}"#;
        let req: PredictRequest = serde_json::from_str(json).unwrap();
        assert_eq!(req.values.len(), 3);
    }

    #[test]
    fn test_health_response_serializes() {
        let health = HealthResponse {
            status: "healthy".to_string(),
            version: "0.1.0".to_string(),
            model_loaded: true,
        };
        let json = serde_json::to_string(&health).unwrap();
        assert!(json.contains("model_loaded"));
    }
}
