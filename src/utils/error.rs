use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum PredictError {
    #[error("Model loading failed: {0}")]
    ModelLoad(String),

    #[error("Image decode error: {0}")]
    Decode(#[from] image::ImageError),

    #[error("Inference failed: {0}")]
    Inference(String),

    #[error("ONNX Runtime error: {0}")]
    Ort(#[from] ort::Error),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Internal server error: {0}")]
    Internal(String),
}

/// Failure kinds, independent of the message text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    ModelLoad,
    Decode,
    Inference,
    InvalidInput,
    Config,
    Internal,
}

impl PredictError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            PredictError::ModelLoad(_) => ErrorKind::ModelLoad,
            PredictError::Decode(_) => ErrorKind::Decode,
            PredictError::Inference(_) | PredictError::Ort(_) => ErrorKind::Inference,
            PredictError::InvalidInput(_) => ErrorKind::InvalidInput,
            PredictError::Config(_) => ErrorKind::Config,
            PredictError::Internal(_) => ErrorKind::Internal,
        }
    }

    /// Every pipeline failure looks the same to the caller; only a request
    /// that never reached the pipeline is reported as unprocessable.
    pub fn status_code(&self) -> StatusCode {
        match self.kind() {
            ErrorKind::InvalidInput => StatusCode::UNPROCESSABLE_ENTITY,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn error_code(&self) -> &'static str {
        match self.kind() {
            ErrorKind::ModelLoad => "MODEL_LOAD_ERROR",
            ErrorKind::Decode => "DECODE_ERROR",
            ErrorKind::Inference => "INFERENCE_ERROR",
            ErrorKind::InvalidInput => "INVALID_INPUT",
            ErrorKind::Config => "CONFIG_ERROR",
            ErrorKind::Internal => "INTERNAL_ERROR",
        }
    }
}

impl IntoResponse for PredictError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = serde_json::json!({ "message": self.to_string() });

        tracing::error!("Request failed: {} [{}] ({})", self, self.error_code(), status);

        (status, axum::Json(body)).into_response()
    }
}
