use crate::{
    predict::{Diagnosis, PredictionPipeline},
    utils::error::PredictError,
    web::AppState,
    Result,
};
use axum::{
    body::Bytes,
    extract::{multipart::MultipartRejection, Multipart, State},
    response::Json,
};
use serde::Serialize;

pub const WELCOME_MESSAGE: &str =
    "Welcome to the Plant Disease Prediction API. Use /predict to make predictions.";

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

pub async fn home_handler() -> Json<MessageResponse> {
    Json(MessageResponse {
        message: WELCOME_MESSAGE.to_string(),
    })
}

/// Multipart upload: the image travels in field `file`.
pub async fn predict_handler(
    State(state): State<AppState>,
    multipart: std::result::Result<Multipart, MultipartRejection>,
) -> Result<Json<Diagnosis>> {
    let mut multipart = multipart
        .map_err(|e| PredictError::InvalidInput(format!("Expected a multipart upload: {}", e)))?;

    let mut image_data: Option<Bytes> = None;

    while let Some(field) = multipart.next_field().await.map_err(|e| {
        PredictError::InvalidInput(format!("Failed to read multipart field: {}", e))
    })? {
        let field_name = field.name().unwrap_or("unknown").to_string();

        match field_name.as_str() {
            "file" => {
                let file_name = field.file_name().unwrap_or("").to_string();
                let data = field.bytes().await.map_err(|e| {
                    PredictError::InvalidInput(format!("Failed to read file data: {}", e))
                })?;

                tracing::debug!("Received file '{}': {} bytes", file_name, data.len());
                image_data = Some(data);
            }
            _ => {
                tracing::debug!("Ignoring unknown field: {}", field_name);
            }
        }
    }

    let image_data = image_data.ok_or_else(|| {
        PredictError::InvalidInput("No image file provided in field 'file'".to_string())
    })?;

    let diagnosis = PredictionPipeline::new(&state.models).process_bytes(&image_data)?;

    Ok(Json(diagnosis))
}
