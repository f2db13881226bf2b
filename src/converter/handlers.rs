//! Tone conversion handlers

use axum::extract::Extension;
use axum::Json;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{info, warn};

use super::models::{ConvertRequest, ConvertResponse};
use super::validators::ConvertRequestValidator;
use crate::common::{ApiError, AppState, Mbti, Validator};
use crate::services::openai::OpenAIError;

/// POST /api/convert
///
/// Converts a message into the requested tone, informed by sender and
/// receiver MBTI types.
pub async fn convert_message(
    Extension(state_lock): Extension<Arc<RwLock<AppState>>>,
    Json(payload): Json<ConvertRequest>,
) -> Result<Json<ConvertResponse>, ApiError> {
    let validation = ConvertRequestValidator.validate(&payload);
    if !validation.is_valid {
        return Err(validation.into());
    }

    let sender_mbti = Mbti::new(&payload.sender_mbti).map_err(ApiError::BadRequest)?;
    let receiver_mbti = Mbti::new(&payload.receiver_mbti).map_err(ApiError::BadRequest)?;

    let app_state = state_lock.read().await.clone();

    let message = app_state
        .openai_service
        .convert_message(
            &payload.original_message,
            &sender_mbti,
            &receiver_mbti,
            &payload.tone,
        )
        .await
        .map_err(|e| match e {
            OpenAIError::NotConfigured => {
                warn!("Conversion requested but no API key is configured");
                ApiError::ServiceUnavailable("message conversion is not configured".to_string())
            }
            OpenAIError::RequestFailed(msg) | OpenAIError::InvalidResponse(msg) => {
                warn!(error = %msg, "Upstream conversion request failed");
                ApiError::ServiceUnavailable("message conversion failed".to_string())
            }
        })?;

    info!(tone = %message.tone, "Message converted");
    Ok(Json(message.into()))
}
