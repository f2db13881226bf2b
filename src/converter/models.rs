//! Tone conversion request/response models

use serde::{Deserialize, Serialize};

use crate::services::openai::ToneMessage;

/// POST /api/convert request body
#[derive(Debug, Deserialize)]
pub struct ConvertRequest {
    pub original_message: String,
    pub sender_mbti: String,
    pub receiver_mbti: String,
    pub tone: String,
}

/// POST /api/convert response
#[derive(Debug, Serialize, Deserialize)]
pub struct ConvertResponse {
    pub tone: String,
    pub content: String,
    pub explanation: String,
}

impl From<ToneMessage> for ConvertResponse {
    fn from(message: ToneMessage) -> Self {
        Self {
            tone: message.tone,
            content: message.content,
            explanation: message.explanation,
        }
    }
}
