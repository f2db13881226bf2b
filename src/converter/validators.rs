//! Validators for tone conversion requests

use super::models::ConvertRequest;
use crate::common::{ValidationResult, Validator};

pub struct ConvertRequestValidator;

impl Validator<ConvertRequest> for ConvertRequestValidator {
    fn validate(&self, data: &ConvertRequest) -> ValidationResult {
        let mut result = ValidationResult::new();

        if data.original_message.trim().is_empty() {
            result.add_error("original_message", "Original message is required");
        }

        if data.tone.trim().is_empty() {
            result.add_error("tone", "Tone is required");
        }

        if data.sender_mbti.trim().is_empty() {
            result.add_error("sender_mbti", "Sender MBTI is required");
        }

        if data.receiver_mbti.trim().is_empty() {
            result.add_error("receiver_mbti", "Receiver MBTI is required");
        }

        result
    }
}
