// src/services/openai.rs
//! Message tone conversion via the OpenAI chat completions API

use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::common::Mbti;

#[derive(Debug, thiserror::Error)]
pub enum OpenAIError {
    #[error("API key not configured")]
    NotConfigured,

    #[error("API request failed: {0}")]
    RequestFailed(String),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),
}

/// A message converted to a target tone, with the model's rationale
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToneMessage {
    pub tone: String,
    pub content: String,
    pub explanation: String,
}

#[derive(Debug, Serialize)]
struct ChatCompletionRequest {
    model: String,
    messages: Vec<ChatMessage>,
    temperature: f32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct ChatMessage {
    role: String,
    content: String,
}

#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
    usage: Option<Usage>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatMessage,
}

#[derive(Debug, Deserialize)]
struct Usage {
    total_tokens: u32,
}

/// Shape the model is instructed to reply with
#[derive(Debug, Deserialize)]
struct ConvertedPayload {
    content: String,
    explanation: String,
}

#[derive(Debug)]
pub struct OpenAIService {
    client: Client,
    api_key: Option<String>,
    model: String,
    base_url: String,
}

impl OpenAIService {
    pub fn new(api_key: Option<String>, model: String) -> Self {
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(60))
            .build()
            .unwrap_or_else(|_| Client::new());

        Self {
            client,
            api_key,
            model,
            base_url: "https://api.openai.com".to_string(),
        }
    }

    /// Convert a message to the requested tone, informed by sender and
    /// receiver MBTI types. The model replies with JSON carrying the
    /// converted text and a short rationale; an unparseable reply is an
    /// upstream failure and is not retried.
    pub async fn convert_message(
        &self,
        original_message: &str,
        sender_mbti: &Mbti,
        receiver_mbti: &Mbti,
        tone: &str,
    ) -> Result<ToneMessage, OpenAIError> {
        let api_key = self.api_key.as_ref().ok_or(OpenAIError::NotConfigured)?;

        let request = ChatCompletionRequest {
            model: self.model.clone(),
            messages: vec![
                ChatMessage {
                    role: "system".to_string(),
                    content: "You are an MBTI-based communication expert. Convert messages \
                              into the requested tone and respond in JSON format."
                        .to_string(),
                },
                ChatMessage {
                    role: "user".to_string(),
                    content: build_prompt(original_message, sender_mbti, receiver_mbti, tone),
                },
            ],
            temperature: 0.7,
        };

        debug!(model = %self.model, tone = %tone, "Sending message conversion request");

        let response = self
            .client
            .post(format!("{}/v1/chat/completions", self.base_url))
            .bearer_auth(api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| OpenAIError::RequestFailed(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(OpenAIError::RequestFailed(format!(
                "HTTP {}: {}",
                status, body
            )));
        }

        let completion: ChatCompletionResponse = response
            .json()
            .await
            .map_err(|e| OpenAIError::InvalidResponse(e.to_string()))?;

        let content = completion
            .choices
            .first()
            .ok_or_else(|| OpenAIError::InvalidResponse("no choices in response".to_string()))?
            .message
            .content
            .clone();

        let payload = parse_converted_payload(&content)?;

        if let Some(usage) = completion.usage {
            info!(
                model = %self.model,
                tokens_used = usage.total_tokens,
                "Message conversion completed"
            );
        }

        Ok(ToneMessage {
            tone: tone.to_string(),
            content: payload.content,
            explanation: payload.explanation,
        })
    }
}

fn build_prompt(
    original_message: &str,
    sender_mbti: &Mbti,
    receiver_mbti: &Mbti,
    tone: &str,
) -> String {
    format!(
        "Convert the following message to a '{tone}' tone.\n\n\
         Sender MBTI: {sender}\n\
         Receiver MBTI: {receiver}\n\
         Original message: {message}\n\n\
         Rewrite the message so it lands effectively given the receiver's MBTI \
         traits, and explain why this phrasing works for a {receiver} type.\n\n\
         Respond in JSON format:\n\
         {{\n\
             \"content\": \"the converted message\",\n\
             \"explanation\": \"why this phrasing is effective (2-3 lines)\"\n\
         }}",
        tone = tone,
        sender = sender_mbti,
        receiver = receiver_mbti,
        message = original_message,
    )
}

fn parse_converted_payload(content: &str) -> Result<ConvertedPayload, OpenAIError> {
    serde_json::from_str(content)
        .map_err(|e| OpenAIError::InvalidResponse(format!("unparseable model reply: {}", e)))
}
