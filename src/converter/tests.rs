//! Tests for the converter module

use axum::body::{to_bytes, Body};
use axum::extract::Extension;
use axum::http::{header, Method, Request, StatusCode};
use axum::Router;
use sqlx::sqlite::SqlitePoolOptions;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use tower::ServiceExt;

use super::converter_routes;
use super::models::ConvertRequest;
use super::validators::ConvertRequestValidator;
use crate::auth::callback::OAuthCallback;
use crate::auth::repository::{
    SqliteOAuthIdentityRepository, SqliteSessionRepository, SqliteUserRepository,
};
use crate::auth::state_store::MemoryStateStore;
use crate::common::{migrations, AppState, Validator};
use crate::services::OpenAIService;

fn request(message: &str, sender: &str, receiver: &str, tone: &str) -> ConvertRequest {
    ConvertRequest {
        original_message: message.to_string(),
        sender_mbti: sender.to_string(),
        receiver_mbti: receiver.to_string(),
        tone: tone.to_string(),
    }
}

#[test]
fn validator_accepts_complete_request() {
    let result =
        ConvertRequestValidator.validate(&request("see you at 5", "INTJ", "ESFP", "casual"));
    assert!(result.is_valid);
}

#[test]
fn validator_rejects_blank_fields() {
    let result = ConvertRequestValidator.validate(&request("   ", "INTJ", "ESFP", ""));

    assert!(!result.is_valid);
    let fields: Vec<&str> = result.errors.iter().map(|e| e.field.as_str()).collect();
    assert!(fields.contains(&"original_message"));
    assert!(fields.contains(&"tone"));
}

/// Builds the converter router over an unconfigured OpenAI service, which
/// is enough for the validation and configuration-error paths
async fn test_app() -> Router {
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect("sqlite::memory:")
        .await
        .expect("in-memory pool");
    migrations::run_migrations(&pool).await.expect("migrations");

    let users = Arc::new(SqliteUserRepository::new(pool.clone()));
    let identities = Arc::new(SqliteOAuthIdentityRepository::new(pool.clone()));
    let sessions = Arc::new(SqliteSessionRepository::new(pool.clone()));
    let oauth_callback = Arc::new(OAuthCallback::new(
        identities,
        users.clone(),
        sessions.clone(),
    ));

    let app_state = AppState {
        providers: HashMap::new(),
        state_store: Arc::new(MemoryStateStore::new()),
        oauth_callback,
        users,
        sessions,
        openai_service: Arc::new(OpenAIService::new(None, "gpt-4o-mini".to_string())),
    };

    Router::new()
        .merge(converter_routes())
        .layer(Extension(Arc::new(RwLock::new(app_state))))
}

async fn post_convert(app: &Router, body: serde_json::Value) -> (StatusCode, serde_json::Value) {
    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method(Method::POST)
                .uri("/api/convert")
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
        )
        .await
        .unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let json = serde_json::from_slice(&bytes).unwrap_or(serde_json::Value::Null);
    (status, json)
}

#[tokio::test]
async fn convert_rejects_empty_message() {
    let app = test_app().await;

    let (status, body) = post_convert(
        &app,
        serde_json::json!({
            "original_message": "",
            "sender_mbti": "INTJ",
            "receiver_mbti": "ESFP",
            "tone": "polite",
        }),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"]
        .as_str()
        .unwrap()
        .contains("original_message"));
}

#[tokio::test]
async fn convert_rejects_unknown_mbti_code() {
    let app = test_app().await;

    let (status, body) = post_convert(
        &app,
        serde_json::json!({
            "original_message": "see you at 5",
            "sender_mbti": "ABCD",
            "receiver_mbti": "ESFP",
            "tone": "polite",
        }),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("ABCD"));
}

#[tokio::test]
async fn convert_without_api_key_is_service_unavailable() {
    let app = test_app().await;

    let (status, body) = post_convert(
        &app,
        serde_json::json!({
            "original_message": "see you at 5",
            "sender_mbti": "INTJ",
            "receiver_mbti": "ESFP",
            "tone": "polite",
        }),
    )
    .await;

    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(body["code"], "SERVICE_UNAVAILABLE");
}
