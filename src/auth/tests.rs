//! Tests for the auth module
//!
//! Router-level tests drive the composed auth router against a
//! `sqlite::memory:` pool with a deterministic in-memory OAuth provider.

use axum::body::{to_bytes, Body};
use axum::extract::Extension;
use axum::http::{Request, StatusCode};
use axum::Router;
use sqlx::sqlite::SqlitePoolOptions;
use sqlx::SqlitePool;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use tower::ServiceExt;

use super::auth_routes;
use super::callback::OAuthCallback;
use super::models::{Session, User};
use super::repository::{
    SessionRepository, SqliteOAuthIdentityRepository, SqliteSessionRepository,
    SqliteUserRepository, UserRepository,
};
use super::state_store::MemoryStateStore;
use crate::common::{migrations, AppState, ProviderRegistry};
use crate::services::oauth::{OAuthUserInfo, StaticOAuthProvider};
use crate::services::OpenAIService;

struct TestApp {
    app: Router,
    pool: SqlitePool,
    users: Arc<SqliteUserRepository>,
    sessions: Arc<SqliteSessionRepository>,
}

async fn test_app() -> TestApp {
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

    let mut provider_users = HashMap::new();
    provider_users.insert(
        "valid_code".to_string(),
        OAuthUserInfo {
            provider: "google".to_string(),
            provider_user_id: "google_123".to_string(),
            email: "test@example.com".to_string(),
        },
    );
    let mut providers: ProviderRegistry = HashMap::new();
    providers.insert(
        "google".to_string(),
        Arc::new(StaticOAuthProvider::new(
            "https://accounts.google.com/o/oauth2/auth",
            provider_users,
        )),
    );

    let app_state = AppState {
        providers,
        state_store: Arc::new(MemoryStateStore::new()),
        oauth_callback,
        users: users.clone(),
        sessions: sessions.clone(),
        openai_service: Arc::new(OpenAIService::new(None, "gpt-4o-mini".to_string())),
    };

    let app = Router::new()
        .merge(auth_routes())
        .layer(Extension(Arc::new(RwLock::new(app_state))));

    TestApp {
        app,
        pool,
        users,
        sessions,
    }
}

async fn get(app: &Router, uri: &str) -> (StatusCode, serde_json::Value) {
    let response = app
        .clone()
        .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let json = if bytes.is_empty() {
        serde_json::Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, json)
}

/// Pulls the state token out of an authorization URL
fn state_from_url(url: &str) -> String {
    url.split("state=")
        .nth(1)
        .and_then(|rest| rest.split('&').next())
        .expect("authorization URL should carry a state parameter")
        .to_string()
}

async fn login_state(app: &Router) -> String {
    let (status, body) =
        get(app, "/auth/google/login?redirect_uri=http://localhost:3000/callback").await;
    assert_eq!(status, StatusCode::OK);
    state_from_url(body["url"].as_str().unwrap())
}

async fn count(pool: &SqlitePool, table: &str) -> i64 {
    sqlx::query_scalar(&format!("SELECT COUNT(*) FROM {}", table))
        .fetch_one(pool)
        .await
        .unwrap()
}

#[tokio::test]
async fn login_returns_authorization_url_with_state() {
    let t = test_app().await;

    let (status, body) =
        get(&t.app, "/auth/google/login?redirect_uri=http://localhost:3000/callback").await;

    assert_eq!(status, StatusCode::OK);
    let url = body["url"].as_str().unwrap();
    assert!(url.starts_with("https://accounts.google.com/o/oauth2/auth"));
    assert!(url.contains("redirect_uri="));
    assert!(!state_from_url(url).is_empty());
}

#[tokio::test]
async fn login_with_unknown_provider_is_client_error() {
    let t = test_app().await;

    let (status, body) =
        get(&t.app, "/auth/unknown/login?redirect_uri=http://localhost:3000/callback").await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("unsupported"));
}

#[tokio::test]
async fn callback_with_valid_code_issues_session() {
    let t = test_app().await;
    let state = login_state(&t.app).await;

    let (status, body) = get(
        &t.app,
        &format!("/auth/google/callback?code=valid_code&state={}", state),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    let session_id = body["session_id"].as_str().unwrap();
    assert!(!session_id.is_empty());

    let session = t
        .sessions
        .find_by_session_id(session_id)
        .await
        .unwrap()
        .expect("session should be persisted");
    let user = t
        .users
        .find_by_email("test@example.com")
        .await
        .unwrap()
        .expect("user should be persisted");
    assert_eq!(session.user_id, user.id);
}

#[tokio::test]
async fn state_token_is_accepted_exactly_once() {
    let t = test_app().await;
    let state = login_state(&t.app).await;
    let uri = format!("/auth/google/callback?code=valid_code&state={}", state);

    let (first, _) = get(&t.app, &uri).await;
    assert_eq!(first, StatusCode::OK);

    let (second, body) = get(&t.app, &uri).await;
    assert_eq!(second, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("state"));
}

#[tokio::test]
async fn callback_with_never_issued_state_is_rejected() {
    let t = test_app().await;

    let (status, _) =
        get(&t.app, "/auth/google/callback?code=valid_code&state=never_issued").await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn callback_with_invalid_code_creates_no_rows() {
    let t = test_app().await;
    let state = login_state(&t.app).await;

    let (status, body) = get(
        &t.app,
        &format!("/auth/google/callback?code=bad_code&state={}", state),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("authentication failed"));
    assert_eq!(count(&t.pool, "users").await, 0);
    assert_eq!(count(&t.pool, "oauth_identities").await, 0);
    assert_eq!(count(&t.pool, "sessions").await, 0);
}

#[tokio::test]
async fn repeated_logins_reuse_the_user_but_issue_fresh_sessions() {
    let t = test_app().await;

    for _ in 0..2 {
        let state = login_state(&t.app).await;
        let (status, _) = get(
            &t.app,
            &format!("/auth/google/callback?code=valid_code&state={}", state),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
    }

    assert_eq!(count(&t.pool, "users").await, 1);
    assert_eq!(count(&t.pool, "oauth_identities").await, 1);
    assert_eq!(count(&t.pool, "sessions").await, 2);
}

async fn seed_session(t: &TestApp) -> (User, Session) {
    let user = User::new("U_TEST01".to_string(), "me@example.com".to_string()).unwrap();
    t.users.save(&user).await.unwrap();
    let session = Session::issue(&user.id);
    t.sessions.save(&session).await.unwrap();
    (user, session)
}

#[tokio::test]
async fn me_resolves_bearer_token_to_user() {
    let t = test_app().await;
    let (user, session) = seed_session(&t).await;

    let response = t
        .app
        .clone()
        .oneshot(
            Request::builder()
                .uri("/api/me")
                .header("Authorization", format!("Bearer {}", session.session_id))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(body["user"]["id"], user.id.as_str());
    assert_eq!(body["user"]["email"], "me@example.com");
}

#[tokio::test]
async fn me_resolves_session_cookie() {
    let t = test_app().await;
    let (_, session) = seed_session(&t).await;

    let response = t
        .app
        .clone()
        .oneshot(
            Request::builder()
                .uri("/api/me")
                .header("Cookie", format!("session_id={}", session.session_id))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn me_without_credentials_is_unauthorized() {
    let t = test_app().await;

    let (status, _) = get(&t.app, "/api/me").await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn me_with_unknown_session_is_unauthorized() {
    let t = test_app().await;

    let response = t
        .app
        .clone()
        .oneshot(
            Request::builder()
                .uri("/api/me")
                .header("Authorization", "Bearer not-a-session")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn me_with_malformed_authorization_header_is_unauthorized() {
    let t = test_app().await;
    let (_, session) = seed_session(&t).await;

    // Raw token without the Bearer scheme
    let response = t
        .app
        .clone()
        .oneshot(
            Request::builder()
                .uri("/api/me")
                .header("Authorization", session.session_id.clone())
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}
