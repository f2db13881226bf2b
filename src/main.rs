// src/main.rs
use axum::{extract::Extension, middleware, Router};
use dotenv::dotenv;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use std::env;
use std::path::PathBuf;
use std::{net::SocketAddr, str::FromStr, sync::Arc};
use tokio::{net::TcpListener, sync::RwLock};
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

mod auth;
mod common;
mod converter;
mod logging_middleware;
mod services;

use auth::callback::OAuthCallback;
use auth::repository::{
    SqliteOAuthIdentityRepository, SqliteSessionRepository, SqliteUserRepository,
};
use auth::state_store::MemoryStateStore;
use common::{AppState, ProviderRegistry};
use services::oauth::{HttpOAuthProvider, ProviderConfig};
use services::OpenAIService;

/// Registers the OAuth providers whose credentials are present in the
/// environment
fn build_provider_registry() -> ProviderRegistry {
    let mut providers: ProviderRegistry = std::collections::HashMap::new();

    match (env::var("GOOGLE_CLIENT_ID"), env::var("GOOGLE_CLIENT_SECRET")) {
        (Ok(id), Ok(secret)) => {
            providers.insert(
                "google".to_string(),
                Arc::new(HttpOAuthProvider::new(ProviderConfig::google(id, secret))),
            );
            info!("Google OAuth provider registered");
        }
        _ => warn!("GOOGLE_CLIENT_ID/GOOGLE_CLIENT_SECRET not set, Google login disabled"),
    }

    match (env::var("KAKAO_CLIENT_ID"), env::var("KAKAO_CLIENT_SECRET")) {
        (Ok(id), Ok(secret)) => {
            providers.insert(
                "kakao".to_string(),
                Arc::new(HttpOAuthProvider::new(ProviderConfig::kakao(id, secret))),
            );
            info!("Kakao OAuth provider registered");
        }
        _ => warn!("KAKAO_CLIENT_ID/KAKAO_CLIENT_SECRET not set, Kakao login disabled"),
    }

    providers
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(false)
        .init();

    // ========================================================================
    // ENVIRONMENT CONFIGURATION
    // ========================================================================

    let database_url =
        env::var("DATABASE_URL").unwrap_or_else(|_| "sqlite://tone_api.db".to_string());
    let openai_api_key = env::var("OPENAI_API_KEY").ok();
    let openai_model = env::var("OPENAI_MODEL").unwrap_or_else(|_| "gpt-4o-mini".to_string());

    // ========================================================================
    // DATABASE SETUP
    // ========================================================================

    if let Some(path_part) = database_url.strip_prefix("sqlite://") {
        let path_without_params = path_part.split('?').next().unwrap_or("");
        if !path_without_params.is_empty() && !path_without_params.starts_with(':') {
            let db_path = PathBuf::from(path_without_params);
            if let Some(parent) = db_path.parent() {
                if !parent.as_os_str().is_empty() {
                    tokio::fs::create_dir_all(parent).await?;
                }
            }
        }
    }

    let connect_options = SqliteConnectOptions::from_str(&database_url)?.create_if_missing(true);
    let pool = SqlitePoolOptions::new()
        .connect_with(connect_options)
        .await?;

    common::migrations::run_migrations(&pool).await?;

    // ========================================================================
    // SERVICE INITIALIZATION
    // ========================================================================

    let providers = build_provider_registry();

    let users = Arc::new(SqliteUserRepository::new(pool.clone()));
    let identities = Arc::new(SqliteOAuthIdentityRepository::new(pool.clone()));
    let sessions = Arc::new(SqliteSessionRepository::new(pool.clone()));

    let oauth_callback = Arc::new(OAuthCallback::new(
        identities,
        users.clone(),
        sessions.clone(),
    ));
    info!("OAuth callback orchestrator initialized");

    let openai_service = Arc::new(OpenAIService::new(openai_api_key, openai_model));
    info!("OpenAIService initialized");

    // ========================================================================
    // APPLICATION STATE
    // ========================================================================

    let app_state = AppState {
        providers,
        state_store: Arc::new(MemoryStateStore::new()),
        oauth_callback,
        users,
        sessions,
        openai_service,
    };

    let shared = Arc::new(RwLock::new(app_state));

    // ========================================================================
    // ROUTER COMPOSITION
    // ========================================================================

    let app = Router::new()
        .merge(auth::auth_routes())
        .merge(converter::converter_routes())
        // Request/response body logging in debug mode
        .layer(middleware::from_fn(logging_middleware::log_request_response))
        .layer(Extension(shared.clone()))
        .layer({
            let cors_origins = env::var("CORS_ORIGINS")
                .unwrap_or_else(|_| "http://localhost:3000,http://localhost:5173".to_string());

            let origins: Vec<axum::http::HeaderValue> = cors_origins
                .split(',')
                .filter_map(|origin| origin.trim().parse().ok())
                .collect();

            CorsLayer::new()
                .allow_origin(origins)
                .allow_methods([
                    axum::http::Method::GET,
                    axum::http::Method::POST,
                    axum::http::Method::OPTIONS,
                ])
                .allow_headers([
                    axum::http::header::CONTENT_TYPE,
                    axum::http::header::AUTHORIZATION,
                ])
                .allow_credentials(true)
        })
        .layer(TraceLayer::new_for_http());

    // ========================================================================
    // SERVER STARTUP
    // ========================================================================

    let port = env::var("PORT")
        .ok()
        .and_then(|p| p.parse::<u16>().ok())
        .unwrap_or(8080);

    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    info!("Listening on {}", addr);
    let listener = TcpListener::bind(addr).await?;
    axum::serve(listener, app.into_make_service()).await?;

    Ok(())
}
