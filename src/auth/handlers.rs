//! OAuth login/callback handlers

use axum::extract::{Extension, Path, Query};
use axum::Json;
use serde::Deserialize;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{info, warn};

use super::extractors::AuthedUser;
use super::models::{CallbackResponse, LoginUrlResponse};
use super::state_store::StateData;
use crate::common::{generate_token, safe_email_log, ApiError, AppState};
use crate::services::oauth::{OAuthError, OAuthProvider};

#[derive(Debug, Deserialize)]
pub struct LoginQuery {
    pub redirect_uri: String,
}

#[derive(Debug, Deserialize)]
pub struct CallbackQuery {
    pub code: String,
    pub state: String,
}

fn get_provider(
    state: &AppState,
    provider: &str,
) -> Result<Arc<dyn OAuthProvider>, ApiError> {
    state
        .providers
        .get(provider)
        .cloned()
        .ok_or_else(|| ApiError::BadRequest(format!("unsupported OAuth provider: {}", provider)))
}

/// GET /auth/:provider/login?redirect_uri=<url>
///
/// Issues a fresh CSRF state token, records it as pending, and returns the
/// provider's authorization URL embedding that state and redirect target.
pub async fn oauth_login_url(
    Extension(state_lock): Extension<Arc<RwLock<AppState>>>,
    Path(provider): Path<String>,
    Query(params): Query<LoginQuery>,
) -> Result<Json<LoginUrlResponse>, ApiError> {
    let app_state = state_lock.read().await.clone();
    let oauth_provider = get_provider(&app_state, &provider)?;

    let state_token = generate_token();
    app_state
        .state_store
        .insert(
            &state_token,
            StateData {
                provider: provider.clone(),
                redirect_uri: params.redirect_uri.clone(),
            },
        )
        .await;

    let url = oauth_provider.authorization_url(&params.redirect_uri, &state_token);

    info!(provider = %provider, "Issued OAuth login URL");
    Ok(Json(LoginUrlResponse { url }))
}

/// GET /auth/:provider/callback?code=<code>&state=<token>
///
/// Consumes the state token (single use), exchanges the code for the
/// verified profile, and hands the triple to the callback orchestrator.
pub async fn oauth_callback(
    Extension(state_lock): Extension<Arc<RwLock<AppState>>>,
    Path(provider): Path<String>,
    Query(params): Query<CallbackQuery>,
) -> Result<Json<CallbackResponse>, ApiError> {
    let app_state = state_lock.read().await.clone();

    let state_data = app_state
        .state_store
        .consume(&params.state)
        .await
        .ok_or_else(|| {
            warn!(provider = %provider, "Callback presented an unknown or consumed state token");
            ApiError::BadRequest("invalid or expired state".to_string())
        })?;

    if state_data.provider != provider {
        warn!(
            issued_for = %state_data.provider,
            presented_to = %provider,
            "State token presented to a different provider"
        );
        return Err(ApiError::BadRequest("state token provider mismatch".to_string()));
    }

    let oauth_provider = get_provider(&app_state, &provider)?;

    let user_info = oauth_provider
        .exchange_code(&params.code, &state_data.redirect_uri)
        .await
        .map_err(|e| match e {
            OAuthError::RequestFailed(msg) | OAuthError::InvalidResponse(msg) => {
                warn!(provider = %provider, error = %msg, "OAuth provider unreachable or broken");
                ApiError::ServiceUnavailable("OAuth provider request failed".to_string())
            }
        })?
        .ok_or_else(|| {
            warn!(provider = %provider, "OAuth provider rejected the authorization code");
            ApiError::BadRequest("OAuth authentication failed".to_string())
        })?;

    info!(
        provider = %user_info.provider,
        email = %safe_email_log(&user_info.email),
        "OAuth profile verified, resolving user"
    );

    let result = app_state
        .oauth_callback
        .execute(
            &user_info.provider,
            &user_info.provider_user_id,
            &user_info.email,
        )
        .await?;

    Ok(Json(CallbackResponse {
        session_id: result.session_id,
    }))
}

/// GET /api/me
///
/// Returns the authenticated user's record; exercises the session guard.
pub async fn me_handler(
    Extension(state_lock): Extension<Arc<RwLock<AppState>>>,
    authed: AuthedUser,
) -> Result<Json<serde_json::Value>, ApiError> {
    let app_state = state_lock.read().await.clone();

    let user = app_state
        .users
        .find_by_id(&authed.user_id)
        .await?
        .ok_or_else(|| ApiError::Unauthorized("user not found".to_string()))?;

    let resp = serde_json::json!({
        "user": {
            "id": user.id,
            "email": user.email,
            "mbti": user.mbti().map(|m| m.as_str().to_string()),
            "gender": user.gender().map(|g| g.as_str().to_string()),
        },
    });
    Ok(Json(resp))
}
