//! Authentication extractors for Axum

use async_trait::async_trait;
use axum::{
    extract::{Extension, FromRequestParts},
    http::{
        header::{AUTHORIZATION, COOKIE},
        request::Parts,
    },
};
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, warn};

use crate::common::{ApiError, AppState};

/// Authenticated user extractor
///
/// Resolves the session id presented as `Authorization: Bearer <id>` (which
/// takes precedence) or as a `session_id` cookie against the session store.
#[derive(Debug)]
pub struct AuthedUser {
    pub user_id: String,
}

#[async_trait]
impl<S> FromRequestParts<S> for AuthedUser
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        // Extract the Extension containing the AppState
        let Extension(state_lock): Extension<Arc<RwLock<AppState>>> =
            Extension::from_request_parts(parts, state)
                .await
                .map_err(|_| ApiError::InternalServer("missing app state".to_string()))?;

        let app_state = state_lock.read().await.clone();

        let mut session_id: Option<String> = None;

        // The Authorization header takes precedence over the cookie; a
        // malformed header is rejected rather than silently ignored
        if let Some(header) = parts.headers.get(AUTHORIZATION).and_then(|h| h.to_str().ok()) {
            let fields: Vec<&str> = header.split_whitespace().collect();
            if fields.len() == 2 && fields[0].eq_ignore_ascii_case("bearer") {
                session_id = Some(fields[1].to_string());
            } else {
                warn!("Authentication failed: malformed Authorization header");
                return Err(ApiError::Unauthorized(
                    "invalid authorization header".to_string(),
                ));
            }
        }

        if session_id.is_none() {
            session_id = parts
                .headers
                .get(COOKIE)
                .and_then(|h| h.to_str().ok())
                .and_then(session_id_from_cookie);
        }

        let session_id = match session_id {
            Some(id) => id,
            None => {
                warn!("Authentication failed: no session credentials presented");
                return Err(ApiError::Unauthorized("authentication required".to_string()));
            }
        };

        match app_state.sessions.find_by_session_id(&session_id).await? {
            Some(session) => {
                debug!(user_id = %session.user_id, "Session resolved via extractor");
                Ok(AuthedUser {
                    user_id: session.user_id,
                })
            }
            None => {
                warn!("Authentication failed: unknown session id");
                Err(ApiError::Unauthorized("invalid session".to_string()))
            }
        }
    }
}

fn session_id_from_cookie(header: &str) -> Option<String> {
    header.split(';').find_map(|pair| {
        let (name, value) = pair.trim().split_once('=')?;
        if name == "session_id" && !value.is_empty() {
            Some(value.to_string())
        } else {
            None
        }
    })
}
