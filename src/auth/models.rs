//! Authentication data models

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use uuid::Uuid;

use crate::common::{Gender, Mbti};

/// User database model
///
/// `mbti` and `gender` are free-form columns; use the typed accessors to
/// read them as validated domain values.
#[derive(FromRow, Serialize, Deserialize, Debug, Clone)]
pub struct User {
    pub id: String,
    pub email: String,
    pub mbti: Option<String>,
    pub gender: Option<String>,
    pub created_at: Option<String>,
}

impl User {
    /// Creates a new user; both fields must be non-empty
    pub fn new(id: String, email: String) -> Result<Self, String> {
        if id.is_empty() {
            return Err("user id must not be empty".to_string());
        }
        if email.is_empty() {
            return Err("user email must not be empty".to_string());
        }
        Ok(Self {
            id,
            email,
            mbti: None,
            gender: None,
            created_at: None,
        })
    }

    pub fn mbti(&self) -> Option<Mbti> {
        self.mbti.as_deref().and_then(|v| Mbti::new(v).ok())
    }

    pub fn gender(&self) -> Option<Gender> {
        self.gender.as_deref().and_then(|v| Gender::new(v).ok())
    }
}

/// Link between one external-provider account and one local email
#[derive(FromRow, Serialize, Deserialize, Debug, Clone)]
pub struct OAuthIdentity {
    pub provider: String,
    pub provider_user_id: String,
    pub email: String,
    pub created_at: Option<String>,
}

impl OAuthIdentity {
    /// Creates a new identity link; all three fields must be non-empty
    pub fn new(provider: &str, provider_user_id: &str, email: &str) -> Result<Self, String> {
        if provider.is_empty() {
            return Err("provider must not be empty".to_string());
        }
        if provider_user_id.is_empty() {
            return Err("provider user id must not be empty".to_string());
        }
        if email.is_empty() {
            return Err("email must not be empty".to_string());
        }
        Ok(Self {
            provider: provider.to_string(),
            provider_user_id: provider_user_id.to_string(),
            email: email.to_string(),
            created_at: None,
        })
    }
}

/// Server-issued session bound to a user
#[derive(FromRow, Serialize, Deserialize, Debug, Clone)]
pub struct Session {
    pub session_id: String,
    pub user_id: String,
    pub created_at: Option<String>,
}

impl Session {
    /// Issues a fresh session with a new opaque id
    pub fn issue(user_id: &str) -> Self {
        Self {
            session_id: Uuid::new_v4().to_string(),
            user_id: user_id.to_string(),
            created_at: None,
        }
    }
}

/// GET /auth/:provider/login response
#[derive(Debug, Serialize, Deserialize)]
pub struct LoginUrlResponse {
    pub url: String,
}

/// GET /auth/:provider/callback response
#[derive(Debug, Serialize, Deserialize)]
pub struct CallbackResponse {
    pub session_id: String,
}
