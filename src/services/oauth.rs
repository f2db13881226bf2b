// src/services/oauth.rs
//! OAuth2 provider clients
//!
//! A provider is anything that can build an authorization URL and exchange
//! an authorization code for a verified user profile. Real providers go
//! through HTTP (`HttpOAuthProvider`); tests use a deterministic in-memory
//! fake.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, error, warn};

#[derive(Debug, Error)]
pub enum OAuthError {
    #[error("provider request failed: {0}")]
    RequestFailed(String),

    #[error("invalid provider response: {0}")]
    InvalidResponse(String),
}

/// Verified profile returned by a provider for an authorization code
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OAuthUserInfo {
    pub provider: String,
    pub provider_user_id: String,
    pub email: String,
}

/// Capability set of a named OAuth2 provider
#[async_trait]
pub trait OAuthProvider: Send + Sync {
    /// Builds the provider's authorization URL for the given redirect
    /// target and CSRF state token
    fn authorization_url(&self, redirect_uri: &str, state: &str) -> String;

    /// Exchanges an authorization code for the verified user profile.
    /// Returns `Ok(None)` when the provider rejects the code or the profile
    /// is missing required fields; transport-level trouble is an error.
    async fn exchange_code(
        &self,
        code: &str,
        redirect_uri: &str,
    ) -> Result<Option<OAuthUserInfo>, OAuthError>;
}

/// Endpoint and credential configuration for one HTTP provider
#[derive(Debug, Clone)]
pub struct ProviderConfig {
    pub name: String,
    pub auth_url: String,
    pub token_url: String,
    pub userinfo_url: String,
    pub client_id: String,
    pub client_secret: String,
    pub scopes: Vec<String>,
    /// JSON field in the userinfo response carrying the provider user id
    pub user_id_field: String,
    /// JSON field in the userinfo response carrying the email
    pub email_field: String,
}

impl ProviderConfig {
    pub fn google(client_id: String, client_secret: String) -> Self {
        Self {
            name: "google".to_string(),
            auth_url: "https://accounts.google.com/o/oauth2/v2/auth".to_string(),
            token_url: "https://oauth2.googleapis.com/token".to_string(),
            userinfo_url: "https://www.googleapis.com/oauth2/v2/userinfo".to_string(),
            client_id,
            client_secret,
            scopes: vec!["openid".to_string(), "email".to_string()],
            user_id_field: "id".to_string(),
            email_field: "email".to_string(),
        }
    }

    pub fn kakao(client_id: String, client_secret: String) -> Self {
        Self {
            name: "kakao".to_string(),
            auth_url: "https://kauth.kakao.com/oauth/authorize".to_string(),
            token_url: "https://kauth.kakao.com/oauth/token".to_string(),
            userinfo_url: "https://kapi.kakao.com/v2/user/me".to_string(),
            client_id,
            client_secret,
            scopes: vec!["account_email".to_string()],
            user_id_field: "id".to_string(),
            email_field: "email".to_string(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
}

/// OAuth2 provider reached over HTTP (authorization-code grant)
pub struct HttpOAuthProvider {
    config: ProviderConfig,
    client: Client,
}

impl HttpOAuthProvider {
    pub fn new(config: ProviderConfig) -> Self {
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(30))
            .build()
            .unwrap_or_else(|_| Client::new());

        Self { config, client }
    }

    /// Reads a userinfo field as a string, accepting numeric ids as well
    /// (some providers return the user id as a JSON number)
    fn field_as_string(value: &serde_json::Value, field: &str) -> Option<String> {
        let v = value.get(field)?;
        if let Some(s) = v.as_str() {
            Some(s.to_string())
        } else {
            v.as_i64().map(|n| n.to_string())
        }
    }
}

#[async_trait]
impl OAuthProvider for HttpOAuthProvider {
    fn authorization_url(&self, redirect_uri: &str, state: &str) -> String {
        let scope_param = self.config.scopes.join(" ");
        format!(
            "{}?client_id={}&redirect_uri={}&response_type=code&scope={}&state={}",
            self.config.auth_url,
            urlencoding::encode(&self.config.client_id),
            urlencoding::encode(redirect_uri),
            urlencoding::encode(&scope_param),
            urlencoding::encode(state)
        )
    }

    async fn exchange_code(
        &self,
        code: &str,
        redirect_uri: &str,
    ) -> Result<Option<OAuthUserInfo>, OAuthError> {
        let params = [
            ("code", code),
            ("client_id", &self.config.client_id),
            ("client_secret", &self.config.client_secret),
            ("redirect_uri", redirect_uri),
            ("grant_type", "authorization_code"),
        ];

        debug!(provider = %self.config.name, "Exchanging authorization code for tokens");

        let response = self
            .client
            .post(&self.config.token_url)
            .form(&params)
            .send()
            .await
            .map_err(|e| OAuthError::RequestFailed(e.to_string()))?;

        let status = response.status();
        if status.is_client_error() {
            // The provider rejected the code itself
            let body = response.text().await.unwrap_or_default();
            warn!(provider = %self.config.name, http_status = %status, error = %body, "Token exchange rejected");
            return Ok(None);
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            error!(provider = %self.config.name, http_status = %status, error = %body, "Token exchange failed");
            return Err(OAuthError::RequestFailed(format!("HTTP {}: {}", status, body)));
        }

        let token = response
            .json::<TokenResponse>()
            .await
            .map_err(|e| OAuthError::InvalidResponse(e.to_string()))?;

        let userinfo = self
            .client
            .get(&self.config.userinfo_url)
            .bearer_auth(&token.access_token)
            .send()
            .await
            .map_err(|e| OAuthError::RequestFailed(e.to_string()))?;

        let status = userinfo.status();
        if status.is_client_error() {
            warn!(provider = %self.config.name, http_status = %status, "Userinfo request rejected");
            return Ok(None);
        }
        if !status.is_success() {
            return Err(OAuthError::RequestFailed(format!(
                "userinfo request failed with status {}",
                status
            )));
        }

        let profile: serde_json::Value = userinfo
            .json()
            .await
            .map_err(|e| OAuthError::InvalidResponse(e.to_string()))?;

        let provider_user_id = Self::field_as_string(&profile, &self.config.user_id_field);
        let email = Self::field_as_string(&profile, &self.config.email_field);

        match (provider_user_id, email) {
            (Some(provider_user_id), Some(email)) => Ok(Some(OAuthUserInfo {
                provider: self.config.name.clone(),
                provider_user_id,
                email,
            })),
            (id, mail) => {
                warn!(
                    provider = %self.config.name,
                    has_user_id = id.is_some(),
                    has_email = mail.is_some(),
                    "Userinfo response missing required fields"
                );
                Ok(None)
            }
        }
    }
}

/// Deterministic in-memory provider for tests: a fixed code → profile map
#[cfg(test)]
pub struct StaticOAuthProvider {
    auth_url: String,
    users: std::collections::HashMap<String, OAuthUserInfo>,
}

#[cfg(test)]
impl StaticOAuthProvider {
    pub fn new(
        auth_url: &str,
        users: std::collections::HashMap<String, OAuthUserInfo>,
    ) -> Self {
        Self {
            auth_url: auth_url.to_string(),
            users,
        }
    }
}

#[cfg(test)]
#[async_trait]
impl OAuthProvider for StaticOAuthProvider {
    fn authorization_url(&self, redirect_uri: &str, state: &str) -> String {
        format!(
            "{}?redirect_uri={}&state={}",
            self.auth_url,
            urlencoding::encode(redirect_uri),
            urlencoding::encode(state)
        )
    }

    async fn exchange_code(
        &self,
        code: &str,
        _redirect_uri: &str,
    ) -> Result<Option<OAuthUserInfo>, OAuthError> {
        Ok(self.users.get(code).cloned())
    }
}
