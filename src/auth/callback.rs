//! OAuth callback orchestration
//!
//! Decides whether a verified (provider, provider_user_id, email) triple
//! belongs to a known identity, an existing user signing in through a new
//! provider, or a brand-new user, and always issues a fresh session.

use std::sync::Arc;

use tracing::{info, warn};

use super::models::{OAuthIdentity, Session, User};
use super::repository::{OAuthIdentityRepository, SessionRepository, UserRepository};
use crate::common::{generate_id, safe_email_log, ApiError, EntityPrefix};

/// Result of a successful callback
#[derive(Debug)]
pub struct CallbackResult {
    pub session_id: String,
}

pub struct OAuthCallback {
    identities: Arc<dyn OAuthIdentityRepository>,
    users: Arc<dyn UserRepository>,
    sessions: Arc<dyn SessionRepository>,
}

impl OAuthCallback {
    pub fn new(
        identities: Arc<dyn OAuthIdentityRepository>,
        users: Arc<dyn UserRepository>,
        sessions: Arc<dyn SessionRepository>,
    ) -> Self {
        Self {
            identities,
            users,
            sessions,
        }
    }

    /// Processes a verified OAuth profile and returns a fresh session id.
    ///
    /// For a known (provider, provider_user_id) pair, the email stored on
    /// the identity is authoritative: the session is routed to the user
    /// owning that email, not the freshly supplied one.
    pub async fn execute(
        &self,
        provider: &str,
        provider_user_id: &str,
        email: &str,
    ) -> Result<CallbackResult, ApiError> {
        // Constructing the identity validates the triple up front
        let candidate = OAuthIdentity::new(provider, provider_user_id, email)
            .map_err(ApiError::ValidationError)?;

        let existing = self
            .identities
            .find_by_provider_and_user_id(provider, provider_user_id)
            .await?;

        let user = match existing {
            Some(identity) => self
                .users
                .find_by_email(&identity.email)
                .await?
                .ok_or_else(|| {
                    warn!(
                        provider = %provider,
                        email = %safe_email_log(&identity.email),
                        "OAuth identity references a missing user"
                    );
                    ApiError::InternalServer("account record is inconsistent".to_string())
                })?,
            None => {
                let user = match self.users.find_by_email(email).await? {
                    Some(existing_user) => existing_user,
                    None => {
                        let user = User::new(generate_id(EntityPrefix::User), email.to_string())
                            .map_err(ApiError::ValidationError)?;
                        self.users.save(&user).await?;
                        info!(
                            user_id = %user.id,
                            email = %safe_email_log(email),
                            provider = %provider,
                            "Created new user account via OAuth"
                        );
                        user
                    }
                };

                self.identities.save(&candidate).await?;
                user
            }
        };

        let session = Session::issue(&user.id);
        self.sessions.save(&session).await?;

        info!(
            user_id = %user.id,
            provider = %provider,
            "Issued session for OAuth login"
        );

        Ok(CallbackResult {
            session_id: session.session_id,
        })
    }
}
