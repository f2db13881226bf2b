//! Repositories for users, OAuth identities, and sessions
//!
//! SQLite implementations back the running server; unit tests use the
//! in-memory doubles from the `memory` module.

use async_trait::async_trait;
use sqlx::SqlitePool;

use super::models::{OAuthIdentity, Session, User};
use crate::common::ApiError;

#[async_trait]
pub trait UserRepository: Send + Sync {
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, ApiError>;
    async fn find_by_id(&self, id: &str) -> Result<Option<User>, ApiError>;
    async fn save(&self, user: &User) -> Result<(), ApiError>;
}

#[async_trait]
pub trait OAuthIdentityRepository: Send + Sync {
    async fn find_by_provider_and_user_id(
        &self,
        provider: &str,
        provider_user_id: &str,
    ) -> Result<Option<OAuthIdentity>, ApiError>;
    async fn save(&self, identity: &OAuthIdentity) -> Result<(), ApiError>;
}

#[async_trait]
pub trait SessionRepository: Send + Sync {
    async fn find_by_session_id(&self, session_id: &str) -> Result<Option<Session>, ApiError>;
    async fn save(&self, session: &Session) -> Result<(), ApiError>;
}

pub struct SqliteUserRepository {
    pool: SqlitePool,
}

impl SqliteUserRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserRepository for SqliteUserRepository {
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, ApiError> {
        sqlx::query_as::<_, User>("SELECT * FROM users WHERE email = ?")
            .bind(email)
            .fetch_optional(&self.pool)
            .await
            .map_err(ApiError::DatabaseError)
    }

    async fn find_by_id(&self, id: &str) -> Result<Option<User>, ApiError> {
        sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(ApiError::DatabaseError)
    }

    async fn save(&self, user: &User) -> Result<(), ApiError> {
        sqlx::query("INSERT INTO users (id, email, mbti, gender) VALUES (?, ?, ?, ?)")
            .bind(&user.id)
            .bind(&user.email)
            .bind(user.mbti.as_deref())
            .bind(user.gender.as_deref())
            .execute(&self.pool)
            .await
            .map_err(ApiError::DatabaseError)?;
        Ok(())
    }
}

pub struct SqliteOAuthIdentityRepository {
    pool: SqlitePool,
}

impl SqliteOAuthIdentityRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl OAuthIdentityRepository for SqliteOAuthIdentityRepository {
    async fn find_by_provider_and_user_id(
        &self,
        provider: &str,
        provider_user_id: &str,
    ) -> Result<Option<OAuthIdentity>, ApiError> {
        sqlx::query_as::<_, OAuthIdentity>(
            "SELECT * FROM oauth_identities WHERE provider = ? AND provider_user_id = ?",
        )
        .bind(provider)
        .bind(provider_user_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(ApiError::DatabaseError)
    }

    async fn save(&self, identity: &OAuthIdentity) -> Result<(), ApiError> {
        sqlx::query(
            "INSERT INTO oauth_identities (provider, provider_user_id, email) VALUES (?, ?, ?)",
        )
        .bind(&identity.provider)
        .bind(&identity.provider_user_id)
        .bind(&identity.email)
        .execute(&self.pool)
        .await
        .map_err(ApiError::DatabaseError)?;
        Ok(())
    }
}

pub struct SqliteSessionRepository {
    pool: SqlitePool,
}

impl SqliteSessionRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl SessionRepository for SqliteSessionRepository {
    async fn find_by_session_id(&self, session_id: &str) -> Result<Option<Session>, ApiError> {
        sqlx::query_as::<_, Session>("SELECT * FROM sessions WHERE session_id = ?")
            .bind(session_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(ApiError::DatabaseError)
    }

    async fn save(&self, session: &Session) -> Result<(), ApiError> {
        sqlx::query("INSERT INTO sessions (session_id, user_id) VALUES (?, ?)")
            .bind(&session.session_id)
            .bind(&session.user_id)
            .execute(&self.pool)
            .await
            .map_err(ApiError::DatabaseError)?;
        Ok(())
    }
}
