//! Authentication routes

use axum::{routing::get, Router};

use super::handlers;

/// Creates and returns the authentication router
///
/// # Routes
/// - `GET /auth/:provider/login` - OAuth login URL issuance
/// - `GET /auth/:provider/callback` - OAuth callback and session issuance
/// - `GET /api/me` - Current user information
pub fn auth_routes() -> Router {
    Router::new()
        .route("/auth/:provider/login", get(handlers::oauth_login_url))
        .route("/auth/:provider/callback", get(handlers::oauth_callback))
        .route("/api/me", get(handlers::me_handler))
}
