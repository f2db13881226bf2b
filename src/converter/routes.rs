//! Tone conversion routes

use axum::{routing::post, Router};

use super::handlers;

/// Creates and returns the converter router
///
/// # Routes
/// - `POST /api/convert` - Convert a message to a target tone
pub fn converter_routes() -> Router {
    Router::new().route("/api/convert", post(handlers::convert_message))
}
