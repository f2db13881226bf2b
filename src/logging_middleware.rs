// src/logging_middleware.rs
//! Middleware for logging request and response bodies in debug mode

use axum::body::{to_bytes, Body};
use axum::{extract::Request, http::StatusCode, middleware::Next, response::Response};
use tracing::debug;

fn render_body(bytes: &[u8]) -> Option<String> {
    let body_str = std::str::from_utf8(bytes).ok()?;
    // Pretty-print JSON bodies, pass anything else through as-is
    match serde_json::from_str::<serde_json::Value>(body_str) {
        Ok(json) => Some(serde_json::to_string_pretty(&json).unwrap_or_else(|_| body_str.to_string())),
        Err(_) => Some(body_str.to_string()),
    }
}

/// Logs request and response bodies at debug level
pub async fn log_request_response(request: Request, next: Next) -> Result<Response, StatusCode> {
    let (parts, body) = request.into_parts();

    let bytes = to_bytes(body, usize::MAX)
        .await
        .map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)?;

    if !bytes.is_empty() {
        if let Some(rendered) = render_body(&bytes) {
            debug!(
                method = %parts.method,
                uri = %parts.uri,
                request_body = %rendered,
                "Request"
            );
        }
    }

    let request = Request::from_parts(parts, Body::from(bytes));
    let response = next.run(request).await;

    let (parts, body) = response.into_parts();

    let bytes = to_bytes(body, usize::MAX)
        .await
        .map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)?;

    if !bytes.is_empty() {
        if let Some(rendered) = render_body(&bytes) {
            debug!(
                status = %parts.status,
                response_body = %rendered,
                "Response"
            );
        }
    }

    Ok(Response::from_parts(parts, Body::from(bytes)))
}
