// src/logging_middleware.rs
//! Middleware for logging request and response bodies in debug mode
//!
//! Credentials and tokens are redacted before anything is logged.

use axum::body::to_bytes;
use axum::http::{header::CONTENT_LENGTH, HeaderMap};
use axum::{body::Body, extract::Request, http::StatusCode, middleware::Next, response::Response};
use tracing::{debug, enabled, Level};

use crate::common::helpers::redact_sensitive_fields;

/// Largest request body buffered for logging; auth payloads are tiny
const MAX_LOGGED_BODY: usize = 64 * 1024;

fn render_body(bytes: &[u8]) -> Option<String> {
    if bytes.is_empty() {
        return None;
    }
    let mut json = serde_json::from_slice::<serde_json::Value>(bytes).ok()?;
    redact_sensitive_fields(&mut json);
    serde_json::to_string_pretty(&json).ok()
}

/// Only bodies with a declared length within the limit are buffered
fn loggable_length(headers: &HeaderMap) -> bool {
    headers
        .get(CONTENT_LENGTH)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.parse::<usize>().ok())
        .is_some_and(|len| len <= MAX_LOGGED_BODY)
}

/// Middleware to log request and response bodies in debug mode
///
/// Never changes the outcome of a request: bodies it won't buffer pass
/// through untouched.
pub async fn log_request_response(request: Request, next: Next) -> Result<Response, StatusCode> {
    if !enabled!(Level::DEBUG) {
        return Ok(next.run(request).await);
    }

    let request = if loggable_length(request.headers()) {
        let (parts, body) = request.into_parts();
        let bytes = to_bytes(body, MAX_LOGGED_BODY)
            .await
            .map_err(|_| StatusCode::BAD_REQUEST)?;

        // Non-JSON bodies are not logged: they can't be redacted field by field
        if let Some(body) = render_body(&bytes) {
            debug!(method = %parts.method, uri = %parts.uri, request_body = %body, "📥 Request");
        }
        Request::from_parts(parts, Body::from(bytes))
    } else {
        debug!(method = %request.method(), uri = %request.uri(), "📥 Request (body not logged)");
        request
    };

    let response = next.run(request).await;

    let (parts, body) = response.into_parts();
    let bytes = to_bytes(body, usize::MAX)
        .await
        .map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)?;

    if let Some(body) = render_body(&bytes) {
        debug!(status = %parts.status, response_body = %body, "📤 Response");
    }

    Ok(Response::from_parts(parts, Body::from(bytes)))
}
