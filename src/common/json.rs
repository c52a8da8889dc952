//! JSON extractor whose rejections render as `ApiError::ValidationError`

use axum::extract::FromRequest;

use super::ApiError;

/// Drop-in replacement for `axum::Json` on request bodies.
///
/// Missing fields, wrong types and unparseable bodies are rejected before the
/// handler runs, with the same `{message, code}` shape as every other error.
#[derive(FromRequest, Debug)]
#[from_request(via(axum::Json), rejection(ApiError))]
pub struct AppJson<T>(pub T);
