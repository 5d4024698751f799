//! Authentication middleware
//!
//! Provides API key authentication for the `/api` endpoints.

use axum::{
    extract::{Request, State},
    http::header,
    middleware::Next,
    response::Response,
};
use subtle::ConstantTimeEq;
use tracing::warn;

use crate::error::ApiError;
use crate::server::AppState;

/// API key authentication middleware
///
/// If no key is configured every request is allowed.
pub async fn auth_middleware(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let provided = request
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "));

    if !validate_api_key(provided, state.config.api.key.as_deref()) {
        warn!(path = %request.uri().path(), "API key rejected");
        return Err(ApiError::AuthFailed);
    }

    Ok(next.run(request).await)
}

/// API key validation
///
/// Keys are compared in constant time; only the length can leak.
pub fn validate_api_key(provided: Option<&str>, expected: Option<&str>) -> bool {
    match (provided, expected) {
        (Some(p), Some(e)) => p.as_bytes().ct_eq(e.as_bytes()).into(),
        (_, None) => true,        // No key configured, allow
        (None, Some(_)) => false, // Key required but not provided
    }
}
