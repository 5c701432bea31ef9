use std::sync::Arc;

use axum::extract::State;
use axum::http::{Request, StatusCode};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use subtle::ConstantTimeEq;

use parley_core::ChatBackend;

use crate::dto::ErrorResponse;
use crate::state::AppState;

/// Middleware that validates `Authorization: Bearer <token>` against the
/// configured auth token. When no token is configured the API is open and
/// requests pass through untouched.
pub async fn require_auth_token<B: ChatBackend + 'static>(
    State(state): State<Arc<AppState<B>>>,
    request: Request<axum::body::Body>,
    next: Next,
) -> Response {
    let expected = match &state.auth_token {
        Some(token) => token,
        None => return next.run(request).await,
    };

    let auth_header = request
        .headers()
        .get("authorization")
        .and_then(|v| v.to_str().ok());

    let authenticated = match auth_header {
        Some(header) => header.strip_prefix("Bearer ").is_some_and(|token| {
            // Constant-time comparison to prevent timing attacks on token validation.
            bool::from(token.as_bytes().ct_eq(expected.as_bytes()))
        }),
        None => false,
    };

    if !authenticated {
        let body = ErrorResponse {
            error: "unauthorized".to_string(),
            message: "Missing or invalid Authorization header. Expected: Bearer <auth_token>"
                .to_string(),
        };
        return (StatusCode::UNAUTHORIZED, axum::Json(body)).into_response();
    }

    next.run(request).await
}
