use axum::{
    extract::{ConnectInfo, Request, State},
    http::{HeaderMap, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use sha2::{Digest, Sha256};
use std::net::SocketAddr;

use crate::AppState;

/// Hash a bearer token with SHA-256 for session lookup.
/// Session keys are fixed 64-char hex digests, never the token itself.
pub(crate) fn hash_token(token: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(token.as_bytes());
    hex::encode(hasher.finalize())
}

#[cfg(test)]
#[path = "auth_tests.rs"]
mod auth_tests;

/// Bearer-token authentication middleware with brute-force protection.
///
/// Reads the token from `Authorization: Bearer <token>`, resolves it
/// against the session store and inserts the [`Session`](crate::sessions::Session)
/// into the request extensions for handlers.
pub async fn auth_middleware(
    State(state): State<AppState>,
    connect_info: Option<ConnectInfo<SocketAddr>>,
    headers: HeaderMap,
    mut request: Request,
    next: Next,
) -> Result<Response, AuthError> {
    let ip = client_ip(connect_info);

    if state.brute_force_guard.is_locked(&ip) {
        return Err(AuthError::Locked);
    }

    let token = extract_bearer_token(&headers)?;

    // Only a successful login clears the failure count for an IP.
    let session = match state.sessions.validate(&token) {
        Some(session) => session,
        None => {
            tracing::warn!("Invalid session token attempted: {}", mask_token(&token));
            state.brute_force_guard.record_failure(&ip);
            return Err(AuthError::InvalidToken);
        }
    };

    tracing::debug!(
        "Authenticated user {} (role: {})",
        session.user_id,
        session.role
    );

    request.extensions_mut().insert(session);

    Ok(next.run(request).await)
}

pub(crate) fn client_ip(connect_info: Option<ConnectInfo<SocketAddr>>) -> String {
    connect_info
        .map(|ci| ci.0.ip().to_string())
        .unwrap_or_else(|| "unknown".to_string())
}

/// Extract the token from an `Authorization: Bearer <token>` header
pub(crate) fn extract_bearer_token(headers: &HeaderMap) -> Result<String, AuthError> {
    if let Some(auth) = headers.get("Authorization") {
        if let Ok(auth_str) = auth.to_str() {
            if let Some(token) = auth_str.strip_prefix("Bearer ") {
                let token = token.trim();
                if !token.is_empty() {
                    return Ok(token.to_string());
                }
            }
        }
    }

    Err(AuthError::MissingToken)
}

/// Mask a token for logging (show first 4 and last 4 characters)
pub(crate) fn mask_token(token: &str) -> String {
    if token.len() <= 8 || !token.is_ascii() {
        return "****".to_string();
    }
    format!("{}...{}", &token[..4], &token[token.len() - 4..])
}

/// Authentication errors
#[derive(Debug)]
pub enum AuthError {
    MissingToken,
    InvalidToken,
    Locked,
}

impl std::fmt::Display for AuthError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AuthError::MissingToken => write!(f, "Missing bearer token"),
            AuthError::InvalidToken => write!(f, "Invalid bearer token"),
            AuthError::Locked => write!(f, "Too many failed authentication attempts"),
        }
    }
}

impl std::error::Error for AuthError {}

impl AuthError {
    /// Status code and client-facing message
    pub(crate) fn status_and_message(&self) -> (StatusCode, &'static str) {
        match self {
            AuthError::MissingToken => (
                StatusCode::UNAUTHORIZED,
                "Access denied. No token provided.",
            ),
            AuthError::InvalidToken => (StatusCode::FORBIDDEN, "Invalid token."),
            AuthError::Locked => (
                StatusCode::TOO_MANY_REQUESTS,
                "Too many failed authentication attempts. Please try again later.",
            ),
        }
    }
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let (status, message) = self.status_and_message();

        (
            status,
            Json(json!({
                "success": false,
                "error": message,
            })),
        )
            .into_response()
    }
}
