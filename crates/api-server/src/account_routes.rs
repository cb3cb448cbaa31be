//! Account API Routes
//!
//! Signup, login/logout and the current-user profile.

use axum::{
    extract::{rejection::JsonRejection, ConnectInfo, Extension, State},
    http::{HeaderMap, StatusCode},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;

use crate::auth::{client_ip, extract_bearer_token, AuthError};
use crate::directory::{NewUser, Role, UserProfile};
use crate::sessions::Session;
use crate::{AppError, AppState};

#[derive(Deserialize, utoipa::ToSchema)]
pub struct SignupRequest {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
    #[serde(default)]
    pub role: Option<String>,
}

#[derive(Serialize, utoipa::ToSchema)]
pub struct SignupResponse {
    pub message: String,
    pub user: UserProfile,
}

#[derive(Deserialize, utoipa::ToSchema)]
pub struct LoginRequest {
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
}

#[derive(Serialize, utoipa::ToSchema)]
pub struct LoginResponse {
    pub message: String,
    pub token: String,
    pub user: UserProfile,
}

#[derive(Serialize, utoipa::ToSchema)]
pub struct LogoutResponse {
    pub message: String,
}

/// Routes reachable without a session.
pub fn public_account_routes() -> Router<AppState> {
    Router::new()
        .route("/api/signup", post(signup))
        .route("/api/login", post(login))
}

/// Routes that require the auth middleware.
pub fn account_routes() -> Router<AppState> {
    Router::new()
        .route("/api/user", get(current_user))
        .route("/api/logout", post(logout))
}

/// Treat missing and blank strings alike.
fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

#[utoipa::path(
    post,
    path = "/api/signup",
    request_body = SignupRequest,
    responses(
        (status = 201, description = "Account created", body = SignupResponse),
        (status = 400, description = "Missing fields, bad role or duplicate email")
    ),
    tag = "Accounts"
)]
pub(crate) async fn signup(
    State(state): State<AppState>,
    payload: Result<Json<SignupRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<SignupResponse>), AppError> {
    let Json(req) = payload?;

    let (Some(name), Some(email), Some(password), Some(role)) = (
        non_empty(req.name),
        non_empty(req.email),
        non_empty(req.password),
        non_empty(req.role),
    ) else {
        return Err(AppError::bad_request("All fields are required."));
    };

    let role = Role::from_str(&role).ok_or_else(|| {
        AppError::bad_request(r#"Role must be either "patient" or "employee"."#)
    })?;

    let user = state
        .directory
        .insert_user(NewUser {
            name,
            email,
            password,
            role,
        })
        .await?;

    tracing::info!("New {} account created: {} (id {})", user.role, user.email, user.id);

    Ok((
        StatusCode::CREATED,
        Json(SignupResponse {
            message: "Signup successful!".to_string(),
            user: UserProfile::from(&user),
        }),
    ))
}

#[utoipa::path(
    post,
    path = "/api/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Bearer token issued", body = LoginResponse),
        (status = 400, description = "Missing or invalid credentials"),
        (status = 429, description = "Too many failed attempts")
    ),
    tag = "Accounts"
)]
pub(crate) async fn login(
    State(state): State<AppState>,
    connect_info: Option<ConnectInfo<SocketAddr>>,
    payload: Result<Json<LoginRequest>, JsonRejection>,
) -> Result<Json<LoginResponse>, AppError> {
    let Json(req) = payload?;

    let (Some(email), Some(password)) = (non_empty(req.email), non_empty(req.password)) else {
        return Err(AppError::bad_request("Email and password are required."));
    };

    let ip = client_ip(connect_info);
    if state.brute_force_guard.is_locked(&ip) {
        return Err(AuthError::Locked.into());
    }

    let user = match state.directory.find_user_by_email(&email).await {
        Some(user) if user.password.verify(&password) => user,
        _ => {
            tracing::warn!("Failed login for {}", email);
            state.brute_force_guard.record_failure(&ip);
            return Err(AppError::bad_request("Invalid email or password."));
        }
    };

    state.brute_force_guard.record_success(&ip);
    let token = state.sessions.issue(&user);
    tracing::info!("User {} logged in (role: {})", user.id, user.role);

    Ok(Json(LoginResponse {
        message: "Login successful!".to_string(),
        token,
        user: UserProfile::from(&user),
    }))
}

#[utoipa::path(
    get,
    path = "/api/user",
    responses(
        (status = 200, description = "Current account", body = UserProfile),
        (status = 404, description = "Account no longer exists")
    ),
    security(("bearer" = [])),
    tag = "Accounts"
)]
pub(crate) async fn current_user(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
) -> Result<Json<UserProfile>, AppError> {
    let user = state
        .directory
        .find_user(session.user_id)
        .await
        .ok_or_else(|| AppError::not_found("User not found."))?;

    Ok(Json(UserProfile::from(&user)))
}

#[utoipa::path(
    post,
    path = "/api/logout",
    responses((status = 200, description = "Session revoked", body = LogoutResponse)),
    security(("bearer" = [])),
    tag = "Accounts"
)]
pub(crate) async fn logout(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<LogoutResponse>, AppError> {
    let token = extract_bearer_token(&headers)?;
    state.sessions.revoke(&token);

    Ok(Json(LogoutResponse {
        message: "Logout successful!".to_string(),
    }))
}
