//! HeartCheck API server.
//!
//! Serves the dashboard pages, account endpoints and the authenticated
//! heart-disease risk prediction endpoint backed by [`risk_scorer`].

pub mod account_routes;
pub mod auth;
pub mod brute_force;
pub mod config;
pub mod directory;
pub mod directory_routes;
pub mod embedded_frontend;
pub mod openapi;
pub mod password;
pub mod predict_routes;
pub mod request_id;
pub mod security_headers;
pub mod sessions;

#[cfg(test)]
#[path = "router_tests.rs"]
mod router_tests;

use anyhow::Context;
use axum::{
    extract::{rejection::JsonRejection, Request},
    http::{header, HeaderValue, Method, StatusCode},
    middleware,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use risk_scorer::ScoreError;
use serde_json::json;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::trace::TraceLayer;
use utoipa::OpenApi;

use crate::auth::AuthError;
use crate::brute_force::BruteForceGuard;
use crate::config::ServerConfig;
use crate::directory::{
    Directory, DirectoryError, InMemoryDirectory, DEMO_EMPLOYEE_EMAIL, DEMO_PASSWORD,
    DEMO_PATIENT_EMAIL,
};
use crate::sessions::SessionStore;

const CLEANUP_INTERVAL: Duration = Duration::from_secs(60);

/// Shared state handed to every handler.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<ServerConfig>,
    pub directory: Arc<dyn Directory>,
    pub sessions: Arc<SessionStore>,
    pub brute_force_guard: Arc<BruteForceGuard>,
}

impl AppState {
    pub fn new(config: ServerConfig, directory: Arc<dyn Directory>) -> Self {
        let sessions = Arc::new(SessionStore::new(config.session_ttl));
        let brute_force_guard = Arc::new(BruteForceGuard::new(
            config.auth_max_failures,
            config.auth_failure_window,
            config.auth_lockout,
        ));

        Self {
            config: Arc::new(config),
            directory,
            sessions,
            brute_force_guard,
        }
    }
}

/// Handler error carrying the HTTP status to answer with.
///
/// Client errors (4xx) echo their message; server errors are logged and
/// the client only sees a generic message.
#[derive(Debug)]
pub struct AppError {
    status: StatusCode,
    error: anyhow::Error,
}

impl AppError {
    pub fn with_status(status: StatusCode, error: impl Into<anyhow::Error>) -> Self {
        Self {
            status,
            error: error.into(),
        }
    }

    pub fn bad_request(message: impl std::fmt::Display) -> Self {
        Self::with_status(StatusCode::BAD_REQUEST, anyhow::anyhow!("{message}"))
    }

    pub fn not_found(message: impl std::fmt::Display) -> Self {
        Self::with_status(StatusCode::NOT_FOUND, anyhow::anyhow!("{message}"))
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let message = if self.status.is_server_error() {
            tracing::error!("Request failed ({}): {:#}", self.status, self.error);
            "Internal server error.".to_string()
        } else {
            self.error.to_string()
        };

        (
            self.status,
            Json(json!({
                "success": false,
                "error": message,
            })),
        )
            .into_response()
    }
}

impl From<anyhow::Error> for AppError {
    fn from(error: anyhow::Error) -> Self {
        Self::with_status(StatusCode::INTERNAL_SERVER_ERROR, error)
    }
}

impl From<ScoreError> for AppError {
    fn from(error: ScoreError) -> Self {
        Self::with_status(StatusCode::BAD_REQUEST, error)
    }
}

impl From<DirectoryError> for AppError {
    fn from(error: DirectoryError) -> Self {
        match error {
            DirectoryError::EmailTaken => Self::with_status(StatusCode::BAD_REQUEST, error),
        }
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        Self::bad_request(format!("Invalid JSON body: {}", rejection.body_text()))
    }
}

impl From<AuthError> for AppError {
    fn from(error: AuthError) -> Self {
        let (status, message) = error.status_and_message();
        Self::with_status(status, anyhow::anyhow!(message))
    }
}

/// Assemble the full application router.
pub fn build_router(state: AppState) -> Router {
    let protected = Router::new()
        .merge(account_routes::account_routes())
        .merge(directory_routes::directory_routes())
        .merge(predict_routes::predict_routes())
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            auth::auth_middleware,
        ));

    Router::new()
        .route("/health", get(health))
        .route("/api-docs/openapi.json", get(openapi_json))
        .merge(account_routes::public_account_routes())
        .merge(protected)
        .fallback(embedded_frontend::static_handler)
        .layer(middleware::from_fn_with_state(
            state.clone(),
            security_headers::security_headers_middleware,
        ))
        .layer(cors_layer(&state.config))
        .layer(middleware::from_fn(request_id::request_id_middleware))
        .layer(
            TraceLayer::new_for_http().make_span_with(|request: &Request| {
                tracing::info_span!(
                    "http_request",
                    method = %request.method(),
                    path = %request.uri().path(),
                    request_id = tracing::field::Empty,
                )
            }),
        )
        .with_state(state)
}

fn cors_layer(config: &ServerConfig) -> CorsLayer {
    match &config.cors_origins {
        Some(origins) => {
            let origins: Vec<HeaderValue> = origins
                .iter()
                .filter_map(|origin| match origin.parse() {
                    Ok(value) => Some(value),
                    Err(_) => {
                        tracing::warn!("Ignoring invalid CORS origin: {}", origin);
                        None
                    }
                })
                .collect();
            CorsLayer::new()
                .allow_origin(AllowOrigin::list(origins))
                .allow_methods([Method::GET, Method::POST])
                .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE])
        }
        None => CorsLayer::permissive(),
    }
}

async fn health() -> Json<serde_json::Value> {
    Json(json!({
        "status": "ok",
        "service": "heartcheck-api",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

async fn openapi_json() -> Json<utoipa::openapi::OpenApi> {
    Json(openapi::ApiDoc::openapi())
}

fn init_tracing() {
    let json_logging = std::env::var("RUST_LOG_FORMAT")
        .map(|v| v.eq_ignore_ascii_case("json"))
        .unwrap_or(false);
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));

    if json_logging {
        tracing_subscriber::fmt().json().with_env_filter(filter).init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }
}

/// Periodically drop expired sessions and stale brute-force records.
fn spawn_cleanup_task(state: AppState) {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(CLEANUP_INTERVAL);
        loop {
            interval.tick().await;
            let purged = state.sessions.purge_expired();
            state.brute_force_guard.cleanup();
            if purged > 0 {
                tracing::debug!("Purged {} expired sessions", purged);
            }
        }
    });
}

fn log_demo_credentials() {
    tracing::info!("=== Demo Credentials ===");
    tracing::info!("Patient login:  {} / {}", DEMO_PATIENT_EMAIL, DEMO_PASSWORD);
    tracing::info!("Employee login: {} / {}", DEMO_EMPLOYEE_EMAIL, DEMO_PASSWORD);
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to listen for SIGINT: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to listen for SIGTERM: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => tracing::info!("SIGINT signal received: closing HTTP server"),
        _ = terminate => tracing::info!("SIGTERM signal received: closing HTTP server"),
    }
}

pub async fn run_server() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    init_tracing();

    let config = ServerConfig::from_env()?;
    let directory: Arc<dyn Directory> = if config.seed_demo_data {
        Arc::new(InMemoryDirectory::with_demo_data())
    } else {
        Arc::new(InMemoryDirectory::new())
    };

    let addr = config.socket_addr();
    let seed_demo_data = config.seed_demo_data;
    let state = AppState::new(config, directory);
    spawn_cleanup_task(state.clone());

    let app = build_router(state);
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;

    tracing::info!("Server is running on http://{}", addr);
    if seed_demo_data {
        log_demo_credentials();
    }

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await
    .context("HTTP server error")?;

    tracing::info!("HTTP server closed");
    Ok(())
}
