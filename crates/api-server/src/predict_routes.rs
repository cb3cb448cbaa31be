//! Heart-disease risk prediction endpoint.

use axum::{
    extract::{rejection::JsonRejection, Extension},
    routing::post,
    Json, Router,
};
use risk_scorer::{RiskInput, RiskOutput};
use serde_json::Value;

use crate::sessions::Session;
use crate::{AppError, AppState};

pub fn predict_routes() -> Router<AppState> {
    Router::new().route("/api/predict", post(predict))
}

#[utoipa::path(
    post,
    path = "/api/predict",
    request_body = RiskInput,
    responses(
        (status = 200, description = "Risk assessment", body = RiskOutput),
        (status = 400, description = "Missing or non-numeric clinical field")
    ),
    security(("bearer" = [])),
    tag = "Prediction"
)]
pub(crate) async fn predict(
    Extension(session): Extension<Session>,
    payload: Result<Json<Value>, JsonRejection>,
) -> Result<Json<RiskOutput>, AppError> {
    let Json(body) = payload?;
    let input = RiskInput::from_json(&body)?;

    let output = risk_scorer::score(&input);

    tracing::debug!(
        "Prediction for user {}: {} ({}%, score {})",
        session.user_id,
        output.prediction,
        output.probability,
        output.risk_score
    );

    Ok(Json(output))
}
