use axum::{extract::State, routing::get, Json, Router};

use crate::directory::{Employee, Patient};
use crate::AppState;

pub fn directory_routes() -> Router<AppState> {
    Router::new()
        .route("/api/patients", get(list_patients))
        .route("/api/employees", get(list_employees))
}

#[utoipa::path(
    get,
    path = "/api/patients",
    responses((status = 200, description = "All patient records", body = Vec<Patient>)),
    security(("bearer" = [])),
    tag = "Directory"
)]
pub(crate) async fn list_patients(
    State(state): State<AppState>,
) -> Json<Vec<Patient>> {
    Json(state.directory.list_patients().await)
}

#[utoipa::path(
    get,
    path = "/api/employees",
    responses((status = 200, description = "All employee records", body = Vec<Employee>)),
    security(("bearer" = [])),
    tag = "Directory"
)]
pub(crate) async fn list_employees(
    State(state): State<AppState>,
) -> Json<Vec<Employee>> {
    Json(state.directory.list_employees().await)
}
