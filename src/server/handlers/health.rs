use axum::{extract::State, response::Json};
use serde_json::{json, Value};

use crate::config::PublicSettings;
use crate::server::app::AppState;
use crate::server::error::ApiResponse;

#[utoipa::path(
    get,
    path = "/health",
    responses((status = 200, description = "Service is up"))
)]
pub async fn health_check() -> Json<Value> {
    Json(json!({
        "status": "healthy",
        "service": "project-estimator",
        "version": env!("CARGO_PKG_VERSION")
    }))
}

/// URLs a client needs to reach this server.
#[utoipa::path(
    get,
    path = "/api/v1/settings",
    responses((status = 200, description = "Public client settings", body = PublicSettings))
)]
pub async fn public_settings(State(state): State<AppState>) -> Json<ApiResponse<PublicSettings>> {
    ApiResponse::ok(state.config.public_settings())
}
