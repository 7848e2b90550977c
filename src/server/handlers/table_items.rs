use axum::{
    extract::{rejection::JsonRejection, Path, State},
    response::Json,
};

use crate::server::app::AppState;
use crate::server::error::{ApiResponse, ApiResult};
use crate::services::table_items::{ReconcileOutcome, TableRow};
use crate::services::{TableItemsService, ValidationService};

#[utoipa::path(
    get,
    path = "/api/v1/projects/{id}/table-items",
    params(("id" = String, Path, description = "Project ID")),
    responses(
        (status = 200, description = "One row per task, depth first", body = [TableRow]),
        (status = 400, description = "Malformed project ID"),
        (status = 404, description = "Project not found")
    )
)]
pub async fn list_table_items(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<ApiResponse<Vec<TableRow>>>> {
    let project_id = ValidationService::parse_id(&id, "project")?;
    let rows = TableItemsService::new(state.db, state.writes)
        .flatten(project_id)
        .await?;
    Ok(ApiResponse::ok(rows))
}

/// Replace the project's epics, features and tasks with the submitted rows.
#[utoipa::path(
    put,
    path = "/api/v1/projects/{id}/table-items",
    params(("id" = String, Path, description = "Project ID")),
    request_body = [TableRow],
    responses(
        (status = 200, description = "Tree replaced", body = ReconcileOutcome),
        (status = 400, description = "Malformed ID or rows"),
        (status = 404, description = "Project not found")
    )
)]
pub async fn replace_table_items(
    State(state): State<AppState>,
    Path(id): Path<String>,
    payload: Result<Json<Vec<TableRow>>, JsonRejection>,
) -> ApiResult<Json<ApiResponse<ReconcileOutcome>>> {
    let project_id = ValidationService::parse_id(&id, "project")?;
    let Json(rows) = payload?;
    let outcome = TableItemsService::new(state.db, state.writes)
        .reconcile(project_id, rows)
        .await?;
    Ok(ApiResponse::ok(outcome))
}
