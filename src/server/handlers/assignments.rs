use axum::{
    extract::{rejection::JsonRejection, Path, State},
    response::Json,
};

use crate::database::entities::{task_roles, timelines};
use crate::server::app::AppState;
use crate::server::error::{ApiResponse, ApiResult, MessageResponse};
use crate::services::assignment_service::{TaskRoleInput, TimelineInput};
use crate::services::{AssignmentService, ValidationService};

fn parse_pair(first: &str, first_entity: &str, second: &str, second_entity: &str) -> ApiResult<(i32, i32)> {
    Ok((
        ValidationService::parse_id(first, first_entity)?,
        ValidationService::parse_id(second, second_entity)?,
    ))
}

#[utoipa::path(
    post,
    path = "/api/v1/task-roles",
    request_body = TaskRoleInput,
    responses(
        (status = 200, description = "Role attached to task", body = task_roles::Model),
        (status = 409, description = "Role already attached")
    )
)]
pub async fn create_task_role(
    State(state): State<AppState>,
    payload: Result<Json<TaskRoleInput>, JsonRejection>,
) -> ApiResult<Json<ApiResponse<task_roles::Model>>> {
    let Json(input) = payload?;
    let task_role = AssignmentService::new(state.db).create_task_role(input).await?;
    Ok(ApiResponse::ok(task_role))
}

#[utoipa::path(
    get,
    path = "/api/v1/task-roles/{task_id}/{role_id}",
    params(
        ("task_id" = String, Path, description = "Task ID"),
        ("role_id" = String, Path, description = "Role ID")
    ),
    responses(
        (status = 200, description = "Task role found", body = task_roles::Model),
        (status = 404, description = "Task role not found")
    )
)]
pub async fn get_task_role(
    State(state): State<AppState>,
    Path((task_id, role_id)): Path<(String, String)>,
) -> ApiResult<Json<ApiResponse<task_roles::Model>>> {
    let (task_id, role_id) = parse_pair(&task_id, "task", &role_id, "role")?;
    let task_role = AssignmentService::new(state.db)
        .get_task_role(task_id, role_id)
        .await?;
    Ok(ApiResponse::ok(task_role))
}

#[utoipa::path(
    delete,
    path = "/api/v1/task-roles/{task_id}/{role_id}",
    params(
        ("task_id" = String, Path, description = "Task ID"),
        ("role_id" = String, Path, description = "Role ID")
    ),
    responses((status = 200, description = "Task role deleted", body = MessageResponse))
)]
pub async fn delete_task_role(
    State(state): State<AppState>,
    Path((task_id, role_id)): Path<(String, String)>,
) -> ApiResult<Json<MessageResponse>> {
    let (task_id, role_id) = parse_pair(&task_id, "task", &role_id, "role")?;
    AssignmentService::new(state.db)
        .delete_task_role(task_id, role_id)
        .await?;
    Ok(MessageResponse::ok("Task role deleted successfully"))
}

#[utoipa::path(
    post,
    path = "/api/v1/timelines",
    request_body = TimelineInput,
    responses(
        (status = 200, description = "Timeline created", body = timelines::Model),
        (status = 409, description = "Timeline already exists")
    )
)]
pub async fn create_timeline(
    State(state): State<AppState>,
    payload: Result<Json<TimelineInput>, JsonRejection>,
) -> ApiResult<Json<ApiResponse<timelines::Model>>> {
    let Json(input) = payload?;
    let timeline = AssignmentService::new(state.db).create_timeline(input).await?;
    Ok(ApiResponse::ok(timeline))
}

#[utoipa::path(
    get,
    path = "/api/v1/timelines/{task_id}/{project_id}",
    params(
        ("task_id" = String, Path, description = "Task ID"),
        ("project_id" = String, Path, description = "Project ID")
    ),
    responses(
        (status = 200, description = "Timeline found", body = timelines::Model),
        (status = 404, description = "Timeline not found")
    )
)]
pub async fn get_timeline(
    State(state): State<AppState>,
    Path((task_id, project_id)): Path<(String, String)>,
) -> ApiResult<Json<ApiResponse<timelines::Model>>> {
    let (task_id, project_id) = parse_pair(&task_id, "task", &project_id, "project")?;
    let timeline = AssignmentService::new(state.db)
        .get_timeline(task_id, project_id)
        .await?;
    Ok(ApiResponse::ok(timeline))
}

#[utoipa::path(
    delete,
    path = "/api/v1/timelines/{task_id}/{project_id}",
    params(
        ("task_id" = String, Path, description = "Task ID"),
        ("project_id" = String, Path, description = "Project ID")
    ),
    responses((status = 200, description = "Timeline deleted", body = MessageResponse))
)]
pub async fn delete_timeline(
    State(state): State<AppState>,
    Path((task_id, project_id)): Path<(String, String)>,
) -> ApiResult<Json<MessageResponse>> {
    let (task_id, project_id) = parse_pair(&task_id, "task", &project_id, "project")?;
    AssignmentService::new(state.db)
        .delete_timeline(task_id, project_id)
        .await?;
    Ok(MessageResponse::ok("Timeline deleted successfully"))
}
