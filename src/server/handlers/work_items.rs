use axum::{
    extract::{rejection::JsonRejection, Path, State},
    response::Json,
};

use crate::database::entities::{epics, features, tasks};
use crate::server::app::AppState;
use crate::server::error::{ApiResponse, ApiResult, MessageResponse};
use crate::services::work_item_service::{
    CreateEpicInput, CreateFeatureInput, CreateTaskInput, EpicDetails, FeatureDetails, TaskDetails,
    TaskFields, UpdateGroupInput,
};
use crate::services::{ValidationService, WorkItemService};

#[utoipa::path(
    post,
    path = "/api/v1/epics",
    request_body = CreateEpicInput,
    responses(
        (status = 200, description = "Epic created", body = epics::Model),
        (status = 400, description = "Invalid body or unknown project")
    )
)]
pub async fn create_epic(
    State(state): State<AppState>,
    payload: Result<Json<CreateEpicInput>, JsonRejection>,
) -> ApiResult<Json<ApiResponse<epics::Model>>> {
    let Json(input) = payload?;
    let epic = WorkItemService::new(state.db).create_epic(input).await?;
    Ok(ApiResponse::ok(epic))
}

#[utoipa::path(
    get,
    path = "/api/v1/epics/{id}",
    params(("id" = String, Path, description = "Epic ID")),
    responses(
        (status = 200, description = "Epic with project and features", body = EpicDetails),
        (status = 404, description = "Epic not found")
    )
)]
pub async fn get_epic(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<ApiResponse<EpicDetails>>> {
    let id = ValidationService::parse_id(&id, "epic")?;
    let epic = WorkItemService::new(state.db).get_epic(id).await?;
    Ok(ApiResponse::ok(epic))
}

#[utoipa::path(
    put,
    path = "/api/v1/epics/{id}",
    params(("id" = String, Path, description = "Epic ID")),
    request_body = UpdateGroupInput,
    responses((status = 200, description = "Epic updated", body = epics::Model))
)]
pub async fn update_epic(
    State(state): State<AppState>,
    Path(id): Path<String>,
    payload: Result<Json<UpdateGroupInput>, JsonRejection>,
) -> ApiResult<Json<ApiResponse<epics::Model>>> {
    let id = ValidationService::parse_id(&id, "epic")?;
    let Json(input) = payload?;
    let epic = WorkItemService::new(state.db).update_epic(id, input).await?;
    Ok(ApiResponse::ok(epic))
}

#[utoipa::path(
    delete,
    path = "/api/v1/epics/{id}",
    params(("id" = String, Path, description = "Epic ID")),
    responses(
        (status = 200, description = "Epic deleted", body = MessageResponse),
        (status = 409, description = "Epic still has features")
    )
)]
pub async fn delete_epic(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<MessageResponse>> {
    let id = ValidationService::parse_id(&id, "epic")?;
    WorkItemService::new(state.db).delete_epic(id).await?;
    Ok(MessageResponse::ok("Epic deleted successfully"))
}

#[utoipa::path(
    post,
    path = "/api/v1/features",
    request_body = CreateFeatureInput,
    responses((status = 200, description = "Feature created", body = features::Model))
)]
pub async fn create_feature(
    State(state): State<AppState>,
    payload: Result<Json<CreateFeatureInput>, JsonRejection>,
) -> ApiResult<Json<ApiResponse<features::Model>>> {
    let Json(input) = payload?;
    let feature = WorkItemService::new(state.db).create_feature(input).await?;
    Ok(ApiResponse::ok(feature))
}

#[utoipa::path(
    get,
    path = "/api/v1/features/{id}",
    params(("id" = String, Path, description = "Feature ID")),
    responses(
        (status = 200, description = "Feature with epic and tasks", body = FeatureDetails),
        (status = 404, description = "Feature not found")
    )
)]
pub async fn get_feature(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<ApiResponse<FeatureDetails>>> {
    let id = ValidationService::parse_id(&id, "feature")?;
    let feature = WorkItemService::new(state.db).get_feature(id).await?;
    Ok(ApiResponse::ok(feature))
}

#[utoipa::path(
    put,
    path = "/api/v1/features/{id}",
    params(("id" = String, Path, description = "Feature ID")),
    request_body = UpdateGroupInput,
    responses((status = 200, description = "Feature updated", body = features::Model))
)]
pub async fn update_feature(
    State(state): State<AppState>,
    Path(id): Path<String>,
    payload: Result<Json<UpdateGroupInput>, JsonRejection>,
) -> ApiResult<Json<ApiResponse<features::Model>>> {
    let id = ValidationService::parse_id(&id, "feature")?;
    let Json(input) = payload?;
    let feature = WorkItemService::new(state.db).update_feature(id, input).await?;
    Ok(ApiResponse::ok(feature))
}

#[utoipa::path(
    delete,
    path = "/api/v1/features/{id}",
    params(("id" = String, Path, description = "Feature ID")),
    responses(
        (status = 200, description = "Feature deleted", body = MessageResponse),
        (status = 409, description = "Feature still has tasks")
    )
)]
pub async fn delete_feature(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<MessageResponse>> {
    let id = ValidationService::parse_id(&id, "feature")?;
    WorkItemService::new(state.db).delete_feature(id).await?;
    Ok(MessageResponse::ok("Feature deleted successfully"))
}

#[utoipa::path(
    post,
    path = "/api/v1/tasks",
    request_body = CreateTaskInput,
    responses((status = 200, description = "Task created", body = tasks::Model))
)]
pub async fn create_task(
    State(state): State<AppState>,
    payload: Result<Json<CreateTaskInput>, JsonRejection>,
) -> ApiResult<Json<ApiResponse<tasks::Model>>> {
    let Json(input) = payload?;
    let task = WorkItemService::new(state.db).create_task(input).await?;
    Ok(ApiResponse::ok(task))
}

#[utoipa::path(
    get,
    path = "/api/v1/tasks/{id}",
    params(("id" = String, Path, description = "Task ID")),
    responses(
        (status = 200, description = "Task with feature, roles and timelines", body = TaskDetails),
        (status = 404, description = "Task not found")
    )
)]
pub async fn get_task(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<ApiResponse<TaskDetails>>> {
    let id = ValidationService::parse_id(&id, "task")?;
    let task = WorkItemService::new(state.db).get_task(id).await?;
    Ok(ApiResponse::ok(task))
}

#[utoipa::path(
    put,
    path = "/api/v1/tasks/{id}",
    params(("id" = String, Path, description = "Task ID")),
    request_body = TaskFields,
    responses((status = 200, description = "Task updated", body = tasks::Model))
)]
pub async fn update_task(
    State(state): State<AppState>,
    Path(id): Path<String>,
    payload: Result<Json<TaskFields>, JsonRejection>,
) -> ApiResult<Json<ApiResponse<tasks::Model>>> {
    let id = ValidationService::parse_id(&id, "task")?;
    let Json(fields) = payload?;
    let task = WorkItemService::new(state.db).update_task(id, fields).await?;
    Ok(ApiResponse::ok(task))
}

#[utoipa::path(
    delete,
    path = "/api/v1/tasks/{id}",
    params(("id" = String, Path, description = "Task ID")),
    responses(
        (status = 200, description = "Task deleted", body = MessageResponse),
        (status = 409, description = "Task still has roles or timelines")
    )
)]
pub async fn delete_task(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<MessageResponse>> {
    let id = ValidationService::parse_id(&id, "task")?;
    WorkItemService::new(state.db).delete_task(id).await?;
    Ok(MessageResponse::ok("Task deleted successfully"))
}
