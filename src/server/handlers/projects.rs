use axum::{
    extract::{rejection::JsonRejection, Path, State},
    response::Json,
};

use crate::database::entities::{evaluation_models, projects};
use crate::server::app::AppState;
use crate::server::error::{ApiResponse, ApiResult, MessageResponse};
use crate::services::evaluation_model_service::{EvaluationModelDetails, EvaluationModelInput};
use crate::services::project_service::{ProjectDetails, ProjectInput};
use crate::services::{EvaluationModelService, ProjectService, ValidationService};

#[utoipa::path(
    get,
    path = "/api/v1/projects",
    responses(
        (status = 200, description = "All projects with their evaluation model", body = [ProjectDetails])
    )
)]
pub async fn list_projects(
    State(state): State<AppState>,
) -> ApiResult<Json<ApiResponse<Vec<ProjectDetails>>>> {
    let projects = ProjectService::new(state.db).list_projects().await?;
    Ok(ApiResponse::ok(projects))
}

#[utoipa::path(
    post,
    path = "/api/v1/projects",
    request_body = ProjectInput,
    responses(
        (status = 200, description = "Project created", body = projects::Model),
        (status = 400, description = "Invalid body")
    )
)]
pub async fn create_project(
    State(state): State<AppState>,
    payload: Result<Json<ProjectInput>, JsonRejection>,
) -> ApiResult<Json<ApiResponse<projects::Model>>> {
    let Json(input) = payload?;
    let project = ProjectService::new(state.db).create_project(input).await?;
    Ok(ApiResponse::ok(project))
}

#[utoipa::path(
    get,
    path = "/api/v1/projects/{id}",
    params(("id" = String, Path, description = "Project ID")),
    responses(
        (status = 200, description = "Project found", body = ProjectDetails),
        (status = 400, description = "Malformed ID"),
        (status = 404, description = "Project not found")
    )
)]
pub async fn get_project(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<ApiResponse<ProjectDetails>>> {
    let id = ValidationService::parse_id(&id, "project")?;
    let project = ProjectService::new(state.db).get_project(id).await?;
    Ok(ApiResponse::ok(project))
}

#[utoipa::path(
    put,
    path = "/api/v1/projects/{id}",
    params(("id" = String, Path, description = "Project ID")),
    request_body = ProjectInput,
    responses(
        (status = 200, description = "Project updated", body = projects::Model),
        (status = 404, description = "Project not found")
    )
)]
pub async fn update_project(
    State(state): State<AppState>,
    Path(id): Path<String>,
    payload: Result<Json<ProjectInput>, JsonRejection>,
) -> ApiResult<Json<ApiResponse<projects::Model>>> {
    let id = ValidationService::parse_id(&id, "project")?;
    let Json(input) = payload?;
    let project = ProjectService::new(state.db).update_project(id, input).await?;
    Ok(ApiResponse::ok(project))
}

#[utoipa::path(
    delete,
    path = "/api/v1/projects/{id}",
    params(("id" = String, Path, description = "Project ID")),
    responses(
        (status = 200, description = "Project deleted", body = MessageResponse),
        (status = 404, description = "Project not found"),
        (status = 409, description = "Project still has epics or timelines")
    )
)]
pub async fn delete_project(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<MessageResponse>> {
    let id = ValidationService::parse_id(&id, "project")?;
    ProjectService::new(state.db).delete_project(id).await?;
    Ok(MessageResponse::ok("Project deleted successfully"))
}

#[utoipa::path(
    get,
    path = "/api/v1/evaluation-models",
    responses((status = 200, description = "All evaluation models", body = [evaluation_models::Model]))
)]
pub async fn list_evaluation_models(
    State(state): State<AppState>,
) -> ApiResult<Json<ApiResponse<Vec<evaluation_models::Model>>>> {
    let models = EvaluationModelService::new(state.db).list().await?;
    Ok(ApiResponse::ok(models))
}

#[utoipa::path(
    post,
    path = "/api/v1/evaluation-models",
    request_body = EvaluationModelInput,
    responses((status = 200, description = "Evaluation model created", body = evaluation_models::Model))
)]
pub async fn create_evaluation_model(
    State(state): State<AppState>,
    payload: Result<Json<EvaluationModelInput>, JsonRejection>,
) -> ApiResult<Json<ApiResponse<evaluation_models::Model>>> {
    let Json(input) = payload?;
    let model = EvaluationModelService::new(state.db).create(input).await?;
    Ok(ApiResponse::ok(model))
}

#[utoipa::path(
    get,
    path = "/api/v1/evaluation-models/{id}",
    params(("id" = String, Path, description = "Evaluation model ID")),
    responses(
        (status = 200, description = "Evaluation model with its projects", body = EvaluationModelDetails),
        (status = 404, description = "Evaluation model not found")
    )
)]
pub async fn get_evaluation_model(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<ApiResponse<EvaluationModelDetails>>> {
    let id = ValidationService::parse_id(&id, "evaluation model")?;
    let model = EvaluationModelService::new(state.db).get(id).await?;
    Ok(ApiResponse::ok(model))
}

#[utoipa::path(
    put,
    path = "/api/v1/evaluation-models/{id}",
    params(("id" = String, Path, description = "Evaluation model ID")),
    request_body = EvaluationModelInput,
    responses((status = 200, description = "Evaluation model updated", body = evaluation_models::Model))
)]
pub async fn update_evaluation_model(
    State(state): State<AppState>,
    Path(id): Path<String>,
    payload: Result<Json<EvaluationModelInput>, JsonRejection>,
) -> ApiResult<Json<ApiResponse<evaluation_models::Model>>> {
    let id = ValidationService::parse_id(&id, "evaluation model")?;
    let Json(input) = payload?;
    let model = EvaluationModelService::new(state.db).update(id, input).await?;
    Ok(ApiResponse::ok(model))
}

#[utoipa::path(
    delete,
    path = "/api/v1/evaluation-models/{id}",
    params(("id" = String, Path, description = "Evaluation model ID")),
    responses(
        (status = 200, description = "Evaluation model deleted", body = MessageResponse),
        (status = 409, description = "Projects still use this model")
    )
)]
pub async fn delete_evaluation_model(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<MessageResponse>> {
    let id = ValidationService::parse_id(&id, "evaluation model")?;
    EvaluationModelService::new(state.db).delete(id).await?;
    Ok(MessageResponse::ok("Evaluation model deleted successfully"))
}
