use axum::{
    extract::{rejection::JsonRejection, Path, State},
    response::Json,
};

use crate::database::entities::{employees, roles, seniority_levels};
use crate::server::app::AppState;
use crate::server::error::{ApiResponse, ApiResult, MessageResponse};
use crate::services::staff_service::{EmployeeDetails, EmployeeInput, NamedInput};
use crate::services::{StaffService, ValidationService};

#[utoipa::path(
    get,
    path = "/api/v1/roles",
    responses((status = 200, description = "All roles", body = [roles::Model]))
)]
pub async fn list_roles(
    State(state): State<AppState>,
) -> ApiResult<Json<ApiResponse<Vec<roles::Model>>>> {
    Ok(ApiResponse::ok(StaffService::new(state.db).list_roles().await?))
}

#[utoipa::path(
    post,
    path = "/api/v1/roles",
    request_body = NamedInput,
    responses((status = 200, description = "Role created", body = roles::Model))
)]
pub async fn create_role(
    State(state): State<AppState>,
    payload: Result<Json<NamedInput>, JsonRejection>,
) -> ApiResult<Json<ApiResponse<roles::Model>>> {
    let Json(input) = payload?;
    Ok(ApiResponse::ok(StaffService::new(state.db).create_role(input).await?))
}

#[utoipa::path(
    get,
    path = "/api/v1/roles/{id}",
    params(("id" = String, Path, description = "Role ID")),
    responses(
        (status = 200, description = "Role found", body = roles::Model),
        (status = 404, description = "Role not found")
    )
)]
pub async fn get_role(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<ApiResponse<roles::Model>>> {
    let id = ValidationService::parse_id(&id, "role")?;
    Ok(ApiResponse::ok(StaffService::new(state.db).get_role(id).await?))
}

#[utoipa::path(
    put,
    path = "/api/v1/roles/{id}",
    params(("id" = String, Path, description = "Role ID")),
    request_body = NamedInput,
    responses((status = 200, description = "Role updated", body = roles::Model))
)]
pub async fn update_role(
    State(state): State<AppState>,
    Path(id): Path<String>,
    payload: Result<Json<NamedInput>, JsonRejection>,
) -> ApiResult<Json<ApiResponse<roles::Model>>> {
    let id = ValidationService::parse_id(&id, "role")?;
    let Json(input) = payload?;
    Ok(ApiResponse::ok(StaffService::new(state.db).update_role(id, input).await?))
}

#[utoipa::path(
    delete,
    path = "/api/v1/roles/{id}",
    params(("id" = String, Path, description = "Role ID")),
    responses(
        (status = 200, description = "Role deleted", body = MessageResponse),
        (status = 409, description = "Role is still assigned")
    )
)]
pub async fn delete_role(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<MessageResponse>> {
    let id = ValidationService::parse_id(&id, "role")?;
    StaffService::new(state.db).delete_role(id).await?;
    Ok(MessageResponse::ok("Role deleted successfully"))
}

#[utoipa::path(
    get,
    path = "/api/v1/seniority-levels",
    responses((status = 200, description = "All seniority levels", body = [seniority_levels::Model]))
)]
pub async fn list_seniority_levels(
    State(state): State<AppState>,
) -> ApiResult<Json<ApiResponse<Vec<seniority_levels::Model>>>> {
    Ok(ApiResponse::ok(
        StaffService::new(state.db).list_seniority_levels().await?,
    ))
}

#[utoipa::path(
    post,
    path = "/api/v1/seniority-levels",
    request_body = NamedInput,
    responses((status = 200, description = "Seniority level created", body = seniority_levels::Model))
)]
pub async fn create_seniority_level(
    State(state): State<AppState>,
    payload: Result<Json<NamedInput>, JsonRejection>,
) -> ApiResult<Json<ApiResponse<seniority_levels::Model>>> {
    let Json(input) = payload?;
    Ok(ApiResponse::ok(
        StaffService::new(state.db).create_seniority_level(input).await?,
    ))
}

#[utoipa::path(
    get,
    path = "/api/v1/seniority-levels/{id}",
    params(("id" = String, Path, description = "Seniority level ID")),
    responses(
        (status = 200, description = "Seniority level found", body = seniority_levels::Model),
        (status = 404, description = "Seniority level not found")
    )
)]
pub async fn get_seniority_level(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<ApiResponse<seniority_levels::Model>>> {
    let id = ValidationService::parse_id(&id, "seniority level")?;
    Ok(ApiResponse::ok(
        StaffService::new(state.db).get_seniority_level(id).await?,
    ))
}

#[utoipa::path(
    put,
    path = "/api/v1/seniority-levels/{id}",
    params(("id" = String, Path, description = "Seniority level ID")),
    request_body = NamedInput,
    responses((status = 200, description = "Seniority level updated", body = seniority_levels::Model))
)]
pub async fn update_seniority_level(
    State(state): State<AppState>,
    Path(id): Path<String>,
    payload: Result<Json<NamedInput>, JsonRejection>,
) -> ApiResult<Json<ApiResponse<seniority_levels::Model>>> {
    let id = ValidationService::parse_id(&id, "seniority level")?;
    let Json(input) = payload?;
    Ok(ApiResponse::ok(
        StaffService::new(state.db)
            .update_seniority_level(id, input)
            .await?,
    ))
}

#[utoipa::path(
    delete,
    path = "/api/v1/seniority-levels/{id}",
    params(("id" = String, Path, description = "Seniority level ID")),
    responses(
        (status = 200, description = "Seniority level deleted", body = MessageResponse),
        (status = 409, description = "Employees still hold this level")
    )
)]
pub async fn delete_seniority_level(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<MessageResponse>> {
    let id = ValidationService::parse_id(&id, "seniority level")?;
    StaffService::new(state.db).delete_seniority_level(id).await?;
    Ok(MessageResponse::ok("Seniority level deleted successfully"))
}

#[utoipa::path(
    get,
    path = "/api/v1/employees",
    responses((status = 200, description = "All employees with role and seniority", body = [EmployeeDetails]))
)]
pub async fn list_employees(
    State(state): State<AppState>,
) -> ApiResult<Json<ApiResponse<Vec<EmployeeDetails>>>> {
    Ok(ApiResponse::ok(StaffService::new(state.db).list_employees().await?))
}

#[utoipa::path(
    post,
    path = "/api/v1/employees",
    request_body = EmployeeInput,
    responses((status = 200, description = "Employee created", body = employees::Model))
)]
pub async fn create_employee(
    State(state): State<AppState>,
    payload: Result<Json<EmployeeInput>, JsonRejection>,
) -> ApiResult<Json<ApiResponse<employees::Model>>> {
    let Json(input) = payload?;
    Ok(ApiResponse::ok(
        StaffService::new(state.db).create_employee(input).await?,
    ))
}

#[utoipa::path(
    get,
    path = "/api/v1/employees/{id}",
    params(("id" = String, Path, description = "Employee ID")),
    responses(
        (status = 200, description = "Employee found", body = EmployeeDetails),
        (status = 404, description = "Employee not found")
    )
)]
pub async fn get_employee(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<ApiResponse<EmployeeDetails>>> {
    let id = ValidationService::parse_id(&id, "employee")?;
    Ok(ApiResponse::ok(StaffService::new(state.db).get_employee(id).await?))
}

#[utoipa::path(
    put,
    path = "/api/v1/employees/{id}",
    params(("id" = String, Path, description = "Employee ID")),
    request_body = EmployeeInput,
    responses((status = 200, description = "Employee updated", body = employees::Model))
)]
pub async fn update_employee(
    State(state): State<AppState>,
    Path(id): Path<String>,
    payload: Result<Json<EmployeeInput>, JsonRejection>,
) -> ApiResult<Json<ApiResponse<employees::Model>>> {
    let id = ValidationService::parse_id(&id, "employee")?;
    let Json(input) = payload?;
    Ok(ApiResponse::ok(
        StaffService::new(state.db).update_employee(id, input).await?,
    ))
}

#[utoipa::path(
    delete,
    path = "/api/v1/employees/{id}",
    params(("id" = String, Path, description = "Employee ID")),
    responses(
        (status = 200, description = "Employee deleted", body = MessageResponse),
        (status = 409, description = "Employee is still assigned to tasks")
    )
)]
pub async fn delete_employee(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<MessageResponse>> {
    let id = ValidationService::parse_id(&id, "employee")?;
    StaffService::new(state.db).delete_employee(id).await?;
    Ok(MessageResponse::ok("Employee deleted successfully"))
}
