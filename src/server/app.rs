use std::sync::Arc;

use anyhow::{Context, Result};
use axum::{
    http::HeaderValue,
    routing::{get, post},
    Router,
};
use sea_orm::DatabaseConnection;
use tower::ServiceBuilder;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::{DefaultOnFailure, DefaultOnResponse, TraceLayer},
};
use tracing::Level;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use super::handlers::{assignments, health, projects, staff, table_items, work_items};
use crate::config::{AppConfig, PublicSettings};
use crate::database::entities;
use crate::server::error::MessageResponse;
use crate::services::{self, WriteLock};

#[derive(Clone)]
pub struct AppState {
    pub db: DatabaseConnection,
    pub config: Arc<AppConfig>,
    pub writes: Arc<WriteLock>,
}

#[derive(OpenApi)]
#[openapi(
    paths(
        health::health_check,
        health::public_settings,
        projects::list_projects,
        projects::create_project,
        projects::get_project,
        projects::update_project,
        projects::delete_project,
        projects::list_evaluation_models,
        projects::create_evaluation_model,
        projects::get_evaluation_model,
        projects::update_evaluation_model,
        projects::delete_evaluation_model,
        table_items::list_table_items,
        table_items::replace_table_items,
        work_items::create_epic,
        work_items::get_epic,
        work_items::update_epic,
        work_items::delete_epic,
        work_items::create_feature,
        work_items::get_feature,
        work_items::update_feature,
        work_items::delete_feature,
        work_items::create_task,
        work_items::get_task,
        work_items::update_task,
        work_items::delete_task,
        staff::list_roles,
        staff::create_role,
        staff::get_role,
        staff::update_role,
        staff::delete_role,
        staff::list_seniority_levels,
        staff::create_seniority_level,
        staff::get_seniority_level,
        staff::update_seniority_level,
        staff::delete_seniority_level,
        staff::list_employees,
        staff::create_employee,
        staff::get_employee,
        staff::update_employee,
        staff::delete_employee,
        assignments::create_task_role,
        assignments::get_task_role,
        assignments::delete_task_role,
        assignments::create_timeline,
        assignments::get_timeline,
        assignments::delete_timeline,
    ),
    components(schemas(
        entities::projects::Model,
        entities::evaluation_models::Model,
        entities::epics::Model,
        entities::features::Model,
        entities::tasks::Model,
        entities::roles::Model,
        entities::seniority_levels::Model,
        entities::employees::Model,
        entities::task_roles::Model,
        entities::timelines::Model,
        entities::TShirtSize,
        services::table_items::TableRow,
        services::table_items::ReconcileOutcome,
        services::project_service::ProjectInput,
        services::project_service::ProjectDetails,
        services::evaluation_model_service::EvaluationModelInput,
        services::evaluation_model_service::EvaluationModelDetails,
        services::work_item_service::CreateEpicInput,
        services::work_item_service::CreateFeatureInput,
        services::work_item_service::UpdateGroupInput,
        services::work_item_service::TaskFields,
        services::work_item_service::CreateTaskInput,
        services::work_item_service::EpicDetails,
        services::work_item_service::FeatureDetails,
        services::work_item_service::TaskDetails,
        services::staff_service::NamedInput,
        services::staff_service::EmployeeInput,
        services::staff_service::EmployeeDetails,
        services::assignment_service::TaskRoleInput,
        services::assignment_service::TimelineInput,
        PublicSettings,
        MessageResponse,
    )),
    info(title = "Project estimator API")
)]
pub struct ApiDoc;

pub async fn create_app(db: DatabaseConnection, config: AppConfig) -> Result<Router> {
    let cors = match config.cors_origin.as_deref() {
        Some(origin) => CorsLayer::new()
            .allow_origin(
                origin
                    .parse::<HeaderValue>()
                    .with_context(|| format!("invalid CORS origin '{}'", origin))?,
            )
            .allow_methods(Any)
            .allow_headers(Any),
        None => CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any),
    };

    let trace_layer = TraceLayer::new_for_http()
        .on_response(DefaultOnResponse::new().level(Level::INFO))
        .on_failure(DefaultOnFailure::new().level(Level::ERROR));

    let state = AppState {
        db,
        config: Arc::new(config),
        writes: Arc::new(WriteLock::new()),
    };

    let app = Router::new()
        .route("/health", get(health::health_check))
        .nest("/api/v1", api_v1_routes())
        .merge(SwaggerUi::new("/docs").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .layer(ServiceBuilder::new().layer(trace_layer).layer(cors))
        .with_state(state);

    Ok(app)
}

fn api_v1_routes() -> Router<AppState> {
    Router::new()
        .route("/settings", get(health::public_settings))
        // Projects and their flat table view
        .route(
            "/projects",
            get(projects::list_projects).post(projects::create_project),
        )
        .route(
            "/projects/:id",
            get(projects::get_project)
                .put(projects::update_project)
                .delete(projects::delete_project),
        )
        .route(
            "/projects/:id/table-items",
            get(table_items::list_table_items).put(table_items::replace_table_items),
        )
        .route(
            "/evaluation-models",
            get(projects::list_evaluation_models).post(projects::create_evaluation_model),
        )
        .route(
            "/evaluation-models/:id",
            get(projects::get_evaluation_model)
                .put(projects::update_evaluation_model)
                .delete(projects::delete_evaluation_model),
        )
        // Work items
        .route("/epics", post(work_items::create_epic))
        .route(
            "/epics/:id",
            get(work_items::get_epic)
                .put(work_items::update_epic)
                .delete(work_items::delete_epic),
        )
        .route("/features", post(work_items::create_feature))
        .route(
            "/features/:id",
            get(work_items::get_feature)
                .put(work_items::update_feature)
                .delete(work_items::delete_feature),
        )
        .route("/tasks", post(work_items::create_task))
        .route(
            "/tasks/:id",
            get(work_items::get_task)
                .put(work_items::update_task)
                .delete(work_items::delete_task),
        )
        // Staff
        .route("/roles", get(staff::list_roles).post(staff::create_role))
        .route(
            "/roles/:id",
            get(staff::get_role)
                .put(staff::update_role)
                .delete(staff::delete_role),
        )
        .route(
            "/seniority-levels",
            get(staff::list_seniority_levels).post(staff::create_seniority_level),
        )
        .route(
            "/seniority-levels/:id",
            get(staff::get_seniority_level)
                .put(staff::update_seniority_level)
                .delete(staff::delete_seniority_level),
        )
        .route(
            "/employees",
            get(staff::list_employees).post(staff::create_employee),
        )
        .route(
            "/employees/:id",
            get(staff::get_employee)
                .put(staff::update_employee)
                .delete(staff::delete_employee),
        )
        // Assignments
        .route("/task-roles", post(assignments::create_task_role))
        .route(
            "/task-roles/:task_id/:role_id",
            get(assignments::get_task_role).delete(assignments::delete_task_role),
        )
        .route("/timelines", post(assignments::create_timeline))
        .route(
            "/timelines/:task_id/:project_id",
            get(assignments::get_timeline).delete(assignments::delete_timeline),
        )
}
