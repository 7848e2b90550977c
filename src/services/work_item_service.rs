use chrono::{DateTime, Utc};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, Set,
};
use serde::{Deserialize, Serialize};

use crate::common::db_errors::db_error;
use crate::database::entities::{
    employees, epics, features, projects, task_roles, tasks, timelines,
};
use crate::errors::CoreResult;
use crate::services::helpers::{count_where, find_referenced, find_required};
use crate::services::ValidationService;

#[derive(Clone, Debug, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateEpicInput {
    pub title: String,
    pub total_estimation: f64,
    pub project_id: i32,
}

/// Shared by epic and feature updates; the parent cannot be changed.
#[derive(Clone, Debug, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateGroupInput {
    pub title: String,
    pub total_estimation: f64,
}

#[derive(Clone, Debug, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateFeatureInput {
    pub title: String,
    pub total_estimation: f64,
    pub epic_id: i32,
}

/// Editable task fields. Anything left out is stored as null.
#[derive(Clone, Debug, Default, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TaskFields {
    pub title: String,
    pub optimistic_estimation: Option<f64>,
    pub realistic_estimation: Option<f64>,
    pub pessimistic_estimation: Option<f64>,
    pub t_shirt_size: Option<String>,
    pub total_estimation: Option<f64>,
    pub start_date: Option<DateTime<Utc>>,
    pub end_date: Option<DateTime<Utc>>,
    pub extra_coefficient: Option<f64>,
    pub extra_coefficient_description: Option<String>,
    pub progress: Option<f64>,
    pub employee_id: Option<i32>,
}

#[derive(Clone, Debug, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateTaskInput {
    pub feature_id: i32,
    #[serde(flatten)]
    pub fields: TaskFields,
}

#[derive(Clone, Debug, Serialize, utoipa::ToSchema)]
pub struct EpicDetails {
    #[serde(flatten)]
    pub epic: epics::Model,
    pub project: Option<projects::Model>,
    pub features: Vec<features::Model>,
}

#[derive(Clone, Debug, Serialize, utoipa::ToSchema)]
pub struct FeatureDetails {
    #[serde(flatten)]
    pub feature: features::Model,
    pub epic: Option<epics::Model>,
    pub tasks: Vec<tasks::Model>,
}

#[derive(Clone, Debug, Serialize, utoipa::ToSchema)]
pub struct TaskDetails {
    #[serde(flatten)]
    pub task: tasks::Model,
    pub feature: Option<features::Model>,
    pub task_roles: Vec<task_roles::Model>,
    pub timelines: Vec<timelines::Model>,
}

/// Epics, features and tasks edited one at a time, outside the bulk
/// table-items path.
#[derive(Clone)]
pub struct WorkItemService {
    db: DatabaseConnection,
}

impl WorkItemService {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    pub async fn get_epic(&self, id: i32) -> CoreResult<EpicDetails> {
        let epic = find_required::<epics::Entity, _>(&self.db, id, "Epic").await?;
        let project = projects::Entity::find_by_id(epic.project_id)
            .one(&self.db)
            .await
            .map_err(|e| db_error("find project", e))?;
        let features = features::Entity::find()
            .filter(features::Column::EpicId.eq(id))
            .order_by_asc(features::Column::Id)
            .all(&self.db)
            .await
            .map_err(|e| db_error("list features", e))?;

        Ok(EpicDetails {
            epic,
            project,
            features,
        })
    }

    pub async fn create_epic(&self, input: CreateEpicInput) -> CoreResult<epics::Model> {
        let title = ValidationService::validate_title("Epic title", &input.title)?;
        let total = ValidationService::validate_amount("Total estimation", input.total_estimation)?;
        let project_id = ValidationService::require_id(input.project_id, "project")?;
        find_referenced::<projects::Entity, _>(&self.db, project_id, "project").await?;

        epics::ActiveModel {
            title: Set(title),
            total_estimation: Set(total),
            project_id: Set(project_id),
            ..Default::default()
        }
        .insert(&self.db)
        .await
        .map_err(|e| db_error("create epic", e))
    }

    pub async fn update_epic(&self, id: i32, input: UpdateGroupInput) -> CoreResult<epics::Model> {
        let title = ValidationService::validate_title("Epic title", &input.title)?;
        let total = ValidationService::validate_amount("Total estimation", input.total_estimation)?;

        let mut active: epics::ActiveModel =
            find_required::<epics::Entity, _>(&self.db, id, "Epic").await?.into();
        active.title = Set(title);
        active.total_estimation = Set(total);
        active
            .update(&self.db)
            .await
            .map_err(|e| db_error("update epic", e))
    }

    pub async fn delete_epic(&self, id: i32) -> CoreResult<()> {
        find_required::<epics::Entity, _>(&self.db, id, "Epic").await?;
        let feature_count =
            count_where::<features::Entity, _>(&self.db, features::Column::EpicId, id).await?;
        ValidationService::ensure_no_dependents("epic", &[("features", feature_count)])?;

        epics::Entity::delete_by_id(id)
            .exec(&self.db)
            .await
            .map_err(|e| db_error("delete epic", e))?;
        Ok(())
    }

    pub async fn get_feature(&self, id: i32) -> CoreResult<FeatureDetails> {
        let feature = find_required::<features::Entity, _>(&self.db, id, "Feature").await?;
        let epic = epics::Entity::find_by_id(feature.epic_id)
            .one(&self.db)
            .await
            .map_err(|e| db_error("find epic", e))?;
        let tasks = tasks::Entity::find()
            .filter(tasks::Column::FeatureId.eq(id))
            .order_by_asc(tasks::Column::Id)
            .all(&self.db)
            .await
            .map_err(|e| db_error("list tasks", e))?;

        Ok(FeatureDetails {
            feature,
            epic,
            tasks,
        })
    }

    pub async fn create_feature(&self, input: CreateFeatureInput) -> CoreResult<features::Model> {
        let title = ValidationService::validate_title("Feature title", &input.title)?;
        let total = ValidationService::validate_amount("Total estimation", input.total_estimation)?;
        let epic_id = ValidationService::require_id(input.epic_id, "epic")?;
        find_referenced::<epics::Entity, _>(&self.db, epic_id, "epic").await?;

        features::ActiveModel {
            title: Set(title),
            total_estimation: Set(total),
            epic_id: Set(epic_id),
            ..Default::default()
        }
        .insert(&self.db)
        .await
        .map_err(|e| db_error("create feature", e))
    }

    pub async fn update_feature(&self, id: i32, input: UpdateGroupInput) -> CoreResult<features::Model> {
        let title = ValidationService::validate_title("Feature title", &input.title)?;
        let total = ValidationService::validate_amount("Total estimation", input.total_estimation)?;

        let mut active: features::ActiveModel =
            find_required::<features::Entity, _>(&self.db, id, "Feature").await?.into();
        active.title = Set(title);
        active.total_estimation = Set(total);
        active
            .update(&self.db)
            .await
            .map_err(|e| db_error("update feature", e))
    }

    pub async fn delete_feature(&self, id: i32) -> CoreResult<()> {
        find_required::<features::Entity, _>(&self.db, id, "Feature").await?;
        let task_count =
            count_where::<tasks::Entity, _>(&self.db, tasks::Column::FeatureId, id).await?;
        ValidationService::ensure_no_dependents("feature", &[("tasks", task_count)])?;

        features::Entity::delete_by_id(id)
            .exec(&self.db)
            .await
            .map_err(|e| db_error("delete feature", e))?;
        Ok(())
    }

    pub async fn get_task(&self, id: i32) -> CoreResult<TaskDetails> {
        let task = find_required::<tasks::Entity, _>(&self.db, id, "Task").await?;
        let feature = features::Entity::find_by_id(task.feature_id)
            .one(&self.db)
            .await
            .map_err(|e| db_error("find feature", e))?;
        let task_roles = task_roles::Entity::find()
            .filter(task_roles::Column::TaskId.eq(id))
            .order_by_asc(task_roles::Column::RoleId)
            .all(&self.db)
            .await
            .map_err(|e| db_error("list task roles", e))?;
        let timelines = timelines::Entity::find()
            .filter(timelines::Column::TaskId.eq(id))
            .order_by_asc(timelines::Column::ProjectId)
            .all(&self.db)
            .await
            .map_err(|e| db_error("list timelines", e))?;

        Ok(TaskDetails {
            task,
            feature,
            task_roles,
            timelines,
        })
    }

    pub async fn create_task(&self, input: CreateTaskInput) -> CoreResult<tasks::Model> {
        let feature_id = ValidationService::require_id(input.feature_id, "feature")?;
        let mut active = self.task_fields(input.fields).await?;
        find_referenced::<features::Entity, _>(&self.db, feature_id, "feature").await?;
        active.feature_id = Set(feature_id);

        active
            .insert(&self.db)
            .await
            .map_err(|e| db_error("create task", e))
    }

    /// Full replacement of the editable fields; the feature stays.
    pub async fn update_task(&self, id: i32, fields: TaskFields) -> CoreResult<tasks::Model> {
        let mut active = self.task_fields(fields).await?;
        let existing = find_required::<tasks::Entity, _>(&self.db, id, "Task").await?;
        active.id = Set(existing.id);
        active.feature_id = Set(existing.feature_id);

        active
            .update(&self.db)
            .await
            .map_err(|e| db_error("update task", e))
    }

    pub async fn delete_task(&self, id: i32) -> CoreResult<()> {
        find_required::<tasks::Entity, _>(&self.db, id, "Task").await?;
        let role_count =
            count_where::<task_roles::Entity, _>(&self.db, task_roles::Column::TaskId, id).await?;
        let timeline_count =
            count_where::<timelines::Entity, _>(&self.db, timelines::Column::TaskId, id).await?;
        ValidationService::ensure_no_dependents(
            "task",
            &[("task roles", role_count), ("timelines", timeline_count)],
        )?;

        tasks::Entity::delete_by_id(id)
            .exec(&self.db)
            .await
            .map_err(|e| db_error("delete task", e))?;
        Ok(())
    }

    async fn task_fields(&self, fields: TaskFields) -> CoreResult<tasks::ActiveModel> {
        let title = ValidationService::validate_title("Task title", &fields.title)?;
        let size = ValidationService::parse_t_shirt_size(fields.t_shirt_size.as_deref())?;
        let amount = ValidationService::validate_optional_amount;

        let employee_id = match fields.employee_id {
            Some(id) => {
                let id = ValidationService::require_id(id, "employee")?;
                find_referenced::<employees::Entity, _>(&self.db, id, "employee").await?;
                Some(id)
            }
            None => None,
        };

        Ok(tasks::ActiveModel {
            title: Set(title),
            optimistic_estimation: Set(amount("Optimistic estimation", fields.optimistic_estimation)?),
            realistic_estimation: Set(amount("Realistic estimation", fields.realistic_estimation)?),
            pessimistic_estimation: Set(amount(
                "Pessimistic estimation",
                fields.pessimistic_estimation,
            )?),
            t_shirt_size: Set(size.map(String::from)),
            total_estimation: Set(amount("Total estimation", fields.total_estimation)?),
            start_date: Set(fields.start_date),
            end_date: Set(fields.end_date),
            extra_coefficient: Set(amount("Extra coefficient", fields.extra_coefficient)?),
            extra_coefficient_description: Set(ValidationService::validate_description(
                fields.extra_coefficient_description.as_deref(),
            )?),
            progress: Set(amount("Progress", fields.progress)?),
            employee_id: Set(employee_id),
            ..Default::default()
        })
    }
}
