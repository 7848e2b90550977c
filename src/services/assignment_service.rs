use chrono::{DateTime, Utc};
use sea_orm::{ActiveModelTrait, DatabaseConnection, EntityTrait, Set};
use serde::Deserialize;

use crate::common::db_errors::db_error;
use crate::database::entities::{projects, roles, task_roles, tasks, timelines};
use crate::errors::{CoreError, CoreResult};
use crate::services::helpers::find_referenced;
use crate::services::ValidationService;

#[derive(Clone, Debug, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TaskRoleInput {
    pub task_id: i32,
    pub role_id: i32,
}

#[derive(Clone, Debug, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TimelineInput {
    pub task_id: i32,
    pub project_id: i32,
    pub date_start: Option<DateTime<Utc>>,
    pub date_end: Option<DateTime<Utc>>,
}

/// Join rows keyed by two ids: task roles and task timelines.
#[derive(Clone)]
pub struct AssignmentService {
    db: DatabaseConnection,
}

impl AssignmentService {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    pub async fn get_task_role(&self, task_id: i32, role_id: i32) -> CoreResult<task_roles::Model> {
        task_roles::Entity::find_by_id((task_id, role_id))
            .one(&self.db)
            .await
            .map_err(|e| db_error("find task role", e))?
            .ok_or_else(|| CoreError::not_found("Task role", format!("{}/{}", task_id, role_id)))
    }

    pub async fn create_task_role(&self, input: TaskRoleInput) -> CoreResult<task_roles::Model> {
        let task_id = ValidationService::require_id(input.task_id, "task")?;
        let role_id = ValidationService::require_id(input.role_id, "role")?;
        find_referenced::<tasks::Entity, _>(&self.db, task_id, "task").await?;
        find_referenced::<roles::Entity, _>(&self.db, role_id, "role").await?;

        match self.get_task_role(task_id, role_id).await {
            Ok(_) => {
                return Err(CoreError::conflict(format!(
                    "Role {} is already assigned to task {}",
                    role_id, task_id
                )))
            }
            Err(err) if err.is_not_found() => {}
            Err(err) => return Err(err),
        }

        task_roles::ActiveModel {
            task_id: Set(task_id),
            role_id: Set(role_id),
        }
        .insert(&self.db)
        .await
        .map_err(|e| db_error("create task role", e))
    }

    pub async fn delete_task_role(&self, task_id: i32, role_id: i32) -> CoreResult<()> {
        self.get_task_role(task_id, role_id).await?;
        task_roles::Entity::delete_by_id((task_id, role_id))
            .exec(&self.db)
            .await
            .map_err(|e| db_error("delete task role", e))?;
        Ok(())
    }

    pub async fn get_timeline(&self, task_id: i32, project_id: i32) -> CoreResult<timelines::Model> {
        timelines::Entity::find_by_id((task_id, project_id))
            .one(&self.db)
            .await
            .map_err(|e| db_error("find timeline", e))?
            .ok_or_else(|| CoreError::not_found("Timeline", format!("{}/{}", task_id, project_id)))
    }

    pub async fn create_timeline(&self, input: TimelineInput) -> CoreResult<timelines::Model> {
        let task_id = ValidationService::require_id(input.task_id, "task")?;
        let project_id = ValidationService::require_id(input.project_id, "project")?;
        if let (Some(start), Some(end)) = (input.date_start, input.date_end) {
            if end < start {
                return Err(CoreError::invalid_argument(
                    "Timeline end date is before its start date",
                ));
            }
        }
        find_referenced::<tasks::Entity, _>(&self.db, task_id, "task").await?;
        find_referenced::<projects::Entity, _>(&self.db, project_id, "project").await?;

        match self.get_timeline(task_id, project_id).await {
            Ok(_) => {
                return Err(CoreError::conflict(format!(
                    "Task {} already has a timeline in project {}",
                    task_id, project_id
                )))
            }
            Err(err) if err.is_not_found() => {}
            Err(err) => return Err(err),
        }

        timelines::ActiveModel {
            task_id: Set(task_id),
            project_id: Set(project_id),
            date_start: Set(input.date_start),
            date_end: Set(input.date_end),
        }
        .insert(&self.db)
        .await
        .map_err(|e| db_error("create timeline", e))
    }

    pub async fn delete_timeline(&self, task_id: i32, project_id: i32) -> CoreResult<()> {
        self.get_timeline(task_id, project_id).await?;
        timelines::Entity::delete_by_id((task_id, project_id))
            .exec(&self.db)
            .await
            .map_err(|e| db_error("delete timeline", e))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::entities::{epics, evaluation_models, features};
    use crate::database::test_utils::setup_test_db;
    use crate::errors::CoreErrorKind;

    struct Fixture {
        service: AssignmentService,
        project_id: i32,
        task_id: i32,
        role_id: i32,
    }

    async fn fixture() -> Fixture {
        let db = setup_test_db().await;
        let model = evaluation_models::ActiveModel {
            title: Set("Three-point".to_string()),
            ..Default::default()
        }
        .insert(&db)
        .await
        .unwrap();
        let project = projects::ActiveModel {
            title: Set("Portal".to_string()),
            evaluation_model_id: Set(model.id),
            ..Default::default()
        }
        .insert(&db)
        .await
        .unwrap();
        let epic = epics::ActiveModel {
            title: Set("Alpha".to_string()),
            total_estimation: Set(0.0),
            project_id: Set(project.id),
            ..Default::default()
        }
        .insert(&db)
        .await
        .unwrap();
        let feature = features::ActiveModel {
            title: Set("Login".to_string()),
            total_estimation: Set(0.0),
            epic_id: Set(epic.id),
            ..Default::default()
        }
        .insert(&db)
        .await
        .unwrap();
        let task = tasks::ActiveModel {
            title: Set("Build form".to_string()),
            feature_id: Set(feature.id),
            ..Default::default()
        }
        .insert(&db)
        .await
        .unwrap();
        let role = roles::ActiveModel {
            name: Set("qa".to_string()),
            display_name: Set("QA engineer".to_string()),
            ..Default::default()
        }
        .insert(&db)
        .await
        .unwrap();

        Fixture {
            service: AssignmentService::new(db),
            project_id: project.id,
            task_id: task.id,
            role_id: role.id,
        }
    }

    #[tokio::test]
    async fn task_role_lifecycle() {
        let f = fixture().await;
        let input = TaskRoleInput {
            task_id: f.task_id,
            role_id: f.role_id,
        };

        f.service.create_task_role(input.clone()).await.unwrap();
        let err = f.service.create_task_role(input).await.unwrap_err();
        assert_eq!(err.kind(), CoreErrorKind::Conflict);

        f.service.get_task_role(f.task_id, f.role_id).await.unwrap();
        f.service.delete_task_role(f.task_id, f.role_id).await.unwrap();
        let err = f.service.get_task_role(f.task_id, f.role_id).await.unwrap_err();
        assert_eq!(err.kind(), CoreErrorKind::NotFound);
    }

    #[tokio::test]
    async fn timeline_lifecycle() {
        let f = fixture().await;
        let start = Utc::now();

        let timeline = f
            .service
            .create_timeline(TimelineInput {
                task_id: f.task_id,
                project_id: f.project_id,
                date_start: Some(start),
                date_end: None,
            })
            .await
            .unwrap();
        assert_eq!(timeline.date_end, None);

        let err = f
            .service
            .create_timeline(TimelineInput {
                task_id: f.task_id,
                project_id: f.project_id,
                date_start: None,
                date_end: None,
            })
            .await
            .unwrap_err();
        assert_eq!(err.kind(), CoreErrorKind::Conflict);

        f.service.delete_timeline(f.task_id, f.project_id).await.unwrap();
        let err = f.service.delete_timeline(f.task_id, f.project_id).await.unwrap_err();
        assert_eq!(err.kind(), CoreErrorKind::NotFound);
    }

    #[tokio::test]
    async fn unknown_role_is_invalid() {
        let f = fixture().await;
        let err = f
            .service
            .create_task_role(TaskRoleInput {
                task_id: f.task_id,
                role_id: f.role_id + 50,
            })
            .await
            .unwrap_err();
        assert_eq!(err.kind(), CoreErrorKind::InvalidArgument);
    }
}
