use sea_orm::{ActiveModelTrait, DatabaseConnection, EntityTrait, QueryOrder, Set};
use serde::{Deserialize, Serialize};

use crate::common::db_errors::db_error;
use crate::database::entities::{epics, evaluation_models, projects, timelines};
use crate::errors::CoreResult;
use crate::services::helpers::{count_where, find_referenced, find_required};
use crate::services::ValidationService;

#[derive(Clone, Debug, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProjectInput {
    pub title: String,
    pub description: Option<String>,
    pub evaluation_model_id: i32,
}

/// A project together with the evaluation model it is estimated with.
#[derive(Clone, Debug, Serialize, utoipa::ToSchema)]
pub struct ProjectDetails {
    #[serde(flatten)]
    pub project: projects::Model,
    pub evaluation_model: Option<evaluation_models::Model>,
}

#[derive(Clone)]
pub struct ProjectService {
    db: DatabaseConnection,
}

impl ProjectService {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    pub async fn list_projects(&self) -> CoreResult<Vec<ProjectDetails>> {
        let rows = projects::Entity::find()
            .find_also_related(evaluation_models::Entity)
            .order_by_asc(projects::Column::Id)
            .all(&self.db)
            .await
            .map_err(|e| db_error("list projects", e))?;

        Ok(rows
            .into_iter()
            .map(|(project, evaluation_model)| ProjectDetails {
                project,
                evaluation_model,
            })
            .collect())
    }

    pub async fn get_project(&self, id: i32) -> CoreResult<ProjectDetails> {
        let project = find_required::<projects::Entity, _>(&self.db, id, "Project").await?;
        let evaluation_model = evaluation_models::Entity::find_by_id(project.evaluation_model_id)
            .one(&self.db)
            .await
            .map_err(|e| db_error("find evaluation model", e))?;

        Ok(ProjectDetails {
            project,
            evaluation_model,
        })
    }

    pub async fn create_project(&self, input: ProjectInput) -> CoreResult<projects::Model> {
        let title = ValidationService::validate_title("Project title", &input.title)?;
        let description = ValidationService::validate_description(input.description.as_deref())?;
        let model_id = ValidationService::require_id(input.evaluation_model_id, "evaluation model")?;
        find_referenced::<evaluation_models::Entity, _>(&self.db, model_id, "evaluation model").await?;

        projects::ActiveModel {
            title: Set(title),
            description: Set(description),
            evaluation_model_id: Set(model_id),
            ..Default::default()
        }
        .insert(&self.db)
        .await
        .map_err(|e| db_error("create project", e))
    }

    pub async fn update_project(&self, id: i32, input: ProjectInput) -> CoreResult<projects::Model> {
        let title = ValidationService::validate_title("Project title", &input.title)?;
        let description = ValidationService::validate_description(input.description.as_deref())?;
        let model_id = ValidationService::require_id(input.evaluation_model_id, "evaluation model")?;

        let project = find_required::<projects::Entity, _>(&self.db, id, "Project").await?;
        find_referenced::<evaluation_models::Entity, _>(&self.db, model_id, "evaluation model").await?;

        let mut active: projects::ActiveModel = project.into();
        active.title = Set(title);
        active.description = Set(description);
        active.evaluation_model_id = Set(model_id);

        active
            .update(&self.db)
            .await
            .map_err(|e| db_error("update project", e))
    }

    /// Refused while the project still has epics or timelines.
    pub async fn delete_project(&self, id: i32) -> CoreResult<()> {
        find_required::<projects::Entity, _>(&self.db, id, "Project").await?;

        let epic_count =
            count_where::<epics::Entity, _>(&self.db, epics::Column::ProjectId, id).await?;
        let timeline_count =
            count_where::<timelines::Entity, _>(&self.db, timelines::Column::ProjectId, id).await?;
        ValidationService::ensure_no_dependents(
            "project",
            &[("epics", epic_count), ("timelines", timeline_count)],
        )?;

        projects::Entity::delete_by_id(id)
            .exec(&self.db)
            .await
            .map_err(|e| db_error("delete project", e))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::test_utils::setup_test_db;
    use crate::errors::CoreErrorKind;

    async fn evaluation_model(db: &DatabaseConnection) -> i32 {
        evaluation_models::ActiveModel {
            title: Set("Three-point".to_string()),
            ..Default::default()
        }
        .insert(db)
        .await
        .unwrap()
        .id
    }

    #[tokio::test]
    async fn create_and_list_with_model() {
        let db = setup_test_db().await;
        let model_id = evaluation_model(&db).await;
        let service = ProjectService::new(db);

        let project = service
            .create_project(ProjectInput {
                title: "  Portal ".to_string(),
                description: Some("".to_string()),
                evaluation_model_id: model_id,
            })
            .await
            .unwrap();
        assert_eq!(project.title, "Portal");
        assert_eq!(project.description, None);

        let listed = service.list_projects().await.unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(
            listed[0].evaluation_model.as_ref().map(|m| m.id),
            Some(model_id)
        );
    }

    #[tokio::test]
    async fn unknown_evaluation_model_is_invalid() {
        let db = setup_test_db().await;
        let service = ProjectService::new(db);

        let err = service
            .create_project(ProjectInput {
                title: "Portal".to_string(),
                description: None,
                evaluation_model_id: 77,
            })
            .await
            .unwrap_err();
        assert_eq!(err.kind(), CoreErrorKind::InvalidArgument);
    }

    #[tokio::test]
    async fn delete_is_blocked_by_epics() {
        let db = setup_test_db().await;
        let model_id = evaluation_model(&db).await;
        let service = ProjectService::new(db.clone());

        let project = service
            .create_project(ProjectInput {
                title: "Portal".to_string(),
                description: None,
                evaluation_model_id: model_id,
            })
            .await
            .unwrap();
        epics::ActiveModel {
            title: Set("Alpha".to_string()),
            total_estimation: Set(0.0),
            project_id: Set(project.id),
            ..Default::default()
        }
        .insert(&db)
        .await
        .unwrap();

        let err = service.delete_project(project.id).await.unwrap_err();
        assert_eq!(err.kind(), CoreErrorKind::Conflict);

        let err = service.delete_project(project.id + 100).await.unwrap_err();
        assert_eq!(err.kind(), CoreErrorKind::NotFound);
    }
}
