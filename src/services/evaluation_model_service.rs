use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, Set,
};
use serde::{Deserialize, Serialize};

use crate::common::db_errors::db_error;
use crate::database::entities::{evaluation_models, projects};
use crate::errors::CoreResult;
use crate::services::helpers::{count_where, find_required};
use crate::services::ValidationService;

#[derive(Clone, Debug, Deserialize, utoipa::ToSchema)]
pub struct EvaluationModelInput {
    pub title: String,
}

#[derive(Clone, Debug, Serialize, utoipa::ToSchema)]
pub struct EvaluationModelDetails {
    #[serde(flatten)]
    pub evaluation_model: evaluation_models::Model,
    pub projects: Vec<projects::Model>,
}

#[derive(Clone)]
pub struct EvaluationModelService {
    db: DatabaseConnection,
}

impl EvaluationModelService {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    pub async fn list(&self) -> CoreResult<Vec<evaluation_models::Model>> {
        evaluation_models::Entity::find()
            .order_by_asc(evaluation_models::Column::Id)
            .all(&self.db)
            .await
            .map_err(|e| db_error("list evaluation models", e))
    }

    pub async fn get(&self, id: i32) -> CoreResult<EvaluationModelDetails> {
        let evaluation_model =
            find_required::<evaluation_models::Entity, _>(&self.db, id, "Evaluation model").await?;
        let projects = projects::Entity::find()
            .filter(projects::Column::EvaluationModelId.eq(id))
            .order_by_asc(projects::Column::Id)
            .all(&self.db)
            .await
            .map_err(|e| db_error("list projects", e))?;

        Ok(EvaluationModelDetails {
            evaluation_model,
            projects,
        })
    }

    pub async fn create(&self, input: EvaluationModelInput) -> CoreResult<evaluation_models::Model> {
        let title = ValidationService::validate_title("Evaluation model title", &input.title)?;

        evaluation_models::ActiveModel {
            title: Set(title),
            ..Default::default()
        }
        .insert(&self.db)
        .await
        .map_err(|e| db_error("create evaluation model", e))
    }

    pub async fn update(
        &self,
        id: i32,
        input: EvaluationModelInput,
    ) -> CoreResult<evaluation_models::Model> {
        let title = ValidationService::validate_title("Evaluation model title", &input.title)?;
        let existing =
            find_required::<evaluation_models::Entity, _>(&self.db, id, "Evaluation model").await?;

        let mut active: evaluation_models::ActiveModel = existing.into();
        active.title = Set(title);
        active
            .update(&self.db)
            .await
            .map_err(|e| db_error("update evaluation model", e))
    }

    pub async fn delete(&self, id: i32) -> CoreResult<()> {
        find_required::<evaluation_models::Entity, _>(&self.db, id, "Evaluation model").await?;
        let project_count =
            count_where::<projects::Entity, _>(&self.db, projects::Column::EvaluationModelId, id)
                .await?;
        ValidationService::ensure_no_dependents("evaluation model", &[("projects", project_count)])?;

        evaluation_models::Entity::delete_by_id(id)
            .exec(&self.db)
            .await
            .map_err(|e| db_error("delete evaluation model", e))?;
        Ok(())
    }
}
