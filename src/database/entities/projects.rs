use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize, utoipa::ToSchema)]
#[sea_orm(table_name = "projects")]
#[schema(as = Project)]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub title: String,
    pub description: Option<String>,
    pub evaluation_model_id: i32,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::evaluation_models::Entity",
        from = "Column::EvaluationModelId",
        to = "super::evaluation_models::Column::Id"
    )]
    EvaluationModels,
    #[sea_orm(has_many = "super::epics::Entity")]
    Epics,
    #[sea_orm(has_many = "super::timelines::Entity")]
    Timelines,
}

impl Related<super::evaluation_models::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::EvaluationModels.def()
    }
}

impl Related<super::epics::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Epics.def()
    }
}

impl Related<super::timelines::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Timelines.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
