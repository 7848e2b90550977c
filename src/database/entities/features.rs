use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize, utoipa::ToSchema)]
#[sea_orm(table_name = "features")]
#[schema(as = Feature)]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub title: String,
    pub total_estimation: f64,
    pub epic_id: i32,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::epics::Entity",
        from = "Column::EpicId",
        to = "super::epics::Column::Id"
    )]
    Epics,
    #[sea_orm(has_many = "super::tasks::Entity")]
    Tasks,
}

impl Related<super::epics::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Epics.def()
    }
}

impl Related<super::tasks::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Tasks.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
