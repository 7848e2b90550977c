use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize, utoipa::ToSchema)]
#[sea_orm(table_name = "tasks")]
#[schema(as = Task)]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub title: String,
    pub feature_id: i32,
    pub optimistic_estimation: Option<f64>,
    pub realistic_estimation: Option<f64>,
    pub pessimistic_estimation: Option<f64>,
    /// String form of [`TShirtSize`](super::TShirtSize)
    pub t_shirt_size: Option<String>,
    pub total_estimation: Option<f64>,
    pub start_date: Option<DateTime<Utc>>,
    pub end_date: Option<DateTime<Utc>>,
    pub extra_coefficient: Option<f64>,
    pub extra_coefficient_description: Option<String>,
    pub progress: Option<f64>,
    pub employee_id: Option<i32>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::features::Entity",
        from = "Column::FeatureId",
        to = "super::features::Column::Id"
    )]
    Features,
    #[sea_orm(
        belongs_to = "super::employees::Entity",
        from = "Column::EmployeeId",
        to = "super::employees::Column::Id"
    )]
    Employees,
    #[sea_orm(has_many = "super::task_roles::Entity")]
    TaskRoles,
    #[sea_orm(has_many = "super::timelines::Entity")]
    Timelines,
}

impl Related<super::features::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Features.def()
    }
}

impl Related<super::employees::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Employees.def()
    }
}

impl Related<super::task_roles::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::TaskRoles.def()
    }
}

impl Related<super::timelines::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Timelines.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
