use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use sea_orm::sea_query::SelectStatement;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter, QuerySelect,
    QueryTrait, Set,
};
use tracing::debug;

use super::rows::TableRow;
use crate::common::db_errors::db_error;
use crate::database::entities::{
    employees, epics, features, projects, roles, task_roles, tasks, timelines, TShirtSize,
};
use crate::errors::{CoreError, CoreResult};
use crate::services::helpers::{find_referenced, find_required};
use crate::services::validation::ValidationService;

/// Validated, storage-independent form of a submitted row set.
#[derive(Clone, Debug, PartialEq)]
pub struct ReconcilePlan {
    pub epics: Vec<PlannedEpic>,
    pub features: Vec<PlannedFeature>,
    pub tasks: Vec<PlannedTask>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct PlannedEpic {
    pub key: String,
    pub title: String,
}

#[derive(Clone, Debug, PartialEq)]
pub struct PlannedFeature {
    pub key: String,
    pub title: String,
    /// Index into [`ReconcilePlan::epics`]
    pub epic: usize,
}

#[derive(Clone, Debug, PartialEq)]
pub struct PlannedTask {
    /// Index into [`ReconcilePlan::features`]
    pub feature: usize,
    pub title: String,
    pub optimistic_estimation: Option<f64>,
    pub realistic_estimation: Option<f64>,
    pub pessimistic_estimation: Option<f64>,
    pub t_shirt_size: Option<TShirtSize>,
    pub total_estimation: Option<f64>,
    pub start_date: Option<DateTime<Utc>>,
    pub end_date: Option<DateTime<Utc>>,
    pub extra_coefficient: Option<f64>,
    pub extra_coefficient_description: Option<String>,
    pub progress: Option<f64>,
    pub employee_id: Option<i32>,
    pub role_id: Option<i32>,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct AppliedCounts {
    pub epics_created: usize,
    pub features_created: usize,
    pub tasks_created: usize,
}

impl ReconcilePlan {
    fn employee_ids(&self) -> BTreeSet<i32> {
        self.tasks.iter().filter_map(|t| t.employee_id).collect()
    }

    fn role_ids(&self) -> BTreeSet<i32> {
        self.tasks.iter().filter_map(|t| t.role_id).collect()
    }
}

fn row_error(index: usize, message: impl std::fmt::Display) -> CoreError {
    CoreError::invalid_argument(format!("Row {}: {}", index, message))
}

fn group_key(index: usize, field: &str, value: &str) -> CoreResult<String> {
    let key = value.trim();
    if key.is_empty() {
        return Err(row_error(index, format!("{} is required", field)));
    }
    Ok(key.to_string())
}

fn group_title(index: usize, field: &str, value: Option<&str>) -> CoreResult<String> {
    ValidationService::validate_title(field, value.unwrap_or_default())
        .map_err(|err| row_error(index, err.message()))
}

/// Group rows into epics and features by their client keys, preserving
/// first-occurrence order, and validate every task field.
///
/// Group titles come from the first row of each group. A feature key seen
/// under several epic keys stays with the epic of its first row.
pub fn plan_reconciliation(rows: &[TableRow]) -> CoreResult<ReconcilePlan> {
    let mut epic_index: IndexMap<String, PlannedEpic> = IndexMap::new();
    let mut feature_index: IndexMap<String, PlannedFeature> = IndexMap::new();
    let mut tasks = Vec::with_capacity(rows.len());

    for (index, row) in rows.iter().enumerate() {
        let epic_key = group_key(index, "epicId", &row.epic_key)?;
        let feature_key = group_key(index, "featureId", &row.feature_key)?;

        if !epic_index.contains_key(&epic_key) {
            let title = group_title(index, "Epic title", row.epic.as_deref())?;
            epic_index.insert(
                epic_key.clone(),
                PlannedEpic {
                    key: epic_key.clone(),
                    title,
                },
            );
        }

        let feature = match feature_index.get_index_of(&feature_key) {
            Some(position) => position,
            None => {
                let title = group_title(index, "Feature title", row.feature.as_deref())?;
                let epic = epic_index
                    .get_index_of(&epic_key)
                    .ok_or_else(|| CoreError::internal("epic group vanished while planning"))?;
                let (position, _) = feature_index.insert_full(
                    feature_key.clone(),
                    PlannedFeature {
                        key: feature_key,
                        title,
                        epic,
                    },
                );
                position
            }
        };

        tasks.push(plan_task(index, row, feature)?);
    }

    Ok(ReconcilePlan {
        epics: epic_index.into_values().collect(),
        features: feature_index.into_values().collect(),
        tasks,
    })
}

fn plan_task(index: usize, row: &TableRow, feature: usize) -> CoreResult<PlannedTask> {
    let amount = |field: &str, value: Option<f64>| {
        ValidationService::validate_optional_amount(field, value)
            .map_err(|err| row_error(index, err.message()))
    };

    let title = ValidationService::validate_title("Task name", &row.name)
        .map_err(|err| row_error(index, err.message()))?;
    let t_shirt_size = ValidationService::parse_t_shirt_size(row.t_shirt_size.as_deref())
        .map_err(|err| row_error(index, err.message()))?;

    if let (Some(start), Some(end)) = (row.start_date, row.end_date) {
        if end < start {
            return Err(row_error(index, "end_date is before start_date"));
        }
    }

    let employee_id = row
        .employee_id
        .map(|id| ValidationService::require_id(id, "employee"))
        .transpose()
        .map_err(|err| row_error(index, err.message()))?;
    let role_id = row
        .role_id
        .map(|id| ValidationService::require_id(id, "role"))
        .transpose()
        .map_err(|err| row_error(index, err.message()))?;

    Ok(PlannedTask {
        feature,
        title,
        optimistic_estimation: amount("optimistic_estimation", row.optimistic_estimation)?,
        realistic_estimation: amount("realistic_estimation", row.realistic_estimation)?,
        pessimistic_estimation: amount("pessimistic_estimation", row.pessimistic_estimation)?,
        t_shirt_size,
        total_estimation: amount("total_estimation", row.total_estimation)?,
        start_date: row.start_date,
        end_date: row.end_date,
        extra_coefficient: amount("extra_coefficient", row.extra_coefficient)?,
        extra_coefficient_description: row
            .extra_coefficient_description
            .as_deref()
            .map(str::trim)
            .filter(|v| !v.is_empty())
            .map(str::to_string),
        progress: amount("progress", row.progress)?,
        employee_id,
        role_id,
    })
}

/// Replace the project's epics, features and tasks with the planned ones.
///
/// Must run inside a transaction: nothing here commits or rolls back. The
/// first statement is a delete so the transaction holds the write lock before
/// it reads anything.
pub async fn apply_plan<C>(db: &C, project_id: i32, plan: &ReconcilePlan) -> CoreResult<AppliedCounts>
where
    C: ConnectionTrait,
{
    clear_project_children(db, project_id).await?;

    find_required::<projects::Entity, _>(db, project_id, "Project").await?;
    for employee_id in plan.employee_ids() {
        find_referenced::<employees::Entity, _>(db, employee_id, "employee").await?;
    }
    for role_id in plan.role_ids() {
        find_referenced::<roles::Entity, _>(db, role_id, "role").await?;
    }

    let mut epic_ids = Vec::with_capacity(plan.epics.len());
    for epic in &plan.epics {
        let created = epics::ActiveModel {
            title: Set(epic.title.clone()),
            total_estimation: Set(0.0),
            project_id: Set(project_id),
            ..Default::default()
        }
        .insert(db)
        .await
        .map_err(|e| db_error("create epic", e))?;
        debug!("Epic group '{}' -> epic {}", epic.key, created.id);
        epic_ids.push(created.id);
    }

    let mut feature_ids = Vec::with_capacity(plan.features.len());
    for feature in &plan.features {
        let epic_id = *epic_ids
            .get(feature.epic)
            .ok_or_else(|| CoreError::internal("feature refers to an unplanned epic"))?;
        let created = features::ActiveModel {
            title: Set(feature.title.clone()),
            total_estimation: Set(0.0),
            epic_id: Set(epic_id),
            ..Default::default()
        }
        .insert(db)
        .await
        .map_err(|e| db_error("create feature", e))?;
        debug!("Feature group '{}' -> feature {}", feature.key, created.id);
        feature_ids.push(created.id);
    }

    for task in &plan.tasks {
        let feature_id = *feature_ids
            .get(task.feature)
            .ok_or_else(|| CoreError::internal("task refers to an unplanned feature"))?;
        let created = tasks::ActiveModel {
            title: Set(task.title.clone()),
            feature_id: Set(feature_id),
            optimistic_estimation: Set(task.optimistic_estimation),
            realistic_estimation: Set(task.realistic_estimation),
            pessimistic_estimation: Set(task.pessimistic_estimation),
            t_shirt_size: Set(task.t_shirt_size.map(String::from)),
            total_estimation: Set(task.total_estimation),
            start_date: Set(task.start_date),
            end_date: Set(task.end_date),
            extra_coefficient: Set(task.extra_coefficient),
            extra_coefficient_description: Set(task.extra_coefficient_description.clone()),
            progress: Set(task.progress),
            employee_id: Set(task.employee_id),
            ..Default::default()
        }
        .insert(db)
        .await
        .map_err(|e| db_error("create task", e))?;

        if let Some(role_id) = task.role_id {
            task_roles::ActiveModel {
                task_id: Set(created.id),
                role_id: Set(role_id),
            }
            .insert(db)
            .await
            .map_err(|e| db_error("create task role", e))?;
        }
    }

    Ok(AppliedCounts {
        epics_created: epic_ids.len(),
        features_created: feature_ids.len(),
        tasks_created: plan.tasks.len(),
    })
}

fn project_epic_ids(project_id: i32) -> SelectStatement {
    epics::Entity::find()
        .select_only()
        .column(epics::Column::Id)
        .filter(epics::Column::ProjectId.eq(project_id))
        .into_query()
}

fn project_feature_ids(project_id: i32) -> SelectStatement {
    features::Entity::find()
        .select_only()
        .column(features::Column::Id)
        .filter(features::Column::EpicId.in_subquery(project_epic_ids(project_id)))
        .into_query()
}

fn project_task_ids(project_id: i32) -> SelectStatement {
    tasks::Entity::find()
        .select_only()
        .column(tasks::Column::Id)
        .filter(tasks::Column::FeatureId.in_subquery(project_feature_ids(project_id)))
        .into_query()
}

/// Delete everything below the project, children before parents. Only
/// deletes are issued; ids are selected by subquery.
async fn clear_project_children<C>(db: &C, project_id: i32) -> CoreResult<()>
where
    C: ConnectionTrait,
{
    task_roles::Entity::delete_many()
        .filter(task_roles::Column::TaskId.in_subquery(project_task_ids(project_id)))
        .exec(db)
        .await
        .map_err(|e| db_error("delete task roles", e))?;
    timelines::Entity::delete_many()
        .filter(timelines::Column::TaskId.in_subquery(project_task_ids(project_id)))
        .exec(db)
        .await
        .map_err(|e| db_error("delete timelines", e))?;

    let deleted = tasks::Entity::delete_many()
        .filter(tasks::Column::FeatureId.in_subquery(project_feature_ids(project_id)))
        .exec(db)
        .await
        .map_err(|e| db_error("delete tasks", e))?;
    debug!("Deleted {} tasks of project {}", deleted.rows_affected, project_id);

    features::Entity::delete_many()
        .filter(features::Column::EpicId.in_subquery(project_epic_ids(project_id)))
        .exec(db)
        .await
        .map_err(|e| db_error("delete features", e))?;
    epics::Entity::delete_many()
        .filter(epics::Column::ProjectId.eq(project_id))
        .exec(db)
        .await
        .map_err(|e| db_error("delete epics", e))?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::CoreErrorKind;

    fn row(epic_key: &str, epic: &str, feature_key: &str, feature: &str, name: &str) -> TableRow {
        TableRow {
            epic_key: epic_key.to_string(),
            epic: Some(epic.to_string()),
            feature_key: feature_key.to_string(),
            feature: Some(feature.to_string()),
            name: name.to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn groups_in_first_occurrence_order() {
        let rows = vec![
            row("e-2", "Beta", "f-3", "Search", "Index"),
            row("e-1", "Alpha", "f-1", "Login", "Build form"),
            row("e-2", "Beta", "f-2", "Filters", "Facets"),
            row("e-1", "Alpha", "f-1", "Login", "Wire API"),
        ];

        let plan = plan_reconciliation(&rows).unwrap();

        let epics: Vec<&str> = plan.epics.iter().map(|e| e.title.as_str()).collect();
        assert_eq!(epics, vec!["Beta", "Alpha"]);

        let features: Vec<(&str, usize)> = plan
            .features
            .iter()
            .map(|f| (f.title.as_str(), f.epic))
            .collect();
        assert_eq!(features, vec![("Search", 0), ("Login", 1), ("Filters", 0)]);

        let task_features: Vec<usize> = plan.tasks.iter().map(|t| t.feature).collect();
        assert_eq!(task_features, vec![0, 1, 2, 1]);
    }

    #[test]
    fn group_titles_come_from_first_row() {
        let rows = vec![
            row("e-1", "Alpha", "f-1", "Login", "Build form"),
            row("e-1", "Renamed", "f-1", "Sign in", "Wire API"),
        ];

        let plan = plan_reconciliation(&rows).unwrap();
        assert_eq!(plan.epics.len(), 1);
        assert_eq!(plan.epics[0].title, "Alpha");
        assert_eq!(plan.features[0].title, "Login");
    }

    #[test]
    fn feature_under_two_epics_keeps_first_epic() {
        let rows = vec![
            row("e-1", "Alpha", "f-1", "Login", "Build form"),
            row("e-2", "Beta", "f-1", "Login", "Wire API"),
        ];

        let plan = plan_reconciliation(&rows).unwrap();
        assert_eq!(plan.epics.len(), 2);
        assert_eq!(plan.features.len(), 1);
        assert_eq!(plan.features[0].epic, 0);
    }

    #[test]
    fn missing_group_keys_are_rejected() {
        let mut bad = row("e-1", "Alpha", "f-1", "Login", "Build form");
        bad.epic_key = "  ".to_string();
        let err = plan_reconciliation(&[bad]).unwrap_err();
        assert_eq!(err.kind(), CoreErrorKind::InvalidArgument);
        assert!(err.message().contains("epicId"));

        let mut bad = row("e-1", "Alpha", "f-1", "Login", "Build form");
        bad.feature_key.clear();
        let err = plan_reconciliation(&[bad]).unwrap_err();
        assert!(err.message().contains("featureId"));
    }

    #[test]
    fn invalid_task_fields_name_the_row() {
        let good = row("e-1", "Alpha", "f-1", "Login", "Build form");
        let mut bad = row("e-1", "Alpha", "f-1", "Login", "Wire API");
        bad.realistic_estimation = Some(-2.0);

        let err = plan_reconciliation(&[good.clone(), bad]).unwrap_err();
        assert_eq!(err.kind(), CoreErrorKind::InvalidArgument);
        assert!(err.message().starts_with("Row 1:"), "{}", err.message());

        let mut bad = good.clone();
        bad.t_shirt_size = Some("XXXL".to_string());
        assert!(plan_reconciliation(&[bad]).is_err());

        let mut bad = good;
        bad.name = String::new();
        assert!(plan_reconciliation(&[bad]).is_err());
    }

    #[test]
    fn optional_fields_stay_absent() {
        let mut input = row("e-1", "Alpha", "f-1", "Login", "Build form");
        input.optimistic_estimation = Some(2.0);
        input.t_shirt_size = Some("xl".to_string());
        input.extra_coefficient_description = Some("   ".to_string());

        let plan = plan_reconciliation(&[input]).unwrap();
        let task = &plan.tasks[0];
        assert_eq!(task.optimistic_estimation, Some(2.0));
        assert_eq!(task.realistic_estimation, None);
        assert_eq!(task.t_shirt_size, Some(TShirtSize::ExtraLarge));
        assert_eq!(task.extra_coefficient_description, None);
        assert_eq!(task.progress, None);
    }

    #[test]
    fn empty_input_plans_nothing() {
        let plan = plan_reconciliation(&[]).unwrap();
        assert!(plan.epics.is_empty());
        assert!(plan.features.is_empty());
        assert!(plan.tasks.is_empty());
    }
}
