use std::collections::HashMap;

use sea_orm::{ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter, QueryOrder};

use super::rows::{epic_key, feature_key, task_key, TableRow, DEFAULT_PRIORITY};
use crate::common::db_errors::db_error;
use crate::database::entities::{employees, epics, features, projects, roles, task_roles, tasks};
use crate::errors::CoreResult;
use crate::services::helpers::find_required;

/// A project with its whole work breakdown, in storage order.
#[derive(Clone, Debug)]
pub struct ProjectTree {
    pub project: projects::Model,
    pub epics: Vec<EpicNode>,
}

#[derive(Clone, Debug)]
pub struct EpicNode {
    pub epic: epics::Model,
    pub features: Vec<FeatureNode>,
}

#[derive(Clone, Debug)]
pub struct FeatureNode {
    pub feature: features::Model,
    pub tasks: Vec<TaskNode>,
}

#[derive(Clone, Debug)]
pub struct TaskNode {
    pub task: tasks::Model,
    /// Ordered by role id; the first one names the row priority.
    pub roles: Vec<roles::Model>,
    pub employee: Option<employees::Model>,
}

impl ProjectTree {
    pub fn task_count(&self) -> usize {
        self.epics
            .iter()
            .flat_map(|epic| &epic.features)
            .map(|feature| feature.tasks.len())
            .sum()
    }
}

/// Depth-first flattening: epic, then its features, then each feature's
/// tasks, all in the order they appear in the tree.
pub fn flatten_project(tree: &ProjectTree) -> Vec<TableRow> {
    let mut rows = Vec::with_capacity(tree.task_count());

    for epic_node in &tree.epics {
        for feature_node in &epic_node.features {
            for task_node in &feature_node.tasks {
                rows.push(task_row(epic_node, feature_node, task_node));
            }
        }
    }

    rows
}

fn task_row(epic_node: &EpicNode, feature_node: &FeatureNode, task_node: &TaskNode) -> TableRow {
    let task = &task_node.task;
    let first_role = task_node.roles.first();

    TableRow {
        id: Some(task_key(task.id)),
        name: task.title.clone(),
        priority: Some(
            first_role
                .map(|role| role.display_name.clone())
                .unwrap_or_else(|| DEFAULT_PRIORITY.to_string()),
        ),
        epic: Some(epic_node.epic.title.clone()),
        epic_key: epic_key(epic_node.epic.id),
        feature: Some(feature_node.feature.title.clone()),
        feature_key: feature_key(feature_node.feature.id),
        optimistic_estimation: task.optimistic_estimation,
        realistic_estimation: task.realistic_estimation,
        pessimistic_estimation: task.pessimistic_estimation,
        t_shirt_size: task.t_shirt_size.clone(),
        total_estimation: task.total_estimation,
        start_date: task.start_date,
        end_date: task.end_date,
        extra_coefficient: task.extra_coefficient,
        extra_coefficient_description: task.extra_coefficient_description.clone(),
        progress: task.progress,
        employee_id: task.employee_id,
        employee: task_node.employee.as_ref().map(|e| e.name.clone()),
        role_id: first_role.map(|role| role.id),
    }
}

/// Fetch a project and its epics, features and tasks (with roles and
/// employees) using one query per level.
pub async fn load_project_tree<C>(db: &C, project_id: i32) -> CoreResult<ProjectTree>
where
    C: ConnectionTrait,
{
    let project = find_required::<projects::Entity, _>(db, project_id, "Project").await?;

    let epic_rows = epics::Entity::find()
        .filter(epics::Column::ProjectId.eq(project_id))
        .order_by_asc(epics::Column::Id)
        .all(db)
        .await
        .map_err(|e| db_error("list epics", e))?;

    let epic_ids: Vec<i32> = epic_rows.iter().map(|e| e.id).collect();
    let feature_rows = if epic_ids.is_empty() {
        Vec::new()
    } else {
        features::Entity::find()
            .filter(features::Column::EpicId.is_in(epic_ids))
            .order_by_asc(features::Column::Id)
            .all(db)
            .await
            .map_err(|e| db_error("list features", e))?
    };

    let feature_ids: Vec<i32> = feature_rows.iter().map(|f| f.id).collect();
    let task_rows = if feature_ids.is_empty() {
        Vec::new()
    } else {
        tasks::Entity::find()
            .filter(tasks::Column::FeatureId.is_in(feature_ids))
            .order_by_asc(tasks::Column::Id)
            .all(db)
            .await
            .map_err(|e| db_error("list tasks", e))?
    };

    let task_ids: Vec<i32> = task_rows.iter().map(|t| t.id).collect();
    let role_links = if task_ids.is_empty() {
        Vec::new()
    } else {
        task_roles::Entity::find()
            .filter(task_roles::Column::TaskId.is_in(task_ids))
            .order_by_asc(task_roles::Column::TaskId)
            .order_by_asc(task_roles::Column::RoleId)
            .all(db)
            .await
            .map_err(|e| db_error("list task roles", e))?
    };

    let role_ids: Vec<i32> = role_links.iter().map(|link| link.role_id).collect();
    let roles_by_id: HashMap<i32, roles::Model> = if role_ids.is_empty() {
        HashMap::new()
    } else {
        roles::Entity::find()
            .filter(roles::Column::Id.is_in(role_ids))
            .all(db)
            .await
            .map_err(|e| db_error("list roles", e))?
            .into_iter()
            .map(|role| (role.id, role))
            .collect()
    };

    let employee_ids: Vec<i32> = task_rows.iter().filter_map(|t| t.employee_id).collect();
    let employees_by_id: HashMap<i32, employees::Model> = if employee_ids.is_empty() {
        HashMap::new()
    } else {
        employees::Entity::find()
            .filter(employees::Column::Id.is_in(employee_ids))
            .all(db)
            .await
            .map_err(|e| db_error("list employees", e))?
            .into_iter()
            .map(|employee| (employee.id, employee))
            .collect()
    };

    let mut roles_by_task: HashMap<i32, Vec<roles::Model>> = HashMap::new();
    for link in role_links {
        if let Some(role) = roles_by_id.get(&link.role_id) {
            roles_by_task
                .entry(link.task_id)
                .or_default()
                .push(role.clone());
        }
    }

    let mut tasks_by_feature: HashMap<i32, Vec<TaskNode>> = HashMap::new();
    for task in task_rows {
        let roles = roles_by_task.remove(&task.id).unwrap_or_default();
        let employee = task
            .employee_id
            .and_then(|id| employees_by_id.get(&id).cloned());
        tasks_by_feature
            .entry(task.feature_id)
            .or_default()
            .push(TaskNode {
                task,
                roles,
                employee,
            });
    }

    let mut features_by_epic: HashMap<i32, Vec<FeatureNode>> = HashMap::new();
    for feature in feature_rows {
        let tasks = tasks_by_feature.remove(&feature.id).unwrap_or_default();
        features_by_epic
            .entry(feature.epic_id)
            .or_default()
            .push(FeatureNode { feature, tasks });
    }

    let epics = epic_rows
        .into_iter()
        .map(|epic| {
            let features = features_by_epic.remove(&epic.id).unwrap_or_default();
            EpicNode { epic, features }
        })
        .collect();

    Ok(ProjectTree { project, epics })
}
