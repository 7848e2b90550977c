//! Roles, seniority levels and the employees that combine them.

use std::collections::HashMap;

use sea_orm::{ActiveModelTrait, DatabaseConnection, EntityTrait, QueryOrder, Set};
use serde::{Deserialize, Serialize};

use crate::common::db_errors::db_error;
use crate::database::entities::{employees, roles, seniority_levels, task_roles, tasks};
use crate::errors::CoreResult;
use crate::services::helpers::{count_where, find_referenced, find_required};
use crate::services::ValidationService;

/// Body shared by roles and seniority levels.
#[derive(Clone, Debug, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct NamedInput {
    pub name: String,
    pub display_name: String,
}

#[derive(Clone, Debug, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct EmployeeInput {
    pub name: String,
    pub seniority_level_id: i32,
    pub role_id: i32,
}

#[derive(Clone, Debug, Serialize, utoipa::ToSchema)]
pub struct EmployeeDetails {
    #[serde(flatten)]
    pub employee: employees::Model,
    pub seniority_level: Option<seniority_levels::Model>,
    pub role: Option<roles::Model>,
}

struct Named {
    name: String,
    display_name: String,
}

fn validate_named(input: &NamedInput) -> CoreResult<Named> {
    Ok(Named {
        name: ValidationService::validate_title("Name", &input.name)?,
        display_name: ValidationService::validate_title("Display name", &input.display_name)?,
    })
}

#[derive(Clone)]
pub struct StaffService {
    db: DatabaseConnection,
}

impl StaffService {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    pub async fn list_roles(&self) -> CoreResult<Vec<roles::Model>> {
        roles::Entity::find()
            .order_by_asc(roles::Column::Id)
            .all(&self.db)
            .await
            .map_err(|e| db_error("list roles", e))
    }

    pub async fn get_role(&self, id: i32) -> CoreResult<roles::Model> {
        find_required::<roles::Entity, _>(&self.db, id, "Role").await
    }

    pub async fn create_role(&self, input: NamedInput) -> CoreResult<roles::Model> {
        let named = validate_named(&input)?;
        roles::ActiveModel {
            name: Set(named.name),
            display_name: Set(named.display_name),
            ..Default::default()
        }
        .insert(&self.db)
        .await
        .map_err(|e| db_error("create role", e))
    }

    pub async fn update_role(&self, id: i32, input: NamedInput) -> CoreResult<roles::Model> {
        let named = validate_named(&input)?;
        let mut active: roles::ActiveModel = self.get_role(id).await?.into();
        active.name = Set(named.name);
        active.display_name = Set(named.display_name);
        active
            .update(&self.db)
            .await
            .map_err(|e| db_error("update role", e))
    }

    pub async fn delete_role(&self, id: i32) -> CoreResult<()> {
        self.get_role(id).await?;
        let employee_count =
            count_where::<employees::Entity, _>(&self.db, employees::Column::RoleId, id).await?;
        let task_role_count =
            count_where::<task_roles::Entity, _>(&self.db, task_roles::Column::RoleId, id).await?;
        ValidationService::ensure_no_dependents(
            "role",
            &[("employees", employee_count), ("task roles", task_role_count)],
        )?;

        roles::Entity::delete_by_id(id)
            .exec(&self.db)
            .await
            .map_err(|e| db_error("delete role", e))?;
        Ok(())
    }

    pub async fn list_seniority_levels(&self) -> CoreResult<Vec<seniority_levels::Model>> {
        seniority_levels::Entity::find()
            .order_by_asc(seniority_levels::Column::Id)
            .all(&self.db)
            .await
            .map_err(|e| db_error("list seniority levels", e))
    }

    pub async fn get_seniority_level(&self, id: i32) -> CoreResult<seniority_levels::Model> {
        find_required::<seniority_levels::Entity, _>(&self.db, id, "Seniority level").await
    }

    pub async fn create_seniority_level(
        &self,
        input: NamedInput,
    ) -> CoreResult<seniority_levels::Model> {
        let named = validate_named(&input)?;
        seniority_levels::ActiveModel {
            name: Set(named.name),
            display_name: Set(named.display_name),
            ..Default::default()
        }
        .insert(&self.db)
        .await
        .map_err(|e| db_error("create seniority level", e))
    }

    pub async fn update_seniority_level(
        &self,
        id: i32,
        input: NamedInput,
    ) -> CoreResult<seniority_levels::Model> {
        let named = validate_named(&input)?;
        let mut active: seniority_levels::ActiveModel = self.get_seniority_level(id).await?.into();
        active.name = Set(named.name);
        active.display_name = Set(named.display_name);
        active
            .update(&self.db)
            .await
            .map_err(|e| db_error("update seniority level", e))
    }

    pub async fn delete_seniority_level(&self, id: i32) -> CoreResult<()> {
        self.get_seniority_level(id).await?;
        let employee_count = count_where::<employees::Entity, _>(
            &self.db,
            employees::Column::SeniorityLevelId,
            id,
        )
        .await?;
        ValidationService::ensure_no_dependents("seniority level", &[("employees", employee_count)])?;

        seniority_levels::Entity::delete_by_id(id)
            .exec(&self.db)
            .await
            .map_err(|e| db_error("delete seniority level", e))?;
        Ok(())
    }

    pub async fn list_employees(&self) -> CoreResult<Vec<EmployeeDetails>> {
        let employees = employees::Entity::find()
            .order_by_asc(employees::Column::Id)
            .all(&self.db)
            .await
            .map_err(|e| db_error("list employees", e))?;
        let roles: HashMap<i32, roles::Model> = self
            .list_roles()
            .await?
            .into_iter()
            .map(|role| (role.id, role))
            .collect();
        let levels: HashMap<i32, seniority_levels::Model> = self
            .list_seniority_levels()
            .await?
            .into_iter()
            .map(|level| (level.id, level))
            .collect();

        Ok(employees
            .into_iter()
            .map(|employee| EmployeeDetails {
                seniority_level: levels.get(&employee.seniority_level_id).cloned(),
                role: roles.get(&employee.role_id).cloned(),
                employee,
            })
            .collect())
    }

    pub async fn get_employee(&self, id: i32) -> CoreResult<EmployeeDetails> {
        let employee = find_required::<employees::Entity, _>(&self.db, id, "Employee").await?;
        let seniority_level = seniority_levels::Entity::find_by_id(employee.seniority_level_id)
            .one(&self.db)
            .await
            .map_err(|e| db_error("find seniority level", e))?;
        let role = roles::Entity::find_by_id(employee.role_id)
            .one(&self.db)
            .await
            .map_err(|e| db_error("find role", e))?;

        Ok(EmployeeDetails {
            employee,
            seniority_level,
            role,
        })
    }

    async fn check_employee_refs(&self, input: &EmployeeInput) -> CoreResult<(String, i32, i32)> {
        let name = ValidationService::validate_title("Employee name", &input.name)?;
        let level_id = ValidationService::require_id(input.seniority_level_id, "seniority level")?;
        let role_id = ValidationService::require_id(input.role_id, "role")?;
        find_referenced::<seniority_levels::Entity, _>(&self.db, level_id, "seniority level").await?;
        find_referenced::<roles::Entity, _>(&self.db, role_id, "role").await?;
        Ok((name, level_id, role_id))
    }

    pub async fn create_employee(&self, input: EmployeeInput) -> CoreResult<employees::Model> {
        let (name, level_id, role_id) = self.check_employee_refs(&input).await?;
        employees::ActiveModel {
            name: Set(name),
            seniority_level_id: Set(level_id),
            role_id: Set(role_id),
            ..Default::default()
        }
        .insert(&self.db)
        .await
        .map_err(|e| db_error("create employee", e))
    }

    pub async fn update_employee(&self, id: i32, input: EmployeeInput) -> CoreResult<employees::Model> {
        let existing = find_required::<employees::Entity, _>(&self.db, id, "Employee").await?;
        let (name, level_id, role_id) = self.check_employee_refs(&input).await?;

        let mut active: employees::ActiveModel = existing.into();
        active.name = Set(name);
        active.seniority_level_id = Set(level_id);
        active.role_id = Set(role_id);
        active
            .update(&self.db)
            .await
            .map_err(|e| db_error("update employee", e))
    }

    pub async fn delete_employee(&self, id: i32) -> CoreResult<()> {
        find_required::<employees::Entity, _>(&self.db, id, "Employee").await?;
        let task_count =
            count_where::<tasks::Entity, _>(&self.db, tasks::Column::EmployeeId, id).await?;
        ValidationService::ensure_no_dependents("employee", &[("tasks", task_count)])?;

        employees::Entity::delete_by_id(id)
            .exec(&self.db)
            .await
            .map_err(|e| db_error("delete employee", e))?;
        Ok(())
    }
}
