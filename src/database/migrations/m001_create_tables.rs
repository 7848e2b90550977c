use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // Lookup tables
        manager
            .create_table(
                Table::create()
                    .table(EvaluationModels::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(EvaluationModels::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(EvaluationModels::Title).string().not_null())
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Roles::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Roles::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Roles::Name).string().not_null())
                    .col(ColumnDef::new(Roles::DisplayName).string().not_null())
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(SeniorityLevels::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(SeniorityLevels::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(SeniorityLevels::Name).string().not_null())
                    .col(ColumnDef::new(SeniorityLevels::DisplayName).string().not_null())
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Employees::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Employees::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Employees::Name).string().not_null())
                    .col(ColumnDef::new(Employees::SeniorityLevelId).integer().not_null())
                    .col(ColumnDef::new(Employees::RoleId).integer().not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_employees_seniority_level_id")
                            .from(Employees::Table, Employees::SeniorityLevelId)
                            .to(SeniorityLevels::Table, SeniorityLevels::Id)
                            .on_delete(ForeignKeyAction::Restrict),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_employees_role_id")
                            .from(Employees::Table, Employees::RoleId)
                            .to(Roles::Table, Roles::Id)
                            .on_delete(ForeignKeyAction::Restrict),
                    )
                    .to_owned(),
            )
            .await?;

        // Work breakdown
        manager
            .create_table(
                Table::create()
                    .table(Projects::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Projects::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Projects::Title).string().not_null())
                    .col(ColumnDef::new(Projects::Description).text())
                    .col(ColumnDef::new(Projects::EvaluationModelId).integer().not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_projects_evaluation_model_id")
                            .from(Projects::Table, Projects::EvaluationModelId)
                            .to(EvaluationModels::Table, EvaluationModels::Id)
                            .on_delete(ForeignKeyAction::Restrict),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Epics::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Epics::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Epics::Title).string().not_null())
                    .col(
                        ColumnDef::new(Epics::TotalEstimation)
                            .double()
                            .not_null()
                            .default(0.0),
                    )
                    .col(ColumnDef::new(Epics::ProjectId).integer().not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_epics_project_id")
                            .from(Epics::Table, Epics::ProjectId)
                            .to(Projects::Table, Projects::Id)
                            .on_delete(ForeignKeyAction::Restrict),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Features::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Features::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Features::Title).string().not_null())
                    .col(
                        ColumnDef::new(Features::TotalEstimation)
                            .double()
                            .not_null()
                            .default(0.0),
                    )
                    .col(ColumnDef::new(Features::EpicId).integer().not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_features_epic_id")
                            .from(Features::Table, Features::EpicId)
                            .to(Epics::Table, Epics::Id)
                            .on_delete(ForeignKeyAction::Restrict),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Tasks::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Tasks::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Tasks::Title).string().not_null())
                    .col(ColumnDef::new(Tasks::FeatureId).integer().not_null())
                    .col(ColumnDef::new(Tasks::OptimisticEstimation).double())
                    .col(ColumnDef::new(Tasks::RealisticEstimation).double())
                    .col(ColumnDef::new(Tasks::PessimisticEstimation).double())
                    .col(ColumnDef::new(Tasks::TShirtSize).string())
                    .col(ColumnDef::new(Tasks::TotalEstimation).double())
                    .col(ColumnDef::new(Tasks::StartDate).timestamp_with_time_zone())
                    .col(ColumnDef::new(Tasks::EndDate).timestamp_with_time_zone())
                    .col(ColumnDef::new(Tasks::ExtraCoefficient).double())
                    .col(ColumnDef::new(Tasks::ExtraCoefficientDescription).text())
                    .col(ColumnDef::new(Tasks::Progress).double())
                    .col(ColumnDef::new(Tasks::EmployeeId).integer())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_tasks_feature_id")
                            .from(Tasks::Table, Tasks::FeatureId)
                            .to(Features::Table, Features::Id)
                            .on_delete(ForeignKeyAction::Restrict),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_tasks_employee_id")
                            .from(Tasks::Table, Tasks::EmployeeId)
                            .to(Employees::Table, Employees::Id)
                            .on_delete(ForeignKeyAction::Restrict),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(TaskRoles::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(TaskRoles::TaskId).integer().not_null())
                    .col(ColumnDef::new(TaskRoles::RoleId).integer().not_null())
                    .primary_key(
                        Index::create()
                            .name("pk_task_roles")
                            .col(TaskRoles::TaskId)
                            .col(TaskRoles::RoleId),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_task_roles_task_id")
                            .from(TaskRoles::Table, TaskRoles::TaskId)
                            .to(Tasks::Table, Tasks::Id)
                            .on_delete(ForeignKeyAction::Restrict),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_task_roles_role_id")
                            .from(TaskRoles::Table, TaskRoles::RoleId)
                            .to(Roles::Table, Roles::Id)
                            .on_delete(ForeignKeyAction::Restrict),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Timelines::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Timelines::TaskId).integer().not_null())
                    .col(ColumnDef::new(Timelines::ProjectId).integer().not_null())
                    .col(ColumnDef::new(Timelines::DateStart).timestamp_with_time_zone())
                    .col(ColumnDef::new(Timelines::DateEnd).timestamp_with_time_zone())
                    .primary_key(
                        Index::create()
                            .name("pk_timelines")
                            .col(Timelines::TaskId)
                            .col(Timelines::ProjectId),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_timelines_task_id")
                            .from(Timelines::Table, Timelines::TaskId)
                            .to(Tasks::Table, Tasks::Id)
                            .on_delete(ForeignKeyAction::Restrict),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_timelines_project_id")
                            .from(Timelines::Table, Timelines::ProjectId)
                            .to(Projects::Table, Projects::Id)
                            .on_delete(ForeignKeyAction::Restrict),
                    )
                    .to_owned(),
            )
            .await?;

        // Foreign-key lookups used by the table-items reads and the delete guards
        let indexes = [
            fk_index("idx_projects_evaluation_model_id", Projects::Table, Projects::EvaluationModelId),
            fk_index("idx_epics_project_id", Epics::Table, Epics::ProjectId),
            fk_index("idx_features_epic_id", Features::Table, Features::EpicId),
            fk_index("idx_tasks_feature_id", Tasks::Table, Tasks::FeatureId),
            fk_index("idx_tasks_employee_id", Tasks::Table, Tasks::EmployeeId),
            fk_index("idx_task_roles_role_id", TaskRoles::Table, TaskRoles::RoleId),
            fk_index("idx_timelines_project_id", Timelines::Table, Timelines::ProjectId),
            fk_index("idx_employees_role_id", Employees::Table, Employees::RoleId),
            fk_index("idx_employees_seniority_level_id", Employees::Table, Employees::SeniorityLevelId),
        ];

        for index in indexes {
            manager.create_index(index).await?;
        }

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Timelines::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(TaskRoles::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Tasks::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Features::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Epics::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Projects::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Employees::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(SeniorityLevels::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Roles::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(EvaluationModels::Table).to_owned())
            .await?;

        Ok(())
    }
}

fn fk_index<T, C>(name: &str, table: T, column: C) -> IndexCreateStatement
where
    T: Iden + 'static,
    C: Iden + 'static,
{
    Index::create()
        .name(name)
        .table(table)
        .col(column)
        .if_not_exists()
        .to_owned()
}

#[derive(Iden)]
enum EvaluationModels {
    Table,
    Id,
    Title,
}

#[derive(Iden)]
enum Projects {
    Table,
    Id,
    Title,
    Description,
    EvaluationModelId,
}

#[derive(Iden)]
enum Epics {
    Table,
    Id,
    Title,
    TotalEstimation,
    ProjectId,
}

#[derive(Iden)]
enum Features {
    Table,
    Id,
    Title,
    TotalEstimation,
    EpicId,
}

#[derive(Iden)]
enum Tasks {
    Table,
    Id,
    Title,
    FeatureId,
    OptimisticEstimation,
    RealisticEstimation,
    PessimisticEstimation,
    #[iden = "t_shirt_size"]
    TShirtSize,
    TotalEstimation,
    StartDate,
    EndDate,
    ExtraCoefficient,
    ExtraCoefficientDescription,
    Progress,
    EmployeeId,
}

#[derive(Iden)]
enum Roles {
    Table,
    Id,
    Name,
    DisplayName,
}

#[derive(Iden)]
enum SeniorityLevels {
    Table,
    Id,
    Name,
    DisplayName,
}

#[derive(Iden)]
enum Employees {
    Table,
    Id,
    Name,
    SeniorityLevelId,
    RoleId,
}

#[derive(Iden)]
enum TaskRoles {
    Table,
    TaskId,
    RoleId,
}

#[derive(Iden)]
enum Timelines {
    Table,
    TaskId,
    ProjectId,
    DateStart,
    DateEnd,
}
