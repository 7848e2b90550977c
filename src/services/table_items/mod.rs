//! Flat row view of a project's epics, features and tasks.
//!
//! Reads flatten the persisted tree into [`TableRow`]s. Writes replace the
//! whole tree from a submitted row set inside one transaction, mapping the
//! client's group keys onto freshly created epics and features.

mod flatten;
mod reconcile;
mod rows;

use std::sync::Arc;

use sea_orm::{DatabaseConnection, TransactionTrait};
use serde::Serialize;
use tokio::sync::{Mutex, MutexGuard};
use tracing::{info, instrument};

use crate::common::db_errors::db_error;
use crate::errors::CoreResult;

pub use flatten::{flatten_project, load_project_tree, EpicNode, FeatureNode, ProjectTree, TaskNode};
pub use reconcile::{
    apply_plan, plan_reconciliation, AppliedCounts, PlannedEpic, PlannedFeature, PlannedTask,
    ReconcilePlan,
};
pub use rows::{epic_key, feature_key, task_key, TableRow, DEFAULT_PRIORITY};

/// Result of a successful write.
#[derive(Clone, Debug, Serialize, utoipa::ToSchema)]
pub struct ReconcileOutcome {
    pub project_id: i32,
    pub epics_created: usize,
    pub features_created: usize,
    pub tasks_created: usize,
    /// Flattened project as committed
    pub rows: Vec<TableRow>,
}

/// Process-wide gate for multi-statement write transactions.
///
/// SQLite admits a single writer, and a deferred transaction that has already
/// read cannot wait for the write lock, so reconciliations queue here instead
/// of failing with "database is locked".
#[derive(Debug, Default)]
pub struct WriteLock {
    inner: Mutex<()>,
}

impl WriteLock {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn acquire(&self) -> MutexGuard<'_, ()> {
        self.inner.lock().await
    }
}

#[derive(Clone)]
pub struct TableItemsService {
    db: DatabaseConnection,
    writes: Arc<WriteLock>,
}

impl TableItemsService {
    pub fn new(db: DatabaseConnection, writes: Arc<WriteLock>) -> Self {
        Self { db, writes }
    }

    pub async fn flatten(&self, project_id: i32) -> CoreResult<Vec<TableRow>> {
        let tree = load_project_tree(&self.db, project_id).await?;
        Ok(flatten_project(&tree))
    }

    /// Replace the project's epics, features and tasks with `rows`.
    ///
    /// Either the whole replacement commits or nothing changes. Malformed rows
    /// are rejected before storage is touched, so they win over a missing
    /// project.
    #[instrument(skip(self, rows), fields(rows = rows.len()))]
    pub async fn reconcile(&self, project_id: i32, rows: Vec<TableRow>) -> CoreResult<ReconcileOutcome> {
        let plan = plan_reconciliation(&rows)?;

        let _guard = self.writes.acquire().await;

        let txn = self
            .db
            .begin()
            .await
            .map_err(|e| db_error("begin reconciliation", e))?;

        let counts = apply_plan(&txn, project_id, &plan).await?;
        let tree = load_project_tree(&txn, project_id).await?;
        let rows = flatten_project(&tree);

        txn.commit()
            .await
            .map_err(|e| db_error("commit reconciliation", e))?;

        info!(
            "Reconciled project {}: {} epics, {} features, {} tasks",
            project_id, counts.epics_created, counts.features_created, counts.tasks_created
        );

        Ok(ReconcileOutcome {
            project_id,
            epics_created: counts.epics_created,
            features_created: counts.features_created,
            tasks_created: counts.tasks_created,
            rows,
        })
    }
}

#[cfg(test)]
mod tests {
    use sea_orm::{ActiveModelTrait, EntityTrait, Set};

    use super::*;
    use crate::database::entities::{epics, evaluation_models, features, projects, roles, tasks};
    use crate::database::test_utils::setup_test_db;
    use crate::errors::CoreErrorKind;

    async fn seeded_project(db: &DatabaseConnection) -> i32 {
        let model = evaluation_models::ActiveModel {
            title: Set("Three-point".to_string()),
            ..Default::default()
        }
        .insert(db)
        .await
        .unwrap();

        projects::ActiveModel {
            title: Set("Portal".to_string()),
            evaluation_model_id: Set(model.id),
            ..Default::default()
        }
        .insert(db)
        .await
        .unwrap()
        .id
    }

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

    fn service(db: &DatabaseConnection) -> TableItemsService {
        TableItemsService::new(db.clone(), Arc::new(WriteLock::new()))
    }

    #[tokio::test]
    async fn reconcile_then_flatten() {
        let db = setup_test_db().await;
        let project_id = seeded_project(&db).await;
        let service = service(&db);

        let mut first = row("epic-1", "Alpha", "feat-1", "Login", "Build form");
        first.optimistic_estimation = Some(2.0);
        first.realistic_estimation = Some(3.0);
        first.pessimistic_estimation = Some(5.0);

        let outcome = service
            .reconcile(
                project_id,
                vec![first, row("epic-1", "Alpha", "feat-2", "Signup", "Captcha")],
            )
            .await
            .unwrap();

        assert_eq!(outcome.epics_created, 1);
        assert_eq!(outcome.features_created, 2);
        assert_eq!(outcome.tasks_created, 2);

        let rows = service.flatten(project_id).await.unwrap();
        assert_eq!(rows, outcome.rows);
        assert_eq!(rows[0].name, "Build form");
        assert_eq!(rows[0].priority.as_deref(), Some(DEFAULT_PRIORITY));
        assert_eq!(rows[0].pessimistic_estimation, Some(5.0));
        assert_eq!(rows[0].epic_key, rows[1].epic_key);
        assert_ne!(rows[0].feature_key, rows[1].feature_key);
    }

    #[tokio::test]
    async fn second_write_replaces_the_tree() {
        let db = setup_test_db().await;
        let project_id = seeded_project(&db).await;
        let service = service(&db);

        service
            .reconcile(project_id, vec![row("a", "Alpha", "b", "Login", "Build form")])
            .await
            .unwrap();
        service
            .reconcile(project_id, vec![row("x", "Beta", "y", "Search", "Index")])
            .await
            .unwrap();

        assert_eq!(epics::Entity::find().all(&db).await.unwrap().len(), 1);
        assert_eq!(features::Entity::find().all(&db).await.unwrap().len(), 1);
        let remaining = tasks::Entity::find().all(&db).await.unwrap();
        assert_eq!(remaining.len(), 1);
        assert_eq!(remaining[0].title, "Index");
    }

    #[tokio::test]
    async fn role_drives_priority() {
        let db = setup_test_db().await;
        let project_id = seeded_project(&db).await;
        let role = roles::ActiveModel {
            name: Set("qa".to_string()),
            display_name: Set("QA engineer".to_string()),
            ..Default::default()
        }
        .insert(&db)
        .await
        .unwrap();

        let mut input = row("a", "Alpha", "b", "Login", "Test form");
        input.role_id = Some(role.id);

        let outcome = service(&db).reconcile(project_id, vec![input]).await.unwrap();
        assert_eq!(outcome.rows[0].priority.as_deref(), Some("QA engineer"));
        assert_eq!(outcome.rows[0].role_id, Some(role.id));
    }

    #[tokio::test]
    async fn unknown_reference_rolls_back() {
        let db = setup_test_db().await;
        let project_id = seeded_project(&db).await;
        let service = service(&db);

        service
            .reconcile(project_id, vec![row("a", "Alpha", "b", "Login", "Build form")])
            .await
            .unwrap();

        let mut bad = row("x", "Beta", "y", "Search", "Index");
        bad.employee_id = Some(4242);
        let err = service.reconcile(project_id, vec![bad]).await.unwrap_err();
        assert_eq!(err.kind(), CoreErrorKind::InvalidArgument);

        let rows = service.flatten(project_id).await.unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].name, "Build form");
    }

    #[tokio::test]
    async fn missing_project_is_not_found() {
        let db = setup_test_db().await;
        let service = service(&db);

        let err = service.flatten(999_999).await.unwrap_err();
        assert_eq!(err.kind(), CoreErrorKind::NotFound);

        let err = service
            .reconcile(999_999, vec![row("a", "Alpha", "b", "Login", "Build form")])
            .await
            .unwrap_err();
        assert_eq!(err.kind(), CoreErrorKind::NotFound);
    }

    #[tokio::test]
    async fn malformed_rows_are_rejected_before_project_lookup() {
        let db = setup_test_db().await;
        let service = service(&db);

        let nameless = row("a", "Alpha", "b", "Login", "  ");
        let err = service.reconcile(999_999, vec![nameless]).await.unwrap_err();
        assert_eq!(err.kind(), CoreErrorKind::InvalidArgument);
    }

    #[tokio::test]
    async fn failure_after_deletes_restores_previous_tree() {
        let db = setup_test_db().await;
        let project_id = seeded_project(&db).await;
        let service = service(&db);

        service
            .reconcile(project_id, vec![row("a", "Alpha", "b", "Login", "Build form")])
            .await
            .unwrap();
        let before = service.flatten(project_id).await.unwrap();

        let mut plan = plan_reconciliation(&[row("x", "Beta", "y", "Search", "Index")]).unwrap();
        plan.tasks[0].feature = 7;

        let txn = db.begin().await.unwrap();
        let err = apply_plan(&txn, project_id, &plan).await.unwrap_err();
        assert_eq!(err.kind(), CoreErrorKind::Internal);

        // Old tree already gone and the new epic written when the task failed.
        let inside: Vec<String> = epics::Entity::find()
            .all(&txn)
            .await
            .unwrap()
            .into_iter()
            .map(|e| e.title)
            .collect();
        assert_eq!(inside, vec!["Beta".to_string()]);
        drop(txn);

        let after = service.flatten(project_id).await.unwrap();
        assert_eq!(after, before);
        assert_eq!(epics::Entity::find().all(&db).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn write_lock_is_exclusive() {
        let writes = WriteLock::new();
        let guard = writes.acquire().await;
        assert!(writes.inner.try_lock().is_err());
        drop(guard);
        assert!(writes.inner.try_lock().is_ok());
    }
}
