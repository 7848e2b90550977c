use sea_orm::{
    ColumnTrait, ConnectionTrait, EntityTrait, PaginatorTrait, PrimaryKeyTrait, QueryFilter,
};

use crate::common::db_errors::db_error;
use crate::errors::{CoreError, CoreResult};

/// Load a row by primary key or fail with `NotFound`.
pub async fn find_required<E, C>(db: &C, id: i32, entity: &str) -> CoreResult<E::Model>
where
    E: EntityTrait,
    C: ConnectionTrait,
    <E::PrimaryKey as PrimaryKeyTrait>::ValueType: From<i32>,
{
    E::find_by_id(id)
        .one(db)
        .await
        .map_err(|e| db_error(&format!("find {}", entity), e))?
        .ok_or_else(|| CoreError::not_found(entity, id))
}

/// Like [`find_required`] but a missing row is the caller's mistake, e.g. a
/// body that references an unknown parent.
pub async fn find_referenced<E, C>(db: &C, id: i32, entity: &str) -> CoreResult<E::Model>
where
    E: EntityTrait,
    C: ConnectionTrait,
    <E::PrimaryKey as PrimaryKeyTrait>::ValueType: From<i32>,
{
    match find_required::<E, C>(db, id, entity).await {
        Err(err) if err.is_not_found() => Err(CoreError::invalid_argument(format!(
            "Referenced {} {} does not exist",
            entity, id
        ))),
        other => other,
    }
}

/// Number of `E` rows whose `column` equals `id`.
pub async fn count_where<E, C>(db: &C, column: E::Column, id: i32) -> CoreResult<u64>
where
    E: EntityTrait,
    E::Model: Sync + 'static,
    C: ConnectionTrait,
{
    E::find()
        .filter(column.eq(id))
        .count(db)
        .await
        .map_err(|e| db_error("count dependents", e))
}
