//! Database error categorization
//!
//! Storage failures are classified once here so services can turn them into
//! [`CoreError`]s with a stable kind while the raw `DbErr` stays attached as
//! the source for logging.

use sea_orm::DbErr;

use crate::errors::{CoreError, CoreErrorKind};

/// Categories of database errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DbErrorKind {
    /// Record not found (query returned no results)
    NotFound,
    /// Unique constraint violation
    UniqueViolation,
    /// Foreign key constraint violation
    ForeignKeyViolation,
    ConnectionError,
    Timeout,
    Deadlock,
    Unknown,
}

impl DbErrorKind {
    /// Categorize a sea_orm database error
    ///
    /// ```
    /// use estimator::common::db_errors::DbErrorKind;
    /// use sea_orm::DbErr;
    ///
    /// let err = DbErr::RecordNotFound("task 7".to_string());
    /// assert_eq!(DbErrorKind::from_db_err(&err), DbErrorKind::NotFound);
    /// ```
    pub fn from_db_err(err: &DbErr) -> Self {
        match err {
            DbErr::RecordNotFound(_) => Self::NotFound,
            DbErr::Conn(_) | DbErr::ConnectionAcquire(_) => {
                if err.to_string().to_lowercase().contains("timeout") {
                    Self::Timeout
                } else {
                    Self::ConnectionError
                }
            }
            DbErr::Exec(_) | DbErr::Query(_) => {
                let msg_lower = err.to_string().to_lowercase();
                if msg_lower.contains("unique") || msg_lower.contains("duplicate") {
                    Self::UniqueViolation
                } else if msg_lower.contains("foreign key") || msg_lower.contains("fk_") {
                    Self::ForeignKeyViolation
                } else if msg_lower.contains("deadlock") || msg_lower.contains("database is locked") {
                    Self::Deadlock
                } else if msg_lower.contains("timeout") {
                    Self::Timeout
                } else {
                    Self::Unknown
                }
            }
            _ => Self::Unknown,
        }
    }

    /// Kind of [`CoreError`] a storage failure of this category becomes.
    pub fn core_kind(&self) -> CoreErrorKind {
        match self {
            Self::NotFound => CoreErrorKind::NotFound,
            Self::UniqueViolation | Self::ForeignKeyViolation => CoreErrorKind::Conflict,
            Self::ConnectionError | Self::Timeout | Self::Deadlock | Self::Unknown => {
                CoreErrorKind::Internal
            }
        }
    }
}

/// Format database error with operation context
///
/// The message never embeds the driver text so it is safe to hand to a
/// client; the driver text travels as the error source.
pub fn format_db_error(operation: &str, err: &DbErr) -> (DbErrorKind, String) {
    let kind = DbErrorKind::from_db_err(err);

    let message = match kind {
        DbErrorKind::NotFound => format!("{}: record not found", operation),
        DbErrorKind::UniqueViolation => format!("{}: duplicate key violation", operation),
        DbErrorKind::ForeignKeyViolation => {
            format!("{}: foreign key constraint violation", operation)
        }
        DbErrorKind::ConnectionError => format!("{}: database connection failed", operation),
        DbErrorKind::Timeout => format!("{}: query timeout", operation),
        DbErrorKind::Deadlock => format!("{}: transaction deadlock", operation),
        DbErrorKind::Unknown => format!("{}: database error", operation),
    };

    (kind, message)
}

/// Wrap a `DbErr` into a [`CoreError`] tagged with the failed operation.
pub fn db_error(operation: &str, err: DbErr) -> CoreError {
    let (kind, message) = format_db_error(operation, &err);
    CoreError::new(kind.core_kind(), message).with_source(err)
}

impl From<DbErr> for CoreError {
    fn from(err: DbErr) -> Self {
        db_error("database operation", err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error as _;

    #[test]
    fn test_categorize_record_not_found() {
        let err = DbErr::RecordNotFound("Task not found".to_string());
        let kind = DbErrorKind::from_db_err(&err);
        assert_eq!(kind, DbErrorKind::NotFound);
        assert_eq!(kind.core_kind(), CoreErrorKind::NotFound);
    }

    #[test]
    fn test_categorize_foreign_key_violation() {
        let err = DbErr::Custom("ignored".to_string());
        assert_eq!(DbErrorKind::from_db_err(&err), DbErrorKind::Unknown);

        let (kind, message) = format_db_error(
            "create feature",
            &DbErr::Exec(sea_orm::RuntimeErr::Internal(
                "FOREIGN KEY constraint failed".to_string(),
            )),
        );
        assert_eq!(kind, DbErrorKind::ForeignKeyViolation);
        assert_eq!(kind.core_kind(), CoreErrorKind::Conflict);
        assert_eq!(message, "create feature: foreign key constraint violation");
    }

    #[test]
    fn test_categorize_unique_violation() {
        let err = DbErr::Query(sea_orm::RuntimeErr::Internal(
            "UNIQUE constraint failed: task_roles.task_id".to_string(),
        ));
        assert_eq!(DbErrorKind::from_db_err(&err), DbErrorKind::UniqueViolation);
        assert_eq!(DbErrorKind::UniqueViolation.core_kind(), CoreErrorKind::Conflict);
    }

    #[test]
    fn test_unknown_errors_hide_driver_text() {
        let err = DbErr::Query(sea_orm::RuntimeErr::Internal(
            "no such table: epics".to_string(),
        ));
        let core = db_error("list epics", err);
        assert_eq!(core.kind(), CoreErrorKind::Internal);
        assert_eq!(core.message(), "list epics: database error");
        assert!(core.source().unwrap().to_string().contains("no such table"));
    }
}
