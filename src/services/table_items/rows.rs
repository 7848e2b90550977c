use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Label used when a task has no role attached.
pub const DEFAULT_PRIORITY: &str = "Normal";

/// One grid/gantt row: a task together with its feature and epic.
///
/// `epicId` and `featureId` are group keys. On read they are derived from the
/// persisted ids (`epic-12`); on write they are opaque client strings that
/// only group rows together. Absent optional fields serialize as `null`.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize, utoipa::ToSchema)]
pub struct TableRow {
    /// `task-<id>` on read, ignored on write
    pub id: Option<String>,
    #[serde(default)]
    pub name: String,
    pub priority: Option<String>,
    pub epic: Option<String>,
    #[serde(rename = "epicId", default)]
    pub epic_key: String,
    pub feature: Option<String>,
    #[serde(rename = "featureId", default)]
    pub feature_key: String,
    pub optimistic_estimation: Option<f64>,
    pub realistic_estimation: Option<f64>,
    pub pessimistic_estimation: Option<f64>,
    pub t_shirt_size: Option<String>,
    pub total_estimation: Option<f64>,
    pub start_date: Option<DateTime<Utc>>,
    pub end_date: Option<DateTime<Utc>>,
    pub extra_coefficient: Option<f64>,
    pub extra_coefficient_description: Option<String>,
    pub progress: Option<f64>,
    pub employee_id: Option<i32>,
    /// Employee display name, read only
    pub employee: Option<String>,
    pub role_id: Option<i32>,
}

pub fn epic_key(id: i32) -> String {
    format!("epic-{}", id)
}

pub fn feature_key(id: i32) -> String {
    format!("feature-{}", id)
}

pub fn task_key(id: i32) -> String {
    format!("task-{}", id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn deserializes_sparse_client_rows() {
        let row: TableRow = serde_json::from_value(json!({
            "epicId": "epic-1",
            "epic": "Alpha",
            "featureId": "feat-1",
            "feature": "Login",
            "name": "Build form",
            "optimistic_estimation": 2,
            "realistic_estimation": 3,
            "pessimistic_estimation": 5
        }))
        .unwrap();

        assert_eq!(row.epic_key, "epic-1");
        assert_eq!(row.feature_key, "feat-1");
        assert_eq!(row.optimistic_estimation, Some(2.0));
        assert_eq!(row.t_shirt_size, None);
        assert_eq!(row.employee_id, None);
    }

    #[test]
    fn absent_fields_serialize_as_null() {
        let value = serde_json::to_value(TableRow {
            name: "Build form".to_string(),
            epic_key: epic_key(1),
            feature_key: feature_key(2),
            ..Default::default()
        })
        .unwrap();

        assert_eq!(value["epicId"], "epic-1");
        assert_eq!(value["featureId"], "feature-2");
        assert!(value["progress"].is_null());
        assert!(value["start_date"].is_null());
        assert!(value.as_object().unwrap().contains_key("extra_coefficient"));
    }
}
