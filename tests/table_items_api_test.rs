//! Table-items read/write over HTTP

mod common;

use std::future::IntoFuture;
use std::sync::Arc;

use anyhow::Result;
use axum::http::StatusCode;
use common::{setup_test_app, TestApp};
use estimator::services::table_items::TableRow;
use estimator::services::{TableItemsService, WriteLock};
use serde_json::{json, Value};

fn table_path(project_id: impl std::fmt::Display) -> String {
    format!("/api/v1/projects/{}/table-items", project_id)
}

fn sample_rows() -> Value {
    json!([
        {
            "epicId": "epic-1", "epic": "Alpha",
            "featureId": "feat-1", "feature": "Login",
            "name": "Build form",
            "optimistic_estimation": 2, "realistic_estimation": 3, "pessimistic_estimation": 5,
            "t_shirt_size": "M",
            "start_date": "2024-03-01T00:00:00Z", "end_date": "2024-03-05T00:00:00Z"
        },
        {
            "epicId": "epic-1", "epic": "Alpha",
            "featureId": "feat-2", "feature": "Signup",
            "name": "Captcha",
            "realistic_estimation": 1.5,
            "extra_coefficient": 1.2, "extra_coefficient_description": "third-party API"
        },
        {
            "epicId": "epic-2", "epic": "Beta",
            "featureId": "feat-3", "feature": "Search",
            "name": "Index",
            "progress": 40
        },
        {
            "epicId": "epic-1", "epic": "Alpha",
            "featureId": "feat-1", "feature": "Login",
            "name": "Wire API"
        }
    ])
}

async fn read_rows(app: &TestApp, project_id: i64) -> Vec<TableRow> {
    let response = app.server.get(&table_path(project_id)).await;
    response.assert_status_ok();
    let envelope: Value = response.json();
    serde_json::from_value(envelope["data"].clone()).expect("rows")
}

async fn write_rows(app: &TestApp, project_id: i64, rows: &Value) -> Value {
    let response = app.server.put(&table_path(project_id)).json(rows).await;
    response.assert_status_ok();
    let envelope: Value = response.json();
    envelope["data"].clone()
}

/// Everything except identifiers and derived labels, in a sortable form.
fn content_multiset(rows: &[TableRow]) -> Vec<String> {
    let mut items: Vec<String> = rows
        .iter()
        .map(|row| {
            format!(
                "{:?}",
                (
                    (
                    &row.name,
                    &row.epic,
                    &row.feature,
                    row.optimistic_estimation,
                    row.realistic_estimation,
                    row.pessimistic_estimation,
                    &row.t_shirt_size,
                    ),
                    (
                    row.total_estimation,
                    row.start_date,
                    row.end_date,
                    row.extra_coefficient,
                    &row.extra_coefficient_description,
                    row.progress,
                    row.employee_id,
                    ),
                )
            )
        })
        .collect();
    items.sort();
    items
}

#[tokio::test]
async fn single_row_scenario() -> Result<()> {
    let app = setup_test_app().await?;
    let project_id = app.create_project("Portal").await;

    let rows = json!([{
        "epicId": "epic-1", "epic": "Alpha",
        "featureId": "feat-1", "feature": "Login",
        "name": "Build form",
        "optimistic_estimation": 2, "realistic_estimation": 3, "pessimistic_estimation": 5
    }]);
    let outcome = write_rows(&app, project_id, &rows).await;
    assert_eq!(outcome["project_id"], project_id);
    assert_eq!(outcome["epics_created"], 1);
    assert_eq!(outcome["features_created"], 1);
    assert_eq!(outcome["tasks_created"], 1);

    let flattened = read_rows(&app, project_id).await;
    assert_eq!(flattened.len(), 1);
    let row = &flattened[0];
    assert_eq!(row.epic.as_deref(), Some("Alpha"));
    assert_eq!(row.feature.as_deref(), Some("Login"));
    assert_eq!(row.name, "Build form");
    assert_eq!(row.optimistic_estimation, Some(2.0));
    assert_eq!(row.realistic_estimation, Some(3.0));
    assert_eq!(row.pessimistic_estimation, Some(5.0));
    assert_eq!(row.priority.as_deref(), Some("Normal"));
    assert_eq!(row.t_shirt_size, None);
    assert_eq!(row.employee_id, None);

    let epic_id = row.epic_key.trim_start_matches("epic-");
    let response = app.server.get(&format!("/api/v1/epics/{}", epic_id)).await;
    response.assert_status_ok();
    let epic: Value = response.json();
    assert_eq!(epic["data"]["title"], "Alpha");
    assert_eq!(epic["data"]["features"].as_array().map(Vec::len), Some(1));

    Ok(())
}

#[tokio::test]
async fn round_trip_preserves_row_content() -> Result<()> {
    let app = setup_test_app().await?;
    let project_id = app.create_project("Portal").await;

    let input = sample_rows();
    write_rows(&app, project_id, &input).await;
    let flattened = read_rows(&app, project_id).await;

    let submitted: Vec<TableRow> = serde_json::from_value(input)?;
    assert_eq!(flattened.len(), submitted.len());
    assert_eq!(content_multiset(&flattened), content_multiset(&submitted));

    // Depth first: all of Alpha/Login, then Alpha/Signup, then Beta/Search.
    let names: Vec<&str> = flattened.iter().map(|r| r.name.as_str()).collect();
    assert_eq!(names, vec!["Build form", "Wire API", "Captcha", "Index"]);

    Ok(())
}

#[tokio::test]
async fn shared_epic_key_maps_to_one_epic() -> Result<()> {
    let app = setup_test_app().await?;
    let project_id = app.create_project("Portal").await;

    write_rows(&app, project_id, &sample_rows()).await;
    let flattened = read_rows(&app, project_id).await;

    let alpha_keys: Vec<&str> = flattened
        .iter()
        .filter(|r| r.epic.as_deref() == Some("Alpha"))
        .map(|r| r.epic_key.as_str())
        .collect();
    assert_eq!(alpha_keys.len(), 3);
    assert!(alpha_keys.iter().all(|key| *key == alpha_keys[0]));

    let beta = flattened
        .iter()
        .find(|r| r.epic.as_deref() == Some("Beta"))
        .expect("beta row");
    assert_ne!(beta.epic_key, alpha_keys[0]);

    let login_keys: Vec<&str> = flattened
        .iter()
        .filter(|r| r.feature.as_deref() == Some("Login"))
        .map(|r| r.feature_key.as_str())
        .collect();
    assert_eq!(login_keys, vec![login_keys[0]; 2]);

    Ok(())
}

#[tokio::test]
async fn reconciling_twice_is_idempotent() -> Result<()> {
    let app = setup_test_app().await?;
    let project_id = app.create_project("Portal").await;
    let input = sample_rows();

    write_rows(&app, project_id, &input).await;
    let once = read_rows(&app, project_id).await;
    write_rows(&app, project_id, &input).await;
    let twice = read_rows(&app, project_id).await;

    assert_eq!(content_multiset(&once), content_multiset(&twice));
    let order_once: Vec<&str> = once.iter().map(|r| r.name.as_str()).collect();
    let order_twice: Vec<&str> = twice.iter().map(|r| r.name.as_str()).collect();
    assert_eq!(order_once, order_twice);

    Ok(())
}

#[tokio::test]
async fn flattened_snapshot_can_be_posted_back() -> Result<()> {
    let app = setup_test_app().await?;
    let project_id = app.create_project("Portal").await;

    write_rows(&app, project_id, &sample_rows()).await;
    let snapshot = read_rows(&app, project_id).await;

    let outcome = write_rows(&app, project_id, &serde_json::to_value(&snapshot)?).await;
    assert_eq!(outcome["epics_created"], 2);
    assert_eq!(outcome["features_created"], 3);
    assert_eq!(outcome["tasks_created"], 4);

    let again = read_rows(&app, project_id).await;
    assert_eq!(content_multiset(&again), content_multiset(&snapshot));

    Ok(())
}

#[tokio::test]
async fn empty_row_set_clears_the_project() -> Result<()> {
    let app = setup_test_app().await?;
    let project_id = app.create_project("Portal").await;

    write_rows(&app, project_id, &sample_rows()).await;
    let outcome = write_rows(&app, project_id, &json!([])).await;
    assert_eq!(outcome["tasks_created"], 0);
    assert!(read_rows(&app, project_id).await.is_empty());

    // Nothing left below the project, so it can be deleted.
    let response = app
        .server
        .delete(&format!("/api/v1/projects/{}", project_id))
        .await;
    response.assert_status_ok();

    Ok(())
}

#[tokio::test]
async fn unknown_and_malformed_project_ids() -> Result<()> {
    let app = setup_test_app().await?;
    let rows = sample_rows();

    let response = app.server.get(&table_path(999999)).expect_failure().await;
    assert_eq!(response.status_code(), StatusCode::NOT_FOUND);

    let response = app
        .server
        .put(&table_path(999999))
        .json(&rows)
        .expect_failure()
        .await;
    assert_eq!(response.status_code(), StatusCode::NOT_FOUND);
    let body: Value = response.json();
    assert_eq!(body["success"], false);

    let response = app.server.get(&table_path("abc")).expect_failure().await;
    assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);

    let response = app
        .server
        .put(&table_path("abc"))
        .json(&rows)
        .expect_failure()
        .await;
    assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);

    Ok(())
}

#[tokio::test]
async fn malformed_rows_are_rejected_without_writing() -> Result<()> {
    let app = setup_test_app().await?;
    let project_id = app.create_project("Portal").await;
    write_rows(&app, project_id, &sample_rows()).await;

    let missing_key = json!([{ "epic": "Alpha", "featureId": "f", "feature": "Login", "name": "x" }]);
    let response = app
        .server
        .put(&table_path(project_id))
        .json(&missing_key)
        .expect_failure()
        .await;
    assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);

    let not_an_array = json!({ "rows": [] });
    let response = app
        .server
        .put(&table_path(project_id))
        .json(&not_an_array)
        .expect_failure()
        .await;
    assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);

    let bad_size = json!([{
        "epicId": "e", "epic": "Alpha", "featureId": "f", "feature": "Login",
        "name": "x", "t_shirt_size": "HUGE"
    }]);
    let response = app
        .server
        .put(&table_path(project_id))
        .json(&bad_size)
        .expect_failure()
        .await;
    assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);

    assert_eq!(read_rows(&app, project_id).await.len(), 4);

    Ok(())
}

#[tokio::test]
async fn unknown_employee_leaves_previous_tree() -> Result<()> {
    let app = setup_test_app().await?;
    let project_id = app.create_project("Portal").await;
    write_rows(&app, project_id, &sample_rows()).await;
    let before = read_rows(&app, project_id).await;

    let rows = json!([{
        "epicId": "e", "epic": "Gamma", "featureId": "f", "feature": "Export",
        "name": "CSV", "employee_id": 4242
    }]);
    let response = app
        .server
        .put(&table_path(project_id))
        .json(&rows)
        .expect_failure()
        .await;
    assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);

    let after = read_rows(&app, project_id).await;
    assert_eq!(after, before);

    Ok(())
}

#[tokio::test]
async fn roles_and_employees_show_in_rows() -> Result<()> {
    let app = setup_test_app().await?;
    let project_id = app.create_project("Portal").await;

    let role = app
        .create(
            "/api/v1/roles",
            json!({ "name": "backend", "displayName": "Backend developer" }),
        )
        .await;
    let level = app
        .create(
            "/api/v1/seniority-levels",
            json!({ "name": "senior", "displayName": "Senior" }),
        )
        .await;
    let employee = app
        .create(
            "/api/v1/employees",
            json!({ "name": "Ivan", "seniorityLevelId": level["id"], "roleId": role["id"] }),
        )
        .await;

    let rows = json!([{
        "epicId": "e", "epic": "Alpha", "featureId": "f", "feature": "Login",
        "name": "Build API",
        "employee_id": employee["id"], "role_id": role["id"]
    }]);
    let outcome = write_rows(&app, project_id, &rows).await;
    assert_eq!(outcome["rows"][0]["priority"], "Backend developer");
    assert_eq!(outcome["rows"][0]["employee"], "Ivan");

    let flattened = read_rows(&app, project_id).await;
    assert_eq!(flattened[0].role_id, role["id"].as_i64().map(|id| id as i32));
    assert_eq!(flattened[0].employee.as_deref(), Some("Ivan"));

    // The employee is now referenced by a task.
    let response = app
        .server
        .delete(&format!("/api/v1/employees/{}", employee["id"]))
        .expect_failure()
        .await;
    assert_eq!(response.status_code(), StatusCode::CONFLICT);

    Ok(())
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_writes_to_different_projects_all_succeed() -> Result<()> {
    let app = setup_test_app().await?;
    let first = app.create_project("Portal").await as i32;
    let second = app.create_project("Billing").await as i32;

    let rows: Vec<TableRow> = serde_json::from_value(sample_rows())?;
    let service = TableItemsService::new(app.db.clone(), Arc::new(WriteLock::new()));

    let mut handles = Vec::new();
    for _ in 0..20 {
        for project_id in [first, second] {
            let service = service.clone();
            let rows = rows.clone();
            handles.push(tokio::spawn(async move {
                service.reconcile(project_id, rows).await
            }));
        }
    }

    for handle in handles {
        let outcome = handle.await??;
        assert_eq!(outcome.tasks_created, 4);
    }

    assert_eq!(read_rows(&app, first as i64).await.len(), 4);
    assert_eq!(read_rows(&app, second as i64).await.len(), 4);

    Ok(())
}

#[tokio::test]
async fn concurrent_http_writes_all_succeed() -> Result<()> {
    let app = setup_test_app().await?;
    let first = app.create_project("Portal").await;
    let second = app.create_project("Billing").await;
    let rows = sample_rows();

    let (a, b, c) = tokio::join!(
        app.server.put(&table_path(first)).json(&rows).into_future(),
        app.server.put(&table_path(second)).json(&rows).into_future(),
        app.server.put(&table_path(first)).json(&rows).into_future(),
    );
    a.assert_status_ok();
    b.assert_status_ok();
    c.assert_status_ok();

    assert_eq!(read_rows(&app, first).await.len(), 4);
    assert_eq!(read_rows(&app, second).await.len(), 4);

    Ok(())
}

#[tokio::test]
async fn malformed_rows_for_missing_project_are_bad_requests() -> Result<()> {
    let app = setup_test_app().await?;

    let response = app
        .server
        .put(&table_path(999_999))
        .json(&json!([{ "epicId": "", "epic": "Alpha", "featureId": "f", "feature": "Login", "name": "x" }]))
        .expect_failure()
        .await;
    assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);

    Ok(())
}
