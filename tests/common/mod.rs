#![allow(dead_code)]

use anyhow::Result;
use axum_test::TestServer;
use estimator::config::AppConfig;
use estimator::database::connection::{establish_connection, setup_database};
use estimator::server::app::create_app;
use sea_orm::DatabaseConnection;
use serde_json::{json, Value};
use tempfile::NamedTempFile;

/// Test server backed by its own SQLite file. The file lives as long as the
/// struct does.
pub struct TestApp {
    pub server: TestServer,
    pub db: DatabaseConnection,
    _db_file: NamedTempFile,
}

pub async fn setup_test_app() -> Result<TestApp> {
    let db_file = NamedTempFile::new()?;
    let db_url = format!("sqlite://{}?mode=rwc", db_file.path().display());

    let db = establish_connection(&db_url).await?;
    setup_database(&db).await?;

    let config = AppConfig {
        database_url: db_url,
        cors_origin: Some("http://localhost:5173".to_string()),
        ..AppConfig::default()
    };
    let app = create_app(db.clone(), config).await?;
    let server = TestServer::new(app)?;

    Ok(TestApp {
        server,
        db,
        _db_file: db_file,
    })
}

impl TestApp {
    /// POST a body and return the `data` of the success envelope.
    pub async fn create(&self, path: &str, body: Value) -> Value {
        let response = self.server.post(path).json(&body).await;
        response.assert_status_ok();
        let envelope: Value = response.json();
        assert_eq!(envelope["success"], true);
        envelope["data"].clone()
    }

    pub async fn create_project(&self, title: &str) -> i64 {
        let model = self
            .create("/api/v1/evaluation-models", json!({ "title": "Three-point" }))
            .await;
        let project = self
            .create(
                "/api/v1/projects",
                json!({ "title": title, "evaluationModelId": model["id"] }),
            )
            .await;
        project["id"].as_i64().expect("project id")
    }
}
