pub mod app;
pub mod error;
pub mod handlers;

use anyhow::Result;
use clap::Subcommand;
use sea_orm_migration::prelude::*;
use tracing::info;

use crate::config::AppConfig;
use crate::database::{connection::*, migrations::Migrator, seed_data::seed_reference_data};

#[derive(Subcommand, Debug)]
pub enum MigrateDirection {
    Up,
    Down,
    Fresh,
}

pub async fn start_server(config: AppConfig) -> Result<()> {
    let db = establish_connection(&config.database_url).await?;
    setup_database(&db).await?;

    let bind_addr = format!("0.0.0.0:{}", config.port);
    let public_url = config.api_url("");
    let app = app::create_app(db, config).await?;

    log_routes(&public_url);

    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;
    info!("Server running on http://{}", bind_addr);

    axum::serve(listener, app).await?;

    Ok(())
}

fn log_routes(public_url: &str) {
    info!("API Endpoints ({}):", public_url);
    info!("  /health                            - Health check");
    info!("  /docs                              - Swagger UI documentation");
    info!("  /api/v1/settings                   - Client settings");
    info!("  /api/v1/projects/:id/table-items   - Flat task table (GET, PUT)");
    info!("  /api/v1/*                          - Projects, work items, staff, assignments");
}

pub async fn migrate_database(database_url: &str, direction: MigrateDirection) -> Result<()> {
    let db = establish_connection(database_url).await?;

    match direction {
        MigrateDirection::Up => {
            info!("Running migrations up");
            Migrator::up(&db, None).await?;
        }
        MigrateDirection::Down => {
            info!("Running migrations down");
            Migrator::down(&db, None).await?;
        }
        MigrateDirection::Fresh => {
            info!("Running fresh migrations (down then up)");
            Migrator::down(&db, None).await?;
            Migrator::up(&db, None).await?;
        }
    }

    info!("Database migration completed");
    Ok(())
}

pub async fn seed_database(database_url: &str) -> Result<()> {
    let db = establish_connection(database_url).await?;
    setup_database(&db).await?;
    seed_reference_data(&db).await?;
    Ok(())
}
