use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing::info;
use tracing::Level;
use tracing_subscriber::EnvFilter;

use estimator::config::AppConfig;
use estimator::database::connection::get_database_url;
use estimator::server;

#[derive(Parser)]
#[clap(author, version, about)]
struct Cli {
    #[clap(short, long, global = true)]
    log_level: Option<String>,
    #[clap(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the HTTP API
    Serve {
        /// Overrides PORTAL_PORT
        #[clap(short, long)]
        port: Option<u16>,
        /// Overrides PORTAL_API_HOST
        #[clap(long)]
        host: Option<String>,
        /// SQLite file or URL, overrides DATABASE_URL
        #[clap(short, long)]
        database: Option<String>,
        #[clap(long)]
        cors_origin: Option<String>,
    },
    Db {
        #[clap(subcommand)]
        command: DbCommands,
    },
}

#[derive(Subcommand, Debug)]
enum DbCommands {
    Init {
        #[clap(short, long)]
        database: Option<String>,
    },
    Migrate {
        #[clap(subcommand)]
        direction: server::MigrateDirection,
        #[clap(short, long)]
        database: Option<String>,
    },
    /// Insert default evaluation model, roles and seniority levels
    Seed {
        #[clap(short, long)]
        database: Option<String>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Cli::parse();
    setup_logging(&args.log_level);

    let mut config = AppConfig::from_env()?;

    match args.command {
        Commands::Serve {
            port,
            host,
            database,
            cors_origin,
        } => {
            if let Some(port) = port {
                config.port = port;
            }
            if let Some(host) = host {
                config.host = host;
            }
            if let Some(database) = database {
                config.database_url = get_database_url(Some(&database));
            }
            if cors_origin.is_some() {
                config.cors_origin = cors_origin;
            }
            info!("Starting server on port {}", config.port);
            server::start_server(config).await?;
        }
        Commands::Db { command } => match command {
            DbCommands::Init { database } => {
                let url = resolve_database(&config, database);
                info!("Initializing database: {}", url);
                server::migrate_database(&url, server::MigrateDirection::Up).await?;
            }
            DbCommands::Migrate {
                direction,
                database,
            } => {
                let url = resolve_database(&config, database);
                info!("Running database migration: {:?}", direction);
                server::migrate_database(&url, direction).await?;
            }
            DbCommands::Seed { database } => {
                let url = resolve_database(&config, database);
                info!("Seeding reference data: {}", url);
                server::seed_database(&url).await?;
            }
        },
    }

    Ok(())
}

fn resolve_database(config: &AppConfig, database: Option<String>) -> String {
    database
        .map(|path| get_database_url(Some(&path)))
        .unwrap_or_else(|| config.database_url.clone())
}

fn setup_logging(log_level: &Option<String>) {
    let log_level = match log_level
        .as_deref()
        .unwrap_or("info")
        .to_lowercase()
        .as_str()
    {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(log_filter(log_level)))
        .without_time()
        .init();
}

/// sqlx statement logs are only wanted once the level reaches debug.
fn log_filter(level: Level) -> String {
    if level >= Level::DEBUG {
        level.to_string()
    } else {
        format!("sqlx=warn,{}", level)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sqlx_follows_debug_and_trace() {
        assert_eq!(log_filter(Level::DEBUG), "DEBUG");
        assert_eq!(log_filter(Level::TRACE), "TRACE");
        assert_eq!(log_filter(Level::INFO), "sqlx=warn,INFO");
        assert_eq!(log_filter(Level::ERROR), "sqlx=warn,ERROR");
    }
}
