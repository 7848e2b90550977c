use std::collections::HashMap;

use serde::Serialize;
use thiserror::Error;

pub const DEFAULT_HOST: &str = "localhost";
pub const DEFAULT_PORT: u16 = 3000;
pub const DEFAULT_DATABASE_URL: &str = "sqlite://estimator.db?mode=rwc";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("invalid port '{0}': expected an integer between 1 and 65535")]
    InvalidPort(String),
}

/// Process-wide settings, resolved once at startup and shared through the
/// server state.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub http_protocol: String,
    pub ws_protocol: String,
    pub database_url: String,
    pub cors_origin: Option<String>,
}

/// Client-facing subset of [`AppConfig`].
#[derive(Clone, Debug, Serialize, utoipa::ToSchema)]
pub struct PublicSettings {
    pub api_url: String,
    pub ws_url: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            http_protocol: "http".to_string(),
            ws_protocol: "ws".to_string(),
            database_url: DEFAULT_DATABASE_URL.to_string(),
            cors_origin: None,
        }
    }
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        let values: HashMap<String, String> = Self::tracked_keys()
            .iter()
            .filter_map(|key| std::env::var(key).ok().map(|value| (key.to_string(), value)))
            .collect();
        Self::from_map(&values)
    }

    pub fn from_map(values: &HashMap<String, String>) -> Result<Self, ConfigError> {
        fn read(values: &HashMap<String, String>, key: &str) -> Option<String> {
            values
                .get(key)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
        }

        let defaults = Self::default();
        let port = match read(values, "PORTAL_PORT") {
            Some(raw) => parse_port(&raw)?,
            None => defaults.port,
        };

        Ok(Self {
            host: read(values, "PORTAL_API_HOST").unwrap_or(defaults.host),
            port,
            http_protocol: read(values, "PORTAL_HTTP_PROTOCOL").unwrap_or(defaults.http_protocol),
            ws_protocol: read(values, "PORTAL_SOCKETS_PROTOCOL").unwrap_or(defaults.ws_protocol),
            database_url: read(values, "DATABASE_URL").unwrap_or(defaults.database_url),
            cors_origin: read(values, "PORTAL_CORS_ORIGIN"),
        })
    }

    fn tracked_keys() -> &'static [&'static str] {
        &[
            "PORTAL_API_HOST",
            "PORTAL_PORT",
            "PORTAL_HTTP_PROTOCOL",
            "PORTAL_SOCKETS_PROTOCOL",
            "DATABASE_URL",
            "PORTAL_CORS_ORIGIN",
        ]
    }

    /// Absolute URL for an API path, e.g. `api_url("/api/v1/projects")`.
    pub fn api_url(&self, path: &str) -> String {
        format!(
            "{}://{}:{}{}",
            self.http_protocol, self.host, self.port, path
        )
    }

    pub fn ws_url(&self) -> String {
        format!("{}://{}:{}", self.ws_protocol, self.host, self.port)
    }

    pub fn public_settings(&self) -> PublicSettings {
        PublicSettings {
            api_url: self.api_url("/api/v1"),
            ws_url: self.ws_url(),
        }
    }
}

pub fn parse_port(raw: &str) -> Result<u16, ConfigError> {
    match raw.trim().parse::<u16>() {
        Ok(port) if port > 0 => Ok(port),
        _ => Err(ConfigError::InvalidPort(raw.to_string())),
    }
}
