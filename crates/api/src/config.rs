use std::time::Duration;

use larkflow_client::api::DEFAULT_BASE_URL;
use larkflow_client::LarkClientConfig;

/// Errors raised while reading configuration from the environment.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),

    #[error("{key} has an invalid value: {value:?}")]
    Invalid { key: &'static str, value: String },
}

/// Server configuration loaded from environment variables.
///
/// Everything except the database URL and the Lark credentials has a
/// default suitable for local development.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Bind address (default: `0.0.0.0`).
    pub host: String,
    /// Bind port (default: `3000`).
    pub port: u16,
    /// Allowed CORS origins, parsed from comma-separated `CORS_ORIGINS` env var.
    pub cors_origins: Vec<String>,
    /// HTTP request timeout in seconds (default: `30`).
    pub request_timeout_secs: u64,
    /// PostgreSQL connection string (required).
    pub database_url: String,
    /// Database pool size (default: `10`).
    pub db_max_connections: u32,
    pub lark: LarkConfig,
}

/// Credentials and endpoint for the Lark open platform.
///
/// | Env Var                  | Default                      |
/// |--------------------------|------------------------------|
/// | `LARK_BASE_URL`          | `https://open.larksuite.com` |
/// | `LARK_APP_ID`            | required                     |
/// | `LARK_APP_SECRET`        | required                     |
/// | `LARK_HTTP_TIMEOUT_SECS` | `10`                         |
#[derive(Debug, Clone)]
pub struct LarkConfig {
    pub base_url: String,
    pub app_id: String,
    pub app_secret: String,
    pub http_timeout_secs: u64,
}

impl ServerConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                | Default                    |
    /// |------------------------|----------------------------|
    /// | `HOST`                 | `0.0.0.0`                  |
    /// | `PORT`                 | `3000`                     |
    /// | `CORS_ORIGINS`         | `http://localhost:5173`    |
    /// | `REQUEST_TIMEOUT_SECS` | `30`                       |
    /// | `DATABASE_URL`         | required                   |
    /// | `DB_MAX_CONNECTIONS`   | `10`                       |
    ///
    /// Lark settings are documented on [`LarkConfig`].
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration through an arbitrary key lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let host = lookup("HOST").unwrap_or_else(|| "0.0.0.0".into());
        let port = parse_or(&lookup, "PORT", 3000)?;

        let cors_origins: Vec<String> = lookup("CORS_ORIGINS")
            .unwrap_or_else(|| "http://localhost:5173".into())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        let request_timeout_secs = parse_or(&lookup, "REQUEST_TIMEOUT_SECS", 30)?;
        let database_url = required(&lookup, "DATABASE_URL")?;
        let db_max_connections = parse_or(&lookup, "DB_MAX_CONNECTIONS", 10)?;
        let lark = LarkConfig::from_lookup(&lookup)?;

        Ok(Self {
            host,
            port,
            cors_origins,
            request_timeout_secs,
            database_url,
            db_max_connections,
            lark,
        })
    }
}

impl LarkConfig {
    fn from_lookup(lookup: &impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let base_url = lookup("LARK_BASE_URL")
            .unwrap_or_else(|| DEFAULT_BASE_URL.into())
            .trim_end_matches('/')
            .to_string();

        Ok(Self {
            base_url,
            app_id: required(lookup, "LARK_APP_ID")?,
            app_secret: required(lookup, "LARK_APP_SECRET")?,
            http_timeout_secs: parse_or(lookup, "LARK_HTTP_TIMEOUT_SECS", 10)?,
        })
    }

    pub fn client_config(&self) -> LarkClientConfig {
        LarkClientConfig {
            base_url: self.base_url.clone(),
            app_id: self.app_id.clone(),
            app_secret: self.app_secret.clone(),
            timeout: Duration::from_secs(self.http_timeout_secs),
        }
    }
}

fn required(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &'static str,
) -> Result<String, ConfigError> {
    lookup(key)
        .filter(|v| !v.trim().is_empty())
        .ok_or(ConfigError::Missing(key))
}

fn parse_or<T: std::str::FromStr>(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &'static str,
    default: T,
) -> Result<T, ConfigError> {
    match lookup(key) {
        None => Ok(default),
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|_| ConfigError::Invalid { key, value: raw }),
    }
}
