//! HTTP API configuration.
//!
//! Configuration is loaded from environment variables with fallback to
//! defaults. `main` loads a local `.env` first (dotenvy), so the same keys
//! can live in that file during development.
//!
//! | Variable               | Default                     |
//! |------------------------|-----------------------------|
//! | `HTTP_PORT`            | `8080`                      |
//! | `DATABASE_PATH`        | `./data/boutique.db`        |
//! | `DB_MAX_CONNECTIONS`   | `5`                         |
//! | `JWT_SECRET`           | development secret          |
//! | `JWT_LIFETIME_SECS`    | `86400`                     |
//! | `CORS_ALLOWED_ORIGINS` | `*` (comma separated list)  |
//! | `NOTIFY_FROM_ADDRESS`  | `commandes@boutique.local`  |

use serde::{Deserialize, Serialize};
use std::env;
use std::path::PathBuf;
use std::str::FromStr;

const DEV_JWT_SECRET: &str = "boutique-dev-secret-change-in-production";

/// API configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// HTTP listen port
    pub http_port: u16,

    /// SQLite database file
    pub database_path: PathBuf,

    /// Pool size
    pub db_max_connections: u32,

    /// HS256 secret shared with the login service
    pub jwt_secret: String,

    /// Lifetime of tokens minted by `JwtManager::generate_token`
    pub jwt_lifetime_secs: i64,

    /// Allowed CORS origins; `["*"]` allows any
    pub cors_allowed_origins: Vec<String>,

    /// Sender address on order confirmations
    pub notify_from_address: String,
}

impl AppConfig {
    /// Load configuration from environment variables.
    pub fn load() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the configuration from any key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let config = AppConfig {
            http_port: parse_or(&lookup, "HTTP_PORT", 8080)?,

            database_path: lookup("DATABASE_PATH")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from("./data/boutique.db")),

            db_max_connections: parse_or(&lookup, "DB_MAX_CONNECTIONS", 5)?,

            // In production this MUST be set
            jwt_secret: lookup("JWT_SECRET").unwrap_or_else(|| DEV_JWT_SECRET.to_string()),

            jwt_lifetime_secs: parse_or(&lookup, "JWT_LIFETIME_SECS", 86_400)?,

            cors_allowed_origins: lookup("CORS_ALLOWED_ORIGINS")
                .map(|raw| {
                    raw.split(',')
                        .map(|origin| origin.trim().to_string())
                        .filter(|origin| !origin.is_empty())
                        .collect()
                })
                .unwrap_or_else(|| vec!["*".to_string()]),

            notify_from_address: lookup("NOTIFY_FROM_ADDRESS")
                .unwrap_or_else(|| "commandes@boutique.local".to_string()),
        };

        if config.jwt_secret.is_empty() {
            return Err(ConfigError::MissingRequired("JWT_SECRET".to_string()));
        }
        if config.db_max_connections == 0 {
            return Err(ConfigError::InvalidValue("DB_MAX_CONNECTIONS".to_string()));
        }
        if config.jwt_lifetime_secs <= 0 {
            return Err(ConfigError::InvalidValue("JWT_LIFETIME_SECS".to_string()));
        }

        Ok(config)
    }

    /// True when the development secret is still in use.
    pub fn uses_dev_secret(&self) -> bool {
        self.jwt_secret == DEV_JWT_SECRET
    }

    pub fn allows_any_origin(&self) -> bool {
        self.cors_allowed_origins.is_empty() || self.cors_allowed_origins.iter().any(|o| o == "*")
    }
}

fn parse_or<F, T>(lookup: &F, key: &str, default: T) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
{
    match lookup(key) {
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|_| ConfigError::InvalidValue(key.to_string())),
        None => Ok(default),
    }
}

/// Configuration error types.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid value for {0}")]
    InvalidValue(String),

    #[error("Missing required configuration: {0}")]
    MissingRequired(String),
}
