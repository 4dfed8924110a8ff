use std::collections::HashMap;
use std::env;
use thiserror::Error;

/// Default bind address when `BIND_ADDRESS` is not set.
const DEFAULT_BIND_ADDRESS: &str = "0.0.0.0:8080";

/// Default database connection pool size.
const DEFAULT_MAX_DB_CONNECTIONS: u32 = 5;

#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub bind_address: String,
    pub max_db_connections: u32,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    MissingEnvVar(String),

    #[error("Invalid value for {name}: {reason}")]
    InvalidValue { name: String, reason: String },
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_vars(&env::vars().collect())
    }

    /// Load configuration from a HashMap (for testing)
    pub fn from_vars(vars: &HashMap<String, String>) -> Result<Self, ConfigError> {
        let database_url = vars
            .get("DATABASE_URL")
            .ok_or_else(|| ConfigError::MissingEnvVar("DATABASE_URL".to_string()))?
            .clone();

        let bind_address = vars
            .get("BIND_ADDRESS")
            .cloned()
            .unwrap_or_else(|| DEFAULT_BIND_ADDRESS.to_string());

        let max_db_connections = match vars.get("DATABASE_MAX_CONNECTIONS") {
            Some(raw) => raw
                .parse::<u32>()
                .map_err(|e| ConfigError::InvalidValue {
                    name: "DATABASE_MAX_CONNECTIONS".to_string(),
                    reason: e.to_string(),
                })?,
            None => DEFAULT_MAX_DB_CONNECTIONS,
        };

        if max_db_connections == 0 {
            return Err(ConfigError::InvalidValue {
                name: "DATABASE_MAX_CONNECTIONS".to_string(),
                reason: "must be at least 1".to_string(),
            });
        }

        Ok(Config {
            database_url,
            bind_address,
            max_db_connections,
        })
    }
}
