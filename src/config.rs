//! Configuration module

use std::env;
use std::path::PathBuf;

/// Application configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Database connection URL. An in-memory URL (`sqlite::memory:`)
    /// always gets a single connection, whatever `db_max_connections` says.
    pub database_url: String,

    /// Maximum pooled database connections
    pub db_max_connections: u32,

    /// Bind address
    pub host: String,

    /// Server port
    pub port: u16,

    /// Fitted preprocessing transform (JSON)
    pub transform_artifact: PathBuf,

    /// Fitted classifier (JSON)
    pub classifier_artifact: PathBuf,

    /// Environment (development, production)
    pub environment: String,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    fn from_lookup(var: impl Fn(&str) -> Option<String>) -> Self {
        Self {
            database_url: var("DATABASE_URL")
                .unwrap_or_else(|| "sqlite://devices.db?mode=rwc".to_string()),

            db_max_connections: var("DB_MAX_CONNECTIONS")
                .and_then(|n| n.parse().ok())
                .unwrap_or(5),

            host: var("HOST").unwrap_or_else(|| "0.0.0.0".to_string()),

            port: var("PORT")
                .and_then(|p| p.parse().ok())
                .unwrap_or(8000),

            transform_artifact: var("TRANSFORM_ARTIFACT")
                .unwrap_or_else(|| "pipeline.json".to_string())
                .into(),

            classifier_artifact: var("CLASSIFIER_ARTIFACT")
                .unwrap_or_else(|| "svm_model.json".to_string())
                .into(),

            environment: var("ENVIRONMENT")
                .unwrap_or_else(|| "development".to_string()),
        }
    }

    /// Check if running in production
    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }

    /// Database URL with any credentials stripped, for logging
    pub fn redacted_database_url(&self) -> &str {
        self.database_url
            .rsplit('@')
            .next()
            .unwrap_or("***")
    }
}
