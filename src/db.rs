//! Database module - SQLite connection and schema

use std::str::FromStr;
use std::time::Duration;

use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::SqlitePool;

use crate::models::layout::{FeatureKind, FEATURE_LAYOUT};

/// How long a writer waits on SQLite's database lock before failing
const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

/// In-memory databases live and die with a single connection
fn is_in_memory(database_url: &str) -> bool {
    database_url.contains(":memory:") || database_url.contains("mode=memory")
}

/// Create database connection pool, creating the database file if needed.
///
/// SQLite serialises writers with a database-level lock; concurrent inserts
/// queue on it for up to `BUSY_TIMEOUT`. In-memory URLs are pinned to one
/// connection so every request sees the same database.
pub async fn create_pool(database_url: &str, max_connections: u32) -> Result<SqlitePool, sqlx::Error> {
    let options = SqliteConnectOptions::from_str(database_url)?
        .create_if_missing(true)
        .busy_timeout(BUSY_TIMEOUT);

    let max_connections = if is_in_memory(database_url) && max_connections > 1 {
        tracing::warn!(
            "In-memory database requested with {} connections, using 1",
            max_connections
        );
        1
    } else {
        max_connections
    };

    SqlitePoolOptions::new()
        .max_connections(max_connections)
        .connect_with(options)
        .await
}

/// Ensure the devices table exists. Safe to run on every start.
pub async fn run_migrations(pool: &SqlitePool) -> Result<(), sqlx::Error> {
    sqlx::query(&schema_sql())
        .execute(pool)
        .await?;

    tracing::info!("Database schema applied successfully");
    Ok(())
}

/// `devices` table generated from the feature layout
fn schema_sql() -> String {
    let mut columns = vec!["    id INTEGER PRIMARY KEY AUTOINCREMENT".to_string()];

    for spec in &FEATURE_LAYOUT {
        let check = match spec.kind {
            FeatureKind::Bool => format!(" CHECK ({} IN (0, 1))", spec.name),
            FeatureKind::Int | FeatureKind::Float => String::new(),
        };
        columns.push(format!("    {} {} NOT NULL{}", spec.name, spec.kind.sql_type(), check));
    }

    format!("CREATE TABLE IF NOT EXISTS devices (\n{}\n)", columns.join(",\n"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_schema_has_every_feature_column() {
        let sql = schema_sql();
        assert!(sql.contains("id INTEGER PRIMARY KEY AUTOINCREMENT"));
        assert!(sql.contains("clock_speed REAL NOT NULL"));
        assert!(sql.contains("ram_mb INTEGER NOT NULL"));
        assert!(sql.contains("wifi INTEGER NOT NULL CHECK (wifi IN (0, 1))"));
        assert_eq!(sql.matches("NOT NULL").count(), FEATURE_LAYOUT.len());
    }

    #[tokio::test]
    async fn test_migrations_are_idempotent() {
        let pool = create_pool("sqlite::memory:", 1).await.unwrap();
        run_migrations(&pool).await.unwrap();
        run_migrations(&pool).await.unwrap();

        let columns: Vec<String> = sqlx::query_scalar("SELECT name FROM pragma_table_info('devices')")
            .fetch_all(&pool)
            .await
            .unwrap();
        assert_eq!(columns.len(), FEATURE_LAYOUT.len() + 1);
        assert_eq!(columns[0], "id");
        assert_eq!(columns[14], "ram_mb");
    }

    #[tokio::test]
    async fn test_in_memory_pool_pinned_to_one_connection() {
        let pool = create_pool("sqlite::memory:", 4).await.unwrap();
        assert_eq!(pool.options().get_max_connections(), 1);

        run_migrations(&pool).await.unwrap();
        let tables: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM sqlite_master WHERE type = 'table' AND name = 'devices'",
        )
        .fetch_one(&pool)
        .await
        .unwrap();
        assert_eq!(tables, 1);
    }

    #[test]
    fn test_in_memory_detection() {
        assert!(is_in_memory("sqlite::memory:"));
        assert!(is_in_memory("sqlite://file:devices?mode=memory&cache=shared"));
        assert!(!is_in_memory("sqlite://devices.db?mode=rwc"));
    }

    #[tokio::test]
    async fn test_file_database_created_if_missing() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("devices.db");
        let url = format!("sqlite://{}", path.display());

        let pool = create_pool(&url, 2).await.unwrap();
        run_migrations(&pool).await.unwrap();
        assert!(path.exists());
    }
}
