//! SQLite connection factory and schema bootstrap for the bookstore service.

use std::str::FromStr;

use anyhow::Context;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};

use bookstore_kernel::{settings::DatabaseSettings, Migration};

/// Open a connection pool for the configured database, creating the file if needed.
///
/// Each connection to `sqlite::memory:` opens its own private database, so an
/// in-memory url is pinned to one connection that is never recycled.
pub async fn connect(settings: &DatabaseSettings) -> anyhow::Result<SqlitePool> {
    let options = SqliteConnectOptions::from_str(&settings.url)
        .with_context(|| format!("invalid database url '{}'", settings.url))?
        .create_if_missing(true)
        .foreign_keys(true);

    let pool_options = if settings.is_in_memory() {
        tracing::debug!(target: "bookstore-db", "in-memory database, using a single connection");
        SqlitePoolOptions::new()
            .max_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
    } else {
        SqlitePoolOptions::new().max_connections(settings.max_connections)
    };

    let pool = pool_options
        .connect_with(options)
        .await
        .with_context(|| format!("failed to connect to '{}'", settings.url))?;

    tracing::info!(target: "bookstore-db", url = %settings.url, "database pool ready");

    Ok(pool)
}

/// Apply module-contributed schema statements in the given order.
///
/// Statements are expected to be idempotent; all of them run inside one
/// transaction so a failing statement leaves the schema untouched.
pub async fn apply_schema(
    pool: &SqlitePool,
    migrations: &[(String, Migration)],
) -> anyhow::Result<()> {
    let mut tx = pool
        .begin()
        .await
        .context("failed to open schema transaction")?;

    for (module, migration) in migrations {
        tracing::info!(
            target: "bookstore-db",
            module = %module,
            migration = migration.id,
            "applying schema statement"
        );

        sqlx::raw_sql(migration.up)
            .execute(&mut *tx)
            .await
            .with_context(|| {
                format!(
                    "failed to apply schema statement '{}' for module '{}'",
                    migration.id, module
                )
            })?;
    }

    tx.commit().await.context("failed to commit schema")?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use sqlx::Row;

    fn memory_settings() -> DatabaseSettings {
        DatabaseSettings {
            url: "sqlite::memory:".to_string(),
            max_connections: 5,
        }
    }

    fn table_migration() -> (String, Migration) {
        (
            "test".to_string(),
            Migration {
                id: "001_init",
                up: "CREATE TABLE IF NOT EXISTS widgets (id INTEGER PRIMARY KEY, name TEXT NOT NULL);",
            },
        )
    }

    #[tokio::test]
    async fn schema_is_applied_and_idempotent() {
        let pool = connect(&memory_settings()).await.unwrap();
        let migrations = vec![table_migration()];

        apply_schema(&pool, &migrations).await.unwrap();
        apply_schema(&pool, &migrations).await.unwrap();

        sqlx::query("INSERT INTO widgets (name) VALUES ('gear')")
            .execute(&pool)
            .await
            .unwrap();

        let row = sqlx::query("SELECT COUNT(*) AS n FROM widgets")
            .fetch_one(&pool)
            .await
            .unwrap();
        assert_eq!(row.get::<i64, _>("n"), 1);
    }

    #[tokio::test]
    async fn failing_statement_rolls_back_the_batch() {
        let pool = connect(&memory_settings()).await.unwrap();
        let migrations = vec![
            table_migration(),
            (
                "test".to_string(),
                Migration {
                    id: "002_broken",
                    up: "CREATE TABLE oops (",
                },
            ),
        ];

        assert!(apply_schema(&pool, &migrations).await.is_err());

        let tables = sqlx::query("SELECT name FROM sqlite_master WHERE name = 'widgets'")
            .fetch_all(&pool)
            .await
            .unwrap();
        assert!(tables.is_empty());
    }
}
