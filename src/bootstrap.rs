//! Application bootstrap: database, module lifecycle, HTTP server.

use anyhow::Context;
use sqlx::SqlitePool;

use bookstore_kernel::{settings::Settings, InitCtx, ModuleRegistry};

use crate::modules;

/// Connect to the database, register modules and apply their schema.
pub async fn prepare(settings: &Settings) -> anyhow::Result<(SqlitePool, ModuleRegistry)> {
    let pool = bookstore_db::connect(&settings.database)
        .await
        .context("failed to open database")?;

    let mut registry = ModuleRegistry::new();
    modules::register_all(&mut registry, &pool).context("failed to register modules")?;

    bookstore_db::apply_schema(&pool, &registry.collect_migrations())
        .await
        .context("failed to apply database schema")?;

    Ok((pool, registry))
}

/// Create the tables every module needs, then exit.
pub async fn init_database(settings: &Settings) -> anyhow::Result<()> {
    let (pool, registry) = prepare(settings).await?;

    tracing::info!(
        modules = registry.module_count(),
        url = %settings.database.url,
        "database schema is up to date"
    );

    pool.close().await;
    Ok(())
}

/// Run the full service until a shutdown signal arrives.
pub async fn serve(settings: &Settings) -> anyhow::Result<()> {
    let (pool, registry) = prepare(settings).await?;
    let ctx = InitCtx { settings };

    registry.init_modules(&ctx).await?;
    registry.start_modules(&ctx).await?;

    let served = bookstore_http::start_server(&registry, settings).await;

    // Modules are stopped even when the server failed
    let stopped = registry.stop_modules().await;
    pool.close().await;

    served?;
    stopped?;

    tracing::info!("bookstore shutdown complete");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use bookstore_kernel::settings::DatabaseSettings;

    fn memory_settings() -> Settings {
        Settings {
            database: DatabaseSettings {
                url: "sqlite::memory:".to_string(),
                max_connections: 1,
            },
            ..Settings::default()
        }
    }

    #[tokio::test]
    async fn prepare_registers_books_and_creates_table() {
        let (pool, registry) = prepare(&memory_settings()).await.unwrap();

        assert!(registry.get_module("books").is_some());

        let tables: Vec<(String,)> =
            sqlx::query_as("SELECT name FROM sqlite_master WHERE type = 'table' AND name = 'books'")
                .fetch_all(&pool)
                .await
                .unwrap();
        assert_eq!(tables.len(), 1);
    }

    #[tokio::test]
    async fn init_database_succeeds_on_fresh_database() {
        init_database(&memory_settings()).await.unwrap();
    }
}
