pub mod books;

use std::sync::Arc;

use bookstore_kernel::ModuleRegistry;
use sqlx::SqlitePool;

/// Register all service modules with the registry, backed by `pool`
pub fn register_all(registry: &mut ModuleRegistry, pool: &SqlitePool) -> anyhow::Result<()> {
    let store = Arc::new(books::SqliteBookStore::new(pool.clone()));
    registry.register(books::create_module(store))?;
    Ok(())
}
