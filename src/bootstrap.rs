//! Process lifecycle: open storage, register modules with their injected
//! collaborators, migrate, serve, then shut everything down in reverse.

use std::sync::Arc;

use anyhow::Context;
use sqlx::PgPool;

use bookshelf_kernel::{
    settings::{DatabaseSettings, Settings, StorageBackend},
    InitCtx, ModuleRegistry,
};

use crate::modules::{
    self,
    books::{BookStore, MemoryBookStore, PgBookStore},
};

/// Storage handle owned by the process for its whole lifetime
pub enum Storage {
    Postgres(PgPool),
    Memory(Arc<MemoryBookStore>),
}

impl Storage {
    /// Connect to the configured backend
    pub async fn open(settings: &DatabaseSettings) -> anyhow::Result<Self> {
        match settings.backend {
            StorageBackend::Postgres => Ok(Storage::Postgres(bookshelf_db::connect(settings).await?)),
            StorageBackend::Memory => {
                tracing::warn!("using in-memory book store; data is lost on exit");
                Ok(Storage::Memory(Arc::new(MemoryBookStore::new())))
            }
        }
    }

    pub fn book_store(&self) -> Arc<dyn BookStore> {
        match self {
            Storage::Postgres(pool) => Arc::new(PgBookStore::new(pool.clone())),
            Storage::Memory(store) => store.clone(),
        }
    }

    /// Apply pending module migrations; a no-op for the in-memory backend
    pub async fn migrate(&self, registry: &ModuleRegistry) -> anyhow::Result<usize> {
        match self {
            Storage::Postgres(pool) => {
                bookshelf_db::run_migrations(pool, &registry.collect_migrations()).await
            }
            Storage::Memory(_) => Ok(0),
        }
    }

    pub async fn close(self) {
        if let Storage::Postgres(pool) = self {
            pool.close().await;
            tracing::info!("database pool closed");
        }
    }
}

/// Registry with every module wired to `storage`
pub fn build_registry(storage: &Storage) -> ModuleRegistry {
    let mut registry = ModuleRegistry::new();
    modules::register_all(&mut registry, storage.book_store());
    registry
}

/// Run the service until a shutdown signal arrives
pub async fn serve(settings: Settings) -> anyhow::Result<()> {
    let storage = Storage::open(&settings.database)
        .await
        .context("failed to open storage")?;
    let registry = build_registry(&storage);
    let ctx = InitCtx {
        settings: &settings,
    };

    registry.init_all(&ctx).await?;
    storage.migrate(&registry).await.context("failed to migrate database")?;
    registry.start_all(&ctx).await?;

    let served = bookshelf_http::start_server(&registry, &settings).await;

    let stopped = registry.stop_all().await;
    storage.close().await;

    served?;
    stopped?;
    tracing::info!("bookshelf shutdown complete");
    Ok(())
}

/// Apply pending migrations and exit
pub async fn migrate(settings: &Settings) -> anyhow::Result<usize> {
    let storage = Storage::open(&settings.database)
        .await
        .context("failed to open storage")?;
    let registry = build_registry(&storage);

    let applied = storage.migrate(&registry).await;
    storage.close().await;
    applied
}
