//! Postgres connection pool factory and module migration runner.

use std::collections::HashSet;
use std::time::Duration;

use anyhow::Context;
use sqlx::{postgres::PgPoolOptions, PgPool};

use bookshelf_kernel::{settings::DatabaseSettings, Migration};

const MIGRATIONS_TABLE_SQL: &str = r#"
    CREATE TABLE IF NOT EXISTS schema_migrations (
        module     TEXT        NOT NULL,
        id         TEXT        NOT NULL,
        applied_at TIMESTAMPTZ NOT NULL DEFAULT now(),
        PRIMARY KEY (module, id)
    )
"#;

/// Open a connection pool using the configured limits.
pub async fn connect(settings: &DatabaseSettings) -> anyhow::Result<PgPool> {
    let pool = PgPoolOptions::new()
        .max_connections(settings.max_connections)
        .min_connections(settings.min_connections)
        .acquire_timeout(Duration::from_millis(settings.acquire_timeout_ms))
        .connect(&settings.url)
        .await
        .with_context(|| "failed to connect to database")?;

    tracing::info!(
        target: "bookshelf-db",
        max_connections = settings.max_connections,
        "database connected"
    );
    Ok(pool)
}

/// Apply every migration not yet recorded in `schema_migrations`.
///
/// `migrations` is expected in the order produced by
/// `ModuleRegistry::collect_migrations`. Each migration runs in its own
/// transaction together with its bookkeeping row. Returns how many were applied.
pub async fn run_migrations(
    pool: &PgPool,
    migrations: &[(String, Migration)],
) -> anyhow::Result<usize> {
    sqlx::raw_sql(MIGRATIONS_TABLE_SQL)
        .execute(pool)
        .await
        .with_context(|| "failed to create schema_migrations table")?;

    let applied: HashSet<(String, String)> =
        sqlx::query_as::<_, (String, String)>("SELECT module, id FROM schema_migrations")
            .fetch_all(pool)
            .await
            .with_context(|| "failed to read applied migrations")?
            .into_iter()
            .collect();

    let pending = pending_migrations(migrations, &applied);
    for (module, migration) in &pending {
        tracing::info!(target: "bookshelf-db", %module, migration = migration.id, "applying migration");

        let mut tx = pool.begin().await?;
        sqlx::raw_sql(migration.up)
            .execute(&mut *tx)
            .await
            .with_context(|| format!("migration {}/{} failed", module, migration.id))?;
        sqlx::query("INSERT INTO schema_migrations (module, id) VALUES ($1, $2)")
            .bind(module.as_str())
            .bind(migration.id)
            .execute(&mut *tx)
            .await?;
        tx.commit()
            .await
            .with_context(|| format!("failed to commit migration {}/{}", module, migration.id))?;
    }

    tracing::info!(target: "bookshelf-db", applied = pending.len(), "migrations up to date");
    Ok(pending.len())
}

fn pending_migrations<'a>(
    migrations: &'a [(String, Migration)],
    applied: &HashSet<(String, String)>,
) -> Vec<&'a (String, Migration)> {
    migrations
        .iter()
        .filter(|(module, migration)| {
            !applied.contains(&(module.clone(), migration.id.to_string()))
        })
        .collect()
}
