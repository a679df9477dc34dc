//! Postgres pool, embedded migrations and the pgvector check.

use anyhow::{bail, Context, Result};
use sliderblend_core::Config;
use sqlx::migrate::Migrator;
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use std::time::Duration;

static MIGRATOR: Migrator = sqlx::migrate!("../../migrations");

const POOL_IDLE_TIMEOUT: Duration = Duration::from_secs(600);
const POOL_MAX_LIFETIME: Duration = Duration::from_secs(1800);

pub async fn setup_database(config: &Config) -> Result<PgPool> {
    let max_connections = config.db_max_connections();
    let acquire_timeout = Duration::from_secs(config.db_timeout_seconds());

    let pool = PgPoolOptions::new()
        .max_connections(max_connections)
        .acquire_timeout(acquire_timeout)
        .idle_timeout(POOL_IDLE_TIMEOUT)
        .max_lifetime(POOL_MAX_LIFETIME)
        .connect(config.database_url())
        .await
        .context("Failed to connect to database")?;

    tracing::info!(
        max_connections,
        acquire_timeout_secs = acquire_timeout.as_secs(),
        "Database pool ready"
    );

    MIGRATOR
        .run(&pool)
        .await
        .context("Failed to run database migrations")?;
    tracing::info!(
        migrations = MIGRATOR.iter().count(),
        "Database schema up to date"
    );

    ensure_vector_extension(&pool, config.embedding_dimension()).await?;

    Ok(pool)
}

/// Embedding rows are `vector(N)` columns; fail at start-up rather than on the first job.
async fn ensure_vector_extension(pool: &PgPool, dimension: usize) -> Result<()> {
    let version: Option<String> =
        sqlx::query_scalar("SELECT extversion FROM pg_extension WHERE extname = 'vector'")
            .fetch_optional(pool)
            .await
            .context("Failed to query installed extensions")?;

    match version {
        Some(version) => {
            tracing::info!(pgvector = %version, dimension, "pgvector available");
            Ok(())
        }
        None => bail!("pgvector extension is not installed in the target database"),
    }
}
