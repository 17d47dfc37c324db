//! Database connection pool management.

use std::sync::Arc;

use anyhow::{Context, Result};
use sqlx::postgres::{PgPool, PgPoolOptions};
use sqlx::sqlite::{SqlitePool, SqlitePoolOptions};

use crate::backend::{PgBackend, QueryBackend, SqliteBackend};
use crate::config::Config;

/// A connection pool for one of the supported databases.
#[derive(Clone)]
pub enum Database {
    Postgres(PgPool),
    Sqlite(SqlitePool),
}

impl Database {
    /// Query backend over this pool.
    pub fn backend(&self, config: &Config) -> Arc<dyn QueryBackend> {
        match self {
            Database::Postgres(pool) => Arc::new(
                PgBackend::new(pool.clone()).with_statement_timeout(config.statement_timeout),
            ),
            Database::Sqlite(pool) => Arc::new(SqliteBackend::new(pool.clone())),
        }
    }
}

/// Create a connection pool, picking the driver from the URL scheme.
pub async fn create_pool(config: &Config) -> Result<Database> {
    if config.database_url.starts_with("sqlite:") {
        let pool = SqlitePoolOptions::new()
            .max_connections(config.database_max_connections)
            .connect(&config.database_url)
            .await
            .context("failed to connect to SQLite")?;
        return Ok(Database::Sqlite(pool));
    }

    let pool = PgPoolOptions::new()
        .max_connections(config.database_max_connections)
        .connect(&config.database_url)
        .await
        .context("failed to connect to PostgreSQL")?;

    Ok(Database::Postgres(pool))
}

/// Check if the database connection is healthy.
pub async fn check_health(db: &Database) -> bool {
    match db {
        Database::Postgres(pool) => sqlx::query("SELECT 1").execute(pool).await.is_ok(),
        Database::Sqlite(pool) => sqlx::query("SELECT 1").execute(pool).await.is_ok(),
    }
}
