//! Configuration loaded from environment variables.

use std::env;
use std::time::Duration;

use anyhow::{Context, Result};

use crate::grid::DEFAULT_LIMIT;

/// Application configuration.
#[derive(Debug, Clone)]
pub struct Config {
    /// Database connection URL (`postgres://...` or `sqlite:...`).
    pub database_url: String,

    /// Maximum database connections in pool (default: 10).
    pub database_max_connections: u32,

    /// Page size for grids when the request names none (default: 30).
    pub grid_default_limit: u64,

    /// Per-statement timeout for PostgreSQL queries (default: 10000 ms).
    pub statement_timeout: Duration,
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self> {
        let database_url =
            env::var("DATABASE_URL").context("DATABASE_URL environment variable is required")?;

        let database_max_connections = env::var("DATABASE_MAX_CONNECTIONS")
            .unwrap_or_else(|_| "10".to_string())
            .parse()
            .context("DATABASE_MAX_CONNECTIONS must be a valid u32")?;

        let grid_default_limit: u64 = env::var("GRID_DEFAULT_LIMIT")
            .unwrap_or_else(|_| DEFAULT_LIMIT.to_string())
            .parse()
            .context("GRID_DEFAULT_LIMIT must be a valid u64")?;
        if grid_default_limit == 0 {
            anyhow::bail!("GRID_DEFAULT_LIMIT must be at least 1");
        }

        let statement_timeout_ms: u64 = env::var("STATEMENT_TIMEOUT_MS")
            .unwrap_or_else(|_| "10000".to_string())
            .parse()
            .context("STATEMENT_TIMEOUT_MS must be a valid u64")?;

        Ok(Self {
            database_url,
            database_max_connections,
            grid_default_limit,
            statement_timeout: Duration::from_millis(statement_timeout_ms),
        })
    }
}
