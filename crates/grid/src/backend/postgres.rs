//! PostgreSQL backend.
//!
//! Every call runs in its own transaction so `SET LOCAL statement_timeout`
//! applies to it alone and resets on commit. Rows come back as JSON through
//! `row_to_json`.

use std::time::Duration;

use async_trait::async_trait;
use sea_query::PostgresQueryBuilder;
use sea_query_binder::SqlxBinder;
use sqlx::{PgPool, Postgres, Transaction};

use crate::error::Result;
use crate::query::QuerySpec;

use super::{FetchedPage, QueryBackend};

/// Default per-statement timeout.
pub const DEFAULT_STATEMENT_TIMEOUT: Duration = Duration::from_secs(10);

/// Runs query specs against a PostgreSQL pool.
#[derive(Clone)]
pub struct PgBackend {
    pool: PgPool,
    statement_timeout: Duration,
}

impl PgBackend {
    pub fn new(pool: PgPool) -> Self {
        Self {
            pool,
            statement_timeout: DEFAULT_STATEMENT_TIMEOUT,
        }
    }

    #[must_use]
    pub fn with_statement_timeout(mut self, timeout: Duration) -> Self {
        self.statement_timeout = timeout;
        self
    }

    /// Open a read-only snapshot transaction with the statement timeout set.
    async fn begin_snapshot(&self) -> Result<Transaction<'static, Postgres>> {
        let mut tx = self.pool.begin().await?;

        sqlx::query("SET TRANSACTION ISOLATION LEVEL REPEATABLE READ, READ ONLY")
            .execute(&mut *tx)
            .await?;

        // SET does not take bind parameters; the value is an integer.
        sqlx::query(&format!(
            "SET LOCAL statement_timeout = {}",
            self.statement_timeout.as_millis()
        ))
        .execute(&mut *tx)
        .await?;

        Ok(tx)
    }
}

/// Wrap a row query so each row comes back as one JSON object.
fn json_rows_sql(sql: &str) -> String {
    format!("SELECT row_to_json(t) FROM ({sql}) t")
}

#[async_trait]
impl QueryBackend for PgBackend {
    async fn fetch_rows(&self, spec: &QuerySpec) -> Result<Vec<serde_json::Value>> {
        let (sql, values) = spec.to_select().build_sqlx(PostgresQueryBuilder);
        tracing::debug!(sql = %sql, "executing row query");

        let mut tx = self.begin_snapshot().await?;
        let rows: Vec<serde_json::Value> = sqlx::query_scalar_with(&json_rows_sql(&sql), values)
            .fetch_all(&mut *tx)
            .await?;
        tx.commit().await?;

        Ok(rows)
    }

    async fn fetch_page(&self, rows: &QuerySpec, count: &QuerySpec) -> Result<FetchedPage> {
        let (count_sql, count_values) = count.to_select().build_sqlx(PostgresQueryBuilder);
        let (rows_sql, rows_values) = rows.to_select().build_sqlx(PostgresQueryBuilder);
        tracing::debug!(count_sql = %count_sql, rows_sql = %rows_sql, "executing paged query");

        let mut tx = self.begin_snapshot().await?;

        let total: i64 = sqlx::query_scalar_with(&count_sql, count_values)
            .fetch_one(&mut *tx)
            .await?;

        let rows: Vec<serde_json::Value> =
            sqlx::query_scalar_with(&json_rows_sql(&rows_sql), rows_values)
                .fetch_all(&mut *tx)
                .await?;

        tx.commit().await?;

        Ok(FetchedPage {
            rows,
            total_count: u64::try_from(total).unwrap_or_default(),
        })
    }
}
