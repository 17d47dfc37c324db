//! SQLite backend, used for embedded catalogs and tests.

use async_trait::async_trait;
use sea_query::SqliteQueryBuilder;
use sea_query_binder::SqlxBinder;
use serde_json::{Map, Value};
use sqlx::sqlite::SqliteRow;
use sqlx::{Column, Row, SqlitePool, TypeInfo, ValueRef};

use crate::error::Result;
use crate::query::QuerySpec;

use super::{FetchedPage, QueryBackend};

/// Runs query specs against a SQLite pool.
#[derive(Clone)]
pub struct SqliteBackend {
    pool: SqlitePool,
}

impl SqliteBackend {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl QueryBackend for SqliteBackend {
    async fn fetch_rows(&self, spec: &QuerySpec) -> Result<Vec<Value>> {
        let (sql, values) = spec.to_select().build_sqlx(SqliteQueryBuilder);
        tracing::debug!(sql = %sql, "executing row query");

        let rows = sqlx::query_with(&sql, values).fetch_all(&self.pool).await?;
        rows.iter().map(row_to_json).collect()
    }

    async fn fetch_page(&self, rows: &QuerySpec, count: &QuerySpec) -> Result<FetchedPage> {
        let (count_sql, count_values) = count.to_select().build_sqlx(SqliteQueryBuilder);
        let (rows_sql, rows_values) = rows.to_select().build_sqlx(SqliteQueryBuilder);
        tracing::debug!(count_sql = %count_sql, rows_sql = %rows_sql, "executing paged query");

        // One transaction so both statements read the same snapshot.
        let mut tx = self.pool.begin().await?;

        let total: i64 = sqlx::query_scalar_with(&count_sql, count_values)
            .fetch_one(&mut *tx)
            .await?;

        let fetched = sqlx::query_with(&rows_sql, rows_values)
            .fetch_all(&mut *tx)
            .await?;

        tx.commit().await?;

        Ok(FetchedPage {
            rows: fetched.iter().map(row_to_json).collect::<Result<_>>()?,
            total_count: u64::try_from(total).unwrap_or_default(),
        })
    }
}

/// Convert a row to a JSON object using the runtime type of each value.
fn row_to_json(row: &SqliteRow) -> Result<Value> {
    let mut object = Map::new();

    for column in row.columns() {
        let index = column.ordinal();
        let raw = row.try_get_raw(index)?;

        let value = if raw.is_null() {
            Value::Null
        } else {
            match raw.type_info().name() {
                "INTEGER" => Value::from(row.try_get::<i64, _>(index)?),
                "REAL" => Value::from(row.try_get::<f64, _>(index)?),
                _ => Value::from(row.try_get::<String, _>(index)?),
            }
        };

        object.insert(column.name().to_string(), value);
    }

    Ok(Value::Object(object))
}
