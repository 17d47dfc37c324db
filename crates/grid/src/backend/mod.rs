//! Query execution backends.
//!
//! A backend renders a [`QuerySpec`] for its SQL dialect, binds the values
//! positionally and returns rows as JSON objects keyed by output column.

mod postgres;
mod sqlite;

pub use postgres::PgBackend;
pub use sqlite::SqliteBackend;

use async_trait::async_trait;

use crate::error::Result;
use crate::query::QuerySpec;

/// Rows of one page plus the total row count of the unpaged query.
#[derive(Debug, Clone, Default)]
pub struct FetchedPage {
    pub rows: Vec<serde_json::Value>,
    pub total_count: u64,
}

/// Executes query specs against a relational data source.
#[async_trait]
pub trait QueryBackend: Send + Sync {
    /// Run a row query.
    async fn fetch_rows(&self, spec: &QuerySpec) -> Result<Vec<serde_json::Value>>;

    /// Run a count query and a row query against one consistent snapshot.
    ///
    /// `count` must select a single integer column.
    async fn fetch_page(&self, rows: &QuerySpec, count: &QuerySpec) -> Result<FetchedPage>;

    /// Run a row query expected to yield at most one row.
    async fn fetch_optional(&self, spec: &QuerySpec) -> Result<Option<serde_json::Value>> {
        let spec = spec.clone().limited(1);
        Ok(self.fetch_rows(&spec).await?.into_iter().next())
    }
}
