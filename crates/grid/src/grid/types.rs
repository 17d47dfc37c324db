//! Grid definition and result types.

use std::collections::BTreeMap;

use sea_query::Order;
use serde::{Deserialize, Serialize};

use crate::query::ColumnExpr;

/// Sort direction.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    /// Ascending order.
    #[default]
    Asc,
    /// Descending order.
    Desc,
}

impl From<SortDirection> for Order {
    fn from(direction: SortDirection) -> Self {
        match direction {
            SortDirection::Asc => Order::Asc,
            SortDirection::Desc => Order::Desc,
        }
    }
}

/// A display column backed by a query expression.
#[derive(Debug, Clone, Serialize)]
pub struct ColumnDefinition {
    /// Unique id within the grid; also the output alias in result rows.
    pub id: String,
    /// Expression the column selects and sorts by.
    #[serde(serialize_with = "serialize_expr")]
    pub expression: ColumnExpr,
    pub title: String,
    pub sortable: bool,
}

fn serialize_expr<S: serde::Serializer>(expr: &ColumnExpr, s: S) -> Result<S::Ok, S::Error> {
    s.collect_str(expr)
}

/// A per-row link column (edit, delete, ...).
///
/// Only the route data is modelled here; turning it into a URL is up to the
/// presentation layer.
#[derive(Debug, Clone, Serialize)]
pub struct ActionColumn {
    /// Kind of action, e.g. `edit` or `delete`.
    #[serde(rename = "type")]
    pub action_type: String,
    pub name: String,
    pub route: String,
    /// Route parameter name -> row field the value is copied from.
    pub bound_params: BTreeMap<String, String>,
    /// Route parameters with fixed values.
    pub extra_params: BTreeMap<String, String>,
}

impl ActionColumn {
    /// Route parameters for one result row.
    ///
    /// Bound parameters missing from the row are left out.
    pub fn route_params(&self, row: &serde_json::Value) -> BTreeMap<String, serde_json::Value> {
        let mut params: BTreeMap<String, serde_json::Value> = self
            .bound_params
            .iter()
            .filter_map(|(param, field)| row.get(field).map(|v| (param.clone(), v.clone())))
            .collect();

        for (param, value) in &self.extra_params {
            params.insert(param.clone(), serde_json::Value::String(value.clone()));
        }

        params
    }
}

/// Outcome of one grid execution.
#[derive(Debug, Clone, Serialize)]
pub struct GridResult {
    /// Rows keyed by column id.
    pub rows: Vec<serde_json::Value>,

    /// Total matching rows; `None` when paging is disabled.
    pub total_count: Option<u64>,

    /// `ceil(total_count / limit)`; `None` when paging is disabled.
    pub page_count: Option<u64>,

    /// Requested page clamped to the last page when paging is enabled.
    ///
    /// The rows were fetched for the requested page, so a request past the
    /// end yields no rows together with the clamped page number.
    pub effective_page: u64,

    /// Page size used; `None` when paging is disabled.
    pub limit: Option<u64>,
}

impl GridResult {
    /// Whether there is a page after the effective one.
    pub fn has_next(&self) -> bool {
        self.page_count
            .is_some_and(|pages| self.effective_page < pages)
    }

    /// Whether there is a page before the effective one.
    pub fn has_prev(&self) -> bool {
        self.effective_page > 1
    }
}
