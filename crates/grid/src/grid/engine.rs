//! Grid engine: columns, paging and request state over a base query.
//!
//! A grid is configured once per request (columns, action columns, base
//! query, paging) and then executed with the request's [`QueryGridState`].
//! Execution is split in two steps:
//!
//! 1. [`GridEngine::plan`] validates the state and derives the row query and,
//!    when paging is enabled, the count query. Both come from the same
//!    filtered spec, so they always share joins and predicates.
//! 2. [`GridEngine::execute`] runs the plan against a [`QueryBackend`].
//!
//! Validation errors surface before any statement reaches the backend.

use std::collections::BTreeMap;
use std::sync::Arc;

use sea_query::Order;

use crate::backend::QueryBackend;
use crate::error::{GridError, Result};
use crate::filter::FilterRegistry;
use crate::query::{ColumnExpr, QuerySpec};

use super::paging;
use super::state::QueryGridState;
use super::types::{ActionColumn, ColumnDefinition, GridResult};
use super::view::GridView;

/// Page sizes offered by the page-size selector.
pub const ALLOWED_LIMITS: [u64; 4] = [30, 100, 200, 500];

/// Page size when neither the grid nor the request sets one.
pub const DEFAULT_LIMIT: u64 = 30;

/// Row and count queries for one execution.
#[derive(Debug, Clone)]
pub struct GridPlan {
    pub rows: QuerySpec,
    /// Present only when paging is enabled.
    pub count: Option<QuerySpec>,
    pub page: u64,
    /// Present only when paging is enabled.
    pub limit: Option<u64>,
}

/// A configurable, pageable, sortable and filterable grid.
pub struct GridEngine {
    id: String,
    filters: Arc<FilterRegistry>,
    columns: Vec<ColumnDefinition>,
    action_columns: Vec<ActionColumn>,
    base_query: Option<QuerySpec>,
    group_by: Option<ColumnExpr>,
    paging: bool,
    default_limit: u64,
}

impl GridEngine {
    pub fn new(id: &str, filters: Arc<FilterRegistry>) -> Self {
        Self {
            id: id.to_string(),
            filters,
            columns: Vec::new(),
            action_columns: Vec::new(),
            base_query: None,
            group_by: None,
            paging: false,
            default_limit: DEFAULT_LIMIT,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    /// Register a display column.
    ///
    /// `expression` is an `alias.column` reference into the base query.
    /// Registering the same id twice fails with [`GridError::DuplicateColumn`].
    pub fn add_column(
        &mut self,
        id: &str,
        expression: &str,
        title: &str,
        sortable: bool,
    ) -> Result<&ColumnDefinition> {
        if self.column(id).is_some() {
            return Err(GridError::DuplicateColumn {
                grid: self.id.clone(),
                column: id.to_string(),
            });
        }

        let expression = ColumnExpr::parse(expression)?;
        let index = self.columns.len();
        self.columns.push(ColumnDefinition {
            id: id.to_string(),
            expression,
            title: title.to_string(),
            sortable,
        });
        Ok(&self.columns[index])
    }

    /// Register a per-row action link. Registration order is display order.
    ///
    /// `bound_params` maps route parameter names to row fields.
    pub fn add_action_column(
        &mut self,
        action_type: &str,
        name: &str,
        route: &str,
        bound_params: &[(&str, &str)],
        extra_params: &[(&str, &str)],
    ) -> &ActionColumn {
        let to_map = |pairs: &[(&str, &str)]| -> BTreeMap<String, String> {
            pairs
                .iter()
                .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
                .collect()
        };

        let index = self.action_columns.len();
        self.action_columns.push(ActionColumn {
            action_type: action_type.to_string(),
            name: name.to_string(),
            route: route.to_string(),
            bound_params: to_map(bound_params),
            extra_params: to_map(extra_params),
        });
        &self.action_columns[index]
    }

    /// Supply the unfiltered, unpaged query.
    ///
    /// `group_by` is the row identity used to count results
    /// (`COUNT(DISTINCT group_by)`) and to break ties when sorting; it never
    /// groups the row query. A paged grid requires it.
    pub fn set_base_query(&mut self, query: QuerySpec, group_by: Option<&str>) -> Result<()> {
        let group_by = group_by.map(ColumnExpr::parse).transpose()?;
        if self.paging && group_by.is_none() {
            return Err(GridError::MissingGroupKey(self.id.clone()));
        }
        self.group_by = group_by;
        self.base_query = Some(query);
        Ok(())
    }

    /// Turn on paging and total-count computation.
    ///
    /// Pages over tied sort values are only stable with a row identity, so
    /// the base query must already be set with a grouping key.
    pub fn enable_paging(&mut self) -> Result<()> {
        if self.group_by.is_none() {
            return Err(GridError::MissingGroupKey(self.id.clone()));
        }
        self.paging = true;
        Ok(())
    }

    /// Page size used when the request does not name one.
    pub fn set_default_limit(&mut self, limit: u64) -> Result<()> {
        self.default_limit = paging::check_page_value("default limit", limit)?;
        Ok(())
    }

    pub fn columns(&self) -> &[ColumnDefinition] {
        &self.columns
    }

    pub fn column(&self, id: &str) -> Option<&ColumnDefinition> {
        self.columns.iter().find(|c| c.id == id)
    }

    pub fn action_columns(&self) -> &[ActionColumn] {
        &self.action_columns
    }

    pub fn is_paging_enabled(&self) -> bool {
        self.paging
    }

    pub fn default_limit(&self) -> u64 {
        self.default_limit
    }

    /// Validate `state` and derive the queries to run.
    pub fn plan(&self, state: &QueryGridState) -> Result<GridPlan> {
        let sort = self.resolve_sort(state)?;
        self.filters.validate(state.filter_rules())?;

        let base = self
            .base_query
            .clone()
            .ok_or_else(|| GridError::MissingBaseQuery(self.id.clone()))?;

        let mut spec = self.filters.apply(base, state.filter_rules())?;

        if !self.columns.is_empty() {
            spec = self
                .columns
                .iter()
                .fold(spec.without_selects(), |spec, column| {
                    spec.select_as(column.expression.to_expr(), &column.id)
                });
        }

        if let Some(column) = sort {
            spec = spec.reorder_by(column.expression.to_expr(), state.sort_direction().into());
            if let Some(key) = &self.group_by {
                spec = spec.order_by(key.to_expr(), Order::Asc);
            }
        }

        let page = state.page();
        if !self.paging {
            return Ok(GridPlan {
                rows: spec,
                count: None,
                page,
                limit: None,
            });
        }

        let limit = state.limit().unwrap_or(self.default_limit);
        let count = spec.count_spec(self.group_by.as_ref());
        Ok(GridPlan {
            rows: spec.paged(limit, paging::offset(page, limit)?),
            count: Some(count),
            page,
            limit: Some(limit),
        })
    }

    /// Run the grid against `backend`.
    pub async fn execute(
        &self,
        backend: &dyn QueryBackend,
        state: &QueryGridState,
    ) -> Result<GridResult> {
        let plan = self.plan(state)?;

        let (Some(count), Some(limit)) = (&plan.count, plan.limit) else {
            let rows = backend.fetch_rows(&plan.rows).await?;
            tracing::debug!(grid = %self.id, rows = rows.len(), "grid executed without paging");
            return Ok(GridResult {
                rows,
                total_count: None,
                page_count: None,
                effective_page: plan.page,
                limit: None,
            });
        };

        let fetched = backend.fetch_page(&plan.rows, count).await?;
        let page_count = paging::page_count(fetched.total_count, limit);
        let effective_page = paging::effective_page(plan.page, page_count);

        if effective_page < plan.page {
            tracing::warn!(
                grid = %self.id,
                requested = plan.page,
                clamped = effective_page,
                page_count,
                "requested page exceeds page count, clamping"
            );
        }

        Ok(GridResult {
            rows: fetched.rows,
            total_count: Some(fetched.total_count),
            page_count: Some(page_count),
            effective_page,
            limit: Some(limit),
        })
    }

    /// Presentation-ready view of an execution result.
    pub fn create_view(&self, state: &QueryGridState, result: GridResult) -> GridView {
        GridView::new(self, state, result)
    }

    fn resolve_sort(&self, state: &QueryGridState) -> Result<Option<&ColumnDefinition>> {
        let Some(column_id) = state.sort_column() else {
            return Ok(None);
        };

        let invalid = |reason| GridError::InvalidSortColumn {
            grid: self.id.clone(),
            column: column_id.to_string(),
            reason,
        };

        match self.column(column_id) {
            None => Err(invalid("no such column")),
            Some(column) if !column.sortable => Err(invalid("column is not sortable")),
            Some(column) => Ok(Some(column)),
        }
    }
}
