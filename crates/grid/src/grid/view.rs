//! Read-only, serializable view over a grid execution.

use std::collections::BTreeMap;

use serde::Serialize;

use super::engine::{ALLOWED_LIMITS, GridEngine};
use super::state::QueryGridState;
use super::types::{ActionColumn, ColumnDefinition, GridResult, SortDirection};

/// Route data for one action link of one row.
#[derive(Debug, Clone, Serialize)]
pub struct RowAction {
    #[serde(rename = "type")]
    pub action_type: String,
    pub name: String,
    pub route: String,
    pub params: BTreeMap<String, serde_json::Value>,
}

/// A result row with its action links.
#[derive(Debug, Clone, Serialize)]
pub struct GridViewRow {
    pub data: serde_json::Value,
    pub actions: Vec<RowAction>,
}

/// Everything a template needs to render a grid.
#[derive(Debug, Clone, Serialize)]
pub struct GridView {
    pub id: String,
    pub columns: Vec<ColumnDefinition>,
    pub action_columns: Vec<ActionColumn>,
    pub rows: Vec<GridViewRow>,
    pub paging: bool,
    pub total_count: Option<u64>,
    pub page_count: Option<u64>,
    pub page: u64,
    pub limit: Option<u64>,
    pub allowed_limits: Vec<u64>,
    pub order_column: Option<String>,
    pub order_direction: SortDirection,
}

impl GridView {
    pub fn new(engine: &GridEngine, state: &QueryGridState, result: GridResult) -> Self {
        let rows = result
            .rows
            .into_iter()
            .map(|data| {
                let actions = engine
                    .action_columns()
                    .iter()
                    .map(|action| RowAction {
                        action_type: action.action_type.clone(),
                        name: action.name.clone(),
                        route: action.route.clone(),
                        params: action.route_params(&data),
                    })
                    .collect();
                GridViewRow { data, actions }
            })
            .collect();

        Self {
            id: engine.id().to_string(),
            columns: engine.columns().to_vec(),
            action_columns: engine.action_columns().to_vec(),
            rows,
            paging: engine.is_paging_enabled(),
            total_count: result.total_count,
            page_count: result.page_count,
            page: result.effective_page,
            limit: result.limit,
            allowed_limits: ALLOWED_LIMITS.to_vec(),
            order_column: state.sort_column().map(str::to_string),
            order_direction: state.sort_direction(),
        }
    }

    /// Order parameter for a column header link.
    ///
    /// Clicking the column currently sorted ascending flips it to
    /// descending; any other column sorts ascending.
    pub fn order_param_for(&self, column_id: &str) -> String {
        let ascending_now = self.order_column.as_deref() == Some(column_id)
            && self.order_direction == SortDirection::Asc;
        if ascending_now {
            format!("-{column_id}")
        } else {
            column_id.to_string()
        }
    }

    /// Whether `column_id` is the current sort column.
    pub fn is_ordered_by(&self, column_id: &str) -> bool {
        self.order_column.as_deref() == Some(column_id)
    }

    pub fn has_next(&self) -> bool {
        self.page_count.is_some_and(|pages| self.page < pages)
    }

    pub fn has_prev(&self) -> bool {
        self.page > 1
    }
}
