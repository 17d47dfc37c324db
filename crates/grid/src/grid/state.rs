//! Request-derived grid state.
//!
//! Grids read their state from query parameters namespaced by grid id:
//!
//! ```text
//! q[products][page]=2&q[products][limit]=100&q[products][order]=-price
//! q[products][filter][0][field]=productBrand&q[products][filter][0][operator]=is&q[products][filter][0][value]=3
//! ```
//!
//! A leading `-` in `order` means descending.

use std::collections::BTreeMap;

use serde::Deserialize;

use crate::error::{GridError, Result};
use crate::filter::{FilterOperator, FilterRule, FilterValue};

use super::paging::{self, MAX_PAGE_VALUE};
use super::types::SortDirection;

/// Page, page size, sort and filter rules for one grid execution.
///
/// Built once per request and not changed afterwards.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(try_from = "GridRequest")]
pub struct QueryGridState {
    page: u64,
    limit: Option<u64>,
    sort: Option<(String, SortDirection)>,
    filter_rules: Vec<FilterRule>,
}

impl Default for QueryGridState {
    fn default() -> Self {
        Self {
            page: 1,
            limit: None,
            sort: None,
            filter_rules: Vec::new(),
        }
    }
}

impl QueryGridState {
    /// First page, grid default limit, no sort, no filters.
    pub fn new() -> Self {
        Self::default()
    }

    /// Request a 1-based page, at most [`MAX_PAGE_VALUE`].
    pub fn with_page(mut self, page: u64) -> Result<Self> {
        self.page = paging::check_page_value("page", page)?;
        Ok(self)
    }

    /// Request an explicit page size, at most [`MAX_PAGE_VALUE`]; it
    /// overrides the grid default.
    pub fn with_limit(mut self, limit: u64) -> Result<Self> {
        self.limit = Some(paging::check_page_value("limit", limit)?);
        Ok(self)
    }

    /// Sort by an order parameter: `price` ascending, `-price` descending.
    ///
    /// Dashes around the column id are dropped, so `--price` is `-price`
    /// and `price-` is `price`.
    pub fn with_order(self, order: &str) -> Result<Self> {
        let direction = if order.starts_with('-') {
            SortDirection::Desc
        } else {
            SortDirection::Asc
        };
        let column = order.trim_matches('-');
        if column.is_empty() {
            return Err(GridError::InvalidGridState(format!(
                "invalid order parameter '{order}'"
            )));
        }
        Ok(self.with_sort(column, direction))
    }

    #[must_use]
    pub fn with_sort(mut self, column: &str, direction: SortDirection) -> Self {
        self.sort = Some((column.to_string(), direction));
        self
    }

    #[must_use]
    pub fn with_filter(mut self, rule: FilterRule) -> Self {
        self.filter_rules.push(rule);
        self
    }

    pub fn page(&self) -> u64 {
        self.page
    }

    /// Request-supplied page size, if any.
    pub fn limit(&self) -> Option<u64> {
        self.limit
    }

    pub fn sort_column(&self) -> Option<&str> {
        self.sort.as_ref().map(|(column, _)| column.as_str())
    }

    pub fn sort_direction(&self) -> SortDirection {
        self.sort
            .as_ref()
            .map(|(_, direction)| *direction)
            .unwrap_or_default()
    }

    pub fn filter_rules(&self) -> &[FilterRule] {
        &self.filter_rules
    }

    /// Current sort as an order parameter (`price` / `-price`).
    pub fn order_param(&self) -> Option<String> {
        self.sort.as_ref().map(|(column, direction)| match direction {
            SortDirection::Asc => column.clone(),
            SortDirection::Desc => format!("-{column}"),
        })
    }

    /// Parse the `q[<grid_id>][...]` parameters of a URL query string.
    ///
    /// Parameters of other grids are ignored. Filter rules are ordered by
    /// their index.
    pub fn from_query_string(grid_id: &str, query: &str) -> Result<Self> {
        let mut request = GridRequest::default();
        let mut filters: BTreeMap<u64, RawRule> = BTreeMap::new();

        for (key, value) in url::form_urlencoded::parse(query.trim_start_matches('?').as_bytes()) {
            let Some(path) = grid_key_path(&key, grid_id) else {
                continue;
            };

            match path.as_slice() {
                ["page"] => request.page = Some(parse_number("page", &value)?),
                ["limit"] => request.limit = Some(parse_number("limit", &value)?),
                ["order"] => request.order = Some(value.into_owned()),
                ["filter", index, part] => {
                    let index = parse_number("filter index", index)?;
                    let rule = filters.entry(index).or_default();
                    match *part {
                        "field" => rule.field = Some(value.into_owned()),
                        "operator" => rule.operator = Some(value.into_owned()),
                        "value" => rule.value = Some(value.into_owned()),
                        other => {
                            return Err(GridError::InvalidGridState(format!(
                                "unknown filter parameter '{other}'"
                            )));
                        }
                    }
                }
                _ => {
                    tracing::debug!(grid = grid_id, key = %key, "ignoring unknown grid parameter");
                }
            }
        }

        request.filter = filters
            .into_values()
            .map(RawRule::into_rule)
            .collect::<Result<_>>()?;

        Self::try_from(request)
    }
}

/// Wire form of [`QueryGridState`] for JSON callers.
#[derive(Debug, Default, Deserialize)]
struct GridRequest {
    page: Option<u64>,
    limit: Option<u64>,
    order: Option<String>,
    #[serde(default)]
    filter: Vec<FilterRule>,
}

impl TryFrom<GridRequest> for QueryGridState {
    type Error = GridError;

    fn try_from(request: GridRequest) -> Result<Self> {
        let mut state = QueryGridState::new().with_page(request.page.unwrap_or(1))?;
        if let Some(limit) = request.limit {
            state = state.with_limit(limit)?;
        }
        if let Some(order) = request.order.as_deref()
            && !order.is_empty()
        {
            state = state.with_order(order)?;
        }
        state.filter_rules = request.filter;
        Ok(state)
    }
}

#[derive(Debug, Default)]
struct RawRule {
    field: Option<String>,
    operator: Option<String>,
    value: Option<String>,
}

impl RawRule {
    fn into_rule(self) -> Result<FilterRule> {
        let field = self
            .field
            .ok_or_else(|| GridError::InvalidGridState("filter rule without field".to_string()))?;
        let operator: FilterOperator = self
            .operator
            .ok_or_else(|| {
                GridError::InvalidGridState(format!("filter rule '{field}' without operator"))
            })?
            .parse()?;
        let value = self
            .value
            .filter(|v| !v.is_empty())
            .map(FilterValue::String);

        Ok(FilterRule::new(&field, operator, value))
    }
}

/// Split `q[grid][a][b]` into `["a", "b"]` when `grid` matches.
fn grid_key_path<'k>(key: &'k str, grid_id: &str) -> Option<Vec<&'k str>> {
    let rest = key.strip_prefix("q[")?;
    let rest = rest.strip_prefix(grid_id)?.strip_prefix(']')?;

    let mut path = Vec::new();
    let mut rest = rest;
    while !rest.is_empty() {
        let inner = rest.strip_prefix('[')?;
        let end = inner.find(']')?;
        path.push(&inner[..end]);
        rest = &inner[end + 1..];
    }

    Some(path)
}

fn parse_number(name: &str, value: &str) -> Result<u64> {
    value
        .trim()
        .parse()
        .map_err(|_| GridError::InvalidGridState(format!("{name} must be a positive integer, got '{value}'")))
}
