//! Immutable SELECT description.
//!
//! A [`QuerySpec`] is a plain value: base table, select list, joins,
//! predicates, grouping, ordering and paging. Filters and orderers take a
//! spec and return a new one; nothing edits a shared builder in place.
//! [`QuerySpec::to_select`] is the single step that turns the final value
//! into a SeaQuery statement, which backends render for their dialect with
//! bound parameters.

use sea_query::{Alias, Asterisk, Expr, Order, Query, SelectStatement, SimpleExpr};

use super::expr::ColumnExpr;

/// SQL join types.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum JoinType {
    #[default]
    Inner,
    Left,
}

impl From<JoinType> for sea_query::JoinType {
    fn from(join_type: JoinType) -> Self {
        match join_type {
            JoinType::Inner => sea_query::JoinType::InnerJoin,
            JoinType::Left => sea_query::JoinType::LeftJoin,
        }
    }
}

/// One joined relation.
#[derive(Debug, Clone)]
pub struct JoinSpec {
    pub join_type: JoinType,
    pub table: String,
    pub alias: String,
    pub on: SimpleExpr,
}

#[derive(Debug, Clone)]
struct SelectItem {
    expr: SimpleExpr,
    alias: Option<String>,
}

/// Declarative SELECT over a base table.
#[derive(Debug, Clone)]
pub struct QuerySpec {
    table: String,
    alias: String,
    selects: Vec<SelectItem>,
    joins: Vec<JoinSpec>,
    predicates: Vec<SimpleExpr>,
    group_by: Vec<SimpleExpr>,
    orders: Vec<(SimpleExpr, Order)>,
    limit: Option<u64>,
    offset: Option<u64>,
}

impl QuerySpec {
    /// Start a query over `table AS alias`. With no explicit selects the
    /// statement selects `alias.*`.
    pub fn new(table: &str, alias: &str) -> Self {
        Self {
            table: table.to_string(),
            alias: alias.to_string(),
            selects: Vec::new(),
            joins: Vec::new(),
            predicates: Vec::new(),
            group_by: Vec::new(),
            orders: Vec::new(),
            limit: None,
            offset: None,
        }
    }

    /// Base table name.
    pub fn table(&self) -> &str {
        &self.table
    }

    /// Base table alias.
    pub fn alias(&self) -> &str {
        &self.alias
    }

    pub fn joins(&self) -> &[JoinSpec] {
        &self.joins
    }

    pub fn predicates(&self) -> &[SimpleExpr] {
        &self.predicates
    }

    pub fn orders(&self) -> &[(SimpleExpr, Order)] {
        &self.orders
    }

    pub fn limit(&self) -> Option<u64> {
        self.limit
    }

    pub fn offset(&self) -> Option<u64> {
        self.offset
    }

    /// Whether a join with this alias is already present.
    pub fn has_join(&self, alias: &str) -> bool {
        self.joins.iter().any(|j| j.alias == alias)
    }

    /// Add an output column under `alias`.
    #[must_use]
    pub fn select_as(mut self, expr: impl Into<SimpleExpr>, alias: &str) -> Self {
        self.selects.push(SelectItem {
            expr: expr.into(),
            alias: Some(alias.to_string()),
        });
        self
    }

    /// Replace the select list with a single expression.
    #[must_use]
    pub fn select_only(mut self, expr: impl Into<SimpleExpr>, alias: Option<&str>) -> Self {
        self.selects = vec![SelectItem {
            expr: expr.into(),
            alias: alias.map(str::to_string),
        }];
        self
    }

    /// Drop the select list, falling back to `alias.*`.
    #[must_use]
    pub fn without_selects(mut self) -> Self {
        self.selects.clear();
        self
    }

    /// Join `table AS alias ON condition`.
    #[must_use]
    pub fn join(mut self, join_type: JoinType, table: &str, alias: &str, on: SimpleExpr) -> Self {
        self.joins.push(JoinSpec {
            join_type,
            table: table.to_string(),
            alias: alias.to_string(),
            on,
        });
        self
    }

    /// AND a predicate into the WHERE clause.
    #[must_use]
    pub fn and_where(mut self, predicate: SimpleExpr) -> Self {
        self.predicates.push(predicate);
        self
    }

    #[must_use]
    pub fn group_by(mut self, expr: impl Into<SimpleExpr>) -> Self {
        self.group_by.push(expr.into());
        self
    }

    /// Append an ORDER BY term after the existing ones.
    #[must_use]
    pub fn order_by(mut self, expr: impl Into<SimpleExpr>, order: Order) -> Self {
        self.orders.push((expr.into(), order));
        self
    }

    /// Replace all ORDER BY terms with a single one.
    #[must_use]
    pub fn reorder_by(mut self, expr: impl Into<SimpleExpr>, order: Order) -> Self {
        self.orders = vec![(expr.into(), order)];
        self
    }

    /// Set LIMIT/OFFSET.
    #[must_use]
    pub fn paged(mut self, limit: u64, offset: u64) -> Self {
        self.limit = Some(limit);
        self.offset = Some(offset);
        self
    }

    /// Set LIMIT only.
    #[must_use]
    pub fn limited(mut self, limit: u64) -> Self {
        self.limit = Some(limit);
        self
    }

    /// Derive the total-count variant of this query.
    ///
    /// Joins and predicates are carried over untouched, so the count always
    /// sees exactly the rows the row query filters on. The select becomes
    /// `COUNT(DISTINCT key)` (or `COUNT(*)` without a key) and ordering,
    /// grouping and paging are dropped.
    pub fn count_spec(&self, key: Option<&ColumnExpr>) -> QuerySpec {
        let count = match key {
            Some(key) => Expr::expr(key.to_expr()).count_distinct(),
            None => Expr::col(Asterisk).count(),
        };

        QuerySpec {
            table: self.table.clone(),
            alias: self.alias.clone(),
            selects: vec![SelectItem {
                expr: count,
                alias: Some("total_count".to_string()),
            }],
            joins: self.joins.clone(),
            predicates: self.predicates.clone(),
            group_by: Vec::new(),
            orders: Vec::new(),
            limit: None,
            offset: None,
        }
    }

    /// Translate into a SeaQuery SELECT statement.
    pub fn to_select(&self) -> SelectStatement {
        let mut query = Query::select();

        if self.selects.is_empty() {
            query.column((Alias::new(&self.alias), Asterisk));
        }
        for item in &self.selects {
            match &item.alias {
                Some(alias) => {
                    query.expr_as(item.expr.clone(), Alias::new(alias));
                }
                None => {
                    query.expr(item.expr.clone());
                }
            }
        }

        query.from_as(Alias::new(&self.table), Alias::new(&self.alias));

        for join in &self.joins {
            query.join_as(
                join.join_type.into(),
                Alias::new(&join.table),
                Alias::new(&join.alias),
                join.on.clone(),
            );
        }

        for predicate in &self.predicates {
            query.and_where(predicate.clone());
        }

        if !self.group_by.is_empty() {
            query.add_group_by(self.group_by.iter().cloned());
        }

        for (expr, order) in &self.orders {
            query.order_by_expr(expr.clone(), order.clone());
        }

        if let Some(limit) = self.limit {
            query.limit(limit);
        }
        if let Some(offset) = self.offset {
            query.offset(offset);
        }

        query
    }
}
