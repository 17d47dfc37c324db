//! Column references and identifier safety.
//!
//! Grid columns and grouping keys arrive as configuration strings such as
//! `"p.id"` or `"pt.name"`. They are parsed once into [`ColumnExpr`] and only
//! ever reach SQL as quoted identifiers.

use std::fmt;

use sea_query::{Alias, Expr, SimpleExpr};

use crate::error::{GridError, Result};

/// Validate a SQL identifier name (table/column/alias names).
/// Allows only `[a-zA-Z_][a-zA-Z0-9_]*` with max 63 chars (PostgreSQL limit).
pub fn is_safe_identifier(name: &str) -> bool {
    !name.is_empty()
        && name.len() <= 63
        && name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_')
        && name.starts_with(|c: char| c.is_ascii_alphabetic() || c == '_')
}

/// Escape SQL LIKE wildcard characters (`%`, `_`, `\`) in a value.
pub fn escape_like_wildcards(value: &str) -> String {
    value
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_")
}

/// Column of a table alias: `p.id` renders as `"p"."id"`.
pub fn col(table_alias: &str, column: &str) -> Expr {
    Expr::col((Alias::new(table_alias), Alias::new(column)))
}

/// A parsed `alias.column` (or bare `column`) reference.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnExpr {
    table: Option<String>,
    column: String,
}

impl ColumnExpr {
    /// Parse a dotted column reference, rejecting anything that is not a
    /// plain identifier path.
    pub fn parse(raw: &str) -> Result<Self> {
        let mut parts = raw.split('.');
        let (table, column) = match (parts.next(), parts.next(), parts.next()) {
            (Some(column), None, None) => (None, column),
            (Some(table), Some(column), None) => (Some(table), column),
            _ => return Err(GridError::InvalidExpression(raw.to_string())),
        };

        if !is_safe_identifier(column) || table.is_some_and(|t| !is_safe_identifier(t)) {
            return Err(GridError::InvalidExpression(raw.to_string()));
        }

        Ok(Self {
            table: table.map(str::to_string),
            column: column.to_string(),
        })
    }

    /// Table alias part, if any.
    pub fn table(&self) -> Option<&str> {
        self.table.as_deref()
    }

    /// Column name part.
    pub fn column(&self) -> &str {
        &self.column
    }

    /// Render as a sea-query expression.
    pub fn to_expr(&self) -> SimpleExpr {
        match &self.table {
            Some(table) => col(table, &self.column).into(),
            None => Expr::col(Alias::new(&self.column)).into(),
        }
    }
}

impl fmt::Display for ColumnExpr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.table {
            Some(table) => write!(f, "{table}.{}", self.column),
            None => f.write_str(&self.column),
        }
    }
}
