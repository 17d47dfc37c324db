//! Query values and their SQL translation.
//!
//! - QuerySpec: immutable SELECT description that filters and orderers extend
//! - ColumnExpr: validated `alias.column` references from configuration

mod expr;
mod spec;

pub use expr::{ColumnExpr, col, escape_like_wildcards, is_safe_identifier};
pub use spec::{JoinSpec, JoinType, QuerySpec};
