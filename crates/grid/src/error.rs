//! Grid and catalog error types.
//!
//! Configuration mistakes (duplicate columns, unsupported operators or
//! ordering modes) are programmer errors and are never retried. Only
//! [`GridError::EntityNotFound`] is an expected condition that callers
//! recover from, typically by mapping it to a 404 at the HTTP boundary.

use thiserror::Error;

use crate::filter::FilterOperator;

/// Errors raised while configuring or executing a grid query.
#[derive(Debug, Error)]
pub enum GridError {
    /// A column id was registered twice on the same grid.
    #[error("duplicate column id '{column}' in grid '{grid}'")]
    DuplicateColumn { grid: String, column: String },

    /// The requested sort column is unknown or not sortable.
    #[error("grid '{grid}': cannot sort by '{column}': {reason}")]
    InvalidSortColumn {
        grid: String,
        column: String,
        reason: &'static str,
    },

    /// A filter rule used an operator its filter does not accept.
    #[error("filter '{filter}' does not support operator '{operator}'")]
    UnsupportedOperator {
        filter: String,
        operator: FilterOperator,
    },

    /// An operator name that is not part of the operator vocabulary.
    #[error("unknown filter operator '{0}'")]
    UnknownOperator(String),

    /// An ordering mode outside the fixed set.
    #[error("product list ordering mode '{0}' is not supported")]
    UnsupportedOrderingMode(String),

    /// A single-entity lookup found nothing.
    #[error("{entity} '{key}' not found")]
    EntityNotFound { entity: &'static str, key: String },

    /// A filter rule targets a field with no registered filter.
    #[error("no filter registered for field '{0}'")]
    UnknownFilter(String),

    /// A filter name was registered twice, or is malformed.
    #[error("invalid filter registration '{name}': {reason}")]
    InvalidFilterRegistration { name: String, reason: &'static str },

    /// A filter rule value has the wrong shape for its filter.
    #[error("filter '{filter}': invalid value: {reason}")]
    InvalidFilterValue { filter: String, reason: String },

    /// Paging was enabled on a grid without a grouping key.
    #[error("grid '{0}' needs a grouping key for paging")]
    MissingGroupKey(String),

    /// A column or grouping expression is not a safe identifier path.
    #[error("invalid query expression '{0}'")]
    InvalidExpression(String),

    /// The grid was executed before a base query was supplied.
    #[error("grid '{0}' has no base query")]
    MissingBaseQuery(String),

    /// Request-supplied paging or ordering state is malformed.
    #[error("invalid grid state: {0}")]
    InvalidGridState(String),

    #[error("database error")]
    Database(#[from] sqlx::Error),

    #[error("failed to decode row")]
    Decode(#[from] serde_json::Error),
}

impl GridError {
    /// Whether this is the recoverable "entity not found" case.
    pub fn is_not_found(&self) -> bool {
        matches!(self, GridError::EntityNotFound { .. })
    }
}

/// Result type alias using GridError.
pub type Result<T> = std::result::Result<T, GridError>;
