//! Filter rule types.
//!
//! A [`FilterRule`] is one `(field, operator, value)` predicate taken from a
//! request or a saved search. The field names the filter definition that
//! knows how to turn it into query fragments.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{GridError, Result};

/// Comparison operators for filter rules.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum FilterOperator {
    /// Matches the value.
    Is,
    /// Does not match the value.
    IsNot,
    /// The field has no value at all.
    NotSet,
    /// Substring match.
    Contains,
    /// No substring match.
    DoesntContain,
    /// Less than.
    Lt,
    /// Greater than.
    Gt,
}

impl FilterOperator {
    /// Wire name, as used in request parameters and JSON.
    pub fn as_str(&self) -> &'static str {
        match self {
            FilterOperator::Is => "is",
            FilterOperator::IsNot => "is_not",
            FilterOperator::NotSet => "not_set",
            FilterOperator::Contains => "contains",
            FilterOperator::DoesntContain => "doesnt_contain",
            FilterOperator::Lt => "lt",
            FilterOperator::Gt => "gt",
        }
    }
}

impl fmt::Display for FilterOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FilterOperator {
    type Err = GridError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "is" => Ok(FilterOperator::Is),
            "is_not" => Ok(FilterOperator::IsNot),
            "not_set" => Ok(FilterOperator::NotSet),
            "contains" => Ok(FilterOperator::Contains),
            "doesnt_contain" => Ok(FilterOperator::DoesntContain),
            "lt" => Ok(FilterOperator::Lt),
            "gt" => Ok(FilterOperator::Gt),
            other => Err(GridError::UnknownOperator(other.to_string())),
        }
    }
}

/// Filter value types.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum FilterValue {
    /// String value.
    String(String),
    /// Integer value.
    Integer(i64),
    /// Float value.
    Float(f64),
    /// Boolean value.
    Boolean(bool),
    /// List of values.
    List(Vec<FilterValue>),
}

impl FilterValue {
    /// Convert to string representation.
    pub fn as_string(&self) -> Option<String> {
        match self {
            FilterValue::String(s) => Some(s.clone()),
            FilterValue::Integer(i) => Some(i.to_string()),
            FilterValue::Float(f) => Some(f.to_string()),
            FilterValue::Boolean(b) => Some(b.to_string()),
            FilterValue::List(_) => None,
        }
    }

    /// Convert to integer if possible.
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            FilterValue::Integer(i) => Some(*i),
            FilterValue::String(s) => s.trim().parse().ok(),
            _ => None,
        }
    }

    /// Convert to float if possible.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            FilterValue::Float(f) => Some(*f),
            FilterValue::Integer(i) => Some(*i as f64),
            FilterValue::String(s) => s.trim().parse().ok(),
            _ => None,
        }
    }
}

/// A single `(field, operator, value)` predicate.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FilterRule {
    /// Name of the filter definition this rule targets.
    pub field: String,

    /// Comparison operator.
    pub operator: FilterOperator,

    /// Value to compare against; absent for `not_set`.
    #[serde(default)]
    pub value: Option<FilterValue>,
}

impl FilterRule {
    pub fn new(field: &str, operator: FilterOperator, value: Option<FilterValue>) -> Self {
        Self {
            field: field.to_string(),
            operator,
            value,
        }
    }

    /// Rule value as an integer id, or an `InvalidFilterValue` error.
    pub fn require_i64(&self) -> Result<i64> {
        self.value
            .as_ref()
            .and_then(FilterValue::as_i64)
            .ok_or_else(|| self.invalid_value("expected an integer"))
    }

    /// Rule value as a number.
    pub fn require_f64(&self) -> Result<f64> {
        self.value
            .as_ref()
            .and_then(FilterValue::as_f64)
            .ok_or_else(|| self.invalid_value("expected a number"))
    }

    /// Rule value as text.
    pub fn require_string(&self) -> Result<String> {
        self.value
            .as_ref()
            .and_then(FilterValue::as_string)
            .ok_or_else(|| self.invalid_value("expected text"))
    }

    fn invalid_value(&self, reason: &str) -> GridError {
        GridError::InvalidFilterValue {
            filter: self.field.clone(),
            reason: format!("{reason} for operator '{}'", self.operator),
        }
    }
}
