//! Filter definitions and the registry that dispatches rules to them.
//!
//! Each filter kind declares the operators it accepts and how to extend a
//! query for the rules targeting it. The registry is built once at startup,
//! shared behind an `Arc`, and looked up by the rule's field name.

use std::collections::HashMap;

use crate::error::{GridError, Result};
use crate::query::QuerySpec;

use super::types::{FilterOperator, FilterRule};

/// A filter kind (brand, category, price, ...).
pub trait FilterDefinition: Send + Sync {
    /// Field name that rules use to target this filter.
    fn name(&self) -> &str;

    /// Operators this filter accepts.
    fn allowed_operators(&self) -> &[FilterOperator];

    /// Extend `spec` with all rules for this filter at once.
    ///
    /// Rules arrive in request order. Implementations may assume
    /// [`check_operators`](Self::check_operators) already passed.
    fn extend_query(&self, spec: QuerySpec, rules: &[FilterRule]) -> Result<QuerySpec>;

    /// Reject the first rule whose operator is not allowed.
    fn check_operators(&self, rules: &[FilterRule]) -> Result<()> {
        let allowed = self.allowed_operators();
        match rules.iter().find(|r| !allowed.contains(&r.operator)) {
            Some(rule) => Err(GridError::UnsupportedOperator {
                filter: self.name().to_string(),
                operator: rule.operator,
            }),
            None => Ok(()),
        }
    }
}

/// Validate a filter name: non-empty, ASCII alphanumeric/underscore,
/// starting with a letter, max 64 chars.
fn is_valid_filter_name(name: &str) -> bool {
    !name.is_empty()
        && name.len() <= 64
        && name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_')
        && name.starts_with(|c: char| c.is_ascii_alphabetic())
}

/// Filter definitions keyed by field name.
#[derive(Default)]
pub struct FilterRegistry {
    filters: HashMap<String, Box<dyn FilterDefinition>>,
}

impl FilterRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry with the storefront's product filters pre-registered.
    pub fn with_product_filters() -> Result<Self> {
        let mut registry = Self::new();
        registry.register(Box::new(super::product::product_brand_filter()))?;
        registry.register(Box::new(super::product::product_category_filter()))?;
        registry.register(Box::new(super::product::ProductCatnumFilter))?;
        registry.register(Box::new(super::product::ProductPriceFilter))?;
        Ok(registry)
    }

    /// Register a filter definition.
    ///
    /// Malformed names, empty operator sets and duplicate names are
    /// configuration errors.
    pub fn register(&mut self, filter: Box<dyn FilterDefinition>) -> Result<()> {
        let name = filter.name().to_string();

        if !is_valid_filter_name(&name) {
            return Err(GridError::InvalidFilterRegistration {
                name,
                reason: "name must be alphanumeric and start with a letter",
            });
        }
        if filter.allowed_operators().is_empty() {
            return Err(GridError::InvalidFilterRegistration {
                name,
                reason: "filter declares no operators",
            });
        }
        if self.filters.contains_key(&name) {
            return Err(GridError::InvalidFilterRegistration {
                name,
                reason: "a filter with this name is already registered",
            });
        }

        tracing::debug!(filter = %name, "registered filter");
        self.filters.insert(name, filter);
        Ok(())
    }

    /// Look up a filter by field name.
    pub fn get(&self, name: &str) -> Option<&dyn FilterDefinition> {
        self.filters.get(name).map(|f| f.as_ref())
    }

    /// Registered filter names, sorted.
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.filters.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    /// Check that every rule targets a registered filter with an allowed
    /// operator, without touching any query.
    pub fn validate(&self, rules: &[FilterRule]) -> Result<()> {
        for (filter, rules) in self.group(rules)? {
            filter.check_operators(&rules)?;
        }
        Ok(())
    }

    /// Apply all rules to `spec`.
    ///
    /// Rules are grouped by field (keeping request order inside each group)
    /// and each filter sees its whole group in one call. Every rule is
    /// validated before any filter runs.
    pub fn apply(&self, spec: QuerySpec, rules: &[FilterRule]) -> Result<QuerySpec> {
        let groups = self.group(rules)?;
        for (filter, rules) in &groups {
            filter.check_operators(rules)?;
        }

        groups
            .into_iter()
            .try_fold(spec, |spec, (filter, rules)| filter.extend_query(spec, &rules))
    }

    fn group(&self, rules: &[FilterRule]) -> Result<Vec<(&dyn FilterDefinition, Vec<FilterRule>)>> {
        let mut groups: Vec<(&dyn FilterDefinition, Vec<FilterRule>)> = Vec::new();

        for rule in rules {
            let filter = self
                .get(&rule.field)
                .ok_or_else(|| GridError::UnknownFilter(rule.field.clone()))?;

            match groups.iter_mut().find(|(f, _)| f.name() == rule.field) {
                Some((_, group)) => group.push(rule.clone()),
                None => groups.push((filter, vec![rule.clone()])),
            }
        }

        Ok(groups)
    }
}
