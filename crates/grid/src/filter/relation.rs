//! Relation filters: "is / is not / not set" over a related entity.
//!
//! Rule composition for one relation:
//! - `is` rules each get their own uniquely aliased LEFT JOIN
//!   (`{prefix}{index}`) and are OR-combined, so two `is` rules select the
//!   union of both matches.
//! - `is_not` values are accumulated and applied once as
//!   `owner.id NOT IN (subquery matching any excluded value)`, so a row is
//!   excluded when it matches any of them.
//! - `not_set` rules require the relation to be empty.

use sea_query::{Alias, Cond, ExprTrait, Query, SelectStatement, SimpleExpr};

use crate::error::Result;
use crate::query::{JoinType, QuerySpec, col};

use super::registry::FilterDefinition;
use super::types::{FilterOperator, FilterRule};

const RELATION_OPERATORS: &[FilterOperator] = &[
    FilterOperator::Is,
    FilterOperator::IsNot,
    FilterOperator::NotSet,
];

/// How the owner row reaches the related entity.
#[derive(Debug, Clone)]
pub enum RelationKind {
    /// A nullable foreign key on the owner table (`product.brand_id`).
    ManyToOne {
        /// Related table (`brand`).
        table: &'static str,
        /// Foreign key column on the owner (`brand_id`).
        foreign_key: &'static str,
    },
    /// A link table (`product_category(product_id, category_id)`).
    ManyToMany {
        /// Link table name.
        link_table: &'static str,
        /// Link column pointing at the owner.
        owner_column: &'static str,
        /// Link column pointing at the related entity.
        target_column: &'static str,
    },
}

/// Filter over a relation of the grid's base entity.
#[derive(Debug, Clone)]
pub struct RelationFilter {
    name: &'static str,
    kind: RelationKind,
    alias_prefix: &'static str,
}

impl RelationFilter {
    pub fn new(name: &'static str, kind: RelationKind, alias_prefix: &'static str) -> Self {
        Self {
            name,
            kind,
            alias_prefix,
        }
    }

    /// Join for the `index`-th `is` rule, plus the expression that is
    /// non-NULL exactly when that join matched.
    fn match_join(
        &self,
        spec: QuerySpec,
        owner: &str,
        index: usize,
        value: i64,
    ) -> (QuerySpec, SimpleExpr) {
        let alias = format!("{}{index}", self.alias_prefix);

        match &self.kind {
            RelationKind::ManyToOne { table, foreign_key } => {
                let on = col(&alias, "id")
                    .eq(col(owner, foreign_key))
                    .and(col(&alias, "id").eq(value));
                let matched = col(&alias, "id").is_not_null();
                (spec.join(JoinType::Left, table, &alias, on), matched)
            }
            RelationKind::ManyToMany {
                link_table,
                owner_column,
                target_column,
            } => {
                let on = col(&alias, owner_column)
                    .eq(col(owner, "id"))
                    .and(col(&alias, target_column).eq(value));
                let matched = col(&alias, owner_column).is_not_null();
                (spec.join(JoinType::Left, link_table, &alias, on), matched)
            }
        }
    }

    /// Owner ids related to any of `values`.
    fn related_ids(&self, owner_table: &str, values: Vec<i64>) -> SelectStatement {
        let mut query = Query::select();

        match &self.kind {
            RelationKind::ManyToOne { table, foreign_key } => {
                let owner_alias = format!("{}_p", self.alias_prefix);
                query
                    .expr(col(&owner_alias, "id"))
                    .from_as(Alias::new(owner_table), Alias::new(&owner_alias))
                    .join_as(
                        sea_query::JoinType::InnerJoin,
                        Alias::new(*table),
                        Alias::new("_f"),
                        col("_f", "id").eq(col(&owner_alias, foreign_key)),
                    )
                    .and_where(col("_f", "id").is_in(values));
            }
            RelationKind::ManyToMany {
                link_table,
                owner_column,
                target_column,
            } => {
                query
                    .expr(col("_f", owner_column))
                    .from_as(Alias::new(*link_table), Alias::new("_f"))
                    .and_where(col("_f", target_column).is_in(values));
            }
        }

        query
    }

    /// Predicate that holds when the owner has no related entity.
    fn not_set(&self, owner: &str) -> SimpleExpr {
        match &self.kind {
            RelationKind::ManyToOne { foreign_key, .. } => col(owner, foreign_key).is_null(),
            RelationKind::ManyToMany {
                link_table,
                owner_column,
                ..
            } => {
                let mut linked = Query::select();
                linked
                    .expr(col("_n", owner_column))
                    .from_as(Alias::new(*link_table), Alias::new("_n"));
                col(owner, "id").not_in_subquery(linked)
            }
        }
    }
}

impl FilterDefinition for RelationFilter {
    fn name(&self) -> &str {
        self.name
    }

    fn allowed_operators(&self) -> &[FilterOperator] {
        RELATION_OPERATORS
    }

    fn extend_query(&self, spec: QuerySpec, rules: &[FilterRule]) -> Result<QuerySpec> {
        let owner = spec.alias().to_string();
        let owner_table = spec.table().to_string();

        let mut spec = spec;
        let mut matched = Vec::new();
        let mut excluded = Vec::new();

        for (index, rule) in rules.iter().enumerate() {
            match rule.operator {
                FilterOperator::NotSet => {
                    spec = spec.and_where(self.not_set(&owner));
                }
                FilterOperator::Is => {
                    let (joined, expr) = self.match_join(spec, &owner, index, rule.require_i64()?);
                    spec = joined;
                    matched.push(expr);
                }
                FilterOperator::IsNot => excluded.push(rule.require_i64()?),
                _ => self.check_operators(std::slice::from_ref(rule))?,
            }
        }

        if !matched.is_empty() {
            let any = matched
                .into_iter()
                .fold(Cond::any(), |cond, expr| cond.add(expr));
            spec = spec.and_where(any.into());
        }

        if !excluded.is_empty() {
            let related = self.related_ids(&owner_table, excluded);
            spec = spec.and_where(col(&owner, "id").not_in_subquery(related));
        }

        Ok(spec)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filter::FilterValue;
    use sea_query::PostgresQueryBuilder;

    fn brand() -> RelationFilter {
        RelationFilter::new(
            "productBrand",
            RelationKind::ManyToOne {
                table: "brand",
                foreign_key: "brand_id",
            },
            "b",
        )
    }

    fn category() -> RelationFilter {
        RelationFilter::new(
            "productCategory",
            RelationKind::ManyToMany {
                link_table: "product_category",
                owner_column: "product_id",
                target_column: "category_id",
            },
            "c",
        )
    }

    fn rule(operator: FilterOperator, value: i64) -> FilterRule {
        FilterRule::new("productBrand", operator, Some(FilterValue::Integer(value)))
    }

    fn sql(filter: &RelationFilter, rules: &[FilterRule]) -> String {
        filter
            .extend_query(QuerySpec::new("product", "p"), rules)
            .unwrap()
            .to_select()
            .to_string(PostgresQueryBuilder)
    }

    #[test]
    fn is_rules_get_unique_joins_and_are_or_combined() {
        let sql = sql(
            &brand(),
            &[rule(FilterOperator::Is, 1), rule(FilterOperator::Is, 2)],
        );

        assert!(sql.contains(r#"LEFT JOIN "brand" AS "b0""#), "{sql}");
        assert!(sql.contains(r#"LEFT JOIN "brand" AS "b1""#), "{sql}");
        assert!(
            sql.contains(r#""b0"."id" IS NOT NULL OR "b1"."id" IS NOT NULL"#),
            "{sql}"
        );
    }

    #[test]
    fn is_not_rules_collapse_into_one_exclusion() {
        let sql = sql(
            &brand(),
            &[rule(FilterOperator::IsNot, 1), rule(FilterOperator::IsNot, 2)],
        );

        assert_eq!(sql.matches("NOT IN").count(), 1, "{sql}");
        assert!(sql.contains(r#""_f"."id" IN (1, 2)"#), "{sql}");
        assert!(sql.contains(r#"FROM "product" AS "b_p""#), "{sql}");
    }

    #[test]
    fn not_set_on_foreign_key() {
        let rules = [FilterRule::new("productBrand", FilterOperator::NotSet, None)];
        let sql = sql(&brand(), &rules);
        assert!(sql.contains(r#""p"."brand_id" IS NULL"#), "{sql}");
    }

    #[test]
    fn category_rules_use_the_link_table() {
        let sql = sql(
            &category(),
            &[
                rule(FilterOperator::Is, 5),
                rule(FilterOperator::IsNot, 6),
                FilterRule::new("productCategory", FilterOperator::NotSet, None),
            ],
        );

        assert!(sql.contains(r#"LEFT JOIN "product_category" AS "c0""#), "{sql}");
        assert!(sql.contains(r#""c0"."category_id" = 5"#), "{sql}");
        assert!(sql.contains(r#""_f"."category_id" IN (6)"#), "{sql}");
        assert!(sql.contains(r#"FROM "product_category" AS "_n""#), "{sql}");
    }

    #[test]
    fn non_numeric_value_is_rejected() {
        let rules = [FilterRule::new(
            "productBrand",
            FilterOperator::Is,
            Some(FilterValue::String("acme".to_string())),
        )];
        let err = brand()
            .extend_query(QuerySpec::new("product", "p"), &rules)
            .unwrap_err();
        assert!(matches!(err, crate::GridError::InvalidFilterValue { .. }));
    }

    #[test]
    fn contains_is_not_a_relation_operator() {
        let rules = [FilterRule::new(
            "productBrand",
            FilterOperator::Contains,
            Some(FilterValue::Integer(1)),
        )];
        assert!(brand().check_operators(&rules).is_err());
    }
}
