//! Product filters used by the administration product grid.

use sea_query::{Cond, ExprTrait, LikeExpr, SimpleExpr};

use crate::error::{GridError, Result};
use crate::query::{QuerySpec, col, escape_like_wildcards};

use super::registry::FilterDefinition;
use super::relation::{RelationFilter, RelationKind};
use super::types::{FilterOperator, FilterRule};

/// `productBrand`: the product's brand is / is not / is not set.
pub fn product_brand_filter() -> RelationFilter {
    RelationFilter::new(
        "productBrand",
        RelationKind::ManyToOne {
            table: "brand",
            foreign_key: "brand_id",
        },
        "b",
    )
}

/// `productCategory`: the product is / is not in a category, or in none.
pub fn product_category_filter() -> RelationFilter {
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

/// `productCatnum`: catalog number matching.
#[derive(Debug, Clone, Copy)]
pub struct ProductCatnumFilter;

impl ProductCatnumFilter {
    fn predicate(owner: &str, rule: &FilterRule) -> Result<SimpleExpr> {
        let catnum = || col(owner, "catnum");

        let expr = match rule.operator {
            FilterOperator::Is => catnum().eq(rule.require_string()?),
            FilterOperator::NotSet => catnum().is_null(),
            FilterOperator::Contains => catnum().like(contains_pattern(&rule.require_string()?)),
            FilterOperator::DoesntContain => Cond::any()
                .add(catnum().not_like(contains_pattern(&rule.require_string()?)))
                .add(catnum().is_null())
                .into(),
            operator => {
                return Err(GridError::UnsupportedOperator {
                    filter: "productCatnum".to_string(),
                    operator,
                });
            }
        };

        Ok(expr)
    }
}

fn contains_pattern(value: &str) -> LikeExpr {
    LikeExpr::new(format!("%{}%", escape_like_wildcards(value))).escape('\\')
}

impl FilterDefinition for ProductCatnumFilter {
    fn name(&self) -> &str {
        "productCatnum"
    }

    fn allowed_operators(&self) -> &[FilterOperator] {
        &[
            FilterOperator::Is,
            FilterOperator::Contains,
            FilterOperator::DoesntContain,
            FilterOperator::NotSet,
        ]
    }

    fn extend_query(&self, spec: QuerySpec, rules: &[FilterRule]) -> Result<QuerySpec> {
        let owner = spec.alias().to_string();
        rules.iter().try_fold(spec, |spec, rule| {
            Ok(spec.and_where(Self::predicate(&owner, rule)?))
        })
    }
}

/// `productPrice`: price comparisons.
#[derive(Debug, Clone, Copy)]
pub struct ProductPriceFilter;

impl FilterDefinition for ProductPriceFilter {
    fn name(&self) -> &str {
        "productPrice"
    }

    fn allowed_operators(&self) -> &[FilterOperator] {
        &[FilterOperator::Is, FilterOperator::Lt, FilterOperator::Gt]
    }

    fn extend_query(&self, spec: QuerySpec, rules: &[FilterRule]) -> Result<QuerySpec> {
        self.check_operators(rules)?;
        let owner = spec.alias().to_string();

        rules.iter().try_fold(spec, |spec, rule| {
            let price = rule.require_f64()?;
            let column = col(&owner, "price");
            let expr = match rule.operator {
                FilterOperator::Lt => column.lt(price),
                FilterOperator::Gt => column.gt(price),
                _ => column.eq(price),
            };
            Ok(spec.and_where(expr))
        })
    }
}
