//! Product listing ordering modes.
//!
//! Modes form a closed set. Each maps to one ORDER BY expression and every
//! ordering ends with `p.id ASC`, so ties sort the same way on every page.

use std::fmt;
use std::str::FromStr;

use sea_query::{ExprTrait, Order, SimpleExpr};
use serde::{Deserialize, Serialize};

use crate::error::{GridError, Result};
use crate::query::{JoinType, QuerySpec, col};

/// Alias of the product translation join.
pub const TRANSLATION_ALIAS: &str = "pt";

/// Alias of the calculated price join.
pub const PRICE_ALIAS: &str = "pcp";

/// How a product listing is ordered.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrderingMode {
    #[default]
    NameAsc,
    NameDesc,
    PriceAsc,
    PriceDesc,
}

impl OrderingMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            OrderingMode::NameAsc => "name_asc",
            OrderingMode::NameDesc => "name_desc",
            OrderingMode::PriceAsc => "price_asc",
            OrderingMode::PriceDesc => "price_desc",
        }
    }
}

impl fmt::Display for OrderingMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OrderingMode {
    type Err = GridError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "name_asc" => Ok(OrderingMode::NameAsc),
            "name_desc" => Ok(OrderingMode::NameDesc),
            "price_asc" => Ok(OrderingMode::PriceAsc),
            "price_desc" => Ok(OrderingMode::PriceDesc),
            other => Err(GridError::UnsupportedOrderingMode(other.to_string())),
        }
    }
}

/// Parameters the ordering expressions depend on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderingContext {
    /// Locale of the product names sorted by.
    pub locale: String,
    /// Pricing group whose calculated prices are sorted by.
    pub pricing_group_id: i64,
}

/// Join the product translation for `locale` unless already joined.
pub fn join_translation(spec: QuerySpec, join_type: JoinType, locale: &str) -> QuerySpec {
    if spec.has_join(TRANSLATION_ALIAS) {
        return spec;
    }
    let owner = spec.alias().to_string();
    let on = col(TRANSLATION_ALIAS, "product_id")
        .eq(col(&owner, "id"))
        .and(col(TRANSLATION_ALIAS, "locale").eq(locale));
    spec.join(join_type, "product_translation", TRANSLATION_ALIAS, on)
}

/// Left-join the calculated price for a pricing group unless already joined.
pub fn join_calculated_price(spec: QuerySpec, pricing_group_id: i64) -> QuerySpec {
    if spec.has_join(PRICE_ALIAS) {
        return spec;
    }
    let owner = spec.alias().to_string();
    let on = col(PRICE_ALIAS, "product_id")
        .eq(col(&owner, "id"))
        .and(col(PRICE_ALIAS, "pricing_group_id").eq(pricing_group_id));
    spec.join(JoinType::Left, "product_calculated_price", PRICE_ALIAS, on)
}

/// Order `spec` by `mode`, replacing any previous ordering.
pub fn apply_ordering(spec: QuerySpec, mode: OrderingMode, ctx: &OrderingContext) -> QuerySpec {
    let (spec, expr, order): (QuerySpec, SimpleExpr, Order) = match mode {
        OrderingMode::NameAsc | OrderingMode::NameDesc => {
            let spec = join_translation(spec, JoinType::Left, &ctx.locale);
            let order = if mode == OrderingMode::NameAsc {
                Order::Asc
            } else {
                Order::Desc
            };
            (spec, col(TRANSLATION_ALIAS, "name").into(), order)
        }
        OrderingMode::PriceAsc | OrderingMode::PriceDesc => {
            let spec = join_calculated_price(spec, ctx.pricing_group_id);
            let order = if mode == OrderingMode::PriceAsc {
                Order::Asc
            } else {
                Order::Desc
            };
            (spec, col(PRICE_ALIAS, "price_with_vat").into(), order)
        }
    };

    let owner = spec.alias().to_string();
    spec.reorder_by(expr, order)
        .order_by(col(&owner, "id"), Order::Asc)
}
