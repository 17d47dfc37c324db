#![allow(clippy::unwrap_used, clippy::expect_used)]
//! Common test utilities for integration tests.
//!
//! Every test gets its own in-memory SQLite catalog and runs the real
//! engine through [`SqliteBackend`]. The seeded catalog is small enough to
//! state expected results by hand:
//!
//! | id | name          | brand  | price | category | visible on 1 |
//! |----|---------------|--------|-------|----------|--------------|
//! | 1  | Kettle        | Acme   | 30    | Kitchen  | yes          |
//! | 2  | Toaster       | Globex | 45    | Kitchen  | yes          |
//! | 3  | Blender       | Initech| 80    | Kitchen  | yes          |
//! | 4  | Mixer         | -      | 60    | Kitchen  | yes          |
//! | 5  | Spade         | Acme   | 25    | Garden   | yes          |
//! | 6  | Hose          | Globex | 15    | Garden   | yes          |
//! | 7  | Hidden Kettle | Acme   | 35    | Kitchen  | no           |
//! | 8  | Grill         | Initech| 200   | -        | yes          |

#![allow(dead_code)]

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;

use vitrine_grid::Result;
use vitrine_grid::backend::{FetchedPage, QueryBackend, SqliteBackend};
use vitrine_grid::filter::{FilterOperator, FilterRegistry, FilterRule, FilterValue};
use vitrine_grid::query::QuerySpec;
use vitrine_test_utils::{TestCatalog, test_product};

pub const ACME: i64 = 1;
pub const GLOBEX: i64 = 2;
pub const INITECH: i64 = 3;

pub const KITCHEN: i64 = 10;
pub const GARDEN: i64 = 20;

pub const DOMAIN: i64 = 1;
pub const PRICING_GROUP: i64 = 1;
pub const STANDARD_VAT: i64 = 1;

/// Catalog with the products from the module table.
pub async fn seeded_catalog() -> TestCatalog {
    let catalog = TestCatalog::new().await.unwrap();

    catalog.add_brand(ACME, "Acme").await.unwrap();
    catalog.add_brand(GLOBEX, "Globex").await.unwrap();
    catalog.add_brand(INITECH, "Initech").await.unwrap();
    catalog.add_vat(STANDARD_VAT, "Standard", 21.0).await.unwrap();
    catalog.add_category(KITCHEN, "Kitchen").await.unwrap();
    catalog.add_category(GARDEN, "Garden").await.unwrap();
    catalog
        .add_pricing_group(PRICING_GROUP, DOMAIN, "Ordinary customer")
        .await
        .unwrap();

    catalog
        .add_products(&[
            test_product(1, "Kettle")
                .with_brand(ACME)
                .with_vat(STANDARD_VAT)
                .with_price(30.0)
                .in_category(KITCHEN)
                .on_domain(2, false)
                .with_price_with_vat(PRICING_GROUP, 36.3),
            test_product(2, "Toaster")
                .with_brand(GLOBEX)
                .with_vat(STANDARD_VAT)
                .with_price(45.0)
                .in_category(KITCHEN)
                .with_price_with_vat(PRICING_GROUP, 54.45),
            test_product(3, "Blender")
                .with_catnum("BL-100%")
                .with_brand(INITECH)
                .with_price(80.0)
                .in_category(KITCHEN)
                .with_price_with_vat(PRICING_GROUP, 96.8),
            test_product(4, "Mixer")
                .with_price(60.0)
                .in_category(KITCHEN)
                .with_price_with_vat(PRICING_GROUP, 72.6),
            test_product(5, "Spade")
                .with_brand(ACME)
                .with_price(25.0)
                .in_category(GARDEN)
                .with_price_with_vat(PRICING_GROUP, 30.25),
            test_product(6, "Hose")
                .without_catnum()
                .with_brand(GLOBEX)
                .with_price(15.0)
                .in_category(GARDEN)
                .with_price_with_vat(PRICING_GROUP, 18.15),
            test_product(7, "Hidden Kettle")
                .with_brand(ACME)
                .with_price(35.0)
                .in_category(KITCHEN)
                .on_domain(DOMAIN, false)
                .with_price_with_vat(PRICING_GROUP, 40.0),
            test_product(8, "Grill")
                .with_brand(INITECH)
                .with_price(200.0)
                .with_price_with_vat(PRICING_GROUP, 242.0),
        ])
        .await
        .unwrap();

    catalog
}

pub fn backend(catalog: &TestCatalog) -> Arc<dyn QueryBackend> {
    Arc::new(SqliteBackend::new(catalog.pool().clone()))
}

pub fn registry() -> Arc<FilterRegistry> {
    Arc::new(FilterRegistry::with_product_filters().unwrap())
}

/// Rule with a string value, as it arrives from a request.
pub fn rule(field: &str, operator: FilterOperator, value: &str) -> FilterRule {
    FilterRule::new(field, operator, Some(FilterValue::String(value.to_string())))
}

/// Rule without a value (`not_set`).
pub fn flag(field: &str, operator: FilterOperator) -> FilterRule {
    FilterRule::new(field, operator, None)
}

/// Backend that fails the test when any statement reaches it.
pub struct UnreachableBackend;

#[async_trait]
impl QueryBackend for UnreachableBackend {
    async fn fetch_rows(&self, _spec: &QuerySpec) -> Result<Vec<Value>> {
        panic!("no statement expected")
    }

    async fn fetch_page(&self, _rows: &QuerySpec, _count: &QuerySpec) -> Result<FetchedPage> {
        panic!("no statement expected")
    }
}
