//! Vitrine test utilities.
//!
//! Helpers for integration testing: an in-memory SQLite catalog loaded with
//! the production schema, product fixture builders, and row assertions.

use serde_json::Value as JsonValue;
use sqlx::SqlitePool;
use sqlx::sqlite::SqlitePoolOptions;

/// Catalog schema shared with the production database.
pub const CATALOG_SCHEMA: &str = include_str!("../../grid/schema/catalog.sql");

/// Create a test product with default values.
///
/// Defaults: catalogue number `CAT-<id>`, price 100, visible on domain 1,
/// English name `name`, no brand, no categories.
pub fn test_product(id: i64, name: &str) -> TestProduct {
    TestProduct {
        id,
        catnum: Some(format!("CAT-{id}")),
        brand_id: None,
        vat_id: None,
        price: 100.0,
        hidden: false,
        names: vec![("en".to_string(), name.to_string())],
        domains: vec![(1, true)],
        categories: Vec::new(),
        calculated_prices: Vec::new(),
    }
}

/// A product builder for creating test fixtures.
#[derive(Debug, Clone)]
pub struct TestProduct {
    pub id: i64,
    pub catnum: Option<String>,
    pub brand_id: Option<i64>,
    pub vat_id: Option<i64>,
    pub price: f64,
    pub hidden: bool,
    /// `(locale, name)` translations.
    pub names: Vec<(String, String)>,
    /// `(domain_id, visible)` settings.
    pub domains: Vec<(i64, bool)>,
    pub categories: Vec<i64>,
    /// `(pricing_group_id, price_with_vat)`.
    pub calculated_prices: Vec<(i64, f64)>,
}

impl TestProduct {
    /// Set the catalogue number.
    pub fn with_catnum(mut self, catnum: &str) -> Self {
        self.catnum = Some(catnum.to_string());
        self
    }

    /// Leave the catalogue number empty.
    pub fn without_catnum(mut self) -> Self {
        self.catnum = None;
        self
    }

    /// Set the brand.
    pub fn with_brand(mut self, brand_id: i64) -> Self {
        self.brand_id = Some(brand_id);
        self
    }

    /// Set the VAT rate.
    pub fn with_vat(mut self, vat_id: i64) -> Self {
        self.vat_id = Some(vat_id);
        self
    }

    /// Set the base price.
    pub fn with_price(mut self, price: f64) -> Self {
        self.price = price;
        self
    }

    /// Mark as hidden.
    pub fn hidden(mut self) -> Self {
        self.hidden = true;
        self
    }

    /// Add a translated name.
    pub fn with_name(mut self, locale: &str, name: &str) -> Self {
        self.names.push((locale.to_string(), name.to_string()));
        self
    }

    /// Set visibility on a domain.
    pub fn on_domain(mut self, domain_id: i64, visible: bool) -> Self {
        self.domains.retain(|(d, _)| *d != domain_id);
        self.domains.push((domain_id, visible));
        self
    }

    /// Assign to a category.
    pub fn in_category(mut self, category_id: i64) -> Self {
        self.categories.push(category_id);
        self
    }

    /// Set the calculated price for a pricing group.
    pub fn with_price_with_vat(mut self, pricing_group_id: i64, price: f64) -> Self {
        self.calculated_prices.push((pricing_group_id, price));
        self
    }
}

/// An in-memory SQLite catalog.
///
/// Uses a single connection that never expires, so the database lives as
/// long as the pool.
#[derive(Clone)]
pub struct TestCatalog {
    pool: SqlitePool,
}

impl TestCatalog {
    /// Create an empty catalog with the schema loaded.
    pub async fn new() -> Result<Self, sqlx::Error> {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect("sqlite::memory:")
            .await?;

        sqlx::raw_sql(CATALOG_SCHEMA).execute(&pool).await?;

        Ok(Self { pool })
    }

    /// The underlying pool.
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    pub async fn add_brand(&self, id: i64, name: &str) -> Result<(), sqlx::Error> {
        sqlx::query("INSERT INTO brand (id, name) VALUES (?, ?)")
            .bind(id)
            .bind(name)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    pub async fn add_vat(&self, id: i64, name: &str, percent: f64) -> Result<(), sqlx::Error> {
        sqlx::query("INSERT INTO vat (id, name, percent) VALUES (?, ?, ?)")
            .bind(id)
            .bind(name)
            .bind(percent)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    pub async fn add_category(&self, id: i64, name: &str) -> Result<(), sqlx::Error> {
        sqlx::query("INSERT INTO category (id, parent_id, name) VALUES (?, NULL, ?)")
            .bind(id)
            .bind(name)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    pub async fn add_pricing_group(
        &self,
        id: i64,
        domain_id: i64,
        name: &str,
    ) -> Result<(), sqlx::Error> {
        sqlx::query("INSERT INTO pricing_group (id, domain_id, name) VALUES (?, ?, ?)")
            .bind(id)
            .bind(domain_id)
            .bind(name)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    /// Insert a product with its translations, domains, categories and
    /// calculated prices.
    pub async fn add_product(&self, product: &TestProduct) -> Result<(), sqlx::Error> {
        let mut tx = self.pool.begin().await?;

        sqlx::query(
            "INSERT INTO product (id, catnum, brand_id, vat_id, price, hidden) \
             VALUES (?, ?, ?, ?, ?, ?)",
        )
        .bind(product.id)
        .bind(product.catnum.as_deref())
        .bind(product.brand_id)
        .bind(product.vat_id)
        .bind(product.price)
        .bind(product.hidden)
        .execute(&mut *tx)
        .await?;

        for (locale, name) in &product.names {
            sqlx::query("INSERT INTO product_translation (product_id, locale, name) VALUES (?, ?, ?)")
                .bind(product.id)
                .bind(locale)
                .bind(name)
                .execute(&mut *tx)
                .await?;
        }

        for (domain_id, visible) in &product.domains {
            sqlx::query("INSERT INTO product_domain (product_id, domain_id, visible) VALUES (?, ?, ?)")
                .bind(product.id)
                .bind(domain_id)
                .bind(visible)
                .execute(&mut *tx)
                .await?;
        }

        for category_id in &product.categories {
            sqlx::query("INSERT INTO product_category (product_id, category_id) VALUES (?, ?)")
                .bind(product.id)
                .bind(category_id)
                .execute(&mut *tx)
                .await?;
        }

        for (pricing_group_id, price) in &product.calculated_prices {
            sqlx::query(
                "INSERT INTO product_calculated_price (product_id, pricing_group_id, price_with_vat) \
                 VALUES (?, ?, ?)",
            )
            .bind(product.id)
            .bind(pricing_group_id)
            .bind(price)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await
    }

    /// Insert several products.
    pub async fn add_products(&self, products: &[TestProduct]) -> Result<(), sqlx::Error> {
        for product in products {
            self.add_product(product).await?;
        }
        Ok(())
    }
}

/// The `id` field of each row, in order. Rows without an integer id are
/// skipped.
pub fn row_ids(rows: &[JsonValue]) -> Vec<i64> {
    rows.iter()
        .filter_map(|row| row.get("id").and_then(JsonValue::as_i64))
        .collect()
}
