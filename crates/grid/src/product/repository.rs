//! Product catalog queries.
//!
//! List methods return [`QuerySpec`] values where callers compose further
//! (grids, listings); lookup methods execute immediately and decode rows.

use std::sync::Arc;

use sea_query::{ExprTrait, Order};
use serde::de::DeserializeOwned;

use crate::backend::QueryBackend;
use crate::error::{GridError, Result};
use crate::filter::{FilterRegistry, FilterRule};
use crate::grid::PaginationResult;
use crate::grid::paging;
use crate::query::{ColumnExpr, JoinType, QuerySpec, col};

use super::model::{Product, ProductDomain, ProductListItem};
use super::ordering::{
    OrderingContext, OrderingMode, PRICE_ALIAS, TRANSLATION_ALIAS, apply_ordering,
    join_calculated_price, join_translation,
};

/// Parameters of a storefront category listing.
#[derive(Debug, Clone)]
pub struct ProductListQuery {
    pub domain_id: i64,
    pub locale: String,
    pub ordering: OrderingMode,
    pub page: u64,
    pub limit: u64,
    pub category_id: i64,
    pub pricing_group_id: i64,
    /// Advanced-search rules, applied through the filter registry.
    pub filter_rules: Vec<FilterRule>,
}

/// Product queries over a [`QueryBackend`].
#[derive(Clone)]
pub struct ProductRepository {
    backend: Arc<dyn QueryBackend>,
    filters: Arc<FilterRegistry>,
}

impl ProductRepository {
    pub fn new(backend: Arc<dyn QueryBackend>, filters: Arc<FilterRegistry>) -> Self {
        Self { backend, filters }
    }

    fn products() -> QuerySpec {
        QuerySpec::new("product", "p")
    }

    pub async fn find_by_id(&self, id: i64) -> Result<Option<Product>> {
        let spec = Self::products().and_where(col("p", "id").eq(id));
        self.fetch_one(&spec).await
    }

    /// Like [`find_by_id`](Self::find_by_id), but a missing product is an error.
    pub async fn get_by_id(&self, id: i64) -> Result<Product> {
        self.find_by_id(id).await?.ok_or_else(|| not_found(id))
    }

    /// Every product, ordered by id.
    pub async fn all(&self) -> Result<Vec<Product>> {
        let spec = Self::products().order_by(col("p", "id"), Order::Asc);
        self.fetch_all(&spec).await
    }

    /// Products using a VAT rate, ordered by id.
    pub async fn all_by_vat(&self, vat_id: i64) -> Result<Vec<Product>> {
        let spec = Self::products()
            .and_where(col("p", "vat_id").eq(vat_id))
            .order_by(col("p", "id"), Order::Asc);
        self.fetch_all(&spec).await
    }

    /// Products visible on a domain, ordered by id.
    pub fn all_visible_by_domain(&self, domain_id: i64) -> QuerySpec {
        Self::products()
            .join(
                JoinType::Inner,
                "product_domain",
                "pd",
                col("pd", "product_id").equals(("p", "id")),
            )
            .and_where(col("pd", "domain_id").eq(domain_id))
            .and_where(col("pd", "visible").eq(true))
            .order_by(col("p", "id"), Order::Asc)
    }

    /// Products visible on a domain and assigned to a category.
    pub fn visible_by_domain_and_category(&self, domain_id: i64, category_id: i64) -> QuerySpec {
        self.all_visible_by_domain(domain_id).join(
            JoinType::Inner,
            "product_category",
            "pc",
            col("pc", "product_id")
                .equals(("p", "id"))
                .and(col("pc", "category_id").eq(category_id)),
        )
    }

    pub async fn visible_products_by_domain(&self, domain_id: i64) -> Result<Vec<Product>> {
        self.fetch_all(&self.all_visible_by_domain(domain_id)).await
    }

    /// A product visible on the domain; hidden or absent products are
    /// [`GridError::EntityNotFound`].
    pub async fn get_visible_by_id_and_domain(&self, id: i64, domain_id: i64) -> Result<Product> {
        let spec = self
            .all_visible_by_domain(domain_id)
            .and_where(col("p", "id").eq(id));
        self.fetch_one(&spec).await?.ok_or_else(|| not_found(id))
    }

    pub async fn find_product_domain(
        &self,
        product_id: i64,
        domain_id: i64,
    ) -> Result<Option<ProductDomain>> {
        let spec = QuerySpec::new("product_domain", "pd")
            .and_where(col("pd", "product_id").eq(product_id))
            .and_where(col("pd", "domain_id").eq(domain_id));
        self.fetch_one(&spec).await
    }

    /// Domain settings of a product, ordered by domain.
    pub async fn product_domains_by_product(&self, product_id: i64) -> Result<Vec<ProductDomain>> {
        let spec = QuerySpec::new("product_domain", "pd")
            .and_where(col("pd", "product_id").eq(product_id))
            .order_by(col("pd", "domain_id"), Order::Asc);
        self.fetch_all(&spec).await
    }

    /// Build the listing query without paging.
    pub fn list_query(&self, query: &ProductListQuery) -> Result<QuerySpec> {
        let spec = self.visible_by_domain_and_category(query.domain_id, query.category_id);
        let spec = join_translation(spec, JoinType::Inner, &query.locale);
        let spec = join_calculated_price(spec, query.pricing_group_id);
        let spec = self.filters.apply(spec, &query.filter_rules)?;

        let ctx = OrderingContext {
            locale: query.locale.clone(),
            pricing_group_id: query.pricing_group_id,
        };

        Ok(apply_ordering(spec, query.ordering, &ctx)
            .select_as(col("p", "id"), "id")
            .select_as(col("p", "catnum"), "catnum")
            .select_as(col(TRANSLATION_ALIAS, "name"), "name")
            .select_as(col("p", "brand_id"), "brand_id")
            .select_as(col(PRICE_ALIAS, "price_with_vat"), "price_with_vat"))
    }

    /// One page of a category listing.
    ///
    /// As with grids, a page past the end yields no results and the
    /// clamped page number.
    pub async fn pagination_result_in_category(
        &self,
        query: &ProductListQuery,
    ) -> Result<PaginationResult<ProductListItem>> {
        paging::check_page_value("page", query.page)?;
        paging::check_page_value("limit", query.limit)?;
        let offset = paging::offset(query.page, query.limit)?;

        let spec = self.list_query(query)?;
        let key = ColumnExpr::parse("p.id")?;
        let count = spec.count_spec(Some(&key));
        let rows = spec.paged(query.limit, offset);

        let fetched = self.backend.fetch_page(&rows, &count).await?;
        let results = fetched
            .rows
            .into_iter()
            .map(serde_json::from_value)
            .collect::<std::result::Result<Vec<ProductListItem>, _>>()?;

        tracing::debug!(
            domain = query.domain_id,
            category = query.category_id,
            ordering = %query.ordering,
            total = fetched.total_count,
            "product listing fetched"
        );

        Ok(PaginationResult::new(
            query.page,
            query.limit,
            fetched.total_count,
            results,
        ))
    }

    async fn fetch_one<T: DeserializeOwned>(&self, spec: &QuerySpec) -> Result<Option<T>> {
        match self.backend.fetch_optional(spec).await? {
            Some(row) => Ok(Some(serde_json::from_value(row)?)),
            None => Ok(None),
        }
    }

    async fn fetch_all<T: DeserializeOwned>(&self, spec: &QuerySpec) -> Result<Vec<T>> {
        self.backend
            .fetch_rows(spec)
            .await?
            .into_iter()
            .map(|row| serde_json::from_value(row).map_err(GridError::from))
            .collect()
    }
}

fn not_found(id: i64) -> GridError {
    GridError::EntityNotFound {
        entity: "product",
        key: id.to_string(),
    }
}
