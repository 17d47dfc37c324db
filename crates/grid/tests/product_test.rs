#![allow(clippy::unwrap_used, clippy::expect_used)]
//! Product repository integration tests.
//!
//! Lookups, domain visibility and storefront category listings against an
//! in-memory SQLite catalog.

mod common;

use vitrine_grid::GridError;
use vitrine_grid::filter::FilterOperator;
use vitrine_grid::product::{OrderingMode, ProductListQuery, ProductRepository};
use vitrine_test_utils::{TestCatalog, test_product};

use common::{
    ACME, DOMAIN, KITCHEN, PRICING_GROUP, STANDARD_VAT, backend, registry, rule, seeded_catalog,
};

fn repository(catalog: &TestCatalog) -> ProductRepository {
    ProductRepository::new(backend(catalog), registry())
}

fn kitchen_listing(ordering: OrderingMode) -> ProductListQuery {
    ProductListQuery {
        domain_id: DOMAIN,
        locale: "en".to_string(),
        ordering,
        page: 1,
        limit: 10,
        category_id: KITCHEN,
        pricing_group_id: PRICING_GROUP,
        filter_rules: Vec::new(),
    }
}

// -------------------------------------------------------------------------
// Lookups
// -------------------------------------------------------------------------

#[tokio::test]
async fn find_by_id_decodes_product() {
    let catalog = seeded_catalog().await;
    let product = repository(&catalog).find_by_id(1).await.unwrap().unwrap();

    assert_eq!(product.id, 1);
    assert_eq!(product.catnum.as_deref(), Some("CAT-1"));
    assert_eq!(product.brand_id, Some(ACME));
    assert_eq!(product.vat_id, Some(STANDARD_VAT));
    assert_eq!(product.price, 30.0);
    assert!(!product.hidden);
}

#[tokio::test]
async fn find_by_id_missing_is_none() {
    let catalog = seeded_catalog().await;
    assert!(repository(&catalog).find_by_id(999).await.unwrap().is_none());
}

#[tokio::test]
async fn get_by_id_missing_is_not_found() {
    let catalog = seeded_catalog().await;
    let err = repository(&catalog).get_by_id(999).await.unwrap_err();

    assert!(err.is_not_found());
    assert_eq!(err.to_string(), "product '999' not found");
}

#[tokio::test]
async fn hidden_flag_decodes_from_sqlite_integer() {
    let catalog = TestCatalog::new().await.unwrap();
    catalog
        .add_product(&test_product(1, "Secret").hidden())
        .await
        .unwrap();

    let product = repository(&catalog).get_by_id(1).await.unwrap();
    assert!(product.hidden);
}

#[tokio::test]
async fn all_products_in_id_order() {
    let catalog = seeded_catalog().await;
    let ids: Vec<i64> = repository(&catalog)
        .all()
        .await
        .unwrap()
        .iter()
        .map(|p| p.id)
        .collect();
    assert_eq!(ids, vec![1, 2, 3, 4, 5, 6, 7, 8]);
}

#[tokio::test]
async fn all_by_vat() {
    let catalog = seeded_catalog().await;
    let ids: Vec<i64> = repository(&catalog)
        .all_by_vat(STANDARD_VAT)
        .await
        .unwrap()
        .iter()
        .map(|p| p.id)
        .collect();
    assert_eq!(ids, vec![1, 2]);
}

// -------------------------------------------------------------------------
// Domain visibility
// -------------------------------------------------------------------------

#[tokio::test]
async fn visible_products_exclude_invisible_ones() {
    let catalog = seeded_catalog().await;
    let ids: Vec<i64> = repository(&catalog)
        .visible_products_by_domain(DOMAIN)
        .await
        .unwrap()
        .iter()
        .map(|p| p.id)
        .collect();
    assert_eq!(ids, vec![1, 2, 3, 4, 5, 6, 8]);
}

#[tokio::test]
async fn no_products_visible_on_unknown_domain() {
    let catalog = seeded_catalog().await;
    let products = repository(&catalog)
        .visible_products_by_domain(42)
        .await
        .unwrap();
    assert!(products.is_empty());
}

#[tokio::test]
async fn get_visible_by_id_and_domain() {
    let catalog = seeded_catalog().await;
    let repository = repository(&catalog);

    let product = repository
        .get_visible_by_id_and_domain(1, DOMAIN)
        .await
        .unwrap();
    assert_eq!(product.id, 1);

    let err = repository
        .get_visible_by_id_and_domain(7, DOMAIN)
        .await
        .unwrap_err();
    assert!(matches!(err, GridError::EntityNotFound { entity: "product", ref key } if key == "7"));

    // Kettle exists on domain 2 but is not visible there.
    let err = repository.get_visible_by_id_and_domain(1, 2).await.unwrap_err();
    assert!(err.is_not_found());
}

#[tokio::test]
async fn find_product_domain() {
    let catalog = seeded_catalog().await;
    let repository = repository(&catalog);

    let domain = repository.find_product_domain(7, DOMAIN).await.unwrap().unwrap();
    assert_eq!(domain.product_id, 7);
    assert!(!domain.visible);

    assert!(repository.find_product_domain(2, 2).await.unwrap().is_none());
}

#[tokio::test]
async fn product_domains_by_product() {
    let catalog = seeded_catalog().await;
    let domains = repository(&catalog).product_domains_by_product(1).await.unwrap();

    let settings: Vec<(i64, bool)> = domains.iter().map(|d| (d.domain_id, d.visible)).collect();
    assert_eq!(settings, vec![(1, true), (2, false)]);
}

// -------------------------------------------------------------------------
// Category listings
// -------------------------------------------------------------------------

#[tokio::test]
async fn listing_ordered_by_price() {
    let catalog = seeded_catalog().await;
    let repository = repository(&catalog);

    let result = repository
        .pagination_result_in_category(&kitchen_listing(OrderingMode::PriceAsc))
        .await
        .unwrap();
    let ids: Vec<i64> = result.results.iter().map(|p| p.id).collect();
    assert_eq!(ids, vec![1, 2, 4, 3]);
    assert_eq!(result.total_count, 4);
    assert_eq!(result.page_count, 1);
    assert_eq!(result.results[0].price_with_vat, Some(36.3));
    assert_eq!(result.results[0].name.as_deref(), Some("Kettle"));

    let result = repository
        .pagination_result_in_category(&kitchen_listing(OrderingMode::PriceDesc))
        .await
        .unwrap();
    let ids: Vec<i64> = result.results.iter().map(|p| p.id).collect();
    assert_eq!(ids, vec![3, 4, 2, 1]);
}

#[tokio::test]
async fn listing_ordered_by_name() {
    let catalog = seeded_catalog().await;
    let repository = repository(&catalog);

    let result = repository
        .pagination_result_in_category(&kitchen_listing(OrderingMode::NameAsc))
        .await
        .unwrap();
    let names: Vec<_> = result
        .results
        .iter()
        .map(|p| p.name.clone().unwrap_or_default())
        .collect();
    assert_eq!(names, vec!["Blender", "Kettle", "Mixer", "Toaster"]);

    let result = repository
        .pagination_result_in_category(&kitchen_listing(OrderingMode::NameDesc))
        .await
        .unwrap();
    let ids: Vec<i64> = result.results.iter().map(|p| p.id).collect();
    assert_eq!(ids, vec![2, 4, 1, 3]);
}

#[tokio::test]
async fn listing_applies_filter_rules() {
    let catalog = seeded_catalog().await;
    let mut query = kitchen_listing(OrderingMode::PriceAsc);
    query.filter_rules = vec![rule("productBrand", FilterOperator::Is, "1")];

    let result = repository(&catalog)
        .pagination_result_in_category(&query)
        .await
        .unwrap();
    let ids: Vec<i64> = result.results.iter().map(|p| p.id).collect();
    assert_eq!(ids, vec![1]);
    assert_eq!(result.total_count, 1);
}

#[tokio::test]
async fn listing_page_past_the_end() {
    let catalog = seeded_catalog().await;
    let mut query = kitchen_listing(OrderingMode::PriceAsc);
    query.limit = 3;
    query.page = 4;

    let result = repository(&catalog)
        .pagination_result_in_category(&query)
        .await
        .unwrap();
    assert!(result.results.is_empty());
    assert_eq!(result.page_count, 2);
    assert_eq!(result.page, 2);
    assert!(!result.has_next());
}

#[tokio::test]
async fn paged_price_listing_is_stable_across_ties() {
    const CATEGORY: i64 = 30;
    let catalog = TestCatalog::new().await.unwrap();
    catalog.add_category(CATEGORY, "Tools").await.unwrap();
    catalog
        .add_pricing_group(PRICING_GROUP, DOMAIN, "Ordinary customer")
        .await
        .unwrap();

    let prices = [50.0, 20.0, 50.0, 20.0, 70.0, 50.0, 10.0];
    let products: Vec<_> = prices
        .iter()
        .zip(101..)
        .map(|(price, id)| {
            test_product(id, "Tool")
                .in_category(CATEGORY)
                .with_price_with_vat(PRICING_GROUP, *price)
        })
        .collect();
    catalog.add_products(&products).await.unwrap();

    let repository = repository(&catalog);
    let listing = |page, limit| ProductListQuery {
        domain_id: DOMAIN,
        locale: "en".to_string(),
        ordering: OrderingMode::PriceDesc,
        page,
        limit,
        category_id: CATEGORY,
        pricing_group_id: PRICING_GROUP,
        filter_rules: Vec::new(),
    };

    let mut paged = Vec::new();
    for page in 1..=3 {
        let result = repository
            .pagination_result_in_category(&listing(page, 3))
            .await
            .unwrap();
        assert_eq!(result.page_count, 3);
        paged.extend(result.results.iter().map(|p| p.id));
    }

    let unpaged: Vec<i64> = repository
        .pagination_result_in_category(&listing(1, 100))
        .await
        .unwrap()
        .results
        .iter()
        .map(|p| p.id)
        .collect();

    assert_eq!(unpaged, vec![105, 101, 103, 106, 102, 104, 107]);
    assert_eq!(paged, unpaged);
}

#[test]
fn unsupported_ordering_mode_is_rejected() {
    let err = "PRICE_DESC".parse::<OrderingMode>().unwrap_err();
    assert!(matches!(err, GridError::UnsupportedOrderingMode(ref mode) if mode == "PRICE_DESC"));
    assert_eq!("price_desc".parse::<OrderingMode>().unwrap(), OrderingMode::PriceDesc);
}
