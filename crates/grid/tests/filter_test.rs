#![allow(clippy::unwrap_used, clippy::expect_used)]
//! Filter integration tests.
//!
//! Applies product filter rules through the admin product grid and checks
//! which catalog rows survive.

mod common;

use vitrine_grid::GridError;
use vitrine_grid::filter::{FilterOperator, FilterRule, FilterValue};
use vitrine_grid::grid::QueryGridState;
use vitrine_grid::product::admin_product_grid;
use vitrine_test_utils::row_ids;

use common::{backend, flag, registry, rule, seeded_catalog};

/// Ids of every product matching `rules`, in id order.
async fn matching_ids(rules: Vec<FilterRule>) -> Vec<i64> {
    let catalog = seeded_catalog().await;
    let grid = admin_product_grid(registry(), "en").unwrap();

    let state = rules
        .into_iter()
        .fold(QueryGridState::new().with_limit(100).unwrap(), |state, rule| {
            state.with_filter(rule)
        });

    let result = grid
        .execute(backend(&catalog).as_ref(), &state)
        .await
        .unwrap();

    let ids = row_ids(&result.rows);
    assert_eq!(result.total_count, Some(ids.len() as u64));
    ids
}

// -------------------------------------------------------------------------
// Brand (many-to-one)
// -------------------------------------------------------------------------

#[tokio::test]
async fn brand_is_either_of_two_brands() {
    let ids = matching_ids(vec![
        rule("productBrand", FilterOperator::Is, "1"),
        rule("productBrand", FilterOperator::Is, "2"),
    ])
    .await;
    assert_eq!(ids, vec![1, 2, 5, 6, 7]);
}

#[tokio::test]
async fn brand_is_not_excludes_every_listed_brand() {
    let ids = matching_ids(vec![
        rule("productBrand", FilterOperator::IsNot, "1"),
        rule("productBrand", FilterOperator::IsNot, "2"),
    ])
    .await;
    assert_eq!(ids, vec![3, 4, 8]);
}

#[tokio::test]
async fn brand_not_set() {
    let ids = matching_ids(vec![flag("productBrand", FilterOperator::NotSet)]).await;
    assert_eq!(ids, vec![4]);
}

#[tokio::test]
async fn brand_is_with_integer_value() {
    let ids = matching_ids(vec![FilterRule::new(
        "productBrand",
        FilterOperator::Is,
        Some(FilterValue::Integer(3)),
    )])
    .await;
    assert_eq!(ids, vec![3, 8]);
}

// -------------------------------------------------------------------------
// Category (many-to-many)
// -------------------------------------------------------------------------

#[tokio::test]
async fn category_is() {
    let ids = matching_ids(vec![rule("productCategory", FilterOperator::Is, "20")]).await;
    assert_eq!(ids, vec![5, 6]);
}

#[tokio::test]
async fn category_not_set() {
    let ids = matching_ids(vec![flag("productCategory", FilterOperator::NotSet)]).await;
    assert_eq!(ids, vec![8]);
}

#[tokio::test]
async fn category_is_not() {
    let ids = matching_ids(vec![rule("productCategory", FilterOperator::IsNot, "10")]).await;
    assert_eq!(ids, vec![5, 6, 8]);
}

// -------------------------------------------------------------------------
// Catalogue number
// -------------------------------------------------------------------------

#[tokio::test]
async fn catnum_contains() {
    let ids = matching_ids(vec![rule("productCatnum", FilterOperator::Contains, "CAT-1")]).await;
    assert_eq!(ids, vec![1]);
}

#[tokio::test]
async fn catnum_contains_treats_wildcards_literally() {
    let ids = matching_ids(vec![rule("productCatnum", FilterOperator::Contains, "100%")]).await;
    assert_eq!(ids, vec![3]);

    let ids = matching_ids(vec![rule("productCatnum", FilterOperator::Contains, "_")]).await;
    assert!(ids.is_empty());
}

#[tokio::test]
async fn catnum_doesnt_contain_includes_missing_catnum() {
    let ids = matching_ids(vec![rule(
        "productCatnum",
        FilterOperator::DoesntContain,
        "CAT",
    )])
    .await;
    assert_eq!(ids, vec![3, 6]);
}

#[tokio::test]
async fn catnum_not_set() {
    let ids = matching_ids(vec![flag("productCatnum", FilterOperator::NotSet)]).await;
    assert_eq!(ids, vec![6]);
}

// -------------------------------------------------------------------------
// Price
// -------------------------------------------------------------------------

#[tokio::test]
async fn price_lower_than() {
    let ids = matching_ids(vec![rule("productPrice", FilterOperator::Lt, "30")]).await;
    assert_eq!(ids, vec![5, 6]);
}

#[tokio::test]
async fn price_range() {
    let ids = matching_ids(vec![
        rule("productPrice", FilterOperator::Gt, "20"),
        rule("productPrice", FilterOperator::Lt, "50"),
    ])
    .await;
    assert_eq!(ids, vec![1, 2, 5, 7]);
}

#[tokio::test]
async fn price_is_exact() {
    let ids = matching_ids(vec![FilterRule::new(
        "productPrice",
        FilterOperator::Is,
        Some(FilterValue::Float(45.0)),
    )])
    .await;
    assert_eq!(ids, vec![2]);
}

// -------------------------------------------------------------------------
// Composition
// -------------------------------------------------------------------------

#[tokio::test]
async fn different_filters_are_combined_with_and() {
    let ids = matching_ids(vec![
        rule("productBrand", FilterOperator::Is, "1"),
        rule("productCategory", FilterOperator::Is, "10"),
    ])
    .await;
    assert_eq!(ids, vec![1, 7]);
}

#[tokio::test]
async fn brand_and_category_exclusions_together() {
    let ids = matching_ids(vec![
        rule("productCategory", FilterOperator::IsNot, "20"),
        rule("productBrand", FilterOperator::IsNot, "1"),
        flag("productBrand", FilterOperator::NotSet),
    ])
    .await;
    assert_eq!(ids, vec![4]);
}

#[tokio::test]
async fn unknown_filter_field_fails() {
    let catalog = seeded_catalog().await;
    let grid = admin_product_grid(registry(), "en").unwrap();
    let state = QueryGridState::new().with_filter(rule("productColor", FilterOperator::Is, "red"));

    let err = grid
        .execute(backend(&catalog).as_ref(), &state)
        .await
        .unwrap_err();
    assert!(matches!(err, GridError::UnknownFilter(ref field) if field == "productColor"));
}

#[tokio::test]
async fn non_numeric_brand_value_fails() {
    let catalog = seeded_catalog().await;
    let grid = admin_product_grid(registry(), "en").unwrap();
    let state = QueryGridState::new().with_filter(rule("productBrand", FilterOperator::Is, "Acme"));

    let err = grid
        .execute(backend(&catalog).as_ref(), &state)
        .await
        .unwrap_err();
    assert!(matches!(err, GridError::InvalidFilterValue { .. }));
}
