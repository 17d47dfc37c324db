//! Grid filters.
//!
//! Rules are `(field, operator, value)` triples. The [`FilterRegistry`]
//! routes each rule to the [`FilterDefinition`] registered under its field
//! name, which extends the query with joins and predicates.

pub mod product;
pub mod registry;
pub mod relation;
pub mod types;

pub use product::{
    ProductCatnumFilter, ProductPriceFilter, product_brand_filter, product_category_filter,
};
pub use registry::{FilterDefinition, FilterRegistry};
pub use relation::{RelationFilter, RelationKind};
pub use types::{FilterOperator, FilterRule, FilterValue};
