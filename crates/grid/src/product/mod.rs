//! Product catalog: model, repository, listing order and admin grid.

pub mod grid;
pub mod model;
pub mod ordering;
pub mod repository;

pub use grid::{ADMIN_PRODUCT_GRID_ID, admin_product_grid};
pub use model::{Product, ProductDomain, ProductListItem};
pub use ordering::{OrderingContext, OrderingMode, apply_ordering};
pub use repository::{ProductListQuery, ProductRepository};
