//! Administration product list grid.

use std::sync::Arc;

use sea_query::Order;

use crate::error::Result;
use crate::filter::FilterRegistry;
use crate::grid::GridEngine;
use crate::query::{JoinType, QuerySpec, col};

use super::ordering::join_translation;

/// Grid id, also the request parameter namespace (`q[product_list][...]`).
pub const ADMIN_PRODUCT_GRID_ID: &str = "product_list";

/// Build the admin product grid with names in `locale`.
pub fn admin_product_grid(filters: Arc<FilterRegistry>, locale: &str) -> Result<GridEngine> {
    let base = join_translation(QuerySpec::new("product", "p"), JoinType::Left, locale)
        .order_by(col("p", "id"), Order::Asc);

    let mut grid = GridEngine::new(ADMIN_PRODUCT_GRID_ID, filters);
    grid.set_base_query(base, Some("p.id"))?;
    grid.enable_paging()?;

    grid.add_column("id", "p.id", "ID", false)?;
    grid.add_column("catnum", "p.catnum", "Catalogue number", true)?;
    grid.add_column("name", "pt.name", "Name", true)?;
    grid.add_column("price", "p.price", "Price", true)?;

    grid.add_action_column("edit", "Edit", "admin_product_edit", &[("id", "id")], &[]);
    grid.add_action_column("delete", "Delete", "admin_product_delete", &[("id", "id")], &[]);

    Ok(grid)
}
