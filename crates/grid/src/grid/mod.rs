//! Paginated, sortable, filterable grids.

pub mod engine;
pub mod paging;
pub mod state;
pub mod types;
pub mod view;

pub use engine::{ALLOWED_LIMITS, DEFAULT_LIMIT, GridEngine, GridPlan};
pub use paging::PaginationResult;
pub use state::QueryGridState;
pub use types::{ActionColumn, ColumnDefinition, GridResult, SortDirection};
pub use view::{GridView, GridViewRow, RowAction};
