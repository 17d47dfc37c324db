//! Vitrine catalog grids.
//!
//! A dynamic query engine for storefront and administration product lists:
//! declarative columns and filters plus request-supplied paging, sorting and
//! filter rules, compiled to parameterized SQL through an immutable
//! [`QuerySpec`](query::QuerySpec).
//!
//! The `vitrine` binary is a thin operator CLI over this library.

pub mod backend;
pub mod config;
pub mod db;
pub mod error;
pub mod filter;
pub mod grid;
pub mod product;
pub mod query;

pub use error::{GridError, Result};
