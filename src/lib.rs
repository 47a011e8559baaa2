//! Storefront Catalog
//!
//! In-memory catalog query engine behind the storefront, plus the cart,
//! wishlist and review-eligibility pieces the storefront pages call into.
//!
//! ## Features
//! - Filtered, sorted, paginated product listings
//! - Free-text search and autocomplete suggestions
//! - Fixed category aggregates and related products
//! - Cart stock reservation and wishlists per session
//! - Review eligibility for delivered or paid orders

pub mod api;
pub mod catalog;
pub mod config;
pub mod domain;

pub use catalog::{CatalogService, CategorySummary, LoadError, ProductPage, ProductQuery, SortBy};
pub use config::Config;
pub use domain::aggregates::{Order, Product};

use thiserror::Error;

// =============================================================================
// Error Types
// =============================================================================

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CatalogError {
    #[error("Product {0} not found")]
    NotFound(u64),

    #[error("Invalid query: {0}")]
    Validation(String),
}

impl From<validator::ValidationErrors> for CatalogError {
    fn from(errors: validator::ValidationErrors) -> Self {
        CatalogError::Validation(errors.to_string())
    }
}

pub type Result<T> = std::result::Result<T, CatalogError>;
