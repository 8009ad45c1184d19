//! # Catalog Commands
//!
//! Shop page browsing. The catalog is static, so none of these touch the
//! document store or need a session.
//!
//! ## Shop Page Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Filter sidebar change ──► update_filter(current, update) ──► state    │
//! │                                      │                                  │
//! │                                      ▼                                  │
//! │  browse_catalog(config, state, page)                                    │
//! │      └── filter_products ──► paginate(page, products_per_page)          │
//! │                                      │                                  │
//! │                                      ▼                                  │
//! │  Page { items, page, perPage, totalItems, totalPages }                  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use tracing::debug;

use storefront_core::catalog;
use storefront_core::filter::{self, CategoryCount, FilterState, FilterUpdate, Page};
use storefront_core::{CoreError, Product};

use crate::error::ApiError;
use crate::state::ConfigState;

/// One page of products matching `filter`.
///
/// Page numbers are 1-based; a page past the end comes back empty.
pub fn browse_catalog(config: &ConfigState, filter: &FilterState, page: usize) -> Page<Product> {
    let result = filter::browse(filter, page, config.products_per_page);

    debug!(
        category = %filter.category,
        weight = %filter.weight,
        search = %filter.search_term,
        page,
        total_items = result.total_items,
        "browse_catalog command"
    );

    result
}

/// Merges a partial filter change. Returns the new state.
pub fn update_filter(current: &FilterState, update: FilterUpdate) -> FilterState {
    let mut next = current.clone();
    next.apply(update);
    next
}

/// Filter state that shows everything.
pub fn reset_filter() -> FilterState {
    FilterState::default()
}

/// Product detail.
pub fn get_product(product_id: &str) -> Result<Product, ApiError> {
    debug!(product_id = %product_id, "get_product command");

    catalog::find_product(product_id)
        .cloned()
        .ok_or_else(|| CoreError::ProductNotFound(product_id.to_string()).into())
}

/// Category dropdown entries with product counts.
pub fn list_categories() -> Vec<CategoryCount> {
    filter::categories_with_counts(catalog::products())
}

/// Products for the home page's featured strip.
pub fn featured_products() -> Vec<Product> {
    filter::featured_products(catalog::products())
        .into_iter()
        .cloned()
        .collect()
}
