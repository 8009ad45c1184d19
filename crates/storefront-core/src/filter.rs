//! # Catalog Filtering & Pagination
//!
//! Pure functions from (catalog, filter state) to the products a shop page
//! shows.
//!
//! ## Pipeline
//! ```text
//! catalog ──► filter_products(FilterState) ──► paginate(page, per_page) ──► Page<Product>
//!                    │
//!                    ├── category  == filter.category   (or "all")
//!                    ├── min <= price <= max            (inclusive)
//!                    ├── weight contains filter.weight  (or "all")
//!                    └── name OR description contains search (case-insensitive)
//! ```
//!
//! Output always keeps catalog order; nothing here sorts.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::catalog::{self, ALL_CATEGORIES};
use crate::money::Money;
use crate::types::Product;
use crate::{DEFAULT_MAX_PRICE_RUPEES, PRODUCTS_PER_PAGE};

/// How many featured products the home page shows.
pub const FEATURED_LIMIT: usize = 4;

const ALL_WEIGHTS: &str = "all";

// =============================================================================
// Filter State
// =============================================================================

/// Current shop filter selection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct FilterState {
    /// `all` or a category id.
    pub category: String,
    /// Inclusive `(min, max)` bounds.
    pub price_range: (Money, Money),
    /// `all` or a weight bucket such as `250g`.
    pub weight: String,
    pub search_term: String,
}

impl Default for FilterState {
    fn default() -> Self {
        FilterState {
            category: ALL_CATEGORIES.to_string(),
            price_range: (Money::zero(), Money::from_rupees(DEFAULT_MAX_PRICE_RUPEES)),
            weight: ALL_WEIGHTS.to_string(),
            search_term: String::new(),
        }
    }
}

/// A partial change to [`FilterState`]; `None` fields are left as they are.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct FilterUpdate {
    pub category: Option<String>,
    pub price_range: Option<(Money, Money)>,
    pub weight: Option<String>,
    pub search_term: Option<String>,
}

impl FilterState {
    /// Merges a partial update into the current state.
    pub fn apply(&mut self, update: FilterUpdate) {
        if let Some(category) = update.category {
            self.category = category;
        }
        if let Some(range) = update.price_range {
            self.price_range = range;
        }
        if let Some(weight) = update.weight {
            self.weight = weight;
        }
        if let Some(search_term) = update.search_term {
            self.search_term = search_term;
        }
    }

    /// Back to "show everything".
    pub fn reset(&mut self) {
        *self = FilterState::default();
    }

    /// `true` when `product` passes every predicate.
    pub fn matches(&self, product: &Product) -> bool {
        let matches_category =
            self.category == ALL_CATEGORIES || product.category == self.category;

        let (min, max) = self.price_range;
        let matches_price = product.price >= min && product.price <= max;

        let matches_weight = self.weight == ALL_WEIGHTS || product.weight.contains(&self.weight);

        let needle = self.search_term.to_lowercase();
        let matches_search = product.name.to_lowercase().contains(&needle)
            || product.description.to_lowercase().contains(&needle);

        matches_category && matches_price && matches_weight && matches_search
    }
}

/// Products passing `filter`, in catalog order.
pub fn filter_products<'a>(products: &'a [Product], filter: &FilterState) -> Vec<&'a Product> {
    products.iter().filter(|p| filter.matches(p)).collect()
}

// =============================================================================
// Pagination
// =============================================================================

/// One page of results.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct Page<T> {
    pub items: Vec<T>,
    /// 1-based page number that was requested.
    pub page: usize,
    pub per_page: usize,
    pub total_items: usize,
    pub total_pages: usize,
}

impl<T> Page<T> {
    pub fn has_previous(&self) -> bool {
        self.page > 1
    }

    pub fn has_next(&self) -> bool {
        self.page < self.total_pages
    }
}

/// Cuts page `page` (1-based) out of `items`.
///
/// Pages outside `1..=total_pages` come back with no items but still report
/// the real totals.
///
/// ## Example
/// ```rust
/// use storefront_core::filter::paginate;
///
/// let numbers: Vec<u32> = (1..=10).collect();
/// let page = paginate(&numbers, 2, 8);
/// assert_eq!(page.items, vec![9, 10]);
/// assert_eq!(page.total_pages, 2);
/// ```
pub fn paginate<T: Clone>(items: &[T], page: usize, per_page: usize) -> Page<T> {
    let per_page = per_page.max(1);
    let total_items = items.len();
    let total_pages = total_items.div_ceil(per_page);

    let page_items = if page == 0 || page > total_pages {
        Vec::new()
    } else {
        let start = (page - 1) * per_page;
        let end = (start + per_page).min(total_items);
        items[start..end].to_vec()
    };

    Page {
        items: page_items,
        page,
        per_page,
        total_items,
        total_pages,
    }
}

/// Filters the catalog and returns one page of the result.
pub fn browse(filter: &FilterState, page: usize, per_page: usize) -> Page<Product> {
    let matching: Vec<Product> = filter_products(catalog::products(), filter)
        .into_iter()
        .cloned()
        .collect();
    paginate(&matching, page, per_page)
}

/// [`browse`] with the default page size.
pub fn browse_default(filter: &FilterState, page: usize) -> Page<Product> {
    browse(filter, page, PRODUCTS_PER_PAGE)
}

// =============================================================================
// Category Counts & Featured
// =============================================================================

/// A category option as shown in the filter dropdown.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct CategoryCount {
    pub id: String,
    pub name: String,
    pub count: usize,
}

/// `All Products` followed by each category, with product counts.
pub fn categories_with_counts(products: &[Product]) -> Vec<CategoryCount> {
    let mut counts = Vec::with_capacity(catalog::categories().len() + 1);
    counts.push(CategoryCount {
        id: ALL_CATEGORIES.to_string(),
        name: "All Products".to_string(),
        count: products.len(),
    });

    for category in catalog::categories() {
        counts.push(CategoryCount {
            id: category.id.clone(),
            name: category.name.clone(),
            count: products.iter().filter(|p| p.category == category.id).count(),
        });
    }

    counts
}

/// First [`FEATURED_LIMIT`] featured products, in catalog order.
pub fn featured_products(products: &[Product]) -> Vec<&Product> {
    products
        .iter()
        .filter(|p| p.featured)
        .take(FEATURED_LIMIT)
        .collect()
}

// =============================================================================
// Unit Tests
// =============================================================================
