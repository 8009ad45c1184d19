//! # storefront-core: Pure Business Logic for the Storefront
//!
//! Everything the storefront decides without talking to the outside world:
//! the product catalog, filtering and pagination, the cart reducer, checkout
//! form rules and the domain types that flow into the document store.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Storefront Architecture                          │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                    Presentation layer                           │   │
//! │  │    Shop page ──► Cart panel ──► Checkout ──► Orders / Profile   │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                 storefront-app commands                         │   │
//! │  │    browse_catalog, add_to_cart, place_order, sign_in, ...       │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │             ★ storefront-core (THIS CRATE) ★                    │   │
//! │  │                                                                 │   │
//! │  │   ┌─────────┐ ┌─────────┐ ┌─────────┐ ┌─────────┐ ┌──────────┐ │   │
//! │  │   │ catalog │ │ filter  │ │  cart   │ │  money  │ │validation│ │   │
//! │  │   └─────────┘ └─────────┘ └─────────┘ └─────────┘ └──────────┘ │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO DATABASE • NO NETWORK • PURE FUNCTIONS           │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Domain types (Product, Order, UserProfile, ...)
//! - [`money`] - Money type with integer arithmetic (paise, no floats)
//! - [`catalog`] - Static product catalog and categories
//! - [`filter`] - Filter state, product filtering and pagination
//! - [`cart`] - Cart reducer
//! - [`product_id`] - `PREFIX-TIMESTAMP-RANDOM` product identifiers
//! - [`validation`] - Checkout and auth form rules
//! - [`error`] - Domain error types
//!
//! ## Example Usage
//!
//! ```rust
//! use storefront_core::cart::{Cart, CartAction};
//! use storefront_core::catalog;
//!
//! let product = catalog::products()[0].clone();
//! let mut cart = Cart::new();
//! cart.apply(CartAction::AddItem { product: product.clone(), quantity: 1 });
//! cart.apply(CartAction::AddItem { product, quantity: 2 });
//!
//! assert_eq!(cart.line_count(), 1);
//! assert_eq!(cart.item_count(), 3);
//! ```

pub mod cart;
pub mod catalog;
pub mod error;
pub mod filter;
pub mod money;
pub mod product_id;
pub mod types;
pub mod validation;

pub use error::{CoreError, FieldError, FieldErrors, ValidationError};
pub use money::Money;
pub use types::*;

/// Number of products shown per shop page.
pub const PRODUCTS_PER_PAGE: usize = 8;

/// Most units of one product a single cart line may hold.
pub const MAX_ITEM_QUANTITY: i64 = 99;

/// Upper bound of the default price filter, in rupees.
pub const DEFAULT_MAX_PRICE_RUPEES: i64 = 3000;

/// Viewport width (px) at or below which a device counts as mobile.
pub const MOBILE_BREAKPOINT_PX: u32 = 768;
