//! # Cart State
//!
//! Holds the shopper's cart for the lifetime of the process. The cart itself
//! is the pure reducer from `storefront_core::cart`; this wrapper only adds
//! shared, exclusive access.
//!
//! ## Cart Operations Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Cart State Operations                                │
//! │                                                                         │
//! │  UI Action                Command                 CartAction            │
//! │  ─────────                ───────                 ──────────            │
//! │                                                                         │
//! │  "Add to cart" ─────────► add_to_cart() ────────► AddItem               │
//! │  Quantity stepper ──────► update_cart_item() ───► UpdateQuantity        │
//! │  Trash icon ────────────► remove_from_cart() ───► RemoveItem            │
//! │  Order placed ──────────► place_order() ────────► ClearCart, CloseCart  │
//! │  Cart icon ─────────────► toggle_cart() ────────► ToggleCart            │
//! │                                                                         │
//! │  Every action takes the lock exclusively; reads take it briefly.       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The cart is never persisted: a restart starts empty.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tracing::debug;

pub use storefront_core::cart::{Cart, CartAction, CartItem, CartTotals};

/// Shared cart handle. Clones point at the same cart.
#[derive(Debug, Clone, Default)]
pub struct CartState {
    cart: Arc<Mutex<Cart>>,
}

impl CartState {
    /// Creates an empty, closed cart.
    pub fn new() -> Self {
        CartState {
            cart: Arc::new(Mutex::new(Cart::new())),
        }
    }

    // The reducer never panics mid-update, so a poisoned lock still holds a
    // consistent cart.
    fn lock(&self) -> MutexGuard<'_, Cart> {
        self.cart.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Executes a function with read access to the cart.
    ///
    /// ## Usage
    /// ```rust,ignore
    /// let totals = cart_state.with_cart(|c| CartTotals::from(c));
    /// ```
    pub fn with_cart<F, R>(&self, f: F) -> R
    where
        F: FnOnce(&Cart) -> R,
    {
        let cart = self.lock();
        f(&cart)
    }

    /// Executes a function with write access to the cart.
    pub fn with_cart_mut<F, R>(&self, f: F) -> R
    where
        F: FnOnce(&mut Cart) -> R,
    {
        let mut cart = self.lock();
        f(&mut cart)
    }

    /// Runs one action through the reducer and returns the resulting cart.
    pub fn dispatch(&self, action: CartAction) -> Cart {
        let mut cart = self.lock();
        debug!(action = action_name(&action), "Cart action");
        cart.apply(action);
        cart.clone()
    }

    /// Current cart contents.
    pub fn snapshot(&self) -> Cart {
        self.lock().clone()
    }
}

fn action_name(action: &CartAction) -> &'static str {
    match action {
        CartAction::AddItem { .. } => "add_item",
        CartAction::UpdateQuantity { .. } => "update_quantity",
        CartAction::RemoveItem { .. } => "remove_item",
        CartAction::ClearCart => "clear_cart",
        CartAction::ToggleCart => "toggle_cart",
        CartAction::OpenCart => "open_cart",
        CartAction::CloseCart => "close_cart",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use storefront_core::catalog;

    #[test]
    fn test_clones_share_one_cart() {
        let state = CartState::new();
        let other = state.clone();
        let product = catalog::products()[0].clone();

        state.dispatch(CartAction::AddItem {
            product,
            quantity: 2,
        });

        assert_eq!(other.with_cart(|c| c.item_count()), 2);
    }

    #[test]
    fn test_dispatch_returns_updated_cart() {
        let state = CartState::new();
        let product = catalog::products()[1].clone();
        let id = product.id.clone();

        let cart = state.dispatch(CartAction::AddItem {
            product,
            quantity: 1,
        });
        assert_eq!(cart.line_count(), 1);

        let cart = state.dispatch(CartAction::UpdateQuantity {
            product_id: id,
            quantity: 0,
        });
        assert!(cart.is_empty());
        assert!(state.snapshot().is_empty());
    }

    #[test]
    fn test_toggle_and_totals() {
        let state = CartState::new();
        assert!(state.dispatch(CartAction::ToggleCart).is_open);
        assert!(!state.dispatch(CartAction::ToggleCart).is_open);

        let totals = state.with_cart(|c| CartTotals::from(c));
        assert_eq!(totals.item_count, 0);
        assert!(totals.total.is_zero());
    }
}
