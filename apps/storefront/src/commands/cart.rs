//! # Cart Commands
//!
//! Cart manipulation. Everything goes through the reducer via
//! [`CartState::dispatch`].
//!
//! ## Cart Lifecycle
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Cart Lifecycle                                       │
//! │                                                                         │
//! │  ┌──────────┐     ┌──────────┐     ┌──────────┐     ┌──────────┐       │
//! │  │  Empty   │────►│ In Cart  │────►│ Checkout │────►│  Order   │       │
//! │  │  Cart    │     │          │     │   Form   │     │  Placed  │       │
//! │  └──────────┘     └──────────┘     └──────────┘     └──────────┘       │
//! │       ▲                │                                  │             │
//! │       │           add_to_cart                    place_order clears     │
//! │       │           update_cart_item               and closes the cart    │
//! │       │           remove_from_cart                        │             │
//! │       │                │                                  │             │
//! │       └──── clear_cart ┘◄─────────────────────────────────┘             │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use serde::{Deserialize, Serialize};
use tracing::debug;

use storefront_core::validation::validate_quantity;
use storefront_core::{catalog, CoreError};

use crate::error::ApiError;
use crate::state::{Cart, CartAction, CartItem, CartState, CartTotals};

/// Cart response including items and totals.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartResponse {
    pub items: Vec<CartItem>,
    pub totals: CartTotals,
    pub is_open: bool,
}

impl From<&Cart> for CartResponse {
    fn from(cart: &Cart) -> Self {
        CartResponse {
            items: cart.items.clone(),
            totals: CartTotals::from(cart),
            is_open: cart.is_open,
        }
    }
}

/// Gets the current cart contents.
pub fn get_cart(cart: &CartState) -> CartResponse {
    debug!("get_cart command");
    cart.with_cart(|c| CartResponse::from(c))
}

/// Adds a catalog product to the cart.
///
/// ## Behavior
/// - Already in cart: quantity increases
/// - Not in cart: added as a new line with the current price
/// - Out-of-stock products are refused
/// - A line may not grow past `MAX_ITEM_QUANTITY`
///
/// ## Arguments
/// * `product_id` - Catalog id, e.g. `NUT-1709123456789-ABC123`
/// * `quantity` - Quantity to add (default: 1)
pub fn add_to_cart(
    cart: &CartState,
    product_id: &str,
    quantity: Option<i64>,
) -> Result<CartResponse, ApiError> {
    let quantity = quantity.unwrap_or(1);
    debug!(product_id = %product_id, quantity = %quantity, "add_to_cart command");

    let product = catalog::find_product(product_id)
        .ok_or_else(|| CoreError::ProductNotFound(product_id.to_string()))?;

    if !product.in_stock {
        return Err(CoreError::OutOfStock(product.name.clone()).into());
    }
    validate_quantity(quantity)?;

    let updated = cart.with_cart_mut(|c| {
        let in_cart = c.get(product_id).map_or(0, |item| item.quantity);
        validate_quantity(in_cart.saturating_add(quantity))?;

        c.apply(CartAction::AddItem {
            product: product.clone(),
            quantity,
        });
        Ok::<_, ApiError>(c.clone())
    })?;
    Ok(CartResponse::from(&updated))
}

/// Sets the quantity of a line. Zero or less removes it.
pub fn update_cart_item(
    cart: &CartState,
    product_id: &str,
    quantity: i64,
) -> Result<CartResponse, ApiError> {
    debug!(product_id = %product_id, quantity = %quantity, "update_cart_item command");

    if quantity > 0 {
        validate_quantity(quantity)?;
    }

    let updated = cart.dispatch(CartAction::UpdateQuantity {
        product_id: product_id.to_string(),
        quantity,
    });
    Ok(CartResponse::from(&updated))
}

/// Removes a line from the cart.
pub fn remove_from_cart(cart: &CartState, product_id: &str) -> CartResponse {
    debug!(product_id = %product_id, "remove_from_cart command");

    let updated = cart.dispatch(CartAction::RemoveItem {
        product_id: product_id.to_string(),
    });
    CartResponse::from(&updated)
}

/// Clears all items from the cart.
pub fn clear_cart(cart: &CartState) -> CartResponse {
    debug!("clear_cart command");
    CartResponse::from(&cart.dispatch(CartAction::ClearCart))
}

/// Shows or hides the cart panel.
pub fn toggle_cart(cart: &CartState) -> CartResponse {
    CartResponse::from(&cart.dispatch(CartAction::ToggleCart))
}

pub fn set_cart_open(cart: &CartState, open: bool) -> CartResponse {
    let action = if open {
        CartAction::OpenCart
    } else {
        CartAction::CloseCart
    };
    CartResponse::from(&cart.dispatch(action))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorCode;
    use storefront_core::{Money, MAX_ITEM_QUANTITY};

    const ALMONDS: &str = "NUT-1709123456789-ABC123";

    #[test]
    fn test_add_same_product_twice_merges() {
        let cart = CartState::new();

        add_to_cart(&cart, ALMONDS, None).unwrap();
        let response = add_to_cart(&cart, ALMONDS, Some(2)).unwrap();

        assert_eq!(response.items.len(), 1);
        assert_eq!(response.totals.item_count, 3);
        assert_eq!(response.totals.total, Money::from_rupees(899 * 3));
        assert_eq!(response.totals.savings, Money::from_rupees(200 * 3));
    }

    #[test]
    fn test_add_rejects_unknown_and_out_of_stock() {
        let cart = CartState::new();

        let err = add_to_cart(&cart, "NUT-0-NOPE", None).unwrap_err();
        assert_eq!(err.code, ErrorCode::NotFound);

        let out_of_stock = catalog::products()
            .iter()
            .find(|p| !p.in_stock)
            .unwrap();
        let err = add_to_cart(&cart, &out_of_stock.id, None).unwrap_err();
        assert_eq!(err.code, ErrorCode::CartError);

        let err = add_to_cart(&cart, ALMONDS, Some(0)).unwrap_err();
        assert_eq!(err.code, ErrorCode::ValidationError);

        assert!(get_cart(&cart).items.is_empty());
    }

    #[test]
    fn test_update_to_zero_removes_and_recomputes() {
        let cart = CartState::new();
        let other = catalog::products()[1].id.clone();
        add_to_cart(&cart, ALMONDS, Some(2)).unwrap();
        add_to_cart(&cart, &other, Some(1)).unwrap();

        let response = update_cart_item(&cart, ALMONDS, 0).unwrap();
        assert_eq!(response.items.len(), 1);
        assert_eq!(response.totals.total, catalog::products()[1].price);

        let response = remove_from_cart(&cart, &other);
        assert!(response.items.is_empty());
        assert!(response.totals.total.is_zero());
    }

    #[test]
    fn test_quantity_cap_is_enforced() {
        let cart = CartState::new();

        let err = add_to_cart(&cart, ALMONDS, Some(i64::MAX / 10)).unwrap_err();
        assert_eq!(err.code, ErrorCode::ValidationError);
        assert!(get_cart(&cart).items.is_empty());

        add_to_cart(&cart, ALMONDS, Some(MAX_ITEM_QUANTITY - 1)).unwrap();
        let err = add_to_cart(&cart, ALMONDS, Some(2)).unwrap_err();
        assert_eq!(err.code, ErrorCode::ValidationError);
        assert_eq!(get_cart(&cart).totals.item_count, MAX_ITEM_QUANTITY - 1);

        let response = add_to_cart(&cart, ALMONDS, None).unwrap();
        assert_eq!(
            response.totals.total,
            Money::from_rupees(899 * MAX_ITEM_QUANTITY)
        );

        let err = update_cart_item(&cart, ALMONDS, MAX_ITEM_QUANTITY + 1).unwrap_err();
        assert_eq!(err.code, ErrorCode::ValidationError);
        let response = update_cart_item(&cart, ALMONDS, 5).unwrap();
        assert_eq!(response.totals.item_count, 5);
    }

    #[test]
    fn test_panel_visibility() {
        let cart = CartState::new();
        assert!(toggle_cart(&cart).is_open);
        assert!(!set_cart_open(&cart, false).is_open);
        assert!(set_cart_open(&cart, true).is_open);

        add_to_cart(&cart, ALMONDS, None).unwrap();
        let response = clear_cart(&cart);
        assert!(response.items.is_empty());
        assert!(response.is_open);
    }
}
