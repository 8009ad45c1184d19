//! # Cart Reducer
//!
//! The shopping cart as a pure reducer: `(Cart, CartAction) -> Cart`.
//!
//! ## Actions
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Action                         Effect                                  │
//! │  ──────                         ──────                                  │
//! │  AddItem { product, qty }  ───► merge qty into existing line, or append │
//! │  UpdateQuantity { id, qty } ──► set qty; qty <= 0 removes the line      │
//! │  RemoveItem { id }  ──────────► drop the line                           │
//! │  ClearCart  ──────────────────► drop every line                         │
//! │  ToggleCart / Open / Close  ──► flip the panel visibility flag          │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Invariants
//! - Lines are unique by product id and keep insertion order
//! - No line ever holds a quantity <= 0 or above [`MAX_ITEM_QUANTITY`]
//! - `total()` is always Σ price × quantity over the current lines
//!
//! Every action is infallible. Actions that reference a product not in the
//! cart leave it unchanged, and quantities past the cap are clamped to it.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::money::Money;
use crate::types::{OrderItem, Product};
use crate::MAX_ITEM_QUANTITY;

// =============================================================================
// Cart Item
// =============================================================================

/// A line in the cart.
///
/// Holds a copy of the product as it was when added, so the cart keeps
/// showing the price the customer saw.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct CartItem {
    pub product: Product,

    /// Always within `1..=MAX_ITEM_QUANTITY`.
    pub quantity: i64,

    #[ts(as = "String")]
    pub added_at: DateTime<Utc>,
}

impl CartItem {
    pub fn new(product: Product, quantity: i64) -> Self {
        CartItem {
            product,
            quantity,
            added_at: Utc::now(),
        }
    }

    /// Unit price × quantity.
    pub fn line_total(&self) -> Money {
        self.product.price.multiply_quantity(self.quantity)
    }

    /// Amount saved against the original price on this line.
    pub fn line_savings(&self) -> Money {
        match self.product.original_price {
            Some(original) if original > self.product.price => {
                (original - self.product.price).multiply_quantity(self.quantity)
            }
            _ => Money::zero(),
        }
    }

    /// Frozen order line for checkout.
    pub fn to_order_item(&self) -> OrderItem {
        OrderItem::from_product(&self.product, self.quantity)
    }
}

// =============================================================================
// Actions
// =============================================================================

/// Everything that can happen to a cart.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum CartAction {
    AddItem { product: Product, quantity: i64 },
    UpdateQuantity { product_id: String, quantity: i64 },
    RemoveItem { product_id: String },
    ClearCart,
    ToggleCart,
    OpenCart,
    CloseCart,
}

// =============================================================================
// Cart
// =============================================================================

/// The shopping cart. Lives only in memory.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct Cart {
    pub items: Vec<CartItem>,

    /// Whether the cart panel is showing.
    pub is_open: bool,
}

impl Cart {
    pub fn new() -> Self {
        Cart::default()
    }

    /// Applies one action in place.
    pub fn apply(&mut self, action: CartAction) {
        match action {
            CartAction::AddItem { product, quantity } => self.add_item(product, quantity),
            CartAction::UpdateQuantity {
                product_id,
                quantity,
            } => self.update_quantity(&product_id, quantity),
            CartAction::RemoveItem { product_id } => self.remove_item(&product_id),
            CartAction::ClearCart => self.items.clear(),
            CartAction::ToggleCart => self.is_open = !self.is_open,
            CartAction::OpenCart => self.is_open = true,
            CartAction::CloseCart => self.is_open = false,
        }
    }

    fn add_item(&mut self, product: Product, quantity: i64) {
        if quantity <= 0 {
            return;
        }

        if let Some(item) = self.items.iter_mut().find(|i| i.product.id == product.id) {
            item.quantity = item
                .quantity
                .saturating_add(quantity)
                .min(MAX_ITEM_QUANTITY);
            return;
        }

        self.items
            .push(CartItem::new(product, quantity.min(MAX_ITEM_QUANTITY)));
    }

    fn update_quantity(&mut self, product_id: &str, quantity: i64) {
        if quantity <= 0 {
            self.remove_item(product_id);
            return;
        }

        if let Some(item) = self.items.iter_mut().find(|i| i.product.id == product_id) {
            item.quantity = quantity.min(MAX_ITEM_QUANTITY);
        }
    }

    fn remove_item(&mut self, product_id: &str) {
        self.items.retain(|i| i.product.id != product_id);
    }

    pub fn get(&self, product_id: &str) -> Option<&CartItem> {
        self.items.iter().find(|i| i.product.id == product_id)
    }

    /// Number of distinct lines.
    pub fn line_count(&self) -> usize {
        self.items.len()
    }

    /// Σ quantity; the badge number on the cart icon.
    pub fn item_count(&self) -> i64 {
        self.items.iter().map(|i| i.quantity).sum()
    }

    /// Σ price × quantity.
    pub fn total(&self) -> Money {
        self.items.iter().map(CartItem::line_total).sum()
    }

    /// Σ savings against original prices.
    pub fn savings(&self) -> Money {
        self.items.iter().map(CartItem::line_savings).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Snapshot of every line for an order draft.
    pub fn order_items(&self) -> Vec<OrderItem> {
        self.items.iter().map(CartItem::to_order_item).collect()
    }
}

/// Functional form of [`Cart::apply`].
pub fn reduce(mut cart: Cart, action: CartAction) -> Cart {
    cart.apply(action);
    cart
}

/// Cart totals summary for API responses.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct CartTotals {
    pub line_count: usize,
    pub item_count: i64,
    pub total: Money,
    pub savings: Money,
}

impl From<&Cart> for CartTotals {
    fn from(cart: &Cart) -> Self {
        CartTotals {
            line_count: cart.line_count(),
            item_count: cart.item_count(),
            total: cart.total(),
            savings: cart.savings(),
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn test_product(id: &str, price_rupees: i64, original: Option<i64>) -> Product {
        Product {
            id: id.to_string(),
            name: format!("Product {}", id),
            price: Money::from_rupees(price_rupees),
            original_price: original.map(Money::from_rupees),
            category: "nuts".to_string(),
            image: String::new(),
            description: String::new(),
            weight: "250g".to_string(),
            nutritional_info: String::new(),
            in_stock: true,
            featured: false,
            rating: 4.0,
            reviews: 0,
        }
    }

    fn add(cart: &mut Cart, product: &Product, quantity: i64) {
        cart.apply(CartAction::AddItem {
            product: product.clone(),
            quantity,
        });
    }

    #[test]
    fn test_add_same_product_increases_quantity() {
        let mut cart = Cart::new();
        let product = test_product("NUT-1-A", 500, None);

        add(&mut cart, &product, 2);
        add(&mut cart, &product, 3);

        assert_eq!(cart.line_count(), 1);
        assert_eq!(cart.item_count(), 5);
        assert_eq!(cart.total(), Money::from_rupees(2500));
    }

    #[test]
    fn test_lines_keep_insertion_order() {
        let mut cart = Cart::new();
        let a = test_product("NUT-1-A", 100, None);
        let b = test_product("NUT-2-B", 200, None);

        add(&mut cart, &b, 1);
        add(&mut cart, &a, 1);
        add(&mut cart, &b, 1);

        let ids: Vec<&str> = cart.items.iter().map(|i| i.product.id.as_str()).collect();
        assert_eq!(ids, vec!["NUT-2-B", "NUT-1-A"]);
    }

    #[test]
    fn test_non_positive_add_is_ignored() {
        let mut cart = Cart::new();
        let product = test_product("NUT-1-A", 500, None);

        add(&mut cart, &product, 0);
        add(&mut cart, &product, -2);

        assert!(cart.is_empty());
    }

    #[test]
    fn test_update_to_zero_removes_line() {
        let mut cart = Cart::new();
        let a = test_product("NUT-1-A", 100, None);
        let b = test_product("NUT-2-B", 250, None);
        add(&mut cart, &a, 2);
        add(&mut cart, &b, 1);

        cart.apply(CartAction::UpdateQuantity {
            product_id: a.id.clone(),
            quantity: 0,
        });

        assert_eq!(cart.line_count(), 1);
        assert!(cart.get(&a.id).is_none());
        assert_eq!(cart.total(), Money::from_rupees(250));
    }

    #[test]
    fn test_update_unknown_product_is_noop() {
        let mut cart = Cart::new();
        let a = test_product("NUT-1-A", 100, None);
        add(&mut cart, &a, 2);
        let before = cart.clone();

        cart.apply(CartAction::UpdateQuantity {
            product_id: "SPC-9-Z".to_string(),
            quantity: 4,
        });
        cart.apply(CartAction::RemoveItem {
            product_id: "SPC-9-Z".to_string(),
        });

        assert_eq!(cart, before);
    }

    #[test]
    fn test_update_sets_quantity() {
        let mut cart = Cart::new();
        let a = test_product("NUT-1-A", 120, None);
        add(&mut cart, &a, 1);

        cart.apply(CartAction::UpdateQuantity {
            product_id: a.id.clone(),
            quantity: 7,
        });

        assert_eq!(cart.get(&a.id).map(|i| i.quantity), Some(7));
        assert_eq!(cart.total(), Money::from_rupees(840));
    }

    #[test]
    fn test_quantities_clamp_at_line_cap() {
        let mut cart = Cart::new();
        let a = test_product("NUT-1-A", 899, None);

        add(&mut cart, &a, MAX_ITEM_QUANTITY - 1);
        add(&mut cart, &a, i64::MAX);
        assert_eq!(cart.item_count(), MAX_ITEM_QUANTITY);
        assert_eq!(cart.total(), Money::from_rupees(899 * MAX_ITEM_QUANTITY));

        cart.apply(CartAction::UpdateQuantity {
            product_id: a.id.clone(),
            quantity: i64::MAX / 10,
        });
        assert_eq!(cart.get(&a.id).map(|i| i.quantity), Some(MAX_ITEM_QUANTITY));

        let b = test_product("NUT-2-B", 100, None);
        add(&mut cart, &b, i64::MAX);
        assert_eq!(cart.get(&b.id).map(|i| i.quantity), Some(MAX_ITEM_QUANTITY));
    }

    #[test]
    fn test_visibility_actions() {
        let cart = reduce(Cart::new(), CartAction::ToggleCart);
        assert!(cart.is_open);
        let cart = reduce(cart, CartAction::ToggleCart);
        assert!(!cart.is_open);
        let cart = reduce(cart, CartAction::OpenCart);
        assert!(cart.is_open);
        let cart = reduce(cart, CartAction::CloseCart);
        assert!(!cart.is_open);
    }

    #[test]
    fn test_clear_keeps_visibility() {
        let mut cart = Cart::new();
        add(&mut cart, &test_product("NUT-1-A", 100, None), 3);
        cart.apply(CartAction::OpenCart);

        cart.apply(CartAction::ClearCart);

        assert!(cart.is_empty());
        assert!(cart.is_open);
        assert_eq!(cart.total(), Money::zero());
    }

    #[test]
    fn test_savings_and_totals() {
        let mut cart = Cart::new();
        add(&mut cart, &test_product("NUT-1-A", 899, Some(1099)), 2);
        add(&mut cart, &test_product("NUT-2-B", 300, None), 1);

        let totals = CartTotals::from(&cart);
        assert_eq!(totals.line_count, 2);
        assert_eq!(totals.item_count, 3);
        assert_eq!(totals.total, Money::from_rupees(2098));
        assert_eq!(totals.savings, Money::from_rupees(400));
    }

    #[test]
    fn test_order_items_snapshot_lines() {
        let mut cart = Cart::new();
        add(&mut cart, &test_product("NUT-1-A", 450, None), 2);

        let items = cart.order_items();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].product_id, "NUT-1-A");
        assert_eq!(items[0].unit_price, Money::from_rupees(450));
        assert_eq!(items[0].line_total(), Money::from_rupees(900));
    }

    #[test]
    fn test_action_deserializes_from_tagged_json() {
        let action: CartAction =
            serde_json::from_str(r#"{"type":"updateQuantity","product_id":"NUT-1-A","quantity":2}"#)
                .unwrap();
        assert_eq!(
            action,
            CartAction::UpdateQuantity {
                product_id: "NUT-1-A".to_string(),
                quantity: 2
            }
        );
    }
}
