//! # Checkout Command
//!
//! Turns the cart into an order document.
//!
//! ## Order Placement
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    place_order(form)                                    │
//! │                                                                         │
//! │  1. validate_checkout(form) ───── errors ──► VALIDATION_ERROR + fields  │
//! │  2. session.current_user() ────── none ────► UNAUTHENTICATED            │
//! │  3. cart snapshot ─────────────── empty ───► CART_ERROR                 │
//! │  4. OrderDraft::new(session uid + email, cart lines, shipping, payment) │
//! │        status = pending, paymentStatus = pending                        │
//! │  5. store.add_order(draft) ────── error ───► ORDER_ERROR                │
//! │        │                                     "Failed to place order: …" │
//! │        ▼                                                                │
//! │     clear + close cart, return order id                                 │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Nothing is written before steps 1-4 pass. The order's owner id and email
//! always come from the session; the form's email is validated but never
//! stored on the order. There is no retry and no idempotency key: submitting
//! twice places two orders.

use serde::Serialize;
use tracing::{debug, error, info};

use storefront_core::validation::{validate_checkout, CheckoutForm};
use storefront_core::{order_display_number, CoreError, Money, OrderDraft};

use crate::backend::DocumentStore;
use crate::error::ApiError;
use crate::state::{CartAction, CartState, SessionHolder};

use super::require_user;

/// Result of a successful checkout.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlaceOrderResponse {
    pub order_id: String,
    /// Short reference shown to the customer.
    pub display_number: String,
    pub total: Money,
    pub item_count: i64,
}

/// Places an order for everything in the cart.
pub async fn place_order(
    session: &SessionHolder,
    cart: &CartState,
    store: &dyn DocumentStore,
    form: CheckoutForm,
) -> Result<PlaceOrderResponse, ApiError> {
    debug!("place_order command");

    let form = validate_checkout(&form)?;
    let user = require_user(session)?;

    let snapshot = cart.snapshot();
    if snapshot.is_empty() {
        return Err(CoreError::EmptyCart.into());
    }

    let draft = OrderDraft::new(
        user.uid.clone(),
        user.email.clone(),
        snapshot.order_items(),
        form.to_shipping_address(),
        form.payment_method,
    );

    debug!(
        user_id = %draft.user_id,
        lines = draft.items.len(),
        total = %draft.total,
        payment_method = ?draft.payment_method,
        "Submitting order"
    );

    let order_id = store.add_order(&draft).await.map_err(|e| {
        error!(user_id = %draft.user_id, error = %e, "Failed to place order");
        ApiError::order(format!("Failed to place order: {}", e.message))
    })?;

    cart.with_cart_mut(|c| {
        c.apply(CartAction::ClearCart);
        c.apply(CartAction::CloseCart);
    });

    info!(order_id = %order_id, user_id = %user.uid, total = %draft.total, "Order placed");

    Ok(PlaceOrderResponse {
        display_number: order_display_number(&order_id),
        order_id,
        total: draft.total,
        item_count: draft.items.iter().map(|i| i.quantity).sum(),
    })
}

/// Checkout form pre-filled from the session and saved profile.
pub async fn checkout_defaults(
    session: &SessionHolder,
    store: &dyn DocumentStore,
) -> Result<CheckoutForm, ApiError> {
    let user = require_user(session)?;
    let mut form = CheckoutForm {
        email: user.email.clone(),
        full_name: user.display_name.clone().unwrap_or_default(),
        ..CheckoutForm::default()
    };

    if let Some(profile) = store.get_profile(&user.uid).await? {
        if let Some(name) = profile.display_name {
            form.full_name = name;
        }
        if let Some(phone) = profile.phone_number {
            form.phone_number = phone;
        }
        if let Some(address) = profile.address {
            form.address = address.street;
            form.city = address.city;
            form.state = address.state;
            form.pincode = address.pin_code;
        }
    }

    Ok(form)
}
