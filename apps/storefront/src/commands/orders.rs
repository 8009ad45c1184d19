//! # Order History Commands
//!
//! Read-only views of the signed-in user's orders. Orders are never changed
//! from this side; status moves happen in fulfilment.

use std::str::FromStr;

use serde::Serialize;
use tracing::{debug, warn};

use storefront_core::{Order, OrderStatus};

use crate::backend::DocumentStore;
use crate::error::ApiError;
use crate::state::SessionHolder;

use super::require_user;

/// Status filter value that shows every order.
pub const ALL_STATUSES: &str = "all";

/// An order as listed on the orders page.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderView {
    #[serde(flatten)]
    pub order: Order,
    pub display_number: String,
    pub item_count: i64,
}

impl From<Order> for OrderView {
    fn from(order: Order) -> Self {
        OrderView {
            display_number: order.display_number(),
            item_count: order.item_count(),
            order,
        }
    }
}

/// Parses the status dropdown value; `all` means no filter.
pub fn parse_status_filter(value: &str) -> Result<Option<OrderStatus>, ApiError> {
    if value.eq_ignore_ascii_case(ALL_STATUSES) {
        return Ok(None);
    }
    OrderStatus::from_str(value)
        .map(Some)
        .map_err(ApiError::validation)
}

/// The signed-in user's orders, newest first.
///
/// ## Arguments
/// * `status_filter` - `all` or one of `pending`, `confirmed`, `processing`,
///   `shipped`, `delivered`, `cancelled`
pub async fn list_orders(
    session: &SessionHolder,
    store: &dyn DocumentStore,
    status_filter: &str,
) -> Result<Vec<OrderView>, ApiError> {
    let user = require_user(session)?;
    let status = parse_status_filter(status_filter)?;
    debug!(uid = %user.uid, status = ?status, "list_orders command");

    let orders = store.orders_for_user(&user.uid, status).await?;
    Ok(orders.into_iter().map(OrderView::from).collect())
}

/// A single order. Only its owner may read it.
pub async fn get_order(
    session: &SessionHolder,
    store: &dyn DocumentStore,
    order_id: &str,
) -> Result<OrderView, ApiError> {
    let user = require_user(session)?;
    debug!(uid = %user.uid, order_id = %order_id, "get_order command");

    let order = store
        .get_order(order_id)
        .await?
        .ok_or_else(|| ApiError::not_found("Order", order_id))?;

    if order.user_id != user.uid {
        warn!(uid = %user.uid, order_id = %order_id, "Order read by non-owner refused");
        return Err(ApiError::forbidden("You can only view your own orders"));
    }

    Ok(OrderView::from(order))
}
