//! # Order Repository
//!
//! Order documents. The storefront only ever appends; status changes and
//! tracking updates belong to the fulfilment side.
//!
//! ## Document Layout
//! ```text
//! orders
//! ├── id, user_id, user_email         scalar columns (filtered / sorted on)
//! ├── total_paise, status, payment_*  scalar columns
//! ├── items             JSON  [OrderItem]          (product snapshots)
//! ├── shipping_address  JSON  ShippingAddress
//! └── tracking_updates  JSON  [TrackingUpdate]
//! ```

use chrono::Utc;
use sqlx::SqlitePool;
use tracing::{debug, info};
use uuid::Uuid;

use super::{from_millis, to_millis};
use crate::error::DbResult;
use storefront_core::{Money, Order, OrderDraft, OrderStatus, PaymentMethod, PaymentStatus};

#[derive(sqlx::FromRow)]
struct OrderRow {
    id: String,
    user_id: String,
    user_email: String,
    items: String,
    total_paise: i64,
    status: OrderStatus,
    payment_method: PaymentMethod,
    payment_status: PaymentStatus,
    shipping_address: String,
    tracking_updates: String,
    created_at: i64,
    updated_at: i64,
}

impl OrderRow {
    fn into_order(self) -> DbResult<Order> {
        Ok(Order {
            id: self.id,
            user_id: self.user_id,
            user_email: self.user_email,
            items: serde_json::from_str(&self.items)?,
            total: Money::from_paise(self.total_paise),
            status: self.status,
            payment_method: self.payment_method,
            payment_status: self.payment_status,
            shipping_address: serde_json::from_str(&self.shipping_address)?,
            created_at: from_millis(self.created_at),
            updated_at: from_millis(self.updated_at),
            tracking_updates: serde_json::from_str(&self.tracking_updates)?,
        })
    }
}

const ORDER_COLUMNS: &str = "id, user_id, user_email, items, total_paise, status, \
                             payment_method, payment_status, shipping_address, \
                             tracking_updates, created_at, updated_at";

/// Repository for order documents.
#[derive(Debug, Clone)]
pub struct OrderRepository {
    pool: SqlitePool,
}

impl OrderRepository {
    pub fn new(pool: SqlitePool) -> Self {
        OrderRepository { pool }
    }

    /// Writes a new order document and returns it with its generated id.
    pub async fn insert(&self, draft: &OrderDraft) -> DbResult<Order> {
        let id = Uuid::new_v4().simple().to_string();
        let created = to_millis(draft.created_at);
        let updated = to_millis(Utc::now());

        debug!(
            id = %id,
            user_id = %draft.user_id,
            lines = draft.items.len(),
            total = %draft.total,
            "Inserting order"
        );

        sqlx::query(
            r#"
            INSERT INTO orders (
                id, user_id, user_email, items, total_paise,
                status, payment_method, payment_status,
                shipping_address, tracking_updates, created_at, updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, '[]', ?10, ?11)
            "#,
        )
        .bind(&id)
        .bind(&draft.user_id)
        .bind(&draft.user_email)
        .bind(serde_json::to_string(&draft.items)?)
        .bind(draft.total.paise())
        .bind(draft.status)
        .bind(draft.payment_method)
        .bind(draft.payment_status)
        .bind(serde_json::to_string(&draft.shipping_address)?)
        .bind(created)
        .bind(updated)
        .execute(&self.pool)
        .await?;

        info!(id = %id, user_id = %draft.user_id, "Order stored");

        Ok(Order {
            id,
            user_id: draft.user_id.clone(),
            user_email: draft.user_email.clone(),
            items: draft.items.clone(),
            total: draft.total,
            status: draft.status,
            payment_method: draft.payment_method,
            payment_status: draft.payment_status,
            shipping_address: draft.shipping_address.clone(),
            created_at: from_millis(created),
            updated_at: from_millis(updated),
            tracking_updates: Vec::new(),
        })
    }

    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<Order>> {
        let sql = format!("SELECT {} FROM orders WHERE id = ?1", ORDER_COLUMNS);
        let row: Option<OrderRow> = sqlx::query_as(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        row.map(OrderRow::into_order).transpose()
    }

    /// Orders of one user, newest first, optionally narrowed to a status.
    ///
    /// Orders created in the same millisecond come back in reverse insert
    /// order.
    pub async fn list_for_user(
        &self,
        user_id: &str,
        status: Option<OrderStatus>,
    ) -> DbResult<Vec<Order>> {
        debug!(user_id = %user_id, status = ?status, "Listing orders");

        let rows: Vec<OrderRow> = match status {
            Some(status) => {
                let sql = format!(
                    "SELECT {} FROM orders WHERE user_id = ?1 AND status = ?2 \
                     ORDER BY created_at DESC, rowid DESC",
                    ORDER_COLUMNS
                );
                sqlx::query_as(&sql)
                    .bind(user_id)
                    .bind(status)
                    .fetch_all(&self.pool)
                    .await?
            }
            None => {
                let sql = format!(
                    "SELECT {} FROM orders WHERE user_id = ?1 \
                     ORDER BY created_at DESC, rowid DESC",
                    ORDER_COLUMNS
                );
                sqlx::query_as(&sql)
                    .bind(user_id)
                    .fetch_all(&self.pool)
                    .await?
            }
        };

        rows.into_iter().map(OrderRow::into_order).collect()
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Database, DbConfig};
    use storefront_core::{OrderItem, ShippingAddress};

    async fn repo() -> (Database, OrderRepository) {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let orders = db.orders();
        (db, orders)
    }

    fn draft(user_id: &str, quantity: i64) -> OrderDraft {
        OrderDraft::new(
            user_id,
            format!("{}@example.com", user_id),
            vec![OrderItem {
                product_id: "NUT-1709123456789-ABC123".to_string(),
                name: "California Almonds".to_string(),
                unit_price: Money::from_rupees(899),
                weight: "500g".to_string(),
                image: "/images/products/california-almonds.jpg".to_string(),
                quantity,
            }],
            ShippingAddress {
                full_name: "Asha Rao".to_string(),
                address: "12 MG Road, Indiranagar".to_string(),
                city: "Bengaluru".to_string(),
                state: "Karnataka".to_string(),
                pin_code: "560038".to_string(),
                country: "India".to_string(),
                phone: "9876543210".to_string(),
            },
            PaymentMethod::Cod,
        )
    }

    #[tokio::test]
    async fn test_insert_and_get() {
        let (_db, repo) = repo().await;

        let order = repo.insert(&draft("u1", 2)).await.unwrap();
        assert_eq!(order.status, OrderStatus::Pending);
        assert_eq!(order.total, Money::from_rupees(1798));

        let stored = repo.get_by_id(&order.id).await.unwrap().unwrap();
        assert_eq!(stored, order);
        assert!(stored.tracking_updates.is_empty());

        assert!(repo.get_by_id("missing").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_list_is_newest_first_and_per_user() {
        let (_db, repo) = repo().await;

        let first = repo.insert(&draft("u1", 1)).await.unwrap();
        let second = repo.insert(&draft("u1", 2)).await.unwrap();
        repo.insert(&draft("u2", 3)).await.unwrap();

        let orders = repo.list_for_user("u1", None).await.unwrap();
        let ids: Vec<&str> = orders.iter().map(|o| o.id.as_str()).collect();
        assert_eq!(ids, vec![second.id.as_str(), first.id.as_str()]);
        assert!(orders.iter().all(|o| o.user_id == "u1"));
    }

    #[tokio::test]
    async fn test_list_filters_by_status() {
        let (db, repo) = repo().await;
        let order = repo.insert(&draft("u1", 1)).await.unwrap();
        repo.insert(&draft("u1", 1)).await.unwrap();

        sqlx::query("UPDATE orders SET status = 'shipped' WHERE id = ?1")
            .bind(&order.id)
            .execute(db.pool())
            .await
            .unwrap();

        let shipped = repo
            .list_for_user("u1", Some(OrderStatus::Shipped))
            .await
            .unwrap();
        assert_eq!(shipped.len(), 1);
        assert_eq!(shipped[0].id, order.id);

        let pending = repo
            .list_for_user("u1", Some(OrderStatus::Pending))
            .await
            .unwrap();
        assert_eq!(pending.len(), 1);
    }
}
