//! # Domain Types
//!
//! Core domain types used throughout the storefront.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │    Product      │   │     Order       │   │  UserProfile    │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  id (NUT-…)     │   │  id (generated) │   │  uid            │       │
//! │  │  name, weight   │   │  items (snap)   │   │  email          │       │
//! │  │  price          │   │  status         │   │  address        │       │
//! │  │  category       │   │  total          │   │  preferences    │       │
//! │  └─────────────────┘   └─────────────────┘   └─────────────────┘       │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │  OrderStatus    │   │ PaymentMethod   │   │ PaymentStatus   │       │
//! │  │  Pending …      │   │  Cod            │   │  Pending …      │       │
//! │  │  Cancelled      │   │  Upi            │   │  Refunded       │       │
//! │  └─────────────────┘   └─────────────────┘   └─────────────────┘       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Snapshot Pattern
//! Order line items copy the product name, price, weight and image at
//! checkout time. Order history keeps showing what was bought even if the
//! catalog changes later.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::money::Money;

// =============================================================================
// Product
// =============================================================================

/// A catalog entry. Immutable at runtime.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct Product {
    /// `PREFIX-TIMESTAMP-RANDOM`, e.g. `NUT-1709123456789-ABC123`.
    pub id: String,

    pub name: String,

    /// Selling price.
    pub price: Money,

    /// Price before discount, shown struck through.
    pub original_price: Option<Money>,

    /// Category id (`nuts`, `spices`, `dry-fruits`).
    pub category: String,

    pub image: String,

    pub description: String,

    /// Pack size as printed on the label, e.g. `250g`, `1kg`.
    pub weight: String,

    pub nutritional_info: String,

    pub in_stock: bool,

    /// Shown in the home page "featured" strip.
    pub featured: bool,

    /// Average review rating, 0.0-5.0.
    pub rating: f32,

    /// Number of reviews behind `rating`.
    pub reviews: u32,
}

impl Product {
    /// Whole-percent discount against the original price, if any.
    pub fn discount_percent(&self) -> Option<u32> {
        self.original_price
            .and_then(|original| original.discount_percent(self.price))
    }
}

// =============================================================================
// Order Status
// =============================================================================

/// Lifecycle of an order. The storefront only ever creates `Pending`
/// orders; later transitions are made by the fulfilment side.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
#[serde(rename_all = "lowercase")]
#[ts(export)]
pub enum OrderStatus {
    Pending,
    Confirmed,
    Processing,
    Shipped,
    Delivered,
    Cancelled,
}

impl OrderStatus {
    pub const ALL: [OrderStatus; 6] = [
        OrderStatus::Pending,
        OrderStatus::Confirmed,
        OrderStatus::Processing,
        OrderStatus::Shipped,
        OrderStatus::Delivered,
        OrderStatus::Cancelled,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::Pending => "pending",
            OrderStatus::Confirmed => "confirmed",
            OrderStatus::Processing => "processing",
            OrderStatus::Shipped => "shipped",
            OrderStatus::Delivered => "delivered",
            OrderStatus::Cancelled => "cancelled",
        }
    }
}

impl Default for OrderStatus {
    fn default() -> Self {
        OrderStatus::Pending
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OrderStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        OrderStatus::ALL
            .iter()
            .copied()
            .find(|status| status.as_str() == s)
            .ok_or_else(|| format!("unknown order status: {}", s))
    }
}

// =============================================================================
// Payment
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
#[serde(rename_all = "lowercase")]
#[ts(export)]
pub enum PaymentMethod {
    /// Cash on delivery.
    Cod,
    /// UPI transfer.
    Upi,
}

impl Default for PaymentMethod {
    fn default() -> Self {
        PaymentMethod::Cod
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
#[serde(rename_all = "lowercase")]
#[ts(export)]
pub enum PaymentStatus {
    Pending,
    Completed,
    Failed,
    Refunded,
}

impl Default for PaymentStatus {
    fn default() -> Self {
        PaymentStatus::Pending
    }
}

// =============================================================================
// Orders
// =============================================================================

/// Where an order ships to. Taken from the checkout form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct ShippingAddress {
    pub full_name: String,
    pub address: String,
    pub city: String,
    pub state: String,
    pub pin_code: String,
    pub country: String,
    pub phone: String,
}

/// A line item in an order.
/// Uses snapshot pattern to freeze product data at time of checkout.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct OrderItem {
    pub product_id: String,
    /// Product name at time of checkout (frozen).
    pub name: String,
    /// Unit price at time of checkout (frozen).
    pub unit_price: Money,
    pub weight: String,
    pub image: String,
    pub quantity: i64,
}

impl OrderItem {
    pub fn from_product(product: &Product, quantity: i64) -> Self {
        OrderItem {
            product_id: product.id.clone(),
            name: product.name.clone(),
            unit_price: product.price,
            weight: product.weight.clone(),
            image: product.image.clone(),
            quantity,
        }
    }

    /// Unit price × quantity.
    pub fn line_total(&self) -> Money {
        self.unit_price.multiply_quantity(self.quantity)
    }
}

/// A fulfilment event appended by the back office.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct TrackingUpdate {
    pub status: OrderStatus,
    #[ts(as = "String")]
    pub timestamp: DateTime<Utc>,
    pub message: String,
}

/// An order as submitted at checkout, before the store assigns an id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct OrderDraft {
    pub user_id: String,
    pub user_email: String,
    pub items: Vec<OrderItem>,
    pub total: Money,
    pub shipping_address: ShippingAddress,
    pub payment_method: PaymentMethod,
    pub status: OrderStatus,
    pub payment_status: PaymentStatus,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
}

impl OrderDraft {
    /// Builds a pending order; the total is derived from the items.
    pub fn new(
        user_id: impl Into<String>,
        user_email: impl Into<String>,
        items: Vec<OrderItem>,
        shipping_address: ShippingAddress,
        payment_method: PaymentMethod,
    ) -> Self {
        let total = items.iter().map(OrderItem::line_total).sum();
        OrderDraft {
            user_id: user_id.into(),
            user_email: user_email.into(),
            items,
            total,
            shipping_address,
            payment_method,
            status: OrderStatus::Pending,
            payment_status: PaymentStatus::Pending,
            created_at: Utc::now(),
        }
    }
}

/// A persisted order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct Order {
    pub id: String,
    pub user_id: String,
    pub user_email: String,
    pub items: Vec<OrderItem>,
    pub total: Money,
    pub status: OrderStatus,
    pub payment_method: PaymentMethod,
    pub payment_status: PaymentStatus,
    pub shipping_address: ShippingAddress,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
    pub tracking_updates: Vec<TrackingUpdate>,
}

/// Last 8 characters of an order id, upper-cased.
pub fn order_display_number(id: &str) -> String {
    let chars: Vec<char> = id.chars().collect();
    let start = chars.len().saturating_sub(8);
    chars[start..].iter().collect::<String>().to_uppercase()
}

impl Order {
    /// Short customer-facing number: last 8 characters of the id,
    /// upper-cased.
    pub fn display_number(&self) -> String {
        order_display_number(&self.id)
    }

    /// Total number of units across all lines.
    pub fn item_count(&self) -> i64 {
        self.items.iter().map(|i| i.quantity).sum()
    }
}

// =============================================================================
// Users
// =============================================================================

/// How an account signs in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
#[serde(rename_all = "lowercase")]
#[ts(export)]
pub enum AuthProvider {
    /// Email and password.
    Password,
    /// Google OAuth.
    Google,
}

impl AuthProvider {
    pub fn as_str(&self) -> &'static str {
        match self {
            AuthProvider::Password => "password",
            AuthProvider::Google => "google",
        }
    }
}

/// Postal address kept on the profile.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct Address {
    pub street: String,
    pub city: String,
    pub state: String,
    pub pin_code: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "lowercase")]
#[ts(export)]
pub enum Theme {
    Light,
    Dark,
}

impl Default for Theme {
    fn default() -> Self {
        Theme::Light
    }
}

/// Notification and display preferences, embedded in the profile.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase", default)]
#[ts(export)]
pub struct UserPreferences {
    pub email_notifications: bool,
    pub order_updates: bool,
    pub promotional_emails: bool,
    pub theme: Theme,
    pub language: String,
}

impl Default for UserPreferences {
    fn default() -> Self {
        UserPreferences {
            email_notifications: true,
            order_updates: true,
            promotional_emails: false,
            theme: Theme::Light,
            language: "en".to_string(),
        }
    }
}

/// Per-user contact and preference record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct UserProfile {
    pub uid: String,
    pub email: String,
    pub display_name: Option<String>,
    pub phone_number: Option<String>,
    pub address: Option<Address>,
    #[serde(default)]
    pub preferences: UserPreferences,
}

impl UserProfile {
    /// Profile shown before the user has saved anything.
    pub fn empty(uid: impl Into<String>, email: impl Into<String>) -> Self {
        UserProfile {
            uid: uid.into(),
            email: email.into(),
            display_name: None,
            phone_number: None,
            address: None,
            preferences: UserPreferences::default(),
        }
    }
}

/// Contact fields a user can edit on the profile page.
///
/// Written with merge semantics: preferences are left untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct ProfileUpdate {
    pub display_name: Option<String>,
    pub phone_number: Option<String>,
    pub address: Option<Address>,
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_address() -> ShippingAddress {
        ShippingAddress {
            full_name: "Asha Rao".to_string(),
            address: "12 MG Road, Indiranagar".to_string(),
            city: "Bengaluru".to_string(),
            state: "Karnataka".to_string(),
            pin_code: "560038".to_string(),
            country: "India".to_string(),
            phone: "9876543210".to_string(),
        }
    }

    fn sample_item(price_rupees: i64, quantity: i64) -> OrderItem {
        OrderItem {
            product_id: "NUT-1709123456789-ABC123".to_string(),
            name: "Almonds".to_string(),
            unit_price: Money::from_rupees(price_rupees),
            weight: "250g".to_string(),
            image: "/images/almonds.jpg".to_string(),
            quantity,
        }
    }

    #[test]
    fn test_order_status_round_trips_through_str() {
        for status in OrderStatus::ALL {
            assert_eq!(status.as_str().parse::<OrderStatus>().unwrap(), status);
        }
        assert!("lost".parse::<OrderStatus>().is_err());
        assert_eq!(OrderStatus::default(), OrderStatus::Pending);
    }

    #[test]
    fn test_draft_total_is_sum_of_lines() {
        let draft = OrderDraft::new(
            "uid-1",
            "asha@example.com",
            vec![sample_item(450, 2), sample_item(120, 1)],
            sample_address(),
            PaymentMethod::Upi,
        );

        assert_eq!(draft.total, Money::from_rupees(1020));
        assert_eq!(draft.status, OrderStatus::Pending);
        assert_eq!(draft.payment_status, PaymentStatus::Pending);
    }

    #[test]
    fn test_display_number() {
        let order = Order {
            id: "a1b2c3d4e5f6g7h8".to_string(),
            user_id: "uid-1".to_string(),
            user_email: "asha@example.com".to_string(),
            items: vec![sample_item(100, 3)],
            total: Money::from_rupees(300),
            status: OrderStatus::Shipped,
            payment_method: PaymentMethod::Cod,
            payment_status: PaymentStatus::Pending,
            shipping_address: sample_address(),
            created_at: Utc::now(),
            updated_at: Utc::now(),
            tracking_updates: Vec::new(),
        };

        assert_eq!(order.display_number(), "E5F6G7H8");
        assert_eq!(order.item_count(), 3);
    }

    #[test]
    fn test_preferences_fill_missing_fields_with_defaults() {
        let prefs: UserPreferences = serde_json::from_str(r#"{"theme":"dark"}"#).unwrap();
        assert_eq!(prefs.theme, Theme::Dark);
        assert!(prefs.email_notifications);
        assert!(!prefs.promotional_emails);
        assert_eq!(prefs.language, "en");
    }

    #[test]
    fn test_enums_serialize_lowercase() {
        assert_eq!(serde_json::to_string(&PaymentMethod::Cod).unwrap(), r#""cod""#);
        assert_eq!(
            serde_json::to_string(&OrderStatus::Processing).unwrap(),
            r#""processing""#
        );
    }
}
