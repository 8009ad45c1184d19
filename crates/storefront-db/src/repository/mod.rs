//! # Repository Module
//!
//! Database repository implementations for the storefront.
//!
//! ## Repository Pattern
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │  App command                                                           │
//! │       │                                                                 │
//! │       │  db.orders().list_for_user(uid, None)                          │
//! │       ▼                                                                 │
//! │  OrderRepository                                                       │
//! │  ├── insert(&self, draft)                                              │
//! │  ├── get_by_id(&self, id)                                              │
//! │  └── list_for_user(&self, uid, status)                                 │
//! │       │                                                                 │
//! │       │  SQL + JSON columns                                            │
//! │       ▼                                                                 │
//! │  SQLite Database                                                       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Available Repositories
//!
//! - [`account::AccountRepository`] - Local accounts, sign-in throttling, password resets
//! - [`profile::ProfileRepository`] - Profile documents with merge writes
//! - [`order::OrderRepository`] - Append-only order documents
//!
//! ## Timestamps
//! Stored as unix milliseconds so `ORDER BY created_at` is numeric.

use chrono::{DateTime, Utc};

pub mod account;
pub mod order;
pub mod profile;

pub(crate) fn to_millis(at: DateTime<Utc>) -> i64 {
    at.timestamp_millis()
}

pub(crate) fn from_millis(millis: i64) -> DateTime<Utc> {
    DateTime::from_timestamp_millis(millis).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_millis_conversion_keeps_millisecond_precision() {
        let at = from_millis(1_709_123_456_789);
        assert_eq!(to_millis(at), 1_709_123_456_789);
    }
}
