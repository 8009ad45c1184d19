//! # Product Identifiers
//!
//! Catalog ids have the shape `PREFIX-TIMESTAMP-RANDOM`:
//!
//! ```text
//! NUT-1709123456789-ABC123
//! ─┬─ ──────┬────── ──┬───
//!  │        │         └── 6 upper-case alphanumerics
//!  │        └──────────── unix millis at generation time
//!  └───────────────────── category prefix (NUT, SPC, DRF)
//! ```

use std::sync::LazyLock;

use chrono::{DateTime, TimeZone, Utc};
use regex::Regex;
use uuid::Uuid;

static PRODUCT_ID_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Z]+-\d+-[A-Z0-9]+$").expect("Invalid regex"));

const RANDOM_LEN: usize = 6;

/// Generates a fresh id for the given category prefix.
///
/// ## Example
/// ```rust
/// use storefront_core::product_id::{generate_product_id, is_valid_product_id};
///
/// let id = generate_product_id("NUT");
/// assert!(id.starts_with("NUT-"));
/// assert!(is_valid_product_id(&id));
/// ```
pub fn generate_product_id(prefix: &str) -> String {
    let random: String = Uuid::new_v4()
        .simple()
        .to_string()
        .chars()
        .take(RANDOM_LEN)
        .collect::<String>()
        .to_uppercase();

    format!(
        "{}-{}-{}",
        prefix.to_uppercase(),
        Utc::now().timestamp_millis(),
        random
    )
}

/// `true` when `id` has the `PREFIX-TIMESTAMP-RANDOM` shape.
pub fn is_valid_product_id(id: &str) -> bool {
    PRODUCT_ID_RE.is_match(id)
}

/// Prefix segment of a well-formed id.
pub fn product_prefix(id: &str) -> Option<&str> {
    if !is_valid_product_id(id) {
        return None;
    }
    id.split('-').next()
}

/// Generation time encoded in a well-formed id.
pub fn product_timestamp(id: &str) -> Option<DateTime<Utc>> {
    if !is_valid_product_id(id) {
        return None;
    }
    let millis: i64 = id.split('-').nth(1)?.parse().ok()?;
    Utc.timestamp_millis_opt(millis).single()
}
