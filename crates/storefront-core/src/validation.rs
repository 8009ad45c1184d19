//! # Validation Module
//!
//! Form rules for checkout and account credentials.
//!
//! ## Checkout Rules
//! ```text
//! ┌─────────────┬──────────────────────────────────────┬──────────────────────────────┐
//! │ Field       │ Rule (after trim)                    │ Message when it fails        │
//! ├─────────────┼──────────────────────────────────────┼──────────────────────────────┤
//! │ fullName    │ letters/spaces, 2-50                 │ Name should be 2-50 ...      │
//! │ phoneNumber │ 10 digits starting 6-9               │ Enter a valid 10-digit ...   │
//! │ email       │ local@domain.tld                     │ Enter a valid email address  │
//! │ address     │ at least 10 characters               │ Please enter a complete ...  │
//! │ city        │ letters/spaces, 2-30                 │ Enter a valid city name      │
//! │ state       │ letters/spaces, 2-30                 │ Enter a valid state name     │
//! │ pincode     │ 6 digits, no leading zero            │ Enter a valid 6-digit ...    │
//! │ country     │ non-empty                            │ Country is required          │
//! └─────────────┴──────────────────────────────────────┴──────────────────────────────┘
//! ```
//!
//! Every field is checked; the caller gets all failures at once, keyed by
//! field name, so each message can sit next to its input.
//!
//! ## Usage
//! ```rust
//! use storefront_core::validation::{validate_checkout, CheckoutForm};
//!
//! let form = CheckoutForm {
//!     full_name: "Asha Rao".into(),
//!     phone_number: "9876543210".into(),
//!     email: "Asha@Example.com ".into(),
//!     address: "12 MG Road, Indiranagar".into(),
//!     city: "Bengaluru".into(),
//!     state: "Karnataka".into(),
//!     pincode: "560038".into(),
//!     ..Default::default()
//! };
//!
//! let clean = validate_checkout(&form).unwrap();
//! assert_eq!(clean.email, "asha@example.com");
//! ```

use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::error::{FieldErrors, ValidationError};
use crate::types::{PaymentMethod, ShippingAddress};
use crate::MAX_ITEM_QUANTITY;

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

/// Minimum password length accepted at sign-up.
pub const MIN_PASSWORD_LEN: usize = 6;

/// Minimum length of a street address.
pub const MIN_ADDRESS_LEN: usize = 10;

pub const DEFAULT_COUNTRY: &str = "India";

static NAME_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[a-zA-Z\s]{2,50}$").expect("Invalid regex"));

static PHONE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[6-9][0-9]{9}$").expect("Invalid regex"));

static EMAIL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[a-zA-Z0-9._%+-]+@[a-zA-Z0-9.-]+\.[a-zA-Z]{2,}$").expect("Invalid regex")
});

static PLACE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[a-zA-Z\s]{2,30}$").expect("Invalid regex"));

static PINCODE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[1-9][0-9]{5}$").expect("Invalid regex"));

// =============================================================================
// Checkout Form
// =============================================================================

/// Raw checkout form input, as typed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase", default)]
#[ts(export)]
pub struct CheckoutForm {
    pub full_name: String,
    pub phone_number: String,
    pub email: String,
    pub address: String,
    pub city: String,
    pub state: String,
    pub pincode: String,
    pub country: String,
    pub payment_method: PaymentMethod,
}

impl Default for CheckoutForm {
    fn default() -> Self {
        CheckoutForm {
            full_name: String::new(),
            phone_number: String::new(),
            email: String::new(),
            address: String::new(),
            city: String::new(),
            state: String::new(),
            pincode: String::new(),
            country: DEFAULT_COUNTRY.to_string(),
            payment_method: PaymentMethod::Cod,
        }
    }
}

impl CheckoutForm {
    /// Trims every field and lower-cases the email.
    pub fn sanitized(&self) -> CheckoutForm {
        CheckoutForm {
            full_name: self.full_name.trim().to_string(),
            phone_number: self.phone_number.trim().to_string(),
            email: self.email.trim().to_lowercase(),
            address: self.address.trim().to_string(),
            city: self.city.trim().to_string(),
            state: self.state.trim().to_string(),
            pincode: self.pincode.trim().to_string(),
            country: self.country.trim().to_string(),
            payment_method: self.payment_method,
        }
    }

    /// Shipping block of an order built from this form.
    pub fn to_shipping_address(&self) -> ShippingAddress {
        ShippingAddress {
            full_name: self.full_name.clone(),
            address: self.address.clone(),
            city: self.city.clone(),
            state: self.state.clone(),
            pin_code: self.pincode.clone(),
            country: self.country.clone(),
            phone: self.phone_number.clone(),
        }
    }
}

/// Checks one field: `Required` when blank, otherwise `rule` decides.
fn check_field(
    errors: &mut FieldErrors,
    field: &str,
    label: &str,
    value: &str,
    rule: impl Fn(&str) -> bool,
    message: &str,
) {
    let value = value.trim();
    if value.is_empty() {
        errors.push(field, ValidationError::required(label));
    } else if !rule(value) {
        errors.push(field, ValidationError::invalid(field, message));
    }
}

/// Validates a checkout form and returns its sanitized copy.
///
/// ## Returns
/// - `Ok(form)` trimmed, email lower-cased
/// - `Err(errors)` with one entry per failing field, in form order
pub fn validate_checkout(form: &CheckoutForm) -> Result<CheckoutForm, FieldErrors> {
    let mut errors = FieldErrors::new();

    check_field(
        &mut errors,
        "fullName",
        "Full name",
        &form.full_name,
        |v| NAME_RE.is_match(v),
        "Name should be 2-50 characters long and contain only letters",
    );
    check_field(
        &mut errors,
        "phoneNumber",
        "Phone number",
        &form.phone_number,
        |v| PHONE_RE.is_match(v),
        "Enter a valid 10-digit Indian phone number",
    );
    check_field(
        &mut errors,
        "email",
        "Email",
        &form.email,
        |v| EMAIL_RE.is_match(v),
        "Enter a valid email address",
    );
    check_field(
        &mut errors,
        "address",
        "Address",
        &form.address,
        |v| v.chars().count() >= MIN_ADDRESS_LEN,
        "Please enter a complete address (minimum 10 characters)",
    );
    check_field(
        &mut errors,
        "city",
        "City",
        &form.city,
        |v| PLACE_RE.is_match(v),
        "Enter a valid city name",
    );
    check_field(
        &mut errors,
        "state",
        "State",
        &form.state,
        |v| PLACE_RE.is_match(v),
        "Enter a valid state name",
    );
    check_field(
        &mut errors,
        "pincode",
        "Pincode",
        &form.pincode,
        |v| PINCODE_RE.is_match(v),
        "Enter a valid 6-digit pincode",
    );
    check_field(&mut errors, "country", "Country", &form.country, |_| true, "");

    errors.into_result(form.sanitized())
}

// =============================================================================
// Credential Validators
// =============================================================================

/// `true` when `email` looks like `local@domain.tld`.
pub fn is_valid_email(email: &str) -> bool {
    EMAIL_RE.is_match(email.trim())
}

/// Validates an account email.
///
/// ## Example
/// ```rust
/// use storefront_core::validation::validate_email;
///
/// assert!(validate_email("asha@example.com").is_ok());
/// assert!(validate_email("asha@").is_err());
/// ```
pub fn validate_email(email: &str) -> ValidationResult<()> {
    if email.trim().is_empty() {
        return Err(ValidationError::required("Email"));
    }
    if !is_valid_email(email) {
        return Err(ValidationError::invalid(
            "email",
            "Please enter a valid email address.",
        ));
    }
    Ok(())
}

/// Validates a new password.
pub fn validate_password(password: &str) -> ValidationResult<()> {
    if password.is_empty() {
        return Err(ValidationError::required("Password"));
    }
    if password.chars().count() < MIN_PASSWORD_LEN {
        return Err(ValidationError::TooShort {
            field: "Password".to_string(),
            min: MIN_PASSWORD_LEN,
        });
    }
    Ok(())
}

// =============================================================================
// Cart Quantities
// =============================================================================

/// Validates the quantity a cart line would end up holding.
///
/// ## Rules
/// - At least 1
/// - At most [`MAX_ITEM_QUANTITY`]
pub fn validate_quantity(qty: i64) -> ValidationResult<()> {
    if qty <= 0 {
        return Err(ValidationError::invalid(
            "quantity",
            "Quantity must be at least 1",
        ));
    }
    if qty > MAX_ITEM_QUANTITY {
        return Err(ValidationError::OutOfRange {
            field: "Quantity".to_string(),
            min: 1,
            max: MAX_ITEM_QUANTITY,
        });
    }
    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================
