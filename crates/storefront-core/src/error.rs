//! # Error Types
//!
//! Domain-specific error types for storefront-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  storefront-core errors (this file)                                    │
//! │  ├── CoreError        - General domain errors                          │
//! │  ├── ValidationError  - A single invalid input                         │
//! │  └── FieldErrors      - Every invalid field of a submitted form        │
//! │                                                                         │
//! │  storefront-db errors (separate crate)                                 │
//! │  └── DbError          - Database operation failures                    │
//! │                                                                         │
//! │  App errors                                                            │
//! │  ├── BackendError     - External auth/store failures (code + message)  │
//! │  └── ApiError         - What the presentation layer sees               │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use serde::Serialize;
use thiserror::Error;

// =============================================================================
// Core Error
// =============================================================================

/// Core business logic errors.
#[derive(Debug, Error)]
pub enum CoreError {
    /// Product is not part of the catalog.
    #[error("Product not found: {0}")]
    ProductNotFound(String),

    /// Product exists but is marked out of stock.
    #[error("{0} is currently out of stock")]
    OutOfStock(String),

    /// Checkout was attempted with nothing in the cart.
    #[error("Your cart is empty")]
    EmptyCart,

    /// One or more form fields failed validation.
    #[error("{0}")]
    InvalidForm(FieldErrors),

    /// Validation error (wraps ValidationError).
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// A required field is missing or empty.
    #[error("{field} is required")]
    Required { field: String },

    /// Field value is too short.
    #[error("{field} must be at least {min} characters")]
    TooShort { field: String, min: usize },

    /// Field value is too long.
    #[error("{field} must be at most {max} characters")]
    TooLong { field: String, max: usize },

    /// Field value does not match its expected shape.
    ///
    /// Carries the full user-facing message, e.g.
    /// "Enter a valid 6-digit pincode".
    #[error("{message}")]
    Invalid { field: String, message: String },

    /// Numeric value outside its allowed range.
    #[error("{field} must be between {min} and {max}")]
    OutOfRange { field: String, min: i64, max: i64 },

    /// Value is not in allowed set.
    #[error("{field} must be one of: {allowed:?}")]
    NotAllowed { field: String, allowed: Vec<String> },
}

impl ValidationError {
    pub fn required(field: impl Into<String>) -> Self {
        ValidationError::Required {
            field: field.into(),
        }
    }

    pub fn invalid(field: impl Into<String>, message: impl Into<String>) -> Self {
        ValidationError::Invalid {
            field: field.into(),
            message: message.into(),
        }
    }
}

// =============================================================================
// Field Errors
// =============================================================================

/// A validation failure attached to a named form field.
///
/// `field` is the wire name of the input (`fullName`, `pincode`, ...) so the
/// presentation layer can put the message next to the right control.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

/// All field failures of one form submission, in form order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct FieldErrors(Vec<FieldError>);

impl FieldErrors {
    pub fn new() -> Self {
        FieldErrors(Vec::new())
    }

    /// Records a failure for `field`.
    pub fn push(&mut self, field: impl Into<String>, error: ValidationError) {
        self.0.push(FieldError {
            field: field.into(),
            message: error.to_string(),
        });
    }

    /// Message for a given field, if it failed.
    pub fn get(&self, field: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|e| e.field == field)
            .map(|e| e.message.as_str())
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &FieldError> {
        self.0.iter()
    }

    /// `Ok(value)` when nothing failed, otherwise the collected errors.
    pub fn into_result<T>(self, value: T) -> Result<T, FieldErrors> {
        if self.is_empty() {
            Ok(value)
        } else {
            Err(self)
        }
    }
}

impl std::fmt::Display for FieldErrors {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let messages: Vec<&str> = self.0.iter().map(|e| e.message.as_str()).collect();
        write!(f, "{}", messages.join("; "))
    }
}

impl From<FieldErrors> for CoreError {
    fn from(errors: FieldErrors) -> Self {
        CoreError::InvalidForm(errors)
    }
}

// =============================================================================
// Result Type Alias
// =============================================================================

/// Convenience type alias for Results with CoreError.
pub type CoreResult<T> = Result<T, CoreError>;

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_error_messages() {
        let err = ValidationError::required("Full name");
        assert_eq!(err.to_string(), "Full name is required");

        let err = ValidationError::invalid("pincode", "Enter a valid 6-digit pincode");
        assert_eq!(err.to_string(), "Enter a valid 6-digit pincode");
    }

    #[test]
    fn test_field_errors_lookup_and_display() {
        let mut errors = FieldErrors::new();
        errors.push("city", ValidationError::invalid("city", "Enter a valid city name"));
        errors.push("pincode", ValidationError::required("Pincode"));

        assert_eq!(errors.len(), 2);
        assert_eq!(errors.get("city"), Some("Enter a valid city name"));
        assert_eq!(errors.get("email"), None);
        assert_eq!(
            errors.to_string(),
            "Enter a valid city name; Pincode is required"
        );
    }

    #[test]
    fn test_field_errors_serialize_as_list() {
        let mut errors = FieldErrors::new();
        errors.push("fullName", ValidationError::required("Full name"));

        let json = serde_json::to_string(&errors).unwrap();
        assert_eq!(json, r#"[{"field":"fullName","message":"Full name is required"}]"#);
    }

    #[test]
    fn test_validation_converts_to_core_error() {
        let core_err: CoreError = ValidationError::required("email").into();
        assert!(matches!(core_err, CoreError::Validation(_)));

        let core_err: CoreError = FieldErrors::new().into();
        assert!(matches!(core_err, CoreError::InvalidForm(_)));
    }
}
