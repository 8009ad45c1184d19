//! # API Error Type
//!
//! Unified error type for storefront commands.
//!
//! ## Error Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Error Flow in the Storefront                         │
//! │                                                                         │
//! │  Command Function  ─►  Result<T, ApiError>                              │
//! │                                                                         │
//! │  FieldErrors (checkout form) ─────────► VALIDATION_ERROR + fields       │
//! │  CoreError (catalog, cart) ───────────► NOT_FOUND / CART_ERROR / ...    │
//! │  AuthError (session holder) ──────────► AUTH_ERROR                      │
//! │  BackendError (document store) ───────► DATABASE_ERROR                  │
//! │  DbError (startup only) ──────────────► DATABASE_ERROR                  │
//! │                                                                         │
//! │  Unexpected details are logged; the caller sees a generic message.     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Serialization
//! What the presentation layer receives when a command fails:
//! ```json
//! {
//!   "code": "VALIDATION_ERROR",
//!   "message": "Enter a valid 6-digit pincode",
//!   "fields": [{ "field": "pincode", "message": "Enter a valid 6-digit pincode" }]
//! }
//! ```

use serde::Serialize;
use storefront_core::{CoreError, FieldErrors, ValidationError};
use storefront_db::DbError;

use crate::backend::{codes, BackendError};
use crate::state::AuthError;

/// API error returned from commands.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiError {
    /// Machine-readable error code for programmatic handling
    pub code: ErrorCode,

    /// Human-readable error message for display
    pub message: String,

    /// Per-field messages for form submissions.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fields: Option<FieldErrors>,
}

/// Error codes for API responses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    /// Resource not found (404)
    NotFound,

    /// Input validation failed (400)
    ValidationError,

    /// Store operation failed (500)
    DatabaseError,

    /// No signed-in user (401)
    Unauthenticated,

    /// Signed in, but not allowed (403)
    Forbidden,

    /// Auth operation failed; message is user-facing
    AuthError,

    /// Cart operation failed
    CartError,

    /// Order could not be placed
    OrderError,

    /// Internal server error (500)
    Internal,
}

impl ApiError {
    /// Creates a new API error.
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        ApiError {
            code,
            message: message.into(),
            fields: None,
        }
    }

    /// Creates a not found error.
    pub fn not_found(resource: &str, id: &str) -> Self {
        ApiError::new(
            ErrorCode::NotFound,
            format!("{} not found: {}", resource, id),
        )
    }

    /// Creates a validation error.
    pub fn validation(message: impl Into<String>) -> Self {
        ApiError::new(ErrorCode::ValidationError, message)
    }

    /// Creates an internal error.
    pub fn internal(message: impl Into<String>) -> Self {
        ApiError::new(ErrorCode::Internal, message)
    }

    /// Creates a cart error.
    pub fn cart(message: impl Into<String>) -> Self {
        ApiError::new(ErrorCode::CartError, message)
    }

    pub fn unauthenticated() -> Self {
        ApiError::new(ErrorCode::Unauthenticated, "Please sign in to continue")
    }

    pub fn forbidden(message: impl Into<String>) -> Self {
        ApiError::new(ErrorCode::Forbidden, message)
    }

    pub fn order(message: impl Into<String>) -> Self {
        ApiError::new(ErrorCode::OrderError, message)
    }
}

/// Checkout form failures keep every field message.
impl From<FieldErrors> for ApiError {
    fn from(errors: FieldErrors) -> Self {
        let message = errors
            .iter()
            .next()
            .map(|e| e.message.clone())
            .unwrap_or_else(|| "Please correct the highlighted fields".to_string());

        ApiError {
            code: ErrorCode::ValidationError,
            message,
            fields: Some(errors),
        }
    }
}

impl From<ValidationError> for ApiError {
    fn from(err: ValidationError) -> Self {
        ApiError::validation(err.to_string())
    }
}

/// Converts core errors to API errors.
impl From<CoreError> for ApiError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::ProductNotFound(id) => ApiError::not_found("Product", &id),
            CoreError::OutOfStock(_) => ApiError::cart(err.to_string()),
            CoreError::EmptyCart => ApiError::cart(err.to_string()),
            CoreError::InvalidForm(errors) => ApiError::from(errors),
            CoreError::Validation(e) => ApiError::validation(e.to_string()),
        }
    }
}

impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        ApiError::new(ErrorCode::AuthError, err.message)
    }
}

/// Document store errors. The detail was already logged at the seam.
impl From<BackendError> for ApiError {
    fn from(err: BackendError) -> Self {
        let message = match err.code.as_str() {
            codes::STORE_UNAVAILABLE => "The store is unavailable. Please try again later.",
            codes::STORE_INVALID_DOCUMENT => "Stored data could not be read",
            _ => "Database operation failed",
        };
        ApiError::new(ErrorCode::DatabaseError, message)
    }
}

/// Converts database errors to API errors.
impl From<DbError> for ApiError {
    fn from(err: DbError) -> Self {
        match err {
            DbError::NotFound { entity, id } => ApiError::not_found(&entity, &id),
            DbError::ConnectionFailed(_) => {
                ApiError::new(ErrorCode::DatabaseError, "Database connection failed")
            }
            DbError::MigrationFailed(e) => {
                tracing::error!("Database migration failed: {}", e);
                ApiError::new(ErrorCode::DatabaseError, "Database migration failed")
            }
            DbError::PoolExhausted => {
                ApiError::new(ErrorCode::DatabaseError, "Database pool exhausted")
            }
            other => {
                tracing::error!("Database operation failed: {}", other);
                ApiError::new(ErrorCode::DatabaseError, "Database operation failed")
            }
        }
    }
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{:?}] {}", self.code, self.message)
    }
}

impl std::error::Error for ApiError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_field_errors_keep_every_field() {
        let mut errors = FieldErrors::new();
        errors.push("fullName", ValidationError::required("Full name"));
        errors.push("pincode", ValidationError::invalid("pincode", "Enter a valid 6-digit pincode"));

        let err = ApiError::from(errors);
        assert_eq!(err.code, ErrorCode::ValidationError);
        assert_eq!(err.fields.as_ref().map(|f| f.len()), Some(2));

        let json = serde_json::to_value(&err).unwrap();
        assert_eq!(json["code"], "VALIDATION_ERROR");
        assert_eq!(json["fields"][1]["field"], "pincode");
    }

    #[test]
    fn test_plain_errors_omit_fields() {
        let json = serde_json::to_value(ApiError::unauthenticated()).unwrap();
        assert_eq!(json["code"], "UNAUTHENTICATED");
        assert!(json.get("fields").is_none());
    }

    #[test]
    fn test_core_errors() {
        let err = ApiError::from(CoreError::ProductNotFound("NUT-1-X".to_string()));
        assert_eq!(err.code, ErrorCode::NotFound);

        let err = ApiError::from(CoreError::EmptyCart);
        assert_eq!(err.code, ErrorCode::CartError);
        assert_eq!(err.message, "Your cart is empty");
    }

    #[test]
    fn test_store_errors_hide_detail() {
        let err = ApiError::from(BackendError::new(codes::STORE_INTERNAL, "disk I/O error"));
        assert_eq!(err.code, ErrorCode::DatabaseError);
        assert!(!err.message.contains("disk"));
    }
}
