//! # External Service Contracts
//!
//! The storefront delegates authentication and persistence to an external
//! auth + document-database service. Everything the app needs from it goes
//! through two traits.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         storefront-app                                  │
//! │                                                                         │
//! │   SessionHolder ──────────► dyn AuthBackend                             │
//! │   commands::auth            ├── create_user / sign_in / sign_out        │
//! │                             ├── send_password_reset                     │
//! │                             ├── sign_in_with_popup / _redirect          │
//! │                             ├── take_redirect_result                    │
//! │                             └── current_user / subscribe (watch)        │
//! │                                                                         │
//! │   commands::checkout ─────► dyn DocumentStore                           │
//! │   commands::orders          ├── add_order / get_order                   │
//! │   commands::profile         ├── orders_for_user                         │
//! │                             └── get_profile / merge_profile / …         │
//! └────────────────────────────────────┬────────────────────────────────────┘
//!                                      │ BackendError { code, message }
//!                                      ▼
//!                    LocalBackend (SQLite) or any hosted service
//! ```
//!
//! Errors cross the seam as [`BackendError`] carrying the service's
//! namespaced code (`auth/invalid-email`, `store/unavailable`, ...). The
//! app maps known codes to user-facing messages; see `state::session`.

pub mod local;
pub mod store;

use std::collections::BTreeMap;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio::sync::watch;

use storefront_core::{
    AuthProvider, Order, OrderDraft, OrderStatus, ProfileUpdate, UserPreferences, UserProfile,
};

pub use local::{GoogleIdentity, LocalBackend, LocalBackendConfig};

// =============================================================================
// Error Codes
// =============================================================================

/// Error codes raised by the auth service.
pub mod codes {
    pub const EMAIL_ALREADY_IN_USE: &str = "auth/email-already-in-use";
    pub const WEAK_PASSWORD: &str = "auth/weak-password";
    pub const INVALID_EMAIL: &str = "auth/invalid-email";
    pub const INVALID_CREDENTIAL: &str = "auth/invalid-credential";
    pub const INVALID_CREDENTIALS: &str = "auth/invalid-credentials";
    pub const USER_NOT_FOUND: &str = "auth/user-not-found";
    pub const WRONG_PASSWORD: &str = "auth/wrong-password";
    pub const TOO_MANY_REQUESTS: &str = "auth/too-many-requests";
    pub const POPUP_BLOCKED: &str = "auth/popup-blocked";
    pub const POPUP_CLOSED_BY_USER: &str = "auth/popup-closed-by-user";
    pub const CANCELLED_POPUP_REQUEST: &str = "auth/cancelled-popup-request";
    pub const NETWORK_REQUEST_FAILED: &str = "auth/network-request-failed";
    pub const CREDENTIAL_ALREADY_IN_USE: &str = "auth/credential-already-in-use";
    pub const OPERATION_NOT_ALLOWED: &str = "auth/operation-not-allowed";
    pub const INTERNAL_ERROR: &str = "auth/internal-error";

    pub const STORE_UNAVAILABLE: &str = "store/unavailable";
    pub const STORE_INVALID_DOCUMENT: &str = "store/invalid-document";
    pub const STORE_INTERNAL: &str = "store/internal";
}

/// An error reported by the external service.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
#[error("{message} ({code})")]
pub struct BackendError {
    /// Namespaced machine code, e.g. `auth/invalid-email`.
    pub code: String,
    /// Service-provided detail. Not shown to users as is.
    pub message: String,
}

impl BackendError {
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        BackendError {
            code: code.into(),
            message: message.into(),
        }
    }

    /// `true` when the error carries `code`.
    pub fn is(&self, code: &str) -> bool {
        self.code == code
    }
}

pub type BackendResult<T> = Result<T, BackendError>;

// =============================================================================
// Auth Types
// =============================================================================

/// The signed-in user as reported by the auth service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthUser {
    pub uid: String,
    pub email: String,
    pub display_name: Option<String>,
    pub provider: AuthProvider,
    /// Signed id token for the current session.
    #[serde(skip_serializing, default)]
    pub id_token: String,
}

/// An OAuth sign-in request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OAuthRequest {
    /// Provider id, e.g. `google.com`.
    pub provider_id: String,
    pub scopes: Vec<String>,
    pub custom_parameters: BTreeMap<String, String>,
}

impl OAuthRequest {
    /// Google sign-in asking for profile and email, always showing the
    /// account chooser.
    pub fn google() -> Self {
        let mut custom_parameters = BTreeMap::new();
        custom_parameters.insert("prompt".to_string(), "select_account".to_string());
        custom_parameters.insert("display".to_string(), "popup".to_string());

        OAuthRequest {
            provider_id: "google.com".to_string(),
            scopes: vec!["profile".to_string(), "email".to_string()],
            custom_parameters,
        }
    }
}

// =============================================================================
// Contracts
// =============================================================================

/// Authentication side of the external service.
#[async_trait]
pub trait AuthBackend: Send + Sync {
    /// Registers an email/password account and signs it in.
    async fn create_user(&self, email: &str, password: &str) -> BackendResult<AuthUser>;

    async fn sign_in(&self, email: &str, password: &str) -> BackendResult<AuthUser>;

    async fn sign_out(&self) -> BackendResult<()>;

    /// Sends a password-reset email.
    async fn send_password_reset(&self, email: &str) -> BackendResult<()>;

    /// OAuth sign-in that completes in place.
    async fn sign_in_with_popup(&self, request: &OAuthRequest) -> BackendResult<AuthUser>;

    /// Starts an OAuth sign-in that completes after navigating away and back.
    async fn sign_in_with_redirect(&self, request: &OAuthRequest) -> BackendResult<()>;

    /// Result of a redirect sign-in, once; `None` when there is none pending.
    async fn take_redirect_result(&self) -> BackendResult<Option<AuthUser>>;

    fn current_user(&self) -> Option<AuthUser>;

    /// Session-change notifications. The receiver sees the current value
    /// immediately and every change after it.
    fn subscribe(&self) -> watch::Receiver<Option<AuthUser>>;
}

/// Document-database side of the external service.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    async fn get_profile(&self, uid: &str) -> BackendResult<Option<UserProfile>>;

    /// Merge-writes contact fields; creates the document if missing.
    async fn merge_profile(
        &self,
        uid: &str,
        email: &str,
        update: &ProfileUpdate,
    ) -> BackendResult<()>;

    /// Merge-writes preferences; creates the document if missing.
    async fn merge_preferences(
        &self,
        uid: &str,
        email: &str,
        preferences: &UserPreferences,
    ) -> BackendResult<()>;

    /// Appends an order and returns its generated id.
    async fn add_order(&self, draft: &OrderDraft) -> BackendResult<String>;

    async fn get_order(&self, id: &str) -> BackendResult<Option<Order>>;

    /// Orders of `uid`, newest first.
    async fn orders_for_user(
        &self,
        uid: &str,
        status: Option<OrderStatus>,
    ) -> BackendResult<Vec<Order>>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_google_request_parameters() {
        let request = OAuthRequest::google();
        assert_eq!(request.scopes, vec!["profile", "email"]);
        assert_eq!(
            request.custom_parameters.get("prompt").map(String::as_str),
            Some("select_account")
        );
        assert_eq!(
            request.custom_parameters.get("display").map(String::as_str),
            Some("popup")
        );
    }

    #[test]
    fn test_auth_user_never_serializes_token() {
        let user = AuthUser {
            uid: "u1".to_string(),
            email: "asha@example.com".to_string(),
            display_name: None,
            provider: AuthProvider::Password,
            id_token: "secret.jwt.value".to_string(),
        };

        let json = serde_json::to_string(&user).unwrap();
        assert!(!json.contains("secret.jwt.value"));
        assert!(json.contains("\"provider\":\"password\""));
    }

    #[test]
    fn test_error_display_includes_code() {
        let err = BackendError::new(codes::INVALID_EMAIL, "badly formatted");
        assert!(err.is(codes::INVALID_EMAIL));
        assert_eq!(err.to_string(), "badly formatted (auth/invalid-email)");
    }
}
