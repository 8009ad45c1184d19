//! # Auth Session Holder
//!
//! Wraps the auth service's session-change stream and is the only place the
//! app performs auth operations.
//!
//! ## Lifecycle
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        SessionHolder                                    │
//! │                                                                         │
//! │  new()      snapshot = { user: None, loading: true }                    │
//! │    │                                                                    │
//! │    ▼                                                                    │
//! │  start()    1. backend.subscribe()                                      │
//! │             2. spawn listener ── on every change ──► snapshot =         │
//! │                                                 { user, loading: false }│
//! │             3. take_redirect_result() ── log success / mapped error     │
//! │    │                                                                    │
//! │    ▼                                                                    │
//! │  shutdown() listener aborted; snapshot frozen                           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Error Messages
//! Every operation wraps exactly one backend call. Known error codes turn
//! into fixed, user-facing messages; anything else becomes the operation's
//! fallback message and the raw error is logged.
//!
//! ## Google Sign-In
//! Phones and narrow viewports get the redirect flow; everything else gets
//! the popup. See [`choose_flow`].

use std::sync::{Arc, LazyLock, Mutex, PoisonError};

use regex::Regex;
use serde::Serialize;
use thiserror::Error;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

use crate::backend::{codes, AuthBackend, AuthUser, BackendError, OAuthRequest};

// =============================================================================
// Flow Selection
// =============================================================================

static MOBILE_USER_AGENT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)iPhone|iPad|iPod|Android").expect("Invalid regex"));

/// How the Google sign-in is carried out.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum AuthFlow {
    Popup,
    Redirect,
}

/// Redirect for mobile user agents or viewports at most `breakpoint_px`
/// wide; popup otherwise.
pub fn choose_flow(user_agent: &str, viewport_width: u32, breakpoint_px: u32) -> AuthFlow {
    if MOBILE_USER_AGENT.is_match(user_agent) || viewport_width <= breakpoint_px {
        AuthFlow::Redirect
    } else {
        AuthFlow::Popup
    }
}

// =============================================================================
// Error Mapping
// =============================================================================

/// The auth operations that report user-facing errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthOperation {
    SignUp,
    SignIn,
    Google,
    ResetPassword,
    SignOut,
}

impl AuthOperation {
    /// Message for a known error code.
    pub fn known_message(self, code: &str) -> Option<&'static str> {
        let message = match (self, code) {
            (AuthOperation::SignUp, codes::EMAIL_ALREADY_IN_USE) => {
                "This email is already registered. Please sign in instead."
            }
            (AuthOperation::SignUp, codes::WEAK_PASSWORD) => {
                "Password should be at least 6 characters long."
            }
            (AuthOperation::SignUp | AuthOperation::SignIn, codes::INVALID_EMAIL) => {
                "Please enter a valid email address."
            }
            (AuthOperation::SignIn, codes::INVALID_CREDENTIAL | codes::INVALID_CREDENTIALS) => {
                "Invalid email or password. Please try again."
            }
            (AuthOperation::SignIn, codes::TOO_MANY_REQUESTS) => {
                "Too many failed attempts. Please try again later."
            }
            (AuthOperation::Google, codes::POPUP_BLOCKED) => {
                "Sign in popup was blocked. Please allow popups or try again on mobile."
            }
            (AuthOperation::Google, codes::POPUP_CLOSED_BY_USER) => {
                "Sign in was cancelled. Please try again."
            }
            (AuthOperation::Google, codes::CANCELLED_POPUP_REQUEST) => {
                "Another sign in attempt is in progress. Please wait."
            }
            (AuthOperation::Google, codes::NETWORK_REQUEST_FAILED) => {
                "Network error. Please check your internet connection and try again."
            }
            (AuthOperation::ResetPassword, codes::USER_NOT_FOUND) => {
                "No account found with this email."
            }
            _ => return None,
        };
        Some(message)
    }

    /// Message for any error the operation does not know.
    pub fn fallback_message(self) -> &'static str {
        match self {
            AuthOperation::SignUp => "Failed to create account. Please try again.",
            AuthOperation::SignIn => "Failed to sign in. Please try again.",
            AuthOperation::Google => "Failed to sign in with Google. Please try again.",
            AuthOperation::ResetPassword => {
                "Failed to send password reset email. Please try again."
            }
            AuthOperation::SignOut => "Failed to sign out. Please try again.",
        }
    }

    /// Known message or fallback.
    pub fn message_for(self, code: &str) -> &'static str {
        self.known_message(code)
            .unwrap_or_else(|| self.fallback_message())
    }
}

/// A failed auth operation, ready to show to the user.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize)]
#[serde(rename_all = "camelCase")]
#[error("{message}")]
pub struct AuthError {
    /// Backend code that caused it.
    pub code: String,
    pub message: String,
}

impl AuthError {
    fn from_backend(operation: AuthOperation, err: BackendError) -> Self {
        match operation.known_message(&err.code) {
            Some(message) => {
                debug!(?operation, code = %err.code, "Auth operation rejected");
                AuthError {
                    code: err.code,
                    message: message.to_string(),
                }
            }
            None => {
                error!(?operation, error = %err, "Auth operation failed");
                AuthError {
                    code: err.code,
                    message: operation.fallback_message().to_string(),
                }
            }
        }
    }
}

/// Logs a failed redirect sign-in found at start-up.
fn log_redirect_error(err: &BackendError) {
    match err.code.as_str() {
        codes::CREDENTIAL_ALREADY_IN_USE => {
            error!(code = %err.code, "Account already exists with a different credential")
        }
        codes::OPERATION_NOT_ALLOWED => {
            error!(code = %err.code, "Google sign-in is not enabled")
        }
        codes::INVALID_CREDENTIAL => {
            error!(code = %err.code, "Invalid Google sign-in credential")
        }
        _ => error!(error = %err, "Redirect sign-in failed"),
    }
}

// =============================================================================
// Session Snapshot
// =============================================================================

/// What subscribers see.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionSnapshot {
    pub user: Option<AuthUser>,
    /// `true` until the first session notification arrives.
    pub loading: bool,
}

impl Default for SessionSnapshot {
    fn default() -> Self {
        SessionSnapshot {
            user: None,
            loading: true,
        }
    }
}

/// Outcome of [`SessionHolder::sign_in_with_google`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GoogleSignIn {
    /// Popup flow finished.
    SignedIn(AuthUser),
    /// Redirect flow started; the result arrives on the next start-up.
    Redirecting,
}

fn publish(state: &watch::Sender<SessionSnapshot>, user: Option<AuthUser>) {
    let previous = state.borrow().user.as_ref().map(|u| u.uid.clone());
    let current = user.as_ref().map(|u| u.uid.clone());

    match (&previous, &current) {
        (None, Some(uid)) => info!(uid = %uid, "User logged in"),
        (Some(uid), None) => info!(uid = %uid, "User logged out"),
        (Some(old), Some(new)) if old != new => info!(from = %old, to = %new, "User switched"),
        _ => debug!(uid = ?current, "Auth state changed"),
    }

    state.send_replace(SessionSnapshot {
        user,
        loading: false,
    });
}

// =============================================================================
// Session Holder
// =============================================================================

/// Holds the current auth session and performs auth operations.
pub struct SessionHolder {
    backend: Arc<dyn AuthBackend>,
    state: Arc<watch::Sender<SessionSnapshot>>,
    listener: Mutex<Option<JoinHandle<()>>>,
    mobile_breakpoint_px: u32,
}

impl SessionHolder {
    pub fn new(backend: Arc<dyn AuthBackend>, mobile_breakpoint_px: u32) -> Self {
        let (state, _) = watch::channel(SessionSnapshot::default());

        SessionHolder {
            backend,
            state: Arc::new(state),
            listener: Mutex::new(None),
            mobile_breakpoint_px,
        }
    }

    /// Subscribes to the auth stream and reconciles a pending redirect.
    ///
    /// Calling it again replaces the previous listener.
    pub async fn start(&self) {
        let mut changes = self.backend.subscribe();
        publish(&self.state, changes.borrow_and_update().clone());

        let state = Arc::clone(&self.state);
        let handle = tokio::spawn(async move {
            while changes.changed().await.is_ok() {
                let user = changes.borrow_and_update().clone();
                publish(&state, user);
            }
            debug!("Auth session stream closed");
        });

        let previous = self
            .listener
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .replace(handle);
        if let Some(previous) = previous {
            previous.abort();
        }

        info!("Session listener started");
        self.reconcile_redirect().await;
    }

    async fn reconcile_redirect(&self) {
        debug!("Checking for redirect result");
        match self.backend.take_redirect_result().await {
            Ok(Some(user)) => info!(uid = %user.uid, email = %user.email, "Redirect sign-in successful"),
            Ok(None) => {}
            Err(err) => log_redirect_error(&err),
        }
    }

    /// Stops listening for session changes.
    pub fn shutdown(&self) {
        let handle = self
            .listener
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();

        if let Some(handle) = handle {
            handle.abort();
            info!("Session listener stopped");
        }
    }

    /// Subscribers get the current snapshot and every change after it.
    pub fn subscribe(&self) -> watch::Receiver<SessionSnapshot> {
        self.state.subscribe()
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        self.state.borrow().clone()
    }

    /// The signed-in user right now, straight from the auth service.
    pub fn current_user(&self) -> Option<AuthUser> {
        self.backend.current_user()
    }

    // =========================================================================
    // Operations
    // =========================================================================

    pub async fn sign_up(&self, email: &str, password: &str) -> Result<AuthUser, AuthError> {
        let user = self
            .backend
            .create_user(email, password)
            .await
            .map_err(|e| AuthError::from_backend(AuthOperation::SignUp, e))?;

        info!(email = %user.email, "Sign up successful");
        Ok(user)
    }

    pub async fn sign_in(&self, email: &str, password: &str) -> Result<AuthUser, AuthError> {
        let user = self
            .backend
            .sign_in(email, password)
            .await
            .map_err(|e| AuthError::from_backend(AuthOperation::SignIn, e))?;

        info!(email = %user.email, "Sign in successful");
        Ok(user)
    }

    /// Google sign-in, popup or redirect depending on the device.
    pub async fn sign_in_with_google(
        &self,
        user_agent: &str,
        viewport_width: u32,
    ) -> Result<GoogleSignIn, AuthError> {
        let request = OAuthRequest::google();
        let flow = choose_flow(user_agent, viewport_width, self.mobile_breakpoint_px);
        debug!(?flow, viewport_width, "Starting Google sign-in");

        let outcome = match flow {
            AuthFlow::Redirect => self
                .backend
                .sign_in_with_redirect(&request)
                .await
                .map(|()| GoogleSignIn::Redirecting),
            AuthFlow::Popup => self
                .backend
                .sign_in_with_popup(&request)
                .await
                .map(GoogleSignIn::SignedIn),
        };

        let outcome = outcome.map_err(|e| AuthError::from_backend(AuthOperation::Google, e))?;
        if let GoogleSignIn::SignedIn(user) = &outcome {
            info!(email = %user.email, "Google sign in successful");
        }
        Ok(outcome)
    }

    pub async fn reset_password(&self, email: &str) -> Result<(), AuthError> {
        self.backend
            .send_password_reset(email)
            .await
            .map_err(|e| AuthError::from_backend(AuthOperation::ResetPassword, e))?;

        info!("Password reset email sent");
        Ok(())
    }

    pub async fn sign_out(&self) -> Result<(), AuthError> {
        self.backend.sign_out().await.map_err(|e| {
            warn!(error = %e, "Sign out failed");
            AuthError::from_backend(AuthOperation::SignOut, e)
        })?;

        info!("Sign out successful");
        Ok(())
    }
}

impl Drop for SessionHolder {
    fn drop(&mut self) {
        self.shutdown();
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::BackendResult;
    use async_trait::async_trait;
    use storefront_core::AuthProvider;

    const DESKTOP_UA: &str =
        "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 Chrome/120.0 Safari/537.36";
    const IPHONE_UA: &str =
        "Mozilla/5.0 (iPhone; CPU iPhone OS 17_0 like Mac OS X) AppleWebKit/605.1.15 Mobile";

    fn user(uid: &str) -> AuthUser {
        AuthUser {
            uid: uid.to_string(),
            email: format!("{}@example.com", uid),
            display_name: None,
            provider: AuthProvider::Password,
            id_token: String::new(),
        }
    }

    /// Backend whose every call fails with `code`, except redirects which
    /// record themselves.
    struct StubBackend {
        session: watch::Sender<Option<AuthUser>>,
        code: &'static str,
        redirect: Mutex<Option<BackendResult<AuthUser>>>,
        redirect_started: Mutex<bool>,
    }

    impl StubBackend {
        fn failing(code: &'static str) -> Self {
            StubBackend {
                session: watch::channel(None).0,
                code,
                redirect: Mutex::new(None),
                redirect_started: Mutex::new(false),
            }
        }

        fn err<T>(&self) -> BackendResult<T> {
            Err(BackendError::new(self.code, "stub failure"))
        }
    }

    #[async_trait]
    impl AuthBackend for StubBackend {
        async fn create_user(&self, _: &str, _: &str) -> BackendResult<AuthUser> {
            self.err()
        }
        async fn sign_in(&self, _: &str, _: &str) -> BackendResult<AuthUser> {
            self.err()
        }
        async fn sign_out(&self) -> BackendResult<()> {
            self.err()
        }
        async fn send_password_reset(&self, _: &str) -> BackendResult<()> {
            self.err()
        }
        async fn sign_in_with_popup(&self, _: &OAuthRequest) -> BackendResult<AuthUser> {
            self.err()
        }
        async fn sign_in_with_redirect(&self, _: &OAuthRequest) -> BackendResult<()> {
            *self.redirect_started.lock().unwrap() = true;
            Ok(())
        }
        async fn take_redirect_result(&self) -> BackendResult<Option<AuthUser>> {
            self.redirect.lock().unwrap().take().transpose()
        }
        fn current_user(&self) -> Option<AuthUser> {
            self.session.borrow().clone()
        }
        fn subscribe(&self) -> watch::Receiver<Option<AuthUser>> {
            self.session.subscribe()
        }
    }

    #[test]
    fn test_choose_flow() {
        assert_eq!(choose_flow(DESKTOP_UA, 1440, 768), AuthFlow::Popup);
        assert_eq!(choose_flow(DESKTOP_UA, 768, 768), AuthFlow::Redirect);
        assert_eq!(choose_flow(DESKTOP_UA, 769, 768), AuthFlow::Popup);
        assert_eq!(choose_flow(IPHONE_UA, 1440, 768), AuthFlow::Redirect);
        assert_eq!(choose_flow("some android tablet", 1280, 768), AuthFlow::Redirect);
    }

    #[test]
    fn test_known_codes_map_to_messages() {
        assert_eq!(
            AuthOperation::SignUp.message_for(codes::EMAIL_ALREADY_IN_USE),
            "This email is already registered. Please sign in instead."
        );
        assert_eq!(
            AuthOperation::SignIn.message_for(codes::INVALID_CREDENTIAL),
            "Invalid email or password. Please try again."
        );
        assert_eq!(
            AuthOperation::SignIn.message_for(codes::INVALID_CREDENTIALS),
            "Invalid email or password. Please try again."
        );
        assert_eq!(
            AuthOperation::Google.message_for(codes::CANCELLED_POPUP_REQUEST),
            "Another sign in attempt is in progress. Please wait."
        );
        assert_eq!(
            AuthOperation::ResetPassword.message_for(codes::USER_NOT_FOUND),
            "No account found with this email."
        );
    }

    #[test]
    fn test_unknown_codes_fall_back() {
        assert_eq!(
            AuthOperation::SignUp.message_for("auth/quota-exceeded"),
            "Failed to create account. Please try again."
        );
        // Codes are scoped to their operation.
        assert_eq!(
            AuthOperation::ResetPassword.message_for(codes::INVALID_EMAIL),
            "Failed to send password reset email. Please try again."
        );
        assert_eq!(
            AuthOperation::SignOut.message_for(codes::NETWORK_REQUEST_FAILED),
            "Failed to sign out. Please try again."
        );
    }

    #[tokio::test]
    async fn test_operation_errors_are_mapped() {
        let holder = SessionHolder::new(Arc::new(StubBackend::failing(codes::TOO_MANY_REQUESTS)), 768);

        let err = holder.sign_in("a@example.com", "secret1").await.unwrap_err();
        assert_eq!(err.message, "Too many failed attempts. Please try again later.");
        assert_eq!(err.code, codes::TOO_MANY_REQUESTS);

        let err = holder.sign_up("a@example.com", "secret1").await.unwrap_err();
        assert_eq!(err.message, "Failed to create account. Please try again.");

        let err = holder.sign_out().await.unwrap_err();
        assert_eq!(err.message, "Failed to sign out. Please try again.");
    }

    #[tokio::test]
    async fn test_google_uses_redirect_on_mobile() {
        let backend = Arc::new(StubBackend::failing(codes::POPUP_BLOCKED));
        let holder = SessionHolder::new(backend.clone(), 768);

        let outcome = holder.sign_in_with_google(IPHONE_UA, 390).await.unwrap();
        assert_eq!(outcome, GoogleSignIn::Redirecting);
        assert!(*backend.redirect_started.lock().unwrap());

        let err = holder.sign_in_with_google(DESKTOP_UA, 1440).await.unwrap_err();
        assert_eq!(
            err.message,
            "Sign in popup was blocked. Please allow popups or try again on mobile."
        );
    }

    #[tokio::test]
    async fn test_snapshot_follows_backend_stream() {
        let backend = Arc::new(StubBackend::failing(codes::INTERNAL_ERROR));
        let holder = SessionHolder::new(backend.clone(), 768);
        assert!(holder.snapshot().loading);

        holder.start().await;
        let mut rx = holder.subscribe();
        assert_eq!(*rx.borrow_and_update(), SessionSnapshot { user: None, loading: false });

        backend.session.send_replace(Some(user("u1")));
        rx.changed().await.unwrap();
        assert_eq!(rx.borrow_and_update().user, Some(user("u1")));

        backend.session.send_replace(None);
        rx.changed().await.unwrap();
        assert_eq!(rx.borrow_and_update().user, None);

        holder.shutdown();
    }

    #[tokio::test]
    async fn test_start_consumes_redirect_result() {
        let backend = Arc::new(StubBackend::failing(codes::INTERNAL_ERROR));
        *backend.redirect.lock().unwrap() = Some(Err(BackendError::new(
            codes::CREDENTIAL_ALREADY_IN_USE,
            "already linked",
        )));

        let holder = SessionHolder::new(backend.clone(), 768);
        holder.start().await;

        assert!(backend.redirect.lock().unwrap().is_none());
        assert!(holder.current_user().is_none());
    }
}
