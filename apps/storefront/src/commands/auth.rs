//! # Auth Commands
//!
//! Thin wrappers over [`SessionHolder`]. Messages in the returned errors are
//! already user-facing.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::backend::AuthUser;
use crate::error::ApiError;
use crate::state::{GoogleSignIn, SessionHolder, SessionSnapshot};

/// Email + password form.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

/// What the client needs to finish a Google sign-in.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "status", rename_all = "camelCase")]
pub enum GoogleSignInResponse {
    SignedIn { user: AuthUser },
    /// The page navigates away; the session arrives on the next start-up.
    Redirecting,
}

/// Current session as last published by the auth stream.
pub fn get_session(session: &SessionHolder) -> SessionSnapshot {
    session.snapshot()
}

pub async fn sign_up(session: &SessionHolder, form: Credentials) -> Result<AuthUser, ApiError> {
    debug!(email = %form.email, "sign_up command");
    Ok(session.sign_up(&form.email, &form.password).await?)
}

pub async fn sign_in(session: &SessionHolder, form: Credentials) -> Result<AuthUser, ApiError> {
    debug!(email = %form.email, "sign_in command");
    Ok(session.sign_in(&form.email, &form.password).await?)
}

/// Google sign-in; popup or redirect is picked from the device.
pub async fn sign_in_with_google(
    session: &SessionHolder,
    user_agent: &str,
    viewport_width: u32,
) -> Result<GoogleSignInResponse, ApiError> {
    debug!(viewport_width, "sign_in_with_google command");

    let response = match session.sign_in_with_google(user_agent, viewport_width).await? {
        GoogleSignIn::SignedIn(user) => GoogleSignInResponse::SignedIn { user },
        GoogleSignIn::Redirecting => GoogleSignInResponse::Redirecting,
    };
    Ok(response)
}

pub async fn reset_password(session: &SessionHolder, email: &str) -> Result<(), ApiError> {
    debug!(email = %email, "reset_password command");
    Ok(session.reset_password(email).await?)
}

pub async fn sign_out(session: &SessionHolder) -> Result<(), ApiError> {
    debug!("sign_out command");
    Ok(session.sign_out().await?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::{GoogleIdentity, LocalBackend, LocalBackendConfig};
    use crate::error::ErrorCode;
    use std::sync::Arc;
    use storefront_db::{Database, DbConfig};

    async fn session() -> (Arc<LocalBackend>, SessionHolder) {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let backend = Arc::new(LocalBackend::new(db, LocalBackendConfig::default()));
        let holder = SessionHolder::new(backend.clone(), 768);
        (backend, holder)
    }

    fn creds(email: &str, password: &str) -> Credentials {
        Credentials {
            email: email.to_string(),
            password: password.to_string(),
        }
    }

    #[tokio::test]
    async fn test_sign_up_sign_out_sign_in() {
        let (_backend, session) = session().await;

        let user = sign_up(&session, creds("asha@example.com", "secret1"))
            .await
            .unwrap();
        assert_eq!(session.current_user().map(|u| u.uid), Some(user.uid.clone()));

        sign_out(&session).await.unwrap();
        assert!(session.current_user().is_none());

        let again = sign_in(&session, creds("asha@example.com", "secret1"))
            .await
            .unwrap();
        assert_eq!(again.uid, user.uid);
    }

    #[tokio::test]
    async fn test_user_facing_messages() {
        let (_backend, session) = session().await;
        sign_up(&session, creds("asha@example.com", "secret1"))
            .await
            .unwrap();

        let err = sign_up(&session, creds("asha@example.com", "secret1"))
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::AuthError);
        assert_eq!(
            err.message,
            "This email is already registered. Please sign in instead."
        );

        let err = sign_up(&session, creds("ravi@example.com", "123"))
            .await
            .unwrap_err();
        assert_eq!(err.message, "Password should be at least 6 characters long.");

        let err = sign_in(&session, creds("asha@example.com", "wrong-one"))
            .await
            .unwrap_err();
        assert_eq!(err.message, "Invalid email or password. Please try again.");

        let err = reset_password(&session, "nobody@example.com")
            .await
            .unwrap_err();
        assert_eq!(err.message, "No account found with this email.");
        reset_password(&session, "asha@example.com").await.unwrap();
    }

    #[tokio::test]
    async fn test_google_popup_and_redirect() {
        let (backend, session) = session().await;
        backend.set_google_identity(Some(GoogleIdentity {
            email: "ravi@gmail.com".to_string(),
            display_name: Some("Ravi".to_string()),
        }));

        let desktop = "Mozilla/5.0 (X11; Linux x86_64) Firefox/128.0";
        match sign_in_with_google(&session, desktop, 1280).await.unwrap() {
            GoogleSignInResponse::SignedIn { user } => assert_eq!(user.email, "ravi@gmail.com"),
            GoogleSignInResponse::Redirecting => panic!("desktop should use the popup"),
        }

        sign_out(&session).await.unwrap();
        let phone = "Mozilla/5.0 (Linux; Android 14; Pixel 8) Mobile";
        let response = sign_in_with_google(&session, phone, 412).await.unwrap();
        assert!(matches!(response, GoogleSignInResponse::Redirecting));
        assert!(session.current_user().is_none());

        // The next start-up picks the redirect result up.
        session.start().await;
        assert_eq!(
            session.current_user().map(|u| u.email),
            Some("ravi@gmail.com".to_string())
        );
        session.shutdown();
    }
}
