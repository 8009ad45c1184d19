//! # Local Auth Backend
//!
//! An [`AuthBackend`] that runs in-process on top of `storefront-db`, so
//! the storefront works end to end without a hosted service.
//!
//! ## What It Keeps
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  accounts table           argon2 password hash, failed sign-in counter │
//! │  password_resets table    one row per reset request (token, expiry)    │
//! │  watch::Sender<Option<AuthUser>>   current session, fanned out         │
//! │  pending redirect         result of the last sign_in_with_redirect     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Google Sign-In
//! There is no browser here. The Google account that "picks" itself in the
//! chooser is configured with [`LocalBackend::set_google_identity`]; with
//! none configured the provider reports `auth/operation-not-allowed`.

use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, TokenData, Validation};
use serde::{Deserialize, Serialize};
use tokio::sync::{watch, Mutex};
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use super::{codes, AuthBackend, AuthUser, BackendError, BackendResult, OAuthRequest};
use storefront_core::validation::{validate_email, validate_password};
use storefront_core::AuthProvider;
use storefront_db::{AccountRecord, Database, DbError, PasswordReset};

const GOOGLE_PROVIDER_ID: &str = "google.com";

// =============================================================================
// Configuration
// =============================================================================

/// Settings for [`LocalBackend`].
#[derive(Debug, Clone)]
pub struct LocalBackendConfig {
    /// HS256 secret for id tokens.
    pub jwt_secret: String,
    /// Id token lifetime.
    pub token_lifetime_secs: i64,
    /// Failed password sign-ins before the account is throttled.
    pub max_failed_sign_ins: i64,
    /// How long a reset token stays valid.
    pub reset_token_lifetime_secs: i64,
}

impl Default for LocalBackendConfig {
    fn default() -> Self {
        LocalBackendConfig {
            jwt_secret: "storefront-dev-secret".to_string(),
            token_lifetime_secs: 3600,
            max_failed_sign_ins: 5,
            reset_token_lifetime_secs: 3600,
        }
    }
}

/// The Google account the local provider signs in as.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GoogleIdentity {
    pub email: String,
    pub display_name: Option<String>,
}

// =============================================================================
// Id Tokens
// =============================================================================

/// Claims carried by an id token.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IdTokenClaims {
    /// Subject (uid)
    pub sub: String,
    pub email: String,
    /// `password` or `google`
    pub provider: String,
    /// Issued at (Unix timestamp)
    pub iat: i64,
    /// Expiration (Unix timestamp)
    pub exp: i64,
    /// Unique token id
    pub jti: String,
}

struct TokenIssuer {
    secret: String,
    lifetime_secs: i64,
}

impl TokenIssuer {
    fn issue(&self, account: &AccountRecord) -> BackendResult<String> {
        let now = Utc::now();
        let exp = now + Duration::seconds(self.lifetime_secs);

        let claims = IdTokenClaims {
            sub: account.uid.clone(),
            email: account.email.clone(),
            provider: account.provider.as_str().to_string(),
            iat: now.timestamp(),
            exp: exp.timestamp(),
            jti: Uuid::new_v4().to_string(),
        };

        encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(self.secret.as_bytes()),
        )
        .map_err(|e| {
            error!(error = %e, "Failed to sign id token");
            BackendError::new(codes::INTERNAL_ERROR, "Failed to sign id token")
        })
    }

    fn verify(&self, token: &str) -> BackendResult<IdTokenClaims> {
        let data: TokenData<IdTokenClaims> = decode(
            token,
            &DecodingKey::from_secret(self.secret.as_bytes()),
            &Validation::default(),
        )
        .map_err(|e| BackendError::new(codes::INVALID_CREDENTIAL, format!("Invalid token: {}", e)))?;

        Ok(data.claims)
    }
}

// =============================================================================
// Password Hashing
// =============================================================================

fn hash_password(password: &str) -> BackendResult<String> {
    use argon2::{password_hash::SaltString, Argon2, PasswordHasher};

    let salt = SaltString::encode_b64(Uuid::new_v4().as_bytes()).map_err(|e| {
        BackendError::new(codes::INTERNAL_ERROR, format!("Failed to build salt: {}", e))
    })?;

    let hash = Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| {
            BackendError::new(codes::INTERNAL_ERROR, format!("Failed to hash password: {}", e))
        })?;

    Ok(hash.to_string())
}

fn verify_password(password: &str, hash: &str) -> bool {
    use argon2::{Argon2, PasswordHash, PasswordVerifier};

    let parsed_hash = match PasswordHash::new(hash) {
        Ok(h) => h,
        Err(_) => return false,
    };

    Argon2::default()
        .verify_password(password.as_bytes(), &parsed_hash)
        .is_ok()
}

/// Storage failures surface as `auth/internal-error`; the detail is logged.
fn internal(err: DbError) -> BackendError {
    error!(error = %err, "Auth storage failure");
    BackendError::new(codes::INTERNAL_ERROR, err.to_string())
}

fn invalid_credential() -> BackendError {
    BackendError::new(codes::INVALID_CREDENTIAL, "Email or password is incorrect")
}

// =============================================================================
// Local Backend
// =============================================================================

/// In-process auth service over SQLite.
pub struct LocalBackend {
    db: Database,
    tokens: TokenIssuer,
    max_failed_sign_ins: i64,
    reset_token_lifetime_secs: i64,
    session: watch::Sender<Option<AuthUser>>,
    google: std::sync::Mutex<Option<GoogleIdentity>>,
    pending_redirect: Mutex<Option<BackendResult<AuthUser>>>,
    popup: Mutex<()>,
}

impl LocalBackend {
    pub fn new(db: Database, config: LocalBackendConfig) -> Self {
        let (session, _) = watch::channel(None);

        LocalBackend {
            db,
            tokens: TokenIssuer {
                secret: config.jwt_secret,
                lifetime_secs: config.token_lifetime_secs,
            },
            max_failed_sign_ins: config.max_failed_sign_ins,
            reset_token_lifetime_secs: config.reset_token_lifetime_secs,
            session,
            google: std::sync::Mutex::new(None),
            pending_redirect: Mutex::new(None),
            popup: Mutex::new(()),
        }
    }

    /// Sets the account the Google provider signs in as.
    pub fn set_google_identity(&self, identity: Option<GoogleIdentity>) {
        match self.google.lock() {
            Ok(mut google) => *google = identity,
            Err(poisoned) => *poisoned.into_inner() = identity,
        }
    }

    fn google_identity(&self) -> Option<GoogleIdentity> {
        match self.google.lock() {
            Ok(google) => google.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    /// Decodes an id token issued by this backend.
    pub fn verify_id_token(&self, token: &str) -> BackendResult<IdTokenClaims> {
        self.tokens.verify(token)
    }

    fn session_user(&self, account: &AccountRecord) -> BackendResult<AuthUser> {
        Ok(AuthUser {
            uid: account.uid.clone(),
            email: account.email.clone(),
            display_name: account.display_name.clone(),
            provider: account.provider,
            id_token: self.tokens.issue(account)?,
        })
    }

    fn publish(&self, user: Option<AuthUser>) {
        debug!(uid = ?user.as_ref().map(|u| u.uid.as_str()), "Session changed");
        self.session.send_replace(user);
    }

    /// Finds or creates the account behind the configured Google identity.
    async fn resolve_google_account(&self, request: &OAuthRequest) -> BackendResult<AccountRecord> {
        if request.provider_id != GOOGLE_PROVIDER_ID {
            return Err(BackendError::new(
                codes::OPERATION_NOT_ALLOWED,
                format!("Provider {} is not enabled", request.provider_id),
            ));
        }

        let identity = self.google_identity().ok_or_else(|| {
            BackendError::new(codes::OPERATION_NOT_ALLOWED, "Google sign-in is not enabled")
        })?;

        let accounts = self.db.accounts();
        if let Some(existing) = accounts.find_by_email(&identity.email).await.map_err(internal)? {
            debug!(uid = %existing.uid, "Google identity matches existing account");
            return Ok(existing);
        }

        let now = Utc::now();
        let account = AccountRecord {
            uid: Uuid::new_v4().simple().to_string(),
            email: identity.email.trim().to_lowercase(),
            display_name: identity.display_name,
            provider: AuthProvider::Google,
            password_hash: None,
            failed_attempts: 0,
            created_at: now,
            updated_at: now,
        };
        accounts.insert(&account).await.map_err(|e| match e {
            DbError::UniqueViolation { .. } => {
                BackendError::new(codes::CREDENTIAL_ALREADY_IN_USE, "Account already linked")
            }
            other => internal(other),
        })?;

        info!(uid = %account.uid, "Created Google account");
        Ok(account)
    }
}

#[async_trait::async_trait]
impl AuthBackend for LocalBackend {
    async fn create_user(&self, email: &str, password: &str) -> BackendResult<AuthUser> {
        validate_email(email)
            .map_err(|e| BackendError::new(codes::INVALID_EMAIL, e.to_string()))?;
        validate_password(password)
            .map_err(|e| BackendError::new(codes::WEAK_PASSWORD, e.to_string()))?;

        let email = email.trim().to_lowercase();
        let accounts = self.db.accounts();

        if accounts.find_by_email(&email).await.map_err(internal)?.is_some() {
            return Err(BackendError::new(
                codes::EMAIL_ALREADY_IN_USE,
                "The email address is already in use by another account",
            ));
        }

        let now = Utc::now();
        let account = AccountRecord {
            uid: Uuid::new_v4().simple().to_string(),
            email,
            display_name: None,
            provider: AuthProvider::Password,
            password_hash: Some(hash_password(password)?),
            failed_attempts: 0,
            created_at: now,
            updated_at: now,
        };

        accounts.insert(&account).await.map_err(|e| match e {
            DbError::UniqueViolation { .. } => BackendError::new(
                codes::EMAIL_ALREADY_IN_USE,
                "The email address is already in use by another account",
            ),
            other => internal(other),
        })?;

        info!(uid = %account.uid, "Account created");

        let user = self.session_user(&account)?;
        self.publish(Some(user.clone()));
        Ok(user)
    }

    async fn sign_in(&self, email: &str, password: &str) -> BackendResult<AuthUser> {
        validate_email(email)
            .map_err(|e| BackendError::new(codes::INVALID_EMAIL, e.to_string()))?;

        let accounts = self.db.accounts();
        let account = accounts
            .find_by_email(email)
            .await
            .map_err(internal)?
            .ok_or_else(invalid_credential)?;

        if account.failed_attempts >= self.max_failed_sign_ins {
            warn!(uid = %account.uid, "Sign-in throttled");
            return Err(BackendError::new(
                codes::TOO_MANY_REQUESTS,
                "Access temporarily disabled due to many failed attempts",
            ));
        }

        let verified = account
            .password_hash
            .as_deref()
            .map(|hash| verify_password(password, hash))
            .unwrap_or(false);

        if !verified {
            let attempts = accounts
                .record_failed_sign_in(&account.uid)
                .await
                .map_err(internal)?;
            debug!(uid = %account.uid, attempts, "Wrong password");

            if attempts >= self.max_failed_sign_ins {
                return Err(BackendError::new(
                    codes::TOO_MANY_REQUESTS,
                    "Access temporarily disabled due to many failed attempts",
                ));
            }
            return Err(invalid_credential());
        }

        if account.failed_attempts > 0 {
            accounts
                .reset_failed_sign_ins(&account.uid)
                .await
                .map_err(internal)?;
        }

        info!(uid = %account.uid, "Signed in with password");

        let user = self.session_user(&account)?;
        self.publish(Some(user.clone()));
        Ok(user)
    }

    async fn sign_out(&self) -> BackendResult<()> {
        self.publish(None);
        Ok(())
    }

    async fn send_password_reset(&self, email: &str) -> BackendResult<()> {
        validate_email(email)
            .map_err(|e| BackendError::new(codes::INVALID_EMAIL, e.to_string()))?;

        let accounts = self.db.accounts();
        let account = accounts
            .find_by_email(email)
            .await
            .map_err(internal)?
            .ok_or_else(|| BackendError::new(codes::USER_NOT_FOUND, "No user record"))?;

        let now = Utc::now();
        let reset = PasswordReset {
            token: Uuid::new_v4().simple().to_string(),
            uid: account.uid.clone(),
            email: account.email.clone(),
            created_at: now,
            expires_at: now + Duration::seconds(self.reset_token_lifetime_secs),
        };
        accounts
            .insert_password_reset(&reset)
            .await
            .map_err(internal)?;

        info!(uid = %account.uid, expires_at = %reset.expires_at, "Password reset requested");
        Ok(())
    }

    async fn sign_in_with_popup(&self, request: &OAuthRequest) -> BackendResult<AuthUser> {
        let _popup = self.popup.try_lock().map_err(|_| {
            BackendError::new(
                codes::CANCELLED_POPUP_REQUEST,
                "This operation has been cancelled due to another conflicting popup",
            )
        })?;

        let account = self.resolve_google_account(request).await?;
        info!(uid = %account.uid, "Signed in with Google popup");

        let user = self.session_user(&account)?;
        self.publish(Some(user.clone()));
        Ok(user)
    }

    async fn sign_in_with_redirect(&self, request: &OAuthRequest) -> BackendResult<()> {
        let outcome = match self.resolve_google_account(request).await {
            Ok(account) => self.session_user(&account),
            Err(err) => Err(err),
        };

        debug!(ok = outcome.is_ok(), "Redirect sign-in pending");
        *self.pending_redirect.lock().await = Some(outcome);
        Ok(())
    }

    async fn take_redirect_result(&self) -> BackendResult<Option<AuthUser>> {
        let pending = self.pending_redirect.lock().await.take();

        match pending {
            None => Ok(None),
            Some(Ok(user)) => {
                info!(uid = %user.uid, "Completed Google redirect sign-in");
                self.publish(Some(user.clone()));
                Ok(Some(user))
            }
            Some(Err(err)) => Err(err),
        }
    }

    fn current_user(&self) -> Option<AuthUser> {
        self.session.borrow().clone()
    }

    fn subscribe(&self) -> watch::Receiver<Option<AuthUser>> {
        self.session.subscribe()
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
