//! # Account Repository
//!
//! Accounts of the local auth backend: credentials, failed sign-in
//! counters and password-reset requests.
//!
//! Emails are unique case-insensitively (`COLLATE NOCASE`).

use chrono::{DateTime, Utc};
use sqlx::SqlitePool;
use tracing::debug;

use super::{from_millis, to_millis};
use crate::error::{DbError, DbResult};
use storefront_core::AuthProvider;

// =============================================================================
// Records
// =============================================================================

/// A stored account.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccountRecord {
    pub uid: String,
    pub email: String,
    pub display_name: Option<String>,
    pub provider: AuthProvider,
    /// PHC-format argon2 hash; `None` for Google accounts.
    pub password_hash: Option<String>,
    /// Consecutive failed password sign-ins.
    pub failed_attempts: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(sqlx::FromRow)]
struct AccountRow {
    uid: String,
    email: String,
    display_name: Option<String>,
    provider: AuthProvider,
    password_hash: Option<String>,
    failed_attempts: i64,
    created_at: i64,
    updated_at: i64,
}

impl From<AccountRow> for AccountRecord {
    fn from(row: AccountRow) -> Self {
        AccountRecord {
            uid: row.uid,
            email: row.email,
            display_name: row.display_name,
            provider: row.provider,
            password_hash: row.password_hash,
            failed_attempts: row.failed_attempts,
            created_at: from_millis(row.created_at),
            updated_at: from_millis(row.updated_at),
        }
    }
}

/// A recorded password-reset request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PasswordReset {
    pub token: String,
    pub uid: String,
    pub email: String,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

#[derive(sqlx::FromRow)]
struct PasswordResetRow {
    token: String,
    uid: String,
    email: String,
    created_at: i64,
    expires_at: i64,
}

impl From<PasswordResetRow> for PasswordReset {
    fn from(row: PasswordResetRow) -> Self {
        PasswordReset {
            token: row.token,
            uid: row.uid,
            email: row.email,
            created_at: from_millis(row.created_at),
            expires_at: from_millis(row.expires_at),
        }
    }
}

const ACCOUNT_COLUMNS: &str = "uid, email, display_name, provider, password_hash, \
                               failed_attempts, created_at, updated_at";

// =============================================================================
// Repository
// =============================================================================

/// Repository for account database operations.
#[derive(Debug, Clone)]
pub struct AccountRepository {
    pool: SqlitePool,
}

impl AccountRepository {
    pub fn new(pool: SqlitePool) -> Self {
        AccountRepository { pool }
    }

    /// Inserts a new account.
    ///
    /// ## Errors
    /// `DbError::UniqueViolation` with `field = "email"` when the address
    /// is already registered.
    pub async fn insert(&self, account: &AccountRecord) -> DbResult<()> {
        debug!(uid = %account.uid, provider = account.provider.as_str(), "Inserting account");

        sqlx::query(
            r#"
            INSERT INTO accounts (
                uid, email, display_name, provider, password_hash,
                failed_attempts, created_at, updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
            "#,
        )
        .bind(&account.uid)
        .bind(&account.email)
        .bind(&account.display_name)
        .bind(account.provider)
        .bind(&account.password_hash)
        .bind(account.failed_attempts)
        .bind(to_millis(account.created_at))
        .bind(to_millis(account.updated_at))
        .execute(&self.pool)
        .await
        .map_err(|e| match DbError::from(e) {
            DbError::UniqueViolation { .. } => DbError::duplicate("email", &account.email),
            other => other,
        })?;

        Ok(())
    }

    pub async fn get_by_uid(&self, uid: &str) -> DbResult<Option<AccountRecord>> {
        let sql = format!("SELECT {} FROM accounts WHERE uid = ?1", ACCOUNT_COLUMNS);
        let row: Option<AccountRow> = sqlx::query_as(&sql)
            .bind(uid)
            .fetch_optional(&self.pool)
            .await?;

        Ok(row.map(AccountRecord::from))
    }

    /// Looks an account up by email, ignoring case.
    pub async fn find_by_email(&self, email: &str) -> DbResult<Option<AccountRecord>> {
        let sql = format!("SELECT {} FROM accounts WHERE email = ?1", ACCOUNT_COLUMNS);
        let row: Option<AccountRow> = sqlx::query_as(&sql)
            .bind(email.trim())
            .fetch_optional(&self.pool)
            .await?;

        Ok(row.map(AccountRecord::from))
    }

    /// Bumps the failed sign-in counter and returns the new value.
    pub async fn record_failed_sign_in(&self, uid: &str) -> DbResult<i64> {
        let attempts: Option<i64> = sqlx::query_scalar(
            r#"
            UPDATE accounts SET
                failed_attempts = failed_attempts + 1,
                updated_at = ?2
            WHERE uid = ?1
            RETURNING failed_attempts
            "#,
        )
        .bind(uid)
        .bind(to_millis(Utc::now()))
        .fetch_optional(&self.pool)
        .await?;

        let attempts = attempts.ok_or_else(|| DbError::not_found("Account", uid))?;
        debug!(uid = %uid, attempts, "Recorded failed sign-in");
        Ok(attempts)
    }

    /// Clears the failed sign-in counter after a successful sign-in.
    pub async fn reset_failed_sign_ins(&self, uid: &str) -> DbResult<()> {
        sqlx::query("UPDATE accounts SET failed_attempts = 0 WHERE uid = ?1")
            .bind(uid)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    pub async fn insert_password_reset(&self, reset: &PasswordReset) -> DbResult<()> {
        debug!(uid = %reset.uid, "Recording password reset request");

        sqlx::query(
            r#"
            INSERT INTO password_resets (token, uid, email, created_at, expires_at)
            VALUES (?1, ?2, ?3, ?4, ?5)
            "#,
        )
        .bind(&reset.token)
        .bind(&reset.uid)
        .bind(&reset.email)
        .bind(to_millis(reset.created_at))
        .bind(to_millis(reset.expires_at))
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Most recent reset request for an account.
    pub async fn latest_password_reset(&self, uid: &str) -> DbResult<Option<PasswordReset>> {
        let row: Option<PasswordResetRow> = sqlx::query_as(
            r#"
            SELECT token, uid, email, created_at, expires_at
            FROM password_resets
            WHERE uid = ?1
            ORDER BY created_at DESC, rowid DESC
            LIMIT 1
            "#,
        )
        .bind(uid)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(PasswordReset::from))
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Database, DbConfig};
    use chrono::Duration;

    fn account(uid: &str, email: &str) -> AccountRecord {
        let now = Utc::now();
        AccountRecord {
            uid: uid.to_string(),
            email: email.to_string(),
            display_name: None,
            provider: AuthProvider::Password,
            password_hash: Some("$argon2id$stub".to_string()),
            failed_attempts: 0,
            created_at: now,
            updated_at: now,
        }
    }

    async fn repo() -> AccountRepository {
        Database::new(DbConfig::in_memory()).await.unwrap().accounts()
    }

    #[tokio::test]
    async fn test_insert_and_lookup_ignores_email_case() {
        let repo = repo().await;
        repo.insert(&account("u1", "asha@example.com")).await.unwrap();

        let found = repo.find_by_email("ASHA@example.com").await.unwrap().unwrap();
        assert_eq!(found.uid, "u1");
        assert_eq!(found.provider, AuthProvider::Password);

        assert!(repo.get_by_uid("u1").await.unwrap().is_some());
        assert!(repo.get_by_uid("missing").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_duplicate_email_is_unique_violation() {
        let repo = repo().await;
        repo.insert(&account("u1", "asha@example.com")).await.unwrap();

        let err = repo
            .insert(&account("u2", "Asha@Example.com"))
            .await
            .unwrap_err();
        assert!(matches!(err, DbError::UniqueViolation { ref field, .. } if field == "email"));
    }

    #[tokio::test]
    async fn test_failed_sign_in_counter() {
        let repo = repo().await;
        repo.insert(&account("u1", "asha@example.com")).await.unwrap();

        assert_eq!(repo.record_failed_sign_in("u1").await.unwrap(), 1);
        assert_eq!(repo.record_failed_sign_in("u1").await.unwrap(), 2);

        repo.reset_failed_sign_ins("u1").await.unwrap();
        let stored = repo.get_by_uid("u1").await.unwrap().unwrap();
        assert_eq!(stored.failed_attempts, 0);

        assert!(matches!(
            repo.record_failed_sign_in("missing").await,
            Err(DbError::NotFound { .. })
        ));
    }

    #[tokio::test]
    async fn test_password_reset_round_trip() {
        let repo = repo().await;
        repo.insert(&account("u1", "asha@example.com")).await.unwrap();

        let now = Utc::now();
        let reset = PasswordReset {
            token: "tok-1".to_string(),
            uid: "u1".to_string(),
            email: "asha@example.com".to_string(),
            created_at: now,
            expires_at: now + Duration::hours(1),
        };
        repo.insert_password_reset(&reset).await.unwrap();

        let latest = repo.latest_password_reset("u1").await.unwrap().unwrap();
        assert_eq!(latest.token, "tok-1");
        assert!(latest.expires_at > latest.created_at);
    }
}
