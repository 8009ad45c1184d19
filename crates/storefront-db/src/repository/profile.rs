//! # Profile Repository
//!
//! One profile document per user, keyed by uid.
//!
//! ## Merge Writes
//! ```text
//! merge_contact(uid, { displayName, phone, address })
//!     └── INSERT … ON CONFLICT(uid) DO UPDATE
//!           ├── only the fields provided are overwritten
//!           └── preferences untouched
//!
//! merge_preferences(uid, prefs)
//!     └── INSERT … ON CONFLICT(uid) DO UPDATE
//!           └── only preferences overwritten
//! ```
//!
//! Either write creates the document if it doesn't exist yet. Concurrent
//! writes are last-write-wins per column.

use chrono::Utc;
use sqlx::SqlitePool;
use tracing::debug;

use super::to_millis;
use crate::error::DbResult;
use storefront_core::{Address, ProfileUpdate, UserPreferences, UserProfile};

#[derive(sqlx::FromRow)]
struct ProfileRow {
    uid: String,
    email: String,
    display_name: Option<String>,
    phone_number: Option<String>,
    address: Option<String>,
    preferences: Option<String>,
}

impl ProfileRow {
    fn into_profile(self) -> DbResult<UserProfile> {
        let address: Option<Address> = match self.address {
            Some(json) => Some(serde_json::from_str(&json)?),
            None => None,
        };
        let preferences: UserPreferences = match self.preferences {
            Some(json) => serde_json::from_str(&json)?,
            None => UserPreferences::default(),
        };

        Ok(UserProfile {
            uid: self.uid,
            email: self.email,
            display_name: self.display_name,
            phone_number: self.phone_number,
            address,
            preferences,
        })
    }
}

/// Repository for profile documents.
#[derive(Debug, Clone)]
pub struct ProfileRepository {
    pool: SqlitePool,
}

impl ProfileRepository {
    pub fn new(pool: SqlitePool) -> Self {
        ProfileRepository { pool }
    }

    /// Returns the stored profile, if the user ever saved one.
    ///
    /// Preferences come back as defaults when only contact fields have been
    /// written.
    pub async fn get(&self, uid: &str) -> DbResult<Option<UserProfile>> {
        let row: Option<ProfileRow> = sqlx::query_as(
            r#"
            SELECT uid, email, display_name, phone_number, address, preferences
            FROM profiles
            WHERE uid = ?1
            "#,
        )
        .bind(uid)
        .fetch_optional(&self.pool)
        .await?;

        row.map(ProfileRow::into_profile).transpose()
    }

    /// Merge-writes contact fields. `None` fields keep their stored value.
    pub async fn merge_contact(
        &self,
        uid: &str,
        email: &str,
        update: &ProfileUpdate,
    ) -> DbResult<()> {
        debug!(uid = %uid, "Merging profile contact fields");

        let address = update
            .address
            .as_ref()
            .map(serde_json::to_string)
            .transpose()?;
        let now = to_millis(Utc::now());

        sqlx::query(
            r#"
            INSERT INTO profiles (
                uid, email, display_name, phone_number, address, preferences,
                created_at, updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, NULL, ?6, ?6)
            ON CONFLICT(uid) DO UPDATE SET
                email = excluded.email,
                display_name = COALESCE(excluded.display_name, profiles.display_name),
                phone_number = COALESCE(excluded.phone_number, profiles.phone_number),
                address = COALESCE(excluded.address, profiles.address),
                updated_at = excluded.updated_at
            "#,
        )
        .bind(uid)
        .bind(email)
        .bind(&update.display_name)
        .bind(&update.phone_number)
        .bind(address)
        .bind(now)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Merge-writes the embedded preferences.
    pub async fn merge_preferences(
        &self,
        uid: &str,
        email: &str,
        preferences: &UserPreferences,
    ) -> DbResult<()> {
        debug!(uid = %uid, theme = ?preferences.theme, "Merging profile preferences");

        let json = serde_json::to_string(preferences)?;
        let now = to_millis(Utc::now());

        sqlx::query(
            r#"
            INSERT INTO profiles (
                uid, email, display_name, phone_number, address, preferences,
                created_at, updated_at
            ) VALUES (?1, ?2, NULL, NULL, NULL, ?3, ?4, ?4)
            ON CONFLICT(uid) DO UPDATE SET
                preferences = excluded.preferences,
                updated_at = excluded.updated_at
            "#,
        )
        .bind(uid)
        .bind(email)
        .bind(json)
        .bind(now)
        .execute(&self.pool)
        .await?;

        Ok(())
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
