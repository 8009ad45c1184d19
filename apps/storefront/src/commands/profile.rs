//! # Profile Commands
//!
//! The profile page: contact details stored in the user's profile document.

use tracing::{debug, error, info};

use storefront_core::{Address, ProfileUpdate, UserProfile};

use crate::backend::DocumentStore;
use crate::error::{ApiError, ErrorCode};
use crate::state::SessionHolder;

use super::require_user;

/// The stored profile, or a blank one for users who never saved theirs.
pub async fn get_profile(
    session: &SessionHolder,
    store: &dyn DocumentStore,
) -> Result<UserProfile, ApiError> {
    let user = require_user(session)?;
    debug!(uid = %user.uid, "get_profile command");

    let stored = store.get_profile(&user.uid).await.map_err(|e| {
        error!(uid = %user.uid, error = %e, "Error fetching profile");
        ApiError::new(ErrorCode::DatabaseError, "Failed to load profile data")
    })?;

    Ok(stored.unwrap_or_else(|| {
        let mut profile = UserProfile::empty(&user.uid, &user.email);
        profile.display_name = user.display_name.clone();
        profile
    }))
}

/// Merge-writes contact fields and returns the updated profile.
///
/// Fields left as `None` keep their stored values; preferences are never
/// touched here.
pub async fn update_profile(
    session: &SessionHolder,
    store: &dyn DocumentStore,
    update: ProfileUpdate,
) -> Result<UserProfile, ApiError> {
    let user = require_user(session)?;
    let update = trimmed(update);
    debug!(uid = %user.uid, "update_profile command");

    store
        .merge_profile(&user.uid, &user.email, &update)
        .await
        .map_err(|e| {
            error!(uid = %user.uid, error = %e, "Error updating profile");
            ApiError::new(ErrorCode::DatabaseError, "Failed to update profile")
        })?;

    info!(uid = %user.uid, "Profile updated");
    get_profile(session, store).await
}

fn trimmed(update: ProfileUpdate) -> ProfileUpdate {
    let trim = |s: String| s.trim().to_string();
    ProfileUpdate {
        display_name: update.display_name.map(trim),
        phone_number: update.phone_number.map(trim),
        address: update.address.map(|a| Address {
            street: trim(a.street),
            city: trim(a.city),
            state: trim(a.state),
            pin_code: trim(a.pin_code),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::{AuthBackend, LocalBackend, LocalBackendConfig};
    use std::sync::Arc;
    use storefront_core::{Theme, UserPreferences};
    use storefront_db::{Database, DbConfig};

    async fn setup() -> (Database, Arc<LocalBackend>, SessionHolder) {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let backend = Arc::new(LocalBackend::new(db.clone(), LocalBackendConfig::default()));
        let session = SessionHolder::new(backend.clone(), 768);
        (db, backend, session)
    }

    #[tokio::test]
    async fn test_blank_profile_from_session() {
        let (db, backend, session) = setup().await;

        let err = get_profile(&session, &db).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::Unauthenticated);

        let user = backend.create_user("asha@example.com", "secret1").await.unwrap();
        let profile = get_profile(&session, &db).await.unwrap();
        assert_eq!(profile, UserProfile::empty(&user.uid, "asha@example.com"));
    }

    #[tokio::test]
    async fn test_update_merges_and_keeps_preferences() {
        let (db, backend, session) = setup().await;
        let user = backend.create_user("asha@example.com", "secret1").await.unwrap();

        let dark = UserPreferences {
            theme: Theme::Dark,
            ..Default::default()
        };
        db.merge_preferences(&user.uid, &user.email, &dark).await.unwrap();

        let profile = update_profile(
            &session,
            &db,
            ProfileUpdate {
                display_name: Some("  Asha Rao ".to_string()),
                phone_number: Some("9876543210".to_string()),
                address: None,
            },
        )
        .await
        .unwrap();

        assert_eq!(profile.display_name.as_deref(), Some("Asha Rao"));
        assert_eq!(profile.preferences, dark);

        let profile = update_profile(
            &session,
            &db,
            ProfileUpdate {
                address: Some(Address {
                    street: "12 MG Road".to_string(),
                    city: "Bengaluru".to_string(),
                    state: "Karnataka".to_string(),
                    pin_code: "560038".to_string(),
                }),
                ..Default::default()
            },
        )
        .await
        .unwrap();
        assert_eq!(profile.phone_number.as_deref(), Some("9876543210"));
        assert_eq!(profile.address.map(|a| a.city), Some("Bengaluru".to_string()));
    }
}
