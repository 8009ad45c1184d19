//! # Settings Commands
//!
//! Notification, theme and language preferences, embedded in the profile
//! document.

use tracing::{debug, error, info};

use storefront_core::UserPreferences;

use crate::backend::DocumentStore;
use crate::error::{ApiError, ErrorCode};
use crate::state::SessionHolder;

use super::require_user;

/// Saved preferences, or the defaults.
pub async fn get_preferences(
    session: &SessionHolder,
    store: &dyn DocumentStore,
) -> Result<UserPreferences, ApiError> {
    let user = require_user(session)?;
    debug!(uid = %user.uid, "get_preferences command");

    let profile = store.get_profile(&user.uid).await.map_err(|e| {
        error!(uid = %user.uid, error = %e, "Error fetching preferences");
        ApiError::new(ErrorCode::DatabaseError, "Failed to load preferences")
    })?;

    Ok(profile.map(|p| p.preferences).unwrap_or_default())
}

/// Merge-writes the whole preferences block. Contact fields are untouched.
pub async fn save_preferences(
    session: &SessionHolder,
    store: &dyn DocumentStore,
    preferences: UserPreferences,
) -> Result<UserPreferences, ApiError> {
    let user = require_user(session)?;
    debug!(uid = %user.uid, theme = ?preferences.theme, "save_preferences command");

    store
        .merge_preferences(&user.uid, &user.email, &preferences)
        .await
        .map_err(|e| {
            error!(uid = %user.uid, error = %e, "Error saving preferences");
            ApiError::new(ErrorCode::DatabaseError, "Failed to save preferences")
        })?;

    info!(uid = %user.uid, "Settings saved");
    Ok(preferences)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::{AuthBackend, LocalBackend, LocalBackendConfig};
    use std::sync::Arc;
    use storefront_core::{ProfileUpdate, Theme};
    use storefront_db::{Database, DbConfig};

    #[tokio::test]
    async fn test_defaults_then_round_trip_through_store() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let backend = Arc::new(LocalBackend::new(db.clone(), LocalBackendConfig::default()));
        let session = SessionHolder::new(backend.clone(), 768);

        let err = get_preferences(&session, &db).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::Unauthenticated);

        let user = backend.create_user("asha@example.com", "secret1").await.unwrap();
        assert_eq!(
            get_preferences(&session, &db).await.unwrap(),
            UserPreferences::default()
        );

        db.merge_profile(
            &user.uid,
            &user.email,
            &ProfileUpdate {
                display_name: Some("Asha".to_string()),
                ..Default::default()
            },
        )
        .await
        .unwrap();

        let wanted = UserPreferences {
            promotional_emails: true,
            theme: Theme::Dark,
            language: "hi".to_string(),
            ..Default::default()
        };
        save_preferences(&session, &db, wanted.clone()).await.unwrap();

        assert_eq!(get_preferences(&session, &db).await.unwrap(), wanted);
        let profile = db.get_profile(&user.uid).await.unwrap().unwrap();
        assert_eq!(profile.display_name.as_deref(), Some("Asha"));
    }
}
