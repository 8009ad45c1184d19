//! [`DocumentStore`] over the local SQLite database.

use async_trait::async_trait;
use tracing::{error, warn};

use super::{codes, BackendError, BackendResult, DocumentStore};
use storefront_core::{Order, OrderDraft, OrderStatus, ProfileUpdate, UserPreferences, UserProfile};
use storefront_db::{Database, DbError};

impl From<DbError> for BackendError {
    fn from(err: DbError) -> Self {
        let code = match &err {
            DbError::ConnectionFailed(_) | DbError::PoolExhausted => codes::STORE_UNAVAILABLE,
            DbError::Document(_) => codes::STORE_INVALID_DOCUMENT,
            _ => codes::STORE_INTERNAL,
        };

        if code == codes::STORE_UNAVAILABLE {
            warn!(error = %err, "Document store unavailable");
        } else {
            error!(error = %err, "Document store error");
        }

        BackendError::new(code, err.to_string())
    }
}

#[async_trait]
impl DocumentStore for Database {
    async fn get_profile(&self, uid: &str) -> BackendResult<Option<UserProfile>> {
        Ok(self.profiles().get(uid).await?)
    }

    async fn merge_profile(
        &self,
        uid: &str,
        email: &str,
        update: &ProfileUpdate,
    ) -> BackendResult<()> {
        Ok(self.profiles().merge_contact(uid, email, update).await?)
    }

    async fn merge_preferences(
        &self,
        uid: &str,
        email: &str,
        preferences: &UserPreferences,
    ) -> BackendResult<()> {
        Ok(self
            .profiles()
            .merge_preferences(uid, email, preferences)
            .await?)
    }

    async fn add_order(&self, draft: &OrderDraft) -> BackendResult<String> {
        let order = self.orders().insert(draft).await?;
        Ok(order.id)
    }

    async fn get_order(&self, id: &str) -> BackendResult<Option<Order>> {
        Ok(self.orders().get_by_id(id).await?)
    }

    async fn orders_for_user(
        &self,
        uid: &str,
        status: Option<OrderStatus>,
    ) -> BackendResult<Vec<Order>> {
        Ok(self.orders().list_for_user(uid, status).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use storefront_core::Theme;
    use storefront_db::DbConfig;

    #[test]
    fn test_db_errors_map_to_store_codes() {
        let err: BackendError = DbError::PoolExhausted.into();
        assert_eq!(err.code, codes::STORE_UNAVAILABLE);

        let err: BackendError = DbError::Document("bad json".to_string()).into();
        assert_eq!(err.code, codes::STORE_INVALID_DOCUMENT);

        let err: BackendError = DbError::QueryFailed("boom".to_string()).into();
        assert_eq!(err.code, codes::STORE_INTERNAL);
    }

    #[tokio::test]
    async fn test_preferences_through_store_contract() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let store: &dyn DocumentStore = &db;

        assert!(store.get_profile("u1").await.unwrap().is_none());

        let prefs = UserPreferences {
            theme: Theme::Dark,
            ..Default::default()
        };
        store
            .merge_preferences("u1", "asha@example.com", &prefs)
            .await
            .unwrap();

        let profile = store.get_profile("u1").await.unwrap().unwrap();
        assert_eq!(profile.preferences.theme, Theme::Dark);
        assert_eq!(profile.email, "asha@example.com");
    }
}
