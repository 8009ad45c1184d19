//! # Storefront Application Library
//!
//! Wires the storefront together: configuration, the local backend, the
//! session holder and the cart. The presentation layer drives it through
//! [`commands`].
//!
//! ## Module Organization
//! ```text
//! storefront_app/
//! ├── lib.rs          ◄─── You are here (App bootstrap, tracing)
//! ├── backend/
//! │   ├── mod.rs      ◄─── AuthBackend + DocumentStore contracts
//! │   ├── local.rs    ◄─── SQLite-backed auth service
//! │   └── store.rs    ◄─── DocumentStore over storefront-db
//! ├── state/
//! │   ├── session.rs  ◄─── Auth session holder
//! │   ├── cart.rs     ◄─── Cart state
//! │   └── config.rs   ◄─── Configuration state
//! ├── commands/       ◄─── catalog, cart, auth, checkout, orders, profile, settings
//! └── error.rs        ◄─── API error type for commands
//! ```
//!
//! ## Startup Sequence
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  1. init_tracing()            RUST_LOG or info,storefront=debug,sqlx=warn│
//! │  2. ConfigState::from_env()   STOREFRONT_* over defaults                │
//! │  3. Database::new()           SQLite, WAL, migrations                   │
//! │  4. LocalBackend::new()       accounts, tokens, Google identity         │
//! │  5. SessionHolder::start()    subscribe + reconcile redirect sign-in    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

pub mod backend;
pub mod commands;
pub mod error;
pub mod state;

use std::sync::Arc;

use thiserror::Error;
use tracing::info;
use tracing_subscriber::EnvFilter;

use backend::{DocumentStore, LocalBackend};
use state::{CartState, ConfigState, SessionHolder};
use storefront_db::{Database, DbConfig, DbError};

/// Startup failures.
#[derive(Debug, Error)]
pub enum StartupError {
    #[error("Could not resolve database path: {0}")]
    DataDir(#[from] std::io::Error),

    #[error(transparent)]
    Database(#[from] DbError),
}

/// Everything a running storefront holds.
pub struct App {
    pub config: ConfigState,
    pub db: Database,
    pub backend: Arc<LocalBackend>,
    pub session: SessionHolder,
    pub cart: CartState,
}

impl App {
    /// Opens the configured database and starts the session holder.
    pub async fn start(config: ConfigState) -> Result<App, StartupError> {
        let db_path = config.database_path()?;
        info!(path = %db_path.display(), "Database path determined");

        let db = Database::new(DbConfig::new(db_path)).await?;
        Ok(App::with_database(config, db).await)
    }

    /// Builds the app around an already-open database.
    pub async fn with_database(config: ConfigState, db: Database) -> App {
        let backend = Arc::new(LocalBackend::new(db.clone(), config.backend_config()));
        backend.set_google_identity(config.google_identity());

        let session = SessionHolder::new(backend.clone(), config.mobile_breakpoint_px);
        session.start().await;

        info!(store = %config.store_name, "Storefront ready");

        App {
            config,
            db,
            backend,
            session,
            cart: CartState::new(),
        }
    }

    /// The document store commands write to.
    pub fn store(&self) -> &dyn DocumentStore {
        &self.db
    }

    pub async fn shutdown(&self) {
        self.session.shutdown();
        self.db.close().await;
        info!("Storefront stopped");
    }
}

/// Initializes the tracing subscriber for structured logging.
///
/// ## Log Levels
/// - `RUST_LOG=debug` - Show debug messages
/// - `RUST_LOG=storefront_app=trace` - Trace for this crate only
/// - Default: `info,storefront=debug,sqlx=warn`
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,storefront=debug,sqlx=warn"));

    let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::{auth, cart, catalog, checkout, orders, profile, settings};
    use crate::error::ErrorCode;
    use storefront_core::filter::FilterUpdate;
    use storefront_core::validation::CheckoutForm;
    use storefront_core::{Money, OrderStatus, PaymentMethod, ProfileUpdate, Theme, UserPreferences};

    async fn app() -> App {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        App::with_database(ConfigState::default(), db).await
    }

    #[tokio::test]
    async fn test_browse_sign_up_checkout_and_history() {
        let app = app().await;
        assert!(app.session.current_user().is_none());
        assert!(!app.session.snapshot().loading);

        // Shop page: search narrows to one product
        let filter = catalog::update_filter(
            &catalog::reset_filter(),
            FilterUpdate {
                search_term: Some("California".to_string()),
                ..Default::default()
            },
        );
        let page = catalog::browse_catalog(&app.config, &filter, 1);
        assert_eq!(page.total_items, 1);
        let almonds = page.items[0].id.clone();

        cart::add_to_cart(&app.cart, &almonds, Some(2)).unwrap();
        cart::add_to_cart(&app.cart, &almonds, None).unwrap();
        let response = cart::get_cart(&app.cart);
        assert_eq!(response.totals.item_count, 3);
        assert_eq!(response.totals.total, Money::from_rupees(899 * 3));

        let form = CheckoutForm {
            full_name: "Asha Rao".to_string(),
            phone_number: "9876543210".to_string(),
            email: "asha@example.com".to_string(),
            address: "12 MG Road, Indiranagar".to_string(),
            city: "Bengaluru".to_string(),
            state: "Karnataka".to_string(),
            pincode: "560038".to_string(),
            country: "India".to_string(),
            payment_method: PaymentMethod::Cod,
        };

        let err = checkout::place_order(&app.session, &app.cart, app.store(), form.clone())
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::Unauthenticated);

        let user = auth::sign_up(
            &app.session,
            auth::Credentials {
                email: "asha@example.com".to_string(),
                password: "secret1".to_string(),
            },
        )
        .await
        .unwrap();
        assert_eq!(
            app.session.current_user().map(|u| u.uid),
            Some(user.uid.clone())
        );

        let placed = checkout::place_order(&app.session, &app.cart, app.store(), form)
            .await
            .unwrap();
        assert_eq!(placed.item_count, 3);
        assert!(cart::get_cart(&app.cart).items.is_empty());

        let history = orders::list_orders(&app.session, app.store(), "all").await.unwrap();
        assert_eq!(history.len(), 1);
        assert_eq!(history[0].order.id, placed.order_id);
        assert_eq!(history[0].order.status, OrderStatus::Pending);
        assert_eq!(history[0].display_number, placed.display_number);

        auth::sign_out(&app.session).await.unwrap();
        let err = orders::list_orders(&app.session, app.store(), "all").await.unwrap_err();
        assert_eq!(err.code, ErrorCode::Unauthenticated);

        app.shutdown().await;
    }

    #[tokio::test]
    async fn test_profile_and_settings_share_one_document() {
        let app = app().await;
        auth::sign_up(
            &app.session,
            auth::Credentials {
                email: "ravi@example.com".to_string(),
                password: "secret1".to_string(),
            },
        )
        .await
        .unwrap();

        profile::update_profile(
            &app.session,
            app.store(),
            ProfileUpdate {
                display_name: Some("Ravi".to_string()),
                ..Default::default()
            },
        )
        .await
        .unwrap();

        let prefs = UserPreferences {
            theme: Theme::Dark,
            ..Default::default()
        };
        settings::save_preferences(&app.session, app.store(), prefs.clone())
            .await
            .unwrap();

        let stored = profile::get_profile(&app.session, app.store()).await.unwrap();
        assert_eq!(stored.display_name.as_deref(), Some("Ravi"));
        assert_eq!(stored.preferences, prefs);

        let form = checkout::checkout_defaults(&app.session, app.store()).await.unwrap();
        assert_eq!(form.full_name, "Ravi");
        assert_eq!(form.email, "ravi@example.com");
    }
}
