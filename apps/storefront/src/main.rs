//! # Storefront Entry Point
//!
//! Starts the storefront against the configured SQLite file, reports what
//! the shop is carrying, and waits for Ctrl-C.
//!
//! ## Application Architecture
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Storefront Process                              │
//! │                                                                         │
//! │  main.rs ────► tracing, config, App::start                              │
//! │                                                                         │
//! │  commands/ ──► browse_catalog, add_to_cart, sign_in, place_order, ...   │
//! │                                                                         │
//! │  state/ ─────► SessionHolder, CartState, ConfigState                    │
//! │                                 │                                       │
//! │                                 ▼                                       │
//! │  backend/ ───► LocalBackend (auth) + Database (DocumentStore)           │
//! │                                 │                                       │
//! │                                 ▼                                       │
//! │                 storefront.db (local file, WAL mode)                    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::process::ExitCode;

use tracing::{error, info};

use storefront_app::commands::catalog;
use storefront_app::state::ConfigState;
use storefront_app::{init_tracing, App};

#[tokio::main]
async fn main() -> ExitCode {
    init_tracing();
    info!("Starting storefront v{}", env!("CARGO_PKG_VERSION"));

    let config = ConfigState::from_env();
    let app = match App::start(config).await {
        Ok(app) => app,
        Err(e) => {
            error!(error = %e, "Failed to start storefront");
            return ExitCode::FAILURE;
        }
    };

    for category in catalog::list_categories() {
        info!(category = %category.name, products = category.count, "Catalog category");
    }

    match app.session.current_user() {
        Some(user) => info!(uid = %user.uid, email = %user.email, "Session restored"),
        None => info!("No signed-in user"),
    }

    if let Err(e) = tokio::signal::ctrl_c().await {
        error!(error = %e, "Failed to listen for shutdown signal");
    }

    app.shutdown().await;
    ExitCode::SUCCESS
}
