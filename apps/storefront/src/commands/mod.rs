//! # Commands Module
//!
//! Every operation the presentation layer can invoke.
//!
//! ## Command Organization
//! ```text
//! commands/
//! ├── mod.rs       ◄─── You are here (exports, session guard)
//! ├── catalog.rs   ◄─── Browse, filter, paginate, product detail
//! ├── cart.rs      ◄─── Cart manipulation
//! ├── auth.rs      ◄─── Sign up / in / out, Google, password reset
//! ├── checkout.rs  ◄─── Order placement
//! ├── orders.rs    ◄─── Order history
//! ├── profile.rs   ◄─── Contact details
//! └── settings.rs  ◄─── Preferences
//! ```
//!
//! ## State Injection
//! Each command takes only the state it needs:
//! ```rust,ignore
//! // Only needs config
//! fn browse_catalog(config: &ConfigState, filter: &FilterState, page: usize)
//!
//! // Only needs cart
//! fn get_cart(cart: &CartState)
//!
//! // Needs session, cart and the document store
//! async fn place_order(session: &SessionHolder, cart: &CartState,
//!                      store: &dyn DocumentStore, form: CheckoutForm)
//! ```
//!
//! Commands that touch user data start with [`require_user`].

pub mod auth;
pub mod cart;
pub mod catalog;
pub mod checkout;
pub mod orders;
pub mod profile;
pub mod settings;

use tracing::debug;

use crate::backend::AuthUser;
use crate::error::ApiError;
use crate::state::SessionHolder;

/// The signed-in user, or `UNAUTHENTICATED`.
pub fn require_user(session: &SessionHolder) -> Result<AuthUser, ApiError> {
    session.current_user().ok_or_else(|| {
        debug!("Rejected command without a session");
        ApiError::unauthenticated()
    })
}
