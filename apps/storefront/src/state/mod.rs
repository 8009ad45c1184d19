//! # State Module
//!
//! Long-lived application state. Instead of one `AppState` struct each
//! concern gets its own type, and commands take only the ones they use.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    State Architecture                                   │
//! │                                                                         │
//! │  ┌──────────────────┐ ┌──────────────────┐ ┌──────────────────────┐    │
//! │  │  SessionHolder   │ │    CartState     │ │    ConfigState       │    │
//! │  │                  │ │                  │ │                      │    │
//! │  │  dyn AuthBackend │ │  Arc<Mutex<      │ │  page size           │    │
//! │  │  watch snapshot  │ │    Cart          │ │  mobile breakpoint   │    │
//! │  │  listener task   │ │  >>              │ │  db path, secrets    │    │
//! │  └──────────────────┘ └──────────────────┘ └──────────────────────┘    │
//! │                                                                         │
//! │  THREAD SAFETY:                                                        │
//! │  • SessionHolder: watch channel, the backend is Send + Sync            │
//! │  • CartState: Arc<Mutex<T>> for exclusive access                       │
//! │  • ConfigState: read-only after initialization                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

mod cart;
mod config;
mod session;

pub use cart::{Cart, CartAction, CartItem, CartState, CartTotals};
pub use config::ConfigState;
pub use session::{
    choose_flow, AuthError, AuthFlow, AuthOperation, GoogleSignIn, SessionHolder, SessionSnapshot,
};
