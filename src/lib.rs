//! Client-side core for the DeskMate IT helpdesk platform.
//!
//! The remote API owns all persistent state and authorization decisions;
//! this crate owns the orchestration in front of it: the HTTP wrapper and
//! its cross-cutting license-expired interrupt, the session lifecycle,
//! list pagination with per-row enrichment, and transient notifications.
//! Views render the state these components publish.

pub mod api;
pub mod config;
pub mod error;
pub mod models;
pub mod notify;
pub mod query;
pub mod services;
pub mod session;
pub mod validate;

pub use api::ApiClient;
pub use config::ClientConfig;
pub use error::{ApiError, ConfigError, ValidationError};
pub use notify::{Notification, NotificationBus, NotificationKind};
pub use query::{ListQuery, PageView, RecordSource};
pub use session::{Session, SessionStore};

/// Initialize logging for an application embedding this crate. Honors
/// `RUST_LOG`, defaulting to `info`.
pub fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();
}
