//! Authentication/session state and its lifecycle.
//!
//! State lives behind a watch channel so every mutation is visible to all
//! subscribers; only this store writes it. Transitions:
//! `Loading -> Authenticated | Anonymous`, and from either of those to the
//! terminal license-expired state, reached through the status check or the
//! transport-level interrupt.

use std::sync::Arc;

use tokio::sync::watch;
use tracing::{info, warn};

use crate::api::ApiClient;
use crate::error::ApiError;
use crate::models::{AssociationSet, Identity};
use crate::services::auth;

#[derive(Debug, Clone, PartialEq)]
pub struct Session {
    pub is_authenticated: bool,
    pub user: Option<Identity>,
    /// True from creation until the first status check completes, and
    /// during later explicit checks. Consumers show a loading indicator
    /// while set, never a redirect.
    pub loading: bool,
    /// Terminal for the process lifetime once set.
    pub license_expired: bool,
}

impl Default for Session {
    fn default() -> Self {
        Self {
            is_authenticated: false,
            user: None,
            loading: true,
            license_expired: false,
        }
    }
}

pub struct SessionStore {
    client: Arc<ApiClient>,
    state: Arc<watch::Sender<Session>>,
}

impl SessionStore {
    /// Create the store and register it on the client's interrupt slot,
    /// so a 503 observed by any request flips the session to
    /// license-expired no matter which call triggered it.
    pub fn new(client: Arc<ApiClient>) -> Self {
        let (state, _) = watch::channel(Session::default());
        let state = Arc::new(state);

        let hook_state = Arc::clone(&state);
        client.interrupts().register(move || {
            hook_state.send_modify(|s| s.license_expired = true);
        });

        Self { client, state }
    }

    /// Create the store and run the one automatic status check of the
    /// application lifecycle.
    pub async fn bootstrap(client: Arc<ApiClient>) -> Self {
        let store = Self::new(client);
        store.check_status().await;
        store
    }

    pub fn client(&self) -> &Arc<ApiClient> {
        &self.client
    }

    pub fn current(&self) -> Session {
        self.state.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<Session> {
        self.state.subscribe()
    }

    /// Probe the server for the current identity.
    ///
    /// Populates `user` only from a confirmed email+role pair; any other
    /// outcome leaves the session anonymous. The loading flag is cleared
    /// on every path.
    pub async fn check_status(&self) {
        self.state.send_modify(|s| s.loading = true);

        match auth::status(&self.client).await {
            Ok(status) if status.is_authenticated => {
                match (status.user_email, status.user_role) {
                    (Some(email), Some(role)) => {
                        // The status endpoint may omit associations for
                        // legacy accounts; those default to the general
                        // user tag.
                        let associations = AssociationSet::parse(
                            status.user_associations.as_deref().unwrap_or("alpha"),
                        );
                        info!("Authenticated as {}", email);
                        self.state.send_modify(move |s| {
                            s.user = Some(Identity {
                                email,
                                role,
                                associations,
                            });
                            s.is_authenticated = true;
                            s.loading = false;
                        });
                    }
                    _ => self.settle_anonymous(),
                }
            }
            Ok(_) => self.settle_anonymous(),
            Err(err) => {
                warn!("Auth status check failed: {}", err);
                let expired = err.status() == Some(503);
                self.state.send_modify(|s| {
                    s.user = None;
                    s.is_authenticated = false;
                    if expired {
                        s.license_expired = true;
                    }
                    s.loading = false;
                });
            }
        }
    }

    /// Authenticate, then re-probe the status endpoint so `user` reflects
    /// the server-confirmed identity rather than the login response body.
    /// On failure the error is propagated unchanged and session state is
    /// untouched.
    pub async fn login(&self, email: &str, password: &str) -> Result<(), ApiError> {
        auth::login(&self.client, email, password).await?;
        self.check_status().await;
        Ok(())
    }

    /// Create an account. Does not log in; the caller redirects to the
    /// login view on success.
    pub async fn register(
        &self,
        email: &str,
        password: &str,
        auth_code: &str,
    ) -> Result<(), ApiError> {
        auth::register(&self.client, email, password, auth_code).await?;
        Ok(())
    }

    /// End the session. The local state is cleared even when the server
    /// call fails — the cookie may already be invalid, and the UI must
    /// never claim an authentication the server revoked.
    pub async fn logout(&self) {
        if let Err(err) = auth::logout(&self.client).await {
            warn!("Logout request failed, clearing local session anyway: {}", err);
        }
        self.state.send_modify(|s| {
            s.user = None;
            s.is_authenticated = false;
        });
    }

    fn settle_anonymous(&self) {
        self.state.send_modify(|s| {
            s.user = None;
            s.is_authenticated = false;
            s.loading = false;
        });
    }
}
