//! Login/logout and session bookkeeping.
//!
//! The auth service is the only writer of the session store on the login
//! path; the request pipeline's 401 handler is the only other writer. Reads
//! (`is_authenticated`, `current_user`) never mutate the store: expired
//! sessions are cleared by the navigation guard or the pipeline, not here.

use std::sync::Arc;

use reqwest::Method;
use time::OffsetDateTime;

use crate::client::{ApiClient, Navigator};
use crate::error::Error;
use crate::store::SessionStore;
use crate::types::{LoginRequest, LoginResponse, Session, UserProfile};

/// Credential exchange and session lifecycle against the BookDB backend.
pub struct AuthService<S> {
    client: ApiClient<S>,
    store: Arc<S>,
    navigator: Arc<dyn Navigator>,
}

impl<S: SessionStore> AuthService<S> {
    /// Build the service over an existing pipeline. Store and navigator are
    /// shared with the pipeline so both react to the same session.
    #[must_use]
    pub fn new(client: ApiClient<S>) -> Self {
        let store = client.store.clone();
        let navigator = client.navigator.clone();
        Self {
            client,
            store,
            navigator,
        }
    }

    /// Exchange credentials for a session and persist it.
    ///
    /// # Errors
    ///
    /// Rejected credentials and transport failures propagate unchanged from
    /// the pipeline (no retry, no transformation; the UI layer owns the
    /// messaging). [`Error::Store`] means the session could not be persisted.
    pub async fn login(&self, username: &str, password: &str) -> Result<Session, Error> {
        let request = LoginRequest {
            username: username.to_owned(),
            password: password.to_owned(),
        };
        let response: LoginResponse = self.client.post("/login", &request).await?;

        let session = Session::from(response);
        self.store.set(&session)?;

        tracing::info!(user = %session.profile.username, "login successful");
        Ok(session)
    }

    /// Terminate the session, best-effort against the server.
    ///
    /// The server notification may fail in any way; the local session is
    /// cleared and navigation to the login route signalled regardless, so
    /// logging out never depends on server reachability.
    pub async fn logout(&self) {
        if let Err(error) = self
            .client
            .dispatch(Method::POST, "/logout", Some(serde_json::json!({})))
            .await
        {
            tracing::warn!(error = %error, "logout notification failed");
        }

        if let Err(error) = self.store.clear() {
            tracing::error!(error = %error, "failed to clear session store during logout");
        }
        self.navigator.navigate(&self.client.login_route);
        tracing::info!("logged out");
    }

    /// Whether a non-expired session is present. Read-only: an expired
    /// session is reported as unauthenticated but left in the store.
    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        match self.store.get() {
            Some(session) => !session.is_expired(OffsetDateTime::now_utc()),
            None => false,
        }
    }

    /// Cached profile of the authenticated principal, if any. Malformed
    /// cached data reads as absent, never as an error.
    #[must_use]
    pub fn current_user(&self) -> Option<UserProfile> {
        self.store.get().map(|session| session.profile)
    }
}
