//! Pre-transition authorization checks for client-side routing.
//!
//! The external router calls [`NavigationGuard::check`] before committing to
//! a route transition. The decision itself ([`NavigationGuard::decide`]) is
//! a pure function of the route flags and a session snapshot: no network,
//! no hidden reads. The only side effect lives in `check`: a session found
//! expired is cleared from the store before being treated as absent.

use std::sync::Arc;

use time::OffsetDateTime;

use crate::config::ApiConfig;
use crate::store::SessionStore;
use crate::types::Session;

/// Authorization-relevant metadata of a route, owned by the external router.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RouteMeta {
    pub name: String,
    /// Route is only reachable with a valid session.
    pub requires_auth: bool,
    /// Route is only reachable by super admins.
    pub requires_admin: bool,
}

impl RouteMeta {
    /// A route with no authorization requirements.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            requires_auth: false,
            requires_admin: false,
        }
    }

    /// Require a valid session.
    #[must_use]
    pub fn auth_required(mut self) -> Self {
        self.requires_auth = true;
        self
    }

    /// Require a super-admin profile.
    #[must_use]
    pub fn admin_required(mut self) -> Self {
        self.requires_admin = true;
        self
    }
}

/// Outcome of a guard check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Decision {
    /// Commit the transition.
    Allow,
    /// Abort and go to the named route instead.
    Redirect(String),
}

/// Gate invoked before every in-app route transition.
pub struct NavigationGuard<S> {
    store: Arc<S>,
    login_route: String,
    home_route: String,
}

impl<S: SessionStore> NavigationGuard<S> {
    #[must_use]
    pub fn new(config: &ApiConfig, store: Arc<S>) -> Self {
        Self {
            store,
            login_route: config.login_route().to_owned(),
            home_route: config.home_route().to_owned(),
        }
    }

    /// Check `target` against the currently stored session.
    ///
    /// An expired session is cleared here — this and the pipeline's 401
    /// handler are the only expiry-driven writers of the store.
    pub fn check(&self, target: &RouteMeta) -> Decision {
        self.check_at(target, OffsetDateTime::now_utc())
    }

    /// [`check`](Self::check) against an explicit instant.
    pub fn check_at(&self, target: &RouteMeta, now: OffsetDateTime) -> Decision {
        let mut session = self.store.get();

        if session.as_ref().is_some_and(|s| s.is_expired(now)) {
            tracing::warn!(route = %target.name, "session expired; forcing re-login");
            if let Err(error) = self.store.clear() {
                tracing::error!(error = %error, "failed to clear expired session");
            }
            session = None;
        }

        self.decide(target, session.as_ref())
    }

    /// Pure decision over a session snapshot.
    #[must_use]
    pub fn decide(&self, target: &RouteMeta, session: Option<&Session>) -> Decision {
        if target.requires_auth && session.is_none() {
            return Decision::Redirect(self.login_route.clone());
        }

        if target.requires_admin {
            return match session {
                None => Decision::Redirect(self.login_route.clone()),
                Some(s) if !s.profile.is_super_admin => {
                    Decision::Redirect(self.home_route.clone())
                }
                Some(_) => Decision::Allow,
            };
        }

        Decision::Allow
    }
}
