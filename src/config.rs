use std::time::Duration;

use url::Url;

use crate::env::Mode;
use crate::error::Error;

/// Default backend address used in embedded mode.
const DEFAULT_BACKEND_URL: &str = "http://localhost:8000";
/// Default same-origin proxy prefix used in browser mode.
const DEFAULT_PROXY_PATH: &str = "/api";
/// Fixed per-call timeout applied by the request pipeline.
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);
/// Route forced on logout, expiry, and authorization rejection.
const DEFAULT_LOGIN_ROUTE: &str = "login";
/// Default authenticated landing route (admin-redirect target).
const DEFAULT_HOME_ROUTE: &str = "dashboard";

/// Network and routing configuration for the session core.
///
/// All fields have working defaults for a local BookDB setup. Override with
/// `with_*` methods, or use [`from_env()`](ApiConfig::from_env) for
/// convention-based setup.
///
/// ```rust
/// use bookdb_session::{ApiConfig, Mode};
///
/// let config = ApiConfig::new();
/// assert_eq!(config.base_endpoint(Mode::Browser), "/api");
/// assert_eq!(config.base_endpoint(Mode::Embedded), "http://localhost:8000");
/// ```
#[derive(Debug, Clone)]
#[non_exhaustive]
pub struct ApiConfig {
    pub(crate) backend_url: Url,
    pub(crate) proxy_path: String,
    pub(crate) timeout: Duration,
    pub(crate) login_route: String,
    pub(crate) home_route: String,
}

impl ApiConfig {
    /// Create a configuration with the default local-backend setup.
    #[must_use]
    pub fn new() -> Self {
        Self {
            backend_url: DEFAULT_BACKEND_URL.parse().expect("valid default URL"),
            proxy_path: DEFAULT_PROXY_PATH.into(),
            timeout: DEFAULT_TIMEOUT,
            login_route: DEFAULT_LOGIN_ROUTE.into(),
            home_route: DEFAULT_HOME_ROUTE.into(),
        }
    }

    /// Create a configuration from environment variables.
    ///
    /// # Optional env vars
    /// - `BOOKDB_BACKEND_URL`: absolute backend address (must be a valid URL)
    /// - `BOOKDB_PROXY_PATH`: relative proxy prefix for browser mode
    /// - `BOOKDB_TIMEOUT_SECS`: per-call timeout in whole seconds
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] if a set variable fails to parse.
    pub fn from_env() -> Result<Self, Error> {
        let mut config = Self::new();

        if let Ok(url_str) = std::env::var("BOOKDB_BACKEND_URL") {
            let url: Url = url_str
                .parse()
                .map_err(|e| Error::Config(format!("BOOKDB_BACKEND_URL: {e}")))?;
            config = config.with_backend_url(url);
        }
        if let Ok(path) = std::env::var("BOOKDB_PROXY_PATH") {
            config = config.with_proxy_path(path);
        }
        if let Ok(secs) = std::env::var("BOOKDB_TIMEOUT_SECS") {
            let secs: u64 = secs
                .parse()
                .map_err(|e| Error::Config(format!("BOOKDB_TIMEOUT_SECS: {e}")))?;
            config = config.with_timeout(Duration::from_secs(secs));
        }

        Ok(config)
    }

    /// Override the absolute backend address.
    #[must_use]
    pub fn with_backend_url(mut self, url: Url) -> Self {
        self.backend_url = url;
        self
    }

    /// Override the browser-mode proxy prefix.
    #[must_use]
    pub fn with_proxy_path(mut self, path: impl Into<String>) -> Self {
        self.proxy_path = path.into();
        self
    }

    /// Override the per-call timeout.
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Override the login route name.
    #[must_use]
    pub fn with_login_route(mut self, route: impl Into<String>) -> Self {
        self.login_route = route.into();
        self
    }

    /// Override the default authenticated landing route name.
    #[must_use]
    pub fn with_home_route(mut self, route: impl Into<String>) -> Self {
        self.home_route = route.into();
        self
    }

    /// Absolute backend address (embedded mode target).
    #[must_use]
    pub fn backend_url(&self) -> &Url {
        &self.backend_url
    }

    /// Browser-mode proxy prefix.
    #[must_use]
    pub fn proxy_path(&self) -> &str {
        &self.proxy_path
    }

    /// Per-call timeout applied by the request pipeline.
    #[must_use]
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Route forced on logout, expiry, and authorization rejection.
    #[must_use]
    pub fn login_route(&self) -> &str {
        &self.login_route
    }

    /// Default authenticated landing route.
    #[must_use]
    pub fn home_route(&self) -> &str {
        &self.home_route
    }

    /// Base endpoint every request path is appended to.
    ///
    /// Embedded mode gets the backend's absolute address (the shell has no
    /// origin to match, so same-origin proxying is unavailable); browser mode
    /// gets the relative prefix the dev proxy rewrites and forwards.
    #[must_use]
    pub fn base_endpoint(&self, mode: Mode) -> String {
        if mode.is_embedded() {
            self.backend_url.as_str().trim_end_matches('/').to_owned()
        } else {
            self.proxy_path.clone()
        }
    }
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let config = ApiConfig::new();
        assert_eq!(config.backend_url().as_str(), "http://localhost:8000/");
        assert_eq!(config.proxy_path(), "/api");
        assert_eq!(config.timeout(), Duration::from_secs(10));
        assert_eq!(config.login_route(), "login");
        assert_eq!(config.home_route(), "dashboard");
    }

    #[test]
    fn base_endpoint_per_mode() {
        let config = ApiConfig::new();
        assert_eq!(config.base_endpoint(Mode::Embedded), "http://localhost:8000");
        assert_eq!(config.base_endpoint(Mode::Browser), "/api");
    }

    #[test]
    fn overrides() {
        let config = ApiConfig::new()
            .with_backend_url("https://inventory.example.com".parse().unwrap())
            .with_proxy_path("/backend")
            .with_login_route("signin");

        assert_eq!(
            config.base_endpoint(Mode::Embedded),
            "https://inventory.example.com"
        );
        assert_eq!(config.base_endpoint(Mode::Browser), "/backend");
        assert_eq!(config.login_route(), "signin");
    }
}
