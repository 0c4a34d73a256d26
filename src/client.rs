//! The request pipeline: single choke point for every outbound API call.
//!
//! Outbound, the pipeline resolves the base endpoint for the runtime
//! environment and attaches the bearer credential from the session store.
//! Inbound, success passes through unchanged; a 401 from *any* endpoint
//! terminates the local session (clear store, signal navigation to the login
//! route) and is then re-raised so the call site can still react. All other
//! failures propagate unchanged — retries are the caller's business.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use reqwest::header::{HeaderMap, HeaderValue, CONTENT_TYPE};
use reqwest::{Method, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::config::ApiConfig;
use crate::env::Mode;
use crate::error::Error;
use crate::store::SessionStore;

/// Sink for forced navigation, registered at startup.
///
/// The pipeline never touches a router directly; it reports "go to this
/// route" through this trait and the composing layer performs the
/// transition. Implementations MUST treat navigation to the already-current
/// route as a no-op: concurrent in-flight calls may each signal the login
/// route when a session dies.
pub trait Navigator: Send + Sync + 'static {
    fn navigate(&self, route: &str);
}

// ── Transport seam ─────────────────────────────────────────────────

/// Outbound request handed to the transport once the pipeline has resolved
/// the URL and attached credentials.
#[derive(Debug, Clone)]
pub struct TransportRequest {
    pub method: Method,
    pub url: String,
    /// Bearer credential, when a session was present at dispatch time.
    pub bearer: Option<String>,
    /// JSON request body, if any.
    pub body: Option<serde_json::Value>,
}

/// Raw response surfaced by the transport. Status classification and body
/// decoding belong to the pipeline, not the transport.
#[derive(Debug, Clone)]
pub struct TransportResponse {
    pub status: StatusCode,
    pub body: String,
}

/// Object-safe seam between the pipeline and the wire.
///
/// An `Err` means no response was obtained (connection failure, timeout) and
/// is reported as [`Error::Transport`]; any received HTTP status, 401
/// included, is an `Ok` response for the pipeline to classify.
pub trait Transport: Send + Sync + 'static {
    fn send(
        &self,
        request: TransportRequest,
    ) -> Pin<Box<dyn Future<Output = Result<TransportResponse, Error>> + Send + '_>>;
}

/// Production transport over reqwest.
///
/// Requires absolute URLs, i.e. a [`Mode::Embedded`] base endpoint. Browser
/// embeddings resolve the relative proxy prefix against the page origin and
/// supply their own [`Transport`].
pub struct HttpTransport {
    http: reqwest::Client,
}

impl HttpTransport {
    /// Build a transport with the pipeline's fixed per-call timeout and JSON
    /// default content type.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] if the underlying client cannot be built.
    pub fn new(timeout: std::time::Duration) -> Result<Self, Error> {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        let http = reqwest::Client::builder()
            .timeout(timeout)
            .default_headers(headers)
            .build()
            .map_err(|e| Error::Config(format!("HTTP client: {e}")))?;

        Ok(Self { http })
    }
}

impl Transport for HttpTransport {
    fn send(
        &self,
        request: TransportRequest,
    ) -> Pin<Box<dyn Future<Output = Result<TransportResponse, Error>> + Send + '_>> {
        Box::pin(async move {
            let mut builder = self.http.request(request.method, &request.url);
            if let Some(token) = &request.bearer {
                builder = builder.bearer_auth(token);
            }
            if let Some(body) = &request.body {
                builder = builder.json(body);
            }

            let response = builder.send().await?;
            let status = response.status();
            let body = response.text().await.unwrap_or_default();

            Ok(TransportResponse { status, body })
        })
    }
}

// ── Pipeline ───────────────────────────────────────────────────────

/// Shared API client wrapping every outbound call.
pub struct ApiClient<S> {
    pub(crate) transport: Arc<dyn Transport>,
    pub(crate) store: Arc<S>,
    pub(crate) navigator: Arc<dyn Navigator>,
    pub(crate) base: String,
    pub(crate) login_route: String,
}

// Manual Clone: avoid derive adding an `S: Clone` bound.
impl<S> Clone for ApiClient<S> {
    fn clone(&self) -> Self {
        Self {
            transport: self.transport.clone(),
            store: self.store.clone(),
            navigator: self.navigator.clone(),
            base: self.base.clone(),
            login_route: self.login_route.clone(),
        }
    }
}

impl<S: SessionStore> ApiClient<S> {
    /// Create a client over the production HTTP transport.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] if the HTTP client cannot be built.
    pub fn new(
        config: &ApiConfig,
        mode: Mode,
        store: Arc<S>,
        navigator: Arc<dyn Navigator>,
    ) -> Result<Self, Error> {
        let transport = Arc::new(HttpTransport::new(config.timeout())?);
        Ok(Self::with_transport(config, mode, store, navigator, transport))
    }

    /// Create a client over a custom transport (browser embeddings, tests).
    #[must_use]
    pub fn with_transport(
        config: &ApiConfig,
        mode: Mode,
        store: Arc<S>,
        navigator: Arc<dyn Navigator>,
        transport: Arc<dyn Transport>,
    ) -> Self {
        Self {
            transport,
            store,
            navigator,
            base: config.base_endpoint(mode),
            login_route: config.login_route().to_owned(),
        }
    }

    /// Base endpoint every request path is appended to.
    #[must_use]
    pub fn base_endpoint(&self) -> &str {
        &self.base
    }

    /// `GET` a JSON resource.
    ///
    /// # Errors
    ///
    /// See [`ApiClient::request`].
    pub async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, Error> {
        self.request(Method::GET, path, None).await
    }

    /// `POST` a JSON body and decode the JSON response.
    ///
    /// # Errors
    ///
    /// See [`ApiClient::request`].
    pub async fn post<T: DeserializeOwned, B: Serialize>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, Error> {
        let body = serde_json::to_value(body).map_err(|e| Error::Schema(e.to_string()))?;
        self.request(Method::POST, path, Some(body)).await
    }

    /// `PATCH` a JSON body and decode the JSON response.
    ///
    /// # Errors
    ///
    /// See [`ApiClient::request`].
    pub async fn patch<T: DeserializeOwned, B: Serialize>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, Error> {
        let body = serde_json::to_value(body).map_err(|e| Error::Schema(e.to_string()))?;
        self.request(Method::PATCH, path, Some(body)).await
    }

    /// `DELETE` a resource and decode the JSON response.
    ///
    /// # Errors
    ///
    /// See [`ApiClient::request`].
    pub async fn delete<T: DeserializeOwned>(&self, path: &str) -> Result<T, Error> {
        self.request(Method::DELETE, path, None).await
    }

    /// Issue a request and decode the response body.
    ///
    /// # Errors
    ///
    /// - [`Error::Unauthorized`] on 401, after the session has been cleared
    ///   and navigation to the login route signalled.
    /// - [`Error::Api`] on any other rejection status.
    /// - [`Error::Transport`] when no response was obtained.
    /// - [`Error::Schema`] when a success body does not match `T`.
    pub async fn request<T: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        body: Option<serde_json::Value>,
    ) -> Result<T, Error> {
        let response = self.dispatch(method, path, body).await?;
        serde_json::from_str(&response.body).map_err(|e| Error::Schema(e.to_string()))
    }

    /// Issue a request, returning the raw response on success.
    pub(crate) async fn dispatch(
        &self,
        method: Method,
        path: &str,
        body: Option<serde_json::Value>,
    ) -> Result<TransportResponse, Error> {
        let url = format!("{}{}", self.base, path);
        let bearer = self.store.get().map(|session| session.token);
        tracing::debug!(method = %method, url = %url, authenticated = bearer.is_some(), "API request");

        let response = self
            .transport
            .send(TransportRequest {
                method,
                url,
                bearer,
                body,
            })
            .await?;

        if response.status == StatusCode::UNAUTHORIZED {
            self.force_login();
            return Err(Error::Unauthorized {
                detail: response.body,
            });
        }
        if !response.status.is_success() {
            return Err(Error::Api {
                status: response.status.as_u16(),
                detail: response.body,
            });
        }

        tracing::debug!(status = %response.status, bytes = response.body.len(), "API response");
        Ok(response)
    }

    /// Best-effort backend reachability probe against the base endpoint.
    ///
    /// Any received response counts as reachable regardless of status; only
    /// a transport-level failure reports the backend as down. Never touches
    /// the session.
    pub async fn check_backend_health(&self) -> bool {
        let probe = TransportRequest {
            method: Method::GET,
            url: self.base.clone(),
            bearer: None,
            body: None,
        };
        match self.transport.send(probe).await {
            Ok(_) => true,
            Err(error) => {
                tracing::warn!(error = %error, backend = %self.base, "backend health check failed");
                false
            }
        }
    }

    /// Global 401 reaction: clear the session, then signal the login route.
    /// Safe to run from any number of in-flight calls; both steps are
    /// idempotent.
    fn force_login(&self) {
        tracing::warn!("authorization rejected by server; terminating local session");
        if let Err(error) = self.store.clear() {
            tracing::error!(error = %error, "failed to clear session store");
        }
        self.navigator.navigate(&self.login_route);
    }
}
