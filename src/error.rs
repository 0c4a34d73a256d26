/// Errors surfaced by the session and request-authorization core.
///
/// Locally absorbed conditions (expired sessions, malformed cached profiles)
/// never appear here; they read back as an absent session instead.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum Error {
    /// Server rejected the request with a non-401 status. Surfaced verbatim
    /// so the UI layer owns user-facing messaging.
    #[error("API request failed with status {status}: {detail}")]
    Api { status: u16, detail: String },

    /// Server answered 401. The session has already been cleared and
    /// navigation to the login route signalled by the time this is returned.
    #[error("authorization rejected: {detail}")]
    Unauthorized { detail: String },

    /// No response obtained (connection failure, timeout). Never interpreted
    /// as an authorization failure.
    #[error("transport error: {0}")]
    Transport(#[source] Box<dyn std::error::Error + Send + Sync>),

    /// Request or response body did not match the expected shape.
    #[error("schema error: {0}")]
    Schema(String),

    /// Persistent session medium failed to read or write.
    #[error("session store error: {0}")]
    Store(String),

    /// Missing or invalid configuration.
    #[error("configuration error: {0}")]
    Config(String),
}

impl From<reqwest::Error> for Error {
    fn from(e: reqwest::Error) -> Self {
        Self::Transport(Box::new(e))
    }
}
