use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

/// Cached snapshot of the authenticated principal.
///
/// Mirrors the server's user schema. Authoritative state lives server-side;
/// this copy exists so the guard and UI can make decisions without a network
/// round trip.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserProfile {
    pub username: String,
    pub employee_id: String,
    pub true_name: String,
    pub gender: String,
    pub age: u32,
    #[serde(rename = "isSuperAdmin")]
    pub is_super_admin: bool,
}

/// Credential-exchange request body for `POST /login`.
#[derive(Debug, Clone, Serialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

/// Success body of `POST /login`.
#[derive(Debug, Clone, Deserialize)]
#[non_exhaustive]
pub struct LoginResponse {
    pub access_token: String,
    #[serde(default)]
    pub token_type: Option<String>,
    pub user_info: UserProfile,
    #[serde(with = "time::serde::rfc3339")]
    pub expiration_time: OffsetDateTime,
}

/// The authenticated-session record.
///
/// Either fully present or fully absent: `token`, `expires_at`, and
/// `profile` are set and cleared together. Partial persisted state reads
/// back as no session at all.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    /// Opaque bearer credential issued by the server.
    pub token: String,
    /// Absolute instant after which the token is invalid regardless of
    /// server-side state.
    pub expires_at: OffsetDateTime,
    /// Cached principal snapshot.
    pub profile: UserProfile,
}

impl Session {
    /// Whether the session is past its expiration at `now`.
    #[must_use]
    pub fn is_expired(&self, now: OffsetDateTime) -> bool {
        now >= self.expires_at
    }
}

impl From<LoginResponse> for Session {
    fn from(response: LoginResponse) -> Self {
        Self {
            token: response.access_token,
            expires_at: response.expiration_time,
            profile: response.user_info,
        }
    }
}
