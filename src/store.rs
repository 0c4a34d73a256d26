//! Durable session state.
//!
//! The persistent medium is a plain key/value namespace scoped to the
//! application: three independent keys written and removed together so a
//! session is either fully present or fully absent. The medium itself has no
//! multi-key transaction, so the all-or-nothing invariant is enforced at
//! each write site, and reads treat any missing or unparsable key as no
//! session without attempting repair.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};

use time::format_description::well_known::Rfc3339;
use time::OffsetDateTime;

use crate::error::Error;
use crate::types::{Session, UserProfile};

/// Key holding the raw bearer token.
pub const TOKEN_KEY: &str = "token";
/// Key holding the serialized user profile.
pub const USER_KEY: &str = "user";
/// Key holding the RFC 3339 expiration timestamp.
pub const EXPIRATION_KEY: &str = "tokenExpiration";

/// Durable session persistence.
///
/// All operations are synchronous and touch only the local medium — no
/// network. `clear` on an already-absent session is a no-op; concurrent
/// clears are tolerated.
pub trait SessionStore: Send + Sync + 'static {
    /// Read the current session. Any missing key, or a key that fails to
    /// parse, yields `None`.
    fn get(&self) -> Option<Session>;

    /// Persist a session, writing all keys together.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Store`] if the medium rejects a write.
    fn set(&self, session: &Session) -> Result<(), Error>;

    /// Remove all session keys. Idempotent.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Store`] if the medium rejects a removal.
    fn clear(&self) -> Result<(), Error>;
}

// ── File-backed store ──────────────────────────────────────────────

/// Session store backed by one file per key inside an application data
/// directory. Survives process restarts.
#[derive(Debug)]
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    /// Open (creating if needed) a store rooted at `dir`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Store`] if the directory cannot be created.
    pub fn open(dir: impl Into<PathBuf>) -> Result<Self, Error> {
        let dir = dir.into();
        fs::create_dir_all(&dir)
            .map_err(|e| Error::Store(format!("create {}: {e}", dir.display())))?;
        Ok(Self { dir })
    }

    /// Open the store at the platform's local data directory
    /// (`<data_local_dir>/bookdb/session`).
    ///
    /// # Errors
    ///
    /// Returns [`Error::Store`] if no local data directory exists or it
    /// cannot be created.
    pub fn open_default() -> Result<Self, Error> {
        let base = dirs::data_local_dir()
            .ok_or_else(|| Error::Store("no local data directory available".into()))?;
        Self::open(base.join("bookdb").join("session"))
    }

    /// Directory holding the key files.
    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn read_key(&self, key: &str) -> Option<String> {
        fs::read_to_string(self.dir.join(key)).ok()
    }

    fn write_key(&self, key: &str, value: &str) -> Result<(), Error> {
        fs::write(self.dir.join(key), value)
            .map_err(|e| Error::Store(format!("write {key}: {e}")))
    }

    fn remove_key(&self, key: &str) -> Result<(), Error> {
        match fs::remove_file(self.dir.join(key)) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(Error::Store(format!("remove {key}: {e}"))),
        }
    }
}

impl SessionStore for FileStore {
    fn get(&self) -> Option<Session> {
        let token = self.read_key(TOKEN_KEY)?;
        let user = self.read_key(USER_KEY)?;
        let expiration = self.read_key(EXPIRATION_KEY)?;

        let profile: UserProfile = serde_json::from_str(&user).ok()?;
        let expires_at = OffsetDateTime::parse(expiration.trim(), &Rfc3339).ok()?;

        Some(Session {
            token,
            expires_at,
            profile,
        })
    }

    fn set(&self, session: &Session) -> Result<(), Error> {
        let user = serde_json::to_string(&session.profile)
            .map_err(|e| Error::Store(format!("serialize profile: {e}")))?;
        let expiration = session
            .expires_at
            .format(&Rfc3339)
            .map_err(|e| Error::Store(format!("format expiration: {e}")))?;

        self.write_key(TOKEN_KEY, &session.token)?;
        self.write_key(USER_KEY, &user)?;
        self.write_key(EXPIRATION_KEY, &expiration)
    }

    fn clear(&self) -> Result<(), Error> {
        self.remove_key(TOKEN_KEY)?;
        self.remove_key(USER_KEY)?;
        self.remove_key(EXPIRATION_KEY)
    }
}

// ── In-memory store ────────────────────────────────────────────────

/// Ephemeral session store for tests and contexts without a durable medium.
#[derive(Debug, Default)]
pub struct MemoryStore {
    session: Mutex<Option<Session>>,
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Option<Session>> {
        self.session.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl SessionStore for MemoryStore {
    fn get(&self) -> Option<Session> {
        self.lock().clone()
    }

    fn set(&self, session: &Session) -> Result<(), Error> {
        *self.lock() = Some(session.clone());
        Ok(())
    }

    fn clear(&self) -> Result<(), Error> {
        *self.lock() = None;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use time::macros::datetime;

    use super::*;

    fn sample_session() -> Session {
        Session {
            token: "jwt-token".into(),
            expires_at: datetime!(2026-06-01 08:00:00 UTC),
            profile: UserProfile {
                username: "kevin".into(),
                employee_id: "E-1024".into(),
                true_name: "Kevin Chen".into(),
                gender: "male".into(),
                age: 31,
                is_super_admin: true,
            },
        }
    }

    #[test]
    fn file_store_round_trip() {
        let tmp = tempfile::tempdir().unwrap();
        let store = FileStore::open(tmp.path()).unwrap();
        let session = sample_session();

        store.set(&session).unwrap();
        assert_eq!(store.get(), Some(session));
    }

    #[test]
    fn file_store_absent_by_default() {
        let tmp = tempfile::tempdir().unwrap();
        let store = FileStore::open(tmp.path()).unwrap();
        assert_eq!(store.get(), None);
    }

    #[test]
    fn file_store_clear_removes_every_key() {
        let tmp = tempfile::tempdir().unwrap();
        let store = FileStore::open(tmp.path()).unwrap();
        store.set(&sample_session()).unwrap();

        store.clear().unwrap();

        assert_eq!(store.get(), None);
        assert!(!tmp.path().join(TOKEN_KEY).exists());
        assert!(!tmp.path().join(USER_KEY).exists());
        assert!(!tmp.path().join(EXPIRATION_KEY).exists());
    }

    #[test]
    fn file_store_clear_is_idempotent() {
        let tmp = tempfile::tempdir().unwrap();
        let store = FileStore::open(tmp.path()).unwrap();
        store.clear().unwrap();
        store.clear().unwrap();
    }

    #[test]
    fn partial_state_reads_as_absent() {
        let tmp = tempfile::tempdir().unwrap();
        let store = FileStore::open(tmp.path()).unwrap();
        store.set(&sample_session()).unwrap();

        // Token without its expiration violates the all-or-nothing invariant.
        fs::remove_file(tmp.path().join(EXPIRATION_KEY)).unwrap();

        assert_eq!(store.get(), None);
        // No repair: the surviving keys stay on disk untouched.
        assert!(tmp.path().join(TOKEN_KEY).exists());
    }

    #[test]
    fn malformed_profile_reads_as_absent() {
        let tmp = tempfile::tempdir().unwrap();
        let store = FileStore::open(tmp.path()).unwrap();
        store.set(&sample_session()).unwrap();

        fs::write(tmp.path().join(USER_KEY), "{not json").unwrap();

        assert_eq!(store.get(), None);
    }

    #[test]
    fn malformed_expiration_reads_as_absent() {
        let tmp = tempfile::tempdir().unwrap();
        let store = FileStore::open(tmp.path()).unwrap();
        store.set(&sample_session()).unwrap();

        fs::write(tmp.path().join(EXPIRATION_KEY), "next tuesday").unwrap();

        assert_eq!(store.get(), None);
    }

    #[test]
    fn file_store_survives_reopen() {
        let tmp = tempfile::tempdir().unwrap();
        let session = sample_session();
        {
            let store = FileStore::open(tmp.path()).unwrap();
            store.set(&session).unwrap();
        }
        let store = FileStore::open(tmp.path()).unwrap();
        assert_eq!(store.get(), Some(session));
    }

    #[test]
    fn memory_store_round_trip() {
        let store = MemoryStore::new();
        let session = sample_session();

        store.set(&session).unwrap();
        assert_eq!(store.get(), Some(session));

        store.clear().unwrap();
        assert_eq!(store.get(), None);
        store.clear().unwrap();
    }
}
