//! Signed-in session storage.
//!
//! Components that need the bearer token receive an [`AuthSessionStore`] instead of
//! reaching for global state. A session is persisted as two fixed keys, `token` and
//! `user`.

use std::fs;
use std::io::ErrorKind;
use std::path::PathBuf;
use std::sync::Mutex;

use serde::{Deserialize, Serialize};
use tracing::warn;

/// Profile of the staff member behind a session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserProfile {
    pub id: String,
    pub nombre: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub correo: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rol: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthSession {
    pub token: String,
    pub user: UserProfile,
}

impl AuthSession {
    pub fn bearer(&self) -> Option<&str> {
        let token = self.token.trim();
        (!token.is_empty()).then_some(token)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum SessionStoreError {
    #[error("session storage unavailable: {0}")]
    Io(#[from] std::io::Error),
    #[error("stored session is corrupt: {0}")]
    Corrupt(#[from] serde_json::Error),
    #[error("session store lock poisoned")]
    Poisoned,
}

pub trait AuthSessionStore: Send + Sync {
    fn get(&self) -> Result<Option<AuthSession>, SessionStoreError>;
    fn set(&self, session: AuthSession) -> Result<(), SessionStoreError>;
    fn clear(&self) -> Result<(), SessionStoreError>;
}

/// Presence of a session with a non-blank token. Storage failures count as signed out.
pub fn is_authenticated(store: &dyn AuthSessionStore) -> bool {
    match store.get() {
        Ok(session) => session.as_ref().and_then(AuthSession::bearer).is_some(),
        Err(err) => {
            warn!(error = %err, "unable to read session store");
            false
        }
    }
}

#[derive(Debug, Default)]
pub struct InMemorySessionStore {
    session: Mutex<Option<AuthSession>>,
}

impl InMemorySessionStore {
    pub fn with_session(session: AuthSession) -> Self {
        Self {
            session: Mutex::new(Some(session)),
        }
    }
}

impl AuthSessionStore for InMemorySessionStore {
    fn get(&self) -> Result<Option<AuthSession>, SessionStoreError> {
        let guard = self
            .session
            .lock()
            .map_err(|_| SessionStoreError::Poisoned)?;
        Ok(guard.clone())
    }

    fn set(&self, session: AuthSession) -> Result<(), SessionStoreError> {
        let mut guard = self
            .session
            .lock()
            .map_err(|_| SessionStoreError::Poisoned)?;
        *guard = Some(session);
        Ok(())
    }

    fn clear(&self) -> Result<(), SessionStoreError> {
        let mut guard = self
            .session
            .lock()
            .map_err(|_| SessionStoreError::Poisoned)?;
        *guard = None;
        Ok(())
    }
}

/// Keeps the session as a small JSON document on disk.
#[derive(Debug, Clone)]
pub struct JsonFileSessionStore {
    path: PathBuf,
}

impl JsonFileSessionStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl AuthSessionStore for JsonFileSessionStore {
    fn get(&self) -> Result<Option<AuthSession>, SessionStoreError> {
        let raw = match fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(err) if err.kind() == ErrorKind::NotFound => return Ok(None),
            Err(err) => return Err(err.into()),
        };

        if raw.trim().is_empty() {
            return Ok(None);
        }

        Ok(Some(serde_json::from_str(&raw)?))
    }

    fn set(&self, session: AuthSession) -> Result<(), SessionStoreError> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }

        let payload = serde_json::to_string_pretty(&session)?;
        fs::write(&self.path, payload)?;
        Ok(())
    }

    fn clear(&self) -> Result<(), SessionStoreError> {
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(()),
            Err(err) => Err(err.into()),
        }
    }
}
