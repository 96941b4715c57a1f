//! Session token ownership.
//!
//! [`SessionStore`] is the only component that persists the bearer token.
//! It is an explicit, injectable handle: create one at startup and pass
//! clones to every client that needs to authenticate.
//!
//! # Lifecycle
//!
//! - Loaded from the backing [`TokenStorage`] when the store is opened
//! - Replaced on successful login
//! - Cleared on logout or when the backend rejects the token (HTTP 401)
//!
//! Set and clear are single atomic replacements: concurrent in-flight
//! requests observe either the old or the new token, never a mix.

mod storage;

pub use storage::{FileTokenStorage, MemoryTokenStorage, TOKEN_KEY, TokenStorage};

use crate::Result;
use secrecy::{ExposeSecret, SecretString};
use std::sync::{Arc, PoisonError, RwLock};

/// Shared handle to the session token.
#[derive(Clone)]
pub struct SessionStore {
    inner: Arc<Inner>,
}

struct Inner {
    storage: Box<dyn TokenStorage>,
    current: RwLock<Option<SecretString>>,
}

impl SessionStore {
    /// Opens a store over the given backend, loading any persisted token.
    ///
    /// A backend that cannot be read is treated as holding no token.
    #[must_use]
    pub fn open(storage: impl TokenStorage + 'static) -> Self {
        let current = match storage.load() {
            Ok(token) => token.filter(|t| !t.is_empty()).map(SecretString::from),
            Err(e) => {
                tracing::warn!(error = %e, "Failed to load persisted session; starting signed out");
                None
            },
        };

        Self {
            inner: Arc::new(Inner {
                storage: Box::new(storage),
                current: RwLock::new(current),
            }),
        }
    }

    /// Opens a store that lives only as long as the process.
    #[must_use]
    pub fn in_memory() -> Self {
        Self::open(MemoryTokenStorage::new())
    }

    /// Persists the token, overwriting any prior value.
    ///
    /// An empty token is never considered present, so it clears the session.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend cannot be written. The in-memory
    /// session is left unchanged in that case.
    pub fn set_token(&self, token: impl Into<String>) -> Result<()> {
        let token = token.into();
        if token.is_empty() {
            return self.clear();
        }

        let mut current = self
            .inner
            .current
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        self.inner.storage.store(&token)?;
        *current = Some(SecretString::from(token));
        tracing::debug!("Session token stored");
        Ok(())
    }

    /// Returns the current token, if any.
    #[must_use]
    pub fn token(&self) -> Option<SecretString> {
        self.inner
            .current
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Removes the token. Clearing an empty session succeeds.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend cannot be modified. The in-memory
    /// session is cleared regardless, so the client stops sending the token.
    pub fn clear(&self) -> Result<()> {
        let mut current = self
            .inner
            .current
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        let had_token = current.take().is_some();
        if had_token {
            tracing::debug!("Session token cleared");
        }
        self.inner.storage.remove()
    }

    /// Returns true iff a token is present.
    ///
    /// Presence only: the token is not validated against the backend.
    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        self.inner
            .current
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .as_ref()
            .is_some_and(|t| !t.expose_secret().is_empty())
    }
}

impl std::fmt::Debug for SessionStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionStore")
            .field("authenticated", &self.is_authenticated())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_set_get_clear() {
        let store = SessionStore::in_memory();
        assert!(!store.is_authenticated());
        assert!(store.token().is_none());

        store.set_token("T").unwrap();
        assert!(store.is_authenticated());
        assert_eq!(store.token().unwrap().expose_secret(), "T");

        store.set_token("U").unwrap();
        assert_eq!(store.token().unwrap().expose_secret(), "U");

        store.clear().unwrap();
        assert!(!store.is_authenticated());
    }

    #[test]
    fn test_clear_twice_is_ok() {
        let store = SessionStore::in_memory();
        store.set_token("T").unwrap();
        assert!(store.clear().is_ok());
        assert!(store.clear().is_ok());
        assert!(!store.is_authenticated());
    }

    #[test]
    fn test_empty_token_is_absent() {
        let store = SessionStore::in_memory();
        store.set_token("T").unwrap();
        store.set_token("").unwrap();
        assert!(!store.is_authenticated());
    }

    #[test]
    fn test_open_loads_persisted_token() {
        let store = SessionStore::open(MemoryTokenStorage::with_token("persisted"));
        assert!(store.is_authenticated());
        assert_eq!(store.token().unwrap().expose_secret(), "persisted");
    }

    #[test]
    fn test_clones_share_state() {
        let store = SessionStore::in_memory();
        let other = store.clone();
        store.set_token("shared").unwrap();
        assert!(other.is_authenticated());
        other.clear().unwrap();
        assert!(!store.is_authenticated());
    }

    #[test]
    fn test_debug_does_not_leak_token() {
        let store = SessionStore::in_memory();
        store.set_token("super-secret-token").unwrap();
        let debug = format!("{store:?}");
        assert!(!debug.contains("super-secret-token"));
    }

    #[test]
    fn test_concurrent_writers_leave_one_value() {
        let store = SessionStore::in_memory();
        let handles: Vec<_> = (0..8)
            .map(|i| {
                let store = store.clone();
                std::thread::spawn(move || store.set_token(format!("token-{i}")))
            })
            .collect();
        for handle in handles {
            handle.join().expect("join").unwrap();
        }

        let token = store.token().unwrap();
        assert!(token.expose_secret().starts_with("token-"));
    }
}
