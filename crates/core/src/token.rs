//! Persisted bearer token
//!
//! [`TokenStore`] is the only owner of the `auth_token` slot. The HTTP
//! client and the auth session both go through it, so clearing the token in
//! one place invalidates it everywhere.

use crate::storage::{KeyValueStorage, StorageError};
use std::fmt;
use std::sync::Arc;
use tracing::{debug, warn};

/// Storage key of the bearer token
pub const TOKEN_KEY: &str = "auth_token";

/// Get/set/clear access to the persisted bearer token
///
/// Every operation is total: storage failures are logged and treated as an
/// absent token or a no-op.
#[derive(Clone)]
pub struct TokenStore {
    storage: Arc<dyn KeyValueStorage>,
}

impl TokenStore {
    pub fn new(storage: Arc<dyn KeyValueStorage>) -> Self {
        Self { storage }
    }

    /// Store backed by process memory only
    pub fn in_memory() -> Self {
        Self::new(Arc::new(crate::storage::MemoryStorage::new()))
    }

    /// Current token, if a non-blank one is stored
    pub fn get(&self) -> Option<String> {
        match self.storage.get_item(TOKEN_KEY) {
            Ok(token) => token.filter(|t| !t.trim().is_empty()),
            Err(e) => {
                warn!(error = %e, "Failed to read auth token, treating as absent");
                None
            }
        }
    }

    /// Persist `token`. Blank input is ignored and leaves the previous token in place.
    pub fn set(&self, token: &str) {
        if let Err(e) = self.try_set(token) {
            warn!(error = %e, "Failed to persist auth token");
        }
    }

    /// Like [`TokenStore::set`], but reports a backend failure to the caller
    pub fn try_set(&self, token: &str) -> Result<(), StorageError> {
        let value = token.trim();
        if value.is_empty() {
            debug!("Ignoring blank auth token");
            return Ok(());
        }
        self.storage.set_item(TOKEN_KEY, value)
    }

    /// Remove the token. Clearing an empty store is a no-op.
    pub fn clear(&self) {
        if let Err(e) = self.storage.remove_item(TOKEN_KEY) {
            warn!(error = %e, "Failed to clear auth token");
        }
    }

    /// Whether a token is currently stored
    pub fn is_present(&self) -> bool {
        self.get().is_some()
    }
}

impl fmt::Debug for TokenStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenStore")
            .field("present", &self.is_present())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::FileStorage;
    use tempfile::TempDir;

    /// Backend where every operation fails
    struct BrokenStorage;

    impl KeyValueStorage for BrokenStorage {
        fn get_item(&self, _key: &str) -> Result<Option<String>, StorageError> {
            Err(StorageError::Unavailable("disk on fire".into()))
        }

        fn set_item(&self, _key: &str, _value: &str) -> Result<(), StorageError> {
            Err(StorageError::Unavailable("disk on fire".into()))
        }

        fn remove_item(&self, _key: &str) -> Result<(), StorageError> {
            Err(StorageError::Unavailable("disk on fire".into()))
        }
    }

    #[test]
    fn test_set_then_get() {
        let store = TokenStore::in_memory();
        assert_eq!(store.get(), None);
        store.set("a.b.c");
        assert_eq!(store.get().as_deref(), Some("a.b.c"));
    }

    #[test]
    fn test_set_trims_input() {
        let store = TokenStore::in_memory();
        store.set("  a.b.c \n");
        assert_eq!(store.get().as_deref(), Some("a.b.c"));
    }

    #[test]
    fn test_blank_set_keeps_previous_token() {
        let store = TokenStore::in_memory();
        store.set("first");
        store.set("");
        store.set("   \t");
        assert_eq!(store.get().as_deref(), Some("first"));
    }

    #[test]
    fn test_clear_is_idempotent() {
        let store = TokenStore::in_memory();
        store.set("token");
        store.clear();
        store.clear();
        assert_eq!(store.get(), None);
        assert!(!store.is_present());
    }

    #[test]
    fn test_clones_share_storage() {
        let store = TokenStore::in_memory();
        let other = store.clone();
        store.set("shared");
        assert_eq!(other.get().as_deref(), Some("shared"));
        other.clear();
        assert_eq!(store.get(), None);
    }

    #[test]
    fn test_blank_stored_value_reads_as_absent() {
        let storage = Arc::new(crate::storage::MemoryStorage::new());
        storage.set_item(TOKEN_KEY, "  ").unwrap();
        assert_eq!(TokenStore::new(storage).get(), None);
    }

    #[test]
    fn test_storage_failures_are_swallowed() {
        let store = TokenStore::new(Arc::new(BrokenStorage));
        store.set("token");
        store.clear();
        assert_eq!(store.get(), None);
    }

    #[test]
    fn test_try_set_reports_failure() {
        let store = TokenStore::new(Arc::new(BrokenStorage));
        assert!(matches!(
            store.try_set("token"),
            Err(StorageError::Unavailable(_))
        ));
        assert!(TokenStore::in_memory().try_set("  ").is_ok());
    }

    #[test]
    fn test_survives_reopen() {
        let dir = TempDir::new().unwrap();
        TokenStore::new(Arc::new(FileStorage::in_dir(dir.path()))).set("persisted");

        let reopened = TokenStore::new(Arc::new(FileStorage::in_dir(dir.path())));
        assert_eq!(reopened.get().as_deref(), Some("persisted"));
    }

    #[test]
    fn test_debug_does_not_leak_token() {
        let store = TokenStore::in_memory();
        store.set("secret-token");
        assert!(!format!("{store:?}").contains("secret-token"));
    }
}
