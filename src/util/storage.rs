//! Browser key/value storage substrate.
//!
//! SYSTEM CONTEXT
//! ==============
//! `TokenStore` and `CsrfGuard` persist their single values through a
//! `StorageBackend`. The browser implementation talks to `localStorage` or
//! `sessionStorage`; `MemoryStorage` backs tests and non-browser callers that
//! still want working persistence.
//!
//! ERROR HANDLING
//! ==============
//! Backends report `StorageError` so callers can tell "no value" apart from
//! "no storage". Everything above this layer collapses both into safe
//! defaults; nothing here panics.

#[cfg(test)]
#[path = "storage_test.rs"]
mod storage_test;

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StorageError {
    /// No storage context exists (server render, native build, storage disabled).
    #[error("storage unavailable")]
    Unavailable,
    /// The storage API rejected the operation (quota, security policy).
    #[error("storage backend error: {0}")]
    Backend(String),
}

/// Minimal key/value contract shared by every storage substrate.
pub trait StorageBackend: Send + Sync {
    /// Whether a storage context exists at all.
    fn is_available(&self) -> bool;

    /// Read the value for `key`, `Ok(None)` when unset.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` when no storage context exists or the read fails.
    fn get_item(&self, key: &str) -> Result<Option<String>, StorageError>;

    /// Write `value` under `key`, replacing any previous value.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` when no storage context exists or the write fails.
    fn set_item(&self, key: &str, value: &str) -> Result<(), StorageError>;

    /// Remove `key`. Removing an absent key succeeds.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` when no storage context exists or the removal fails.
    fn remove_item(&self, key: &str) -> Result<(), StorageError>;
}

/// Which browser storage area a `BrowserStorage` targets.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StorageScope {
    /// `localStorage`: survives reloads and new tabs.
    Local,
    /// `sessionStorage`: scoped to a single tab session.
    Session,
}

/// `web_sys` storage, resolved on every call so the handle itself is `Send`.
#[derive(Clone, Copy, Debug)]
pub struct BrowserStorage {
    scope: StorageScope,
}

impl BrowserStorage {
    pub fn new(scope: StorageScope) -> Self {
        Self { scope }
    }

    pub fn local() -> Self {
        Self::new(StorageScope::Local)
    }

    pub fn session() -> Self {
        Self::new(StorageScope::Session)
    }

    pub fn scope(&self) -> StorageScope {
        self.scope
    }

    #[cfg(feature = "hydrate")]
    fn storage(&self) -> Result<web_sys::Storage, StorageError> {
        let window = web_sys::window().ok_or(StorageError::Unavailable)?;
        let storage = match self.scope {
            StorageScope::Local => window.local_storage(),
            StorageScope::Session => window.session_storage(),
        };
        storage
            .map_err(|e| StorageError::Backend(format!("{e:?}")))?
            .ok_or(StorageError::Unavailable)
    }
}

impl StorageBackend for BrowserStorage {
    fn is_available(&self) -> bool {
        #[cfg(feature = "hydrate")]
        {
            self.storage().is_ok()
        }
        #[cfg(not(feature = "hydrate"))]
        {
            false
        }
    }

    fn get_item(&self, key: &str) -> Result<Option<String>, StorageError> {
        #[cfg(feature = "hydrate")]
        {
            self.storage()?
                .get_item(key)
                .map_err(|e| StorageError::Backend(format!("{e:?}")))
        }
        #[cfg(not(feature = "hydrate"))]
        {
            let _ = key;
            Err(StorageError::Unavailable)
        }
    }

    fn set_item(&self, key: &str, value: &str) -> Result<(), StorageError> {
        #[cfg(feature = "hydrate")]
        {
            self.storage()?
                .set_item(key, value)
                .map_err(|e| StorageError::Backend(format!("{e:?}")))
        }
        #[cfg(not(feature = "hydrate"))]
        {
            let _ = (key, value);
            Err(StorageError::Unavailable)
        }
    }

    fn remove_item(&self, key: &str) -> Result<(), StorageError> {
        #[cfg(feature = "hydrate")]
        {
            self.storage()?
                .remove_item(key)
                .map_err(|e| StorageError::Backend(format!("{e:?}")))
        }
        #[cfg(not(feature = "hydrate"))]
        {
            let _ = key;
            Err(StorageError::Unavailable)
        }
    }
}

/// In-process storage. Clones share the same map, like two handles to one tab.
#[derive(Clone, Debug, Default)]
pub struct MemoryStorage {
    items: Arc<Mutex<HashMap<String, String>>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    fn with_items<T>(&self, f: impl FnOnce(&mut HashMap<String, String>) -> T) -> Result<T, StorageError> {
        let mut items = self
            .items
            .lock()
            .map_err(|_| StorageError::Backend("memory storage lock poisoned".to_owned()))?;
        Ok(f(&mut items))
    }
}

impl StorageBackend for MemoryStorage {
    fn is_available(&self) -> bool {
        true
    }

    fn get_item(&self, key: &str) -> Result<Option<String>, StorageError> {
        self.with_items(|items| items.get(key).cloned())
    }

    fn set_item(&self, key: &str, value: &str) -> Result<(), StorageError> {
        self.with_items(|items| {
            items.insert(key.to_owned(), value.to_owned());
        })
    }

    fn remove_item(&self, key: &str) -> Result<(), StorageError> {
        self.with_items(|items| {
            items.remove(key);
        })
    }
}

/// Backend that behaves like a server render: every call is `Unavailable`.
#[derive(Clone, Copy, Debug, Default)]
pub struct UnavailableStorage;

impl StorageBackend for UnavailableStorage {
    fn is_available(&self) -> bool {
        false
    }

    fn get_item(&self, _key: &str) -> Result<Option<String>, StorageError> {
        Err(StorageError::Unavailable)
    }

    fn set_item(&self, _key: &str, _value: &str) -> Result<(), StorageError> {
        Err(StorageError::Unavailable)
    }

    fn remove_item(&self, _key: &str) -> Result<(), StorageError> {
        Err(StorageError::Unavailable)
    }
}

/// Shared handle used by the session components.
pub type SharedStorage = Arc<dyn StorageBackend>;
