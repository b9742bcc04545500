//! Persisted authentication-token slot.
//!
//! SYSTEM CONTEXT
//! ==============
//! The backend issues an opaque bearer token at login. This store is the only
//! writer of the token key; the auth controller and the route guard's
//! bootstrap check are its only readers.
//!
//! TRADE-OFFS
//! ==========
//! `is_authenticated` checks local presence only. It is an optimistic UI
//! signal; every privileged endpoint still re-validates the token.

#[cfg(test)]
#[path = "token_store_test.rs"]
mod token_store_test;

use std::fmt;

use crate::util::storage::SharedStorage;

/// Opaque bearer credential. Replaced wholesale, never patched.
#[derive(Clone, PartialEq, Eq)]
pub struct Token(String);

impl Token {
    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Empty or whitespace-only values never count as a credential.
    pub fn is_usable(&self) -> bool {
        !self.0.trim().is_empty()
    }
}

impl fmt::Debug for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Token(<redacted>)")
    }
}

impl From<String> for Token {
    fn from(raw: String) -> Self {
        Self(raw)
    }
}

impl From<&str> for Token {
    fn from(raw: &str) -> Self {
        Self(raw.to_owned())
    }
}

/// Single-slot token storage over a `StorageBackend`.
#[derive(Clone)]
pub struct TokenStore {
    storage: SharedStorage,
    key: String,
}

impl TokenStore {
    pub fn new(storage: SharedStorage, key: impl Into<String>) -> Self {
        Self { storage, key: key.into() }
    }

    /// Current usable token, or `None` when empty, unreadable, or outside a browser.
    pub fn get(&self) -> Option<Token> {
        match self.storage.get_item(&self.key) {
            Ok(raw) => raw.map(Token::from).filter(Token::is_usable),
            Err(e) => {
                log::debug!("token store read skipped: {e}");
                None
            }
        }
    }

    /// Replace the stored token.
    pub fn set(&self, token: &Token) {
        if let Err(e) = self.storage.set_item(&self.key, token.as_str()) {
            log::warn!("token store write failed: {e}");
        }
    }

    /// Remove the stored token. Safe to call when nothing is stored.
    pub fn clear(&self) {
        if let Err(e) = self.storage.remove_item(&self.key) {
            log::debug!("token store clear skipped: {e}");
        }
    }

    pub fn is_authenticated(&self) -> bool {
        self.get().is_some()
    }
}
