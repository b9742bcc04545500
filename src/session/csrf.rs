//! Per-session anti-forgery token.
//!
//! SYSTEM CONTEXT
//! ==============
//! State-changing requests carry `X-CSRF-Token`. The value lives in
//! `sessionStorage`, which a cross-origin attacker cannot read, so echoing it
//! in a header proves the request came from this application's own tab.
//! This complements the backend's same-site cookie policy; it does not
//! replace it.
//!
//! DESIGN
//! ======
//! Tokens are materialized lazily: the first `attach_header` of a session
//! pays for generation. `generate` always overwrites, which invalidates
//! every copy handed out before it.

#[cfg(test)]
#[path = "csrf_test.rs"]
mod csrf_test;

use std::collections::BTreeMap;
use std::fmt;

use uuid::Uuid;

use crate::config::CSRF_HEADER;
use crate::util::storage::{SharedStorage, StorageError};

/// Outgoing request headers, keyed by header name.
pub type Headers = BTreeMap<String, String>;

/// Opaque anti-forgery value.
#[derive(Clone, PartialEq, Eq)]
pub struct CsrfToken(String);

impl CsrfToken {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for CsrfToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("CsrfToken(<redacted>)")
    }
}

/// Two independent v4 UUIDs back to back: 244 random bits, 64 hex chars.
fn random_token() -> String {
    format!("{}{}", Uuid::new_v4().simple(), Uuid::new_v4().simple())
}

#[derive(Clone)]
pub struct CsrfGuard {
    storage: SharedStorage,
    key: String,
}

impl CsrfGuard {
    pub fn new(storage: SharedStorage, key: impl Into<String>) -> Self {
        Self { storage, key: key.into() }
    }

    /// Mint a fresh token and persist it, replacing any previous one.
    ///
    /// Outside a browser the token is still returned but cannot be persisted,
    /// so it will never validate.
    pub fn generate(&self) -> CsrfToken {
        let token = CsrfToken(random_token());
        if let Err(e) = self.storage.set_item(&self.key, token.as_str()) {
            log::warn!("csrf token not persisted: {e}");
        }
        token
    }

    fn generate_persisted(&self) -> Result<CsrfToken, StorageError> {
        let token = CsrfToken(random_token());
        self.storage.set_item(&self.key, token.as_str())?;
        Ok(token)
    }

    /// Token currently held in session scope, if any.
    pub fn current(&self) -> Option<CsrfToken> {
        match self.storage.get_item(&self.key) {
            Ok(raw) => raw.filter(|v| !v.is_empty()).map(CsrfToken),
            Err(e) => {
                log::debug!("csrf token read skipped: {e}");
                None
            }
        }
    }

    /// True iff a token is stored and equals `candidate` exactly.
    pub fn validate(&self, candidate: &str) -> bool {
        self.current().is_some_and(|stored| stored.as_str() == candidate)
    }

    /// Add the `X-CSRF-Token` header, generating a token on first use.
    /// Returns `headers` untouched when no storage context exists or a new
    /// token cannot be persisted.
    pub fn attach_header(&self, mut headers: Headers) -> Headers {
        if !self.storage.is_available() {
            return headers;
        }
        let token = match self.current() {
            Some(token) => token,
            None => match self.generate_persisted() {
                Ok(token) => token,
                Err(e) => {
                    log::warn!("csrf header skipped, token not persisted: {e}");
                    return headers;
                }
            },
        };
        headers.insert(CSRF_HEADER.to_owned(), token.0);
        headers
    }
}
