//! Auth-session snapshot published by the session controller.
//!
//! SYSTEM CONTEXT
//! ==============
//! Route guards and user-aware components read this through an
//! `RwSignal<AuthState>` to decide between placeholder, redirect, and content.

#[cfg(test)]
#[path = "auth_test.rs"]
mod auth_test;

/// Tri-state view of the session.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SessionPhase {
    /// Initial token check has not resolved yet.
    Uninitialized,
    Authenticated,
    Unauthenticated,
}

/// Authentication state as seen by the rest of the application.
///
/// `Default` is the pre-resolution state: loading, not authenticated.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct AuthState {
    pub is_authenticated: bool,
    pub is_loading: bool,
}

impl Default for AuthState {
    fn default() -> Self {
        Self { is_authenticated: false, is_loading: true }
    }
}

impl AuthState {
    pub fn resolved(is_authenticated: bool) -> Self {
        Self { is_authenticated, is_loading: false }
    }

    pub fn phase(&self) -> SessionPhase {
        match (self.is_loading, self.is_authenticated) {
            (true, _) => SessionPhase::Uninitialized,
            (false, true) => SessionPhase::Authenticated,
            (false, false) => SessionPhase::Unauthenticated,
        }
    }
}
