//! Client session and request-integrity services.
//!
//! SYSTEM CONTEXT
//! ==============
//! Leaf-first: `token_store`, `csrf`, and `loading` own one resource each;
//! `monitor` detects expiry; `controller` composes the token store and monitor
//! into the single auth state the UI observes. `SessionServices` bundles one
//! instance of each for the app to provide through context.


pub mod controller;
pub mod csrf;
pub mod loading;
pub mod monitor;
pub mod token_store;

use std::sync::Arc;

use crate::config::SessionConfig;
use crate::util::storage::{BrowserStorage, SharedStorage};
use controller::AuthSessionController;
use csrf::CsrfGuard;
use loading::LoadingCoordinator;
use monitor::SessionMonitor;
use token_store::TokenStore;

/// One owned instance of every session service, shared via context.
#[derive(Clone)]
pub struct SessionServices {
    pub config: Arc<SessionConfig>,
    pub tokens: TokenStore,
    pub csrf: CsrfGuard,
    pub loading: LoadingCoordinator,
    pub controller: AuthSessionController,
}

impl SessionServices {
    /// Wire services over explicit storage substrates.
    pub fn new(config: SessionConfig, auth_storage: SharedStorage, csrf_storage: SharedStorage) -> Self {
        let tokens = TokenStore::new(auth_storage, config.auth_token_key.clone());
        let csrf = CsrfGuard::new(csrf_storage, config.csrf_token_key.clone());
        let monitor = SessionMonitor::new(config.inactivity_timeout, config.expiry_check_interval);
        let controller = AuthSessionController::new(tokens.clone(), monitor);
        Self { config: Arc::new(config), tokens, csrf, loading: LoadingCoordinator::new(), controller }
    }

    /// Auth token in `localStorage`, CSRF token in `sessionStorage`.
    pub fn browser(config: SessionConfig) -> Self {
        Self::new(config, Arc::new(BrowserStorage::local()), Arc::new(BrowserStorage::session()))
    }
}
