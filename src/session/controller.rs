//! Authoritative auth-session state.
//!
//! SYSTEM CONTEXT
//! ==============
//! Composes `TokenStore` and `SessionMonitor` behind one `AuthState` plus
//! `login`/`logout`. Everything else in the app observes the controller; only
//! the route guard's bootstrap check reads the token store directly.
//!
//! DESIGN
//! ======
//! - The initial token check publishes `is_authenticated` and
//!   `is_loading = false` in one update, so no subscriber can see a resolved
//!   loading flag next to a stale auth flag.
//! - Subscribers are called synchronously in registration order, outside the
//!   state lock, after every change. Unchanged states are not re-published.
//! - The monitor's expiry callback holds a `Weak` back-reference, so the
//!   controller and monitor do not keep each other alive.
//! - The expiry path raises the notice only when it actually ends an
//!   authenticated session; explicit `logout` never raises it.
//! - Expiry in a tab without a session leaves the token store alone, since
//!   `localStorage` is shared across tabs. `logout` always clears.

#[cfg(test)]
#[path = "controller_test.rs"]
mod controller_test;

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};

use super::monitor::{MonitorHandle, SessionMonitor};
use super::token_store::{Token, TokenStore};
use crate::state::auth::AuthState;

type Subscriber = Arc<dyn Fn(&AuthState) + Send + Sync>;
type ExpiryNotifier = Arc<dyn Fn() + Send + Sync>;

struct ControllerInner {
    tokens: TokenStore,
    monitor: SessionMonitor,
    state: Mutex<AuthState>,
    subscribers: Mutex<Vec<(u64, Subscriber)>>,
    next_subscriber: AtomicU64,
    notifier: Mutex<Option<ExpiryNotifier>>,
    monitor_handle: Mutex<Option<MonitorHandle>>,
}

fn lock<T>(m: &Mutex<T>) -> MutexGuard<'_, T> {
    m.lock().unwrap_or_else(PoisonError::into_inner)
}

#[derive(Clone)]
pub struct AuthSessionController {
    inner: Arc<ControllerInner>,
}

impl AuthSessionController {
    /// Create an unmounted controller in the `uninitialized` state.
    pub fn new(tokens: TokenStore, monitor: SessionMonitor) -> Self {
        Self {
            inner: Arc::new(ControllerInner {
                tokens,
                monitor,
                state: Mutex::new(AuthState::default()),
                subscribers: Mutex::new(Vec::new()),
                next_subscriber: AtomicU64::new(0),
                notifier: Mutex::new(None),
                monitor_handle: Mutex::new(None),
            }),
        }
    }

    /// Install the sink for the one user-visible "session expired" notice.
    pub fn set_expiry_notifier(&self, notifier: impl Fn() + Send + Sync + 'static) {
        *lock(&self.inner.notifier) = Some(Arc::new(notifier));
    }

    pub fn state(&self) -> AuthState {
        *lock(&self.inner.state)
    }

    pub fn is_authenticated(&self) -> bool {
        self.state().is_authenticated
    }

    pub fn is_loading(&self) -> bool {
        self.state().is_loading
    }

    pub fn monitor(&self) -> &SessionMonitor {
        &self.inner.monitor
    }

    /// Resolve the initial state from the token store and arm expiry detection.
    pub fn mount(&self) {
        let authenticated = self.inner.tokens.is_authenticated();
        log::debug!("auth session mounted (authenticated: {authenticated})");
        self.publish(AuthState::resolved(authenticated));
        self.arm_monitor();
    }

    /// Tear down expiry detection when the session UI goes away.
    pub fn unmount(&self) {
        if let Some(handle) = lock(&self.inner.monitor_handle).take() {
            handle.teardown();
        }
    }

    /// Store a freshly issued token and start a new monitored session.
    pub fn login(&self, token: Token) {
        if !token.is_usable() {
            log::warn!("ignoring login with an empty token");
            return;
        }
        self.inner.tokens.set(&token);
        self.publish(AuthState::resolved(true));
        self.arm_monitor();
        log::debug!("logged in");
    }

    /// Drop the stored token. Repeated calls are harmless and silent.
    pub fn logout(&self) {
        self.end_session();
    }

    /// Register an observer of state changes.
    pub fn subscribe(&self, subscriber: impl Fn(&AuthState) + Send + Sync + 'static) -> u64 {
        let id = self.inner.next_subscriber.fetch_add(1, Ordering::SeqCst);
        lock(&self.inner.subscribers).push((id, Arc::new(subscriber)));
        id
    }

    pub fn unsubscribe(&self, id: u64) {
        lock(&self.inner.subscribers).retain(|(sid, _)| *sid != id);
    }

    /// Returns whether this call ended an authenticated session.
    fn end_session(&self) -> bool {
        self.inner.tokens.clear();
        let was_authenticated = self.state().is_authenticated;
        self.publish(AuthState::resolved(false));
        if was_authenticated {
            log::debug!("logged out");
        }
        was_authenticated
    }

    fn expire(&self) {
        // Token slot is shared across tabs; leave it alone without a session.
        if !self.is_authenticated() {
            log::debug!("expiry with no active session ignored");
            return;
        }
        if !self.end_session() {
            return;
        }
        let notifier = lock(&self.inner.notifier).clone();
        if let Some(notify) = notifier {
            notify();
        }
    }

    fn arm_monitor(&self) {
        let weak: Weak<ControllerInner> = Arc::downgrade(&self.inner);
        let handle = self.inner.monitor.init(move || {
            if let Some(inner) = weak.upgrade() {
                AuthSessionController { inner }.expire();
            }
        });
        // Dropping the previous handle is enough: `init` already superseded it.
        *lock(&self.inner.monitor_handle) = Some(handle);
    }

    fn publish(&self, next: AuthState) {
        {
            let mut state = lock(&self.inner.state);
            if *state == next {
                return;
            }
            *state = next;
        }
        let subscribers: Vec<Subscriber> = lock(&self.inner.subscribers)
            .iter()
            .map(|(_, s)| Arc::clone(s))
            .collect();
        for subscriber in subscribers {
            subscriber(&next);
        }
    }
}
