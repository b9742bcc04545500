//! Route-guard decisions for protected views.
//!
//! SYSTEM CONTEXT
//! ==============
//! Every protected route applies the same rule: wait while auth is resolving,
//! then either render or redirect to the login route. Keeping the rule here,
//! apart from the component, lets it be tested without a reactive runtime.
//!
//! DESIGN
//! ======
//! The redirect needs two agreeing signals: the controller says
//! unauthenticated *and* a direct token-store check finds no token. The two
//! can disagree briefly across a render boundary (a login that stored its
//! token before the state update reached this view); in that case the view
//! renders instead of bouncing to login.

#[cfg(test)]
#[path = "auth_test.rs"]
mod auth_test;

use leptos::prelude::*;
use leptos_router::NavigateOptions;

use crate::config::LOGIN_ROUTE;
use crate::session::token_store::TokenStore;
use crate::state::auth::AuthState;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GuardPhase {
    Checking,
    Ready,
    Redirecting,
}

/// Decide the guard phase. `token_present` is only consulted once auth has
/// resolved to unauthenticated.
pub fn guard_phase(state: &AuthState, token_present: impl FnOnce() -> bool) -> GuardPhase {
    if state.is_loading {
        GuardPhase::Checking
    } else if state.is_authenticated || token_present() {
        GuardPhase::Ready
    } else {
        GuardPhase::Redirecting
    }
}

/// Per-view guard state machine: `checking -> ready | redirecting`.
#[derive(Clone, Copy, Debug)]
pub struct RouteGuardMachine {
    phase: GuardPhase,
}

impl Default for RouteGuardMachine {
    fn default() -> Self {
        Self { phase: GuardPhase::Checking }
    }
}

impl RouteGuardMachine {
    pub fn phase(&self) -> GuardPhase {
        self.phase
    }

    /// Feed a new auth state. Returns `true` exactly when the view has just
    /// entered `redirecting` and should navigate to login.
    pub fn observe(&mut self, state: &AuthState, tokens: &TokenStore) -> bool {
        let next = guard_phase(state, || tokens.is_authenticated());
        let navigate = next == GuardPhase::Redirecting && self.phase != GuardPhase::Redirecting;
        self.phase = next;
        navigate
    }
}

/// Drive a `RouteGuardMachine` from the auth signal, navigating to the login
/// route on entry to `redirecting`. Returns the phase signal the view renders
/// from.
pub fn install_route_guard<F>(auth: RwSignal<AuthState>, tokens: TokenStore, navigate: F) -> RwSignal<GuardPhase>
where
    F: Fn(&str, NavigateOptions) + Clone + 'static,
{
    let phase = RwSignal::new(GuardPhase::Checking);
    let mut machine = RouteGuardMachine::default();
    Effect::new(move || {
        let state = auth.get();
        let redirect = machine.observe(&state, &tokens);
        phase.set(machine.phase());
        if redirect {
            log::debug!("unauthenticated access; redirecting to {LOGIN_ROUTE}");
            navigate(LOGIN_ROUTE, NavigateOptions { replace: true, ..NavigateOptions::default() });
        }
    });
    phase
}
