//! Access-control wrapper around protected views.
//!
//! Renders a neutral placeholder while auth is resolving, the wrapped view
//! once the guard is ready, and navigates to the login route otherwise.

use leptos::prelude::*;
use leptos_router::hooks::use_navigate;

use crate::session::SessionServices;
use crate::state::auth::AuthState;
use crate::util::auth::{GuardPhase, install_route_guard};

#[component]
pub fn RouteGuard(children: ChildrenFn) -> impl IntoView {
    let services = expect_context::<SessionServices>();
    let auth = expect_context::<RwSignal<AuthState>>();
    let phase = install_route_guard(auth, services.tokens.clone(), use_navigate());

    view! {
        <Show
            when=move || phase.get() == GuardPhase::Ready
            fallback=|| view! { <div class="route-guard__placeholder" aria-busy="true"></div> }
        >
            {children()}
        </Show>
    }
}
