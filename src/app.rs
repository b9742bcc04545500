//! Root application component with routing and context providers.
//!
//! SYSTEM CONTEXT
//! ==============
//! Builds the one `SessionServices` instance for the page and bridges its
//! callback-based observers into reactive signals: controller state into
//! `RwSignal<AuthState>`, loading edges and expiry notices into
//! `RwSignal<UiState>`. Everything below the router reads those signals.

use leptos::prelude::*;
use leptos_meta::{MetaTags, Stylesheet, Title, provide_meta_context};
use leptos_router::{
    StaticSegment,
    components::{Route, Router, Routes},
};

use crate::components::{loading_indicator::LoadingIndicator, route_guard::RouteGuard, session_notice::SessionNotice};
use crate::config::SessionConfig;
use crate::pages::{login::LoginPage, overview::OverviewPage};
use crate::session::SessionServices;
use crate::state::{
    auth::AuthState,
    ui::{NoticeKind, UiState},
};

/// HTML shell rendered on the server for SSR + hydration.
pub fn shell(options: LeptosOptions) -> impl IntoView {
    view! {
        <!DOCTYPE html>
        <html lang="en">
            <head>
                <meta charset="utf-8"/>
                <meta name="viewport" content="width=device-width, initial-scale=1"/>
                <AutoReload options=options.clone()/>
                <HydrationScripts options/>
                <MetaTags/>
            </head>
            <body>
                <App/>
            </body>
        </html>
    }
}

fn load_config() -> SessionConfig {
    #[cfg(feature = "ssr")]
    let loaded = SessionConfig::from_env();
    #[cfg(not(feature = "ssr"))]
    let loaded = SessionConfig::from_build_env();

    loaded.unwrap_or_else(|e| {
        log::warn!("invalid session config, using defaults: {e}");
        SessionConfig::default()
    })
}

/// Root application component.
///
/// Provides session services and shared state, then sets up routing.
#[component]
pub fn App() -> impl IntoView {
    provide_meta_context();

    let services = SessionServices::browser(load_config());
    let auth = RwSignal::new(AuthState::default());
    let ui = RwSignal::new(UiState::default());

    let auth_sub = services.controller.subscribe(move |state| {
        auth.try_set(*state);
    });
    let loading_sub = services.loading.subscribe(move |busy| {
        ui.try_update(|u| u.busy = busy);
    });
    let expiry_message = services.config.expiry_message.clone();
    services.controller.set_expiry_notifier(move || {
        ui.try_update(|u| u.push_notice(NoticeKind::Warning, expiry_message.clone()));
    });

    provide_context(services.clone());
    provide_context(auth);
    provide_context(ui);

    // Effects only run in the browser, so server renders stay uninitialized.
    let controller = services.controller.clone();
    Effect::new(move || controller.mount());

    #[cfg(feature = "hydrate")]
    let activity_listeners = {
        let pointer_monitor = services.controller.monitor().clone();
        let key_monitor = services.controller.monitor().clone();
        [
            window_event_listener(leptos::ev::pointerdown, move |_| pointer_monitor.record_activity()),
            window_event_listener(leptos::ev::keydown, move |_| key_monitor.record_activity()),
        ]
    };

    on_cleanup(move || {
        #[cfg(feature = "hydrate")]
        for listener in activity_listeners {
            listener.remove();
        }
        services.controller.unsubscribe(auth_sub);
        services.loading.unsubscribe(loading_sub);
        services.controller.unmount();
    });

    view! {
        <Stylesheet id="leptos" href="/pkg/sentinel.css"/>
        <Title text="Sentinel"/>

        <LoadingIndicator/>
        <SessionNotice/>
        <Router>
            <Routes fallback=|| "Page not found.".into_view()>
                <Route path=StaticSegment("login") view=LoginPage/>
                <Route
                    path=StaticSegment("")
                    view=|| {
                        view! {
                            <RouteGuard>
                                <OverviewPage/>
                            </RouteGuard>
                        }
                    }
                />
            </Routes>
        </Router>
    }
}
