//! Protected landing view. Charts and widgets plug in here; this page only
//! carries the session chrome (sign-out).

use leptos::prelude::*;

use crate::session::SessionServices;
use crate::state::ui::{NoticeKind, UiState};

#[component]
pub fn OverviewPage() -> impl IntoView {
    let services = expect_context::<SessionServices>();
    let ui = expect_context::<RwSignal<UiState>>();

    let on_sign_out = move |_| {
        #[cfg(feature = "hydrate")]
        {
            let services = services.clone();
            leptos::task::spawn_local(async move {
                crate::net::api::logout(&services).await;
            });
        }
        #[cfg(not(feature = "hydrate"))]
        services.controller.logout();
        ui.update(|u| u.push_notice(NoticeKind::Info, "Signed out."));
    };

    view! {
        <div class="overview-page">
            <header class="overview-page__header">
                <h1>"Security Overview"</h1>
                <button class="btn" on:click=on_sign_out>
                    "Sign Out"
                </button>
            </header>
            <main class="overview-page__body"></main>
        </div>
    }
}
