//! Global busy bar driven by the loading coordinator.

use leptos::prelude::*;

use crate::state::ui::UiState;

#[component]
pub fn LoadingIndicator() -> impl IntoView {
    let ui = expect_context::<RwSignal<UiState>>();

    view! {
        <Show when=move || ui.with(|u| u.busy)>
            <div class="loading-indicator" role="progressbar" aria-label="Loading"></div>
        </Show>
    }
}
