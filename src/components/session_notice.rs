//! Toast for session notices such as expiry.

use leptos::prelude::*;

use crate::state::ui::{NoticeKind, UiState};

#[component]
pub fn SessionNotice() -> impl IntoView {
    let ui = expect_context::<RwSignal<UiState>>();

    move || {
        ui.with(|u| u.notice.clone()).map(|notice| {
            let seq = notice.seq;
            let class = match notice.kind {
                NoticeKind::Info => "notice notice--info",
                NoticeKind::Warning => "notice notice--warning",
            };
            view! {
                <div class=class role="status">
                    <span class="notice__message">{notice.message}</span>
                    <button class="notice__dismiss" on:click=move |_| ui.update(|u| u.dismiss_notice(seq))>
                        "Dismiss"
                    </button>
                </div>
            }
        })
    }
}
