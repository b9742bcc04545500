//! Login entry point: username + password exchanged for a bearer token.

#[cfg(test)]
#[path = "login_test.rs"]
mod login_test;

use leptos::prelude::*;
use leptos_router::NavigateOptions;
use leptos_router::hooks::use_navigate;

use crate::config::HOME_ROUTE;
use crate::net::api::ApiError;
use crate::session::SessionServices;
use crate::state::auth::AuthState;

fn validate_credentials(username: &str, password: &str) -> Result<(String, String), &'static str> {
    let username = username.trim();
    if username.is_empty() {
        return Err("Enter your username.");
    }
    if password.is_empty() {
        return Err("Enter your password.");
    }
    Ok((username.to_owned(), password.to_owned()))
}

fn login_error_message(err: &ApiError) -> &'static str {
    match err {
        ApiError::Unauthorized => "Invalid username or password.",
        ApiError::Status(429) => "Too many sign-in attempts. Wait a moment and try again.",
        ApiError::Unavailable | ApiError::Network(_) => "Cannot reach the server. Try again.",
        ApiError::Status(_) | ApiError::Decode(_) => "Sign-in failed. Try again.",
    }
}

#[component]
pub fn LoginPage() -> impl IntoView {
    let services = expect_context::<SessionServices>();
    let auth = expect_context::<RwSignal<AuthState>>();
    let navigate = use_navigate();

    let username = RwSignal::new(String::new());
    let password = RwSignal::new(String::new());
    let info = RwSignal::new(String::new());
    let busy = RwSignal::new(false);

    // Signed-in users (already, or just now) land on the home route.
    Effect::new(move || {
        let state = auth.get();
        if !state.is_loading && state.is_authenticated {
            navigate(HOME_ROUTE, NavigateOptions { replace: true, ..NavigateOptions::default() });
        }
    });

    let on_submit = move |ev: leptos::ev::SubmitEvent| {
        ev.prevent_default();
        if busy.get() {
            return;
        }
        let (user, pass) = match validate_credentials(&username.get(), &password.get()) {
            Ok(creds) => creds,
            Err(msg) => {
                info.set(msg.to_owned());
                return;
            }
        };
        busy.set(true);
        info.set(String::new());

        #[cfg(feature = "hydrate")]
        {
            let services = services.clone();
            leptos::task::spawn_local(async move {
                match crate::net::api::login(&services, &user, &pass).await {
                    Ok(token) => {
                        password.set(String::new());
                        services.controller.login(token);
                    }
                    Err(e) => {
                        log::debug!("login failed: {e}");
                        info.set(login_error_message(&e).to_owned());
                    }
                }
                busy.set(false);
            });
        }
        #[cfg(not(feature = "hydrate"))]
        {
            let _ = (&services, user, pass);
            info.set(login_error_message(&ApiError::Unavailable).to_owned());
            busy.set(false);
        }
    };

    view! {
        <div class="login-page">
            <div class="login-card">
                <h1>"Sentinel"</h1>
                <p class="login-card__subtitle">"Security monitoring console"</p>
                <form class="login-form" on:submit=on_submit>
                    <input
                        class="login-input"
                        type="text"
                        autocomplete="username"
                        placeholder="Username"
                        prop:value=move || username.get()
                        on:input=move |ev| username.set(event_target_value(&ev))
                    />
                    <input
                        class="login-input"
                        type="password"
                        autocomplete="current-password"
                        placeholder="Password"
                        prop:value=move || password.get()
                        on:input=move |ev| password.set(event_target_value(&ev))
                    />
                    <button class="login-button" type="submit" disabled=move || busy.get()>
                        "Sign In"
                    </button>
                </form>
                <Show when=move || !info.get().is_empty()>
                    <p class="login-message">{move || info.get()}</p>
                </Show>
            </div>
        </div>
    }
}
