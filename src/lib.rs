//! # sentinel-client
//!
//! Leptos + WASM frontend for the Sentinel security console.
//!
//! This crate contains the client session layer (auth token persistence,
//! CSRF protection, loading coordination, and inactivity expiry), the pages
//! and components that consume it, and the HTTP helpers that attach session
//! credentials to API calls.

pub mod app;
pub mod components;
pub mod config;
pub mod net;
pub mod pages;
pub mod session;
pub mod state;
pub mod util;

/// Browser entry point: install panic/log hooks and hydrate the SSR markup.
#[cfg(feature = "hydrate")]
#[wasm_bindgen::prelude::wasm_bindgen]
pub fn hydrate() {
    console_error_panic_hook::set_once();
    let _ = console_log::init_with_level(log::Level::Debug);
    leptos::mount::hydrate_body(app::App);
}
