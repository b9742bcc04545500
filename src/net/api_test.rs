use std::sync::Arc;

use futures::executor::block_on;

use super::*;
use crate::config::{CSRF_HEADER, SessionConfig};
use crate::session::monitor::MonitorPhase;
use crate::util::storage::MemoryStorage;

fn services() -> SessionServices {
    SessionServices::new(
        SessionConfig::default(),
        Arc::new(MemoryStorage::new()),
        Arc::new(MemoryStorage::new()),
    )
}

// =============================================================================
// headers
// =============================================================================

#[test]
fn bearer_value_formats_token() {
    assert_eq!(bearer_value(&Token::from("tok-123")), "Bearer tok-123");
}

#[test]
fn only_get_is_safe() {
    assert!(!Method::Get.is_state_changing());
    for method in [Method::Post, Method::Put, Method::Patch, Method::Delete] {
        assert!(method.is_state_changing(), "{method:?}");
    }
}

#[test]
fn get_headers_carry_bearer_but_no_csrf() {
    let services = services();
    services.controller.login(Token::from("tok-123"));
    let headers = request_headers(&services, Method::Get);
    assert_eq!(headers.get("Authorization").map(String::as_str), Some("Bearer tok-123"));
    assert_eq!(headers.get("Accept").map(String::as_str), Some("application/json"));
    assert!(!headers.contains_key(CSRF_HEADER));
}

#[test]
fn post_headers_carry_valid_csrf_token() {
    let services = services();
    let headers = request_headers(&services, Method::Post);
    let csrf = headers.get(CSRF_HEADER).expect("csrf header");
    assert!(services.csrf.validate(csrf));
}

#[test]
fn anonymous_headers_have_no_authorization() {
    let services = services();
    let headers = request_headers(&services, Method::Delete);
    assert!(!headers.contains_key("Authorization"));
    assert!(headers.contains_key(CSRF_HEADER));
}

// =============================================================================
// settle_status
// =============================================================================

#[test]
fn success_status_is_ok() {
    let services = services();
    assert_eq!(settle_status(&services, 204, UnauthorizedPolicy::SignalExpiry), Ok(()));
}

#[test]
fn unauthorized_on_authorized_call_expires_session() {
    let services = services();
    services.controller.login(Token::from("tok"));

    let result = settle_status(&services, 401, UnauthorizedPolicy::SignalExpiry);
    assert_eq!(result, Err(ApiError::Unauthorized));
    assert!(!services.controller.is_authenticated());
    assert!(services.tokens.get().is_none());
    assert_eq!(services.controller.monitor().phase(), MonitorPhase::Expired);
}

#[test]
fn unauthorized_login_leaves_session_alone() {
    let services = services();
    services.controller.login(Token::from("tok"));

    let result = settle_status(&services, 401, UnauthorizedPolicy::Ignore);
    assert_eq!(result, Err(ApiError::Unauthorized));
    assert!(services.controller.is_authenticated());
    assert_eq!(services.controller.monitor().phase(), MonitorPhase::Armed);
}

#[test]
fn other_statuses_are_reported() {
    let services = services();
    assert_eq!(settle_status(&services, 403, UnauthorizedPolicy::SignalExpiry), Err(ApiError::Status(403)));
    assert_eq!(settle_status(&services, 500, UnauthorizedPolicy::SignalExpiry), Err(ApiError::Status(500)));
}

#[test]
fn api_error_messages() {
    assert_eq!(ApiError::Status(503).to_string(), "request failed: 503");
    assert_eq!(ApiError::Unauthorized.to_string(), "unauthorized");
}

// =============================================================================
// calls outside the browser
// =============================================================================

#[cfg(not(feature = "hydrate"))]
#[test]
fn login_outside_browser_is_unavailable_and_releases_loading() {
    let services = services();
    let result = block_on(login(&services, "analyst", "hunter2"));
    assert_eq!(result, Err(ApiError::Unavailable));
    assert!(!services.loading.is_loading());
    assert_eq!(services.loading.imbalance_count(), 0);
}

#[cfg(not(feature = "hydrate"))]
#[test]
fn logout_always_clears_local_session() {
    let services = services();
    services.controller.login(Token::from("tok"));
    block_on(logout(&services));
    assert!(!services.controller.is_authenticated());
    assert!(services.tokens.get().is_none());
    assert!(!services.loading.is_loading());
}

#[cfg(not(feature = "hydrate"))]
#[test]
fn request_json_outside_browser_is_unavailable() {
    let services = services();
    let result: Result<serde_json::Value, ApiError> =
        block_on(request_json(&services, Method::Get, "/api/alerts", None::<&()>));
    assert_eq!(result, Err(ApiError::Unavailable));
}
