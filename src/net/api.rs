//! REST API helpers for communicating with the monitoring backend.
//!
//! Client-side (hydrate): real HTTP calls via `gloo-net`.
//! Server-side (SSR): stubs returning `ApiError::Unavailable` since these
//! endpoints are only meaningful in the browser.
//!
//! SYSTEM CONTEXT
//! ==============
//! Every call raises the shared loading indicator for its lifetime, carries
//! the bearer token when one is stored, and carries `X-CSRF-Token` when the
//! method changes state. A 401 on an authorized call is the server telling
//! us the session is over, so it is forwarded to the session monitor.
//!
//! ERROR HANDLING
//! ==============
//! Callers get `Result<_, ApiError>` instead of panics so failures degrade UI
//! behavior without crashing hydration.

#![allow(clippy::unused_async)]

#[cfg(test)]
#[path = "api_test.rs"]
mod api_test;

use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::session::SessionServices;
use crate::session::csrf::Headers;
use crate::session::token_store::Token;

pub const LOGIN_PATH: &str = "/api/auth/login";
pub const LOGOUT_PATH: &str = "/api/auth/logout";

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ApiError {
    #[error("api not available outside the browser")]
    Unavailable,
    #[error("network error: {0}")]
    Network(String),
    #[error("unauthorized")]
    Unauthorized,
    #[error("request failed: {0}")]
    Status(u16),
    #[error("invalid response: {0}")]
    Decode(String),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
    Put,
    Patch,
    Delete,
}

impl Method {
    /// Methods that must carry the anti-forgery header.
    pub fn is_state_changing(self) -> bool {
        !matches!(self, Self::Get)
    }
}

/// How a 401 response should be interpreted.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum UnauthorizedPolicy {
    /// The session behind the bearer token is gone.
    SignalExpiry,
    /// Rejected credentials (login); the session is untouched.
    Ignore,
}

#[derive(Serialize)]
struct LoginRequest<'a> {
    username: &'a str,
    password: &'a str,
}

#[derive(serde::Deserialize)]
struct LoginResponse {
    token: String,
}

pub fn bearer_value(token: &Token) -> String {
    format!("Bearer {}", token.as_str())
}

/// Headers for an outgoing request: JSON accept, bearer token when stored,
/// CSRF token when `method` changes state.
pub fn request_headers(services: &SessionServices, method: Method) -> Headers {
    let mut headers = Headers::new();
    headers.insert("Accept".to_owned(), "application/json".to_owned());
    if let Some(token) = services.tokens.get() {
        headers.insert("Authorization".to_owned(), bearer_value(&token));
    }
    if method.is_state_changing() {
        headers = services.csrf.attach_header(headers);
    }
    headers
}

/// Map a response status onto the session services.
#[cfg(any(test, feature = "hydrate"))]
pub(crate) fn settle_status(services: &SessionServices, status: u16, policy: UnauthorizedPolicy) -> Result<(), ApiError> {
    match status {
        200..=299 => {
            services.controller.monitor().record_activity();
            Ok(())
        }
        401 => {
            if policy == UnauthorizedPolicy::SignalExpiry && services.controller.is_authenticated() {
                log::warn!("server rejected session token; expiring session");
                services.controller.monitor().signal_expired();
            }
            Err(ApiError::Unauthorized)
        }
        other => Err(ApiError::Status(other)),
    }
}

/// Send a request and decode a JSON response body.
///
/// # Errors
///
/// Returns `ApiError` on transport failure, non-2xx status, or a body that
/// does not decode as `T`.
pub async fn request_json<T, B>(services: &SessionServices, method: Method, path: &str, body: Option<&B>) -> Result<T, ApiError>
where
    T: DeserializeOwned,
    B: Serialize + ?Sized,
{
    services
        .loading
        .with_loading(fetch_json(services, method, path, body, UnauthorizedPolicy::SignalExpiry))
        .await
}

/// Exchange credentials for a token via `POST /api/auth/login`.
///
/// The caller hands the token to the session controller.
///
/// # Errors
///
/// Returns `ApiError::Unauthorized` for rejected credentials, or another
/// `ApiError` on transport failure or a malformed response.
pub async fn login(services: &SessionServices, username: &str, password: &str) -> Result<Token, ApiError> {
    let body = LoginRequest { username, password };
    let response: LoginResponse = services
        .loading
        .with_loading(fetch_json(services, Method::Post, LOGIN_PATH, Some(&body), UnauthorizedPolicy::Ignore))
        .await?;
    let token = Token::from(response.token);
    if !token.is_usable() {
        return Err(ApiError::Decode("login response carried an empty token".to_owned()));
    }
    Ok(token)
}

/// Tell the server to end the session via `POST /api/auth/logout`, then log
/// out locally whatever the server said.
pub async fn logout(services: &SessionServices) {
    let result = services
        .loading
        .with_loading(send(services, Method::Post, LOGOUT_PATH, None::<&()>, UnauthorizedPolicy::Ignore))
        .await;
    if let Err(e) = result {
        log::debug!("server logout failed: {e}");
    }
    services.controller.logout();
}

async fn fetch_json<T, B>(
    services: &SessionServices,
    method: Method,
    path: &str,
    body: Option<&B>,
    policy: UnauthorizedPolicy,
) -> Result<T, ApiError>
where
    T: DeserializeOwned,
    B: Serialize + ?Sized,
{
    #[cfg(feature = "hydrate")]
    {
        let resp = dispatch(services, method, path, body).await?;
        settle_status(services, resp.status(), policy)?;
        resp.json::<T>().await.map_err(|e| ApiError::Decode(e.to_string()))
    }
    #[cfg(not(feature = "hydrate"))]
    {
        let _ = (services, method, path, body, policy);
        Err(ApiError::Unavailable)
    }
}

async fn send<B>(services: &SessionServices, method: Method, path: &str, body: Option<&B>, policy: UnauthorizedPolicy) -> Result<(), ApiError>
where
    B: Serialize + ?Sized,
{
    #[cfg(feature = "hydrate")]
    {
        let resp = dispatch(services, method, path, body).await?;
        settle_status(services, resp.status(), policy)
    }
    #[cfg(not(feature = "hydrate"))]
    {
        let _ = (services, method, path, body, policy);
        Err(ApiError::Unavailable)
    }
}

#[cfg(feature = "hydrate")]
async fn dispatch<B>(services: &SessionServices, method: Method, path: &str, body: Option<&B>) -> Result<gloo_net::http::Response, ApiError>
where
    B: Serialize + ?Sized,
{
    use gloo_net::http::Request;

    let url = services.config.api_url(path);
    let mut builder = match method {
        Method::Get => Request::get(&url),
        Method::Post => Request::post(&url),
        Method::Put => Request::put(&url),
        Method::Patch => Request::patch(&url),
        Method::Delete => Request::delete(&url),
    };
    for (name, value) in request_headers(services, method) {
        builder = builder.header(&name, &value);
    }
    let request = match body {
        Some(body) => builder.json(body),
        None => builder.build(),
    }
    .map_err(|e| ApiError::Network(e.to_string()))?;
    request.send().await.map_err(|e| ApiError::Network(e.to_string()))
}
