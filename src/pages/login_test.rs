use super::*;

#[test]
fn validate_credentials_trims_username() {
    assert_eq!(
        validate_credentials("  analyst  ", "hunter2"),
        Ok(("analyst".to_owned(), "hunter2".to_owned()))
    );
}

#[test]
fn validate_credentials_keeps_password_verbatim() {
    assert_eq!(
        validate_credentials("analyst", " pass with spaces "),
        Ok(("analyst".to_owned(), " pass with spaces ".to_owned()))
    );
}

#[test]
fn validate_credentials_requires_username() {
    assert_eq!(validate_credentials("   ", "hunter2"), Err("Enter your username."));
}

#[test]
fn validate_credentials_requires_password() {
    assert_eq!(validate_credentials("analyst", ""), Err("Enter your password."));
}

#[test]
fn login_error_message_for_rejected_credentials() {
    assert_eq!(login_error_message(&ApiError::Unauthorized), "Invalid username or password.");
}

#[test]
fn login_error_message_for_rate_limit() {
    assert_eq!(
        login_error_message(&ApiError::Status(429)),
        "Too many sign-in attempts. Wait a moment and try again."
    );
}

#[test]
fn login_error_message_for_transport_failures() {
    assert_eq!(login_error_message(&ApiError::Unavailable), "Cannot reach the server. Try again.");
    assert_eq!(
        login_error_message(&ApiError::Network("offline".to_owned())),
        "Cannot reach the server. Try again."
    );
}

#[test]
fn login_error_message_fallback() {
    assert_eq!(login_error_message(&ApiError::Status(500)), "Sign-in failed. Try again.");
}
