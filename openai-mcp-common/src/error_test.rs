//! Property tests for error display: every user-visible message must carry
//! enough context to act on.

use proptest::prelude::*;

use crate::error::{ConfigError, Error};

fn any_status() -> impl Strategy<Value = u16> {
    100u16..600
}

fn any_message() -> impl Strategy<Value = String> {
    "[A-Za-z0-9 ]{1,100}"
}

proptest! {
    /// API errors display as `DALL-E API error: <upstream message>`,
    /// whatever the status.
    #[test]
    fn api_errors_keep_the_upstream_message(status in any_status(), message in any_message()) {
        let rendered = Error::api(status, &message).to_string();

        prop_assert!(rendered.starts_with("DALL-E API error: "), "got: {}", rendered);
        prop_assert!(rendered.ends_with(&message), "got: {}", rendered);
    }

    /// The status code survives on the variant for callers that match on it.
    #[test]
    fn api_errors_keep_the_status(status in any_status(), message in any_message()) {
        match Error::api(status, message) {
            Error::Api { status_code, .. } => prop_assert_eq!(status_code, status),
            other => prop_assert!(false, "expected Api, got {:?}", other),
        }
    }

    /// Missing-variable errors name the variable.
    #[test]
    fn missing_env_var_names_the_variable(name in "[A-Z][A-Z0-9_]{2,30}") {
        let rendered = ConfigError::missing_env_var(&name).to_string();
        prop_assert!(rendered.contains(&name), "got: {}", rendered);
    }
}

#[test]
fn api_error_display_is_exact() {
    assert_eq!(
        Error::api(400, "invalid prompt").to_string(),
        "DALL-E API error: invalid prompt"
    );
}

#[test]
fn missing_key_display_is_exact() {
    assert_eq!(
        ConfigError::missing_env_var("OPENAI_API_KEY").to_string(),
        "Required environment variable OPENAI_API_KEY is not set"
    );
}

#[test]
fn invalid_value_names_variable_and_reason() {
    let rendered = ConfigError::invalid_value("PORT", "'abc' is not a valid port number").to_string();
    assert!(rendered.contains("PORT"));
    assert!(rendered.contains("abc"));
}

#[test]
fn config_errors_lift_into_the_unified_type() {
    let err: Error = ConfigError::missing_env_var("OPENAI_API_KEY").into();
    // Transparent wrapping: the message is unchanged.
    assert!(err.to_string().contains("OPENAI_API_KEY"));
    assert!(matches!(err, Error::Config(_)));
}
