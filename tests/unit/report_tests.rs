//! User-facing failure descriptions.

use relaybot::provider::ProviderError;
use relaybot::queue::report::describe_failure;
use relaybot::AppError;

#[test]
fn connection_failures_suggest_checking_connectivity() {
    let text = describe_failure(&AppError::Provider(ProviderError::Connection(
        "dns error".into(),
    )));
    assert!(text.starts_with("There was an issue connecting to the AI service."));
    assert!(!text.contains("dns error"));
}

#[test]
fn api_errors_include_provider_message() {
    let text = describe_failure(&AppError::Provider(ProviderError::Api {
        status: 500,
        message: "boom".into(),
    }));
    assert_eq!(text, "An error occurred with the AI service: boom");
}

#[test]
fn malformed_responses_read_like_api_errors() {
    let text = describe_failure(&AppError::Provider(ProviderError::MalformedResponse(
        "response has no text content".into(),
    )));
    assert_eq!(
        text,
        "An error occurred with the AI service: response has no text content"
    );
}

#[test]
fn invalid_requests_include_reason() {
    let text = describe_failure(&AppError::Provider(ProviderError::InvalidRequest(
        "prompt too long".into(),
    )));
    assert_eq!(text, "Invalid request: prompt too long");
}

#[test]
fn authentication_failures_hide_details() {
    let text = describe_failure(&AppError::Provider(ProviderError::Authentication(
        "key sk-123 revoked".into(),
    )));
    assert_eq!(
        text,
        "Authentication failed. Please check your API key and try again."
    );
}

#[test]
fn rate_limits_ask_to_retry_later() {
    let text = describe_failure(&AppError::Provider(ProviderError::RateLimited(String::new())));
    assert_eq!(text, "Rate limit exceeded. Please try again later.");
}

#[test]
fn panics_get_a_generic_message() {
    let text = describe_failure(&AppError::Panicked("index out of bounds".into()));
    assert_eq!(text, "An unexpected error occurred while running your command.");
}

#[test]
fn other_errors_fall_back_to_display() {
    let text = describe_failure(&AppError::Slack("channel_not_found".into()));
    assert_eq!(text, "An error occurred: slack: channel_not_found");
}
