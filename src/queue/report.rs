//! Error-to-user reporter.
//!
//! Best effort only: the invocation may have expired while the task waited
//! in the queue, in which case the failure is logged and dropped.

use tracing::{error, info, warn};

use crate::provider::ProviderError;
use crate::queue::invocation::Invocation;
use crate::AppError;

/// Tell the requester that their command failed.
///
/// Never returns an error. A failed follow-up is logged at `warn` when the
/// invocation expired and at `error` otherwise.
pub async fn report_failure(invocation: &dyn Invocation, failure: &AppError) {
    if !invocation.is_usable() {
        warn!(
            invocation = invocation.id(),
            %failure,
            "invocation no longer usable; failure not reported to user"
        );
        return;
    }

    match invocation.follow_up(describe_failure(failure)).await {
        Ok(()) => info!(invocation = invocation.id(), "failure reported to user"),
        Err(err) if err.is_expired() => {
            warn!(invocation = invocation.id(), %err, "invocation expired before failure report");
        }
        Err(err) => {
            error!(invocation = invocation.id(), %err, "failed to report task failure");
        }
    }
}

/// Render a failure as text suitable for the requester.
#[must_use]
pub fn describe_failure(failure: &AppError) -> String {
    match failure {
        AppError::Provider(ProviderError::Connection(_)) => {
            "There was an issue connecting to the AI service. \
             Please check your internet connection and try again."
                .into()
        }
        AppError::Provider(
            ProviderError::Api { message, .. } | ProviderError::MalformedResponse(message),
        ) => format!("An error occurred with the AI service: {message}"),
        AppError::Provider(ProviderError::InvalidRequest(message)) => {
            format!("Invalid request: {message}")
        }
        AppError::Provider(ProviderError::Authentication(_)) => {
            "Authentication failed. Please check your API key and try again.".into()
        }
        AppError::Provider(ProviderError::RateLimited(_)) => {
            "Rate limit exceeded. Please try again later.".into()
        }
        AppError::Panicked(_) => "An unexpected error occurred while running your command.".into(),
        other => format!("An error occurred: {other}"),
    }
}
