//! Shared application state handed to platform callbacks.

use std::sync::Arc;

use crate::commands::{CommandRegistry, ReplyVisibility};

/// Everything a slash-command callback needs.
pub struct AppState {
    /// Registered command handlers.
    pub registry: CommandRegistry,
    /// Shared HTTP client for `response_url` posts and provider calls.
    pub http: reqwest::Client,
    /// Current reply visibility.
    pub visibility: Arc<ReplyVisibility>,
}
