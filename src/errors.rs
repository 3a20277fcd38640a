//! Error types shared across the application.

use std::fmt::{Display, Formatter};

use crate::provider::ProviderError;

/// Shared application result type.
pub type Result<T> = std::result::Result<T, AppError>;

/// Application error enumeration covering all domain failure modes.
#[derive(Debug)]
pub enum AppError {
    /// Configuration parsing or validation failure.
    Config(String),
    /// Slack API or Socket Mode failure.
    Slack(String),
    /// The "processing" acknowledgment could not be delivered.
    Ack(String),
    /// A task was built without the invocation it must reply to.
    MissingInvocation(String),
    /// The invocation can no longer be answered (expired or already used).
    Expired(String),
    /// No handler is registered under the requested command name.
    UnknownCommand(String),
    /// Upstream generation provider failure.
    Provider(ProviderError),
    /// A queued task panicked while running.
    Panicked(String),
    /// File-system or I/O operation failure.
    Io(String),
}

impl Display for AppError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Config(msg) => write!(f, "config: {msg}"),
            Self::Slack(msg) => write!(f, "slack: {msg}"),
            Self::Ack(msg) => write!(f, "ack: {msg}"),
            Self::MissingInvocation(msg) => write!(f, "missing invocation: {msg}"),
            Self::Expired(msg) => write!(f, "expired: {msg}"),
            Self::UnknownCommand(msg) => write!(f, "unknown command: {msg}"),
            Self::Provider(err) => write!(f, "provider: {err}"),
            Self::Panicked(msg) => write!(f, "panicked: {msg}"),
            Self::Io(msg) => write!(f, "io: {msg}"),
        }
    }
}

impl std::error::Error for AppError {}

impl AppError {
    /// Whether this error means the originating invocation is gone.
    #[must_use]
    pub fn is_expired(&self) -> bool {
        matches!(self, Self::Expired(_))
    }
}

impl From<toml::de::Error> for AppError {
    fn from(err: toml::de::Error) -> Self {
        Self::Config(format!("invalid config: {err}"))
    }
}

impl From<ProviderError> for AppError {
    fn from(err: ProviderError) -> Self {
        Self::Provider(err)
    }
}

impl From<std::io::Error> for AppError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err.to_string())
    }
}
