//! Slack bridge layer modules.

pub mod client;
pub mod commands;
pub mod invocation;
