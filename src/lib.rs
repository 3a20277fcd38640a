#![forbid(unsafe_code)]

pub mod commands;
pub mod config;
pub mod errors;
pub mod provider;
pub mod queue;
pub mod slack;
pub mod startup;
pub mod state;

pub use config::GlobalConfig;
pub use errors::{AppError, Result};
