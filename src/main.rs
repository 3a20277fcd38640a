#![forbid(unsafe_code)]

//! `relaybot`: Slack bot that relays slash commands to generative AI
//! services through a single serialized command queue.
//!
//! Bootstraps configuration and credentials, builds the command registry,
//! starts the Slack Socket Mode integration, and drains outstanding
//! commands on shutdown.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use clap::{Parser, ValueEnum};
use tracing::{error, info, warn};
use tracing_subscriber::{fmt, EnvFilter};

use relaybot::commands::{build_registry, ReplyVisibility};
use relaybot::config::GlobalConfig;
use relaybot::provider::chat::{AnthropicChat, ChatBackend};
use relaybot::queue::CommandQueue;
use relaybot::slack::client::SlackService;
use relaybot::state::AppState;
use relaybot::{startup, AppError, Result};

const SHUTDOWN_DRAIN_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug, Copy, Clone, Eq, PartialEq, ValueEnum)]
enum LogFormat {
    Text,
    Json,
}

#[derive(Debug, Parser)]
#[command(
    name = "relaybot",
    about = "Slack bot for generative AI commands",
    version,
    long_about = None
)]
struct Cli {
    /// Path to the TOML configuration file.
    #[arg(long)]
    config: PathBuf,

    /// Log output format (text or json).
    #[arg(long, value_enum, default_value_t = LogFormat::Text)]
    log_format: LogFormat,
}

fn main() -> Result<()> {
    let args = Cli::parse();
    init_tracing(args.log_format)?;
    info!("relaybot bootstrap");

    tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .map_err(|err| AppError::Config(format!("failed to build tokio runtime: {err}")))?
        .block_on(run(args))
}

async fn run(args: Cli) -> Result<()> {
    // ── Load configuration ──────────────────────────────
    let mut config = GlobalConfig::load_from_path(&args.config)?;
    config.load_credentials().await?;
    info!("configuration loaded");

    // ── Build command registry ──────────────────────────
    let http = reqwest::Client::new();
    let queue = CommandQueue::new();
    let visibility = Arc::new(ReplyVisibility::new(config.private_by_default));
    let backend: Arc<dyn ChatBackend> =
        Arc::new(AnthropicChat::new(http.clone(), config.chat.clone()));
    let registry = build_registry(queue.clone(), Arc::clone(&backend), &visibility);
    info!(commands = ?registry.names(), "command registry ready");

    let state = Arc::new(AppState {
        registry,
        http,
        visibility,
    });

    // ── Start Slack ─────────────────────────────────────
    let (slack, runtime) = SlackService::start(&config.slack, Arc::clone(&state)).map_err(|err| {
        error!(%err, "slack service start failed");
        err
    })?;

    if let Some(msg) = startup::starting_message(&config, backend.as_ref()).await {
        if let Err(err) = slack.enqueue(msg).await {
            error!(%err, "failed to post starting prompt reply");
        }
    }

    info!("relaybot ready");

    // ── Wait for shutdown signal ────────────────────────
    shutdown_signal().await;
    info!("shutdown signal received");

    let pending = queue.len().await;
    if queue.is_draining() {
        info!(pending, "waiting for queued commands to finish");
        if tokio::time::timeout(SHUTDOWN_DRAIN_TIMEOUT, queue.wait_idle())
            .await
            .is_err()
        {
            warn!(
                pending = queue.len().await,
                "queue did not drain before shutdown timeout; dropping remaining commands"
            );
        }
    }

    runtime.abort();
    info!("relaybot shut down");

    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = tokio::signal::ctrl_c();

    #[cfg(unix)]
    {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                tokio::select! {
                    _ = ctrl_c => {}
                    _ = sigterm.recv() => {}
                }
            }
            Err(err) => {
                tracing::warn!(%err, "failed to register SIGTERM handler, using ctrl-c only");
                let _ = ctrl_c.await;
            }
        }
    }

    #[cfg(not(unix))]
    {
        if let Err(err) = ctrl_c.await {
            tracing::error!(%err, "ctrl-c signal handler failed");
        }
    }
}

fn init_tracing(log_format: LogFormat) -> Result<()> {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let subscriber = fmt().with_env_filter(env_filter);

    match log_format {
        LogFormat::Text => subscriber
            .try_init()
            .map_err(|err| AppError::Config(format!("failed to init tracing: {err}")))?,
        LogFormat::Json => subscriber
            .json()
            .try_init()
            .map_err(|err| AppError::Config(format!("failed to init tracing: {err}")))?,
    }

    Ok(())
}
