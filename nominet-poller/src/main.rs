//! Nominet poll queue task runner
//!
//! Runs the "process poll queue" sweep over every account listed in the config file,
//! either once (`--once`, for an external scheduler) or on the configured interval until
//! interrupted. Every drained message is logged as one JSON line.

mod adapters;
mod config;

use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use adapters::FileCredentialStore;
use anyhow::Context;
use clap::Parser;
use config::PollerConfig;
use nominet_core::types::{PROCESS_POLL_TASK, PollSweep};
use nominet_core::{DottedPhoneFormatter, PollService, ServiceContext, SessionPool};
use nominet_epp::RegistryConnector;
use tokio::time::MissedTickBehavior;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Debug, Parser)]
#[command(name = "nominet-poller", version, about = PROCESS_POLL_TASK.description)]
struct Cli {
    /// Path to the TOML config file
    #[arg(short, long, env = "NOMINET_POLLER_CONFIG", default_value = "nominet-poller.toml")]
    config: PathBuf,

    /// Run a single sweep and exit
    #[arg(long)]
    once: bool,

    /// Override `[poll] max_messages`
    #[arg(long)]
    max_messages: Option<usize>,
}

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_ansi(false),
        )
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    match run(Cli::parse()).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("{e:#}");
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let config = PollerConfig::load(&cli.config)?;
    let max_messages = cli.max_messages.unwrap_or(config.poll.max_messages);

    let sessions = Arc::new(SessionPool::new(Arc::new(RegistryConnector::new(
        config.transport.clone(),
    ))));
    let ctx = Arc::new(ServiceContext::new(
        Arc::clone(&sessions),
        Arc::new(DottedPhoneFormatter),
    ));
    let service = PollService::new(ctx, Arc::new(FileCredentialStore::new(cli.config.clone())));

    if cli.once {
        tracing::info!("Running {} once", PROCESS_POLL_TASK.name);
        return sweep(&sessions, &service, max_messages).await;
    }

    tracing::info!(
        "Running {} every {} minute(s), up to {max_messages} message(s) per account",
        PROCESS_POLL_TASK.name,
        config.poll.interval_minutes
    );
    let mut ticker = tokio::time::interval(config.poll.interval());
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            _ = ticker.tick() => {
                if let Err(e) = sweep(&sessions, &service, max_messages).await {
                    tracing::error!("Poll sweep failed: {e:#}");
                }
            }
            signal = tokio::signal::ctrl_c() => {
                signal.context("Failed to listen for shutdown signal")?;
                tracing::info!("Shutdown requested");
                break;
            }
        }
    }

    sessions.close_all().await;
    Ok(())
}

/// One run of the task. Sessions opened during the run are closed before returning.
async fn sweep(sessions: &SessionPool, service: &PollService, max_messages: usize) -> anyhow::Result<()> {
    let result = sessions
        .scoped(service.process_poll_queue(max_messages))
        .await
        .context("Failed to load registrar accounts")?;
    log_sweep(&result)
}

fn log_sweep(sweep: &PollSweep) -> anyhow::Result<()> {
    for account in &sweep.accounts {
        for message in &account.messages {
            let json = serde_json::to_string(message).context("Failed to serialise poll message")?;
            tracing::info!(account = %account.username, "{json}");
        }
    }
    tracing::info!(
        "Sweep complete: {} message(s) from {} account(s)",
        sweep.message_count(),
        sweep.accounts.len()
    );
    Ok(())
}
