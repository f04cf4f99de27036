//! gcb-relay entry point.
//!
//! This binary is the composition root for the entire system. Responsibilities:
//!
//! 1. **Parse configuration** from flags and environment variables.
//! 2. **Wire observability**: `tracing-subscriber` with a JSON layer and an
//!    optional OpenTelemetry OTLP exporter. All `tracing` spans and structured
//!    events emitted by every crate in the workspace flow through this layer.
//! 3. **Construct infrastructure**: the chat `WebhookClient` and, when a token
//!    is configured, the `GithubClient`, injected into one shared `Relay`.
//! 4. **Select trigger mode**:
//!    - `serve` runs the Pub/Sub push listener until SIGINT/SIGTERM.
//!    - `notify` relays one base64 payload from `--data` or stdin and exits.

mod config;
mod telemetry;

use std::sync::Arc;
use std::time::Duration;

use anyhow::{bail, Context};
use clap::Parser;
use relay::{Outcome, PubSubMessage, Relay};
use tokio::io::AsyncReadExt;
use tracing::info;

use crate::config::{Cli, Mode, RelayArgs};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let telemetry = telemetry::init(&cli.telemetry)?;

    let result = run(cli).await;

    telemetry.shutdown();
    result
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let relay = Arc::new(build_relay(&cli.relay)?);
    info!(?relay, "relay configured");

    match cli.mode {
        Mode::Serve { listen, port } => {
            let addr = config::listen_addr(listen, port);
            listener::serve(addr, relay, shutdown_signal()).await?;
            Ok(())
        }
        Mode::Notify { data } => {
            let data = match data {
                Some(data) => data,
                None => read_stdin().await?,
            };
            match relay.subscribe(&PubSubMessage::from_data(data)).await {
                Outcome::DeliveryFailed => bail!("chat webhook did not accept the message"),
                outcome => {
                    info!(?outcome, "notification handled");
                    Ok(())
                }
            }
        }
    }
}

fn build_relay(args: &RelayArgs) -> anyhow::Result<Relay> {
    let timeout = Duration::from_secs(args.http_timeout_secs);

    let delivery = chat::WebhookClient::new(args.webhook_url.clone(), timeout)
        .context("invalid chat webhook configuration")?;
    let mut relay = Relay::new(Arc::new(delivery));

    if let Some(statuses) = &args.statuses {
        relay = relay.with_status_filter(statuses.clone());
    }

    match args.github_token() {
        Some(token) => {
            let github = github::GithubClient::new(github::GithubConfig {
                api_url: args.github_api_url.clone(),
                token: token.to_string(),
                timeout,
            })
            .context("invalid GitHub configuration")?;
            relay = relay.with_commit_lookup(Arc::new(github));
        }
        None => info!("GITHUB_TOKEN not set; commit enrichment disabled"),
    }

    Ok(relay)
}

async fn read_stdin() -> anyhow::Result<String> {
    let mut data = String::new();
    tokio::io::stdin()
        .read_to_string(&mut data)
        .await
        .context("failed to read build message from stdin")?;
    Ok(data)
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %err, "failed to listen for ctrl-c");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(err) => {
                tracing::error!(error = %err, "failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }
    info!("shutdown signal received");
}
