//! Command-line and environment configuration.
//!
//! Every option can be given as a flag or through the environment variable
//! named next to it, which is how Cloud Run and Cloud Functions deployments
//! configure the relay.

use std::net::{Ipv4Addr, SocketAddr};

use clap::{Args, Parser, Subcommand, ValueEnum};
use relay::StatusFilter;

const DEFAULT_PORT: u16 = 8080;

#[derive(Debug, Parser)]
#[command(
    name = "gcb-relay",
    version,
    about = "Relays Cloud Build status notifications to a chat webhook"
)]
pub struct Cli {
    #[command(flatten)]
    pub relay: RelayArgs,

    #[command(flatten)]
    pub telemetry: TelemetryArgs,

    #[command(subcommand)]
    pub mode: Mode,
}

#[derive(Debug, Args)]
pub struct RelayArgs {
    /// Incoming-webhook URL messages are posted to.
    #[arg(long, env = "SLACK_WEBHOOK_URL", hide_env_values = true)]
    pub webhook_url: String,

    /// GitHub token used to look up commit authors. Enrichment is disabled without it.
    #[arg(long, env = "GITHUB_TOKEN", hide_env_values = true)]
    pub github_token: Option<String>,

    #[arg(long, env = "GITHUB_API_URL", default_value = github::DEFAULT_API_URL)]
    pub github_api_url: String,

    /// Comma-separated build statuses to relay [default: SUCCESS,FAILURE,INTERNAL_ERROR,TIMEOUT]
    #[arg(long, env = "RELAY_STATUSES")]
    pub statuses: Option<StatusFilter>,

    /// Timeout for each outbound HTTP request, in seconds.
    #[arg(long, env = "HTTP_TIMEOUT_SECS", default_value_t = 10)]
    pub http_timeout_secs: u64,
}

impl RelayArgs {
    /// The GitHub token, treating an empty value as unset.
    pub fn github_token(&self) -> Option<&str> {
        self.github_token.as_deref().filter(|t| !t.is_empty())
    }
}

#[derive(Debug, Args)]
pub struct TelemetryArgs {
    #[arg(long, env = "LOG_FORMAT", value_enum, default_value_t = LogFormat::Json)]
    pub log_format: LogFormat,

    /// OTLP gRPC endpoint; trace export is disabled when unset.
    #[arg(long, env = "OTEL_EXPORTER_OTLP_ENDPOINT")]
    pub otlp_endpoint: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LogFormat {
    Json,
    Pretty,
}

#[derive(Debug, Subcommand)]
pub enum Mode {
    /// Serve a Pub/Sub push endpoint.
    Serve {
        /// Address to bind. Takes precedence over --port.
        #[arg(long, env = "LISTEN_ADDR")]
        listen: Option<SocketAddr>,

        /// Port to bind on all interfaces.
        #[arg(long, env = "PORT")]
        port: Option<u16>,
    },

    /// Relay a single base64-encoded build message, read from --data or stdin.
    Notify {
        #[arg(long)]
        data: Option<String>,
    },
}

/// Resolves the serve-mode bind address.
pub fn listen_addr(listen: Option<SocketAddr>, port: Option<u16>) -> SocketAddr {
    listen.unwrap_or_else(|| {
        SocketAddr::from((Ipv4Addr::UNSPECIFIED, port.unwrap_or(DEFAULT_PORT)))
    })
}
