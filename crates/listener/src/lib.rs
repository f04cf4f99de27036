//! Trigger event source infrastructure.
//!
//! Cloud Build publishes every build status change to the `cloud-builds`
//! Pub/Sub topic. A push subscription POSTs each message, wrapped in a push
//! envelope, to this endpoint:
//!
//! ```json
//! {
//!   "message": {"data": "<base64 build>", "messageId": "123", "attributes": {}},
//!   "subscription": "projects/p/subscriptions/s"
//! }
//! ```
//!
//! The handler unwraps the envelope, runs [`relay::Relay::subscribe`] and
//! acknowledges with `204 No Content` whatever the outcome, so Pub/Sub never
//! redelivers. Envelopes that fail to deserialise are refused by the JSON
//! extractor with a 4xx status.
//!
//! ## Architectural Layer
//!
//! **Infrastructure.** HTTP transport and envelope deserialisation live here.
//! The [`relay`] crate sees only [`relay::PubSubMessage`].

use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;

use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};
use relay::{PubSubMessage, Relay};
use serde::Deserialize;
use thiserror::Error;
use tokio::net::TcpListener;
use tracing::info;

/// Errors that stop the push listener.
#[derive(Debug, Error)]
pub enum ListenerError {
    /// The listen address could not be bound.
    #[error("failed to bind {addr}: {source}")]
    Bind {
        addr: SocketAddr,
        #[source]
        source: std::io::Error,
    },

    /// The server stopped with an I/O error.
    #[error("server error: {0}")]
    Serve(#[from] std::io::Error),
}

/// The body Pub/Sub push subscriptions POST.
#[derive(Debug, Clone, Deserialize)]
pub struct PushEnvelope {
    pub message: PubSubMessage,
    /// Full subscription name, e.g. `projects/p/subscriptions/s`.
    #[serde(default)]
    pub subscription: Option<String>,
}

/// Builds the HTTP routes: `POST /` for push messages, `GET /healthz`.
pub fn router(relay: Arc<Relay>) -> Router {
    Router::new()
        .route("/", post(receive_push))
        .route("/healthz", get(healthz))
        .with_state(relay)
}

/// Binds `addr` and serves until `shutdown` resolves.
pub async fn serve<F>(addr: SocketAddr, relay: Arc<Relay>, shutdown: F) -> Result<(), ListenerError>
where
    F: Future<Output = ()> + Send + 'static,
{
    let listener = TcpListener::bind(addr)
        .await
        .map_err(|source| ListenerError::Bind { addr, source })?;
    serve_on(listener, relay, shutdown).await
}

/// Serves on an already-bound listener until `shutdown` resolves.
pub async fn serve_on<F>(
    listener: TcpListener,
    relay: Arc<Relay>,
    shutdown: F,
) -> Result<(), ListenerError>
where
    F: Future<Output = ()> + Send + 'static,
{
    if let Ok(addr) = listener.local_addr() {
        info!(%addr, "listening for Pub/Sub push messages");
    }
    axum::serve(listener, router(relay))
        .with_graceful_shutdown(shutdown)
        .await?;
    info!("listener stopped");
    Ok(())
}

async fn receive_push(
    State(relay): State<Arc<Relay>>,
    Json(envelope): Json<PushEnvelope>,
) -> StatusCode {
    let outcome = relay.subscribe(&envelope.message).await;
    info!(
        subscription = envelope.subscription.as_deref().unwrap_or_default(),
        ?outcome,
        "push message handled"
    );
    StatusCode::NO_CONTENT
}

async fn healthz() -> &'static str {
    "ok"
}
