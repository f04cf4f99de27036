//! Per-invocation pipeline driver.
//!
//! [`Relay`] is constructed once at process start with its delivery client
//! (and, optionally, a commit lookup client) and then shared by every
//! invocation. Each call to [`Relay::subscribe`] runs
//! decode → filter → enrich → format → deliver and reports an [`Outcome`].

use std::sync::Arc;

use tracing::{debug, error, info, info_span, Instrument};

use crate::{
    decode_event, enrich, format_message, ChatDelivery, ChatMessage, CommitLookup, InvocationId,
    PubSubMessage, RelayError, StatusFilter,
};

/// What a single invocation ended up doing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// The build status is not in the allow-list; nothing was sent.
    Skipped { status: String },
    /// The formatted build message was delivered.
    Delivered,
    /// The pipeline failed and the `Error: ...` message was delivered instead.
    ErrorReported { error: String },
    /// The webhook rejected or never received the message.
    DeliveryFailed,
}

/// The notification relay.
pub struct Relay {
    delivery: Arc<dyn ChatDelivery>,
    commit_lookup: Option<Arc<dyn CommitLookup>>,
    statuses: StatusFilter,
}

impl Relay {
    /// Creates a relay with the default status filter and no commit enrichment.
    pub fn new(delivery: Arc<dyn ChatDelivery>) -> Self {
        Self {
            delivery,
            commit_lookup: None,
            statuses: StatusFilter::default(),
        }
    }

    /// Enables commit enrichment through `lookup`.
    pub fn with_commit_lookup(mut self, lookup: Arc<dyn CommitLookup>) -> Self {
        self.commit_lookup = Some(lookup);
        self
    }

    /// Replaces the default status allow-list.
    pub fn with_status_filter(mut self, statuses: StatusFilter) -> Self {
        self.statuses = statuses;
        self
    }

    /// The status allow-list in effect.
    pub fn status_filter(&self) -> &StatusFilter {
        &self.statuses
    }

    /// Handles one incoming message.
    ///
    /// Never fails: pipeline errors are reported to the webhook as a plain
    /// `Error: <description>` message, delivery errors are logged.
    pub async fn subscribe(&self, message: &PubSubMessage) -> Outcome {
        let invocation = InvocationId::new_random();
        let span = info_span!(
            "relay.subscribe",
            invocation_id = %invocation,
            message_id = message.message_id.as_deref().unwrap_or_default(),
        );

        async move {
            match self.run(message).await {
                Ok(outcome) => outcome,
                Err(err) => {
                    error!(error = %err, "build notification failed; reporting error");
                    let error = err.to_string();
                    match self.send(&ChatMessage::plain(format!("Error: {error}"))).await {
                        Outcome::Delivered => Outcome::ErrorReported { error },
                        other => other,
                    }
                }
            }
        }
        .instrument(span)
        .await
    }

    async fn run(&self, message: &PubSubMessage) -> Result<Outcome, RelayError> {
        let build = decode_event(&message.data)?;
        debug!(build_id = build.display_id(), status = %build.status, "build event decoded");

        if !self.statuses.allows(&build.status) {
            debug!(build_id = build.display_id(), status = %build.status, "status not relayed");
            return Ok(Outcome::Skipped {
                status: build.status.to_string(),
            });
        }

        let enrichment = enrich(&build, self.commit_lookup.as_deref()).await;
        let chat = format_message(&build, &enrichment);

        let outcome = self.send(&chat).await;
        if outcome == Outcome::Delivered {
            info!(build_id = build.display_id(), status = %build.status, "build notification sent");
        }
        Ok(outcome)
    }

    async fn send(&self, chat: &ChatMessage) -> Outcome {
        match self.delivery.deliver(chat).await {
            Ok(()) => Outcome::Delivered,
            Err(err) => {
                error!(error = %err, "chat delivery failed");
                Outcome::DeliveryFailed
            }
        }
    }
}

impl std::fmt::Debug for Relay {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Relay")
            .field("commit_lookup", &self.commit_lookup.is_some())
            .field("statuses", &self.statuses)
            .finish_non_exhaustive()
    }
}
