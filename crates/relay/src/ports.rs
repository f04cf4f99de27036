//! Port traits implemented by infrastructure crates.
//!
//! The `github` crate implements [`CommitLookup`]; the `chat` crate implements
//! [`ChatDelivery`]. Both are held as trait objects by [`Relay`](crate::Relay),
//! so they must be `Send + Sync`.

use async_trait::async_trait;

use crate::{ChatMessage, CommitInfo, CommitLookupError, DeliveryError, RepoCoordinates};

/// Fetches commit metadata from a source-control host.
#[async_trait]
pub trait CommitLookup: Send + Sync {
    /// Fetches the commit identified by `coordinates`.
    ///
    /// Called at most once per invocation and never retried.
    async fn get_commit(
        &self,
        coordinates: &RepoCoordinates,
    ) -> Result<CommitInfo, CommitLookupError>;
}

/// Posts a chat message to the configured webhook target.
#[async_trait]
pub trait ChatDelivery: Send + Sync {
    /// Sends `message` once. Implementations must not retry.
    async fn deliver(&self, message: &ChatMessage) -> Result<(), DeliveryError>;
}
