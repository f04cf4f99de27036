//! Error types for every stage of the relay pipeline.
//!
//! Only [`RelayError`] escapes the pipeline. Enrichment failures are absorbed
//! by the enricher and delivery failures by the dispatcher; both are still
//! typed so callers and tests can inspect them.

use thiserror::Error;

use crate::CommitSha;

// ---------------------------------------------------------------------------
// Pipeline-level errors
// ---------------------------------------------------------------------------

/// Errors that abort an invocation and trigger the `Error: ...` fallback message.
#[derive(Debug, Error)]
pub enum RelayError {
    /// The payload was not a decodable build.
    #[error(transparent)]
    Decode(#[from] DecodeError),
}

/// The incoming payload could not be turned into a build event.
#[derive(Debug, Error)]
pub enum DecodeError {
    /// `data` is not standard base64.
    #[error("payload is not valid base64: {0}")]
    Base64(#[from] base64::DecodeError),

    /// The decoded bytes are not UTF-8 text.
    #[error("payload is not valid UTF-8: {0}")]
    Utf8(#[from] std::string::FromUtf8Error),

    /// The text is not JSON, or a member has the wrong type.
    #[error("payload is not a valid build: {0}")]
    Json(#[from] serde_json::Error),

    /// The JSON document has no `status`, or it is `null`.
    #[error("build payload has no status")]
    MissingStatus,
}

// ---------------------------------------------------------------------------
// Enrichment
// ---------------------------------------------------------------------------

/// Why commit metadata could not be attached to a build.
///
/// Never propagated past the enricher; carried in
/// [`Enrichment::Failed`](crate::Enrichment::Failed).
#[derive(Debug, Error)]
pub enum EnrichmentError {
    /// The repository name does not follow `<prefix>_<owner>_<repo>`.
    #[error("repository name '{name}' is not of the form <prefix>_<owner>_<repo>")]
    MalformedRepoName { name: String },

    /// The [`CommitLookup`](crate::CommitLookup) call failed.
    #[error("commit lookup failed: {0}")]
    Lookup(#[from] CommitLookupError),
}

/// Failures reported by a [`CommitLookup`](crate::CommitLookup) implementation.
#[derive(Debug, Error)]
pub enum CommitLookupError {
    /// The request never produced a response (DNS, TLS, timeout, ...).
    #[error("request failed: {message}")]
    Network { message: String },

    /// HTTP 404: unknown repository or commit, or a private repository the
    /// token cannot see.
    #[error("commit {sha} not found in {owner}/{repo}")]
    NotFound {
        owner: String,
        repo: String,
        sha: CommitSha,
    },

    /// The credential was rejected (HTTP 401 or 403).
    #[error("credentials rejected with status {status}")]
    Unauthorized { status: u16 },

    /// Any other non-success status; `body` holds the server's message.
    #[error("unexpected status {status}: {body}")]
    Status { status: u16, body: String },

    /// A success response whose body is not a commit object.
    #[error("response could not be parsed: {message}")]
    Parse { message: String },
}

// ---------------------------------------------------------------------------
// Delivery
// ---------------------------------------------------------------------------

/// Failures reported by a [`ChatDelivery`](crate::ChatDelivery) implementation.
#[derive(Debug, Error)]
pub enum DeliveryError {
    /// The POST never produced a response.
    #[error("webhook request failed: {message}")]
    Network { message: String },

    /// The webhook answered with a non-success status.
    #[error("webhook answered with status {status}: {body}")]
    Status { status: u16, body: String },
}

// ---------------------------------------------------------------------------
// Configuration
// ---------------------------------------------------------------------------

/// Invalid relay configuration, reported at startup.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    /// The comma-separated list contained only blanks.
    #[error("status allow-list '{value}' names no statuses")]
    EmptyStatusList { value: String },
}
