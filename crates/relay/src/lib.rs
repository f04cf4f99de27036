//! Core domain for the Cloud Build notification relay.
//!
//! This crate turns one Pub/Sub build message into one chat message. It owns
//! every domain type, the decode → filter → enrich → format pipeline, and the
//! port traits that infrastructure crates implement to reach GitHub and the
//! chat webhook.
//!
//! ## Architectural Layer
//!
//! **Business logic + port definitions.** This crate has no I/O dependencies.
//! It defines *what* is needed; infrastructure crates define *how* to supply it.
//!
//! ## Module Layout
//!
//! | Module | Contents |
//! |--------|----------|
//! | [`identifiers`] | Newtype identifiers (`BuildId`, `CommitSha`, `InvocationId`, etc.) |
//! | [`types`] | Build event model, commit metadata, Pub/Sub message |
//! | [`message`] | Outbound chat message shape |
//! | [`errors`] | Error taxonomy for every pipeline stage |
//! | [`ports`] | `CommitLookup` and `ChatDelivery` traits |
//! | [`decoder`] | base64 + JSON event decoding |
//! | [`filter`] | Status allow-list |
//! | [`enricher`] | Best-effort commit lookup |
//! | [`formatter`] | Build event → chat message |
//! | [`duration`] | Human-readable durations |
//! | [`dispatch`] | The per-invocation pipeline driver, [`Relay`] |

pub mod decoder;
pub mod dispatch;
pub mod duration;
pub mod enricher;
pub mod errors;
pub mod filter;
pub mod formatter;
pub mod identifiers;
pub mod message;
pub mod ports;
pub mod types;

// Re-export everything at the crate root for ergonomic usage by downstream crates.
pub use decoder::decode_event;
pub use dispatch::{Outcome, Relay};
pub use duration::humanize_duration;
pub use enricher::{enrich, Enrichment};
pub use errors::{
    CommitLookupError, ConfigError, DecodeError, DeliveryError, EnrichmentError, RelayError,
};
pub use filter::StatusFilter;
pub use formatter::format_message;
pub use identifiers::{BranchName, BuildId, CommitSha, InvocationId, RepositoryName};
pub use message::{Attachment, ChatMessage, Color, Field};
pub use ports::{ChatDelivery, CommitLookup};
pub use types::{
    BuildEvent, BuildStatus, CommitAuthor, CommitInfo, PubSubMessage, RepoCoordinates,
    RepoSource, ResolvedRepoSource, Source, SourceProvenance, Timestamp,
};
