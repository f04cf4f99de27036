//! Value types for the relay domain.
//!
//! [`BuildEvent`] mirrors the subset of the Cloud Build `Build` resource the
//! relay reads. Every member other than `status` is optional on the wire and
//! may also be `null`; unknown members are ignored. [`CommitInfo`] mirrors the GitHub git
//! commit object, again keeping every member the relay displays optional so a
//! surprising response shape is a checked state rather than a fault.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

use crate::{BranchName, BuildId, CommitSha, EnrichmentError, RepositoryName};

// ---------------------------------------------------------------------------
// Build status
// ---------------------------------------------------------------------------

/// Lifecycle status of a build.
///
/// Cloud Build may emit statuses beyond the ones the relay treats specially
/// (`CANCELLED`, `EXPIRED`, `STATUS_UNKNOWN`, ...). Those are kept verbatim in
/// [`BuildStatus::Other`] so they can still be displayed and filtered.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum BuildStatus {
    /// Accepted and waiting for a worker.
    Queued,
    /// Executing.
    Working,
    /// All steps completed successfully.
    Success,
    /// A step exited non-zero.
    Failure,
    /// The build exceeded its timeout.
    Timeout,
    /// Cloud Build itself failed while running the build.
    InternalError,
    /// Any other status string, kept verbatim.
    Other(String),
}

impl BuildStatus {
    /// Returns the raw status string as it appears in the build payload.
    pub fn as_str(&self) -> &str {
        match self {
            Self::Queued => "QUEUED",
            Self::Working => "WORKING",
            Self::Success => "SUCCESS",
            Self::Failure => "FAILURE",
            Self::Timeout => "TIMEOUT",
            Self::InternalError => "INTERNAL_ERROR",
            Self::Other(raw) => raw,
        }
    }
}

impl From<String> for BuildStatus {
    fn from(raw: String) -> Self {
        match raw.as_str() {
            "QUEUED" => Self::Queued,
            "WORKING" => Self::Working,
            "SUCCESS" => Self::Success,
            "FAILURE" => Self::Failure,
            "TIMEOUT" => Self::Timeout,
            "INTERNAL_ERROR" => Self::InternalError,
            _ => Self::Other(raw),
        }
    }
}

impl From<&str> for BuildStatus {
    fn from(raw: &str) -> Self {
        Self::from(raw.to_string())
    }
}

impl From<BuildStatus> for String {
    fn from(status: BuildStatus) -> Self {
        match status {
            BuildStatus::Other(raw) => raw,
            known => known.as_str().to_string(),
        }
    }
}

impl std::fmt::Display for BuildStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Time
// ---------------------------------------------------------------------------

/// A UTC wall-clock timestamp.
///
/// Wraps [`chrono::DateTime<Utc>`] so callers never depend on `chrono` types
/// directly. Deserialises from RFC 3339 (Cloud Build emits nanosecond
/// precision, e.g. `"2024-05-01T10:00:00.123456789Z"`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Timestamp(DateTime<Utc>);

impl Timestamp {
    /// Creates a [`Timestamp`] from a [`DateTime<Utc>`].
    pub fn from_utc(dt: DateTime<Utc>) -> Self {
        Self(dt)
    }

    /// Milliseconds since the Unix epoch.
    pub fn epoch_millis(self) -> i64 {
        self.0.timestamp_millis()
    }

    /// Seconds since the Unix epoch, rounded to the nearest second (halves up).
    pub fn epoch_seconds_rounded(self) -> i64 {
        let millis = self.epoch_millis();
        millis.div_euclid(1000) + i64::from(millis.rem_euclid(1000) >= 500)
    }

    /// Absolute number of milliseconds between `self` and `other`.
    ///
    /// Order does not matter: a finish time recorded before its start time
    /// (clock skew) still yields the size of the gap.
    pub fn millis_between(self, other: Timestamp) -> u64 {
        (self.epoch_millis() - other.epoch_millis()).unsigned_abs()
    }
}

impl std::fmt::Display for Timestamp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0.to_rfc3339())
    }
}

// ---------------------------------------------------------------------------
// Build event
// ---------------------------------------------------------------------------

/// A decoded build status notification.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BuildEvent {
    /// Build id. Absent ids are tolerated and rendered as `unknown`.
    #[serde(default)]
    pub id: Option<BuildId>,

    /// Current lifecycle status; the only member that must be present.
    pub status: BuildStatus,

    /// When the build started executing. Absent while the build is queued.
    #[serde(default)]
    pub start_time: Option<Timestamp>,

    /// When the build finished. Absent until the build reaches a final status.
    #[serde(default)]
    pub finish_time: Option<Timestamp>,

    /// Console URL of the build logs.
    #[serde(default, deserialize_with = "null_as_default")]
    pub log_url: String,

    /// The source the build was requested with.
    #[serde(default)]
    pub source: Option<Source>,

    /// The source after Cloud Build resolved branches and tags to a commit.
    #[serde(default)]
    pub source_provenance: Option<SourceProvenance>,

    /// Free-form build tags.
    #[serde(default, deserialize_with = "null_as_default")]
    pub tags: Vec<String>,
}

/// Treats an explicit `null` like a missing member.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

impl BuildEvent {
    /// The build id for display, `unknown` when the payload had none.
    pub fn display_id(&self) -> &str {
        self.id.as_ref().map_or("unknown", BuildId::as_str)
    }

    /// Returns `true` while the build is executing.
    pub fn is_working(&self) -> bool {
        self.status == BuildStatus::Working
    }

    /// The repository source block, if the build was triggered from a repository.
    pub fn repo_source(&self) -> Option<&RepoSource> {
        self.source.as_ref()?.repo_source.as_ref()
    }

    /// The commit Cloud Build resolved the source to, if known.
    pub fn commit_sha(&self) -> Option<&CommitSha> {
        self.source_provenance
            .as_ref()?
            .resolved_repo_source
            .as_ref()?
            .commit_sha
            .as_ref()
    }

    /// Returns `true` if the build carries `tag` verbatim.
    pub fn has_tag(&self, tag: &str) -> bool {
        self.tags.iter().any(|t| t == tag)
    }
}

/// Where the build's source came from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Source {
    /// Present when the build was triggered from a repository.
    #[serde(default)]
    pub repo_source: Option<RepoSource>,
}

/// A Cloud Source Repositories location.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RepoSource {
    /// Mirrored repository name, e.g. `github_acme_webapp`.
    #[serde(default)]
    pub repo_name: Option<RepositoryName>,

    /// Absent when the trigger names a tag or commit instead of a branch.
    #[serde(default)]
    pub branch_name: Option<BranchName>,
}

/// The resolved form of the build's source.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SourceProvenance {
    /// Resolved form of [`Source::repo_source`].
    #[serde(default)]
    pub resolved_repo_source: Option<ResolvedRepoSource>,
}

/// A repository source pinned to one commit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolvedRepoSource {
    /// The commit the build actually ran against.
    #[serde(default)]
    pub commit_sha: Option<CommitSha>,
}

// ---------------------------------------------------------------------------
// Commit metadata
// ---------------------------------------------------------------------------

/// Commit metadata returned by the source-control host.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommitInfo {
    pub sha: CommitSha,

    /// Git author block; GitHub omits it for some synthetic commits.
    #[serde(default)]
    pub author: Option<CommitAuthor>,
}

impl CommitInfo {
    /// The commit author's display name, if the response carried one.
    pub fn author_name(&self) -> Option<&str> {
        self.author
            .as_ref()?
            .name
            .as_deref()
            .filter(|name| !name.is_empty())
    }
}

/// The author recorded in the commit object.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommitAuthor {
    #[serde(default)]
    pub name: Option<String>,

    #[serde(default)]
    pub email: Option<String>,

    #[serde(default)]
    pub date: Option<DateTime<Utc>>,
}

/// The `(owner, repo, sha)` triple used to look a commit up on GitHub.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RepoCoordinates {
    /// GitHub user or organisation.
    pub owner: String,
    /// Repository name under `owner`.
    pub repo: String,
    /// Commit to fetch.
    pub sha: CommitSha,
}

impl RepoCoordinates {
    /// Parses a mirrored repository name of the form `<prefix>_<owner>_<repo>`.
    ///
    /// The prefix is discarded and segments after the third are ignored.
    /// Fewer than three segments, or an empty owner or repo, is malformed.
    pub fn parse(repo_name: &RepositoryName, sha: CommitSha) -> Result<Self, EnrichmentError> {
        let mut segments = repo_name.as_str().split('_');
        let _prefix = segments.next();
        match (segments.next(), segments.next()) {
            (Some(owner), Some(repo)) if !owner.is_empty() && !repo.is_empty() => Ok(Self {
                owner: owner.to_string(),
                repo: repo.to_string(),
                sha,
            }),
            _ => Err(EnrichmentError::MalformedRepoName {
                name: repo_name.to_string(),
            }),
        }
    }
}

impl std::fmt::Display for RepoCoordinates {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}@{}", self.owner, self.repo, self.sha)
    }
}

// ---------------------------------------------------------------------------
// Incoming message
// ---------------------------------------------------------------------------

/// One Pub/Sub message as delivered to the relay.
///
/// `data` holds the base64-encoded build resource; the remaining members are
/// only used for logging.
///
/// Push deliveries carry each metadata member twice (`messageId` and
/// `message_id`). Only the camelCase spelling is read; the snake_case twins
/// fall under "unknown members are ignored".
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PubSubMessage {
    /// Base64-encoded payload.
    pub data: String,

    /// Server-assigned message id.
    #[serde(default)]
    pub message_id: Option<String>,

    /// RFC 3339 time the message was published.
    #[serde(default)]
    pub publish_time: Option<String>,

    /// Publisher attributes (`buildId`, `status`).
    #[serde(default)]
    pub attributes: HashMap<String, String>,
}

impl PubSubMessage {
    /// Wraps an already-encoded payload with no metadata.
    pub fn from_data(data: impl Into<String>) -> Self {
        Self {
            data: data.into(),
            message_id: None,
            publish_time: None,
            attributes: HashMap::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn repo(name: &str) -> RepositoryName {
        RepositoryName::new(name).unwrap()
    }

    fn sha(value: &str) -> CommitSha {
        CommitSha::new(value).unwrap()
    }

    #[test]
    fn test_status_round_trips_known_and_unknown_values() {
        assert_eq!(BuildStatus::from("INTERNAL_ERROR"), BuildStatus::InternalError);
        assert_eq!(
            BuildStatus::from("CANCELLED"),
            BuildStatus::Other("CANCELLED".to_string())
        );
        assert_eq!(BuildStatus::Other("EXPIRED".into()).as_str(), "EXPIRED");
        assert_eq!(
            serde_json::to_string(&BuildStatus::Timeout).unwrap(),
            "\"TIMEOUT\""
        );
    }

    #[test]
    fn test_repo_coordinates_from_three_segments() {
        let coords = RepoCoordinates::parse(&repo("prefix_acme_webapp"), sha("abc123")).unwrap();
        assert_eq!(coords.owner, "acme");
        assert_eq!(coords.repo, "webapp");
        assert_eq!(coords.sha.as_str(), "abc123");
    }

    #[test]
    fn test_repo_coordinates_ignore_extra_segments() {
        let coords = RepoCoordinates::parse(&repo("github_acme_web_app"), sha("abc")).unwrap();
        assert_eq!(coords.owner, "acme");
        assert_eq!(coords.repo, "web");
    }

    #[test]
    fn test_repo_coordinates_reject_two_segments() {
        let err = RepoCoordinates::parse(&repo("onlytwo_parts"), sha("abc")).unwrap_err();
        assert!(matches!(err, EnrichmentError::MalformedRepoName { ref name } if name == "onlytwo_parts"));
    }

    #[test]
    fn test_repo_coordinates_reject_empty_owner() {
        assert!(RepoCoordinates::parse(&repo("github__webapp"), sha("abc")).is_err());
    }

    #[test]
    fn test_epoch_seconds_round_half_up() {
        let at = |s: &str| Timestamp::from_utc(s.parse::<DateTime<Utc>>().unwrap());
        assert_eq!(at("1970-01-01T00:00:01.499Z").epoch_seconds_rounded(), 1);
        assert_eq!(at("1970-01-01T00:00:01.500Z").epoch_seconds_rounded(), 2);
    }

    #[test]
    fn test_millis_between_is_absolute() {
        let start = Timestamp::from_utc("2024-01-01T00:00:10Z".parse().unwrap());
        let finish = Timestamp::from_utc("2024-01-01T00:00:00Z".parse().unwrap());
        assert_eq!(finish.millis_between(start), 10_000);
        assert_eq!(start.millis_between(finish), 10_000);
    }

    #[test]
    fn test_push_message_with_both_metadata_spellings() {
        let message: PubSubMessage = serde_json::from_str(
            r#"{
                "data": "e30=",
                "messageId": "2070443601311540",
                "message_id": "2070443601311540",
                "publishTime": "2024-05-01T10:02:06.000Z",
                "publish_time": "2024-05-01T10:02:06.000Z"
            }"#,
        )
        .unwrap();
        assert_eq!(message.data, "e30=");
        assert_eq!(message.message_id.as_deref(), Some("2070443601311540"));
        assert_eq!(message.publish_time.as_deref(), Some("2024-05-01T10:02:06.000Z"));
        assert!(message.attributes.is_empty());
    }

    #[test]
    fn test_build_event_tolerates_nulls_and_missing_id() {
        let event: BuildEvent = serde_json::from_str(
            r#"{"status":"SUCCESS","tags":null,"logUrl":null,"source":null}"#,
        )
        .unwrap();
        assert!(event.id.is_none());
        assert_eq!(event.display_id(), "unknown");
        assert!(event.tags.is_empty());
        assert_eq!(event.log_url, "");
        assert!(!event.has_tag("deploy"));
    }

    #[test]
    fn test_author_name_missing_is_none() {
        let commit: CommitInfo = serde_json::from_str(r#"{"sha":"abc","author":{}}"#).unwrap();
        assert_eq!(commit.author_name(), None);
        let commit: CommitInfo =
            serde_json::from_str(r#"{"sha":"abc","author":{"name":"Ada"}}"#).unwrap();
        assert_eq!(commit.author_name(), Some("Ada"));
    }
}
