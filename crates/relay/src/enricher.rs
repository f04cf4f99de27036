//! Best-effort commit enrichment.
//!
//! Looking up the commit is optional: no configured client, no repository
//! source, or no resolved commit all yield [`Enrichment::Unavailable`]. Any
//! failure after that point is logged and returned as
//! [`Enrichment::Failed`]; it never aborts the invocation.

use tracing::{debug, warn};

use crate::{BuildEvent, CommitInfo, CommitLookup, EnrichmentError, RepoCoordinates};

/// Result of trying to attach commit metadata to a build.
#[derive(Debug)]
pub enum Enrichment {
    /// The lookup succeeded.
    Found(CommitInfo),
    /// Nothing to look up, or no client configured.
    Unavailable,
    /// A lookup was attempted and failed; the build is still relayed.
    Failed(EnrichmentError),
}

impl Enrichment {
    /// The commit, if the lookup succeeded. Every other state means "no data".
    pub fn commit(&self) -> Option<&CommitInfo> {
        match self {
            Self::Found(commit) => Some(commit),
            Self::Unavailable | Self::Failed(_) => None,
        }
    }
}

/// Looks up the commit a build was resolved to.
pub async fn enrich(event: &BuildEvent, lookup: Option<&dyn CommitLookup>) -> Enrichment {
    let Some(lookup) = lookup else {
        debug!("no commit lookup configured");
        return Enrichment::Unavailable;
    };
    let repo_name = event.repo_source().and_then(|r| r.repo_name.as_ref());
    let (Some(repo_name), Some(sha)) = (repo_name, event.commit_sha()) else {
        debug!(build_id = event.display_id(), "build has no repository source or resolved commit");
        return Enrichment::Unavailable;
    };

    let coordinates = match RepoCoordinates::parse(repo_name, sha.clone()) {
        Ok(coordinates) => coordinates,
        Err(err) => {
            warn!(build_id = event.display_id(), error = %err, "skipping commit enrichment");
            return Enrichment::Failed(err);
        }
    };

    match lookup.get_commit(&coordinates).await {
        Ok(commit) => {
            debug!(commit = %coordinates, "commit metadata fetched");
            Enrichment::Found(commit)
        }
        Err(err) => {
            warn!(
                build_id = event.display_id(),
                commit = %coordinates,
                error = %err,
                "commit lookup failed; continuing without commit data"
            );
            Enrichment::Failed(err.into())
        }
    }
}
