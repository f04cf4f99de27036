//! Newtype domain identifiers.
//!
//! Build ids, commit SHAs, repository and branch names all arrive as plain
//! strings in the build payload. Wrapping each in its own type keeps a
//! [`CommitSha`] from being passed where a [`BuildId`] is expected.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

// ---------------------------------------------------------------------------
// Macro for String-wrapped newtypes.
// Generates: struct, new() returning Option<Self>, as_str(), Display.
// ---------------------------------------------------------------------------
macro_rules! string_id {
    (
        $(#[$attr:meta])*
        $name:ident
    ) => {
        $(#[$attr])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub struct $name(String);

        impl $name {
            /// Creates a new identifier, returning `None` if the value is empty.
            pub fn new(value: impl Into<String>) -> Option<Self> {
                let v = value.into();
                if v.is_empty() { None } else { Some(Self(v)) }
            }

            /// Returns the identifier as a string slice.
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

// ---------------------------------------------------------------------------
// Identifiers: String-backed (taken verbatim from the build payload)
// ---------------------------------------------------------------------------

string_id! {
    /// Identifies a Cloud Build run (the `id` member of the build resource).
    BuildId
}

string_id! {
    /// A Git commit SHA as resolved by Cloud Build or returned by GitHub.
    CommitSha
}

string_id! {
    /// A Cloud Source Repositories name.
    ///
    /// Mirrored GitHub repositories are named `<prefix>_<owner>_<repo>`,
    /// e.g. `"github_acme_webapp"`.
    RepositoryName
}

string_id! {
    /// A Git branch name (e.g. `"main"`).
    BranchName
}

// ---------------------------------------------------------------------------
// Identifiers: UUID-backed (internally generated)
// ---------------------------------------------------------------------------

/// Identifies one relay invocation (one incoming message).
///
/// Generated fresh for every message and attached to the dispatch span so all
/// log lines from a single invocation can be correlated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct InvocationId(Uuid);

impl InvocationId {
    /// Generates a new random invocation identifier.
    pub fn new_random() -> Self {
        Self(Uuid::new_v4())
    }
}

impl std::fmt::Display for InvocationId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}
