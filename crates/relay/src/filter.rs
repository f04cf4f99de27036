//! Status allow-list.

use std::str::FromStr;

use crate::{BuildStatus, ConfigError};

/// The set of build statuses that produce a chat message.
///
/// Builds in any other status are dropped silently.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusFilter {
    allowed: Vec<BuildStatus>,
}

impl StatusFilter {
    /// Creates a filter allowing exactly `statuses`.
    pub fn new(statuses: impl IntoIterator<Item = BuildStatus>) -> Self {
        let mut allowed = Vec::new();
        for status in statuses {
            if !allowed.contains(&status) {
                allowed.push(status);
            }
        }
        Self { allowed }
    }

    /// Returns `true` if builds in `status` should be relayed.
    pub fn allows(&self, status: &BuildStatus) -> bool {
        self.allowed.contains(status)
    }

    /// The allowed statuses, in first-seen order.
    pub fn statuses(&self) -> &[BuildStatus] {
        &self.allowed
    }
}

impl Default for StatusFilter {
    /// Final statuses only: SUCCESS, FAILURE, INTERNAL_ERROR, TIMEOUT.
    fn default() -> Self {
        Self::new([
            BuildStatus::Success,
            BuildStatus::Failure,
            BuildStatus::InternalError,
            BuildStatus::Timeout,
        ])
    }
}

impl FromStr for StatusFilter {
    type Err = ConfigError;

    /// Parses a comma-separated list such as `"SUCCESS, FAILURE"`.
    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let filter = Self::new(
            value
                .split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(BuildStatus::from),
        );
        if filter.allowed.is_empty() {
            return Err(ConfigError::EmptyStatusList {
                value: value.to_string(),
            });
        }
        Ok(filter)
    }
}
