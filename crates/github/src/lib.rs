//! GitHub infrastructure adapter.
//!
//! Implements [`relay::CommitLookup`] with the GitHub REST git-data endpoint
//! `GET /repos/{owner}/{repo}/git/commits/{sha}`.
//!
//! ## Architectural Layer
//!
//! **Infrastructure.** This crate must not contain domain rules. HTTP status
//! mapping, authentication headers and response decoding live here; the
//! [`relay`] crate only sees [`relay::CommitLookupError`].

use std::time::Duration;

use async_trait::async_trait;
use relay::{CommitInfo, CommitLookup, CommitLookupError, RepoCoordinates};
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, AUTHORIZATION, USER_AGENT};
use reqwest::StatusCode;
use serde::Deserialize;
use thiserror::Error;
use tracing::{debug, instrument};

/// Public GitHub API root.
pub const DEFAULT_API_URL: &str = "https://api.github.com";

const API_VERSION: &str = "2022-11-28";

/// Errors raised while constructing a [`GithubClient`].
#[derive(Debug, Error)]
pub enum GithubError {
    /// The token cannot be sent as an `Authorization` header.
    #[error("GitHub token contains characters not allowed in a header")]
    InvalidToken,

    /// The TLS backend could not be initialised.
    #[error("failed to build HTTP client: {0}")]
    Client(#[from] reqwest::Error),
}

/// Settings for [`GithubClient`].
#[derive(Debug, Clone)]
pub struct GithubConfig {
    /// API root, without trailing slash (GitHub Enterprise: `https://host/api/v3`).
    pub api_url: String,
    /// Personal access token or installation token.
    pub token: String,
    /// Per-request timeout.
    pub timeout: Duration,
}

impl GithubConfig {
    /// Public GitHub with a 10 second timeout.
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            token: token.into(),
            timeout: Duration::from_secs(10),
        }
    }
}

/// Authenticated GitHub REST client.
#[derive(Debug, Clone)]
pub struct GithubClient {
    http: reqwest::Client,
    api_url: String,
}

impl GithubClient {
    /// Builds a client that sends `config.token` with every request.
    ///
    /// # Errors
    ///
    /// [`GithubError::InvalidToken`] if the token is not a valid header value.
    pub fn new(config: GithubConfig) -> Result<Self, GithubError> {
        let mut auth = HeaderValue::from_str(&format!("token {}", config.token))
            .map_err(|_| GithubError::InvalidToken)?;
        auth.set_sensitive(true);

        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, auth);
        headers.insert(USER_AGENT, HeaderValue::from_static("gcb-relay"));
        headers.insert(
            ACCEPT,
            HeaderValue::from_static("application/vnd.github+json"),
        );
        headers.insert(
            "X-GitHub-Api-Version",
            HeaderValue::from_static(API_VERSION),
        );

        let http = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(config.timeout)
            .build()?;

        Ok(Self {
            http,
            api_url: config.api_url.trim_end_matches('/').to_string(),
        })
    }

    fn commit_url(&self, coordinates: &RepoCoordinates) -> String {
        format!(
            "{}/repos/{}/{}/git/commits/{}",
            self.api_url, coordinates.owner, coordinates.repo, coordinates.sha
        )
    }
}

/// The `message` member GitHub puts in error bodies.
#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: String,
}

fn error_message(body: String) -> String {
    serde_json::from_str::<ErrorBody>(&body)
        .map(|e| e.message)
        .unwrap_or(body)
}

#[async_trait]
impl CommitLookup for GithubClient {
    #[instrument(skip_all, fields(commit = %coordinates))]
    async fn get_commit(
        &self,
        coordinates: &RepoCoordinates,
    ) -> Result<CommitInfo, CommitLookupError> {
        let response = self
            .http
            .get(self.commit_url(coordinates))
            .send()
            .await
            .map_err(|e| CommitLookupError::Network {
                message: e.to_string(),
            })?;

        let status = response.status();
        debug!(status = status.as_u16(), "GitHub responded");

        match status {
            s if s.is_success() => {
                response
                    .json::<CommitInfo>()
                    .await
                    .map_err(|e| CommitLookupError::Parse {
                        message: e.to_string(),
                    })
            }
            StatusCode::NOT_FOUND => Err(CommitLookupError::NotFound {
                owner: coordinates.owner.clone(),
                repo: coordinates.repo.clone(),
                sha: coordinates.sha.clone(),
            }),
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
                Err(CommitLookupError::Unauthorized {
                    status: status.as_u16(),
                })
            }
            _ => {
                let body = response.text().await.unwrap_or_default();
                Err(CommitLookupError::Status {
                    status: status.as_u16(),
                    body: error_message(body),
                })
            }
        }
    }
}
