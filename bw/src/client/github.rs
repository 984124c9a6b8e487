//! GitHub REST API client implementation
//!
//! Implements the SourceControl trait with two endpoints:
//! `GET /repos/{owner}/{repo}/commits/{branch}` and
//! `GET /repos/{owner}/{repo}/compare/{base}...{head}`.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Url};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use tracing::debug;

use super::SourceControl;
use crate::config::ResolvedConfig;
use crate::domain::{CommitSummary, Comparison, FileChange, RevisionId, WatchTarget};
use crate::error::WatchError;

/// Media type selecting the JSON representation
const ACCEPT: &str = "application/vnd.github+json";

/// Author shown when the API omits commit author details
const UNKNOWN_AUTHOR: &str = "unknown";

/// GitHub API client
pub struct GitHubClient {
    token: String,
    base_url: Url,
    http: Client,
    timeout: Duration,
}

impl GitHubClient {
    /// Create a new client from resolved configuration
    ///
    /// The credential has already been checked by `Config::resolve`, so no
    /// request is ever attempted without one.
    pub fn from_config(config: &ResolvedConfig) -> Result<Self, WatchError> {
        debug!(api_url = %config.api_url, timeout = ?config.timeout, "from_config: called");
        if config.token.is_empty() {
            return Err(WatchError::Config("access token is empty".to_string()));
        }
        let base_url = Url::parse(&config.api_url)
            .map_err(|e| WatchError::Config(format!("invalid api-url {}: {}", config.api_url, e)))?;
        if base_url.cannot_be_a_base() {
            return Err(WatchError::Config(format!("invalid api-url {}", config.api_url)));
        }

        let http = Client::builder()
            .timeout(config.timeout)
            .user_agent(concat!("branchwatch/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(WatchError::Network)?;

        Ok(Self {
            token: config.token.clone(),
            base_url,
            http,
            timeout: config.timeout,
        })
    }

    /// Base URL extended with path segments, each percent-encoded on its own
    fn endpoint<'s>(&self, segments: impl IntoIterator<Item = &'s str>) -> Url {
        let mut url = self.base_url.clone();
        // cannot_be_a_base URLs are rejected in from_config
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }

    /// `/repos/{owner}/{repo}/commits/{branch}`; `/` in the branch stays a separator
    fn commit_url(&self, target: &WatchTarget) -> Url {
        let head = ["repos", target.owner.as_str(), target.repo.as_str(), "commits"];
        self.endpoint(head.into_iter().chain(target.branch.split('/')))
    }

    fn compare_url(&self, target: &WatchTarget, from: &RevisionId, to: &RevisionId) -> Url {
        let range = format!("{}...{}", from, to);
        self.endpoint(["repos", target.owner.as_str(), target.repo.as_str(), "compare", range.as_str()])
    }

    /// Authenticated GET, decoding the JSON body on success
    async fn get_json<T: DeserializeOwned>(&self, url: Url) -> Result<T, WatchError> {
        debug!(%url, "get_json: called");
        let response = self
            .http
            .get(url.clone())
            .header("Authorization", format!("token {}", self.token))
            .header("Accept", ACCEPT)
            .send()
            .await
            .map_err(|e| self.transport_error(e))?;

        let status = response.status().as_u16();
        let body = response.text().await.map_err(|e| self.transport_error(e))?;

        if status >= 400 {
            debug!(%status, "get_json: API error");
            return Err(WatchError::from_status(status, body));
        }

        debug!(%status, body_len = body.len(), "get_json: success");
        serde_json::from_str(&body).map_err(|e| WatchError::InvalidResponse(format!("{}: {}", url, e)))
    }

    fn transport_error(&self, e: reqwest::Error) -> WatchError {
        if e.is_timeout() {
            debug!(timeout = ?self.timeout, "transport_error: timed out");
            WatchError::Timeout(self.timeout)
        } else {
            debug!(error = %e, "transport_error: network error");
            WatchError::Network(e)
        }
    }
}

#[async_trait]
impl SourceControl for GitHubClient {
    async fn tip_revision(&self, target: &WatchTarget) -> Result<RevisionId, WatchError> {
        debug!(watch = %target, "tip_revision: called");
        let commit: CommitRef = self.get_json(self.commit_url(target)).await?;
        Ok(RevisionId::new(commit.sha))
    }

    async fn compare(
        &self,
        target: &WatchTarget,
        from: &RevisionId,
        to: &RevisionId,
    ) -> Result<Comparison, WatchError> {
        debug!(watch = %target, %from, %to, "compare: called");
        let response: CompareResponse = self.get_json(self.compare_url(target, from, to)).await?;
        Ok(response.into())
    }
}

// GitHub API response types

#[derive(Debug, Deserialize)]
struct CommitRef {
    sha: String,
}

#[derive(Debug, Deserialize)]
struct CompareResponse {
    #[serde(default)]
    ahead_by: u64,
    #[serde(default)]
    commits: Vec<ApiCommit>,
    #[serde(default)]
    files: Vec<ApiFile>,
}

#[derive(Debug, Deserialize)]
struct ApiCommit {
    sha: String,
    commit: ApiCommitDetail,
}

#[derive(Debug, Deserialize)]
struct ApiCommitDetail {
    #[serde(default)]
    message: String,
    author: Option<ApiAuthor>,
}

#[derive(Debug, Deserialize)]
struct ApiAuthor {
    name: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ApiFile {
    filename: String,
    status: String,
}

impl From<CompareResponse> for Comparison {
    fn from(response: CompareResponse) -> Self {
        let commits = response
            .commits
            .into_iter()
            .map(|c| {
                let author = c
                    .commit
                    .author
                    .and_then(|a| a.name)
                    .unwrap_or_else(|| UNKNOWN_AUTHOR.to_string());
                CommitSummary::new(c.sha, &c.commit.message, author)
            })
            .collect();

        let files = response
            .files
            .into_iter()
            .map(|f| FileChange::new(f.filename, f.status))
            .collect();

        Comparison {
            ahead_by: response.ahead_by,
            commits,
            files,
        }
    }
}
