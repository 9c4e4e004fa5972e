//! # GitHub Data Source
//!
//! The data-fetch collaborator: three GraphQL query operations returning the
//! raw nullable connection structures, plus the decoders that turn them into
//! flat records.

pub mod decode;
pub mod queries;
pub mod types;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde_json::json;

use crate::error::{ChartError, Result};
pub use decode::{
    decode_commits, decode_issues, decode_pull_requests, CommitRecord, IssueRecord,
    PullRequestRecord,
};
pub use types::{
    CommitsResponse, IssueState, IssuesResponse, PullRequestState, PullRequestsResponse,
    StatusState,
};

/// Default GitHub GraphQL endpoint
pub const GITHUB_GRAPHQL_URL: &str = "https://api.github.com/graphql";

/// Typed query operations against a repository
#[async_trait]
pub trait RepoDataSource: Send + Sync {
    async fn fetch_issues(
        &self,
        owner: &str,
        name: &str,
        states: &[IssueState],
    ) -> Result<IssuesResponse>;

    async fn fetch_commits(&self, owner: &str, name: &str) -> Result<CommitsResponse>;

    async fn fetch_pull_requests(
        &self,
        owner: &str,
        name: &str,
        states: &[PullRequestState],
    ) -> Result<PullRequestsResponse>;
}

/// GraphQL client authenticated with one user's token
///
/// The `reqwest::Client` is shared across requests; only the token is per
/// client.
#[derive(Clone)]
pub struct GithubClient {
    http: reqwest::Client,
    url: String,
    token: String,
}

impl std::fmt::Debug for GithubClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GithubClient")
            .field("url", &self.url)
            .finish_non_exhaustive()
    }
}

impl GithubClient {
    pub fn new(http: reqwest::Client, url: impl Into<String>, token: impl Into<String>) -> Self {
        Self {
            http,
            url: url.into(),
            token: token.into(),
        }
    }

    async fn execute<T: DeserializeOwned>(
        &self,
        operation: &str,
        query: &str,
        variables: serde_json::Value,
    ) -> Result<T> {
        let response = self
            .http
            .post(&self.url)
            .bearer_auth(&self.token)
            .header(reqwest::header::USER_AGENT, "repochart/0.1")
            .json(&json!({ "query": query, "variables": variables }))
            .send()
            .await
            .map_err(|e| ChartError::DataFetch(format!("{}: {}", operation, e)))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ChartError::DataFetch(format!(
                "{}: GitHub returned {}: {}",
                operation,
                status,
                body.chars().take(200).collect::<String>()
            )));
        }

        let envelope: types::GraphQlResponse<T> = response
            .json()
            .await
            .map_err(|e| ChartError::upstream(format!("{}: undecodable response: {}", operation, e)))?;

        let messages = envelope
            .errors
            .unwrap_or_default()
            .into_iter()
            .map(|e| e.message)
            .collect::<Vec<_>>();

        match envelope.data {
            Some(data) => {
                if !messages.is_empty() {
                    tracing::warn!(operation, errors = ?messages, "partial GraphQL response");
                }
                Ok(data)
            }
            None => Err(ChartError::DataFetch(format!(
                "{}: {}",
                operation,
                if messages.is_empty() {
                    "response has no data".to_string()
                } else {
                    messages.join("; ")
                }
            ))),
        }
    }
}

/// GitHub treats a null state filter as "all states"
fn state_filter<T: serde::Serialize>(states: &[T]) -> serde_json::Value {
    if states.is_empty() {
        serde_json::Value::Null
    } else {
        json!(states)
    }
}

#[async_trait]
impl RepoDataSource for GithubClient {
    async fn fetch_issues(
        &self,
        owner: &str,
        name: &str,
        states: &[IssueState],
    ) -> Result<IssuesResponse> {
        self.execute(
            "GetRepoIssues",
            queries::GET_REPO_ISSUES,
            json!({ "owner": owner, "name": name, "states": state_filter(states) }),
        )
        .await
    }

    async fn fetch_commits(&self, owner: &str, name: &str) -> Result<CommitsResponse> {
        self.execute(
            "GetRepoCommits",
            queries::GET_REPO_COMMITS,
            json!({ "owner": owner, "name": name }),
        )
        .await
    }

    async fn fetch_pull_requests(
        &self,
        owner: &str,
        name: &str,
        states: &[PullRequestState],
    ) -> Result<PullRequestsResponse> {
        self.execute(
            "GetRepoPullRequests",
            queries::GET_REPO_PULL_REQUESTS,
            json!({ "owner": owner, "name": name, "states": state_filter(states) }),
        )
        .await
    }
}
