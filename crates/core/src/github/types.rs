//! Raw GraphQL response shapes.
//!
//! Every segment GitHub may null out is an `Option` here; `decode` is the only
//! place that interprets them.

use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum IssueState {
    Open,
    Closed,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PullRequestState {
    Open,
    Closed,
    Merged,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum StatusState {
    Error,
    Expected,
    Failure,
    Pending,
    Success,
}

/// GraphQL response envelope
#[derive(Debug, Deserialize)]
pub struct GraphQlResponse<T> {
    pub data: Option<T>,
    #[serde(default)]
    pub errors: Option<Vec<GraphQlError>>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GraphQlError {
    pub message: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TotalCount {
    pub total_count: i64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LabelConnection {
    pub edges: Option<Vec<Option<LabelEdge>>>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LabelEdge {
    pub node: Option<Label>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Label {
    pub name: String,
}

// === Issues ===

#[derive(Debug, Clone, Deserialize)]
pub struct IssuesResponse {
    pub repository: Option<IssuesRepository>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct IssuesRepository {
    pub issues: Option<IssueConnection>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct IssueConnection {
    pub edges: Option<Vec<Option<IssueEdge>>>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct IssueEdge {
    pub node: Option<IssueNode>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IssueNode {
    pub title: String,
    pub url: String,
    pub state: IssueState,
    pub state_reason: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(default)]
    pub comments: TotalCount,
    pub labels: Option<LabelConnection>,
}

// === Commits ===

#[derive(Debug, Clone, Deserialize)]
pub struct CommitsResponse {
    pub repository: Option<CommitsRepository>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommitsRepository {
    pub default_branch_ref: Option<BranchRef>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct BranchRef {
    pub target: Option<GitTarget>,
}

/// Target of the default branch; only commits carry a history
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "__typename")]
pub enum GitTarget {
    Commit { history: Option<CommitHistory> },
    #[serde(other)]
    Other,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CommitHistory {
    pub edges: Option<Vec<Option<CommitEdge>>>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CommitEdge {
    pub node: Option<CommitNode>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommitNode {
    pub committed_date: DateTime<Utc>,
    pub authored_date: DateTime<Utc>,
    pub author: Option<GitActor>,
    pub message: String,
    pub changed_files_if_available: Option<i64>,
    pub additions: i64,
    pub deletions: i64,
    pub status: Option<CommitStatus>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GitActor {
    pub name: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CommitStatus {
    pub state: Option<StatusState>,
}

// === Pull Requests ===

#[derive(Debug, Clone, Deserialize)]
pub struct PullRequestsResponse {
    pub repository: Option<PullRequestsRepository>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PullRequestsRepository {
    pub pull_requests: Option<PullRequestConnection>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PullRequestConnection {
    pub nodes: Option<Vec<Option<PullRequestNode>>>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PullRequestNode {
    pub url: String,
    pub merged_at: Option<DateTime<Utc>>,
    pub title: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub additions: i64,
    pub deletions: i64,
    #[serde(default)]
    pub commits: TotalCount,
    pub reviews: Option<TotalCount>,
    pub comments: Option<TotalCount>,
    pub state: PullRequestState,
    pub labels: Option<LabelConnection>,
}
