//! # Response Decoding
//!
//! Validates the expected shape of each GraphQL response in one place and
//! projects every item into a flat record.
//!
//! A missing `repository` or connection is an upstream contract violation
//! (`UpstreamData`). Null edges and nodes inside a present connection are
//! skipped.

use chrono::{DateTime, Utc};
use serde::Serialize;

use super::types::{
    CommitsResponse, GitTarget, IssueState, IssuesResponse, LabelConnection, PullRequestState,
    PullRequestsResponse, StatusState,
};
use crate::error::{ChartError, Result};

/// Flat issue row
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct IssueRecord {
    pub url: String,
    pub title: String,
    pub state: IssueState,
    pub state_reason: Option<String>,
    pub comments_count: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub labels: Vec<String>,
}

/// Flat commit row
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct CommitRecord {
    pub committed_date: DateTime<Utc>,
    pub authored_date: DateTime<Utc>,
    pub author: Option<String>,
    pub message: String,
    pub changed_files_if_available: i64,
    pub additions: i64,
    pub deletions: i64,
    pub status: StatusState,
}

/// Flat pull request row
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct PullRequestRecord {
    pub url: String,
    pub merged_at: Option<DateTime<Utc>>,
    pub title: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub additions: i64,
    pub deletions: i64,
    pub commits: i64,
    pub reviews: i64,
    pub comments: i64,
    pub state: PullRequestState,
    pub labels: Vec<String>,
}

pub fn decode_issues(response: IssuesResponse) -> Result<Vec<IssueRecord>> {
    let edges = response
        .repository
        .ok_or_else(|| missing("repository"))?
        .issues
        .ok_or_else(|| missing("repository.issues"))?
        .edges
        .ok_or_else(|| missing("repository.issues.edges"))?;

    Ok(edges
        .into_iter()
        .flatten()
        .filter_map(|edge| edge.node)
        .map(|node| IssueRecord {
            url: node.url,
            title: node.title,
            state: node.state,
            state_reason: node.state_reason,
            comments_count: node.comments.total_count,
            created_at: node.created_at,
            updated_at: node.updated_at,
            labels: label_names(node.labels),
        })
        .collect())
}

pub fn decode_commits(response: CommitsResponse) -> Result<Vec<CommitRecord>> {
    let target = response
        .repository
        .ok_or_else(|| missing("repository"))?
        .default_branch_ref
        .ok_or_else(|| missing("repository.defaultBranchRef"))?
        .target
        .ok_or_else(|| missing("repository.defaultBranchRef.target"))?;

    let history = match target {
        GitTarget::Commit { history } => {
            history.ok_or_else(|| missing("repository.defaultBranchRef.target.history"))?
        }
        GitTarget::Other => {
            return Err(ChartError::upstream(
                "default branch does not point at a commit",
            ))
        }
    };
    let edges = history
        .edges
        .ok_or_else(|| missing("repository.defaultBranchRef.target.history.edges"))?;

    Ok(edges
        .into_iter()
        .flatten()
        .filter_map(|edge| edge.node)
        .map(|node| CommitRecord {
            committed_date: node.committed_date,
            authored_date: node.authored_date,
            author: node.author.and_then(|a| a.name),
            message: node.message,
            changed_files_if_available: node.changed_files_if_available.unwrap_or(0),
            additions: node.additions,
            deletions: node.deletions,
            status: node
                .status
                .and_then(|s| s.state)
                .unwrap_or(StatusState::Pending),
        })
        .collect())
}

pub fn decode_pull_requests(response: PullRequestsResponse) -> Result<Vec<PullRequestRecord>> {
    let nodes = response
        .repository
        .ok_or_else(|| missing("repository"))?
        .pull_requests
        .ok_or_else(|| missing("repository.pullRequests"))?
        .nodes
        .ok_or_else(|| missing("repository.pullRequests.nodes"))?;

    Ok(nodes
        .into_iter()
        .flatten()
        .map(|node| PullRequestRecord {
            url: node.url,
            merged_at: node.merged_at,
            title: node.title,
            created_at: node.created_at,
            updated_at: node.updated_at,
            additions: node.additions,
            deletions: node.deletions,
            commits: node.commits.total_count,
            reviews: node.reviews.map(|r| r.total_count).unwrap_or(0),
            comments: node.comments.map(|c| c.total_count).unwrap_or(0),
            state: node.state,
            labels: label_names(node.labels),
        })
        .collect())
}

fn label_names(labels: Option<LabelConnection>) -> Vec<String> {
    labels
        .and_then(|l| l.edges)
        .unwrap_or_default()
        .into_iter()
        .flatten()
        .filter_map(|edge| edge.node)
        .map(|label| label.name)
        .collect()
}

fn missing(path: &str) -> ChartError {
    ChartError::upstream(format!("response is missing `{}`", path))
}
