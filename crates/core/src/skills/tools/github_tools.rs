//! # GitHub Data-Fetch Tools
//!
//! Issues, commits and pull requests of one repository, latest 100 each,
//! flattened into records. The last successful result of each tool is kept
//! in the [`FetchLog`] so `create_dataset` can commit it as-is by naming the
//! tool.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::Mutex;

use super::ToolSpec;
use crate::error::{ChartError, Result};
use crate::github::{
    decode_commits, decode_issues, decode_pull_requests, IssueState, PullRequestState,
    RepoDataSource,
};
use crate::state::{outputs::into_records, Record};

pub const ISSUES_TOOL: &str = "get_repo_issues";
pub const COMMITS_TOOL: &str = "get_repo_commits";
pub const PULL_REQUESTS_TOOL: &str = "get_repo_pull_requests";

/// Arguments for the issue fetch
#[derive(Debug, Deserialize, JsonSchema)]
pub struct IssuesArgs {
    /// Repository owner
    pub owner: String,
    /// Repository name
    pub name: String,
    /// Issue states to include (all when empty)
    #[serde(default)]
    pub states: Vec<IssueState>,
}

/// Arguments for the commit fetch
#[derive(Debug, Deserialize, JsonSchema)]
pub struct CommitsArgs {
    /// Repository owner
    pub owner: String,
    /// Repository name
    pub name: String,
}

/// Arguments for the pull request fetch
#[derive(Debug, Deserialize, JsonSchema)]
pub struct PullRequestsArgs {
    /// Repository owner
    pub owner: String,
    /// Repository name
    pub name: String,
    /// Pull request states to include (all when empty)
    #[serde(default)]
    pub states: Vec<PullRequestState>,
}

/// What the data-fetch tools produced during one analyst run.
///
/// The model only sees tool results and error messages; the analyst reads
/// the typed errors and the fetched rows back from here once the reasoning
/// loop is over.
#[derive(Debug, Clone, Default)]
pub struct FetchLog {
    inner: Arc<Mutex<LogInner>>,
}

#[derive(Debug, Default)]
struct LogInner {
    errors: Vec<ChartError>,
    fetched: HashMap<String, Vec<Record>>,
}

impl FetchLog {
    pub fn new() -> Self {
        Self::default()
    }

    async fn record(&self, tool: &str, result: Result<Vec<Record>>) -> Result<Value> {
        let mut inner = self.inner.lock().await;
        match result {
            Ok(rows) => {
                let value = json!({ "records": rows });
                inner.fetched.insert(tool.to_string(), rows);
                Ok(value)
            }
            Err(e) => {
                inner.errors.push(e.clone());
                Err(e)
            }
        }
    }

    /// Data errors recorded so far, oldest first
    pub async fn errors(&self) -> Vec<ChartError> {
        self.inner.lock().await.errors.clone()
    }

    /// Last successful result of `tool`
    pub async fn fetched(&self, tool: &str) -> Option<Vec<Record>> {
        self.inner.lock().await.fetched.get(tool).cloned()
    }
}

fn records<T: Serialize>(items: Vec<T>) -> Result<Vec<Record>> {
    let values = items
        .into_iter()
        .map(serde_json::to_value)
        .collect::<std::result::Result<Vec<_>, _>>()?;
    into_records(values)
}

/// The three data-fetch tools, bound to one data source
pub fn data_tools(source: Arc<dyn RepoDataSource>, log: FetchLog) -> Vec<ToolSpec> {
    vec![
        issues_tool(Arc::clone(&source), log.clone()),
        commits_tool(Arc::clone(&source), log.clone()),
        pull_requests_tool(source, log),
    ]
}

fn issues_tool(source: Arc<dyn RepoDataSource>, log: FetchLog) -> ToolSpec {
    ToolSpec::new(
        ISSUES_TOOL,
        "Fetch the latest 100 issues of a repository. Args: {\"owner\": \"...\", \"name\": \"...\", \
         \"states\": [\"OPEN\" | \"CLOSED\"]}. Returns {\"records\": [...]} with url, title, state, \
         state_reason, comments_count, created_at, updated_at and labels.",
        move |args: IssuesArgs| {
            let source = Arc::clone(&source);
            let log = log.clone();
            async move {
                tracing::info!(owner = %args.owner, name = %args.name, "Fetching issues");
                let fetched: Result<Vec<Record>> = async {
                    let response = source.fetch_issues(&args.owner, &args.name, &args.states).await?;
                    records(decode_issues(response)?)
                }
                .await;
                log.record(ISSUES_TOOL, fetched).await
            }
        },
    )
}

fn commits_tool(source: Arc<dyn RepoDataSource>, log: FetchLog) -> ToolSpec {
    ToolSpec::new(
        COMMITS_TOOL,
        "Fetch the latest 100 commits on the default branch. Args: {\"owner\": \"...\", \"name\": \
         \"...\"}. Returns {\"records\": [...]} with committed_date, authored_date, author, message, \
         changed_files_if_available, additions, deletions and status.",
        move |args: CommitsArgs| {
            let source = Arc::clone(&source);
            let log = log.clone();
            async move {
                tracing::info!(owner = %args.owner, name = %args.name, "Fetching commits");
                let fetched: Result<Vec<Record>> = async {
                    let response = source.fetch_commits(&args.owner, &args.name).await?;
                    records(decode_commits(response)?)
                }
                .await;
                log.record(COMMITS_TOOL, fetched).await
            }
        },
    )
}

fn pull_requests_tool(source: Arc<dyn RepoDataSource>, log: FetchLog) -> ToolSpec {
    ToolSpec::new(
        PULL_REQUESTS_TOOL,
        "Fetch the latest 100 pull requests of a repository. Args: {\"owner\": \"...\", \"name\": \
         \"...\", \"states\": [\"OPEN\" | \"CLOSED\" | \"MERGED\"]}. Returns {\"records\": [...]} \
         with url, merged_at, title, created_at, updated_at, additions, deletions, commits, \
         reviews, comments, state and labels.",
        move |args: PullRequestsArgs| {
            let source = Arc::clone(&source);
            let log = log.clone();
            async move {
                tracing::info!(owner = %args.owner, name = %args.name, "Fetching pull requests");
                let fetched: Result<Vec<Record>> = async {
                    let response = source
                        .fetch_pull_requests(&args.owner, &args.name, &args.states)
                        .await?;
                    records(decode_pull_requests(response)?)
                }
                .await;
                log.record(PULL_REQUESTS_TOOL, fetched).await
            }
        },
    )
}
