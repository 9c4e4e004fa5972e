//! Scripted collaborators for driving the graph without a model or network.

#![allow(dead_code)]

use async_trait::async_trait;
use serde_json::{json, Value};
use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;

use repochart_core::github::{
    CommitsResponse, IssueState, IssuesResponse, PullRequestState, PullRequestsResponse,
    RepoDataSource,
};
use repochart_core::reasoning::{ReasoningRequest, ReasoningService, StructuredOutput};
use repochart_core::skills::tools::OutputTool;
use repochart_core::state::{ArtifactStore, DatasetStore, Message, Record, RepoKey};
use repochart_core::{ChartError, Result};

/// What the scripted model does on one call
#[derive(Debug, Clone)]
pub enum Step {
    /// Commit this payload through the output tool
    Output(Value),
    /// Call a tool, then commit a reference to its result
    UseTool { tool: &'static str, args: Value },
    /// Call a tool, ignore its result, then commit `output`
    CallToolThen {
        tool: &'static str,
        args: Value,
        output: Value,
    },
    /// Fail the call
    Fail(ChartError),
}

/// One recorded reasoning call
#[derive(Debug, Clone)]
pub struct RecordedCall {
    pub agent: &'static str,
    pub input: String,
    pub history: Vec<Message>,
    pub tools: Vec<&'static str>,
    pub output_tool: &'static str,
}

/// Reasoning service answering from per-agent scripts
#[derive(Default)]
pub struct ScriptedReasoning {
    scripts: Mutex<HashMap<&'static str, VecDeque<Step>>>,
    fallback: Mutex<HashMap<&'static str, Step>>,
    calls: Mutex<Vec<RecordedCall>>,
}

impl ScriptedReasoning {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue steps for an agent, consumed one per call
    pub fn script(self, agent: &'static str, steps: impl IntoIterator<Item = Step>) -> Self {
        self.scripts
            .lock()
            .unwrap()
            .entry(agent)
            .or_default()
            .extend(steps);
        self
    }

    /// Step used once an agent's queue is empty
    pub fn repeat(self, agent: &'static str, step: Step) -> Self {
        self.fallback.lock().unwrap().insert(agent, step);
        self
    }

    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls.lock().unwrap().clone()
    }

    pub fn calls_for(&self, agent: &str) -> Vec<RecordedCall> {
        self.calls()
            .into_iter()
            .filter(|call| call.agent == agent)
            .collect()
    }

    fn next_step(&self, agent: &'static str) -> Option<Step> {
        let queued = self
            .scripts
            .lock()
            .unwrap()
            .get_mut(agent)
            .and_then(|queue| queue.pop_front());
        queued.or_else(|| self.fallback.lock().unwrap().get(agent).cloned())
    }
}

async fn call_tool(request: &ReasoningRequest, tool: &str, args: Value) -> Result<Value> {
    let spec = request
        .tools
        .iter()
        .find(|spec| spec.name == tool)
        .ok_or_else(|| ChartError::reasoning(format!("{} has no tool {}", request.agent, tool)))?;
    spec.call(args).await
}

#[async_trait]
impl ReasoningService for ScriptedReasoning {
    async fn invoke<T: StructuredOutput>(
        &self,
        request: ReasoningRequest,
        output: &OutputTool<T>,
    ) -> Result<T> {
        self.calls.lock().unwrap().push(RecordedCall {
            agent: request.agent,
            input: request.input.clone(),
            history: request.history.clone(),
            tools: request.tools.iter().map(|t| t.name).collect(),
            output_tool: output.name(),
        });

        let step = self
            .next_step(request.agent)
            .ok_or_else(|| ChartError::reasoning(format!("no script left for {}", request.agent)))?;

        match step {
            Step::Output(value) => output.commit(value),
            Step::UseTool { tool, args } => {
                let _ = call_tool(&request, tool, args).await;
                output.commit(json!({ "from_tool": tool }))
            }
            Step::CallToolThen { tool, args, output: value } => {
                let _ = call_tool(&request, tool, args).await;
                output.commit(value)
            }
            Step::Fail(e) => Err(e),
        }
    }
}

/// Data source serving canned GraphQL `data` payloads
#[derive(Clone)]
pub struct StubSource {
    pub issues: std::result::Result<Value, ChartError>,
    pub commits: std::result::Result<Value, ChartError>,
    pub pull_requests: std::result::Result<Value, ChartError>,
}

impl StubSource {
    pub fn with_issues(issues: Value) -> Self {
        Self {
            issues: Ok(issues),
            commits: Ok(json!({ "repository": null })),
            pull_requests: Ok(json!({ "repository": null })),
        }
    }

    pub fn failing(error: ChartError) -> Self {
        Self {
            issues: Err(error.clone()),
            commits: Err(error.clone()),
            pull_requests: Err(error),
        }
    }
}

fn decode<T: serde::de::DeserializeOwned>(
    value: &std::result::Result<Value, ChartError>,
) -> Result<T> {
    match value {
        Ok(value) => Ok(serde_json::from_value(value.clone())?),
        Err(e) => Err(e.clone()),
    }
}

#[async_trait]
impl RepoDataSource for StubSource {
    async fn fetch_issues(
        &self,
        _owner: &str,
        _name: &str,
        _states: &[IssueState],
    ) -> Result<IssuesResponse> {
        decode(&self.issues)
    }

    async fn fetch_commits(&self, _owner: &str, _name: &str) -> Result<CommitsResponse> {
        decode(&self.commits)
    }

    async fn fetch_pull_requests(
        &self,
        _owner: &str,
        _name: &str,
        _states: &[PullRequestState],
    ) -> Result<PullRequestsResponse> {
        decode(&self.pull_requests)
    }
}

/// In-memory dataset store
#[derive(Default)]
pub struct MemoryDatasets {
    pub written: Mutex<HashMap<String, Vec<Record>>>,
}

impl MemoryDatasets {
    pub fn records(&self, key: &str) -> Option<Vec<Record>> {
        self.written.lock().unwrap().get(key).cloned()
    }
}

#[async_trait]
impl DatasetStore for MemoryDatasets {
    async fn write(&self, key: &RepoKey, records: &[Record]) -> Result<String> {
        self.written
            .lock()
            .unwrap()
            .insert(key.to_string(), records.to_vec());
        Ok(format!("/charts/{}/data.json", key))
    }
}

/// In-memory artifact store, optionally failing every write
#[derive(Default)]
pub struct MemoryArtifacts {
    pub written: Mutex<HashMap<String, String>>,
    pub fail: bool,
}

#[async_trait]
impl ArtifactStore for MemoryArtifacts {
    async fn write(&self, key: &RepoKey, code: &str) -> Result<()> {
        if self.fail {
            return Err(ChartError::storage("disk full"));
        }
        self.written
            .lock()
            .unwrap()
            .insert(key.to_string(), code.to_string());
        Ok(())
    }
}

// === Fixtures ===

pub const CHART_CODE: &str = "export default function Chart() { return null; }";

pub fn route(next: &str) -> Step {
    Step::Output(json!({ "next": next }))
}

pub fn plan_payload() -> Value {
    json!({
        "requirements": ["Count opened issues per week"],
        "acceptance_criteria": ["Weeks are labelled with their start date"],
        "technical_spec": "{\"chart_type\":\"bar\",\"data_format\":\"{week, count}\",\"constraints\":[\"Recharts\"]}"
    })
}

pub fn code_payload() -> Value {
    json!({
        "typescript_code": CHART_CODE,
        "explanation": "Bar chart of issues per week"
    })
}

/// `create_dataset` arguments carrying `records` inline
pub fn records_payload(records: Value) -> Value {
    json!({ "records": records.to_string() })
}

pub fn fetch_issues() -> Step {
    Step::UseTool {
        tool: "get_repo_issues",
        args: json!({ "owner": "acme", "name": "widgets" }),
    }
}

/// GraphQL `data` for `count` open issues
pub fn issues_data(count: usize) -> Value {
    let edges: Vec<Value> = (0..count)
        .map(|i| {
            json!({ "node": {
                "title": format!("Issue {}", i),
                "url": format!("https://github.com/acme/widgets/issues/{}", i),
                "state": "OPEN",
                "stateReason": null,
                "createdAt": "2024-05-01T10:00:00Z",
                "updatedAt": "2024-05-02T10:00:00Z",
                "comments": { "totalCount": i },
                "labels": { "edges": [] }
            } })
        })
        .collect();
    json!({ "repository": { "issues": { "edges": edges } } })
}
