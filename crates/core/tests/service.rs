mod common;

use std::sync::{Arc, Mutex};
use tokio_test::{assert_err, assert_ok};

use common::*;
use repochart_core::github::RepoDataSource;
use repochart_core::skills::tools::ScriptConfig;
use repochart_core::swarm::CoordinatorConfig;
use repochart_core::{ChartError, ChartRequest, ChartService, SourceFactory};

fn request() -> ChartRequest {
    ChartRequest {
        message: "Plot opened issues per week".to_string(),
        owner: "acme".to_string(),
        repo: "widgets".to_string(),
    }
}

/// Source factory that remembers the tokens it was called with
fn sources(tokens: Arc<Mutex<Vec<String>>>) -> SourceFactory {
    Arc::new(move |token: &str| {
        tokens.lock().unwrap().push(token.to_string());
        Arc::new(StubSource::with_issues(issues_data(5))) as Arc<dyn RepoDataSource>
    })
}

fn service(
    reasoning: ScriptedReasoning,
    artifacts: Arc<MemoryArtifacts>,
    tokens: Arc<Mutex<Vec<String>>>,
) -> ChartService<ScriptedReasoning> {
    ChartService::new(
        Arc::new(reasoning),
        sources(tokens),
        Arc::new(MemoryDatasets::default()),
        artifacts,
        CoordinatorConfig::default(),
        ScriptConfig::default(),
    )
}

fn full_run() -> ScriptedReasoning {
    ScriptedReasoning::new()
        .script(
            "supervisor",
            [route("planner"), route("analyst"), route("developer"), route("FINISH")],
        )
        .script("planner", [Step::Output(plan_payload())])
        .script("analyst", [fetch_issues()])
        .script("developer", [Step::Output(code_payload())])
}

#[tokio::test]
async fn test_generate_returns_and_persists_code() {
    let artifacts = Arc::new(MemoryArtifacts::default());
    let tokens = Arc::new(Mutex::new(Vec::new()));
    let service = service(full_run(), artifacts.clone(), tokens.clone());

    let response = assert_ok!(service.generate(request(), "ghp_test").await);

    assert_eq!(response.code, CHART_CODE);
    assert_eq!(response.explanation, "Bar chart of issues per week");
    assert_eq!(
        artifacts.written.lock().unwrap().get("acme/widgets").map(String::as_str),
        Some(CHART_CODE)
    );
    assert_eq!(*tokens.lock().unwrap(), vec!["ghp_test".to_string()]);
}

#[tokio::test]
async fn test_generate_survives_artifact_failure() {
    let artifacts = Arc::new(MemoryArtifacts {
        fail: true,
        ..MemoryArtifacts::default()
    });
    let service = service(full_run(), artifacts, Arc::new(Mutex::new(Vec::new())));

    let response = assert_ok!(service.generate(request(), "ghp_test").await);
    assert_eq!(response.code, CHART_CODE);
}

#[tokio::test]
async fn test_generate_returns_reported_error_verbatim() {
    let reasoning = ScriptedReasoning::new().script(
        "supervisor",
        [Step::Output(serde_json::json!({
            "next": "FINISH",
            "error_message": "Stars cannot be charted from issues"
        }))],
    );
    let artifacts = Arc::new(MemoryArtifacts::default());
    let service = service(reasoning, artifacts.clone(), Arc::new(Mutex::new(Vec::new())));

    let err = assert_err!(service.generate(request(), "ghp_test").await);
    assert_eq!(
        err,
        ChartError::WorkerReported("Stars cannot be charted from issues".to_string())
    );
    assert!(artifacts.written.lock().unwrap().is_empty());
}

#[tokio::test]
async fn test_generate_prefers_developer_error_over_placeholder_code() {
    let reasoning = ScriptedReasoning::new()
        .script(
            "supervisor",
            [route("planner"), route("analyst"), route("developer"), route("FINISH")],
        )
        .script("planner", [Step::Output(plan_payload())])
        .script("analyst", [fetch_issues()])
        .script(
            "developer",
            [Step::Output(serde_json::json!({
                "typescript_code": "// chart unavailable",
                "error_message": "The data has no date field to bucket by"
            }))],
        );
    let artifacts = Arc::new(MemoryArtifacts::default());
    let service = service(reasoning, artifacts.clone(), Arc::new(Mutex::new(Vec::new())));

    let err = assert_err!(service.generate(request(), "ghp_test").await);
    assert_eq!(
        err,
        ChartError::WorkerReported("The data has no date field to bucket by".to_string())
    );
    assert!(artifacts.written.lock().unwrap().is_empty());
}

#[tokio::test]
async fn test_generate_rejects_empty_token() {
    let tokens = Arc::new(Mutex::new(Vec::new()));
    let service = service(
        ScriptedReasoning::new(),
        Arc::new(MemoryArtifacts::default()),
        tokens.clone(),
    );

    let err = assert_err!(service.generate(request(), "  ").await);
    assert!(matches!(err, ChartError::InvalidRequest(_)));
    assert!(tokens.lock().unwrap().is_empty());
}

#[tokio::test]
async fn test_generate_rejects_empty_message() {
    let service = service(
        ScriptedReasoning::new(),
        Arc::new(MemoryArtifacts::default()),
        Arc::new(Mutex::new(Vec::new())),
    );
    let mut request = request();
    request.message = String::new();

    let err = assert_err!(service.generate(request, "ghp_test").await);
    assert!(matches!(err, ChartError::InvalidRequest(_)));
}

#[tokio::test]
async fn test_run_exposes_trace() {
    let service = service(
        full_run(),
        Arc::new(MemoryArtifacts::default()),
        Arc::new(Mutex::new(Vec::new())),
    );

    let outcome = assert_ok!(service.run(&request(), "ghp_test").await);
    assert_eq!(outcome.trace.len(), 7);
    assert!(!outcome.events.is_empty());
}
