//! # Swarm Coordinator
//!
//! Runs the supervisor/worker graph over one [`SharedContext`]: the
//! supervisor picks a node, the node runs to completion, its delta is merged,
//! control returns to the supervisor. Strictly sequential.
//!
//! A run ends when the supervisor answers FINISH. With `finish_on_error` it
//! also ends as soon as a node reports an error, recorded as a FINISH the
//! supervisor was never asked for. It fails when a node fails fatally or a
//! hop or wall-clock budget runs out.

use serde_json::json;
use std::time::Duration;
use tokio::sync::mpsc;

use crate::error::{ChartError, Result};
use crate::skills::{RouteDecision, Team};
use crate::state::{merge, ContextDelta, Message, Role, Route, SharedContext};

use super::events::{SwarmEvent, SwarmEventKind};
use super::pipeline::{Node, Pipeline};

/// Error message written when a run finishes with neither code nor error
pub const NO_OUTPUT_ERROR: &str =
    "The run finished without producing chart code or an explanation of why it could not.";

/// Configuration for the coordinator
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CoordinatorConfig {
    /// Maximum node executions (supervisor and workers) per run
    pub max_hops: u32,
    /// Wall-clock budget of a whole run
    pub run_timeout: Duration,
    /// Finish without asking the supervisor again once an error is reported
    pub finish_on_error: bool,
}

impl Default for CoordinatorConfig {
    fn default() -> Self {
        Self {
            max_hops: 12,
            run_timeout: Duration::from_secs(600),
            finish_on_error: false,
        }
    }
}

/// Result of a completed run
#[derive(Debug, Clone)]
pub struct RunOutcome {
    /// Final context: has non-empty code or a non-empty error message
    pub context: SharedContext,
    /// Nodes executed, in order
    pub trace: Vec<Node>,
    /// Supervisor decisions, in order
    pub decisions: Vec<Route>,
    /// Events that occurred
    pub events: Vec<SwarmEvent>,
}

impl RunOutcome {
    /// Worker nodes executed, in order
    pub fn workers(&self) -> Vec<Node> {
        self.trace
            .iter()
            .copied()
            .filter(|node| *node != Node::Supervisor)
            .collect()
    }
}

/// The swarm coordinator
pub struct Coordinator {
    config: CoordinatorConfig,
    team: Team,
    events: Vec<SwarmEvent>,
    event_tx: Option<mpsc::Sender<SwarmEvent>>,
}

impl Coordinator {
    pub fn new(config: CoordinatorConfig, team: Team) -> Self {
        Self {
            config,
            team,
            events: Vec::new(),
            event_tx: None,
        }
    }

    /// Set event channel for streaming events
    pub fn with_event_channel(mut self, tx: mpsc::Sender<SwarmEvent>) -> Self {
        self.event_tx = Some(tx);
        self
    }

    /// Emit an event
    async fn emit(&mut self, event: SwarmEvent) {
        self.events.push(event.clone());
        if let Some(tx) = &self.event_tx {
            let _ = tx.send(event).await;
        }
    }

    /// Run the graph to termination
    #[tracing::instrument(skip(self, ctx), fields(repo = %ctx.repo_slug()))]
    pub async fn run(&mut self, ctx: SharedContext) -> Result<RunOutcome> {
        self.emit(
            SwarmEvent::new(SwarmEventKind::RunStarted, "coordinator")
                .with_data(json!({ "repo": ctx.repo_slug() })),
        )
        .await;

        let run_timeout = self.config.run_timeout;
        let result = match tokio::time::timeout(run_timeout, self.drive(ctx)).await {
            Ok(result) => result,
            Err(_) => Err(ChartError::RunBudgetExceeded(format!(
                "run did not finish within {}s",
                run_timeout.as_secs()
            ))),
        };

        match result {
            Ok((context, pipeline, decisions)) => {
                self.emit(
                    SwarmEvent::new(SwarmEventKind::RunCompleted, "coordinator").with_data(json!({
                        "hops": pipeline.hops(),
                        "has_code": context.code().is_some(),
                        "error_message": context.error(),
                    })),
                )
                .await;
                tracing::info!(hops = pipeline.hops(), "Run completed");

                Ok(RunOutcome {
                    context,
                    trace: pipeline.trace,
                    decisions,
                    events: self.events.clone(),
                })
            }
            Err(e) => {
                self.emit(
                    SwarmEvent::new(SwarmEventKind::RunFailed, "coordinator")
                        .with_data(json!({ "error": e.to_string() })),
                )
                .await;
                tracing::error!(error = %e, "Run failed");
                Err(e)
            }
        }
    }

    async fn drive(
        &mut self,
        mut ctx: SharedContext,
    ) -> Result<(SharedContext, Pipeline, Vec<Route>)> {
        let mut pipeline = Pipeline::new(self.config.max_hops);
        let mut decisions = Vec::new();

        loop {
            if self.config.finish_on_error {
                if let Some(error) = ctx.error() {
                    tracing::info!(error = %error, "Error reported, finishing");
                    decisions.push(Route::Finish);
                    ctx = merge(ctx, supervisor_delta(&RouteDecision::to(Route::Finish)));
                    break;
                }
            }

            pipeline.enter(Node::Supervisor)?;
            let decision = self.decide(&ctx).await?;
            decisions.push(decision.next);
            ctx = merge(ctx, supervisor_delta(&decision));

            let Some(node) = Node::for_route(decision.next) else {
                break;
            };
            pipeline.enter(node)?;
            ctx = self.execute(node, decision.next, ctx).await?;
        }

        finalize(&mut ctx);
        Ok((ctx, pipeline, decisions))
    }

    async fn decide(&mut self, ctx: &SharedContext) -> Result<RouteDecision> {
        self.emit(SwarmEvent::new(SwarmEventKind::NodeStarted, Node::Supervisor.as_str()))
            .await;

        let supervisor = self.team.supervisor.clone();
        match supervisor.decide(&ctx.history).await {
            Ok(decision) => {
                tracing::info!(next = %decision.next, "Route decided");
                self.emit(
                    SwarmEvent::new(SwarmEventKind::RouteDecided, Node::Supervisor.as_str())
                        .with_data(json!({
                            "next": decision.next,
                            "error_message": decision.error_message,
                        })),
                )
                .await;
                Ok(decision)
            }
            Err(e) => {
                self.emit(
                    SwarmEvent::new(SwarmEventKind::NodeFailed, Node::Supervisor.as_str())
                        .with_data(json!({ "error": e.to_string() })),
                )
                .await;
                Err(e)
            }
        }
    }

    async fn execute(&mut self, node: Node, route: Route, ctx: SharedContext) -> Result<SharedContext> {
        let worker = self
            .team
            .worker(route)
            .cloned()
            .ok_or_else(|| ChartError::Config(format!("no worker registered for {}", route)))?;

        self.emit(SwarmEvent::new(SwarmEventKind::NodeStarted, node.as_str()))
            .await;

        match worker.execute(&ctx).await {
            Ok(delta) => {
                let before = ctx.history.len();
                let ctx = merge(ctx, delta);
                self.emit(
                    SwarmEvent::new(SwarmEventKind::NodeCompleted, node.as_str()).with_data(json!({
                        "history_added": ctx.history.len() - before,
                        "error_message": ctx.error(),
                    })),
                )
                .await;
                Ok(ctx)
            }
            Err(e) => {
                tracing::error!(node = %node, error = %e, "Node failed");
                self.emit(
                    SwarmEvent::new(SwarmEventKind::NodeFailed, node.as_str())
                        .with_data(json!({ "error": e.to_string() })),
                )
                .await;
                Err(e)
            }
        }
    }
}

/// Supervisor decisions only touch `routing_decision`, plus the error and a
/// history entry when it gives a reason to stop
fn supervisor_delta(decision: &RouteDecision) -> ContextDelta {
    let mut delta = ContextDelta {
        routing_decision: Some(decision.next),
        ..ContextDelta::default()
    };
    if let Some(error) = &decision.error_message {
        delta = delta
            .with_message(Message::new(Role::Supervisor, error.clone()))
            .with_error(error.clone());
    }
    delta
}

/// Guarantee the final context carries code or an error message
fn finalize(ctx: &mut SharedContext) {
    if ctx.code().is_none() && ctx.error().is_none() {
        tracing::warn!("Run finished without code or error message");
        ctx.error_message = Some(NO_OUTPUT_ERROR.to_string());
    }
}
