//! # Output-Commit Tools
//!
//! These tools have no side effect. They exist so the reasoning service is
//! forced to answer with a payload matching a fixed schema; "executing" one
//! returns its validated arguments unchanged.

use schemars::JsonSchema;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::marker::PhantomData;

use crate::error::{ChartError, Result};
use crate::skills::supervisor_skill::RouteDecision;
use crate::state::outputs::{DatasetPayload, DeveloperOutput, TechnicalPlanPayload};

/// Response-schema contract for one reasoning call
#[derive(Debug)]
pub struct OutputTool<T> {
    name: &'static str,
    description: &'static str,
    _payload: PhantomData<fn() -> T>,
}

impl<T> OutputTool<T> {
    pub const fn new(name: &'static str, description: &'static str) -> Self {
        Self {
            name,
            description,
            _payload: PhantomData,
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn description(&self) -> &'static str {
        self.description
    }
}

impl<T> Clone for OutputTool<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for OutputTool<T> {}

impl<T: DeserializeOwned + JsonSchema> OutputTool<T> {
    /// JSON schema the arguments must match
    pub fn schema(&self) -> Value {
        serde_json::to_value(schemars::schema_for!(T)).unwrap_or_default()
    }

    /// Validate the arguments and return them as the typed payload
    pub fn commit(&self, args: Value) -> Result<T> {
        serde_json::from_value(args).map_err(|e| {
            ChartError::malformed(format!("{} arguments do not match its schema: {}", self.name, e))
        })
    }
}

/// Planner's forced output
pub const CREATE_TECHNICAL_PLAN: OutputTool<TechnicalPlanPayload> = OutputTool::new(
    "create_technical_plan",
    "Create a technical plan for the chart: functional requirements, acceptance criteria and a \
     JSON-encoded technical spec with chart_type, data_format and constraints.",
);

/// Analyst's forced output
pub const CREATE_DATASET: OutputTool<DatasetPayload> = OutputTool::new(
    "create_dataset",
    "Commit the final dataset. Either set from_tool to the name of a data tool to keep its last \
     result unchanged, or set records to a JSON-encoded array of flat records ready for charting.",
);

/// Developer's forced output
pub const CREATE_DEVELOPER_OUTPUT: OutputTool<DeveloperOutput> = OutputTool::new(
    "create_developer_output",
    "Emit the TypeScript chart component with an explanation, or an error_message when the \
     chart cannot be built.",
);

/// Supervisor's forced output
pub const ROUTE: OutputTool<RouteDecision> = OutputTool::new(
    "route",
    "Select the next role, or FINISH.",
);

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::Route;
    use serde_json::json;

    #[test]
    fn test_commit_is_identity_on_valid_arguments() {
        let output = CREATE_DEVELOPER_OUTPUT
            .commit(json!({
                "typescript_code": "export const Chart = () => null;",
                "explanation": "Renders nothing yet"
            }))
            .unwrap();

        assert_eq!(output.code, "export const Chart = () => null;");
        assert_eq!(output.explanation.as_deref(), Some("Renders nothing yet"));
        assert!(output.error_message.is_none());
    }

    #[test]
    fn test_commit_rejects_schema_violations() {
        let err = ROUTE.commit(json!({ "next": "reviewer" })).unwrap_err();
        assert!(matches!(err, ChartError::MalformedOutput(_)));
        assert!(err.to_string().contains("route"));
    }

    #[test]
    fn test_route_commit() {
        let decision = ROUTE.commit(json!({ "next": "FINISH" })).unwrap();
        assert_eq!(decision.next, Route::Finish);
        assert!(decision.error_message.is_none());
    }

    #[test]
    fn test_dataset_commit_carries_tool_reference() {
        let payload = CREATE_DATASET
            .commit(json!({ "from_tool": "get_repo_issues" }))
            .unwrap();
        assert_eq!(payload, DatasetPayload::from_tool("get_repo_issues"));
    }

    #[test]
    fn test_schema_lists_fields() {
        let schema = CREATE_TECHNICAL_PLAN.schema();
        let properties = schema["properties"].as_object().unwrap();
        assert!(properties.contains_key("requirements"));
        assert!(properties.contains_key("technical_spec"));
    }
}
