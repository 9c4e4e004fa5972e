//! # Worker Outputs
//!
//! Typed outputs produced once per run by the planner, analyst and developer,
//! plus the wire payloads the reasoning service must emit for them.

use crate::error::{ChartError, Result};
use radkit::macros::LLMOutput;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;

/// One flat dataset row, as produced by the data-fetch tools
pub type Record = Map<String, Value>;

/// Maximum number of records embedded in the analyst's sample
pub const SAMPLE_SIZE: usize = 10;

/// Technical specification for the chart implementation
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct TechnicalSpec {
    /// The type of chart to be generated (line, bar, pie, ...)
    pub chart_type: String,
    /// Format of the data required for the chart
    pub data_format: String,
    /// Technical constraints for the implementation
    #[serde(default, alias = "technical_constraints")]
    pub constraints: Vec<String>,
}

/// Output from the planner
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PlannerOutput {
    pub requirements: Vec<String>,
    pub acceptance_criteria: Vec<String>,
    pub technical_spec: TechnicalSpec,
    #[serde(default)]
    pub error_message: Option<String>,
}

/// Arguments of the `create_technical_plan` tool.
///
/// `technical_spec` travels as a JSON-encoded string and is decoded into
/// [`TechnicalSpec`] by [`TechnicalPlanPayload::decode`].
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, LLMOutput, PartialEq, Eq)]
pub struct TechnicalPlanPayload {
    /// List of functional requirements
    pub requirements: Vec<String>,
    /// List of acceptance criteria
    pub acceptance_criteria: Vec<String>,
    /// JSON object with `chart_type`, `data_format` and `constraints`, encoded as a string
    #[serde(alias = "technical_specs")]
    pub technical_spec: String,
    /// Detailed explanation if the task cannot be accomplished
    #[serde(default)]
    pub error_message: Option<String>,
}

impl TechnicalPlanPayload {
    /// Decode the nested technical spec and bind the typed plan
    pub fn decode(self) -> Result<PlannerOutput> {
        let technical_spec: TechnicalSpec = serde_json::from_str(&self.technical_spec)
            .map_err(|e| ChartError::malformed(format!("technical_spec is not valid: {}", e)))?;

        Ok(PlannerOutput {
            requirements: self.requirements,
            acceptance_criteria: self.acceptance_criteria,
            technical_spec,
            error_message: non_empty(self.error_message),
        })
    }
}

impl PlannerOutput {
    /// Encode into the `create_technical_plan` wire form
    pub fn to_wire(&self) -> Result<TechnicalPlanPayload> {
        Ok(TechnicalPlanPayload {
            requirements: self.requirements.clone(),
            acceptance_criteria: self.acceptance_criteria.clone(),
            technical_spec: serde_json::to_string(&self.technical_spec)?,
            error_message: self.error_message.clone(),
        })
    }
}

/// Shape of the analyst's dataset
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct DataDescription {
    /// Field name -> JSON runtime type of the first record's value
    pub schema: BTreeMap<String, String>,
    pub total_records: usize,
    pub sample_fields: Vec<String>,
}

impl DataDescription {
    /// Describe a dataset from its first record.
    ///
    /// Fails with `EmptyDataset` when there is no first record to sample.
    pub fn describe(records: &[Record], key: &str) -> Result<Self> {
        let first = records
            .first()
            .ok_or_else(|| ChartError::EmptyDataset(key.to_string()))?;

        Ok(Self {
            schema: first
                .iter()
                .map(|(field, value)| (field.clone(), json_type_name(value).to_string()))
                .collect(),
            total_records: records.len(),
            sample_fields: first.keys().cloned().collect(),
        })
    }
}

/// Output from the analyst
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AnalystOutput {
    /// First records of the dataset, at most [`SAMPLE_SIZE`]
    pub data_sample: Vec<Record>,
    pub data_description: DataDescription,
    /// Static route of the persisted full dataset
    pub file_route: String,
}

/// Arguments of the `create_dataset` tool.
///
/// The dataset is either the last result of a data tool, named by
/// `from_tool` and persisted unchanged, or `records`: a JSON-encoded array
/// of flat objects the model derived from what it fetched.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, LLMOutput, PartialEq, Eq)]
pub struct DatasetPayload {
    /// Name of the data tool whose last result is the dataset, as fetched
    #[serde(default)]
    pub from_tool: Option<String>,
    /// Transformed rows as a JSON array of flat objects, encoded as a string
    #[serde(default)]
    pub records: Option<String>,
}

/// Where the analyst's dataset comes from
#[derive(Debug, Clone, PartialEq)]
pub enum DatasetSource {
    /// Last successful result of the named tool
    Tool(String),
    Records(Vec<Record>),
}

impl DatasetPayload {
    /// Reference a tool result
    pub fn from_tool(tool: impl Into<String>) -> Self {
        Self {
            from_tool: Some(tool.into()),
            records: None,
        }
    }

    /// Resolve the payload. A tool reference wins over inline records.
    pub fn into_source(self) -> Result<DatasetSource> {
        if let Some(tool) = non_empty(self.from_tool) {
            return Ok(DatasetSource::Tool(tool));
        }

        let encoded = non_empty(self.records).ok_or_else(|| {
            ChartError::malformed("create_dataset needs either from_tool or records")
        })?;
        let values: Vec<Value> = serde_json::from_str(&encoded)
            .map_err(|e| ChartError::malformed(format!("records is not a JSON array: {}", e)))?;
        Ok(DatasetSource::Records(into_records(values)?))
    }
}

/// Check that every entry is a JSON object
pub fn into_records(values: Vec<Value>) -> Result<Vec<Record>> {
    values
        .into_iter()
        .enumerate()
        .map(|(i, value)| match value {
            Value::Object(record) => Ok(record),
            other => Err(ChartError::malformed(format!(
                "record {} is {} instead of an object",
                i,
                json_type_name(&other)
            ))),
        })
        .collect()
}

/// Output from the developer (also the `create_developer_output` arguments)
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, LLMOutput, PartialEq, Eq)]
pub struct DeveloperOutput {
    /// The TypeScript source of the chart component
    #[serde(rename = "typescript_code", alias = "code")]
    pub code: String,
    /// Explanation of the code
    #[serde(default)]
    pub explanation: Option<String>,
    /// Detailed explanation if the task cannot be accomplished
    #[serde(default)]
    pub error_message: Option<String>,
}

impl DeveloperOutput {
    /// Drop blank optional strings the model sometimes emits
    pub fn normalized(mut self) -> Self {
        self.explanation = non_empty(self.explanation);
        self.error_message = non_empty(self.error_message);
        self
    }
}

/// JSON runtime type name of a value
pub fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(n) if n.is_i64() || n.is_u64() => "integer",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

pub(crate) fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|s| !s.trim().is_empty())
}
