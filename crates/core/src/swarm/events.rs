//! # Swarm Events
//!
//! Progress events of a chart run, recorded on the outcome and optionally
//! streamed to a listener.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Kind of swarm event
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum SwarmEventKind {
    /// Run started
    RunStarted,
    /// A node (supervisor or worker) started
    NodeStarted,
    /// A node completed and its delta was merged
    NodeCompleted,
    /// A node failed; the run aborts
    NodeFailed,
    /// The supervisor picked the next node
    RouteDecided,
    /// Run terminated normally
    RunCompleted,
    /// Run failed
    RunFailed,
}

/// An event in the swarm
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SwarmEvent {
    /// Unique event ID
    pub id: String,
    /// Timestamp
    pub timestamp: DateTime<Utc>,
    /// Kind of event
    pub kind: SwarmEventKind,
    /// Node that produced this event
    pub agent: String,
    /// Associated data (JSON)
    #[serde(default)]
    pub data: Option<serde_json::Value>,
}

impl SwarmEvent {
    /// Create a new event
    pub fn new(kind: SwarmEventKind, agent: &str) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            timestamp: Utc::now(),
            kind,
            agent: agent.to_string(),
            data: None,
        }
    }

    /// Add data to the event
    pub fn with_data(mut self, data: serde_json::Value) -> Self {
        self.data = Some(data);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_event_creation() {
        let event = SwarmEvent::new(SwarmEventKind::RouteDecided, "supervisor")
            .with_data(json!({ "next": "planner" }));

        assert_eq!(event.agent, "supervisor");
        assert_eq!(event.data, Some(json!({ "next": "planner" })));
        assert_ne!(event.id, SwarmEvent::new(SwarmEventKind::RunStarted, "coordinator").id);
    }

    #[test]
    fn test_kind_serialization() {
        let json = serde_json::to_string(&SwarmEventKind::NodeCompleted).unwrap();
        assert_eq!(json, "\"node_completed\"");
    }
}
