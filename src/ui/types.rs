use crate::error::{GraphConversionError, GraphError};
use crate::graph::{
    BranchTag, DEFAULT_CALL_PAYLOAD, DEFAULT_CALL_URL, DEFAULT_LOG_MESSAGE, DurationUnit, Graph,
    IntoGraph, Step, StepKind, Transition,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use tracing::warn;

/// Node data as written by the canvas editor. Every field is optional; missing and
/// empty values fall back to the per-kind defaults during conversion.
#[derive(Debug, Serialize, Deserialize, Clone, Default, PartialEq)]
pub struct CanvasNodeData {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub condition: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration: Option<f64>,
    #[serde(default, alias = "durationUnit", skip_serializing_if = "Option::is_none")]
    pub duration_unit: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payload: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

/// Canvas position of a node. Irrelevant to execution, kept for round-tripping.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, Default, PartialEq)]
pub struct CanvasPosition {
    pub x: f64,
    pub y: f64,
}

/// A node on the canvas.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct CanvasNode {
    pub id: String,
    #[serde(rename = "type")]
    pub node_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub position: Option<CanvasPosition>,
    #[serde(default)]
    pub data: CanvasNodeData,
}

/// An edge on the canvas. `source_handle` carries the branch of a condition node.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct CanvasEdge {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub source: String,
    pub target: String,
    #[serde(default, alias = "sourceHandle", skip_serializing_if = "Option::is_none")]
    pub source_handle: Option<String>,
    #[serde(default, alias = "targetHandle", skip_serializing_if = "Option::is_none")]
    pub target_handle: Option<String>,
}

/// A complete workflow document as persisted by the editor.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct WorkflowDocument {
    pub id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, alias = "createdAt", skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, alias = "updatedAt", skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub nodes: Vec<CanvasNode>,
    #[serde(default)]
    pub edges: Vec<CanvasEdge>,
}

impl WorkflowDocument {
    /// Creates an empty document.
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            description: None,
            created_at: None,
            updated_at: None,
            nodes: Vec::new(),
            edges: Vec::new(),
        }
    }

    pub fn from_json_str(content: &str) -> Result<Self, GraphConversionError> {
        Ok(serde_json::from_str(content)?)
    }

    /// Load a workflow document from a JSON file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, GraphConversionError> {
        let content = fs::read_to_string(path)?;
        Self::from_json_str(&content)
    }
}

/// `a || b` for optional strings: empty strings count as missing.
fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|s| !s.is_empty())
}

impl CanvasNode {
    fn into_step(self) -> Result<Step, GraphConversionError> {
        let CanvasNode {
            id, node_type, data, ..
        } = self;

        let kind = match node_type.as_str() {
            "start" | "entry" => StepKind::Entry,
            "condition" => StepKind::condition(data.condition.unwrap_or_default()),
            "delay" | "wait" => {
                let unit = match non_empty(data.duration_unit) {
                    None => DurationUnit::default(),
                    Some(unit) => DurationUnit::parse(&unit).ok_or_else(|| {
                        GraphError::UnknownDurationUnit {
                            step_id: id.clone(),
                            unit,
                        }
                    })?,
                };
                let duration = data
                    .duration
                    .filter(|d| *d != 0.0 && !d.is_nan())
                    .unwrap_or(1.0);
                StepKind::wait(duration, unit)
            }
            "webhook" | "call" => StepKind::call(
                non_empty(data.url).unwrap_or_else(|| DEFAULT_CALL_URL.to_string()),
                non_empty(data.payload).unwrap_or_else(|| DEFAULT_CALL_PAYLOAD.to_string()),
            ),
            "logger" | "log" => StepKind::log(
                non_empty(data.message).unwrap_or_else(|| DEFAULT_LOG_MESSAGE.to_string()),
            ),
            "end" | "terminal" => StepKind::Terminal,
            _ => StepKind::Unknown {
                kind: node_type.clone(),
            },
        };

        // Unlabelled nodes keep the type name the editor knows them by.
        let label = non_empty(data.label).unwrap_or(node_type);
        Ok(Step::new(id, kind).with_label(label))
    }
}

impl IntoGraph for WorkflowDocument {
    fn into_graph(self) -> Result<Graph, GraphConversionError> {
        let steps = self
            .nodes
            .into_iter()
            .map(CanvasNode::into_step)
            .collect::<Result<Vec<_>, _>>()?;

        let is_condition = |id: &str| {
            steps
                .iter()
                .any(|s| s.id == id && matches!(s.kind, StepKind::Condition { .. }))
        };

        let mut transitions = Vec::with_capacity(self.edges.len());
        for edge in self.edges {
            if edge.source.is_empty() || edge.target.is_empty() {
                return Err(GraphConversionError::Validation(format!(
                    "edge '{}' must name both a source and a target",
                    edge.id.as_deref().unwrap_or("<unnamed>")
                )));
            }
            let branch = match non_empty(edge.source_handle) {
                // Handles only select branches on condition nodes.
                Some(handle) if is_condition(&edge.source) => match BranchTag::parse(&handle) {
                    Some(tag) => Some(tag),
                    None => {
                        // Neither outcome selects it, so it can never be followed.
                        warn!(
                            edge = edge.id.as_deref().unwrap_or("<unnamed>"),
                            source = %edge.source,
                            handle = %handle,
                            "Dropping condition edge with unknown handle"
                        );
                        continue;
                    }
                },
                _ => None,
            };
            transitions.push(Transition {
                source: edge.source,
                target: edge.target,
                branch,
            });
        }

        Ok(Graph::new(steps, transitions)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DOCUMENT: &str = r#"{
        "id": "wf-1",
        "name": "Pump check",
        "createdAt": "2025-01-10T08:00:00.000Z",
        "updatedAt": "2025-01-10T09:30:00.000Z",
        "nodes": [
            { "id": "n1", "type": "start", "position": { "x": 0, "y": 0 }, "data": { "label": "Begin" } },
            { "id": "n2", "type": "condition", "data": { "condition": "value > 10" } },
            { "id": "n3", "type": "delay", "data": { "duration": 0, "durationUnit": "minutes" } },
            { "id": "n4", "type": "webhook", "data": { "url": "" } },
            { "id": "n5", "type": "logger", "data": {} },
            { "id": "n6", "type": "end", "data": { "label": "" } },
            { "id": "n7", "type": "sticky-note", "data": {} }
        ],
        "edges": [
            { "id": "e1", "source": "n1", "target": "n2", "sourceHandle": null },
            { "id": "e2", "source": "n2", "target": "n3", "sourceHandle": "true" },
            { "id": "e3", "source": "n2", "target": "n6", "sourceHandle": "false" },
            { "id": "e4", "source": "n3", "target": "n4", "sourceHandle": "bottom" }
        ]
    }"#;

    #[test]
    fn converts_canvas_document_with_defaults() {
        let graph = WorkflowDocument::from_json_str(DOCUMENT)
            .unwrap()
            .into_graph()
            .unwrap();

        let step = |id: &str| graph.resolve(id).unwrap().clone();
        assert_eq!(step("n1").label, "Begin");
        assert_eq!(step("n1").kind, StepKind::Entry);
        assert_eq!(step("n2").kind, StepKind::condition("value > 10"));
        assert_eq!(step("n3").kind, StepKind::wait(1.0, DurationUnit::Minutes));
        assert_eq!(step("n3").label, "delay");
        assert_eq!(step("n4").kind, StepKind::call(DEFAULT_CALL_URL, "{}"));
        assert_eq!(step("n5").kind, StepKind::log(DEFAULT_LOG_MESSAGE));
        assert_eq!(step("n6").label, "end");
        assert_eq!(
            step("n7").kind,
            StepKind::Unknown {
                kind: "sticky-note".into()
            }
        );
    }

    #[test]
    fn branch_tags_only_apply_to_condition_sources() {
        let graph = WorkflowDocument::from_json_str(DOCUMENT)
            .unwrap()
            .into_graph()
            .unwrap();
        let branches: Vec<Option<BranchTag>> =
            graph.transitions().iter().map(|t| t.branch).collect();
        assert_eq!(
            branches,
            [None, Some(BranchTag::True), Some(BranchTag::False), None]
        );
    }

    #[test]
    fn drops_condition_edges_with_unknown_handles() {
        let mut doc = WorkflowDocument::from_json_str(DOCUMENT).unwrap();
        doc.edges[1].source_handle = Some("maybe".into());
        let graph = doc.into_graph().unwrap();

        assert_eq!(graph.transitions().len(), 3);
        assert!(graph.outgoing("n2").iter().all(|t| t.target != "n3"));
        assert_eq!(graph.outgoing("n2")[0].branch, Some(BranchTag::False));
    }

    #[test]
    fn rejects_unknown_duration_units() {
        let mut doc = WorkflowDocument::from_json_str(DOCUMENT).unwrap();
        doc.nodes[2].data.duration_unit = Some("fortnights".into());
        assert!(matches!(
            doc.into_graph(),
            Err(GraphConversionError::Graph(GraphError::UnknownDurationUnit { .. }))
        ));
    }

    #[test]
    fn rejects_edges_without_endpoints() {
        let mut doc = WorkflowDocument::from_json_str(DOCUMENT).unwrap();
        doc.edges[0].target.clear();
        assert!(matches!(
            doc.into_graph(),
            Err(GraphConversionError::Validation(ref msg)) if msg.contains("'e1'")
        ));
    }

    #[test]
    fn rejects_duplicate_node_ids() {
        let mut doc = WorkflowDocument::from_json_str(DOCUMENT).unwrap();
        doc.nodes[1].id = "n1".into();
        assert!(matches!(
            doc.into_graph(),
            Err(GraphConversionError::Graph(GraphError::DuplicateStepId(ref id))) if id == "n1"
        ));
    }
}
