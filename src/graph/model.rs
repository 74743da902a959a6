use serde::{Deserialize, Serialize};

use crate::layout::Side;

/// Top-left corner of a node box, in graph space.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Position {
	/// Left edge.
	pub x: f64,
	/// Top edge.
	pub y: f64,
}

impl Position {
	/// Corner at (`x`, `y`).
	pub fn new(x: f64, y: f64) -> Self {
		Self { x, y }
	}
}

/// Selects which node template the canvas draws.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeKind {
	/// Box with connectors and an add-child button.
	#[default]
	Plan,
	/// Plain box with connectors only.
	Default,
}

/// Payload shown inside a node.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct NodeData {
	/// Text drawn in the box.
	pub label: String,
}

/// A box on the canvas.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlanNode {
	/// Unique within a graph.
	pub id: String,
	/// Template; serialized as `type`.
	#[serde(rename = "type")]
	pub kind: NodeKind,
	/// Display payload.
	pub data: NodeData,
	/// Derived by layout; overwritten on every relayout.
	pub position: Position,
	/// Side outgoing edges leave from; set by layout.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub source_position: Option<Side>,
	/// Side incoming edges arrive at; set by layout.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub target_position: Option<Side>,
}

impl PlanNode {
	/// A plan node at the origin.
	pub fn new(id: impl Into<String>, label: impl Into<String>) -> Self {
		Self {
			id: id.into(),
			kind: NodeKind::Plan,
			data: NodeData {
				label: label.into(),
			},
			position: Position::default(),
			source_position: None,
			target_position: None,
		}
	}

	/// Replaces the template.
	pub fn with_kind(mut self, kind: NodeKind) -> Self {
		self.kind = kind;
		self
	}

	/// Places the node's top-left corner.
	pub fn with_position(mut self, x: f64, y: f64) -> Self {
		self.position = Position::new(x, y);
		self
	}

	/// Shorthand for `data.label`.
	pub fn label(&self) -> &str {
		&self.data.label
	}
}

/// Directed connection between two nodes.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PlanEdge {
	/// Filled in as `source-target` by layout when absent.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub id: Option<String>,
	/// Node id the edge leaves.
	pub source: String,
	/// Node id the edge enters.
	pub target: String,
	/// Drawn with moving dashes.
	#[serde(default)]
	pub animated: bool,
}

impl PlanEdge {
	/// A static edge without an id.
	pub fn new(source: impl Into<String>, target: impl Into<String>) -> Self {
		Self {
			id: None,
			source: source.into(),
			target: target.into(),
			animated: false,
		}
	}

	/// Sets an explicit id.
	pub fn with_id(mut self, id: impl Into<String>) -> Self {
		self.id = Some(id.into());
		self
	}

	/// Marks the edge animated.
	pub fn animated(mut self) -> Self {
		self.animated = true;
		self
	}

	/// Id an edge gets when none was supplied.
	pub fn derived_id(source: &str, target: &str) -> String {
		format!("{}-{}", source, target)
	}

	/// The explicit id, or the derived one.
	pub fn key(&self) -> String {
		self.id
			.clone()
			.unwrap_or_else(|| Self::derived_id(&self.source, &self.target))
	}

	/// True if either end is `node_id`.
	pub fn touches(&self, node_id: &str) -> bool {
		self.source == node_id || self.target == node_id
	}

	/// True for the exact `source -> target` pair.
	pub fn connects(&self, source: &str, target: &str) -> bool {
		self.source == source && self.target == target
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn edge_key_prefers_explicit_id() {
		assert_eq!(PlanEdge::new("a", "b").key(), "a-b");
		assert_eq!(PlanEdge::new("a", "b").with_id("custom").key(), "custom");
	}

	#[test]
	fn node_serializes_like_a_flow_node() {
		let node = PlanNode::new("n1", "Node 1").with_position(1.0, 2.0);
		let json = serde_json::to_value(&node).unwrap();
		assert_eq!(json["type"], "plan");
		assert_eq!(json["data"]["label"], "Node 1");
		assert_eq!(json["position"]["y"], 2.0);
		assert!(json.get("sourcePosition").is_none());
	}

	#[test]
	fn edge_deserializes_without_id() {
		let edge: PlanEdge = serde_json::from_str(r#"{"source":"a","target":"b"}"#).unwrap();
		assert_eq!(edge, PlanEdge::new("a", "b"));
		assert!(!edge.animated);
	}
}
