use std::collections::HashSet;

use log::info;
use serde::Serialize;

use super::error::GraphError;
use super::model::{NodeKind, PlanEdge, PlanNode, Position};
use crate::layout::{Direction, LayoutConfig, layout_elements};

/// Session-scoped source of fresh node ids.
#[derive(Clone, Debug, Default)]
pub struct IdGenerator {
	next: u64,
}

impl IdGenerator {
	/// Returns the next `node_{n}` for which `taken` is false.
	pub fn next_id(&mut self, taken: impl Fn(&str) -> bool) -> String {
		loop {
			self.next += 1;
			let id = format!("node_{}", self.next);
			if !taken(&id) {
				return id;
			}
		}
	}
}

#[derive(Serialize)]
struct Snapshot<'a> {
	direction: Direction,
	nodes: &'a [PlanNode],
	edges: &'a [PlanEdge],
}

/// Authoritative node and edge collections behind the canvas.
///
/// Structural changes rebuild both collections, lay out the whole graph and
/// swap the results in together. Moving a node is the only in-place edit.
#[derive(Clone, Debug)]
pub struct PlanGraph {
	nodes: Vec<PlanNode>,
	edges: Vec<PlanEdge>,
	config: LayoutConfig,
	ids: IdGenerator,
}

impl PlanGraph {
	/// Validates `config`, rejects duplicate node or edge ids, then lays
	/// the graph out.
	pub fn new(
		nodes: Vec<PlanNode>,
		edges: Vec<PlanEdge>,
		config: LayoutConfig,
	) -> Result<Self, GraphError> {
		config.validate()?;
		let mut node_ids = HashSet::new();
		if let Some(dup) = nodes.iter().find(|n| !node_ids.insert(n.id.as_str())) {
			return Err(GraphError::DuplicateNode(dup.id.clone()));
		}
		let mut edge_ids = HashSet::new();
		if let Some(dup) = edges.iter().map(PlanEdge::key).find(|key| !edge_ids.insert(key.clone())) {
			return Err(GraphError::DuplicateEdge(dup));
		}

		let mut graph = Self {
			nodes: Vec::new(),
			edges: Vec::new(),
			config,
			ids: IdGenerator::default(),
		};
		graph.commit(nodes, edges);
		Ok(graph)
	}

	/// Nodes in insertion order.
	pub fn nodes(&self) -> &[PlanNode] {
		&self.nodes
	}

	/// Edges in insertion order, all with ids.
	pub fn edges(&self) -> &[PlanEdge] {
		&self.edges
	}

	/// Layout parameters used for every relayout.
	pub fn config(&self) -> &LayoutConfig {
		&self.config
	}

	/// Current layout direction.
	pub fn direction(&self) -> Direction {
		self.config.direction
	}

	/// Looks a node up by id.
	pub fn node(&self, id: &str) -> Option<&PlanNode> {
		self.nodes.iter().find(|n| n.id == id)
	}

	/// True if a node has this id.
	pub fn contains(&self, id: &str) -> bool {
		self.node(id).is_some()
	}

	/// Spawns a child under `parent_id` and returns the new node id.
	pub fn add_child(&mut self, parent_id: &str) -> Result<String, GraphError> {
		if !self.contains(parent_id) {
			return Err(GraphError::UnknownNode(parent_id.to_string()));
		}
		let existing: HashSet<&str> = self.nodes.iter().map(|n| n.id.as_str()).collect();
		let child_id = self.ids.next_id(|id| existing.contains(id));

		let child = PlanNode::new(child_id.clone(), format!("Node {}", self.nodes.len() + 1))
			.with_kind(NodeKind::Plan);
		let edge = PlanEdge::new(parent_id, child_id.clone())
			.with_id(self.free_edge_id(parent_id, &child_id))
			.animated();

		let mut nodes = self.nodes.clone();
		nodes.push(child);
		let mut edges = self.edges.clone();
		edges.push(edge);
		self.commit(nodes, edges);
		info!("added child {} under {}", child_id, parent_id);
		Ok(child_id)
	}

	/// Draws an edge between two existing nodes. Returns false if the
	/// connection is already present.
	pub fn connect(&mut self, source: &str, target: &str) -> Result<bool, GraphError> {
		for id in [source, target] {
			if !self.contains(id) {
				return Err(GraphError::UnknownNode(id.to_string()));
			}
		}
		if source == target {
			return Err(GraphError::SelfLoop(source.to_string()));
		}
		if self.edges.iter().any(|e| e.connects(source, target)) {
			return Ok(false);
		}

		let mut edges = self.edges.clone();
		edges.push(
			PlanEdge::new(source, target)
				.with_id(self.free_edge_id(source, target))
				.animated(),
		);
		self.commit(self.nodes.clone(), edges);
		info!("connected {} -> {}", source, target);
		Ok(true)
	}

	/// Removes the nodes and every edge touching them. Returns how many nodes went.
	pub fn delete_nodes<S: AsRef<str>>(&mut self, ids: &[S]) -> usize {
		let doomed: HashSet<&str> = ids.iter().map(|id| id.as_ref()).collect();
		let nodes: Vec<PlanNode> = self
			.nodes
			.iter()
			.filter(|n| !doomed.contains(n.id.as_str()))
			.cloned()
			.collect();
		let edges: Vec<PlanEdge> = self
			.edges
			.iter()
			.filter(|e| !doomed.contains(e.source.as_str()) && !doomed.contains(e.target.as_str()))
			.cloned()
			.collect();
		let removed = self.nodes.len() - nodes.len();
		self.commit(nodes, edges);
		info!("deleted {} node(s)", removed);
		removed
	}

	/// Removes edges by id. Returns how many edges went.
	pub fn delete_edges<S: AsRef<str>>(&mut self, ids: &[S]) -> usize {
		let doomed: HashSet<&str> = ids.iter().map(|id| id.as_ref()).collect();
		let edges: Vec<PlanEdge> = self
			.edges
			.iter()
			.filter(|e| !doomed.contains(e.key().as_str()))
			.cloned()
			.collect();
		let removed = self.edges.len() - edges.len();
		self.commit(self.nodes.clone(), edges);
		info!("deleted {} edge(s)", removed);
		removed
	}

	/// Direct manipulation; kept until the next structural change.
	pub fn move_node(&mut self, id: &str, position: Position) -> Result<(), GraphError> {
		let node = self
			.nodes
			.iter_mut()
			.find(|n| n.id == id)
			.ok_or_else(|| GraphError::UnknownNode(id.to_string()))?;
		node.position = position;
		Ok(())
	}

	/// Switches direction and relays out.
	pub fn set_direction(&mut self, direction: Direction) {
		self.config.direction = direction;
		self.relayout();
		info!("layout direction set to {}", direction.as_str());
	}

	/// Lays the current nodes and edges out again.
	pub fn relayout(&mut self) {
		self.commit(self.nodes.clone(), self.edges.clone());
	}

	/// Current graph as pretty JSON, for diagnostics.
	pub fn snapshot_json(&self) -> serde_json::Result<String> {
		serde_json::to_string_pretty(&Snapshot {
			direction: self.config.direction,
			nodes: &self.nodes,
			edges: &self.edges,
		})
	}

	/// `source-target`, suffixed with `-2`, `-3`, ... while another edge holds it.
	fn free_edge_id(&self, source: &str, target: &str) -> String {
		let taken: HashSet<String> = self.edges.iter().map(PlanEdge::key).collect();
		let base = PlanEdge::derived_id(source, target);
		let mut id = base.clone();
		let mut n = 1;
		while taken.contains(&id) {
			n += 1;
			id = format!("{}-{}", base, n);
		}
		id
	}

	fn commit(&mut self, nodes: Vec<PlanNode>, edges: Vec<PlanEdge>) {
		let layout = layout_elements(&nodes, &edges, &self.config);
		self.nodes = layout.nodes;
		self.edges = layout.edges;
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	fn graph() -> PlanGraph {
		PlanGraph::new(
			vec![PlanNode::new("n1", "Node 1"), PlanNode::new("n2", "Node 2")],
			vec![PlanEdge::new("n1", "n2")],
			LayoutConfig::default(),
		)
		.unwrap()
	}

	#[test]
	fn id_generator_skips_taken_ids() {
		let mut ids = IdGenerator::default();
		assert_eq!(ids.next_id(|id| id == "node_1" || id == "node_2"), "node_3");
		assert_eq!(ids.next_id(|_| false), "node_4");
	}

	#[test]
	fn construction_lays_out_and_completes_ids() {
		let graph = graph();
		assert_eq!(graph.edges()[0].id.as_deref(), Some("n1-n2"));
		assert!(graph.nodes()[1].position.y > graph.nodes()[0].position.y);
	}

	#[test]
	fn invalid_config_is_rejected() {
		let config = LayoutConfig::default().with_footprint(-1.0, 1.0);
		let err = PlanGraph::new(Vec::new(), Vec::new(), config).unwrap_err();
		assert!(matches!(err, GraphError::InvalidConfig(_)));
	}

	#[test]
	fn add_child_to_unknown_parent_fails() {
		let mut graph = graph();
		assert!(matches!(
			graph.add_child("ghost"),
			Err(GraphError::UnknownNode(id)) if id == "ghost"
		));
		assert_eq!(graph.nodes().len(), 2);
	}

	#[test]
	fn added_children_get_distinct_ids_and_labels() {
		let mut graph = graph();
		let a = graph.add_child("n1").unwrap();
		let b = graph.add_child("n1").unwrap();
		assert_ne!(a, b);
		assert_eq!(graph.node(&a).unwrap().label(), "Node 3");
		assert_eq!(graph.node(&b).unwrap().label(), "Node 4");
		assert!(graph.edges().iter().all(|e| e.animated || e.id.as_deref() == Some("n1-n2")));
	}

	#[test]
	fn duplicate_connection_is_ignored() {
		let mut graph = graph();
		assert!(!graph.connect("n1", "n2").unwrap());
		assert_eq!(graph.edges().len(), 1);
	}

	#[test]
	fn clashing_derived_ids_stay_unique() {
		// "a-b" -> "c" and "a" -> "b-c" both derive "a-b-c"
		let mut graph = PlanGraph::new(
			["a-b", "c", "a", "b-c"].into_iter().map(|id| PlanNode::new(id, id)).collect(),
			Vec::new(),
			LayoutConfig::default(),
		)
		.unwrap();
		assert!(graph.connect("a-b", "c").unwrap());
		assert!(graph.connect("a", "b-c").unwrap());

		let ids: Vec<String> = graph.edges().iter().map(PlanEdge::key).collect();
		assert_eq!(ids, ["a-b-c", "a-b-c-2"]);
		assert_eq!(graph.delete_edges(&["a-b-c"]), 1);
		assert!(graph.edges()[0].connects("a", "b-c"));
	}

	#[test]
	fn construction_rejects_duplicate_ids() {
		let twins = vec![PlanNode::new("n1", "Node 1"), PlanNode::new("n1", "Again")];
		assert!(matches!(
			PlanGraph::new(twins, Vec::new(), LayoutConfig::default()),
			Err(GraphError::DuplicateNode(id)) if id == "n1"
		));

		let nodes = vec![PlanNode::new("n1", "Node 1"), PlanNode::new("n2", "Node 2")];
		let edges = vec![PlanEdge::new("n1", "n2"), PlanEdge::new("n2", "n1").with_id("n1-n2")];
		assert!(matches!(
			PlanGraph::new(nodes, edges, LayoutConfig::default()),
			Err(GraphError::DuplicateEdge(id)) if id == "n1-n2"
		));
	}

	#[test]
	fn self_connection_is_rejected() {
		let mut graph = graph();
		assert!(matches!(graph.connect("n1", "n1"), Err(GraphError::SelfLoop(_))));
	}

	#[test]
	fn connect_requires_existing_endpoints() {
		let mut graph = graph();
		assert!(matches!(graph.connect("n1", "zz"), Err(GraphError::UnknownNode(_))));
	}

	#[test]
	fn move_does_not_relayout() {
		let mut graph = graph();
		graph.move_node("n2", Position::new(-500.0, 900.0)).unwrap();
		assert_eq!(graph.node("n2").unwrap().position, Position::new(-500.0, 900.0));
		assert_eq!(graph.node("n1").unwrap().position, Position::new(0.0, 0.0));
	}

	#[test]
	fn structural_change_discards_manual_positions() {
		let mut graph = graph();
		let before = graph.node("n2").unwrap().position;
		graph.move_node("n2", Position::new(-500.0, 900.0)).unwrap();
		graph.delete_edges(&["does-not-exist"]);
		assert_eq!(graph.node("n2").unwrap().position, before);
	}

	#[test]
	fn direction_change_relayouts() {
		let mut graph = graph();
		graph.set_direction(Direction::LeftToRight);
		let (a, b) = (graph.node("n1").unwrap(), graph.node("n2").unwrap());
		assert_eq!(a.position.y, b.position.y);
		assert!(b.position.x > a.position.x);
	}

	#[test]
	fn snapshot_lists_nodes_and_edges() {
		let json = graph().snapshot_json().unwrap();
		let value: serde_json::Value = serde_json::from_str(&json).unwrap();
		assert_eq!(value["direction"], "TB");
		assert_eq!(value["nodes"].as_array().unwrap().len(), 2);
		assert_eq!(value["edges"][0]["id"], "n1-n2");
	}
}
