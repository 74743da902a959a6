use std::collections::HashSet;

use log::debug;

use super::config::{Footprint, LayoutConfig};
use super::layered::LayeredGraph;
use crate::graph::{PlanEdge, PlanNode, Position};

/// Positioned nodes and the edges that survived filtering.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Layout {
	/// Input nodes in input order, positions and side hints filled in.
	pub nodes: Vec<PlanNode>,
	/// Edges between present nodes, every one with an id.
	pub edges: Vec<PlanEdge>,
}

/// Arranges `nodes` into ranks along `config.direction`.
///
/// Edges whose source or target is not among `nodes` are dropped. Every node
/// gets the same footprint, positions are reported as top-left corners, and
/// edges without an id receive `source-target`. Inputs are never modified.
pub fn layout_elements(nodes: &[PlanNode], edges: &[PlanEdge], config: &LayoutConfig) -> Layout {
	let known: HashSet<&str> = nodes.iter().map(|n| n.id.as_str()).collect();
	let valid: Vec<&PlanEdge> = edges
		.iter()
		.filter(|e| known.contains(e.source.as_str()) && known.contains(e.target.as_str()))
		.collect();
	if valid.len() < edges.len() {
		debug!("layout dropped {} dangling edge(s)", edges.len() - valid.len());
	}

	let Footprint { width, height } = config.footprint;
	let mut graph = LayeredGraph::new(config.direction)
		.node_spacing(config.node_spacing)
		.rank_spacing(config.rank_spacing);
	for node in nodes {
		graph.add_node(&node.id, width, height);
	}
	for edge in &valid {
		graph.add_edge(&edge.source, &edge.target);
	}
	let solution = graph.solve();

	let (source_side, target_side) = (config.direction.source_side(), config.direction.target_side());
	let nodes: Vec<PlanNode> = nodes
		.iter()
		.map(|node| {
			let position = solution
				.center(&node.id)
				.map(|c| Position::new(c.x - width / 2.0, c.y - height / 2.0))
				.unwrap_or(node.position);
			PlanNode {
				position,
				source_position: Some(source_side),
				target_position: Some(target_side),
				..node.clone()
			}
		})
		.collect();

	let edges: Vec<PlanEdge> = valid
		.into_iter()
		.map(|edge| {
			let mut edge = edge.clone();
			if edge.id.is_none() {
				edge.id = Some(PlanEdge::derived_id(&edge.source, &edge.target));
			}
			edge
		})
		.collect();

	debug!(
		"layout {}: {} node(s), {} edge(s), extent {:.0}x{:.0}",
		config.direction.as_str(),
		nodes.len(),
		edges.len(),
		solution.width(),
		solution.height()
	);
	Layout { nodes, edges }
}
