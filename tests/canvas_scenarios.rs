use planning_canvas::graph::{PlanEdge, PlanGraph, PlanNode};
use planning_canvas::layout::{Direction, LayoutConfig, layout_elements};

fn ids(graph: &PlanGraph) -> Vec<&str> {
	graph.nodes().iter().map(|n| n.id.as_str()).collect()
}

fn edge_pairs(graph: &PlanGraph) -> Vec<(&str, &str)> {
	graph
		.edges()
		.iter()
		.map(|e| (e.source.as_str(), e.target.as_str()))
		.collect()
}

#[test]
fn add_child_to_lone_node() {
	let mut graph = PlanGraph::new(
		vec![PlanNode::new("n1", "Node 1")],
		Vec::new(),
		LayoutConfig::default(),
	)
	.unwrap();

	let child = graph.add_child("n1").unwrap();

	assert_eq!(graph.nodes().len(), 2);
	assert_eq!(graph.edges().len(), 1);
	let edge = &graph.edges()[0];
	assert_eq!(edge.id.as_deref(), Some(format!("n1-{}", child).as_str()));
	assert!(edge.animated);
	assert_ne!(
		graph.node("n1").unwrap().position,
		graph.node(&child).unwrap().position
	);
}

#[test]
fn deleting_a_node_drops_its_edges() {
	let mut graph = PlanGraph::new(
		vec![
			PlanNode::new("n1", "Node 1"),
			PlanNode::new("n2", "Node 2"),
			PlanNode::new("n3", "Node 3"),
		],
		vec![PlanEdge::new("n1", "n2"), PlanEdge::new("n1", "n3")],
		LayoutConfig::default(),
	)
	.unwrap();

	assert_eq!(graph.delete_nodes(&["n2"]), 1);

	assert_eq!(ids(&graph), ["n1", "n3"]);
	assert_eq!(edge_pairs(&graph), [("n1", "n3")]);
}

#[test]
fn deleting_an_edge_keeps_every_node() {
	let mut graph = PlanGraph::new(
		vec![
			PlanNode::new("n1", "Node 1"),
			PlanNode::new("n2", "Node 2"),
			PlanNode::new("n3", "Node 3"),
		],
		vec![PlanEdge::new("n1", "n2"), PlanEdge::new("n2", "n3")],
		LayoutConfig::default(),
	)
	.unwrap();
	let before = graph.node("n3").unwrap().position;

	assert_eq!(graph.delete_edges(&["n2-n3"]), 1);

	assert_eq!(graph.nodes().len(), 3);
	assert_eq!(edge_pairs(&graph), [("n1", "n2")]);
	// n3 lost its parent and moves up to the first rank
	assert!(graph.node("n3").unwrap().position.y < before.y);
}

#[test]
fn connecting_relayouts_the_whole_graph() {
	let mut graph = PlanGraph::new(
		vec![PlanNode::new("a", "A"), PlanNode::new("b", "B")],
		Vec::new(),
		LayoutConfig::default(),
	)
	.unwrap();
	let (a, b) = (graph.node("a").unwrap().position, graph.node("b").unwrap().position);
	assert_eq!(a.y, b.y);

	assert!(graph.connect("a", "b").unwrap());

	let (a, b) = (graph.node("a").unwrap().position, graph.node("b").unwrap().position);
	assert!(b.y > a.y);
	assert_eq!(graph.edges()[0].id.as_deref(), Some("a-b"));
	assert!(graph.edges()[0].animated);
}

#[test]
fn left_to_right_store_lays_out_horizontally() {
	let config = LayoutConfig::default().with_direction(Direction::LeftToRight);
	let mut graph = PlanGraph::new(vec![PlanNode::new("root", "Root")], Vec::new(), config).unwrap();
	let child = graph.add_child("root").unwrap();

	let (root, child) = (graph.node("root").unwrap(), graph.node(&child).unwrap());
	assert!(child.position.x > root.position.x);
	assert_eq!(child.position.y, root.position.y);
}

#[test]
fn adapter_output_matches_store_state() {
	let nodes = vec![PlanNode::new("n1", "Node 1"), PlanNode::new("n2", "Node 2")];
	let edges = vec![PlanEdge::new("n1", "n2"), PlanEdge::new("n1", "gone")];
	let config = LayoutConfig::default();

	let layout = layout_elements(&nodes, &edges, &config);
	let graph = PlanGraph::new(nodes, edges, config).unwrap();

	assert_eq!(layout.nodes, graph.nodes());
	assert_eq!(layout.edges, graph.edges());
}
