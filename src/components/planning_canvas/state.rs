use log::{info, warn};

use super::geometry::{self, ADD_BUTTON_RADIUS, EDGE_HIT_TOLERANCE, HANDLE_HIT_RADIUS};
use crate::graph::{NodeKind, PlanGraph, Position};

pub const MIN_ZOOM: f64 = 0.1;
pub const MAX_ZOOM: f64 = 4.0;
/// Screen pixels a press may travel before it stops counting as a click.
pub const CLICK_SLOP: f64 = 3.0;
const FIT_PADDING: f64 = 40.0;
const FIT_MAX_ZOOM: f64 = 1.5;

#[derive(Clone, Debug, PartialEq)]
pub struct ViewTransform {
	pub x: f64,
	pub y: f64,
	pub k: f64,
}

impl Default for ViewTransform {
	fn default() -> Self {
		Self { x: 0.0, y: 0.0, k: 1.0 }
	}
}

/// What lies under the pointer, in hit-test priority order.
#[derive(Clone, Debug, PartialEq)]
pub enum Hit {
	AddChild(String),
	SourceHandle(String),
	Node(String),
	Edge(String),
	Background,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub enum Gesture {
	#[default]
	Idle,
	Pan {
		start_x: f64,
		start_y: f64,
		transform_start_x: f64,
		transform_start_y: f64,
	},
	/// Press on an add-child button; a click adds a child, a drag connects.
	Press {
		node_id: String,
		start_x: f64,
		start_y: f64,
	},
	Drag {
		node_id: String,
		start_x: f64,
		start_y: f64,
		node_start: Position,
		moved: bool,
	},
	Connect {
		source: String,
		cursor_x: f64,
		cursor_y: f64,
	},
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct Selection {
	pub nodes: Vec<String>,
	pub edges: Vec<String>,
}

impl Selection {
	pub fn clear(&mut self) {
		self.nodes.clear();
		self.edges.clear();
	}

	pub fn has_node(&self, id: &str) -> bool {
		self.nodes.iter().any(|n| n == id)
	}

	pub fn has_edge(&self, id: &str) -> bool {
		self.edges.iter().any(|e| e == id)
	}
}

/// Graph plus everything the canvas needs to draw and interact with it.
pub struct CanvasState {
	pub graph: PlanGraph,
	pub transform: ViewTransform,
	pub gesture: Gesture,
	pub selection: Selection,
	pub hover: Option<String>,
	pub width: f64,
	pub height: f64,
	pub flow_time: f64,
}

impl CanvasState {
	pub fn new(graph: PlanGraph, width: f64, height: f64) -> Self {
		let mut state = Self {
			graph,
			transform: ViewTransform::default(),
			gesture: Gesture::Idle,
			selection: Selection::default(),
			hover: None,
			width,
			height,
			flow_time: 0.0,
		};
		state.fit_view();
		state
	}

	pub fn screen_to_graph(&self, sx: f64, sy: f64) -> (f64, f64) {
		(
			(sx - self.transform.x) / self.transform.k,
			(sy - self.transform.y) / self.transform.k,
		)
	}

	pub fn graph_to_screen(&self, gx: f64, gy: f64) -> (f64, f64) {
		(
			gx * self.transform.k + self.transform.x,
			gy * self.transform.k + self.transform.y,
		)
	}

	pub fn hit_test(&self, sx: f64, sy: f64) -> Hit {
		let p = self.screen_to_graph(sx, sy);
		let footprint = self.graph.config().footprint;
		let nodes = self.graph.nodes();

		// topmost first: later nodes are drawn over earlier ones
		for node in nodes.iter().rev() {
			if node.kind == NodeKind::Plan
				&& geometry::distance(p, geometry::add_button_center(node, footprint))
					<= ADD_BUTTON_RADIUS
			{
				return Hit::AddChild(node.id.clone());
			}
			let handle = geometry::handle_point(node, geometry::source_side(node), footprint);
			if geometry::distance(p, handle) <= HANDLE_HIT_RADIUS {
				return Hit::SourceHandle(node.id.clone());
			}
		}
		if let Some(node) = nodes.iter().rev().find(|n| geometry::contains(n, footprint, p)) {
			return Hit::Node(node.id.clone());
		}
		let tolerance = EDGE_HIT_TOLERANCE / self.transform.k;
		for edge in self.graph.edges().iter().rev() {
			let (Some(source), Some(target)) = (self.graph.node(&edge.source), self.graph.node(&edge.target))
			else {
				continue;
			};
			let curve = geometry::edge_curve(source, target, footprint);
			if geometry::distance_to_curve(&curve, p) <= tolerance {
				return Hit::Edge(edge.key());
			}
		}
		Hit::Background
	}

	/// Node whose box contains the screen point.
	pub fn node_at_position(&self, sx: f64, sy: f64) -> Option<String> {
		let p = self.screen_to_graph(sx, sy);
		let footprint = self.graph.config().footprint;
		self.graph
			.nodes()
			.iter()
			.rev()
			.find(|n| geometry::contains(n, footprint, p))
			.map(|n| n.id.clone())
	}

	pub fn pointer_down(&mut self, sx: f64, sy: f64) {
		match self.hit_test(sx, sy) {
			Hit::AddChild(node_id) => {
				self.gesture = Gesture::Press {
					node_id,
					start_x: sx,
					start_y: sy,
				};
			}
			Hit::SourceHandle(source) => {
				let (cursor_x, cursor_y) = self.screen_to_graph(sx, sy);
				self.gesture = Gesture::Connect {
					source,
					cursor_x,
					cursor_y,
				};
			}
			Hit::Node(node_id) => {
				let Some(node) = self.graph.node(&node_id) else {
					return;
				};
				self.selection.clear();
				self.selection.nodes.push(node_id.clone());
				self.gesture = Gesture::Drag {
					node_start: node.position,
					node_id,
					start_x: sx,
					start_y: sy,
					moved: false,
				};
			}
			Hit::Edge(edge_id) => {
				self.selection.clear();
				self.selection.edges.push(edge_id);
			}
			Hit::Background => {
				self.selection.clear();
				self.gesture = Gesture::Pan {
					start_x: sx,
					start_y: sy,
					transform_start_x: self.transform.x,
					transform_start_y: self.transform.y,
				};
			}
		}
	}

	pub fn pointer_move(&mut self, sx: f64, sy: f64) {
		let (gx, gy) = self.screen_to_graph(sx, sy);
		let k = self.transform.k;
		if self.gesture == Gesture::Idle {
			self.hover = self.node_at_position(sx, sy);
			return;
		}
		match &mut self.gesture {
			Gesture::Idle => {}
			Gesture::Pan {
				start_x,
				start_y,
				transform_start_x,
				transform_start_y,
			} => {
				self.transform.x = *transform_start_x + (sx - *start_x);
				self.transform.y = *transform_start_y + (sy - *start_y);
			}
			Gesture::Press {
				node_id,
				start_x,
				start_y,
			} => {
				if (sx - *start_x).hypot(sy - *start_y) >= CLICK_SLOP {
					let source = std::mem::take(node_id);
					self.gesture = Gesture::Connect {
						source,
						cursor_x: gx,
						cursor_y: gy,
					};
				}
			}
			Gesture::Drag {
				node_id,
				start_x,
				start_y,
				node_start,
				moved,
			} => {
				let (dx, dy) = (sx - *start_x, sy - *start_y);
				if !*moved && (dx * dx + dy * dy).sqrt() < CLICK_SLOP {
					return;
				}
				*moved = true;
				let position = Position::new(node_start.x + dx / k, node_start.y + dy / k);
				let id = node_id.clone();
				if let Err(err) = self.graph.move_node(&id, position) {
					warn!("move rejected: {}", err);
				}
			}
			Gesture::Connect {
				cursor_x, cursor_y, ..
			} => {
				*cursor_x = gx;
				*cursor_y = gy;
			}
		}
	}

	/// Finishes the current gesture. Returns the id of a clicked node.
	pub fn pointer_up(&mut self, sx: f64, sy: f64) -> Option<String> {
		match std::mem::take(&mut self.gesture) {
			Gesture::Press { node_id, .. } => {
				if let Err(err) = self.graph.add_child(&node_id) {
					warn!("add child rejected: {}", err);
				}
				self.prune_selection();
				None
			}
			Gesture::Drag {
				node_id,
				moved: false,
				..
			} => Some(node_id),
			Gesture::Connect { source, .. } => {
				let target = self.node_at_position(sx, sy)?;
				if target != source {
					match self.graph.connect(&source, &target) {
						Ok(true) => {}
						Ok(false) => info!("{} -> {} already connected", source, target),
						Err(err) => warn!("connect rejected: {}", err),
					}
				}
				None
			}
			_ => None,
		}
	}

	pub fn pointer_leave(&mut self) {
		self.gesture = Gesture::Idle;
		self.hover = None;
	}

	/// Zooms about the cursor.
	pub fn wheel(&mut self, sx: f64, sy: f64, delta_y: f64) {
		let factor = if delta_y > 0.0 { 0.9 } else { 1.1 };
		let new_k = (self.transform.k * factor).clamp(MIN_ZOOM, MAX_ZOOM);
		let ratio = new_k / self.transform.k;
		self.transform.x = sx - (sx - self.transform.x) * ratio;
		self.transform.y = sy - (sy - self.transform.y) * ratio;
		self.transform.k = new_k;
	}

	/// One zoom step about the middle of the canvas.
	pub fn zoom_step(&mut self, zoom_in: bool) {
		let delta = if zoom_in { -1.0 } else { 1.0 };
		self.wheel(self.width / 2.0, self.height / 2.0, delta);
	}

	/// Deletes the selected nodes, or the selected edges when no node is selected.
	pub fn delete_selection(&mut self) {
		if !self.selection.nodes.is_empty() {
			let ids = std::mem::take(&mut self.selection.nodes);
			self.graph.delete_nodes(&ids);
		} else if !self.selection.edges.is_empty() {
			let ids = std::mem::take(&mut self.selection.edges);
			self.graph.delete_edges(&ids);
		}
		self.prune_selection();
	}

	pub fn toggle_direction(&mut self) {
		let direction = self.graph.direction().toggled();
		self.graph.set_direction(direction);
		self.fit_view();
	}

	/// Centers the graph and zooms so every node is visible.
	pub fn fit_view(&mut self) {
		let footprint = self.graph.config().footprint;
		let nodes = self.graph.nodes();
		if nodes.is_empty() {
			self.transform = ViewTransform {
				x: self.width / 2.0,
				y: self.height / 2.0,
				k: 1.0,
			};
			return;
		}
		let (mut min_x, mut min_y) = (f64::INFINITY, f64::INFINITY);
		let (mut max_x, mut max_y) = (f64::NEG_INFINITY, f64::NEG_INFINITY);
		for node in nodes {
			min_x = min_x.min(node.position.x);
			min_y = min_y.min(node.position.y);
			max_x = max_x.max(node.position.x + footprint.width);
			max_y = max_y.max(node.position.y + footprint.height);
		}
		let (bw, bh) = (max_x - min_x + 2.0 * FIT_PADDING, max_y - min_y + 2.0 * FIT_PADDING);
		let k = (self.width / bw)
			.min(self.height / bh)
			.clamp(MIN_ZOOM, FIT_MAX_ZOOM);
		let (cx, cy) = ((min_x + max_x) / 2.0, (min_y + max_y) / 2.0);
		self.transform = ViewTransform {
			x: self.width / 2.0 - cx * k,
			y: self.height / 2.0 - cy * k,
			k,
		};
	}

	pub fn tick(&mut self, dt: f64) {
		self.flow_time += dt;
	}

	pub fn resize(&mut self, width: f64, height: f64) {
		self.width = width;
		self.height = height;
	}

	fn prune_selection(&mut self) {
		let graph = &self.graph;
		self.selection.nodes.retain(|id| graph.contains(id));
		self.selection
			.edges
			.retain(|id| graph.edges().iter().any(|e| e.key() == *id));
		if self.hover.as_deref().is_some_and(|id| !graph.contains(id)) {
			self.hover = None;
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::graph::{PlanEdge, PlanNode};
	use crate::layout::LayoutConfig;

	fn state() -> CanvasState {
		let graph = PlanGraph::new(
			vec![PlanNode::new("n1", "Node 1"), PlanNode::new("n2", "Node 2")],
			vec![PlanEdge::new("n1", "n2")],
			// leaves room between the add button and the edge midpoint
			LayoutConfig::default().with_rank_spacing(150.0),
		)
		.unwrap();
		let mut state = CanvasState::new(graph, 800.0, 600.0);
		// identity transform keeps screen and graph space equal
		state.transform = ViewTransform::default();
		state
	}

	/// Screen point in the middle of a node's box.
	fn center_of(state: &CanvasState, id: &str) -> (f64, f64) {
		let node = state.graph.node(id).unwrap();
		let fp = state.graph.config().footprint;
		(node.position.x + fp.width / 2.0, node.position.y + fp.height / 2.0)
	}

	#[test]
	fn screen_graph_round_trip() {
		let mut state = state();
		state.transform = ViewTransform { x: 30.0, y: -12.0, k: 2.5 };
		let (gx, gy) = state.screen_to_graph(100.0, 50.0);
		let (sx, sy) = state.graph_to_screen(gx, gy);
		assert!((sx - 100.0).abs() < 1e-9 && (sy - 50.0).abs() < 1e-9);
	}

	#[test]
	fn hit_test_priorities() {
		let state = state();
		let (cx, cy) = center_of(&state, "n1");
		assert_eq!(state.hit_test(cx, cy), Hit::Node("n1".into()));

		let node = state.graph.node("n1").unwrap();
		let fp = state.graph.config().footprint;
		// the add button covers a plan node's source handle
		let (bx, by) = geometry::add_button_center(node, fp);
		assert_eq!(state.hit_test(bx, by), Hit::AddChild("n1".into()));

		assert_eq!(state.hit_test(-500.0, -500.0), Hit::Background);
	}

	#[test]
	fn edge_is_hit_midway() {
		let state = state();
		let fp = state.graph.config().footprint;
		let curve = geometry::edge_curve(
			state.graph.node("n1").unwrap(),
			state.graph.node("n2").unwrap(),
			fp,
		);
		let (mx, my) = geometry::bezier_point(&curve, 0.5);
		assert_eq!(state.hit_test(mx, my), Hit::Edge("n1-n2".into()));
	}

	#[test]
	fn click_without_motion_reports_node() {
		let mut state = state();
		let (cx, cy) = center_of(&state, "n2");
		state.pointer_down(cx, cy);
		state.pointer_move(cx + 1.0, cy);
		assert_eq!(state.pointer_up(cx + 1.0, cy), Some("n2".into()));
		assert!(state.selection.has_node("n2"));
	}

	#[test]
	fn dragging_moves_without_relayout() {
		let mut state = state();
		let (cx, cy) = center_of(&state, "n2");
		let before = state.graph.node("n2").unwrap().position;
		state.pointer_down(cx, cy);
		state.pointer_move(cx + 40.0, cy + 10.0);
		assert_eq!(state.pointer_up(cx + 40.0, cy + 10.0), None);
		let after = state.graph.node("n2").unwrap().position;
		assert_eq!(after, Position::new(before.x + 40.0, before.y + 10.0));
		assert_eq!(state.graph.node("n1").unwrap().position, Position::new(0.0, 0.0));
	}

	#[test]
	fn add_button_spawns_child() {
		let mut state = state();
		let node = state.graph.node("n2").unwrap();
		let (bx, by) = geometry::add_button_center(node, state.graph.config().footprint);
		state.pointer_down(bx, by);
		assert_eq!(state.pointer_up(bx, by), None);
		assert_eq!(state.graph.nodes().len(), 3);
		assert_eq!(state.graph.edges().len(), 2);
	}

	#[test]
	fn default_node_exposes_source_handle() {
		let graph = PlanGraph::new(
			vec![PlanNode::new("d", "D").with_kind(NodeKind::Default)],
			Vec::new(),
			LayoutConfig::default(),
		)
		.unwrap();
		let mut state = CanvasState::new(graph, 800.0, 600.0);
		state.transform = ViewTransform::default();
		let d = state.graph.node("d").unwrap();
		let (hx, hy) = geometry::handle_point(d, geometry::source_side(d), state.graph.config().footprint);
		assert_eq!(state.hit_test(hx, hy), Hit::SourceHandle("d".into()));
	}

	#[test]
	fn dragging_from_add_button_connects() {
		let mut state = state();
		let (bx, by) = geometry::add_button_center(state.graph.node("n2").unwrap(), state.graph.config().footprint);
		state.pointer_down(bx, by);
		assert!(matches!(state.gesture, Gesture::Press { .. }));
		let (cx, cy) = center_of(&state, "n1");
		state.pointer_move(cx, cy);
		assert!(matches!(state.gesture, Gesture::Connect { .. }));
		assert_eq!(state.pointer_up(cx, cy), None);

		// connected instead of spawning a child
		assert_eq!(state.graph.nodes().len(), 2);
		assert!(state.graph.edges().iter().any(|e| e.connects("n2", "n1")));
	}

	#[test]
	fn connect_gesture_links_nodes() {
		let graph = PlanGraph::new(
			vec![
				PlanNode::new("a", "A").with_kind(NodeKind::Default),
				PlanNode::new("b", "B"),
			],
			Vec::new(),
			LayoutConfig::default(),
		)
		.unwrap();
		let mut state = CanvasState::new(graph, 800.0, 600.0);
		state.transform = ViewTransform::default();

		let a = state.graph.node("a").unwrap();
		let (hx, hy) = geometry::handle_point(a, geometry::source_side(a), state.graph.config().footprint);
		state.pointer_down(hx, hy);
		assert!(matches!(state.gesture, Gesture::Connect { .. }));
		let (bx, by) = center_of(&state, "b");
		state.pointer_move(bx, by);
		state.pointer_up(bx, by);

		assert_eq!(state.graph.edges().len(), 1);
		assert_eq!(state.graph.edges()[0].id.as_deref(), Some("a-b"));
		assert_eq!(state.gesture, Gesture::Idle);
	}

	#[test]
	fn delete_prefers_selected_nodes() {
		let mut state = state();
		let (cx, cy) = center_of(&state, "n2");
		state.pointer_down(cx, cy);
		state.pointer_up(cx, cy);
		state.selection.edges.push("n1-n2".into());
		state.delete_selection();
		assert_eq!(state.graph.nodes().len(), 1);
		assert!(state.graph.edges().is_empty());
		assert_eq!(state.selection, Selection::default());
	}

	#[test]
	fn delete_selected_edge_keeps_nodes() {
		let mut state = state();
		state.selection.edges.push("n1-n2".into());
		state.delete_selection();
		assert_eq!(state.graph.nodes().len(), 2);
		assert!(state.graph.edges().is_empty());
	}

	#[test]
	fn panning_background_shifts_transform() {
		let mut state = state();
		state.pointer_down(-300.0, -300.0);
		state.pointer_move(-250.0, -280.0);
		state.pointer_up(-250.0, -280.0);
		assert_eq!((state.transform.x, state.transform.y), (50.0, 20.0));
	}

	#[test]
	fn zoom_is_clamped_and_anchored() {
		let mut state = state();
		let anchor = state.screen_to_graph(200.0, 100.0);
		state.wheel(200.0, 100.0, -1.0);
		let after = state.screen_to_graph(200.0, 100.0);
		assert!((anchor.0 - after.0).abs() < 1e-9 && (anchor.1 - after.1).abs() < 1e-9);
		for _ in 0..100 {
			state.wheel(0.0, 0.0, 1.0);
		}
		assert_eq!(state.transform.k, MIN_ZOOM);
	}

	#[test]
	fn zoom_buttons_keep_canvas_center_fixed() {
		let mut state = state();
		let center = state.screen_to_graph(400.0, 300.0);
		state.zoom_step(true);
		assert!((state.transform.k - 1.1).abs() < 1e-9);
		state.zoom_step(false);
		state.zoom_step(false);
		let after = state.screen_to_graph(400.0, 300.0);
		assert!((center.0 - after.0).abs() < 1e-9 && (center.1 - after.1).abs() < 1e-9);
		assert!(state.transform.k < 1.0);
	}

	#[test]
	fn fit_view_keeps_every_node_on_screen() {
		let mut state = state();
		state.fit_view();
		let fp = state.graph.config().footprint;
		for node in state.graph.nodes() {
			let (x0, y0) = state.graph_to_screen(node.position.x, node.position.y);
			let (x1, y1) = state.graph_to_screen(node.position.x + fp.width, node.position.y + fp.height);
			assert!(x0 >= 0.0 && y0 >= 0.0 && x1 <= 800.0 && y1 <= 600.0);
		}
	}
}
