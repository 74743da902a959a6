use crate::graph::PlanNode;
use crate::layout::{Footprint, Side};

pub const HANDLE_RADIUS: f64 = 4.0;
pub const HANDLE_HIT_RADIUS: f64 = 9.0;
pub const ADD_BUTTON_RADIUS: f64 = 12.0;
pub const EDGE_HIT_TOLERANCE: f64 = 6.0;
const EDGE_SAMPLES: usize = 24;

pub type Point = (f64, f64);

/// Attachment point of `side` on the node box.
pub fn handle_point(node: &PlanNode, side: Side, footprint: Footprint) -> Point {
	let (x, y) = (node.position.x, node.position.y);
	let (w, h) = (footprint.width, footprint.height);
	match side {
		Side::Top => (x + w / 2.0, y),
		Side::Bottom => (x + w / 2.0, y + h),
		Side::Left => (x, y + h / 2.0),
		Side::Right => (x + w, y + h / 2.0),
	}
}

/// Unit vector pointing out of the box through `side`.
pub fn outward(side: Side) -> Point {
	match side {
		Side::Top => (0.0, -1.0),
		Side::Bottom => (0.0, 1.0),
		Side::Left => (-1.0, 0.0),
		Side::Right => (1.0, 0.0),
	}
}

pub fn source_side(node: &PlanNode) -> Side {
	node.source_position.unwrap_or(Side::Bottom)
}

pub fn target_side(node: &PlanNode) -> Side {
	node.target_position.unwrap_or(Side::Top)
}

/// Center of the add-child button. It straddles the source side, covering the
/// source handle.
pub fn add_button_center(node: &PlanNode, footprint: Footprint) -> Point {
	handle_point(node, source_side(node), footprint)
}

pub fn contains(node: &PlanNode, footprint: Footprint, (x, y): Point) -> bool {
	x >= node.position.x
		&& x <= node.position.x + footprint.width
		&& y >= node.position.y
		&& y <= node.position.y + footprint.height
}

pub fn distance((ax, ay): Point, (bx, by): Point) -> f64 {
	((ax - bx).powi(2) + (ay - by).powi(2)).sqrt()
}

/// Cubic bezier from the source handle to the target handle.
pub fn edge_curve(source: &PlanNode, target: &PlanNode, footprint: Footprint) -> [Point; 4] {
	let (s_side, t_side) = (source_side(source), target_side(target));
	let (start, end) = (
		handle_point(source, s_side, footprint),
		handle_point(target, t_side, footprint),
	);
	let pull = (distance(start, end) * 0.4).max(20.0);
	let (so, to) = (outward(s_side), outward(t_side));
	[
		start,
		(start.0 + so.0 * pull, start.1 + so.1 * pull),
		(end.0 + to.0 * pull, end.1 + to.1 * pull),
		end,
	]
}

pub fn bezier_point(curve: &[Point; 4], t: f64) -> Point {
	let u = 1.0 - t;
	let (a, b, c, d) = (u * u * u, 3.0 * u * u * t, 3.0 * u * t * t, t * t * t);
	(
		a * curve[0].0 + b * curve[1].0 + c * curve[2].0 + d * curve[3].0,
		a * curve[0].1 + b * curve[1].1 + c * curve[2].1 + d * curve[3].1,
	)
}

fn distance_to_segment(p: Point, a: Point, b: Point) -> f64 {
	let (dx, dy) = (b.0 - a.0, b.1 - a.1);
	let len2 = dx * dx + dy * dy;
	if len2 < f64::EPSILON {
		return distance(p, a);
	}
	let t = (((p.0 - a.0) * dx + (p.1 - a.1) * dy) / len2).clamp(0.0, 1.0);
	distance(p, (a.0 + t * dx, a.1 + t * dy))
}

/// Shortest distance from `p` to a sampled bezier.
pub fn distance_to_curve(curve: &[Point; 4], p: Point) -> f64 {
	let mut prev = curve[0];
	let mut best = f64::INFINITY;
	for i in 1..=EDGE_SAMPLES {
		let next = bezier_point(curve, i as f64 / EDGE_SAMPLES as f64);
		best = best.min(distance_to_segment(p, prev, next));
		prev = next;
	}
	best
}

#[cfg(test)]
mod tests {
	use super::*;

	fn node(side: Option<(Side, Side)>) -> PlanNode {
		let mut node = PlanNode::new("n", "N").with_position(10.0, 20.0);
		if let Some((source, target)) = side {
			node.source_position = Some(source);
			node.target_position = Some(target);
		}
		node
	}

	#[test]
	fn handles_sit_on_box_edges() {
		let (n, fp) = (node(None), Footprint { width: 100.0, height: 40.0 });
		assert_eq!(handle_point(&n, Side::Top, fp), (60.0, 20.0));
		assert_eq!(handle_point(&n, Side::Bottom, fp), (60.0, 60.0));
		assert_eq!(handle_point(&n, Side::Left, fp), (10.0, 40.0));
		assert_eq!(handle_point(&n, Side::Right, fp), (110.0, 40.0));
	}

	#[test]
	fn add_button_follows_source_side() {
		let fp = Footprint { width: 100.0, height: 40.0 };
		let (x, y) = add_button_center(&node(Some((Side::Right, Side::Left))), fp);
		assert_eq!((x, y), (110.0, 40.0));
		// half the button hangs below the box
		let (x, y) = add_button_center(&node(None), fp);
		assert_eq!((x, y), (60.0, 60.0));
		assert!(y - ADD_BUTTON_RADIUS < 60.0 && y + ADD_BUTTON_RADIUS > 60.0);
	}

	#[test]
	fn curve_endpoints_are_handles() {
		let fp = Footprint::default();
		let a = node(None);
		let b = PlanNode::new("m", "M").with_position(10.0, 200.0);
		let curve = edge_curve(&a, &b, fp);
		assert_eq!(bezier_point(&curve, 0.0), handle_point(&a, Side::Bottom, fp));
		assert_eq!(bezier_point(&curve, 1.0), handle_point(&b, Side::Top, fp));
		assert!(distance_to_curve(&curve, handle_point(&a, Side::Bottom, fp)) < 1e-9);
		assert!(distance_to_curve(&curve, (1000.0, 1000.0)) > EDGE_HIT_TOLERANCE);
	}
}
