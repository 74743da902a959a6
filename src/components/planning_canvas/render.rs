use std::f64::consts::PI;

use wasm_bindgen::JsValue;
use web_sys::CanvasRenderingContext2d;

use super::geometry::{self, ADD_BUTTON_RADIUS, HANDLE_RADIUS};
use super::state::{CanvasState, Gesture};
use crate::graph::{NodeKind, PlanNode};
use crate::layout::Footprint;

const BACKGROUND: &str = "#141414";
const DOT: &str = "rgba(255, 255, 255, 0.08)";
const DOT_GAP: f64 = 20.0;
const NODE_FILL: &str = "#1e1e1e";
const NODE_BORDER: &str = "#3c3c3c";
const SELECTED: &str = "#ff0072";
const EDGE: &str = "#b1b1b7";
const HANDLE: &str = "#1a192b";
const ADD_BUTTON: &str = "#4CAF50";
const CORNER: f64 = 3.0;

pub fn render(state: &CanvasState, ctx: &CanvasRenderingContext2d) {
	ctx.set_fill_style_str(BACKGROUND);
	ctx.fill_rect(0.0, 0.0, state.width, state.height);
	draw_background(state, ctx);

	ctx.save();
	let _ = ctx.translate(state.transform.x, state.transform.y);
	let _ = ctx.scale(state.transform.k, state.transform.k);
	draw_edges(state, ctx);
	draw_pending_connection(state, ctx);
	draw_nodes(state, ctx);
	ctx.restore();
}

/// Dot grid that pans and scales with the view.
fn draw_background(state: &CanvasState, ctx: &CanvasRenderingContext2d) {
	let gap = DOT_GAP * state.transform.k;
	if gap < 6.0 {
		return;
	}
	let (ox, oy) = (state.transform.x.rem_euclid(gap), state.transform.y.rem_euclid(gap));
	ctx.set_fill_style_str(DOT);
	let mut x = ox;
	while x < state.width {
		let mut y = oy;
		while y < state.height {
			ctx.fill_rect(x, y, 1.0, 1.0);
			y += gap;
		}
		x += gap;
	}
}

fn draw_edges(state: &CanvasState, ctx: &CanvasRenderingContext2d) {
	let k = state.transform.k;
	let footprint = state.graph.config().footprint;
	let (dash, gap) = (5.0, 5.0);
	let dash_offset = -(state.flow_time * 30.0) % (dash + gap);

	for edge in state.graph.edges() {
		let (Some(source), Some(target)) = (state.graph.node(&edge.source), state.graph.node(&edge.target))
		else {
			continue;
		};
		let curve = geometry::edge_curve(source, target, footprint);
		let selected = state.selection.has_edge(&edge.key());

		ctx.set_stroke_style_str(if selected { SELECTED } else { EDGE });
		let width: f64 = if selected { 2.0 } else { 1.0 };
		ctx.set_line_width(width.max(1.0 / k));
		if edge.animated {
			let _ = ctx.set_line_dash(&js_sys::Array::of2(
				&JsValue::from_f64(dash),
				&JsValue::from_f64(gap),
			));
			ctx.set_line_dash_offset(dash_offset);
		} else {
			let _ = ctx.set_line_dash(&js_sys::Array::new());
		}

		ctx.begin_path();
		ctx.move_to(curve[0].0, curve[0].1);
		ctx.bezier_curve_to(
			curve[1].0, curve[1].1, curve[2].0, curve[2].1, curve[3].0, curve[3].1,
		);
		ctx.stroke();
	}
	let _ = ctx.set_line_dash(&js_sys::Array::new());
}

fn draw_pending_connection(state: &CanvasState, ctx: &CanvasRenderingContext2d) {
	let Gesture::Connect {
		source,
		cursor_x,
		cursor_y,
	} = &state.gesture
	else {
		return;
	};
	let Some(node) = state.graph.node(source) else {
		return;
	};
	let (sx, sy) = geometry::handle_point(
		node,
		geometry::source_side(node),
		state.graph.config().footprint,
	);
	ctx.set_stroke_style_str(EDGE);
	ctx.set_line_width(1.0 / state.transform.k);
	ctx.begin_path();
	ctx.move_to(sx, sy);
	ctx.line_to(*cursor_x, *cursor_y);
	ctx.stroke();
}

fn draw_nodes(state: &CanvasState, ctx: &CanvasRenderingContext2d) {
	let footprint = state.graph.config().footprint;
	for node in state.graph.nodes() {
		let selected = state.selection.has_node(&node.id);
		let hovered = state.hover.as_deref() == Some(node.id.as_str());
		draw_node(node, footprint, selected, hovered, state.transform.k, ctx);
	}
}

/// One node: box, label, connector handles and, for plan nodes, the add button.
fn draw_node(
	node: &PlanNode,
	footprint: Footprint,
	selected: bool,
	hovered: bool,
	k: f64,
	ctx: &CanvasRenderingContext2d,
) {
	let (x, y) = (node.position.x, node.position.y);
	let (w, h) = (footprint.width, footprint.height);

	rounded_rect(ctx, x, y, w, h, CORNER);
	ctx.set_fill_style_str(NODE_FILL);
	ctx.fill();
	ctx.set_stroke_style_str(if selected {
		SELECTED
	} else if hovered {
		"#6c6c6c"
	} else {
		NODE_BORDER
	});
	let border: f64 = if selected { 1.5 } else { 1.0 };
	ctx.set_line_width(border / k.max(0.5));
	ctx.stroke();

	ctx.set_fill_style_str("#f8f8f8");
	ctx.set_font("12px sans-serif");
	ctx.set_text_align("center");
	ctx.set_text_baseline("middle");
	let _ = ctx.fill_text_with_max_width(node.label(), x + w / 2.0, y + h / 2.0, w - 10.0);

	for side in [geometry::target_side(node), geometry::source_side(node)] {
		let (hx, hy) = geometry::handle_point(node, side, footprint);
		ctx.begin_path();
		let _ = ctx.arc(hx, hy, HANDLE_RADIUS, 0.0, 2.0 * PI);
		ctx.set_fill_style_str(HANDLE);
		ctx.fill();
		ctx.set_stroke_style_str("#f8f8f8");
		ctx.set_line_width(1.0 / k.max(0.5));
		ctx.stroke();
	}

	if node.kind == NodeKind::Plan {
		let (bx, by) = geometry::add_button_center(node, footprint);
		ctx.begin_path();
		let _ = ctx.arc(bx, by, ADD_BUTTON_RADIUS, 0.0, 2.0 * PI);
		ctx.set_fill_style_str(ADD_BUTTON);
		ctx.fill();
		ctx.set_fill_style_str("white");
		ctx.set_font("16px sans-serif");
		let _ = ctx.fill_text("+", bx, by + 1.0);
	}
}

fn rounded_rect(ctx: &CanvasRenderingContext2d, x: f64, y: f64, w: f64, h: f64, r: f64) {
	ctx.begin_path();
	ctx.move_to(x + r, y);
	ctx.line_to(x + w - r, y);
	let _ = ctx.arc_to(x + w, y, x + w, y + r, r);
	ctx.line_to(x + w, y + h - r);
	let _ = ctx.arc_to(x + w, y + h, x + w - r, y + h, r);
	ctx.line_to(x + r, y + h);
	let _ = ctx.arc_to(x, y + h, x, y + h - r, r);
	ctx.line_to(x, y + r);
	let _ = ctx.arc_to(x, y, x + r, y, r);
	ctx.close_path();
}
