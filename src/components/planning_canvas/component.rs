use std::cell::RefCell;
use std::rc::Rc;

use leptos::prelude::*;
use log::{error, info};
use wasm_bindgen::prelude::*;
use web_sys::{
	CanvasRenderingContext2d, HtmlCanvasElement, KeyboardEvent, MouseEvent, WheelEvent, Window,
};

use super::render;
use super::state::CanvasState;
use crate::graph::PlanGraph;

const CONTROLS_STYLE: &str = "position: absolute; left: 16px; bottom: 16px; display: flex; gap: 6px;";

fn window_size(window: &Window) -> Option<(f64, f64)> {
	Some((
		window.inner_width().ok()?.as_f64()?,
		window.inner_height().ok()?.as_f64()?,
	))
}

/// Pointer position relative to the canvas' top-left corner.
fn local_point(canvas_ref: NodeRef<leptos::html::Canvas>, ev: &MouseEvent) -> Option<(f64, f64)> {
	let canvas: HtmlCanvasElement = canvas_ref.get()?.into();
	let rect = canvas.get_bounding_client_rect();
	Some((
		ev.client_x() as f64 - rect.left(),
		ev.client_y() as f64 - rect.top(),
	))
}

#[component]
pub fn PlanningCanvas(
	graph: PlanGraph,
	#[prop(into)] on_node_click: Callback<String>,
	#[prop(default = false)] fullscreen: bool,
	#[prop(default = None)] width: Option<f64>,
	#[prop(default = None)] height: Option<f64>,
) -> impl IntoView {
	let canvas_ref = NodeRef::<leptos::html::Canvas>::new();
	let direction = RwSignal::new(graph.direction());
	let state: Rc<RefCell<Option<CanvasState>>> = Rc::new(RefCell::new(None));
	let animate: Rc<RefCell<Option<Closure<dyn FnMut()>>>> = Rc::new(RefCell::new(None));
	let resize_cb: Rc<RefCell<Option<Closure<dyn FnMut()>>>> = Rc::new(RefCell::new(None));
	let (state_init, animate_init, resize_cb_init) =
		(state.clone(), animate.clone(), resize_cb.clone());

	Effect::new(move |_| {
		let Some(canvas) = canvas_ref.get() else {
			return;
		};
		if state_init.borrow().is_some() {
			return;
		}
		let canvas: HtmlCanvasElement = canvas.into();
		let Some(window) = web_sys::window() else {
			error!("no window; canvas not started");
			return;
		};

		let (w, h) = if fullscreen {
			window_size(&window).unwrap_or((800.0, 600.0))
		} else {
			(
				width.unwrap_or_else(|| {
					canvas
						.parent_element()
						.map(|p| p.client_width() as f64)
						.unwrap_or(800.0)
				}),
				height.unwrap_or_else(|| {
					canvas
						.parent_element()
						.map(|p| p.client_height() as f64)
						.unwrap_or(600.0)
				}),
			)
		};
		canvas.set_width(w as u32);
		canvas.set_height(h as u32);

		let ctx: CanvasRenderingContext2d = match canvas.get_context("2d") {
			Ok(Some(ctx)) => match ctx.dyn_into() {
				Ok(ctx) => ctx,
				Err(_) => {
					error!("2d context has unexpected type");
					return;
				}
			},
			_ => {
				error!("canvas has no 2d context");
				return;
			}
		};
		*state_init.borrow_mut() = Some(CanvasState::new(graph.clone(), w, h));
		info!(
			"planning canvas ready: {} node(s), {} edge(s)",
			graph.nodes().len(),
			graph.edges().len()
		);

		if fullscreen {
			let (state_resize, canvas_resize) = (state_init.clone(), canvas.clone());
			*resize_cb_init.borrow_mut() = Some(Closure::new(move || {
				let Some((nw, nh)) = web_sys::window().as_ref().and_then(window_size) else {
					return;
				};
				canvas_resize.set_width(nw as u32);
				canvas_resize.set_height(nh as u32);
				if let Some(ref mut s) = *state_resize.borrow_mut() {
					s.resize(nw, nh);
				}
			}));
			if let Some(ref cb) = *resize_cb_init.borrow() {
				let _ =
					window.add_event_listener_with_callback("resize", cb.as_ref().unchecked_ref());
			}
		}

		let (state_anim, animate_inner) = (state_init.clone(), animate_init.clone());
		*animate_init.borrow_mut() = Some(Closure::new(move || {
			if let Some(ref mut s) = *state_anim.borrow_mut() {
				s.tick(0.016);
				render::render(s, &ctx);
			}
			if let (Some(cb), Some(win)) = (animate_inner.borrow().as_ref(), web_sys::window()) {
				let _ = win.request_animation_frame(cb.as_ref().unchecked_ref());
			}
		}));
		if let Some(ref cb) = *animate_init.borrow() {
			let _ = window.request_animation_frame(cb.as_ref().unchecked_ref());
		}
	});

	let state_md = state.clone();
	let on_mousedown = move |ev: MouseEvent| {
		let Some((x, y)) = local_point(canvas_ref, &ev) else {
			return;
		};
		if let Some(ref mut s) = *state_md.borrow_mut() {
			s.pointer_down(x, y);
		}
	};

	let state_mm = state.clone();
	let on_mousemove = move |ev: MouseEvent| {
		let Some((x, y)) = local_point(canvas_ref, &ev) else {
			return;
		};
		if let Some(ref mut s) = *state_mm.borrow_mut() {
			s.pointer_move(x, y);
		}
	};

	let state_mu = state.clone();
	let on_mouseup = move |ev: MouseEvent| {
		let Some((x, y)) = local_point(canvas_ref, &ev) else {
			return;
		};
		let clicked = match *state_mu.borrow_mut() {
			Some(ref mut s) => s.pointer_up(x, y),
			None => None,
		};
		// the borrow is released before the callback can touch other state
		if let Some(node_id) = clicked {
			on_node_click.run(node_id);
		}
	};

	let state_ml = state.clone();
	let on_mouseleave = move |_: MouseEvent| {
		if let Some(ref mut s) = *state_ml.borrow_mut() {
			s.pointer_leave();
		}
	};

	let state_wh = state.clone();
	let on_wheel = move |ev: WheelEvent| {
		ev.prevent_default();
		let Some((x, y)) = local_point(canvas_ref, &ev) else {
			return;
		};
		if let Some(ref mut s) = *state_wh.borrow_mut() {
			s.wheel(x, y, ev.delta_y());
		}
	};

	let state_kd = state.clone();
	let on_keydown = move |ev: KeyboardEvent| {
		if !matches!(ev.key().as_str(), "Delete" | "Backspace") {
			return;
		}
		ev.prevent_default();
		if let Some(ref mut s) = *state_kd.borrow_mut() {
			s.delete_selection();
		}
	};

	let state_dir = state.clone();
	let on_toggle_direction = move |_: MouseEvent| {
		if let Some(ref mut s) = *state_dir.borrow_mut() {
			s.toggle_direction();
			direction.set(s.graph.direction());
		}
	};

	let state_zoom_in = state.clone();
	let on_zoom_in = move |_: MouseEvent| {
		if let Some(ref mut s) = *state_zoom_in.borrow_mut() {
			s.zoom_step(true);
		}
	};

	let state_zoom_out = state.clone();
	let on_zoom_out = move |_: MouseEvent| {
		if let Some(ref mut s) = *state_zoom_out.borrow_mut() {
			s.zoom_step(false);
		}
	};

	let state_fit = state.clone();
	let on_fit_view = move |_: MouseEvent| {
		if let Some(ref mut s) = *state_fit.borrow_mut() {
			s.fit_view();
		}
	};

	let state_log = state.clone();
	let on_log_graph = move |_: MouseEvent| {
		if let Some(ref s) = *state_log.borrow() {
			match s.graph.snapshot_json() {
				Ok(json) => info!("graph snapshot:\n{}", json),
				Err(err) => error!("graph snapshot failed: {}", err),
			}
		}
	};

	view! {
		<div class="planning-canvas" style="position: relative;">
			<canvas
				node_ref=canvas_ref
				class="planning-canvas__surface"
				tabindex="0"
				on:mousedown=on_mousedown
				on:mousemove=on_mousemove
				on:mouseup=on_mouseup
				on:mouseleave=on_mouseleave
				on:wheel=on_wheel
				on:keydown=on_keydown
				style="display: block; cursor: default; outline: none;"
			/>
			<div class="planning-canvas__controls" style=CONTROLS_STYLE>
				<button on:click=on_toggle_direction>
					{move || format!("Direction: {}", direction.get().as_str())}
				</button>
				<button title="Zoom in" on:click=on_zoom_in>"+"</button>
				<button title="Zoom out" on:click=on_zoom_out>"−"</button>
				<button on:click=on_fit_view>"Fit view"</button>
				<button on:click=on_log_graph>"Log graph"</button>
			</div>
		</div>
	}
}
