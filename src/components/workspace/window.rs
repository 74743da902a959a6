use leptos::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::{Element, MouseEvent};

use super::editor::{MarkdownEditor, PLACEHOLDER};
use super::state::WindowFrame;

const WINDOW_WIDTH: f64 = 1000.0;
const WINDOW_HEIGHT: f64 = 500.0;

const WINDOW_STYLE: &str = "position: fixed; z-index: 1000; display: flex; flex-direction: column; \
	background: #09080a; color: #eee; border: 1px solid #333; border-radius: 8px; \
	box-shadow: 0 8px 32px rgba(0, 0, 0, 0.5); overflow: hidden;";
const TITLE_STYLE: &str = "display: flex; align-items: center; justify-content: space-between; \
	padding: 6px 12px; background: #151317; cursor: move; user-select: none;";

fn viewport() -> (f64, f64) {
	web_sys::window()
		.and_then(|w| Some((w.inner_width().ok()?.as_f64()?, w.inner_height().ok()?.as_f64()?)))
		.unwrap_or((1280.0, 720.0))
}

fn pressed_button(ev: &MouseEvent) -> bool {
	ev.target()
		.and_then(|t| t.dyn_into::<Element>().ok())
		.is_some_and(|el| el.tag_name().eq_ignore_ascii_case("button"))
}

/// Floating, draggable editor window for the node that opened it.
#[component]
pub fn Workspace(
	#[prop(into)] node_pressed: Signal<Option<String>>,
	#[prop(into)] on_close: Callback<()>,
) -> impl IntoView {
	let (vw, vh) = viewport();
	let frame = RwSignal::new(WindowFrame::centered(WINDOW_WIDTH, WINDOW_HEIGHT, vw, vh));
	// last pointer position while the title bar is held
	let grab = RwSignal::new(None::<(f64, f64)>);

	let on_title_down = move |ev: MouseEvent| {
		if pressed_button(&ev) {
			return;
		}
		ev.prevent_default();
		grab.set(Some((ev.client_x() as f64, ev.client_y() as f64)));
	};
	let on_drag_move = move |ev: MouseEvent| {
		let Some((last_x, last_y)) = grab.get_untracked() else {
			return;
		};
		let (x, y) = (ev.client_x() as f64, ev.client_y() as f64);
		let (vw, vh) = viewport();
		frame.update(|f| *f = f.dragged(x - last_x, y - last_y, vw, vh));
		grab.set(Some((x, y)));
	};
	let on_drag_end = move |_: MouseEvent| grab.set(None);

	view! {
		// catches the pointer everywhere while dragging so the canvas never sees it
		<Show when=move || grab.get().is_some()>
			<div
				class="workspace__drag-shield"
				style="position: fixed; inset: 0; z-index: 1001; cursor: move;"
				on:mousemove=on_drag_move
				on:mouseup=on_drag_end
				on:mouseleave=on_drag_end
			/>
		</Show>
		<div class="workspace" style=move || format!("{} {}", WINDOW_STYLE, frame.get().style())>
			<div class="workspace__title" style=TITLE_STYLE on:mousedown=on_title_down>
				<span>
					{move || node_pressed.get().map(|id| format!("Node {}", id)).unwrap_or_default()}
				</span>
				<button class="workspace__close" on:click=move |_| on_close.run(())>
					"×"
				</button>
			</div>
			<div class="workspace__body" style="flex: 1; min-height: 0;">
				<MarkdownEditor md_input=PLACEHOLDER />
			</div>
		</div>
	}
}
