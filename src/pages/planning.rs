use leptos::prelude::*;

use crate::components::planning_canvas::PlanningCanvas;
use crate::components::workspace::{Workspace, WorkspaceState};
use crate::graph::{PlanEdge, PlanGraph, PlanNode};
use crate::layout::LayoutConfig;

/// Five nodes fanning out from `n1`, every edge animated.
fn initial_graph() -> (Vec<PlanNode>, Vec<PlanEdge>) {
	let nodes = (1..=5)
		.map(|i| PlanNode::new(format!("n{}", i), format!("Node {}", i)))
		.collect();
	let edges = [("n1", "n2"), ("n1", "n3"), ("n1", "n4"), ("n2", "n5"), ("n1", "n5")]
		.into_iter()
		.map(|(s, t)| PlanEdge::new(s, t).with_id(PlanEdge::derived_id(s, t)).animated())
		.collect();
	(nodes, edges)
}

/// The planning board: the canvas plus the editor window it opens.
#[component]
pub fn Planning() -> impl IntoView {
	let (nodes, edges) = initial_graph();
	let graph = PlanGraph::new(nodes, edges, LayoutConfig::default());
	let workspace = RwSignal::new(WorkspaceState::default());

	let node_pressed =
		Signal::derive(move || workspace.with(|ws| ws.node_id().map(str::to_string)));

	view! {
		<ErrorBoundary fallback=|errors| {
			view! {
				<h1>"Uh oh! Something went wrong!"</h1>

				<p>"Errors: "</p>
				<ul>
					{move || {
						errors
							.get()
							.into_iter()
							.map(|(_, e)| view! { <li>{e.to_string()}</li> })
							.collect_view()
					}}
				</ul>
			}
		}>
			{graph
				.map(|graph| {
					view! {
						<div class="planning-board" style="width: 100vw; height: 100vh;">
							<PlanningCanvas
								graph=graph
								fullscreen=true
								on_node_click=move |id: String| workspace.update(|ws| ws.toggle(id))
							/>
							<Show when=move || workspace.with(WorkspaceState::is_open)>
								<Workspace
									node_pressed=node_pressed
									on_close=move |_: ()| workspace.update(WorkspaceState::close)
								/>
							</Show>
						</div>
					}
				})}
		</ErrorBoundary>
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn initial_graph_lays_out_top_to_bottom() {
		let (nodes, edges) = initial_graph();
		let graph = PlanGraph::new(nodes, edges, LayoutConfig::default()).unwrap();
		assert_eq!(graph.nodes().len(), 5);
		assert_eq!(graph.edges().len(), 5);
		assert!(graph.edges().iter().all(|e| e.animated));

		let y = |id: &str| graph.node(id).unwrap().position.y;
		assert!(y("n1") < y("n2"));
		assert!(y("n2") < y("n5"));
	}
}
