use leptos::prelude::*;
use leptos_router::hooks::use_params_map;

use crate::components::explorer::GraphExplorer;

/// Relationship graph of one node, expandable in place.
#[component]
pub fn Visualize() -> impl IntoView {
	let params = use_params_map();
	let handle_id = Signal::derive(move || params.read().get("handle_id").unwrap_or_default());

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

			<div class="fullscreen-graph">
				<GraphExplorer root=handle_id fullscreen=true />
				<div class="graph-overlay">
					<h1>"Relationships"</h1>
					<p class="subtitle">
						"Double-click a node to expand it. Drag nodes to pin them. Scroll to zoom. Drag background to pan."
					</p>
				</div>
			</div>
		</ErrorBoundary>
	}
}
