use leptos::prelude::*;

use crate::backend::{GraphSource, RunResponse};
use crate::components::force_graph::ForceGraphCanvas;
use crate::graph::GraphError;

/// A captured backend response for a small program that builds a graph
/// step by step. The trace is replayed, so nodes fade in with their edges.
const SAMPLE_RESPONSE: &str = r#"{
	"status": "success",
	"output": "",
	"structures": [
		{
			"name": "G",
			"type": "graph",
			"payload": {
				"nodes": [{"id": 1, "label": "1"}, {"id": 2, "label": "2"}],
				"links": [{"source": 1, "target": 2}]
			},
			"operations": [
				"Graph created: G",
				"Graph 'G': Node added with value: 1",
				"Graph 'G': Node added with value: 2",
				"Graph 'H': Node added with value: 99",
				"Graph 'G': Node added with value: 3",
				"Graph 'G': Edge added between 1 and 2",
				"Graph 'G': Edge added between 2 and 3",
				"Graph 'G': Edge added between 3 and 4",
				"Graph 'G': Edge added between 4 and 1",
				"Graph 'G': Edge added between 1 and start",
				"Graph 'G': Node added with value: 5",
				"Graph 'G': Edge added between 5 and 3",
				"Graph 'G': Edge removed between 4 and 1"
			]
		},
		{
			"name": "order",
			"type": "list",
			"payload": [1, 2, 3, 4, 5]
		}
	]
}"#;

fn load_sample() -> Result<GraphSource, GraphError> {
	RunResponse::parse(SAMPLE_RESPONSE)?.check()?.graph_source()
}

/// Default Home Page
#[component]
pub fn Home() -> impl IntoView {
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
			{move || {
				load_sample()
					.map(|source| {
						let source = Signal::derive(move || source.clone());
						view! {
							<div class="fullscreen-graph">
								<ForceGraphCanvas source=source fullscreen=true />
								<div class="graph-overlay">
									<h1>"Live Graph"</h1>
									<p class="subtitle">
										"Drag nodes to reposition. Click the \u{2715} to delete a node."
									</p>
								</div>
							</div>
						}
					})
			}}
		</ErrorBoundary>
	}
}
