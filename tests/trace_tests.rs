use live_graph_canvas::graph::{GraphApi, Viewport};
use live_graph_canvas::trace::{LineStatus, TraceTranslator, TranslationSummary, translate};

fn api() -> GraphApi {
	GraphApi::with_seed(Viewport::new(500.0, 500.0), 2)
}

#[test]
fn replays_a_simple_trace() {
	let mut api = api();
	let summary = translate(
		&mut api,
		[
			"Graph 'G': Node added with value: 1",
			"Graph 'G': Node added with value: 2",
			"Graph 'G': Edge added between 1 and 2",
		],
	);
	assert_eq!(
		summary,
		TranslationSummary {
			applied: 3,
			out_of_scope: 0,
			unparsed: 0
		}
	);
	assert_eq!(api.node_count(), 2);
	assert!(api.is_connected(1, 2));
	assert_eq!(api.node(1).expect("node").label, "1");
}

#[test]
fn first_graph_named_wins() {
	let mut api = api();
	let summary = translate(
		&mut api,
		[
			"Graph created: G",
			"Graph 'G': Node added with value: 1",
			"Graph 'H': Node added with value: 50",
			"Graph 'G': Node added with value: 2",
			"Graph 'H': Edge added between 50 and 51",
		],
	);
	assert_eq!(summary.applied, 2);
	assert_eq!(summary.out_of_scope, 2);
	assert_eq!(summary.unparsed, 1);
	assert!(!api.has_node(50));
	assert_eq!(api.node_count(), 2);
}

#[test]
fn edges_create_missing_endpoints() {
	let mut api = api();
	translate(&mut api, ["Graph 'G': Edge added between 7 and 9"]);
	assert!(api.has_node(7));
	assert!(api.has_node(9));
	assert!(api.is_connected(9, 7));
}

#[test]
fn removals_apply_in_order() {
	let mut api = api();
	translate(
		&mut api,
		[
			"Graph 'G': Edge added between 1 and 2",
			"Graph 'G': Edge added between 2 and 3",
			"Graph 'G': Edge removed between 2 and 1",
			"Graph 'G': Node removed with value: 3",
			"Graph 'G': Node removed with value: 42",
		],
	);
	assert_eq!(api.node_count(), 2);
	assert_eq!(api.edge_count(), 0);
}

#[test]
fn text_values_get_allocated_ids() {
	let mut api = api();
	translate(
		&mut api,
		[
			"Graph 'G': Node added with value: 4",
			"Graph 'G': Node added with value: alice",
			"Graph 'G': Edge added between alice and bob",
			"Graph 'G': Edge added between alice and 4",
		],
	);
	assert_eq!(api.node_count(), 3);
	let alice = api
		.nodes()
		.into_iter()
		.find(|n| n.label == "alice")
		.expect("alice");
	assert_eq!(alice.id, 5);
	assert_eq!(api.degree(alice.id), 2);
}

#[test]
fn scoped_translator_ignores_other_graphs() {
	let mut api = api();
	let mut translator = TraceTranslator::scoped("B");
	assert_eq!(
		translator.apply_line(&mut api, "Graph 'A': Node added with value: 1"),
		LineStatus::OutOfScope
	);
	assert_eq!(
		translator.apply_line(&mut api, "Graph 'B': Node added with value: 1"),
		LineStatus::Applied
	);
	assert_eq!(translator.scope(), Some("B"));
	assert_eq!(api.node_count(), 1);
}

#[test]
fn duplicate_adds_are_harmless() {
	let mut api = api();
	let summary = translate(
		&mut api,
		[
			"Graph 'G': Node added with value: 1",
			"Graph 'G': Node added with value: 1",
			"Graph 'G': Edge added between 1 and 1",
		],
	);
	assert_eq!(summary.applied, 3);
	assert_eq!(api.node_count(), 1);
	assert_eq!(api.edge_count(), 0);
}

#[test]
fn line_that_locks_the_scope_is_applied() {
	let mut api = api();
	let mut translator = TraceTranslator::new();
	assert_eq!(
		translator.apply_line(&mut api, "Graph 'G': Node added with value: 1"),
		LineStatus::Applied
	);
	assert_eq!(translator.scope(), Some("G"));
	assert!(api.has_node(1));
}

#[test]
fn text_and_integer_values_stay_distinct() {
	let mut api = api();
	translate(
		&mut api,
		[
			"Graph 'G': Node added with value: a",
			"Graph 'G': Node added with value: 1",
			"Graph 'G': Edge added between a and 1",
		],
	);
	assert_eq!(api.node_count(), 2);
	assert_eq!(api.edge_count(), 1);
	assert_eq!(api.node(1).expect("node").label, "1");
	let a = api
		.nodes()
		.into_iter()
		.find(|n| n.label == "a")
		.expect("a");
	assert_ne!(a.id, 1);
	assert!(api.is_connected(a.id, 1));
}

#[test]
fn moved_text_node_keeps_its_edges() {
	let mut api = api();
	translate(
		&mut api,
		[
			"Graph 'G': Edge added between a and b",
			"Graph 'G': Node removed with value: 1",
			"Graph 'G': Edge added between 2 and 7",
		],
	);
	let labels: Vec<String> = api.nodes().into_iter().map(|n| n.label).collect();
	assert_eq!(api.node_count(), 4, "{labels:?}");
	let id_of = |label: &str| {
		api.nodes()
			.into_iter()
			.find(|n| n.label == label)
			.map(|n| n.id)
			.expect("node")
	};
	let (a, b) = (id_of("a"), id_of("b"));
	assert!(![1, 2].contains(&b));
	assert!(api.is_connected(a, b));
	assert!(api.is_connected(2, 7));
	assert!(!api.is_connected(a, 2));
}

#[test]
fn largest_integer_value_is_accepted() {
	let mut api = api();
	let summary = translate(
		&mut api,
		[
			"Graph 'G': Node added with value: 9223372036854775807",
			"Graph 'G': Node added with value: x",
		],
	);
	assert_eq!(summary.applied, 2);
	assert!(api.has_node(i64::MAX));
}
