//! Rebuilds a graph from the human-readable operation trace emitted by the
//! execution backend, e.g. `Graph 'G': Edge added between 1 and 2`.

use std::collections::HashMap;

use log::{debug, info};

use crate::graph::{GraphApi, NodeId, NodePatch};

/// A node value as printed in the trace.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum TraceValue {
	/// Integer value, used as the node id.
	Int(i64),
	/// Anything else, used as the label.
	Text(String),
}

impl TraceValue {
	/// Integers become numeric ids; anything else stays text.
	pub fn parse(raw: &str) -> Self {
		let raw = raw.trim();
		raw.parse::<i64>()
			.map(TraceValue::Int)
			.unwrap_or_else(|_| TraceValue::Text(raw.to_string()))
	}
}

/// Structural change described by a line.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TraceOp {
	/// `Node added with value: v`
	NodeAdded(TraceValue),
	/// `Node removed with value: v`
	NodeRemoved(TraceValue),
	/// `Edge added between a and b`
	EdgeAdded(TraceValue, TraceValue),
	/// `Edge removed between a and b`
	EdgeRemoved(TraceValue, TraceValue),
}

impl TraceOp {
	/// The node values the operation refers to.
	pub fn values(&self) -> Vec<&TraceValue> {
		match self {
			TraceOp::NodeAdded(v) | TraceOp::NodeRemoved(v) => vec![v],
			TraceOp::EdgeAdded(a, b) | TraceOp::EdgeRemoved(a, b) => vec![a, b],
		}
	}
}

/// One parsed trace line.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TraceLine {
	/// Graph name between the quotes.
	pub graph: String,
	/// Parsed operation.
	pub op: TraceOp,
}

impl TraceLine {
	/// Parse a single line; `None` for anything outside the four known forms.
	pub fn parse(line: &str) -> Option<Self> {
		let (graph, rest) = line.trim().strip_prefix("Graph '")?.split_once("': ")?;
		if graph.is_empty() {
			return None;
		}

		let value = |raw: &str| {
			let raw = raw.trim();
			(!raw.is_empty()).then(|| TraceValue::parse(raw))
		};
		let pair = |raw: &str| {
			let (a, b) = raw.rsplit_once(" and ")?;
			Some((value(a)?, value(b)?))
		};

		let op = if let Some(v) = rest.strip_prefix("Node added with value:") {
			TraceOp::NodeAdded(value(v)?)
		} else if let Some(v) = rest.strip_prefix("Node removed with value:") {
			TraceOp::NodeRemoved(value(v)?)
		} else if let Some(v) = rest.strip_prefix("Edge added between ") {
			let (a, b) = pair(v)?;
			TraceOp::EdgeAdded(a, b)
		} else if let Some(v) = rest.strip_prefix("Edge removed between ") {
			let (a, b) = pair(v)?;
			TraceOp::EdgeRemoved(a, b)
		} else {
			return None;
		};

		Some(Self {
			graph: graph.to_string(),
			op,
		})
	}
}

/// What happened to one line.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LineStatus {
	/// Parsed and in scope.
	Applied,
	/// Parsed but for another graph.
	OutOfScope,
	/// Not one of the known forms.
	Unparsed,
}

/// Line counts for one translation pass.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct TranslationSummary {
	/// Lines applied to the graph.
	pub applied: usize,
	/// Lines naming another graph.
	pub out_of_scope: usize,
	/// Lines that did not parse.
	pub unparsed: usize,
}

/// Applies trace lines to a [`GraphApi`], scoped to the first graph name
/// seen.
///
/// Text values have no numeric id of their own, so each distinct text gets
/// an allocated id for the lifetime of the translator.
#[derive(Debug, Default)]
pub struct TraceTranslator {
	scope: Option<String>,
	added: HashMap<String, NodeId>,
}

impl TraceTranslator {
	/// Translator that locks onto the first graph it sees.
	pub fn new() -> Self {
		Self::default()
	}

	/// Translator locked to `graph` from the start.
	pub fn scoped(graph: impl Into<String>) -> Self {
		Self {
			scope: Some(graph.into()),
			..Self::default()
		}
	}

	/// Graph name the translator is locked to.
	pub fn scope(&self) -> Option<&str> {
		self.scope.as_deref()
	}

	/// Apply `lines` in order.
	pub fn apply<I, S>(&mut self, api: &mut GraphApi, lines: I) -> TranslationSummary
	where
		I: IntoIterator<Item = S>,
		S: AsRef<str>,
	{
		let mut summary = TranslationSummary::default();
		for line in lines {
			match self.apply_line(api, line.as_ref()) {
				LineStatus::Applied => summary.applied += 1,
				LineStatus::OutOfScope => summary.out_of_scope += 1,
				LineStatus::Unparsed => summary.unparsed += 1,
			}
		}
		info!(
			"trace for graph {:?}: {} applied, {} out of scope, {} unparsed",
			self.scope, summary.applied, summary.out_of_scope, summary.unparsed
		);
		summary
	}

	/// Apply one line.
	pub fn apply_line(&mut self, api: &mut GraphApi, line: &str) -> LineStatus {
		let Some(TraceLine { graph, op }) = TraceLine::parse(line) else {
			return LineStatus::Unparsed;
		};
		// The line that takes the lock is applied too, not only recorded.
		if self.scope.is_none() {
			debug!("trace locked to graph '{graph}'");
		}
		if *self.scope.get_or_insert_with(|| graph.clone()) != graph {
			return LineStatus::OutOfScope;
		}

		for value in op.values() {
			if let TraceValue::Int(id) = value {
				self.make_room(api, *id);
			}
		}

		match op {
			TraceOp::NodeAdded(v) => {
				self.resolve(api, &v, true);
			}
			TraceOp::NodeRemoved(v) => {
				if let Some(id) = self.resolve(api, &v, false) {
					api.delete_node(id);
				}
				if let TraceValue::Text(text) = v {
					self.added.remove(&text);
				}
			}
			TraceOp::EdgeAdded(a, b) => {
				if let (Some(a), Some(b)) = (self.resolve(api, &a, true), self.resolve(api, &b, true)) {
					api.add_edge(a, b, None);
				}
			}
			TraceOp::EdgeRemoved(a, b) => {
				if let (Some(a), Some(b)) = (self.resolve(api, &a, false), self.resolve(api, &b, false)) {
					api.delete_edge(a, b);
				}
			}
		}
		LineStatus::Applied
	}

	// Integer values are literal ids. A text node that was allocated the same
	// id moves to a fresh one, keeping its position and edges.
	fn make_room(&mut self, api: &mut GraphApi, id: NodeId) {
		let Some(text) = self
			.added
			.iter()
			.find_map(|(text, &owned)| (owned == id).then(|| text.clone()))
		else {
			return;
		};
		let Some(node) = api.node(id) else {
			self.added.remove(&text);
			return;
		};
		let edges: Vec<_> = api.edges().into_iter().filter(|e| e.touches(id)).collect();

		api.delete_node(id);
		let Some(moved) = api.add_node(&node.label, None, None, None).applied() else {
			self.added.remove(&text);
			return;
		};
		api.update_node(
			moved,
			&NodePatch {
				x: Some(node.x),
				y: Some(node.y),
				vx: Some(node.vx),
				vy: Some(node.vy),
				fx: Some(node.fx),
				fy: Some(node.fy),
				..NodePatch::default()
			},
		);
		for edge in edges {
			let rename = |end: NodeId| if end == id { moved } else { end };
			api.add_edge(rename(edge.source), rename(edge.target), Some(edge.props));
		}
		debug!("text node '{text}' moved from id {id} to {moved}");
		self.added.insert(text, moved);
	}

	// Map a trace value to a node id, creating the node when asked.
	fn resolve(&mut self, api: &mut GraphApi, value: &TraceValue, create: bool) -> Option<NodeId> {
		match value {
			TraceValue::Int(id) => {
				if create && !api.has_node(*id) {
					api.add_node(&id.to_string(), Some(*id), None, None);
				}
				Some(*id)
			}
			TraceValue::Text(text) => {
				if let Some(&id) = self.added.get(text) {
					if api.has_node(id) {
						return Some(id);
					}
					self.added.remove(text);
				}
				if !create {
					return None;
				}
				let id = api.add_node(text, None, None, None).applied()?;
				self.added.insert(text.clone(), id);
				Some(id)
			}
		}
	}
}

/// Run a fresh translation pass over `lines`.
pub fn translate<I, S>(api: &mut GraphApi, lines: I) -> TranslationSummary
where
	I: IntoIterator<Item = S>,
	S: AsRef<str>,
{
	TraceTranslator::new().apply(api, lines)
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn parses_the_four_forms() {
		assert_eq!(
			TraceLine::parse("Graph 'G': Node added with value: 7").map(|l| l.op),
			Some(TraceOp::NodeAdded(TraceValue::Int(7)))
		);
		assert_eq!(
			TraceLine::parse("Graph 'G': Node removed with value: x").map(|l| l.op),
			Some(TraceOp::NodeRemoved(TraceValue::Text("x".into())))
		);
		assert_eq!(
			TraceLine::parse("Graph 'G': Edge added between 1 and b").map(|l| l.op),
			Some(TraceOp::EdgeAdded(TraceValue::Int(1), TraceValue::Text("b".into())))
		);
		assert_eq!(
			TraceLine::parse("Graph 'G': Edge removed between 1 and 2").map(|l| l.op),
			Some(TraceOp::EdgeRemoved(TraceValue::Int(1), TraceValue::Int(2)))
		);
	}

	#[test]
	fn graph_name_stops_at_first_quote_colon() {
		let line = TraceLine::parse("Graph 'my g': Node added with value: 'a': b").expect("line");
		assert_eq!(line.graph, "my g");
		assert_eq!(line.op, TraceOp::NodeAdded(TraceValue::Text("'a': b".into())));
	}

	#[test]
	fn rejects_malformed_lines() {
		for line in [
			"",
			"Graph created: G",
			"Graph 'G': Node added with value:",
			"Graph 'G': Edge added between 1",
			"Graph '': Node added with value: 1",
			"Node added with value: 1",
		] {
			assert_eq!(TraceLine::parse(line), None, "{line}");
		}
	}

	#[test]
	fn non_integer_numbers_stay_text() {
		assert_eq!(TraceValue::parse(" 3.5 "), TraceValue::Text("3.5".into()));
		assert_eq!(TraceValue::parse("-4"), TraceValue::Int(-4));
	}
}
