//! Typed view of the code-execution backend's response and the rule for
//! turning it into graph state.

use log::{debug, info};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::graph::{Edge, GraphApi, GraphError, NodeInput};
use crate::trace::{TraceTranslator, TranslationSummary};

const STATUS_SUCCESS: &str = "success";
const STATUS_ERROR: &str = "error";

/// Kind tag of a captured structure.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StructureKind {
	/// Nodes and links.
	Graph,
	/// Ordered values.
	List,
	/// Key/value entries.
	Dict,
	/// Heap-ordered values.
	Heap,
	/// Stack-ordered values.
	Stack,
	/// Free-form log lines.
	Log,
	/// Captured program output.
	Output,
}

impl StructureKind {
	/// Name as it appears on the wire.
	pub fn as_str(&self) -> &'static str {
		match self {
			StructureKind::Graph => "graph",
			StructureKind::List => "list",
			StructureKind::Dict => "dict",
			StructureKind::Heap => "heap",
			StructureKind::Stack => "stack",
			StructureKind::Log => "log",
			StructureKind::Output => "output",
		}
	}
}

/// Full-snapshot graph payload: `{ nodes: [{id, label}], links: [{source, target}] }`.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct GraphPayload {
	/// Nodes as `{id, label}` plus optional positions.
	#[serde(default)]
	pub nodes: Vec<NodeInput>,
	/// Edges as `{source, target}`.
	#[serde(default)]
	pub links: Vec<Edge>,
}

/// Dict payloads arrive either as an object or as ordered `[key, value]` pairs.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum DictPayload {
	/// JSON object.
	Map(Map<String, Value>),
	/// Ordered `[key, value]` pairs.
	Pairs(Vec<(Value, Value)>),
}

impl DictPayload {
	/// Entries in payload order.
	pub fn entries(&self) -> Vec<(Value, Value)> {
		match self {
			DictPayload::Map(map) => map
				.iter()
				.map(|(k, v)| (Value::String(k.clone()), v.clone()))
				.collect(),
			DictPayload::Pairs(pairs) => pairs.clone(),
		}
	}
}

/// One named data structure captured from the executed program.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Structure {
	/// Variable name in the program.
	pub name: String,
	/// Kind tag, `type` on the wire.
	#[serde(rename = "type")]
	pub kind: StructureKind,
	/// Kind-specific payload.
	#[serde(default)]
	pub payload: Value,
	/// Operation trace recorded for this structure.
	#[serde(default)]
	pub operations: Vec<String>,
}

impl Structure {
	fn payload_as<T: for<'de> Deserialize<'de>>(&self, expected: StructureKind) -> Result<T, GraphError> {
		if self.kind != expected {
			return Err(self.invalid(format!("expected a {} structure", expected.as_str())));
		}
		serde_json::from_value(self.payload.clone()).map_err(|e| self.invalid(e.to_string()))
	}

	fn invalid(&self, reason: String) -> GraphError {
		GraphError::InvalidPayload {
			name: self.name.clone(),
			kind: self.kind.as_str().to_string(),
			reason,
		}
	}

	/// Payload of a graph structure.
	pub fn graph_payload(&self) -> Result<GraphPayload, GraphError> {
		self.payload_as(StructureKind::Graph)
	}

	/// Ordered values of a list, heap or stack.
	pub fn list_payload(&self) -> Result<Vec<Value>, GraphError> {
		match self.kind {
			StructureKind::List | StructureKind::Heap | StructureKind::Stack => {
				self.payload_as(self.kind)
			}
			_ => Err(self.invalid("expected a list, heap or stack structure".to_string())),
		}
	}

	/// Payload of a dict structure.
	pub fn dict_payload(&self) -> Result<DictPayload, GraphError> {
		self.payload_as(StructureKind::Dict)
	}

	/// Prefer the incremental trace when there is one.
	pub fn graph_source(&self) -> Result<GraphSource, GraphError> {
		if !self.operations.is_empty() {
			return Ok(GraphSource::Trace(self.operations.clone()));
		}
		self.graph_payload().map(GraphSource::Snapshot)
	}
}

/// Response to one "run this code" request.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct RunResponse {
	/// `success`, `error`, or the program's exception text.
	#[serde(default)]
	pub status: String,
	/// Captured stdout.
	#[serde(default)]
	pub output: String,
	/// Backend failure message.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub error: Option<String>,
	/// Top-level graph snapshot.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub graph: Option<GraphPayload>,
	/// Top-level operation trace.
	#[serde(default)]
	pub graph_operations: Vec<String>,
	/// Every captured structure.
	#[serde(default)]
	pub structures: Vec<Structure>,
}

impl RunResponse {
	/// Deserialize a response body.
	pub fn parse(json: &str) -> Result<Self, GraphError> {
		let response: RunResponse = serde_json::from_str(json)?;
		debug!(
			"backend response: status {:?}, {} structures, {} trace lines",
			response.status,
			response.structures.len(),
			response.graph_operations.len()
		);
		Ok(response)
	}

	/// Fail when the backend itself reported an error.
	pub fn check(self) -> Result<Self, GraphError> {
		if self.status == STATUS_ERROR {
			let msg = self.error.unwrap_or_else(|| "backend error".to_string());
			return Err(GraphError::backend(msg));
		}
		Ok(self)
	}

	/// The exception text when the user program itself raised.
	pub fn program_error(&self) -> Option<&str> {
		match self.status.as_str() {
			"" | STATUS_SUCCESS | STATUS_ERROR => None,
			status => Some(status),
		}
	}

	/// Structures of one kind, in response order.
	pub fn structures_of(&self, kind: StructureKind) -> impl Iterator<Item = &Structure> {
		self.structures.iter().filter(move |s| s.kind == kind)
	}

	/// Where the graph view should be rebuilt from: the top-level trace, then
	/// the top-level snapshot, then the first graph structure.
	pub fn graph_source(&self) -> Result<GraphSource, GraphError> {
		if !self.graph_operations.is_empty() {
			return Ok(GraphSource::Trace(self.graph_operations.clone()));
		}
		if let Some(graph) = &self.graph {
			return Ok(GraphSource::Snapshot(graph.clone()));
		}
		match self.structures_of(StructureKind::Graph).next() {
			Some(structure) => structure.graph_source(),
			None => Ok(GraphSource::Empty),
		}
	}

	/// Clear `api` and rebuild it from this response.
	pub fn apply(&self, api: &mut GraphApi) -> Result<TranslationSummary, GraphError> {
		Ok(self.graph_source()?.apply(api))
	}
}

/// Input that fully determines the graph shown by a view.
#[derive(Clone, Debug, Default, PartialEq)]
pub enum GraphSource {
	/// No graph.
	#[default]
	Empty,
	/// Full replacement.
	Snapshot(GraphPayload),
	/// Operation trace to replay.
	Trace(Vec<String>),
}

impl GraphSource {
	/// Clear `api`, then replace from the snapshot or replay the trace.
	pub fn apply(&self, api: &mut GraphApi) -> TranslationSummary {
		api.clear();
		match self {
			GraphSource::Empty => TranslationSummary::default(),
			GraphSource::Snapshot(payload) => {
				api.set_graph(&payload.nodes, &payload.links);
				info!("graph view rebuilt from snapshot");
				TranslationSummary::default()
			}
			GraphSource::Trace(lines) => TraceTranslator::new().apply(api, lines),
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn dict_payload_accepts_both_shapes() {
		let map: DictPayload = serde_json::from_str(r#"{"a":1}"#).expect("map");
		assert_eq!(map.entries(), vec![(Value::from("a"), Value::from(1))]);
		let pairs: DictPayload = serde_json::from_str(r#"[[1,"x"],[2,"y"]]"#).expect("pairs");
		assert_eq!(pairs.entries().len(), 2);
	}

	#[test]
	fn program_error_is_the_raw_status() {
		let response = RunResponse {
			status: "division by zero".into(),
			..RunResponse::default()
		};
		assert_eq!(response.program_error(), Some("division by zero"));
		assert!(response.check().is_ok());
	}

	#[test]
	fn wrong_kind_is_an_invalid_payload() {
		let s = Structure {
			name: "xs".into(),
			kind: StructureKind::List,
			payload: Value::Array(vec![]),
			operations: vec![],
		};
		assert!(matches!(s.graph_payload(), Err(GraphError::InvalidPayload { .. })));
		assert_eq!(s.list_payload().expect("list"), Vec::<Value>::new());
	}
}
