use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Node identifier. Unique within one store.
pub type NodeId = i64;

/// A graph vertex together with its simulation state.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Node {
	/// Unique id.
	pub id: NodeId,
	/// Display text.
	#[serde(default)]
	pub label: String,
	/// Position x.
	#[serde(default)]
	pub x: f64,
	/// Position y.
	#[serde(default)]
	pub y: f64,
	/// Velocity x.
	#[serde(default)]
	pub vx: f64,
	/// Velocity y.
	#[serde(default)]
	pub vy: f64,
	/// Pinned x. The simulation never moves a node while this is set.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub fx: Option<f64>,
	/// Pinned y.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub fy: Option<f64>,
}

impl Node {
	pub(crate) fn new(id: NodeId, label: String, x: f64, y: f64) -> Self {
		Self {
			id,
			label,
			x,
			y,
			vx: 0.0,
			vy: 0.0,
			fx: None,
			fy: None,
		}
	}

	/// Whether either axis is pinned.
	pub fn is_pinned(&self) -> bool {
		self.fx.is_some() || self.fy.is_some()
	}

	pub(crate) fn pin(&mut self, x: f64, y: f64) {
		self.fx = Some(x);
		self.fy = Some(y);
	}

	pub(crate) fn unpin(&mut self) {
		self.fx = None;
		self.fy = None;
	}
}

/// An undirected connection between two nodes, stored by id.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Edge {
	/// One endpoint.
	pub source: NodeId,
	/// The other endpoint.
	pub target: NodeId,
	/// Caller-supplied extras; opaque to the graph.
	#[serde(flatten)]
	pub props: Map<String, Value>,
}

impl Edge {
	pub(crate) fn new(source: NodeId, target: NodeId, props: Map<String, Value>) -> Self {
		Self {
			source,
			target,
			props,
		}
	}

	/// Direction-agnostic endpoint match.
	pub fn connects(&self, a: NodeId, b: NodeId) -> bool {
		(self.source == a && self.target == b) || (self.source == b && self.target == a)
	}

	/// Whether `id` is one of the endpoints.
	pub fn touches(&self, id: NodeId) -> bool {
		self.source == id || self.target == id
	}

	/// The endpoint opposite `id`, if `id` is an endpoint.
	pub fn other(&self, id: NodeId) -> Option<NodeId> {
		if self.source == id {
			Some(self.target)
		} else if self.target == id {
			Some(self.source)
		} else {
			None
		}
	}

	/// Key used to bind the edge to its on-screen glyph.
	pub fn key(&self) -> EdgeKey {
		EdgeKey {
			source: self.source,
			target: self.target,
		}
	}
}

/// Identity of an edge glyph: the endpoints as stored.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EdgeKey {
	/// Stored source endpoint.
	pub source: NodeId,
	/// Stored target endpoint.
	pub target: NodeId,
}

/// Input node for bulk replacement. Positions are optional so that
/// backend payloads carrying only `{id, label}` deserialize directly.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct NodeInput {
	/// Node id.
	pub id: NodeId,
	/// Display text; empty falls back to the id.
	#[serde(default)]
	pub label: String,
	/// Initial x; spawns near center when absent.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub x: Option<f64>,
	/// Initial y; spawns near center when absent.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub y: Option<f64>,
	/// Initial x velocity.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub vx: Option<f64>,
	/// Initial y velocity.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub vy: Option<f64>,
	/// Pinned x.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub fx: Option<f64>,
	/// Pinned y.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub fy: Option<f64>,
}

impl From<&Node> for NodeInput {
	fn from(node: &Node) -> Self {
		Self {
			id: node.id,
			label: node.label.clone(),
			x: Some(node.x),
			y: Some(node.y),
			vx: Some(node.vx),
			vy: Some(node.vy),
			fx: node.fx,
			fy: node.fy,
		}
	}
}

impl From<Node> for NodeInput {
	fn from(node: Node) -> Self {
		Self::from(&node)
	}
}

impl From<&NodeInput> for NodeInput {
	fn from(input: &NodeInput) -> Self {
		input.clone()
	}
}

/// Partial node update. `None` leaves a field untouched; for the pin
/// fields `Some(None)` clears the pin.
#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct NodePatch {
	/// New label.
	pub label: Option<String>,
	/// New x.
	pub x: Option<f64>,
	/// New y.
	pub y: Option<f64>,
	/// New x velocity.
	pub vx: Option<f64>,
	/// New y velocity.
	pub vy: Option<f64>,
	/// Pin x; `Some(None)` clears it.
	#[serde(deserialize_with = "double_option")]
	pub fx: Option<Option<f64>>,
	/// Pin y; `Some(None)` clears it.
	#[serde(deserialize_with = "double_option")]
	pub fy: Option<Option<f64>>,
}

impl NodePatch {
	/// Patch that only relabels.
	pub fn label(label: impl Into<String>) -> Self {
		Self {
			label: Some(label.into()),
			..Self::default()
		}
	}

	/// Patch that moves and pins the node at `(x, y)`.
	pub fn pinned_at(x: f64, y: f64) -> Self {
		Self {
			x: Some(x),
			y: Some(y),
			fx: Some(Some(x)),
			fy: Some(Some(y)),
			..Self::default()
		}
	}

	pub(crate) fn apply(&self, node: &mut Node) {
		if let Some(label) = &self.label {
			node.label = label.clone();
		}
		if let Some(x) = self.x {
			node.x = x;
		}
		if let Some(y) = self.y {
			node.y = y;
		}
		if let Some(vx) = self.vx {
			node.vx = vx;
		}
		if let Some(vy) = self.vy {
			node.vy = vy;
		}
		if let Some(fx) = self.fx {
			node.fx = fx;
		}
		if let Some(fy) = self.fy {
			node.fy = fy;
		}
	}
}

// Distinguishes an explicit `null` (clear the pin) from an absent field.
fn double_option<'de, D>(deserializer: D) -> Result<Option<Option<f64>>, D::Error>
where
	D: serde::Deserializer<'de>,
{
	Option::<f64>::deserialize(deserializer).map(Some)
}

/// Full graph state suitable for persistence and re-import.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GraphSnapshot {
	/// Every node with its simulation state.
	pub nodes: Vec<Node>,
	/// Every edge.
	pub links: Vec<Edge>,
	/// Allocator position, `nextId` on the wire.
	pub next_id: NodeId,
}

/// Dimensions of the drawing surface in graph units.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Viewport {
	/// Width in graph units.
	pub width: f64,
	/// Height in graph units.
	pub height: f64,
}

impl Viewport {
	/// Surface of `width` by `height`.
	pub fn new(width: f64, height: f64) -> Self {
		Self { width, height }
	}

	/// Midpoint of the surface.
	pub fn center(&self) -> (f64, f64) {
		(self.width / 2.0, self.height / 2.0)
	}
}

impl Default for Viewport {
	fn default() -> Self {
		Self::new(800.0, 600.0)
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn edge_matches_either_direction() {
		let edge = Edge::new(1, 2, Map::new());
		assert!(edge.connects(1, 2));
		assert!(edge.connects(2, 1));
		assert!(!edge.connects(1, 3));
		assert_eq!(edge.other(2), Some(1));
		assert_eq!(edge.other(3), None);
	}

	#[test]
	fn edge_extra_props_flatten() {
		let edge: Edge =
			serde_json::from_str(r#"{"source":1,"target":2,"weight":3}"#).expect("edge");
		assert_eq!(edge.props.get("weight"), Some(&Value::from(3)));
		let json = serde_json::to_value(&edge).expect("json");
		assert_eq!(json["weight"], 3);
	}

	#[test]
	fn patch_null_clears_pin() {
		let mut node = Node::new(1, "a".into(), 0.0, 0.0);
		node.pin(5.0, 6.0);
		let patch: NodePatch = serde_json::from_str(r#"{"fx":null,"fy":null}"#).expect("patch");
		patch.apply(&mut node);
		assert!(!node.is_pinned());

		let untouched: NodePatch = serde_json::from_str(r#"{"label":"b"}"#).expect("patch");
		node.pin(1.0, 1.0);
		untouched.apply(&mut node);
		assert!(node.is_pinned());
		assert_eq!(node.label, "b");
	}

	#[test]
	fn snapshot_uses_camel_case_allocator() {
		let snapshot = GraphSnapshot {
			nodes: vec![],
			links: vec![],
			next_id: 4,
		};
		let json = serde_json::to_value(&snapshot).expect("json");
		assert_eq!(json["nextId"], 4);
	}
}
