use std::collections::HashSet;

use log::{debug, info, warn};
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use serde_json::{Map, Value};

use super::error::Rejection;
use super::store::{FIRST_ID, GraphStore};
use super::types::{Edge, GraphSnapshot, Node, NodeId, NodeInput, NodePatch, Viewport};

const DEFAULT_SEED: u64 = 0x5eed_9a7f;
const DEFAULT_JITTER: f64 = 10.0;

/// Result of a mutation. Rejections are diagnostics, not failures: the
/// store is unchanged and the caller carries on.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Outcome<T = ()> {
	/// The mutation took effect.
	Applied(T),
	/// The store was left unchanged.
	Rejected(Rejection),
}

impl<T> Outcome<T> {
	/// Whether the mutation took effect.
	pub fn is_applied(&self) -> bool {
		matches!(self, Outcome::Applied(_))
	}

	/// Why the mutation was rejected, if it was.
	pub fn rejection(&self) -> Option<&Rejection> {
		match self {
			Outcome::Applied(_) => None,
			Outcome::Rejected(r) => Some(r),
		}
	}

	/// The applied value, dropping any rejection.
	pub fn applied(self) -> Option<T> {
		match self {
			Outcome::Applied(v) => Some(v),
			Outcome::Rejected(_) => None,
		}
	}
}

/// Command surface over a [`GraphStore`].
///
/// Every successful mutation bumps [`revision`](Self::revision), which the
/// layout and the render binder poll to re-anneal and re-bind.
pub struct GraphApi {
	store: GraphStore,
	viewport: Viewport,
	jitter: f64,
	rng: SmallRng,
	revision: u64,
}

impl Default for GraphApi {
	fn default() -> Self {
		Self::new(Viewport::default())
	}
}

impl GraphApi {
	/// Empty graph spawning new nodes around the center of `viewport`.
	pub fn new(viewport: Viewport) -> Self {
		Self::with_seed(viewport, DEFAULT_SEED)
	}

	/// Same as [`new`](Self::new) with a fixed seed for spawn jitter.
	pub fn with_seed(viewport: Viewport, seed: u64) -> Self {
		Self {
			store: GraphStore::default(),
			viewport,
			jitter: DEFAULT_JITTER,
			rng: SmallRng::seed_from_u64(seed),
			revision: 0,
		}
	}

	/// Maximum offset from the center for free nodes, per axis.
	pub fn set_spawn_jitter(&mut self, jitter: f64) {
		self.jitter = jitter.abs();
	}

	/// Read access to the underlying collections.
	pub fn store(&self) -> &GraphStore {
		&self.store
	}

	pub(crate) fn store_mut(&mut self) -> &mut GraphStore {
		&mut self.store
	}

	/// Counter bumped by every applied mutation.
	pub fn revision(&self) -> u64 {
		self.revision
	}

	/// Current drawing surface.
	pub fn viewport(&self) -> Viewport {
		self.viewport
	}

	/// Resize the drawing surface; later spawns center on it.
	pub fn set_viewport(&mut self, viewport: Viewport) {
		self.viewport = viewport;
	}

	/// Borrow the handle as a by-value builder for chained calls.
	pub fn chain(&mut self) -> Chain<'_> {
		Chain { api: self }
	}

	fn changed(&mut self) {
		self.revision += 1;
	}

	fn reject<T>(&self, rejection: Rejection) -> Outcome<T> {
		match rejection {
			Rejection::NodeNotFound(_) | Rejection::EdgeNotFound { .. } => {
				debug!("{rejection}")
			}
			_ => warn!("{rejection}"),
		}
		Outcome::Rejected(rejection)
	}

	fn spawn_point(&mut self) -> (f64, f64) {
		let (cx, cy) = self.viewport.center();
		if self.jitter == 0.0 {
			return (cx, cy);
		}
		(
			cx + self.rng.gen_range(-self.jitter..=self.jitter),
			cy + self.rng.gen_range(-self.jitter..=self.jitter),
		)
	}

	// ---- nodes ----

	/// Add a node. Without an id the next free one is allocated; an empty
	/// label falls back to the id. Supplying both coordinates pins the node.
	pub fn add_node(
		&mut self,
		label: &str,
		id: Option<NodeId>,
		x: Option<f64>,
		y: Option<f64>,
	) -> Outcome<NodeId> {
		let node_id = id.unwrap_or(self.store.next_id);
		if self.store.node(node_id).is_some() {
			return self.reject(Rejection::DuplicateNode(node_id));
		}

		let label = if label.is_empty() {
			node_id.to_string()
		} else {
			label.to_string()
		};
		let (sx, sy) = self.spawn_point();
		let mut node = Node::new(node_id, label, x.unwrap_or(sx), y.unwrap_or(sy));
		if let (Some(px), Some(py)) = (x, y) {
			node.pin(px, py);
		}
		self.store.nodes.push(node);
		self.store.reserve(node_id);

		debug!("node {node_id} added");
		self.changed();
		Outcome::Applied(node_id)
	}

	/// Batch form of [`add_node`](Self::add_node) with free placement.
	pub fn add_nodes<I, S>(&mut self, nodes: I) -> Vec<Outcome<NodeId>>
	where
		I: IntoIterator<Item = (S, Option<NodeId>)>,
		S: AsRef<str>,
	{
		nodes
			.into_iter()
			.map(|(label, id)| self.add_node(label.as_ref(), id, None, None))
			.collect()
	}

	/// Remove a node and every edge touching it. Missing ids are a no-op.
	pub fn delete_node(&mut self, id: NodeId) -> Outcome {
		let Some(idx) = self.store.position(id) else {
			return self.reject(Rejection::NodeNotFound(id));
		};
		self.store.nodes.remove(idx);
		self.store.links.retain(|l| !l.touches(id));

		debug!("node {id} deleted");
		self.changed();
		Outcome::Applied(())
	}

	/// Merge `patch` into node `id`.
	pub fn update_node(&mut self, id: NodeId, patch: &NodePatch) -> Outcome {
		let Some(node) = self.store.node_mut(id) else {
			return self.reject(Rejection::NodeNotFound(id));
		};
		patch.apply(node);
		self.changed();
		Outcome::Applied(())
	}

	/// Pin or release a node during pointer interaction. Not a structural
	/// change, so the revision is left alone.
	pub(crate) fn set_pin(&mut self, id: NodeId, pin: Option<(f64, f64)>) -> bool {
		let Some(node) = self.store.node_mut(id) else {
			return false;
		};
		match pin {
			Some((x, y)) => node.pin(x, y),
			None => node.unpin(),
		}
		true
	}

	/// Copy of node `id`.
	pub fn node(&self, id: NodeId) -> Option<Node> {
		self.store.node(id).cloned()
	}

	/// Copy of every node in insertion order.
	pub fn nodes(&self) -> Vec<Node> {
		self.store.nodes.clone()
	}

	/// Whether a node with `id` exists.
	pub fn has_node(&self, id: NodeId) -> bool {
		self.store.node(id).is_some()
	}

	/// Number of nodes.
	pub fn node_count(&self) -> usize {
		self.store.nodes.len()
	}

	// ---- edges ----

	/// Connect two existing, distinct nodes that are not yet connected in
	/// either direction.
	pub fn add_edge(
		&mut self,
		source: NodeId,
		target: NodeId,
		props: Option<Map<String, Value>>,
	) -> Outcome {
		if !self.has_node(source) || !self.has_node(target) {
			return self.reject(Rejection::MissingEndpoint {
				source_id: source,
				target_id: target,
			});
		}
		if source == target {
			return self.reject(Rejection::SelfLoop(source));
		}
		if self.store.edge(source, target).is_some() {
			return self.reject(Rejection::DuplicateEdge {
				source_id: source,
				target_id: target,
			});
		}

		self.store
			.links
			.push(Edge::new(source, target, props.unwrap_or_default()));
		debug!("edge {source}-{target} added");
		self.changed();
		Outcome::Applied(())
	}

	/// Batch form of [`add_edge`](Self::add_edge) without props.
	pub fn add_edges<I>(&mut self, pairs: I) -> Vec<Outcome>
	where
		I: IntoIterator<Item = (NodeId, NodeId)>,
	{
		pairs
			.into_iter()
			.map(|(s, t)| self.add_edge(s, t, None))
			.collect()
	}

	/// Remove the edge between `source` and `target`, in whichever direction
	/// it was stored.
	pub fn delete_edge(&mut self, source: NodeId, target: NodeId) -> Outcome {
		let before = self.store.links.len();
		self.store.links.retain(|l| !l.connects(source, target));
		if self.store.links.len() == before {
			return self.reject(Rejection::EdgeNotFound {
				source_id: source,
				target_id: target,
			});
		}
		debug!("edge {source}-{target} deleted");
		self.changed();
		Outcome::Applied(())
	}

	/// The edge between `source` and `target` in either direction.
	pub fn edge(&self, source: NodeId, target: NodeId) -> Option<Edge> {
		self.store.edge(source, target).cloned()
	}

	/// Copy of every edge in insertion order.
	pub fn edges(&self) -> Vec<Edge> {
		self.store.links.clone()
	}

	/// Number of edges.
	pub fn edge_count(&self) -> usize {
		self.store.links.len()
	}

	/// Whether `a` and `b` share an edge, in either direction.
	pub fn is_connected(&self, a: NodeId, b: NodeId) -> bool {
		self.store.edge(a, b).is_some()
	}

	// ---- queries ----

	/// Distinct ids adjacent to `id`, in edge order.
	pub fn neighbors(&self, id: NodeId) -> Vec<NodeId> {
		let mut seen = HashSet::new();
		self.store
			.links
			.iter()
			.filter_map(|l| l.other(id))
			.filter(|n| seen.insert(*n))
			.collect()
	}

	/// Number of distinct neighbors.
	pub fn degree(&self, id: NodeId) -> usize {
		self.neighbors(id).len()
	}

	// ---- bulk ----

	/// Replace the whole graph with copies of `nodes` and `links`.
	///
	/// Entries that would break the store invariants are dropped with a
	/// warning: later duplicates of an id, self-loops, edges with a missing
	/// endpoint and repeated edges.
	pub fn set_graph<I, N>(&mut self, nodes: I, links: &[Edge]) -> Outcome
	where
		I: IntoIterator<Item = N>,
		N: Into<NodeInput>,
	{
		let mut store = GraphStore::default();
		let mut ids = HashSet::new();

		for input in nodes.into_iter().map(Into::into) {
			if !ids.insert(input.id) {
				warn!("{}", Rejection::DuplicateNode(input.id));
				continue;
			}
			let label = if input.label.is_empty() {
				input.id.to_string()
			} else {
				input.label
			};
			let (sx, sy) = self.spawn_point();
			let mut node = Node::new(input.id, label, input.x.unwrap_or(sx), input.y.unwrap_or(sy));
			node.vx = input.vx.unwrap_or(0.0);
			node.vy = input.vy.unwrap_or(0.0);
			node.fx = input.fx;
			node.fy = input.fy;
			store.nodes.push(node);
		}

		for link in links {
			let rejection = if !ids.contains(&link.source) || !ids.contains(&link.target) {
				Some(Rejection::MissingEndpoint {
					source_id: link.source,
					target_id: link.target,
				})
			} else if link.source == link.target {
				Some(Rejection::SelfLoop(link.source))
			} else if store.edge(link.source, link.target).is_some() {
				Some(Rejection::DuplicateEdge {
					source_id: link.source,
					target_id: link.target,
				})
			} else {
				None
			};
			match rejection {
				Some(r) => warn!("set_graph dropped edge: {r}"),
				None => store.links.push(link.clone()),
			}
		}

		store.next_id = store
			.nodes
			.iter()
			.map(|n| n.id)
			.max()
			.map_or(FIRST_ID, |max| max.saturating_add(1));

		info!(
			"graph replaced: {} nodes, {} links",
			store.nodes.len(),
			store.links.len()
		);
		self.store = store;
		self.changed();
		Outcome::Applied(())
	}

	/// Restore an [`export_graph`](Self::export_graph) snapshot. The allocator
	/// never ends up below the snapshot's own `next_id`.
	pub fn import_graph(&mut self, snapshot: &GraphSnapshot) -> Outcome {
		self.set_graph(&snapshot.nodes, &snapshot.links);
		self.store.next_id = self.store.next_id.max(snapshot.next_id);
		Outcome::Applied(())
	}

	/// Snapshot of nodes, edges and the allocator.
	pub fn export_graph(&self) -> GraphSnapshot {
		GraphSnapshot {
			nodes: self.nodes(),
			links: self.edges(),
			next_id: self.store.next_id,
		}
	}

	/// Drop every node and edge and reset the allocator.
	pub fn clear(&mut self) -> Outcome {
		self.store.reset();
		info!("graph cleared");
		self.changed();
		Outcome::Applied(())
	}
}

/// Chaining wrapper returned by [`GraphApi::chain`]. Outcomes are dropped;
/// read back through the api to confirm effects.
pub struct Chain<'a> {
	api: &'a mut GraphApi,
}

impl Chain<'_> {
	/// See [`GraphApi::add_node`].
	pub fn add_node(self, label: &str, id: Option<NodeId>) -> Self {
		self.api.add_node(label, id, None, None);
		self
	}

	/// Add a node pinned at `(x, y)`.
	pub fn add_pinned_node(self, label: &str, id: Option<NodeId>, x: f64, y: f64) -> Self {
		self.api.add_node(label, id, Some(x), Some(y));
		self
	}

	/// See [`GraphApi::delete_node`].
	pub fn delete_node(self, id: NodeId) -> Self {
		self.api.delete_node(id);
		self
	}

	/// See [`GraphApi::update_node`].
	pub fn update_node(self, id: NodeId, patch: &NodePatch) -> Self {
		self.api.update_node(id, patch);
		self
	}

	/// See [`GraphApi::add_edge`].
	pub fn add_edge(self, source: NodeId, target: NodeId) -> Self {
		self.api.add_edge(source, target, None);
		self
	}

	/// See [`GraphApi::delete_edge`].
	pub fn delete_edge(self, source: NodeId, target: NodeId) -> Self {
		self.api.delete_edge(source, target);
		self
	}

	/// See [`GraphApi::clear`].
	pub fn clear(self) -> Self {
		self.api.clear();
		self
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	fn api() -> GraphApi {
		GraphApi::with_seed(Viewport::new(400.0, 300.0), 7)
	}

	#[test]
	fn spawn_is_near_center_and_free() {
		let mut api = api();
		let id = api.add_node("a", None, None, None).applied().expect("id");
		let node = api.node(id).expect("node");
		assert!((node.x - 200.0).abs() <= 10.0);
		assert!((node.y - 150.0).abs() <= 10.0);
		assert!(!node.is_pinned());
	}

	#[test]
	fn explicit_coordinates_pin() {
		let mut api = api();
		api.add_node("a", Some(3), Some(10.0), Some(20.0));
		let node = api.node(3).expect("node");
		assert_eq!((node.fx, node.fy), (Some(10.0), Some(20.0)));

		// a single coordinate places but does not pin
		api.add_node("b", Some(4), Some(10.0), None);
		let node = api.node(4).expect("node");
		assert_eq!(node.x, 10.0);
		assert!(!node.is_pinned());
	}

	#[test]
	fn empty_label_defaults_to_id() {
		let mut api = api();
		api.add_node("", Some(42), None, None);
		assert_eq!(api.node(42).expect("node").label, "42");
	}

	#[test]
	fn rejected_mutations_keep_revision() {
		let mut api = api();
		api.add_node("a", Some(1), None, None);
		let rev = api.revision();
		assert!(!api.add_node("again", Some(1), None, None).is_applied());
		assert!(!api.add_edge(1, 1, None).is_applied());
		assert!(!api.delete_node(9).is_applied());
		assert_eq!(api.revision(), rev);
	}

	#[test]
	fn set_graph_drops_invalid_entries() {
		let mut api = api();
		let nodes = vec![
			NodeInput {
				id: 1,
				label: "a".into(),
				..NodeInput::default()
			},
			NodeInput {
				id: 1,
				label: "dup".into(),
				..NodeInput::default()
			},
			NodeInput {
				id: 2,
				..NodeInput::default()
			},
		];
		let links = vec![
			Edge::new(1, 2, Map::new()),
			Edge::new(2, 1, Map::new()),
			Edge::new(1, 1, Map::new()),
			Edge::new(1, 9, Map::new()),
		];
		api.set_graph(&nodes, &links);
		assert_eq!(api.node_count(), 2);
		assert_eq!(api.node(1).expect("node").label, "a");
		assert_eq!(api.node(2).expect("node").label, "2");
		assert_eq!(api.edge_count(), 1);
		assert_eq!(api.store().next_id(), 3);
	}

	#[test]
	fn chain_applies_in_order() {
		let mut api = api();
		api.chain()
			.add_node("A", Some(1))
			.add_node("B", None)
			.add_edge(1, 2)
			.delete_edge(2, 1)
			.add_edge(2, 1);
		assert_eq!(api.edge(1, 2).map(|e| e.source), Some(2));
	}
}
