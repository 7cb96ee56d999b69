use super::types::{Edge, Node, NodeId};

/// First id handed out by an empty store.
pub const FIRST_ID: NodeId = 1;

/// Canonical node and edge collections plus the id allocator.
///
/// The store holds no validation logic; [`GraphApi`](super::GraphApi) is the
/// only writer and keeps the invariants.
#[derive(Clone, Debug)]
pub struct GraphStore {
	pub(crate) nodes: Vec<Node>,
	pub(crate) links: Vec<Edge>,
	pub(crate) next_id: NodeId,
}

impl Default for GraphStore {
	fn default() -> Self {
		Self {
			nodes: Vec::new(),
			links: Vec::new(),
			next_id: FIRST_ID,
		}
	}
}

impl GraphStore {
	/// Nodes in insertion order.
	pub fn nodes(&self) -> &[Node] {
		&self.nodes
	}

	/// Edges in insertion order.
	pub fn links(&self) -> &[Edge] {
		&self.links
	}

	/// Id the next auto-allocated node receives.
	pub fn next_id(&self) -> NodeId {
		self.next_id
	}

	pub(crate) fn position(&self, id: NodeId) -> Option<usize> {
		self.nodes.iter().position(|n| n.id == id)
	}

	pub(crate) fn node(&self, id: NodeId) -> Option<&Node> {
		self.nodes.iter().find(|n| n.id == id)
	}

	pub(crate) fn node_mut(&mut self, id: NodeId) -> Option<&mut Node> {
		self.nodes.iter_mut().find(|n| n.id == id)
	}

	pub(crate) fn edge(&self, a: NodeId, b: NodeId) -> Option<&Edge> {
		self.links.iter().find(|l| l.connects(a, b))
	}

	/// Advance the allocator past `id` so auto ids never collide with it.
	/// Saturates at `NodeId::MAX`; an allocation there is then rejected as a
	/// duplicate instead of wrapping.
	pub(crate) fn reserve(&mut self, id: NodeId) {
		if id >= self.next_id {
			self.next_id = id.saturating_add(1);
		}
	}

	pub(crate) fn reset(&mut self) {
		*self = Self::default();
	}

	/// Split borrow for the layout pass: positions are writable, edges are not.
	pub(crate) fn bodies_mut(&mut self) -> (&mut [Node], &[Edge]) {
		(&mut self.nodes, &self.links)
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn reserve_only_moves_forward() {
		let mut store = GraphStore::default();
		store.reserve(5);
		assert_eq!(store.next_id(), 6);
		store.reserve(2);
		assert_eq!(store.next_id(), 6);
	}

	#[test]
	fn reserve_saturates_at_max_id() {
		let mut store = GraphStore::default();
		store.reserve(NodeId::MAX);
		assert_eq!(store.next_id(), NodeId::MAX);
		store.reserve(NodeId::MAX);
		assert_eq!(store.next_id(), NodeId::MAX);
	}
}
