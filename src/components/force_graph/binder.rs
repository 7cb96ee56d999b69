use std::collections::{HashMap, HashSet};

use crate::graph::{Edge, EdgeKey, Node, NodeId};
use crate::layout::ViewConfig;

/// Frames a freshly entered glyph takes to fade in.
pub const ENTER_FRAMES: u32 = 12;

/// On-screen state for one node. Survives re-binds while its node exists.
#[derive(Clone, Debug, PartialEq)]
pub struct NodeGlyph {
	/// Node the glyph is bound to.
	pub id: NodeId,
	/// Text drawn in the circle.
	pub label: String,
	/// Center x from the last tick.
	pub x: f64,
	/// Center y from the last tick.
	pub y: f64,
	/// Either axis is pinned.
	pub pinned: bool,
	/// A pointer is holding the node.
	pub dragging: bool,
	/// Frames since the glyph entered.
	pub age: u32,
}

impl NodeGlyph {
	fn enter(node: &Node) -> Self {
		Self {
			id: node.id,
			label: node.label.clone(),
			x: node.x,
			y: node.y,
			pinned: node.is_pinned(),
			dragging: false,
			age: 0,
		}
	}

	/// Fade-in opacity in `[0, 1]`.
	pub fn opacity(&self) -> f64 {
		(f64::from(self.age) / f64::from(ENTER_FRAMES)).min(1.0)
	}
}

/// On-screen state for one edge: its key and end points.
#[derive(Clone, Debug, PartialEq)]
pub struct LinkGlyph {
	/// Endpoints the glyph is bound to.
	pub key: EdgeKey,
	/// Source end x.
	pub x1: f64,
	/// Source end y.
	pub y1: f64,
	/// Target end x.
	pub x2: f64,
	/// Target end y.
	pub y2: f64,
}

/// Keys that entered or exited during one [`Scene::bind`].
#[derive(Clone, Debug, Default, PartialEq)]
pub struct BindReport {
	/// Nodes that gained a glyph.
	pub entered_nodes: Vec<NodeId>,
	/// Nodes whose glyph was dropped.
	pub exited_nodes: Vec<NodeId>,
	/// Edges that gained a glyph.
	pub entered_links: Vec<EdgeKey>,
	/// Edges whose glyph was dropped.
	pub exited_links: Vec<EdgeKey>,
}

impl BindReport {
	/// Whether nothing entered or exited.
	pub fn is_empty(&self) -> bool {
		self.entered_nodes.is_empty()
			&& self.exited_nodes.is_empty()
			&& self.entered_links.is_empty()
			&& self.exited_links.is_empty()
	}
}

/// What a pointer landed on.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Hit {
	/// The node's delete affordance.
	Delete(NodeId),
	/// The node body.
	Node(NodeId),
}

/// Retained glyphs keyed by node id and edge endpoints, in paint order.
#[derive(Clone, Debug, Default)]
pub struct Scene {
	nodes: Vec<NodeGlyph>,
	links: Vec<LinkGlyph>,
	view: ViewConfig,
}

impl Scene {
	/// Empty scene drawn with `view` geometry.
	pub fn new(view: ViewConfig) -> Self {
		Self {
			nodes: Vec::new(),
			links: Vec::new(),
			view,
		}
	}

	/// Node glyphs in paint order.
	pub fn nodes(&self) -> &[NodeGlyph] {
		&self.nodes
	}

	/// Link glyphs in paint order.
	pub fn links(&self) -> &[LinkGlyph] {
		&self.links
	}

	/// Glyph for node `id`.
	pub fn node(&self, id: NodeId) -> Option<&NodeGlyph> {
		self.nodes.iter().find(|g| g.id == id)
	}

	pub(crate) fn node_mut(&mut self, id: NodeId) -> Option<&mut NodeGlyph> {
		self.nodes.iter_mut().find(|g| g.id == id)
	}

	/// Glyph geometry.
	pub fn view(&self) -> &ViewConfig {
		&self.view
	}

	/// Match glyphs to the current collections: drop glyphs whose entity is
	/// gone, refresh the survivors in place, append glyphs for new entities.
	pub fn bind(&mut self, nodes: &[Node], links: &[Edge]) -> BindReport {
		let mut report = BindReport::default();

		let by_id: HashMap<NodeId, &Node> = nodes.iter().map(|n| (n.id, n)).collect();
		self.nodes.retain(|g| {
			let keep = by_id.contains_key(&g.id);
			if !keep {
				report.exited_nodes.push(g.id);
			}
			keep
		});
		let mut bound: HashSet<NodeId> = HashSet::with_capacity(self.nodes.len());
		for glyph in &mut self.nodes {
			if let Some(node) = by_id.get(&glyph.id) {
				glyph.label.clone_from(&node.label);
				glyph.pinned = node.is_pinned();
			}
			bound.insert(glyph.id);
		}
		for node in nodes {
			if bound.insert(node.id) {
				self.nodes.push(NodeGlyph::enter(node));
				report.entered_nodes.push(node.id);
			}
		}

		let keys: HashSet<EdgeKey> = links.iter().map(Edge::key).collect();
		self.links.retain(|g| {
			let keep = keys.contains(&g.key);
			if !keep {
				report.exited_links.push(g.key);
			}
			keep
		});
		let mut bound: HashSet<EdgeKey> = self.links.iter().map(|g| g.key).collect();
		for link in links {
			let key = link.key();
			if bound.insert(key) {
				self.links.push(LinkGlyph {
					key,
					x1: 0.0,
					y1: 0.0,
					x2: 0.0,
					y2: 0.0,
				});
				report.entered_links.push(key);
			}
		}

		self.sync_positions(nodes);
		report
	}

	/// Copy the latest positions into the glyphs and re-derive link ends.
	pub fn sync_positions(&mut self, nodes: &[Node]) {
		let by_id: HashMap<NodeId, &Node> = nodes.iter().map(|n| (n.id, n)).collect();
		for glyph in &mut self.nodes {
			if let Some(node) = by_id.get(&glyph.id) {
				glyph.x = node.x;
				glyph.y = node.y;
				glyph.pinned = node.is_pinned();
			}
		}
		for link in &mut self.links {
			if let (Some(s), Some(t)) = (by_id.get(&link.key.source), by_id.get(&link.key.target)) {
				(link.x1, link.y1, link.x2, link.y2) = (s.x, s.y, t.x, t.y);
			}
		}
	}

	/// Advance per-glyph animation clocks by one frame.
	pub fn advance(&mut self) {
		for glyph in &mut self.nodes {
			glyph.age = glyph.age.saturating_add(1);
		}
	}

	/// Topmost glyph under `(x, y)`. A glyph's delete affordance wins over
	/// its body.
	pub fn hit_test(&self, x: f64, y: f64) -> Option<Hit> {
		let (ox, oy) = self.view.delete_offset;
		let within = |cx: f64, cy: f64, r: f64| (x - cx).powi(2) + (y - cy).powi(2) <= r * r;

		self.nodes.iter().rev().find_map(|g| {
			if within(g.x + ox, g.y + oy, self.view.delete_radius) {
				Some(Hit::Delete(g.id))
			} else if within(g.x, g.y, self.view.node_radius) {
				Some(Hit::Node(g.id))
			} else {
				None
			}
		})
	}
}

#[cfg(test)]
mod tests {
	use serde_json::Map;

	use super::*;

	fn node(id: NodeId, x: f64, y: f64) -> Node {
		Node::new(id, format!("n{id}"), x, y)
	}

	#[test]
	fn bind_enters_updates_and_exits() {
		let mut scene = Scene::new(ViewConfig::default());
		let nodes = vec![node(1, 10.0, 10.0), node(2, 50.0, 50.0)];
		let links = vec![Edge::new(1, 2, Map::new())];
		let report = scene.bind(&nodes, &links);
		assert_eq!(report.entered_nodes, vec![1, 2]);
		assert_eq!(report.entered_links.len(), 1);

		scene.node_mut(1).expect("glyph").dragging = true;
		let mut nodes = vec![node(1, 10.0, 10.0), node(3, 0.0, 0.0)];
		nodes[0].label = "renamed".into();
		let report = scene.bind(&nodes, &[]);
		assert_eq!(report.entered_nodes, vec![3]);
		assert_eq!(report.exited_nodes, vec![2]);
		assert_eq!(report.exited_links.len(), 1);

		let kept = scene.node(1).expect("glyph");
		assert!(kept.dragging);
		assert_eq!(kept.label, "renamed");
	}

	#[test]
	fn rebind_with_same_data_is_a_no_op() {
		let mut scene = Scene::new(ViewConfig::default());
		let nodes = vec![node(1, 0.0, 0.0)];
		scene.bind(&nodes, &[]);
		assert!(scene.bind(&nodes, &[]).is_empty());
		assert_eq!(scene.nodes().len(), 1);
	}

	#[test]
	fn links_follow_node_positions() {
		let mut scene = Scene::new(ViewConfig::default());
		let mut nodes = vec![node(1, 0.0, 0.0), node(2, 100.0, 0.0)];
		let links = vec![Edge::new(2, 1, Map::new())];
		scene.bind(&nodes, &links);
		nodes[1].x = 150.0;
		scene.sync_positions(&nodes);
		let link = &scene.links()[0];
		assert_eq!((link.x1, link.x2), (150.0, 0.0));
	}

	#[test]
	fn delete_affordance_wins_over_body() {
		let mut scene = Scene::new(ViewConfig::default());
		scene.bind(&[node(1, 100.0, 100.0)], &[]);
		assert_eq!(scene.hit_test(115.0, 85.0), Some(Hit::Delete(1)));
		assert_eq!(scene.hit_test(100.0, 105.0), Some(Hit::Node(1)));
		assert_eq!(scene.hit_test(300.0, 300.0), None);
	}

	#[test]
	fn topmost_glyph_is_hit_first() {
		let mut scene = Scene::new(ViewConfig::default());
		scene.bind(&[node(1, 100.0, 100.0), node(2, 105.0, 100.0)], &[]);
		assert_eq!(scene.hit_test(103.0, 100.0), Some(Hit::Node(2)));
	}

	#[test]
	fn glyphs_fade_in() {
		let mut scene = Scene::new(ViewConfig::default());
		scene.bind(&[node(1, 0.0, 0.0)], &[]);
		assert_eq!(scene.nodes()[0].opacity(), 0.0);
		for _ in 0..ENTER_FRAMES {
			scene.advance();
		}
		assert_eq!(scene.nodes()[0].opacity(), 1.0);
	}
}
