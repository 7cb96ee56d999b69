use std::collections::HashMap;

use log::debug;

use super::binder::{BindReport, Hit, Scene};
use crate::backend::GraphSource;
use crate::graph::{GraphApi, NodeId, Viewport};
use crate::layout::{GraphConfig, Simulation, ViewConfig};
use crate::trace::TranslationSummary;

/// Identifies one pointer: the mouse, or a single touch point.
pub type PointerId = i32;

/// Pointer id used for the mouse. Touch identifiers are non-negative.
pub const MOUSE_POINTER: PointerId = -1;

/// One pointer holding one node.
#[derive(Clone, Debug, PartialEq)]
pub struct DragSession {
	/// Node being dragged.
	pub node: NodeId,
	offset: (f64, f64),
	/// Pin the node carried before the drag, if any.
	prior_pin: Option<(f64, f64)>,
	last: (f64, f64),
}

/// Result of pressing a pointer on the canvas.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PointerAction {
	/// The press hit a delete affordance and removed the node.
	Deleted(NodeId),
	/// The press grabbed a node.
	DragStarted(NodeId),
	/// Nothing under the pointer.
	Missed,
}

/// Everything one mounted graph view owns: store, layout, glyphs and the
/// in-flight drag sessions.
pub struct ForceGraphState {
	/// Graph handle shared with the host.
	pub api: GraphApi,
	/// Layout driving node positions.
	pub simulation: Simulation,
	/// Glyphs painted each frame.
	pub scene: Scene,
	view: ViewConfig,
	drags: HashMap<PointerId, DragSession>,
	bound_revision: Option<u64>,
}

impl ForceGraphState {
	/// View state for an empty graph; `seed` drives spawn jitter and jiggle.
	pub fn new(config: &GraphConfig, viewport: Viewport, seed: u64) -> Self {
		let mut api = GraphApi::with_seed(viewport, seed);
		api.set_spawn_jitter(config.view.jitter);
		Self {
			api,
			simulation: Simulation::with_seed(config.layout.clone(), seed.rotate_left(17)),
			scene: Scene::new(config.view.clone()),
			view: config.view.clone(),
			drags: HashMap::new(),
			bound_revision: None,
		}
	}

	/// Current drawing surface.
	pub fn viewport(&self) -> Viewport {
		self.api.viewport()
	}

	/// Track a new surface size and re-anneal.
	pub fn resize(&mut self, width: f64, height: f64) {
		self.api.set_viewport(Viewport::new(width, height));
		self.simulation.restart();
	}

	/// Replace the graph from `source`.
	pub fn apply_source(&mut self, source: &GraphSource) -> TranslationSummary {
		self.release_all();
		source.apply(&mut self.api)
	}

	/// One frame: re-bind on change, step physics, clamp, sync glyphs.
	pub fn tick(&mut self) -> Option<BindReport> {
		let revision = self.api.revision();
		let report = (self.bound_revision != Some(revision)).then(|| self.rebind(revision));
		self.simulation.observe(revision);

		let viewport = self.api.viewport();
		self.simulation.step(self.api.store_mut(), viewport);
		self.simulation
			.constrain(self.api.store_mut(), viewport, self.view.inset());
		self.scene.sync_positions(self.api.store().nodes());
		self.scene.advance();
		report
	}

	fn rebind(&mut self, revision: u64) -> BindReport {
		let store = self.api.store();
		let report = self.scene.bind(store.nodes(), store.links());
		self.bound_revision = Some(revision);

		if !report.exited_nodes.is_empty() {
			let before = self.drags.len();
			self.drags
				.retain(|_, s| !report.exited_nodes.contains(&s.node));
			if before != self.drags.len() && self.drags.is_empty() {
				self.simulation.set_alpha_target(0.0);
			}
		}
		for session in self.drags.values() {
			if let Some(glyph) = self.scene.node_mut(session.node) {
				glyph.dragging = true;
			}
		}
		debug!(
			"re-bound scene: +{} -{} nodes, +{} -{} links",
			report.entered_nodes.len(),
			report.exited_nodes.len(),
			report.entered_links.len(),
			report.exited_links.len()
		);
		report
	}

	/// Whether any pointer holds a node.
	pub fn is_dragging(&self) -> bool {
		!self.drags.is_empty()
	}

	/// The session held by `pointer`.
	pub fn drag_session(&self, pointer: PointerId) -> Option<&DragSession> {
		self.drags.get(&pointer)
	}

	/// Press at `(x, y)` in graph units. A delete affordance deletes its node
	/// and consumes the press; a node body starts a drag.
	pub fn pointer_down(&mut self, pointer: PointerId, x: f64, y: f64) -> PointerAction {
		match self.scene.hit_test(x, y) {
			Some(Hit::Delete(id)) => {
				self.api.delete_node(id);
				PointerAction::Deleted(id)
			}
			Some(Hit::Node(id)) => self.start_drag(pointer, id, x, y),
			None => PointerAction::Missed,
		}
	}

	fn start_drag(&mut self, pointer: PointerId, id: NodeId, x: f64, y: f64) -> PointerAction {
		let Some(node) = self.api.node(id) else {
			return PointerAction::Missed;
		};
		if let Some(previous) = self.drags.remove(&pointer) {
			self.finish(previous);
		}

		// A node already held by another pointer carries that drag's pin, not
		// its own.
		let prior_pin = match self.drags.values().find(|s| s.node == id) {
			Some(held) => held.prior_pin,
			None => node.fx.zip(node.fy),
		};
		self.api.set_pin(id, Some((node.x, node.y)));
		if self.drags.is_empty() {
			let target = self.simulation.config().drag_alpha_target;
			self.simulation.set_alpha_target(target);
		}
		self.drags.insert(
			pointer,
			DragSession {
				node: id,
				offset: (node.x - x, node.y - y),
				prior_pin,
				last: (node.x, node.y),
			},
		);
		if let Some(glyph) = self.scene.node_mut(id) {
			glyph.dragging = true;
		}
		debug!("drag started on node {id}");
		PointerAction::DragStarted(id)
	}

	/// Move the pin of the node held by `pointer` to follow it.
	pub fn pointer_move(&mut self, pointer: PointerId, x: f64, y: f64) {
		let Some(session) = self.drags.get_mut(&pointer) else {
			return;
		};
		let target = (x + session.offset.0, y + session.offset.1);
		session.last = target;
		let node = session.node;
		if !self.api.set_pin(node, Some(target)) {
			self.drags.remove(&pointer);
		}
	}

	/// Release the node held by `pointer`.
	pub fn pointer_up(&mut self, pointer: PointerId) {
		if let Some(session) = self.drags.remove(&pointer) {
			self.finish(session);
		}
		if self.drags.is_empty() {
			self.simulation.set_alpha_target(0.0);
		}
	}

	/// End every drag, e.g. when the pointer leaves the canvas.
	pub fn release_all(&mut self) {
		let pointers: Vec<PointerId> = self.drags.keys().copied().collect();
		for pointer in &pointers {
			if let Some(session) = self.drags.remove(pointer) {
				self.finish(session);
			}
		}
		if !pointers.is_empty() {
			self.simulation.set_alpha_target(0.0);
		}
	}

	// Explicitly pinned nodes stay pinned where they were dropped. A node
	// still held by another pointer is left to that drag.
	fn finish(&mut self, session: DragSession) {
		if self.drags.values().any(|s| s.node == session.node) {
			return;
		}
		let pin = session.prior_pin.map(|_| session.last);
		self.api.set_pin(session.node, pin);
		if let Some(glyph) = self.scene.node_mut(session.node) {
			glyph.dragging = false;
		}
		debug!("drag ended on node {}", session.node);
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	fn state() -> ForceGraphState {
		let mut state = ForceGraphState::new(&GraphConfig::default(), Viewport::new(400.0, 400.0), 5);
		state.api.add_node("a", Some(1), Some(100.0), Some(100.0));
		state.api.add_node("b", Some(2), None, None);
		state.tick();
		state
	}

	#[test]
	fn tick_rebinds_only_on_change() {
		let mut state = state();
		assert!(state.tick().is_none());
		state.api.add_edge(1, 2, None);
		let report = state.tick().expect("rebind");
		assert_eq!(report.entered_links.len(), 1);
	}

	#[test]
	fn press_on_delete_affordance_deletes() {
		let mut state = state();
		let action = state.pointer_down(MOUSE_POINTER, 115.0, 85.0);
		assert_eq!(action, PointerAction::Deleted(1));
		assert!(!state.api.has_node(1));
		assert!(!state.is_dragging());
	}

	#[test]
	fn drag_raises_and_restores_excitation() {
		let mut state = state();
		state.api.update_node(1, &crate::graph::NodePatch::pinned_at(300.0, 300.0));
		state.tick();

		assert_eq!(
			state.pointer_down(MOUSE_POINTER, 302.0, 300.0),
			PointerAction::DragStarted(1)
		);
		assert_eq!(state.simulation.alpha_target(), 0.3);
		state.pointer_move(MOUSE_POINTER, 250.0, 250.0);
		assert_eq!(state.api.node(1).and_then(|n| n.fx), Some(248.0));

		state.pointer_up(MOUSE_POINTER);
		assert_eq!(state.simulation.alpha_target(), 0.0);
		// explicitly pinned before the drag, so it stays pinned at the drop point
		let node = state.api.node(1).expect("node");
		assert_eq!((node.fx, node.fy), (Some(248.0), Some(250.0)));
	}

	#[test]
	fn free_node_is_released_after_drag() {
		let mut state = state();
		let glyph = state.scene.node(2).expect("glyph").clone();
		state.pointer_down(MOUSE_POINTER, glyph.x, glyph.y);
		assert!(state.api.node(2).expect("node").is_pinned());
		state.pointer_up(MOUSE_POINTER);
		assert!(!state.api.node(2).expect("node").is_pinned());
	}

	#[test]
	fn concurrent_drags_keep_excitation_until_last_ends() {
		let mut state = state();
		let b = state.scene.node(2).expect("glyph").clone();
		state.pointer_down(0, 100.0, 100.0);
		state.pointer_down(1, b.x, b.y);
		state.pointer_up(0);
		assert_eq!(state.simulation.alpha_target(), 0.3);
		state.pointer_up(1);
		assert_eq!(state.simulation.alpha_target(), 0.0);
	}

	#[test]
	fn two_pointers_on_one_free_node_release_it() {
		let mut state = state();
		let b = state.scene.node(2).expect("glyph").clone();
		state.pointer_down(0, b.x, b.y);
		state.pointer_down(1, b.x, b.y);
		assert_eq!(state.drag_session(1).map(|s| s.node), Some(2));

		state.pointer_up(0);
		assert!(state.api.node(2).expect("node").is_pinned());
		assert!(state.scene.node(2).expect("glyph").dragging);

		state.pointer_up(1);
		let node = state.api.node(2).expect("node");
		assert_eq!((node.fx, node.fy), (None, None));
		assert!(!state.scene.node(2).expect("glyph").dragging);
	}

	#[test]
	fn two_pointers_on_one_pinned_node_keep_the_pin() {
		let mut state = state();
		state.pointer_down(0, 100.0, 100.0);
		state.pointer_down(1, 100.0, 100.0);
		state.pointer_move(1, 140.0, 120.0);
		state.pointer_up(0);
		state.pointer_up(1);
		let node = state.api.node(1).expect("node");
		assert_eq!((node.fx, node.fy), (Some(140.0), Some(120.0)));
	}

	#[test]
	fn deleting_a_dragged_node_ends_its_session() {
		let mut state = state();
		state.pointer_down(0, 100.0, 100.0);
		state.api.delete_node(1);
		state.tick();
		assert!(!state.is_dragging());
		assert_eq!(state.simulation.alpha_target(), 0.0);
	}
}
