use std::collections::HashMap;

use log::debug;
use rand::SeedableRng;
use rand::rngs::SmallRng;

use super::config::LayoutConfig;
use super::forces;
use crate::graph::{GraphStore, NodeId, Viewport};

const SEED: u64 = 0x0f0e_c0de;

/// Stepped force-directed layout over a [`GraphStore`].
///
/// The simulation owns only its excitation state. Nodes and links are
/// re-read from the store on every step, so replacing the collections
/// between steps is always safe.
pub struct Simulation {
	config: LayoutConfig,
	alpha: f64,
	alpha_target: f64,
	running: bool,
	stopped: bool,
	seen_revision: Option<u64>,
	ticks: u64,
	rng: SmallRng,
}

impl Simulation {
	/// Simulation with a fixed default seed.
	pub fn new(config: LayoutConfig) -> Self {
		Self::with_seed(config, SEED)
	}

	/// Simulation whose jiggle is seeded with `seed`.
	pub fn with_seed(config: LayoutConfig, seed: u64) -> Self {
		Self {
			config,
			alpha: 1.0,
			alpha_target: 0.0,
			running: true,
			stopped: false,
			seen_revision: None,
			ticks: 0,
			rng: SmallRng::seed_from_u64(seed),
		}
	}

	/// Current tunables.
	pub fn config(&self) -> &LayoutConfig {
		&self.config
	}

	/// Replace the tunables and re-anneal.
	pub fn set_config(&mut self, config: LayoutConfig) {
		self.config = config;
		self.restart();
	}

	/// Current excitation.
	pub fn alpha(&self) -> f64 {
		self.alpha
	}

	/// Excitation the simulation cools toward.
	pub fn alpha_target(&self) -> f64 {
		self.alpha_target
	}

	/// Hold excitation near `target`, e.g. during a drag.
	pub fn set_alpha_target(&mut self, target: f64) {
		self.alpha_target = target.clamp(0.0, 1.0);
		self.resume();
	}

	/// Steps taken so far.
	pub fn ticks(&self) -> u64 {
		self.ticks
	}

	/// Full excitation, as after a structural change.
	pub fn restart(&mut self) {
		self.alpha = 1.0;
		self.resume();
	}

	/// Re-anneal when the graph revision moved since the last call.
	pub fn observe(&mut self, revision: u64) -> bool {
		if self.seen_revision == Some(revision) {
			return false;
		}
		self.seen_revision = Some(revision);
		debug!("graph revision {revision}, re-annealing");
		self.restart();
		true
	}

	/// Skip steps until [`resume`](Self::resume).
	pub fn pause(&mut self) {
		self.running = false;
	}

	/// Continue stepping unless stopped.
	pub fn resume(&mut self) {
		if !self.stopped {
			self.running = true;
		}
	}

	/// Permanent stop for teardown. Later restarts are ignored.
	pub fn stop(&mut self) {
		self.stopped = true;
		self.running = false;
	}

	/// Whether [`step`](Self::step) advances.
	pub fn is_running(&self) -> bool {
		self.running
	}

	/// Whether [`stop`](Self::stop) was called.
	pub fn is_stopped(&self) -> bool {
		self.stopped
	}

	/// Excitation has decayed below the threshold and nothing holds it up.
	pub fn is_settled(&self) -> bool {
		self.alpha < self.config.alpha_min && self.alpha_target < self.config.alpha_min
	}

	/// Advance one tick: cool, apply forces, integrate.
	pub fn step(&mut self, store: &mut GraphStore, viewport: Viewport) {
		if !self.running {
			return;
		}
		self.ticks += 1;
		self.alpha += (self.alpha_target - self.alpha) * self.config.alpha_decay;

		let (nodes, links) = store.bodies_mut();
		if !self.is_settled() {
			let index: HashMap<NodeId, usize> =
				nodes.iter().enumerate().map(|(i, n)| (n.id, i)).collect();
			let resolved: Vec<(usize, usize)> = links
				.iter()
				.filter_map(|l| Some((*index.get(&l.source)?, *index.get(&l.target)?)))
				.collect();

			let cfg = &self.config;
			forces::link(nodes, &resolved, cfg.link_distance, self.alpha, &mut self.rng);
			forces::charge(
				nodes,
				cfg.charge_strength,
				cfg.charge_distance_min,
				self.alpha,
				&mut self.rng,
			);
			if cfg.center {
				forces::center(nodes, viewport, cfg.center_strength);
			}
			if cfg.gravity_strength != 0.0 {
				forces::gravity(nodes, viewport, cfg.gravity_strength, self.alpha);
			}
		}
		forces::integrate(nodes, self.config.velocity_decay);
	}

	/// Keep free nodes inside the viewport. Runs after [`step`](Self::step)
	/// and before painting.
	pub fn constrain(&self, store: &mut GraphStore, viewport: Viewport, inset: f64) {
		let (nodes, _) = store.bodies_mut();
		forces::clamp(nodes, viewport, inset);
	}
}

impl Default for Simulation {
	fn default() -> Self {
		Self::new(LayoutConfig::default())
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::graph::GraphApi;

	fn settle(sim: &mut Simulation, api: &mut GraphApi, ticks: usize) {
		for _ in 0..ticks {
			let viewport = api.viewport();
			sim.step(api.store_mut(), viewport);
			sim.constrain(api.store_mut(), viewport, 24.0);
		}
	}

	#[test]
	fn observe_restarts_once_per_revision() {
		let mut sim = Simulation::default();
		let mut api = GraphApi::default();
		api.add_node("a", None, None, None);
		assert!(sim.observe(api.revision()));
		assert!(!sim.observe(api.revision()));
		settle(&mut sim, &mut api, 50);
		assert!(sim.alpha() < 1.0);
		api.add_node("b", None, None, None);
		assert!(sim.observe(api.revision()));
		assert_eq!(sim.alpha(), 1.0);
	}

	#[test]
	fn alpha_decays_until_settled() {
		let mut sim = Simulation::default();
		let mut api = GraphApi::default();
		settle(&mut sim, &mut api, 400);
		assert!(sim.is_settled());
	}

	#[test]
	fn drag_target_holds_excitation() {
		let mut sim = Simulation::default();
		let mut api = GraphApi::default();
		sim.set_alpha_target(0.3);
		settle(&mut sim, &mut api, 1000);
		assert!((sim.alpha() - 0.3).abs() < 1e-3);
		assert!(!sim.is_settled());
	}

	#[test]
	fn linked_pair_settles_near_rest_length() {
		let mut sim = Simulation::default();
		let mut api = GraphApi::with_seed(Viewport::new(800.0, 600.0), 11);
		api.add_node("a", Some(1), None, None);
		api.add_node("b", Some(2), None, None);
		api.add_edge(1, 2, None);
		sim.observe(api.revision());
		settle(&mut sim, &mut api, 600);

		let (a, b) = (api.node(1).expect("a"), api.node(2).expect("b"));
		let d = ((a.x - b.x).powi(2) + (a.y - b.y).powi(2)).sqrt();
		assert!(d > 40.0 && d < 200.0, "distance {d}");
	}

	#[test]
	fn paused_simulation_does_not_move_nodes() {
		let mut sim = Simulation::default();
		let mut api = GraphApi::default();
		api.add_node("a", Some(1), None, None);
		api.add_node("b", Some(2), None, None);
		let before = api.nodes();
		sim.pause();
		settle(&mut sim, &mut api, 10);
		assert_eq!(api.nodes(), before);
		assert_eq!(sim.ticks(), 0);
	}

	#[test]
	fn stop_is_final() {
		let mut sim = Simulation::default();
		sim.stop();
		sim.restart();
		sim.set_alpha_target(0.3);
		assert!(!sim.is_running());
	}
}
