use serde::Deserialize;

use crate::graph::GraphError;

/// Force and annealing tunables.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LayoutConfig {
	/// Rest length of the link springs.
	pub link_distance: f64,
	/// Many-body strength; negative repels.
	pub charge_strength: f64,
	/// Below this separation the charge force stops growing.
	pub charge_distance_min: f64,
	/// Recenter the node mean on the viewport center every tick.
	pub center: bool,
	/// Fraction of the centroid offset corrected per tick.
	pub center_strength: f64,
	/// Per-axis pull toward the viewport center.
	pub gravity_strength: f64,
	/// Fraction of velocity lost per tick.
	pub velocity_decay: f64,
	/// Excitation below which the layout counts as settled.
	pub alpha_min: f64,
	/// Fraction of the gap to the target closed per tick.
	pub alpha_decay: f64,
	/// Excitation held while a node is being dragged.
	pub drag_alpha_target: f64,
}

impl Default for LayoutConfig {
	fn default() -> Self {
		Self {
			link_distance: 80.0,
			charge_strength: -120.0,
			charge_distance_min: 1.0,
			center: true,
			center_strength: 1.0,
			gravity_strength: 0.05,
			velocity_decay: 0.35,
			alpha_min: 0.001,
			alpha_decay: default_alpha_decay(),
			drag_alpha_target: 0.3,
		}
	}
}

impl LayoutConfig {
	/// Looser standalone-page profile: longer springs, stronger repulsion,
	/// recentering only.
	pub fn classic() -> Self {
		Self {
			link_distance: 100.0,
			charge_strength: -300.0,
			gravity_strength: 0.0,
			velocity_decay: 0.4,
			..Self::default()
		}
	}

	fn validate(&self) -> Result<(), GraphError> {
		if !(0.0..1.0).contains(&self.velocity_decay) {
			return Err(GraphError::invalid_config("velocity_decay must be in [0, 1)"));
		}
		if !(0.0..=1.0).contains(&self.alpha_decay) {
			return Err(GraphError::invalid_config("alpha_decay must be in [0, 1]"));
		}
		if self.link_distance < 0.0 || self.charge_distance_min <= 0.0 {
			return Err(GraphError::invalid_config("distances must be positive"));
		}
		Ok(())
	}
}

// Reaches alpha_min from 1 in about 300 ticks.
fn default_alpha_decay() -> f64 {
	1.0 - 0.001_f64.powf(1.0 / 300.0)
}

/// Node glyph geometry, in graph units.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ViewConfig {
	/// Node circle radius R.
	pub node_radius: f64,
	/// Gap PAD kept between a node and the viewport edge.
	pub padding: f64,
	/// Spawn offset range around the viewport center.
	pub jitter: f64,
	/// Delete affordance offset from the node center.
	pub delete_offset: (f64, f64),
	/// Delete affordance hit radius.
	pub delete_radius: f64,
}

impl Default for ViewConfig {
	fn default() -> Self {
		Self {
			node_radius: 20.0,
			padding: 4.0,
			jitter: 10.0,
			delete_offset: (15.0, -15.0),
			delete_radius: 8.0,
		}
	}
}

impl ViewConfig {
	/// Smallest allowed coordinate on either axis.
	pub fn inset(&self) -> f64 {
		self.node_radius + self.padding
	}
}

/// Layout and view settings for one graph view.
#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GraphConfig {
	/// Force tunables.
	pub layout: LayoutConfig,
	/// Glyph geometry.
	pub view: ViewConfig,
}

impl GraphConfig {
	/// Parse and validate a JSON config; missing fields take defaults.
	pub fn from_json(json: &str) -> Result<Self, GraphError> {
		let config: GraphConfig =
			serde_json::from_str(json).map_err(|e| GraphError::invalid_config(e.to_string()))?;
		config.layout.validate()?;
		if config.view.node_radius < 0.0 || config.view.padding < 0.0 {
			return Err(GraphError::invalid_config("view sizes must be non-negative"));
		}
		Ok(config)
	}
}
