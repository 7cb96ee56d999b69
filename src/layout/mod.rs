//! Force-directed layout: link springs, many-body charge, centering and
//! per-axis gravity, with velocity damping and viewport clamping.

mod config;
mod forces;
mod simulation;

pub use config::{GraphConfig, LayoutConfig, ViewConfig};
pub use simulation::Simulation;
