//! Individual force passes. Each one reads positions and accumulates into
//! velocities, except [`center`] which translates positions directly.

use rand::Rng;
use rand::rngs::SmallRng;

use crate::graph::{Node, Viewport};

// Tiny random offset that separates coincident nodes.
fn jiggle(rng: &mut SmallRng) -> f64 {
	(rng.r#gen::<f64>() - 0.5) * 1e-6
}

/// Springs toward `distance` along each resolved link.
///
/// Strength is `1 / min(degree)` of the endpoints and the correction is
/// split by degree so that hubs move less than leaves.
pub(crate) fn link(
	nodes: &mut [Node],
	links: &[(usize, usize)],
	distance: f64,
	alpha: f64,
	rng: &mut SmallRng,
) {
	let mut count = vec![0usize; nodes.len()];
	for &(s, t) in links {
		count[s] += 1;
		count[t] += 1;
	}

	for &(s, t) in links {
		let (src, tgt) = (&nodes[s], &nodes[t]);
		let mut x = tgt.x + tgt.vx - src.x - src.vx;
		let mut y = tgt.y + tgt.vy - src.y - src.vy;
		if x == 0.0 {
			x = jiggle(rng);
		}
		if y == 0.0 {
			y = jiggle(rng);
		}
		let l = (x * x + y * y).sqrt();
		let strength = 1.0 / count[s].min(count[t]) as f64;
		let k = (l - distance) / l * alpha * strength;
		let (x, y) = (x * k, y * k);
		let bias = count[s] as f64 / (count[s] + count[t]) as f64;

		nodes[t].vx -= x * bias;
		nodes[t].vy -= y * bias;
		nodes[s].vx += x * (1.0 - bias);
		nodes[s].vy += y * (1.0 - bias);
	}
}

/// All-pairs inverse-distance charge.
pub(crate) fn charge(
	nodes: &mut [Node],
	strength: f64,
	distance_min: f64,
	alpha: f64,
	rng: &mut SmallRng,
) {
	let min2 = distance_min * distance_min;
	let n = nodes.len();
	for i in 0..n {
		let (xi, yi) = (nodes[i].x, nodes[i].y);
		let (mut dvx, mut dvy) = (0.0, 0.0);
		for (j, other) in nodes.iter().enumerate() {
			if i == j {
				continue;
			}
			let mut x = other.x - xi;
			let mut y = other.y - yi;
			let mut l = x * x + y * y;
			if x == 0.0 {
				x = jiggle(rng);
				l += x * x;
			}
			if y == 0.0 {
				y = jiggle(rng);
				l += y * y;
			}
			if l < min2 {
				l = (min2 * l).sqrt();
			}
			dvx += x * strength * alpha / l;
			dvy += y * strength * alpha / l;
		}
		nodes[i].vx += dvx;
		nodes[i].vy += dvy;
	}
}

/// Translate every node so their mean sits on the viewport center.
pub(crate) fn center(nodes: &mut [Node], viewport: Viewport, strength: f64) {
	if nodes.is_empty() {
		return;
	}
	let n = nodes.len() as f64;
	let (cx, cy) = viewport.center();
	let (sx, sy) = nodes
		.iter()
		.fold((0.0, 0.0), |(sx, sy), node| (sx + node.x, sy + node.y));
	let (dx, dy) = ((sx / n - cx) * strength, (sy / n - cy) * strength);
	for node in nodes.iter_mut() {
		node.x -= dx;
		node.y -= dy;
	}
}

/// Independent per-axis pull toward the viewport center.
pub(crate) fn gravity(nodes: &mut [Node], viewport: Viewport, strength: f64, alpha: f64) {
	let (cx, cy) = viewport.center();
	for node in nodes.iter_mut() {
		node.vx += (cx - node.x) * strength * alpha;
		node.vy += (cy - node.y) * strength * alpha;
	}
}

/// Apply damping and advance positions. Pinned axes snap to their pin.
pub(crate) fn integrate(nodes: &mut [Node], velocity_decay: f64) {
	let keep = 1.0 - velocity_decay;
	for node in nodes.iter_mut() {
		match node.fx {
			Some(fx) => {
				node.x = fx;
				node.vx = 0.0;
			}
			None => {
				node.vx *= keep;
				node.x += node.vx;
			}
		}
		match node.fy {
			Some(fy) => {
				node.y = fy;
				node.vy = 0.0;
			}
			None => {
				node.vy *= keep;
				node.y += node.vy;
			}
		}
	}
}

/// Confine free axes to `[inset, dimension - inset]`, zeroing the velocity
/// on any axis that hit a wall. Not a force: runs after integration.
pub(crate) fn clamp(nodes: &mut [Node], viewport: Viewport, inset: f64) {
	let bounds = |dim: f64| {
		let (lo, hi) = (inset, dim - inset);
		if hi < lo { (dim / 2.0, dim / 2.0) } else { (lo, hi) }
	};
	let (min_x, max_x) = bounds(viewport.width);
	let (min_y, max_y) = bounds(viewport.height);

	for node in nodes.iter_mut() {
		if node.fx.is_none() && !(min_x..=max_x).contains(&node.x) {
			node.x = node.x.clamp(min_x, max_x);
			node.vx = 0.0;
		}
		if node.fy.is_none() && !(min_y..=max_y).contains(&node.y) {
			node.y = node.y.clamp(min_y, max_y);
			node.vy = 0.0;
		}
	}
}
