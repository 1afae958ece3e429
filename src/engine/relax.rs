//! Fixed-iteration spring embedder run once per dataset load.

use super::config::{CanvasConfig, RelaxationConfig};
use super::graph::Graph;

/// Relax seeded positions in place.
///
/// Every iteration accumulates repulsion between all node pairs, spring
/// attraction along edges and a pull toward each node's cluster anchor into
/// the node velocities, then damps, integrates and clamps to the canvas.
pub fn relax(graph: &mut Graph, canvas: &CanvasConfig, config: &RelaxationConfig) {
	let n = graph.nodes.len();
	for node in &mut graph.nodes {
		node.vx = 0.0;
		node.vy = 0.0;
	}

	for _ in 0..config.iterations {
		// Repulsion: all unordered pairs push apart, distance floored.
		for i in 0..n {
			for j in (i + 1)..n {
				let (mut dx, mut dy) = (
					graph.nodes[i].x - graph.nodes[j].x,
					graph.nodes[i].y - graph.nodes[j].y,
				);
				let mut dist = dx.hypot(dy);
				if dist < 1e-9 {
					// Coincident nodes get a fixed per-pair direction.
					let angle = i as f64 * 2.399_963 + j as f64;
					(dx, dy, dist) = (angle.cos(), angle.sin(), 1.0);
				}
				let floored = dist.max(config.min_separation);
				let force = config.repulsion / (floored * floored);
				let (fx, fy) = (dx / dist * force, dy / dist * force);
				graph.nodes[i].vx += fx;
				graph.nodes[i].vy += fy;
				graph.nodes[j].vx -= fx;
				graph.nodes[j].vy -= fy;
			}
		}

		// Springs: direction ignored, both endpoints pulled toward rest length.
		for edge in &graph.edges {
			let (a, b) = (&graph.nodes[edge.source], &graph.nodes[edge.target]);
			let (dx, dy) = (b.x - a.x, b.y - a.y);
			let dist = dx.hypot(dy);
			if dist < 1e-9 {
				continue;
			}
			let force = (dist - config.rest_length) * config.spring;
			let (fx, fy) = (dx / dist * force, dy / dist * force);
			graph.nodes[edge.source].vx += fx;
			graph.nodes[edge.source].vy += fy;
			graph.nodes[edge.target].vx -= fx;
			graph.nodes[edge.target].vy -= fy;
		}

		for node in &mut graph.nodes {
			let cluster = &graph.clusters[node.cluster];
			node.vx += (cluster.anchor_x - node.x) * config.cluster_gravity;
			node.vy += (cluster.anchor_y - node.y) * config.cluster_gravity;
			node.vx *= config.damping;
			node.vy *= config.damping;
			node.x += node.vx;
			node.y += node.vy;
		}
		clamp_to_canvas(graph, canvas, config);
	}
	clamp_to_canvas(graph, canvas, config);
	log::debug!(
		"relaxed {} nodes over {} iterations",
		n,
		config.iterations
	);
}

fn clamp_to_canvas(graph: &mut Graph, canvas: &CanvasConfig, config: &RelaxationConfig) {
	let (w, h) = (canvas.width.max(0.0), canvas.height.max(0.0));
	let mx = config.border_margin.max(0.0).min(w / 2.0);
	let my = config.border_margin.max(0.0).min(h / 2.0);
	for node in &mut graph.nodes {
		node.x = node.x.max(mx).min(w - mx);
		node.y = node.y.max(my).min(h - my);
	}
}

/// Recompute cluster bounding ellipses from final member positions.
pub fn fit_cluster_bounds(graph: &mut Graph, config: &RelaxationConfig) {
	for cluster in &mut graph.clusters {
		let mut members = cluster.members.iter().map(|&idx| &graph.nodes[idx]);
		let Some(first) = members.next() else {
			continue;
		};
		let (mut min_x, mut max_x, mut min_y, mut max_y) = (first.x, first.x, first.y, first.y);
		for node in members {
			min_x = min_x.min(node.x);
			max_x = max_x.max(node.x);
			min_y = min_y.min(node.y);
			max_y = max_y.max(node.y);
		}
		cluster.center_x = (min_x + max_x) / 2.0;
		cluster.center_y = (min_y + max_y) / 2.0;
		cluster.radius_x = ((max_x - min_x) / 2.0 + config.bounds_padding).max(config.min_bounds_x);
		cluster.radius_y = ((max_y - min_y) / 2.0 + config.bounds_padding).max(config.min_bounds_y);
	}
}
