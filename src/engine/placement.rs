//! Cluster anchors and initial node seeds, computed before relaxation.

use std::cmp::Reverse;
use std::f64::consts::{FRAC_PI_2, PI, TAU};

use super::config::{CanvasConfig, PlacementConfig};
use super::graph::Graph;

/// Anchor centers for `count` clusters on the design canvas.
///
/// One to three clusters use fixed arrangements; a radial formula puts them
/// on top of each other or against the border.
pub fn anchor_positions(
	count: usize,
	canvas: &CanvasConfig,
	config: &PlacementConfig,
) -> Vec<(f64, f64)> {
	let (w, h) = (canvas.width, canvas.height);
	match count {
		0 => Vec::new(),
		1 => vec![(w * 0.5, h * 0.5)],
		2 => vec![(w * 0.3, h * 0.5), (w * 0.7, h * 0.5)],
		3 => vec![(w * 0.5, h * 0.3), (w * 0.28, h * 0.7), (w * 0.72, h * 0.7)],
		n => {
			let (rx, ry) = (w * config.anchor_radius_x, h * config.anchor_radius_y);
			(0..n)
				.map(|i| {
					let angle = (i as f64 / n as f64) * TAU - FRAC_PI_2;
					(w * 0.5 + angle.cos() * rx, h * 0.5 + angle.sin() * ry)
				})
				.collect()
		}
	}
}

/// Assign every cluster its anchor and a provisional extent.
pub fn place_clusters(graph: &mut Graph, canvas: &CanvasConfig, config: &PlacementConfig) {
	let anchors = anchor_positions(graph.clusters.len(), canvas, config);
	for (cluster, (x, y)) in graph.clusters.iter_mut().zip(anchors) {
		let members = cluster.members.len() as f64;
		cluster.anchor_x = x;
		cluster.anchor_y = y;
		cluster.center_x = x;
		cluster.center_y = y;
		cluster.radius_x = config.extent_base_x + members * config.extent_per_member_x;
		cluster.radius_y = config.extent_base_y + members * config.extent_per_member_y;
	}
}

/// Seed node positions around their cluster anchors.
///
/// Members are ranked by degree. Hubs sit on the anchor, the rest go on one
/// or two rings whose radius grows with the member count.
pub fn seed_nodes(graph: &mut Graph, config: &PlacementConfig) {
	for ci in 0..graph.clusters.len() {
		let (ax, ay) = (graph.clusters[ci].anchor_x, graph.clusters[ci].anchor_y);
		let mut ranked = graph.clusters[ci].members.clone();
		ranked.sort_by_key(|&idx| Reverse(graph.nodes[idx].degree));

		match ranked.as_slice() {
			[] => continue,
			[only] => set_position(graph, *only, ax, ay),
			[first, second] => {
				set_position(graph, *first, ax, ay);
				let (dx, dy) = config.pair_offset;
				set_position(graph, *second, ax + dx, ay + dy);
			}
			_ => {
				let hub_count = ranked.iter().take_while(|&&idx| graph.nodes[idx].hub).count();
				for (j, &idx) in ranked[..hub_count].iter().enumerate() {
					let step = j.div_ceil(2) as f64 * config.hub_spread;
					let dx = if j % 2 == 1 { step } else { -step };
					set_position(graph, idx, ax + dx, ay);
				}

				let rest = &ranked[hub_count..];
				let radius = config.ring_radius_base
					+ config.ring_radius_per_member * ranked.len() as f64;
				let inner = rest.len().min(config.inner_ring_capacity.max(1));
				let (inner_ring, outer_ring) = rest.split_at(inner);
				let seeds = ring(inner_ring.len(), radius, 0.0, config.ring_jitter)
					.chain(ring(
						outer_ring.len(),
						radius * config.outer_ring_factor,
						PI / outer_ring.len().max(1) as f64,
						config.ring_jitter,
					))
					.collect::<Vec<_>>();
				for (&idx, (dx, dy)) in rest.iter().zip(seeds) {
					set_position(graph, idx, ax + dx, ay + dy);
				}
			}
		}
	}
}

/// Offsets of `count` evenly spaced points, every other one pushed out by
/// `jitter`.
fn ring(count: usize, radius: f64, phase: f64, jitter: f64) -> impl Iterator<Item = (f64, f64)> {
	(0..count).map(move |j| {
		let angle = (j as f64 / count as f64) * TAU - FRAC_PI_2 + phase;
		let r = if j % 2 == 1 { radius + jitter } else { radius };
		(angle.cos() * r, angle.sin() * r)
	})
}

fn set_position(graph: &mut Graph, idx: usize, x: f64, y: f64) {
	let node = &mut graph.nodes[idx];
	node.x = x;
	node.y = y;
	node.vx = 0.0;
	node.vy = 0.0;
}

#[cfg(test)]
mod tests {
	use serde_json::json;

	use super::*;
	use crate::engine::graph::build;
	use crate::engine::types::GraphInput;

	fn seeded(value: serde_json::Value) -> Graph {
		let config = PlacementConfig::default();
		let (mut graph, _) = build(&GraphInput::from_value(value).unwrap(), &config);
		place_clusters(&mut graph, &CanvasConfig::default(), &config);
		seed_nodes(&mut graph, &config);
		graph
	}

	fn distance(graph: &Graph, idx: usize) -> f64 {
		let node = &graph.nodes[idx];
		let cluster = &graph.clusters[node.cluster];
		(node.x - cluster.anchor_x).hypot(node.y - cluster.anchor_y)
	}

	#[test]
	fn small_counts_use_fixed_arrangements() {
		let canvas = CanvasConfig::default();
		let config = PlacementConfig::default();
		assert_eq!(anchor_positions(1, &canvas, &config), vec![(600.0, 400.0)]);
		let two = anchor_positions(2, &canvas, &config);
		assert_eq!(two[0].1, two[1].1);
		assert!(two[0].0 < two[1].0);
		let three = anchor_positions(3, &canvas, &config);
		assert!(three[0].1 < three[1].1);
		assert_eq!(three[1].1, three[2].1);
	}

	#[test]
	fn radial_anchors_stay_on_the_ellipse() {
		let canvas = CanvasConfig::default();
		let config = PlacementConfig::default();
		let anchors = anchor_positions(6, &canvas, &config);
		assert_eq!(anchors.len(), 6);
		// First anchor is straight up from the center.
		assert!((anchors[0].0 - 600.0).abs() < 1e-9);
		assert!((anchors[0].1 - (400.0 - 800.0 * 0.28)).abs() < 1e-9);
		for (x, y) in anchors {
			let u = (x - 600.0) / (1200.0 * 0.32);
			let v = (y - 400.0) / (800.0 * 0.28);
			assert!((u * u + v * v - 1.0).abs() < 1e-9);
		}
	}

	#[test]
	fn star_hub_sits_on_anchor_with_leaves_ringed() {
		let graph = seeded(json!({
			"clusters": [{ "id": "c" }],
			"nodes": [
				{ "id": "b", "label": "B", "cluster": "c" },
				{ "id": "A", "label": "A", "cluster": "c" },
				{ "id": "c1", "label": "C", "cluster": "c" },
				{ "id": "d", "label": "D", "cluster": "c" },
				{ "id": "e", "label": "E", "cluster": "c" },
			],
			"connections": [["A", "b"], ["A", "c1"], ["A", "d"], ["A", "e"]],
		}));
		let hub = graph.node_index("A").unwrap();
		assert!(graph.nodes[hub].hub);
		assert_eq!(distance(&graph, hub), 0.0);

		let config = PlacementConfig::default();
		let radius = config.ring_radius_base + config.ring_radius_per_member * 5.0;
		for id in ["b", "c1", "d", "e"] {
			let d = distance(&graph, graph.node_index(id).unwrap());
			assert!(
				(d - radius).abs() < 1e-9 || (d - radius - config.ring_jitter).abs() < 1e-9,
				"{id} at distance {d}"
			);
		}
	}

	#[test]
	fn single_and_pair_clusters() {
		let graph = seeded(json!({
			"clusters": [{ "id": "solo" }, { "id": "pair" }],
			"nodes": [
				{ "id": "s", "label": "S", "cluster": "solo" },
				{ "id": "p", "label": "P", "cluster": "pair" },
				{ "id": "q", "label": "Q", "cluster": "pair" },
			],
			"connections": [["q", "s"]],
		}));
		assert_eq!(distance(&graph, 0), 0.0);
		// q has the higher degree, so it takes the anchor.
		assert_eq!(distance(&graph, 2), 0.0);
		let pair = &graph.clusters[1];
		assert_eq!(graph.nodes[1].x, pair.anchor_x + 70.0);
		assert_eq!(graph.nodes[1].y, pair.anchor_y);
	}

	#[test]
	fn large_clusters_spill_onto_outer_ring() {
		let nodes: Vec<_> = (0..10)
			.map(|i| json!({ "id": format!("n{i}"), "label": "N", "cluster": "c" }))
			.collect();
		let graph = seeded(json!({ "clusters": [{ "id": "c" }], "nodes": nodes }));
		let config = PlacementConfig::default();
		let radius = config.ring_radius_base + config.ring_radius_per_member * 10.0;
		let outer = (0..10)
			.filter(|&i| distance(&graph, i) > radius + config.ring_jitter + 1.0)
			.count();
		assert_eq!(outer, 4);
	}
}
