//! Display-free layout and interaction engine for skill trees.
//!
//! A [`LayoutEngine`] owns one graph together with its camera, interaction
//! and illumination state. The host feeds it a graph description, forwards
//! pointer events, and calls [`LayoutEngine::tick`] once per frame. Nothing
//! in here touches the DOM.

pub(crate) mod camera;
pub(crate) mod config;
mod error;
pub(crate) mod graph;
mod illumination;
mod interaction;
mod placement;
mod relax;
pub(crate) mod tier;
mod types;

use log::{debug, info, warn};
use serde::Serialize;

pub use camera::{Camera, View, Viewport};
pub use config::EngineConfig;
pub use error::{ConfigError, GraphLoadError};
pub use graph::{Cluster, Edge, Graph, LoadReport, Node, SizeClass};
pub use illumination::{EdgeEmphasis, IlluminationState, NodeEmphasis};
pub use interaction::{InteractionState, PointerOutcome};
pub use tier::{Tier, Validation, ValidationMap};
pub use types::GraphInput;

/// Node as reported to the host.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct NodeView {
	/// Unique node id from the input.
	pub id: String,
	/// Display label; may contain line breaks.
	pub label: String,
	/// Id of the owning cluster.
	pub cluster: String,
	/// Rendered size class.
	pub size: SizeClass,
	/// Degree above the hub threshold.
	pub hub: bool,
	/// Incoming plus outgoing edges.
	pub degree: usize,
	/// Tier declared by the input or derived from difficulty.
	pub tier: Option<Tier>,
	/// Design-space x.
	pub x: f64,
	/// Design-space y.
	pub y: f64,
	/// Current illumination emphasis.
	pub emphasis: NodeEmphasis,
	/// Free-form description from the input.
	pub description: Option<String>,
}

/// What the detail panel shows for a node.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct NodeDetail {
	/// Unique node id.
	pub id: String,
	/// Display label.
	pub label: String,
	/// Label of the owning cluster.
	pub cluster_label: String,
	/// Free-form description from the input.
	pub description: Option<String>,
	/// Tier declared by the input or derived from difficulty.
	pub tier: Option<Tier>,
	/// Assessment result, once the node has been validated.
	pub validation: Option<Validation>,
	/// Bloom's taxonomy level from the input.
	pub bloom_level: Option<u8>,
	/// 1–5 rating, for nodes loaded from categorized input.
	pub difficulty: Option<u8>,
	/// Ids of nodes to learn first.
	pub prerequisites: Vec<String>,
	/// Ids of nodes this one leads to.
	pub unlocks: Vec<String>,
}

/// Key explaining node colors.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct Legend {
	/// Topic of the tree, when known.
	pub title: Option<String>,
	/// Swatches in display order.
	pub entries: Vec<LegendEntry>,
}

/// One swatch of the [`Legend`].
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct LegendEntry {
	/// Cluster label, or tier name with its level range.
	pub label: String,
	/// CSS color of the swatch.
	pub color: &'static str,
	/// Longer text for a hover title, such as a cluster description.
	pub detail: Option<String>,
}

/// Frame counter and elapsed seconds, advanced by [`LayoutEngine::tick`].
#[derive(Clone, Copy, Debug, Default)]
pub struct Clock {
	/// Frames ticked since the last load.
	pub frame: u64,
	/// Seconds elapsed since the last load.
	pub time: f64,
}

/// Laid-out graph plus everything needed to navigate and draw it.
pub struct LayoutEngine {
	config: EngineConfig,
	graph: Graph,
	report: LoadReport,
	viewport: Viewport,
	camera: Camera,
	interaction: InteractionState,
	illumination: IlluminationState,
	validated: Option<ValidationMap>,
	clock: Clock,
}

impl LayoutEngine {
	/// An engine with an empty graph drawing into a `width` × `height`
	/// screen area.
	pub fn new(config: EngineConfig, width: f64, height: f64) -> Self {
		if let Err(err) = config.validate() {
			warn!("{err}");
		}
		Self {
			viewport: Viewport::new(width, height, &config.canvas),
			camera: Camera::new(config.camera.clone()),
			graph: Graph::default(),
			report: LoadReport::default(),
			interaction: InteractionState::default(),
			illumination: IlluminationState::default(),
			validated: None,
			clock: Clock::default(),
			config,
		}
	}

	/// Replace all state with `input` and run the layout pipeline.
	pub fn initialize(&mut self, input: &GraphInput) -> &LoadReport {
		let (mut graph, report) = graph::build(input, &self.config.layout);
		placement::place_clusters(&mut graph, &self.config.canvas, &self.config.layout);
		placement::seed_nodes(&mut graph, &self.config.layout);
		relax::relax(&mut graph, &self.config.canvas, &self.config.relaxation);
		relax::fit_cluster_bounds(&mut graph, &self.config.relaxation);

		info!(
			"loaded {} graph: {} nodes, {} clusters, {} edges",
			report.shape,
			graph.nodes.len(),
			graph.clusters.len(),
			graph.edges.len()
		);
		if !report.dangling_edges.is_empty() {
			warn!(
				"dropped {} edges referencing unknown nodes",
				report.dangling_edges.len()
			);
		}
		if report.malformed_edges > 0 {
			warn!("skipped {} malformed edge entries", report.malformed_edges);
		}
		if !report.duplicate_nodes.is_empty() {
			warn!("ignored duplicate node ids: {:?}", report.duplicate_nodes);
		}
		if !report.synthesized_clusters.is_empty() {
			warn!(
				"created clusters for undeclared ids: {:?}",
				report.synthesized_clusters
			);
		}

		self.graph = graph;
		self.report = report;
		self.interaction = InteractionState::default();
		self.illumination = IlluminationState::default();
		self.validated = None;
		self.clock = Clock::default();
		self.camera = Camera::new(self.config.camera.clone());
		if self.config.camera.entrance_animation && !self.graph.is_empty() {
			self.camera.start_entrance(&self.viewport);
		}
		&self.report
	}

	/// Decode `json` and [`initialize`](Self::initialize) from it.
	pub fn initialize_json(&mut self, json: &str) -> Result<&LoadReport, GraphLoadError> {
		let input = GraphInput::from_json(json)?;
		Ok(self.initialize(&input))
	}

	/// Refit the design canvas to a new screen size. Layout is untouched.
	pub fn resize(&mut self, width: f64, height: f64) {
		self.viewport = Viewport::new(width, height, &self.config.canvas);
	}

	/// Advance animations by one frame of `dt` seconds.
	pub fn tick(&mut self, dt: f64) {
		self.clock.frame += 1;
		self.clock.time += dt.max(0.0);
		self.camera.step(dt);
		self.interaction.expire_hover(self.clock.time);
	}

	/// Select `id` and start zooming in on it. Unknown ids are ignored.
	pub fn focus_on_node(&mut self, id: &str) -> bool {
		let Some(idx) = self.graph.node_index(id) else {
			return false;
		};
		self.focus_index(idx);
		true
	}

	fn focus_index(&mut self, idx: usize) {
		let node = &self.graph.nodes[idx];
		let target = self.camera.focus_target(&self.viewport, node.x, node.y);
		debug!("focusing {}", node.id);
		self.interaction.selected = Some(idx);
		self.camera.animate_to(target);
	}

	/// Deselect and ease back to the home view.
	pub fn clear_focus(&mut self) {
		self.interaction.selected = None;
		let home = self.camera.home(&self.viewport);
		self.camera.animate_to(home);
	}

	/// Every node with its resolved position and emphasis.
	pub fn query_nodes(&self) -> Vec<NodeView> {
		self.graph
			.nodes
			.iter()
			.enumerate()
			.map(|(idx, node)| NodeView {
				id: node.id.clone(),
				label: node.label.clone(),
				cluster: self.graph.clusters[node.cluster].id.clone(),
				size: node.size,
				hub: node.hub,
				degree: node.degree,
				tier: node.tier,
				x: node.x,
				y: node.y,
				emphasis: self.node_emphasis(idx),
				description: node.description.clone(),
			})
			.collect()
	}

	/// Everything the detail panel needs about `id`.
	pub fn node_detail(&self, id: &str) -> Option<NodeDetail> {
		let idx = self.graph.node_index(id)?;
		let node = &self.graph.nodes[idx];
		Some(NodeDetail {
			id: node.id.clone(),
			label: node.label.clone(),
			cluster_label: self.graph.clusters[node.cluster].label.clone(),
			description: node.description.clone(),
			tier: node.tier,
			validation: self.validated.as_ref().and_then(|m| m.get(id)).cloned(),
			bloom_level: node.bloom_level,
			difficulty: node.difficulty,
			prerequisites: node_ids(&self.graph, self.graph.prerequisites_of(idx)),
			unlocks: node_ids(&self.graph, self.graph.unlocks_of(idx)),
		})
	}

	/// Apply assessment results; only affects colors.
	pub fn validate(&mut self, validated: ValidationMap) {
		debug!("validated {} nodes", validated.len());
		self.validated = Some(validated);
	}

	/// Drop assessment results; colors return to neutral.
	pub fn reset_validation(&mut self) {
		self.validated = None;
	}

	/// Fill color of node `idx` under the current validation.
	pub fn node_color(&self, idx: usize) -> &'static str {
		tier::node_color(self.validated.as_ref(), &self.graph.nodes[idx].id)
	}

	/// Tint of cluster `ci`: its dominant validated tier.
	pub fn cluster_color(&self, ci: usize) -> &'static str {
		let members = self.graph.clusters[ci]
			.members
			.iter()
			.map(|&idx| self.graph.nodes[idx].id.as_str());
		tier::cluster_color(self.validated.as_ref(), members)
	}

	/// Clusters before any assessment, then the assessed tiers in ascending
	/// order with their level ranges.
	pub fn legend(&self) -> Legend {
		let entries = match &self.validated {
			Some(map) => Tier::ALL
				.into_iter()
				.filter(|tier| map.values().any(|v| v.tier == *tier))
				.map(|tier| LegendEntry {
					label: tier.range_label(),
					color: tier.color(),
					detail: None,
				})
				.collect(),
			None => self
				.graph
				.clusters
				.iter()
				.map(|cluster| LegendEntry {
					label: cluster.label.clone(),
					color: tier::NEUTRAL_COLOR,
					detail: cluster.description.clone(),
				})
				.collect(),
		};
		Legend {
			title: self.graph.topic.clone(),
			entries,
		}
	}

	/// Rendered radius of a node in design units.
	pub fn node_radius(&self, idx: usize) -> f64 {
		let interaction = &self.config.interaction;
		let base = match self.graph.nodes[idx].size {
			SizeClass::Large => interaction.radius_large,
			SizeClass::Medium => interaction.radius_medium,
			SizeClass::Small => interaction.radius_small,
		};
		base * interaction.radius_scale
	}

	/// Rendered radius of a node in screen pixels.
	pub fn node_screen_radius(&self, idx: usize) -> f64 {
		self.node_radius(idx) * self.viewport.scale * self.camera.zoom()
	}

	/// Design point to screen point under the current camera.
	pub fn to_screen(&self, x: f64, y: f64) -> (f64, f64) {
		self.camera.to_screen(&self.viewport, x, y)
	}

	/// Screen position of node `idx`.
	pub fn node_screen_position(&self, idx: usize) -> (f64, f64) {
		let node = &self.graph.nodes[idx];
		self.to_screen(node.x, node.y)
	}

	/// The laid-out graph.
	pub fn graph(&self) -> &Graph {
		&self.graph
	}

	/// What the last load normalized away.
	pub fn report(&self) -> &LoadReport {
		&self.report
	}

	/// Current pan, zoom and transition.
	pub fn camera(&self) -> &Camera {
		&self.camera
	}

	/// Fit of the design canvas into the screen.
	pub fn viewport(&self) -> &Viewport {
		&self.viewport
	}

	/// Hover, selection and gesture state.
	pub fn interaction(&self) -> &InteractionState {
		&self.interaction
	}

	/// Current highlight set.
	pub fn illumination(&self) -> &IlluminationState {
		&self.illumination
	}

	/// Assessment results, if any were applied.
	pub fn validated(&self) -> Option<&ValidationMap> {
		self.validated.as_ref()
	}

	/// Frame counter and elapsed time.
	pub fn clock(&self) -> Clock {
		self.clock
	}

	/// Configuration the engine was created with.
	pub fn config(&self) -> &EngineConfig {
		&self.config
	}
}

fn node_ids(graph: &Graph, indices: impl Iterator<Item = usize>) -> Vec<String> {
	indices.map(|idx| graph.nodes[idx].id.clone()).collect()
}

#[cfg(test)]
mod tests {
	use serde_json::json;

	use super::*;

	fn engine() -> LayoutEngine {
		let mut engine = LayoutEngine::new(EngineConfig::default(), 1260.0, 840.0);
		engine
			.initialize_json(
				&json!({
					"clusters": [{ "id": "c", "label": "Core" }],
					"nodes": [
						{ "id": "a", "label": "A", "cluster": "c", "description": "first" },
						{ "id": "b", "label": "B", "cluster": "c", "tier": "adept" },
						{ "id": "c1", "label": "C", "cluster": "c" },
					],
					"connections": [["a", "b"], ["b", "c1"]],
				})
				.to_string(),
			)
			.unwrap();
		engine
	}

	#[test]
	fn initialize_starts_entrance_then_settles() {
		let mut engine = engine();
		assert_eq!(engine.camera().zoom(), 0.5);
		for _ in 0..60 {
			engine.tick(1.0 / 60.0);
		}
		assert_eq!(engine.camera().view(), View::HOME);
		assert_eq!(engine.clock().frame, 60);
	}

	#[test]
	fn empty_graph_is_a_noop_state() {
		let mut engine = LayoutEngine::new(EngineConfig::default(), 800.0, 600.0);
		let report = engine.initialize(&GraphInput::default());
		assert!(report.is_clean());
		assert!(engine.query_nodes().is_empty());
		assert!(!engine.camera().is_animating());
		engine.tick(0.016);
		engine.illuminate(["x"]);
		assert!(!engine.focus_on_node("x"));
	}

	#[test]
	fn focus_targets_the_node() {
		let mut engine = engine();
		assert!(engine.focus_on_node("b"));
		let target = engine.camera().target().unwrap();
		assert_eq!(target.zoom, 2.2);
		for _ in 0..400 {
			engine.tick(0.016);
		}
		let idx = engine.graph().node_index("b").unwrap();
		let (sx, sy) = engine.node_screen_position(idx);
		assert!((sx - 630.0).abs() < 1.0 && (sy - 420.0).abs() < 1.0);
		assert_eq!(engine.interaction().selected, Some(idx));

		engine.clear_focus();
		assert_eq!(engine.interaction().selected, None);
		assert_eq!(engine.camera().target(), Some(View::HOME));
	}

	#[test]
	fn detail_lists_neighbors() {
		let engine = engine();
		let detail = engine.node_detail("b").unwrap();
		assert_eq!(detail.prerequisites, vec!["a".to_string()]);
		assert_eq!(detail.unlocks, vec!["c1".to_string()]);
		assert_eq!(detail.cluster_label, "Core");
		assert_eq!(detail.tier, Some(Tier::Adept));
		assert!(engine.node_detail("nope").is_none());
	}

	#[test]
	fn legend_switches_from_clusters_to_tiers() {
		let mut engine = LayoutEngine::new(EngineConfig::default(), 1260.0, 840.0);
		engine
			.initialize_json(
				&json!({
					"topic": "Rust",
					"clusters": [
						{ "id": "mem", "label": "Memory", "description": "Ownership and borrowing" },
						{ "id": "io", "label": "I/O" },
					],
					"nodes": [
						{ "id": "a", "label": "A", "cluster": "mem" },
						{ "id": "b", "label": "B", "cluster": "io" },
						{ "id": "c", "label": "C", "cluster": "io" },
					],
				})
				.to_string(),
			)
			.unwrap();
		let legend = engine.legend();
		assert_eq!(legend.title.as_deref(), Some("Rust"));
		let labels: Vec<_> = legend.entries.iter().map(|e| e.label.as_str()).collect();
		assert_eq!(labels, ["Memory", "I/O"]);
		assert_eq!(legend.entries[0].detail.as_deref(), Some("Ownership and borrowing"));
		assert!(legend.entries.iter().all(|e| e.color == tier::NEUTRAL_COLOR));

		engine.validate(
			serde_json::from_value(json!({
				"a": { "tier": "master" },
				"b": { "tier": "adept" },
				"c": { "tier": "master", "level": 90 },
			}))
			.unwrap(),
		);
		let entries = engine.legend().entries;
		let labels: Vec<_> = entries.iter().map(|e| e.label.as_str()).collect();
		assert_eq!(labels, ["Adept (51-70)", "Master (86-92)"]);
		assert_eq!(entries[1].color, Tier::Master.color());

		engine.reset_validation();
		assert_eq!(engine.legend().entries.len(), 2);
	}

	#[test]
	fn validation_drives_colors() {
		let mut engine = engine();
		let a = engine.graph().node_index("a").unwrap();
		assert_eq!(engine.node_color(a), tier::NEUTRAL_COLOR);
		engine.validate(
			serde_json::from_value(json!({ "a": { "tier": "master", "level": 88 } })).unwrap(),
		);
		assert_eq!(engine.node_color(a), Tier::Master.color());
		assert_eq!(engine.cluster_color(0), Tier::Master.color());
		assert_eq!(engine.node_detail("a").unwrap().validation.unwrap().level(), 88);
		engine.reset_validation();
		assert_eq!(engine.node_color(a), tier::NEUTRAL_COLOR);
	}

	#[test]
	fn resize_keeps_layout() {
		let mut engine = engine();
		let before = engine.query_nodes();
		engine.resize(640.0, 480.0);
		assert_eq!(engine.query_nodes(), before);
		assert!(engine.viewport().scale < 1.0);
	}
}
