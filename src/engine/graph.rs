//! Canonical graph model and the builder that normalizes both input shapes
//! into it.

use std::collections::{HashMap, HashSet};

use serde::Serialize;

use super::config::PlacementConfig;
use super::tier::Tier;
use super::types::{CategorizedGraph, ClusteredGraph, EdgeSpec, GraphInput};

/// Cluster that collects nodes when the input declares none.
pub const FALLBACK_CLUSTER_ID: &str = "general";
const FALLBACK_CLUSTER_LABEL: &str = "General";

/// Rendered size of a node.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SizeClass {
	/// Hubs and the hardest concepts.
	Large,
	/// Mid-weight concepts.
	Medium,
	/// Leaves and foundations.
	Small,
}

impl SizeClass {
	/// `large`, `medium` or `small`, case-insensitive.
	pub fn from_hint(hint: &str) -> Option<Self> {
		match hint.trim().to_ascii_lowercase().as_str() {
			"large" => Some(SizeClass::Large),
			"medium" => Some(SizeClass::Medium),
			"small" => Some(SizeClass::Small),
			_ => None,
		}
	}

	/// Size for a 1–5 difficulty rating.
	pub fn from_difficulty(difficulty: u8) -> Self {
		match difficulty {
			5.. => SizeClass::Large,
			3.. => SizeClass::Medium,
			_ => SizeClass::Small,
		}
	}
}

/// A laid-out node.
#[derive(Clone, Debug)]
pub struct Node {
	/// Unique id.
	pub id: String,
	/// Display label; may contain line breaks.
	pub label: String,
	/// Index into [`Graph::clusters`].
	pub cluster: usize,
	/// Rendered size; hubs are always large.
	pub size: SizeClass,
	/// Degree above the hub threshold.
	pub hub: bool,
	/// Declared or difficulty-derived tier.
	pub tier: Option<Tier>,
	/// Rounded 1–5 rating from categorized input.
	pub difficulty: Option<u8>,
	/// Incoming plus outgoing edges.
	pub degree: usize,
	/// Design-space x.
	pub x: f64,
	/// Design-space y.
	pub y: f64,
	/// Horizontal relaxation velocity.
	pub vx: f64,
	/// Vertical relaxation velocity.
	pub vy: f64,
	/// Free-form description.
	pub description: Option<String>,
	/// Bloom's taxonomy level.
	pub bloom_level: Option<u8>,
}

/// A group of related nodes drawn inside one ellipse.
#[derive(Clone, Debug)]
pub struct Cluster {
	/// Declared, category-derived or synthesized id.
	pub id: String,
	/// Display label.
	pub label: String,
	/// Shown in the legend on hover.
	pub description: Option<String>,
	/// Indices of member nodes, in input order.
	pub members: Vec<usize>,
	/// Anchor x; members are seeded around and pulled toward the anchor.
	pub anchor_x: f64,
	/// Anchor y.
	pub anchor_y: f64,
	/// Ellipse center x.
	pub center_x: f64,
	/// Ellipse center y.
	pub center_y: f64,
	/// Horizontal semi-axis.
	pub radius_x: f64,
	/// Vertical semi-axis.
	pub radius_y: f64,
}

impl Cluster {
	/// Larger semi-axis.
	pub fn radius(&self) -> f64 {
		self.radius_x.max(self.radius_y)
	}
}

/// Directed prerequisite relation: `source` is learned before `target`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Edge {
	/// Index of the prerequisite node.
	pub source: usize,
	/// Index of the dependent node.
	pub target: usize,
}

/// Nodes, clusters and edges after normalization.
#[derive(Clone, Debug, Default)]
pub struct Graph {
	/// Subject of the whole tree, when the input names one.
	pub topic: Option<String>,
	/// Nodes in input order.
	pub nodes: Vec<Node>,
	/// Clusters that ended up with members, in declaration order.
	pub clusters: Vec<Cluster>,
	/// Deduplicated edges between existing nodes.
	pub edges: Vec<Edge>,
	adjacency: Vec<Vec<usize>>,
	index: HashMap<String, usize>,
}

impl Graph {
	/// No nodes.
	pub fn is_empty(&self) -> bool {
		self.nodes.is_empty()
	}

	/// Index of the node with `id`.
	pub fn node_index(&self, id: &str) -> Option<usize> {
		self.index.get(id).copied()
	}

	/// The node with `id`.
	pub fn node(&self, id: &str) -> Option<&Node> {
		self.node_index(id).map(|idx| &self.nodes[idx])
	}

	/// Nodes sharing an edge with `idx`, in either direction.
	pub fn neighbors(&self, idx: usize) -> &[usize] {
		self.adjacency.get(idx).map(Vec::as_slice).unwrap_or(&[])
	}

	/// Sources of edges into `idx`.
	pub fn prerequisites_of(&self, idx: usize) -> impl Iterator<Item = usize> + '_ {
		self.edges
			.iter()
			.filter(move |e| e.target == idx)
			.map(|e| e.source)
	}

	/// Targets of edges out of `idx`.
	pub fn unlocks_of(&self, idx: usize) -> impl Iterator<Item = usize> + '_ {
		self.edges
			.iter()
			.filter(move |e| e.source == idx)
			.map(|e| e.target)
	}
}

/// Everything the builder normalized away while loading.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct LoadReport {
	/// `clustered` or `categorized`.
	pub shape: &'static str,
	/// Edges with an endpoint that names no node, as `(from, to)`.
	pub dangling_edges: Vec<(String, String)>,
	/// Ids of nodes listed as their own prerequisite.
	pub self_loops: Vec<String>,
	/// Repeated edges dropped after the first.
	pub duplicate_edges: usize,
	/// Edge entries that were neither a pair nor a from/to object.
	pub malformed_edges: usize,
	/// Ids declared more than once; the first declaration wins.
	pub duplicate_nodes: Vec<String>,
	/// Nodes dropped for lacking any identifier.
	pub anonymous_nodes: usize,
	/// Cluster ids created because nodes referenced them without a declaration.
	pub synthesized_clusters: Vec<String>,
	/// Declared clusters that ended up with no members.
	pub empty_clusters: Vec<String>,
}

impl LoadReport {
	/// Nothing had to be repaired. Empty declared clusters do not count.
	pub fn is_clean(&self) -> bool {
		self.dangling_edges.is_empty()
			&& self.self_loops.is_empty()
			&& self.duplicate_edges == 0
			&& self.malformed_edges == 0
			&& self.duplicate_nodes.is_empty()
			&& self.anonymous_nodes == 0
			&& self.synthesized_clusters.is_empty()
	}
}

/// Shape-independent node record produced by the first builder pass.
struct PendingNode {
	id: String,
	label: String,
	cluster_key: Option<String>,
	tier: Option<Tier>,
	difficulty: Option<u8>,
	size_hint: Option<SizeClass>,
	description: Option<String>,
	bloom_level: Option<u8>,
}

struct Pending {
	topic: Option<String>,
	clusters: Vec<(String, String, Option<String>)>,
	nodes: Vec<PendingNode>,
	edges: Vec<(String, String)>,
}

/// Normalize `input` into a [`Graph`] with degrees, hub flags and size
/// classes resolved. Positions are left at the origin.
pub(crate) fn build(input: &GraphInput, config: &PlacementConfig) -> (Graph, LoadReport) {
	let mut report = LoadReport {
		shape: input.shape(),
		..LoadReport::default()
	};
	let pending = match input {
		GraphInput::Clustered(graph) => from_clustered(graph, &mut report),
		GraphInput::Categorized(graph) => from_categorized(graph, &mut report),
	};
	let graph = assemble(pending, config, &mut report);
	(graph, report)
}

fn from_clustered(input: &ClusteredGraph, report: &mut LoadReport) -> Pending {
	let clusters = input
		.clusters
		.iter()
		.filter_map(|c| {
			let id = c.id.clone()?;
			let label = c.label.clone().unwrap_or_else(|| id.clone());
			Some((id, label, c.description.clone()))
		})
		.collect();

	let nodes = input
		.nodes
		.iter()
		.filter_map(|n| {
			let Some(id) = n.id.clone() else {
				report.anonymous_nodes += 1;
				return None;
			};
			Some(PendingNode {
				label: n.label.clone().unwrap_or_else(|| id.clone()),
				id,
				cluster_key: n.cluster.clone(),
				tier: n.tier.as_deref().and_then(Tier::from_name),
				difficulty: None,
				size_hint: n.size.as_deref().and_then(SizeClass::from_hint),
				description: n.description.clone(),
				bloom_level: n.bloom_level,
			})
		})
		.collect();

	let mut edges = Vec::with_capacity(input.connections.len());
	for edge in &input.connections {
		match edge {
			EdgeSpec::Malformed(raw) => {
				log::debug!("skipping malformed edge {raw}");
				report.malformed_edges += 1;
			}
			EdgeSpec::Pair(from, to) | EdgeSpec::Link { from, to } => {
				edges.push((from.clone(), to.clone()));
			}
		}
	}

	Pending {
		topic: input.topic.clone(),
		clusters,
		nodes,
		edges,
	}
}

fn from_categorized(input: &CategorizedGraph, report: &mut LoadReport) -> Pending {
	let mut clusters: Vec<(String, String, Option<String>)> = Vec::new();
	let mut nodes = Vec::with_capacity(input.nodes.len());

	for n in &input.nodes {
		let Some(id) = n.id.clone().or_else(|| n.name.clone()) else {
			report.anonymous_nodes += 1;
			continue;
		};
		let category = n
			.category
			.clone()
			.filter(|c| !c.trim().is_empty())
			.unwrap_or_else(|| FALLBACK_CLUSTER_LABEL.to_string());
		if !clusters.iter().any(|(cid, _, _)| *cid == category) {
			clusters.push((category.clone(), category.clone(), None));
		}
		let difficulty = n.difficulty.unwrap_or(1.0).round().clamp(1.0, 5.0) as u8;
		nodes.push(PendingNode {
			label: n.label.clone().or_else(|| n.name.clone()).unwrap_or_else(|| id.clone()),
			id,
			cluster_key: Some(category),
			tier: Some(Tier::from_difficulty(difficulty)),
			difficulty: Some(difficulty),
			size_hint: Some(SizeClass::from_difficulty(difficulty)),
			description: n.description.clone(),
			bloom_level: None,
		});
	}

	// Prerequisites may name a concept instead of its id.
	let ids: HashSet<&str> = nodes.iter().map(|n| n.id.as_str()).collect();
	let mut by_name: HashMap<&str, &str> = HashMap::new();
	for (raw, node) in input
		.nodes
		.iter()
		.filter(|n| n.id.is_some() || n.name.is_some())
		.zip(&nodes)
	{
		if let Some(name) = raw.name.as_deref() {
			by_name.entry(name).or_insert(node.id.as_str());
		}
	}

	let mut edges = Vec::new();
	for (raw, node) in input
		.nodes
		.iter()
		.filter(|n| n.id.is_some() || n.name.is_some())
		.zip(&nodes)
	{
		for prereq in raw.prerequisites() {
			let resolved = if ids.contains(prereq.as_str()) {
				prereq.as_str()
			} else {
				by_name.get(prereq.as_str()).copied().unwrap_or(prereq.as_str())
			};
			edges.push((resolved.to_string(), node.id.clone()));
		}
	}

	Pending {
		topic: None,
		clusters,
		nodes,
		edges,
	}
}

fn assemble(pending: Pending, config: &PlacementConfig, report: &mut LoadReport) -> Graph {
	let mut graph = Graph {
		topic: pending.topic,
		..Graph::default()
	};
	if pending.nodes.is_empty() {
		return graph;
	}

	let mut cluster_index: HashMap<String, usize> = HashMap::new();
	for (id, label, description) in pending.clusters {
		if cluster_index.contains_key(&id) {
			continue;
		}
		cluster_index.insert(id.clone(), graph.clusters.len());
		graph.clusters.push(new_cluster(id, label, description));
	}
	let declared = graph.clusters.len();

	for pn in pending.nodes {
		if graph.index.contains_key(&pn.id) {
			report.duplicate_nodes.push(pn.id);
			continue;
		}
		let key = match pn.cluster_key {
			Some(key) if !key.trim().is_empty() => key,
			_ => FALLBACK_CLUSTER_ID.to_string(),
		};
		let cluster = match cluster_index.get(&key) {
			Some(&ci) => ci,
			None => {
				let label = if key == FALLBACK_CLUSTER_ID {
					FALLBACK_CLUSTER_LABEL.to_string()
				} else {
					key.clone()
				};
				if declared > 0 {
					report.synthesized_clusters.push(key.clone());
				}
				let ci = graph.clusters.len();
				cluster_index.insert(key.clone(), ci);
				graph.clusters.push(new_cluster(key, label, None));
				ci
			}
		};

		let idx = graph.nodes.len();
		graph.index.insert(pn.id.clone(), idx);
		graph.clusters[cluster].members.push(idx);
		graph.nodes.push(Node {
			id: pn.id,
			label: pn.label,
			cluster,
			size: pn.size_hint.unwrap_or(SizeClass::Small),
			hub: false,
			tier: pn.tier,
			difficulty: pn.difficulty,
			degree: 0,
			x: 0.0,
			y: 0.0,
			vx: 0.0,
			vy: 0.0,
			description: pn.description,
			bloom_level: pn.bloom_level,
		});
	}

	let mut seen: HashSet<Edge> = HashSet::new();
	for (from, to) in pending.edges {
		let (Some(source), Some(target)) = (graph.node_index(&from), graph.node_index(&to)) else {
			report.dangling_edges.push((from, to));
			continue;
		};
		if source == target {
			report.self_loops.push(from);
			continue;
		}
		let edge = Edge { source, target };
		if !seen.insert(edge) {
			report.duplicate_edges += 1;
			continue;
		}
		graph.edges.push(edge);
	}

	graph.adjacency = vec![Vec::new(); graph.nodes.len()];
	for edge in &graph.edges {
		graph.nodes[edge.source].degree += 1;
		graph.nodes[edge.target].degree += 1;
		for (a, b) in [(edge.source, edge.target), (edge.target, edge.source)] {
			if !graph.adjacency[a].contains(&b) {
				graph.adjacency[a].push(b);
			}
		}
	}

	for node in &mut graph.nodes {
		node.hub = node.degree > config.hub_degree_threshold;
		if node.hub {
			node.size = SizeClass::Large;
		}
	}

	// Declared clusters nobody joined are never instantiated.
	let mut remap = vec![usize::MAX; graph.clusters.len()];
	let mut kept = Vec::with_capacity(graph.clusters.len());
	for (ci, cluster) in std::mem::take(&mut graph.clusters).into_iter().enumerate() {
		if cluster.members.is_empty() {
			report.empty_clusters.push(cluster.id);
			continue;
		}
		remap[ci] = kept.len();
		kept.push(cluster);
	}
	graph.clusters = kept;
	for node in &mut graph.nodes {
		node.cluster = remap[node.cluster];
	}

	graph
}

fn new_cluster(id: String, label: String, description: Option<String>) -> Cluster {
	Cluster {
		id,
		label,
		description,
		members: Vec::new(),
		anchor_x: 0.0,
		anchor_y: 0.0,
		center_x: 0.0,
		center_y: 0.0,
		radius_x: 0.0,
		radius_y: 0.0,
	}
}

#[cfg(test)]
mod tests {
	use serde_json::json;

	use super::*;

	fn load(value: serde_json::Value) -> (Graph, LoadReport) {
		let input = GraphInput::from_value(value).unwrap();
		build(&input, &PlacementConfig::default())
	}

	#[test]
	fn empty_input_is_empty_graph() {
		let (graph, report) = load(json!({ "clusters": [{ "id": "c" }], "nodes": [] }));
		assert!(graph.is_empty());
		assert!(graph.clusters.is_empty());
		assert!(report.is_clean());
	}

	#[test]
	fn missing_clusters_get_one_fallback() {
		let (graph, report) = load(json!({
			"nodes": [
				{ "id": "a", "label": "A" },
				{ "id": "b", "label": "B" },
				{ "id": "c", "label": "C" },
			],
		}));
		assert_eq!(graph.clusters.len(), 1);
		assert_eq!(graph.clusters[0].id, FALLBACK_CLUSTER_ID);
		assert_eq!(graph.clusters[0].members, vec![0, 1, 2]);
		assert!(report.synthesized_clusters.is_empty());
	}

	#[test]
	fn dangling_edges_are_dropped_and_not_counted() {
		let (graph, report) = load(json!({
			"clusters": [{ "id": "c" }],
			"nodes": [
				{ "id": "x", "label": "X", "cluster": "c" },
				{ "id": "y", "label": "Y", "cluster": "c" },
			],
			"connections": [["x", "missing"], ["x", "y"], ["x", "y"], ["y", "y"]],
		}));
		assert_eq!(graph.edges.len(), 1);
		assert_eq!(graph.node("x").unwrap().degree, 1);
		assert_eq!(
			report.dangling_edges,
			vec![("x".to_string(), "missing".to_string())]
		);
		assert_eq!(report.duplicate_edges, 1);
		assert_eq!(report.self_loops, vec!["y".to_string()]);
	}

	#[test]
	fn unknown_cluster_reference_synthesizes_cluster() {
		let (graph, report) = load(json!({
			"clusters": [{ "id": "c", "label": "Declared" }, { "id": "unused" }],
			"nodes": [
				{ "id": "a", "label": "A", "cluster": "c" },
				{ "id": "b", "label": "B", "cluster": "elsewhere" },
				{ "id": "a", "label": "A again", "cluster": "c" },
			],
		}));
		assert_eq!(graph.clusters.len(), 2);
		assert_eq!(graph.clusters[1].label, "elsewhere");
		assert_eq!(graph.nodes[1].cluster, 1);
		assert_eq!(report.synthesized_clusters, vec!["elsewhere".to_string()]);
		assert_eq!(report.duplicate_nodes, vec!["a".to_string()]);
		assert_eq!(report.empty_clusters, vec!["unused".to_string()]);
	}

	#[test]
	fn categorized_input_derives_clusters_edges_and_sizes() {
		let (graph, report) = load(json!({
			"nodes": [
				{ "id": "n1", "name": "Variables", "category": "Basics", "difficulty": 1 },
				{ "id": "n2", "name": "Loops", "category": "Basics", "difficulty": 3, "prerequisites": ["n1"] },
				{ "id": "n3", "name": "Closures", "category": "Advanced", "difficulty": 5, "prerequisites": ["Loops", "ghost"] },
			],
		}));
		assert_eq!(graph.clusters.len(), 2);
		assert_eq!(graph.clusters[0].label, "Basics");
		assert_eq!(graph.edges, vec![Edge { source: 0, target: 1 }, Edge { source: 1, target: 2 }]);
		assert_eq!(graph.node("n1").unwrap().size, SizeClass::Small);
		assert_eq!(graph.node("n2").unwrap().size, SizeClass::Medium);
		assert_eq!(graph.node("n3").unwrap().size, SizeClass::Large);
		assert_eq!(graph.node("n3").unwrap().tier, Some(Tier::Expert));
		assert_eq!(graph.node("n2").unwrap().label, "Loops");
		assert_eq!(report.dangling_edges, vec![("ghost".to_string(), "n3".to_string())]);
	}

	#[test]
	fn malformed_entries_are_dropped_not_fatal() {
		let (graph, report) = load(json!({
			"topic": "Rust",
			"nodes": [{ "id": "a", "label": "A" }, { "id": "b", "label": "B" }],
			"connections": [["a", "b"], ["a"], null, { "to": "b" }],
		}));
		assert_eq!(graph.topic.as_deref(), Some("Rust"));
		assert_eq!(graph.edges.len(), 1);
		assert_eq!(report.malformed_edges, 3);
		assert!(!report.is_clean());

		let (graph, report) = load(json!([
			{ "id": "x", "difficulty": "4", "prerequisites": null },
			{ "id": "y", "difficulty": "??", "prerequisites": ["x"] },
		]));
		assert_eq!(graph.node("x").unwrap().difficulty, Some(4));
		assert_eq!(graph.node("x").unwrap().tier, Some(Tier::Adept));
		assert_eq!(graph.node("y").unwrap().difficulty, Some(1));
		assert_eq!(graph.edges, vec![Edge { source: 0, target: 1 }]);
		assert!(report.is_clean());
	}

	#[test]
	fn hubs_are_large_and_have_symmetric_adjacency() {
		let (graph, _) = load(json!({
			"nodes": [
				{ "id": "a", "label": "A", "size": "small" },
				{ "id": "b", "label": "B" },
				{ "id": "c", "label": "C" },
				{ "id": "d", "label": "D" },
				{ "id": "e", "label": "E" },
			],
			"edges": [["a", "b"], ["a", "c"], ["d", "a"], ["e", "a"]],
		}));
		let a = graph.node("a").unwrap();
		assert_eq!(a.degree, 4);
		assert!(a.hub);
		assert_eq!(a.size, SizeClass::Large);
		assert!(!graph.node("b").unwrap().hub);
		assert_eq!(graph.neighbors(0).len(), 4);
		assert_eq!(graph.neighbors(3), &[0]);
		assert_eq!(graph.prerequisites_of(0).collect::<Vec<_>>(), vec![3, 4]);
		assert_eq!(graph.unlocks_of(0).collect::<Vec<_>>(), vec![1, 2]);
	}
}
