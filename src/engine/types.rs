//! Wire shapes of the graph description produced by the tree generator.
//!
//! Two shapes arrive in practice. [`GraphInput`] tells them apart once, at
//! decode time, and the builder normalizes either into one [`Graph`].
//!
//! [`Graph`]: super::graph::Graph

use serde::de::Error as _;
use serde::{Deserialize, Deserializer};
use serde_json::Value;

use super::error::GraphLoadError;

/// A graph description in either supported shape.
#[derive(Clone, Debug)]
pub enum GraphInput {
	/// Declared clusters, nodes pointing at them, explicit edge pairs.
	Clustered(ClusteredGraph),
	/// Nodes carrying a category, a difficulty and their prerequisites.
	Categorized(CategorizedGraph),
}

impl Default for GraphInput {
	fn default() -> Self {
		GraphInput::Clustered(ClusteredGraph::default())
	}
}

impl GraphInput {
	/// Parse and classify a JSON document.
	pub fn from_json(json: &str) -> Result<Self, GraphLoadError> {
		let value: Value = serde_json::from_str(json)?;
		Self::from_value(value)
	}

	/// Detect the shape of an already parsed document.
	///
	/// Anything that is neither an object nor an array decodes to an empty
	/// clustered graph.
	pub fn from_value(value: Value) -> Result<Self, GraphLoadError> {
		match value {
			Value::Array(_) => Ok(GraphInput::Categorized(CategorizedGraph {
				nodes: serde_json::from_value(value)?,
			})),
			Value::Object(ref map) => {
				let clustered = ["clusters", "connections", "edges"]
					.iter()
					.any(|key| map.contains_key(*key));
				let categorized = !clustered
					&& map
						.get("nodes")
						.and_then(Value::as_array)
						.is_some_and(|nodes| nodes.iter().any(looks_categorized));
				if categorized {
					Ok(GraphInput::Categorized(serde_json::from_value(value)?))
				} else {
					Ok(GraphInput::Clustered(serde_json::from_value(value)?))
				}
			}
			_ => {
				log::warn!("graph description is neither an object nor an array; using an empty graph");
				Ok(GraphInput::default())
			}
		}
	}

	/// Short name of the shape, for logs and reports.
	pub fn shape(&self) -> &'static str {
		match self {
			GraphInput::Clustered(_) => "clustered",
			GraphInput::Categorized(_) => "categorized",
		}
	}
}

impl<'de> Deserialize<'de> for GraphInput {
	fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
		let value = Value::deserialize(deserializer)?;
		GraphInput::from_value(value).map_err(D::Error::custom)
	}
}

fn looks_categorized(node: &Value) -> bool {
	["category", "prerequisites", "difficulty"]
		.iter()
		.any(|key| node.get(*key).is_some())
}

#[derive(Clone, Debug, Default, Deserialize)]
pub struct ClusteredGraph {
	#[serde(default)]
	pub topic: Option<String>,
	#[serde(default)]
	pub clusters: Vec<ClusterSpec>,
	#[serde(default)]
	pub nodes: Vec<ClusteredNode>,
	#[serde(default, alias = "edges")]
	pub connections: Vec<EdgeSpec>,
}

#[derive(Clone, Debug, Default, Deserialize)]
pub struct ClusterSpec {
	#[serde(default)]
	pub id: Option<String>,
	#[serde(default)]
	pub label: Option<String>,
	#[serde(default)]
	pub description: Option<String>,
}

#[derive(Clone, Debug, Default, Deserialize)]
pub struct ClusteredNode {
	#[serde(default)]
	pub id: Option<String>,
	#[serde(default)]
	pub label: Option<String>,
	#[serde(default)]
	pub cluster: Option<String>,
	#[serde(default)]
	pub tier: Option<String>,
	/// `large`, `medium` or `small`.
	#[serde(default)]
	pub size: Option<String>,
	#[serde(default)]
	pub description: Option<String>,
	#[serde(default, deserialize_with = "lenient_level")]
	pub bloom_level: Option<u8>,
}

/// An edge as either `["from", "to"]` or `{ "from": .., "to": .. }`.
#[derive(Clone, Debug, Deserialize)]
#[serde(untagged)]
pub enum EdgeSpec {
	/// `["from", "to"]`.
	Pair(String, String),
	/// `{ "from": .., "to": .. }` or `{ "source": .., "target": .. }`.
	Link {
		/// Prerequisite end.
		#[serde(alias = "source")]
		from: String,
		/// Dependent end.
		#[serde(alias = "target")]
		to: String,
	},
	/// Anything else. Dropped by the builder and counted in the load report.
	Malformed(Value),
}

#[derive(Clone, Debug, Default, Deserialize)]
pub struct CategorizedGraph {
	#[serde(default)]
	pub nodes: Vec<CategorizedNode>,
}

#[derive(Clone, Debug, Default, Deserialize)]
pub struct CategorizedNode {
	#[serde(default)]
	pub id: Option<String>,
	/// Concept name; stands in for a missing id or label.
	#[serde(default)]
	pub name: Option<String>,
	#[serde(default)]
	pub label: Option<String>,
	#[serde(default)]
	pub description: Option<String>,
	/// 1 (foundational) to 5 (advanced); fractional values are rounded.
	/// Numeric strings are accepted; anything unparseable counts as absent.
	#[serde(default, deserialize_with = "lenient_number")]
	pub difficulty: Option<f64>,
	#[serde(default)]
	pub category: Option<String>,
	/// Ids (or names) of the concepts to learn first. `null` means none.
	#[serde(default)]
	pub prerequisites: Option<Vec<String>>,
}

impl CategorizedNode {
	pub fn prerequisites(&self) -> &[String] {
		self.prerequisites.as_deref().unwrap_or_default()
	}
}

/// A number, a numeric string, or nothing.
fn lenient_number<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<f64>, D::Error> {
	let value = Value::deserialize(deserializer)?;
	Ok(match value {
		Value::Number(n) => n.as_f64(),
		Value::String(s) => s.trim().parse::<f64>().ok(),
		_ => None,
	}
	.filter(|n| n.is_finite()))
}

fn lenient_level<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<u8>, D::Error> {
	Ok(lenient_number(deserializer)?
		.filter(|n| *n >= 0.0)
		.map(|n| n.round().min(u8::MAX as f64) as u8))
}

#[cfg(test)]
mod tests {
	use super::*;
	use serde_json::json;

	#[test]
	fn detects_clustered_shape() {
		let input = GraphInput::from_value(json!({
			"clusters": [{ "id": "c1", "label": "One" }],
			"nodes": [{ "id": "a", "label": "A", "cluster": "c1" }],
			"connections": [["a", "b"], { "source": "b", "target": "a" }],
		}))
		.unwrap();
		let GraphInput::Clustered(graph) = input else {
			panic!("expected clustered shape");
		};
		assert_eq!(graph.connections.len(), 2);
		assert!(matches!(
			&graph.connections[1],
			EdgeSpec::Link { from, to } if from == "b" && to == "a"
		));
	}

	#[test]
	fn detects_categorized_shape() {
		let input = GraphInput::from_value(json!({
			"nodes": [
				{ "id": "n1", "label": "Basics", "category": "core", "difficulty": 1, "prerequisites": [] },
				{ "id": "n2", "label": "More", "category": "core", "difficulty": 3.4, "prerequisites": ["n1"] },
			],
		}))
		.unwrap();
		assert_eq!(input.shape(), "categorized");

		let array = GraphInput::from_json(r#"[{ "name": "Only", "difficulty": 2 }]"#).unwrap();
		assert_eq!(array.shape(), "categorized");
	}

	#[test]
	fn bare_nodes_default_to_clustered() {
		let input = GraphInput::from_json(r#"{ "nodes": [{ "id": "a", "label": "A" }] }"#).unwrap();
		assert_eq!(input.shape(), "clustered");
	}

	#[test]
	fn imperfect_fields_decode_leniently() {
		let GraphInput::Categorized(graph) = GraphInput::from_value(json!([
			{ "id": "a", "difficulty": "3", "prerequisites": null },
			{ "id": "b", "difficulty": "hard", "prerequisites": ["a"] },
			{ "id": "c", "difficulty": 4.6 },
		]))
		.unwrap() else {
			panic!("expected categorized shape");
		};
		assert_eq!(graph.nodes[0].difficulty, Some(3.0));
		assert!(graph.nodes[0].prerequisites().is_empty());
		assert_eq!(graph.nodes[1].difficulty, None);
		assert_eq!(graph.nodes[1].prerequisites(), ["a".to_string()]);
		assert_eq!(graph.nodes[2].difficulty, Some(4.6));

		let GraphInput::Clustered(graph) = GraphInput::from_value(json!({
			"nodes": [{ "id": "a", "bloom_level": "2" }],
			"connections": [["a", "b"], ["a"], 7, { "from": "a" }],
		}))
		.unwrap() else {
			panic!("expected clustered shape");
		};
		assert_eq!(graph.nodes[0].bloom_level, Some(2));
		assert!(matches!(&graph.connections[0], EdgeSpec::Pair(from, to) if from == "a" && to == "b"));
		assert!(graph.connections[1..].iter().all(|e| matches!(e, EdgeSpec::Malformed(_))));
	}

	#[test]
	fn scalar_document_is_empty() {
		let GraphInput::Clustered(graph) = GraphInput::from_json("42").unwrap() else {
			panic!("expected clustered shape");
		};
		assert!(graph.nodes.is_empty());
		assert!(GraphInput::from_json("{ nodes: ").is_err());
		let mismatch = GraphInput::from_json(r#"{ "nodes": 5 }"#).unwrap_err();
		assert!(mismatch.to_string().starts_with("could not decode graph description"));
	}
}
