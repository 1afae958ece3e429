//! Highlighting an externally chosen subset of nodes.
//!
//! Only the chosen id set is stored. Node, edge and cluster emphasis are
//! derived from it on every query, so clearing the set leaves nothing behind.

use std::collections::HashSet;

use log::debug;
use serde::Serialize;

use super::graph::Edge;
use super::{LayoutEngine, View};

/// How strongly a node is drawn.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeEmphasis {
	/// Illuminated, or no illumination active.
	Full,
	/// Outside the illuminated set.
	Dimmed,
}

/// How strongly an edge is drawn.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum EdgeEmphasis {
	/// Both endpoints illuminated, or no illumination active.
	Full,
	/// Exactly one endpoint illuminated.
	Partial,
	/// Neither endpoint illuminated.
	Dimmed,
}

/// The externally chosen highlight set, if any.
#[derive(Clone, Debug, Default)]
pub struct IlluminationState {
	set: Option<HashSet<String>>,
	/// Frame at which the current set was applied; drives the pulse.
	pub started_frame: u64,
}

impl IlluminationState {
	/// A highlight set is applied.
	pub fn is_active(&self) -> bool {
		self.set.is_some()
	}

	/// Whether `id` is at full emphasis. Everything is when inactive.
	pub fn contains(&self, id: &str) -> bool {
		self.set.as_ref().is_none_or(|set| set.contains(id))
	}
}

impl LayoutEngine {
	/// Emphasize `ids` and dim everything else, then fit the camera to the
	/// emphasized nodes. An empty list clears illumination.
	pub fn illuminate<I, S>(&mut self, ids: I)
	where
		I: IntoIterator<Item = S>,
		S: Into<String>,
	{
		let set: HashSet<String> = ids.into_iter().map(Into::into).collect();
		if set.is_empty() {
			self.illumination = IlluminationState::default();
			return;
		}
		debug!("illuminating {} nodes", set.len());
		self.illumination = IlluminationState {
			set: Some(set),
			started_frame: self.clock.frame,
		};
		if let Some(target) = self.illumination_fit_target() {
			self.camera.animate_to(target);
		}
	}

	/// Back to full emphasis everywhere, easing home.
	pub fn reset_illumination(&mut self) {
		self.illumination = IlluminationState::default();
		let home = self.camera.home(&self.viewport);
		self.camera.animate_to(home);
	}

	/// Currently illuminated ids, sorted; `None` when inactive.
	pub fn query_illuminated_set(&self) -> Option<Vec<String>> {
		self.illumination.set.as_ref().map(|set| {
			let mut ids: Vec<String> = set.iter().cloned().collect();
			ids.sort();
			ids
		})
	}

	/// Camera view fitting every illuminated node that exists in the graph.
	pub fn illumination_fit_target(&self) -> Option<View> {
		let set = self.illumination.set.as_ref()?;
		let mut lit = self.graph.nodes.iter().filter(|n| set.contains(&n.id));
		let first = lit.next()?;
		let (mut min, mut max) = ((first.x, first.y), (first.x, first.y));
		for node in lit {
			min = (min.0.min(node.x), min.1.min(node.y));
			max = (max.0.max(node.x), max.1.max(node.y));
		}
		Some(self.camera.fit_target(&self.viewport, min, max))
	}

	/// Node `idx` is at full emphasis.
	pub fn is_illuminated(&self, idx: usize) -> bool {
		self.illumination.contains(&self.graph.nodes[idx].id)
	}

	/// Emphasis of node `idx`.
	pub fn node_emphasis(&self, idx: usize) -> NodeEmphasis {
		if self.is_illuminated(idx) {
			NodeEmphasis::Full
		} else {
			NodeEmphasis::Dimmed
		}
	}

	/// Emphasis of `edge`, from how many endpoints are lit.
	pub fn edge_emphasis(&self, edge: &Edge) -> EdgeEmphasis {
		match (self.is_illuminated(edge.source), self.is_illuminated(edge.target)) {
			(true, true) => EdgeEmphasis::Full,
			(true, false) | (false, true) => EdgeEmphasis::Partial,
			(false, false) => EdgeEmphasis::Dimmed,
		}
	}

	/// A cluster stays lit while any of its members is.
	pub fn cluster_emphasized(&self, ci: usize) -> bool {
		self.graph.clusters[ci]
			.members
			.iter()
			.any(|&idx| self.is_illuminated(idx))
	}

	/// Node indices in paint order: input order, except that dimmed nodes
	/// go first while illumination is active.
	pub fn draw_order(&self) -> Vec<usize> {
		let mut order: Vec<usize> = (0..self.graph.nodes.len()).collect();
		if self.illumination.is_active() {
			order.sort_by_key(|&idx| self.is_illuminated(idx));
		}
		order
	}

	/// Extra glow radius for an illuminated node this frame.
	pub fn pulse_offset(&self, idx: usize) -> f64 {
		if !self.illumination.is_active() || !self.is_illuminated(idx) {
			return 0.0;
		}
		let phase = self.clock.frame.saturating_sub(self.illumination.started_frame) as f64 * 0.03;
		(phase + self.graph.nodes[idx].x * 0.01).sin() * 4.0
	}
}
