//! Tier names, display colors and the validation overlay.
//!
//! Tiers only affect how nodes are painted. Layout never reads them.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// Color of a node nobody has validated yet.
pub const NEUTRAL_COLOR: &str = "#7B93A8";
/// Color of connections between unvalidated nodes.
pub const NEUTRAL_CONNECTION: &str = "#5A7088";
/// Color for tiers that are not (yet) reached.
pub const LOCKED_COLOR: &str = "#4A5568";

/// Mastery tier, lowest to highest.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[allow(missing_docs)]
pub enum Tier {
	#[serde(alias = "Novice")]
	Novice,
	#[serde(alias = "Apprentice")]
	Apprentice,
	#[serde(alias = "Journeyman")]
	Journeyman,
	#[serde(alias = "Adept")]
	Adept,
	#[serde(alias = "Expert")]
	Expert,
	#[serde(alias = "Master")]
	Master,
	#[serde(alias = "Grandmaster")]
	Grandmaster,
}

impl Tier {
	/// All tiers in ascending order.
	pub const ALL: [Tier; 7] = [
		Tier::Novice,
		Tier::Apprentice,
		Tier::Journeyman,
		Tier::Adept,
		Tier::Expert,
		Tier::Master,
		Tier::Grandmaster,
	];

	/// Case-insensitive lookup; unknown names yield `None`.
	pub fn from_name(name: &str) -> Option<Self> {
		let name = name.trim().to_ascii_lowercase();
		Self::ALL.into_iter().find(|t| t.name() == name)
	}

	/// Tier for a 1–5 difficulty rating (values are clamped).
	pub fn from_difficulty(difficulty: u8) -> Self {
		match difficulty.clamp(1, 5) {
			1 => Tier::Novice,
			2 => Tier::Apprentice,
			3 => Tier::Journeyman,
			4 => Tier::Adept,
			_ => Tier::Expert,
		}
	}

	/// Lowercase wire name.
	pub fn name(self) -> &'static str {
		match self {
			Tier::Novice => "novice",
			Tier::Apprentice => "apprentice",
			Tier::Journeyman => "journeyman",
			Tier::Adept => "adept",
			Tier::Expert => "expert",
			Tier::Master => "master",
			Tier::Grandmaster => "grandmaster",
		}
	}

	/// Capitalized name for display.
	pub fn title(self) -> &'static str {
		match self {
			Tier::Novice => "Novice",
			Tier::Apprentice => "Apprentice",
			Tier::Journeyman => "Journeyman",
			Tier::Adept => "Adept",
			Tier::Expert => "Expert",
			Tier::Master => "Master",
			Tier::Grandmaster => "Grandmaster",
		}
	}

	/// Display color.
	pub fn color(self) -> &'static str {
		match self {
			Tier::Novice => "#8D6E63",
			Tier::Apprentice => "#78909C",
			Tier::Journeyman => "#43A047",
			Tier::Adept => "#1E88E5",
			Tier::Expert => "#AB47BC",
			Tier::Master => "#FF8F00",
			Tier::Grandmaster => "#D32F2F",
		}
	}

	/// Inclusive level range covered by the tier.
	pub fn level_range(self) -> (u32, u32) {
		match self {
			Tier::Novice => (1, 15),
			Tier::Apprentice => (16, 30),
			Tier::Journeyman => (31, 50),
			Tier::Adept => (51, 70),
			Tier::Expert => (71, 85),
			Tier::Master => (86, 92),
			Tier::Grandmaster => (93, 99),
		}
	}

	/// `"Adept (51-70)"`.
	pub fn range_label(self) -> String {
		let (low, high) = self.level_range();
		format!("{} ({low}-{high})", self.title())
	}

	/// Representative level inside the tier's range.
	pub fn approx_level(self) -> u32 {
		match self {
			Tier::Novice => 8,
			Tier::Apprentice => 23,
			Tier::Journeyman => 40,
			Tier::Adept => 60,
			Tier::Expert => 78,
			Tier::Master => 89,
			Tier::Grandmaster => 96,
		}
	}
}

/// Assessment result for one node, supplied by the leveling service.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Validation {
	/// Assessed tier.
	pub tier: Tier,
	/// Exact level, when the assessor reported one.
	#[serde(default)]
	pub level: Option<u32>,
}

impl Validation {
	/// Reported level, else a representative level for the tier.
	pub fn level(&self) -> u32 {
		self.level.unwrap_or_else(|| self.tier.approx_level())
	}
}

/// Map of node id to validated tier.
pub type ValidationMap = HashMap<String, Validation>;

/// Color of a node: its validated tier, else neutral.
pub fn node_color(validated: Option<&ValidationMap>, node_id: &str) -> &'static str {
	validated
		.and_then(|map| map.get(node_id))
		.map(|v| v.tier.color())
		.unwrap_or(NEUTRAL_COLOR)
}

/// Color of a cluster: the most common validated tier among its members.
///
/// Ties go to the higher tier.
pub fn cluster_color<'a>(
	validated: Option<&ValidationMap>,
	member_ids: impl IntoIterator<Item = &'a str>,
) -> &'static str {
	let Some(map) = validated else {
		return NEUTRAL_COLOR;
	};
	let mut counts: HashMap<Tier, usize> = HashMap::new();
	for id in member_ids {
		if let Some(v) = map.get(id) {
			*counts.entry(v.tier).or_default() += 1;
		}
	}
	counts
		.into_iter()
		.max_by_key(|&(tier, count)| (count, tier))
		.map(|(tier, _)| tier.color())
		.unwrap_or(NEUTRAL_COLOR)
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn names_are_case_insensitive() {
		assert_eq!(Tier::from_name("Journeyman"), Some(Tier::Journeyman));
		assert_eq!(Tier::from_name(" MASTER "), Some(Tier::Master));
		assert_eq!(Tier::from_name("wizard"), None);
	}

	#[test]
	fn difficulty_maps_to_lower_tiers() {
		assert_eq!(Tier::from_difficulty(0), Tier::Novice);
		assert_eq!(Tier::from_difficulty(3), Tier::Journeyman);
		assert_eq!(Tier::from_difficulty(9), Tier::Expert);
	}

	#[test]
	fn ranges_tile_the_level_scale() {
		assert_eq!(Tier::Adept.range_label(), "Adept (51-70)");
		let mut next = 1;
		for tier in Tier::ALL {
			let (low, high) = tier.level_range();
			assert_eq!(low, next);
			assert!((low..=high).contains(&tier.approx_level()));
			next = high + 1;
		}
		assert_eq!(next, 100);
	}

	#[test]
	fn cluster_color_follows_dominant_tier() {
		let map: ValidationMap = serde_json::from_value(serde_json::json!({
			"a": { "tier": "adept" },
			"b": { "tier": "Adept", "level": 55 },
			"c": { "tier": "novice" },
		}))
		.unwrap();
		assert_eq!(cluster_color(Some(&map), ["a", "b", "c", "d"]), Tier::Adept.color());
		assert_eq!(cluster_color(Some(&map), ["d"]), NEUTRAL_COLOR);
		assert_eq!(cluster_color(None, ["a"]), NEUTRAL_COLOR);
		assert_eq!(map["b"].level(), 55);
		assert_eq!(map["a"].level(), 60);
	}

	#[test]
	fn unvalidated_nodes_are_neutral() {
		let mut map = ValidationMap::new();
		map.insert(
			"x".into(),
			Validation {
				tier: Tier::Expert,
				level: None,
			},
		);
		assert_eq!(node_color(Some(&map), "x"), Tier::Expert.color());
		assert_eq!(node_color(Some(&map), "y"), NEUTRAL_COLOR);
		assert_eq!(node_color(None, "x"), NEUTRAL_COLOR);
	}
}
