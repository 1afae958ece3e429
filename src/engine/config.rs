//! Tunable constants for layout, camera and interaction.
//!
//! Every section deserializes with defaults, so a host may supply a partial
//! JSON document and only override what it cares about.

use serde::Deserialize;

use super::error::ConfigError;

/// Full engine configuration.
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
	/// Design canvas and screen projection.
	pub canvas: CanvasConfig,
	/// Cluster anchor and seed placement.
	pub layout: PlacementConfig,
	/// Force-directed relaxation.
	pub relaxation: RelaxationConfig,
	/// Camera bounds and transitions.
	pub camera: CameraConfig,
	/// Pointer and touch handling.
	pub interaction: InteractionConfig,
}

impl EngineConfig {
	/// Parse a (possibly partial) JSON configuration document.
	pub fn from_json(json: &str) -> Result<Self, ConfigError> {
		let config: Self = serde_json::from_str(json)?;
		config.validate()?;
		Ok(config)
	}

	/// Reject ranges and sizes the engine cannot work with.
	pub fn validate(&self) -> Result<(), ConfigError> {
		let camera = &self.camera;
		check_range("camera.min_zoom", camera.min_zoom, "camera.max_zoom", camera.max_zoom)?;
		check_range(
			"camera.fit_min_zoom",
			camera.fit_min_zoom,
			"camera.fit_max_zoom",
			camera.fit_max_zoom,
		)?;
		if camera.min_zoom <= 0.0 {
			return Err(ConfigError::Invalid("camera.min_zoom must be positive".into()));
		}
		if !(self.canvas.width > 0.0 && self.canvas.height > 0.0) {
			return Err(ConfigError::Invalid(format!(
				"canvas size must be positive, got {} x {}",
				self.canvas.width, self.canvas.height
			)));
		}
		Ok(())
	}
}

fn check_range(min_name: &str, min: f64, max_name: &str, max: f64) -> Result<(), ConfigError> {
	if min.is_finite() && max.is_finite() && min <= max {
		Ok(())
	} else {
		Err(ConfigError::Invalid(format!(
			"{min_name} ({min}) must not exceed {max_name} ({max})"
		)))
	}
}

/// Logical design space in which layout is computed.
#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct CanvasConfig {
	pub width: f64,
	pub height: f64,
	/// Horizontal screen padding kept around the projected design canvas.
	pub pad_x: f64,
	/// Vertical screen padding kept around the projected design canvas.
	pub pad_y: f64,
}

impl Default for CanvasConfig {
	fn default() -> Self {
		Self {
			width: 1200.0,
			height: 800.0,
			pad_x: 30.0,
			pad_y: 20.0,
		}
	}
}

#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct PlacementConfig {
	/// A node whose degree is strictly greater than this is a hub.
	pub hub_degree_threshold: usize,
	/// Anchor ellipse radii as fractions of the canvas size.
	pub anchor_radius_x: f64,
	pub anchor_radius_y: f64,
	pub extent_base_x: f64,
	pub extent_base_y: f64,
	pub extent_per_member_x: f64,
	pub extent_per_member_y: f64,
	pub ring_radius_base: f64,
	pub ring_radius_per_member: f64,
	/// Added to every other node's ring radius.
	pub ring_jitter: f64,
	pub inner_ring_capacity: usize,
	pub outer_ring_factor: f64,
	/// Offset of the second member in a two-node cluster.
	pub pair_offset: (f64, f64),
	/// Horizontal spacing between hubs sharing one cluster.
	pub hub_spread: f64,
}

impl Default for PlacementConfig {
	fn default() -> Self {
		Self {
			hub_degree_threshold: 3,
			anchor_radius_x: 0.32,
			anchor_radius_y: 0.28,
			extent_base_x: 140.0,
			extent_base_y: 110.0,
			extent_per_member_x: 8.0,
			extent_per_member_y: 6.0,
			ring_radius_base: 50.0,
			ring_radius_per_member: 6.0,
			ring_jitter: 12.0,
			inner_ring_capacity: 6,
			outer_ring_factor: 1.8,
			pair_offset: (70.0, 0.0),
			hub_spread: 40.0,
		}
	}
}

#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct RelaxationConfig {
	pub iterations: usize,
	pub repulsion: f64,
	/// Distance floor for repulsion.
	pub min_separation: f64,
	pub spring: f64,
	pub rest_length: f64,
	pub cluster_gravity: f64,
	pub damping: f64,
	/// Nodes are clamped this far inside the canvas border.
	pub border_margin: f64,
	pub bounds_padding: f64,
	pub min_bounds_x: f64,
	pub min_bounds_y: f64,
}

impl Default for RelaxationConfig {
	fn default() -> Self {
		Self {
			iterations: 60,
			repulsion: 2000.0,
			min_separation: 50.0,
			spring: 0.01,
			rest_length: 90.0,
			cluster_gravity: 0.005,
			damping: 0.85,
			border_margin: 60.0,
			bounds_padding: 60.0,
			min_bounds_x: 60.0,
			min_bounds_y: 50.0,
		}
	}
}

#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct CameraConfig {
	pub min_zoom: f64,
	pub max_zoom: f64,
	/// Fraction of the remaining distance covered per tick.
	pub easing: f64,
	pub snap_zoom_epsilon: f64,
	pub snap_pan_epsilon: f64,
	pub focus_zoom: f64,
	/// Design-space padding around the illuminated bounding box.
	pub fit_padding: f64,
	pub fit_min_zoom: f64,
	pub fit_max_zoom: f64,
	pub wheel_step: f64,
	pub entrance_animation: bool,
	pub entrance_zoom: f64,
	pub entrance_duration: f64,
}

impl Default for CameraConfig {
	fn default() -> Self {
		Self {
			min_zoom: 0.4,
			max_zoom: 3.0,
			easing: 0.08,
			snap_zoom_epsilon: 0.005,
			snap_pan_epsilon: 0.5,
			focus_zoom: 2.2,
			fit_padding: 120.0,
			fit_min_zoom: 0.6,
			fit_max_zoom: 1.8,
			wheel_step: 1.1,
			entrance_animation: true,
			entrance_zoom: 0.5,
			entrance_duration: 0.8,
		}
	}
}

#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct InteractionConfig {
	/// Node radius per size class, in design units.
	pub radius_large: f64,
	pub radius_medium: f64,
	pub radius_small: f64,
	pub radius_scale: f64,
	/// Extra screen pixels accepted around a node disc.
	pub hit_tolerance: f64,
	/// Accumulated pointer travel below which a release counts as a click.
	pub click_threshold: f64,
	/// Seconds before hover clears after a touch ends.
	pub touch_hover_clear_delay: f64,
}

impl Default for InteractionConfig {
	fn default() -> Self {
		Self {
			radius_large: 26.0,
			radius_medium: 18.0,
			radius_small: 12.0,
			radius_scale: 1.2,
			hit_tolerance: 8.0,
			click_threshold: 5.0,
			touch_hover_clear_delay: 2.0,
		}
	}
}
