//! Pointer and touch handling: hit-testing, hover, drag-vs-click, pinch.

use log::debug;

use super::LayoutEngine;

/// Result of releasing a pointer or touch.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum PointerOutcome {
	/// No gesture was in progress, or a tap landed on empty canvas.
	None,
	/// A short gesture over a node; the camera is now focusing it.
	Click(String),
	/// The gesture moved far enough to count as a pan.
	Pan,
}

/// Pointer, touch and selection state between events.
#[derive(Clone, Debug, Default)]
pub struct InteractionState {
	/// Node under the pointer.
	pub hovered: Option<usize>,
	/// Node last clicked or focused.
	pub selected: Option<usize>,
	/// A button or finger is down.
	pub dragging: bool,
	/// Screen point where the drag began.
	pub drag_start: (f64, f64),
	/// Camera pan when the drag began.
	pub pan_start: (f64, f64),
	/// Last screen point seen during the drag.
	pub last_pointer: (f64, f64),
	/// Total pointer travel (|dx| + |dy|) since the drag began.
	pub drag_distance: f64,
	/// Finger distance of an active two-finger pinch.
	pub pinch_distance: Option<f64>,
	hover_clear_at: Option<f64>,
}

impl InteractionState {
	/// Clear hover once a pending touch deadline has passed.
	pub(crate) fn expire_hover(&mut self, now: f64) {
		if self.hover_clear_at.is_some_and(|at| now >= at) {
			self.hover_clear_at = None;
			self.hovered = None;
		}
	}
}

impl LayoutEngine {
	/// Topmost node whose disc (plus tolerance) contains the screen point.
	///
	/// Walks the draw order backwards so the node painted last wins.
	pub fn hit_test(&self, sx: f64, sy: f64) -> Option<usize> {
		let tolerance = self.config.interaction.hit_tolerance;
		self.draw_order().into_iter().rev().find(|&idx| {
			let (cx, cy) = self.node_screen_position(idx);
			let r = self.node_screen_radius(idx) + tolerance;
			let (dx, dy) = (sx - cx, sy - cy);
			dx * dx + dy * dy <= r * r
		})
	}

	/// Update hover; returns whether it changed.
	fn hover_at(&mut self, sx: f64, sy: f64) -> bool {
		let hit = self.hit_test(sx, sy);
		if hit == self.interaction.hovered {
			return false;
		}
		self.interaction.hovered = hit;
		true
	}

	fn begin_drag(&mut self, sx: f64, sy: f64) {
		self.camera.cancel();
		let interaction = &mut self.interaction;
		interaction.dragging = true;
		interaction.drag_distance = 0.0;
		interaction.drag_start = (sx, sy);
		interaction.last_pointer = (sx, sy);
		interaction.pan_start = self.camera.pan();
		interaction.hover_clear_at = None;
	}

	fn drag_to(&mut self, sx: f64, sy: f64) {
		let interaction = &mut self.interaction;
		let (lx, ly) = interaction.last_pointer;
		interaction.drag_distance += (sx - lx).abs() + (sy - ly).abs();
		interaction.last_pointer = (sx, sy);
		let (px, py) = interaction.pan_start;
		let (ox, oy) = interaction.drag_start;
		self.camera.set_pan(px + (sx - ox), py + (sy - oy));
	}

	fn end_drag(&mut self) -> PointerOutcome {
		if !self.interaction.dragging {
			return PointerOutcome::None;
		}
		self.interaction.dragging = false;
		if self.interaction.drag_distance >= self.config.interaction.click_threshold {
			return PointerOutcome::Pan;
		}
		match self.interaction.hovered {
			Some(idx) => {
				self.focus_index(idx);
				let id = self.graph.nodes[idx].id.clone();
				debug!("clicked {id}");
				PointerOutcome::Click(id)
			}
			None => PointerOutcome::None,
		}
	}

	/// Button pressed: start a drag that may turn out to be a click.
	pub fn pointer_down(&mut self, sx: f64, sy: f64) {
		self.begin_drag(sx, sy);
	}

	/// Pan while dragging, otherwise update hover. Returns whether hover
	/// changed.
	pub fn pointer_move(&mut self, sx: f64, sy: f64) -> bool {
		if self.interaction.dragging {
			self.drag_to(sx, sy);
			false
		} else {
			self.hover_at(sx, sy)
		}
	}

	/// Button released: a click on a node focuses it, otherwise the pan ends.
	pub fn pointer_up(&mut self) -> PointerOutcome {
		self.end_drag()
	}

	/// Pointer left the canvas. Hover clears; a drag in progress keeps
	/// panning until the button is released.
	pub fn pointer_leave(&mut self) {
		self.interaction.hovered = None;
	}

	/// Wheel zoom around the pointer; positive `delta_y` zooms out.
	pub fn wheel(&mut self, delta_y: f64, sx: f64, sy: f64) {
		let step = self.config.camera.wheel_step;
		let factor = if delta_y > 0.0 { 1.0 / step } else { step };
		self.camera.zoom_at(factor, sx, sy);
	}

	/// Touch contact with the current finger positions.
	pub fn touch_start(&mut self, touches: &[(f64, f64)]) {
		match touches {
			[(sx, sy)] => {
				self.interaction.hovered = self.hit_test(*sx, *sy);
				self.interaction.pinch_distance = None;
				self.begin_drag(*sx, *sy);
			}
			[a, b, ..] => {
				self.camera.cancel();
				self.interaction.dragging = false;
				self.interaction.pinch_distance = Some(finger_distance(*a, *b));
			}
			[] => {}
		}
	}

	/// Pan with one finger, pinch-zoom with two.
	pub fn touch_move(&mut self, touches: &[(f64, f64)]) {
		match touches {
			[(sx, sy)] if self.interaction.dragging => self.drag_to(*sx, *sy),
			[a, b, ..] => {
				let distance = finger_distance(*a, *b);
				if let Some(previous) = self.interaction.pinch_distance.filter(|&d| d > 0.0) {
					let (mx, my) = ((a.0 + b.0) / 2.0, (a.1 + b.1) / 2.0);
					self.camera.zoom_at(distance / previous, mx, my);
				}
				self.interaction.pinch_distance = Some(distance);
			}
			_ => {}
		}
	}

	/// Finish a touch gesture. Hover is cleared after a delay since touch
	/// has no pointer to move away.
	pub fn touch_end(&mut self) -> PointerOutcome {
		self.interaction.pinch_distance = None;
		let outcome = self.end_drag();
		self.interaction.hover_clear_at =
			Some(self.clock.time + self.config.interaction.touch_hover_clear_delay);
		outcome
	}
}

fn finger_distance(a: (f64, f64), b: (f64, f64)) -> f64 {
	(a.0 - b.0).hypot(a.1 - b.1)
}

#[cfg(test)]
mod tests {
	use serde_json::json;

	use super::*;
	use crate::engine::{EngineConfig, View};

	fn engine() -> LayoutEngine {
		let mut config = EngineConfig::default();
		config.camera.entrance_animation = false;
		let mut engine = LayoutEngine::new(config, 1260.0, 840.0);
		engine
			.initialize_json(
				&json!({
					"nodes": [
						{ "id": "a", "label": "A" },
						{ "id": "b", "label": "B" },
						{ "id": "c", "label": "C" },
					],
					"edges": [["a", "b"], ["b", "c"]],
				})
				.to_string(),
			)
			.unwrap();
		engine
	}

	fn screen_of(engine: &LayoutEngine, id: &str) -> (f64, f64) {
		engine.node_screen_position(engine.graph().node_index(id).unwrap())
	}

	#[test]
	fn hover_follows_pointer() {
		let mut engine = engine();
		let (x, y) = screen_of(&engine, "b");
		assert!(engine.pointer_move(x + 3.0, y - 2.0));
		assert_eq!(engine.interaction().hovered, engine.graph().node_index("b"));
		assert!(!engine.pointer_move(x, y));
		assert!(engine.pointer_move(5.0, 5.0));
		assert_eq!(engine.interaction().hovered, None);
	}

	#[test]
	fn short_press_is_a_click() {
		let mut engine = engine();
		let (x, y) = screen_of(&engine, "a");
		engine.pointer_move(x, y);
		engine.pointer_down(x, y);
		engine.pointer_move(x + 1.0, y + 1.0);
		assert_eq!(engine.pointer_up(), PointerOutcome::Click("a".into()));
		assert_eq!(engine.camera().target().map(|v| v.zoom), Some(2.2));
		assert_eq!(engine.pointer_up(), PointerOutcome::None);
	}

	#[test]
	fn long_drag_pans_instead_of_clicking() {
		let mut engine = engine();
		let (x, y) = screen_of(&engine, "a");
		engine.pointer_move(x, y);
		engine.pointer_down(x, y);
		engine.pointer_move(x + 30.0, y);
		engine.pointer_move(x + 40.0, y - 10.0);
		let (pan_x, pan_y) = engine.camera().pan();
		assert!((pan_x - 40.0).abs() < 1e-9 && (pan_y + 10.0).abs() < 1e-9);
		assert!((engine.interaction().drag_distance - 50.0).abs() < 1e-9);
		assert_eq!(engine.pointer_up(), PointerOutcome::Pan);
		assert!(!engine.camera().is_animating());
	}

	#[test]
	fn drag_survives_leaving_the_canvas() {
		let mut engine = engine();
		let (x, y) = screen_of(&engine, "a");
		engine.pointer_move(x, y);
		engine.pointer_down(x, y);
		engine.pointer_leave();
		assert!(engine.interaction().dragging);
		assert_eq!(engine.interaction().hovered, None);
		engine.pointer_move(-200.0, y);
		assert_eq!(engine.camera().pan(), (-200.0 - x, 0.0));
		assert_eq!(engine.pointer_up(), PointerOutcome::Pan);
		assert!(!engine.interaction().dragging);
	}

	#[test]
	fn click_on_empty_space_does_nothing() {
		let mut engine = engine();
		engine.pointer_move(2.0, 2.0);
		engine.pointer_down(2.0, 2.0);
		assert_eq!(engine.pointer_up(), PointerOutcome::None);
		assert_eq!(engine.camera().view(), View::HOME);
	}

	#[test]
	fn zoom_scales_hit_radius() {
		let mut engine = engine();
		let idx = engine.graph().node_index("c").unwrap();
		let base = engine.node_screen_radius(idx);
		let (x, y) = screen_of(&engine, "c");
		engine.wheel(-1.0, x, y);
		assert!((engine.node_screen_radius(idx) - base * 1.1).abs() < 1e-9);
		let (x, y) = screen_of(&engine, "c");
		let reach = engine.node_screen_radius(idx) + 8.0;
		assert_eq!(engine.hit_test(x + reach - 0.5, y), Some(idx));
		assert_eq!(engine.hit_test(x + reach + 0.5, y), None);
	}

	#[test]
	fn tap_clears_hover_after_delay() {
		let mut engine = engine();
		let (x, y) = screen_of(&engine, "b");
		engine.touch_start(&[(x, y)]);
		assert_eq!(engine.interaction().hovered, engine.graph().node_index("b"));
		assert_eq!(engine.touch_end(), PointerOutcome::Click("b".into()));
		engine.tick(1.0);
		assert!(engine.interaction().hovered.is_some());
		engine.tick(1.5);
		assert_eq!(engine.interaction().hovered, None);
	}

	#[test]
	fn pinch_zooms_within_bounds() {
		let mut engine = engine();
		engine.touch_start(&[(500.0, 400.0), (600.0, 400.0)]);
		engine.touch_move(&[(450.0, 400.0), (650.0, 400.0)]);
		assert!((engine.camera().zoom() - 2.0).abs() < 1e-9);
		engine.touch_move(&[(0.0, 400.0), (1200.0, 400.0)]);
		assert_eq!(engine.camera().zoom(), 3.0);
		assert_eq!(engine.touch_end(), PointerOutcome::None);
	}
}
