//! Design-space to screen projection, pan/zoom and animated transitions.

use super::config::{CameraConfig, CanvasConfig};

pub(crate) fn ease_out_cubic(t: f64) -> f64 {
	1.0 - (1.0 - t).powi(3)
}

/// Fit of the design canvas into the current screen size.
///
/// Recomputed on resize; the layout itself never changes.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Viewport {
	/// Screen width in pixels.
	pub width: f64,
	/// Screen height in pixels.
	pub height: f64,
	/// Uniform design-to-canvas scale.
	pub scale: f64,
	/// Left edge of the projected design canvas.
	pub offset_x: f64,
	/// Top edge of the projected design canvas.
	pub offset_y: f64,
}

impl Viewport {
	/// Center the design canvas in a `width` × `height` screen, keeping
	/// the configured padding.
	pub fn new(width: f64, height: f64, canvas: &CanvasConfig) -> Self {
		let scale = ((width - canvas.pad_x * 2.0) / canvas.width)
			.min((height - canvas.pad_y * 2.0) / canvas.height)
			.max(1e-3);
		Self {
			width,
			height,
			scale,
			offset_x: (width - canvas.width * scale) / 2.0,
			offset_y: (height - canvas.height * scale) / 2.0,
		}
	}

	/// Design point to canvas point, before pan and zoom.
	pub fn project(&self, x: f64, y: f64) -> (f64, f64) {
		(self.offset_x + x * self.scale, self.offset_y + y * self.scale)
	}
}

/// Pan offset and zoom factor.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct View {
	/// Horizontal screen offset.
	pub pan_x: f64,
	/// Vertical screen offset.
	pub pan_y: f64,
	/// Scale factor applied after projection.
	pub zoom: f64,
}

impl View {
	/// Unpanned, unzoomed.
	pub const HOME: View = View {
		pan_x: 0.0,
		pan_y: 0.0,
		zoom: 1.0,
	};

	fn lerp(self, to: View, t: f64) -> View {
		View {
			pan_x: self.pan_x + (to.pan_x - self.pan_x) * t,
			pan_y: self.pan_y + (to.pan_y - self.pan_y) * t,
			zoom: self.zoom + (to.zoom - self.zoom) * t,
		}
	}
}

#[derive(Clone, Copy, Debug)]
enum Transition {
	/// Close a fixed fraction of the remaining distance each tick.
	Ease { target: View },
	/// Ease-out cubic over a fixed duration.
	Timed {
		from: View,
		to: View,
		elapsed: f64,
		duration: f64,
	},
}

/// Current view plus at most one in-flight transition.
#[derive(Clone, Debug)]
pub struct Camera {
	view: View,
	transition: Option<Transition>,
	config: CameraConfig,
}

impl Camera {
	pub(crate) fn new(config: CameraConfig) -> Self {
		Self {
			view: View::HOME,
			transition: None,
			config,
		}
	}

	/// Where the camera is this frame.
	pub fn view(&self) -> View {
		self.view
	}

	/// Current zoom factor.
	pub fn zoom(&self) -> f64 {
		self.view.zoom
	}

	/// Current pan offset.
	pub fn pan(&self) -> (f64, f64) {
		(self.view.pan_x, self.view.pan_y)
	}

	/// A transition is still running.
	pub fn is_animating(&self) -> bool {
		self.transition.is_some()
	}

	/// Where the in-flight transition ends, if any.
	pub fn target(&self) -> Option<View> {
		self.transition.map(|t| match t {
			Transition::Ease { target } => target,
			Transition::Timed { to, .. } => to,
		})
	}

	/// Design point to screen point.
	pub fn to_screen(&self, viewport: &Viewport, x: f64, y: f64) -> (f64, f64) {
		let (cx, cy) = viewport.project(x, y);
		(
			cx * self.view.zoom + self.view.pan_x,
			cy * self.view.zoom + self.view.pan_y,
		)
	}

	/// Never panics, even for an inverted configured range.
	fn clamp_zoom(&self, zoom: f64) -> f64 {
		zoom.min(self.config.max_zoom).max(self.config.min_zoom)
	}

	/// Unpanned view at zoom 1, or at the nearest allowed zoom scaled about
	/// the screen center.
	pub fn home(&self, viewport: &Viewport) -> View {
		let zoom = self.clamp_zoom(1.0);
		if zoom == 1.0 {
			return View::HOME;
		}
		View {
			pan_x: viewport.width / 2.0 * (1.0 - zoom),
			pan_y: viewport.height / 2.0 * (1.0 - zoom),
			zoom,
		}
	}

	/// Drop any in-flight transition where it stands.
	pub(crate) fn cancel(&mut self) {
		self.transition = None;
	}

	pub(crate) fn set_pan(&mut self, x: f64, y: f64) {
		self.view.pan_x = x;
		self.view.pan_y = y;
	}

	/// Multiply zoom by `factor` keeping the screen point under
	/// (`sx`, `sy`) fixed.
	pub(crate) fn zoom_at(&mut self, factor: f64, sx: f64, sy: f64) {
		if !factor.is_finite() || factor <= 0.0 {
			return;
		}
		self.transition = None;
		let old = self.view.zoom;
		let zoom = self.clamp_zoom(old * factor);
		let ratio = zoom / old;
		self.view.pan_x = sx - (sx - self.view.pan_x) * ratio;
		self.view.pan_y = sy - (sy - self.view.pan_y) * ratio;
		self.view.zoom = zoom;
	}

	/// Jump without animation.
	fn jump_to(&mut self, view: View) {
		self.transition = None;
		self.view = View {
			zoom: self.clamp_zoom(view.zoom),
			..view
		};
	}

	/// Start an eased transition, replacing any in-flight one.
	pub(crate) fn animate_to(&mut self, target: View) {
		self.transition = Some(Transition::Ease {
			target: View {
				zoom: self.clamp_zoom(target.zoom),
				..target
			},
		});
	}

	/// Zoom in from `entrance_zoom` around the screen center, settling on
	/// the home view.
	pub(crate) fn start_entrance(&mut self, viewport: &Viewport) {
		let zoom = self.clamp_zoom(self.config.entrance_zoom);
		self.jump_to(View {
			pan_x: viewport.width / 2.0 * (1.0 - zoom),
			pan_y: viewport.height / 2.0 * (1.0 - zoom),
			zoom,
		});
		self.transition = Some(Transition::Timed {
			from: self.view,
			to: self.home(viewport),
			elapsed: 0.0,
			duration: self.config.entrance_duration,
		});
	}

	/// Advance the in-flight transition by one frame.
	pub(crate) fn step(&mut self, dt: f64) {
		let Some(transition) = self.transition else {
			return;
		};
		match transition {
			Transition::Ease { target } => {
				let next = self.view.lerp(target, self.config.easing);
				if (next.zoom - target.zoom).abs() < self.config.snap_zoom_epsilon
					&& (next.pan_x - target.pan_x).abs() < self.config.snap_pan_epsilon
					&& (next.pan_y - target.pan_y).abs() < self.config.snap_pan_epsilon
				{
					self.view = target;
					self.transition = None;
				} else {
					self.view = next;
				}
			}
			Transition::Timed {
				from,
				to,
				elapsed,
				duration,
			} => {
				let elapsed = elapsed + dt.max(0.0);
				if duration <= 0.0 || elapsed >= duration {
					self.view = to;
					self.transition = None;
				} else {
					self.view = from.lerp(to, ease_out_cubic(elapsed / duration));
					self.transition = Some(Transition::Timed {
						from,
						to,
						elapsed,
						duration,
					});
				}
			}
		}
	}

	/// View that centers design point (`x`, `y`) at the focus zoom.
	pub fn focus_target(&self, viewport: &Viewport, x: f64, y: f64) -> View {
		self.centered_on(viewport, x, y, self.config.focus_zoom)
	}

	/// View that fits the design-space box (`min`, `max`) plus padding.
	pub fn fit_target(&self, viewport: &Viewport, min: (f64, f64), max: (f64, f64)) -> View {
		let pad = self.config.fit_padding;
		let span_x = (max.0 - min.0 + pad * 2.0) * viewport.scale;
		let span_y = (max.1 - min.1 + pad * 2.0) * viewport.scale;
		let fit = (viewport.width / span_x).min(viewport.height / span_y);
		let zoom = if fit.is_nan() {
			self.config.fit_max_zoom
		} else {
			fit.min(self.config.fit_max_zoom).max(self.config.fit_min_zoom)
		};
		self.centered_on(
			viewport,
			(min.0 + max.0) / 2.0,
			(min.1 + max.1) / 2.0,
			zoom,
		)
	}

	fn centered_on(&self, viewport: &Viewport, x: f64, y: f64, zoom: f64) -> View {
		let zoom = self.clamp_zoom(zoom);
		let (cx, cy) = viewport.project(x, y);
		View {
			pan_x: viewport.width / 2.0 - cx * zoom,
			pan_y: viewport.height / 2.0 - cy * zoom,
			zoom,
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	fn viewport() -> Viewport {
		Viewport::new(1260.0, 840.0, &CanvasConfig::default())
	}

	/// Screen point back to design space.
	fn design_at(camera: &Camera, vp: &Viewport, sx: f64, sy: f64) -> (f64, f64) {
		let view = camera.view();
		let cx = (sx - view.pan_x) / view.zoom;
		let cy = (sy - view.pan_y) / view.zoom;
		((cx - vp.offset_x) / vp.scale, (cy - vp.offset_y) / vp.scale)
	}

	#[test]
	fn projection_round_trips() {
		let vp = viewport();
		assert!((vp.scale - 1.0).abs() < 1e-12);
		let mut camera = Camera::new(CameraConfig::default());
		camera.jump_to(View {
			pan_x: 37.0,
			pan_y: -12.0,
			zoom: 1.7,
		});
		let (sx, sy) = camera.to_screen(&vp, 250.0, 610.0);
		let (x, y) = design_at(&camera, &vp, sx, sy);
		assert!((x - 250.0).abs() < 1e-9 && (y - 610.0).abs() < 1e-9);
	}

	#[test]
	fn wheel_zoom_stops_at_max() {
		let mut camera = Camera::new(CameraConfig::default());
		let mut previous = camera.zoom();
		for _ in 0..40 {
			camera.zoom_at(1.1, 300.0, 200.0);
			assert!(camera.zoom() >= previous);
			assert!(camera.zoom() <= 3.0);
			previous = camera.zoom();
		}
		assert_eq!(camera.zoom(), 3.0);
		let (pan_x, pan_y) = camera.pan();
		camera.zoom_at(1.1, 300.0, 200.0);
		assert!((camera.pan().0 - pan_x).abs() < 1e-9);
		assert!((camera.pan().1 - pan_y).abs() < 1e-9);

		for _ in 0..80 {
			camera.zoom_at(1.0 / 1.1, 0.0, 0.0);
		}
		assert_eq!(camera.zoom(), 0.4);
	}

	#[test]
	fn zoom_keeps_pointer_anchored() {
		let vp = viewport();
		let mut camera = Camera::new(CameraConfig::default());
		let before = design_at(&camera, &vp, 420.0, 300.0);
		camera.zoom_at(1.1, 420.0, 300.0);
		let after = design_at(&camera, &vp, 420.0, 300.0);
		assert!((before.0 - after.0).abs() < 1e-9);
		assert!((before.1 - after.1).abs() < 1e-9);
	}

	#[test]
	fn eased_transition_snaps_onto_target() {
		let mut camera = Camera::new(CameraConfig::default());
		let target = View {
			pan_x: -400.0,
			pan_y: 120.0,
			zoom: 2.2,
		};
		camera.animate_to(target);
		let mut ticks = 0;
		while camera.is_animating() {
			camera.step(0.016);
			ticks += 1;
			assert!(ticks < 1000);
		}
		assert_eq!(camera.view(), target);
	}

	#[test]
	fn latest_target_wins() {
		let mut camera = Camera::new(CameraConfig::default());
		camera.animate_to(View {
			pan_x: 100.0,
			pan_y: 100.0,
			zoom: 2.0,
		});
		camera.step(0.016);
		let second = View {
			pan_x: -50.0,
			pan_y: 0.0,
			zoom: 50.0,
		};
		camera.animate_to(second);
		assert_eq!(camera.target().map(|v| v.zoom), Some(3.0));
		for _ in 0..500 {
			camera.step(0.016);
		}
		assert_eq!(camera.view().pan_x, -50.0);
		assert_eq!(camera.zoom(), 3.0);
	}

	#[test]
	fn entrance_settles_home() {
		let vp = viewport();
		let mut camera = Camera::new(CameraConfig::default());
		camera.start_entrance(&vp);
		assert_eq!(camera.zoom(), 0.5);
		assert_eq!(camera.pan(), (315.0, 210.0));
		camera.step(0.4);
		assert!(camera.zoom() > 0.5 && camera.zoom() < 1.0);
		camera.step(0.4);
		assert_eq!(camera.view(), View::HOME);
		assert!(!camera.is_animating());
	}

	#[test]
	fn fit_is_bounded() {
		let vp = viewport();
		let camera = Camera::new(CameraConfig::default());
		let tight = camera.fit_target(&vp, (600.0, 400.0), (600.0, 400.0));
		assert_eq!(tight.zoom, 1.8);
		let wide = camera.fit_target(&vp, (-1000.0, -1000.0), (2200.0, 1800.0));
		assert_eq!(wide.zoom, 0.6);
		// Box center lands in the middle of the screen.
		let mut check = Camera::new(CameraConfig::default());
		check.jump_to(tight);
		let (sx, sy) = check.to_screen(&vp, 600.0, 400.0);
		assert!((sx - 630.0).abs() < 1e-9 && (sy - 420.0).abs() < 1e-9);
	}

	#[test]
	fn inverted_ranges_do_not_panic() {
		let vp = viewport();
		let mut camera = Camera::new(CameraConfig {
			min_zoom: 2.0,
			max_zoom: 1.0,
			fit_min_zoom: 3.0,
			fit_max_zoom: 0.5,
			..CameraConfig::default()
		});
		camera.zoom_at(1.1, 300.0, 200.0);
		assert_eq!(camera.zoom(), 2.0);
		assert_eq!(camera.fit_target(&vp, (0.0, 0.0), (10.0, 10.0)).zoom, 2.0);
	}

	#[test]
	fn entrance_ends_inside_zoom_range() {
		let vp = viewport();
		let mut camera = Camera::new(CameraConfig {
			min_zoom: 1.5,
			..CameraConfig::default()
		});
		camera.start_entrance(&vp);
		assert_eq!(camera.zoom(), 1.5);
		let target = camera.target().unwrap();
		assert_eq!(target, camera.home(&vp));
		assert_eq!(target.zoom, 1.5);
		camera.step(1.0);
		assert_eq!(camera.zoom(), 1.5);
		// Screen center stays on the design canvas center.
		let (sx, sy) = camera.to_screen(&vp, 600.0, 400.0);
		assert!((sx - 630.0).abs() < 1e-9 && (sy - 420.0).abs() < 1e-9);
	}
}
