use std::f64::consts::PI;

use wasm_bindgen::JsValue;
use web_sys::CanvasRenderingContext2d;

use crate::engine::tier::{LOCKED_COLOR, NEUTRAL_CONNECTION};
use crate::engine::{EdgeEmphasis, LayoutEngine, NodeEmphasis, SizeClass};

const GRID_SIZE: f64 = 40.0;
const DIMMED_NODE_ALPHA: f64 = 0.15;
const DIMMED_CLUSTER_ALPHA: f64 = 0.12;

pub fn render(engine: &LayoutEngine, ctx: &CanvasRenderingContext2d) {
	draw_background(engine, ctx);
	draw_clusters(engine, ctx);
	draw_edges(engine, ctx);
	draw_nodes(engine, ctx);
	draw_tooltip(engine, ctx);
}

fn draw_background(engine: &LayoutEngine, ctx: &CanvasRenderingContext2d) {
	let viewport = engine.viewport();
	let (w, h) = (viewport.width, viewport.height);
	if let Ok(gradient) = ctx.create_radial_gradient(w / 2.0, h / 2.0, 0.0, w / 2.0, h / 2.0, w * 0.7) {
		let _ = gradient.add_color_stop(0.0, "#1a1c2e");
		let _ = gradient.add_color_stop(1.0, "#0f1019");
		#[allow(deprecated)]
		ctx.set_fill_style(&gradient);
	} else {
		ctx.set_fill_style_str("#0f1019");
	}
	ctx.fill_rect(0.0, 0.0, w, h);

	let camera = engine.camera();
	let step = GRID_SIZE * camera.zoom();
	if step < 4.0 {
		return;
	}
	let (pan_x, pan_y) = camera.pan();
	ctx.set_stroke_style_str("rgba(255, 255, 255, 0.03)");
	ctx.set_line_width(0.5);
	ctx.begin_path();
	let mut gx = pan_x.rem_euclid(step);
	while gx < w {
		ctx.move_to(gx, 0.0);
		ctx.line_to(gx, h);
		gx += step;
	}
	let mut gy = pan_y.rem_euclid(step);
	while gy < h {
		ctx.move_to(0.0, gy);
		ctx.line_to(w, gy);
		gy += step;
	}
	ctx.stroke();
}

fn draw_clusters(engine: &LayoutEngine, ctx: &CanvasRenderingContext2d) {
	let (scale, zoom) = (engine.viewport().scale, engine.camera().zoom());
	let active = engine.illumination().is_active();

	for (ci, cluster) in engine.graph().clusters.iter().enumerate() {
		let (cx, cy) = engine.to_screen(cluster.center_x, cluster.center_y);
		let (rx, ry) = (cluster.radius_x * scale * zoom, cluster.radius_y * scale * zoom);
		let lit = engine.cluster_emphasized(ci);
		let highlighted = active && lit;
		let color = engine.cluster_color(ci);

		ctx.set_global_alpha(if active && !lit { DIMMED_CLUSTER_ALPHA } else { 1.0 });

		if let Ok(glow) = ctx.create_radial_gradient(cx, cy, 0.0, cx, cy, cluster.radius() * scale * zoom) {
			let _ = glow.add_color_stop(0.0, &with_alpha(color, if highlighted { "25" } else { "15" }));
			let _ = glow.add_color_stop(0.7, &with_alpha(color, "08"));
			let _ = glow.add_color_stop(1.0, &with_alpha(color, "00"));
			#[allow(deprecated)]
			ctx.set_fill_style(&glow);
		}
		ctx.begin_path();
		let _ = ctx.ellipse(cx, cy, rx, ry, 0.0, 0.0, 2.0 * PI);
		ctx.fill();

		ctx.set_stroke_style_str(&with_alpha(color, if highlighted { "50" } else { "30" }));
		ctx.set_line_width(if highlighted { 1.5 } else { 1.0 });
		let _ = ctx.set_line_dash(&js_sys::Array::of2(&JsValue::from_f64(4.0), &JsValue::from_f64(4.0)));
		ctx.stroke();
		let _ = ctx.set_line_dash(&js_sys::Array::new());

		ctx.set_fill_style_str(&with_alpha(color, if highlighted { "CC" } else { "80" }));
		ctx.set_font(&format!(
			"600 {}px \"Plus Jakarta Sans\", sans-serif",
			(11.0 * scale * zoom).max(9.0)
		));
		ctx.set_text_align("center");
		ctx.set_text_baseline("top");
		let _ = ctx.fill_text(&cluster.label, cx, cy - ry + 6.0 * scale * zoom);
	}
	ctx.set_global_alpha(1.0);
}

fn draw_edges(engine: &LayoutEngine, ctx: &CanvasRenderingContext2d) {
	let zoom = engine.camera().zoom();
	let active = engine.illumination().is_active();
	let validated = engine.validated().is_some();

	for edge in &engine.graph().edges {
		let emphasis = engine.edge_emphasis(edge);
		let (x1, y1) = engine.node_screen_position(edge.source);
		let (x2, y2) = engine.node_screen_position(edge.target);

		ctx.set_global_alpha(match emphasis {
			EdgeEmphasis::Full => 1.0,
			EdgeEmphasis::Partial => 0.15,
			EdgeEmphasis::Dimmed => 0.06,
		});
		let strong = active && emphasis == EdgeEmphasis::Full;
		let alpha = if strong { "80" } else { "50" };
		let (from, to) = if validated {
			(engine.node_color(edge.source), engine.node_color(edge.target))
		} else {
			(NEUTRAL_CONNECTION, NEUTRAL_CONNECTION)
		};
		let gradient = ctx.create_linear_gradient(x1, y1, x2, y2);
		let _ = gradient.add_color_stop(0.0, &with_alpha(from, alpha));
		let _ = gradient.add_color_stop(1.0, &with_alpha(to, alpha));
		#[allow(deprecated)]
		ctx.set_stroke_style(&gradient);
		ctx.set_line_width((if strong { 2.5 } else { 1.5 }) * zoom);

		// Slight bow to the left of the travel direction.
		let (dx, dy) = (x2 - x1, y2 - y1);
		let len = dx.hypot(dy).max(1.0);
		let bend = len * 0.06;
		let (cpx, cpy) = ((x1 + x2) / 2.0 - dy / len * bend, (y1 + y2) / 2.0 + dx / len * bend);

		ctx.begin_path();
		ctx.move_to(x1, y1);
		ctx.quadratic_curve_to(cpx, cpy, x2, y2);
		ctx.stroke();
	}
	ctx.set_global_alpha(1.0);
}

fn draw_nodes(engine: &LayoutEngine, ctx: &CanvasRenderingContext2d) {
	let graph = engine.graph();
	let (scale, zoom) = (engine.viewport().scale, engine.camera().zoom());
	let active = engine.illumination().is_active();
	let hovered = engine.interaction().hovered;
	let breathe = (engine.clock().frame as f64 * 0.04).sin() * 2.0;

	for idx in engine.draw_order() {
		let node = &graph.nodes[idx];
		let (cx, cy) = engine.node_screen_position(idx);
		let r = engine.node_screen_radius(idx);
		let color = engine.node_color(idx);
		let dimmed = engine.node_emphasis(idx) == NodeEmphasis::Dimmed;
		let is_hovered = hovered == Some(idx);
		let validation = engine.validated().and_then(|m| m.get(&node.id));

		ctx.set_global_alpha(if dimmed { DIMMED_NODE_ALPHA } else { 1.0 });

		let glowing = active && !dimmed;
		if is_hovered || node.size == SizeClass::Large || glowing {
			let glow_r = r + (6.0 + breathe + engine.pulse_offset(idx)) * zoom;
			if let Ok(glow) = ctx.create_radial_gradient(cx, cy, r * 0.5, cx, cy, glow_r.max(r)) {
				let _ = glow.add_color_stop(0.0, &with_alpha(color, if glowing { "90" } else { "60" }));
				let _ = glow.add_color_stop(1.0, &with_alpha(color, "00"));
				#[allow(deprecated)]
				ctx.set_fill_style(&glow);
				ctx.begin_path();
				let _ = ctx.arc(cx, cy, glow_r.max(r), 0.0, 2.0 * PI);
				ctx.fill();
			}
		}

		ctx.begin_path();
		let _ = ctx.arc(cx, cy, r, 0.0, 2.0 * PI);
		let (inner, outer) = if dimmed {
			("#777788".to_string(), LOCKED_COLOR.to_string())
		} else {
			(lighten(color, 40), color.to_string())
		};
		if let Ok(fill) = ctx.create_radial_gradient(cx - r * 0.3, cy - r * 0.3, 0.0, cx, cy, r) {
			let _ = fill.add_color_stop(0.0, &inner);
			let _ = fill.add_color_stop(1.0, &outer);
			#[allow(deprecated)]
			ctx.set_fill_style(&fill);
		}
		ctx.fill();

		let border = if is_hovered {
			"#FFFFFF".to_string()
		} else if dimmed {
			"#44445560".to_string()
		} else {
			lighten(color, 20)
		};
		ctx.set_stroke_style_str(&border);
		ctx.set_line_width((if is_hovered { 2.5 } else { 1.5 }) * zoom);
		ctx.stroke();

		if hovered.is_some_and(|h| graph.neighbors(h).contains(&idx)) {
			ctx.begin_path();
			let _ = ctx.arc(cx, cy, r + 3.0 * zoom, 0.0, 2.0 * PI);
			ctx.set_stroke_style_str("rgba(255, 255, 255, 0.35)");
			ctx.set_line_width(zoom);
			ctx.stroke();
		}

		ctx.set_text_align("center");
		ctx.set_text_baseline("middle");
		match validation {
			Some(v) if node.size != SizeClass::Small => {
				ctx.set_fill_style_str(if dimmed { "rgba(255, 255, 255, 0.4)" } else { "#FFFFFF" });
				ctx.set_font(&format!("700 {}px \"JetBrains Mono\", monospace", (r * 0.6).max(8.0)));
				let _ = ctx.fill_text(&v.level().to_string(), cx, cy);
			}
			_ => {
				ctx.begin_path();
				let _ = ctx.arc(cx, cy, r * 0.3, 0.0, 2.0 * PI);
				ctx.set_fill_style_str(if dimmed {
					"rgba(255, 255, 255, 0.3)"
				} else {
					"rgba(255, 255, 255, 0.85)"
				});
				ctx.fill();
			}
		}

		let label = node.label.replace('\n', " ");
		let label_y = cy + r + 6.0 * zoom;
		let base = match node.size {
			SizeClass::Large => 10.0,
			SizeClass::Medium => 9.0,
			SizeClass::Small => 8.0,
		};
		ctx.set_font(&format!(
			"600 {}px \"Inter\", sans-serif",
			(base * scale.min(1.0) * zoom).max(7.0)
		));
		ctx.set_text_baseline("top");
		ctx.set_fill_style_str("rgba(0, 0, 0, 0.6)");
		let _ = ctx.fill_text(&label, cx + 0.5, label_y + 0.5);
		ctx.set_fill_style_str(if dimmed { "rgba(255, 255, 255, 0.3)" } else { "#FFFFFF" });
		let _ = ctx.fill_text(&label, cx, label_y);

		if let Some(v) = validation.filter(|_| node.size == SizeClass::Small) {
			ctx.set_font(&format!(
				"700 {}px \"JetBrains Mono\", monospace",
				(7.0 * scale * zoom).max(6.0)
			));
			ctx.set_text_baseline("bottom");
			ctx.set_fill_style_str(if dimmed { "#44445560" } else { color });
			let _ = ctx.fill_text(&v.level().to_string(), cx + r + 2.0 * zoom, cy - r - 2.0 * zoom);
		}
	}
	ctx.set_global_alpha(1.0);
}

fn draw_tooltip(engine: &LayoutEngine, ctx: &CanvasRenderingContext2d) {
	let Some(idx) = engine.interaction().hovered else {
		return;
	};
	let graph = engine.graph();
	let node = &graph.nodes[idx];
	let cluster = &graph.clusters[node.cluster];
	let (cx, cy) = engine.node_screen_position(idx);
	let r = engine.node_screen_radius(idx);
	let color = engine.node_color(idx);
	let validation = engine.validated().and_then(|m| m.get(&node.id));

	let title = node.label.replace('\n', " ");
	let line1 = match validation {
		Some(v) => format!("Level {} -- {}", v.level(), v.tier.title()),
		None => cluster.label.clone(),
	};
	let line2: String = node
		.description
		.clone()
		.unwrap_or_else(|| format!("Cluster: {}", cluster.id))
		.chars()
		.take(50)
		.collect();
	let line3 = validation
		.and(node.bloom_level)
		.map(|level| format!("Bloom's Level {level}"));

	ctx.set_font("600 12px \"Plus Jakarta Sans\", sans-serif");
	let title_w = text_width(ctx, &title);
	ctx.set_font("500 10px \"Inter\", sans-serif");
	let box_w = title_w.max(text_width(ctx, &line1)).max(text_width(ctx, &line2)) + 28.0;
	let box_h = if line3.is_some() { 78.0 } else { 64.0 };

	let w = engine.viewport().width;
	let mut tip_x = (cx - box_w / 2.0).max(8.0);
	if tip_x + box_w > w - 8.0 {
		tip_x = w - box_w - 8.0;
	}
	let mut tip_y = cy - r - box_h - 14.0;
	if tip_y < 8.0 {
		tip_y = cy + r + 14.0;
	}

	ctx.set_shadow_color("rgba(0, 0, 0, 0.3)");
	ctx.set_shadow_blur(16.0);
	ctx.set_shadow_offset_y(4.0);
	round_rect(ctx, tip_x, tip_y, box_w, box_h, 8.0);
	ctx.set_fill_style_str("#1a1c2e");
	ctx.fill();
	ctx.set_stroke_style_str(&with_alpha(color, "40"));
	ctx.set_line_width(1.0);
	ctx.stroke();
	ctx.set_shadow_color("transparent");
	ctx.set_shadow_blur(0.0);
	ctx.set_shadow_offset_y(0.0);

	ctx.set_fill_style_str(color);
	ctx.fill_rect(tip_x + 8.0, tip_y, box_w - 16.0, 3.0);

	ctx.set_text_align("left");
	ctx.set_text_baseline("top");
	ctx.set_fill_style_str("#FFFFFF");
	ctx.set_font("600 12px \"Plus Jakarta Sans\", sans-serif");
	let _ = ctx.fill_text(&title, tip_x + 14.0, tip_y + 10.0);
	ctx.set_fill_style_str(color);
	ctx.set_font("600 10px \"JetBrains Mono\", monospace");
	let _ = ctx.fill_text(&line1, tip_x + 14.0, tip_y + 28.0);
	ctx.set_fill_style_str("#8898AA");
	ctx.set_font("400 9px \"Inter\", sans-serif");
	let _ = ctx.fill_text(&line2, tip_x + 14.0, tip_y + 44.0);
	if let Some(line3) = line3 {
		ctx.set_fill_style_str("#6B7280");
		let _ = ctx.fill_text(&line3, tip_x + 14.0, tip_y + 58.0);
	}
}

fn text_width(ctx: &CanvasRenderingContext2d, text: &str) -> f64 {
	ctx.measure_text(text).map(|m| m.width()).unwrap_or(0.0)
}

fn round_rect(ctx: &CanvasRenderingContext2d, x: f64, y: f64, w: f64, h: f64, r: f64) {
	ctx.begin_path();
	ctx.move_to(x + r, y);
	let _ = ctx.arc_to(x + w, y, x + w, y + h, r);
	let _ = ctx.arc_to(x + w, y + h, x, y + h, r);
	let _ = ctx.arc_to(x, y + h, x, y, r);
	let _ = ctx.arc_to(x, y, x + w, y, r);
	ctx.close_path();
}

/// `#rrggbb` plus a two-digit hex alpha.
fn with_alpha(color: &str, alpha: &str) -> String {
	format!("{color}{alpha}")
}

/// Shift each channel of `#rrggbb` up by `amount`, saturating.
fn lighten(color: &str, amount: u8) -> String {
	let Some(hex) = color.strip_prefix('#').filter(|h| h.len() == 6) else {
		return color.to_string();
	};
	let channel = |i: usize| {
		u8::from_str_radix(&hex[i..i + 2], 16)
			.unwrap_or(0)
			.saturating_add(amount)
	};
	format!("#{:02X}{:02X}{:02X}", channel(0), channel(2), channel(4))
}
