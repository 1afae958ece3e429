use std::cell::{Cell, RefCell};
use std::rc::Rc;

use leptos::html::Canvas;
use leptos::prelude::*;
use log::{debug, warn};
use wasm_bindgen::prelude::*;
use web_sys::{
	CanvasRenderingContext2d, Event, HtmlCanvasElement, MouseEvent, TouchEvent, TouchList,
	WheelEvent, Window,
};

use super::render;
use crate::engine::tier::NEUTRAL_COLOR;
use crate::engine::{
	EngineConfig, GraphInput, LayoutEngine, Legend, NodeDetail, PointerOutcome, ValidationMap,
};

/// Seconds advanced per animation frame.
const FRAME_DT: f64 = 0.016;

type SharedEngine = Rc<RefCell<Option<LayoutEngine>>>;

/// Window listeners and the animation loop, released on unmount.
#[derive(Default)]
struct WindowHooks {
	animate: Rc<RefCell<Option<Closure<dyn FnMut()>>>>,
	frame: Rc<Cell<Option<i32>>>,
	listeners: RefCell<Vec<(&'static str, Closure<dyn FnMut(Event)>)>>,
}

impl WindowHooks {
	fn listen(&self, window: &Window, event: &'static str, callback: Closure<dyn FnMut(Event)>) {
		let _ = window.add_event_listener_with_callback(event, callback.as_ref().unchecked_ref());
		self.listeners.borrow_mut().push((event, callback));
	}

	fn release(&self) {
		let Some(window) = web_sys::window() else {
			return;
		};
		if let Some(id) = self.frame.take() {
			let _ = window.cancel_animation_frame(id);
		}
		self.animate.borrow_mut().take();
		for (event, callback) in self.listeners.borrow_mut().drain(..) {
			let _ = window
				.remove_event_listener_with_callback(event, callback.as_ref().unchecked_ref());
		}
	}
}

/// Canvas that lays out and draws a skill tree.
///
/// `data` is laid out again whenever it changes. `illuminated` highlights a
/// subset of node ids (`None` or an empty list shows everything), and
/// `validated` recolors nodes by assessed tier.
#[component]
pub fn SkillTreeCanvas(
	#[prop(into)] data: Signal<GraphInput>,
	#[prop(into, default = Signal::stored(None))] illuminated: Signal<Option<Vec<String>>>,
	#[prop(into, default = Signal::stored(None))] validated: Signal<Option<ValidationMap>>,
	#[prop(optional)] config: Option<EngineConfig>,
	#[prop(default = false)] fullscreen: bool,
	#[prop(default = None)] width: Option<f64>,
	#[prop(default = None)] height: Option<f64>,
) -> impl IntoView {
	let config = config.unwrap_or_default();
	let canvas_ref = NodeRef::<Canvas>::new();
	let selected: RwSignal<Option<NodeDetail>> = RwSignal::new(None);
	let legend: RwSignal<Legend> = RwSignal::new(Legend::default());
	let engine: SharedEngine = Rc::new(RefCell::new(None));
	let hooks = Rc::new(WindowHooks::default());
	let (engine_init, hooks_init) = (engine.clone(), hooks.clone());

	Effect::new(move |_| {
		let Some(canvas) = canvas_ref.get() else {
			return;
		};
		let canvas: HtmlCanvasElement = canvas.into();
		let Some(window) = web_sys::window() else {
			return;
		};
		hooks_init.release();
		let (w, h) = canvas_size(&window, &canvas, fullscreen, width, height);
		canvas.set_width(w as u32);
		canvas.set_height(h as u32);
		let Some(ctx) = context_2d(&canvas) else {
			warn!("canvas has no 2d context");
			return;
		};

		let mut fresh = LayoutEngine::new(config.clone(), w, h);
		fresh.initialize(&data.get_untracked());
		if let Some(map) = validated.get_untracked() {
			fresh.validate(map);
		}
		apply_illumination(&mut fresh, illuminated.get_untracked().as_deref());
		legend.set(fresh.legend());
		*engine_init.borrow_mut() = Some(fresh);

		if fullscreen {
			let (engine_resize, canvas_resize) = (engine_init.clone(), canvas.clone());
			hooks_init.listen(
				&window,
				"resize",
				Closure::new(move |_: Event| {
					let Some(win) = web_sys::window() else {
						return;
					};
					let (nw, nh) = window_size(&win);
					canvas_resize.set_width(nw as u32);
					canvas_resize.set_height(nh as u32);
					if let Some(ref mut engine) = *engine_resize.borrow_mut() {
						engine.resize(nw, nh);
					}
				}),
			);
		}

		// Drags keep panning and end cleanly outside the canvas.
		let engine_mm = engine_init.clone();
		hooks_init.listen(
			&window,
			"mousemove",
			Closure::new(move |ev: Event| {
				let Some(ev) = ev.dyn_ref::<MouseEvent>() else {
					return;
				};
				let Some((x, y)) = local_point(canvas_ref, ev.client_x(), ev.client_y()) else {
					return;
				};
				if let Some(ref mut engine) = *engine_mm.borrow_mut() {
					if engine.pointer_move(x, y) {
						set_cursor(canvas_ref, hover_cursor(engine));
					}
				}
			}),
		);
		let engine_mu = engine_init.clone();
		hooks_init.listen(
			&window,
			"mouseup",
			Closure::new(move |_: Event| {
				let detail = {
					let mut guard = engine_mu.borrow_mut();
					let Some(engine) = guard.as_mut() else {
						return;
					};
					let outcome = engine.pointer_up();
					set_cursor(canvas_ref, hover_cursor(engine));
					clicked_detail(engine, outcome)
				};
				if detail.is_some() {
					selected.set(detail);
				}
			}),
		);

		let (engine_anim, animate_inner, frame_inner) = (
			engine_init.clone(),
			hooks_init.animate.clone(),
			hooks_init.frame.clone(),
		);
		*hooks_init.animate.borrow_mut() = Some(Closure::new(move || {
			if let Some(ref mut engine) = *engine_anim.borrow_mut() {
				engine.tick(FRAME_DT);
				render::render(engine, &ctx);
			}
			if let (Some(cb), Some(win)) = (animate_inner.borrow().as_ref(), web_sys::window()) {
				frame_inner.set(win.request_animation_frame(cb.as_ref().unchecked_ref()).ok());
			}
		}));
		if let Some(ref cb) = *hooks_init.animate.borrow() {
			hooks_init
				.frame
				.set(window.request_animation_frame(cb.as_ref().unchecked_ref()).ok());
		}
	});

	let teardown = StoredValue::new_local(hooks);
	on_cleanup(move || {
		teardown.try_with_value(|hooks| hooks.release());
	});

	// Later changes to the inputs; the mount above consumed their first values.
	let engine_data = engine.clone();
	Effect::watch(
		move || data.get(),
		move |input, _, _| {
			if let Some(ref mut engine) = *engine_data.borrow_mut() {
				engine.initialize(input);
				if let Some(map) = validated.get_untracked() {
					engine.validate(map);
				}
				apply_illumination(engine, illuminated.get_untracked().as_deref());
				legend.set(engine.legend());
			}
			selected.set(None);
		},
		false,
	);

	let engine_lit = engine.clone();
	Effect::watch(
		move || illuminated.get(),
		move |ids, _, _| {
			if let Some(ref mut engine) = *engine_lit.borrow_mut() {
				match ids.as_deref() {
					Some(ids) if !ids.is_empty() => engine.illuminate(ids.iter().cloned()),
					_ => engine.reset_illumination(),
				}
			}
		},
		false,
	);

	let engine_val = engine.clone();
	Effect::watch(
		move || validated.get(),
		move |map, _, _| {
			if let Some(ref mut engine) = *engine_val.borrow_mut() {
				match map {
					Some(map) => engine.validate(map.clone()),
					None => engine.reset_validation(),
				}
				legend.set(engine.legend());
			}
		},
		false,
	);

	// Closing the detail panel releases the focused node.
	let engine_sel = engine.clone();
	Effect::watch(
		move || selected.with(Option::is_some),
		move |open, was_open, _| {
			if !*open && was_open == Some(&true) {
				if let Some(ref mut engine) = *engine_sel.borrow_mut() {
					engine.clear_focus();
				}
			}
		},
		false,
	);

	let engine_md = engine.clone();
	let on_mousedown = move |ev: MouseEvent| {
		let Some((x, y)) = local_point(canvas_ref, ev.client_x(), ev.client_y()) else {
			return;
		};
		if let Some(ref mut engine) = *engine_md.borrow_mut() {
			engine.pointer_down(x, y);
		}
		set_cursor(canvas_ref, "grabbing");
	};

	let engine_ml = engine.clone();
	let on_mouseleave = move |_: MouseEvent| {
		if let Some(ref mut engine) = *engine_ml.borrow_mut() {
			engine.pointer_leave();
			if !engine.interaction().dragging {
				set_cursor(canvas_ref, "grab");
			}
		}
	};

	let engine_wh = engine.clone();
	let on_wheel = move |ev: WheelEvent| {
		ev.prevent_default();
		let Some((x, y)) = local_point(canvas_ref, ev.client_x(), ev.client_y()) else {
			return;
		};
		if let Some(ref mut engine) = *engine_wh.borrow_mut() {
			engine.wheel(ev.delta_y(), x, y);
		}
	};

	let engine_ts = engine.clone();
	let on_touchstart = move |ev: TouchEvent| {
		ev.prevent_default();
		let points = touch_points(canvas_ref, &ev.touches());
		if let Some(ref mut engine) = *engine_ts.borrow_mut() {
			engine.touch_start(&points);
		}
	};

	let engine_tm = engine.clone();
	let on_touchmove = move |ev: TouchEvent| {
		ev.prevent_default();
		let points = touch_points(canvas_ref, &ev.touches());
		if let Some(ref mut engine) = *engine_tm.borrow_mut() {
			engine.touch_move(&points);
		}
	};

	let engine_te = engine.clone();
	let on_touchend = move |ev: TouchEvent| {
		let remaining = touch_points(canvas_ref, &ev.touches());
		let detail = {
			let mut guard = engine_te.borrow_mut();
			let Some(engine) = guard.as_mut() else {
				return;
			};
			let outcome = engine.touch_end();
			// Lifting one finger of a pinch continues as a one-finger pan.
			if !remaining.is_empty() {
				engine.touch_start(&remaining);
			}
			clicked_detail(engine, outcome)
		};
		if detail.is_some() {
			selected.set(detail);
		}
	};

	view! {
		<div class="skill-tree" style="position: relative;">
			<canvas
				node_ref=canvas_ref
				class="skill-tree-canvas"
				on:mousedown=on_mousedown
				on:mouseleave=on_mouseleave
				on:wheel=on_wheel
				on:touchstart=on_touchstart
				on:touchmove=on_touchmove
				on:touchend=on_touchend
				style="display: block; cursor: grab; touch-action: none;"
			/>
			{move || legend_view(legend.get())}
			{move || selected.get().map(|detail| detail_panel(detail, selected))}
		</div>
	}
}

fn legend_view(legend: Legend) -> impl IntoView {
	let items = legend
		.entries
		.into_iter()
		.map(|entry| {
			view! {
				<div class="tree-legend-item" title=entry.detail.unwrap_or_default()>
					<span class="tree-legend-dot" style=format!("background: {};", entry.color)></span>
					<span>{entry.label}</span>
				</div>
			}
		})
		.collect_view();
	view! {
		<div class="tree-legend">
			{legend.title.map(|title| view! { <h4>{title}</h4> })}
			{items}
		</div>
	}
}

fn detail_panel(detail: NodeDetail, selected: RwSignal<Option<NodeDetail>>) -> impl IntoView {
	let tier = detail.validation.as_ref().map(|v| v.tier).or(detail.tier);
	let accent = tier.map_or(NEUTRAL_COLOR, |t| t.color());
	let level = detail
		.validation
		.as_ref()
		.map(|v| format!("Level {} -- {}", v.level(), v.tier.title()));
	let bloom = detail
		.validation
		.as_ref()
		.and(detail.bloom_level)
		.map(|b| format!("Bloom's Level {b}"));
	let difficulty = detail.difficulty.map(|d| format!("Difficulty {d} / 5"));
	let prerequisites = id_list("Prerequisites", detail.prerequisites);
	let unlocks = id_list("Unlocks", detail.unlocks);

	view! {
		<aside class="node-detail" style=format!("border-top: 3px solid {accent};")>
			<button class="node-detail-close" on:click=move |_| selected.set(None)>
				"×"
			</button>
			<h2>{detail.label}</h2>
			<p class="node-detail-cluster">{detail.cluster_label}</p>
			{level.map(|text| view! { <p class="node-detail-level">{text}</p> })}
			{tier.map(|t| view! { <p class="node-detail-tier">{t.title()}</p> })}
			{detail.description.map(|text| view! { <p class="node-detail-description">{text}</p> })}
			{difficulty.map(|text| view! { <p class="node-detail-difficulty">{text}</p> })}
			{bloom.map(|text| view! { <p class="node-detail-bloom">{text}</p> })}
			{prerequisites}
			{unlocks}
		</aside>
	}
}

fn id_list(title: &'static str, ids: Vec<String>) -> Option<impl IntoView> {
	if ids.is_empty() {
		return None;
	}
	Some(view! {
		<section class="node-detail-links">
			<h3>{title}</h3>
			<ul>{ids.into_iter().map(|id| view! { <li>{id}</li> }).collect_view()}</ul>
		</section>
	})
}

fn apply_illumination(engine: &mut LayoutEngine, ids: Option<&[String]>) {
	if let Some(ids) = ids.filter(|ids| !ids.is_empty()) {
		engine.illuminate(ids.iter().cloned());
	}
}

fn clicked_detail(engine: &LayoutEngine, outcome: PointerOutcome) -> Option<NodeDetail> {
	match outcome {
		PointerOutcome::Click(id) => {
			debug!("selected {id}");
			engine.node_detail(&id)
		}
		PointerOutcome::Pan | PointerOutcome::None => None,
	}
}

fn hover_cursor(engine: &LayoutEngine) -> &'static str {
	if engine.interaction().dragging {
		"grabbing"
	} else if engine.interaction().hovered.is_some() {
		"pointer"
	} else {
		"grab"
	}
}

fn set_cursor(canvas_ref: NodeRef<Canvas>, cursor: &str) {
	if let Some(canvas) = canvas_ref.get() {
		let _ = web_sys::HtmlElement::style(&canvas).set_property("cursor", cursor);
	}
}

fn context_2d(canvas: &HtmlCanvasElement) -> Option<CanvasRenderingContext2d> {
	canvas.get_context("2d").ok()??.dyn_into().ok()
}

fn window_size(window: &Window) -> (f64, f64) {
	let dimension = |value: Result<JsValue, JsValue>, fallback: f64| {
		value.ok().and_then(|v| v.as_f64()).unwrap_or(fallback)
	};
	(
		dimension(window.inner_width(), 800.0),
		dimension(window.inner_height(), 600.0),
	)
}

fn canvas_size(
	window: &Window,
	canvas: &HtmlCanvasElement,
	fullscreen: bool,
	width: Option<f64>,
	height: Option<f64>,
) -> (f64, f64) {
	if fullscreen {
		return window_size(window);
	}
	let parent = canvas.parent_element();
	(
		width.unwrap_or_else(|| {
			parent
				.as_ref()
				.map(|p| p.client_width() as f64)
				.filter(|&w| w > 0.0)
				.unwrap_or(800.0)
		}),
		height.unwrap_or_else(|| {
			parent
				.as_ref()
				.map(|p| p.client_height() as f64)
				.filter(|&h| h > 0.0)
				.unwrap_or(600.0)
		}),
	)
}

/// Client coordinates to canvas-local coordinates.
fn local_point(canvas_ref: NodeRef<Canvas>, client_x: i32, client_y: i32) -> Option<(f64, f64)> {
	let canvas = canvas_ref.get()?;
	let rect = canvas.get_bounding_client_rect();
	Some((client_x as f64 - rect.left(), client_y as f64 - rect.top()))
}

fn touch_points(canvas_ref: NodeRef<Canvas>, touches: &TouchList) -> Vec<(f64, f64)> {
	(0..touches.length())
		.filter_map(|i| touches.get(i))
		.filter_map(|t| local_point(canvas_ref, t.client_x(), t.client_y()))
		.collect()
}
