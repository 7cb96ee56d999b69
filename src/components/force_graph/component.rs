use std::cell::RefCell;
use std::rc::Rc;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use leptos::prelude::*;
use log::info;
use wasm_bindgen::prelude::*;
use web_sys::{CanvasRenderingContext2d, HtmlCanvasElement, MouseEvent, TouchEvent, Window};

use super::render;
use super::state::{ForceGraphState, MOUSE_POINTER, PointerAction};
use crate::backend::GraphSource;
use crate::graph::Viewport;
use crate::layout::GraphConfig;

type SharedState = Rc<RefCell<Option<ForceGraphState>>>;

/// Canvas view of a live graph rebuilt from `source`.
#[component]
pub fn ForceGraphCanvas(
	/// Graph to show; a new value replaces the current graph in place.
	#[prop(into)]
	source: Signal<GraphSource>,
	/// Fill the window and follow its size.
	#[prop(default = false)]
	fullscreen: bool,
	/// Fixed width; defaults to the parent's width.
	#[prop(default = None)]
	width: Option<f64>,
	/// Fixed height; defaults to the parent's height.
	#[prop(default = None)]
	height: Option<f64>,
	/// Layout and glyph settings.
	#[prop(optional)]
	config: Option<GraphConfig>,
) -> impl IntoView {
	let canvas_ref = NodeRef::<leptos::html::Canvas>::new();
	let state: SharedState = Rc::new(RefCell::new(None));
	let animate: Rc<RefCell<Option<Closure<dyn FnMut()>>>> = Rc::new(RefCell::new(None));
	let resize_cb: Rc<RefCell<Option<Closure<dyn FnMut()>>>> = Rc::new(RefCell::new(None));
	let mounted = Arc::new(AtomicBool::new(true));
	let (state_init, animate_init, resize_cb_init, mounted_init) =
		(state.clone(), animate.clone(), resize_cb.clone(), mounted.clone());
	let config = config.unwrap_or_default();

	Effect::new(move |_| {
		let Some(canvas) = canvas_ref.get() else {
			return;
		};
		let canvas: HtmlCanvasElement = canvas.into();
		let window: Window = web_sys::window().unwrap();

		let (w, h) = if fullscreen {
			(
				window.inner_width().unwrap().as_f64().unwrap(),
				window.inner_height().unwrap().as_f64().unwrap(),
			)
		} else {
			(
				width.unwrap_or_else(|| {
					canvas
						.parent_element()
						.map(|p| p.client_width() as f64)
						.unwrap_or(800.0)
				}),
				height.unwrap_or_else(|| {
					canvas
						.parent_element()
						.map(|p| p.client_height() as f64)
						.unwrap_or(600.0)
				}),
			)
		};
		canvas.set_width(w as u32);
		canvas.set_height(h as u32);

		let ctx: CanvasRenderingContext2d = canvas
			.get_context("2d")
			.unwrap()
			.unwrap()
			.dyn_into()
			.unwrap();
		let mut graph_state =
			ForceGraphState::new(&config, Viewport::new(w, h), js_sys::Date::now() as u64);
		graph_state.apply_source(&source.get_untracked());
		*state_init.borrow_mut() = Some(graph_state);
		info!("graph view mounted at {w}x{h}");

		if fullscreen {
			let (state_resize, canvas_resize, mounted_resize) =
				(state_init.clone(), canvas.clone(), mounted_init.clone());
			*resize_cb_init.borrow_mut() = Some(Closure::new(move || {
				if !mounted_resize.load(Ordering::Relaxed) {
					return;
				}
				let win: Window = web_sys::window().unwrap();
				let (nw, nh) = (
					win.inner_width().unwrap().as_f64().unwrap(),
					win.inner_height().unwrap().as_f64().unwrap(),
				);
				canvas_resize.set_width(nw as u32);
				canvas_resize.set_height(nh as u32);
				if let Some(ref mut s) = *state_resize.borrow_mut() {
					s.resize(nw, nh);
				}
			}));
			if let Some(ref cb) = *resize_cb_init.borrow() {
				let _ =
					window.add_event_listener_with_callback("resize", cb.as_ref().unchecked_ref());
			}
		}

		// Physics then paint, once per display frame, until unmounted.
		let (state_anim, animate_inner, mounted_anim) =
			(state_init.clone(), animate_init.clone(), mounted_init.clone());
		*animate_init.borrow_mut() = Some(Closure::new(move || {
			let alive = mounted_anim.load(Ordering::Relaxed);
			if let Some(ref mut s) = *state_anim.borrow_mut() {
				if !alive {
					s.simulation.stop();
					return;
				}
				s.tick();
				render::render(s, &ctx);
			}
			if let Some(ref cb) = *animate_inner.borrow() {
				let _ = web_sys::window()
					.unwrap()
					.request_animation_frame(cb.as_ref().unchecked_ref());
			}
		}));
		if let Some(ref cb) = *animate_init.borrow() {
			let _ = window.request_animation_frame(cb.as_ref().unchecked_ref());
		}
	});

	// New input replaces the graph in place; the running loop picks it up.
	let state_src = state.clone();
	Effect::new(move |_| {
		let next = source.get();
		if let Some(ref mut s) = *state_src.borrow_mut() {
			s.apply_source(&next);
		}
	});

	on_cleanup(move || mounted.store(false, Ordering::Relaxed));

	let local_point = move |client_x: i32, client_y: i32| {
		let canvas: HtmlCanvasElement = canvas_ref.get()?.into();
		let rect = canvas.get_bounding_client_rect();
		Some((
			client_x as f64 - rect.left(),
			client_y as f64 - rect.top(),
		))
	};

	let state_md = state.clone();
	let on_mousedown = move |ev: MouseEvent| {
		let Some((x, y)) = local_point(ev.client_x(), ev.client_y()) else {
			return;
		};
		if let Some(ref mut s) = *state_md.borrow_mut() {
			if let PointerAction::Deleted(_) = s.pointer_down(MOUSE_POINTER, x, y) {
				ev.stop_propagation();
				ev.prevent_default();
			}
		}
	};

	let state_mm = state.clone();
	let on_mousemove = move |ev: MouseEvent| {
		let Some((x, y)) = local_point(ev.client_x(), ev.client_y()) else {
			return;
		};
		if let Some(ref mut s) = *state_mm.borrow_mut() {
			s.pointer_move(MOUSE_POINTER, x, y);
		}
	};

	let state_mu = state.clone();
	let on_mouseup = move |_: MouseEvent| {
		if let Some(ref mut s) = *state_mu.borrow_mut() {
			s.pointer_up(MOUSE_POINTER);
		}
	};

	let state_ml = state.clone();
	let on_mouseleave = move |_: MouseEvent| {
		if let Some(ref mut s) = *state_ml.borrow_mut() {
			s.pointer_up(MOUSE_POINTER);
		}
	};

	let state_ts = state.clone();
	let on_touchstart = move |ev: TouchEvent| {
		let touches = ev.changed_touches();
		let mut consumed = false;
		if let Some(ref mut s) = *state_ts.borrow_mut() {
			for touch in (0..touches.length()).filter_map(|i| touches.get(i)) {
				let Some((x, y)) = local_point(touch.client_x(), touch.client_y()) else {
					continue;
				};
				consumed |= s.pointer_down(touch.identifier(), x, y) != PointerAction::Missed;
			}
		}
		if consumed {
			ev.prevent_default();
		}
	};

	let state_tm = state.clone();
	let on_touchmove = move |ev: TouchEvent| {
		let touches = ev.changed_touches();
		if let Some(ref mut s) = *state_tm.borrow_mut() {
			if !s.is_dragging() {
				return;
			}
			ev.prevent_default();
			for touch in (0..touches.length()).filter_map(|i| touches.get(i)) {
				if let Some((x, y)) = local_point(touch.client_x(), touch.client_y()) {
					s.pointer_move(touch.identifier(), x, y);
				}
			}
		}
	};

	let state_te = state.clone();
	let on_touchend = move |ev: TouchEvent| {
		let touches = ev.changed_touches();
		if let Some(ref mut s) = *state_te.borrow_mut() {
			for touch in (0..touches.length()).filter_map(|i| touches.get(i)) {
				s.pointer_up(touch.identifier());
			}
		}
	};
	let on_touchcancel = on_touchend.clone();

	view! {
		<canvas
			node_ref=canvas_ref
			class="force-graph-canvas"
			on:mousedown=on_mousedown
			on:mousemove=on_mousemove
			on:mouseup=on_mouseup
			on:mouseleave=on_mouseleave
			on:touchstart=on_touchstart
			on:touchmove=on_touchmove
			on:touchend=on_touchend
			on:touchcancel=on_touchcancel
			style="display: block; cursor: grab; touch-action: none;"
		/>
	}
}
