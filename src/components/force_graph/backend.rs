//! The canvas backend: mounts a `<canvas>` into the surface container and
//! drives it imperatively.
//!
//! Mouse and wheel handlers handle node dragging, panning and zooming. An
//! animation loop runs via `requestAnimationFrame`, stepping the physics
//! simulation and redrawing each frame until the handle is disposed.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use log::{debug, info};
use wasm_bindgen::prelude::*;
use web_sys::{CanvasRenderingContext2d, HtmlCanvasElement, HtmlElement, MouseEvent, WheelEvent};

use super::render;
use super::scale::ScaleConfig;
use super::state::ForceGraphState;
use super::theme::Theme;
use crate::error::RenderError;
use crate::project::VisualizationLib;
use crate::render::{RenderBackend, RenderHandle, Scene, SurfaceEvents};

const FALLBACK_WIDTH: f64 = 800.0;
const FALLBACK_HEIGHT: f64 = 600.0;
const FRAME_DT: f32 = 0.016;
const MOUSE_EVENTS: [&str; 4] = ["mousedown", "mousemove", "mouseup", "mouseleave"];

/// Canvas size for a container, falling back when it has not been laid out.
pub fn fit_size(client_width: i32, client_height: i32) -> (f64, f64) {
	let pick = |value: i32, fallback: f64| if value > 0 { value as f64 } else { fallback };
	(pick(client_width, FALLBACK_WIDTH), pick(client_height, FALLBACK_HEIGHT))
}

/// Bundles graph simulation state with visual configuration.
struct GraphContext {
	state: ForceGraphState,
	scale: ScaleConfig,
	theme: Theme,
}

/// Native force-directed layout drawn on a 2D canvas. Needs no scripts.
pub struct ForceBackend {
	theme: Theme,
}

impl ForceBackend {
	pub fn new(theme_name: &str) -> Self {
		Self {
			theme: Theme::by_name(theme_name),
		}
	}
}

fn pointer(canvas: &HtmlCanvasElement, ev: &MouseEvent) -> (f64, f64) {
	let rect = canvas.get_bounding_client_rect();
	(ev.client_x() as f64 - rect.left(), ev.client_y() as f64 - rect.top())
}

impl RenderBackend for ForceBackend {
	fn library(&self) -> VisualizationLib {
		VisualizationLib::Force
	}

	fn scripts(&self) -> Vec<String> {
		Vec::new()
	}

	fn mount(
		&self,
		container: &HtmlElement,
		scene: &Scene,
		events: &SurfaceEvents,
	) -> Result<Box<dyn RenderHandle>, RenderError> {
		let window = web_sys::window().ok_or(RenderError::Dom("window"))?;
		let document = container.owner_document().ok_or(RenderError::Dom("document"))?;
		let canvas: HtmlCanvasElement = document
			.create_element("canvas")?
			.dyn_into()
			.map_err(|_| RenderError::Dom("canvas element"))?;
		canvas.set_class_name("force-graph-canvas");
		canvas.style().set_property("display", "block")?;
		canvas.style().set_property("cursor", "grab")?;
		container.set_inner_html("");
		container.append_child(&canvas)?;

		let (w, h) = fit_size(container.client_width(), container.client_height());
		canvas.set_width(w as u32);
		canvas.set_height(h as u32);

		let ctx: CanvasRenderingContext2d = canvas
			.get_context("2d")?
			.ok_or(RenderError::Dom("2d context"))?
			.dyn_into()
			.map_err(|_| RenderError::Dom("2d context"))?;

		let scale = ScaleConfig::default();
		let context = Rc::new(RefCell::new(GraphContext {
			state: ForceGraphState::new(scene, w, h, &scale, &self.theme),
			scale,
			theme: self.theme.clone(),
		}));

		let mut mouse: Vec<(&'static str, Closure<dyn FnMut(MouseEvent)>)> = Vec::new();

		let (context_md, canvas_md) = (context.clone(), canvas.clone());
		mouse.push((
			MOUSE_EVENTS[0],
			Closure::new(move |ev: MouseEvent| {
				let (x, y) = pointer(&canvas_md, &ev);
				let mut c = context_md.borrow_mut();
				let c = &mut *c;
				match c.state.node_at_position(x, y, &c.scale) {
					Some(idx) => c.state.begin_drag(idx, x, y),
					None => c.state.begin_pan(x, y),
				}
				let _ = canvas_md.style().set_property("cursor", "grabbing");
			}),
		));

		let (context_mm, canvas_mm) = (context.clone(), canvas.clone());
		mouse.push((
			MOUSE_EVENTS[1],
			Closure::new(move |ev: MouseEvent| {
				let (x, y) = pointer(&canvas_mm, &ev);
				let mut c = context_mm.borrow_mut();
				let c = &mut *c;
				if c.state.drag.active {
					c.state.drag_to(x, y);
				} else {
					let hovered = c.state.node_at_position(x, y, &c.scale);
					c.state.set_hover(hovered);
					c.state.pan_to(x, y);
				}
			}),
		));

		let (context_mu, canvas_mu, events_mu) = (context.clone(), canvas.clone(), events.clone());
		mouse.push((
			MOUSE_EVENTS[2],
			Closure::new(move |_: MouseEvent| {
				let clicked = {
					let mut c = context_mu.borrow_mut();
					c.state
						.release()
						.and_then(|idx| c.state.node_id(idx).map(str::to_string))
				};
				let _ = canvas_mu.style().set_property("cursor", "grab");
				if let Some(id) = clicked {
					debug!("toile: canvas node clicked {id:?}");
					events_mu.node_clicked(id);
				}
			}),
		));

		let context_ml = context.clone();
		mouse.push((
			MOUSE_EVENTS[3],
			Closure::new(move |_: MouseEvent| {
				let mut c = context_ml.borrow_mut();
				c.state.release();
				c.state.set_hover(None);
			}),
		));

		for (name, handler) in &mouse {
			canvas.add_event_listener_with_callback(name, handler.as_ref().unchecked_ref())?;
		}

		let (context_wh, canvas_wh) = (context.clone(), canvas.clone());
		let wheel = Closure::<dyn FnMut(WheelEvent)>::new(move |ev: WheelEvent| {
			ev.prevent_default();
			let (x, y) = pointer(&canvas_wh, &ev);
			let factor = if ev.delta_y() > 0.0 { 0.9 } else { 1.1 };
			context_wh.borrow_mut().state.zoom_at(x, y, factor);
		});
		canvas.add_event_listener_with_callback("wheel", wheel.as_ref().unchecked_ref())?;

		let running = Rc::new(Cell::new(true));
		let frame_id: Rc<Cell<Option<i32>>> = Rc::new(Cell::new(None));
		let animate: Rc<RefCell<Option<Closure<dyn FnMut()>>>> = Rc::new(RefCell::new(None));
		let (context_anim, animate_inner, running_anim, frame_anim) =
			(context.clone(), animate.clone(), running.clone(), frame_id.clone());
		let window_anim = window.clone();
		*animate.borrow_mut() = Some(Closure::new(move || {
			if !running_anim.get() {
				return;
			}
			{
				let mut c = context_anim.borrow_mut();
				c.state.tick(FRAME_DT);
				render::render(&c.state, &ctx, &c.scale, &c.theme);
			}
			if let Some(cb) = animate_inner.borrow().as_ref() {
				frame_anim.set(window_anim.request_animation_frame(cb.as_ref().unchecked_ref()).ok());
			}
		}));
		if let Some(cb) = animate.borrow().as_ref() {
			frame_id.set(Some(window.request_animation_frame(cb.as_ref().unchecked_ref())?));
		}

		info!(
			"toile: canvas mounted {} nodes, {} links at {}x{}",
			context.borrow().state.node_count(),
			context.borrow().state.edges.len(),
			w,
			h
		);
		Ok(Box::new(ForceHandle {
			window,
			container: container.clone(),
			canvas,
			context,
			mouse,
			wheel,
			animate,
			frame_id,
			running,
		}))
	}
}

struct ForceHandle {
	window: web_sys::Window,
	container: HtmlElement,
	canvas: HtmlCanvasElement,
	context: Rc<RefCell<GraphContext>>,
	mouse: Vec<(&'static str, Closure<dyn FnMut(MouseEvent)>)>,
	wheel: Closure<dyn FnMut(WheelEvent)>,
	animate: Rc<RefCell<Option<Closure<dyn FnMut()>>>>,
	frame_id: Rc<Cell<Option<i32>>>,
	running: Rc<Cell<bool>>,
}

impl RenderHandle for ForceHandle {
	fn resize(&self) {
		let (w, h) = fit_size(self.container.client_width(), self.container.client_height());
		self.canvas.set_width(w as u32);
		self.canvas.set_height(h as u32);
		self.context.borrow_mut().state.resize(w, h);
	}

	fn dispose(self: Box<Self>) {
		self.running.set(false);
		if let Some(id) = self.frame_id.take() {
			let _ = self.window.cancel_animation_frame(id);
		}
		for (name, handler) in &self.mouse {
			let _ = self
				.canvas
				.remove_event_listener_with_callback(name, handler.as_ref().unchecked_ref());
		}
		let _ = self
			.canvas
			.remove_event_listener_with_callback("wheel", self.wheel.as_ref().unchecked_ref());
		// The frame closure holds a reference to its own cell.
		self.animate.borrow_mut().take();
		self.canvas.remove();
		debug!("toile: canvas disposed");
	}
}
