//! JointJS diagram with orthogonally routed links.

use std::cell::Cell;
use std::rc::Rc;

use log::info;
use serde::Serialize;
use serde_json::{Value, json};
use wasm_bindgen::closure::Closure;
use wasm_bindgen::{JsCast, JsValue};
use web_sys::{HtmlElement, WheelEvent};

use super::layout::Scatter;
use super::{RenderBackend, RenderHandle, Scene, SurfaceEvents, js};
use crate::error::RenderError;
use crate::project::VisualizationLib;

const NODE_WIDTH: f64 = 100.0;
const NODE_HEIGHT: f64 = 60.0;
const PAPER_HEIGHT: f64 = 600.0;
const LABEL_CHARS: usize = 10;
const MIN_SCALE: f64 = 0.2;
const MAX_SCALE: f64 = 3.0;

fn scatter() -> Scatter {
	Scatter {
		width: 800.0,
		height: PAPER_HEIGHT,
		item_width: NODE_WIDTH,
		item_height: NODE_HEIGHT,
		margin: 50.0,
		min_distance: 150.0,
		attempts: 50,
	}
}

/// Long ids are cut to ten characters plus an ellipsis.
pub fn short_label(text: &str) -> String {
	if text.chars().count() > LABEL_CHARS {
		format!("{}...", text.chars().take(LABEL_CHARS).collect::<String>())
	} else {
		text.to_string()
	}
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Point {
	pub x: f64,
	pub y: f64,
}

/// A `standard.Rectangle` cell.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ElementCell {
	#[serde(rename = "type")]
	pub kind: &'static str,
	pub id: String,
	/// Id of the graph node this cell draws.
	pub node_id: String,
	pub position: Point,
	pub size: Value,
	pub attrs: Value,
}

/// A `standard.Link` cell.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct LinkCell {
	#[serde(rename = "type")]
	pub kind: &'static str,
	pub id: String,
	pub source: Value,
	pub target: Value,
	pub attrs: Value,
}

/// Cell id of the `index`-th node. Node ids may be empty or collide with
/// link ids, so cells get their own.
fn element_id(index: usize) -> String {
	format!("node-{index}")
}

pub fn element_cells(scene: &Scene) -> Vec<ElementCell> {
	let positions = scatter().place(scene.nodes.len());
	scene
		.nodes
		.iter()
		.zip(positions)
		.enumerate()
		.map(|(i, (node, (x, y)))| ElementCell {
			kind: "standard.Rectangle",
			id: element_id(i),
			node_id: node.id.clone(),
			position: Point { x, y },
			size: json!({ "width": NODE_WIDTH, "height": NODE_HEIGHT }),
			attrs: json!({
				"body": {
					"fill": node.color,
					"stroke": "#2c3e50",
					"strokeWidth": 2,
					"rx": 8,
					"ry": 8
				},
				"label": {
					"text": short_label(&node.id),
					"fill": "white",
					"fontSize": 12,
					"fontWeight": "bold"
				}
			}),
		})
		.collect()
}

/// Links between drawn elements. A link whose endpoint has no element is skipped.
pub fn link_cells(scene: &Scene) -> Vec<LinkCell> {
	let index = crate::project::reconcile_node_set(&scene.nodes, &[]);
	scene
		.links
		.iter()
		.enumerate()
		.filter_map(|(i, link)| {
			let source = index.position(&link.source)?;
			let target = index.position(&link.target)?;
			Some(LinkCell {
				kind: "standard.Link",
				id: format!("link-{i}"),
				source: json!({ "id": element_id(source) }),
				target: json!({ "id": element_id(target) }),
				attrs: json!({
					"line": {
						"stroke": link.color,
						"strokeWidth": 2,
						"targetMarker": { "type": "path", "d": "M 10 -5 0 0 10 5 z", "fill": link.color }
					}
				}),
			})
		})
		.collect()
}

fn paper_options() -> Value {
	json!({
		"width": "100%",
		"height": PAPER_HEIGHT,
		"gridSize": 20,
		"drawGrid": true,
		"background": { "color": "#f8f9fa" },
		"defaultRouter": { "name": "manhattan", "args": { "padding": 20, "step": 20 } },
		"defaultConnector": { "name": "rounded", "args": { "radius": 10 } },
		"interactive": {
			"linkMove": false,
			"elementMove": true,
			"arrowheadMove": false,
			"vertexMove": false,
			"vertexAdd": false,
			"vertexRemove": false
		}
	})
}

pub struct JointJsBackend {
	scripts: Vec<String>,
}

impl JointJsBackend {
	pub fn new(scripts: Vec<String>) -> Self {
		Self { scripts }
	}
}

impl RenderBackend for JointJsBackend {
	fn library(&self) -> VisualizationLib {
		VisualizationLib::JointJs
	}

	fn scripts(&self) -> Vec<String> {
		self.scripts.clone()
	}

	fn mount(
		&self,
		container: &HtmlElement,
		scene: &Scene,
		events: &SurfaceEvents,
	) -> Result<Box<dyn RenderHandle>, RenderError> {
		let joint = js::global("joint")?;
		let shapes = js::get(&joint, "shapes")?;
		container.set_inner_html("");

		let graph_options = js::object();
		js::set(&graph_options, "cellNamespace", &shapes)?;
		let graph = js::construct(&js::path(&joint, &["dia", "Graph"])?, &[js::object(), graph_options])?;

		let options = js::to_js(&paper_options())?;
		js::set(&options, "el", container)?;
		js::set(&options, "model", &graph)?;
		js::set(&options, "cellViewNamespace", &shapes)?;
		let paper = js::construct(&js::path(&joint, &["dia", "Paper"])?, &[options])?;

		let elements = element_cells(scene);
		let links = link_cells(scene);
		// Elements must precede the links that point at them.
		let cells: Vec<Value> = elements
			.iter()
			.map(|e| json!(e))
			.chain(links.iter().map(|l| json!(l)))
			.collect();
		let cells = json!({ "cells": cells });
		js::call(&graph, "fromJSON", &[js::to_js(&cells)?])?;

		let events = events.clone();
		let on_click = Closure::<dyn FnMut(JsValue)>::new(move |view: JsValue| {
			let Ok(model) = js::get(&view, "model") else {
				return;
			};
			if let Some(id) = js::call(&model, "get", &[JsValue::from_str("nodeId")])
				.ok()
				.and_then(|v| v.as_string())
			{
				events.node_clicked(id);
			}
		});
		js::call(
			&paper,
			"on",
			&[JsValue::from_str("element:pointerclick"), on_click.as_ref().clone()],
		)?;

		let scale = Rc::new(Cell::new(1.0_f64));
		let (paper_zoom, scale_zoom) = (paper.clone(), scale.clone());
		let on_wheel = Closure::<dyn FnMut(WheelEvent)>::new(move |ev: WheelEvent| {
			ev.prevent_default();
			let factor = if ev.delta_y() > 0.0 { 0.9 } else { 1.1 };
			let next = (scale_zoom.get() * factor).clamp(MIN_SCALE, MAX_SCALE);
			scale_zoom.set(next);
			let _ = js::call(&paper_zoom, "scale", &[next.into(), next.into()]);
		});
		container.add_event_listener_with_callback("wheel", on_wheel.as_ref().unchecked_ref())?;

		info!(
			"toile: jointjs mounted {} elements, {} links",
			elements.len(),
			links.len()
		);
		Ok(Box::new(JointJsHandle {
			graph,
			paper,
			container: container.clone(),
			_on_click: on_click,
			on_wheel,
		}))
	}
}

struct JointJsHandle {
	graph: JsValue,
	paper: JsValue,
	container: HtmlElement,
	_on_click: Closure<dyn FnMut(JsValue)>,
	on_wheel: Closure<dyn FnMut(WheelEvent)>,
}

impl RenderHandle for JointJsHandle {
	fn resize(&self) {
		let width = self.container.client_width() as f64;
		let _ = js::call(&self.paper, "setDimensions", &[width.into(), PAPER_HEIGHT.into()]);
	}

	fn dispose(self: Box<Self>) {
		let _ = self
			.container
			.remove_event_listener_with_callback("wheel", self.on_wheel.as_ref().unchecked_ref());
		let _ = js::call(&self.paper, "off", &[]);
		let _ = js::call(&self.paper, "remove", &[]);
		let _ = js::call(&self.graph, "clear", &[]);
		self.container.set_inner_html("");
	}
}
