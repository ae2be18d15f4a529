//! GoJS layered diagram.

use log::info;
use serde::Serialize;
use serde_json::json;
use wasm_bindgen::JsValue;
use wasm_bindgen::closure::Closure;
use web_sys::HtmlElement;

use super::layout::grid_point;
use super::{RenderBackend, RenderHandle, Scene, SurfaceEvents, js};
use crate::error::RenderError;
use crate::project::VisualizationLib;

const GRID_COLUMNS: usize = 5;
const GRID_DX: f64 = 150.0;
const GRID_DY: f64 = 100.0;
const CLICK_EVENT: &str = "ObjectSingleClicked";

/// One entry of the model's node array.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct DiagramNode {
	pub key: String,
	pub id: String,
	pub label: String,
	pub color: String,
	/// `"x y"`, as parsed by `go.Point.parse`.
	pub loc: String,
}

/// One entry of the model's link array.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct DiagramLink {
	pub key: String,
	pub from: String,
	pub to: String,
	pub color: String,
}

pub fn diagram_nodes(scene: &Scene) -> Vec<DiagramNode> {
	scene
		.nodes
		.iter()
		.enumerate()
		.map(|(i, node)| {
			let (x, y) = grid_point(i, GRID_COLUMNS, GRID_DX, GRID_DY);
			DiagramNode {
				key: node.id.clone(),
				id: node.id.clone(),
				label: if node.label.is_empty() { node.id.clone() } else { node.label.clone() },
				color: node.color.clone(),
				loc: format!("{x} {y}"),
			}
		})
		.collect()
}

/// Links keyed `link-<index>-<source>-<target>` so parallel edges stay distinct.
pub fn diagram_links(scene: &Scene) -> Vec<DiagramLink> {
	scene
		.links
		.iter()
		.enumerate()
		.map(|(i, link)| DiagramLink {
			key: format!("link-{i}-{}-{}", link.source, link.target),
			from: link.source.clone(),
			to: link.target.clone(),
			color: link.color.clone(),
		})
		.collect()
}

pub struct GoJsBackend {
	scripts: Vec<String>,
}

impl GoJsBackend {
	pub fn new(scripts: Vec<String>) -> Self {
		Self { scripts }
	}
}

/// `go.GraphObject.make(...)`.
fn make(go: &JsValue, args: &[JsValue]) -> Result<JsValue, RenderError> {
	js::call(&js::get(go, "GraphObject")?, "make", args)
}

fn class(go: &JsValue, name: &str) -> Result<JsValue, RenderError> {
	js::path(go, &[name])
}

fn binding(go: &JsValue, target: &str, source: &str) -> Result<JsValue, RenderError> {
	js::construct(
		&class(go, "Binding")?,
		&[JsValue::from_str(target), JsValue::from_str(source)],
	)
}

fn size(go: &JsValue, width: f64, height: f64) -> Result<JsValue, RenderError> {
	js::construct(&class(go, "Size")?, &[width.into(), height.into()])
}

fn node_template(go: &JsValue) -> Result<JsValue, RenderError> {
	let node_options = js::object();
	js::set(&node_options, "locationSpot", &js::path(go, &["Spot", "Center"])?)?;
	js::set(&node_options, "desiredSize", &size(go, 120.0, 60.0)?)?;

	let location = js::construct(
		&class(go, "Binding")?,
		&[
			JsValue::from_str("location"),
			JsValue::from_str("loc"),
			js::path(go, &["Point", "parse"])?,
		],
	)?;

	let shape = make(
		go,
		&[
			class(go, "Shape")?,
			JsValue::from_str("RoundedRectangle"),
			js::to_js(&json!({
				"name": "SHAPE",
				"fill": "lightblue",
				"stroke": "#1e3a8a",
				"strokeWidth": 2,
				"portId": "",
				"cursor": "pointer"
			}))?,
			binding(go, "fill", "color")?,
		],
	)?;

	let text_options = js::to_js(&json!({
		"font": "bold 11pt sans-serif",
		"stroke": "white",
		"textAlign": "center",
		"editable": false
	}))?;
	js::set(&text_options, "maxSize", &size(go, 110.0, f64::NAN)?)?;
	let text = make(go, &[class(go, "TextBlock")?, text_options, binding(go, "text", "label")?])?;

	make(
		go,
		&[class(go, "Node")?, JsValue::from_str("Auto"), node_options, location, shape, text],
	)
}

fn link_template(go: &JsValue) -> Result<JsValue, RenderError> {
	let line = make(
		go,
		&[
			class(go, "Shape")?,
			js::to_js(&json!({ "strokeWidth": 2 }))?,
			binding(go, "stroke", "color")?,
		],
	)?;
	let arrow = make(
		go,
		&[
			class(go, "Shape")?,
			js::to_js(&json!({ "toArrow": "Standard", "strokeWidth": 0 }))?,
			binding(go, "fill", "color")?,
		],
	)?;
	make(
		go,
		&[
			class(go, "Link")?,
			js::to_js(&json!({ "corner": 3, "selectable": false }))?,
			line,
			arrow,
		],
	)
}

impl RenderBackend for GoJsBackend {
	fn library(&self) -> VisualizationLib {
		VisualizationLib::GoJs
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
		let go = js::global("go")?;
		container.set_inner_html("");

		let layout = make(
			&go,
			&[
				class(&go, "LayeredDigraphLayout")?,
				js::to_js(&json!({
					"direction": 90,
					"layerSpacing": 35,
					"columnSpacing": 15,
					"setsPortSpots": false
				}))?,
			],
		)?;
		let options = js::to_js(&json!({
			"undoManager.isEnabled": true,
			"animationManager.isEnabled": false,
			"allowCopy": false,
			"allowDelete": false,
			"hasHorizontalScrollbar": false,
			"hasVerticalScrollbar": false
		}))?;
		js::set(&options, "layout", &layout)?;
		js::set(&options, "contentAlignment", &js::path(&go, &["Spot", "Center"])?)?;

		let diagram = make(&go, &[class(&go, "Diagram")?, container.clone().into(), options])?;
		js::set(&diagram, "nodeTemplate", &node_template(&go)?)?;
		js::set(&diagram, "linkTemplate", &link_template(&go)?)?;

		let model = js::construct(
			&class(&go, "GraphLinksModel")?,
			&[js::to_js(&diagram_nodes(scene))?, js::to_js(&diagram_links(scene))?],
		)?;
		js::set(&diagram, "model", &model)?;

		let events = events.clone();
		let on_click = Closure::<dyn FnMut(JsValue)>::new(move |event: JsValue| {
			if let Some(id) = js::path(&event, &["subject", "part", "data", "id"])
				.ok()
				.and_then(|v| v.as_string())
			{
				events.node_clicked(id);
			}
		});
		js::call(
			&diagram,
			"addDiagramListener",
			&[JsValue::from_str(CLICK_EVENT), on_click.as_ref().clone()],
		)?;

		info!("toile: gojs mounted {} nodes", scene.nodes.len());
		Ok(Box::new(GoJsHandle {
			diagram,
			container: container.clone(),
			on_click,
		}))
	}
}

struct GoJsHandle {
	diagram: JsValue,
	container: HtmlElement,
	on_click: Closure<dyn FnMut(JsValue)>,
}

impl RenderHandle for GoJsHandle {
	fn resize(&self) {
		let _ = js::call(&self.diagram, "requestUpdate", &[]);
	}

	fn dispose(self: Box<Self>) {
		let _ = js::call(
			&self.diagram,
			"removeDiagramListener",
			&[JsValue::from_str(CLICK_EVENT), self.on_click.as_ref().clone()],
		);
		let _ = js::set(&self.diagram, "div", &JsValue::NULL);
		self.container.set_inner_html("");
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::project::{NormalizedLink, NormalizedNode, RawRow};

	fn node(id: &str) -> NormalizedNode {
		NormalizedNode {
			id: id.into(),
			label: String::new(),
			color: "#FFB6C1".into(),
			size: 10.0,
			original_data: RawRow::new(),
			placeholder: true,
		}
	}

	fn link(source: &str, target: &str) -> NormalizedLink {
		NormalizedLink {
			source: source.into(),
			target: target.into(),
			weight: 1.0,
			color: "#6b7280".into(),
			original_data: RawRow::new(),
		}
	}

	#[test]
	fn nodes_sit_on_a_five_column_grid() {
		let scene = Scene {
			title: String::new(),
			nodes: (0..7).map(|i| node(&format!("n{i}"))).collect(),
			links: vec![],
		};
		let nodes = diagram_nodes(&scene);
		assert_eq!(nodes[0].loc, "0 0");
		assert_eq!(nodes[4].loc, "600 0");
		assert_eq!(nodes[6].loc, "150 100");
		assert_eq!(nodes[6].label, "n6");
		assert_eq!(nodes[6].key, nodes[6].id);
	}

	#[test]
	fn parallel_links_get_distinct_keys() {
		let scene = Scene {
			title: String::new(),
			nodes: vec![node("a"), node("b")],
			links: vec![link("a", "b"), link("a", "b")],
		};
		let keys: Vec<_> = diagram_links(&scene).into_iter().map(|l| l.key).collect();
		assert_eq!(keys, vec!["link-0-a-b", "link-1-a-b"]);
	}
}
