//! ECharts force-layout graph series.

use std::collections::HashSet;

use log::info;
use serde::Serialize;
use serde_json::{Value, json};
use wasm_bindgen::JsValue;
use wasm_bindgen::closure::Closure;
use web_sys::HtmlElement;

use super::layout::seeded_point;
use super::{RenderBackend, RenderHandle, Scene, SurfaceEvents, js};
use crate::error::RenderError;
use crate::project::VisualizationLib;

const FALLBACK_TITLE: &str = "Graph visualization";
const SEED_WIDTH: f64 = 800.0;
const SEED_HEIGHT: f64 = 600.0;

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ItemStyle {
	pub color: String,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct LineStyle {
	pub color: String,
	pub width: f64,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChartNode {
	pub id: String,
	/// Display name, unique within the series.
	pub name: String,
	pub symbol_size: f64,
	pub item_style: ItemStyle,
	pub x: f64,
	pub y: f64,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChartLink {
	pub source: String,
	pub target: String,
	pub line_style: LineStyle,
}

/// Series nodes. ECharts keys nodes by name, so repeated labels get `_1`,
/// `_2`... suffixes.
pub fn chart_nodes(scene: &Scene) -> Vec<ChartNode> {
	let mut names: HashSet<String> = HashSet::new();
	scene
		.nodes
		.iter()
		.enumerate()
		.map(|(i, node)| {
			let base = if node.label.is_empty() { &node.id } else { &node.label };
			let mut name = base.clone();
			let mut n = 1;
			while names.contains(&name) {
				name = format!("{base}_{n}");
				n += 1;
			}
			names.insert(name.clone());

			let (x, y) = seeded_point(i, SEED_WIDTH, SEED_HEIGHT);
			ChartNode {
				id: node.id.clone(),
				name,
				symbol_size: (node.size * 2.0).max(20.0),
				item_style: ItemStyle {
					color: node.color.clone(),
				},
				x,
				y,
			}
		})
		.collect()
}

pub fn chart_links(scene: &Scene) -> Vec<ChartLink> {
	scene
		.links
		.iter()
		.map(|link| ChartLink {
			source: link.source.clone(),
			target: link.target.clone(),
			line_style: LineStyle {
				color: link.color.clone(),
				width: (link.weight.max(0.0).sqrt() * 2.0).max(1.0),
			},
		})
		.collect()
}

/// The complete `setOption` argument.
pub fn chart_option(scene: &Scene) -> Value {
	let title = if scene.title.trim().is_empty() { FALLBACK_TITLE } else { scene.title.as_str() };
	json!({
		"title": {
			"text": title,
			"left": "center",
			"textStyle": { "fontSize": 18, "fontWeight": "bold" }
		},
		"tooltip": { "trigger": "item" },
		"animationDurationUpdate": 1500,
		"animationEasingUpdate": "quinticInOut",
		"series": [{
			"name": "Graph",
			"type": "graph",
			"layout": "force",
			"data": chart_nodes(scene),
			"links": chart_links(scene),
			"roam": true,
			"draggable": true,
			"edgeSymbol": ["none", "arrow"],
			"itemStyle": {
				"borderColor": "#fff",
				"borderWidth": 2,
				"shadowBlur": 10,
				"shadowColor": "rgba(0, 0, 0, 0.3)"
			},
			"label": { "show": true, "position": "right", "formatter": "{b}", "fontSize": 12 },
			"lineStyle": { "curveness": 0.1, "opacity": 0.8 },
			"emphasis": { "focus": "adjacency", "lineStyle": { "width": 8 } },
			"force": {
				"repulsion": 1000,
				"gravity": 0.1,
				"edgeLength": 100,
				"layoutAnimation": true,
				"friction": 0.6
			}
		}]
	})
}

pub struct EChartsBackend {
	scripts: Vec<String>,
}

impl EChartsBackend {
	pub fn new(scripts: Vec<String>) -> Self {
		Self { scripts }
	}
}

impl RenderBackend for EChartsBackend {
	fn library(&self) -> VisualizationLib {
		VisualizationLib::ECharts
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
		let echarts = js::global("echarts")?;
		container.set_inner_html("");
		let chart = js::call(&echarts, "init", &[container.clone().into()])?;
		js::call(&chart, "setOption", &[js::to_js(&chart_option(scene))?, JsValue::TRUE])?;

		let events = events.clone();
		let on_click = Closure::<dyn FnMut(JsValue)>::new(move |params: JsValue| {
			let is_node = js::get(&params, "dataType")
				.ok()
				.and_then(|t| t.as_string())
				.is_some_and(|t| t == "node");
			if !is_node {
				return;
			}
			if let Some(id) = js::path(&params, &["data", "id"]).ok().and_then(|v| v.as_string()) {
				events.node_clicked(id);
			}
		});
		js::call(&chart, "on", &[JsValue::from_str("click"), on_click.as_ref().clone()])?;

		info!("toile: echarts mounted {} nodes", scene.nodes.len());
		Ok(Box::new(EChartsHandle {
			chart,
			_on_click: on_click,
		}))
	}
}

struct EChartsHandle {
	chart: JsValue,
	_on_click: Closure<dyn FnMut(JsValue)>,
}

impl RenderHandle for EChartsHandle {
	fn resize(&self) {
		let _ = js::call(&self.chart, "resize", &[]);
	}

	fn dispose(self: Box<Self>) {
		let _ = js::call(&self.chart, "off", &[JsValue::from_str("click")]);
		let _ = js::call(&self.chart, "dispose", &[]);
	}
}
