//! amCharts 5 force-directed hierarchy.
//!
//! The chart needs a tree, so links are read as parent (source) to child
//! (target) edges. Roots are nodes that are never a target and have at least
//! one child. Each node expands its children only at its first position in
//! the tree, which keeps cycles and shared children finite.

use std::collections::{HashMap, HashSet};

use log::info;
use serde::Serialize;
use serde_json::json;
use wasm_bindgen::JsValue;
use wasm_bindgen::closure::Closure;
use web_sys::HtmlElement;

use super::{RenderBackend, RenderHandle, Scene, SurfaceEvents, js};
use crate::error::RenderError;
use crate::project::VisualizationLib;

/// Synthetic root used when no node qualifies as a root.
pub const DATA_ROOT: &str = "Data";
/// Synthetic root used when several nodes qualify.
pub const GRAPH_ROOT: &str = "Graph";

const NODE_COLOR: &str = "#3498db";
const LINK_COLOR: &str = "#95a5a6";
const NODE_RADIUS: f64 = 40.0;

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TreeNode {
	pub name: String,
	pub value: u32,
	/// `false` for synthetic roots and placeholder endpoints.
	pub is_entity: bool,
	#[serde(skip_serializing_if = "Vec::is_empty")]
	pub children: Vec<TreeNode>,
}

/// Folds the scene into one tree.
pub fn build_tree(scene: &Scene) -> TreeNode {
	let order: Vec<&str> = scene.nodes.iter().map(|n| n.id.as_str()).collect();
	let entities: HashSet<&str> = scene
		.nodes
		.iter()
		.filter(|n| !n.placeholder)
		.map(|n| n.id.as_str())
		.collect();

	let mut children: HashMap<&str, Vec<&str>> = HashMap::new();
	let mut targets: HashSet<&str> = HashSet::new();
	for link in &scene.links {
		let list = children.entry(link.source.as_str()).or_default();
		if !list.contains(&link.target.as_str()) {
			list.push(link.target.as_str());
		}
		targets.insert(link.target.as_str());
	}

	let roots: Vec<&str> = order
		.iter()
		.copied()
		.filter(|id| !targets.contains(id) && children.get(id).is_some_and(|c| !c.is_empty()))
		.collect();

	let mut expanded: HashSet<&str> = HashSet::new();
	match roots.as_slice() {
		[] => TreeNode {
			name: DATA_ROOT.to_string(),
			value: 0,
			is_entity: false,
			children: order
				.iter()
				.map(|id| leaf(id, entities.contains(id)))
				.collect(),
		},
		[root] => expand(*root, &children, &entities, &mut expanded),
		many => TreeNode {
			name: GRAPH_ROOT.to_string(),
			value: 0,
			is_entity: false,
			children: many
				.iter()
				.map(|root| expand(*root, &children, &entities, &mut expanded))
				.collect(),
		},
	}
}

fn leaf(id: &str, is_entity: bool) -> TreeNode {
	TreeNode {
		name: id.to_string(),
		value: 1,
		is_entity,
		children: Vec::new(),
	}
}

/// Depth-first expansion from `root` on an explicit stack, so chain length
/// is bounded by memory rather than call depth. Children are attached at a
/// node's first visit only.
fn expand<'a>(
	root: &'a str,
	children: &HashMap<&'a str, Vec<&'a str>>,
	entities: &HashSet<&str>,
	expanded: &mut HashSet<&'a str>,
) -> TreeNode {
	// Parents always precede their children in `arena`.
	let mut arena: Vec<(&'a str, Vec<usize>)> = vec![(root, Vec::new())];
	let mut stack = vec![0];
	while let Some(at) = stack.pop() {
		let id = arena[at].0;
		if !expanded.insert(id) {
			continue;
		}
		let Some(kids) = children.get(id) else {
			continue;
		};
		let first = arena.len();
		arena.extend(kids.iter().map(|kid| (*kid, Vec::new())));
		arena[at].1 = (first..arena.len()).collect();
		stack.extend((first..arena.len()).rev());
	}

	let mut built: Vec<Option<TreeNode>> = (0..arena.len()).map(|_| None).collect();
	for (at, (id, kids)) in arena.iter().enumerate().rev() {
		let mut node = leaf(id, entities.contains(id));
		node.children = kids.iter().filter_map(|&kid| built[kid].take()).collect();
		built[at] = Some(node);
	}
	built
		.into_iter()
		.next()
		.flatten()
		.unwrap_or_else(|| leaf(root, entities.contains(root)))
}

pub struct HierarchyBackend {
	scripts: Vec<String>,
}

impl HierarchyBackend {
	pub fn new(scripts: Vec<String>) -> Self {
		Self { scripts }
	}
}

impl RenderBackend for HierarchyBackend {
	fn library(&self) -> VisualizationLib {
		VisualizationLib::AmChartsHierarchy
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
		let am5 = js::global("am5")?;
		let am5hierarchy = js::global("am5hierarchy")?;
		let animated = js::global("am5themes_Animated")?;
		container.set_inner_html("");

		let root = js::call(&js::get(&am5, "Root")?, "new", &[container.clone().into()])?;
		let theme = js::call(&animated, "new", &[root.clone()])?;
		js::call(&root, "setThemes", &[[theme].iter().collect::<js_sys::Array>().into()])?;

		let series_options = js::to_js(&json!({
			"singleBranchOnly": false,
			"downDepth": 2,
			"topDepth": 1,
			"initialDepth": 1,
			"valueField": "value",
			"categoryField": "name",
			"childDataField": "children",
			"idField": "name",
			"manyBodyStrength": -6,
			"centerStrength": 1.0,
			"nodePadding": 8,
			"minRadius": NODE_RADIUS,
			"maxRadius": NODE_RADIUS
		}))?;
		let series = js::call(
			&js::get(&am5hierarchy, "ForceDirected")?,
			"new",
			&[root.clone(), series_options],
		)?;
		let root_children = js::path(&root, &["container", "children"])?;
		js::call(&root_children, "push", &[series.clone()])?;

		let link_color = js::call(&am5, "color", &[JsValue::from_str(LINK_COLOR)])?;
		let link_style = js::to_js(&json!({ "strength": 0.5, "strokeWidth": 2 }))?;
		js::set(&link_style, "stroke", &link_color)?;
		js::call(&js::path(&series, &["links", "template"])?, "setAll", &[link_style])?;

		let node_template = js::path(&series, &["nodes", "template"])?;
		js::call(
			&node_template,
			"setAll",
			&[js::to_js(&json!({ "tooltipText": "{name}", "cursorOverStyle": "pointer" }))?],
		)?;
		if let Ok(background) = js::call(&node_template, "get", &[JsValue::from_str("background")]) {
			if !background.is_undefined() {
				let node_color = js::call(&am5, "color", &[JsValue::from_str(NODE_COLOR)])?;
				let style = js::to_js(&json!({ "fillOpacity": 0.8, "strokeWidth": 1, "strokeOpacity": 0.8 }))?;
				js::set(&style, "fill", &node_color)?;
				js::set(&style, "stroke", &node_color)?;
				js::call(&background, "setAll", &[style])?;
			}
		}

		let events = events.clone();
		let on_click = Closure::<dyn FnMut(JsValue)>::new(move |event: JsValue| {
			let Some(context) = js::path(&event, &["target", "dataItem", "dataContext"]).ok() else {
				return;
			};
			let is_entity = js::get(&context, "isEntity").ok().and_then(|v| v.as_bool());
			let name = js::get(&context, "name").ok().and_then(|v| v.as_string());
			if let (Some(true), Some(name)) = (is_entity, name) {
				events.node_clicked(name);
			}
		});
		js::call(
			&js::path(&node_template, &["events"])?,
			"on",
			&[JsValue::from_str("click"), on_click.as_ref().clone()],
		)?;

		let tree = build_tree(scene);
		let data = js::path(&series, &["data"])?;
		js::call(&data, "setAll", &[js::to_js(&[&tree])?])?;
		if let Ok(first) = js::path(&series, &["dataItems", "0"]) {
			js::call(&series, "set", &[JsValue::from_str("selectedDataItem"), first])?;
		}
		js::call(&series, "appear", &[JsValue::from_f64(700.0), JsValue::from_f64(70.0)])?;

		info!("toile: amcharts hierarchy mounted {} nodes", scene.nodes.len());
		Ok(Box::new(HierarchyHandle {
			root,
			_on_click: on_click,
		}))
	}
}

struct HierarchyHandle {
	root: JsValue,
	_on_click: Closure<dyn FnMut(JsValue)>,
}

impl RenderHandle for HierarchyHandle {
	fn resize(&self) {
		let _ = js::call(&self.root, "resize", &[]);
	}

	fn dispose(self: Box<Self>) {
		let _ = js::call(&self.root, "dispose", &[]);
	}
}
