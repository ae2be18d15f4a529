//! Simulation state and pointer interaction for the canvas backend.
//!
//! Wraps the `force_graph` physics simulation with per-node display data, the
//! pan/zoom transform and hover highlighting. Link styling lives beside the
//! simulation because the physics crate only needs endpoints.

use std::collections::{HashMap, HashSet};
use std::f64::consts::PI;

use force_graph::{DefaultNodeIdx, EdgeData, ForceGraph, NodeData, SimulationParameters};

use super::scale::{ScaleConfig, ScaledValues};
use super::theme::{Color, Theme};
use crate::project::reconcile_node_set;
use crate::render::Scene;

/// Pointer travel, in screen pixels, below which a press counts as a click.
pub const CLICK_SLOP: f64 = 4.0;

/// Per-node display data attached to each simulated node.
#[derive(Clone, Debug)]
pub struct NodeInfo {
	pub id: String,
	pub label: String,
	pub color: Color,
	/// Radius multiplier derived from the mapped size.
	pub size: f64,
	pub placeholder: bool,
}

/// A drawn link between two simulated nodes.
#[derive(Clone, Debug)]
pub struct EdgeLine {
	pub source: DefaultNodeIdx,
	pub target: DefaultNodeIdx,
	pub color: Color,
	/// Line width multiplier derived from the mapped weight.
	pub width: f64,
}

/// Pan and zoom transform applied to the entire graph view.
#[derive(Clone, Debug, Default)]
pub struct ViewTransform {
	pub x: f64,
	pub y: f64,
	/// Zoom factor (1.0 = 100%, clamped to 0.1..10.0).
	pub k: f64,
}

/// A pointer press on a node, which becomes a drag once it moves.
#[derive(Clone, Debug, Default)]
pub struct DragState {
	pub active: bool,
	pub node_idx: Option<DefaultNodeIdx>,
	pub start_x: f64,
	pub start_y: f64,
	pub node_start_x: f32,
	pub node_start_y: f32,
	/// Set once the pointer leaves the click slop.
	pub moved: bool,
}

#[derive(Clone, Debug, Default)]
pub struct PanState {
	pub active: bool,
	pub start_x: f64,
	pub start_y: f64,
	pub transform_start_x: f64,
	pub transform_start_y: f64,
}

/// Hovered node plus its neighbors, with intensities eased towards their
/// targets so highlights fade rather than flash.
#[derive(Clone, Debug, Default)]
pub struct HighlightState {
	pub hovered: Option<DefaultNodeIdx>,
	targets: HashSet<DefaultNodeIdx>,
	intensity: HashMap<DefaultNodeIdx, f64>,
	max: f64,
}

impl HighlightState {
	pub fn set_hover(&mut self, node: Option<DefaultNodeIdx>, edges: &[EdgeLine]) {
		if self.hovered == node {
			return;
		}
		self.hovered = node;
		self.targets.clear();
		if let Some(idx) = node {
			self.targets.insert(idx);
			for edge in edges {
				if edge.source == idx {
					self.targets.insert(edge.target);
				} else if edge.target == idx {
					self.targets.insert(edge.source);
				}
			}
		}
	}

	/// Exponential smoothing: `value += (target - value) * (1 - e^(-speed * dt))`.
	pub fn tick(&mut self, dt: f64) {
		const FADE_IN_SPEED: f64 = 6.0;
		const FADE_OUT_SPEED: f64 = 4.0;
		let fade_in = 1.0 - (-FADE_IN_SPEED * dt).exp();
		let fade_out = (-FADE_OUT_SPEED * dt).exp();

		for &idx in &self.targets {
			let value = self.intensity.entry(idx).or_insert(0.0);
			*value += (1.0 - *value) * fade_in;
		}

		let mut max: f64 = 0.0;
		let targets = &self.targets;
		self.intensity.retain(|idx, value| {
			if !targets.contains(idx) {
				*value *= fade_out;
			}
			max = max.max(*value);
			*value > 0.005
		});
		self.max = max;
	}

	pub fn node(&self, idx: DefaultNodeIdx) -> f64 {
		self.intensity.get(&idx).copied().unwrap_or(0.0)
	}

	/// Geometric mean of the endpoint intensities.
	pub fn edge(&self, a: DefaultNodeIdx, b: DefaultNodeIdx) -> f64 {
		(self.node(a) * self.node(b)).sqrt()
	}

	pub fn max(&self) -> f64 {
		self.max
	}
}

pub struct ForceGraphState {
	pub graph: ForceGraph<NodeInfo, ()>,
	pub edges: Vec<EdgeLine>,
	pub transform: ViewTransform,
	pub drag: DragState,
	pub pan: PanState,
	pub highlight: HighlightState,
	pub width: f64,
	pub height: f64,
	pub animation_running: bool,
	ids: HashMap<DefaultNodeIdx, String>,
}

impl ForceGraphState {
	/// Builds the simulation for `scene`. A repeated node id keeps its first
	/// node; links to unknown ids are not drawn.
	pub fn new(scene: &Scene, width: f64, height: f64, scale: &ScaleConfig, theme: &Theme) -> Self {
		let mut graph = ForceGraph::new(SimulationParameters {
			force_charge: 150.0,
			force_spring: 0.05,
			force_max: 100.0,
			node_speed: 3000.0,
			damping_factor: 0.9,
		});
		let index = reconcile_node_set(&scene.nodes, &[]);
		let mut handles = Vec::with_capacity(index.len());
		let mut ids = HashMap::new();

		let count = index.len().max(1) as f64;
		let ring = (count.sqrt() * 25.0).clamp(40.0, 300.0);
		for (i, node) in index.iter().enumerate() {
			let angle = i as f64 * 2.0 * PI / count;
			let idx = graph.add_node(NodeData {
				x: (ring * angle.cos()) as f32,
				y: (ring * angle.sin()) as f32,
				mass: 10.0,
				is_anchor: false,
				user_data: NodeInfo {
					id: node.id.clone(),
					label: if node.label.is_empty() { node.id.clone() } else { node.label.clone() },
					color: Color::parse(&node.color).unwrap_or(theme.node.fallback),
					size: scale.size_factor(node.size),
					placeholder: node.placeholder,
				},
			});
			handles.push(idx);
			ids.insert(idx, node.id.clone());
		}

		let mut edges = Vec::new();
		for link in &scene.links {
			let (Some(source), Some(target)) = (index.position(&link.source), index.position(&link.target))
			else {
				continue;
			};
			let (source, target) = (handles[source], handles[target]);
			// A self-loop has no length for the spring to act on.
			if source != target {
				graph.add_edge(source, target, EdgeData::default());
			}
			edges.push(EdgeLine {
				source,
				target,
				color: Color::parse(&link.color).unwrap_or(theme.edge.fallback),
				width: scale.weight_factor(link.weight),
			});
		}

		Self {
			graph,
			edges,
			transform: ViewTransform {
				x: width / 2.0,
				y: height / 2.0,
				k: 1.0,
			},
			drag: DragState::default(),
			pan: PanState::default(),
			highlight: HighlightState::default(),
			width,
			height,
			animation_running: true,
			ids,
		}
	}

	pub fn node_count(&self) -> usize {
		self.ids.len()
	}

	/// The data id of a simulated node.
	pub fn node_id(&self, idx: DefaultNodeIdx) -> Option<&str> {
		self.ids.get(&idx).map(String::as_str)
	}

	/// Current positions of every node, for passes that need both endpoints.
	pub fn positions(&self) -> HashMap<DefaultNodeIdx, (f64, f64)> {
		let mut out = HashMap::with_capacity(self.ids.len());
		self.graph.visit_nodes(|node| {
			out.insert(node.index(), (node.x() as f64, node.y() as f64));
		});
		out
	}

	pub fn screen_to_graph(&self, sx: f64, sy: f64) -> (f64, f64) {
		(
			(sx - self.transform.x) / self.transform.k,
			(sy - self.transform.y) / self.transform.k,
		)
	}

	/// The topmost node under a screen point.
	pub fn node_at_position(&self, sx: f64, sy: f64, config: &ScaleConfig) -> Option<DefaultNodeIdx> {
		let (gx, gy) = self.screen_to_graph(sx, sy);
		let scale = ScaledValues::new(config, self.transform.k);
		let mut found = None;
		self.graph.visit_nodes(|node| {
			let (dx, dy) = (node.x() as f64 - gx, node.y() as f64 - gy);
			let radius = scale.hit_radius.max(scale.node_radius * node.data.user_data.size);
			if (dx * dx + dy * dy).sqrt() < radius {
				found = Some(node.index());
			}
		});
		found
	}

	pub fn set_hover(&mut self, node: Option<DefaultNodeIdx>) {
		self.highlight.set_hover(node, &self.edges);
	}

	pub fn begin_drag(&mut self, idx: DefaultNodeIdx, x: f64, y: f64) {
		let mut start = (0.0, 0.0);
		self.graph.visit_nodes(|node| {
			if node.index() == idx {
				start = (node.x(), node.y());
			}
		});
		self.drag = DragState {
			active: true,
			node_idx: Some(idx),
			start_x: x,
			start_y: y,
			node_start_x: start.0,
			node_start_y: start.1,
			moved: false,
		};
	}

	/// Moves the dragged node to follow the pointer and pins it there.
	pub fn drag_to(&mut self, x: f64, y: f64) {
		let Some(idx) = self.drag.node_idx else {
			return;
		};
		let (sx, sy) = (x - self.drag.start_x, y - self.drag.start_y);
		if !self.drag.moved && (sx * sx + sy * sy).sqrt() < CLICK_SLOP {
			return;
		}
		self.drag.moved = true;
		let (nx, ny) = (
			self.drag.node_start_x + (sx / self.transform.k) as f32,
			self.drag.node_start_y + (sy / self.transform.k) as f32,
		);
		self.graph.visit_nodes_mut(|node| {
			if node.index() == idx {
				node.data.x = nx;
				node.data.y = ny;
				node.data.is_anchor = true;
			}
		});
	}

	/// Ends a press. Returns the pressed node when the pointer never left the
	/// click slop.
	pub fn release(&mut self) -> Option<DefaultNodeIdx> {
		let clicked = match (self.drag.active, self.drag.moved) {
			(true, false) => self.drag.node_idx,
			_ => None,
		};
		self.drag = DragState::default();
		self.pan.active = false;
		clicked
	}

	pub fn begin_pan(&mut self, x: f64, y: f64) {
		self.pan = PanState {
			active: true,
			start_x: x,
			start_y: y,
			transform_start_x: self.transform.x,
			transform_start_y: self.transform.y,
		};
	}

	pub fn pan_to(&mut self, x: f64, y: f64) {
		if self.pan.active {
			self.transform.x = self.pan.transform_start_x + (x - self.pan.start_x);
			self.transform.y = self.pan.transform_start_y + (y - self.pan.start_y);
		}
	}

	/// Zooms by `factor` keeping the screen point `(x, y)` fixed.
	pub fn zoom_at(&mut self, x: f64, y: f64, factor: f64) {
		let k = (self.transform.k * factor).clamp(0.1, 10.0);
		let ratio = k / self.transform.k;
		self.transform.x = x - (x - self.transform.x) * ratio;
		self.transform.y = y - (y - self.transform.y) * ratio;
		self.transform.k = k;
	}

	pub fn tick(&mut self, dt: f32) {
		if self.animation_running {
			self.graph.update(dt);
		}
		self.highlight.tick(dt as f64);
	}

	/// Keeps the graph origin at the center of the new size.
	pub fn resize(&mut self, width: f64, height: f64) {
		self.transform.x += (width - self.width) / 2.0;
		self.transform.y += (height - self.height) / 2.0;
		self.width = width;
		self.height = height;
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::project::{NormalizedLink, NormalizedNode, RawRow, placeholder_node};

	fn node(id: &str, size: f64) -> NormalizedNode {
		NormalizedNode {
			id: id.into(),
			label: String::new(),
			color: "#3b82f6".into(),
			size,
			original_data: RawRow::new(),
			placeholder: false,
		}
	}

	fn link(source: &str, target: &str, weight: f64) -> NormalizedLink {
		NormalizedLink {
			source: source.into(),
			target: target.into(),
			weight,
			color: "not-a-color".into(),
			original_data: RawRow::new(),
		}
	}

	fn state(scene: &Scene) -> ForceGraphState {
		ForceGraphState::new(scene, 800.0, 600.0, &ScaleConfig::default(), &Theme::light())
	}

	fn index_of(state: &ForceGraphState, id: &str) -> DefaultNodeIdx {
		let mut found = None;
		state.graph.visit_nodes(|n| {
			if n.data.user_data.id == id {
				found = Some(n.index());
			}
		});
		found.expect("node present")
	}

	#[test]
	fn builds_nodes_and_styled_edges() {
		let scene = Scene {
			title: String::new(),
			nodes: vec![node("a", 20.0), node("b", 10.0), node("a", 99.0), placeholder_node("p")],
			links: vec![link("a", "b", 4.0), link("b", "ghost", 1.0), link("p", "p", 1.0)],
		};
		let state = state(&scene);
		assert_eq!(state.node_count(), 3);
		assert_eq!(state.edges.len(), 2);
		assert_eq!(state.edges[0].width, 2.0);
		assert_eq!(state.edges[0].color, Theme::light().edge.fallback);

		let a = index_of(&state, "a");
		assert_eq!(state.node_id(a), Some("a"));
		state.graph.visit_nodes(|n| {
			let info = &n.data.user_data;
			match info.id.as_str() {
				"a" => {
					assert_eq!(info.size, 2.0);
					assert_eq!(info.label, "a");
				}
				"p" => assert!(info.placeholder),
				_ => {}
			}
		});
	}

	#[test]
	fn press_without_motion_is_a_click() {
		let scene = Scene {
			title: String::new(),
			nodes: vec![node("a", 10.0)],
			links: vec![],
		};
		let mut state = state(&scene);
		let a = index_of(&state, "a");

		state.begin_drag(a, 100.0, 100.0);
		state.drag_to(102.0, 101.0);
		assert_eq!(state.release(), Some(a));

		state.begin_drag(a, 100.0, 100.0);
		state.drag_to(140.0, 100.0);
		assert_eq!(state.release(), None);
		state.graph.visit_nodes(|n| assert!(n.data.is_anchor));
	}

	#[test]
	fn hit_testing_follows_the_view_transform() {
		let scene = Scene {
			title: String::new(),
			nodes: vec![node("only", 10.0)],
			links: vec![],
		};
		let mut state = state(&scene);
		let config = ScaleConfig::default();
		let (x, y) = state.positions()[&index_of(&state, "only")];
		let (sx, sy) = (x + state.transform.x, y + state.transform.y);
		assert!(state.node_at_position(sx, sy, &config).is_some());
		assert!(state.node_at_position(sx + 200.0, sy, &config).is_none());

		state.zoom_at(sx, sy, 2.0);
		assert_eq!(state.transform.k, 2.0);
		assert!(state.node_at_position(sx, sy, &config).is_some());
	}

	#[test]
	fn highlight_covers_neighbors_and_fades() {
		let scene = Scene {
			title: String::new(),
			nodes: vec![node("a", 10.0), node("b", 10.0), node("c", 10.0)],
			links: vec![link("a", "b", 1.0)],
		};
		let mut state = state(&scene);
		let (a, b, c) = (index_of(&state, "a"), index_of(&state, "b"), index_of(&state, "c"));
		state.set_hover(Some(a));
		for _ in 0..30 {
			state.highlight.tick(0.016);
		}
		assert!(state.highlight.node(b) > 0.9);
		assert_eq!(state.highlight.node(c), 0.0);

		state.set_hover(None);
		for _ in 0..200 {
			state.highlight.tick(0.016);
		}
		assert_eq!(state.highlight.max(), 0.0);
	}
}
