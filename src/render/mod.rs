//! Rendering backends for the visible subgraph.
//!
//! Every backend implements [`RenderBackend`]: given a container element and
//! a [`Scene`], it builds its own drawing surface and returns a
//! [`RenderHandle`] that owns the live instance until disposed. Backends are
//! picked by [`backend_for`] from the project's [`VisualizationLib`].
//! The host component never looks inside a handle; it only forwards resizes
//! and disposes it through a [`SurfaceSlot`].

use std::rc::Rc;

use web_sys::HtmlElement;

use crate::components::force_graph::ForceBackend;
use crate::config::AppConfig;
use crate::error::RenderError;
use crate::project::{NormalizedLink, NormalizedNode, VisibleSubgraph, VisualizationLib};

pub mod echarts;
pub mod gojs;
pub mod hierarchy;
pub mod jointjs;
pub mod js;
pub mod layout;
pub mod lifecycle;
pub mod script;

pub use lifecycle::{LoadTicket, SurfaceSlot};

/// What a backend draws: the reconciled, filtered subgraph plus a title.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Scene {
	pub title: String,
	pub nodes: Vec<NormalizedNode>,
	pub links: Vec<NormalizedLink>,
}

impl Scene {
	pub fn new(title: impl Into<String>, visible: VisibleSubgraph) -> Self {
		Self {
			title: title.into(),
			nodes: visible.nodes,
			links: visible.links,
		}
	}
}

/// Callback receiving the id of a clicked node.
pub type NodeClick = Rc<dyn Fn(String)>;

/// Events a surface reports back to the page.
#[derive(Clone, Default)]
pub struct SurfaceEvents {
	pub on_node_click: Option<NodeClick>,
}

impl SurfaceEvents {
	pub fn node_clicked(&self, id: impl Into<String>) {
		if let Some(callback) = &self.on_node_click {
			callback(id.into());
		}
	}
}

/// A live rendering instance.
pub trait RenderHandle {
	/// The container changed size.
	fn resize(&self);
	/// Releases every engine resource, listener and frame callback.
	fn dispose(self: Box<Self>);
}

/// One drawing engine.
pub trait RenderBackend {
	fn library(&self) -> VisualizationLib;

	/// Script URLs that must be loaded before [`RenderBackend::mount`].
	fn scripts(&self) -> Vec<String>;

	/// Draws `scene` into `container`, which the backend may clear.
	fn mount(
		&self,
		container: &HtmlElement,
		scene: &Scene,
		events: &SurfaceEvents,
	) -> Result<Box<dyn RenderHandle>, RenderError>;
}

/// The backend registered for `lib`.
pub fn backend_for(lib: VisualizationLib, config: &AppConfig) -> Rc<dyn RenderBackend> {
	let scripts = config.scripts.for_library(lib).to_vec();
	match lib {
		VisualizationLib::Force => Rc::new(ForceBackend::new(&config.theme)),
		VisualizationLib::ECharts => Rc::new(echarts::EChartsBackend::new(scripts)),
		VisualizationLib::GoJs => Rc::new(gojs::GoJsBackend::new(scripts)),
		VisualizationLib::AmChartsHierarchy => Rc::new(hierarchy::HierarchyBackend::new(scripts)),
		VisualizationLib::JointJs => Rc::new(jointjs::JointJsBackend::new(scripts)),
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn registry_covers_every_library() {
		let config = AppConfig::default();
		for lib in VisualizationLib::ALL {
			let backend = backend_for(lib, &config);
			assert_eq!(backend.library(), lib);
			assert_eq!(backend.scripts().is_empty(), lib == VisualizationLib::Force);
		}
	}

	#[test]
	fn node_clicks_reach_the_callback() {
		let clicked = Rc::new(std::cell::RefCell::new(Vec::new()));
		let sink = clicked.clone();
		let events = SurfaceEvents {
			on_node_click: Some(Rc::new(move |id| sink.borrow_mut().push(id))),
		};
		events.node_clicked("n1");
		SurfaceEvents::default().node_clicked("ignored");
		assert_eq!(*clicked.borrow(), vec!["n1".to_string()]);
	}
}
