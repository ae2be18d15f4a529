//! Host element for whichever renderer the project selected.
//!
//! Each change of scene or library starts a new load: the live instance is
//! disposed, scripts are fetched, and the mount is installed only if no newer
//! load began meanwhile. Unmounting the component disposes whatever is live.

use std::rc::Rc;

use leptos::prelude::*;
use leptos::task::spawn_local;
use log::{debug, error};
use web_sys::HtmlElement;

use crate::config::AppConfig;
use crate::project::VisualizationLib;
use crate::render::script::load_scripts;
use crate::render::{Scene, SurfaceEvents, SurfaceSlot, backend_for};

#[derive(Clone, Debug, PartialEq)]
enum SurfaceStatus {
	Loading(&'static str),
	Ready,
	Failed(String),
}

impl SurfaceStatus {
	fn overlay(&self) -> Option<(&'static str, String)> {
		match self {
			SurfaceStatus::Loading(name) => Some(("surface-status", format!("Loading {name}..."))),
			SurfaceStatus::Ready => None,
			SurfaceStatus::Failed(message) => Some(("surface-status error", message.clone())),
		}
	}
}

#[component]
pub fn GraphSurface(
	#[prop(into)] scene: Signal<Scene>,
	#[prop(into)] library: Signal<VisualizationLib>,
	#[prop(into)] on_node_click: Callback<String>,
) -> impl IntoView {
	let config = use_context::<AppConfig>().unwrap_or_default();
	let container = NodeRef::<leptos::html::Div>::new();
	let slot = StoredValue::new_local(SurfaceSlot::new());
	let status = RwSignal::new(SurfaceStatus::Ready);

	Effect::new(move |_| {
		let scene = scene.get();
		let lib = library.get();
		let Some(element) = container.get() else {
			return;
		};
		let element: HtmlElement = element.into();
		let backend = backend_for(lib, &config);
		let Some(ticket) = slot.try_update_value(|s| s.begin()) else {
			return;
		};
		status.set(SurfaceStatus::Loading(lib.display_name()));

		let events = SurfaceEvents {
			on_node_click: Some(Rc::new(move |id| on_node_click.run(id))),
		};
		spawn_local(async move {
			if let Err(e) = load_scripts(&backend.scripts()).await {
				if slot.try_with_value(|s| s.is_current(ticket)).unwrap_or(false) {
					status.try_set(SurfaceStatus::Failed(e.to_string()));
				}
				return;
			}
			if !slot.try_with_value(|s| s.is_current(ticket)).unwrap_or(false) {
				debug!("toile: {} load superseded before mount", lib.key());
				return;
			}

			match backend.mount(&element, &scene, &events) {
				Ok(handle) => {
					let mut pending = Some(handle);
					let installed = slot
						.try_update_value(|s| pending.take().is_some_and(|h| s.install(ticket, h)))
						.unwrap_or(false);
					// The component went away while mounting.
					if let Some(handle) = pending {
						handle.dispose();
					}
					if installed {
						status.try_set(SurfaceStatus::Ready);
					}
				}
				Err(e) => {
					error!("toile: {} failed to mount: {e}", lib.key());
					status.try_set(SurfaceStatus::Failed(e.to_string()));
				}
			}
		});
	});

	let resize = window_event_listener(leptos::ev::resize, move |_| {
		slot.try_with_value(|s| s.resize());
	});
	on_cleanup(move || {
		resize.remove();
		slot.try_update_value(|s| s.clear());
	});

	view! {
		<div class="graph-surface">
			<div class="graph-container" node_ref=container></div>
			{move || {
				status
					.get()
					.overlay()
					.map(|(class, text)| view! { <div class=class>{text}</div> })
			}}
		</div>
	}
}
