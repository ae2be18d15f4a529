//! toile-graph: turn tabular entity and link data into an interactive
//! node-link graph in the browser.
//!
//! A four-step wizard collects project settings, imports a CSV pair or an
//! exported project, maps columns onto graph fields and filters, then renders
//! the visible subgraph with one of several drawing backends.

use leptos::prelude::*;
use leptos_meta::*;
use log::{Level, info};

pub mod components;
pub mod config;
pub mod error;
pub mod project;
pub mod render;

use components::{
	ImportScreen, MappingScreen, SettingsScreen, StepIndicator, VisualizationScreen,
};
use config::load_app_config;
use project::{ProjectState, Stage};

/// Initialize logging and panic hooks for the WASM target.
pub fn init_logging() {
	let _ = console_log::init_with_level(Level::Debug);
	console_error_panic_hook::set_once();
	info!("toile: logging initialized");
}

/// Main application component.
/// Holds the project state and shows the screen for its current stage.
#[component]
pub fn App() -> impl IntoView {
	provide_meta_context();

	let config = load_app_config();
	let theme = config.theme.clone();
	provide_context(config);

	let state = RwSignal::new(ProjectState::default());
	let stage = Memo::new(move |_| state.with(|s| s.stage));

	view! {
		<Html attr:lang="en" attr:dir="ltr" attr:data-theme=theme />
		<Title text="Toile graph" />
		<Meta charset="UTF-8" />
		<Meta name="viewport" content="width=device-width, initial-scale=1.0" />

		<div class="wizard">
			<header>
				<h1>"Toile"</h1>
				<StepIndicator stage=stage />
			</header>
			{move || match stage.get() {
				Stage::Settings => view! { <SettingsScreen state=state /> }.into_any(),
				Stage::Import => view! { <ImportScreen state=state /> }.into_any(),
				Stage::Mapping => view! { <MappingScreen state=state /> }.into_any(),
				Stage::Visualization => view! { <VisualizationScreen state=state /> }.into_any(),
			}}
		</div>
	}
}
