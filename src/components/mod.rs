//! Leptos components: the four wizard screens and the pieces they share.

pub mod download;
pub mod force_graph;
pub mod graph_surface;
pub mod import_screen;
pub mod mapping_screen;
pub mod settings_screen;
pub mod visualization_screen;

use chrono::{SecondsFormat, Utc};
use leptos::prelude::*;

use crate::project::Stage;

pub use graph_surface::GraphSurface;
pub use import_screen::ImportScreen;
pub use mapping_screen::MappingScreen;
pub use settings_screen::SettingsScreen;
pub use visualization_screen::VisualizationScreen;

/// Current time as an RFC 3339 string with millisecond precision.
pub fn timestamp() -> String {
	Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Shows the last refused action, if any.
#[component]
pub fn ErrorBanner(error: RwSignal<Option<String>>) -> impl IntoView {
	move || {
		error
			.get()
			.map(|message| view! { <div class="error-banner" role="alert">{message}</div> })
	}
}

const STAGES: [Stage; 4] = [Stage::Settings, Stage::Import, Stage::Mapping, Stage::Visualization];

/// Numbered breadcrumb of the wizard, marking done and current steps.
#[component]
pub fn StepIndicator(#[prop(into)] stage: Signal<Stage>) -> impl IntoView {
	view! {
		<ol class="steps">
			{STAGES
				.into_iter()
				.map(|step| {
					view! {
						<li
							class:done=move || step.index() < stage.get().index()
							class:current=move || step == stage.get()
						>
							<span class="step-number">{step.index() + 1}</span>
							{step.title()}
						</li>
					}
				})
				.collect_view()}
		</ol>
	}
}
