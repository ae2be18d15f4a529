//! Stage 2: an entity/link CSV pair, or a previously exported project.

use leptos::prelude::*;
use leptos::task::spawn_local;
use log::warn;
use web_sys::{DragEvent, File, HtmlInputElement};

use super::ErrorBanner;
use super::download::read_file;
use crate::error::ImportError;
use crate::project::import::{decode_text, expect_extension};
use crate::project::{ProjectState, SourceFile, import_csv_pair, import_project_json};

/// The one file a picker or drop carried, if any.
fn first_file(files: Option<web_sys::FileList>) -> Option<File> {
	files.and_then(|list| list.get(0))
}

/// A drop zone with a file picker, accepting one file of `extension`.
#[component]
fn FileSlot(
	label: &'static str,
	extension: &'static str,
	#[prop(into)] chosen: Signal<Option<String>>,
	#[prop(into)] on_file: Callback<File>,
) -> impl IntoView {
	let hovering = RwSignal::new(false);
	let on_change = move |ev: leptos::ev::Event| {
		let input: HtmlInputElement = event_target(&ev);
		if let Some(file) = first_file(input.files()) {
			on_file.run(file);
		}
		input.set_value("");
	};
	let on_drop = move |ev: DragEvent| {
		ev.prevent_default();
		hovering.set(false);
		if let Some(file) = first_file(ev.data_transfer().and_then(|dt| dt.files())) {
			on_file.run(file);
		}
	};

	view! {
		<div
			class="file-slot"
			class:hovering=move || hovering.get()
			on:dragover=move |ev: DragEvent| {
				ev.prevent_default();
				hovering.set(true);
			}
			on:dragleave=move |_| hovering.set(false)
			on:drop=on_drop
		>
			<span class="file-slot-label">{label}</span>
			<span class="file-slot-name">
				{move || chosen.get().unwrap_or_else(|| format!("Drop a {extension} file or browse"))}
			</span>
			<input type="file" accept=extension on:change=on_change />
		</div>
	}
}

#[component]
pub fn ImportScreen(state: RwSignal<ProjectState>) -> impl IntoView {
	let entities = RwSignal::new(None::<SourceFile>);
	let links = RwSignal::new(None::<SourceFile>);
	let busy = RwSignal::new(false);
	let error = RwSignal::new(None::<String>);
	let has_data = state.with_untracked(|s| s.data.is_some());

	let fail = move |message: String| {
		warn!("toile: import refused: {message}");
		error.try_set(Some(message));
	};

	// Reads a CSV into `target` once its extension checks out.
	let pick_csv = move |target: RwSignal<Option<SourceFile>>| {
		Callback::new(move |file: File| {
			if let Err(e) = expect_extension(&file.name(), ".csv") {
				fail(e.to_string());
				return;
			}
			error.set(None);
			busy.set(true);
			spawn_local(async move {
				match read_file(&file).await {
					Ok(source) => {
						target.try_set(Some(source));
					}
					Err(e) => fail(e.to_string()),
				}
				busy.try_set(false);
			});
		})
	};

	let import_pair = move |_| {
		let result = match (entities.get_untracked(), links.get_untracked()) {
			(Some(e), Some(l)) => import_csv_pair(&e, &l),
			(None, _) => Err(ImportError::MissingFile("entities")),
			(_, None) => Err(ImportError::MissingFile("links")),
		};
		let next = result
			.map_err(|e| e.to_string())
			.and_then(|data| state.get_untracked().with_import(data).map_err(|e| e.to_string()));
		match next {
			Ok(next) => state.set(next),
			Err(message) => fail(message),
		}
	};

	let import_project = Callback::new(move |file: File| {
		if let Err(e) = expect_extension(&file.name(), ".json") {
			fail(e.to_string());
			return;
		}
		error.set(None);
		busy.set(true);
		spawn_local(async move {
			let next: Result<ProjectState, String> = async {
				let source = read_file(&file).await.map_err(|e| e.to_string())?;
				let (text, _) = decode_text(&source.bytes, &source.name);
				let project = import_project_json(&text).map_err(|e| e.to_string())?;
				state
					.get_untracked()
					.with_project(project)
					.map_err(|e| e.to_string())
			}
			.await;
			busy.try_set(false);
			match next {
				Ok(next) => {
					state.try_set(next);
				}
				Err(message) => fail(message),
			}
		});
	});

	let file_name = move |slot: RwSignal<Option<SourceFile>>| {
		Signal::derive(move || slot.with(|f| f.as_ref().map(|f| f.name.clone())))
	};
	let ready = move || entities.with(Option::is_some) && links.with(Option::is_some) && !busy.get();

	view! {
		<div class="stage import-stage">
			<section>
				<h2>"CSV files"</h2>
				<p class="hint">
					"The entities file lists one node per row and the links file one edge per row. "
					"Both need a header row."
				</p>
				<FileSlot
					label="Entities"
					extension=".csv"
					chosen=file_name(entities)
					on_file=pick_csv(entities)
				/>
				<FileSlot label="Links" extension=".csv" chosen=file_name(links) on_file=pick_csv(links) />
				<button class="primary" disabled=move || !ready() on:click=import_pair>
					"Import CSV files"
				</button>
			</section>

			<section>
				<h2>"Project file"</h2>
				<p class="hint">"A JSON document exported from this tool restores data, mapping and filters."</p>
				<FileSlot
					label="Project"
					extension=".json"
					chosen=Signal::derive(|| None::<String>)
					on_file=import_project
				/>
			</section>

			{move || busy.get().then(|| view! { <div class="surface-status">"Reading file..."</div> })}
			<ErrorBanner error=error />
			<div class="actions">
				<button on:click=move |_| state.set(state.get_untracked().back())>"Back"</button>
				<Show when=move || has_data>
					<button on:click=move |_| {
						match state.get_untracked().resume() {
							Ok(next) => state.set(next),
							Err(e) => error.set(Some(e.to_string())),
						}
					}>"Keep current data"</button>
				</Show>
			</div>
		</div>
	}
}
