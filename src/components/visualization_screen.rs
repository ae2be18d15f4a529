//! Stage 4: the rendered graph with its filter sidebar, search box, node
//! details and project export.

use chrono::{DateTime, Utc};
use leptos::prelude::*;
use log::{debug, error, info};

use super::ErrorBanner;
use super::download::save_text;
use super::graph_surface::GraphSurface;
use crate::error::ExportError;
use crate::project::values::float_text;
use crate::project::{
	ActiveFilterValue, ActiveFilters, FilterDefinition, FilterKind, NormalizedNode, ProjectState,
	assemble_export, distinct_values, export_filename, numeric_bounds,
	reconcile_node_set, to_pretty_json,
};
use crate::render::Scene;

/// `created_at` as a calendar date, or the raw text when it doesn't parse.
fn display_date(created_at: &str) -> String {
	DateTime::parse_from_rfc3339(created_at)
		.map(|d| d.format("%Y-%m-%d").to_string())
		.unwrap_or_else(|_| created_at.to_string())
}

/// An empty input clears that bound; anything unparsable is ignored too.
fn parse_bound(text: &str) -> Option<f64> {
	text.trim().parse::<f64>().ok().filter(|n| n.is_finite())
}

fn set_active(active: RwSignal<ActiveFilters>, id: &str, value: ActiveFilterValue) {
	active.update(|map| {
		if value.is_active() {
			map.insert(id.to_string(), value);
		} else {
			map.remove(id);
		}
	});
}

#[component]
fn FilterControl(
	filter: FilterDefinition,
	state: RwSignal<ProjectState>,
	active: RwSignal<ActiveFilters>,
) -> impl IntoView {
	let id = StoredValue::new(filter.id.clone());
	let title = filter.title.clone();

	let control = match filter.kind {
		FilterKind::Qualitative => {
			let values = state.with_untracked(|s| {
				s.graph.as_ref().map(|g| distinct_values(g, &filter)).unwrap_or_default()
			});
			view! {
				<select on:change=move |ev| {
					let value = ActiveFilterValue::Exact(event_target_value(&ev));
					set_active(active, &id.get_value(), value);
				}>
					<option value="">"All values"</option>
					{values
						.into_iter()
						.map(|v| {
							let text = v.clone();
							view! { <option value=v>{text}</option> }
						})
						.collect_view()}
				</select>
			}
			.into_any()
		}
		FilterKind::Quantitative => {
			let bounds = state.with_untracked(|s| s.graph.as_ref().and_then(|g| numeric_bounds(g, &filter)));
			let (low, high) = bounds
				.map(|(lo, hi)| (float_text(lo), float_text(hi)))
				.unwrap_or_default();
			let range = move || match active.with(|map| map.get(&id.get_value()).cloned()) {
				Some(ActiveFilterValue::Range { min, max }) => (min, max),
				_ => (None, None),
			};
			view! {
				<div class="range-inputs">
					<input
						type="number"
						placeholder=low
						on:change=move |ev| {
							let (_, max) = range();
							let min = parse_bound(&event_target_value(&ev));
							set_active(active, &id.get_value(), ActiveFilterValue::Range { min, max });
						}
					/>
					<span>"to"</span>
					<input
						type="number"
						placeholder=high
						on:change=move |ev| {
							let (min, _) = range();
							let max = parse_bound(&event_target_value(&ev));
							set_active(active, &id.get_value(), ActiveFilterValue::Range { min, max });
						}
					/>
				</div>
			}
			.into_any()
		}
	};

	view! {
		<div class="filter-control">
			<label>{title}</label>
			{control}
		</div>
	}
}

#[component]
fn NodeDetails(node: NormalizedNode, #[prop(into)] on_close: Callback<()>) -> impl IntoView {
	let fields = node
		.original_data
		.iter()
		.map(|(key, value)| {
			let text = match value {
				serde_json::Value::String(s) => s.clone(),
				other => other.to_string(),
			};
			view! {
				<dt>{key.clone()}</dt>
				<dd>{text}</dd>
			}
		})
		.collect_view();

	view! {
		<aside class="node-details">
			<button type="button" class="close" on:click=move |_| on_close.run(())>"×"</button>
			<h3>{node.label.clone()}</h3>
			<dl>
				<dt>"Id"</dt>
				<dd>{node.id.clone()}</dd>
				<dt>"Size"</dt>
				<dd>{float_text(node.size)}</dd>
				<dt>"Color"</dt>
				<dd>
					<span class="swatch" style=format!("background:{}", node.color)></span>
					{node.color.clone()}
				</dd>
				{node.placeholder.then(|| view! { <dt>"Note"</dt><dd>"Referenced by a link only"</dd> })}
				{fields}
			</dl>
		</aside>
	}
}

#[component]
pub fn VisualizationScreen(state: RwSignal<ProjectState>) -> impl IntoView {
	let active = RwSignal::new(ActiveFilters::new());
	let search = RwSignal::new(String::new());
	let selected = RwSignal::new(None::<String>);
	let error = RwSignal::new(None::<String>);

	let settings = state.with_untracked(|s| s.settings.clone()).unwrap_or_default();
	let title = settings.title.clone();
	let filters: Vec<FilterDefinition> = state.with_untracked(|s| {
		s.mapping
			.as_ref()
			.map(|m| m.filters.iter().filter(|f| f.enabled).cloned().collect())
			.unwrap_or_default()
	});
	let library = Signal::derive(move || {
		state.with(|s| s.mapping.as_ref().map(|m| m.visualization_lib).unwrap_or_default())
	});
	let (total_nodes, total_links) = state.with_untracked(|s| {
		s.graph
			.as_ref()
			.map(|g| (reconcile_node_set(&g.nodes, &g.links).len(), g.links.len()))
			.unwrap_or_default()
	});

	let visible = Memo::new(move |_| {
		let subgraph = active.with(|a| search.with(|q| state.with(|s| s.visible_subgraph(a, q))));
		debug!(
			"toile: visible subgraph has {} nodes and {} links",
			subgraph.nodes.len(),
			subgraph.links.len()
		);
		subgraph
	});
	let scene = Signal::derive(move || Scene::new(title.clone(), visible.get()));

	let selected_node = move || {
		let id = selected.get()?;
		visible.with(|v| v.nodes.iter().find(|n| n.id == id).cloned())
	};

	let export = move |_| {
		let result = state.with_untracked(|s| {
			let document = assemble_export(s, Utc::now())?;
			let json = to_pretty_json(&document)?;
			Ok::<_, ExportError>((export_filename(s.settings.as_ref()), json))
		});
		match result {
			Ok((filename, json)) => match save_text(&filename, &json, "application/json") {
				Ok(()) => info!("toile: exported {filename}"),
				Err(e) => {
					error!("toile: export failed: {e}");
					error.set(Some(e.to_string()));
				}
			},
			Err(e) => error.set(Some(e.to_string())),
		}
	};

	let tags = settings.tags.clone();
	view! {
		<div class="stage visualization-stage">
			<aside class="sidebar">
				<h2>{settings.title.clone()}</h2>
				<p class="created">{display_date(&settings.created_at)}</p>
				<p class="description">{settings.description.clone()}</p>
				{(!settings.author.is_empty())
					.then(|| view! { <p class="author">"By " {settings.author.clone()}</p> })}
				<ul class="tag-list">
					{tags.into_iter().map(|t| view! { <li class="tag">{t}</li> }).collect_view()}
				</ul>

				<input
					type="search"
					class="search"
					placeholder="Search nodes"
					prop:value=move || search.get()
					on:input=move |ev| search.set(event_target_value(&ev))
				/>
				{filters
					.into_iter()
					.map(|filter| view! { <FilterControl filter=filter state=state active=active /> })
					.collect_view()}

				<p class="stats">
					{move || {
						visible.with(|v| {
							format!(
								"{} / {total_nodes} nodes, {} / {total_links} links",
								v.nodes.len(),
								v.links.len(),
							)
						})
					}}
				</p>
				<ErrorBanner error=error />
				<div class="actions">
					<button on:click=move |_| state.set(state.get_untracked().back())>"Back"</button>
					<button class="primary" on:click=export>"Export project"</button>
				</div>
			</aside>

			<main class="graph-area">
				<GraphSurface
					scene=scene
					library=library
					on_node_click=Callback::new(move |id: String| {
						debug!("toile: node {id} selected");
						selected.set(Some(id));
					})
				/>
				{move || {
					selected_node()
						.map(|node| {
							view! {
								<NodeDetails node=node on_close=Callback::new(move |_: ()| selected.set(None)) />
							}
						})
				}}
			</main>
		</div>
	}
}
