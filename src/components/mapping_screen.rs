//! Stage 3: which columns feed the graph, which filters the visualization
//! offers, and which renderer draws it.

use chrono::Utc;
use leptos::prelude::*;

use super::ErrorBanner;
use crate::config::AppConfig;
use crate::project::mapping::{map_link, map_node};
use crate::project::values::float_text;
use crate::project::{
	FilterDefinition, FilterKind, FilterTarget, LinkMapping, MappingConfig, NodeMapping,
	ProjectState, RawRow, VisualizationLib,
};

/// Rows listed per table in the live preview; the header still counts all.
const PREVIEW_ROWS: usize = 100;

/// What the preview shows for one entity row under the current mapping.
fn node_preview_line(row: &RawRow, mapping: &NodeMapping) -> String {
	// Size is not shown, so skip it rather than warn about it on every edit.
	let mapping = NodeMapping {
		size: String::new(),
		..mapping.clone()
	};
	let node = map_node(row, &mapping);
	let defined = |column: &str, text: String| {
		if column.is_empty() || text.is_empty() { "Not defined".to_string() } else { text }
	};
	let mut line = format!(
		"ID: {} | Label: {}",
		defined(&mapping.id, node.id),
		defined(&mapping.label, node.label)
	);
	if !mapping.color.is_empty() {
		line.push_str(&format!(" | Color: {}", node.color));
	}
	line
}

/// What the preview shows for one link row under the current mapping.
fn link_preview_line(row: &RawRow, mapping: &LinkMapping) -> String {
	let link = map_link(row, mapping);
	let endpoint = |id: String| if id.is_empty() { "?".to_string() } else { id };
	let mut line = format!("{} → {}", endpoint(link.source), endpoint(link.target));
	if !mapping.weight.is_empty() {
		line.push_str(&format!(" | Weight: {}", float_text(link.weight)));
	}
	if !mapping.color.is_empty() {
		line.push_str(&format!(" | Color: {}", link.color));
	}
	line
}

#[component]
fn PreviewTable(
	title: &'static str,
	total: usize,
	#[prop(into)] lines: Signal<Vec<String>>,
) -> impl IntoView {
	view! {
		<section class="preview-table">
			<h4>{format!("{title} ({total} total)")}</h4>
			<ul>
				{move || {
					lines.get().into_iter().map(|line| view! { <li>{line}</li> }).collect_view()
				}}
			</ul>
			{(total > PREVIEW_ROWS)
				.then(|| view! { <p class="hint">{format!("First {PREVIEW_ROWS} rows shown.")}</p> })}
		</section>
	}
}

/// A column drop-down. Optional fields get a "not mapped" entry.
#[component]
fn ColumnSelect(
	label: &'static str,
	columns: Vec<String>,
	#[prop(into)] value: Signal<String>,
	#[prop(into)] on_change: Callback<String>,
	#[prop(default = false)] optional: bool,
) -> impl IntoView {
	let options = columns
		.into_iter()
		.map(|column| {
			let current = column.clone();
			let text = column.clone();
			view! {
				<option value=column selected=move || value.get() == current>
					{text}
				</option>
			}
		})
		.collect_view();

	view! {
		<label class="column-select">
			{label}
			{(!optional).then(|| view! { <span class="required">"*"</span> })}
			<select on:change=move |ev| on_change.run(event_target_value(&ev))>
				<option value="" selected=move || value.get().is_empty()>
					{if optional { "Not mapped" } else { "Choose a column" }}
				</option>
				{options}
			</select>
		</label>
	}
}

fn edit_filter(draft: RwSignal<MappingConfig>, id: &str, edit: impl FnOnce(&mut FilterDefinition)) {
	draft.update(|m| {
		if let Some(filter) = m.filters.iter_mut().find(|f| f.id == id) {
			edit(filter);
		}
	});
}

#[component]
fn FilterRow(
	filter: FilterDefinition,
	draft: RwSignal<MappingConfig>,
	node_columns: StoredValue<Vec<String>>,
	link_columns: StoredValue<Vec<String>>,
) -> impl IntoView {
	let id = StoredValue::new(filter.id.clone());
	let columns = match filter.target {
		FilterTarget::Nodes => node_columns.get_value(),
		FilterTarget::Links => link_columns.get_value(),
	};
	let column = filter.column.clone();
	let target = filter.target;
	let kind = filter.kind;

	view! {
		<li class="filter-row">
			<input
				type="text"
				class="filter-title"
				prop:value=filter.title.clone()
				on:change=move |ev| {
					let title = event_target_value(&ev);
					edit_filter(draft, &id.get_value(), |f| f.title = title);
				}
			/>
			<select on:change=move |ev| {
				let target = match event_target_value(&ev).as_str() {
					"links" => FilterTarget::Links,
					_ => FilterTarget::Nodes,
				};
				let columns = match target {
					FilterTarget::Nodes => node_columns.get_value(),
					FilterTarget::Links => link_columns.get_value(),
				};
				draft.update(|m| m.retarget_filter(&id.get_value(), target, &columns));
			}>
				{[FilterTarget::Nodes, FilterTarget::Links]
					.into_iter()
					.map(|t| view! { <option value=t.as_str() selected=t == target>{t.display_name()}</option> })
					.collect_view()}
			</select>
			<select on:change=move |ev| {
				let kind = match event_target_value(&ev).as_str() {
					"quantitative" => FilterKind::Quantitative,
					_ => FilterKind::Qualitative,
				};
				edit_filter(draft, &id.get_value(), |f| f.kind = kind);
			}>
				{[FilterKind::Qualitative, FilterKind::Quantitative]
					.into_iter()
					.map(|k| view! { <option value=k.as_str() selected=k == kind>{k.display_name()}</option> })
					.collect_view()}
			</select>
			<select on:change=move |ev| {
				let column = event_target_value(&ev);
				edit_filter(draft, &id.get_value(), |f| f.column = column);
			}>
				{columns
					.into_iter()
					.map(|c| {
						let selected = c == column;
						let text = c.clone();
						view! { <option value=c selected=selected>{text}</option> }
					})
					.collect_view()}
			</select>
			<label class="filter-enabled">
				<input
					type="checkbox"
					prop:checked=filter.enabled
					on:change=move |ev| {
						let enabled = event_target_checked(&ev);
						edit_filter(draft, &id.get_value(), |f| f.enabled = enabled);
					}
				/>
				"Enabled"
			</label>
			<button
				type="button"
				class="danger"
				on:click=move |_| draft.update(|m| m.remove_filter(&id.get_value()))
			>
				"Remove"
			</button>
		</li>
	}
}

#[component]
pub fn MappingScreen(state: RwSignal<ProjectState>) -> impl IntoView {
	let config = use_context::<AppConfig>().unwrap_or_default();
	let (nodes, links) = state.with_untracked(|s| {
		s.data.as_ref().map(|d| (d.node_columns.clone(), d.link_columns.clone())).unwrap_or_default()
	});
	let (raw_nodes, raw_links) = state.with_untracked(|s| {
		s.data.as_ref().map(|d| (d.nodes.clone(), d.links.clone())).unwrap_or_default()
	});
	let row_counts = (raw_nodes.len(), raw_links.len());
	let raw_nodes = StoredValue::new(raw_nodes);
	let raw_links = StoredValue::new(raw_links);
	let previous = state.with_untracked(|s| s.mapping.clone());
	let mut initial = MappingConfig::draft(&nodes, &links, previous.as_ref());
	if previous.is_none() {
		initial.visualization_lib = config.default_library;
	}

	let draft = RwSignal::new(initial);
	let error = RwSignal::new(None::<String>);
	let node_columns = StoredValue::new(nodes);
	let link_columns = StoredValue::new(links);
	let valid = Memo::new(move |_| {
		draft.with(|m| node_columns.with_value(|n| link_columns.with_value(|l| m.validate(n, l).is_ok())))
	});

	let field = move |read: fn(&MappingConfig) -> &String| {
		Signal::derive(move || draft.with(|m| read(m).clone()))
	};
	let setter = move |write: fn(&mut MappingConfig, String)| {
		Callback::new(move |value: String| draft.update(|m| write(m, value)))
	};

	let node_lines = Signal::derive(move || {
		let mapping = draft.with(|m| m.node_mapping.clone());
		raw_nodes.with_value(|rows| {
			rows.iter().take(PREVIEW_ROWS).map(|row| node_preview_line(row, &mapping)).collect::<Vec<_>>()
		})
	});
	let link_lines = Signal::derive(move || {
		let mapping = draft.with(|m| m.link_mapping.clone());
		raw_links.with_value(|rows| {
			rows.iter().take(PREVIEW_ROWS).map(|row| link_preview_line(row, &mapping)).collect::<Vec<_>>()
		})
	});

	let submit = move |_| match state.get_untracked().with_mapping(draft.get_untracked()) {
		Ok(next) => state.set(next),
		Err(e) => error.set(Some(e.to_string())),
	};

	view! {
		<div class="stage mapping-stage">
			<p class="hint">
				{format!("{} entity rows and {} link rows imported.", row_counts.0, row_counts.1)}
			</p>
			<div class="mapping-columns">
				<fieldset>
					<legend>"Nodes"</legend>
					<ColumnSelect
						label="Id"
						columns=node_columns.get_value()
						value=field(|m| &m.node_mapping.id)
						on_change=setter(|m, v| m.node_mapping.id = v)
					/>
					<ColumnSelect
						label="Label"
						columns=node_columns.get_value()
						value=field(|m| &m.node_mapping.label)
						on_change=setter(|m, v| m.node_mapping.label = v)
					/>
					<ColumnSelect
						label="Color"
						optional=true
						columns=node_columns.get_value()
						value=field(|m| &m.node_mapping.color)
						on_change=setter(|m, v| m.node_mapping.color = v)
					/>
					<ColumnSelect
						label="Size"
						optional=true
						columns=node_columns.get_value()
						value=field(|m| &m.node_mapping.size)
						on_change=setter(|m, v| m.node_mapping.size = v)
					/>
				</fieldset>
				<fieldset>
					<legend>"Links"</legend>
					<ColumnSelect
						label="Source"
						columns=link_columns.get_value()
						value=field(|m| &m.link_mapping.source)
						on_change=setter(|m, v| m.link_mapping.source = v)
					/>
					<ColumnSelect
						label="Target"
						columns=link_columns.get_value()
						value=field(|m| &m.link_mapping.target)
						on_change=setter(|m, v| m.link_mapping.target = v)
					/>
					<ColumnSelect
						label="Weight"
						optional=true
						columns=link_columns.get_value()
						value=field(|m| &m.link_mapping.weight)
						on_change=setter(|m, v| m.link_mapping.weight = v)
					/>
					<ColumnSelect
						label="Color"
						optional=true
						columns=link_columns.get_value()
						value=field(|m| &m.link_mapping.color)
						on_change=setter(|m, v| m.link_mapping.color = v)
					/>
				</fieldset>
			</div>

			<div class="mapping-preview">
				<PreviewTable title="Nodes" total=row_counts.0 lines=node_lines />
				<PreviewTable title="Links" total=row_counts.1 lines=link_lines />
			</div>

			<fieldset class="filters">
				<legend>"Filters"</legend>
				<ul class="filter-list">
					{move || {
						draft
							.with(|m| m.filters.clone())
							.into_iter()
							.map(|filter| {
								view! {
									<FilterRow
										filter=filter
										draft=draft
										node_columns=node_columns
										link_columns=link_columns
									/>
								}
							})
							.collect_view()
					}}
				</ul>
				<button
					type="button"
					on:click=move |_| {
						let now = Utc::now().timestamp_millis();
						draft.update(|m| {
							node_columns.with_value(|columns| m.add_filter(columns, now));
						});
					}
				>
					"Add filter"
				</button>
			</fieldset>

			<label class="library-select">
				"Visualization"
				<select on:change=move |ev| {
					if let Some(lib) = VisualizationLib::from_key(&event_target_value(&ev)) {
						draft.update(|m| m.visualization_lib = lib);
					}
				}>
					{VisualizationLib::ALL
						.into_iter()
						.map(|lib| {
							view! {
								<option
									value=lib.key()
									selected=move || draft.with(|m| m.visualization_lib == lib)
								>
									{lib.display_name()}
								</option>
							}
						})
						.collect_view()}
				</select>
			</label>

			<ErrorBanner error=error />
			<div class="actions">
				<button on:click=move |_| state.set(state.get_untracked().back())>"Back"</button>
				<button class="primary" disabled=move || !valid.get() on:click=submit>
					"Visualize"
				</button>
			</div>
		</div>
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use pretty_assertions::assert_eq;
	use serde_json::json;

	fn row(value: serde_json::Value) -> RawRow {
		value.as_object().cloned().unwrap()
	}

	#[test]
	fn node_lines_follow_the_selected_columns() {
		let entity = row(json!({ "id": "a", "name": "Alpha", "group": "red", "score": "n/a" }));
		let mut mapping = NodeMapping {
			id: "id".into(),
			label: "name".into(),
			..NodeMapping::default()
		};
		assert_eq!(node_preview_line(&entity, &mapping), "ID: a | Label: Alpha");

		mapping.label = String::new();
		mapping.color = "group".into();
		mapping.size = "score".into();
		assert_eq!(node_preview_line(&entity, &mapping), "ID: a | Label: Not defined | Color: red");

		mapping.id = "missing".into();
		assert!(node_preview_line(&entity, &mapping).starts_with("ID: Not defined"));
	}

	#[test]
	fn link_lines_show_endpoints_and_mapped_extras() {
		let link = row(json!({ "from": "a", "to": "b", "w": "2.5" }));
		let mut mapping = LinkMapping {
			source: "from".into(),
			target: "nowhere".into(),
			..LinkMapping::default()
		};
		assert_eq!(link_preview_line(&link, &mapping), "a → ?");

		mapping.target = "to".into();
		mapping.weight = "w".into();
		assert_eq!(link_preview_line(&link, &mapping), "a → b | Weight: 2.5");
	}
}
