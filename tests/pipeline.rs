//! Whole-wizard runs over the browser-independent model: CSV pair in,
//! mapped and filtered graph out, and back again through an exported
//! project document.

use chrono::{TimeZone, Utc};
use pretty_assertions::assert_eq;
use toile_graph::error::{ImportError, MappingError, TransitionError};
use toile_graph::project::{
	ActiveFilterValue, ActiveFilters, FilterKind, FilterTarget, MappingConfig, ProjectSettings,
	ProjectState, SourceFile, Stage, VisibleSubgraph, VisualizationLib, assemble_export,
	import_csv_pair, import_project_json, to_pretty_json,
};

const ENTITIES: &str = "id,name,group,score\n\
	a,Alpha,red,3\n\
	b,Beta,blue,7\n\
	c,Gamma,red,12\n";

const LINKS: &str = "from,to,kind\n\
	a,b,friend\n\
	b,c,rival\n\
	c,d,friend\n";

fn source(name: &str, text: &str) -> SourceFile {
	SourceFile {
		name: name.to_string(),
		bytes: text.as_bytes().to_vec(),
	}
}

fn settings() -> ProjectSettings {
	let mut settings = ProjectSettings::new("2024-05-01T08:00:00.000Z");
	settings.title = "Trade routes".into();
	settings.description = "Who talks to whom".into();
	settings.add_tag("demo");
	settings
}

fn imported() -> ProjectState {
	let data = import_csv_pair(&source("entities.csv", ENTITIES), &source("links.csv", LINKS))
		.expect("csv pair parses");
	ProjectState::default()
		.with_settings(settings())
		.and_then(|s| s.with_import(data))
		.expect("settings then import")
}

fn mapped() -> ProjectState {
	let state = imported();
	let data = state.data.as_ref().expect("imported data");
	let mut mapping = MappingConfig::draft(&data.node_columns, &data.link_columns, None);
	mapping.node_mapping.size = "score".into();
	mapping.visualization_lib = VisualizationLib::JointJs;
	let id = mapping.add_filter(&data.node_columns, 1_700_000_000_000);
	let filter = mapping.filters.iter_mut().find(|f| f.id == id).expect("new filter");
	filter.column = "group".into();
	filter.title = "Group".into();
	state.with_mapping(mapping).expect("mapping applies")
}

fn ids(visible: &VisibleSubgraph) -> (Vec<&str>, Vec<(&str, &str)>) {
	(
		visible.nodes.iter().map(|n| n.id.as_str()).collect(),
		visible
			.links
			.iter()
			.map(|l| (l.source.as_str(), l.target.as_str()))
			.collect(),
	)
}

#[test]
fn csv_pair_reaches_the_visualization() {
	let state = mapped();
	assert_eq!(state.stage, Stage::Visualization);
	assert_eq!(state.revision, 3);

	let visible = state.visible_subgraph(&ActiveFilters::new(), "");
	let (nodes, links) = ids(&visible);
	assert_eq!(nodes, vec!["a", "b", "c", "d"]);
	assert_eq!(links, vec![("a", "b"), ("b", "c"), ("c", "d")]);
	assert!(visible.nodes[3].placeholder);
	assert_eq!(visible.nodes[2].size, 12.0);
}

#[test]
fn draft_takes_leading_columns() {
	let state = imported();
	let data = state.data.as_ref().expect("imported data");
	let draft = MappingConfig::draft(&data.node_columns, &data.link_columns, None);
	assert_eq!(draft.node_mapping.id, "id");
	assert_eq!(draft.node_mapping.label, "name");
	assert_eq!(draft.link_mapping.source, "from");
	assert_eq!(draft.link_mapping.target, "to");
	assert!(draft.validate(&data.node_columns, &data.link_columns).is_ok());
}

#[test]
fn filters_and_search_narrow_the_graph() {
	let state = mapped();
	let filter_id = state.mapping.as_ref().expect("mapping").filters[0].id.clone();

	let mut active = ActiveFilters::new();
	active.insert(filter_id, ActiveFilterValue::Exact("red".into()));
	let red = state.visible_subgraph(&active, "");
	let (nodes, links) = ids(&red);
	assert_eq!(nodes, vec!["a", "c"]);
	assert!(links.is_empty());

	let searched = state.visible_subgraph(&ActiveFilters::new(), "  BETA ");
	let (nodes, links) = ids(&searched);
	assert_eq!(nodes, vec!["b"]);
	assert!(links.is_empty());

	let unmatched = state.visible_subgraph(&ActiveFilters::new(), "zz");
	let (nodes, _) = ids(&unmatched);
	assert!(nodes.is_empty());
}

#[test]
fn range_filter_on_a_numeric_column() {
	let mut state = mapped();
	let mapping = state.mapping.as_mut().expect("mapping");
	mapping.filters[0].kind = FilterKind::Quantitative;
	mapping.filters[0].column = "score".into();
	let id = mapping.filters[0].id.clone();

	let mut active = ActiveFilters::new();
	active.insert(id, ActiveFilterValue::Range { min: Some(5.0), max: None });
	let ranged = state.visible_subgraph(&active, "");
	let (nodes, links) = ids(&ranged);
	assert_eq!(nodes, vec!["b", "c"]);
	assert_eq!(links, vec![("b", "c")]);
}

#[test]
fn export_round_trips_through_project_import() {
	let state = mapped();
	let filter_id = state.mapping.as_ref().expect("mapping").filters[0].id.clone();
	let mut active = ActiveFilters::new();
	active.insert(filter_id, ActiveFilterValue::Exact("blue".into()));

	let first = assemble_export(&state, Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap()).unwrap();
	let json = to_pretty_json(&first).unwrap();

	let restored = ProjectState::default()
		.with_project(import_project_json(&json).unwrap())
		.unwrap();
	assert_eq!(restored.stage, Stage::Mapping);
	assert_eq!(restored.settings, state.settings);
	assert_eq!(restored.mapping, state.mapping);

	let mapping = restored.mapping.clone().unwrap();
	let reapplied = restored.with_mapping(mapping).unwrap();
	assert_eq!(
		reapplied.visible_subgraph(&active, "be"),
		state.visible_subgraph(&active, "be")
	);

	let second = assemble_export(&reapplied, Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap()).unwrap();
	assert_eq!(second.nodes, first.nodes);
	assert_eq!(second.links, first.links);
	assert_eq!(second.processed_nodes, first.processed_nodes);
	assert_eq!(second.processed_links, first.processed_links);
	assert_eq!(second.filters, first.filters);
	assert_eq!(second.node_mapping, first.node_mapping);
	assert_eq!(second.link_mapping, first.link_mapping);
	assert_eq!(second.metadata.as_ref().map(|m| m.node_count), Some(3));
	assert_ne!(
		second.metadata.map(|m| m.export_date),
		first.metadata.map(|m| m.export_date)
	);
}

#[test]
fn exported_document_uses_camel_case_keys() {
	let export = assemble_export(&mapped(), Utc::now()).unwrap();
	let value: serde_json::Value = serde_json::from_str(&to_pretty_json(&export).unwrap()).unwrap();
	for key in [
		"projectSettings",
		"nodeColumns",
		"nodeMapping",
		"visualizationLib",
		"processedNodes",
		"metadata",
	] {
		assert!(value.get(key).is_some(), "missing {key}");
	}
	assert_eq!(value["visualizationLib"], "jointjs");
	assert_eq!(value["filters"][0]["type"], "qualitative");
	assert_eq!(value["filters"][0]["target"], FilterTarget::Nodes.as_str());
}

#[test]
fn refused_steps_leave_the_state_alone() {
	let state = imported();
	let data = state.data.clone().unwrap();

	let mut mapping = MappingConfig::draft(&data.node_columns, &data.link_columns, None);
	mapping.node_mapping.color = "colour".into();
	let err = state.clone().with_mapping(mapping).unwrap_err();
	assert!(matches!(
		err,
		TransitionError::Mapping(MappingError::UnknownColumn { .. })
	));
	assert_eq!(state.stage, Stage::Mapping);

	let wrong = import_csv_pair(&source("entities.txt", ENTITIES), &source("links.csv", LINKS));
	assert!(matches!(wrong, Err(ImportError::WrongExtension { .. })));

	let ragged = import_csv_pair(&source("entities.csv", "id,name\na\n"), &source("links.csv", LINKS));
	assert!(matches!(ragged, Err(ImportError::Csv { .. })));
}

#[test]
fn back_keeps_earlier_input() {
	let state = mapped().back();
	assert_eq!(state.stage, Stage::Mapping);
	assert!(state.graph.is_some());
	let state = state.back().back();
	assert_eq!(state.stage, Stage::Settings);
	assert_eq!(state.settings.as_ref().map(|s| s.title.as_str()), Some("Trade routes"));
	let state = state.resume().and_then(ProjectState::resume).unwrap();
	assert_eq!(state.stage, Stage::Mapping);
}
